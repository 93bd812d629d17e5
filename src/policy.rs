use uuid::Uuid;

use crate::errors::ApiError;
use crate::middleware::auth::CurrentUser;
use crate::models::user::Role;

/// Role gate shared by every restricted handler, instead of ad hoc role
/// checks scattered through them.
pub fn authorize_roles(user: &CurrentUser, allowed: &[Role]) -> Result<(), ApiError> {
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}

/// Which tasks a caller may see or touch. Admins see everything;
/// employees only tasks assigned to them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskScope {
    All,
    AssignedTo(Uuid),
}

impl TaskScope {
    /// SQL-side form: `None` means no assignee filter.
    pub fn assignee_filter(&self) -> Option<Uuid> {
        match self {
            TaskScope::All => None,
            TaskScope::AssignedTo(id) => Some(*id),
        }
    }

    pub fn permits(&self, assignee_id: Option<Uuid>) -> bool {
        match self {
            TaskScope::All => true,
            TaskScope::AssignedTo(id) => assignee_id == Some(*id),
        }
    }
}

pub fn task_scope(user: &CurrentUser) -> TaskScope {
    match user.role {
        Role::Admin => TaskScope::All,
        Role::Employee => TaskScope::AssignedTo(user.id),
    }
}
