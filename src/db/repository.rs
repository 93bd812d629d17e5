use async_trait::async_trait;
use uuid::Uuid;

use crate::models::company::{Company, NewCompany};
use crate::models::task::{NewTask, Task, TaskChanges, TaskWithAssignee};
use crate::models::user::{NewUser, User};
use crate::policy::TaskScope;

/// Persistence seam. Handlers only see this trait; the Postgres
/// implementation and the in-memory test double both live behind it.
#[async_trait]
pub trait Repository: Send + Sync {
    async fn is_email_taken(&self, email: &str) -> Result<bool, sqlx::Error>;
    async fn create_user(&self, new_user: &NewUser) -> Result<User, sqlx::Error>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error>;
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, sqlx::Error>;

    async fn create_company(&self, new_company: &NewCompany) -> Result<Company, sqlx::Error>;

    async fn create_task(&self, new_task: &NewTask) -> Result<Task, sqlx::Error>;
    async fn find_tasks(&self, scope: &TaskScope) -> Result<Vec<TaskWithAssignee>, sqlx::Error>;
    async fn find_task(
        &self,
        id: Uuid,
        scope: &TaskScope,
    ) -> Result<Option<TaskWithAssignee>, sqlx::Error>;
    async fn update_task(
        &self,
        id: Uuid,
        scope: &TaskScope,
        changes: &TaskChanges,
    ) -> Result<Option<Task>, sqlx::Error>;
    async fn set_task_assignee(
        &self,
        id: Uuid,
        assignee_id: Uuid,
    ) -> Result<Option<Task>, sqlx::Error>;
    async fn delete_task(&self, id: Uuid) -> Result<Option<Task>, sqlx::Error>;
}
