use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::repository::Repository;
use crate::models::company::{Company, NewCompany};
use crate::models::task::{AssigneeInfo, NewTask, Task, TaskChanges, TaskStatus, TaskWithAssignee};
use crate::models::user::{NewUser, User};
use crate::policy::TaskScope;

/// In-memory repository for tests. It shares the `Repository` seam with
/// the Postgres implementation so route handlers run unmodified.
#[derive(Default)]
pub struct MockDb {
    pub users: Mutex<Vec<User>>,
    pub companies: Mutex<Vec<Company>>,
    pub tasks: Mutex<Vec<Task>>,
}

impl MockDb {
    fn assignee_info(&self, assignee_id: Option<Uuid>) -> Option<AssigneeInfo> {
        let users = self.users.lock().unwrap();
        assignee_id
            .and_then(|id| users.iter().find(|u| u.id == id).cloned())
            .map(|u| AssigneeInfo {
                id: u.id,
                name: u.name,
                email: u.email,
                role: u.role,
            })
    }

    fn with_assignee(&self, task: Task, scope: &TaskScope) -> TaskWithAssignee {
        let assignee = match scope {
            TaskScope::All => self.assignee_info(task.assignee_id),
            TaskScope::AssignedTo(_) => None,
        };
        TaskWithAssignee { task, assignee }
    }
}

#[async_trait]
impl Repository for MockDb {
    async fn is_email_taken(&self, email: &str) -> Result<bool, sqlx::Error> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().any(|u| u.email.eq_ignore_ascii_case(email)))
    }

    async fn create_user(&self, new_user: &NewUser) -> Result<User, sqlx::Error> {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: new_user.name.clone(),
            email: new_user.email.clone(),
            password_hash: new_user.password_hash.clone(),
            role: new_user.role,
            organization: new_user.organization.clone(),
            sub_role: new_user.sub_role.clone(),
            work_type: new_user.work_type,
            full_address: new_user.full_address.clone(),
            pincode: new_user.pincode.clone(),
            e_loc: new_user.e_loc.clone(),
            coordinates: new_user.coordinates.clone(),
            skills: new_user.skills.clone(),
            created_at: now,
            updated_at: now,
        };
        self.users.lock().unwrap().push(user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn create_company(&self, new_company: &NewCompany) -> Result<Company, sqlx::Error> {
        let now = Utc::now();
        let company = Company {
            id: Uuid::new_v4(),
            name: new_company.name.clone(),
            industry_type: new_company.industry_type.clone(),
            business_email: new_company.business_email.clone(),
            contact_nos: new_company.contact_nos.clone(),
            company_size: new_company.company_size.clone(),
            full_address: new_company.full_address.clone(),
            work_force_type: new_company.work_force_type.clone(),
            pincode: new_company.pincode.clone(),
            e_loc: new_company.e_loc.clone(),
            coordinates: new_company.coordinates.clone(),
            created_at: now,
            updated_at: now,
        };
        self.companies.lock().unwrap().push(company.clone());
        Ok(company)
    }

    async fn create_task(&self, new_task: &NewTask) -> Result<Task, sqlx::Error> {
        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            name: new_task.name.clone(),
            contact_no: new_task.contact_no.clone(),
            full_address: new_task.full_address.clone(),
            pincode: new_task.pincode.clone(),
            e_loc: new_task.e_loc.clone(),
            coordinates: new_task.coordinates.clone(),
            task: new_task.task.clone(),
            assignee_id: None,
            status: TaskStatus::New,
            expected_date: new_task.expected_date,
            revisit_date: None,
            created_at: now,
            updated_at: now,
        };
        self.tasks.lock().unwrap().push(task.clone());
        Ok(task)
    }

    async fn find_tasks(&self, scope: &TaskScope) -> Result<Vec<TaskWithAssignee>, sqlx::Error> {
        let mut visible: Vec<Task> = {
            let tasks = self.tasks.lock().unwrap();
            tasks
                .iter()
                .filter(|t| scope.permits(t.assignee_id))
                .cloned()
                .collect()
        };
        visible.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(visible
            .into_iter()
            .map(|t| self.with_assignee(t, scope))
            .collect())
    }

    async fn find_task(
        &self,
        id: Uuid,
        scope: &TaskScope,
    ) -> Result<Option<TaskWithAssignee>, sqlx::Error> {
        let found = {
            let tasks = self.tasks.lock().unwrap();
            tasks
                .iter()
                .find(|t| t.id == id && scope.permits(t.assignee_id))
                .cloned()
        };
        Ok(found.map(|t| self.with_assignee(t, scope)))
    }

    async fn update_task(
        &self,
        id: Uuid,
        scope: &TaskScope,
        changes: &TaskChanges,
    ) -> Result<Option<Task>, sqlx::Error> {
        let mut tasks = self.tasks.lock().unwrap();
        let Some(task) = tasks
            .iter_mut()
            .find(|t| t.id == id && scope.permits(t.assignee_id))
        else {
            return Ok(None);
        };
        if let Some(status) = changes.status {
            task.status = status;
        }
        if let Some(revisit_date) = changes.revisit_date {
            task.revisit_date = Some(revisit_date);
        }
        task.updated_at = Utc::now();
        Ok(Some(task.clone()))
    }

    async fn set_task_assignee(
        &self,
        id: Uuid,
        assignee_id: Uuid,
    ) -> Result<Option<Task>, sqlx::Error> {
        let mut tasks = self.tasks.lock().unwrap();
        let Some(task) = tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        task.assignee_id = Some(assignee_id);
        task.status = TaskStatus::Assigned;
        task.updated_at = Utc::now();
        Ok(Some(task.clone()))
    }

    async fn delete_task(&self, id: Uuid) -> Result<Option<Task>, sqlx::Error> {
        let mut tasks = self.tasks.lock().unwrap();
        let Some(index) = tasks.iter().position(|t| t.id == id) else {
            return Ok(None);
        };
        Ok(Some(tasks.remove(index)))
    }
}
