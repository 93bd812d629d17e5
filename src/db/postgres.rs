use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::repository::Repository;
use crate::models::company::{Company, NewCompany};
use crate::models::task::{AssigneeInfo, NewTask, Task, TaskChanges, TaskWithAssignee};
use crate::models::user::{NewUser, Role, User};
use crate::policy::TaskScope;

pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Task row with the optional LEFT JOINed assignee columns.
#[derive(FromRow)]
struct TaskAssigneeRow {
    #[sqlx(flatten)]
    task: Task,
    assignee_name: Option<String>,
    assignee_email: Option<String>,
    assignee_role: Option<Role>,
}

impl TaskAssigneeRow {
    fn into_scoped(self, scope: &TaskScope) -> TaskWithAssignee {
        // Only admin listings carry the joined identity; employees already
        // know the assignee is themselves.
        let assignee = match (scope, self.task.assignee_id) {
            (TaskScope::All, Some(id)) => match (
                self.assignee_name,
                self.assignee_email,
                self.assignee_role,
            ) {
                (Some(name), Some(email), Some(role)) => Some(AssigneeInfo {
                    id,
                    name,
                    email,
                    role,
                }),
                _ => None,
            },
            _ => None,
        };
        TaskWithAssignee {
            task: self.task,
            assignee,
        }
    }
}

const TASK_WITH_ASSIGNEE: &str = "SELECT t.*, \
     u.name AS assignee_name, u.email AS assignee_email, u.role AS assignee_role \
     FROM tasks t LEFT JOIN users u ON u.id = t.assignee_id";

#[async_trait]
impl Repository for PgRepository {
    async fn is_email_taken(&self, email: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM users WHERE lower(email) = lower($1))",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
    }

    async fn create_user(&self, new_user: &NewUser) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users \
             (name, email, password_hash, role, organization, sub_role, work_type, \
              full_address, pincode, e_loc, coordinates, skills) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING *",
        )
        .bind(&new_user.name)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(new_user.role)
        .bind(&new_user.organization)
        .bind(&new_user.sub_role)
        .bind(new_user.work_type)
        .bind(&new_user.full_address)
        .bind(&new_user.pincode)
        .bind(&new_user.e_loc)
        .bind(&new_user.coordinates)
        .bind(&new_user.skills)
        .fetch_one(&self.pool)
        .await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE lower(email) = lower($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn create_company(&self, new_company: &NewCompany) -> Result<Company, sqlx::Error> {
        sqlx::query_as::<_, Company>(
            "INSERT INTO companies \
             (name, industry_type, business_email, contact_nos, company_size, \
              full_address, work_force_type, pincode, e_loc, coordinates) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING *",
        )
        .bind(&new_company.name)
        .bind(&new_company.industry_type)
        .bind(&new_company.business_email)
        .bind(&new_company.contact_nos)
        .bind(&new_company.company_size)
        .bind(&new_company.full_address)
        .bind(&new_company.work_force_type)
        .bind(&new_company.pincode)
        .bind(&new_company.e_loc)
        .bind(&new_company.coordinates)
        .fetch_one(&self.pool)
        .await
    }

    async fn create_task(&self, new_task: &NewTask) -> Result<Task, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            "INSERT INTO tasks \
             (name, contact_no, full_address, pincode, e_loc, coordinates, task, \
              status, expected_date) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, 'new', $8) \
             RETURNING *",
        )
        .bind(&new_task.name)
        .bind(&new_task.contact_no)
        .bind(&new_task.full_address)
        .bind(&new_task.pincode)
        .bind(&new_task.e_loc)
        .bind(&new_task.coordinates)
        .bind(&new_task.task)
        .bind(new_task.expected_date)
        .fetch_one(&self.pool)
        .await
    }

    async fn find_tasks(&self, scope: &TaskScope) -> Result<Vec<TaskWithAssignee>, sqlx::Error> {
        let sql = format!(
            "{TASK_WITH_ASSIGNEE} \
             WHERE ($1::uuid IS NULL OR t.assignee_id = $1) \
             ORDER BY t.created_at DESC"
        );
        let rows = sqlx::query_as::<_, TaskAssigneeRow>(&sql)
            .bind(scope.assignee_filter())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|row| row.into_scoped(scope)).collect())
    }

    async fn find_task(
        &self,
        id: Uuid,
        scope: &TaskScope,
    ) -> Result<Option<TaskWithAssignee>, sqlx::Error> {
        let sql = format!(
            "{TASK_WITH_ASSIGNEE} \
             WHERE t.id = $1 AND ($2::uuid IS NULL OR t.assignee_id = $2)"
        );
        let row = sqlx::query_as::<_, TaskAssigneeRow>(&sql)
            .bind(id)
            .bind(scope.assignee_filter())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|row| row.into_scoped(scope)))
    }

    async fn update_task(
        &self,
        id: Uuid,
        scope: &TaskScope,
        changes: &TaskChanges,
    ) -> Result<Option<Task>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            "UPDATE tasks SET \
             status = COALESCE($3, status), \
             revisit_date = COALESCE($4, revisit_date), \
             updated_at = now() \
             WHERE id = $1 AND ($2::uuid IS NULL OR assignee_id = $2) \
             RETURNING *",
        )
        .bind(id)
        .bind(scope.assignee_filter())
        .bind(changes.status)
        .bind(changes.revisit_date)
        .fetch_optional(&self.pool)
        .await
    }

    async fn set_task_assignee(
        &self,
        id: Uuid,
        assignee_id: Uuid,
    ) -> Result<Option<Task>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            "UPDATE tasks SET assignee_id = $2, status = 'assigned', updated_at = now() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(assignee_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_task(&self, id: Uuid) -> Result<Option<Task>, sqlx::Error> {
        sqlx::query_as::<_, Task>("DELETE FROM tasks WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }
}
