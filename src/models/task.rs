use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{prelude::Type, FromRow};
use uuid::Uuid;

use super::user::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "task_status")]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    New,
    Assigned,
    Inprogress,
    Completed,
    Revisit,
}

impl TaskStatus {
    pub const VALID: &'static [&'static str] =
        &["new", "assigned", "inprogress", "completed", "revisit"];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "new" => Some(TaskStatus::New),
            "assigned" => Some(TaskStatus::Assigned),
            "inprogress" => Some(TaskStatus::Inprogress),
            "completed" => Some(TaskStatus::Completed),
            "revisit" => Some(TaskStatus::Revisit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub name: String,
    pub contact_no: String,
    pub full_address: String,
    pub pincode: Option<String>,
    pub e_loc: Option<String>,
    pub coordinates: Option<Vec<f64>>,
    pub task: String,
    pub assignee_id: Option<Uuid>,
    pub status: TaskStatus,
    pub expected_date: DateTime<Utc>,
    pub revisit_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Intake data for a task. Status and assignee are not part of it: every
/// task starts as `new` and unassigned.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub name: String,
    pub contact_no: String,
    pub full_address: String,
    pub pincode: Option<String>,
    pub e_loc: Option<String>,
    pub coordinates: Option<Vec<f64>>,
    pub task: String,
    pub expected_date: DateTime<Utc>,
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct TaskChanges {
    pub status: Option<TaskStatus>,
    pub revisit_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssigneeInfo {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Task plus the joined assignee identity admins see in listings.
#[derive(Debug, Clone, Serialize)]
pub struct TaskWithAssignee {
    #[serde(flatten)]
    pub task: Task,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<AssigneeInfo>,
}
