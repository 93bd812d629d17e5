use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    Extension,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::errors::ApiError;
use crate::middleware::auth::CurrentUser;
use crate::models::task::{NewTask, TaskChanges, TaskStatus};
use crate::models::user::Role;
use crate::policy::{authorize_roles, task_scope};
use crate::state::AppState;
use crate::utils::validate::{missing_fields, parse_datetime, present, valid_coordinates};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskPayload {
    pub name: Option<String>,
    pub contact_no: Option<String>,
    pub full_address: Option<String>,
    pub pincode: Option<String>,
    pub e_loc: Option<String>,
    pub coordinates: Option<Vec<f64>>,
    pub task: Option<String>,
    pub expected_date: Option<String>,
}

/// Task intake. Despite the `/assign` route, this never sets an assignee:
/// every task starts as `new` and unassigned, and binding happens through
/// the separate assignee operation.
pub async fn create_task(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<CreateTaskPayload>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    authorize_roles(&user, &[Role::Admin])?;

    let (Some(name), Some(contact_no), Some(full_address), Some(task), Some(expected_raw)) = (
        present(&payload.name),
        present(&payload.contact_no),
        present(&payload.full_address),
        present(&payload.task),
        present(&payload.expected_date),
    ) else {
        return Err(ApiError::MissingFields(missing_fields(&[
            ("name", &payload.name),
            ("contactNo", &payload.contact_no),
            ("fullAddress", &payload.full_address),
            ("task", &payload.task),
            ("expectedDate", &payload.expected_date),
        ])));
    };

    let expected_date = parse_datetime(expected_raw)
        .ok_or_else(|| ApiError::Validation("Invalid expectedDate".to_string()))?;

    let new_task = NewTask {
        name: name.to_string(),
        contact_no: contact_no.to_string(),
        full_address: full_address.to_string(),
        pincode: present(&payload.pincode).map(str::to_string),
        e_loc: present(&payload.e_loc).map(str::to_string),
        coordinates: valid_coordinates(payload.coordinates.clone()),
        task: task.to_string(),
        expected_date,
    };

    let task = state.db.create_task(&new_task).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Task created successfully and ready for assignment",
            "task": task,
        })),
    ))
}

pub async fn get_all_tasks(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Value>, ApiError> {
    let scope = task_scope(&user);
    let tasks = state.db.find_tasks(&scope).await?;
    Ok(Json(json!({ "tasks": tasks })))
}

pub async fn get_task_by_id(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let scope = task_scope(&user);
    // Absent and invisible are deliberately the same answer.
    let task = state
        .db
        .find_task(id, &scope)
        .await?
        .ok_or(ApiError::NotFound("Task not found or access denied"))?;
    Ok(Json(json!({ "task": task })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusPayload {
    pub status: Option<String>,
    pub revisit_date: Option<String>,
}

pub async fn update_task_status(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusPayload>,
) -> Result<Json<Value>, ApiError> {
    // Any status may follow any other; only enum membership is enforced.
    let status = match present(&payload.status) {
        Some(raw) => Some(TaskStatus::parse(raw).ok_or_else(|| {
            ApiError::Validation(format!(
                "Invalid status, expected one of: {}",
                TaskStatus::VALID.join(", ")
            ))
        })?),
        None => None,
    };
    let revisit_date = match present(&payload.revisit_date) {
        Some(raw) => Some(
            parse_datetime(raw)
                .ok_or_else(|| ApiError::Validation("Invalid revisitDate".to_string()))?,
        ),
        None => None,
    };

    let changes = TaskChanges {
        status,
        revisit_date,
    };
    let scope = task_scope(&user);
    let task = state
        .db
        .update_task(id, &scope, &changes)
        .await?
        .ok_or(ApiError::NotFound("Task not found or access denied"))?;

    Ok(Json(json!({
        "message": "Task updated successfully",
        "task": task,
    })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssigneePayload {
    pub assignee_id: Option<Uuid>,
}

/// Binds a task to an employee and moves it to `assigned`.
pub async fn set_task_assignee(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssigneePayload>,
) -> Result<Json<Value>, ApiError> {
    authorize_roles(&user, &[Role::Admin])?;

    let assignee_id = payload
        .assignee_id
        .ok_or(ApiError::MissingFields(vec!["assigneeId"]))?;
    state
        .db
        .find_user_by_id(assignee_id)
        .await?
        .ok_or(ApiError::NotFound("Assignee not found"))?;

    let task = state
        .db
        .set_task_assignee(id, assignee_id)
        .await?
        .ok_or(ApiError::NotFound("Task not found"))?;

    Ok(Json(json!({
        "message": "Task assigned successfully",
        "task": task,
    })))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    authorize_roles(&user, &[Role::Admin])?;

    let task = state
        .db
        .delete_task(id)
        .await?
        .ok_or(ApiError::NotFound("Task not found"))?;

    Ok(Json(json!({
        "message": "Task deleted successfully",
        "deletedTask": task,
    })))
}
