use axum::extract::{Json, State};
use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::ApiError;
use crate::models::user::{Role, WorkType};
use crate::routes::auth::claims::Claims;
use crate::state::AppState;
use crate::utils::jwt::create_jwt;
use crate::utils::password::verify_password;
use crate::utils::validate::{missing_fields, present};

#[derive(Deserialize)]
pub struct LoginPayload {
    pub email: Option<String>,
    pub password: Option<String>,
}

pub async fn handle_login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<Value>, ApiError> {
    let (Some(email), Some(password)) = (present(&payload.email), present(&payload.password))
    else {
        return Err(ApiError::MissingFields(missing_fields(&[
            ("email", &payload.email),
            ("password", &payload.password),
        ])));
    };

    let email = email.to_lowercase();

    // Unknown email and wrong password produce the same error; the
    // response must not reveal which check failed.
    let user = state
        .db
        .find_user_by_email(&email)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    match verify_password(password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => return Err(ApiError::InvalidCredentials),
        Err(e) => {
            tracing::error!("password verification error: {e}");
            return Err(ApiError::InvalidCredentials);
        }
    }

    let claims = Claims {
        id: user.id,
        email: user.email.clone(),
        exp: (Utc::now() + Duration::days(1)).timestamp() as usize,
    };
    let token = create_jwt(&claims).map_err(|e| {
        tracing::error!("JWT error: {e:?}");
        ApiError::Internal("Token generation failed")
    })?;

    Ok(Json(json!({
        "message": "Login successful",
        "token": token,
        "user": {
            "id": user.id,
            "name": user.name,
            "email": user.email,
            "role": user.role,
            "workType": user.work_type,
            "organization": user.organization,
            "subRole": user.sub_role,
        },
        "redirectPath": redirect_path(user.role, user.work_type),
    })))
}

/// Advisory landing-page hint; never an authorization decision.
fn redirect_path(role: Role, work_type: Option<WorkType>) -> &'static str {
    match (role, work_type) {
        (Role::Admin, _) => "/admin-dashboard",
        (Role::Employee, Some(WorkType::Office)) => "/office",
        (Role::Employee, Some(WorkType::Hybrid)) => "/hybrid",
        (Role::Employee, None) => "/employee-dashboard",
    }
}
