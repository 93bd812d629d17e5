use axum::{
    extract::{Json, State},
    http::StatusCode,
};
use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::ApiError;
use crate::models::user::{NewUser, Role, WorkType};
use crate::routes::auth::claims::Claims;
use crate::state::AppState;
use crate::utils::jwt::create_jwt;
use crate::utils::password::hash_password;
use crate::utils::validate::{missing_fields, present, valid_coordinates};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupPayload {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub organization: Option<String>,
    pub sub_role: Option<String>,
    pub work_type: Option<String>,
    pub full_address: Option<String>,
    pub pincode: Option<String>,
    pub e_loc: Option<String>,
    pub coordinates: Option<Vec<f64>>,
    #[serde(default)]
    pub skills: Vec<String>,
}

pub async fn handle_signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupPayload>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let (Some(name), Some(email), Some(password), Some(role_raw), Some(organization)) = (
        present(&payload.name),
        present(&payload.email),
        present(&payload.password),
        present(&payload.role),
        present(&payload.organization),
    ) else {
        return Err(ApiError::MissingFields(missing_fields(&[
            ("name", &payload.name),
            ("email", &payload.email),
            ("password", &payload.password),
            ("role", &payload.role),
            ("organization", &payload.organization),
        ])));
    };

    let role =
        Role::parse(role_raw).ok_or_else(|| ApiError::Validation("Invalid role".to_string()))?;
    let work_type = match present(&payload.work_type) {
        Some(raw) => Some(
            WorkType::parse(raw)
                .ok_or_else(|| ApiError::Validation("Invalid workType".to_string()))?,
        ),
        None => None,
    };

    // Stored lowercased so uniqueness is case-insensitive.
    let email = email.to_lowercase();

    if state.db.is_email_taken(&email).await? {
        return Err(ApiError::DuplicateEmail);
    }

    let password_hash = hash_password(password).map_err(|e| {
        tracing::error!("password hashing failed: {e}");
        ApiError::Internal("Password hashing failed")
    })?;

    // Location details only apply to employees; admin signups drop them.
    let is_employee = role == Role::Employee;
    let new_user = NewUser {
        name: name.to_string(),
        email,
        password_hash,
        role,
        organization: organization.to_string(),
        sub_role: present(&payload.sub_role).map(str::to_string),
        work_type,
        full_address: is_employee
            .then(|| present(&payload.full_address).map(str::to_string))
            .flatten(),
        pincode: is_employee
            .then(|| present(&payload.pincode).map(str::to_string))
            .flatten(),
        e_loc: is_employee
            .then(|| present(&payload.e_loc).map(str::to_string))
            .flatten(),
        coordinates: is_employee
            .then(|| valid_coordinates(payload.coordinates.clone()))
            .flatten(),
        skills: payload.skills.clone(),
    };

    let user = match state.db.create_user(&new_user).await {
        Ok(user) => user,
        // The unique index closes the check-then-insert race.
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            return Err(ApiError::DuplicateEmail);
        }
        Err(e) => return Err(e.into()),
    };

    let claims = Claims {
        id: user.id,
        email: user.email.clone(),
        exp: (Utc::now() + Duration::days(1)).timestamp() as usize,
    };
    let token = create_jwt(&claims).map_err(|e| {
        tracing::error!("JWT error: {e:?}");
        ApiError::Internal("Token generation failed")
    })?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Signup successful",
            "token": token,
            "user": user,
        })),
    ))
}
