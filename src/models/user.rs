use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{prelude::Type, FromRow};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "user_role")]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Employee,
}

impl Role {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "admin" => Some(Role::Admin),
            "employee" => Some(Role::Employee),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "work_type")]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum WorkType {
    Office,
    Hybrid,
}

impl WorkType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "office" => Some(WorkType::Office),
            "hybrid" => Some(WorkType::Hybrid),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub organization: String,
    pub sub_role: Option<String>,
    pub work_type: Option<WorkType>,
    pub full_address: Option<String>,
    pub pincode: Option<String>,
    pub e_loc: Option<String>,
    pub coordinates: Option<Vec<f64>>,
    pub skills: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated signup data handed to the repository. The email is already
/// lowercased and the password hashed by the time this is built.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub organization: String,
    pub sub_role: Option<String>,
    pub work_type: Option<WorkType>,
    pub full_address: Option<String>,
    pub pincode: Option<String>,
    pub e_loc: Option<String>,
    pub coordinates: Option<Vec<f64>>,
    pub skills: Vec<String>,
}
