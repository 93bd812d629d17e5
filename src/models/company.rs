use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub industry_type: String,
    pub business_email: Vec<String>,
    pub contact_nos: Vec<String>,
    pub company_size: String,
    pub full_address: String,
    pub work_force_type: Vec<String>,
    pub pincode: Option<String>,
    pub e_loc: Option<String>,
    pub coordinates: Option<Vec<f64>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCompany {
    pub name: String,
    pub industry_type: String,
    pub business_email: Vec<String>,
    pub contact_nos: Vec<String>,
    pub company_size: String,
    pub full_address: String,
    pub work_force_type: Vec<String>,
    pub pincode: Option<String>,
    pub e_loc: Option<String>,
    pub coordinates: Option<Vec<f64>>,
}
