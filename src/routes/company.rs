use axum::{
    extract::{Json, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::ApiError;
use crate::models::company::NewCompany;
use crate::state::AppState;
use crate::utils::validate::{missing_fields, present, valid_coordinates};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterCompanyPayload {
    pub name: Option<String>,
    pub industry_type: Option<String>,
    #[serde(default)]
    pub business_email: Vec<String>,
    #[serde(default)]
    pub contact_nos: Vec<String>,
    pub company_size: Option<String>,
    pub full_address: Option<String>,
    #[serde(default)]
    pub work_force_type: Vec<String>,
    pub pincode: Option<String>,
    pub e_loc: Option<String>,
    pub coordinates: Option<Vec<f64>>,
}

pub async fn register_company(
    State(state): State<AppState>,
    Json(payload): Json<RegisterCompanyPayload>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let (Some(name), Some(industry_type), Some(company_size), Some(full_address)) = (
        present(&payload.name),
        present(&payload.industry_type),
        present(&payload.company_size),
        present(&payload.full_address),
    ) else {
        return Err(ApiError::MissingFields(missing_fields(&[
            ("name", &payload.name),
            ("industryType", &payload.industry_type),
            ("companySize", &payload.company_size),
            ("fullAddress", &payload.full_address),
        ])));
    };

    // Required on a list means at least one entry, not merely present.
    if payload.business_email.is_empty() {
        return Err(ApiError::Validation(
            "businessEmail must contain at least one entry".to_string(),
        ));
    }
    if payload.contact_nos.is_empty() {
        return Err(ApiError::Validation(
            "contactNos must contain at least one entry".to_string(),
        ));
    }

    let new_company = NewCompany {
        name: name.to_string(),
        industry_type: industry_type.to_string(),
        business_email: payload.business_email.clone(),
        contact_nos: payload.contact_nos.clone(),
        company_size: company_size.to_string(),
        full_address: full_address.to_string(),
        work_force_type: payload.work_force_type.clone(),
        pincode: present(&payload.pincode).map(str::to_string),
        e_loc: present(&payload.e_loc).map(str::to_string),
        coordinates: valid_coordinates(payload.coordinates.clone()),
    };

    let company = state.db.create_company(&new_company).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Company registered successfully",
            "company": company,
        })),
    ))
}
