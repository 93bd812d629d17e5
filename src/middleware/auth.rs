use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use serde_json::Value;
use uuid::Uuid;

use crate::errors::ApiError;
use crate::models::user::{Role, WorkType};
use crate::state::AppState;
use crate::utils::jwt::decode_jwt;

/// Authenticated identity attached as a request extension once the token
/// checks pass. The role is re-read from the store on every request.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub work_type: Option<WorkType>,
}

const BODY_LIMIT: usize = 1024 * 1024;

/// Accepts the token from the Authorization header (with or without the
/// `Bearer ` prefix), the `x-access-token` header, a JSON body field
/// `token`, or a `token` query parameter, in that precedence order.
/// Compatibility contract with existing clients, not a recommendation.
pub async fn authenticate(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let (parts, body) = req.into_parts();

    // The token may arrive in the body, so the body is buffered here and
    // handed back to the handler untouched.
    let bytes = to_bytes(body, BODY_LIMIT)
        .await
        .map_err(|_| ApiError::Validation("Unable to read request body".to_string()))?;

    let token = token_from_headers(&parts.headers)
        .or_else(|| token_from_body(&bytes))
        .or_else(|| token_from_query(parts.uri.query()))
        .ok_or(ApiError::AuthToken("No token provided"))?;

    let decoded = decode_jwt(&token).map_err(|_| ApiError::AuthToken("Invalid token"))?;

    let user = state
        .db
        .find_user_by_id(decoded.claims.id)
        .await?
        .ok_or(ApiError::AuthToken("User not found"))?;

    let mut req = Request::from_parts(parts, Body::from(bytes));
    req.extensions_mut().insert(CurrentUser {
        id: user.id,
        email: user.email,
        role: user.role,
        work_type: user.work_type,
    });

    Ok(next.run(req).await)
}

fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
        let token = value.strip_prefix("Bearer ").unwrap_or(value);
        return Some(token.to_string());
    }
    headers
        .get("x-access-token")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn token_from_body(bytes: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(bytes).ok()?;
    value.get("token")?.as_str().map(str::to_string)
}

fn token_from_query(query: Option<&str>) -> Option<String> {
    query?
        .split('&')
        .find_map(|pair| pair.strip_prefix("token="))
        .and_then(|raw| urlencoding::decode(raw).ok())
        .map(|decoded| decoded.into_owned())
}
