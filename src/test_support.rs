//! Shared helpers for route-level tests: an app wired to the in-memory
//! repository, request builders, and seed data.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use once_cell::sync::Lazy;
use serde_json::Value;
use tower::ServiceExt;

use crate::db::mock_db::MockDb;
use crate::db::repository::Repository;
use crate::models::user::{NewUser, Role, User, WorkType};
use crate::routes::api_router;
use crate::routes::auth::claims::Claims;
use crate::services::geocoder::{GeocodeConfig, Geocoder, TokenCache};
use crate::state::AppState;
use crate::utils::jwt::create_jwt;
use crate::utils::password::hash_password;

static JWT_ENV: Lazy<()> = Lazy::new(|| {
    std::env::set_var("JWT_SECRET", "test-secret");
});

pub fn init_env() {
    Lazy::force(&JWT_ENV);
}

/// Router over a fresh in-memory repository. The geocoder points at an
/// unroutable address with no credentials, so every strategy fails fast.
pub fn app() -> (Router, Arc<MockDb>) {
    init_env();
    let db = Arc::new(MockDb::default());
    let state = AppState {
        db: db.clone(),
        geocoder: Arc::new(Geocoder::new(
            GeocodeConfig {
                client_id: None,
                client_secret: None,
                api_key: None,
                oauth_token_url: "http://127.0.0.1:9/token".to_string(),
                atlas_base_url: "http://127.0.0.1:9".to_string(),
                fallback_base_url: "http://127.0.0.1:9".to_string(),
            },
            TokenCache::new(),
        )),
    };
    (api_router(state), db)
}

/// All seeded users share the password "password123".
pub async fn seed_user(
    db: &MockDb,
    email: &str,
    role: Role,
    work_type: Option<WorkType>,
) -> User {
    db.create_user(&NewUser {
        name: "Test User".to_string(),
        email: email.to_string(),
        password_hash: hash_password("password123").unwrap(),
        role,
        organization: "Acme".to_string(),
        sub_role: None,
        work_type,
        full_address: None,
        pincode: None,
        e_loc: None,
        coordinates: None,
        skills: vec![],
    })
    .await
    .unwrap()
}

pub fn token_for(user: &User) -> String {
    init_env();
    let claims = Claims {
        id: user.id,
        email: user.email.clone(),
        exp: (Utc::now() + Duration::days(1)).timestamp() as usize,
    };
    create_jwt(&claims).unwrap()
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

/// Drives one request through the router and parses the JSON body.
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}
