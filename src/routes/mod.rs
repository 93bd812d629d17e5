pub mod auth;
pub mod company;
pub mod location;
pub mod task;

use axum::{
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};

use crate::middleware::auth::authenticate;
use crate::state::AppState;

pub fn api_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/task/assign", post(task::create_task))
        .route("/task", get(task::get_all_tasks))
        .route(
            "/task/{id}",
            get(task::get_task_by_id).delete(task::delete_task),
        )
        .route("/task/{id}/status", put(task::update_task_status))
        .route("/task/{id}/assignee", put(task::set_task_assignee))
        .route("/location/reverse-geocode", get(location::reverse_geocode))
        .route_layer(middleware::from_fn_with_state(state.clone(), authenticate));

    let api = Router::new()
        .route("/", get(root))
        .route("/auth/signup", post(auth::handle_signup))
        .route("/auth/login", post(auth::handle_login))
        .route("/company/register", post(company::register_company))
        .merge(protected);

    Router::new().nest("/api/v1", api).with_state(state)
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Workcrew API is running" }))
}
