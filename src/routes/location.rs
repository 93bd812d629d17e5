use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::errors::ApiError;
use crate::services::geocoder::GeocodeError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ReverseGeocodeQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

/// Server-side proxy in front of the metered geocoding provider, so the
/// credentials never reach the client. Authenticated like every other
/// protected route.
pub async fn reverse_geocode(
    State(state): State<AppState>,
    Query(query): Query<ReverseGeocodeQuery>,
) -> Result<Json<Value>, ApiError> {
    let (Some(lat), Some(lng)) = (query.lat, query.lng) else {
        return Err(ApiError::Validation(
            "Latitude and longitude are required".to_string(),
        ));
    };

    let results = match state.geocoder.reverse_geocode(lat, lng).await {
        Ok(results) => results,
        Err(GeocodeError::NoResults) => {
            return Err(ApiError::Upstream(
                "No address found, enter manually".to_string(),
            ));
        }
        Err(e) => {
            warn!("reverse geocoding failed: {e}");
            return Err(ApiError::Upstream(
                "No address found, enter manually".to_string(),
            ));
        }
    };

    Ok(Json(json!({
        "responseCode": 200,
        "version": "oauth",
        "results": results,
    })))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::models::user::Role;
    use crate::test_support::{app, get_request, seed_user, send, token_for};

    #[tokio::test]
    async fn the_proxy_is_not_open_to_unauthenticated_callers() {
        let (app, _db) = app();
        let (status, _) = send(
            &app,
            get_request("/api/v1/location/reverse-geocode?lat=18.52&lng=73.85", None),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn both_coordinates_are_required() {
        let (app, db) = app();
        let user = seed_user(&db, "emp@example.com", Role::Employee, None).await;
        let token = token_for(&user);
        let (status, body) = send(
            &app,
            get_request("/api/v1/location/reverse-geocode?lat=18.52", Some(&token)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Latitude and longitude are required");
    }

    #[tokio::test]
    async fn provider_exhaustion_surfaces_the_manual_entry_hint() {
        // The test geocoder has no credentials, so every strategy fails.
        let (app, db) = app();
        let user = seed_user(&db, "emp@example.com", Role::Employee, None).await;
        let token = token_for(&user);
        let (status, body) = send(
            &app,
            get_request(
                "/api/v1/location/reverse-geocode?lat=18.52&lng=73.85",
                Some(&token),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "No address found, enter manually");
    }
}
