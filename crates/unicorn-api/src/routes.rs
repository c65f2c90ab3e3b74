//! HTTP surface: health, status/debug, and the reconcile trigger

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tracing::error;
use unicorn_geocoding::NominatimClient;
use unicorn_reconciler::{
    reconcile, Direction, ReconcileError, ReconcileOutcome, ReconcileSettings,
};

use crate::store::UnicornStore;

pub const SERVICE_NAME: &str = "Unicorns API";

/// Configuration presence report for the status endpoint; values are
/// never echoed, only whether they are set
#[derive(Debug, Clone)]
pub struct ConfigStatus {
    pub api_key_set: bool,
    pub app_id_set: bool,
    pub cluster: String,
}

/// Shared state for the HTTP handlers
pub struct AppState {
    pub store: UnicornStore,
    pub geocoder: NominatimClient,
    pub settings: ReconcileSettings,
    pub status: ConfigStatus,
}

pub type SharedState = Arc<AppState>;

#[derive(Debug, Deserialize)]
struct UpdateGeoParams {
    direction: Option<Direction>,
}

/// Create the HTTP router
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/update-geo", get(status).post(update_geo))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// Status page for the update-geo endpoint: reports which configuration
/// values are present and documents how to trigger a run
async fn status(State(state): State<SharedState>) -> Json<Value> {
    let set_or_not = |set: bool| if set { "SET" } else { "NOT SET" };
    Json(json!({
        "status": "ok",
        "service": SERVICE_NAME,
        "env": {
            "MONGODB_API_KEY": set_or_not(state.status.api_key_set),
            "MONGODB_APP_ID": set_or_not(state.status.app_id_set),
            "MONGODB_CLUSTER": state.status.cluster,
        },
        "endpoints": {
            "status": "GET /api/update-geo - This page",
            "trigger": "POST /api/update-geo?direction=forward|reverse - Geocode one record",
        },
    }))
}

/// Run one reconcile call; direction defaults to reverse
async fn update_geo(
    State(state): State<SharedState>,
    Query(params): Query<UpdateGeoParams>,
) -> (StatusCode, Json<Value>) {
    let direction = params.direction.unwrap_or(Direction::Reverse);

    match reconcile(&state.store, &state.geocoder, direction, &state.settings).await {
        Ok(outcome) => outcome_response(outcome),
        Err(err) => error_response(err),
    }
}

/// Map a terminal outcome to its HTTP representation: 200 for
/// Updated/Drained/NotModified, 404 for NotFound
fn outcome_response(outcome: ReconcileOutcome) -> (StatusCode, Json<Value>) {
    match outcome {
        ReconcileOutcome::Updated { id, enrichment } => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "action": "updated",
                "id": id,
                "fields": enrichment,
            })),
        ),
        ReconcileOutcome::Drained => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "action": "none",
                "message": "No records need geocoding",
            })),
        ),
        ReconcileOutcome::NotModified { id } => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "action": "not_modified",
                "id": id,
                "message": "Record was modified concurrently",
            })),
        ),
        ReconcileOutcome::NotFound { query } => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "success": false,
                "error": "Location not found",
                "query": query,
            })),
        ),
    }
}

fn error_response(err: ReconcileError) -> (StatusCode, Json<Value>) {
    error!(error = %err, "Reconcile failed");
    let (kind, context, message) = match err {
        ReconcileError::Provider { context, message } => ("provider", context, message),
        ReconcileError::Store { context, message } => ("store", context, message),
    };
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "success": false,
            "error": message,
            "failed": kind,
            "context": context,
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_data_api::{AtlasClient, AtlasConfig};
    use axum::body::Body;
    use axum::http::{Method, Request};
    use tower::ServiceExt;
    use unicorn_reconciler::{Enrichment, ReverseEnrichment};

    fn test_state() -> SharedState {
        // Endpoint points at a closed local port; tests that reach the
        // store see a fast transport error
        let atlas = AtlasClient::with_endpoint(
            "http://127.0.0.1:9/data/v1",
            AtlasConfig {
                app_id: "data-test".to_string(),
                api_key: "test-key".to_string(),
                data_source: "Cluster0".to_string(),
                database: "unicorns".to_string(),
            },
        );
        Arc::new(AppState {
            store: UnicornStore::new(atlas, "unicorns"),
            geocoder: NominatimClient::new(),
            settings: ReconcileSettings::default(),
            status: ConfigStatus {
                api_key_set: true,
                app_id_set: false,
                cluster: "Cluster0".to_string(),
            },
        })
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let router = create_router(test_state());
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["service"], "Unicorns API");
        assert!(json["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_status_endpoint_reports_config_presence() {
        let router = create_router(test_state());
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/update-geo")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["env"]["MONGODB_API_KEY"], "SET");
        assert_eq!(json["env"]["MONGODB_APP_ID"], "NOT SET");
        assert_eq!(json["env"]["MONGODB_CLUSTER"], "Cluster0");
    }

    #[tokio::test]
    async fn test_wrong_method_is_405() {
        let router = create_router(test_state());
        let response = router
            .oneshot(
                Request::builder()
                    .method(Method::DELETE)
                    .uri("/api/update-geo")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_post_with_unreachable_store_is_500() {
        let router = create_router(test_state());
        let response = router
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/update-geo")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["failed"], "store");
        assert!(json["context"]
            .as_str()
            .unwrap()
            .contains("find reverse candidate"));
    }

    #[test]
    fn test_outcome_response_updated_is_200() {
        let enrichment = Enrichment::Reverse(ReverseEnrichment {
            country: "Afghanistan".to_string(),
            town: "Kabul".to_string(),
            full_address: "Kabul, Afghanistan".to_string(),
            reverse_geocoded: true,
            source: "nominatim".to_string(),
            updated_at: Utc::now(),
        });
        let (status, Json(body)) = outcome_response(ReconcileOutcome::Updated {
            id: "u1".to_string(),
            enrichment,
        });

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["action"], "updated");
        assert_eq!(body["id"], "u1");
        assert_eq!(body["fields"]["country"], "Afghanistan");
        assert_eq!(body["fields"]["reverse_geocoded"], true);
    }

    #[test]
    fn test_outcome_response_drained_is_200() {
        let (status, Json(body)) = outcome_response(ReconcileOutcome::Drained);
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["action"], "none");
    }

    #[test]
    fn test_outcome_response_not_modified_is_200() {
        let (status, Json(body)) = outcome_response(ReconcileOutcome::NotModified {
            id: "u1".to_string(),
        });
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["action"], "not_modified");
    }

    #[test]
    fn test_outcome_response_not_found_is_404() {
        let (status, Json(body)) = outcome_response(ReconcileOutcome::NotFound {
            query: "forest".to_string(),
        });
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["query"], "forest");
    }

    #[test]
    fn test_error_response_provider_is_500() {
        let (status, Json(body)) = error_response(ReconcileError::Provider {
            context: "reverse lookup 34.5,69.2".to_string(),
            message: "timed out".to_string(),
        });
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["failed"], "provider");
        assert_eq!(body["error"], "timed out");
        assert_eq!(body["context"], "reverse lookup 34.5,69.2");
    }
}
