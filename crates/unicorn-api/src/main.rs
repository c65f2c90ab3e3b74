mod config;
mod routes;
mod store;

use std::sync::Arc;

use atlas_data_api::AtlasClient;
use tracing::{error, info};
use unicorn_geocoding::NominatimClient;
use unicorn_reconciler::ReconcileSettings;

use config::Config;
use routes::{AppState, ConfigStatus};
use store::UnicornStore;

const USER_AGENT: &str = "UnicornsAPI/1.0 (geo reconciliation)";

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "unicorn_api=info".into()),
        )
        .json()
        .init();

    let config = Config::from_env();
    info!(port = config.port, "Starting unicorn-api");

    let Some(atlas_config) = config.atlas() else {
        error!("MONGODB_API_KEY and MONGODB_APP_ID must be set");
        std::process::exit(1);
    };

    let atlas = match &config.atlas_endpoint {
        Some(endpoint) => AtlasClient::with_endpoint(endpoint, atlas_config),
        None => AtlasClient::new(atlas_config),
    };

    let geocoder = NominatimClient::with_base_url_and_user_agent(&config.nominatim_url, USER_AGENT)
        .restrict_to_countries(&config.geocoder_country_codes);

    let state = Arc::new(AppState {
        store: UnicornStore::new(atlas, &config.mongodb_collection),
        geocoder,
        settings: ReconcileSettings {
            fallback_query: config.geocoder_fallback_query.clone(),
            ..ReconcileSettings::default()
        },
        status: ConfigStatus {
            api_key_set: config.mongodb_api_key.is_some(),
            app_id_set: config.mongodb_app_id.is_some(),
            cluster: config.mongodb_cluster.clone(),
        },
    });

    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .expect("Failed to bind");

    info!(port = config.port, "Listening");

    axum::serve(listener, app).await.expect("Server failed");
}
