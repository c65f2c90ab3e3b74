use std::env;

use atlas_data_api::AtlasConfig;

/// Application configuration parsed from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub mongodb_api_key: Option<String>,
    pub mongodb_app_id: Option<String>,
    pub mongodb_cluster: String,
    pub mongodb_database: String,
    pub mongodb_collection: String,
    /// Override for the derived Data API endpoint (self-hosted / tests)
    pub atlas_endpoint: Option<String>,
    pub nominatim_url: String,
    /// Comma-separated country codes restricting forward search; empty
    /// disables the restriction
    pub geocoder_country_codes: String,
    /// Forward query used when a record carries no locality hint
    pub geocoder_fallback_query: String,
}

impl Config {
    /// Parse configuration from environment variables
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let mongodb_api_key = env::var("MONGODB_API_KEY").ok();
        let mongodb_app_id = env::var("MONGODB_APP_ID").ok();
        let mongodb_cluster =
            env::var("MONGODB_CLUSTER").unwrap_or_else(|_| "Cluster0".to_string());
        let mongodb_database =
            env::var("MONGODB_DATABASE").unwrap_or_else(|_| "unicorns".to_string());
        let mongodb_collection =
            env::var("MONGODB_COLLECTION").unwrap_or_else(|_| "unicorns".to_string());
        let atlas_endpoint = env::var("ATLAS_ENDPOINT").ok();

        let nominatim_url = env::var("NOMINATIM_URL")
            .unwrap_or_else(|_| "https://nominatim.openstreetmap.org".to_string());
        let geocoder_country_codes =
            env::var("GEOCODER_COUNTRY_CODES").unwrap_or_else(|_| "af".to_string());
        let geocoder_fallback_query =
            env::var("GEOCODER_FALLBACK_QUERY").unwrap_or_else(|_| "forest".to_string());

        Self {
            port,
            mongodb_api_key,
            mongodb_app_id,
            mongodb_cluster,
            mongodb_database,
            mongodb_collection,
            atlas_endpoint,
            nominatim_url,
            geocoder_country_codes,
            geocoder_fallback_query,
        }
    }

    /// Atlas connection settings; `None` until both credentials are set
    pub fn atlas(&self) -> Option<AtlasConfig> {
        Some(AtlasConfig {
            app_id: self.mongodb_app_id.clone()?,
            api_key: self.mongodb_api_key.clone()?,
            data_source: self.mongodb_cluster.clone(),
            database: self.mongodb_database.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_config() -> Config {
        Config {
            port: 3000,
            mongodb_api_key: None,
            mongodb_app_id: None,
            mongodb_cluster: "Cluster0".to_string(),
            mongodb_database: "unicorns".to_string(),
            mongodb_collection: "unicorns".to_string(),
            atlas_endpoint: None,
            nominatim_url: "https://nominatim.openstreetmap.org".to_string(),
            geocoder_country_codes: "af".to_string(),
            geocoder_fallback_query: "forest".to_string(),
        }
    }

    #[test]
    fn test_atlas_requires_both_credentials() {
        let mut config = bare_config();
        assert!(config.atlas().is_none());

        config.mongodb_app_id = Some("data-abcde".to_string());
        assert!(config.atlas().is_none());

        config.mongodb_api_key = Some("secret".to_string());
        let atlas = config.atlas().unwrap();
        assert_eq!(atlas.app_id, "data-abcde");
        assert_eq!(atlas.data_source, "Cluster0");
        assert_eq!(atlas.database, "unicorns");
    }
}
