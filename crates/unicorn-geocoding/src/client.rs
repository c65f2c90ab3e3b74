use std::time::Duration;

use moka::future::Cache;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::error::GeocodeError;
use crate::types::{ForwardPlace, ReversePlace, ReverseResponse, SearchResult};

const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";
const DEFAULT_USER_AGENT: &str = "UnicornsAPI/1.0 (geo reconciliation)";
const REQUEST_TIMEOUT_SECS: u64 = 10;
const CACHE_TTL_SECS: u64 = 86400; // 24 hours

/// Nominatim client for forward search and reverse lookup, with rate
/// limiting and caching
pub struct NominatimClient {
    client: reqwest::Client,
    base_url: String,
    /// Optional comma-separated ISO country codes passed to `/search`
    country_codes: Option<String>,
    reverse_cache: Cache<String, Option<ReversePlace>>,
    forward_cache: Cache<String, Option<ForwardPlace>>,
    /// Semaphore to enforce 1 request/second rate limit
    rate_limiter: Semaphore,
}

impl NominatimClient {
    /// Create a new client with default settings
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a new client with a custom Nominatim URL
    pub fn with_base_url(base_url: &str) -> Self {
        Self::with_base_url_and_user_agent(base_url, DEFAULT_USER_AGENT)
    }

    /// Create a new client with a custom Nominatim URL and user agent
    pub fn with_base_url_and_user_agent(base_url: &str, user_agent: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(user_agent)
            .build()
            .expect("Failed to create HTTP client");

        let reverse_cache = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(Duration::from_secs(CACHE_TTL_SECS))
            .build();
        let forward_cache = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(Duration::from_secs(CACHE_TTL_SECS))
            .build();

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            country_codes: None,
            reverse_cache,
            forward_cache,
            rate_limiter: Semaphore::new(1),
        }
    }

    /// Restrict forward search results to the given comma-separated ISO
    /// 3166-1 alpha-2 country codes (e.g. `"af"` or `"de,at,ch"`)
    pub fn restrict_to_countries(mut self, codes: &str) -> Self {
        if !codes.trim().is_empty() {
            self.country_codes = Some(codes.trim().to_string());
        }
        self
    }

    /// Forward geocode a free-text query to the best-ranked place.
    ///
    /// Returns `Ok(None)` when Nominatim has no answer for the query.
    pub async fn forward_search(&self, query: &str) -> crate::Result<Option<ForwardPlace>> {
        let cache_key = match &self.country_codes {
            Some(codes) => format!("{}@{}", query, codes),
            None => query.to_string(),
        };

        if let Some(cached) = self.forward_cache.get(&cache_key).await {
            return Ok(cached);
        }

        // Rate limit: acquire permit, then wait 1 second after the request
        let _permit = self.rate_limiter.acquire().await.unwrap();

        let url = search_url(&self.base_url, query, self.country_codes.as_deref());
        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(GeocodeError::Http)?;

        if !response.status().is_success() {
            return Err(GeocodeError::Api(format!(
                "Nominatim returned status {}",
                response.status()
            )));
        }

        let results: Vec<SearchResult> = response.json().await.map_err(GeocodeError::Http)?;
        let place = best_search_hit(results)?;

        if place.is_none() {
            debug!(query, "No forward geocoding result");
        }

        self.forward_cache.insert(cache_key, place.clone()).await;

        // Delay to respect rate limit (1 req/sec)
        tokio::time::sleep(Duration::from_millis(1100)).await;

        Ok(place)
    }

    /// Reverse geocode coordinates to address components.
    ///
    /// Returns `Ok(None)` when Nominatim answers with an explicit error
    /// payload (e.g. a point in the open ocean it cannot geocode).
    pub async fn reverse_lookup(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> crate::Result<Option<ReversePlace>> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(GeocodeError::InvalidCoordinates(latitude, longitude));
        }

        // Round to 6 decimal places for cache key (~0.1m precision)
        let cache_key = format!("{:.6},{:.6}", latitude, longitude);

        if let Some(cached) = self.reverse_cache.get(&cache_key).await {
            return Ok(cached);
        }

        // Rate limit: acquire permit, then wait 1 second after the request
        let _permit = self.rate_limiter.acquire().await.unwrap();

        let url = format!(
            "{}/reverse?lat={}&lon={}&format=json&addressdetails=1&zoom=18",
            self.base_url, latitude, longitude
        );

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(GeocodeError::Http)?;

        if !response.status().is_success() {
            return Err(GeocodeError::Api(format!(
                "Nominatim returned status {}",
                response.status()
            )));
        }

        let data: ReverseResponse = response.json().await.map_err(GeocodeError::Http)?;

        let place = match data.error {
            Some(err) => {
                warn!(lat = latitude, lon = longitude, error = %err, "Nominatim returned error");
                None
            }
            None => Some(ReversePlace {
                display_name: data.display_name.unwrap_or_default(),
                address: data.address.unwrap_or_default(),
            }),
        };

        if let Some(ref p) = place {
            debug!(
                lat = latitude,
                lon = longitude,
                country = p.address.country.as_deref().unwrap_or("unknown"),
                "Reverse geocoded coordinates"
            );
        }

        self.reverse_cache.insert(cache_key, place.clone()).await;

        // Delay to respect rate limit (1 req/sec)
        tokio::time::sleep(Duration::from_millis(1100)).await;

        Ok(place)
    }
}

impl Default for NominatimClient {
    fn default() -> Self {
        Self::new()
    }
}

fn search_url(base_url: &str, query: &str, country_codes: Option<&str>) -> String {
    let mut url = format!(
        "{}/search?q={}&format=json&limit=1&addressdetails=0",
        base_url,
        urlencoding::encode(query)
    );
    if let Some(codes) = country_codes {
        url.push_str(&format!("&countrycodes={}", urlencoding::encode(codes)));
    }
    url
}

/// Take the best-ranked search result and parse its string coordinates
fn best_search_hit(results: Vec<SearchResult>) -> crate::Result<Option<ForwardPlace>> {
    let Some(first) = results.into_iter().next() else {
        return Ok(None);
    };

    let latitude: f64 = first
        .lat
        .parse()
        .map_err(|_| GeocodeError::Api(format!("non-numeric latitude: {}", first.lat)))?;
    let longitude: f64 = first
        .lon
        .parse()
        .map_err(|_| GeocodeError::Api(format!("non-numeric longitude: {}", first.lon)))?;

    Ok(Some(ForwardPlace {
        latitude,
        longitude,
        display_name: first.display_name,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_url_encodes_query() {
        let url = search_url("https://nominatim.example", "misty forest", None);
        assert_eq!(
            url,
            "https://nominatim.example/search?q=misty%20forest&format=json&limit=1&addressdetails=0"
        );
    }

    #[test]
    fn test_search_url_with_country_codes() {
        let url = search_url("https://nominatim.example", "forest", Some("af"));
        assert!(url.ends_with("&countrycodes=af"));
    }

    #[test]
    fn test_best_search_hit_empty() {
        assert_eq!(best_search_hit(vec![]).unwrap(), None);
    }

    #[test]
    fn test_best_search_hit_parses_coordinates() {
        let results = vec![
            SearchResult {
                lat: "34.5553".to_string(),
                lon: "69.2075".to_string(),
                display_name: "Kabul, Afghanistan".to_string(),
            },
            SearchResult {
                lat: "0".to_string(),
                lon: "0".to_string(),
                display_name: "should be ignored".to_string(),
            },
        ];

        let place = best_search_hit(results).unwrap().unwrap();
        assert_eq!(place.latitude, 34.5553);
        assert_eq!(place.longitude, 69.2075);
        assert_eq!(place.display_name, "Kabul, Afghanistan");
    }

    #[test]
    fn test_best_search_hit_rejects_non_numeric() {
        let results = vec![SearchResult {
            lat: "north".to_string(),
            lon: "69.2".to_string(),
            display_name: "bad".to_string(),
        }];
        assert!(best_search_hit(results).is_err());
    }

    #[test]
    fn test_reverse_response_with_error_payload() {
        let data: ReverseResponse =
            serde_json::from_str(r#"{"error": "Unable to geocode"}"#).unwrap();
        assert_eq!(data.error.as_deref(), Some("Unable to geocode"));
        assert!(data.address.is_none());
    }

    #[test]
    fn test_reverse_response_with_address() {
        let data: ReverseResponse = serde_json::from_str(
            r#"{
                "display_name": "Kabul, Kabul Province, Afghanistan",
                "address": {"city": "Kabul", "state": "Kabul Province", "country": "Afghanistan"}
            }"#,
        )
        .unwrap();
        let addr = data.address.unwrap();
        assert_eq!(addr.city.as_deref(), Some("Kabul"));
        assert_eq!(addr.country.as_deref(), Some("Afghanistan"));
    }

    #[tokio::test]
    async fn test_reverse_lookup_rejects_invalid_coordinates() {
        let client = NominatimClient::new();
        let err = client.reverse_lookup(123.0, 500.0).await.unwrap_err();
        assert!(matches!(err, GeocodeError::InvalidCoordinates(_, _)));
    }
}
