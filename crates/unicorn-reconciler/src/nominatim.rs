//! Real geocoding provider backed by the Nominatim client

use unicorn_geocoding::{ForwardPlace, NominatimClient, ReversePlace};

use crate::error::ProviderError;
use crate::reconcile::GeocodingProvider;

impl GeocodingProvider for NominatimClient {
    async fn forward_search(&self, query: &str) -> Result<Option<ForwardPlace>, ProviderError> {
        NominatimClient::forward_search(self, query)
            .await
            .map_err(ProviderError::from)
    }

    async fn reverse_lookup(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<ReversePlace>, ProviderError> {
        NominatimClient::reverse_lookup(self, latitude, longitude)
            .await
            .map_err(ProviderError::from)
    }
}
