//! The single-record reconciliation step

use chrono::Utc;
use tracing::{debug, info, warn};
use unicorn_geocoding::{ForwardPlace, ReverseAddress, ReversePlace};

use crate::error::{ProviderError, ReconcileError, StoreError};
use crate::types::{Direction, Enrichment, ForwardEnrichment, Record, ReverseEnrichment};

/// Written as the town when no address component resolves
pub const UNKNOWN_TOWN: &str = "Unknown location";
/// Written as the country when no address component resolves; a record
/// must always converge out of the backlog once geocoded
pub const UNKNOWN_COUNTRY: &str = "Unknown";

/// Backing document store for unicorn records
#[allow(async_fn_in_trait)]
pub trait RecordStore {
    /// Find the one record next in line for the given direction, in
    /// stable ascending identifier order. `None` means the backlog for
    /// this direction is drained.
    async fn find_unenriched(&self, direction: Direction)
        -> Result<Option<Record>, StoreError>;

    /// Apply the enrichment to the record with a single conditional
    /// update. Returns whether a record was actually modified; `false`
    /// signals a lost race or identifier mismatch.
    async fn apply_enrichment(
        &self,
        record: &Record,
        enrichment: &Enrichment,
    ) -> Result<bool, StoreError>;
}

/// Geocoding service the reconciler resolves against
#[allow(async_fn_in_trait)]
pub trait GeocodingProvider {
    /// Resolve free text to the best-ranked place, `None` when the
    /// provider has no answer
    async fn forward_search(&self, query: &str) -> Result<Option<ForwardPlace>, ProviderError>;

    /// Resolve coordinates to address components, `None` when the
    /// provider reports it cannot geocode the point
    async fn reverse_lookup(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<ReversePlace>, ProviderError>;
}

/// Tunables for a reconcile call
#[derive(Debug, Clone)]
pub struct ReconcileSettings {
    /// Forward query used when a record has neither habitat nor city
    pub fallback_query: String,
    /// Value written to the record's `source` field
    pub source: String,
}

impl Default for ReconcileSettings {
    fn default() -> Self {
        Self {
            fallback_query: "forest".to_string(),
            source: "nominatim".to_string(),
        }
    }
}

/// Terminal outcome of one reconcile call
#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileOutcome {
    /// One record was enriched and left the backlog
    Updated { id: String, enrichment: Enrichment },
    /// No record matched the selection predicate; nothing left to do
    Drained,
    /// The provider had no answer for the attempted query; no mutation
    NotFound { query: String },
    /// The conditional update matched nothing (lost race); no record
    /// left the backlog
    NotModified { id: String },
}

/// Process at most one record: select, resolve, write back.
///
/// Stateless per call and never retried internally; callers decide
/// whether to call again. Every `Updated` outcome shrinks the backlog for
/// `direction` by exactly one record.
pub async fn reconcile<S, P>(
    store: &S,
    provider: &P,
    direction: Direction,
    settings: &ReconcileSettings,
) -> Result<ReconcileOutcome, ReconcileError>
where
    S: RecordStore,
    P: GeocodingProvider,
{
    let candidate = store
        .find_unenriched(direction)
        .await
        .map_err(|e| ReconcileError::Store {
            context: format!("find {direction} candidate"),
            message: e.0,
        })?;

    let Some(record) = candidate else {
        debug!(%direction, "Backlog drained");
        return Ok(ReconcileOutcome::Drained);
    };

    let enrichment = match direction {
        Direction::Forward => {
            let query = record
                .habitat
                .clone()
                .or_else(|| record.city.clone())
                .unwrap_or_else(|| settings.fallback_query.clone());

            let hit = provider
                .forward_search(&query)
                .await
                .map_err(|e| ReconcileError::Provider {
                    context: format!("forward search {query:?}"),
                    message: e.0,
                })?;

            let Some(hit) = hit else {
                info!(id = %record.id, query = %query, "No forward geocoding result");
                return Ok(ReconcileOutcome::NotFound { query });
            };

            Enrichment::Forward(ForwardEnrichment {
                coordinates: [hit.longitude, hit.latitude],
                display_name: hit.display_name,
                source: settings.source.clone(),
                updated_at: Utc::now(),
            })
        }
        Direction::Reverse => {
            let Some([longitude, latitude]) = record.coordinates else {
                // The predicate guarantees coordinates; a record without
                // them here means the store handed back malformed data.
                return Err(ReconcileError::Store {
                    context: format!("record {}", record.id),
                    message: "selected for reverse geocoding but has no coordinates".to_string(),
                });
            };
            let query = format!("{latitude},{longitude}");

            let place = provider
                .reverse_lookup(latitude, longitude)
                .await
                .map_err(|e| ReconcileError::Provider {
                    context: format!("reverse lookup {query}"),
                    message: e.0,
                })?;

            let Some(place) = place else {
                info!(id = %record.id, coordinates = %query, "No reverse geocoding result");
                return Ok(ReconcileOutcome::NotFound { query });
            };

            Enrichment::Reverse(ReverseEnrichment {
                country: resolve_country(&place.address),
                town: resolve_town(&place.address),
                full_address: place.display_name,
                reverse_geocoded: true,
                source: settings.source.clone(),
                updated_at: Utc::now(),
            })
        }
    };

    let modified = store
        .apply_enrichment(&record, &enrichment)
        .await
        .map_err(|e| ReconcileError::Store {
            context: format!("update record {}", record.id),
            message: e.0,
        })?;

    let id = record.id.to_string();
    if modified {
        info!(%id, %direction, "Record enriched");
        Ok(ReconcileOutcome::Updated { id, enrichment })
    } else {
        warn!(%id, %direction, "Update matched no record");
        Ok(ReconcileOutcome::NotModified { id })
    }
}

/// Country fallback chain: country, then state, then region. The literal
/// `"Unknown"` keeps the record out of the reverse backlog afterwards.
fn resolve_country(address: &ReverseAddress) -> String {
    address
        .country
        .clone()
        .or_else(|| address.state.clone())
        .or_else(|| address.region.clone())
        .unwrap_or_else(|| UNKNOWN_COUNTRY.to_string())
}

/// Town fallback chain: city, town, village, municipality, county, state,
/// then the literal `"Unknown location"`
fn resolve_town(address: &ReverseAddress) -> String {
    address
        .city
        .clone()
        .or_else(|| address.town.clone())
        .or_else(|| address.village.clone())
        .or_else(|| address.municipality.clone())
        .or_else(|| address.county.clone())
        .or_else(|| address.state.clone())
        .unwrap_or_else(|| UNKNOWN_TOWN.to_string())
}
