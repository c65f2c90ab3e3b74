//! Atlas-backed record store
//!
//! Translates the reconciler's store contract into Data API calls:
//! selection is a `find` with the direction's field-presence filter and a
//! stable `_id` sort; the write is a single `updateOne` whose filter
//! re-asserts the selection predicate alongside the id, so a lost race
//! against a concurrent invocation surfaces as zero modified documents
//! instead of a redundant write.

use atlas_data_api::AtlasClient;
use serde_json::{json, Value};
use tracing::debug;
use unicorn_reconciler::{Direction, Enrichment, Record, RecordStore, StoreError};

pub struct UnicornStore {
    client: AtlasClient,
    collection: String,
}

impl UnicornStore {
    pub fn new(client: AtlasClient, collection: &str) -> Self {
        Self {
            client,
            collection: collection.to_string(),
        }
    }
}

/// Field-presence filter selecting records still unenriched for the
/// given direction
fn selection_filter(direction: Direction) -> Value {
    match direction {
        Direction::Forward => json!({
            "coordinates": {"$exists": false},
            "name": {"$exists": true},
        }),
        Direction::Reverse => json!({
            "coordinates": {"$exists": true},
            "country": {"$exists": false},
        }),
    }
}

/// Update filter: the record's id plus the selection predicate, so the
/// store re-validates field absence atomically
fn update_filter(record: &Record, direction: Direction) -> Value {
    let mut filter = selection_filter(direction);
    filter["_id"] = record.id.raw().clone();
    filter
}

fn set_document(enrichment: &Enrichment) -> Value {
    // Enrichment serializes to exactly the fields to write; updated_at
    // becomes an RFC 3339 string
    serde_json::to_value(enrichment).expect("enrichment serializes")
}

impl RecordStore for UnicornStore {
    async fn find_unenriched(
        &self,
        direction: Direction,
    ) -> Result<Option<Record>, StoreError> {
        let document = self
            .client
            .find_one_sorted(
                &self.collection,
                selection_filter(direction),
                json!({"_id": 1}),
            )
            .await
            .map_err(|e| StoreError(e.to_string()))?;

        let Some(document) = document else {
            return Ok(None);
        };

        let record: Record = serde_json::from_value(document)
            .map_err(|e| StoreError(format!("malformed record document: {e}")))?;
        debug!(id = %record.id, %direction, "Selected record for enrichment");
        Ok(Some(record))
    }

    async fn apply_enrichment(
        &self,
        record: &Record,
        enrichment: &Enrichment,
    ) -> Result<bool, StoreError> {
        let counts = self
            .client
            .update_one(
                &self.collection,
                update_filter(record, enrichment.direction()),
                json!({"$set": set_document(enrichment)}),
            )
            .await
            .map_err(|e| StoreError(e.to_string()))?;

        Ok(counts.modified_count > 0)
    }
}
