use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Which half of the geocoding backlog a reconcile call works on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Free-text locality hint to coordinates
    Forward,
    /// Coordinates to country / town / full address
    Reverse,
}

impl Direction {
    /// Selection predicate: does this record still need enrichment for
    /// this direction?
    pub fn is_eligible(self, record: &Record) -> bool {
        match self {
            Direction::Forward => record.coordinates.is_none() && record.name.is_some(),
            Direction::Reverse => record.coordinates.is_some() && record.country.is_none(),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => write!(f, "forward"),
            Direction::Reverse => write!(f, "reverse"),
        }
    }
}

/// Opaque record identifier.
///
/// Documents come back from the store with `_id` either as a plain string
/// or as an extended JSON `{"$oid": "..."}` object. The raw value is kept
/// verbatim so update filters can pass it straight back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub Value);

impl RecordId {
    pub fn raw(&self) -> &Value {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Value::String(s) => write!(f, "{s}"),
            Value::Object(map) => match map.get("$oid").and_then(Value::as_str) {
                Some(oid) => write!(f, "{oid}"),
                None => write!(f, "{}", self.0),
            },
            other => write!(f, "{other}"),
        }
    }
}

/// One unicorn document as stored in the collection.
///
/// Coordinates are `[longitude, latitude]`. Everything except the id is
/// optional; which fields are present determines which direction's backlog
/// the record belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub name: Option<String>,
    pub coordinates: Option<[f64; 2]>,
    /// Free-text locality hints used as the forward search query
    pub habitat: Option<String>,
    pub city: Option<String>,
    // Enrichment fields, written by reconcile
    pub country: Option<String>,
    pub town: Option<String>,
    pub full_address: Option<String>,
    pub display_name: Option<String>,
    pub source: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
    pub reverse_geocoded: Option<bool>,
}

impl Record {
    /// A bare record with just an id, for building test fixtures and
    /// fresh documents
    pub fn new(id: impl Into<Value>) -> Self {
        Self {
            id: RecordId(id.into()),
            name: None,
            coordinates: None,
            habitat: None,
            city: None,
            country: None,
            town: None,
            full_address: None,
            display_name: None,
            source: None,
            updated_at: None,
            reverse_geocoded: None,
        }
    }
}

/// Fields written back by a successful forward resolve
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForwardEnrichment {
    /// `[longitude, latitude]`
    pub coordinates: [f64; 2],
    pub display_name: String,
    pub source: String,
    pub updated_at: DateTime<Utc>,
}

/// Fields written back by a successful reverse resolve
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReverseEnrichment {
    pub country: String,
    pub town: String,
    pub full_address: String,
    pub reverse_geocoded: bool,
    pub source: String,
    pub updated_at: DateTime<Utc>,
}

/// The enrichment payload a reconcile call produced for one record
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Enrichment {
    Forward(ForwardEnrichment),
    Reverse(ReverseEnrichment),
}

impl Enrichment {
    pub fn direction(&self) -> Direction {
        match self {
            Enrichment::Forward(_) => Direction::Forward,
            Enrichment::Reverse(_) => Direction::Reverse,
        }
    }

    /// Apply this enrichment to an in-memory record (mirrors what the
    /// store's `$set` does server-side)
    pub fn apply_to(&self, record: &mut Record) {
        match self {
            Enrichment::Forward(e) => {
                record.coordinates = Some(e.coordinates);
                record.display_name = Some(e.display_name.clone());
                record.source = Some(e.source.clone());
                record.updated_at = Some(e.updated_at);
            }
            Enrichment::Reverse(e) => {
                record.country = Some(e.country.clone());
                record.town = Some(e.town.clone());
                record.full_address = Some(e.full_address.clone());
                record.reverse_geocoded = Some(e.reverse_geocoded);
                record.source = Some(e.source.clone());
                record.updated_at = Some(e.updated_at);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_id_display_plain_string() {
        let id = RecordId(json!("unicorn-7"));
        assert_eq!(id.to_string(), "unicorn-7");
    }

    #[test]
    fn test_record_id_display_extended_json_oid() {
        let id = RecordId(json!({"$oid": "65f2a0c8e4b0d1a2b3c4d5e6"}));
        assert_eq!(id.to_string(), "65f2a0c8e4b0d1a2b3c4d5e6");
    }

    #[test]
    fn test_record_deserializes_with_missing_fields() {
        let record: Record = serde_json::from_value(json!({
            "_id": {"$oid": "65f2a0c8e4b0d1a2b3c4d5e6"},
            "name": "Stormhoof",
            "coordinates": [69.2075, 34.5553]
        }))
        .unwrap();

        assert_eq!(record.name.as_deref(), Some("Stormhoof"));
        assert_eq!(record.coordinates, Some([69.2075, 34.5553]));
        assert!(record.country.is_none());
        assert!(record.reverse_geocoded.is_none());
    }

    #[test]
    fn test_forward_eligibility() {
        let mut record = Record::new("u1");
        record.name = Some("Stormhoof".to_string());
        assert!(Direction::Forward.is_eligible(&record));
        assert!(!Direction::Reverse.is_eligible(&record));

        record.coordinates = Some([1.0, 2.0]);
        assert!(!Direction::Forward.is_eligible(&record));
        assert!(Direction::Reverse.is_eligible(&record));
    }

    #[test]
    fn test_reverse_eligibility_requires_missing_country() {
        let mut record = Record::new("u1");
        record.coordinates = Some([1.0, 2.0]);
        record.country = Some("Afghanistan".to_string());
        assert!(!Direction::Reverse.is_eligible(&record));
    }

    #[test]
    fn test_nameless_record_not_eligible_forward() {
        let record = Record::new("u1");
        assert!(!Direction::Forward.is_eligible(&record));
    }

    #[test]
    fn test_enrichment_apply_to_reverse() {
        let mut record = Record::new("u1");
        record.coordinates = Some([69.2, 34.5]);

        let enrichment = Enrichment::Reverse(ReverseEnrichment {
            country: "Afghanistan".to_string(),
            town: "Kabul".to_string(),
            full_address: "Kabul, Afghanistan".to_string(),
            reverse_geocoded: true,
            source: "nominatim".to_string(),
            updated_at: Utc::now(),
        });
        enrichment.apply_to(&mut record);

        assert_eq!(record.country.as_deref(), Some("Afghanistan"));
        assert_eq!(record.town.as_deref(), Some("Kabul"));
        assert_eq!(record.reverse_geocoded, Some(true));
        assert!(!Direction::Reverse.is_eligible(&record));
    }
}
