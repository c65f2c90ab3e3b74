//! Geocoding reconciliation for unicorn records
//!
//! The one reusable piece of logic behind the update-geo handlers: find a
//! single record missing geographic data, resolve it through a geocoding
//! provider, and write the enrichment back with one conditional update.
//!
//! [`reconcile`] is direction-parameterized:
//!
//! - [`Direction::Forward`] resolves a free-text locality hint to
//!   coordinates.
//! - [`Direction::Reverse`] resolves a coordinate pair to country, town
//!   and full address.
//!
//! The backing store and the geocoding provider are trait collaborators
//! ([`RecordStore`], [`GeocodingProvider`]); each call touches at most one
//! record and surfaces exactly one terminal [`ReconcileOutcome`]. Repeated
//! calls drain a finite backlog to [`ReconcileOutcome::Drained`].

mod error;
mod nominatim;
mod reconcile;
mod types;

pub use error::{ProviderError, ReconcileError, StoreError};
pub use reconcile::{
    reconcile, GeocodingProvider, ReconcileOutcome, ReconcileSettings, RecordStore,
};
pub use types::{
    Direction, Enrichment, ForwardEnrichment, Record, RecordId, ReverseEnrichment,
};
