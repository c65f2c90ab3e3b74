//! Nominatim Geocoding Client
//!
//! A Rust client for the [Nominatim](https://nominatim.org/) geocoding API
//! supporting forward search (free text to coordinates) and reverse lookup
//! (coordinates to address components), with built-in rate limiting
//! (1 req/sec) and moka async caching.

mod client;
mod error;
mod types;

pub use client::NominatimClient;
pub use error::{GeocodeError, Result};
pub use types::{ForwardPlace, ReverseAddress, ReversePlace};
