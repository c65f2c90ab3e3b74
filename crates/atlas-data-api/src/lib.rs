//! Minimal client for the MongoDB Atlas Data API
//!
//! Speaks the Data API's JSON action protocol over HTTPS: `action/find`
//! (with filter, sort and limit) and `action/updateOne` (with a `$set`
//! style update document). Authentication is a caller-supplied `api-key`
//! header; the target cluster, database and collection come from
//! [`AtlasConfig`], not from ambient process state.
//!
//! # Example
//!
//! ```no_run
//! use atlas_data_api::{AtlasClient, AtlasConfig};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), atlas_data_api::AtlasError> {
//! let client = AtlasClient::new(AtlasConfig {
//!     app_id: "data-abcde".into(),
//!     api_key: "secret".into(),
//!     data_source: "Cluster0".into(),
//!     database: "unicorns".into(),
//! });
//!
//! let doc = client
//!     .find_one_sorted("unicorns", json!({"country": {"$exists": false}}), json!({"_id": 1}))
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod error;

pub use client::{AtlasClient, AtlasConfig, UpdateCounts};
pub use error::{AtlasError, Result};
