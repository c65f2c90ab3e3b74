//! Error types for the reconciliation core

use std::fmt;

/// The record store was unreachable or answered with something unusable
#[derive(Debug)]
pub struct StoreError(pub String);

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Store error: {}", self.0)
    }
}

impl std::error::Error for StoreError {}

/// The geocoding provider failed (timeout, transport, bad status)
#[derive(Debug)]
pub struct ProviderError(pub String);

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Provider error: {}", self.0)
    }
}

impl std::error::Error for ProviderError {}

impl From<unicorn_geocoding::GeocodeError> for ProviderError {
    fn from(err: unicorn_geocoding::GeocodeError) -> Self {
        Self(err.to_string())
    }
}

/// Hard failures of a reconcile call.
///
/// Both variants carry the attempted operation's identifying context
/// (query text, coordinates or record id) alongside the upstream message.
/// No mutation is visible when one of these is returned: the update is the
/// sole mutation point and runs only after a successful resolve.
#[derive(Debug)]
pub enum ReconcileError {
    Provider { context: String, message: String },
    Store { context: String, message: String },
}

impl fmt::Display for ReconcileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Provider { context, message } => {
                write!(f, "Geocoding provider failed ({context}): {message}")
            }
            Self::Store { context, message } => {
                write!(f, "Record store failed ({context}): {message}")
            }
        }
    }
}

impl std::error::Error for ReconcileError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_display_includes_context() {
        let err = ReconcileError::Provider {
            context: "forward search \"forest\"".to_string(),
            message: "timed out".to_string(),
        };
        assert_eq!(
            format!("{}", err),
            "Geocoding provider failed (forward search \"forest\"): timed out"
        );
    }

    #[test]
    fn test_store_error_display_includes_context() {
        let err = ReconcileError::Store {
            context: "update record u1".to_string(),
            message: "status 503".to_string(),
        };
        assert_eq!(
            format!("{}", err),
            "Record store failed (update record u1): status 503"
        );
    }
}
