//! Store error type

use depot_model::DepotId;

/// Failure talking to the depot record store or activity log
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Transport failure; worth retrying
    #[error("network error: {0}")]
    Network(String),

    /// Caller may not perform this operation
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Document does not exist
    #[error("depot not found: {0}")]
    NotFound(DepotId),

    /// Store refused the write
    #[error("write rejected: {0}")]
    Rejected(String),

    /// Payload could not be encoded or decoded
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    /// Whether the same call may succeed if retried unchanged
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// Whether this is the read-after-write miss
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_display() {
        let err = StoreError::NotFound(DepotId::new("abc"));
        assert_eq!(err.to_string(), "depot not found: abc");

        let err = StoreError::Network("timeout".to_string());
        assert_eq!(err.to_string(), "network error: timeout");
    }

    #[test]
    fn store_error_classification() {
        assert!(StoreError::Network("reset".into()).is_retryable());
        assert!(!StoreError::PermissionDenied("ro".into()).is_retryable());
        assert!(StoreError::NotFound(DepotId::new("x")).is_not_found());
    }
}
