use thiserror::Error;

// * Top-level error type for the engine entry points.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid domain: {0:?}")]
    InvalidDomain(String),

    #[error("Capability unavailable: {capability} is not configured (integration required)")]
    CapabilityUnavailable { capability: &'static str },

    #[error("{capability} failed: {cause}")]
    SourceFailed {
        capability: &'static str,
        #[source]
        cause: SourceError,
    },

    #[error("{capability} timed out after {timeout_ms}ms")]
    SourceTimeout { capability: &'static str, timeout_ms: u64 },

    #[error("Operation cancelled by caller")]
    Cancelled,
}

impl EngineError {
    /// Name of the capability the operator needs to look at, if any
    pub fn capability(&self) -> Option<&'static str> {
        match self {
            EngineError::CapabilityUnavailable { capability }
            | EngineError::SourceFailed { capability, .. }
            | EngineError::SourceTimeout { capability, .. } => Some(capability),
            EngineError::InvalidDomain(_) | EngineError::Cancelled => None,
        }
    }
}

// * Errors returned by injected collaborators (backlink, mention, gap sources).
#[derive(Error, Debug, Clone)]
pub enum SourceError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Unexpected response: {0}")]
    Parse(String),

    #[error("Rate limited by upstream (HTTP {0})")]
    RateLimited(u16),

    #[error("Integration required: {0}")]
    Unavailable(String),

    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Request(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_names_capability() {
        let err = EngineError::CapabilityUnavailable { capability: "BacklinkSource" };
        assert!(err.to_string().contains("BacklinkSource"));
        assert_eq!(err.capability(), Some("BacklinkSource"));
    }

    #[test]
    fn test_source_failure_chain() {
        let err = EngineError::SourceFailed {
            capability: "BacklinkSource",
            cause: SourceError::RateLimited(429),
        };
        assert!(err.to_string().contains("429"));
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(EngineError::Cancelled.capability(), None);
    }
}
