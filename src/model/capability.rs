// * Typed capability outcome
// * Lets callers tell "zero results" apart from "feature not configured" or "source broke"

use serde::{Deserialize, Serialize};

/// Outcome of asking an optional collaborator for data
#[derive(Debug, Clone, PartialEq)]
pub enum Capability<T> {
    /// No collaborator is configured for this capability
    Unavailable,
    /// The collaborator answered (possibly with nothing)
    Ok(T),
    /// The collaborator was configured but failed or timed out
    Failed(String),
}

impl<T> Capability<T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, Capability::Ok(_))
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Capability<U> {
        match self {
            Capability::Unavailable => Capability::Unavailable,
            Capability::Ok(data) => Capability::Ok(f(data)),
            Capability::Failed(cause) => Capability::Failed(cause),
        }
    }

    /// Splits into the data (or its default) and a serializable status
    pub fn into_parts(self) -> (T, CategoryStatus)
    where
        T: Default,
    {
        match self {
            Capability::Ok(data) => (data, CategoryStatus::ok()),
            Capability::Unavailable => (T::default(), CategoryStatus::unavailable()),
            Capability::Failed(cause) => (T::default(), CategoryStatus::failed(cause)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityState {
    Ok,
    Unavailable,
    Failed,
}

/// Per-category metadata attached to opportunity results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStatus {
    pub status: CapabilityState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
    /// True whenever the list is empty for a reason other than "nothing found"
    pub degraded: bool,
}

impl CategoryStatus {
    pub fn ok() -> Self {
        Self {
            status: CapabilityState::Ok,
            cause: None,
            degraded: false,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            status: CapabilityState::Unavailable,
            cause: None,
            degraded: true,
        }
    }

    pub fn failed(cause: impl Into<String>) -> Self {
        Self {
            status: CapabilityState::Failed,
            cause: Some(cause.into()),
            degraded: true,
        }
    }
}

impl Default for CategoryStatus {
    fn default() -> Self {
        Self::ok()
    }
}
