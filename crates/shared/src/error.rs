use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Items,
    States,
    Cities,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Resource::Items => "item catalog",
            Resource::States => "state list",
            Resource::Cities => "city list",
        };
        f.write_str(label)
    }
}

/// Failures surfaced to the form. None of them end the session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("failed to load {resource}: {message}")]
    Fetch { resource: Resource, message: String },
    #[error("device location unavailable: {reason}")]
    GeolocationUnavailable { reason: String },
    #[error("collect point submission failed: {cause}")]
    SubmissionFailed { cause: String },
}

impl FormError {
    pub fn fetch(resource: Resource, message: impl Into<String>) -> Self {
        Self::Fetch {
            resource,
            message: message.into(),
        }
    }

    pub fn geolocation(reason: impl Into<String>) -> Self {
        Self::GeolocationUnavailable {
            reason: reason.into(),
        }
    }

    pub fn submission(cause: impl Into<String>) -> Self {
        Self::SubmissionFailed {
            cause: cause.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_errors_name_the_resource() {
        let err = FormError::fetch(Resource::Cities, "connection refused");
        assert_eq!(
            err.to_string(),
            "failed to load city list: connection refused"
        );
    }
}
