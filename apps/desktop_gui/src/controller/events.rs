//! UI/backend events and error modeling for the desktop form controller.

use client_core::FetchOutcome;
use shared::error::{FormError, Resource};

pub enum UiEvent {
    Info(String),
    Error(UiError),
    Fetched {
        epoch: u64,
        outcome: FetchOutcome,
    },
    SubmitFinished {
        epoch: u64,
        result: Result<(), FormError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Transport,
    Server,
    Decode,
    Location,
    Configuration,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    LoadLocation,
    LoadItems,
    LoadStates,
    LoadCities,
    Submit,
}

pub fn describe_submit_failure(message: &str) -> String {
    let lower = message.to_ascii_lowercase();
    if lower.contains("failed to reach")
        || lower.contains("connection refused")
        || lower.contains("dns")
        || lower.contains("timed out")
    {
        "Collect point API unreachable; check the API URL/network and save again.".to_string()
    } else if lower.contains("client error") {
        format!("The API rejected the collect point; review the form and save again ({message})")
    } else {
        format!("Could not save the collect point: {message}")
    }
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("not configured")
            || message_lower.contains("position configured")
        {
            UiErrorCategory::Configuration
        } else if message_lower.contains("location")
            || message_lower.contains("geolocation")
            || message_lower.contains("position")
        {
            UiErrorCategory::Location
        } else if message_lower.contains("invalid")
            || message_lower.contains("payload")
            || message_lower.contains("missing field")
            || message_lower.contains("expected")
        {
            UiErrorCategory::Decode
        } else if message_lower.contains("server error")
            || message_lower.contains("client error")
            || message_lower.contains("http status")
        {
            UiErrorCategory::Server
        } else if message_lower.contains("timed out")
            || message_lower.contains("timeout")
            || message_lower.contains("connection")
            || message_lower.contains("failed to reach")
            || message_lower.contains("dns")
            || message_lower.contains("disconnect")
        {
            UiErrorCategory::Transport
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn from_form_error(err: &FormError) -> Self {
        let context = match err {
            FormError::Fetch { resource, .. } => match resource {
                Resource::Items => UiErrorContext::LoadItems,
                Resource::States => UiErrorContext::LoadStates,
                Resource::Cities => UiErrorContext::LoadCities,
            },
            FormError::GeolocationUnavailable { .. } => UiErrorContext::LoadLocation,
            FormError::SubmissionFailed { .. } => UiErrorContext::Submit,
        };
        Self::from_message(context, err.to_string())
    }

    /// Errors the user can act on by retrying the same operation.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category,
            UiErrorCategory::Transport | UiErrorCategory::Server | UiErrorCategory::Location
        )
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

pub fn err_label(category: UiErrorCategory) -> &'static str {
    match category {
        UiErrorCategory::Transport => "Network",
        UiErrorCategory::Server => "Server",
        UiErrorCategory::Decode => "Unexpected response",
        UiErrorCategory::Location => "Location",
        UiErrorCategory::Configuration => "Configuration",
        UiErrorCategory::Unknown => "Error",
    }
}
