//! UI/backend events and error modeling for desktop GUI controller.

use client_core::{ClassificationError, LoadError, LoadResponse, SubmitTicket, ValidationError};
use shared::domain::ClassificationResult;

pub enum UiEvent {
    Info(String),
    Error(UiError),
    OptionsLoaded(LoadResponse),
    Classified {
        ticket: SubmitTicket,
        result: Result<ClassificationResult, ClassificationError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Validation,
    Load,
    Classification,
    Transport,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    LoadOptions,
    Submit,
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
        let category = if message_lower.contains("validation")
            || message_lower.contains("missing")
            || message_lower.contains("incomplete")
        {
            UiErrorCategory::Validation
        } else if message_lower.contains("timeout")
            || message_lower.contains("timed out")
            || message_lower.contains("connection")
            || message_lower.contains("network")
            || message_lower.contains("transport")
            || message_lower.contains("disconnected")
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

    pub fn validation(err: &ValidationError) -> Self {
        let message = match err {
            ValidationError::IncompleteSelection => "Please complete all three selections.",
            ValidationError::MissingAmount => "Please enter the contract amount.",
        };
        Self {
            category: UiErrorCategory::Validation,
            context: UiErrorContext::Submit,
            message: message.to_string(),
        }
    }

    /// Free-text matching is reserved for messages without a typed source.
    pub fn load(err: &LoadError) -> Self {
        let category = match err {
            LoadError::Rejected(_) | LoadError::Malformed(_) => UiErrorCategory::Load,
            LoadError::Transport(_) => UiErrorCategory::Transport,
        };
        Self {
            category,
            context: UiErrorContext::LoadOptions,
            message: err.to_string(),
        }
    }

    pub fn classification(err: &ClassificationError) -> Self {
        let category = match err {
            ClassificationError::Rejected { .. } => UiErrorCategory::Classification,
            ClassificationError::Transport(_) => UiErrorCategory::Transport,
        };
        Self {
            category,
            context: UiErrorContext::Submit,
            message: err.to_string(),
        }
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
