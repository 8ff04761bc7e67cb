//! Error taxonomy shared by every layer of the broker.
//!
//! Kinds carry a stable `code()` so callers (tests, logs, the HTTP boundary)
//! can match on behavior without string-matching messages. Only the API
//! crate knows about HTTP status codes — this module stops at `ErrorKind`.

use std::fmt;

use thiserror::Error;
use uuid::Uuid;

/// Stable classification of a [`TaskFlowError`], independent of transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    JobAlreadyExists,
    Validation,
    Repository,
    Internal,
}

impl ErrorKind {
    /// The stable `code` string used in the API error envelope and in logs.
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::JobAlreadyExists => "job_already_exists",
            ErrorKind::Validation => "validation_error",
            ErrorKind::Repository => "repository_error",
            ErrorKind::Internal => "internal_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Errors raised by the domain and application layers.
///
/// Use cases never mask these — they propagate verbatim to whatever called
/// them (the API boundary, the worker loop) for translation there.
#[derive(Debug, Error)]
pub enum TaskFlowError {
    #[error("{resource} not found")]
    NotFound { resource: String },

    #[error("{message}")]
    Conflict { message: String },

    #[error("job {id} already exists")]
    JobAlreadyExists { id: Uuid },

    #[error("{message}")]
    Validation {
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("repository error: {message}")]
    Repository {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },

    #[error("internal error: {message}")]
    Internal { message: String },
}

impl TaskFlowError {
    pub fn not_found(resource: impl Into<String>) -> Self {
        TaskFlowError::NotFound {
            resource: resource.into(),
        }
    }

    pub fn job_already_exists(id: Uuid) -> Self {
        TaskFlowError::JobAlreadyExists { id }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        TaskFlowError::Validation {
            message: message.into(),
            details: None,
        }
    }

    pub fn validation_with_details(message: impl Into<String>, details: serde_json::Value) -> Self {
        TaskFlowError::Validation {
            message: message.into(),
            details: Some(details),
        }
    }

    pub fn repository(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        TaskFlowError::Repository {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        TaskFlowError::Internal {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            TaskFlowError::NotFound { .. } => ErrorKind::NotFound,
            TaskFlowError::Conflict { .. } => ErrorKind::Conflict,
            TaskFlowError::JobAlreadyExists { .. } => ErrorKind::JobAlreadyExists,
            TaskFlowError::Validation { .. } => ErrorKind::Validation,
            TaskFlowError::Repository { .. } => ErrorKind::Repository,
            TaskFlowError::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// Extra structured context for the API error envelope's `details` field.
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            TaskFlowError::Validation { details, .. } => details.clone(),
            _ => None,
        }
    }
}

pub type TaskFlowResult<T> = Result<T, TaskFlowError>;
