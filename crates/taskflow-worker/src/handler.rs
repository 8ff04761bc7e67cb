//! The handler seam: dispatches a claimed job's payload to application code
//! by `job.name`. Grounded in `original_source/worker/runner.py`'s
//! `HANDLERS` dict and `dispatch_job` function — expressed here as a trait
//! object registry built once at startup rather than global mutable state.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

/// A handler failure. Distinguished from [`taskflow_core::error::TaskFlowError`]
/// deliberately — handler outcomes are always translated into a `FailJob`
/// call by the worker loop, never propagated as a use-case error directly.
#[derive(Debug)]
pub struct HandlerError {
    pub error_type: String,
    pub message: String,
}

impl HandlerError {
    pub fn new(error_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_type: error_type.into(),
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new("validation_error", message)
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error_type, self.message)
    }
}

impl std::error::Error for HandlerError {}

/// Business logic for one job name. Implementations must not panic —
/// return [`HandlerError`] for anything that should count as a failed
/// attempt.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn call(&self, payload: Value) -> Result<(), HandlerError>;
}

/// Maps job name to handler, built explicitly once at worker startup.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn Handler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, name: impl Into<String>, handler: Arc<dyn Handler>) -> Self {
        self.handlers.insert(name.into(), handler);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Handler>> {
        self.handlers.get(name)
    }
}
