use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use crate::handler::{Handler, HandlerError};

/// Mirrors `original_source/handlers/email.py`'s `send_email`.
pub struct SendEmail;

#[async_trait]
impl Handler for SendEmail {
    async fn call(&self, payload: Value) -> Result<(), HandlerError> {
        let email = payload
            .get("email")
            .and_then(Value::as_str)
            .ok_or_else(|| HandlerError::validation("missing required field 'email'"))?;
        let subject = payload
            .get("subject")
            .and_then(Value::as_str)
            .unwrap_or("No subject");

        info!(%email, %subject, "sending email");
        tokio::time::sleep(std::time::Duration::from_millis(300)).await;
        info!(%email, "email sent");

        Ok(())
    }
}
