use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use crate::handler::{Handler, HandlerError};

/// Mirrors `original_source/handlers/image.py`'s `process_image`.
pub struct ProcessImage;

#[async_trait]
impl Handler for ProcessImage {
    async fn call(&self, payload: Value) -> Result<(), HandlerError> {
        let image_id = payload
            .get("image_id")
            .and_then(Value::as_str)
            .ok_or_else(|| HandlerError::validation("missing required field 'image_id'"))?;

        info!(%image_id, "processing image");
        tokio::time::sleep(std::time::Duration::from_millis(500)).await;
        info!(%image_id, "finished processing image");

        Ok(())
    }
}
