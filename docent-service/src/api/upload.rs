//! Upload endpoint.
//!
//! Accepts `multipart/form-data` with a `file` part plus `system_prompt` and
//! `user_prompt` text parts, and answers with the model output as JSON.

use axum::{
    Json,
    extract::{Multipart, State},
};
use bytes::Bytes;
use std::sync::Arc;
use tracing::info;

use crate::error::ServiceError;
use crate::service::{PromptOutcome, Prompts};

use super::AppState;

fn invalid_request(message: impl Into<String>) -> ServiceError {
    ServiceError::InvalidRequest {
        message: message.into(),
    }
}

/// Run an uploaded image or PDF through the model
pub async fn upload_handler(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<PromptOutcome>, ServiceError> {
    let mut file: Option<(String, Bytes)> = None;
    let mut system_prompt: Option<String> = None;
    let mut user_prompt: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| invalid_request(e.body_text()))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or("").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| invalid_request(e.body_text()))?;
                file = Some((filename, data));
            }
            "system_prompt" => {
                system_prompt = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| invalid_request(e.body_text()))?,
                );
            }
            "user_prompt" => {
                user_prompt = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| invalid_request(e.body_text()))?,
                );
            }
            _ => {}
        }
    }

    let (filename, data) = file.ok_or_else(|| invalid_request("Missing 'file' field"))?;
    let prompts = Prompts {
        system: system_prompt.ok_or_else(|| invalid_request("Missing 'system_prompt' field"))?,
        user: user_prompt.ok_or_else(|| invalid_request("Missing 'user_prompt' field"))?,
    };

    info!(filename = %filename, bytes = data.len(), "Upload received");

    let outcome = state
        .service
        .process_upload(&filename, &data, &prompts)
        .await?;

    Ok(Json(outcome))
}
