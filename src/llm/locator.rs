use std::sync::Arc;

use async_trait::async_trait;

use crate::agent::state::Location;
use crate::llm::client::ChatClient;
use crate::llm::parse;
use crate::llm::prompts::{find_instruction, LOCATOR_SYSTEM_PROMPT};
use crate::llm::types::ChatMessage;
use crate::perception::screenshot::Frame;

/// The locator seam: resolve a target description to pixel coordinates.
/// Never errors; every failure mode collapses to `found: false` and the
/// caller decides how to proceed.
#[async_trait]
pub trait LocatorModel: Send + Sync {
    async fn locate(&self, frame: &Frame, target: &str) -> Location;
}

/// Production locator over the OpenAI-compatible endpoint.
pub struct GuiLocator {
    client: Arc<ChatClient>,
    model: String,
}

impl GuiLocator {
    pub fn new(client: Arc<ChatClient>, model: String) -> Self {
        Self { client, model }
    }
}

#[async_trait]
impl LocatorModel for GuiLocator {
    async fn locate(&self, frame: &Frame, target: &str) -> Location {
        let messages = [
            ChatMessage::system(LOCATOR_SYSTEM_PROMPT),
            ChatMessage::user_with_image(frame.data_url.clone(), find_instruction(target)),
        ];
        let extra = serde_json::json!({ "vl_high_resolution_images": true });

        let reply = match self.client.complete(&self.model, &messages, Some(extra)).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(target, error = %e, "locator request failed");
                return Location::not_found();
            }
        };

        let value = match parse::parse_reply(&reply) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(target, error = %e, "locator reply unparseable");
                return Location::not_found();
            }
        };

        if let Some(thought) = value["thought"].as_str() {
            tracing::debug!(target, thought, "locator reasoning");
        }

        if value["found"].as_bool().unwrap_or(false) {
            let x = parse::normalize_coord(&value["x"]);
            let y = parse::normalize_coord(&value["y"]);
            tracing::info!(target, x, y, "target located");
            Location::at(x, y)
        } else {
            tracing::info!(target, "target not found");
            Location::not_found()
        }
    }
}
