use std::sync::Arc;

use async_trait::async_trait;

use crate::agent::state::Decision;
use crate::errors::{PilotError, PilotResult};
use crate::llm::client::ChatClient;
use crate::llm::parse;
use crate::llm::prompts::BRAIN_SYSTEM_PROMPT;
use crate::llm::types::ChatMessage;
use crate::perception::screenshot::Frame;

/// The brain seam: one decision per step from screenshot + goal + history.
/// An error here is fatal to the run; there is no retry.
#[async_trait]
pub trait DecisionModel: Send + Sync {
    async fn decide(&self, frame: &Frame, goal: &str, history: &str) -> PilotResult<Decision>;
}

/// Production brain over the OpenAI-compatible endpoint.
pub struct BrainModel {
    client: Arc<ChatClient>,
    model: String,
}

impl BrainModel {
    pub fn new(client: Arc<ChatClient>, model: String) -> Self {
        Self { client, model }
    }
}

#[async_trait]
impl DecisionModel for BrainModel {
    async fn decide(&self, frame: &Frame, goal: &str, history: &str) -> PilotResult<Decision> {
        let context = serde_json::json!({
            "goal": goal,
            "history": if history.is_empty() { "(no steps executed yet)" } else { history },
            "note": "Decide the next step directly from the screenshot and this context.",
        });

        let messages = [
            ChatMessage::system(BRAIN_SYSTEM_PROMPT),
            ChatMessage::user_with_image(frame.data_url.clone(), context.to_string()),
        ];

        let reply = self.client.complete(&self.model, &messages, None).await?;
        let value = parse::parse_reply(&reply)
            .map_err(|e| PilotError::Decision(format!("unparseable reply: {e}")))?;
        let decision = Decision::from_value(&value);

        tracing::info!(
            action = decision.action.kind(),
            thought = %decision.thought,
            "brain decided"
        );
        Ok(decision)
    }
}
