use crate::errors::{PilotError, PilotResult};
use crate::llm::types::ChatMessage;

/// Non-streaming client for an OpenAI-compatible chat completions endpoint.
/// Both model roles (brain and locator) go through the same endpoint with
/// different model names.
pub struct ChatClient {
    api_base: String,
    api_key: String,
    client: reqwest::Client,
}

impl ChatClient {
    pub fn new(api_base: String, api_key: String) -> Self {
        Self {
            api_base,
            api_key,
            client: reqwest::Client::new(),
        }
    }

    /// Sends one chat completion request and returns the reply text from
    /// `choices[0].message.content`. `extra` fields are merged into the
    /// request body (the locator passes `vl_high_resolution_images`).
    pub async fn complete(
        &self,
        model: &str,
        messages: &[ChatMessage],
        extra: Option<serde_json::Value>,
    ) -> PilotResult<String> {
        let mut body = serde_json::json!({
            "model": model,
            "messages": messages,
        });
        if let Some(serde_json::Value::Object(fields)) = extra {
            if let Some(obj) = body.as_object_mut() {
                obj.extend(fields);
            }
        }

        tracing::debug!(model, "sending chat completion request");
        tracing::debug!(
            body = %{
                // Clone and sanitize for logging only; the real request keeps
                // the full image payloads.
                let mut log_body = body.clone();
                if let Some(msgs) = log_body.get_mut("messages").and_then(|m| m.as_array_mut()) {
                    for msg in msgs {
                        if let Some(parts) = msg.get_mut("content").and_then(|c| c.as_array_mut()) {
                            for part in parts {
                                if part.get("type").and_then(|t| t.as_str()) == Some("image_url") {
                                    if let Some(url) = part
                                        .get_mut("image_url")
                                        .and_then(|iu| iu.get_mut("url"))
                                    {
                                        *url = serde_json::Value::String(
                                            "<omitted_base64_image>".to_string(),
                                        );
                                    }
                                }
                            }
                        }
                    }
                }
                serde_json::to_string(&log_body).unwrap_or_default()
            },
            "request body (sanitized, base64 omitted)"
        );

        let response = self
            .client
            .post(&self.api_base)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let err_body = response.text().await.unwrap_or_default();
            return Err(PilotError::Chat(format!("{status}: {err_body}")));
        }

        let json: serde_json::Value = response.json().await?;
        let content = json["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or("")
            .to_string();

        tracing::debug!(model, content_len = content.len(), "chat completion received");
        Ok(content)
    }
}
