use serde::{Deserialize, Serialize};

use super::{ProviderRequest, RequestBody, url_with_v1_path};
use crate::config::Config;
use crate::error::LalError;
use crate::prompt::Prompt;

pub const DEFAULT_MODEL: &str = "claude-3-5-haiku-latest";
const API_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
pub struct MessagesRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<Message>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

fn messages_url(base_url: &str) -> String {
    url_with_v1_path(base_url, "messages")
}

pub fn build_request(cfg: &Config, api_key: &str, prompt: &Prompt) -> ProviderRequest {
    let body = MessagesRequest {
        model: cfg.model_for(super::Provider::Anthropic).to_string(),
        max_tokens: cfg.max_tokens,
        system: prompt.system.clone(),
        messages: vec![Message {
            role: "user",
            content: prompt.task.clone(),
        }],
        temperature: 0.0,
    };

    ProviderRequest {
        url: messages_url(cfg.base_url_for(super::Provider::Anthropic)),
        headers: vec![
            ("x-api-key", api_key.to_string()),
            ("anthropic-version", API_VERSION.to_string()),
        ],
        body: RequestBody::Anthropic(body),
    }
}

pub fn parse_reply(body: &str) -> Result<String, LalError> {
    let parsed: MessagesResponse = serde_json::from_str(body).map_err(|err| {
        LalError::unparsable(format!("malformed Anthropic response: {err}"), body)
    })?;

    let text: String = parsed
        .content
        .into_iter()
        .filter(|block| block.kind == "text")
        .filter_map(|block| block.text)
        .collect();

    if text.trim().is_empty() {
        return Err(LalError::unparsable(
            "Anthropic response has no text content",
            body,
        ));
    }
    Ok(text)
}
