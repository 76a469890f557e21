use serde::{Deserialize, Serialize};

use super::{ProviderRequest, RequestBody, url_with_v1_path};
use crate::config::Config;
use crate::error::LalError;
use crate::prompt::Prompt;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Serialize)]
pub struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

fn chat_url(base_url: &str) -> String {
    url_with_v1_path(base_url, "chat/completions")
}

pub fn build_request(cfg: &Config, api_key: &str, prompt: &Prompt) -> ProviderRequest {
    let body = ChatRequest {
        model: cfg.model_for(super::Provider::OpenAi).to_string(),
        messages: vec![
            ChatMessage {
                role: "system",
                content: prompt.system.clone(),
            },
            ChatMessage {
                role: "user",
                content: prompt.task.clone(),
            },
        ],
        max_tokens: cfg.max_tokens,
        temperature: 0.0,
    };

    ProviderRequest {
        url: chat_url(cfg.base_url_for(super::Provider::OpenAi)),
        headers: vec![("Authorization", format!("Bearer {api_key}"))],
        body: RequestBody::OpenAi(body),
    }
}

pub fn parse_reply(body: &str) -> Result<String, LalError> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|err| LalError::unparsable(format!("malformed OpenAI response: {err}"), body))?;

    let Some(choice) = parsed.choices.into_iter().next() else {
        return Err(LalError::unparsable("OpenAI response has no choices", body));
    };

    if let Some(refusal) = choice.message.refusal.filter(|text| !text.trim().is_empty()) {
        return Err(LalError::unparsable("model refused the request", refusal));
    }

    choice
        .message
        .content
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| LalError::unparsable("OpenAI response has no message content", body))
}
