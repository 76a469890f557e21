//! Provider-specific request builders and reply parsers.
//!
//! Each [`Provider`] variant pairs one request builder with one reply parser.
//! Adding a provider means adding a variant, its module and the two match
//! arms below; the pipeline in [`crate::translate`] stays untouched.

pub mod anthropic;
pub(crate) mod http_errors;
pub mod openai;

use clap::ValueEnum;
use serde::Serialize;

use crate::config::Config;
use crate::error::LalError;
use crate::prompt::Prompt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Provider {
    #[value(name = "openai")]
    OpenAi,
    Anthropic,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
        }
    }

    pub fn api_key_var(&self) -> &'static str {
        match self {
            Self::OpenAi => crate::credentials::OPENAI_API_KEY_VAR,
            Self::Anthropic => crate::credentials::ANTHROPIC_API_KEY_VAR,
        }
    }

    /// Variable that overrides this provider's API base URL.
    pub fn base_url_var(&self) -> &'static str {
        match self {
            Self::OpenAi => "LAL_OPENAI_BASE_URL",
            Self::Anthropic => "LAL_ANTHROPIC_BASE_URL",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::OpenAi => openai::DEFAULT_MODEL,
            Self::Anthropic => anthropic::DEFAULT_MODEL,
        }
    }

    pub fn build_request(&self, cfg: &Config, api_key: &str, prompt: &Prompt) -> ProviderRequest {
        match self {
            Self::OpenAi => openai::build_request(cfg, api_key, prompt),
            Self::Anthropic => anthropic::build_request(cfg, api_key, prompt),
        }
    }

    /// Pulls the model's free-text reply out of a successful response body.
    pub fn parse_reply(&self, body: &str) -> Result<String, LalError> {
        match self {
            Self::OpenAi => openai::parse_reply(body),
            Self::Anthropic => anthropic::parse_reply(body),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum RequestBody {
    OpenAi(openai::ChatRequest),
    Anthropic(anthropic::MessagesRequest),
}

#[derive(Debug)]
pub struct ProviderRequest {
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: RequestBody,
}

pub(crate) fn url_with_v1_path(base_url: &str, suffix: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let suffix = suffix.trim_start_matches('/');
    if base.ends_with("/v1") {
        format!("{base}/{suffix}")
    } else {
        format!("{base}/v1/{suffix}")
    }
}
