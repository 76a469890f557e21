use std::env;

use crate::providers::Provider;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_TOKENS: u32 = 256;
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
#[cfg(windows)]
const DEFAULT_SHELL: &str = "cmd";
#[cfg(not(windows))]
const DEFAULT_SHELL: &str = "sh";

#[derive(Debug, Clone)]
pub struct Config {
    /// Overrides the provider's default model when set.
    pub model: Option<String>,
    pub openai_base_url: String,
    pub anthropic_base_url: String,
    pub timeout_secs: u64,
    pub max_tokens: u32,
    pub shell: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_env_with(|key| env::var(key).ok())
    }

    pub(crate) fn from_env_with(mut get_var: impl FnMut(&str) -> Option<String>) -> Self {
        Self {
            model: parse_non_empty(get_var("LAL_MODEL").as_deref()),
            openai_base_url: parse_base_url(
                get_var(Provider::OpenAi.base_url_var()).as_deref(),
                DEFAULT_OPENAI_BASE_URL,
            ),
            anthropic_base_url: parse_base_url(
                get_var(Provider::Anthropic.base_url_var()).as_deref(),
                DEFAULT_ANTHROPIC_BASE_URL,
            ),
            timeout_secs: parse_positive_u64(
                get_var("LAL_TIMEOUT_SECS").as_deref(),
                DEFAULT_TIMEOUT_SECS,
            ),
            max_tokens: parse_max_tokens(get_var("LAL_MAX_TOKENS").as_deref()),
            shell: parse_non_empty(get_var("LAL_SHELL").as_deref())
                .unwrap_or_else(|| DEFAULT_SHELL.to_string()),
        }
    }

    pub fn model_for(&self, provider: Provider) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| provider.default_model())
    }

    pub fn base_url_for(&self, provider: Provider) -> &str {
        match provider {
            Provider::OpenAi => &self.openai_base_url,
            Provider::Anthropic => &self.anthropic_base_url,
        }
    }
}

fn parse_non_empty(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn parse_base_url(raw: Option<&str>, default: &str) -> String {
    parse_non_empty(raw)
        .map(|value| value.trim_end_matches('/').to_string())
        .unwrap_or_else(|| default.to_string())
}

fn parse_positive_u64(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

fn parse_max_tokens(raw: Option<&str>) -> u32 {
    raw.and_then(|value| value.trim().parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_MAX_TOKENS)
}
