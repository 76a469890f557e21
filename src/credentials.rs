use std::env;
use std::fmt;

use tracing::debug;

use crate::error::LalError;
use crate::providers::Provider;

pub const ANTHROPIC_API_KEY_VAR: &str = "ANTHROPIC_API_KEY";
pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";

const MIN_KEY_LEN: usize = 8;

/// Which provider an invocation talks to, derived once from the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderChoice {
    OpenAi,
    Anthropic,
    None,
}

impl ProviderChoice {
    pub fn provider(&self) -> Option<Provider> {
        match self {
            Self::OpenAi => Some(Provider::OpenAi),
            Self::Anthropic => Some(Provider::Anthropic),
            Self::None => None,
        }
    }
}

/// Anthropic wins when both keys are present.
pub fn choose(anthropic_key: Option<&str>, openai_key: Option<&str>) -> ProviderChoice {
    if is_present(anthropic_key) {
        ProviderChoice::Anthropic
    } else if is_present(openai_key) {
        ProviderChoice::OpenAi
    } else {
        ProviderChoice::None
    }
}

fn is_present(raw: Option<&str>) -> bool {
    raw.is_some_and(|value| !value.trim().is_empty())
}

#[derive(Clone)]
pub struct Credential {
    pub provider: Provider,
    api_key: String,
}

impl Credential {
    pub fn new(provider: Provider, api_key: impl Into<String>) -> Self {
        Self {
            provider,
            api_key: api_key.into(),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("provider", &self.provider)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

pub fn resolve(forced: Option<Provider>) -> Result<Credential, LalError> {
    resolve_with(forced, |key| env::var(key).ok())
}

pub(crate) fn resolve_with(
    forced: Option<Provider>,
    mut get_var: impl FnMut(&str) -> Option<String>,
) -> Result<Credential, LalError> {
    let provider = match forced {
        Some(provider) => provider,
        None => {
            let anthropic = get_var(ANTHROPIC_API_KEY_VAR);
            let openai = get_var(OPENAI_API_KEY_VAR);
            choose(anthropic.as_deref(), openai.as_deref())
                .provider()
                .ok_or_else(|| {
                    LalError::MissingCredential(format!(
                        "no API key found: set {ANTHROPIC_API_KEY_VAR} or {OPENAI_API_KEY_VAR}"
                    ))
                })?
        }
    };

    let var = provider.api_key_var();
    let raw = get_var(var)
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| {
            LalError::MissingCredential(format!(
                "--provider {} requires {var} to be set",
                provider.as_str()
            ))
        })?;

    let api_key = validate_key(var, &raw)?;
    debug!(provider = provider.as_str(), key_var = var, "resolved provider credential");
    Ok(Credential::new(provider, api_key))
}

fn validate_key(var: &str, raw: &str) -> Result<String, LalError> {
    let key = raw.trim();
    if key.chars().any(|ch| ch.is_whitespace() || ch.is_control()) {
        return Err(LalError::InvalidInput(format!(
            "{var} contains whitespace or control characters"
        )));
    }
    if key.chars().count() < MIN_KEY_LEN {
        return Err(LalError::InvalidInput(format!(
            "{var} is too short to be an API key"
        )));
    }
    Ok(key.to_string())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::{
        ANTHROPIC_API_KEY_VAR, OPENAI_API_KEY_VAR, ProviderChoice, choose, resolve_with,
    };
    use crate::error::ErrorKind;
    use crate::providers::Provider;

    fn resolve_from(
        forced: Option<Provider>,
        pairs: &[(&str, &str)],
    ) -> Result<super::Credential, crate::error::LalError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        resolve_with(forced, |key| vars.get(key).cloned())
    }

    #[test]
    fn choose_covers_every_key_combination() {
        assert_eq!(choose(Some("a-key"), Some("o-key")), ProviderChoice::Anthropic);
        assert_eq!(choose(Some("a-key"), None), ProviderChoice::Anthropic);
        assert_eq!(choose(None, Some("o-key")), ProviderChoice::OpenAi);
        assert_eq!(choose(None, None), ProviderChoice::None);
    }

    #[test]
    fn choose_treats_blank_values_as_absent() {
        assert_eq!(choose(Some("   "), Some("o-key")), ProviderChoice::OpenAi);
        assert_eq!(choose(Some(""), Some("")), ProviderChoice::None);
    }

    #[test]
    fn resolve_prefers_anthropic_when_both_are_set() {
        let cred = resolve_from(
            None,
            &[
                (ANTHROPIC_API_KEY_VAR, "sk-ant-test-key"),
                (OPENAI_API_KEY_VAR, "sk-openai-test-key"),
            ],
        )
        .expect("credential should resolve");
        assert_eq!(cred.provider, Provider::Anthropic);
        assert_eq!(cred.api_key(), "sk-ant-test-key");
    }

    #[test]
    fn resolve_uses_openai_when_only_openai_is_set() {
        let cred = resolve_from(None, &[(OPENAI_API_KEY_VAR, "  sk-openai-test-key\n")])
            .expect("credential should resolve");
        assert_eq!(cred.provider, Provider::OpenAi);
        assert_eq!(cred.api_key(), "sk-openai-test-key");
    }

    #[test]
    fn resolve_fails_with_missing_credential_when_nothing_is_set() {
        let err = resolve_from(None, &[]).expect_err("resolution should fail");
        assert_eq!(err.kind(), ErrorKind::MissingCredential);
        let msg = err.to_string();
        assert!(msg.contains(ANTHROPIC_API_KEY_VAR), "unexpected message: {msg}");
        assert!(msg.contains(OPENAI_API_KEY_VAR), "unexpected message: {msg}");
    }

    #[test]
    fn forced_provider_requires_its_own_key() {
        let err = resolve_from(
            Some(Provider::OpenAi),
            &[(ANTHROPIC_API_KEY_VAR, "sk-ant-test-key")],
        )
        .expect_err("forced provider without key should fail");
        assert_eq!(err.kind(), ErrorKind::MissingCredential);
        assert!(err.to_string().contains(OPENAI_API_KEY_VAR));

        let cred = resolve_from(
            Some(Provider::OpenAi),
            &[
                (ANTHROPIC_API_KEY_VAR, "sk-ant-test-key"),
                (OPENAI_API_KEY_VAR, "sk-openai-test-key"),
            ],
        )
        .expect("forced provider with key should resolve");
        assert_eq!(cred.provider, Provider::OpenAi);
    }

    #[test]
    fn malformed_keys_fail_fast_without_echoing_value() {
        let err = resolve_from(None, &[(ANTHROPIC_API_KEY_VAR, "sk-ant secret")])
            .expect_err("key with whitespace should fail");
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(!err.to_string().contains("secret"));

        let err = resolve_from(None, &[(OPENAI_API_KEY_VAR, "abc")])
            .expect_err("short key should fail");
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn malformed_preferred_key_does_not_fall_through() {
        let err = resolve_from(
            None,
            &[
                (ANTHROPIC_API_KEY_VAR, "bad key"),
                (OPENAI_API_KEY_VAR, "sk-openai-test-key"),
            ],
        )
        .expect_err("malformed anthropic key should fail");
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(err.to_string().contains(ANTHROPIC_API_KEY_VAR));
    }

    #[test]
    fn debug_output_redacts_the_key() {
        let cred = super::Credential::new(Provider::OpenAi, "sk-very-secret");
        let rendered = format!("{cred:?}");
        assert!(!rendered.contains("sk-very-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
