use thiserror::Error;

/// Failure categories of the translation pipeline.
///
/// Every kind is terminal for the invocation and maps to its own process exit
/// code. Declining the confirmation prompt and a non-zero status from the
/// executed command are not errors and never appear here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MissingCredential,
    InvalidInput,
    NetworkFailure,
    Timeout,
    ProviderError,
    UnparsableResponse,
}

impl ErrorKind {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidInput => 64,
            Self::UnparsableResponse => 65,
            Self::NetworkFailure => 69,
            Self::Timeout => 75,
            Self::ProviderError => 76,
            Self::MissingCredential => 78,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingCredential => "missing_credential",
            Self::InvalidInput => "invalid_input",
            Self::NetworkFailure => "network_failure",
            Self::Timeout => "timeout",
            Self::ProviderError => "provider_error",
            Self::UnparsableResponse => "unparsable_response",
        }
    }
}

#[derive(Debug, Error)]
pub enum LalError {
    #[error("{0}")]
    MissingCredential(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    NetworkFailure(String),

    #[error("{0}")]
    Timeout(String),

    #[error("{provider} API returned HTTP {status}: {body}")]
    ProviderError {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("could not extract a shell command from the model reply ({reason}): {reply:?}")]
    UnparsableResponse { reason: String, reply: String },
}

impl LalError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingCredential(_) => ErrorKind::MissingCredential,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::NetworkFailure(_) => ErrorKind::NetworkFailure,
            Self::Timeout(_) => ErrorKind::Timeout,
            Self::ProviderError { .. } => ErrorKind::ProviderError,
            Self::UnparsableResponse { .. } => ErrorKind::UnparsableResponse,
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.kind().exit_code()
    }

    pub(crate) fn unparsable(reason: impl Into<String>, reply: impl Into<String>) -> Self {
        Self::UnparsableResponse {
            reason: reason.into(),
            reply: reply.into(),
        }
    }
}

/// Setup instructions printed after a `MissingCredential` failure.
pub fn credential_guidance() -> &'static str {
    "LAL requires an API key from either OpenAI or Anthropic.

Get API keys from:
  - OpenAI: https://platform.openai.com/api-keys
  - Anthropic: https://console.anthropic.com/

Set up your API key:
  export ANTHROPIC_API_KEY=\"your-key-here\"
  or
  export OPENAI_API_KEY=\"your-key-here\"

Add to your shell config (.zshrc, .bashrc) for permanent use."
}
