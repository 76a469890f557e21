use reqwest::Client;
use tracing::{debug, warn};

use crate::config::Config;
use crate::credentials::Credential;
use crate::error::LalError;
use crate::prompt::build_prompt;
use crate::providers::Provider;
use crate::providers::http_errors::provider_request_error;

/// The user's natural-language request, trimmed and known to be non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query(String);

impl Query {
    pub fn parse(raw: &str) -> Result<Self, LalError> {
        let text = raw.trim();
        if text.is_empty() {
            return Err(LalError::InvalidInput(
                "no request given; describe the command you want, e.g. `lal list files in current directory`"
                    .to_string(),
            ));
        }
        Ok(Self(text.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Body of a successful provider response, tagged with the provider whose
/// envelope it uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub provider: Provider,
    pub body: String,
}

/// Sends exactly one request to the credential's provider. Transport failures
/// are not retried.
pub async fn translate(
    client: &Client,
    cfg: &Config,
    query: &Query,
    credential: &Credential,
) -> Result<RawResponse, LalError> {
    let provider = credential.provider;
    let prompt = build_prompt(query.as_str(), &cfg.shell);
    let request = provider.build_request(cfg, credential.api_key(), &prompt);
    debug!(
        provider = provider.as_str(),
        api_url = %request.url,
        model = %cfg.model_for(provider),
        query_len = query.as_str().len(),
        "sending translation request"
    );

    let mut builder = client.post(&request.url).json(&request.body);
    for (name, value) in &request.headers {
        builder = builder.header(*name, value);
    }

    let response = builder.send().await.map_err(|err| {
        warn!(
            provider = provider.as_str(),
            api_url = %request.url,
            error = %err,
            "provider request failed"
        );
        provider_request_error(err, &request.url, provider.base_url_var(), cfg.timeout_secs)
    })?;

    let status = response.status();
    let body = response.text().await.map_err(|err| {
        provider_request_error(err, &request.url, provider.base_url_var(), cfg.timeout_secs)
    })?;

    if !status.is_success() {
        warn!(
            provider = provider.as_str(),
            api_url = %request.url,
            status = %status,
            response_body_len = body.len(),
            "provider returned non-success status"
        );
        return Err(LalError::ProviderError {
            provider: provider.as_str(),
            status: status.as_u16(),
            body: body.trim().to_string(),
        });
    }

    debug!(
        provider = provider.as_str(),
        response_len = body.len(),
        "received provider response"
    );
    Ok(RawResponse { provider, body })
}
