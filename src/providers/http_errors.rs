use std::error::Error as StdError;
use std::io::ErrorKind;

use crate::error::LalError;

fn error_chain_has_connection_refused(err: &(dyn StdError + 'static)) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(source) = current {
        if let Some(io_err) = source.downcast_ref::<std::io::Error>()
            && io_err.kind() == ErrorKind::ConnectionRefused
        {
            return true;
        }

        if source
            .to_string()
            .to_ascii_lowercase()
            .contains("connection refused")
        {
            return true;
        }

        current = source.source();
    }

    false
}

fn error_chain_has_timeout(err: &(dyn StdError + 'static)) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(source) = current {
        if let Some(io_err) = source.downcast_ref::<std::io::Error>()
            && io_err.kind() == ErrorKind::TimedOut
        {
            return true;
        }

        if source
            .to_string()
            .to_ascii_lowercase()
            .contains("timed out")
        {
            return true;
        }

        current = source.source();
    }

    false
}

/// Maps a transport failure onto the pipeline taxonomy with a message that
/// says what to check next.
pub(crate) fn provider_request_error(
    err: reqwest::Error,
    api_url: &str,
    base_url_var: &str,
    timeout_secs: u64,
) -> LalError {
    if err.is_timeout() || error_chain_has_timeout(&err) {
        return LalError::Timeout(format!(
            "Request to '{api_url}' timed out after {timeout_secs}s. \
             Increase LAL_TIMEOUT_SECS or try again later."
        ));
    }

    if err.is_connect() {
        if error_chain_has_connection_refused(&err) {
            return LalError::NetworkFailure(format!(
                "Connection refused by provider API at '{api_url}'. \
                 Check {base_url_var} and network connectivity."
            ));
        }

        return LalError::NetworkFailure(format!(
            "Failed to connect to provider API at '{api_url}'. \
             Check {base_url_var} and network connectivity."
        ));
    }

    LalError::NetworkFailure(format!("Failed to call provider API at '{api_url}': {err}"))
}
