use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;

use crate::{
    classify::{is_network_or_idempotent_request_error, DefaultRetryAllowed, RetryAllowed},
    state::{shrink_timeout, RetryState},
    FailoverError, GatewayOptions, RequestConfig, Result,
};

/// HTTP client wrapper that fails eligible requests over to standby gateways.
///
/// Wraps a `reqwest::Client` and a set of default [`GatewayOptions`]. Each
/// [`execute`](FailoverClient::execute) call runs one logical request as a
/// bounded loop: dispatch, classify the failure, rewrite the gateway prefix,
/// wait, dispatch again — at most once per standby gateway. Retries are
/// invisible to the caller; the returned future resolves exactly once.
#[derive(Clone)]
pub struct FailoverClient {
    http: reqwest::Client,
    options: GatewayOptions,
    retry_allowed: Arc<dyn RetryAllowed>,
}

impl fmt::Debug for FailoverClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FailoverClient")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl FailoverClient {
    /// Attaches failover behavior to an existing client.
    pub fn new(http: reqwest::Client, options: GatewayOptions) -> Self {
        Self {
            http,
            options,
            retry_allowed: Arc::new(DefaultRetryAllowed),
        }
    }

    /// Replaces the generic retry-eligibility collaborator.
    pub fn with_retry_allowed(mut self, retry_allowed: impl RetryAllowed + 'static) -> Self {
        self.retry_allowed = Arc::new(retry_allowed);
        self
    }

    /// Runs one logical request through the failover sequence.
    ///
    /// On success the response is returned as-is. On failure the error is
    /// propagated unchanged unless the standby list, the retry bound, and
    /// the error classifier all permit another attempt, in which case the
    /// gateway prefix of the target URL is rewritten and the request is
    /// re-issued after the configured delay. The first failure is only
    /// handled at all if the request was targeted at the configured main
    /// gateway.
    pub async fn execute(&self, config: RequestConfig) -> Result<reqwest::Response> {
        let resolved = self.options.resolve(config.gateway.as_ref());
        let mut config = config;
        let mut state = RetryState::default();

        loop {
            state.mark_attempt();
            let full_path = config.full_path();

            let error = match self.dispatch(&config, &full_path).await {
                Ok(response) => return Ok(response),
                Err(error) => error,
            };

            // An error without its originating configuration cannot be
            // re-issued.
            if error.config().is_none() {
                return Err(error);
            }

            // Requests that never targeted the main gateway are not ours to
            // fail over.
            if state.retry_count == 0 && !full_path.starts_with(&resolved.main_gateway) {
                return Err(error);
            }

            let standby = &resolved.standby_gateway;
            let eligible = !standby.is_empty()
                && state.retry_count < standby.len()
                && is_network_or_idempotent_request_error(
                    &error,
                    &resolved.safe_methods,
                    self.retry_allowed.as_ref(),
                );
            if !eligible {
                #[cfg(feature = "tracing")]
                if !standby.is_empty() && state.retry_count >= standby.len() {
                    tracing::warn!(
                        retry_count = state.retry_count,
                        "standby gateways exhausted, propagating error"
                    );
                }
                return Err(error);
            }

            if let (Some(timeout_ms), Some(elapsed_ms)) = (config.timeout_ms, state.elapsed_ms()) {
                config.timeout_ms = Some(shrink_timeout(timeout_ms, elapsed_ms));
            }

            // First retry swaps out the main gateway; later retries swap out
            // whichever standby was tried last.
            let previous = match &state.last_try_gateway {
                Some(gateway) => gateway.as_str(),
                None => resolved.main_gateway.as_str(),
            };
            let next = standby[state.retry_count].as_str();
            let Some(rewritten) = swap_gateway(&full_path, previous, next) else {
                return Err(error);
            };

            #[cfg(feature = "tracing")]
            tracing::debug!(
                from = previous,
                to = next,
                retry_count = state.retry_count + 1,
                "failing over to standby gateway"
            );

            config.url = rewritten;
            state.last_try_gateway = Some(next.to_owned());
            state.retry_count += 1;

            sleep(Duration::from_millis(resolved.retry_delay_ms)).await;
        }
    }

    /// Builds and sends one attempt. Non-2xx statuses are turned into
    /// [`FailoverError::Http`] so they flow through the same failure path as
    /// transport errors.
    async fn dispatch(&self, config: &RequestConfig, full_path: &str) -> Result<reqwest::Response> {
        let mut request = self
            .http
            .request(config.method.clone(), full_path)
            .headers(config.headers.clone());
        if let Some(timeout_ms) = config.timeout_ms {
            request = request.timeout(Duration::from_millis(timeout_ms));
        }
        if let Some(body) = &config.body {
            request = request.body(body.clone());
        }

        let response = request
            .send()
            .await
            .map_err(|source| FailoverError::from_reqwest(source, config))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .map_err(|source| FailoverError::from_reqwest(source, config))?;
        Err(FailoverError::Http {
            status: status.as_u16(),
            body,
            config: Some(Box::new(config.clone())),
        })
    }
}

/// Replaces the `from` gateway prefix of `full_path` with `to`. Returns
/// `None` when `full_path` does not start with `from`.
fn swap_gateway(full_path: &str, from: &str, to: &str) -> Option<String> {
    full_path
        .strip_prefix(from)
        .map(|rest| format!("{to}{rest}"))
}
