//! Pure predicates deciding whether a failed request may be retried.
//!
//! The failover driver consults a single combined gate,
//! [`is_network_or_idempotent_request_error`]: network errors are safe to
//! retry because nothing reached the server, while server errors are only
//! safe for methods declared side-effect free.

use reqwest::Method;

use crate::error::{ErrorCode, FailoverError};

/// Collaborator consulted before any network-error retry.
///
/// Lets callers veto retries for failure classes the generic classifier
/// cannot judge (for example, errors known to be permanent in a given
/// deployment).
pub trait RetryAllowed: Send + Sync {
    /// Returns whether generic conditions permit retrying this error at all.
    fn allows(&self, error: &FailoverError) -> bool;
}

/// Default eligibility: approve failures where the request may never have
/// reached a server, reject structural ones that will fail identically on
/// any gateway.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultRetryAllowed;

impl RetryAllowed for DefaultRetryAllowed {
    fn allows(&self, error: &FailoverError) -> bool {
        !matches!(
            error.code(),
            Some(ErrorCode::Builder | ErrorCode::Redirect | ErrorCode::Decode)
        )
    }
}

/// True when the request never completed: no response was received, the
/// failure carries a transport code other than abort, and the eligibility
/// collaborator approves. Aborted (timed-out or cancelled) requests are
/// never considered network errors.
pub fn is_network_error(error: &FailoverError, retry_allowed: &dyn RetryAllowed) -> bool {
    error.status().is_none()
        && matches!(error.code(), Some(code) if code != ErrorCode::Aborted)
        && retry_allowed.allows(error)
}

/// True when the error is not an abort and either no response was received
/// or the response status is in the 5xx range. 4xx responses are never
/// retryable.
pub fn is_retryable_error(error: &FailoverError) -> bool {
    if error.code() == Some(ErrorCode::Aborted) {
        return false;
    }
    match error.status() {
        None => true,
        Some(status) => (500..=599).contains(&status),
    }
}

/// True when the error is retryable and the originating request used a
/// method from `safe_methods`. Errors without an originating configuration
/// can never be re-issued and always return false.
pub fn is_idempotent_request_error(error: &FailoverError, safe_methods: &[Method]) -> bool {
    let Some(config) = error.config() else {
        return false;
    };
    is_retryable_error(error) && safe_methods.contains(&config.method)
}

/// Combined eligibility gate used by the failover driver.
pub fn is_network_or_idempotent_request_error(
    error: &FailoverError,
    safe_methods: &[Method],
    retry_allowed: &dyn RetryAllowed,
) -> bool {
    is_network_error(error, retry_allowed) || is_idempotent_request_error(error, safe_methods)
}

#[cfg(test)]
mod tests {
    use reqwest::Method;

    use super::{
        is_idempotent_request_error, is_network_error, is_network_or_idempotent_request_error,
        is_retryable_error, DefaultRetryAllowed, RetryAllowed,
    };
    use crate::error::{ErrorCode, FailoverError};
    use crate::options::default_safe_methods;
    use crate::RequestConfig;

    struct DenyAll;

    impl RetryAllowed for DenyAll {
        fn allows(&self, _error: &FailoverError) -> bool {
            false
        }
    }

    fn transport_error(code: ErrorCode, method: Method) -> FailoverError {
        FailoverError::Transport {
            code,
            message: "simulated failure".to_owned(),
            source: None,
            config: Some(Box::new(RequestConfig::new(
                method,
                "https://a.example/v1/x",
            ))),
        }
    }

    fn http_error(status: u16, method: Method) -> FailoverError {
        FailoverError::Http {
            status,
            body: String::new(),
            config: Some(Box::new(RequestConfig::new(
                method,
                "https://a.example/v1/x",
            ))),
        }
    }

    #[test]
    fn network_error_requires_collaborator_approval() {
        let error = transport_error(ErrorCode::Connect, Method::GET);
        assert!(is_network_error(&error, &DefaultRetryAllowed));
        assert!(!is_network_error(&error, &DenyAll));
    }

    #[test]
    fn network_error_rejects_aborts() {
        let error = transport_error(ErrorCode::Aborted, Method::GET);
        assert!(!is_network_error(&error, &DefaultRetryAllowed));
    }

    #[test]
    fn network_error_requires_a_failure_code() {
        let error = http_error(503, Method::GET);
        assert!(!is_network_error(&error, &DefaultRetryAllowed));
    }

    #[test]
    fn default_collaborator_rejects_structural_codes() {
        for code in [ErrorCode::Builder, ErrorCode::Redirect, ErrorCode::Decode] {
            let error = transport_error(code, Method::GET);
            assert!(!is_network_error(&error, &DefaultRetryAllowed));
        }
    }

    #[test]
    fn retryable_accepts_5xx_and_missing_response() {
        assert!(is_retryable_error(&http_error(500, Method::GET)));
        assert!(is_retryable_error(&http_error(599, Method::GET)));
        assert!(is_retryable_error(&transport_error(
            ErrorCode::Connect,
            Method::GET
        )));
    }

    #[test]
    fn retryable_rejects_4xx_and_aborts() {
        assert!(!is_retryable_error(&http_error(404, Method::GET)));
        assert!(!is_retryable_error(&http_error(499, Method::GET)));
        assert!(!is_retryable_error(&http_error(200, Method::GET)));
        assert!(!is_retryable_error(&transport_error(
            ErrorCode::Aborted,
            Method::GET
        )));
    }

    #[test]
    fn idempotent_gate_respects_method_set() {
        let safe = default_safe_methods();
        assert!(is_idempotent_request_error(
            &http_error(503, Method::GET),
            &safe
        ));
        assert!(is_idempotent_request_error(
            &http_error(503, Method::DELETE),
            &safe
        ));
        assert!(!is_idempotent_request_error(
            &http_error(503, Method::POST),
            &safe
        ));
    }

    #[test]
    fn idempotent_gate_requires_originating_config() {
        let error = FailoverError::Http {
            status: 503,
            body: String::new(),
            config: None,
        };
        assert!(!is_idempotent_request_error(&error, &default_safe_methods()));
    }

    #[test]
    fn combined_gate_passes_post_network_errors() {
        // A connect failure never reached the server, so even POST is safe.
        let error = transport_error(ErrorCode::Connect, Method::POST);
        assert!(is_network_or_idempotent_request_error(
            &error,
            &default_safe_methods(),
            &DefaultRetryAllowed
        ));
    }

    #[test]
    fn combined_gate_rejects_post_server_errors() {
        let error = http_error(503, Method::POST);
        assert!(!is_network_or_idempotent_request_error(
            &error,
            &default_safe_methods(),
            &DefaultRetryAllowed
        ));
    }
}
