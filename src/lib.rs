//! `gateway-failover` adds automatic endpoint failover to a `reqwest` client.
//!
//! When a request against the main gateway fails with a retryable error, the
//! same logical request is re-issued against standby gateways in list order,
//! rewriting the URL each attempt:
//! - [`FailoverClient::execute`] — run one request through the failover loop
//! - [`GatewayOptions`] — client-wide defaults, [`GatewayOverrides`] per request
//! - [`classify`] — the pure retry-eligibility predicates
//!
//! Network errors (nothing reached the server) are retried for any method;
//! 5xx responses only for methods configured as idempotent. Cancelled or
//! timed-out requests, 4xx responses, and requests that never targeted the
//! main gateway are propagated unchanged.

pub mod classify;
mod client;
mod config;
mod error;
mod options;
mod state;

pub use classify::{
    is_idempotent_request_error, is_network_error, is_network_or_idempotent_request_error,
    is_retryable_error, DefaultRetryAllowed, RetryAllowed,
};
pub use client::FailoverClient;
pub use config::RequestConfig;
pub use error::{ErrorCode, FailoverError};
pub use options::{default_safe_methods, GatewayOptions, GatewayOverrides};

pub type Result<T> = std::result::Result<T, FailoverError>;
