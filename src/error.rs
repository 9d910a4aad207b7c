use crate::RequestConfig;

/// Transport-level failure code carried by [`FailoverError::Transport`].
///
/// Derived from `reqwest::Error` inspection. [`ErrorCode::Aborted`] marks a
/// client-side timeout or explicit cancellation and is never retried.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    /// Client-side timeout or cancelled request.
    Aborted,
    /// TCP/TLS connection could not be established.
    Connect,
    /// Redirect policy rejected the request.
    Redirect,
    /// Request body could not be streamed.
    Body,
    /// Response body could not be decoded by the transport layer.
    Decode,
    /// Request could not be constructed (bad URL, invalid header).
    Builder,
    /// Request failed in flight (reset, protocol error).
    Request,
    /// Failure the transport does not further classify.
    Unknown,
}

impl ErrorCode {
    pub(crate) fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Aborted
        } else if err.is_connect() {
            Self::Connect
        } else if err.is_redirect() {
            Self::Redirect
        } else if err.is_body() {
            Self::Body
        } else if err.is_decode() {
            Self::Decode
        } else if err.is_builder() {
            Self::Builder
        } else if err.is_request() {
            Self::Request
        } else {
            Self::Unknown
        }
    }
}

/// Error type returned by this crate.
///
/// Non-retried failures are surfaced unchanged to the caller; the failover
/// driver never wraps them in additional context. The originating
/// [`RequestConfig`] rides along so the retry predicates can inspect the
/// HTTP method of the failed attempt.
#[derive(Debug, thiserror::Error)]
pub enum FailoverError {
    /// Request never produced a response.
    #[error("transport error: {message}")]
    Transport {
        /// Failure code derived from the transport error.
        code: ErrorCode,
        /// Human-readable description from the transport layer.
        message: String,
        /// Underlying `reqwest` error, when one exists.
        #[source]
        source: Option<reqwest::Error>,
        /// Configuration of the attempt that failed.
        config: Option<Box<RequestConfig>>,
    },
    /// Response arrived with a non-success HTTP status.
    #[error("http error {status}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
        /// Configuration of the attempt that failed.
        config: Option<Box<RequestConfig>>,
    },
    /// The request descriptor itself was unusable.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl FailoverError {
    pub(crate) fn from_reqwest(source: reqwest::Error, config: &RequestConfig) -> Self {
        Self::Transport {
            code: ErrorCode::from_reqwest(&source),
            message: source.to_string(),
            source: Some(source),
            config: Some(Box::new(config.clone())),
        }
    }

    /// HTTP status of the response, if one was received at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Transport failure code, if the request never completed.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Transport { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Configuration of the request that produced this error.
    pub fn config(&self) -> Option<&RequestConfig> {
        match self {
            Self::Transport { config, .. } | Self::Http { config, .. } => config.as_deref(),
            Self::InvalidRequest(_) => None,
        }
    }

    /// True when the failure was a client-side timeout.
    pub fn is_timeout(&self) -> bool {
        self.code() == Some(ErrorCode::Aborted)
    }
}
