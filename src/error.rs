// Error taxonomy for the watch loop.
//
// Everything internally is `anyhow::Result`. The HTTP clients wrap their
// failures in `ApiError` before handing them up, so the tick boundary can
// tell an upstream hiccup (retry next tick) from a bug (ping the operator)
// by walking the error chain.

use std::fmt;

/// A failure talking to one of the remote services.
#[derive(Debug)]
pub enum ApiError {
    /// The request never produced a usable HTTP response (DNS, TLS,
    /// connection reset, timeout).
    Transport {
        service: &'static str,
        message: String,
    },
    /// The service answered, but with a non-success status.
    Upstream {
        service: &'static str,
        status: u16,
        body: String,
    },
}

impl ApiError {
    pub fn transport(service: &'static str, err: impl fmt::Display) -> Self {
        ApiError::Transport {
            service,
            message: err.to_string(),
        }
    }

    pub fn upstream(service: &'static str, status: u16, body: impl Into<String>) -> Self {
        ApiError::Upstream {
            service,
            status,
            body: body.into(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Transport { service, message } => {
                write!(f, "{service} request failed: {message}")
            }
            ApiError::Upstream {
                service,
                status,
                body,
            } => write!(f, "{service} returned {status}: {body}"),
        }
    }
}

impl std::error::Error for ApiError {}

/// How the watch loop should react to a failed tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network-level failure. Logged, retried next tick.
    Transport,
    /// Structured error from a remote API. Logged, retried next tick.
    Upstream,
    /// Anything else. Logged and escalated to the operator.
    Unexpected,
}

impl ErrorKind {
    /// Classify an error by the first API-level cause found in its chain.
    pub fn classify(err: &anyhow::Error) -> Self {
        for cause in err.chain() {
            if let Some(api) = cause.downcast_ref::<ApiError>() {
                return match api {
                    ApiError::Transport { .. } => ErrorKind::Transport,
                    ApiError::Upstream { .. } => ErrorKind::Upstream,
                };
            }
            if let Some(req) = cause.downcast_ref::<reqwest::Error>() {
                // Body decoding failures mean the payload changed shape, which
                // is a bug on our side rather than a flaky network.
                if req.is_decode() {
                    return ErrorKind::Unexpected;
                }
                return match req.status() {
                    Some(_) => ErrorKind::Upstream,
                    None => ErrorKind::Transport,
                };
            }
        }
        ErrorKind::Unexpected
    }

    /// Whether this kind of failure should reach the operator.
    pub fn escalates(self) -> bool {
        self == ErrorKind::Unexpected
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Transport => "transport",
            ErrorKind::Upstream => "upstream",
            ErrorKind::Unexpected => "unexpected",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_transport_error_is_classified_through_context() {
        let err: anyhow::Result<()> = Err(ApiError::transport("danbooru", "connection reset"))
            .context("Failed to fetch post versions");
        assert_eq!(ErrorKind::classify(&err.unwrap_err()), ErrorKind::Transport);
    }

    #[test]
    fn test_upstream_error_is_classified() {
        let err = anyhow::Error::new(ApiError::upstream("danbooru", 502, "Bad Gateway"));
        assert_eq!(ErrorKind::classify(&err), ErrorKind::Upstream);
        assert!(!ErrorKind::Upstream.escalates());
    }

    #[test]
    fn test_plain_error_is_unexpected() {
        let err = anyhow::anyhow!("index out of range");
        assert_eq!(ErrorKind::classify(&err), ErrorKind::Unexpected);
        assert!(ErrorKind::Unexpected.escalates());
    }

    #[test]
    fn test_api_error_display() {
        let err = ApiError::upstream("discord", 403, "Missing Access");
        assert_eq!(err.to_string(), "discord returned 403: Missing Access");
    }
}
