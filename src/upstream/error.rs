//! Upstream fetch errors
//!
//! Every failure reaching the catalog is recoverable from the worker's point of
//! view. The transport kind exists so logs and metrics can tell DNS trouble
//! apart from everything else.

use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Message fragments emitted by resolvers across platforms
const DNS_MARKERS: &[&str] = &[
    "dns error",
    "failed to lookup address",
    "name or service not known",
    "nodename nor servname",
    "temporary failure in name resolution",
    "no such host",
];

/// Classification of a transport failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// Host name could not be resolved
    DnsResolution,
    /// Request exceeded the configured timeout
    Timeout,
    /// TCP/TLS connection could not be established
    Connect,
    /// Upstream answered with a non-success status
    Status(u16),
    /// Anything else (body read errors, redirects, ...)
    Other,
}

impl TransportKind {
    /// Short label used for log fields and metric labels
    pub fn label(&self) -> &'static str {
        match self {
            TransportKind::DnsResolution => "dns",
            TransportKind::Timeout => "timeout",
            TransportKind::Connect => "connect",
            TransportKind::Status(_) => "status",
            TransportKind::Other => "transport",
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportKind::Status(code) => write!(f, "HTTP {}", code),
            other => f.write_str(other.label()),
        }
    }
}

/// Failure fetching from the upstream catalog
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// Network or connection failure reaching upstream
    #[error("transport failure ({kind}): {message}")]
    Transport { kind: TransportKind, message: String },

    /// Body could not be decoded into the expected shape
    #[error("decode failure: {message}")]
    Decode { message: String },
}

impl FetchError {
    pub fn transport(kind: TransportKind, message: impl Into<String>) -> Self {
        Self::Transport {
            kind,
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Whether this is a transport failure caused by name resolution
    pub fn is_dns_failure(&self) -> bool {
        matches!(
            self,
            Self::Transport {
                kind: TransportKind::DnsResolution,
                ..
            }
        )
    }

    /// Label for logs and metrics: the transport kind, or "decode"
    pub fn kind_label(&self) -> &'static str {
        match self {
            Self::Transport { kind, .. } => kind.label(),
            Self::Decode { .. } => "decode",
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        let message = error_chain_message(&err);

        if err.is_decode() {
            return Self::decode(message);
        }

        let kind = if is_dns_error(&err) {
            TransportKind::DnsResolution
        } else if err.is_timeout() {
            TransportKind::Timeout
        } else if err.is_connect() {
            TransportKind::Connect
        } else if let Some(status) = err.status() {
            TransportKind::Status(status.as_u16())
        } else {
            TransportKind::Other
        };

        Self::transport(kind, message)
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        Self::decode(err.to_string())
    }
}

/// Walk the source chain looking for a resolver failure.
///
/// reqwest wraps the hyper connector error, which in turn wraps the resolver's
/// `io::Error`, so only the message text identifies the cause.
pub fn is_dns_error(err: &(dyn StdError + 'static)) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(e) = current {
        let text = e.to_string().to_lowercase();
        if DNS_MARKERS.iter().any(|marker| text.contains(marker)) {
            return true;
        }
        current = e.source();
    }
    false
}

/// Join the messages of an error and all of its sources
fn error_chain_message(err: &(dyn StdError + 'static)) -> String {
    let mut parts = vec![err.to_string()];
    let mut current = err.source();
    while let Some(e) = current {
        let text = e.to_string();
        if !parts.iter().any(|p| p.contains(&text)) {
            parts.push(text);
        }
        current = e.source();
    }
    parts.join(": ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[derive(Debug)]
    struct Wrapper {
        inner: io::Error,
    }

    impl fmt::Display for Wrapper {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("error sending request")
        }
    }

    impl StdError for Wrapper {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(&self.inner)
        }
    }

    #[test]
    fn test_dns_detected_through_source_chain() {
        let err = Wrapper {
            inner: io::Error::other("failed to lookup address information: Name or service not known"),
        };
        assert!(is_dns_error(&err));
        assert_eq!(
            error_chain_message(&err),
            "error sending request: failed to lookup address information: Name or service not known"
        );
    }

    #[test]
    fn test_connection_refused_is_not_dns() {
        let err = Wrapper {
            inner: io::Error::new(io::ErrorKind::ConnectionRefused, "Connection refused"),
        };
        assert!(!is_dns_error(&err));
    }

    #[test]
    fn test_kind_labels() {
        assert!(FetchError::transport(TransportKind::DnsResolution, "x").is_dns_failure());
        assert!(!FetchError::transport(TransportKind::Timeout, "x").is_dns_failure());
        assert_eq!(FetchError::decode("x").kind_label(), "decode");
        assert_eq!(
            FetchError::transport(TransportKind::Status(503), "x").to_string(),
            "transport failure (HTTP 503): x"
        );
    }

    #[test]
    fn test_json_error_is_decode() {
        let err: FetchError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, FetchError::Decode { .. }));
    }
}
