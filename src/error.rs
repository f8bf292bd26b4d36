//! Error types for the Cielo webservice client.
//!
//! All errors implement the standard [`std::error::Error`] trait via
//! [`thiserror::Error`].
//!
//! Only caller-side problems surface as errors: a missing required
//! parameter, a rejected configuration, or a failure to put the request
//! document on the wire in the first place. Remote-side problems — the
//! webservice refusing the call, an unreachable host, an unparseable
//! reply — are never raised; the operations of
//! [`Transaction`](crate::Transaction) report them as the decoded error
//! map described in [`decode`](crate::decode).

use thiserror::Error;

/// Result type alias for webservice client operations.
///
/// All fallible functions in this crate return this type.
pub type Result<T> = std::result::Result<T, CieloError>;

/// Errors that can occur while preparing or dispatching a request.
///
/// # Error Recovery
///
/// - [`MissingArgument`](Self::MissingArgument): supply the named
///   parameter and retry; nothing was sent to the webservice.
/// - [`Config`](Self::Config): fix the configuration value; raised at
///   construction time, before any operation runs.
/// - [`Http`](Self::Http) / [`Transport`](Self::Transport): these never
///   escape the five public operations — the façade converts them into
///   the decoded error map — but custom [`Gateway`](crate::Gateway)
///   implementations use them to report delivery failures.
/// - [`Xml`](Self::Xml): indicates a request document that could not be
///   serialized; with well-formed parameters this does not occur.
#[must_use = "errors should be handled, propagated, or explicitly panicked"]
#[derive(Debug, Error)]
pub enum CieloError {
    /// A required parameter was absent or empty.
    ///
    /// Raised before any document is built and before any network
    /// activity, naming the first missing field in the operation's
    /// checking order.
    #[error("required parameter `{0}` not found")]
    MissingArgument(&'static str),

    /// The supplied configuration was rejected.
    ///
    /// Common causes: empty affiliation number or access key, or a
    /// malformed return URL.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The underlying HTTP request failed.
    ///
    /// Wraps [`reqwest::Error`]: timeouts, connection refusals, DNS and
    /// TLS failures. Reported by [`HttpGateway`](crate::HttpGateway);
    /// the façade maps it to the decoded error map rather than
    /// propagating it.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A transport implementation could not deliver the request.
    ///
    /// For [`Gateway`](crate::Gateway) implementations that are not
    /// backed by [`reqwest`] and therefore cannot produce
    /// [`Http`](Self::Http).
    #[error("transport failed: {0}")]
    Transport(String),

    /// The request document could not be serialized.
    #[error("request document serialization failed: {0}")]
    Xml(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_argument_display() {
        let error = CieloError::MissingArgument("valor");
        assert_eq!(error.to_string(), "required parameter `valor` not found");
    }

    #[test]
    fn test_config_error_display() {
        let error = CieloError::Config("affiliation number must not be empty".to_owned());
        assert!(error.to_string().contains("invalid configuration"));
    }

    #[test]
    fn test_transport_error_display() {
        let error = CieloError::Transport("connection reset".to_owned());
        assert_eq!(error.to_string(), "transport failed: connection reset");
    }

    #[test]
    fn test_xml_error_display() {
        let error = CieloError::Xml("unexpected token".to_owned());
        assert!(error.to_string().contains("serialization failed"));
    }
}
