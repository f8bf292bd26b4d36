//! Transport abstraction for delivering request documents.
//!
//! The webservice speaks plain HTTP POST: the serialized document goes
//! out as the single `mensagem` field of a form-encoded body, and the
//! reply body comes back verbatim. [`Gateway`] abstracts that exchange
//! so alternative transports (or recording fakes in tests) can stand in
//! for the default [`HttpGateway`].
//!
//! A gateway reports *delivery* failures as errors; a reply with a
//! non-success status is still a successful delivery and is returned
//! as-is. The façade, not the gateway, decides what failures mean to
//! callers.

use std::future::Future;
use std::sync::LazyLock;
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, instrument};

use crate::error::Result;

/// Shared HTTP client with connection pooling enabled.
///
/// Using a singleton avoids recreating the client per gateway instance,
/// preserving connection pooling benefits across all default gateways.
static DEFAULT_HTTP_CLIENT: LazyLock<Client> = LazyLock::new(|| {
    Client::builder()
        .pool_max_idle_per_host(100)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .build()
        .expect("Failed to create default HTTP client")
});

/// Raw reply from one webservice exchange.
#[derive(Debug, Clone)]
pub struct GatewayResponse {
    /// HTTP status code (or protocol equivalent).
    pub status: u16,
    /// Raw reply body bytes, in the charset the webservice declared.
    pub body: Vec<u8>,
}

/// Delivers one serialized request document and returns the raw reply.
///
/// Implementations must be safe for concurrent use; the façade holds a
/// single gateway across calls but never shares per-call state with it.
///
/// # Errors
///
/// `send` fails only when the request could not be delivered at all
/// (connection, TLS, timeout). Non-success reply statuses are returned
/// in the [`GatewayResponse`], not as errors.
pub trait Gateway: Send + Sync {
    /// POSTs `message` — the serialized request document — to `endpoint`.
    fn send<'a>(
        &'a self,
        endpoint: &'a str,
        message: &'a str,
    ) -> impl Future<Output = Result<GatewayResponse>> + Send + 'a;
}

/// Default HTTP gateway backed by [`reqwest`].
///
/// Configuration:
/// - Pool max idle per host: 100
/// - Timeout: 30 seconds
/// - Connect timeout: 10 seconds
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
}

impl HttpGateway {
    /// Creates a gateway over the shared pooled client.
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: DEFAULT_HTTP_CLIENT.clone(),
        }
    }

    /// Creates a gateway over a caller-configured client, for custom
    /// timeout or proxy policies.
    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Default for HttpGateway {
    fn default() -> Self {
        Self::new()
    }
}

/// Form-encodes the document as the `mensagem` field.
///
/// The webservice expects the document's ISO-8859-1 bytes under the
/// percent encoding, so the serializer's charset is overridden; the
/// declared encoding and the encoded bytes stay consistent.
fn form_body(message: &str) -> String {
    fn encode(input: &str) -> std::borrow::Cow<'_, [u8]> {
        encoding_rs::WINDOWS_1252.encode(input).0
    }
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    serializer.encoding_override(Some(&encode));
    serializer.append_pair("mensagem", message);
    serializer.finish()
}

impl Gateway for HttpGateway {
    #[instrument(skip(self, message))]
    async fn send<'a>(&'a self, endpoint: &'a str, message: &'a str) -> Result<GatewayResponse> {
        let response = self
            .client
            .post(endpoint)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(form_body(message))
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        debug!(status, bytes = body.len(), "webservice reply received");

        Ok(GatewayResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_body_wraps_message_field() {
        let body = form_body("<requisicao-consulta></requisicao-consulta>");
        assert!(body.starts_with("mensagem="));
        assert!(body.contains("%3Crequisicao-consulta%3E"));
    }

    #[test]
    fn test_form_body_encodes_latin1_bytes() {
        // é is a single 0xE9 byte on the wire, not the two-byte UTF-8
        // sequence %C3%A9.
        let body = form_body("<mensagem>não é</mensagem>");
        assert!(body.contains("n%E3o"));
        assert!(body.contains("%E9"));
        assert!(!body.contains("%C3%A9"));
    }

    #[test]
    fn test_form_body_spaces_become_plus() {
        let body = form_body("<nome-portador>JOAO DA SILVA</nome-portador>");
        assert!(body.contains("JOAO+DA+SILVA"));
    }

    #[test]
    fn test_http_gateway_new_and_default() {
        let gateway = HttpGateway::new();
        let debug_str = format!("{gateway:?}");
        assert!(debug_str.contains("HttpGateway"));

        let _default = HttpGateway::default();
    }

    #[test]
    fn test_default_http_client_is_singleton() {
        // Verify the singleton client is usable.
        let _client = &*DEFAULT_HTTP_CLIENT;
    }

    #[test]
    fn test_gateway_response_fields() {
        let response = GatewayResponse {
            status: 200,
            body: b"<transacao/>".to_vec(),
        };
        assert_eq!(response.status, 200);
        assert_eq!(response.body, b"<transacao/>");
    }
}
