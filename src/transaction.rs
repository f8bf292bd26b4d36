//! The transaction façade: the five webservice operations.
//!
//! Every operation is a single-shot, stateless sequence — resolve
//! parameters, render the document, send it, decode the reply — with no
//! state carried between calls. Remote failures come back as the decoded
//! error map (see [`decode`](crate::decode)); only caller-side problems
//! (missing required parameters) surface as errors.

use tracing::{info, instrument, warn};

use crate::config::Config;
use crate::decode::{self, DecodedMap};
use crate::error::Result;
use crate::layout::Operation;
use crate::params::{Parameters, resolve_create, resolve_direct_auth};
use crate::transport::{Gateway, HttpGateway};
use crate::xml;

/// Client for the Cielo webservice.
///
/// Holds the merchant [`Config`] and a [`Gateway`]; both are read-only
/// after construction, so a single instance can serve concurrent calls.
///
/// # Examples
///
/// ```no_run
/// use cielo::{Config, Parameters, Transaction};
///
/// # async fn example() -> cielo::Result<()> {
/// let transaction = Transaction::new(Config::sandbox(
///     "https://store.example.com/checkout/return",
/// ))?;
///
/// let mut params = Parameters::new();
/// params.insert("numero", "178148599");
/// params.insert("valor", "8900");
/// params.insert("bandeira", "visa");
///
/// let reply = transaction.create(&mut params).await?;
/// if let Some(tid) = reply.get("tid").and_then(|value| value.as_str()) {
///     println!("transaction id: {tid}");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Transaction<G = HttpGateway> {
    config: Config,
    gateway: G,
}

impl Transaction<HttpGateway> {
    /// Creates a client over the default HTTP gateway.
    ///
    /// # Errors
    ///
    /// Returns [`CieloError::Config`](crate::CieloError::Config) if the
    /// configuration fails validation.
    pub fn new(config: Config) -> Result<Self> {
        Self::with_gateway(config, HttpGateway::new())
    }
}

impl<G: Gateway> Transaction<G> {
    /// Creates a client over a caller-supplied gateway.
    ///
    /// # Errors
    ///
    /// Returns [`CieloError::Config`](crate::CieloError::Config) if the
    /// configuration fails validation.
    pub fn with_gateway(config: Config, gateway: G) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, gateway })
    }

    /// Returns the configuration this client was built with.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Starts a Buy Page Cielo transaction.
    ///
    /// Requires `numero`, `valor` and `bandeira`; defaults are filled in
    /// place for the remaining fields (currency, timestamp, language,
    /// product, installments, authorization mode, capture flag, return
    /// URL), so the caller can inspect exactly what was sent.
    ///
    /// # Errors
    ///
    /// Returns [`CieloError::MissingArgument`](crate::CieloError::MissingArgument)
    /// before any network activity if a required parameter is absent or
    /// empty.
    #[instrument(skip(self, params), fields(order = params.get("numero").unwrap_or_default()))]
    pub async fn create(&self, params: &mut Parameters) -> Result<DecodedMap> {
        resolve_create(params, &self.config)?;
        let message = xml::render(Operation::Create, &self.config, params)?;
        info!("creating transaction");
        Ok(self.dispatch(&message).await)
    }

    /// Requests a correlation id (`tid`) for a Buy Page Loja flow.
    ///
    /// No parameters are required; `bandeira`, `produto` and `parcelas`
    /// are forwarded as supplied, empty otherwise.
    ///
    /// # Errors
    ///
    /// Fails only if the request document cannot be serialized.
    #[instrument(skip(self, params))]
    pub async fn request_tid(&self, params: &Parameters) -> Result<DecodedMap> {
        let message = xml::render(Operation::RequestTid, &self.config, params)?;
        info!("requesting tid");
        Ok(self.dispatch(&message).await)
    }

    /// Authorizes a transaction directly, with full card data.
    ///
    /// Applies the same checks and defaults as [`create`](Self::create),
    /// then additionally requires `tid`, `cartao-numero`,
    /// `cartao-validade`, `cartao-codigo-seguranca` and
    /// `cartao-nome-portador`; `cartao-indicador` defaults when absent.
    ///
    /// # Errors
    ///
    /// Returns [`CieloError::MissingArgument`](crate::CieloError::MissingArgument)
    /// before any network activity if a required parameter is absent or
    /// empty.
    #[instrument(skip(self, params), fields(order = params.get("numero").unwrap_or_default()))]
    pub async fn direct_auth(&self, params: &mut Parameters) -> Result<DecodedMap> {
        resolve_direct_auth(params, &self.config)?;
        let message = xml::render(Operation::DirectAuth, &self.config, params)?;
        info!("authorizing directly");
        Ok(self.dispatch(&message).await)
    }

    /// Queries the state of the transaction identified by `tid`.
    ///
    /// Returns `Ok(None)` without touching the network when `tid` is
    /// `None` — an explicit no-op, not an error.
    ///
    /// # Errors
    ///
    /// Fails only if the request document cannot be serialized.
    #[instrument(skip(self))]
    pub async fn verify(&self, tid: Option<&str>) -> Result<Option<DecodedMap>> {
        let Some(tid) = tid else {
            return Ok(None);
        };

        let params = Parameters::from_iter([("tid", tid)]);
        let message = xml::render(Operation::Inquiry, &self.config, &params)?;
        info!("querying transaction");
        Ok(Some(self.dispatch(&message).await))
    }

    /// Captures the previously authorized transaction identified by
    /// `tid`.
    ///
    /// Returns `Ok(None)` without touching the network when `tid` is
    /// `None` — an explicit no-op, not an error.
    ///
    /// # Errors
    ///
    /// Fails only if the request document cannot be serialized.
    #[instrument(skip(self))]
    pub async fn capture(&self, tid: Option<&str>) -> Result<Option<DecodedMap>> {
        let Some(tid) = tid else {
            return Ok(None);
        };

        let params = Parameters::from_iter([("tid", tid)]);
        let message = xml::render(Operation::Capture, &self.config, &params)?;
        info!("capturing transaction");
        Ok(Some(self.dispatch(&message).await))
    }

    /// Sends the document and decodes the reply. Delivery failures
    /// decode to the fixed connection-error map, like any other remote
    /// failure.
    async fn dispatch(&self, message: &str) -> DecodedMap {
        match self.gateway.send(self.config.endpoint(), message).await {
            Ok(response) => decode::decode(response.status, &response.body),
            Err(error) => {
                warn!(%error, "webservice request failed");
                decode::connection_error()
            }
        }
    }
}
