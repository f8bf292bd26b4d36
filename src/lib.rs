//! Cielo webservice client: Buy Page Cielo and Buy Page Loja flows.
//!
//! A Rust client for the Cielo e-commerce payment-authorization
//! webservice. It builds the ISO-8859-1 XML request documents the
//! service expects, POSTs them, and decodes the schema-less XML replies
//! into a generic, order-preserving map.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │    Your store    │
//! └────────┬─────────┘
//!          │ Parameters (wire field names)
//! ┌────────▼──────────────────────────────────────────┐
//! │            Transaction (this crate)               │
//! │  ┌───────────┐  ┌───────────┐  ┌──────────────┐  │
//! │  │  resolve  │──│  render   │──│   decode     │  │
//! │  │ (params)  │  │ (layout + │  │ (schema-less │  │
//! │  │           │  │  xml)     │  │  reply map)  │  │
//! │  └───────────┘  └─────┬─────┘  └──────▲───────┘  │
//! └───────────────────────┼───────────────┼──────────┘
//!                         │  Gateway      │
//!                  ┌──────▼───────────────┴──────┐
//!                  │   Cielo webservice (HTTPS)  │
//!                  └─────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```no_run
//! use cielo::{Config, Parameters, Transaction};
//!
//! # async fn example() -> cielo::Result<()> {
//! // Sandbox credentials from Cielo's integration manual; use
//! // Config::new for production.
//! let transaction = Transaction::new(Config::sandbox(
//!     "https://store.example.com/checkout/return",
//! ))?;
//!
//! // Amounts are in cents; field names follow the wire protocol.
//! let mut params = Parameters::new();
//! params.insert("numero", "178148599");
//! params.insert("valor", "8900");
//! params.insert("bandeira", "visa");
//!
//! let reply = transaction.create(&mut params).await?;
//! match reply.get("tid").and_then(|value| value.as_str()) {
//!     Some(tid) => {
//!         // Later: query and capture by correlation id.
//!         let state = transaction.verify(Some(tid)).await?;
//!         let captured = transaction.capture(Some(tid)).await?;
//!         println!("{state:?} {captured:?}");
//!     }
//!     None => eprintln!("webservice refused: {reply:?}"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Operations
//!
//! | Method | Document | Purpose |
//! |--------|----------|---------|
//! | [`Transaction::create`] | `requisicao-transacao` | start a Buy Page Cielo transaction |
//! | [`Transaction::request_tid`] | `requisicao-tid` | obtain a correlation id for Buy Page Loja |
//! | [`Transaction::direct_auth`] | `requisicao-autorizacao-portador` | authorize with full card data |
//! | [`Transaction::verify`] | `requisicao-consulta` | query a transaction's state |
//! | [`Transaction::capture`] | `requisicao-captura` | capture an authorized transaction |
//!
//! # Error Handling
//!
//! Two channels, deliberately distinct:
//!
//! - **Caller-input problems** (a missing required parameter, a bad
//!   configuration) fail fast as [`CieloError`] before any network
//!   activity.
//! - **Remote problems** (connectivity, non-success status, unparseable
//!   reply) are *values*: every operation still resolves to a
//!   [`DecodedMap`], in the failure case the fixed
//!   `{erro: {codigo: "000", mensagem: ...}}` map. Branch on the map's
//!   shape, not on `Err`.
//!
//! # Module Organization
//!
//! - [`config`]: merchant credentials and environment selection
//! - [`params`]: parameter set, validation and default filling
//! - [`layout`]: the fixed per-operation document shapes
//! - [`decode`]: the generic reply decoder
//! - [`transport`]: the [`Gateway`] abstraction and HTTP implementation
//! - [`transaction`]: the operation façade
//! - [`error`]: error types

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod config;
pub mod decode;
pub mod error;
pub mod layout;
pub mod params;
pub mod transaction;
pub mod transport;

mod xml;

pub use config::{Config, Environment};
pub use decode::{DecodedMap, Value};
pub use error::{CieloError, Result};
pub use layout::Operation;
pub use params::Parameters;
pub use transaction::Transaction;
pub use transport::{Gateway, GatewayResponse, HttpGateway};
