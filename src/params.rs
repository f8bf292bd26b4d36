//! Operation parameters: validation and default filling.
//!
//! Every operation takes a [`Parameters`] map keyed by the webservice's
//! own field names (`numero`, `valor`, `bandeira`, `data-hora`, ...).
//! Before a document is built, the resolver for the operation checks the
//! required fields and fills defaults for the optional ones — in place,
//! so the caller can observe exactly what was sent. A caller-supplied
//! value is never overwritten.

use std::collections::HashMap;

use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use crate::config::Config;
use crate::error::{CieloError, Result};

/// ISO 4217 numeric code for the Brazilian real.
const DEFAULT_CURRENCY: &str = "986";

/// Timestamp layout required by the `data-hora` field.
const WIRE_TIMESTAMP: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");

/// Fields that must be present and non-empty before a transaction is
/// created, in checking order.
const CREATE_REQUIRED: &[&str] = &["numero", "valor", "bandeira"];

/// Additional fields required by a direct (Buy Page Loja) authorization,
/// in checking order.
const DIRECT_AUTH_REQUIRED: &[&str] = &[
    "tid",
    "cartao-numero",
    "cartao-validade",
    "cartao-codigo-seguranca",
    "cartao-nome-portador",
];

/// String-valued parameter set for one webservice call.
///
/// Keys use the wire field names. Insertion order is irrelevant — the
/// per-operation field layout, not the map, dictates document order.
///
/// ```
/// use cielo::Parameters;
///
/// let mut params = Parameters::new();
/// params.insert("numero", "178148599");
/// params.insert("valor", "8900");
/// assert_eq!(params.get("valor"), Some("8900"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    values: HashMap<String, String>,
}

impl Parameters {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a parameter, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Returns the value for `key`, if set.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Returns true if `key` is set.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Returns the number of parameters set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no parameters are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Sets `key` to the produced value only when absent.
    pub(crate) fn fill_default(&mut self, key: &str, value: impl FnOnce() -> String) {
        if !self.values.contains_key(key) {
            self.values.insert(key.to_owned(), value());
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Checks required fields and fills defaults for a new transaction.
///
/// Required: `numero`, `valor`, `bandeira`. Defaults filled when absent:
/// `moeda`, `data-hora`, `idioma`, `produto`, `parcelas`, `autorizar`,
/// `capturar` and `url-retorno` (the latter from the configuration).
pub(crate) fn resolve_create(params: &mut Parameters, config: &Config) -> Result<()> {
    require(params, CREATE_REQUIRED)?;

    params.fill_default("moeda", || DEFAULT_CURRENCY.to_owned());
    params.fill_default("data-hora", wire_timestamp);
    params.fill_default("idioma", || "PT".to_owned());
    params.fill_default("produto", || "1".to_owned());
    params.fill_default("parcelas", || "1".to_owned());
    params.fill_default("autorizar", || "2".to_owned());
    params.fill_default("capturar", || "true".to_owned());
    params.fill_default("url-retorno", || config.return_url.clone());

    Ok(())
}

/// Checks required fields and fills defaults for a direct authorization.
///
/// Applies [`resolve_create`] first, then additionally requires the
/// correlation id and the four card fields; fills `cartao-indicador`
/// when absent.
pub(crate) fn resolve_direct_auth(params: &mut Parameters, config: &Config) -> Result<()> {
    resolve_create(params, config)?;
    require(params, DIRECT_AUTH_REQUIRED)?;

    params.fill_default("cartao-indicador", || "1".to_owned());

    Ok(())
}

/// Fails with the first field of `fields` that is absent or empty.
fn require(params: &Parameters, fields: &[&'static str]) -> Result<()> {
    for field in fields {
        if params.get(field).is_none_or(str::is_empty) {
            return Err(CieloError::MissingArgument(field));
        }
    }
    Ok(())
}

/// Current UTC time in the `data-hora` wire layout.
fn wire_timestamp() -> String {
    OffsetDateTime::now_utc()
        .format(WIRE_TIMESTAMP)
        .expect("wire timestamp layout matches OffsetDateTime fields")
}
