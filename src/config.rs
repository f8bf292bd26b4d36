//! Merchant configuration for the Cielo webservice.
//!
//! The webservice authenticates merchants inside the request document
//! itself (the `dados-ec` group), so the whole credential surface is the
//! affiliation number and access key held here. Configuration is injected
//! once into [`Transaction`](crate::Transaction) at construction time and
//! read-only afterwards.

use serde::Deserialize;
use url::Url;

use crate::error::{CieloError, Result};

/// Production webservice endpoint.
const PRODUCTION_ENDPOINT: &str = "https://ecommerce.cbmp.com.br/servicos/ecommwsec.do";

/// Sandbox (homologation) webservice endpoint.
const SANDBOX_ENDPOINT: &str = "https://qasecommerce.cielo.com.br/servicos/ecommwsec.do";

/// Affiliation number published by Cielo for sandbox integration tests.
const SANDBOX_AFFILIATION_NUMBER: &str = "1006993069";

/// Access key published by Cielo for sandbox integration tests.
const SANDBOX_ACCESS_KEY: &str =
    "25fbb99741c739dd84d7b06ec78c9bac718838630f30b112d033ce2e621b34f3";

/// Which webservice deployment requests are sent to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    /// Cielo's homologation deployment. The default, so that a merchant
    /// must opt in explicitly before live charges are possible.
    #[default]
    Sandbox,
    /// The live deployment.
    Production,
}

impl Environment {
    /// Returns the webservice endpoint URL for this environment.
    #[must_use]
    pub fn endpoint(self) -> &'static str {
        match self {
            Self::Sandbox => SANDBOX_ENDPOINT,
            Self::Production => PRODUCTION_ENDPOINT,
        }
    }
}

/// Merchant credentials and per-process settings.
///
/// Deserializable from TOML for file-based setups:
///
/// ```
/// use cielo::{Config, Environment};
///
/// let toml = r#"
///     affiliation_number = "1001734898"
///     access_key = "e84827130b9837473681c2787007da5914d6359947015a5cdb2b8843db0fa832"
///     return_url = "https://store.example.com/checkout/return"
///     environment = "production"
/// "#;
///
/// let config: Config = toml::from_str(toml).unwrap();
/// assert_eq!(config.environment, Environment::Production);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Merchant affiliation number (`numero` in the `dados-ec` group).
    pub affiliation_number: String,

    /// Merchant access key (`chave` in the `dados-ec` group).
    pub access_key: String,

    /// URL the buyer is sent back to after the authentication step.
    ///
    /// Used as the default for the `url-retorno` parameter; a
    /// caller-supplied value always wins.
    #[serde(default)]
    pub return_url: String,

    /// Target deployment.
    #[serde(default)]
    pub environment: Environment,
}

impl Config {
    /// Creates a production configuration.
    pub fn new(
        affiliation_number: impl Into<String>,
        access_key: impl Into<String>,
        return_url: impl Into<String>,
    ) -> Self {
        Self {
            affiliation_number: affiliation_number.into(),
            access_key: access_key.into(),
            return_url: return_url.into(),
            environment: Environment::Production,
        }
    }

    /// Creates a sandbox configuration using the test credentials
    /// published in Cielo's integration manual.
    ///
    /// ```
    /// use cielo::Config;
    ///
    /// let config = Config::sandbox("https://store.example.com/checkout/return");
    /// assert!(config.endpoint().starts_with("https://qasecommerce"));
    /// ```
    pub fn sandbox(return_url: impl Into<String>) -> Self {
        Self {
            affiliation_number: SANDBOX_AFFILIATION_NUMBER.to_owned(),
            access_key: SANDBOX_ACCESS_KEY.to_owned(),
            return_url: return_url.into(),
            environment: Environment::Sandbox,
        }
    }

    /// Returns the webservice endpoint URL for the configured environment.
    #[must_use]
    pub fn endpoint(&self) -> &'static str {
        self.environment.endpoint()
    }

    /// Validates the configuration.
    ///
    /// Checks that:
    /// - the affiliation number is non-empty and numeric
    /// - the access key is non-empty
    /// - the return URL, when present, parses as an absolute URL
    ///
    /// # Errors
    ///
    /// Returns [`CieloError::Config`] naming the offending value.
    pub fn validate(&self) -> Result<()> {
        if self.affiliation_number.is_empty() {
            return Err(CieloError::Config(
                "affiliation number must not be empty".to_owned(),
            ));
        }

        if !self.affiliation_number.chars().all(|c| c.is_ascii_digit()) {
            return Err(CieloError::Config(format!(
                "affiliation number must be numeric: {}",
                self.affiliation_number
            )));
        }

        if self.access_key.is_empty() {
            return Err(CieloError::Config("access key must not be empty".to_owned()));
        }

        if !self.return_url.is_empty() {
            Url::parse(&self.return_url).map_err(|e| {
                CieloError::Config(format!("invalid return_url '{}': {e}", self.return_url))
            })?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_default_is_sandbox() {
        assert_eq!(Environment::default(), Environment::Sandbox);
    }

    #[test]
    fn test_environment_endpoints() {
        assert_eq!(
            Environment::Production.endpoint(),
            "https://ecommerce.cbmp.com.br/servicos/ecommwsec.do"
        );
        assert_eq!(
            Environment::Sandbox.endpoint(),
            "https://qasecommerce.cielo.com.br/servicos/ecommwsec.do"
        );
    }

    #[test]
    fn test_config_new_is_production() {
        let config = Config::new("1001734898", "key", "https://store.example.com/return");
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.endpoint(), Environment::Production.endpoint());
    }

    #[test]
    fn test_config_sandbox_credentials() {
        let config = Config::sandbox("https://store.example.com/return");
        assert_eq!(config.affiliation_number, "1006993069");
        assert_eq!(config.access_key.len(), 64);
        assert_eq!(config.environment, Environment::Sandbox);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_toml() {
        let toml = r#"
            affiliation_number = "1006993069"
            access_key = "abc123"
            return_url = "https://store.example.com/return"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.affiliation_number, "1006993069");
        assert_eq!(config.environment, Environment::Sandbox);
    }

    #[test]
    fn test_config_from_toml_production() {
        let toml = r#"
            affiliation_number = "1001734898"
            access_key = "abc123"
            environment = "production"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.environment, Environment::Production);
        assert!(config.return_url.is_empty());
    }

    #[test]
    fn test_config_from_toml_missing_credentials() {
        let toml = r#"
            return_url = "https://store.example.com/return"
        "#;

        let result: std::result::Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_empty_affiliation_number_rejected() {
        let config = Config::new("", "key", "");
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("affiliation number"));
    }

    #[test]
    fn test_validate_non_numeric_affiliation_number_rejected() {
        let config = Config::new("10069A3069", "key", "");
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("numeric"));
    }

    #[test]
    fn test_validate_empty_access_key_rejected() {
        let config = Config::new("1006993069", "", "");
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("access key"));
    }

    #[test]
    fn test_validate_malformed_return_url_rejected() {
        let config = Config::new("1006993069", "key", "not a url");
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("return_url"));
    }

    #[test]
    fn test_validate_empty_return_url_allowed() {
        let config = Config::new("1006993069", "key", "");
        assert!(config.validate().is_ok());
    }
}
