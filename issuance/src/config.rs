//! Deployment configuration
//!
//! Parameters come from a TOML file and may be overridden per variable from
//! the environment:
//!
//! ```toml
//! network = "development"
//! max_token_id = 9
//! max_amount_of_each_token = 1000
//! token_price_by_wei = "10000000000000000"
//! token_price_by_payment_token = "30000000000000000000"
//! metadata_uri = "ipfs://items/{id}.json"
//! # payment_token_address = "0x..."   (required on live)
//! ```
//!
//! Amounts above `i64::MAX` do not fit a TOML integer, so every amount also
//! accepts a decimal string.

use crate::error::IssuanceError;
use crate::ledger::{IssuanceHost, IssuanceLedger, IssuanceParams};
use fanledger_core::{Address, Amount, ItemId, MemoryToken};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

pub const ENV_MAX_TOKEN_ID: &str = "MAX_TOKEN_ID";
pub const ENV_MAX_AMOUNT_OF_EACH_TOKEN: &str = "MAX_AMOUNT_OF_EACH_TOKEN";
pub const ENV_TOKEN_PRICE_BY_WEI: &str = "TOKEN_PRICE_BY_WEI";
pub const ENV_TOKEN_PRICE_BY_PAYMENT_TOKEN: &str = "TOKEN_PRICE_BY_PAYMENT_TOKEN";
pub const ENV_METADATA_URI: &str = "METADATA_URI";
pub const ENV_PAYMENT_TOKEN_ADDRESS: &str = "PAYMENT_TOKEN_ADDRESS";
pub const ENV_NETWORK: &str = "NETWORK";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Live deployments need a payment token address")]
    MissingPaymentToken,

    #[error("Payment token {0} is not a deployed token contract")]
    UnregisteredToken(Address),

    #[error("Deployment rejected: {0}")]
    Ledger(#[from] IssuanceError),
}

/// Which payment token gets wired in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Use the configured, already deployed payment token
    Live,
    /// Deploy a mock payment token alongside the ledger
    #[default]
    Development,
}

impl FromStr for Network {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "live" => Ok(Network::Live),
            "development" | "dev" => Ok(Network::Development),
            other => Err(ConfigError::InvalidValue {
                key: ENV_NETWORK.to_string(),
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Live => write!(f, "live"),
            Network::Development => write!(f, "development"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployConfig {
    #[serde(default)]
    pub network: Network,
    pub max_token_id: ItemId,
    #[serde(with = "amount_text")]
    pub max_amount_of_each_token: Amount,
    #[serde(with = "amount_text")]
    pub token_price_by_wei: Amount,
    #[serde(with = "amount_text")]
    pub token_price_by_payment_token: Amount,
    #[serde(default)]
    pub metadata_uri: String,
    #[serde(default)]
    pub payment_token_address: Option<Address>,
}

impl DeployConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Overlay values from the process environment
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Overlay values from `lookup`; keys it returns `None` for are left as is
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_NETWORK) {
            self.network = value.parse()?;
        }
        if let Some(value) = lookup(ENV_MAX_TOKEN_ID) {
            self.max_token_id = parse_value(ENV_MAX_TOKEN_ID, &value)?;
        }
        if let Some(value) = lookup(ENV_MAX_AMOUNT_OF_EACH_TOKEN) {
            self.max_amount_of_each_token = parse_value(ENV_MAX_AMOUNT_OF_EACH_TOKEN, &value)?;
        }
        if let Some(value) = lookup(ENV_TOKEN_PRICE_BY_WEI) {
            self.token_price_by_wei = parse_value(ENV_TOKEN_PRICE_BY_WEI, &value)?;
        }
        if let Some(value) = lookup(ENV_TOKEN_PRICE_BY_PAYMENT_TOKEN) {
            self.token_price_by_payment_token =
                parse_value(ENV_TOKEN_PRICE_BY_PAYMENT_TOKEN, &value)?;
        }
        if let Some(value) = lookup(ENV_METADATA_URI) {
            self.metadata_uri = value;
        }
        if let Some(value) = lookup(ENV_PAYMENT_TOKEN_ADDRESS) {
            self.payment_token_address = Some(parse_value(ENV_PAYMENT_TOKEN_ADDRESS, &value)?);
        }
        Ok(())
    }

    /// Ledger parameters for a given payment token
    pub fn to_params(&self, payment_token: Address) -> IssuanceParams {
        IssuanceParams {
            max_id: self.max_token_id,
            cap_per_id: self.max_amount_of_each_token,
            price_native: self.token_price_by_wei,
            price_payment_token: self.token_price_by_payment_token,
            payment_token,
            metadata_uri: self.metadata_uri.clone(),
        }
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// A deployed ledger, plus the mock payment token on development networks
pub struct Deployment {
    pub ledger: IssuanceLedger,
    pub mock_payment_token: Option<Arc<MemoryToken>>,
}

/// Deploy an issuance ledger at `address` for `owner`
pub fn deploy_issuance(
    config: &DeployConfig,
    address: Address,
    owner: Address,
    host: IssuanceHost,
) -> Result<Deployment, ConfigError> {
    let (payment_token, mock_payment_token) = match config.network {
        Network::Live => {
            let token = config
                .payment_token_address
                .filter(|a| !a.is_zero())
                .ok_or(ConfigError::MissingPaymentToken)?;
            if !host.tokens.contains(&token) {
                return Err(ConfigError::UnregisteredToken(token));
            }
            (token, None)
        }
        Network::Development => {
            let token_address = Address::derive(&format!("{}:payment-token-mock", address));
            let mock = Arc::new(MemoryToken::new(token_address));
            host.tokens.register(token_address, mock.clone());
            log::info!("deployed mock payment token {}", token_address);
            (token_address, Some(mock))
        }
    };

    log::info!("deploying issuance ledger on {}", config.network);
    let ledger = IssuanceLedger::new(address, owner, config.to_params(payment_token), host)?;

    Ok(Deployment {
        ledger,
        mock_payment_token,
    })
}

/// Amounts as a TOML integer or a decimal string
mod amount_text {
    use fanledger_core::Amount;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(u64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(amount: &Amount, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&amount.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Amount, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Int(value) => Ok(Amount::from(value)),
            Raw::Text(text) => text
                .trim()
                .replace('_', "")
                .parse()
                .map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SAMPLE: &str = r#"
        max_token_id = 9
        max_amount_of_each_token = 1000
        token_price_by_wei = "10000000000000000"
        token_price_by_payment_token = "30_000000000000000000"
        metadata_uri = "MockURI"
    "#;

    #[test]
    fn test_parse_sample() {
        let config = DeployConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.network, Network::Development);
        assert_eq!(config.max_token_id, 9);
        assert_eq!(config.max_amount_of_each_token, 1000);
        assert_eq!(config.token_price_by_wei, 10_000_000_000_000_000);
        assert_eq!(config.token_price_by_payment_token, 30_000_000_000_000_000_000);
        assert_eq!(config.payment_token_address, None);
    }

    #[test]
    fn test_missing_field_is_parse_error() {
        let result = DeployConfig::from_toml_str("max_token_id = 9");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_overrides_take_precedence() {
        let mut config = DeployConfig::from_toml_str(SAMPLE).unwrap();
        let token = Address::derive("usdc");
        let env: HashMap<&str, String> = HashMap::from([
            (ENV_NETWORK, "live".to_string()),
            (ENV_MAX_TOKEN_ID, "19".to_string()),
            (ENV_METADATA_URI, "ipfs://x/{id}".to_string()),
            (ENV_PAYMENT_TOKEN_ADDRESS, token.to_hex()),
        ]);

        config.apply_overrides(|key| env.get(key).cloned()).unwrap();

        assert_eq!(config.network, Network::Live);
        assert_eq!(config.max_token_id, 19);
        assert_eq!(config.metadata_uri, "ipfs://x/{id}");
        assert_eq!(config.payment_token_address, Some(token));
        assert_eq!(config.max_amount_of_each_token, 1000);
    }

    #[test]
    fn test_bad_override_is_rejected() {
        let mut config = DeployConfig::from_toml_str(SAMPLE).unwrap();
        let result = config.apply_overrides(|key| {
            (key == ENV_TOKEN_PRICE_BY_WEI).then(|| "lots".to_string())
        });

        match result {
            Err(ConfigError::InvalidValue { key, value }) => {
                assert_eq!(key, ENV_TOKEN_PRICE_BY_WEI);
                assert_eq!(value, "lots");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_network_parsing() {
        assert_eq!("LIVE".parse::<Network>().unwrap(), Network::Live);
        assert_eq!("dev".parse::<Network>().unwrap(), Network::Development);
        assert!("mainnet".parse::<Network>().is_err());
    }
}
