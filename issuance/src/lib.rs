//! FanLedger Issuance
//!
//! Sells numbered items in limited per-item quantities against two payment
//! rails:
//! - Native value attached to the call
//! - A pre-approved fungible payment token
//!
//! The owner withdraws whatever the ledger collects.

pub mod config;
pub mod error;
pub mod ledger;

pub use config::{deploy_issuance, ConfigError, DeployConfig, Deployment, Network};
pub use error::{IssuanceError, Result};
pub use ledger::{IssuanceHost, IssuanceLedger, IssuanceParams, URI_ID_PLACEHOLDER};
