// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! by the curation workflow. Configuration is loaded from the environment
//! once by the embedding application.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `CURATION_KEY_PREFIX` | Prefix for record and index keys | `tool` |
//! | `CURATION_CHAIN_ID` | Chain id bound into disclosure challenges | `11155111` |
//! | `CURATION_STORE_ADDRESS` | Key/value store contract address | Required for `ContractStore` |
//! | `CURATION_RPC_URL` | JSON-RPC endpoint of the store contract | Optional |
//! | `DISCLOSURE_DURATION_DAYS` | Disclosure window length in days | `30` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |

use url::Url;

use crate::disclosure::DEFAULT_DURATION_DAYS;
use crate::error::CurationResult;
use crate::storage::{StoreKeys, DEFAULT_KEY_PREFIX};
use crate::telemetry::LogFormat;

/// Environment variable name for the record key prefix.
///
/// Records are stored under `{prefix}_{id}` and the index under
/// `{prefix}_keys`.
pub const KEY_PREFIX_ENV: &str = "CURATION_KEY_PREFIX";

/// Environment variable name for the chain id.
///
/// # Default
/// `11155111` (Sepolia)
pub const CHAIN_ID_ENV: &str = "CURATION_CHAIN_ID";

/// Default chain id.
pub const DEFAULT_CHAIN_ID: u64 = 11155111;

/// Environment variable name for the store contract address.
pub const STORE_ADDRESS_ENV: &str = "CURATION_STORE_ADDRESS";

/// Environment variable name for the JSON-RPC endpoint.
pub const RPC_URL_ENV: &str = "CURATION_RPC_URL";

/// Environment variable name for the disclosure window length.
pub const DISCLOSURE_DURATION_ENV: &str = "DISCLOSURE_DURATION_DAYS";

/// Environment variable name for the log output format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} has an invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(name: &'static str, value: &str, reason: impl ToString) -> Self {
        ConfigError::Invalid {
            name,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Workflow configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurationConfig {
    pub key_prefix: String,
    pub chain_id: u64,
    pub store_address: Option<String>,
    pub rpc_url: Option<Url>,
    pub disclosure_duration_days: u32,
    pub log_format: LogFormat,
}

impl Default for CurationConfig {
    fn default() -> Self {
        Self {
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            chain_id: DEFAULT_CHAIN_ID,
            store_address: None,
            rpc_url: None,
            disclosure_duration_days: DEFAULT_DURATION_DAYS,
            log_format: LogFormat::default(),
        }
    }
}

impl CurationConfig {
    /// Load from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable lookup.
    ///
    /// Unset and blank variables fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let key_prefix = match get(KEY_PREFIX_ENV) {
            Some(prefix) => {
                if !StoreKeys::is_valid_prefix(&prefix) {
                    return Err(ConfigError::invalid(
                        KEY_PREFIX_ENV,
                        &prefix,
                        "expected ASCII letters, digits or '-'",
                    ));
                }
                prefix
            }
            None => defaults.key_prefix,
        };

        let chain_id = match get(CHAIN_ID_ENV) {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|e| ConfigError::invalid(CHAIN_ID_ENV, &raw, e))?,
            None => defaults.chain_id,
        };

        let rpc_url = match get(RPC_URL_ENV) {
            Some(raw) => {
                Some(Url::parse(&raw).map_err(|e| ConfigError::invalid(RPC_URL_ENV, &raw, e))?)
            }
            None => None,
        };

        let disclosure_duration_days = match get(DISCLOSURE_DURATION_ENV) {
            Some(raw) => {
                let days: u32 = raw
                    .parse()
                    .map_err(|e| ConfigError::invalid(DISCLOSURE_DURATION_ENV, &raw, e))?;
                if days == 0 {
                    return Err(ConfigError::invalid(
                        DISCLOSURE_DURATION_ENV,
                        &raw,
                        "must be at least one day",
                    ));
                }
                days
            }
            None => defaults.disclosure_duration_days,
        };

        let log_format = match get(LOG_FORMAT_ENV) {
            Some(raw) => raw
                .parse::<LogFormat>()
                .map_err(|e| ConfigError::invalid(LOG_FORMAT_ENV, &raw, e))?,
            None => defaults.log_format,
        };

        Ok(Self {
            key_prefix,
            chain_id,
            store_address: get(STORE_ADDRESS_ENV),
            rpc_url,
            disclosure_duration_days,
            log_format,
        })
    }

    /// Key layout for this configuration.
    pub fn store_keys(&self) -> CurationResult<StoreKeys> {
        StoreKeys::new(self.key_prefix.clone())
    }
}
