use ballot_relay::RelayPolicy;
use ballot_relay_near::{NearConfig, DEFAULT_RPC_URL};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("ballot_relayd: {0} environment variable must be set")]
    Missing(&'static str),

    #[error("ballot_relayd: {0} is invalid: {1}")]
    Invalid(&'static str, String),
}

pub struct Config {
    pub contract_account_id: String,
    pub relayer_private_key: String,
    pub relayer_account_id: String,
    pub store_uri: String,
    pub database_name: String,
    pub collection_name: String,
    pub server_port: u16,
    pub admin_api_key: String,
    pub rpc_url: String,
    pub request_timeout: Duration,
    pub policy: RelayPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| match lookup(name) {
            Some(val) if !val.trim().is_empty() => Ok(val),
            _ => Err(ConfigError::Missing(name)),
        };

        let defaults = RelayPolicy::default();
        let policy = RelayPolicy {
            batch_limit: parse_or(&lookup, "RELAY_BATCH_LIMIT", defaults.batch_limit)?,
            min_flush: parse_or(&lookup, "RELAY_MIN_FLUSH", defaults.min_flush)?,
            gas: defaults.gas,
        };
        if policy.batch_limit == 0 {
            return Err(ConfigError::Invalid(
                "RELAY_BATCH_LIMIT",
                "must be at least 1".to_owned(),
            ));
        }
        // Claims never return more than batch_limit keys, so a larger threshold is never met
        if policy.min_flush > policy.batch_limit {
            return Err(ConfigError::Invalid(
                "RELAY_MIN_FLUSH",
                format!("must not exceed RELAY_BATCH_LIMIT ({})", policy.batch_limit),
            ));
        }

        let server_port = required("SERVER_PORT")?;
        let server_port: u16 = server_port
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid("SERVER_PORT", server_port))?;

        Ok(Config {
            contract_account_id: required("CONTRACT_ACCOUNT_ID")?,
            relayer_private_key: required("RELAYER_PRIVATE_KEY")?,
            relayer_account_id: required("RELAYER_ACCOUNT_ID")?,
            store_uri: required("STORE_URI")?,
            database_name: required("DATABASE_NAME")?,
            collection_name: required("COLLECTION_NAME")?,
            server_port,
            admin_api_key: required("ADMIN_API_KEY")?,
            rpc_url: lookup("NEAR_RPC_URL").unwrap_or_else(|| DEFAULT_RPC_URL.to_owned()),
            request_timeout: Duration::from_secs(parse_or(
                &lookup,
                "RELAY_REQUEST_TIMEOUT_SECS",
                60,
            )?),
            policy,
        })
    }

    pub fn near(&self) -> NearConfig {
        NearConfig {
            rpc_url: self.rpc_url.clone(),
            contract_account_id: self.contract_account_id.clone(),
            relayer_account_id: self.relayer_account_id.clone(),
            relayer_private_key: self.relayer_private_key.clone(),
            request_timeout: self.request_timeout,
        }
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(val) => val
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(name, val)),
        None => Ok(default),
    }
}
