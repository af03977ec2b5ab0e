use std::path::Path;
use std::time::Duration;

use alloy::primitives::{Address, address};
use alloy::transports::http::reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Local Anvil node.
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";
/// First contract deployed by the default Anvil account.
pub const DEFAULT_CONTRACT_ADDRESS: Address = address!("5FbDB2315678afecb367f032d93F642f64180aa3");

pub const RPC_URL_ENV: &str = "TRUSTLESS_RPC_URL";
pub const CONTRACT_ADDRESS_ENV: &str = "TRUSTLESS_CONTRACT_ADDRESS";

/// Where the `SellingAgreement` contract lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChainConfig {
    pub rpc_url: String,
    pub contract_address: Address,
    /// Upper bound on waiting for block inclusion.
    pub confirmation_timeout_secs: u64,
    /// Receipt polling interval.
    pub poll_interval_ms: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            contract_address: DEFAULT_CONTRACT_ADDRESS,
            confirmation_timeout_secs: 60,
            poll_interval_ms: 500,
        }
    }
}

impl ChainConfig {
    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.confirmation_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn rpc_url(&self) -> Result<Url, ConfigError> {
        self.rpc_url
            .parse()
            .map_err(|e| ConfigError::RpcUrl(format!("{}: {e}", self.rpc_url)))
    }

    /// Read a JSON config file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::File(e.to_string()))?;
        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|e| ConfigError::File(e.to_string()))?;
        config.rpc_url()?;
        Ok(config)
    }

    /// Apply `TRUSTLESS_RPC_URL` / `TRUSTLESS_CONTRACT_ADDRESS` when set.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(
            std::env::var(RPC_URL_ENV).ok().as_deref(),
            std::env::var(CONTRACT_ADDRESS_ENV).ok().as_deref(),
        )
    }

    pub fn with_overrides(
        mut self,
        rpc_url: Option<&str>,
        contract_address: Option<&str>,
    ) -> Result<Self, ConfigError> {
        if let Some(url) = rpc_url.map(str::trim).filter(|s| !s.is_empty()) {
            self.rpc_url = url.to_string();
            self.rpc_url()?;
        }
        if let Some(addr) = contract_address.map(str::trim).filter(|s| !s.is_empty()) {
            self.contract_address = addr
                .parse()
                .map_err(|e| ConfigError::ContractAddress(format!("{addr}: {e}")))?;
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = ChainConfig::from_json(r#"{"rpcUrl":"http://node:8545"}"#).unwrap();
        assert_eq!(config.rpc_url, "http://node:8545");
        assert_eq!(config.contract_address, DEFAULT_CONTRACT_ADDRESS);
        assert_eq!(config.confirmation_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn rejects_bad_url() {
        assert!(matches!(
            ChainConfig::from_json(r#"{"rpcUrl":"not a url"}"#),
            Err(ConfigError::RpcUrl(_))
        ));
    }

    #[test]
    fn overrides() {
        let config = ChainConfig::default()
            .with_overrides(
                Some("https://rpc.example.org"),
                Some("0x000000000000000000000000000000000000dEaD"),
            )
            .unwrap();
        assert_eq!(config.rpc_url, "https://rpc.example.org");
        assert_eq!(
            config.contract_address,
            address!("000000000000000000000000000000000000dEaD")
        );

        let unchanged = ChainConfig::default().with_overrides(Some("  "), None).unwrap();
        assert_eq!(unchanged, ChainConfig::default());

        assert!(matches!(
            ChainConfig::default().with_overrides(None, Some("0x1234")),
            Err(ConfigError::ContractAddress(_))
        ));
    }
}
