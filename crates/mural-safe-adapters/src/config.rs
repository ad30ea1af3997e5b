use std::path::PathBuf;

use alloy::primitives::{address, Address};
use mural_safe_core::Network;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuntimeProfile {
    #[default]
    Development,
    /// No deterministic fallbacks: a missing wallet endpoint disables the provider.
    Production,
}

impl RuntimeProfile {
    fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(RuntimeProfile::Development),
            "production" | "prod" => Ok(RuntimeProfile::Production),
            other => Err(ConfigError::Invalid {
                key: "MURAL_RUNTIME_PROFILE",
                value: other.to_owned(),
            }),
        }
    }
}

/// Safe v1.3.0 contract addresses used for deployments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafeDeployment {
    pub singleton: Address,
    pub proxy_factory: Address,
    pub fallback_handler: Address,
}

impl Default for SafeDeployment {
    fn default() -> Self {
        Self {
            singleton: address!("d9Db270c1B5E3Bd161E8c8503c55cEABeE709552"),
            proxy_factory: address!("a6B71E26C5e0845f74c812102Ca7114b6a896AB2"),
            fallback_handler: address!("f48f2B2d2a534e402487b3ee7C18c33Aec0Fe5e4"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
    #[error("unknown network {0:?}")]
    UnknownNetwork(String),
}

/// Environment variable holding the wallet JSON-RPC endpoint.
pub const WALLET_RPC_URL_ENV: &str = "MURAL_WALLET_RPC_URL";

#[derive(Debug, Clone)]
pub struct AdapterConfig {
    pub runtime_profile: RuntimeProfile,
    pub network: Network,
    pub wallet_rpc_url: Option<String>,
    pub etherscan_api_key: Option<String>,
    pub etherscan_api_url: Option<String>,
    pub request_timeout_ms: u64,
    pub receipt_poll_interval_ms: u64,
    pub receipt_timeout_ms: u64,
    pub store_path: Option<PathBuf>,
    pub onboarding_url: String,
    pub safe_deployment: SafeDeployment,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            runtime_profile: RuntimeProfile::Development,
            network: Network::sepolia(),
            wallet_rpc_url: None,
            etherscan_api_key: None,
            etherscan_api_url: None,
            request_timeout_ms: 15_000,
            receipt_poll_interval_ms: 1_000,
            receipt_timeout_ms: 180_000,
            store_path: None,
            onboarding_url: "https://metamask.io/download/".to_owned(),
            safe_deployment: SafeDeployment::default(),
        }
    }
}

impl AdapterConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Applies overrides from `lookup` on top of the defaults. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
        };
        let mut config = Self::default();

        if let Some(raw) = get("MURAL_RUNTIME_PROFILE") {
            config.runtime_profile = RuntimeProfile::parse(&raw)?;
        }
        if let Some(raw) = get("MURAL_NETWORK") {
            config.network = Network::by_name(&raw).ok_or(ConfigError::UnknownNetwork(raw))?;
        }
        config.wallet_rpc_url = get(WALLET_RPC_URL_ENV);
        config.etherscan_api_key =
            get("ETHERSCAN_API_KEY").or_else(|| get("EITHER_SCAN_API_KEY"));
        config.etherscan_api_url = get("MURAL_ETHERSCAN_URL");
        if let Some(raw) = get("MURAL_REQUEST_TIMEOUT_MS") {
            config.request_timeout_ms = parse_millis("MURAL_REQUEST_TIMEOUT_MS", &raw)?;
        }
        if let Some(raw) = get("MURAL_RECEIPT_POLL_MS") {
            config.receipt_poll_interval_ms = parse_millis("MURAL_RECEIPT_POLL_MS", &raw)?;
        }
        if let Some(raw) = get("MURAL_RECEIPT_TIMEOUT_MS") {
            config.receipt_timeout_ms = parse_millis("MURAL_RECEIPT_TIMEOUT_MS", &raw)?;
        }
        config.store_path = get("MURAL_SAFE_STORE").map(PathBuf::from);
        if let Some(url) = get("MURAL_ONBOARDING_URL") {
            config.onboarding_url = url;
        }
        Ok(config)
    }

    pub fn strict_runtime_required(&self) -> bool {
        self.runtime_profile == RuntimeProfile::Production
    }

    pub fn etherscan_url(&self) -> &str {
        self.etherscan_api_url
            .as_deref()
            .unwrap_or(&self.network.etherscan_api_url)
    }
}

fn parse_millis(key: &'static str, raw: &str) -> Result<u64, ConfigError> {
    match raw.parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(ms),
        _ => Err(ConfigError::Invalid {
            key,
            value: raw.to_owned(),
        }),
    }
}
