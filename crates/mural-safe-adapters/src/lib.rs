pub mod clock;
pub mod config;
pub mod contracts;
pub mod eip1193;
pub mod etherscan;
pub mod safe_sdk;
pub mod store;

pub use clock::SystemClockAdapter;
pub use config::{AdapterConfig, ConfigError, RuntimeProfile, SafeDeployment, WALLET_RPC_URL_ENV};
pub use eip1193::Eip1193Adapter;
pub use etherscan::EtherscanAdapter;
pub use safe_sdk::{predict_safe_address, SafeSdkAdapter};
pub use store::{JsonFileStore, MemoryStore};
