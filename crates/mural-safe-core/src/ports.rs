use alloy::primitives::{Address, Bytes, B256, U256};
use thiserror::Error;

use crate::domain::{
    HistoryEntry, OwnerChange, ProviderEvent, SafeAccountConfig, SafeInfo, SafeRecord, TxReceipt,
    TxRequest,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortError {
    #[error("port not implemented: {0}")]
    NotImplemented(&'static str),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("policy error: {0}")]
    Policy(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("wrong network: expected chain {expected}, wallet is on chain {actual}")]
    WrongNetwork { expected: u64, actual: u64 },
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("transaction {0} reverted")]
    Reverted(B256),
    #[error("timed out: {0}")]
    Timeout(String),
}

/// EIP-1193 style wallet provider.
pub trait ProviderPort {
    /// False when no wallet is installed or configured.
    fn is_available(&self) -> bool;
    /// Prompts the wallet for access (`eth_requestAccounts`).
    fn request_accounts(&self) -> Result<Vec<Address>, PortError>;
    /// Accounts already exposed to the app (`eth_accounts`), never prompts.
    fn accounts(&self) -> Result<Vec<Address>, PortError>;
    fn chain_id(&self) -> Result<u64, PortError>;
    fn get_balance(&self, address: Address) -> Result<U256, PortError>;
    fn send_transaction(&self, tx: &TxRequest) -> Result<B256, PortError>;
    fn call(&self, to: Address, data: Bytes) -> Result<Bytes, PortError>;
    fn transaction_receipt(&self, tx_hash: B256) -> Result<Option<TxReceipt>, PortError>;
    fn drain_events(&self) -> Result<Vec<ProviderEvent>, PortError>;
}

/// Account transaction history (an Etherscan-compatible indexer).
pub trait HistoryPort {
    fn history(&self, address: Address) -> Result<Vec<HistoryEntry>, PortError>;
}

/// Safe contract interactions: deployment, reads, owner management.
pub trait SafeSdkPort {
    fn deploy_safe(
        &self,
        deployer: Address,
        config: &SafeAccountConfig,
        salt_nonce: U256,
    ) -> Result<Address, PortError>;
    fn safe_info(&self, safe: Address) -> Result<SafeInfo, PortError>;
    fn execute_owner_change(
        &self,
        executor: Address,
        safe: Address,
        change: &OwnerChange,
    ) -> Result<TxReceipt, PortError>;
}

/// Known Safes, keyed by address.
pub trait SafeStorePort {
    /// Fails with [`PortError::Conflict`] when the address is already stored.
    fn add(&self, record: SafeRecord) -> Result<(), PortError>;
    /// All records ordered by address.
    fn list(&self) -> Result<Vec<SafeRecord>, PortError>;
    fn get(&self, address: Address) -> Result<Option<SafeRecord>, PortError>;
    /// Returns whether a record was removed.
    fn remove(&self, address: Address) -> Result<bool, PortError>;
}

impl<T: SafeStorePort + ?Sized> SafeStorePort for Box<T> {
    fn add(&self, record: SafeRecord) -> Result<(), PortError> {
        (**self).add(record)
    }

    fn list(&self) -> Result<Vec<SafeRecord>, PortError> {
        (**self).list()
    }

    fn get(&self, address: Address) -> Result<Option<SafeRecord>, PortError> {
        (**self).get(address)
    }

    fn remove(&self, address: Address) -> Result<bool, PortError> {
        (**self).remove(address)
    }
}

pub trait ClockPort {
    fn now_ms(&self) -> Result<u64, PortError>;
}
