use alloy::primitives::{address, Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

/// Head of the Safe owner linked list.
pub const SENTINEL_OWNER: Address = address!("0000000000000000000000000000000000000001");

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimestampMs(pub u64);

/// Etherscan's multichain endpoint; the network is picked by `chainid`.
pub const ETHERSCAN_V2_API_URL: &str = "https://api.etherscan.io/v2/api";

/// An EVM network the application talks to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    pub name: String,
    pub chain_id: u64,
    pub explorer_url: String,
    pub etherscan_api_url: String,
}

impl Network {
    pub fn mainnet() -> Self {
        Self {
            name: "mainnet".to_owned(),
            chain_id: 1,
            explorer_url: "https://etherscan.io".to_owned(),
            etherscan_api_url: ETHERSCAN_V2_API_URL.to_owned(),
        }
    }

    pub fn goerli() -> Self {
        Self {
            name: "goerli".to_owned(),
            chain_id: 5,
            explorer_url: "https://goerli.etherscan.io".to_owned(),
            etherscan_api_url: ETHERSCAN_V2_API_URL.to_owned(),
        }
    }

    pub fn sepolia() -> Self {
        Self {
            name: "sepolia".to_owned(),
            chain_id: 11_155_111,
            explorer_url: "https://sepolia.etherscan.io".to_owned(),
            etherscan_api_url: ETHERSCAN_V2_API_URL.to_owned(),
        }
    }

    pub fn builtin() -> Vec<Network> {
        vec![Self::mainnet(), Self::goerli(), Self::sepolia()]
    }

    pub fn by_name(name: &str) -> Option<Network> {
        let name = name.trim().to_ascii_lowercase();
        let name = match name.as_str() {
            "ethereum" | "homestead" => "mainnet",
            other => other,
        };
        Self::builtin().into_iter().find(|n| n.name == name)
    }

    pub fn tx_url(&self, hash: &B256) -> String {
        format!("{}/tx/{}", self.explorer_url, hash)
    }

    pub fn address_url(&self, address: &Address) -> String {
        format!("{}/address/{}", self.explorer_url, address)
    }
}

/// A Safe the user deployed from this application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafeRecord {
    pub address: Address,
    pub chain_id: u64,
    pub added_at_ms: TimestampMs,
}

/// One row of an account's transaction history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub hash: B256,
    pub block_hash: Option<B256>,
    pub block_number: u64,
    pub from: Address,
    pub to: Option<Address>,
    pub value: U256,
    /// Unix seconds.
    pub timestamp: Option<u64>,
    pub is_error: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafeAccountConfig {
    pub owners: Vec<Address>,
    pub threshold: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafeInfo {
    pub address: Address,
    pub balance: U256,
    pub owners: Vec<Address>,
    pub threshold: u64,
    pub nonce: u64,
    pub version: String,
}

impl SafeInfo {
    pub fn is_owner(&self, candidate: &Address) -> bool {
        self.owners.iter().any(|o| o == candidate)
    }
}

/// Owner-management call to be executed by a Safe on itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OwnerChange {
    Add {
        owner: Address,
        threshold: u64,
    },
    Remove {
        prev_owner: Address,
        owner: Address,
        threshold: u64,
    },
}

impl OwnerChange {
    pub fn owner(&self) -> Address {
        match self {
            OwnerChange::Add { owner, .. } | OwnerChange::Remove { owner, .. } => *owner,
        }
    }

    pub fn threshold(&self) -> u64 {
        match self {
            OwnerChange::Add { threshold, .. } | OwnerChange::Remove { threshold, .. } => {
                *threshold
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxRequest {
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
}

impl TxRequest {
    pub fn transfer(from: Address, to: Address, value: U256) -> Self {
        Self {
            from,
            to,
            value,
            data: Bytes::new(),
        }
    }

    /// JSON-RPC `eth_sendTransaction` parameter object.
    pub fn to_rpc_json(&self) -> serde_json::Value {
        let mut obj = serde_json::json!({
            "from": self.from.to_string(),
            "to": self.to.to_string(),
            "value": format!("{:#x}", self.value),
        });
        if !self.data.is_empty() {
            obj["data"] = serde_json::Value::String(self.data.to_string());
        }
        obj
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    pub tx_hash: B256,
    pub block_number: Option<u64>,
    pub success: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderEventKind {
    AccountsChanged,
    ChainChanged,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEvent {
    pub sequence: u64,
    pub kind: ProviderEventKind,
    pub value: String,
}
