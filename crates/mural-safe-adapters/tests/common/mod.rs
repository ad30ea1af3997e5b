#![allow(dead_code)]

use std::io::Read;
use std::sync::{Arc, Mutex};
use std::thread;

use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::sol_types::{SolCall, SolValue};
use serde_json::Value;
use tiny_http::{Response, Server, StatusCode};

use mural_safe_adapters::contracts::{GnosisSafe, GnosisSafeProxyFactory};
use mural_safe_adapters::{AdapterConfig, Eip1193Adapter};
use mural_safe_core::Network;

pub const SENT_TX_HASH: &str =
    "0x1111111111111111111111111111111111111111111111111111111111111111";

pub fn addr(raw: &str) -> Address {
    raw.parse().expect("valid address")
}

pub fn executor() -> Address {
    addr("0x1000000000000000000000000000000000000001")
}

pub fn safe_address() -> Address {
    addr("0x000000000000000000000000000000000000BEEF")
}

/// On-chain state served by [`MockNode`].
#[derive(Debug, Clone)]
pub struct MockChain {
    pub chain_id: u64,
    pub accounts: Vec<Address>,
    pub balance: U256,
    pub owners: Vec<Address>,
    pub threshold: u64,
    pub nonce: u64,
    pub version: String,
    pub creation_code: Bytes,
    /// Owners reported as having approved any hash.
    pub approvals: Vec<Address>,
    pub receipt_status: &'static str,
    /// Receipt lookups answered with `null` before the receipt appears.
    pub pending_receipt_polls: usize,
    /// JSON-RPC error returned for `eth_sendTransaction`, as a wallet rejection would be.
    pub send_error: Option<(i64, &'static str)>,
}

impl Default for MockChain {
    fn default() -> Self {
        Self {
            chain_id: Network::sepolia().chain_id,
            accounts: vec![executor()],
            balance: U256::from(2_500_000_000_000_000_000u128),
            owners: vec![executor()],
            threshold: 1,
            nonce: 7,
            version: "1.3.0".to_owned(),
            creation_code: Bytes::from(vec![0x60, 0x80, 0x60, 0x40, 0x52]),
            approvals: Vec::new(),
            receipt_status: "0x1",
            pending_receipt_polls: 0,
            send_error: None,
        }
    }
}

/// JSON-RPC node answering the calls the adapters make.
pub struct MockNode {
    pub url: String,
    pub requests: Arc<Mutex<Vec<Value>>>,
}

impl MockNode {
    pub fn start(chain: MockChain) -> Self {
        let server = Server::http("127.0.0.1:0").expect("start server");
        let url = format!("http://{}", server.server_addr());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);

        thread::spawn(move || {
            let mut pending_receipts = chain.pending_receipt_polls;
            for mut req in server.incoming_requests() {
                let mut body = String::new();
                if req.as_reader().read_to_string(&mut body).is_err() {
                    continue;
                }
                let payload: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
                if let Ok(mut g) = recorded.lock() {
                    g.push(payload.clone());
                }
                let method = payload["method"].as_str().unwrap_or_default();
                let params = &payload["params"];

                let reply = match method {
                    "eth_requestAccounts" | "eth_accounts" => Ok(serde_json::json!(chain
                        .accounts
                        .iter()
                        .map(|a| a.to_string())
                        .collect::<Vec<_>>())),
                    "eth_chainId" => Ok(Value::String(format!("{:#x}", chain.chain_id))),
                    "eth_getBalance" => Ok(Value::String(format!("{:#x}", chain.balance))),
                    "eth_call" => Ok(Value::String(answer_call(&chain, params))),
                    "eth_sendTransaction" => match chain.send_error {
                        Some((code, message)) => Err((code, message.to_owned())),
                        None => Ok(Value::String(SENT_TX_HASH.to_owned())),
                    },
                    "eth_getTransactionReceipt" => {
                        if pending_receipts > 0 {
                            pending_receipts -= 1;
                            Ok(Value::Null)
                        } else {
                            Ok(serde_json::json!({
                                "transactionHash": params[0],
                                "blockNumber": "0x10",
                                "status": chain.receipt_status,
                            }))
                        }
                    }
                    _ => Err((-32601i64, format!("method {method} not supported"))),
                };

                let response = match reply {
                    Ok(result) => serde_json::json!({"jsonrpc": "2.0", "id": 1, "result": result}),
                    Err((code, message)) => serde_json::json!({
                        "jsonrpc": "2.0",
                        "id": 1,
                        "error": {"code": code, "message": message},
                    }),
                };
                let _ = req.respond(
                    Response::from_string(response.to_string()).with_status_code(StatusCode(200)),
                );
            }
        });

        Self { url, requests }
    }

    pub fn config(&self) -> AdapterConfig {
        AdapterConfig {
            wallet_rpc_url: Some(self.url.clone()),
            receipt_poll_interval_ms: 5,
            receipt_timeout_ms: 2_000,
            ..AdapterConfig::default()
        }
    }

    pub fn provider(&self) -> Eip1193Adapter {
        Eip1193Adapter::with_config(&self.config())
    }

    pub fn methods(&self) -> Vec<String> {
        self.requests
            .lock()
            .expect("requests lock")
            .iter()
            .map(|r| r["method"].as_str().unwrap_or_default().to_owned())
            .collect()
    }

    /// Params of every `eth_sendTransaction` seen so far.
    pub fn sent_transactions(&self) -> Vec<Value> {
        self.requests
            .lock()
            .expect("requests lock")
            .iter()
            .filter(|r| r["method"] == "eth_sendTransaction")
            .map(|r| r["params"][0].clone())
            .collect()
    }
}

fn answer_call(chain: &MockChain, params: &Value) -> String {
    let data: Bytes = params[0]["data"]
        .as_str()
        .unwrap_or("0x")
        .parse()
        .unwrap_or_default();
    if data.len() < 4 {
        return "0x".to_owned();
    }
    let selector: [u8; 4] = [data[0], data[1], data[2], data[3]];
    let encoded = if selector == GnosisSafe::VERSIONCall::SELECTOR {
        chain.version.abi_encode()
    } else if selector == GnosisSafe::nonceCall::SELECTOR {
        U256::from(chain.nonce).abi_encode()
    } else if selector == GnosisSafe::getOwnersCall::SELECTOR {
        chain.owners.abi_encode()
    } else if selector == GnosisSafe::getThresholdCall::SELECTOR {
        U256::from(chain.threshold).abi_encode()
    } else if selector == GnosisSafe::approvedHashesCall::SELECTOR {
        let call =
            GnosisSafe::approvedHashesCall::abi_decode(&data, true).expect("approvedHashes args");
        let approved = chain.approvals.contains(&call.owner);
        U256::from(u8::from(approved)).abi_encode()
    } else if selector == GnosisSafeProxyFactory::proxyCreationCodeCall::SELECTOR {
        chain.creation_code.abi_encode()
    } else {
        Vec::new()
    };
    format!("0x{}", alloy::hex::encode(encoded))
}

pub fn sent_hash() -> B256 {
    SENT_TX_HASH.parse().expect("valid hash")
}
