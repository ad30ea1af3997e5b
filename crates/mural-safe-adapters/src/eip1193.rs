use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use alloy::primitives::{address, keccak256, Address, Bytes, B256, U256};
use serde_json::Value;
use tracing::{debug, warn};

use mural_safe_core::{
    PortError, ProviderEvent, ProviderEventKind, ProviderPort, TxReceipt, TxRequest,
};

use crate::AdapterConfig;

/// Wallet provider speaking EIP-1193 JSON-RPC.
///
/// With a configured RPC endpoint every call is proxied to it. Otherwise the
/// development profile falls back to an in-memory wallet that can move ether
/// between accounts but has no EVM, and the production profile disables the
/// provider altogether.
#[derive(Debug, Clone)]
pub struct Eip1193Adapter {
    mode: ProviderMode,
    state: Arc<Mutex<ProviderState>>,
}

#[derive(Debug, Clone)]
enum ProviderMode {
    Disabled(String),
    Deterministic,
    Proxy(ProxyRuntime),
}

#[derive(Debug, Clone)]
struct ProxyRuntime {
    base_url: String,
    client: reqwest::blocking::Client,
}

#[derive(Debug, Clone)]
struct ProviderState {
    accounts: Vec<Address>,
    chain_id: u64,
    balances: HashMap<Address, U256>,
    receipts: HashMap<B256, TxReceipt>,
    block_number: u64,
    event_seq: u64,
    events: Vec<ProviderEvent>,
}

const DEV_ACCOUNT: Address = address!("1000000000000000000000000000000000000001");
const DEV_BALANCE_WEI: u128 = 10_000_000_000_000_000_000;

impl ProviderState {
    fn deterministic(chain_id: u64) -> Self {
        Self {
            accounts: vec![DEV_ACCOUNT],
            chain_id,
            balances: HashMap::from([(DEV_ACCOUNT, U256::from(DEV_BALANCE_WEI))]),
            receipts: HashMap::new(),
            block_number: 0,
            event_seq: 0,
            events: Vec::new(),
        }
    }

    fn push_event(&mut self, kind: ProviderEventKind, value: String) {
        self.event_seq = self.event_seq.saturating_add(1);
        let sequence = self.event_seq;
        self.events.push(ProviderEvent {
            sequence,
            kind,
            value,
        });
    }
}

impl Default for Eip1193Adapter {
    fn default() -> Self {
        Self::with_config(&AdapterConfig::default())
    }
}

impl Eip1193Adapter {
    pub fn with_config(config: &AdapterConfig) -> Self {
        let mode = if let Some(ref base_url) = config.wallet_rpc_url {
            let timeout = Duration::from_millis(config.request_timeout_ms);
            match reqwest::blocking::Client::builder().timeout(timeout).build() {
                Ok(client) => ProviderMode::Proxy(ProxyRuntime {
                    base_url: base_url.clone(),
                    client,
                }),
                Err(e) => {
                    if config.strict_runtime_required() {
                        ProviderMode::Disabled(format!(
                            "failed to initialize wallet RPC client in production profile: {e}"
                        ))
                    } else {
                        warn!(error = %e, "wallet RPC client unavailable, using in-memory wallet");
                        ProviderMode::Deterministic
                    }
                }
            }
        } else if config.strict_runtime_required() {
            ProviderMode::Disabled(
                "wallet RPC URL not configured in production runtime profile".to_owned(),
            )
        } else {
            ProviderMode::Deterministic
        };

        Self {
            mode,
            state: Arc::new(Mutex::new(ProviderState::deterministic(
                config.network.chain_id,
            ))),
        }
    }

    pub fn mode_label(&self) -> &'static str {
        match self.mode {
            ProviderMode::Disabled(_) => "disabled",
            ProviderMode::Deterministic => "in-memory",
            ProviderMode::Proxy(_) => "rpc",
        }
    }

    fn check_mode(&self) -> Result<(), PortError> {
        if let ProviderMode::Disabled(reason) = &self.mode {
            return Err(PortError::Policy(reason.clone()));
        }
        Ok(())
    }

    fn lock_state(&self) -> Result<MutexGuard<'_, ProviderState>, PortError> {
        self.state
            .lock()
            .map_err(|e| PortError::Transport(format!("provider lock poisoned: {e}")))
    }

    pub fn debug_inject_accounts_changed(&self, accounts: Vec<Address>) -> Result<(), PortError> {
        let mut g = self.lock_state()?;
        let payload = accounts_payload(&accounts);
        g.accounts = accounts;
        g.push_event(ProviderEventKind::AccountsChanged, payload);
        Ok(())
    }

    pub fn debug_inject_chain_changed(&self, chain_id: u64) -> Result<(), PortError> {
        let mut g = self.lock_state()?;
        g.chain_id = chain_id;
        g.push_event(ProviderEventKind::ChainChanged, chain_id.to_string());
        Ok(())
    }

    /// Credits an in-memory account; only meaningful without an RPC endpoint.
    pub fn debug_fund(&self, account: Address, amount: U256) -> Result<(), PortError> {
        let mut g = self.lock_state()?;
        let balance = g.balances.entry(account).or_insert(U256::ZERO);
        *balance = balance.saturating_add(amount);
        Ok(())
    }

    fn remember_accounts(&self, accounts: &[Address]) -> Result<(), PortError> {
        let mut g = self.lock_state()?;
        if g.accounts != accounts {
            g.accounts = accounts.to_vec();
            g.push_event(ProviderEventKind::AccountsChanged, accounts_payload(accounts));
        }
        Ok(())
    }

    fn proxy_call(&self, method: &str, params: Value) -> Result<Value, PortError> {
        let proxy = match &self.mode {
            ProviderMode::Proxy(proxy) => proxy,
            ProviderMode::Disabled(reason) => return Err(PortError::Policy(reason.clone())),
            ProviderMode::Deterministic => {
                return Err(PortError::NotImplemented("wallet RPC endpoint not configured"))
            }
        };

        debug!(method, "wallet rpc request");
        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });
        let response = proxy
            .client
            .post(&proxy.base_url)
            .json(&payload)
            .send()
            .map_err(|e| PortError::Transport(format!("wallet rpc request failed: {e}")))?;
        let status = response.status();
        let body: Value = response
            .json()
            .map_err(|e| PortError::Transport(format!("wallet rpc json decode failed: {e}")))?;
        if let Some(err) = body.get("error").filter(|e| !e.is_null()) {
            let code = err.get("code").and_then(Value::as_i64).unwrap_or(-32603);
            let message = err
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_owned();
            warn!(method, code, %message, "wallet rpc returned error");
            return Err(PortError::Rpc { code, message });
        }
        if !status.is_success() {
            return Err(PortError::Transport(format!(
                "wallet rpc status {status}: {body}"
            )));
        }
        body.get("result")
            .cloned()
            .ok_or_else(|| PortError::Transport(format!("{method}: missing result")))
    }

    fn is_proxy(&self) -> bool {
        matches!(self.mode, ProviderMode::Proxy(_))
    }

    fn deterministic_send(&self, tx: &TxRequest) -> Result<B256, PortError> {
        if !tx.data.is_empty() {
            return Err(PortError::NotImplemented(
                "contract calls need a wallet RPC endpoint",
            ));
        }
        let mut g = self.lock_state()?;
        if !g.accounts.contains(&tx.from) {
            return Err(PortError::Policy(format!(
                "account {} is not connected",
                tx.from
            )));
        }
        let available = g.balances.get(&tx.from).copied().unwrap_or(U256::ZERO);
        if available < tx.value {
            return Err(PortError::Rpc {
                code: -32000,
                message: "insufficient funds for transfer".to_owned(),
            });
        }
        g.block_number = g.block_number.saturating_add(1);
        let block_number = g.block_number;

        let mut seed = serde_json::to_vec(&tx.to_rpc_json())
            .map_err(|e| PortError::Validation(format!("tx serialization failed: {e}")))?;
        seed.extend_from_slice(&block_number.to_be_bytes());
        let tx_hash = keccak256(seed);

        g.balances.insert(tx.from, available - tx.value);
        let credited = g.balances.entry(tx.to).or_insert(U256::ZERO);
        *credited = credited.saturating_add(tx.value);
        g.receipts.insert(
            tx_hash,
            TxReceipt {
                tx_hash,
                block_number: Some(block_number),
                success: true,
            },
        );
        Ok(tx_hash)
    }
}

impl ProviderPort for Eip1193Adapter {
    fn is_available(&self) -> bool {
        !matches!(self.mode, ProviderMode::Disabled(_))
    }

    fn request_accounts(&self) -> Result<Vec<Address>, PortError> {
        self.check_mode()?;
        if self.is_proxy() {
            let result = self.proxy_call("eth_requestAccounts", serde_json::json!([]))?;
            let accounts = parse_accounts("eth_requestAccounts", &result)?;
            self.remember_accounts(&accounts)?;
            return Ok(accounts);
        }
        Ok(self.lock_state()?.accounts.clone())
    }

    fn accounts(&self) -> Result<Vec<Address>, PortError> {
        self.check_mode()?;
        if self.is_proxy() {
            let result = self.proxy_call("eth_accounts", serde_json::json!([]))?;
            let accounts = parse_accounts("eth_accounts", &result)?;
            self.remember_accounts(&accounts)?;
            return Ok(accounts);
        }
        Ok(self.lock_state()?.accounts.clone())
    }

    fn chain_id(&self) -> Result<u64, PortError> {
        self.check_mode()?;
        if self.is_proxy() {
            let result = self.proxy_call("eth_chainId", serde_json::json!([]))?;
            let chain_id = json_chain_id_to_u64(&result)?;
            let mut g = self.lock_state()?;
            if g.chain_id != chain_id {
                g.chain_id = chain_id;
                g.push_event(ProviderEventKind::ChainChanged, chain_id.to_string());
            }
            return Ok(chain_id);
        }
        Ok(self.lock_state()?.chain_id)
    }

    fn get_balance(&self, address: Address) -> Result<U256, PortError> {
        self.check_mode()?;
        if self.is_proxy() {
            let result = self.proxy_call(
                "eth_getBalance",
                serde_json::json!([address.to_string(), "latest"]),
            )?;
            return parse_quantity_u256("eth_getBalance", &result);
        }
        Ok(self
            .lock_state()?
            .balances
            .get(&address)
            .copied()
            .unwrap_or(U256::ZERO))
    }

    fn send_transaction(&self, tx: &TxRequest) -> Result<B256, PortError> {
        self.check_mode()?;
        if self.is_proxy() {
            let result =
                self.proxy_call("eth_sendTransaction", serde_json::json!([tx.to_rpc_json()]))?;
            let hash = result.as_str().ok_or_else(|| {
                PortError::Transport("eth_sendTransaction must return hash".to_owned())
            })?;
            return hash
                .parse()
                .map_err(|e| PortError::Validation(format!("invalid tx hash: {e}")));
        }
        self.deterministic_send(tx)
    }

    fn call(&self, to: Address, data: Bytes) -> Result<Bytes, PortError> {
        self.check_mode()?;
        if !self.is_proxy() {
            return Err(PortError::NotImplemented(
                "contract calls need a wallet RPC endpoint",
            ));
        }
        let result = self.proxy_call(
            "eth_call",
            serde_json::json!([{ "to": to.to_string(), "data": data.to_string() }, "latest"]),
        )?;
        let raw = result
            .as_str()
            .ok_or_else(|| PortError::Transport("eth_call must return hex data".to_owned()))?;
        raw.parse()
            .map_err(|e| PortError::Validation(format!("invalid eth_call data: {e}")))
    }

    fn transaction_receipt(&self, tx_hash: B256) -> Result<Option<TxReceipt>, PortError> {
        self.check_mode()?;
        if !self.is_proxy() {
            return Ok(self.lock_state()?.receipts.get(&tx_hash).cloned());
        }
        let result = self.proxy_call(
            "eth_getTransactionReceipt",
            serde_json::json!([tx_hash.to_string()]),
        )?;
        if result.is_null() {
            return Ok(None);
        }
        let block_number = match result.get("blockNumber") {
            Some(v) if !v.is_null() => Some(parse_quantity_u64("blockNumber", v)?),
            _ => None,
        };
        let success = match result.get("status") {
            Some(v) if !v.is_null() => parse_quantity_u64("status", v)? == 1,
            // Pre-Byzantium receipts carry no status field.
            _ => true,
        };
        Ok(Some(TxReceipt {
            tx_hash,
            block_number,
            success,
        }))
    }

    fn drain_events(&self) -> Result<Vec<ProviderEvent>, PortError> {
        self.check_mode()?;
        let mut g = self.lock_state()?;
        Ok(std::mem::take(&mut g.events))
    }
}

/// Polls for a receipt until it shows up or `timeout` elapses.
pub fn wait_for_receipt<P: ProviderPort + ?Sized>(
    provider: &P,
    tx_hash: B256,
    poll_interval: Duration,
    timeout: Duration,
) -> Result<TxReceipt, PortError> {
    let started = Instant::now();
    loop {
        if let Some(receipt) = provider.transaction_receipt(tx_hash)? {
            debug!(%tx_hash, success = receipt.success, "receipt received");
            return Ok(receipt);
        }
        if started.elapsed() >= timeout {
            return Err(PortError::Timeout(format!(
                "no receipt for {tx_hash} after {}ms",
                timeout.as_millis()
            )));
        }
        std::thread::sleep(poll_interval);
    }
}

fn accounts_payload(accounts: &[Address]) -> String {
    serde_json::to_string(&accounts.iter().map(|a| a.to_string()).collect::<Vec<_>>())
        .unwrap_or_else(|_| "[]".to_owned())
}

fn parse_accounts(method: &str, value: &Value) -> Result<Vec<Address>, PortError> {
    let arr = value
        .as_array()
        .ok_or_else(|| PortError::Transport(format!("{method}: array expected")))?;
    arr.iter()
        .map(|item| {
            let raw = item
                .as_str()
                .ok_or_else(|| PortError::Transport(format!("{method}: string expected")))?;
            raw.parse::<Address>()
                .map_err(|e| PortError::Validation(format!("invalid account address: {e}")))
        })
        .collect()
}

fn parse_quantity_u256(field: &str, value: &Value) -> Result<U256, PortError> {
    let raw = value
        .as_str()
        .ok_or_else(|| PortError::Transport(format!("{field}: hex quantity expected")))?;
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .ok_or_else(|| PortError::Validation(format!("{field}: missing 0x prefix")))?;
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(digits, 16)
        .map_err(|e| PortError::Validation(format!("{field}: invalid quantity: {e}")))
}

fn parse_quantity_u64(field: &str, value: &Value) -> Result<u64, PortError> {
    let wide = parse_quantity_u256(field, value)?;
    u64::try_from(wide).map_err(|_| PortError::Validation(format!("{field}: quantity overflow")))
}

pub(crate) fn json_chain_id_to_u64(value: &Value) -> Result<u64, PortError> {
    if let Some(n) = value.as_u64() {
        return Ok(n);
    }
    let s = value
        .as_str()
        .ok_or_else(|| PortError::Validation("chain id must be string or number".to_owned()))?;
    parse_chain_id_str(s)
}

fn parse_chain_id_str(raw: &str) -> Result<u64, PortError> {
    if let Some(hex) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16)
            .map_err(|e| PortError::Validation(format!("invalid hex chain id: {e}")))
    } else {
        raw.parse()
            .map_err(|e| PortError::Validation(format!("invalid chain id: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_ids_parse_from_hex_decimal_and_numbers() {
        assert_eq!(json_chain_id_to_u64(&serde_json::json!("0xaa36a7")).unwrap(), 11_155_111);
        assert_eq!(json_chain_id_to_u64(&serde_json::json!("5")).unwrap(), 5);
        assert_eq!(json_chain_id_to_u64(&serde_json::json!(1)).unwrap(), 1);
        assert!(json_chain_id_to_u64(&serde_json::json!(null)).is_err());
    }

    #[test]
    fn quantities_require_hex_prefix() {
        assert_eq!(
            parse_quantity_u256("v", &serde_json::json!("0xde0b6b3a7640000")).unwrap(),
            U256::from(1_000_000_000_000_000_000u128)
        );
        assert_eq!(parse_quantity_u256("v", &serde_json::json!("0x")).unwrap(), U256::ZERO);
        assert!(parse_quantity_u256("v", &serde_json::json!("12")).is_err());
        assert!(parse_quantity_u64("v", &serde_json::json!("0x1ffffffffffffffff")).is_err());
    }
}
