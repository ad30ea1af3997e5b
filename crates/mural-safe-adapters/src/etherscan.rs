use std::time::Duration;

use alloy::primitives::{Address, B256, U256};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error};

use mural_safe_core::{HistoryEntry, HistoryPort, PortError};

use crate::AdapterConfig;

/// Account history from an Etherscan-compatible `account/txlist` endpoint.
#[derive(Debug, Clone)]
pub struct EtherscanAdapter {
    mode: HistoryMode,
    api_url: String,
    api_key: Option<String>,
    chain_id: u64,
}

#[derive(Debug, Clone)]
enum HistoryMode {
    Disabled(String),
    Http(reqwest::blocking::Client),
}

#[derive(Debug, Deserialize)]
struct TxListResponse {
    status: String,
    message: String,
    #[serde(default)]
    result: Value,
}

/// One `txlist` row. Etherscan encodes every field as a string.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NormalTransaction {
    block_number: String,
    time_stamp: String,
    hash: String,
    #[serde(default)]
    block_hash: String,
    from: String,
    #[serde(default)]
    to: String,
    value: String,
    #[serde(default)]
    is_error: String,
}

impl EtherscanAdapter {
    pub fn with_config(config: &AdapterConfig) -> Self {
        let timeout = Duration::from_millis(config.request_timeout_ms);
        let mode = match reqwest::blocking::Client::builder().timeout(timeout).build() {
            Ok(client) => HistoryMode::Http(client),
            Err(e) => HistoryMode::Disabled(format!("failed to initialize history client: {e}")),
        };
        Self {
            mode,
            api_url: config.etherscan_url().to_owned(),
            api_key: config.etherscan_api_key.clone(),
            chain_id: config.network.chain_id,
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

impl HistoryPort for EtherscanAdapter {
    fn history(&self, address: Address) -> Result<Vec<HistoryEntry>, PortError> {
        let client = match &self.mode {
            HistoryMode::Http(client) => client,
            HistoryMode::Disabled(reason) => return Err(PortError::Policy(reason.clone())),
        };

        let address_param = address.to_string();
        let chain_param = self.chain_id.to_string();
        let mut query: Vec<(&str, &str)> = vec![
            ("chainid", chain_param.as_str()),
            ("module", "account"),
            ("action", "txlist"),
            ("address", address_param.as_str()),
            ("startblock", "0"),
            ("endblock", "99999999"),
            ("sort", "asc"),
        ];
        if let Some(key) = &self.api_key {
            query.push(("apikey", key.as_str()));
        }

        debug!(%address, url = %self.api_url, "fetching account history");
        let response = client
            .get(&self.api_url)
            .query(&query)
            .send()
            .map_err(|e| PortError::Transport(format!("history request failed: {e}")))?;
        let status = response.status();
        let body = response
            .text()
            .map_err(|e| PortError::Transport(format!("history response unreadable: {e}")))?;
        if !status.is_success() {
            return Err(PortError::Transport(format!("history status {status}: {body}")));
        }
        parse_txlist(&body)
    }
}

pub(crate) fn parse_txlist(body: &str) -> Result<Vec<HistoryEntry>, PortError> {
    let response: TxListResponse = serde_json::from_str(body).map_err(|e| {
        error!(target: "etherscan", body, "failed to deserialize txlist response: {e}");
        PortError::Transport(format!("history response is not valid json: {e}"))
    })?;

    if response.status != "1" {
        let detail = response.result.as_str().unwrap_or_default();
        if response.message == "No transactions found"
            || response.result.as_array().is_some_and(|rows| rows.is_empty())
        {
            return Ok(Vec::new());
        }
        if detail.starts_with("Max rate limit reached") {
            return Err(PortError::Transport("history rate limit exceeded".to_owned()));
        }
        if detail.eq_ignore_ascii_case("invalid api key") {
            return Err(PortError::Policy("history api key rejected".to_owned()));
        }
        return Err(PortError::Transport(format!(
            "history error: {}: {detail}",
            response.message
        )));
    }

    let rows: Vec<NormalTransaction> = serde_json::from_value(response.result)
        .map_err(|e| PortError::Transport(format!("unexpected txlist rows: {e}")))?;
    rows.into_iter().map(NormalTransaction::into_entry).collect()
}

impl NormalTransaction {
    fn into_entry(self) -> Result<HistoryEntry, PortError> {
        let hash: B256 = self
            .hash
            .parse()
            .map_err(|e| PortError::Validation(format!("invalid tx hash {:?}: {e}", self.hash)))?;
        let block_hash = if self.block_hash.is_empty() {
            None
        } else {
            Some(self.block_hash.parse::<B256>().map_err(|e| {
                PortError::Validation(format!("invalid block hash {:?}: {e}", self.block_hash))
            })?)
        };
        let from: Address = self
            .from
            .parse()
            .map_err(|e| PortError::Validation(format!("invalid sender {:?}: {e}", self.from)))?;
        // Contract creations have an empty `to`.
        let to = if self.to.is_empty() {
            None
        } else {
            Some(self.to.parse::<Address>().map_err(|e| {
                PortError::Validation(format!("invalid recipient {:?}: {e}", self.to))
            })?)
        };
        let value = U256::from_str_radix(&self.value, 10)
            .map_err(|e| PortError::Validation(format!("invalid value {:?}: {e}", self.value)))?;
        let block_number = self.block_number.parse::<u64>().map_err(|e| {
            PortError::Validation(format!("invalid block number {:?}: {e}", self.block_number))
        })?;
        Ok(HistoryEntry {
            hash,
            block_hash,
            block_number,
            from,
            to,
            value,
            timestamp: self.time_stamp.parse::<u64>().ok(),
            is_error: self.is_error == "1",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_history_is_not_an_error() {
        let body = r#"{"status":"0","message":"No transactions found","result":[]}"#;
        assert!(parse_txlist(body).unwrap().is_empty());
    }

    #[test]
    fn rate_limit_is_reported() {
        let body = r#"{"status":"0","message":"NOTOK","result":"Max rate limit reached, please use API Key for higher rate limit"}"#;
        let err = parse_txlist(body).unwrap_err();
        assert!(err.to_string().contains("rate limit"));
    }

    #[test]
    fn unknown_error_keeps_result_text() {
        let body = r#"{"status":"0","message":"NOTOK","result":"Error! Invalid address format"}"#;
        let err = parse_txlist(body).unwrap_err();
        assert!(err.to_string().contains("Invalid address format"));
    }
}
