use std::sync::{Arc, Mutex};
use std::thread;

use alloy::primitives::{Address, U256};
use tiny_http::{Method, Response, Server, StatusCode};

use mural_safe_adapters::{AdapterConfig, EtherscanAdapter};
use mural_safe_core::{HistoryPort, Network, PortError};

const ACCOUNT: &str = "0x1000000000000000000000000000000000000001";

fn serve(body: &'static str, code: u16) -> (String, Arc<Mutex<Vec<String>>>) {
    let server = Server::http("127.0.0.1:0").expect("start server");
    let url = format!("http://{}/api", server.server_addr());
    let calls = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&calls);
    thread::spawn(move || {
        for req in server.incoming_requests() {
            if let Ok(mut g) = seen.lock() {
                g.push(req.url().to_owned());
            }
            let response = match req.method() {
                Method::Get => Response::from_string(body).with_status_code(StatusCode(code)),
                _ => Response::from_string("").with_status_code(StatusCode(405)),
            };
            let _ = req.respond(response);
        }
    });
    (url, calls)
}

fn adapter(url: String, api_key: Option<&str>) -> EtherscanAdapter {
    EtherscanAdapter::with_config(&AdapterConfig {
        etherscan_api_url: Some(url),
        etherscan_api_key: api_key.map(str::to_owned),
        ..AdapterConfig::default()
    })
}

fn account() -> Address {
    ACCOUNT.parse().expect("account")
}

#[test]
fn txlist_rows_are_parsed_in_order() {
    let body = r#"{
        "status": "1",
        "message": "OK",
        "result": [
            {
                "blockNumber": "4200001",
                "timeStamp": "1700000000",
                "hash": "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
                "blockHash": "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb",
                "from": "0x1000000000000000000000000000000000000001",
                "to": "0x2000000000000000000000000000000000000002",
                "value": "1500000000000000000",
                "isError": "0",
                "gas": "21000"
            },
            {
                "blockNumber": "4200002",
                "timeStamp": "1700000100",
                "hash": "0xcccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccc",
                "blockHash": "0xdddddddddddddddddddddddddddddddddddddddddddddddddddddddddddddddd",
                "from": "0x1000000000000000000000000000000000000001",
                "to": "",
                "value": "0",
                "isError": "1"
            }
        ]
    }"#;
    let (url, calls) = serve(body, 200);
    let rows = adapter(url, Some("KEY123")).history(account()).expect("history");

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].block_number, 4_200_001);
    assert_eq!(rows[0].timestamp, Some(1_700_000_000));
    assert_eq!(rows[0].value, U256::from(1_500_000_000_000_000_000u128));
    assert!(rows[0].to.is_some());
    assert!(!rows[0].is_error);
    assert!(rows[1].to.is_none());
    assert!(rows[1].is_error);

    let calls = calls.lock().expect("calls lock");
    let query = &calls[0];
    for expected in [
        "chainid=11155111",
        "module=account",
        "action=txlist",
        "startblock=0",
        "endblock=99999999",
        "sort=asc",
        "apikey=KEY123",
    ] {
        assert!(query.contains(expected), "{expected} missing from {query}");
    }
    assert!(query.to_ascii_lowercase().contains(&ACCOUNT.to_ascii_lowercase()));
}

#[test]
fn chain_id_follows_the_configured_network() {
    let (url, calls) = serve(
        r#"{"status":"0","message":"No transactions found","result":[]}"#,
        200,
    );
    let mainnet = EtherscanAdapter::with_config(&AdapterConfig {
        network: Network::mainnet(),
        etherscan_api_url: Some(url),
        ..AdapterConfig::default()
    });
    mainnet.history(account()).expect("history");
    let query = calls.lock().expect("calls lock")[0].clone();
    assert!(query.contains("chainid=1&"), "chainid missing from {query}");
}

#[test]
fn every_builtin_network_uses_the_multichain_endpoint() {
    for network in Network::builtin() {
        assert_eq!(network.etherscan_api_url, "https://api.etherscan.io/v2/api");
    }
}

#[test]
fn api_key_is_optional() {
    let (url, calls) = serve(
        r#"{"status":"0","message":"No transactions found","result":[]}"#,
        200,
    );
    let rows = adapter(url, None).history(account()).expect("history");
    assert!(rows.is_empty());
    assert!(!calls.lock().expect("calls lock")[0].contains("apikey"));
}

#[test]
fn invalid_key_maps_to_policy_error() {
    let (url, _) = serve(
        r#"{"status":"0","message":"NOTOK","result":"Invalid API Key"}"#,
        200,
    );
    let err = adapter(url, Some("bad")).history(account()).expect_err("bad key");
    assert!(matches!(err, PortError::Policy(_)));
}

#[test]
fn http_failures_are_transport_errors() {
    let (url, _) = serve("upstream unavailable", 503);
    let err = adapter(url, None).history(account()).expect_err("503");
    assert!(matches!(err, PortError::Transport(_)));
}
