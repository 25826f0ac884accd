//! Shared helpers for the integration tests: simulated chain + pinning
//! servers, app construction, and request builders.
//!
//! Each test binary uses a subset of these helpers.
#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hcred_api::auth::Role;
use hcred_api::state::{AppConfig, AppState, Profile};
use hcred_core::WalletAddress;

pub const CONTRACT: &str = "0x00000000000000000000000000000000000000c7";
pub const SENDER: &str = "0x00000000000000000000000000000000000000aa";
pub const PATIENT_WALLET: &str = "0x00000000000000000000000000000000000000bb";
pub const SECRET: &str = "integration-secret";
pub const FILE_CID: &str = "bafybeigdyrzt5sfp7udm7hu76uh7y26nf3efuylqabf3oclgtqy55fbzdi";
pub const META_CID: &str = "QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG";

pub fn tx_hash() -> String {
    format!("0x{}", "ab".repeat(32))
}

/// Build an AppState wired to the given mock chain and pin servers, with
/// auth enabled.
pub fn test_state(chain: &MockServer, pin: &MockServer) -> AppState {
    let ledger_config =
        hcred_ledger::LedgerConfig::local_mock(&chain.uri(), CONTRACT, SENDER).unwrap();
    let pin_config = hcred_ipfs::PinConfig::local_mock(&pin.uri(), "test-jwt").unwrap();

    AppState::with_config(
        AppConfig {
            port: 0,
            auth_token: Some(SECRET.to_string()),
        },
        Some(hcred_ledger::LedgerClient::new(ledger_config).unwrap()),
        Some(hcred_ipfs::PinClient::new(pin_config).unwrap()),
        None,
    )
}

/// Register a hospital profile directly in the store.
pub fn seed_hospital(state: &AppState, name: &str) -> Profile {
    let profile = Profile {
        profile_id: uuid::Uuid::new_v4(),
        role: Role::Hospital,
        display_name: name.to_string(),
        wallet_address: None,
        license_number: Some("LIC-001".to_string()),
        created_at: chrono::Utc::now(),
    };
    state.profiles.insert(profile.profile_id, profile.clone());
    profile
}

/// Register a patient profile bound to a wallet directly in the store.
pub fn seed_patient(state: &AppState, wallet: &str) -> Profile {
    let profile = Profile {
        profile_id: uuid::Uuid::new_v4(),
        role: Role::Patient,
        display_name: "Alex Doe".to_string(),
        wallet_address: Some(WalletAddress::new(wallet).unwrap()),
        license_number: None,
        created_at: chrono::Utc::now(),
    };
    state.profiles.insert(profile.profile_id, profile.clone());
    profile
}

pub fn hospital_token(profile: &Profile) -> String {
    format!("hospital:{}:{SECRET}", profile.profile_id)
}

/// JSON-RPC success envelope.
pub fn rpc_result(result: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "id": 1,
        "result": result,
    }))
}

/// JSON-RPC error envelope.
pub fn rpc_error(code: i64, message: &str, data: Option<String>) -> ResponseTemplate {
    let mut error = json!({"code": code, "message": message});
    if let Some(data) = data {
        error["data"] = json!(data);
    }
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "id": 1,
        "error": error,
    }))
}

/// Mount a successful mint flow on the chain mock: sendTransaction
/// returning a hash, then a receipt carrying a Transfer log for
/// `token_id` emitted by the configured contract.
pub async fn mount_mint_flow(chain: &MockServer, token_id: u64) {
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(json!({"method": "eth_sendTransaction"})))
        .and(wiremock::matchers::body_string_contains(
            hcred_ledger::abi::MINT_TO_SELECTOR,
        ))
        .respond_with(rpc_result(json!(tx_hash())))
        .mount(chain)
        .await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(json!({"method": "eth_getTransactionReceipt"})))
        .respond_with(rpc_result(json!({
            "transactionHash": tx_hash(),
            "status": "0x1",
            "blockNumber": "0x10",
            "gasUsed": "0x1a2b3",
            "effectiveGasPrice": "0x3b9aca00",
            "logs": [{
                "address": CONTRACT,
                "topics": [
                    hcred_ledger::abi::TRANSFER_TOPIC,
                    format!("0x{:064x}", 0),
                    format!("0x{:0>64}", &PATIENT_WALLET[2..]),
                    format!("0x{token_id:064x}"),
                ],
                "data": "0x",
            }],
        })))
        .mount(chain)
        .await;
}

/// Mount the two pinning endpoints on the pin mock.
pub async fn mount_pin_flow(pin: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/pinning/pinFileToIPFS"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"IpfsHash": FILE_CID})))
        .mount(pin)
        .await;

    Mock::given(method("POST"))
        .and(path("/pinning/pinJSONToIPFS"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"IpfsHash": META_CID})))
        .mount(pin)
        .await;
}

/// Build a multipart issuance request body.
pub fn issue_body(title: &str, patient_wallet: &str, expiry_date: Option<&str>) -> (String, Vec<u8>) {
    let boundary = "hcred-test-boundary";
    let mut body: Vec<u8> = Vec::new();

    let mut text_part = |name: &str, value: &str| {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    };

    text_part("title", title);
    text_part("issued_date", "2026-01-15");
    text_part("description", "Second dose");
    if let Some(expiry) = expiry_date {
        text_part("expiry_date", expiry);
    }
    text_part("patient_wallet", patient_wallet);

    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"record.pdf\"\r\n\
             Content-Type: application/pdf\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"%PDF-1.4 fake document bytes");
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    (format!("multipart/form-data; boundary={boundary}"), body)
}

/// POST the issuance request through the router and return (status, json).
pub async fn post_issue(
    app: Router,
    token: &str,
    title: &str,
    patient_wallet: &str,
) -> (StatusCode, serde_json::Value) {
    let (content_type, body) = issue_body(title, patient_wallet, None);
    let request = Request::builder()
        .method("POST")
        .uri("/v1/credentials")
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", content_type)
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// Send an authenticated GET and return (status, json).
pub async fn get_json(app: Router, uri: &str, token: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// Send an authenticated POST with an empty body and return (status, json).
pub async fn post_empty(app: Router, uri: &str, token: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}
