//! Contract tests for LedgerClient against a simulated JSON-RPC endpoint.
//!
//! These tests use wiremock to simulate the chain endpoint. Request bodies
//! are matched on the JSON-RPC method name plus the 4-byte function
//! selector embedded in the calldata, so each contract operation gets a
//! distinct response.

use serde_json::json;
use wiremock::matchers::{body_partial_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hcred_core::{TokenId, WalletAddress};
use hcred_ledger::{abi, LedgerClient, LedgerConfig, LedgerError};

const CONTRACT: &str = "0x00000000000000000000000000000000000000c7";
const SENDER: &str = "0x00000000000000000000000000000000000000aa";
const PATIENT: &str = "0x00000000000000000000000000000000000000bb";

fn tx_hash() -> String {
    format!("0x{}", "ab".repeat(32))
}

async fn test_client(server: &MockServer) -> LedgerClient {
    let config = LedgerConfig::local_mock(&server.uri(), CONTRACT, SENDER).unwrap();
    LedgerClient::new(config).unwrap()
}

/// JSON-RPC success envelope.
fn rpc_result(result: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "id": 1,
        "result": result,
    }))
}

/// JSON-RPC error envelope.
fn rpc_error(code: i64, message: &str, data: Option<String>) -> ResponseTemplate {
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

/// A successful mint receipt with one Transfer log for `token_id`.
fn mint_receipt(token_id: u64) -> serde_json::Value {
    json!({
        "transactionHash": tx_hash(),
        "status": "0x1",
        "blockNumber": "0x10",
        "gasUsed": "0x1a2b3",
        "effectiveGasPrice": "0x3b9aca00",
        "logs": [{
            "address": CONTRACT,
            "topics": [
                abi::TRANSFER_TOPIC,
                format!("0x{:064x}", 0),
                format!("0x{:0>64}", &PATIENT[2..]),
                format!("0x{token_id:064x}"),
            ],
            "data": "0x",
        }],
    })
}

// ── mintTo ───────────────────────────────────────────────────────────

#[tokio::test]
async fn mint_to_submits_and_confirms() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(json!({"method": "eth_sendTransaction"})))
        .and(body_string_contains(abi::MINT_TO_SELECTOR))
        .respond_with(rpc_result(json!(tx_hash())))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(json!({"method": "eth_getTransactionReceipt"})))
        .respond_with(rpc_result(mint_receipt(42)))
        .mount(&server)
        .await;

    let client = test_client(&server).await;
    let owner = WalletAddress::new(PATIENT).unwrap();
    let receipt = client.mint_to(&owner, "ipfs://QmMeta").await.unwrap();

    assert!(receipt.succeeded());
    assert_eq!(
        receipt.minted_token_id(client.contract_address()),
        Some(TokenId::new(42))
    );
    assert_eq!(receipt.gas_used_value(), Some(0x1a2b3));
}

#[tokio::test]
async fn mint_to_sends_canonical_owner_address() {
    let server = MockServer::start().await;

    // The calldata must contain the lowercased address, left-padded.
    let expected_word = format!("{:0>64}", &PATIENT[2..]);
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "eth_sendTransaction"})))
        .and(body_string_contains(&expected_word))
        .respond_with(rpc_result(json!(tx_hash())))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "eth_getTransactionReceipt"})))
        .respond_with(rpc_result(mint_receipt(1)))
        .mount(&server)
        .await;

    let client = test_client(&server).await;
    // Mixed-case input canonicalizes before encoding.
    let owner = WalletAddress::new(&PATIENT.to_uppercase().replace("0X", "0x")).unwrap();
    client.mint_to(&owner, "ipfs://QmMeta").await.unwrap();
}

#[tokio::test]
async fn mint_to_polls_until_mined() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "eth_sendTransaction"})))
        .respond_with(rpc_result(json!(tx_hash())))
        .mount(&server)
        .await;

    // First two polls: pending (null receipt). Then mined.
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "eth_getTransactionReceipt"})))
        .respond_with(rpc_result(json!(null)))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "eth_getTransactionReceipt"})))
        .respond_with(rpc_result(mint_receipt(5)))
        .mount(&server)
        .await;

    let client = test_client(&server).await;
    let owner = WalletAddress::new(PATIENT).unwrap();
    let receipt = client.mint_to(&owner, "ipfs://QmMeta").await.unwrap();
    assert_eq!(
        receipt.minted_token_id(client.contract_address()),
        Some(TokenId::new(5))
    );
}

#[tokio::test]
async fn mint_to_times_out_when_never_mined() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "eth_sendTransaction"})))
        .respond_with(rpc_result(json!(tx_hash())))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "eth_getTransactionReceipt"})))
        .respond_with(rpc_result(json!(null)))
        .mount(&server)
        .await;

    let client = test_client(&server).await;
    let owner = WalletAddress::new(PATIENT).unwrap();
    let result = client.mint_to(&owner, "ipfs://QmMeta").await;
    match result.unwrap_err() {
        LedgerError::ConfirmationTimeout { attempts, .. } => assert_eq!(attempts, 5),
        other => panic!("expected ConfirmationTimeout, got: {other:?}"),
    }
}

#[tokio::test]
async fn mint_to_maps_user_rejection() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "eth_sendTransaction"})))
        .respond_with(rpc_error(4001, "User rejected the request.", None))
        .mount(&server)
        .await;

    let client = test_client(&server).await;
    let owner = WalletAddress::new(PATIENT).unwrap();
    let result = client.mint_to(&owner, "ipfs://QmMeta").await;
    assert!(matches!(result.unwrap_err(), LedgerError::UserRejected));
}

#[tokio::test]
async fn mint_to_surfaces_mined_but_reverted_transaction() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "eth_sendTransaction"})))
        .respond_with(rpc_result(json!(tx_hash())))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "eth_getTransactionReceipt"})))
        .respond_with(rpc_result(json!({
            "transactionHash": tx_hash(),
            "status": "0x0",
            "logs": [],
        })))
        .mount(&server)
        .await;

    let client = test_client(&server).await;
    let owner = WalletAddress::new(PATIENT).unwrap();
    let result = client.mint_to(&owner, "ipfs://QmMeta").await;
    assert!(matches!(result.unwrap_err(), LedgerError::Reverted { .. }));
}

// ── revoke ───────────────────────────────────────────────────────────

#[tokio::test]
async fn revoke_submits_and_confirms() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "eth_sendTransaction"})))
        .and(body_string_contains(abi::REVOKE_SELECTOR))
        .respond_with(rpc_result(json!(tx_hash())))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "eth_getTransactionReceipt"})))
        .respond_with(rpc_result(json!({
            "transactionHash": tx_hash(),
            "status": "0x1",
            "logs": [],
        })))
        .mount(&server)
        .await;

    let client = test_client(&server).await;
    let receipt = client.revoke(TokenId::new(42)).await.unwrap();
    assert!(receipt.succeeded());
}

#[tokio::test]
async fn revoke_by_non_owner_maps_to_unauthorized() {
    let server = MockServer::start().await;

    let data = format!("0x{}{:0>64}", abi::UNAUTHORIZED_ACCOUNT_SELECTOR, &SENDER[2..]);
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "eth_sendTransaction"})))
        .respond_with(rpc_error(3, "execution reverted", Some(data)))
        .mount(&server)
        .await;

    let client = test_client(&server).await;
    let result = client.revoke(TokenId::new(42)).await;
    assert!(matches!(result.unwrap_err(), LedgerError::Unauthorized));
}

#[tokio::test]
async fn revoke_twice_maps_to_already_revoked() {
    let server = MockServer::start().await;

    // Error(string) revert with reason "Credential already revoked".
    let reason = "Credential already revoked";
    let mut data = format!("0x{}", abi::ERROR_STRING_SELECTOR);
    data.push_str(&format!("{:064x}", 0x20));
    data.push_str(&format!("{:064x}", reason.len()));
    let mut hex: String = reason.bytes().map(|b| format!("{b:02x}")).collect();
    while hex.len() % 64 != 0 {
        hex.push('0');
    }
    data.push_str(&hex);

    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "eth_sendTransaction"})))
        .respond_with(rpc_error(3, "execution reverted", Some(data)))
        .mount(&server)
        .await;

    let client = test_client(&server).await;
    let result = client.revoke(TokenId::new(42)).await;
    match result.unwrap_err() {
        LedgerError::AlreadyRevoked(id) => assert_eq!(id, TokenId::new(42)),
        other => panic!("expected AlreadyRevoked, got: {other:?}"),
    }
}

// ── reads ────────────────────────────────────────────────────────────

#[tokio::test]
async fn owner_of_decodes_address() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "eth_call"})))
        .and(body_string_contains(abi::OWNER_OF_SELECTOR))
        .respond_with(rpc_result(json!(format!("0x{:0>64}", &PATIENT[2..]))))
        .mount(&server)
        .await;

    let client = test_client(&server).await;
    let owner = client.owner_of(TokenId::new(1)).await.unwrap();
    assert_eq!(owner.as_str(), PATIENT);
}

#[tokio::test]
async fn owner_of_nonexistent_token_maps_to_token_not_found() {
    let server = MockServer::start().await;

    let data = format!("0x{}{:064x}", abi::NONEXISTENT_TOKEN_SELECTOR, 999);
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "eth_call"})))
        .respond_with(rpc_error(3, "execution reverted", Some(data)))
        .mount(&server)
        .await;

    let client = test_client(&server).await;
    let result = client.owner_of(TokenId::new(999)).await;
    match result.unwrap_err() {
        LedgerError::TokenNotFound(id) => assert_eq!(id, TokenId::new(999)),
        other => panic!("expected TokenNotFound, got: {other:?}"),
    }
}

#[tokio::test]
async fn owner_of_nonexistent_token_via_message_text() {
    let server = MockServer::start().await;

    // Some providers decode the custom error into the message instead of
    // returning raw revert data.
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "eth_call"})))
        .respond_with(rpc_error(
            3,
            "execution reverted: ERC721NonexistentToken(999)",
            None,
        ))
        .mount(&server)
        .await;

    let client = test_client(&server).await;
    let result = client.owner_of(TokenId::new(999)).await;
    assert!(matches!(result.unwrap_err(), LedgerError::TokenNotFound(_)));
}

#[tokio::test]
async fn token_uri_decodes_string() {
    let server = MockServer::start().await;

    let uri = "ipfs://QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG";
    let mut result = format!("0x{:064x}", 0x20);
    result.push_str(&format!("{:064x}", uri.len()));
    let mut hex: String = uri.bytes().map(|b| format!("{b:02x}")).collect();
    while hex.len() % 64 != 0 {
        hex.push('0');
    }
    result.push_str(&hex);

    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "eth_call"})))
        .and(body_string_contains(abi::TOKEN_URI_SELECTOR))
        .respond_with(rpc_result(json!(result)))
        .mount(&server)
        .await;

    let client = test_client(&server).await;
    assert_eq!(client.token_uri(TokenId::new(1)).await.unwrap(), uri);
}

#[tokio::test]
async fn is_revoked_and_is_expired_decode_bools() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "eth_call"})))
        .and(body_string_contains(abi::IS_REVOKED_SELECTOR))
        .respond_with(rpc_result(json!(format!("0x{:064x}", 1))))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "eth_call"})))
        .and(body_string_contains(abi::IS_EXPIRED_SELECTOR))
        .respond_with(rpc_result(json!(format!("0x{:064x}", 0))))
        .mount(&server)
        .await;

    let client = test_client(&server).await;
    assert!(client.is_revoked(TokenId::new(1)).await.unwrap());
    assert!(!client.is_expired(TokenId::new(1)).await.unwrap());
}

#[tokio::test]
async fn http_error_status_maps_to_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let client = test_client(&server).await;
    let result = client.is_revoked(TokenId::new(1)).await;
    match result.unwrap_err() {
        LedgerError::Api { status, .. } => assert_eq!(status, 502),
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn unclassified_rpc_error_maps_to_rpc_variant() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(rpc_error(-32000, "insufficient funds for gas", None))
        .mount(&server)
        .await;

    let client = test_client(&server).await;
    let result = client.owner_of(TokenId::new(1)).await;
    match result.unwrap_err() {
        LedgerError::Rpc { code, message, .. } => {
            assert_eq!(code, -32000);
            assert!(message.contains("insufficient funds"));
        }
        other => panic!("expected Rpc error, got: {other:?}"),
    }
}
