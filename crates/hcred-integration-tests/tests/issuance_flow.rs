//! End-to-end issuance through the HTTP surface: multipart upload →
//! pinning → mint → receipt parsing → record persistence → listing and
//! ledger view.

mod common;

use axum::http::StatusCode;
use wiremock::MockServer;

use common::*;

#[tokio::test]
async fn issue_persists_record_with_ledger_assigned_token_id() {
    let chain = MockServer::start().await;
    let pin = MockServer::start().await;
    mount_mint_flow(&chain, 42).await;
    mount_pin_flow(&pin).await;

    let state = test_state(&chain, &pin);
    let hospital = seed_hospital(&state, "City General Hospital");
    seed_patient(&state, PATIENT_WALLET);
    let app = hcred_api::app(state.clone());

    let (status, record) = post_issue(
        app,
        &hospital_token(&hospital),
        "Vaccination",
        PATIENT_WALLET,
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "unexpected response: {record}");
    // The token id must be the one from the mint's Transfer event.
    assert_eq!(record["token_id"], 42);
    assert_eq!(record["tx_hash"], tx_hash());
    assert_eq!(record["contract_address"], CONTRACT);
    assert_eq!(record["issuer_name"], "City General Hospital");
    assert_eq!(record["file_cid"], FILE_CID);
    assert_eq!(record["metadata_cid"], META_CID);
    assert_eq!(record["revoked"], false);

    // The record landed in the store.
    assert_eq!(state.records.len(), 1);
}

#[tokio::test]
async fn issue_canonicalizes_mixed_case_wallet() {
    let chain = MockServer::start().await;
    let pin = MockServer::start().await;
    mount_mint_flow(&chain, 7).await;
    mount_pin_flow(&pin).await;

    let state = test_state(&chain, &pin);
    let hospital = seed_hospital(&state, "City General Hospital");
    seed_patient(&state, PATIENT_WALLET);
    let app = hcred_api::app(state.clone());

    // Mixed-case input with surrounding intent of a checksummed address.
    let mixed = PATIENT_WALLET.to_uppercase().replace("0X", "0x");
    let (status, record) = post_issue(app, &hospital_token(&hospital), "Vaccination", &mixed).await;

    assert_eq!(status, StatusCode::CREATED, "unexpected response: {record}");
    // Stored wallet is the lowercased form.
    assert_eq!(record["owner_wallet"], PATIENT_WALLET);

    // The mint calldata carried the lowercased address too.
    let requests = chain.received_requests().await.unwrap();
    let mint = requests
        .iter()
        .map(|r| String::from_utf8_lossy(&r.body).to_string())
        .find(|b| b.contains("eth_sendTransaction"))
        .expect("mint request sent");
    assert!(mint.contains(&format!("{:0>64}", &PATIENT_WALLET[2..])));
}

#[tokio::test]
async fn issue_unknown_patient_wallet_is_404() {
    let chain = MockServer::start().await;
    let pin = MockServer::start().await;

    let state = test_state(&chain, &pin);
    let hospital = seed_hospital(&state, "City General Hospital");
    // No patient registered for the wallet.
    let app = hcred_api::app(state.clone());

    let (status, body) = post_issue(
        app,
        &hospital_token(&hospital),
        "Vaccination",
        PATIENT_WALLET,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("no patient found"));
    // Nothing was pinned and nothing was minted.
    assert!(pin.received_requests().await.unwrap().is_empty());
    assert!(chain.received_requests().await.unwrap().is_empty());
    assert!(state.records.is_empty());
}

#[tokio::test]
async fn issue_invalid_wallet_is_validation_error() {
    let chain = MockServer::start().await;
    let pin = MockServer::start().await;

    let state = test_state(&chain, &pin);
    let hospital = seed_hospital(&state, "City General Hospital");
    let app = hcred_api::app(state);

    let (status, body) = post_issue(app, &hospital_token(&hospital), "Vaccination", "0x123").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn issue_requires_hospital_role() {
    let chain = MockServer::start().await;
    let pin = MockServer::start().await;

    let state = test_state(&chain, &pin);
    seed_hospital(&state, "City General Hospital");
    let patient = seed_patient(&state, PATIENT_WALLET);
    let app = hcred_api::app(state);

    let patient_token = format!("patient:{}:{SECRET}", patient.profile_id);
    let (status, _) = post_issue(app, &patient_token, "Vaccination", PATIENT_WALLET).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn declined_signature_is_reported_and_nothing_is_persisted() {
    let chain = MockServer::start().await;
    let pin = MockServer::start().await;
    mount_pin_flow(&pin).await;

    wiremock::Mock::given(wiremock::matchers::method("POST"))
        .and(wiremock::matchers::body_partial_json(serde_json::json!({
            "method": "eth_sendTransaction"
        })))
        .respond_with(rpc_error(4001, "User rejected the request.", None))
        .mount(&chain)
        .await;

    let state = test_state(&chain, &pin);
    let hospital = seed_hospital(&state, "City General Hospital");
    seed_patient(&state, PATIENT_WALLET);
    let app = hcred_api::app(state.clone());

    let (status, body) = post_issue(
        app,
        &hospital_token(&hospital),
        "Vaccination",
        PATIENT_WALLET,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("declined"));
    assert!(state.records.is_empty());
}

#[tokio::test]
async fn ledger_view_chains_records_newest_first() {
    let chain = MockServer::start().await;
    let pin = MockServer::start().await;
    mount_pin_flow(&pin).await;
    mount_mint_flow(&chain, 1).await;

    let state = test_state(&chain, &pin);
    let hospital = seed_hospital(&state, "City General Hospital");
    seed_patient(&state, PATIENT_WALLET);
    let token = hospital_token(&hospital);

    // Issue two credentials through the API (same mocked tx hash; the
    // view chains whatever hashes the records carry).
    let (s1, first) = post_issue(
        hcred_api::app(state.clone()),
        &token,
        "Vaccination",
        PATIENT_WALLET,
    )
    .await;
    assert_eq!(s1, StatusCode::CREATED);
    let (s2, _second) = post_issue(
        hcred_api::app(state.clone()),
        &token,
        "X-Ray",
        PATIENT_WALLET,
    )
    .await;
    assert_eq!(s2, StatusCode::CREATED);

    let (status, view) = get_json(
        hcred_api::app(state.clone()),
        "/v1/credentials/ledger-view",
        &token,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let entries = view.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    // Newest first; the newest entry's previous hash is the older mint's
    // transaction hash, and the oldest entry has none.
    assert_eq!(entries[0]["record"]["title"], "X-Ray");
    assert_eq!(entries[1]["record"]["title"], "Vaccination");
    assert_eq!(
        entries[0]["previous_hash"],
        first["tx_hash"],
        "previous_hash must be the adjacent older record's tx hash"
    );
    assert!(entries[1].get("previous_hash").is_none());
}

#[tokio::test]
async fn listing_is_scoped_to_the_caller() {
    let chain = MockServer::start().await;
    let pin = MockServer::start().await;
    mount_pin_flow(&pin).await;
    mount_mint_flow(&chain, 1).await;

    let state = test_state(&chain, &pin);
    let hospital_a = seed_hospital(&state, "Hospital A");
    let hospital_b = seed_hospital(&state, "Hospital B");
    seed_patient(&state, PATIENT_WALLET);

    let (status, _) = post_issue(
        hcred_api::app(state.clone()),
        &hospital_token(&hospital_a),
        "Vaccination",
        PATIENT_WALLET,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, own) = get_json(
        hcred_api::app(state.clone()),
        "/v1/credentials",
        &hospital_token(&hospital_a),
    )
    .await;
    assert_eq!(own.as_array().unwrap().len(), 1);

    let (_, other) = get_json(
        hcred_api::app(state.clone()),
        "/v1/credentials",
        &hospital_token(&hospital_b),
    )
    .await;
    assert!(other.as_array().unwrap().is_empty());
}
