//! Integration tests for the ledger node HTTP endpoints.

use axum_test::TestServer;
use ledger_core::{
    canonical_hash, validate_chain, Difficulty, Ledger, Number, ProofOfWork, Transaction,
};
use ledger_node::{router, AppState, ChainResponse, MessageResponse, MineResponse, PendingResponse};
use serde_json::{json, Value};

const NODE_ID: &str = "test-node";

fn test_state(zeros: u8) -> AppState {
    let pow = ProofOfWork::new(Difficulty::new(zeros).expect("difficulty"));
    AppState::new(Ledger::new(), pow, NODE_ID)
}

fn test_server(state: &AppState) -> TestServer {
    TestServer::new(router(state.clone())).expect("Failed to create test server")
}

#[tokio::test]
async fn test_health() {
    let state = test_state(2);
    let server = test_server(&state);

    let response = server.get("/health").await;
    assert_eq!(response.status_code(), 200);
    let json: Value = response.json();
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_chain_starts_with_genesis() {
    let state = test_state(2);
    let server = test_server(&state);

    let response = server.get("/chain").await;
    assert_eq!(response.status_code(), 200);
    let body: ChainResponse = response.json();
    assert_eq!(body.length, 1);
    assert_eq!(body.chain.len(), 1);
    assert_eq!(body.chain[0].index, 1);
    assert_eq!(body.chain[0].proof, 100);
    assert_eq!(body.chain[0].previous_hash, "1");

    let raw: Value = server.get("/chain").await.json();
    assert!(raw["chain"][0]["timestamp"].is_number());
    assert!(raw["chain"][0]["transactions"].is_array());
}

#[tokio::test]
async fn test_new_transaction() {
    let state = test_state(2);
    let server = test_server(&state);

    let response = server
        .post("/transactions/new")
        .json(&json!({"sender": "alice", "recipient": "bob", "amount": 10}))
        .await;
    assert_eq!(response.status_code(), 201);
    let body: MessageResponse = response.json();
    assert_eq!(body.message, "Transaction will be added to Block 2");

    let pending: PendingResponse = server.get("/transactions/pending").await.json();
    assert_eq!(pending.length, 1);
    assert_eq!(pending.transactions, vec![Transaction::new("alice", "bob", 10)]);
}

#[tokio::test]
async fn test_amount_accepted_as_given() {
    let state = test_state(2);
    let server = test_server(&state);

    for amount in [json!(2.5), json!(-3), json!(0)] {
        let response = server
            .post("/transactions/new")
            .json(&json!({"sender": "alice", "recipient": "bob", "amount": amount}))
            .await;
        assert_eq!(response.status_code(), 201, "amount: {amount}");
    }

    let pending: PendingResponse = server.get("/transactions/pending").await.json();
    assert_eq!(pending.length, 3);
    let amounts: Vec<Number> = pending.transactions.into_iter().map(|tx| tx.amount).collect();
    assert_eq!(
        amounts,
        vec![
            Number::from_f64(2.5).expect("finite"),
            Number::from(-3),
            Number::from(0)
        ]
    );

    assert_eq!(server.get("/mine").await.status_code(), 200);
    let body: ChainResponse = server.get("/chain").await.json();
    validate_chain(&body.chain, &state.pow).expect("fractional amounts should re-hash identically");
}

#[tokio::test]
async fn test_missing_values() {
    let state = test_state(2);
    let server = test_server(&state);

    server
        .post("/transactions/new")
        .json(&json!({"sender": "alice", "recipient": "bob", "amount": 10}))
        .await;

    for body in [
        json!({"sender": "alice", "recipient": "bob"}),
        json!({"sender": "alice", "amount": 10}),
        json!({"recipient": "bob", "amount": 10}),
        json!({"sender": "alice", "recipient": "bob", "amount": null}),
        json!({}),
    ] {
        let response = server.post("/transactions/new").json(&body).await;
        assert_eq!(response.status_code(), 400, "body: {body}");
        let json: Value = response.json();
        assert_eq!(json["message"], "Missing values");
    }

    assert_eq!(state.ledger.read().await.pending().len(), 1);
}

#[tokio::test]
async fn test_malformed_transaction_body() {
    let state = test_state(2);
    let server = test_server(&state);

    let response = server.post("/transactions/new").text("not json").await;
    assert_eq!(response.status_code(), 400);

    let response = server
        .post("/transactions/new")
        .json(&json!({"sender": "alice", "recipient": "bob", "amount": "ten"}))
        .await;
    assert_eq!(response.status_code(), 400);

    assert!(state.ledger.read().await.pending().is_empty());
}

#[tokio::test]
async fn test_mine_forges_block() {
    let state = test_state(2);
    let server = test_server(&state);

    server
        .post("/transactions/new")
        .json(&json!({"sender": "alice", "recipient": "bob", "amount": 10}))
        .await;

    let response = server.get("/mine").await;
    assert_eq!(response.status_code(), 200);
    let raw: Value = response.json();
    assert_eq!(raw["message"], "New Block Forged");
    assert_eq!(raw["index"], 2);

    let mined: MineResponse = response.json();
    assert_eq!(mined.block.proof, 226);
    assert_eq!(
        mined.block.transactions,
        vec![
            Transaction::new("alice", "bob", 10),
            Transaction::new("0", NODE_ID, 1),
        ]
    );

    let ledger = state.ledger.read().await;
    assert_eq!(ledger.len(), 2);
    assert!(ledger.pending().is_empty());
    assert_eq!(mined.block.previous_hash, canonical_hash(&ledger.chain()[0]));
    assert_eq!(&ledger.chain()[1], &mined.block);
}

#[tokio::test]
async fn test_mined_chain_is_valid() {
    let state = test_state(2);
    let server = test_server(&state);

    for i in 0..3u64 {
        server
            .post("/transactions/new")
            .json(&json!({"sender": "alice", "recipient": "bob", "amount": i}))
            .await;
        assert_eq!(server.get("/mine").await.status_code(), 200);
    }

    let body: ChainResponse = server.get("/chain").await.json();
    assert_eq!(body.length, 4);
    validate_chain(&body.chain, &state.pow).expect("served chain should validate");
    for i in 1..body.chain.len() {
        assert_eq!(body.chain[i].previous_hash, canonical_hash(&body.chain[i - 1]));
    }
}

#[tokio::test]
async fn test_concurrent_requests_keep_every_transaction() {
    let state = test_state(2);
    let server = test_server(&state);

    let submit = |n: u64| {
        let server = &server;
        async move {
            server
                .post("/transactions/new")
                .json(&json!({"sender": format!("user{n}"), "recipient": "bob", "amount": n}))
                .await
                .status_code()
        }
    };
    let mine = || {
        let server = &server;
        async move { server.get("/mine").await.status_code() }
    };

    let (a, b, c, d, e, f) = tokio::join!(submit(1), mine(), submit(2), submit(3), mine(), submit(4));
    for status in [a, c, d, f] {
        assert_eq!(status, 201);
    }
    for status in [b, e] {
        assert_eq!(status, 200);
    }

    let ledger = state.ledger.read().await;
    assert_eq!(ledger.len(), 3);
    let mut senders: Vec<String> = ledger
        .chain()
        .iter()
        .flat_map(|b| b.transactions.iter())
        .chain(ledger.pending().iter())
        .filter(|tx| tx.sender != "0")
        .map(|tx| tx.sender.clone())
        .collect();
    senders.sort();
    assert_eq!(senders, vec!["user1", "user2", "user3", "user4"]);
    ledger.validate(&state.pow).expect("chain should validate");
}
