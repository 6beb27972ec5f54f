//! HTTP surface of the ledger node.
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use ledger_core::{mine::seal_mined_block, Amount, Block, Ledger, ProofOfWork, Transaction};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tower_http::trace::TraceLayer;
use tracing::info;

pub mod config;
mod constants;
pub mod error;

use constants::MSG_BLOCK_FORGED;
use error::ApiError;

/// Everything a request handler needs. Cloning shares the same ledger.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<RwLock<Ledger>>,
    /// Held for the whole of a `/mine` request so only one proof search runs at a time.
    mining: Arc<Mutex<()>>,
    pub pow: ProofOfWork,
    pub node_id: Arc<str>,
}

impl AppState {
    pub fn new(ledger: Ledger, pow: ProofOfWork, node_id: impl Into<String>) -> Self {
        Self {
            ledger: Arc::new(RwLock::new(ledger)),
            mining: Arc::new(Mutex::new(())),
            pow,
            node_id: Arc::from(node_id.into()),
        }
    }
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MineResponse {
    pub message: String,
    #[serde(flatten)]
    pub block: Block,
}

#[derive(Debug, Deserialize)]
struct NewTransaction {
    sender: Option<String>,
    recipient: Option<String>,
    amount: Option<Amount>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChainResponse {
    pub chain: Vec<Block>,
    pub length: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PendingResponse {
    pub transactions: Vec<Transaction>,
    pub length: usize,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(Health { status: "ok" }) }))
        .route("/mine", get(mine))
        .route("/transactions/new", post(new_transaction))
        .route("/transactions/pending", get(pending))
        .route("/chain", get(chain))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn mine(State(state): State<AppState>) -> Result<Json<MineResponse>, ApiError> {
    let _mining = state.mining.lock().await;

    // The mining guard keeps the tip fixed during the search.
    let last_proof = state.ledger.read().await.last_block()?.proof;
    let pow = state.pow;
    let proof = tokio::task::spawn_blocking(move || pow.search_parallel(last_proof)).await?;

    let block = {
        let mut ledger = state.ledger.write().await;
        seal_mined_block(&mut ledger, proof, &state.node_id)?.clone()
    };
    info!(index = block.index, proof, "forged block");

    Ok(Json(MineResponse {
        message: MSG_BLOCK_FORGED.to_string(),
        block,
    }))
}

async fn new_transaction(
    State(state): State<AppState>,
    payload: Result<Json<NewTransaction>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let Json(tx) = payload.map_err(|e| ApiError::InvalidBody(e.body_text()))?;
    let (Some(sender), Some(recipient), Some(amount)) = (tx.sender, tx.recipient, tx.amount)
    else {
        return Err(ApiError::MissingValues);
    };

    let index = state
        .ledger
        .write()
        .await
        .add_transaction(sender, recipient, amount);

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: format!("Transaction will be added to Block {index}"),
        }),
    ))
}

async fn chain(State(state): State<AppState>) -> Json<ChainResponse> {
    let ledger = state.ledger.read().await;
    Json(ChainResponse {
        chain: ledger.chain().to_vec(),
        length: ledger.len(),
    })
}

async fn pending(State(state): State<AppState>) -> Json<PendingResponse> {
    let ledger = state.ledger.read().await;
    Json(PendingResponse {
        transactions: ledger.pending().to_vec(),
        length: ledger.pending().len(),
    })
}
