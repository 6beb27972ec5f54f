use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub use serde_json::Number;

pub mod canonical;
pub mod chain;
pub mod constants;
pub mod error;
pub mod mine;
pub mod pow;

pub use chain::{validate_chain, Ledger};
pub use error::LedgerError;
pub use pow::{Difficulty, ProofOfWork};

pub type Hash = [u8; 32];

/// Transfer amount. Any JSON number is accepted as-is: integer, negative or fractional.
pub type Amount = Number;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub recipient: String,
    pub amount: Amount,
}

impl Transaction {
    pub fn new(
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: impl Into<Amount>,
    ) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            amount: amount.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    /// Seconds since the Unix epoch, with sub-second precision.
    pub timestamp: f64,
    pub transactions: Vec<Transaction>,
    pub proof: u64,
    pub previous_hash: String,
}

impl Block {
    pub fn hash(&self) -> String {
        canonical_hash(self)
    }
}

pub fn sha256(bytes: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest[..]);
    out
}

/// Lowercase hex SHA-256 of the block's sorted-key JSON encoding.
pub fn canonical_hash(block: &Block) -> String {
    let bytes = canonical::to_canonical_bytes(&canonical::block_value(block));
    hex::encode(sha256(&bytes))
}
