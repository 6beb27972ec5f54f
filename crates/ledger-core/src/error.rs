use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("chain is empty")]
    EmptyChain,

    #[error("previous hash mismatch: expected {expected}, found {found}")]
    PreviousHashMismatch { expected: String, found: String },

    #[error("proof {proof} does not satisfy the work target for previous proof {previous_proof}")]
    InvalidProof { previous_proof: u64, proof: u64 },

    #[error("block index gap: expected {expected}, found {found}")]
    IndexGap { expected: u64, found: u64 },

    #[error("difficulty must be between 1 and 64 leading hex zeros, got {0}")]
    InvalidDifficulty(u8),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
