use std::mem;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, info};

use crate::constants::{GENESIS_PREVIOUS_HASH, GENESIS_PROOF};
use crate::error::{LedgerError, Result};
use crate::pow::ProofOfWork;
use crate::{canonical_hash, Amount, Block, Transaction};

/// In-memory chain of blocks plus the pool of transactions waiting for the next block.
///
/// The chain is never empty once constructed: `new` seals a genesis block with
/// proof `100` and the sentinel previous hash `"1"`.
#[derive(Clone, Debug)]
pub struct Ledger {
    chain: Vec<Block>,
    pending: Vec<Transaction>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    pub fn new() -> Self {
        let mut ledger = Self {
            chain: Vec::new(),
            pending: Vec::new(),
        };
        ledger.create_block(GENESIS_PROOF, Some(GENESIS_PREVIOUS_HASH.to_string()));
        ledger
    }

    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    pub fn pending(&self) -> &[Transaction] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    pub fn last_block(&self) -> Result<&Block> {
        self.chain.last().ok_or(LedgerError::EmptyChain)
    }

    /// Seal the pending pool into a new block and append it.
    ///
    /// A missing or empty `previous_hash` is replaced by the canonical hash of
    /// the current last block. Neither the hash nor the proof is checked; see
    /// [`Ledger::seal_block`] for the validating variant.
    pub fn create_block(&mut self, proof: u64, previous_hash: Option<String>) -> &Block {
        let previous_hash = previous_hash
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| {
                self.chain
                    .last()
                    .map(canonical_hash)
                    .unwrap_or_else(|| GENESIS_PREVIOUS_HASH.to_string())
            });

        let block = Block {
            index: self.chain.len() as u64 + 1,
            timestamp: unix_timestamp(),
            transactions: mem::take(&mut self.pending),
            proof,
            previous_hash,
        };
        info!(
            index = block.index,
            proof = block.proof,
            txs = block.transactions.len(),
            "sealed block"
        );

        let at = self.chain.len();
        self.chain.push(block);
        &self.chain[at]
    }

    /// Seal a block only if `previous_hash` links to the current tip and
    /// `proof` satisfies `pow` against the tip's proof. Nothing changes on error.
    pub fn seal_block(
        &mut self,
        proof: u64,
        previous_hash: &str,
        pow: &ProofOfWork,
    ) -> Result<&Block> {
        let (expected, previous_proof) = {
            let last = self.last_block()?;
            (canonical_hash(last), last.proof)
        };
        if previous_hash != expected {
            return Err(LedgerError::PreviousHashMismatch {
                expected,
                found: previous_hash.to_string(),
            });
        }
        if !pow.verify(previous_proof, proof) {
            return Err(LedgerError::InvalidProof {
                previous_proof,
                proof,
            });
        }
        Ok(self.create_block(proof, Some(expected)))
    }

    /// Queue a transaction; returns the index of the block it is expected to land in.
    pub fn add_transaction(
        &mut self,
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: impl Into<Amount>,
    ) -> u64 {
        let tx = Transaction::new(sender, recipient, amount);
        debug!(sender = %tx.sender, recipient = %tx.recipient, amount = %tx.amount, "transaction queued");
        self.pending.push(tx);
        self.chain.last().map_or(0, |b| b.index) + 1
    }

    pub fn validate(&self, pow: &ProofOfWork) -> Result<()> {
        validate_chain(&self.chain, pow)
    }
}

/// Check index continuity, hash linkage and proof-of-work across `blocks`.
pub fn validate_chain(blocks: &[Block], pow: &ProofOfWork) -> Result<()> {
    let first = blocks.first().ok_or(LedgerError::EmptyChain)?;
    if first.index != 1 {
        return Err(LedgerError::IndexGap {
            expected: 1,
            found: first.index,
        });
    }
    for pair in blocks.windows(2) {
        let (prev, block) = (&pair[0], &pair[1]);
        if prev.index.checked_add(1) != Some(block.index) {
            return Err(LedgerError::IndexGap {
                expected: prev.index.saturating_add(1),
                found: block.index,
            });
        }
        let expected = canonical_hash(prev);
        if block.previous_hash != expected {
            return Err(LedgerError::PreviousHashMismatch {
                expected,
                found: block.previous_hash.clone(),
            });
        }
        if !pow.verify(prev.proof, block.proof) {
            return Err(LedgerError::InvalidProof {
                previous_proof: prev.proof,
                proof: block.proof,
            });
        }
    }
    Ok(())
}

fn unix_timestamp() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}
