use std::fmt;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::{POW_DEFAULT_DIFFICULTY, POW_MAX_DIFFICULTY};
use crate::error::{LedgerError, Result};
use crate::{sha256, Hash};

/// Candidates scanned per parallel round. Rounds run in ascending order so the
/// first hit in a round is the global minimum.
const PARALLEL_WINDOW: u64 = 1 << 16;

/// Number of leading hexadecimal zeros a work digest must have.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Difficulty(u8);

impl Difficulty {
    pub fn new(zeros: u8) -> Result<Self> {
        if zeros == 0 || zeros > POW_MAX_DIFFICULTY {
            return Err(LedgerError::InvalidDifficulty(zeros));
        }
        Ok(Self(zeros))
    }

    pub fn zeros(self) -> u8 {
        self.0
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self(POW_DEFAULT_DIFFICULTY)
    }
}

impl TryFrom<u8> for Difficulty {
    type Error = LedgerError;

    fn try_from(zeros: u8) -> Result<Self> {
        Self::new(zeros)
    }
}

impl From<Difficulty> for u8 {
    fn from(d: Difficulty) -> u8 {
        d.0
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Digest of the decimal previous proof immediately followed by the decimal candidate.
pub fn work_digest(previous_proof: u64, proof: u64) -> Hash {
    sha256(format!("{previous_proof}{proof}").as_bytes())
}

/// Leading zero hex digits of `hash`, i.e. leading zero nibbles.
pub fn count_leading_zero_nibbles(hash: &Hash) -> u32 {
    let mut total = 0u32;
    for b in hash {
        if *b == 0 {
            total += 2;
        } else {
            if *b >> 4 == 0 {
                total += 1;
            }
            break;
        }
    }
    total
}

/// Proof-of-work search and verification over pairs of proofs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProofOfWork {
    difficulty: Difficulty,
}

impl ProofOfWork {
    pub fn new(difficulty: Difficulty) -> Self {
        Self { difficulty }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn verify(&self, previous_proof: u64, proof: u64) -> bool {
        let digest = work_digest(previous_proof, proof);
        count_leading_zero_nibbles(&digest) >= u32::from(self.difficulty.zeros())
    }

    /// Smallest candidate, counting up from zero, that `verify` accepts.
    ///
    /// Blocks the calling thread until a proof is found. There is no upper
    /// bound; use [`ProofOfWork::search_bounded`] when the caller needs one.
    pub fn search(&self, previous_proof: u64) -> u64 {
        let mut proof = 0u64;
        while !self.verify(previous_proof, proof) {
            proof = proof.wrapping_add(1);
        }
        debug!(previous_proof, proof, "proof found");
        proof
    }

    /// Like `search`, but gives up after `max_attempts` candidates.
    pub fn search_bounded(&self, previous_proof: u64, max_attempts: u64) -> Option<u64> {
        (0..max_attempts).find(|proof| self.verify(previous_proof, *proof))
    }

    /// Same result as `search`, spreading each window of candidates across the rayon pool.
    pub fn search_parallel(&self, previous_proof: u64) -> u64 {
        let mut start = 0u64;
        loop {
            let end = start.saturating_add(PARALLEL_WINDOW);
            let found = (start..end)
                .into_par_iter()
                .find_first(|proof| self.verify(previous_proof, *proof));
            if let Some(proof) = found {
                debug!(previous_proof, proof, "proof found (parallel)");
                return proof;
            }
            if end == u64::MAX {
                // Only u64::MAX itself is left unscanned.
                return self.search(previous_proof);
            }
            start = end;
        }
    }
}
