use tracing::info;

use crate::chain::Ledger;
use crate::constants::{MINING_REWARD_AMOUNT, MINING_REWARD_SENDER};
use crate::error::Result;
use crate::pow::ProofOfWork;
use crate::{Block, Transaction};

/// The transaction crediting `recipient` for a mined block.
pub fn reward_transaction(recipient: impl Into<String>) -> Transaction {
    Transaction::new(MINING_REWARD_SENDER, recipient, MINING_REWARD_AMOUNT)
}

/// Credit the reward to `reward_recipient` and seal `proof` on top of the current tip.
///
/// `proof` is expected to come from a search against the tip's proof; it is
/// not re-checked here.
pub fn seal_mined_block<'a>(
    ledger: &'a mut Ledger,
    proof: u64,
    reward_recipient: &str,
) -> Result<&'a Block> {
    let reward = reward_transaction(reward_recipient);
    ledger.add_transaction(reward.sender, reward.recipient, reward.amount);
    let previous_hash = ledger.last_block()?.hash();
    Ok(ledger.create_block(proof, Some(previous_hash)))
}

/// Search for the next proof and seal a block with it, all on the calling thread.
pub fn mine_next<'a>(
    ledger: &'a mut Ledger,
    pow: &ProofOfWork,
    reward_recipient: &str,
) -> Result<&'a Block> {
    let last_proof = ledger.last_block()?.proof;
    let proof = pow.search(last_proof);
    info!(last_proof, proof, difficulty = %pow.difficulty(), "mined proof");
    seal_mined_block(ledger, proof, reward_recipient)
}
