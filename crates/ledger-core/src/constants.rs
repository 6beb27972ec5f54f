pub const HASH_SIZE: usize = 32;
pub const HASH_HEX_SIZE: usize = HASH_SIZE * 2;
pub const GENESIS_PROOF: u64 = 100;
pub const GENESIS_PREVIOUS_HASH: &str = "1";
pub const POW_DEFAULT_DIFFICULTY: u8 = 5;
pub const POW_MAX_DIFFICULTY: u8 = HASH_HEX_SIZE as u8;
pub const MINING_REWARD_SENDER: &str = "0";
pub const MINING_REWARD_AMOUNT: u64 = 1;
