pub(crate) const DEFAULT_LISTEN: &str = "127.0.0.1:5000";
pub(crate) const NODE_ID_BYTES: usize = 16;
pub(crate) const MSG_BLOCK_FORGED: &str = "New Block Forged";
pub(crate) const MSG_MISSING_VALUES: &str = "Missing values";
