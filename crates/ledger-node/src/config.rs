use std::net::SocketAddr;

use clap::Parser;
use ledger_core::Difficulty;

use crate::constants::{DEFAULT_LISTEN, NODE_ID_BYTES};

#[derive(Parser, Debug, Clone)]
#[command(name = "ledger-node")]
#[command(about = "Single-node proof-of-work ledger served over HTTP")]
pub struct Args {
    /// Address to listen on, e.g. 127.0.0.1:5000
    #[arg(long, env = "LEDGER_LISTEN", default_value = DEFAULT_LISTEN)]
    pub listen: SocketAddr,

    /// Leading zero hex digits a proof must produce
    #[arg(long, env = "LEDGER_DIFFICULTY", default_value_t = Difficulty::default(), value_parser = parse_difficulty)]
    pub difficulty: Difficulty,

    /// Identifier credited with mining rewards; random when omitted
    #[arg(long, env = "LEDGER_NODE_ID")]
    pub node_id: Option<String>,
}

impl Args {
    pub fn node_id(&self) -> String {
        self.node_id.clone().unwrap_or_else(generate_node_id)
    }
}

fn parse_difficulty(s: &str) -> Result<Difficulty, String> {
    let zeros: u8 = s.parse().map_err(|e| format!("{e}"))?;
    Difficulty::new(zeros).map_err(|e| e.to_string())
}

/// 128 random bits as 32 lowercase hex characters.
pub fn generate_node_id() -> String {
    let bytes: [u8; NODE_ID_BYTES] = rand::random();
    hex::encode(bytes)
}
