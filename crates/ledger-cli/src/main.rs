use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use ledger_core::{validate_chain, Amount, Block, Difficulty, ProofOfWork};
use serde::{Deserialize, Serialize};
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "ledger-cli")]
#[command(about = "CLI client for the proof-of-work ledger node")]
struct Cli {
    /// Node base URL (e.g. http://127.0.0.1:5000)
    #[arg(long, global = true, env = "LEDGER_NODE_URL", default_value = "http://127.0.0.1:5000")]
    node: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit a transaction to the pending pool
    Submit {
        /// Sender
        #[arg(long)]
        sender: String,
        /// Recipient
        #[arg(long)]
        recipient: String,
        /// Amount, any JSON number (e.g. 10, 2.5, -3)
        #[arg(long, allow_negative_numbers = true)]
        amount: Amount,
    },
    /// Ask the node to mine the next block
    Mine,
    /// Print the full chain
    Chain {
        /// Check linkage and proofs locally at this difficulty
        #[arg(long)]
        verify: Option<u8>,
    },
}

#[derive(Serialize)]
struct Tx {
    sender: String,
    recipient: String,
    amount: Amount,
}

#[derive(Deserialize)]
struct ChainBody {
    chain: Vec<Block>,
    length: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .pretty()
        .init();

    let cli = Cli::parse();
    let node = cli.node.trim_end_matches('/');
    let client = reqwest::Client::new();

    match cli.cmd {
        Command::Submit {
            sender,
            recipient,
            amount,
        } => {
            let tx = Tx {
                sender,
                recipient,
                amount,
            };
            let res = client
                .post(format!("{node}/transactions/new"))
                .json(&tx)
                .send()
                .await?;
            print_response(res).await?;
        }
        Command::Mine => {
            let res = client.get(format!("{node}/mine")).send().await?;
            print_response(res).await?;
        }
        Command::Chain { verify } => {
            let res = client
                .get(format!("{node}/chain"))
                .send()
                .await?
                .error_for_status()?;
            let body: ChainBody = res.json().await.context("decoding chain")?;
            debug!(length = body.length, "fetched chain");
            println!("{}", serde_json::to_string_pretty(&body.chain)?);
            println!("length: {}", body.length);

            if let Some(zeros) = verify {
                let pow = ProofOfWork::new(Difficulty::new(zeros)?);
                match validate_chain(&body.chain, &pow) {
                    Ok(()) => println!("chain valid at difficulty {zeros}"),
                    Err(e) => bail!("chain invalid: {e}"),
                }
            }
        }
    }
    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<()> {
    let status = res.status();
    let body = res.text().await?;
    println!("status: {status}");
    match serde_json::from_str::<serde_json::Value>(&body) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{body}"),
    }
    Ok(())
}
