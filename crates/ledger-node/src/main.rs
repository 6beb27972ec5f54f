use clap::Parser;
use ledger_core::{Ledger, ProofOfWork};
use ledger_node::{config::Args, router, AppState};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let node_id = args.node_id();
    let state = AppState::new(Ledger::new(), ProofOfWork::new(args.difficulty), node_id.clone());
    let app = router(state);

    info!(%node_id, difficulty = %args.difficulty, "ledger-node starting");
    let listener = tokio::net::TcpListener::bind(args.listen).await?;
    info!("ledger-node listening on http://{}", args.listen);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("ledger-node stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
