use agent::{client::Client, strategy::StrategyKind};
use clap::Parser;
use common::model::wallet::Account;
use tracing::{info, Level};

/// Plays the Rock Paper Scissors mini app from the terminal.
#[derive(Parser, Debug)]
#[command(name = "agent", version)]
struct Args {
    /// Websocket URL of the mini app server
    #[arg(long, env = "AGENT_SERVER", default_value = "ws://127.0.0.1:3001")]
    server: String,

    /// Wallet address to play with
    #[arg(long, env = "AGENT_WALLET_ADDRESS")]
    address: String,

    #[arg(long, value_enum, default_value_t = StrategyKind::Random)]
    strategy: StrategyKind,

    #[arg(long, default_value_t = 1)]
    rounds: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_line_number(true)
        .with_file(true)
        .with_max_level(Level::INFO)
        .init();
    let args = Args::parse();

    let mut client = Client::new(args.strategy.build(), Account::new(args.address));
    client.run(&args.server, args.rounds).await?;
    info!("{}", client.summary());
    Ok(())
}
