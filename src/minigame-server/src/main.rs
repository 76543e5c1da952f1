use clap::Parser;
use common::model::opponent::OpponentConfig;
use common::utility::create_shutdown_channel;
use minigame_server::entrypoint::{serve, ServerConfig, DEFAULT_PRIZE_TOKENS};
use tracing::{error, Level};

/// Backend for the Rock Paper Scissors mini app.
#[derive(Parser, Debug)]
#[command(name = "minigame-server", version)]
struct Args {
    /// Websocket address sessions connect to
    #[arg(long, env = "MINIGAME_SOCKET_ADDRESS", default_value = "0.0.0.0:3001")]
    socket_address: String,

    /// REST address serving the rules table
    #[arg(long, env = "MINIGAME_REST_ADDRESS", default_value = "0.0.0.0:8081")]
    rest_address: String,

    /// Tokens advertised by the prize modal
    #[arg(long, env = "MINIGAME_PRIZE_TOKENS", default_value_t = DEFAULT_PRIZE_TOKENS)]
    prize_tokens: u32,

    /// Seed the computer opponent for reproducible games
    #[arg(long, env = "MINIGAME_SEED")]
    seed: Option<u64>,

    #[arg(long, env = "MINIGAME_LOG_LEVEL", default_value = "debug")]
    log_level: Level,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_line_number(true)
        .with_file(true)
        .with_max_level(args.log_level)
        .init();
    // Config
    let config = ServerConfig {
        socket_address: args.socket_address,
        rest_address: args.rest_address,
        opponent: match args.seed {
            Some(seed) => OpponentConfig::Seeded { seed },
            None => OpponentConfig::Random,
        },
        prize_tokens: args.prize_tokens,
    };
    let shutdown_receiver = create_shutdown_channel().await;
    if let Err(e) = serve(config, shutdown_receiver, None).await {
        error!("Server exited: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use common::message::minigame::{ClientRequest, ClientResponse};
    use common::model::game::{Move, RoundResult};
    use common::model::messages::Id;
    use common::test::{DummyType, ServerAddress, TestCase};
    use minigame_server::entrypoint::MinigameServer;

    use super::*;

    const ADDRESS: &str = "0x71C7656EC7ab88b098defB751B7401B5f6d8976F";

    fn data_file(name: &str) -> String {
        env!("CARGO_MANIFEST_DIR").to_string() + "/test/data/" + name
    }

    fn replacements() -> Vec<(String, String)> {
        vec![
            ("user1".to_string(), Id::new().to_string()),
            ("address".to_string(), ADDRESS.to_string()),
        ]
    }

    async fn forced_server() -> MinigameServer {
        MinigameServer::new(OpponentConfig::Scripted {
            moves: vec![Move::Scissors, Move::Paper, Move::Rock],
        })
        .await
    }

    #[tokio::test]
    async fn plays_forced_rounds() {
        let server = forced_server().await;
        let test_case = TestCase::<ClientRequest, ClientResponse, DummyType>::load(
            data_file("forced_rounds.json"),
            replacements(),
        );
        let address_lookup = HashMap::from([(
            "user1".to_string(),
            ServerAddress::WebSocket(server.socket_url()),
        )]);
        test_case.run(address_lookup).await;
        server.shutdown().await;
    }

    #[tokio::test]
    async fn waits_for_wallet() {
        let server = forced_server().await;
        let test_case = TestCase::<ClientRequest, ClientResponse, DummyType>::load(
            data_file("wallet_required.json"),
            replacements(),
        );
        let address_lookup = HashMap::from([(
            "user1".to_string(),
            ServerAddress::WebSocket(server.socket_url()),
        )]);
        test_case.run(address_lookup).await;
        server.shutdown().await;
    }

    #[tokio::test]
    async fn serves_rules() {
        let server = forced_server().await;
        let test_case = TestCase::<ClientRequest, ClientResponse, Vec<RoundResult>>::load(
            data_file("rules.json"),
            replacements(),
        );
        let address_lookup = HashMap::from([(
            "rest".to_string(),
            ServerAddress::RestApi(server.rest_url()),
        )]);
        test_case.run(address_lookup).await;
        server.shutdown().await;
    }
}
