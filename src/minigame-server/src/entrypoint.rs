use std::sync::Arc;

use super::service::{rules::rest_endpoint_thread, session_socket::SessionSocket};
use common::model::opponent::{OpponentConfig, OpponentError};
use common::utility::random_address;
use common::websocket::WebsocketHandler;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;
use tracing::{info, Level};

pub const DEFAULT_PRIZE_TOKENS: u32 = 10;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub socket_address: String,
    pub rest_address: String,
    pub opponent: OpponentConfig,
    pub prize_tokens: u32,
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },
    #[error("invalid opponent configuration: {0}")]
    Opponent(#[from] OpponentError),
    #[error("rules endpoint failed: {0}")]
    Rest(std::io::Error),
    #[error("server task exited non-gracefully: {0}")]
    Join(#[from] tokio::task::JoinError),
}

async fn bind(address: &str) -> Result<TcpListener, ServerError> {
    TcpListener::bind(address)
        .await
        .map_err(|source| ServerError::Bind {
            address: address.to_owned(),
            source,
        })
}

pub async fn serve(
    config: ServerConfig,
    shutdown_receiver: broadcast::Receiver<()>,
    ready_signal: Option<oneshot::Sender<()>>,
) -> Result<(), ServerError> {
    let socket = Arc::new(SessionSocket::new(
        config.opponent.clone(),
        config.prize_tokens,
    )?);
    let ws_listener = bind(&config.socket_address).await?;
    let rest_listener = bind(&config.rest_address).await?;

    // Shutdown hook
    let mut ws_shutdown_receiver = shutdown_receiver.resubscribe();
    let rest_shutdown_receiver = shutdown_receiver.resubscribe();

    // Websocket handler - one session per connection
    let websocket_handle: JoinHandle<()> = tokio::spawn(async move {
        SessionSocket::listen(socket, ws_listener, &mut ws_shutdown_receiver).await
    });
    // REST endpoint: rules table and health check
    let rest_handle: JoinHandle<std::io::Result<()>> =
        tokio::spawn(rest_endpoint_thread(rest_listener, rest_shutdown_receiver));

    // Signal that the server is ready
    if let Some(ready_signal) = ready_signal {
        info!("Sent ready");
        if ready_signal.send(()).is_err() {
            info!("Nobody was waiting for the ready signal");
        }
    }

    join_tasks(websocket_handle, rest_handle).await
}

// Returns as soon as either task fails, otherwise once both have exited.
async fn join_tasks(
    websocket_handle: JoinHandle<()>,
    rest_handle: JoinHandle<std::io::Result<()>>,
) -> Result<(), ServerError> {
    let websocket = async { websocket_handle.await.map_err(ServerError::from) };
    let rest = async {
        rest_handle
            .await
            .map_err(ServerError::from)
            .and_then(|result| result.map_err(ServerError::Rest))
    };
    tokio::try_join!(websocket, rest)?;
    Ok(())
}

/// In-process server on random local ports.
pub struct MinigameServer {
    pub config: ServerConfig,
    shutdown_sender: broadcast::Sender<()>,
}

impl MinigameServer {
    pub async fn new(opponent: OpponentConfig) -> Self {
        // Init logging, ignore error if already set
        let _ = tracing_subscriber::fmt()
            .with_line_number(true)
            .with_file(true)
            .with_max_level(Level::DEBUG)
            .try_init();

        let config = ServerConfig {
            socket_address: random_address().await,
            rest_address: random_address().await,
            opponent,
            prize_tokens: DEFAULT_PRIZE_TOKENS,
        };

        // Create server
        let (shutdown_sender, shutdown_receiver) = broadcast::channel(1);
        let (ready_sender, ready_receiver) = oneshot::channel::<()>();

        let moved_cfg = config.clone();
        tokio::spawn(async move {
            if let Err(e) = serve(moved_cfg, shutdown_receiver, Some(ready_sender)).await {
                tracing::error!("Test server failed: {}", e);
            }
        });

        // Wait for server to be ready
        ready_receiver.await.expect("Server failed to start");

        MinigameServer {
            config,
            shutdown_sender,
        }
    }

    pub fn socket_url(&self) -> String {
        format!("ws://{}", self.config.socket_address)
    }

    pub fn rest_url(&self) -> String {
        format!("http://{}", self.config.rest_address)
    }

    pub async fn shutdown(&self) {
        self.shutdown_sender.send(()).expect("Failed to shutdown");
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::timeout;

    use super::*;

    #[tokio::test]
    async fn rest_failure_is_reported_while_websocket_still_runs() {
        let websocket_handle: JoinHandle<()> = tokio::spawn(std::future::pending::<()>());
        let rest_handle: JoinHandle<std::io::Result<()>> = tokio::spawn(async {
            Err(std::io::Error::new(
                std::io::ErrorKind::AddrNotAvailable,
                "rules endpoint went away",
            ))
        });

        let result = timeout(
            Duration::from_secs(1),
            join_tasks(websocket_handle, rest_handle),
        )
        .await
        .expect("REST failure should not wait for the websocket listener");
        assert!(matches!(result, Err(ServerError::Rest(_))));
    }

    #[tokio::test]
    async fn serve_exits_cleanly_on_shutdown() {
        let config = ServerConfig {
            socket_address: random_address().await,
            rest_address: random_address().await,
            opponent: OpponentConfig::Random,
            prize_tokens: DEFAULT_PRIZE_TOKENS,
        };
        let (shutdown_sender, shutdown_receiver) = broadcast::channel(1);
        let (ready_sender, ready_receiver) = oneshot::channel::<()>();
        let server = tokio::spawn(serve(config, shutdown_receiver, Some(ready_sender)));
        ready_receiver.await.unwrap();

        shutdown_sender.send(()).unwrap();
        let result = timeout(Duration::from_secs(5), server)
            .await
            .expect("server should stop after shutdown")
            .unwrap();
        assert!(result.is_ok());
    }
}
