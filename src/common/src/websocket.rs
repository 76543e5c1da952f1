use std::{net::SocketAddr, sync::Arc};

use async_trait::async_trait;
use futures_util::{stream::SplitSink, SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::{
    net::{TcpListener, TcpStream},
    sync::broadcast,
};
use tokio_tungstenite::{
    accept_async,
    tungstenite::{
        protocol::{frame::coding::CloseCode, CloseFrame},
        Message,
    },
    WebSocketStream,
};
use tracing::{debug, error, info, warn};

use crate::model::messages::{Id, OpenSocketRequest, SocketRequest, SocketResponse};

#[derive(Debug, Error)]
pub enum SocketError {
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("failed to serialize response: {0}")]
    Serialize(#[from] serde_json::Error),
}

type SocketSink = SplitSink<WebSocketStream<TcpStream>, Message>;

/// Reply to the identification frame that opens every socket.
pub enum Handshake<C, RS> {
    // Connection state is created, requests may follow
    Accept { connection: C, response: RS },
    // Not ready yet; the client may identify again
    Retry(RS),
}

#[async_trait]
pub trait WebsocketHandler<ExternalRQ, ExternalRS>
where
    Self: Send + Sync + 'static,
    ExternalRQ: for<'de> Deserialize<'de> + Send + 'static,
    ExternalRS: Serialize + Send + 'static,
{
    /// State owned by a single socket for its whole lifetime.
    type Connection: Send + 'static;

    fn open_connection(&self, request: OpenSocketRequest)
        -> Handshake<Self::Connection, ExternalRS>;

    // Logic to handle a client's request. Every request gets exactly one response.
    fn respond_to_request(
        &self,
        connection: &mut Self::Connection,
        request: ExternalRQ,
    ) -> ExternalRS;

    // Response for a frame that didn't parse. By default, stay silent.
    fn reject_malformed(&self, _error: &serde_json::Error) -> Option<ExternalRS> {
        None
    }

    // Criterion to drop connection. By default, always keep the connection alive.
    fn drop_after_send(_response: &ExternalRS) -> bool {
        false
    }

    /// Accepts sockets on an already bound listener until shutdown.
    async fn listen(
        handler: Arc<Self>,
        ws_listener: TcpListener,
        shutdown_receiver: &mut broadcast::Receiver<()>,
    ) {
        let address = ws_listener
            .local_addr()
            .map(|address| address.to_string())
            .unwrap_or_default();
        info!("Initialized ws listener: {}", address);
        loop {
            tokio::select! {
                result = ws_listener.accept() => {
                    match result {
                        Err(e) => {
                            error!("Failed to accept connection on {} with error: {}", address, e);
                        }
                        Ok((stream, peer)) => {
                            let handler = handler.clone();
                            let connection_shutdown = shutdown_receiver.resubscribe();
                            tokio::spawn(async move {
                                if let Err(e) = Self::connection_thread(handler, stream, peer, connection_shutdown).await {
                                    warn!("Connection {} ended with error: {}", peer, e);
                                }
                            });
                        }
                    }
                },
                _ = shutdown_receiver.recv() => {
                    break;
                }
            };
        }
        info!("Exited ws listener");
    }

    // Thread to handle connection lifetime
    async fn connection_thread(
        handler: Arc<Self>,
        stream: TcpStream,
        address: SocketAddr,
        mut shutdown_receiver: broadcast::Receiver<()>,
    ) -> Result<(), SocketError> {
        info!("New ws connection: {}", address);

        let stream = accept_async(stream).await?;
        let (mut ws_sender, mut ws_receiver) = stream.split();

        // The first message sent is always the user's identification
        let (user_id, mut connection) = loop {
            let msg = tokio::select! {
                msg = ws_receiver.next() => msg,
                _ = shutdown_receiver.recv() => return Ok(()),
            };
            let Some(msg) = msg else {
                warn!("Connection {} closed before identifying", address);
                return Ok(());
            };
            let text = match msg? {
                Message::Text(text) => text,
                Message::Close(_) => return Ok(()),
                other => {
                    debug!("Ignoring non-text frame before identification: {:?}", other);
                    continue;
                }
            };
            let request = match serde_json::from_str::<OpenSocketRequest>(&text) {
                Ok(request) => request,
                Err(e) => {
                    warn!("Failed to parse identification message: {:?}", e);
                    continue;
                }
            };
            let user_id = request.user_id;
            match handler.open_connection(request) {
                Handshake::Accept {
                    connection,
                    response,
                } => {
                    send_response(&mut ws_sender, user_id, response).await?;
                    break (user_id, connection);
                }
                Handshake::Retry(response) => {
                    send_response(&mut ws_sender, user_id, response).await?;
                }
            }
        };

        debug!("Listening to {}", user_id);
        loop {
            let msg = tokio::select! {
                msg = ws_receiver.next() => msg,
                _ = shutdown_receiver.recv() => break,
            };
            let Some(msg) = msg else {
                break;
            };
            let text = match msg? {
                Message::Text(text) => text,
                Message::Close(_) => break,
                _ => continue,
            };
            debug!("msg from {}: {}", user_id, text);

            let response = match serde_json::from_str::<SocketRequest<ExternalRQ>>(&text) {
                Ok(request) => Some(handler.respond_to_request(&mut connection, request.request)),
                Err(e) => {
                    warn!("Could not deserialize request from {}: {}", user_id, e);
                    handler.reject_malformed(&e)
                }
            };
            let Some(response) = response else {
                continue;
            };

            // Drop connection according to criteria
            let close_socket = Self::drop_after_send(&response);
            send_response(&mut ws_sender, user_id, response).await?;
            if close_socket {
                ws_sender
                    .send(Message::Close(Some(CloseFrame {
                        code: CloseCode::Normal,
                        reason: "Decided to close after sending the previous message".into(),
                    })))
                    .await?;
                break;
            }
        }
        info!("Closed ws connection: {} ({})", address, user_id);
        Ok(())
    }
}

async fn send_response<RS: Serialize>(
    sink: &mut SocketSink,
    user_id: Id,
    message: RS,
) -> Result<(), SocketError> {
    let body = serde_json::to_string(&SocketResponse { user_id, message })?;
    sink.send(Message::Text(body)).await?;
    Ok(())
}
