use anyhow::{bail, Result};
use common::{
    message::minigame::{ClientRequest, ClientResponse},
    model::{
        game::{Move, Outcome, RoundResult},
        messages::{Id, OpenSocketRequest, SocketRequest, SocketResponse},
        wallet::Account,
    },
};
use futures_util::{SinkExt, StreamExt};
use itertools::Itertools;
use serde::Serialize;
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info};

use crate::strategy::Strategy;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub struct Client {
    user_id: Id,
    account: Account,
    strategy: Box<dyn Strategy + Send>,
    history: Vec<RoundResult>,
    tokens_claimed: u32,
}

impl Client {
    pub fn new(strategy: Box<dyn Strategy + Send>, account: Account) -> Self {
        Client {
            user_id: Id::new(),
            account,
            strategy,
            history: Vec::new(),
            tokens_claimed: 0,
        }
    }

    pub fn history(&self) -> &[RoundResult] {
        &self.history
    }

    pub fn tokens_claimed(&self) -> u32 {
        self.tokens_claimed
    }

    fn play(&self) -> Move {
        self.strategy.make_move(&self.history)
    }

    /// Connects, plays `rounds` rounds (claiming every prize won), then disconnects.
    pub async fn run(&mut self, url: &str, rounds: usize) -> Result<()> {
        let (mut socket, _) = connect_async(url).await?;
        info!("Connected to {}", url);

        let open = OpenSocketRequest {
            user_id: self.user_id,
            account: Some(self.account.clone()),
        };
        send(&mut socket, &open).await?;
        match receive(&mut socket).await? {
            ClientResponse::Connected { display: shown, .. } => info!("Playing as {}", shown),
            other => bail!("Server refused wallet: {:?}", other),
        }

        for _ in 0..rounds {
            self.play_round(&mut socket).await?;
        }

        match self.request(&mut socket, ClientRequest::Disconnect).await? {
            ClientResponse::Disconnected => debug!("Disconnected"),
            other => bail!("Expected Disconnected, got {:?}", other),
        }
        Ok(())
    }

    async fn play_round(&mut self, socket: &mut Socket) -> Result<()> {
        let value = self.play();
        let (round, prize_claimable) = match self
            .request(socket, ClientRequest::Play { value })
            .await?
        {
            ClientResponse::RoundResult {
                player_move,
                computer_move,
                outcome,
                prize_claimable,
            } => (
                RoundResult {
                    player_move,
                    computer_move,
                    outcome,
                },
                prize_claimable,
            ),
            other => bail!("Expected RoundResult, got {:?}", other),
        };
        info!(
            "{} {:?} vs {} {:?}: {}",
            round.player_move.emoji(),
            round.player_move,
            round.computer_move.emoji(),
            round.computer_move,
            round.outcome.banner()
        );
        self.history.push(round);

        if prize_claimable {
            let ClientResponse::PrizeModal { tokens } =
                self.request(socket, ClientRequest::ClaimPrize).await?
            else {
                bail!("Prize was claimable but no modal was shown");
            };
            info!("Congratulations! You won and can claim {} tokens", tokens);
            match self.request(socket, ClientRequest::CloseModal).await? {
                ClientResponse::PrizeClaimed => self.tokens_claimed += tokens,
                other => bail!("Expected PrizeClaimed, got {:?}", other),
            }
        }

        match self.request(socket, ClientRequest::Reset).await? {
            ClientResponse::Idle => Ok(()),
            other => bail!("Expected Idle, got {:?}", other),
        }
    }

    async fn request(
        &self,
        socket: &mut Socket,
        request: ClientRequest,
    ) -> Result<ClientResponse> {
        send(
            socket,
            &SocketRequest {
                user_id: Some(self.user_id),
                request,
            },
        )
        .await?;
        receive(socket).await
    }

    pub fn summary(&self) -> String {
        let counts = self.history.iter().counts_by(|round| round.outcome);
        let count = |outcome: Outcome| counts.get(&outcome).copied().unwrap_or(0);
        format!(
            "{} rounds: {} won, {} lost, {} tied, {} tokens claimed",
            self.history.len(),
            count(Outcome::Win),
            count(Outcome::Lose),
            count(Outcome::Tie),
            self.tokens_claimed
        )
    }
}

async fn send<T: Serialize>(socket: &mut Socket, body: &T) -> Result<()> {
    socket
        .send(Message::Text(serde_json::to_string(body)?))
        .await?;
    Ok(())
}

async fn receive(socket: &mut Socket) -> Result<ClientResponse> {
    while let Some(msg) = socket.next().await {
        match msg? {
            Message::Text(text) => {
                let response: SocketResponse<ClientResponse> = serde_json::from_str(&text)?;
                debug!("Received {:?}", response.message);
                return Ok(response.message);
            }
            Message::Close(frame) => bail!("Server closed the connection: {:?}", frame),
            _ => continue,
        }
    }
    bail!("Connection ended without a response")
}
