use async_trait::async_trait;
use common::{
    message::minigame::{ClientRequest, ClientResponse},
    model::{
        messages::OpenSocketRequest,
        opponent::{OpponentConfig, OpponentError},
        session::{Session, SessionError},
        wallet::{SessionWallet, WalletConnection},
    },
    websocket::{Handshake, WebsocketHandler},
};
use tracing::{error, info, warn};

use crate::model::connection::PlayerConnection;

pub struct SessionSocket {
    opponent: OpponentConfig,
    prize_tokens: u32,
}

impl SessionSocket {
    /// Fails early if the opponent configuration can't produce a computer player.
    pub fn new(opponent: OpponentConfig, prize_tokens: u32) -> Result<Self, OpponentError> {
        opponent.build()?;
        Ok(SessionSocket {
            opponent,
            prize_tokens,
        })
    }

    fn apply(
        connection: &mut PlayerConnection,
        request: ClientRequest,
    ) -> Result<ClientResponse, SessionError> {
        let session = &mut connection.session;
        Ok(match request {
            ClientRequest::Play { value } => {
                let round = session.play(value, &mut *connection.opponent)?;
                ClientResponse::round_result(round, session.prize_claimable())
            }
            ClientRequest::ClaimPrize => ClientResponse::PrizeModal {
                tokens: session.claim_prize()?,
            },
            ClientRequest::CloseModal => {
                session.close_modal()?;
                ClientResponse::PrizeClaimed
            }
            ClientRequest::Reset => {
                session.reset();
                ClientResponse::Idle
            }
            ClientRequest::GetState => ClientResponse::State {
                view: session.view(),
            },
            ClientRequest::Disconnect => {
                session.reset();
                connection.wallet.disconnect();
                ClientResponse::Disconnected
            }
        })
    }
}

#[async_trait]
impl WebsocketHandler<ClientRequest, ClientResponse> for SessionSocket {
    type Connection = PlayerConnection;

    fn open_connection(
        &self,
        request: OpenSocketRequest,
    ) -> Handshake<PlayerConnection, ClientResponse> {
        let Some(account) = request.account else {
            info!("User {} opened a socket without a wallet", request.user_id);
            return Handshake::Retry(ClientResponse::WalletRequired);
        };
        let opponent = match self.opponent.build() {
            Ok(opponent) => opponent,
            Err(e) => {
                error!("Could not create opponent for {}: {}", request.user_id, e);
                return Handshake::Retry(ClientResponse::rejected(e));
            }
        };
        let response = ClientResponse::Connected {
            address: account.address.clone(),
            display: account.display(),
        };
        let connection = PlayerConnection {
            wallet: SessionWallet::new(Some(account)),
            session: Session::new(self.prize_tokens),
            opponent,
        };
        info!(
            "User {} connected with session {}",
            request.user_id,
            connection.session.id()
        );
        Handshake::Accept {
            connection,
            response,
        }
    }

    fn respond_to_request(
        &self,
        connection: &mut PlayerConnection,
        request: ClientRequest,
    ) -> ClientResponse {
        // Nothing runs until a wallet is connected
        if connection.wallet.current_account().is_none() {
            return ClientResponse::WalletRequired;
        }
        Self::apply(connection, request).unwrap_or_else(|e| {
            warn!("Session {} rejected request: {}", connection.session.id(), e);
            ClientResponse::rejected(e)
        })
    }

    fn reject_malformed(&self, error: &serde_json::Error) -> Option<ClientResponse> {
        Some(ClientResponse::rejected(format!("malformed request: {}", error)))
    }

    fn drop_after_send(response: &ClientResponse) -> bool {
        matches!(response, ClientResponse::Disconnected)
    }
}

#[cfg(test)]
mod tests {
    use common::model::{
        game::{Move, Outcome},
        messages::Id,
        session::{PrizeState, SessionPhase},
        wallet::Account,
    };

    use super::*;

    const ADDRESS: &str = "0x71C7656EC7ab88b098defB751B7401B5f6d8976F";

    fn scripted(moves: Vec<Move>) -> SessionSocket {
        SessionSocket::new(OpponentConfig::Scripted { moves }, 10).unwrap()
    }

    fn connect(socket: &SessionSocket) -> PlayerConnection {
        let request = OpenSocketRequest {
            user_id: Id::new(),
            account: Some(Account::new(ADDRESS)),
        };
        match socket.open_connection(request) {
            Handshake::Accept {
                connection,
                response,
            } => {
                assert_eq!(
                    response,
                    ClientResponse::Connected {
                        address: ADDRESS.to_owned(),
                        display: "0x71C7...976F".to_owned(),
                    }
                );
                connection
            }
            Handshake::Retry(response) => panic!("Expected to connect, got {:?}", response),
        }
    }

    #[test]
    fn empty_script_fails_at_startup() {
        assert!(SessionSocket::new(OpponentConfig::Scripted { moves: vec![] }, 10).is_err());
    }

    #[test]
    fn socket_without_wallet_must_retry() {
        let socket = scripted(vec![Move::Rock]);
        let request = OpenSocketRequest {
            user_id: Id::new(),
            account: None,
        };
        assert!(matches!(
            socket.open_connection(request),
            Handshake::Retry(ClientResponse::WalletRequired)
        ));
    }

    #[test]
    fn forced_computer_moves_decide_rounds() {
        let socket = scripted(vec![Move::Scissors, Move::Paper, Move::Rock]);
        let mut connection = connect(&socket);
        let cases = [
            (Move::Rock, Move::Scissors, Outcome::Win, true),
            (Move::Paper, Move::Paper, Outcome::Tie, false),
            (Move::Scissors, Move::Rock, Outcome::Lose, false),
        ];
        for (player_move, computer_move, outcome, prize_claimable) in cases {
            let response = socket.respond_to_request(
                &mut connection,
                ClientRequest::Play { value: player_move },
            );
            assert_eq!(
                response,
                ClientResponse::RoundResult {
                    player_move,
                    computer_move,
                    outcome,
                    prize_claimable,
                }
            );
            assert_eq!(
                socket.respond_to_request(&mut connection, ClientRequest::Reset),
                ClientResponse::Idle
            );
        }
    }

    #[test]
    fn prize_flow_over_requests() {
        let socket = scripted(vec![Move::Scissors]);
        let mut connection = connect(&socket);
        socket.respond_to_request(&mut connection, ClientRequest::Play { value: Move::Rock });
        assert_eq!(
            socket.respond_to_request(&mut connection, ClientRequest::ClaimPrize),
            ClientResponse::PrizeModal { tokens: 10 }
        );
        assert_eq!(
            socket.respond_to_request(&mut connection, ClientRequest::CloseModal),
            ClientResponse::PrizeClaimed
        );
        let ClientResponse::State { view } =
            socket.respond_to_request(&mut connection, ClientRequest::GetState)
        else {
            panic!("Expected a state response");
        };
        assert!(matches!(
            view,
            SessionPhase::Resolved {
                prize: PrizeState::Claimed,
                ..
            }
        ));
    }

    #[test]
    fn invalid_transitions_are_rejected() {
        let socket = scripted(vec![Move::Rock]);
        let mut connection = connect(&socket);
        assert_eq!(
            socket.respond_to_request(&mut connection, ClientRequest::ClaimPrize),
            ClientResponse::rejected(SessionError::PrizeNotClaimable)
        );
        socket.respond_to_request(&mut connection, ClientRequest::Play { value: Move::Rock });
        assert_eq!(
            socket.respond_to_request(&mut connection, ClientRequest::Play { value: Move::Paper }),
            ClientResponse::rejected(SessionError::RoundInProgress)
        );
    }

    #[test]
    fn disconnect_blocks_further_play() {
        let socket = scripted(vec![Move::Rock]);
        let mut connection = connect(&socket);
        let response = socket.respond_to_request(&mut connection, ClientRequest::Disconnect);
        assert_eq!(response, ClientResponse::Disconnected);
        assert!(SessionSocket::drop_after_send(&response));
        assert_eq!(connection.session.view(), SessionPhase::Idle);
        assert_eq!(
            socket.respond_to_request(&mut connection, ClientRequest::Play { value: Move::Rock }),
            ClientResponse::WalletRequired
        );
    }
}
