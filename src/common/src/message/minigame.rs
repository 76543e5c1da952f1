use crate::model::{
    game::{Move, Outcome, RoundResult},
    session::SessionPhase,
};
use serde::{Deserialize, Serialize};

// Client types
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum ClientRequest {
    Play { value: Move },
    ClaimPrize,
    CloseModal,
    Reset,
    GetState,
    Disconnect,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type")]
pub enum ClientResponse {
    // Socket opened without a wallet; nothing can be played yet
    WalletRequired,
    Connected {
        address: String,
        display: String,
    },
    RoundResult {
        player_move: Move,
        computer_move: Move,
        outcome: Outcome,
        prize_claimable: bool,
    },
    PrizeModal {
        tokens: u32,
    },
    PrizeClaimed,
    // Round discarded, ready for the next move
    Idle,
    State {
        view: SessionPhase,
    },
    Rejected {
        reason: String,
    },
    Disconnected,
}

impl ClientResponse {
    pub fn round_result(round: RoundResult, prize_claimable: bool) -> Self {
        ClientResponse::RoundResult {
            player_move: round.player_move,
            computer_move: round.computer_move,
            outcome: round.outcome,
            prize_claimable,
        }
    }

    pub fn rejected(reason: impl ToString) -> Self {
        ClientResponse::Rejected {
            reason: reason.to_string(),
        }
    }
}
