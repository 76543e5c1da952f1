use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use super::{
    game::{Move, Outcome, RoundResult},
    messages::Id,
    opponent::MoveSource,
};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    #[error("a round has already been played, reset first")]
    RoundInProgress,
    #[error("prize is not claimable")]
    PrizeNotClaimable,
    #[error("prize modal is not open")]
    ModalNotShown,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrizeState {
    NotEligible,
    Claimable,
    ModalShown,
    Claimed,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "phase")]
pub enum SessionPhase {
    Idle,
    Resolved {
        round: RoundResult,
        prize: PrizeState,
    },
}

/// One player's play-through: at most one round at a time, discarded on reset.
#[derive(Debug)]
pub struct Session {
    id: Id,
    phase: SessionPhase,
    prize_tokens: u32,
}

impl Session {
    pub fn new(prize_tokens: u32) -> Self {
        Session {
            id: Id::new(),
            phase: SessionPhase::Idle,
            prize_tokens,
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn view(&self) -> SessionPhase {
        self.phase
    }

    pub fn round(&self) -> Option<&RoundResult> {
        match &self.phase {
            SessionPhase::Idle => None,
            SessionPhase::Resolved { round, .. } => Some(round),
        }
    }

    pub fn prize_claimable(&self) -> bool {
        matches!(
            self.phase,
            SessionPhase::Resolved {
                prize: PrizeState::Claimable,
                ..
            }
        )
    }

    pub fn play(
        &mut self,
        player_move: Move,
        opponent: &mut dyn MoveSource,
    ) -> Result<RoundResult, SessionError> {
        if !matches!(self.phase, SessionPhase::Idle) {
            return Err(SessionError::RoundInProgress);
        }
        self.play_against(player_move, opponent.next_move())
    }

    pub fn play_against(
        &mut self,
        player_move: Move,
        computer_move: Move,
    ) -> Result<RoundResult, SessionError> {
        if !matches!(self.phase, SessionPhase::Idle) {
            return Err(SessionError::RoundInProgress);
        }
        let round = RoundResult::play(player_move, computer_move);
        let prize = match round.outcome {
            Outcome::Win => PrizeState::Claimable,
            Outcome::Lose | Outcome::Tie => PrizeState::NotEligible,
        };
        info!(
            "Session {} played {:?} vs {:?}: {:?}",
            self.id, round.player_move, round.computer_move, round.outcome
        );
        self.phase = SessionPhase::Resolved { round, prize };
        Ok(round)
    }

    /// Opens the prize modal, returning the advertised token amount.
    pub fn claim_prize(&mut self) -> Result<u32, SessionError> {
        if !self.advance_prize(PrizeState::Claimable, PrizeState::ModalShown) {
            return Err(SessionError::PrizeNotClaimable);
        }
        Ok(self.prize_tokens)
    }

    pub fn close_modal(&mut self) -> Result<(), SessionError> {
        if !self.advance_prize(PrizeState::ModalShown, PrizeState::Claimed) {
            return Err(SessionError::ModalNotShown);
        }
        Ok(())
    }

    pub fn reset(&mut self) {
        debug!("Session {} reset from {:?}", self.id, self.phase);
        self.phase = SessionPhase::Idle;
    }

    fn advance_prize(&mut self, from: PrizeState, to: PrizeState) -> bool {
        let SessionPhase::Resolved { ref mut prize, .. } = self.phase else {
            return false;
        };
        if *prize != from {
            return false;
        }
        debug!("Session {} prize {:?} -> {:?}", self.id, from, to);
        *prize = to;
        true
    }
}
