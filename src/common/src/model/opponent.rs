use rand::{rngs::SmallRng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::game::{random_move_with, Move};

/// Where the computer's moves come from.
pub trait MoveSource {
    fn next_move(&mut self) -> Move;
}

#[derive(Debug, Error, PartialEq)]
pub enum OpponentError {
    #[error("scripted opponent needs at least one move")]
    EmptyScript,
}

pub struct RandomOpponent {
    rng: SmallRng,
}
impl RandomOpponent {
    pub fn from_entropy() -> Self {
        RandomOpponent {
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        RandomOpponent {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}
impl MoveSource for RandomOpponent {
    fn next_move(&mut self) -> Move {
        random_move_with(&mut self.rng)
    }
}

/// Replays a fixed list of moves, wrapping around at the end.
#[derive(Debug, Clone)]
pub struct ScriptedOpponent {
    moves: Vec<Move>,
    position: usize,
}
impl ScriptedOpponent {
    pub fn new(moves: Vec<Move>) -> Result<Self, OpponentError> {
        if moves.is_empty() {
            return Err(OpponentError::EmptyScript);
        }
        Ok(ScriptedOpponent { moves, position: 0 })
    }
}
impl MoveSource for ScriptedOpponent {
    fn next_move(&mut self) -> Move {
        let next = self.moves[self.position];
        self.position = (self.position + 1) % self.moves.len();
        next
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(tag = "type")]
pub enum OpponentConfig {
    #[default]
    Random,
    Seeded {
        seed: u64,
    },
    Scripted {
        moves: Vec<Move>,
    },
}
impl OpponentConfig {
    pub fn build(&self) -> Result<Box<dyn MoveSource + Send>, OpponentError> {
        Ok(match self {
            OpponentConfig::Random => Box::new(RandomOpponent::from_entropy()),
            OpponentConfig::Seeded { seed } => Box::new(RandomOpponent::seeded(*seed)),
            OpponentConfig::Scripted { moves } => Box::new(ScriptedOpponent::new(moves.clone())?),
        })
    }
}
