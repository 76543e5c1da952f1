use rand::Rng;
use serde::{Deserialize, Serialize};

/// Result of a round, from the player's side of the table.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Win,
    Lose,
    Tie,
}
impl Outcome {
    pub fn banner(&self) -> &'static str {
        match self {
            Outcome::Win => "WIN!",
            Outcome::Lose => "LOSE",
            Outcome::Tie => "TIE",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    Rock,
    Paper,
    Scissors,
}
impl Move {
    pub const ALL: [Move; 3] = [Move::Rock, Move::Paper, Move::Scissors];

    /// `None` on a tie, otherwise whether `self` wins.
    pub fn beats(&self, other: &Move) -> Option<bool> {
        if self == other {
            None
        } else {
            Some(matches!(
                (self, other),
                (Move::Rock, Move::Scissors)
                    | (Move::Scissors, Move::Paper)
                    | (Move::Paper, Move::Rock)
            ))
        }
    }

    /// The move that wins against `self`.
    pub fn beaten_by(&self) -> Move {
        match self {
            Move::Rock => Move::Paper,
            Move::Paper => Move::Scissors,
            Move::Scissors => Move::Rock,
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Move::Rock => "🪨",
            Move::Paper => "📄",
            Move::Scissors => "✂️",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundResult {
    pub player_move: Move,
    pub computer_move: Move,
    pub outcome: Outcome,
}
impl RoundResult {
    pub fn play(player_move: Move, computer_move: Move) -> Self {
        RoundResult {
            player_move,
            computer_move,
            outcome: resolve(player_move, computer_move),
        }
    }
}

/// Uniform pick over the three moves from the thread-local generator.
pub fn random_move() -> Move {
    random_move_with(&mut rand::thread_rng())
}

pub fn random_move_with<R: Rng>(rng: &mut R) -> Move {
    Move::ALL[rng.gen_range(0..Move::ALL.len())]
}

pub fn resolve(player: Move, computer: Move) -> Outcome {
    match player.beats(&computer) {
        None => Outcome::Tie,
        Some(true) => Outcome::Win,
        Some(false) => Outcome::Lose,
    }
}

/// Every (player, computer) pairing with its outcome, player-major.
pub fn rule_table() -> Vec<RoundResult> {
    Move::ALL
        .iter()
        .flat_map(|player| {
            Move::ALL
                .iter()
                .map(move |computer| RoundResult::play(*player, *computer))
        })
        .collect()
}
