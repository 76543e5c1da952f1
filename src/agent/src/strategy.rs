use clap::ValueEnum;
use common::model::game::{random_move, Move, RoundResult};

pub trait Strategy {
    fn make_move(&self, history: &[RoundResult]) -> Move;
}

// Trivial strategies
pub struct OnlyRock {}
impl Strategy for OnlyRock {
    fn make_move(&self, _: &[RoundResult]) -> Move {
        Move::Rock
    }
}
pub struct OnlyPaper {}
impl Strategy for OnlyPaper {
    fn make_move(&self, _: &[RoundResult]) -> Move {
        Move::Paper
    }
}
pub struct OnlyScissors {}
impl Strategy for OnlyScissors {
    fn make_move(&self, _: &[RoundResult]) -> Move {
        Move::Scissors
    }
}

// Random
pub struct RandomMove {}
impl Strategy for RandomMove {
    fn make_move(&self, _: &[RoundResult]) -> Move {
        random_move()
    }
}

/// Plays whatever would have beaten the computer's previous move.
pub struct BeatLast {}
impl Strategy for BeatLast {
    fn make_move(&self, history: &[RoundResult]) -> Move {
        history
            .last()
            .map(|round| round.computer_move.beaten_by())
            .unwrap_or(Move::Rock)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyKind {
    OnlyRock,
    OnlyPaper,
    OnlyScissors,
    Random,
    BeatLast,
}
impl StrategyKind {
    pub fn build(&self) -> Box<dyn Strategy + Send> {
        match self {
            StrategyKind::OnlyRock => Box::new(OnlyRock {}),
            StrategyKind::OnlyPaper => Box::new(OnlyPaper {}),
            StrategyKind::OnlyScissors => Box::new(OnlyScissors {}),
            StrategyKind::Random => Box::new(RandomMove {}),
            StrategyKind::BeatLast => Box::new(BeatLast {}),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_strategies_ignore_history() {
        let history = [RoundResult::play(Move::Paper, Move::Rock)];
        assert_eq!(OnlyRock {}.make_move(&history), Move::Rock);
        assert_eq!(OnlyPaper {}.make_move(&[]), Move::Paper);
        assert_eq!(OnlyScissors {}.make_move(&history), Move::Scissors);
    }

    #[test]
    fn beat_last_counters_previous_computer_move() {
        assert_eq!(BeatLast {}.make_move(&[]), Move::Rock);
        let history = [
            RoundResult::play(Move::Rock, Move::Rock),
            RoundResult::play(Move::Rock, Move::Scissors),
        ];
        assert_eq!(BeatLast {}.make_move(&history), Move::Rock);
        let history = [RoundResult::play(Move::Rock, Move::Paper)];
        assert_eq!(BeatLast {}.make_move(&history), Move::Scissors);
    }

    #[test]
    fn kinds_build_matching_strategies() {
        assert_eq!(StrategyKind::OnlyScissors.build().make_move(&[]), Move::Scissors);
        assert!(Move::ALL.contains(&StrategyKind::Random.build().make_move(&[])));
    }
}
