pub mod game;
pub mod messages;
pub mod opponent;
pub mod session;
pub mod wallet;
