use common::model::{opponent::MoveSource, session::Session, wallet::SessionWallet};

/// Everything one open socket owns: the wallet it announced, its round, and
/// the computer it plays against.
pub struct PlayerConnection {
    pub wallet: SessionWallet,
    pub session: Session,
    pub opponent: Box<dyn MoveSource + Send>,
}
