use serde::{Deserialize, Serialize};
use tracing::info;

/// A connected wallet, identified by its address.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub address: String,
}
impl Account {
    pub fn new(address: impl Into<String>) -> Self {
        Account {
            address: address.into(),
        }
    }

    /// Avatar letter shown next to the address.
    pub fn initial(&self) -> Option<char> {
        self.address.chars().next()
    }

    pub fn display(&self) -> String {
        shorten_address(&self.address)
    }
}

/// The wallet capability the game is gated on. Authentication lives with the
/// wallet provider; the game only asks who is connected and can drop them.
pub trait WalletConnection {
    fn current_account(&self) -> Option<&Account>;
    fn disconnect(&mut self);
}

/// Wallet announced by the client when its socket opened.
#[derive(Debug, Default, Clone)]
pub struct SessionWallet {
    account: Option<Account>,
}
impl SessionWallet {
    pub fn new(account: Option<Account>) -> Self {
        SessionWallet { account }
    }
}
impl WalletConnection for SessionWallet {
    fn current_account(&self) -> Option<&Account> {
        self.account.as_ref()
    }

    fn disconnect(&mut self) {
        if let Some(account) = self.account.take() {
            info!("Disconnected wallet {}", account.display());
        }
    }
}

const PREFIX_LEN: usize = 6;
const SUFFIX_LEN: usize = 4;

/// `0x1234567890abcdef` -> `0x1234...cdef`
pub fn shorten_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= PREFIX_LEN + SUFFIX_LEN {
        return address.to_owned();
    }
    let prefix: String = chars[..PREFIX_LEN].iter().collect();
    let suffix: String = chars[chars.len() - SUFFIX_LEN..].iter().collect();
    format!("{}...{}", prefix, suffix)
}
