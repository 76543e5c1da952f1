use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::wallet::Account;

#[derive(Debug, Hash, Eq, PartialEq, Clone, Copy)]
pub struct Id(pub Uuid);
impl Id {
    pub fn new() -> Self {
        Id(Uuid::new_v4())
    }
}
impl Default for Id {
    fn default() -> Self {
        Self::new()
    }
}
impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let uuid = Uuid::parse_str(&s).map_err(serde::de::Error::custom)?;
        Ok(Id(uuid))
    }
}
impl Serialize for Id {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

// First frame on every socket: who is playing, and with which wallet
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OpenSocketRequest {
    pub user_id: Id,
    pub account: Option<Account>,
}

// Websocket messages
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SocketRequest<T> {
    pub user_id: Option<Id>,
    pub request: T,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SocketResponse<T> {
    pub user_id: Id,
    pub message: T,
}
