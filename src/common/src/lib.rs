pub mod message;
pub mod model;
pub mod utility;
pub mod websocket;
