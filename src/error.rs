use crate::packet::PacketDecodeError;
use async_tungstenite::tungstenite;
use serde_json::Value;
use std::fmt;

#[derive(Debug)]
pub enum Error {
    /// An error with the underlying websocket
    Transport(String),
    /// A violation of the engine.io or socket.io protocol
    Protocol(String),
    /// The server answered the namespace connect with an error packet
    ConnectRefused(Value),
    InvalidUrl(String),
    /// The session is gone, nothing can be sent on it
    Closed,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(reason) => write!(f, "transport error: {}", reason),
            Self::Protocol(reason) => write!(f, "protocol error: {}", reason),
            Self::ConnectRefused(data) => write!(f, "connection refused by server: {}", data),
            Self::InvalidUrl(reason) => write!(f, "invalid url: {}", reason),
            Self::Closed => write!(f, "connection closed"),
        }
    }
}

impl std::error::Error for Error {}

impl From<tungstenite::Error> for Error {
    fn from(err: tungstenite::Error) -> Self {
        match err {
            tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => {
                Self::Closed
            }
            other => Self::Transport(other.to_string()),
        }
    }
}

impl From<PacketDecodeError> for Error {
    fn from(err: PacketDecodeError) -> Self {
        Self::Protocol(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Protocol(err.to_string())
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}
