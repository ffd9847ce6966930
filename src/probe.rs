//! The weather smoke test: connect, ask one question, log what happens.

use crate::client::{Client, ClientBuilder};
use crate::error::Error;
use crate::payload::Payload;
use log::{error, info};

pub const DEFAULT_URL: &str = "http://localhost:5000";
pub const TEST_MESSAGE: &str = "Hello, I want to know the weather in New York";

/// Plain websocket endpoint of the weather assistant.
pub const RAW_URL: &str = "ws://localhost:5000/ws";
pub const RAW_MESSAGE: &str = "what is the temperature in New York city";

#[derive(Debug, Clone, PartialEq)]
pub struct ProbeConfig {
    pub url: String,
    pub message: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        ProbeConfig {
            url: DEFAULT_URL.to_owned(),
            message: TEST_MESSAGE.to_owned(),
        }
    }
}

pub fn received_line(payload: &Payload) -> String {
    format!("Received message: {}", payload)
}

/// A client builder with the four logging handlers registered. The
/// test message goes out on every successful connect.
pub fn builder(config: &ProbeConfig) -> ClientBuilder {
    let message = config.message.clone();
    ClientBuilder::new(config.url.as_str())
        .on("connect", move |_, sender| {
            info!("Connected to the WebSocket server");
            if let Err(err) = sender.emit("message", message.as_str()) {
                error!("Could not send test message: {}", err);
            }
        })
        .on("message", |payload, _| info!("{}", received_line(payload)))
        .on("disconnect", |_, _| info!("Disconnected from WebSocket server"))
        .on("error", |payload, _| error!("Error: {}", payload))
}

pub fn connect(config: &ProbeConfig) -> Result<Client, Error> {
    builder(config).connect()
}
