//! A small socket.io client over a websocket-only transport, and the
//! weather smoke test built on it.
//!
//! ```no_run
//! use weathercast::ClientBuilder;
//!
//! # async_std::task::block_on(async {
//! let client = ClientBuilder::new("http://localhost:5000")
//!     .on("connect", |_, sender| {
//!         sender.emit("message", "Hello").ok();
//!     })
//!     .on("message", |payload, _| println!("Received message: {}", payload))
//!     .connect()
//!     .unwrap();
//! client.join().await.ok();
//! # });
//! ```

mod client;
mod config;
mod error;
mod handler;
mod packet;
mod payload;
pub mod probe;
pub mod raw;
mod session;
mod socket_packet;
mod transport;

pub use client::{Client, ClientBuilder, Sender};
pub use config::{ClientConfig, DEFAULT_PATH};
pub use error::Error;
pub use handler::{Callback, Callbacks, EventHandler, RESERVED_EVENTS};
pub use packet::{Packet, PacketData, PacketDecodeError, PacketType};
pub use payload::Payload;
pub use socket_packet::{SocketPacket, SocketPacketType, DEFAULT_NAMESPACE};
