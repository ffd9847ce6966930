//! Websocket transport: one engine.io packet per frame.

use crate::error::Error;
use crate::packet::{Packet, PacketData, PacketDecodeError, PacketType};
use async_tungstenite::async_std::{connect_async, ConnectStream};
use async_tungstenite::tungstenite::Message;
use async_tungstenite::WebSocketStream;
use log::{debug, info};
use url::Url;

pub(crate) type WsStream = WebSocketStream<ConnectStream>;

/// What a single websocket frame amounts to for the session.
#[derive(Debug, PartialEq)]
pub(crate) enum Inbound {
    Packet(Packet),
    Close,
    /// Websocket-level ping/pong, answered by tungstenite itself
    Control,
}

pub(crate) async fn open(url: &Url) -> Result<WsStream, Error> {
    info!("Establishing connection to {}", url);
    let (stream, response) = connect_async(url.as_str()).await?;
    debug!("Upgrade answered with {}", response.status());
    Ok(stream)
}

pub(crate) fn encode(packet: Packet) -> Message {
    let packet_type = packet.packet_type();
    match packet.into_data() {
        PacketData::Str(data) => Message::text(format!("{}{}", packet_type.as_char(), data)),
        PacketData::Bytes(bytes) => Message::binary(bytes),
    }
}

pub(crate) fn decode(message: Message) -> Result<Inbound, PacketDecodeError> {
    match message {
        Message::Text(text) => Ok(Inbound::Packet(text.parse()?)),
        Message::Binary(bytes) => Ok(Inbound::Packet(Packet::with_bytes(
            PacketType::Message,
            bytes,
        ))),
        Message::Close(frame) => {
            debug!("Close frame {:?}", frame);
            Ok(Inbound::Close)
        }
        _ => Ok(Inbound::Control),
    }
}
