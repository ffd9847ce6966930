//! One websocket session: handshake, heartbeat and event dispatch on the
//! read half, a queue drained into the write half.

use crate::client::{Outgoing, Sender, SessionState, SharedHandler};
use crate::config::ClientConfig;
use crate::error::Error;
use crate::handler::EventHandler;
use crate::packet::{Packet, PacketData, PacketType};
use crate::socket_packet::{SocketPacket, SocketPacketType, DEFAULT_NAMESPACE};
use crate::transport::{self, Inbound, WsStream};
use async_std::future;
use async_std::task;
use async_tungstenite::tungstenite::error::ProtocolError;
use async_tungstenite::tungstenite::{self, Message};
use futures::channel::mpsc;
use futures::sink::SinkExt;
use futures::stream::{SplitSink, SplitStream, StreamExt};
use serde::Deserialize;

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};

/// Upper bound on the silence tolerated between server frames, whatever
/// ping cycle the server announces.
const MAX_HEARTBEAT: Duration = Duration::from_secs(600);

/// Time allowed between two server frames for the announced ping cycle.
fn heartbeat_limit(ping_interval: u64, ping_timeout: u64) -> Duration {
    Duration::from_millis(ping_interval.saturating_add(ping_timeout)).min(MAX_HEARTBEAT)
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct OpenPacket {
    sid: String,
    #[serde(default)]
    upgrades: Vec<String>,
    ping_interval: u64,
    ping_timeout: u64,
    #[serde(default)]
    max_payload: Option<u64>,
}

pub(crate) async fn run(
    config: Arc<ClientConfig>,
    handler: SharedHandler,
    state: Arc<SessionState>,
    sender: Sender,
    receiver: mpsc::UnboundedReceiver<Outgoing>,
) -> Result<(), Error> {
    let mut handler = handler.lock().await;
    let result = drive(&config, &mut **handler, &state, sender, receiver).await;
    state.finish();
    debug!("Session finished: {:?}", result);
    result
}

async fn drive(
    config: &ClientConfig,
    handler: &mut dyn EventHandler,
    state: &SessionState,
    sender: Sender,
    receiver: mpsc::UnboundedReceiver<Outgoing>,
) -> Result<(), Error> {
    let stream = match open(config).await {
        Ok(stream) => stream,
        Err(err) => {
            error!("Could not connect: {}", err);
            handler.on_error(&err, &sender).await;
            return Err(err);
        }
    };

    let (sink, stream) = stream.split();
    let writer = task::spawn(write_loop(sink, receiver));

    let outcome = ReadLoop {
        handler: &mut *handler,
        sender: &sender,
        state,
        auth: config.auth_payload(),
        heartbeat: None,
    }
    .run(stream)
    .await;

    sender.close();
    if let Err(err) = writer.await {
        debug!("Write loop ended with {}", err);
    }

    let (reason, result) = match outcome {
        Ok(reason) => (reason, Ok(())),
        Err(err) => {
            error!("Session failed: {}", err);
            handler.on_error(&err, &sender).await;
            ("transport error", Err(err))
        }
    };

    if state.take_connected() {
        info!("Disconnected: {}", reason);
        handler.on_disconnect(reason, &sender).await;
    }
    result
}

async fn open(config: &ClientConfig) -> Result<WsStream, Error> {
    let url = config.websocket_url()?;
    transport::open(&url).await
}

struct ReadLoop<'a> {
    handler: &'a mut dyn EventHandler,
    sender: &'a Sender,
    state: &'a SessionState,
    auth: Option<&'a serde_json::Value>,
    /// Longest silence tolerated once the server announced its ping cycle
    heartbeat: Option<Duration>,
}

impl ReadLoop<'_> {
    /// Reads until the session ends and returns the disconnect reason.
    async fn run(mut self, mut stream: SplitStream<WsStream>) -> Result<&'static str, Error> {
        loop {
            let next = match self.heartbeat {
                Some(limit) => match future::timeout(limit, stream.next()).await {
                    Ok(next) => next,
                    Err(_) => {
                        warn!("Nothing heard from the server for {:?}", limit);
                        return Ok("ping timeout");
                    }
                },
                None => stream.next().await,
            };

            let message = match next {
                Some(Ok(message)) => message,
                // Peer went away without a close frame
                Some(Err(tungstenite::Error::Protocol(
                    ProtocolError::ResetWithoutClosingHandshake,
                ))) => {
                    debug!("Connection dropped without closing handshake");
                    return Ok(self.close_reason());
                }
                Some(Err(err)) => return Err(err.into()),
                None => return Ok(self.close_reason()),
            };

            match transport::decode(message) {
                Ok(Inbound::Packet(packet)) => {
                    debug!("Received {:?}", packet);
                    if let Some(reason) = self.handle_packet(packet).await? {
                        return Ok(reason);
                    }
                }
                Ok(Inbound::Close) => return Ok(self.close_reason()),
                Ok(Inbound::Control) => (),
                Err(err) => self.report(err.into()).await,
            }
        }
    }

    fn close_reason(&self) -> &'static str {
        if self.state.is_closing() {
            "io client disconnect"
        } else {
            "transport close"
        }
    }

    async fn report(&mut self, err: Error) {
        warn!("Dropping packet: {}", err);
        self.handler.on_error(&err, self.sender).await;
    }

    async fn handle_packet(&mut self, packet: Packet) -> Result<Option<&'static str>, Error> {
        match packet.packet_type() {
            PacketType::Open => self.handle_open(packet.data())?,
            PacketType::Ping => {
                self.sender
                    .control(Packet::new(PacketType::Pong, packet.into_data()))?;
            }
            PacketType::Close => return Ok(Some("transport close")),
            PacketType::Message => return self.handle_message(packet.into_data()).await,
            PacketType::Pong | PacketType::Upgrade | PacketType::Noop => {
                debug!("Ignoring {:?}", packet);
            }
        }
        Ok(None)
    }

    fn handle_open(&mut self, data: &PacketData) -> Result<(), Error> {
        let open: OpenPacket = match data {
            PacketData::Str(string) => serde_json::from_str(string)?,
            PacketData::Bytes(_) => {
                return Err(Error::Protocol("binary open packet".to_owned()));
            }
        };
        debug!(
            "Engine open, sid is {}, upgrades {:?}, max payload {:?}",
            open.sid, open.upgrades, open.max_payload
        );
        self.heartbeat = Some(heartbeat_limit(open.ping_interval, open.ping_timeout));

        let connect = SocketPacket::connect(DEFAULT_NAMESPACE, self.auth.cloned());
        self.sender.control(connect.into())
    }

    async fn handle_message(&mut self, data: PacketData) -> Result<Option<&'static str>, Error> {
        let packet = match data {
            PacketData::Str(string) => match string.parse::<SocketPacket>() {
                Ok(packet) => packet,
                Err(err) => {
                    self.report(err.into()).await;
                    return Ok(None);
                }
            },
            PacketData::Bytes(bytes) => {
                warn!("Binary attachments are not supported, dropping {} bytes", bytes.len());
                return Ok(None);
            }
        };

        if packet.namespace() != DEFAULT_NAMESPACE {
            debug!("Ignoring packet for namespace {}", packet.namespace());
            return Ok(None);
        }

        match packet.packet_type() {
            SocketPacketType::Connect => {
                info!("Joined namespace {}", packet.namespace());
                self.state.set_connected();
                self.sender.ready()?;
                self.handler.on_connect(self.sender).await;
            }
            SocketPacketType::Event => match packet.into_event() {
                Ok((event, payload)) => {
                    self.handler.on_event(&event, payload, self.sender).await;
                }
                Err(err) => self.report(err.into()).await,
            },
            SocketPacketType::Disconnect => return Ok(Some("io server disconnect")),
            SocketPacketType::ConnectError => {
                let data = packet.into_data().unwrap_or(serde_json::Value::Null);
                return Err(Error::ConnectRefused(data));
            }
            SocketPacketType::Ack
            | SocketPacketType::BinaryEvent
            | SocketPacketType::BinaryAck => {
                debug!("Ignoring unsupported {:?}", packet);
            }
        }
        Ok(None)
    }
}

async fn write_loop(
    mut sink: SplitSink<WsStream, Message>,
    mut receiver: mpsc::UnboundedReceiver<Outgoing>,
) -> Result<(), Error> {
    let mut held = VecDeque::new();
    let mut ready = false;

    while let Some(outgoing) = receiver.next().await {
        match outgoing {
            Outgoing::Control(packet) => send(&mut sink, packet).await?,
            Outgoing::Event(packet) if ready => send(&mut sink, packet).await?,
            Outgoing::Event(packet) => held.push_back(packet),
            Outgoing::Ready => {
                ready = true;
                while let Some(packet) = held.pop_front() {
                    send(&mut sink, packet).await?;
                }
            }
            Outgoing::Shutdown => break,
        }
    }
    if !held.is_empty() {
        debug!("Dropping {} events never sent", held.len());
    }
    debug!("Exit write loop");
    sink.close().await?;
    Ok(())
}

async fn send(sink: &mut SplitSink<WsStream, Message>, packet: Packet) -> Result<(), Error> {
    debug!("Sending {:?}", packet);
    sink.send(transport::encode(packet)).await?;
    Ok(())
}
