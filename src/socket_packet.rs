//! Socket.IO packets, carried inside engine.io message packets.
//!
//! Wire layout: `<type>[<attachments>-][<namespace>,][<ack id>][<json>]`.
//! The default namespace `/` is left out when encoding.

use crate::packet::{Packet, PacketDecodeError, PacketType};
use crate::payload::Payload;
use serde_json::Value;
use std::convert::TryFrom;
use std::str::FromStr;

pub const DEFAULT_NAMESPACE: &str = "/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketPacketType {
    Connect,
    Disconnect,
    Event,
    Ack,
    ConnectError,
    BinaryEvent,
    BinaryAck,
}

impl TryFrom<char> for SocketPacketType {
    type Error = PacketDecodeError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        use SocketPacketType::*;
        match c {
            '0' => Ok(Connect),
            '1' => Ok(Disconnect),
            '2' => Ok(Event),
            '3' => Ok(Ack),
            '4' => Ok(ConnectError),
            '5' => Ok(BinaryEvent),
            '6' => Ok(BinaryAck),
            other => Err(PacketDecodeError::UnknownType(other)),
        }
    }
}

impl SocketPacketType {
    pub fn as_char(self) -> char {
        use SocketPacketType::*;
        match self {
            Connect => '0',
            Disconnect => '1',
            Event => '2',
            Ack => '3',
            ConnectError => '4',
            BinaryEvent => '5',
            BinaryAck => '6',
        }
    }

    fn has_attachments(self) -> bool {
        matches!(self, Self::BinaryEvent | Self::BinaryAck)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SocketPacket {
    packet_type: SocketPacketType,
    namespace: String,
    id: Option<u64>,
    attachments: Option<usize>,
    data: Option<Value>,
}

impl SocketPacket {
    pub fn new(packet_type: SocketPacketType, namespace: &str, data: Option<Value>) -> Self {
        SocketPacket {
            packet_type,
            namespace: namespace.to_owned(),
            id: None,
            attachments: None,
            data,
        }
    }

    pub fn connect(namespace: &str, auth: Option<Value>) -> Self {
        Self::new(SocketPacketType::Connect, namespace, auth)
    }

    pub fn disconnect(namespace: &str) -> Self {
        Self::new(SocketPacketType::Disconnect, namespace, None)
    }

    pub fn event(namespace: &str, event: &str, data: Value) -> Self {
        let args = Value::Array(vec![Value::String(event.to_owned()), data]);
        Self::new(SocketPacketType::Event, namespace, Some(args))
    }

    pub fn packet_type(&self) -> SocketPacketType {
        self.packet_type
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn id(&self) -> Option<u64> {
        self.id
    }

    pub fn attachments(&self) -> Option<usize> {
        self.attachments
    }

    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    pub fn into_data(self) -> Option<Value> {
        self.data
    }

    /// Splits an event packet into its name and arguments.
    pub fn into_event(self) -> Result<(String, Payload), PacketDecodeError> {
        let mut args = match self.data {
            Some(Value::Array(args)) => args,
            other => {
                return Err(PacketDecodeError::Malformed(format!(
                    "event data must be an array, got {:?}",
                    other
                )))
            }
        };
        let name = match args.first() {
            Some(Value::String(name)) => name.clone(),
            _ => {
                return Err(PacketDecodeError::Malformed(
                    "event without a name".to_owned(),
                ))
            }
        };
        args.remove(0);
        Ok((name, Payload::new(args)))
    }

    pub fn encode(&self) -> String {
        let mut encoded = String::new();
        encoded.push(self.packet_type.as_char());
        if let Some(attachments) = self.attachments {
            encoded.push_str(&attachments.to_string());
            encoded.push('-');
        }
        if self.namespace != DEFAULT_NAMESPACE {
            encoded.push_str(&self.namespace);
            encoded.push(',');
        }
        if let Some(id) = self.id {
            encoded.push_str(&id.to_string());
        }
        if let Some(data) = &self.data {
            encoded.push_str(&data.to_string());
        }
        encoded
    }
}

impl From<SocketPacket> for Packet {
    fn from(packet: SocketPacket) -> Self {
        Packet::with_str(PacketType::Message, &packet.encode())
    }
}

impl FromStr for SocketPacket {
    type Err = PacketDecodeError;

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        let first = string.chars().next().ok_or(PacketDecodeError::Empty)?;
        let packet_type = SocketPacketType::try_from(first)?;
        let mut rest = &string[first.len_utf8()..];

        let attachments = if packet_type.has_attachments() {
            let dash = rest.find('-').ok_or_else(|| {
                PacketDecodeError::Malformed("missing attachment count".to_owned())
            })?;
            let count = rest[..dash]
                .parse::<usize>()
                .map_err(|e| PacketDecodeError::Malformed(e.to_string()))?;
            rest = &rest[dash + 1..];
            Some(count)
        } else {
            None
        };

        let namespace = if rest.starts_with('/') {
            let end = rest.find(',').unwrap_or_else(|| rest.len());
            let namespace = rest[..end].to_owned();
            rest = rest.get(end + 1..).unwrap_or("");
            namespace
        } else {
            DEFAULT_NAMESPACE.to_owned()
        };

        let digits = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
        let id = if digits > 0 {
            let id = rest[..digits]
                .parse::<u64>()
                .map_err(|e| PacketDecodeError::Malformed(e.to_string()))?;
            rest = &rest[digits..];
            Some(id)
        } else {
            None
        };

        let data = if rest.is_empty() {
            None
        } else {
            Some(
                serde_json::from_str(rest)
                    .map_err(|e| PacketDecodeError::Malformed(e.to_string()))?,
            )
        };

        Ok(SocketPacket {
            packet_type,
            namespace,
            id,
            attachments,
            data,
        })
    }
}
