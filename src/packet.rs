use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

/// Engine.IO packet types, as sent in the first character of a text frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketType {
    Open,
    Close,
    Ping,
    Pong,
    Message,
    Upgrade,
    Noop,
}

impl TryFrom<char> for PacketType {
    type Error = PacketDecodeError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        use PacketType::*;
        match c {
            '0' => Ok(Open),
            '1' => Ok(Close),
            '2' => Ok(Ping),
            '3' => Ok(Pong),
            '4' => Ok(Message),
            '5' => Ok(Upgrade),
            '6' => Ok(Noop),
            other => Err(PacketDecodeError::UnknownType(other)),
        }
    }
}

impl PacketType {
    pub fn as_char(self) -> char {
        use PacketType::*;
        match self {
            Open => '0',
            Close => '1',
            Ping => '2',
            Pong => '3',
            Message => '4',
            Upgrade => '5',
            Noop => '6',
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PacketData {
    Str(String),
    Bytes(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Packet {
    packet_type: PacketType,
    data: PacketData,
}

impl Packet {
    pub fn new(packet_type: PacketType, data: PacketData) -> Self {
        Packet { packet_type, data }
    }

    pub fn with_str(packet_type: PacketType, data: &str) -> Self {
        Self::new(packet_type, PacketData::Str(data.to_owned()))
    }

    pub fn with_bytes(packet_type: PacketType, data: impl Into<Vec<u8>>) -> Self {
        Self::new(packet_type, PacketData::Bytes(data.into()))
    }

    pub fn packet_type(&self) -> PacketType {
        self.packet_type
    }

    pub fn data(&self) -> &PacketData {
        &self.data
    }

    pub fn into_data(self) -> PacketData {
        self.data
    }
}

/// Raised for text that is not a valid engine or socket packet.
#[derive(Debug, Clone, PartialEq)]
pub enum PacketDecodeError {
    Empty,
    UnknownType(char),
    Malformed(String),
}

impl fmt::Display for PacketDecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty packet"),
            Self::UnknownType(c) => write!(f, "unknown packet type {:?}", c),
            Self::Malformed(reason) => write!(f, "malformed packet: {}", reason),
        }
    }
}

impl std::error::Error for PacketDecodeError {}

impl FromStr for Packet {
    type Err = PacketDecodeError;

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        let first = string.chars().next().ok_or(PacketDecodeError::Empty)?;
        let packet_type = PacketType::try_from(first)?;
        Ok(Packet::with_str(packet_type, &string[first.len_utf8()..]))
    }
}
