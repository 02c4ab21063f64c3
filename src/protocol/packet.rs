//! Packet definitions
//!
//! The unit of exchange in both directions.

use bytes::Bytes;

/// Packet kinds as numbered by this protocol variant
///
/// Only `Auth` (3) and `Command` (2) have been confirmed against a
/// reference server. The server answers a successful login with type 2 as
/// well, so `Command` doubles as the auth-success response.
/// `ResponseValue` (0) is the value common RCON variants use for command
/// output; it is unverified here and command replies are correlated by id
/// alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketType {
    /// Command output (unverified for this variant)
    ResponseValue,

    /// Command request, and the auth-success response
    Command,

    /// Authentication request carrying the password
    Auth,

    /// Anything else the server sends
    Unknown(i32),
}

impl PacketType {
    /// Type the server uses to accept a login
    pub const AUTH_RESPONSE: PacketType = PacketType::Command;

    /// Wire value
    pub fn as_i32(self) -> i32 {
        match self {
            PacketType::ResponseValue => 0,
            PacketType::Command => 2,
            PacketType::Auth => 3,
            PacketType::Unknown(value) => value,
        }
    }
}

impl From<i32> for PacketType {
    fn from(value: i32) -> Self {
        match value {
            0 => PacketType::ResponseValue,
            2 => PacketType::Command,
            3 => PacketType::Auth,
            other => PacketType::Unknown(other),
        }
    }
}

/// A single RCON packet
///
/// The `length` field is never stored; it is derived from the body on
/// encode and checked against the buffer on decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// Correlation token, echoed by the reply
    pub id: i32,

    /// Packet kind
    pub packet_type: PacketType,

    /// Command or response text
    pub body: Bytes,
}

impl Packet {
    pub fn new(id: i32, packet_type: PacketType, body: impl Into<Bytes>) -> Self {
        Self {
            id,
            packet_type,
            body: body.into(),
        }
    }

    /// Create an authentication request
    pub fn auth(id: i32, password: &str) -> Self {
        Self::new(id, PacketType::Auth, Bytes::copy_from_slice(password.as_bytes()))
    }

    /// Create a command request
    pub fn command(id: i32, command: &str) -> Self {
        Self::new(id, PacketType::Command, Bytes::copy_from_slice(command.as_bytes()))
    }

    /// Value of the `length` field: id + type + body + 2 pad bytes
    pub fn wire_length(&self) -> usize {
        super::MIN_PACKET_LENGTH as usize + self.body.len()
    }

    /// Body decoded as text, replacing invalid UTF-8
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
