//! Protocol codec
//!
//! Encoding and decoding functions for the RCON wire format.
//!
//! ## Wire Format
//! ```text
//! ┌──────────┬──────────┬──────────┬──────────────────┬──────────┐
//! │ Len (4)  │  Id (4)  │ Type (4) │      Body        │ Pad (2)  │
//! └──────────┴──────────┴──────────┴──────────────────┴──────────┘
//! ```
//!
//! `Len` is the byte count of everything after it, so a packet occupies
//! `4 + Len` bytes on the wire. Decoding never truncates: a buffer that
//! holds fewer bytes than `Len` announces is a framing error for
//! [`decode_packet`] and "need more bytes" for [`try_decode_packet`].

use std::io::{Read, Write};

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{RconError, Result};
use super::{Packet, PacketType};

/// Size of the length prefix
pub const LENGTH_FIELD_SIZE: usize = 4;

/// Length prefix + id + type
pub const HEADER_SIZE: usize = 12;

/// Two null bytes closing every packet
pub const TRAILER: [u8; 2] = [0x00, 0x00];

/// Smallest valid `length` field: id (4) + type (4) + trailer (2)
pub const MIN_PACKET_LENGTH: u32 = 10;

// =============================================================================
// Encoding
// =============================================================================

/// Encode a packet from its parts
///
/// Format: length (4) + id (4) + type (4) + body + 0x00 0x00
pub fn encode(id: i32, packet_type: PacketType, body: &[u8]) -> Bytes {
    let length = MIN_PACKET_LENGTH as usize + body.len();

    let mut message = BytesMut::with_capacity(LENGTH_FIELD_SIZE + length);
    message.put_i32_le(length as i32);
    message.put_i32_le(id);
    message.put_i32_le(packet_type.as_i32());
    message.put_slice(body);
    message.put_slice(&TRAILER);

    message.freeze()
}

/// Encode a packet to bytes
pub fn encode_packet(packet: &Packet) -> Bytes {
    encode(packet.id, packet.packet_type, &packet.body)
}

// =============================================================================
// Decoding
// =============================================================================

/// Decode the first packet held in `bytes`
///
/// Bytes past the end of the first packet are ignored.
pub fn decode_packet(bytes: &[u8]) -> Result<Packet> {
    if bytes.len() < LENGTH_FIELD_SIZE {
        return Err(RconError::Framing(format!(
            "Incomplete length prefix: expected {} bytes, got {}",
            LENGTH_FIELD_SIZE,
            bytes.len()
        )));
    }

    let length = check_length(read_length(bytes), None)?;

    let total_len = LENGTH_FIELD_SIZE + length;
    if bytes.len() < total_len {
        return Err(RconError::Framing(format!(
            "Incomplete packet: length field announces {} bytes, got {}",
            total_len,
            bytes.len()
        )));
    }

    parse_frame(Bytes::copy_from_slice(&bytes[LENGTH_FIELD_SIZE..total_len]))
}

/// Split one packet off the front of an accumulation buffer
///
/// Returns `Ok(None)` until the buffer holds a whole packet. Leaves any
/// following bytes in place for the next call. `max_length` bounds the
/// announced length before any space is reserved for it.
pub fn try_decode_packet(buffer: &mut BytesMut, max_length: u32) -> Result<Option<Packet>> {
    if buffer.len() < LENGTH_FIELD_SIZE {
        return Ok(None);
    }

    let length = check_length(read_length(buffer), Some(max_length))?;

    let total_len = LENGTH_FIELD_SIZE + length;
    if buffer.len() < total_len {
        buffer.reserve(total_len - buffer.len());
        return Ok(None);
    }

    let mut frame = buffer.split_to(total_len);
    frame.advance(LENGTH_FIELD_SIZE);
    parse_frame(frame.freeze()).map(Some)
}

fn read_length(bytes: &[u8]) -> i32 {
    i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

/// Validate a raw `length` field and convert it to a byte count
fn check_length(raw: i32, max_length: Option<u32>) -> Result<usize> {
    if raw < MIN_PACKET_LENGTH as i32 {
        return Err(RconError::Framing(format!(
            "Invalid length field: {} (min {})",
            raw, MIN_PACKET_LENGTH
        )));
    }

    if let Some(max) = max_length {
        if raw as u32 > max {
            return Err(RconError::Framing(format!(
                "Packet too large: {} bytes (max {})",
                raw, max
            )));
        }
    }

    Ok(raw as usize)
}

/// Parse everything after the length prefix
fn parse_frame(mut frame: Bytes) -> Result<Packet> {
    let body_len = frame.len() - MIN_PACKET_LENGTH as usize;

    let id = frame.get_i32_le();
    let packet_type = PacketType::from(frame.get_i32_le());
    let body = frame.split_to(body_len);

    if frame[..] != TRAILER {
        return Err(RconError::Framing(format!(
            "Bad packet trailer: expected 00 00, got {:02x} {:02x}",
            frame[0], frame[1]
        )));
    }

    Ok(Packet {
        id,
        packet_type,
        body,
    })
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read one complete packet from a stream
///
/// Reads the 4-byte length, then exactly that many more bytes, looping
/// over short reads. Blocks until the packet is complete or an error
/// occurs. `max_length` bounds the announced length.
pub fn read_packet<R: Read>(reader: &mut R, max_length: u32) -> Result<Packet> {
    let mut prefix = [0u8; LENGTH_FIELD_SIZE];
    reader.read_exact(&mut prefix)?;

    let length = check_length(i32::from_le_bytes(prefix), Some(max_length))?;

    let mut frame = vec![0u8; length];
    reader.read_exact(&mut frame)?;

    parse_frame(Bytes::from(frame))
}

/// Write a packet to a stream
pub fn write_packet<W: Write>(writer: &mut W, packet: &Packet) -> Result<()> {
    let bytes = encode_packet(packet);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}
