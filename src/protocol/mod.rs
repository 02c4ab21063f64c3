//! Protocol Module
//!
//! Defines the RCON wire format.
//!
//! ## Packet Format
//! ```text
//! ┌──────────┬──────────┬──────────┬──────────────────┬─────────┐
//! │ Len (4)  │  Id (4)  │ Type (4) │      Body        │ 0x00 0x00│
//! └──────────┴──────────┴──────────┴──────────────────┴─────────┘
//! ```
//! All integers are little-endian i32. `Len` counts every byte after
//! itself: `4 + 4 + body + 2`.
//!
//! ### Packet Types
//! - 3: AUTH      - Body: password
//! - 2: COMMAND   - Body: command text (also the auth-success reply)
//! - 0: RESPONSE  - Body: command output (unverified for this variant)

mod packet;
mod codec;

pub use packet::{Packet, PacketType};
pub use codec::{
    encode, encode_packet, decode_packet, try_decode_packet,
    read_packet, write_packet,
    LENGTH_FIELD_SIZE, HEADER_SIZE, TRAILER, MIN_PACKET_LENGTH,
};
