//! # pmrcon
//!
//! A client for the remote console (RCON) protocol:
//! - Length-prefixed little-endian packet framing
//! - Password handshake before any command is accepted
//! - Per-session request ids, one request outstanding at a time
//! - Bounded read timeouts so a silent server cannot hang the caller
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        CLI Shell                             │
//! │              connect(addr, password) / send_command          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                        Session                               │
//! │     Disconnected → Authenticating → Ready → Failed           │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │ Request Ids │          │   Codec     │
//!   │ (per conn)  │          │ (framing)   │
//!   └─────────────┘          └──────┬──────┘
//!                                   │
//!                                   ▼
//!                           ┌─────────────┐
//!                           │ TcpStream   │
//!                           └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use pmrcon::Session;
//!
//! let mut session = Session::connect("127.0.0.1:19132", "secret")?;
//! let players = session.send_command("list")?;
//! println!("{}", players);
//! # Ok::<(), pmrcon::RconError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{RconError, Result};
pub use config::Config;
pub use network::{Session, SessionState, SharedSession};
pub use protocol::{Packet, PacketType};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of pmrcon
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
