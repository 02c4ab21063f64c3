//! Network Module
//!
//! TCP session handling for the RCON client.
//!
//! ## Architecture
//! - One `Session` owns one TCP connection and its id sequence
//! - One request outstanding at a time; every round trip blocks until a
//!   reply or the round-trip deadline
//! - `SharedSession` serializes round trips from several threads

mod deadline;
mod request_id;
mod session;
mod shared;

pub use request_id::RequestIdGenerator;
pub use session::{Session, SessionState};
pub use shared::SharedSession;
