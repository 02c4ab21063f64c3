//! RCON Session
//!
//! One authenticated TCP connection and its authentication state machine.
//!
//! ```text
//! Disconnected ──dial──▶ Authenticating ──auth ok──▶ Ready ◀─┐
//!                              │                      │      │ command ok
//!                              │ rejected / io error  ├──────┘
//!                              ▼                      │ io / framing error
//!                            Failed ◀─────────────────┘
//! ```
//!
//! `Failed` and `Closed` are terminal: the socket is shut down and the
//! caller must connect a new session.

use std::io::{BufReader, BufWriter, ErrorKind};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::config::Config;
use crate::error::{RconError, Result};
use crate::protocol::{read_packet, write_packet, Packet, PacketType};
use super::deadline::DeadlineStream;
use super::RequestIdGenerator;

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No socket yet
    Disconnected,

    /// Socket open, login in flight
    Authenticating,

    /// Logged in; commands may be sent
    Ready,

    /// Rejected or broken; terminal
    Failed,

    /// Shut down by the caller; terminal
    Closed,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Failed | SessionState::Closed)
    }
}

/// An authenticated RCON connection
///
/// Owns its socket exclusively. `send_command` takes `&mut self`, so at
/// most one request is outstanding at any time.
pub struct Session {
    /// TCP stream reader (buffered; may hold bytes of a following packet)
    reader: BufReader<DeadlineStream>,

    /// TCP stream writer
    writer: BufWriter<TcpStream>,

    /// Per-session id sequence
    ids: RequestIdGenerator,

    state: SessionState,

    /// Largest `length` field accepted from the server
    max_packet_size: u32,

    /// Bound on reading one reply, measured from the start of the round trip
    read_timeout: Option<Duration>,

    /// Timeouts in milliseconds, kept for error messages
    read_timeout_ms: u64,
    write_timeout_ms: u64,

    /// Peer address for logging
    peer_addr: String,
}

impl Session {
    /// Dial `address` and log in with `password` using the default config
    pub fn connect(address: &str, password: &str) -> Result<Self> {
        Self::connect_with_config(address, password, Config::default())
    }

    /// Dial `address` and log in with `password`
    ///
    /// Returns a `Ready` session, or the dial/auth/io error that stopped it.
    pub fn connect_with_config(address: &str, password: &str, config: Config) -> Result<Self> {
        config.validate()?;

        let stream = dial(address, &config)?;
        let mut session = Self::from_stream(stream, &config)?;
        session.authenticate(password)?;

        Ok(session)
    }

    /// Wrap a freshly dialed stream
    ///
    /// Sets up buffered I/O and configures timeouts.
    fn from_stream(stream: TcpStream, config: &Config) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        stream.set_nodelay(config.nodelay)?;
        stream.set_read_timeout(config.read_timeout())?;
        stream.set_write_timeout(config.write_timeout())?;

        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            reader: BufReader::new(DeadlineStream::new(read_stream)),
            writer: BufWriter::new(write_stream),
            ids: RequestIdGenerator::new(),
            state: SessionState::Disconnected,
            max_packet_size: config.max_packet_size,
            read_timeout: config.read_timeout(),
            read_timeout_ms: config.read_timeout_ms,
            write_timeout_ms: config.write_timeout_ms,
            peer_addr,
        })
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    fn authenticate(&mut self, password: &str) -> Result<()> {
        self.transition(SessionState::Authenticating);

        let request = Packet::auth(self.ids.next_id()?, password);
        let response = match self.exchange(&request) {
            Ok(response) => response,
            Err(e) => {
                self.fail(&e);
                return Err(e);
            }
        };

        if response.id != request.id || response.packet_type != PacketType::AUTH_RESPONSE {
            tracing::debug!(
                "Login to {} rejected (request id {}, response id {}, type {:?})",
                self.peer_addr,
                request.id,
                response.id,
                response.packet_type
            );
            let e = RconError::Auth("incorrect password".to_string());
            self.fail(&e);
            return Err(e);
        }

        self.transition(SessionState::Ready);
        tracing::debug!("Logged in to {}", self.peer_addr);
        Ok(())
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Run a command and return the server's reply text
    pub fn send_command(&mut self, command: &str) -> Result<String> {
        self.execute(command).map(|packet| packet.body_text())
    }

    /// Run a command and return the whole reply packet
    ///
    /// The reply id must match the request id; a mismatch means the stream
    /// is out of step and fails the session.
    pub fn execute(&mut self, command: &str) -> Result<Packet> {
        if self.state != SessionState::Ready {
            return Err(RconError::SessionFailed);
        }

        let result = self.round_trip(command);
        if let Err(ref e) = result {
            self.fail(e);
        }
        result
    }

    fn round_trip(&mut self, command: &str) -> Result<Packet> {
        let request = Packet::command(self.ids.next_id()?, command);
        let response = self.exchange(&request)?;

        if response.id != request.id {
            return Err(RconError::Framing(format!(
                "Response id {} does not match request id {}",
                response.id, request.id
            )));
        }

        tracing::debug!(
            "Command {} to {} answered with {} bytes",
            request.id,
            self.peer_addr,
            response.body.len()
        );
        Ok(response)
    }

    /// Write one packet and block for exactly one reply
    fn exchange(&mut self, request: &Packet) -> Result<Packet> {
        tracing::trace!(
            "Sending packet id={} type={:?} body_len={} to {}",
            request.id,
            request.packet_type,
            request.body.len(),
            self.peer_addr
        );

        write_packet(&mut self.writer, request)
            .map_err(|e| self.classify(e, "write", self.write_timeout_ms))?;

        self.reader.get_mut().arm(self.read_timeout);
        let response = read_packet(&mut self.reader, self.max_packet_size)
            .map_err(|e| self.classify(e, "read", self.read_timeout_ms))?;

        tracing::trace!(
            "Received packet id={} type={:?} body_len={} from {}",
            response.id,
            response.packet_type,
            response.body.len(),
            self.peer_addr
        );
        Ok(response)
    }

    /// Turn socket timeouts into `Timeout`; pass everything else through
    fn classify(&self, error: RconError, op: &str, timeout_ms: u64) -> RconError {
        match error {
            // Unix reports an expired socket timeout as WouldBlock, Windows as TimedOut
            RconError::Io(ref e)
                if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::TimedOut =>
            {
                RconError::Timeout(format!(
                    "{} on {} after {} ms",
                    op, self.peer_addr, timeout_ms
                ))
            }
            RconError::Io(e) if e.kind() == ErrorKind::UnexpectedEof => {
                RconError::Io(std::io::Error::new(
                    ErrorKind::UnexpectedEof,
                    format!("connection closed by {} during {}", self.peer_addr, op),
                ))
            }
            other => other,
        }
    }

    // =========================================================================
    // State
    // =========================================================================

    fn transition(&mut self, next: SessionState) {
        tracing::trace!("Session {}: {:?} -> {:?}", self.peer_addr, self.state, next);
        self.state = next;
    }

    /// Move to `Failed` and stop using the socket
    fn fail(&mut self, error: &RconError) {
        tracing::warn!("Session {} failed: {}", self.peer_addr, error);
        self.transition(SessionState::Failed);
        let _ = self.writer.get_ref().shutdown(Shutdown::Both);
    }

    /// Shut the connection down
    pub fn close(&mut self) -> Result<()> {
        if self.state.is_terminal() {
            return Ok(());
        }

        self.transition(SessionState::Closed);
        match self.writer.get_ref().shutdown(Shutdown::Both) {
            Err(e) if e.kind() != ErrorKind::NotConnected => Err(e.into()),
            _ => Ok(()),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Last request id sent on this session
    pub fn last_request_id(&self) -> Option<i32> {
        self.ids.last()
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("peer_addr", &self.peer_addr)
            .field("state", &self.state)
            .field("last_request_id", &self.ids.last())
            .finish()
    }
}

// =============================================================================
// Dialing
// =============================================================================

/// Connect to the first reachable address `address` resolves to
fn dial(address: &str, config: &Config) -> Result<TcpStream> {
    let dial_error = |source| RconError::Dial {
        address: address.to_string(),
        source,
    };

    let candidates: Vec<SocketAddr> = address.to_socket_addrs().map_err(dial_error)?.collect();

    let mut last_error = None;
    for candidate in candidates {
        tracing::debug!("Dialing {} ({})", address, candidate);

        let attempt = match config.connect_timeout() {
            Some(timeout) => TcpStream::connect_timeout(&candidate, timeout),
            None => TcpStream::connect(candidate),
        };

        match attempt {
            Ok(stream) => return Ok(stream),
            Err(e) => {
                tracing::debug!("Dial {} failed: {}", candidate, e);
                last_error = Some(e);
            }
        }
    }

    Err(dial_error(last_error.unwrap_or_else(|| {
        std::io::Error::new(ErrorKind::InvalidInput, "address resolved to nothing")
    })))
}
