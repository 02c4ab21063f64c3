//! Shared Session
//!
//! Lets several threads drive one session. The mutex is held for a whole
//! round trip, so writes never interleave and only one request is ever
//! outstanding.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::Config;
use crate::error::Result;
use crate::protocol::Packet;
use super::{Session, SessionState};

/// Cloneable handle to a session guarded by a mutex
#[derive(Clone)]
pub struct SharedSession {
    inner: Arc<Mutex<Session>>,
}

impl SharedSession {
    pub fn new(session: Session) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    /// Dial and log in, then wrap the session for sharing
    pub fn connect_with_config(address: &str, password: &str, config: Config) -> Result<Self> {
        Session::connect_with_config(address, password, config).map(Self::new)
    }

    /// Run a command (blocks while another thread's command is in flight)
    pub fn send_command(&self, command: &str) -> Result<String> {
        self.inner.lock().send_command(command)
    }

    /// Run a command and return the whole reply packet
    pub fn execute(&self, command: &str) -> Result<Packet> {
        self.inner.lock().execute(command)
    }

    pub fn state(&self) -> SessionState {
        self.inner.lock().state()
    }

    pub fn close(&self) -> Result<()> {
        self.inner.lock().close()
    }
}

impl From<Session> for SharedSession {
    fn from(session: Session) -> Self {
        Self::new(session)
    }
}
