//! Configuration for pmrcon
//!
//! Centralized session configuration with sensible defaults.

use std::time::Duration;

use crate::error::{RconError, Result};
use crate::protocol::MIN_PACKET_LENGTH;

/// Session configuration
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP connect timeout (milliseconds, 0 = OS default)
    pub connect_timeout_ms: u64,

    /// Read timeout for a single round trip (milliseconds, 0 = none)
    pub read_timeout_ms: u64,

    /// Write timeout (milliseconds, 0 = none)
    pub write_timeout_ms: u64,

    /// Disable Nagle's algorithm on the session socket
    pub nodelay: bool,

    // -------------------------------------------------------------------------
    // Protocol Configuration
    // -------------------------------------------------------------------------
    /// Largest `length` field accepted from the server (in bytes)
    pub max_packet_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 5000,
            read_timeout_ms: 5000,
            write_timeout_ms: 5000,
            nodelay: true,
            max_packet_size: 4 * 1024 * 1024, // 4 MB
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check that the values can drive a session
    pub fn validate(&self) -> Result<()> {
        if self.max_packet_size < MIN_PACKET_LENGTH {
            return Err(RconError::Config(format!(
                "max_packet_size must be at least {} bytes, got {}",
                MIN_PACKET_LENGTH, self.max_packet_size
            )));
        }
        Ok(())
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        millis(self.read_timeout_ms)
    }

    pub fn write_timeout(&self) -> Option<Duration> {
        millis(self.write_timeout_ms)
    }
}

fn millis(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the connect timeout (in milliseconds)
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.connect_timeout_ms = ms;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Enable or disable TCP_NODELAY
    pub fn nodelay(mut self, nodelay: bool) -> Self {
        self.config.nodelay = nodelay;
        self
    }

    /// Set the maximum accepted packet length (in bytes)
    pub fn max_packet_size(mut self, size: u32) -> Self {
        self.config.max_packet_size = size;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
