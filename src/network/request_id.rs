//! Request id allocation
//!
//! Each session owns one generator; ids are never shared between sessions.

use crate::error::{RconError, Result};

/// Strictly increasing request id sequence, starting at 1
#[derive(Debug, Default)]
pub struct RequestIdGenerator {
    last: i32,
}

impl RequestIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume a sequence after `last` (values below zero start from 1)
    pub fn starting_after(last: i32) -> Self {
        Self { last: last.max(0) }
    }

    /// Allocate the next id
    ///
    /// Fails once `i32::MAX` has been handed out; ids never wrap.
    pub fn next_id(&mut self) -> Result<i32> {
        let next = self
            .last
            .checked_add(1)
            .ok_or(RconError::RequestIdsExhausted)?;
        self.last = next;
        Ok(next)
    }

    /// Most recently allocated id, if any
    pub fn last(&self) -> Option<i32> {
        (self.last > 0).then_some(self.last)
    }
}
