//! Progress and confirmation callbacks
//!
//! These traits let a host plug in its own terminal UI without the
//! declarative crate depending on one.

use crate::state::Address;
use crate::types::{Action, ApplyResult};
use std::io;

/// Progress callback for execution operations
///
/// Implement this trait to receive progress updates during execution.
pub trait ProgressCallback: Send {
    /// Called when starting a dependency tier
    fn on_batch_start(&mut self, count: usize, phase: Phase);

    /// Called when a resource change completes
    fn on_resource_complete(&mut self, address: &Address, action: Action, result: &ApplyResult);

    /// Called when a batch completes
    fn on_batch_complete(&mut self);
}

/// Which half of the apply is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Deletes, including the delete half of replacements
    Destroy,
    /// Creates, updates and the create half of replacements
    Write,
}

/// Confirmation callback for user interaction
pub trait ConfirmCallback: Send {
    /// Ask the user to confirm an action
    ///
    /// # Returns
    /// `true` if the user confirmed, `false` otherwise
    fn confirm(&mut self, prompt: &str) -> io::Result<bool>;
}

/// No-op progress callback
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_batch_start(&mut self, _count: usize, _phase: Phase) {}
    fn on_resource_complete(&mut self, _address: &Address, _action: Action, _result: &ApplyResult) {
    }
    fn on_batch_complete(&mut self) {}
}

/// Auto-confirm callback (always returns true)
pub struct AutoConfirm;

impl ConfirmCallback for AutoConfirm {
    fn confirm(&mut self, _prompt: &str) -> io::Result<bool> {
        Ok(true)
    }
}

/// Auto-decline callback (always returns false)
pub struct AutoDecline;

impl ConfirmCallback for AutoDecline {
    fn confirm(&mut self, _prompt: &str) -> io::Result<bool> {
        Ok(false)
    }
}
