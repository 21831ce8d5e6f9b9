//! Progress reporting and cooperative cancellation.
//!
//! Long imports report `(offset, size)` pairs at byte-offset boundaries of
//! the underlying reader. The callback is the sole suspension point:
//! returning `false` aborts the operation with [`Error::Cancelled`],
//! leaving the target partially populated but safe to drop.

use crate::error::{Error, Result};

/// Progress callback: `(offset, size) -> keep going?`.
pub type ProgressFn<'a> = &'a mut dyn FnMut(u64, u64) -> bool;

/// Wraps an optional callback and deduplicates by last-seen offset, so the
/// callback is invoked at most once per distinct offset.
pub struct ProgressReporter<'a> {
    callback: Option<ProgressFn<'a>>,
    last_offset: Option<u64>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new(callback: Option<ProgressFn<'a>>) -> Self {
        ProgressReporter {
            callback,
            last_offset: None,
        }
    }

    /// Reports one offset. Returns `Err(Cancelled)` when the callback asks
    /// to stop.
    pub fn report(&mut self, offset: u64, size: u64) -> Result<()> {
        if self.last_offset == Some(offset) {
            return Ok(());
        }
        self.last_offset = Some(offset);

        if let Some(cb) = self.callback.as_mut() {
            if !cb(offset, size) {
                return Err(Error::Cancelled);
            }
        }
        Ok(())
    }
}
