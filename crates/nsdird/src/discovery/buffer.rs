//! Fixed-capacity append buffer shared by the steps of one discovery pass.

use thiserror::Error;

/// Raised when a write does not fit the remaining capacity.
///
/// The buffer is left exactly as it was before the rejected write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("discovery buffer overflow: {requested} bytes requested, {remaining} remaining")]
pub struct Overflow {
    /// Length of the rejected write.
    pub requested: usize,
    /// Capacity that was left when the write was attempted.
    pub remaining: usize,
}

/// Append-only byte budget.
///
/// Every string produced by discovery is routed through one of these. Capacity
/// consumed by a successful append stays consumed even after the caller takes
/// the text with [`BoundedBuffer::take_pending`], so the total output of a
/// pass can never exceed the configured capacity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedBuffer {
    capacity: usize,
    committed: usize,
    pending: String,
}

impl BoundedBuffer {
    /// Creates an empty buffer.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            committed: 0,
            pending: String::new(),
        }
    }

    /// Appends `text` when it fits entirely; otherwise changes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Overflow`] when `text` is longer than [`Self::remaining`].
    pub fn try_append(&mut self, text: &str) -> Result<(), Overflow> {
        let remaining = self.remaining();
        if text.len() > remaining {
            return Err(Overflow {
                requested: text.len(),
                remaining,
            });
        }
        self.pending.push_str(text);
        self.committed += text.len();
        Ok(())
    }

    /// Bytes still available.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.capacity.saturating_sub(self.committed)
    }

    /// Bytes committed so far, including text already taken.
    #[must_use]
    pub fn committed(&self) -> usize {
        self.committed
    }

    /// Total capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Hands over the text appended since the previous take.
    pub fn take_pending(&mut self) -> String {
        std::mem::take(&mut self.pending)
    }
}
