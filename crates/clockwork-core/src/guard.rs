//! In-progress marker for engine operations.
//!
//! Each engine holds one [`OpGuard`]. An operation claims it before touching
//! state and releases it after its last external transfer; a second claim
//! while the first is outstanding is refused, so a transfer callback can never
//! observe or drive a half-finished operation.

/// Explicit "operation in progress" flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpGuard {
    busy: bool,
}

impl OpGuard {
    /// Claim the guard. Returns `false` if an operation is already running.
    pub fn try_enter(&mut self) -> bool {
        if self.busy {
            return false;
        }
        self.busy = true;
        true
    }

    /// Release the guard.
    pub fn exit(&mut self) {
        self.busy = false;
    }

    /// Whether an operation currently holds the guard.
    pub fn is_busy(&self) -> bool {
        self.busy
    }
}
