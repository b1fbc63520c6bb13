// crates/dataset-registry-core/src/runtime/clock.rs
// ============================================================================
// Module: Registry Clocks
// Description: Clock implementations supplying record creation time.
// Purpose: Keep wall-clock reads out of the registry coordinator.
// Dependencies: crate::interfaces
// ============================================================================

//! ## Overview
//! The registry never reads wall-clock time directly; hosts inject a
//! [`Clock`]. [`SystemClock`] reports unix seconds, [`FixedClock`] returns a
//! settable value for deterministic tests and replays.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use crate::interfaces::Clock;

// ============================================================================
// SECTION: Clocks
// ============================================================================

/// Wall clock reporting unix epoch seconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
    }
}

/// Manually driven clock.
#[derive(Debug, Default)]
pub struct FixedClock {
    /// Current time value.
    value: AtomicU64,
}

impl FixedClock {
    /// Creates a clock fixed at `value`.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self {
            value: AtomicU64::new(value),
        }
    }

    /// Moves the clock to `value`.
    pub fn set(&self, value: u64) {
        self.value.store(value, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> u64 {
        self.value.load(Ordering::SeqCst)
    }
}
