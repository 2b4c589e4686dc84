//! Identity of live node instances.
//!
//! Positions in a pipeline shift on every insert, remove and move, so
//! subscriptions are keyed by `InstanceId` instead. Ids are allocated from a
//! process-wide counter and never reused.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);

/// Identifier of one live node instance.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(pub u64);

impl InstanceId {
    pub const INVALID: InstanceId = InstanceId(u64::MAX);

    /// Allocate a fresh id.
    pub fn next() -> Self {
        InstanceId(NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

impl Default for InstanceId {
    fn default() -> Self {
        Self::INVALID
    }
}

impl fmt::Debug for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::INVALID {
            write!(f, "InstanceId(INVALID)")
        } else {
            write!(f, "InstanceId({})", self.0)
        }
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
