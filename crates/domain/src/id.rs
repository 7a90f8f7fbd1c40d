//! Process-local handles for live observers and bus subscriptions.
//!
//! Neither handle is persisted or sent over the wire, so a per-type counter
//! is enough to keep them unique while the process runs.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

macro_rules! sequence_id {
    ($(#[doc = $doc:expr])* $name:ident, $prefix:literal) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(u64);

        impl $name {
            /// Take the next unused handle.
            #[must_use]
            pub fn new() -> Self {
                static NEXT: AtomicU64 = AtomicU64::new(1);
                Self(NEXT.fetch_add(1, Ordering::Relaxed))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "-{}"), self.0)
            }
        }
    };
}

sequence_id!(
    /// One attached real-time observer, for as long as it stays connected.
    ObserverId,
    "observer"
);

sequence_id!(
    /// Returned by the event bus so a handler can be removed later.
    SubscriptionId,
    "sub"
);
