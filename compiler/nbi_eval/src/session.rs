//! Host session handle.

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of the interactive session that hosts imported modules.
///
/// Cells reach it through `get_ipython()`. It carries no behaviour; two
/// lookups return the same object for the lifetime of one runtime.
#[derive(Debug)]
pub struct Session {
    id: u64,
}

impl Session {
    pub fn new() -> Self {
        Session {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
