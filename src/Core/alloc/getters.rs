use super::*;
use std::sync::atomic::Ordering;

/// Accounting getters for HeapAllocator
///
/// Loaded with relaxed ordering; these are for monitoring and tests, not
/// for making allocation decisions.
impl HeapAllocator {
    /// Payload bytes currently handed out and not yet freed.
    pub fn live_bytes(&self) -> usize {
        self.live_bytes.load(Ordering::Relaxed)
    }

    /// Payload buffers currently handed out and not yet freed.
    pub fn live_blocks(&self) -> usize {
        self.live_blocks.load(Ordering::Relaxed)
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }
}
