use crossbeam_utils::CachePadded;
use std::sync::atomic::{AtomicUsize, Ordering};
mod debug;
mod getters;

/// Memory source for message payloads.
///
/// Every payload buffer a queue holds came from `allocate` and goes back
/// through `free`, whether a receiver consumed it or teardown discarded it.
pub trait MessageAllocator: Send + Sync {
    /// A zeroed buffer of exactly `size` bytes, or `None` when out of memory.
    fn allocate(&self, size: usize) -> Option<Vec<u8>>;

    fn free(&self, buf: Vec<u8>);
}

/// Heap-backed allocator with live accounting and an optional byte ceiling.
pub struct HeapAllocator {
    limit: Option<usize>,
    live_bytes: CachePadded<AtomicUsize>,
    live_blocks: CachePadded<AtomicUsize>,
}

impl HeapAllocator {
    pub fn unbounded() -> Self {
        Self {
            limit: None,
            live_bytes: CachePadded::new(AtomicUsize::new(0)),
            live_blocks: CachePadded::new(AtomicUsize::new(0)),
        }
    }

    /// Refuse allocations once `limit` payload bytes are live.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::unbounded()
        }
    }

    // Claim `size` bytes of the budget, failing if it would go past the limit
    fn reserve(&self, size: usize) -> bool {
        loop {
            let current = self.live_bytes.load(Ordering::Acquire);
            let next = match current.checked_add(size) {
                Some(next) => next,
                None => return false,
            };
            if self.limit.is_some_and(|limit| next > limit) {
                return false;
            }
            if self
                .live_bytes
                .compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Relaxed)
                .is_ok()
            {
                return true;
            }
        }
    }
}

impl Default for HeapAllocator {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl MessageAllocator for HeapAllocator {
    fn allocate(&self, size: usize) -> Option<Vec<u8>> {
        if !self.reserve(size) {
            return None;
        }
        let mut buf = Vec::new();
        if buf.try_reserve_exact(size).is_err() {
            self.live_bytes.fetch_sub(size, Ordering::AcqRel);
            return None;
        }
        buf.resize(size, 0);
        self.live_blocks.fetch_add(1, Ordering::AcqRel);
        Some(buf)
    }

    fn free(&self, buf: Vec<u8>) {
        self.live_bytes.fetch_sub(buf.len(), Ordering::AcqRel);
        self.live_blocks.fetch_sub(1, Ordering::AcqRel);
    }
}
