use super::registry::{Limits, MessageRegistry};
use crate::error::{Errno, Result};
use crate::Core::alloc::{HeapAllocator, MessageAllocator};
use crate::Core::clock::{Clock, SystemClock};
use crate::Core::sched::{Scheduler, ThreadScheduler};
use std::sync::Arc;

pub struct RegistryBuilder {
    limits: Limits,
    scheduler: Arc<dyn Scheduler>,
    clock: Arc<dyn Clock>,
    allocator: Arc<dyn MessageAllocator>,
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self {
            limits: Limits::default(),
            scheduler: Arc::new(ThreadScheduler),
            clock: Arc::new(SystemClock),
            allocator: Arc::new(HeapAllocator::unbounded()),
        }
    }
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_max_queues(mut self, max_queues: usize) -> Self {
        self.limits.max_queues = max_queues;
        self
    }

    pub fn with_default_max_bytes(mut self, bytes: usize) -> Self {
        self.limits.default_max_bytes = bytes;
        self
    }

    pub fn with_max_message_size(mut self, bytes: usize) -> Self {
        self.limits.max_message_size = bytes;
        self
    }

    pub fn with_scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_allocator(mut self, allocator: Arc<dyn MessageAllocator>) -> Self {
        self.allocator = allocator;
        self
    }

    /// Build the registry, rejecting zero limits or more queues than ids.
    pub fn build(self) -> Result<MessageRegistry> {
        let limits = self.limits;
        if limits.max_queues == 0
            || limits.max_queues > i32::MAX as usize
            || limits.default_max_bytes == 0
            || limits.max_message_size == 0
        {
            return Err(Errno::Invalid);
        }
        Ok(self.build_unchecked())
    }

    pub(crate) fn build_unchecked(self) -> MessageRegistry {
        MessageRegistry::from_parts(self.limits, self.scheduler, self.clock, self.allocator)
    }
}
