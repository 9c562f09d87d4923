use std::fmt;
use crate::Core::alloc::HeapAllocator;
use crate::MSGQ::{MessageQueue, MessageRegistry};

/// Debug function for MessageRegistry
///
/// Shows limits and the atomic queue count. Never takes the registry lock,
/// so it is safe to call from inside a queue operation.
pub fn debug_message_registry(registry: &MessageRegistry, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("MessageRegistry")
        .field("limits", &registry.limits())
        .field("queue_count", &registry.queue_count())
        .finish_non_exhaustive()
}

/// Debug function for MessageQueue
///
/// Only the lock-free counters and wait lists; the message list stays behind
/// the queue lock.
pub fn debug_message_queue(queue: &MessageQueue, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("MessageQueue")
        .field("id", &queue.id())
        .field("key", &format_args!("{}", queue.key()))
        .field("owner", &queue.owner())
        .field("message_count", &queue.message_count())
        .field("byte_count", &queue.byte_count())
        .field("sender_wait", queue.sender_wait())
        .field("receiver_wait", queue.receiver_wait())
        .finish_non_exhaustive()
}

/// Debug function for HeapAllocator
pub fn debug_heap_allocator(allocator: &HeapAllocator, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("HeapAllocator")
        .field("limit", &allocator.limit())
        .field("live_bytes", &allocator.live_bytes())
        .field("live_blocks", &allocator.live_blocks())
        .finish()
}
