use super::key::{Key, QueueId};
use super::message::{Message, Selector};
use super::perm::Permission;
use crate::Core::sched::{Identity, WaitList};
use crossbeam_utils::CachePadded;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Everything about a queue that changes, guarded by the queue lock.
pub(crate) struct QueueState {
    /// Arrival order; never reordered by type.
    pub(crate) messages: VecDeque<Message>,
    pub(crate) perm: Permission,
    pub(crate) max_bytes: usize,
    pub(crate) send_time: i64,
    pub(crate) recv_time: i64,
    pub(crate) change_time: i64,
    pub(crate) last_sender: i32,
    pub(crate) last_receiver: i32,
    /// Set once the queue is detached from the registry.
    pub(crate) removed: bool,
}

/// One mailbox.
///
/// `message_count` and `byte_count` mirror the message list and may be read
/// without the lock; they are only ever written together with the list,
/// under the lock.
pub struct MessageQueue {
    id: QueueId,
    key: Key,
    owner: Identity,
    pub(crate) state: Mutex<QueueState>,
    pub(crate) sender_wait: Arc<WaitList>,
    pub(crate) receiver_wait: Arc<WaitList>,
    message_count: CachePadded<AtomicUsize>,
    byte_count: CachePadded<AtomicUsize>,
}

impl MessageQueue {
    pub(crate) fn new(id: QueueId, key: Key, owner: Identity, mode: u16, max_bytes: usize, now: i64) -> Self {
        Self {
            id,
            key,
            owner,
            state: Mutex::new(QueueState {
                messages: VecDeque::new(),
                perm: Permission::new(owner, mode),
                max_bytes,
                send_time: 0,
                recv_time: 0,
                change_time: now,
                last_sender: 0,
                last_receiver: 0,
                removed: false,
            }),
            sender_wait: Arc::new(WaitList::new()),
            receiver_wait: Arc::new(WaitList::new()),
            message_count: CachePadded::new(AtomicUsize::new(0)),
            byte_count: CachePadded::new(AtomicUsize::new(0)),
        }
    }

    pub fn id(&self) -> QueueId {
        self.id
    }

    pub fn key(&self) -> Key {
        self.key
    }

    /// The actor that created the queue.
    pub fn owner(&self) -> Identity {
        self.owner
    }

    pub fn message_count(&self) -> usize {
        self.message_count.load(Ordering::Acquire)
    }

    pub fn byte_count(&self) -> usize {
        self.byte_count.load(Ordering::Acquire)
    }

    pub fn sender_wait(&self) -> &WaitList {
        &self.sender_wait
    }

    pub fn receiver_wait(&self) -> &WaitList {
        &self.receiver_wait
    }

    /// Whether one more message of `size` bytes fits in the budget.
    ///
    /// Each queued message also counts as one unit against `max_bytes`, so
    /// empty payloads cannot grow the list without bound.
    pub(crate) fn has_room(&self, state: &QueueState, size: usize) -> bool {
        let bytes_fit = self
            .byte_count()
            .checked_add(size)
            .is_some_and(|total| total <= state.max_bytes);
        bytes_fit && self.message_count() < state.max_bytes
    }

    pub(crate) fn find(&self, state: &QueueState, selector: Selector) -> Option<usize> {
        state.messages.iter().position(|m| selector.matches(m))
    }

    pub(crate) fn push(&self, state: &mut QueueState, message: Message) {
        let size = message.size();
        state.messages.push_back(message);
        self.message_count.fetch_add(1, Ordering::AcqRel);
        self.byte_count.fetch_add(size, Ordering::AcqRel);
        debug_assert_eq!(self.message_count(), state.messages.len());
    }

    pub(crate) fn take(&self, state: &mut QueueState, index: usize) -> Option<Message> {
        let message = state.messages.remove(index)?;
        self.message_count.fetch_sub(1, Ordering::AcqRel);
        self.byte_count.fetch_sub(message.size(), Ordering::AcqRel);
        debug_assert_eq!(self.message_count(), state.messages.len());
        Some(message)
    }

    /// Empty the queue, handing back every message still on it.
    pub(crate) fn drain(&self, state: &mut QueueState) -> Vec<Message> {
        let drained: Vec<Message> = state.messages.drain(..).collect();
        self.message_count.store(0, Ordering::Release);
        self.byte_count.store(0, Ordering::Release);
        drained
    }
}
