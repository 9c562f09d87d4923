use super::flags::GetFlags;
use super::key::{Key, QueueId};
use super::perm::requested_access;
use super::queue::MessageQueue;
use crate::error::{Errno, Result};
use crate::Core::alloc::MessageAllocator;
use crate::Core::clock::Clock;
use crate::Core::sched::{Identity, Scheduler};
use crossbeam_utils::CachePadded;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Registry-wide limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Most queues that may exist at once (`MSGMNI`).
    pub max_queues: usize,
    /// Byte budget given to new queues (`MSGMNB`).
    pub default_max_bytes: usize,
    /// Largest single payload (`MSGMAX`).
    pub max_message_size: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_queues: 32000,
            default_max_bytes: 16384,
            max_message_size: 8192,
        }
    }
}

/// Usage snapshot across every queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryInfo {
    pub limits: Limits,
    pub queues: usize,
    pub messages: usize,
    pub bytes: usize,
}

/// The id and key indexes, guarded by the registry lock.
pub(crate) struct Table {
    pub(crate) queues: HashMap<QueueId, Arc<MessageQueue>>,
    pub(crate) keys: HashMap<Key, QueueId>,
    next_id: i32,
}

impl Table {
    fn new() -> Self {
        Self {
            queues: HashMap::new(),
            keys: HashMap::new(),
            next_id: 1,
        }
    }

    // Next positive id not currently in use; wraps back to 1 after i32::MAX
    fn allocate_id(&mut self) -> QueueId {
        loop {
            let candidate = QueueId(self.next_id);
            self.next_id = if self.next_id == i32::MAX { 1 } else { self.next_id + 1 };
            if !self.queues.contains_key(&candidate) {
                return candidate;
            }
        }
    }
}

/// The process-wide table of message queues.
///
/// Construct one at startup (see [`RegistryBuilder`](super::RegistryBuilder))
/// and share it by reference. Lock order is always registry, then queue, and
/// neither lock is held while an actor sleeps.
pub struct MessageRegistry {
    pub(crate) table: Mutex<Table>,
    pub(crate) limits: Limits,
    pub(crate) queue_count: CachePadded<AtomicUsize>,
    pub(crate) scheduler: Arc<dyn Scheduler>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) allocator: Arc<dyn MessageAllocator>,
}

impl MessageRegistry {
    pub(crate) fn from_parts(
        limits: Limits,
        scheduler: Arc<dyn Scheduler>,
        clock: Arc<dyn Clock>,
        allocator: Arc<dyn MessageAllocator>,
    ) -> Self {
        Self {
            table: Mutex::new(Table::new()),
            limits,
            queue_count: CachePadded::new(AtomicUsize::new(0)),
            scheduler,
            clock,
            allocator,
        }
    }

    /// Find or create the queue for `key`.
    ///
    /// [`Key::PRIVATE`] always creates. Otherwise an unknown key needs
    /// [`GetFlags::CREATE`], and a known key is refused with `EEXIST` under
    /// `CREATE | EXCLUSIVE` or `EACCES` when the caller lacks the access the
    /// mode bits of `flags` ask for.
    pub fn get(&self, key: Key, flags: GetFlags) -> Result<QueueId> {
        let who = self.scheduler.current();
        let mut table = self.table.lock();

        if key.is_private() {
            return self.create(&mut table, key, flags, who);
        }

        let id = match table.keys.get(&key).copied() {
            Some(id) => id,
            None if flags.contains(GetFlags::CREATE) => {
                return self.create(&mut table, key, flags, who);
            }
            None => return Err(Errno::NotFound),
        };

        if flags.contains(GetFlags::CREATE | GetFlags::EXCLUSIVE) {
            return Err(Errno::Exists);
        }

        let queue = table.queues.get(&id).ok_or(Errno::Removed)?;
        let state = queue.state.lock();
        if !state.perm.allows(&who, requested_access(flags.mode())) {
            debug!(%key, %id, uid = who.uid, gid = who.gid, "get denied");
            return Err(Errno::Access);
        }
        Ok(id)
    }

    fn create(&self, table: &mut Table, key: Key, flags: GetFlags, who: Identity) -> Result<QueueId> {
        if self.queue_count.load(Ordering::Acquire) >= self.limits.max_queues {
            return Err(Errno::NoSpace);
        }

        let id = table.allocate_id();
        let queue = MessageQueue::new(
            id,
            key,
            who,
            flags.mode(),
            self.limits.default_max_bytes,
            self.clock.now(),
        );
        table.queues.insert(id, Arc::new(queue));
        if !key.is_private() {
            table.keys.insert(key, id);
        }
        self.queue_count.fetch_add(1, Ordering::AcqRel);

        debug!(%key, %id, mode = flags.mode(), uid = who.uid, "queue created");
        Ok(id)
    }

    pub fn lookup_by_id(&self, id: QueueId) -> Option<Arc<MessageQueue>> {
        self.table.lock().queues.get(&id).cloned()
    }

    pub fn lookup_by_key(&self, key: Key) -> Option<Arc<MessageQueue>> {
        if key.is_private() {
            return None;
        }
        let table = self.table.lock();
        let id = table.keys.get(&key)?;
        table.queues.get(id).cloned()
    }

    /// Resolve an id for a send/receive pass; a vanished queue reads as removed.
    pub(crate) fn resolve(&self, id: QueueId) -> Result<Arc<MessageQueue>> {
        if id.0 <= 0 {
            return Err(Errno::Invalid);
        }
        self.lookup_by_id(id).ok_or(Errno::Removed)
    }

    pub fn queue_count(&self) -> usize {
        self.queue_count.load(Ordering::Acquire)
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    /// Live queue ids in ascending order.
    pub fn ids(&self) -> Vec<QueueId> {
        let mut ids: Vec<QueueId> = self.table.lock().queues.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn scheduler(&self) -> &Arc<dyn Scheduler> {
        &self.scheduler
    }
}

impl Default for MessageRegistry {
    fn default() -> Self {
        super::RegistryBuilder::default().build_unchecked()
    }
}
