use super::key::QueueId;
use super::perm::ACCESS_READ;
use super::registry::{MessageRegistry, RegistryInfo};
use super::Structs::{IpcPerm, MsqidDs};
use crate::error::{Errno, Result};
use std::sync::atomic::Ordering;
use tracing::debug;

/// A control request against one queue.
#[derive(Debug)]
pub enum ControlCmd<'a> {
    /// Copy the queue's status into the buffer (`IPC_STAT`).
    Stat(&'a mut MsqidDs),
    /// Change owner, mode and byte budget (`IPC_SET`).
    Set(&'a MsqidDs),
    /// Tear the queue down (`IPC_RMID`).
    Remove,
}

impl MessageRegistry {
    pub fn control(&self, id: QueueId, cmd: ControlCmd<'_>) -> Result<()> {
        match cmd {
            ControlCmd::Stat(out) => {
                *out = self.stat(id)?;
                Ok(())
            }
            ControlCmd::Set(settings) => self.set(id, settings),
            ControlCmd::Remove => self.remove(id),
        }
    }

    /// Snapshot a queue's permissions, counters and timestamps.
    ///
    /// Needs read access. The registry lock is only held until the queue
    /// lock is taken; the copy happens under the queue lock alone.
    pub fn stat(&self, id: QueueId) -> Result<MsqidDs> {
        if id.0 <= 0 {
            return Err(Errno::Invalid);
        }
        let who = self.scheduler.current();

        let table = self.table.lock();
        let queue = table.queues.get(&id).cloned().ok_or(Errno::Removed)?;
        let state = queue.state.lock();
        drop(table);

        if !state.perm.allows(&who, ACCESS_READ) {
            return Err(Errno::Access);
        }

        Ok(MsqidDs {
            perm: IpcPerm {
                key: queue.key().0,
                uid: state.perm.uid,
                gid: state.perm.gid,
                cuid: state.perm.cuid,
                cgid: state.perm.cgid,
                mode: state.perm.mode,
                _pad: 0,
            },
            stime: state.send_time,
            rtime: state.recv_time,
            ctime: state.change_time,
            cbytes: queue.byte_count() as u64,
            qnum: queue.message_count() as u64,
            qbytes: state.max_bytes as u64,
            lspid: state.last_sender,
            lrpid: state.last_receiver,
        })
    }

    /// Change a queue's owner, group, mode and byte budget.
    ///
    /// Only the creator or current owner may do this, and only a privileged
    /// caller may push the budget past the registry default.
    pub fn set(&self, id: QueueId, settings: &MsqidDs) -> Result<()> {
        if id.0 <= 0 {
            return Err(Errno::Invalid);
        }
        let who = self.scheduler.current();
        let max_bytes = usize::try_from(settings.qbytes).map_err(|_| Errno::Invalid)?;

        let table = self.table.lock();
        let queue = table.queues.get(&id).cloned().ok_or(Errno::Removed)?;
        let mut state = queue.state.lock();
        drop(table);

        if !state.perm.is_owner_or_creator(&who) {
            return Err(Errno::Permission);
        }
        if max_bytes > self.limits.default_max_bytes && !who.is_privileged() {
            return Err(Errno::Permission);
        }

        state.perm.uid = settings.perm.uid;
        state.perm.gid = settings.perm.gid;
        state.perm.mode = settings.perm.mode & 0o777;
        state.max_bytes = max_bytes;
        state.change_time = self.clock.now();
        drop(state);

        debug!(%id, uid = settings.perm.uid, gid = settings.perm.gid, max_bytes, "queue permissions changed");
        // a bigger budget may admit blocked senders
        self.scheduler.wake_all(&queue.sender_wait);
        Ok(())
    }

    /// Remove a queue. Only the creator or current owner may do this.
    ///
    /// The queue is detached from both indexes while both locks are held, so
    /// nobody can find it afterwards. Sleepers are woken only once every lock
    /// is released; each re-resolves the id and returns `EIDRM`. Messages
    /// still queued go back to the allocator last.
    pub fn remove(&self, id: QueueId) -> Result<()> {
        if id.0 <= 0 {
            return Err(Errno::Invalid);
        }
        let who = self.scheduler.current();

        let queue = {
            let mut table = self.table.lock();
            let queue = table.queues.get(&id).cloned().ok_or(Errno::Removed)?;
            let mut state = queue.state.lock();
            if !state.perm.is_owner_or_creator(&who) {
                return Err(Errno::Permission);
            }

            state.removed = true;
            table.queues.remove(&id);
            if !queue.key().is_private() {
                table.keys.remove(&queue.key());
            }
            self.queue_count.fetch_sub(1, Ordering::AcqRel);

            drop(state);
            drop(table);
            queue
        };

        self.scheduler.wake_all(&queue.sender_wait);
        self.scheduler.wake_all(&queue.receiver_wait);

        let drained = queue.drain(&mut queue.state.lock());
        let (count, bytes) = (drained.len(), drained.iter().map(|m| m.size()).sum::<usize>());
        for message in drained {
            self.allocator.free(message.into_payload());
        }

        debug!(%id, key = %queue.key(), discarded = count, bytes, "queue removed");
        Ok(())
    }

    /// Limits plus usage summed over every live queue.
    ///
    /// Counters are read without queue locks, so the totals are a loose
    /// snapshot while traffic is flowing.
    pub fn info(&self) -> RegistryInfo {
        let table = self.table.lock();
        let (messages, bytes) = table.queues.values().fold((0, 0), |(m, b), q| {
            (m + q.message_count(), b + q.byte_count())
        });
        RegistryInfo {
            limits: self.limits,
            queues: table.queues.len(),
            messages,
            bytes,
        }
    }
}
