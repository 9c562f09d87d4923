use super::flags::MsgFlags;
use super::key::QueueId;
use super::message::Message;
use super::perm::ACCESS_WRITE;
use super::registry::MessageRegistry;
use crate::error::{Errno, Result};
use crate::Core::sched::BlockReason;
use tracing::{trace, warn};

impl MessageRegistry {
    /// Append a message of type `mtype` to the tail of the queue.
    ///
    /// While the queue's byte budget cannot take the payload (or already
    /// holds `max_bytes` messages, which bounds empty payloads), the caller
    /// sleeps on the queue's sender list (or gets `EAGAIN` with
    /// [`MsgFlags::NOWAIT`]). Each pass re-resolves `id`, so a queue removed
    /// meanwhile turns into `EIDRM`. A payload over the registry's
    /// `max_message_size` is `EINVAL`, or is clamped under [`MsgFlags::NOERROR`].
    pub fn send(&self, id: QueueId, mtype: i64, payload: &[u8], flags: MsgFlags) -> Result<()> {
        if mtype < 1 {
            return Err(Errno::Invalid);
        }
        let max = self.limits.max_message_size;
        let payload = if payload.len() <= max {
            payload
        } else if flags.contains(MsgFlags::NOERROR) {
            &payload[..max]
        } else {
            return Err(Errno::Invalid);
        };
        let size = payload.len();

        loop {
            if self.scheduler.take_interrupt() {
                return Err(Errno::Interrupted);
            }
            let queue = self.resolve(id)?;
            let who = self.scheduler.current();

            let mut state = queue.state.lock();
            if state.removed {
                return Err(Errno::Removed);
            }
            if !state.perm.allows(&who, ACCESS_WRITE) {
                return Err(Errno::Access);
            }

            if !queue.has_room(&state, size) {
                if flags.contains(MsgFlags::NOWAIT) {
                    return Err(Errno::Again);
                }
                let ticket = queue.sender_wait.ticket();
                drop(state);
                trace!(%id, size, "queue full, sender blocking");
                self.scheduler.block(BlockReason::QueueFull, &queue.sender_wait, ticket);
                continue;
            }

            let mut body = match self.allocator.allocate(size) {
                Some(body) => body,
                None => {
                    warn!(%id, size, "message allocation failed");
                    return Err(Errno::NoMemory);
                }
            };
            body.copy_from_slice(payload);
            queue.push(&mut state, Message::new(mtype, body));
            state.send_time = self.clock.now();
            state.last_sender = who.pid;

            self.scheduler.wake_all(&queue.receiver_wait);
            trace!(%id, mtype, size, "message queued");
            return Ok(());
        }
    }
}
