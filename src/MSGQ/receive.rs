use super::flags::MsgFlags;
use super::key::QueueId;
use super::message::Selector;
use super::perm::ACCESS_READ;
use super::registry::MessageRegistry;
use crate::error::{Errno, Result};
use crate::Core::sched::BlockReason;
use tracing::trace;

/// What a receive delivered into the caller's buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Received {
    pub mtype: i64,
    /// Payload bytes written; less than the message size if truncated.
    pub len: usize,
}

impl MessageRegistry {
    /// Take the earliest-arrived message matching `mtype` into `buf`.
    ///
    /// `mtype == 0` takes the head, `mtype > 0` the first message of exactly
    /// that type (or of any other type under [`MsgFlags::EXCEPT`]), and
    /// `mtype < 0` the first message whose type is at most `|mtype|`.
    ///
    /// A message bigger than `buf` stays queued and fails with `E2BIG`,
    /// unless [`MsgFlags::NOERROR`] allows cutting off its tail.
    pub fn receive(&self, id: QueueId, buf: &mut [u8], mtype: i64, flags: MsgFlags) -> Result<Received> {
        let selector = Selector::new(mtype, flags);

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
            if !state.perm.allows(&who, ACCESS_READ) {
                return Err(Errno::Access);
            }

            let Some(index) = queue.find(&state, selector) else {
                if flags.contains(MsgFlags::NOWAIT) {
                    return Err(Errno::NoMessage);
                }
                let ticket = queue.receiver_wait.ticket();
                drop(state);
                trace!(%id, mtype, "no matching message, receiver blocking");
                self.scheduler.block(BlockReason::NoMessage, &queue.receiver_wait, ticket);
                continue;
            };

            if state.messages[index].size() > buf.len() && !flags.contains(MsgFlags::NOERROR) {
                return Err(Errno::TooBig);
            }
            let message = queue.take(&mut state, index).ok_or(Errno::NoMessage)?;
            state.recv_time = self.clock.now();
            state.last_receiver = who.pid;
            self.scheduler.wake_all(&queue.sender_wait);
            drop(state);

            let len = message.size().min(buf.len());
            buf[..len].copy_from_slice(&message.payload()[..len]);
            let received = Received {
                mtype: message.mtype(),
                len,
            };
            trace!(%id, mtype = received.mtype, size = message.size(), len, "message received");
            self.allocator.free(message.into_payload());
            return Ok(received);
        }
    }

    /// Like [`receive`](Self::receive), into a fresh buffer of `capacity` bytes.
    pub fn receive_owned(&self, id: QueueId, capacity: usize, mtype: i64, flags: MsgFlags) -> Result<(i64, Vec<u8>)> {
        let mut buf = vec![0u8; capacity];
        let received = self.receive(id, &mut buf, mtype, flags)?;
        buf.truncate(received.len);
        Ok((received.mtype, buf))
    }
}
