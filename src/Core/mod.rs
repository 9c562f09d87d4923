pub mod alloc;
pub mod clock;
pub mod futex;
pub mod sched;

pub use alloc::{HeapAllocator, MessageAllocator};
pub use clock::{Clock, ManualClock, SystemClock};
pub use sched::{Actor, BlockReason, Identity, Scheduler, ThreadScheduler, Ticket, WaitList};
