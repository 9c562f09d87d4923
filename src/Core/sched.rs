// Scheduler seam: who is calling, whether they were interrupted, and how they
// sleep until a queue condition may have changed.

use crate::Core::futex::{futex_wait, futex_wake_all};
use crossbeam_utils::CachePadded;
use parking_lot::Mutex;
use std::cell::RefCell;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering::SeqCst};
use std::sync::Arc;

/// Credentials of an execution context, as seen by permission checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Identity {
    pub pid: i32,
    pub uid: u32,
    pub gid: u32,
}

impl Identity {
    pub const fn new(pid: i32, uid: u32, gid: u32) -> Self {
        Self { pid, uid, gid }
    }

    /// The hosting process's own pid and effective credentials.
    pub fn process() -> Self {
        unsafe {
            Self {
                pid: libc::getpid(),
                uid: libc::geteuid(),
                gid: libc::getegid(),
            }
        }
    }

    /// Root may raise a queue's byte budget past the registry default.
    pub fn is_privileged(&self) -> bool {
        self.uid == 0
    }
}

/// Why an actor went to sleep. Only used for tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    /// Sender waiting for byte budget.
    QueueFull,
    /// Receiver waiting for a matching message.
    NoMessage,
}

/// Generation of a [`WaitList`] observed before releasing the queue lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u32);

/// A set of sleepers waiting on one queue condition.
///
/// The list is a single futex word whose value is a wake generation.
/// A waiter snapshots the generation (its [`Ticket`]) while it still holds the
/// queue lock and sleeps only while the word is unchanged, so a wake issued
/// between unlocking and sleeping is never lost.
pub struct WaitList {
    generation: CachePadded<AtomicU32>,
    sleepers: AtomicU32,
}

impl WaitList {
    pub fn new() -> Self {
        Self {
            generation: CachePadded::new(AtomicU32::new(0)),
            sleepers: AtomicU32::new(0),
        }
    }

    pub fn ticket(&self) -> Ticket {
        Ticket(self.generation.load(SeqCst))
    }

    /// Sleep until a wake newer than `ticket`. May return spuriously.
    pub fn sleep(&self, ticket: Ticket) {
        self.sleepers.fetch_add(1, SeqCst);
        futex_wait(&self.generation, ticket.0);
        self.sleepers.fetch_sub(1, SeqCst);
    }

    pub fn wake_all(&self) {
        self.generation.fetch_add(1, SeqCst);
        if self.sleepers.load(SeqCst) > 0 {
            futex_wake_all(&self.generation);
        }
    }

    /// Number of contexts currently inside [`WaitList::sleep`].
    pub fn sleepers(&self) -> u32 {
        self.sleepers.load(SeqCst)
    }
}

impl Default for WaitList {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for WaitList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaitList")
            .field("generation", &self.generation.load(SeqCst))
            .field("sleepers", &self.sleepers())
            .finish()
    }
}

/// The scheduler services the queue engine consumes.
pub trait Scheduler: Send + Sync {
    /// Identity of the calling context.
    fn current(&self) -> Identity;

    /// Report and clear a pending interrupt for the calling context.
    fn take_interrupt(&self) -> bool;

    /// Put the caller to sleep on `waiters` unless a wake newer than `ticket`
    /// has already happened. Never called with a lock held.
    fn block(&self, reason: BlockReason, waiters: &Arc<WaitList>, ticket: Ticket);

    fn wake_all(&self, waiters: &WaitList);
}

thread_local! {
    static CURRENT: RefCell<Option<Arc<Actor>>> = const { RefCell::new(None) };
}

/// An execution context with its own credentials and interrupt flag.
///
/// Bind one to an OS thread with [`Actor::attach`]; the [`ThreadScheduler`]
/// then reports its identity and honours [`Actor::interrupt`].
pub struct Actor {
    identity: Identity,
    interrupted: AtomicBool,
    parked: Mutex<Option<Arc<WaitList>>>,
}

impl Actor {
    pub fn new(identity: Identity) -> Arc<Self> {
        Arc::new(Self {
            identity,
            interrupted: AtomicBool::new(false),
            parked: Mutex::new(None),
        })
    }

    pub fn identity(&self) -> Identity {
        self.identity
    }

    /// Raise an interrupt and kick the actor out of any sleep it is in.
    pub fn interrupt(&self) {
        self.interrupted.store(true, SeqCst);
        let parked = self.parked.lock().clone();
        if let Some(waiters) = parked {
            waiters.wake_all();
        }
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(SeqCst)
    }

    pub fn take_interrupt(&self) -> bool {
        self.interrupted.swap(false, SeqCst)
    }

    pub fn is_parked(&self) -> bool {
        self.parked.lock().is_some()
    }

    fn park(&self, waiters: &Arc<WaitList>, ticket: Ticket) {
        *self.parked.lock() = Some(Arc::clone(waiters));
        // interrupt() stores the flag before reading `parked`, so either we
        // see the flag here or it sees us parked and bumps the generation.
        if !self.is_interrupted() {
            waiters.sleep(ticket);
        }
        *self.parked.lock() = None;
    }

    /// Bind this actor to the calling thread, returning the previous binding.
    pub fn attach(self: &Arc<Self>) -> Option<Arc<Actor>> {
        CURRENT.with(|c| c.borrow_mut().replace(Arc::clone(self)))
    }

    pub fn detach() -> Option<Arc<Actor>> {
        CURRENT.with(|c| c.borrow_mut().take())
    }

    pub fn current() -> Option<Arc<Actor>> {
        CURRENT.with(|c| c.borrow().clone())
    }
}

impl fmt::Debug for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Actor")
            .field("identity", &self.identity)
            .field("interrupted", &self.is_interrupted())
            .finish_non_exhaustive()
    }
}

/// Default scheduler: OS threads, futex sleeps, thread-bound [`Actor`]s.
///
/// Threads with no actor attached act as the hosting process and cannot be
/// interrupted.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadScheduler;

impl Scheduler for ThreadScheduler {
    fn current(&self) -> Identity {
        Actor::current()
            .map(|actor| actor.identity())
            .unwrap_or_else(Identity::process)
    }

    fn take_interrupt(&self) -> bool {
        Actor::current().is_some_and(|actor| actor.take_interrupt())
    }

    fn block(&self, reason: BlockReason, waiters: &Arc<WaitList>, ticket: Ticket) {
        tracing::trace!(?reason, "blocking");
        match Actor::current() {
            Some(actor) => actor.park(waiters, ticket),
            None => waiters.sleep(ticket),
        }
        tracing::trace!(?reason, "woken");
    }

    fn wake_all(&self, waiters: &WaitList) {
        waiters.wake_all();
    }
}
