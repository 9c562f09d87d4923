use crate::error::Errno;
use crate::MSGQ::Structs::{MsgInfo, MsqidDs};
use crate::MSGQ::{ControlCmd, GetFlags, Key, MessageRegistry, MsgFlags, QueueId, RegistryBuilder};
use libc::{c_int, c_long, c_void, ssize_t};
use std::mem::size_of;
use std::ptr;

// Control commands (Linux numbering)
pub const IPC_RMID: c_int = 0;
pub const IPC_SET: c_int = 1;
pub const IPC_STAT: c_int = 2;
pub const MSG_INFO: c_int = 12;

/// Handle to a registry instance (opaque pointer)
pub struct RegistryHandle {
    inner: MessageRegistry,
}

impl RegistryHandle {
    pub fn registry(&self) -> &MessageRegistry {
        &self.inner
    }
}

fn fail(e: Errno) -> c_int {
    -e.code()
}

fn clamp_i32(value: usize) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

// -----------------------------------------------------------------------------
// Registry lifecycle
// -----------------------------------------------------------------------------

/// Create a new registry.
///
/// # Arguments
/// * `max_queues`, `default_max_bytes`, `max_message_size` - limits; 0 keeps the default.
///
/// # Returns
/// * Pointer to `RegistryHandle`, or NULL on failure.
#[no_mangle]
pub extern "C" fn dmxp_msgq_registry_new(
    max_queues: usize,
    default_max_bytes: usize,
    max_message_size: usize,
) -> *mut RegistryHandle {
    let mut builder = RegistryBuilder::new();
    if max_queues != 0 {
        builder = builder.with_max_queues(max_queues);
    }
    if default_max_bytes != 0 {
        builder = builder.with_default_max_bytes(default_max_bytes);
    }
    if max_message_size != 0 {
        builder = builder.with_max_message_size(max_message_size);
    }

    match builder.build() {
        Ok(registry) => Box::into_raw(Box::new(RegistryHandle { inner: registry })),
        Err(e) => {
            tracing::error!(error = %e, "failed to build registry");
            ptr::null_mut()
        }
    }
}

/// Free a registry handle.
///
/// # Safety
/// `handle` must be NULL or come from [`dmxp_msgq_registry_new`], and no
/// other call may be using it.
#[no_mangle]
pub unsafe extern "C" fn dmxp_msgq_registry_free(handle: *mut RegistryHandle) {
    if !handle.is_null() {
        unsafe {
            let _ = Box::from_raw(handle); // Dropped automatically
        }
    }
}

// -----------------------------------------------------------------------------
// msgget / msgctl / msgsnd / msgrcv
// -----------------------------------------------------------------------------

/// Get or create a queue.
///
/// # Returns
/// * Queue id (> 0) on success, `-errno` otherwise.
///
/// # Safety
/// `handle` must be NULL or a live handle.
#[no_mangle]
pub unsafe extern "C" fn dmxp_msgget(handle: *const RegistryHandle, key: c_int, flags: c_int) -> c_int {
    let Some(handle) = (unsafe { handle.as_ref() }) else {
        return fail(Errno::Fault);
    };
    match handle
        .inner
        .get(Key(key), GetFlags::from_bits_retain(flags))
    {
        Ok(id) => id.as_raw(),
        Err(e) => fail(e),
    }
}

/// Queue control.
///
/// `buf` points to a `MsqidDs` for `IPC_STAT`/`IPC_SET`, to a `MsgInfo` for
/// `MSG_INFO`, and is ignored for `IPC_RMID`.
///
/// # Returns
/// * 0 on success (`MSG_INFO`: highest live id), `-errno` otherwise.
///
/// # Safety
/// `handle` must be NULL or a live handle; `buf` must be NULL or valid for the
/// struct the command uses.
#[no_mangle]
pub unsafe extern "C" fn dmxp_msgctl(
    handle: *const RegistryHandle,
    id: c_int,
    cmd: c_int,
    buf: *mut c_void,
) -> c_int {
    let Some(handle) = (unsafe { handle.as_ref() }) else {
        return fail(Errno::Fault);
    };
    let registry = &handle.inner;
    let id = QueueId::from_raw(id);

    let result = match cmd {
        IPC_RMID => registry.control(id, ControlCmd::Remove),
        IPC_STAT => {
            if buf.is_null() {
                return fail(Errno::Fault);
            }
            let mut out = MsqidDs::default();
            registry
                .control(id, ControlCmd::Stat(&mut out))
                .map(|()| unsafe { ptr::write_unaligned(buf as *mut MsqidDs, out) })
        }
        IPC_SET => {
            if buf.is_null() {
                return fail(Errno::Fault);
            }
            let settings = unsafe { ptr::read_unaligned(buf as *const MsqidDs) };
            registry.control(id, ControlCmd::Set(&settings))
        }
        MSG_INFO => {
            if buf.is_null() {
                return fail(Errno::Fault);
            }
            let info = registry.info();
            let out = MsgInfo {
                msgpool: clamp_i32(info.queues),
                msgmap: clamp_i32(info.messages),
                msgmax: clamp_i32(info.limits.max_message_size),
                msgmnb: clamp_i32(info.limits.default_max_bytes),
                msgmni: clamp_i32(info.limits.max_queues),
                msgssz: 16,
                msgtql: clamp_i32(info.bytes),
                msgseg: u16::MAX,
            };
            unsafe { ptr::write_unaligned(buf as *mut MsgInfo, out) };
            return registry.ids().last().map_or(0, |id| id.as_raw());
        }
        _ => Err(Errno::Invalid),
    };

    match result {
        Ok(()) => 0,
        Err(e) => fail(e),
    }
}

/// Send a message.
///
/// `msgp` points to `{ long mtype; char mtext[msgsz]; }`.
///
/// # Returns
/// * 0 on success, `-errno` otherwise.
///
/// # Safety
/// `handle` must be NULL or a live handle; `msgp` must be NULL or readable for
/// `sizeof(long) + msgsz` bytes.
#[no_mangle]
pub unsafe extern "C" fn dmxp_msgsnd(
    handle: *const RegistryHandle,
    id: c_int,
    msgp: *const c_void,
    msgsz: usize,
    flags: c_int,
) -> c_int {
    let Some(handle) = (unsafe { handle.as_ref() }) else {
        return fail(Errno::Fault);
    };
    if msgp.is_null() {
        return fail(Errno::Fault);
    }

    let (mtype, text) = unsafe {
        let mtype = ptr::read_unaligned(msgp as *const c_long);
        let text = std::slice::from_raw_parts((msgp as *const u8).add(size_of::<c_long>()), msgsz);
        (mtype, text)
    };

    match handle.inner.send(
        QueueId::from_raw(id),
        i64::from(mtype),
        text,
        MsgFlags::from_bits_retain(flags),
    ) {
        Ok(()) => 0,
        Err(e) => fail(e),
    }
}

/// Receive a message.
///
/// `msgp` points to `{ long mtype; char mtext[msgsz]; }`; the message type
/// and up to `msgsz` payload bytes are written there.
///
/// # Returns
/// * Payload bytes written on success, `-errno` otherwise.
///
/// # Safety
/// `handle` must be NULL or a live handle; `msgp` must be NULL or writable for
/// `sizeof(long) + msgsz` bytes.
#[no_mangle]
pub unsafe extern "C" fn dmxp_msgrcv(
    handle: *const RegistryHandle,
    id: c_int,
    msgp: *mut c_void,
    msgsz: usize,
    msgtyp: c_long,
    flags: c_int,
) -> ssize_t {
    let Some(handle) = (unsafe { handle.as_ref() }) else {
        return fail(Errno::Fault) as ssize_t;
    };
    if msgp.is_null() {
        return fail(Errno::Fault) as ssize_t;
    }

    let text = unsafe {
        std::slice::from_raw_parts_mut((msgp as *mut u8).add(size_of::<c_long>()), msgsz)
    };

    match handle.inner.receive(
        QueueId::from_raw(id),
        text,
        i64::from(msgtyp),
        MsgFlags::from_bits_retain(flags),
    ) {
        Ok(received) => {
            unsafe { ptr::write_unaligned(msgp as *mut c_long, received.mtype as c_long) };
            received.len as ssize_t
        }
        Err(e) => fail(e) as ssize_t,
    }
}
