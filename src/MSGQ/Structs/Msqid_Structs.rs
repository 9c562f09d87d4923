// These are the fixed-layout structs exchanged with the control path

// no atomics here; plain integral types so the layout is ABI-stable

/// Ownership and mode of a queue, as reported by stat and accepted by set.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct IpcPerm {
    pub key: i32,
    pub uid: u32,
    pub gid: u32,
    pub cuid: u32,
    pub cgid: u32,
    pub mode: u16,
    pub _pad: u16,
}

/// Queue status snapshot (`struct msqid_ds`).
///
/// On set, only `perm.uid`, `perm.gid`, `perm.mode` and `qbytes` are read.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct MsqidDs {
    pub perm: IpcPerm,
    /// Last successful send, epoch seconds (0 = never).
    pub stime: i64,
    /// Last successful receive, epoch seconds (0 = never).
    pub rtime: i64,
    /// Creation or last set.
    pub ctime: i64,
    /// Bytes currently queued.
    pub cbytes: u64,
    /// Messages currently queued.
    pub qnum: u64,
    /// Byte budget.
    pub qbytes: u64,
    /// Pid of the last sender.
    pub lspid: i32,
    /// Pid of the last receiver.
    pub lrpid: i32,
}

/// Registry-wide limits and usage (`struct msginfo`, `MSG_INFO` flavour).
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct MsgInfo {
    /// Queues in use.
    pub msgpool: i32,
    /// Messages queued across all queues.
    pub msgmap: i32,
    pub msgmax: i32,
    pub msgmnb: i32,
    pub msgmni: i32,
    pub msgssz: i32,
    /// Bytes queued across all queues.
    pub msgtql: i32,
    pub msgseg: u16,
}
