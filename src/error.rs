use std::io;

/// Errors surfaced by the message queue engine.
///
/// Every variant maps onto one platform errno value (see [`Errno::code`]),
/// so the C shim in [`crate::ffi`] can hand them back as `-errno`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum Errno {
    #[error("permission denied")]
    Access,
    #[error("queue already exists for key")]
    Exists,
    #[error("no queue for key")]
    NotFound,
    #[error("queue limit reached")]
    NoSpace,
    #[error("invalid argument")]
    Invalid,
    #[error("queue removed")]
    Removed,
    #[error("queue full")]
    Again,
    #[error("no message of desired type")]
    NoMessage,
    #[error("message too large for buffer")]
    TooBig,
    #[error("out of memory")]
    NoMemory,
    #[error("interrupted")]
    Interrupted,
    #[error("operation not permitted")]
    Permission,
    #[error("bad address")]
    Fault,
}

pub type Result<T> = std::result::Result<T, Errno>;

impl Errno {
    /// Platform errno value for this error.
    pub fn code(self) -> i32 {
        match self {
            Errno::Access => libc::EACCES,
            Errno::Exists => libc::EEXIST,
            Errno::NotFound => libc::ENOENT,
            Errno::NoSpace => libc::ENOSPC,
            Errno::Invalid => libc::EINVAL,
            Errno::Removed => libc::EIDRM,
            Errno::Again => libc::EAGAIN,
            Errno::NoMessage => libc::ENOMSG,
            Errno::TooBig => libc::E2BIG,
            Errno::NoMemory => libc::ENOMEM,
            Errno::Interrupted => libc::EINTR,
            Errno::Permission => libc::EPERM,
            Errno::Fault => libc::EFAULT,
        }
    }

    pub fn from_code(code: i32) -> Option<Errno> {
        const ALL: [Errno; 13] = [
            Errno::Access,
            Errno::Exists,
            Errno::NotFound,
            Errno::NoSpace,
            Errno::Invalid,
            Errno::Removed,
            Errno::Again,
            Errno::NoMessage,
            Errno::TooBig,
            Errno::NoMemory,
            Errno::Interrupted,
            Errno::Permission,
            Errno::Fault,
        ];
        ALL.into_iter().find(|e| e.code() == code)
    }
}

impl From<Errno> for io::Error {
    fn from(e: Errno) -> Self {
        io::Error::from_raw_os_error(e.code())
    }
}
