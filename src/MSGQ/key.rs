use crate::error::{Errno, Result};
use sha2::{Digest, Sha256};
use std::fmt;

/// External rendezvous key for a queue. [`Key::PRIVATE`] never matches an
/// existing queue and always creates a fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(pub i32);

impl Key {
    pub const PRIVATE: Key = Key(0);

    pub fn is_private(self) -> bool {
        self == Self::PRIVATE
    }

    /// Derive a stable key from a name, `ftok` style.
    ///
    /// The low 24 bits come from the SHA-256 of `name`, the top byte is
    /// `project`. A zero project is rejected so derived keys are never private.
    pub fn derive(name: &str, project: u8) -> Result<Key> {
        if project == 0 {
            return Err(Errno::Invalid);
        }
        let digest = Sha256::digest(name.as_bytes());
        let low = u32::from_be_bytes([0, digest[0], digest[1], digest[2]]);
        Ok(Key(((u32::from(project) << 24) | low) as i32))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_private() {
            f.write_str("private")
        } else {
            write!(f, "{:#010x}", self.0)
        }
    }
}

/// Registry-assigned queue handle. Always positive while the queue exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueueId(pub(crate) i32);

impl QueueId {
    pub fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    pub fn as_raw(self) -> i32 {
        self.0
    }
}

impl fmt::Display for QueueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
