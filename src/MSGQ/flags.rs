use bitflags::bitflags;

bitflags! {
    /// Flags for [`MessageRegistry::get`](super::MessageRegistry::get).
    ///
    /// The low nine bits carry the permission mode for a newly created queue
    /// and the access requested on an existing one.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct GetFlags: i32 {
        /// Create the queue if the key has none (`IPC_CREAT`).
        const CREATE = 0o1000;
        /// With `CREATE`, fail if the key already has a queue (`IPC_EXCL`).
        const EXCLUSIVE = 0o2000;

        const _ = 0o777;
    }
}

impl GetFlags {
    /// Flags carrying only the permission bits `mode`.
    pub fn mode_bits(mode: u16) -> Self {
        Self::from_bits_retain(i32::from(mode & 0o777))
    }

    pub fn mode(self) -> u16 {
        (self.bits() & 0o777) as u16
    }
}

bitflags! {
    /// Flags for send and receive.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MsgFlags: i32 {
        /// Fail instead of blocking (`IPC_NOWAIT`).
        const NOWAIT = 0o4000;
        /// Truncate oversize payloads instead of failing (`MSG_NOERROR`).
        const NOERROR = 0o10000;
        /// With a positive type, take the first message of any *other* type (`MSG_EXCEPT`).
        const EXCEPT = 0o20000;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_survives_union_with_flags() {
        let flags = GetFlags::CREATE | GetFlags::EXCLUSIVE | GetFlags::mode_bits(0o640);
        assert_eq!(flags.mode(), 0o640);
        assert!(flags.contains(GetFlags::CREATE | GetFlags::EXCLUSIVE));
    }

    #[test]
    fn mode_bits_drops_high_bits() {
        assert_eq!(GetFlags::mode_bits(0o7777).mode(), 0o777);
        assert!(!GetFlags::mode_bits(0o7777).contains(GetFlags::CREATE));
    }
}
