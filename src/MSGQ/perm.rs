// Owner/group/other permission checks for queues.

use crate::Core::sched::Identity;

/// Read bit within one owner/group/other triplet.
pub const ACCESS_READ: u16 = 0o4;
/// Write bit within one owner/group/other triplet.
pub const ACCESS_WRITE: u16 = 0o2;

/// Ownership and mode bits of a queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permission {
    pub uid: u32,
    pub gid: u32,
    pub cuid: u32,
    pub cgid: u32,
    pub mode: u16,
}

impl Permission {
    /// Owned and created by `creator`, with the low nine bits of `mode`.
    pub fn new(creator: Identity, mode: u16) -> Self {
        Self {
            uid: creator.uid,
            gid: creator.gid,
            cuid: creator.uid,
            cgid: creator.gid,
            mode: mode & 0o777,
        }
    }

    /// The rwx triplet that applies to `who`.
    ///
    /// Categories are tried owner, then group, then other; the first one
    /// that matches decides, even if a later one would be more generous.
    pub fn granted(&self, who: &Identity) -> u16 {
        if who.uid == self.uid || who.uid == self.cuid {
            (self.mode >> 6) & 0o7
        } else if who.gid == self.gid || who.gid == self.cgid {
            (self.mode >> 3) & 0o7
        } else {
            self.mode & 0o7
        }
    }

    /// Whether every bit of `want` (an rwx triplet) is granted to `who`.
    pub fn allows(&self, who: &Identity, want: u16) -> bool {
        want & !self.granted(who) & 0o7 == 0
    }

    pub fn is_owner_or_creator(&self, who: &Identity) -> bool {
        who.uid == self.uid || who.uid == self.cuid
    }
}

/// Fold a nine-bit mode into the single triplet of access it asks for.
pub fn requested_access(mode: u16) -> u16 {
    ((mode >> 6) | (mode >> 3) | mode) & 0o7
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: Identity = Identity::new(10, 1000, 100);
    const PEER: Identity = Identity::new(11, 1001, 100);
    const STRANGER: Identity = Identity::new(12, 2000, 200);

    #[test]
    fn categories_resolve_in_order() {
        let perm = Permission::new(OWNER, 0o640);
        assert_eq!(perm.granted(&OWNER), 0o6);
        assert_eq!(perm.granted(&PEER), 0o4);
        assert_eq!(perm.granted(&STRANGER), 0o0);
    }

    #[test]
    fn matching_category_does_not_fall_through() {
        // Owner has nothing, others have everything: the owner stays locked out.
        let perm = Permission::new(OWNER, 0o006);
        assert!(!perm.allows(&OWNER, ACCESS_WRITE));
        assert!(perm.allows(&STRANGER, ACCESS_READ | ACCESS_WRITE));
    }

    #[test]
    fn creator_still_counts_as_owner_after_handover() {
        let mut perm = Permission::new(OWNER, 0o600);
        perm.uid = STRANGER.uid;
        perm.gid = STRANGER.gid;
        assert!(perm.is_owner_or_creator(&OWNER));
        assert!(perm.is_owner_or_creator(&STRANGER));
        assert!(!perm.is_owner_or_creator(&PEER));
        assert!(perm.allows(&OWNER, ACCESS_READ | ACCESS_WRITE));
    }

    #[test]
    fn requested_access_folds_all_triplets() {
        assert_eq!(requested_access(0), 0);
        assert_eq!(requested_access(0o400), ACCESS_READ);
        assert_eq!(requested_access(0o020), ACCESS_WRITE);
        assert_eq!(requested_access(0o602), ACCESS_READ | ACCESS_WRITE);
    }
}
