use super::flags::MsgFlags;

/// One queued message: a positive type tag and its payload.
#[derive(Debug)]
pub struct Message {
    mtype: i64,
    payload: Vec<u8>,
}

impl Message {
    pub(crate) fn new(mtype: i64, payload: Vec<u8>) -> Self {
        Self { mtype, payload }
    }

    pub fn mtype(&self) -> i64 {
        self.mtype
    }

    pub fn size(&self) -> usize {
        self.payload.len()
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub(crate) fn into_payload(self) -> Vec<u8> {
        self.payload
    }
}

/// Which message a receive is willing to take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Selector {
    Any,
    Exact(i64),
    Except(i64),
    AtMost(u64),
}

impl Selector {
    pub(crate) fn new(mtype: i64, flags: MsgFlags) -> Self {
        match mtype {
            0 => Selector::Any,
            t if t < 0 => Selector::AtMost(t.unsigned_abs()),
            t if flags.contains(MsgFlags::EXCEPT) => Selector::Except(t),
            t => Selector::Exact(t),
        }
    }

    pub(crate) fn matches(&self, message: &Message) -> bool {
        match *self {
            Selector::Any => true,
            Selector::Exact(t) => message.mtype == t,
            Selector::Except(t) => message.mtype != t,
            Selector::AtMost(bound) => u64::try_from(message.mtype).is_ok_and(|t| t <= bound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(mtype: i64) -> Message {
        Message::new(mtype, Vec::new())
    }

    #[test]
    fn negative_type_is_an_upper_bound() {
        let sel = Selector::new(-10, MsgFlags::empty());
        assert!(sel.matches(&msg(1)));
        assert!(sel.matches(&msg(10)));
        assert!(!sel.matches(&msg(11)));
        assert!(!sel.matches(&msg(-1)));
    }

    #[test]
    fn widest_bound_takes_every_positive_type() {
        let sel = Selector::new(i64::MIN, MsgFlags::empty());
        assert_eq!(sel, Selector::AtMost(1 << 63));
        assert!(sel.matches(&msg(i64::MAX)));
        assert!(sel.matches(&msg(1)));
    }

    #[test]
    fn except_only_applies_to_positive_types() {
        assert_eq!(Selector::new(0, MsgFlags::EXCEPT), Selector::Any);
        assert_eq!(Selector::new(-3, MsgFlags::EXCEPT), Selector::AtMost(3));
        let sel = Selector::new(4, MsgFlags::EXCEPT);
        assert!(!sel.matches(&msg(4)));
        assert!(sel.matches(&msg(5)));
    }

    #[test]
    fn most_negative_type_matches_everything() {
        let sel = Selector::new(i64::MIN, MsgFlags::empty());
        assert!(sel.matches(&msg(i64::MAX)));
    }
}
