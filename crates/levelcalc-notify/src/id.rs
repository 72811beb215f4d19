use slotmap::new_key_type;

new_key_type! {
    /// A one-shot platform timer handed out by a [`crate::host::TimerHost`].
    pub struct TimerId;

    /// One armed reminder. Goes stale once its class is re-armed.
    pub struct ReminderId;
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn removed_keys_do_not_resolve() {
        let mut sm: SlotMap<ReminderId, u32> = SlotMap::with_key();
        let a = sm.insert(1);
        sm.remove(a);
        let b = sm.insert(2);
        assert_ne!(a, b);
        assert!(sm.get(a).is_none());
    }
}
