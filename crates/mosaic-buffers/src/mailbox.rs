use mosaic_msgs::Message;
use tracing::{debug, trace};

use crate::sink::TransportSink;

/// Per-mailbox counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MailboxStats {
    /// Commits accepted while enabled.
    pub committed: u64,
    /// Pending values replaced before anyone took them.
    pub overwritten: u64,
    /// Commits refused because the mailbox was disabled.
    pub discarded: u64,
    /// Values handed to a sink by [`RecyclingMailbox::deliver`].
    pub delivered: u64,
    /// Fresh `Box` allocations made by [`RecyclingMailbox::acquire`].
    pub allocations: u64,
}

/// Single-slot mailbox that reuses message storage.
///
/// Holds at most one *pending* value (committed, not yet taken) and at most
/// one *recycle* slot (storage with no meaningful contents, kept so the next
/// [`acquire`](Self::acquire) does not allocate).
///
/// ```text
/// ┌──────────────┬──────────────────────────────────────────────────────┐
/// │ Operation    │ Effect                                               │
/// ├──────────────┼──────────────────────────────────────────────────────┤
/// │ acquire      │ recycle slot → caller, or allocate                   │
/// │ commit       │ enabled: old pending → recycle, value → pending      │
/// │              │ disabled: value → recycle (if empty), never pending  │
/// │ take         │ pending → caller                                     │
/// │ recycle      │ caller → recycle slot (if empty)                     │
/// └──────────────┴──────────────────────────────────────────────────────┘
/// ```
///
/// Commits overwrite rather than queue: a consumer that falls behind sees
/// only the latest value. Every operation is O(1) and never blocks.
///
/// Values move in and out as `Box<T>`, so each allocation has exactly one
/// owner at a time: the mailbox, or whoever holds the box.
#[derive(Debug)]
pub struct RecyclingMailbox<T> {
    pending: Option<Box<T>>,
    recycle: Option<Box<T>>,
    enabled: bool,
    topic: String,
    next_seq: u32,
    stats: MailboxStats,
}

impl<T> RecyclingMailbox<T> {
    /// Create an empty mailbox. No storage is allocated until the first
    /// [`acquire`](Self::acquire).
    pub fn new(topic: impl Into<String>, enabled: bool) -> Self {
        Self {
            pending: None,
            recycle: None,
            enabled,
            topic: topic.into(),
            next_seq: 0,
            stats: MailboxStats::default(),
        }
    }

    /// Hand `value` to the mailbox.
    ///
    /// When enabled, `value` becomes the pending value and any previous
    /// pending value is demoted to the recycle slot without being
    /// delivered. When disabled, `value` never becomes visible to
    /// [`take`](Self::take), not even after the mailbox is re-enabled; its
    /// storage is kept for reuse if the recycle slot is free.
    pub fn commit(&mut self, value: Box<T>) {
        if !self.enabled {
            self.stats.discarded += 1;
            trace!(topic = %self.topic, "mailbox disabled, sample discarded");
            self.recycle(value);
            return;
        }

        if let Some(old) = self.pending.replace(value) {
            self.stats.overwritten += 1;
            trace!(topic = %self.topic, "undelivered sample overwritten");
            self.recycle = Some(old);
        }
        self.stats.committed += 1;
    }

    /// Remove and return the pending value, if any. The recycle slot is
    /// left alone.
    pub fn take(&mut self) -> Option<Box<T>> {
        self.pending.take()
    }

    /// Return storage the caller no longer needs.
    ///
    /// Fills the recycle slot if it is empty; otherwise the box is dropped.
    pub fn recycle(&mut self, value: Box<T>) {
        if self.recycle.is_none() {
            self.recycle = Some(value);
        }
    }

    /// Gate future commits. A value that is already pending stays pending.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Transport identifier values from this mailbox are sent under.
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    #[must_use]
    pub fn stats(&self) -> MailboxStats {
        self.stats
    }
}

impl<T: Default> RecyclingMailbox<T> {
    /// Get storage to fill for the next commit.
    ///
    /// Returns the recycled box when there is one, otherwise allocates
    /// `T::default()`. A recycled value still holds whatever an earlier
    /// producer wrote into it: set every field you rely on.
    pub fn acquire(&mut self) -> Box<T> {
        if let Some(reused) = self.recycle.take() {
            return reused;
        }
        self.stats.allocations += 1;
        Box::<T>::default()
    }
}

impl<M: Message> RecyclingMailbox<M> {
    /// Take the pending value, send it, and keep its storage.
    ///
    /// The header's `seq` is stamped with a per-mailbox counter just before
    /// sending. Returns `true` if something was delivered.
    pub fn deliver<S: TransportSink>(&mut self, sink: &mut S) -> bool {
        let Some(mut value) = self.take() else {
            return false;
        };

        value.header_mut().seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);

        sink.send(&self.topic, &*value);
        self.stats.delivered += 1;
        debug!(topic = %self.topic, seq = value.header().seq, "delivered");

        self.recycle(value);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::CollectingSink;
    use mosaic_msgs::NmeaSentence;
    use tracing_test::traced_test;

    fn mailbox() -> RecyclingMailbox<u32> {
        RecyclingMailbox::new("test", true)
    }

    fn commit_value(mb: &mut RecyclingMailbox<u32>, v: u32) {
        let mut slot = mb.acquire();
        *slot = v;
        mb.commit(slot);
    }

    #[test]
    fn take_on_fresh_mailbox_is_empty() {
        let mut mb = mailbox();
        assert!(mb.take().is_none());
        assert!(!mb.has_pending());
    }

    #[test]
    fn take_returns_committed_value_once() {
        let mut mb = mailbox();
        commit_value(&mut mb, 42);
        assert!(mb.has_pending());
        assert_eq!(mb.take().as_deref(), Some(&42));
        assert!(mb.take().is_none());
    }

    #[test]
    fn last_write_wins() {
        for n in 1..=5 {
            let mut mb = mailbox();
            for v in 1..=n {
                commit_value(&mut mb, v);
            }
            assert_eq!(mb.take().as_deref(), Some(&n));
            assert!(mb.take().is_none());
        }
    }

    #[test]
    fn overwrite_demotes_pending_to_recycle() {
        let mut mb = mailbox();
        let first = mb.acquire();
        let first_ptr: *const u32 = &*first;
        mb.commit(first);
        commit_value(&mut mb, 2);

        // The overwritten box is the next one handed out.
        let reused = mb.acquire();
        assert!(std::ptr::eq(&*reused, first_ptr));
        assert_eq!(mb.stats().overwritten, 1);
    }

    #[test]
    fn acquire_allocates_default_when_nothing_to_recycle() {
        let mut mb: RecyclingMailbox<Vec<u8>> = RecyclingMailbox::new("v", true);
        assert!(mb.acquire().is_empty());
        assert_eq!(mb.stats().allocations, 1);
    }

    #[test]
    fn reused_storage_is_not_cleared() {
        let mut mb: RecyclingMailbox<Vec<u8>> = RecyclingMailbox::new("v", true);
        let mut slot = mb.acquire();
        slot.extend_from_slice(b"old");
        mb.commit(slot);
        mb.commit(Box::default());

        let reused = mb.acquire();
        assert_eq!(reused.as_slice(), b"old");
    }

    #[test]
    fn steady_state_reuses_one_allocation() {
        let mut mb: RecyclingMailbox<NmeaSentence> = RecyclingMailbox::new("nmea", true);
        let mut sink = CollectingSink::default();

        let mut first_ptr = None;
        for i in 0..10 {
            let mut msg = mb.acquire();
            let ptr: *const NmeaSentence = &*msg;
            match first_ptr {
                None => first_ptr = Some(ptr),
                Some(p) => assert!(std::ptr::eq(p, ptr), "cycle {i} allocated"),
            }
            msg.sentence = format!("$GPZDA,{i}");
            mb.commit(msg);
            assert!(mb.deliver(&mut sink));
        }

        assert_eq!(mb.stats().allocations, 1);
        assert_eq!(sink.len(), 10);
    }

    #[test]
    fn disabled_commit_is_never_observed() {
        let mut mb = mailbox();
        mb.set_enabled(false);
        commit_value(&mut mb, 7);
        assert!(mb.take().is_none());

        mb.set_enabled(true);
        assert!(mb.take().is_none());
        assert_eq!(mb.stats().discarded, 1);
        assert_eq!(mb.stats().committed, 0);
    }

    #[test]
    fn disabled_commit_storage_is_recyclable() {
        let mut mb = mailbox();
        mb.set_enabled(false);
        let slot = mb.acquire();
        let ptr: *const u32 = &*slot;
        mb.commit(slot);

        let again = mb.acquire();
        assert!(std::ptr::eq(&*again, ptr));
        assert_eq!(mb.stats().allocations, 1);
    }

    #[test]
    fn disable_keeps_already_pending_value() {
        let mut mb = mailbox();
        commit_value(&mut mb, 1);
        mb.set_enabled(false);
        commit_value(&mut mb, 2);
        assert_eq!(mb.take().as_deref(), Some(&1));
    }

    #[test]
    fn take_does_not_touch_recycle_slot() {
        let mut mb = mailbox();
        commit_value(&mut mb, 1);
        commit_value(&mut mb, 2);
        let taken = mb.take().unwrap();

        // Recycle slot still holds the overwritten box, so this does not
        // allocate.
        let before = mb.stats().allocations;
        let _ = mb.acquire();
        assert_eq!(mb.stats().allocations, before);
        assert_eq!(*taken, 2);
    }

    #[test]
    fn recycle_keeps_only_one_spare() {
        let mut mb = mailbox();
        mb.recycle(Box::new(1));
        mb.recycle(Box::new(2));
        assert_eq!(*mb.acquire(), 1);
        assert_eq!(mb.stats().allocations, 0);
        assert_eq!(*mb.acquire(), 0);
        assert_eq!(mb.stats().allocations, 1);
    }

    #[test]
    fn deliver_stamps_sequence_numbers() {
        let mut mb: RecyclingMailbox<NmeaSentence> = RecyclingMailbox::new("nmea", true);
        let mut sink = CollectingSink::default();

        for _ in 0..3 {
            let msg = mb.acquire();
            mb.commit(msg);
            mb.deliver(&mut sink);
        }

        let seqs: Vec<u32> = sink
            .deliveries()
            .iter()
            .map(|d| d.value::<NmeaSentence>().unwrap().header.seq)
            .collect();
        assert_eq!(seqs, vec![0, 1, 2]);
        assert!(sink.deliveries().iter().all(|d| d.topic == "nmea"));
    }

    #[test]
    fn deliver_on_empty_mailbox_sends_nothing() {
        let mut mb: RecyclingMailbox<NmeaSentence> = RecyclingMailbox::new("nmea", true);
        let mut sink = CollectingSink::default();
        assert!(!mb.deliver(&mut sink));
        assert!(sink.is_empty());
        assert_eq!(mb.stats().delivered, 0);
    }

    #[traced_test]
    #[test]
    fn overwrite_and_discard_are_traced() {
        let mut mb = mailbox();
        commit_value(&mut mb, 1);
        commit_value(&mut mb, 2);
        assert!(logs_contain("undelivered sample overwritten"));

        mb.set_enabled(false);
        commit_value(&mut mb, 3);
        assert!(logs_contain("sample discarded"));
    }
}
