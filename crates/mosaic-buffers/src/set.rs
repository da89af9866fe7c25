use mosaic_msgs::{
    NavSatFix, NmeaSentence, PoseWithCovarianceStamped, Quantity, TimeReference,
    TwistWithCovarianceStamped,
};
use tracing::debug;

use crate::config::PublishConfig;
use crate::mailbox::{MailboxStats, RecyclingMailbox};
use crate::sink::TransportSink;

/// One mailbox per published quantity.
///
/// Producers reach the mailboxes through the public fields; the publisher
/// calls [`deliver_all`](Self::deliver_all) on its own schedule.
#[derive(Debug)]
pub struct DataBuffers {
    pub nav_sat_fix: RecyclingMailbox<NavSatFix>,
    pub pose: RecyclingMailbox<PoseWithCovarianceStamped>,
    pub velocity: RecyclingMailbox<TwistWithCovarianceStamped>,
    pub nmea_sentence: RecyclingMailbox<NmeaSentence>,
    pub time_reference: RecyclingMailbox<TimeReference>,
}

/// Run `$body` with `$mb` bound to the mailbox for `$quantity`.
macro_rules! with_mailbox {
    ($set:expr, $quantity:expr, |$mb:ident| $body:expr) => {
        match $quantity {
            Quantity::NavSatFix => {
                let $mb = &$set.nav_sat_fix;
                $body
            }
            Quantity::Pose => {
                let $mb = &$set.pose;
                $body
            }
            Quantity::Velocity => {
                let $mb = &$set.velocity;
                $body
            }
            Quantity::NmeaSentence => {
                let $mb = &$set.nmea_sentence;
                $body
            }
            Quantity::TimeReference => {
                let $mb = &$set.time_reference;
                $body
            }
        }
    };
}

impl DataBuffers {
    /// Create the set with each mailbox's topic and enabled flag taken from
    /// `config`.
    #[must_use]
    pub fn new(config: &PublishConfig) -> Self {
        let mailbox = |quantity: Quantity| {
            let topic = config.topic(quantity);
            (topic.topic.clone(), topic.enabled)
        };
        let (fix_topic, fix_on) = mailbox(Quantity::NavSatFix);
        let (pose_topic, pose_on) = mailbox(Quantity::Pose);
        let (vel_topic, vel_on) = mailbox(Quantity::Velocity);
        let (nmea_topic, nmea_on) = mailbox(Quantity::NmeaSentence);
        let (time_topic, time_on) = mailbox(Quantity::TimeReference);

        Self {
            nav_sat_fix: RecyclingMailbox::new(fix_topic, fix_on),
            pose: RecyclingMailbox::new(pose_topic, pose_on),
            velocity: RecyclingMailbox::new(vel_topic, vel_on),
            nmea_sentence: RecyclingMailbox::new(nmea_topic, nmea_on),
            time_reference: RecyclingMailbox::new(time_topic, time_on),
        }
    }

    /// Deliver every pending value to `sink`.
    ///
    /// Each quantity is sent at most once per call, and only if something
    /// was committed since the previous call. Returns how many values were
    /// sent.
    pub fn deliver_all<S: TransportSink>(&mut self, sink: &mut S) -> usize {
        let sent = [
            self.nav_sat_fix.deliver(sink),
            self.pose.deliver(sink),
            self.velocity.deliver(sink),
            self.nmea_sentence.deliver(sink),
            self.time_reference.deliver(sink),
        ]
        .into_iter()
        .filter(|&delivered| delivered)
        .count();

        if sent > 0 {
            debug!(sent, "delivered pending samples");
        }
        sent
    }

    pub fn set_enabled(&mut self, quantity: Quantity, enabled: bool) {
        match quantity {
            Quantity::NavSatFix => self.nav_sat_fix.set_enabled(enabled),
            Quantity::Pose => self.pose.set_enabled(enabled),
            Quantity::Velocity => self.velocity.set_enabled(enabled),
            Quantity::NmeaSentence => self.nmea_sentence.set_enabled(enabled),
            Quantity::TimeReference => self.time_reference.set_enabled(enabled),
        }
    }

    #[must_use]
    pub fn is_enabled(&self, quantity: Quantity) -> bool {
        with_mailbox!(self, quantity, |mb| mb.is_enabled())
    }

    #[must_use]
    pub fn has_pending(&self, quantity: Quantity) -> bool {
        with_mailbox!(self, quantity, |mb| mb.has_pending())
    }

    #[must_use]
    pub fn topic(&self, quantity: Quantity) -> &str {
        with_mailbox!(self, quantity, |mb| mb.topic())
    }

    #[must_use]
    pub fn stats(&self, quantity: Quantity) -> MailboxStats {
        with_mailbox!(self, quantity, |mb| mb.stats())
    }
}

impl Default for DataBuffers {
    fn default() -> Self {
        Self::new(&PublishConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::CollectingSink;

    fn commit_fix(buffers: &mut DataBuffers, latitude: f64) {
        let mut fix = buffers.nav_sat_fix.acquire();
        fix.latitude = latitude;
        buffers.nav_sat_fix.commit(fix);
    }

    #[test]
    fn deliver_all_on_empty_set_sends_nothing() {
        let mut buffers = DataBuffers::default();
        let mut sink = CollectingSink::default();
        assert_eq!(buffers.deliver_all(&mut sink), 0);
        assert!(sink.is_empty());
    }

    #[test]
    fn each_quantity_at_most_once_per_call() {
        let mut buffers = DataBuffers::default();
        commit_fix(&mut buffers, 1.0);
        commit_fix(&mut buffers, 2.0);
        let msg = buffers.nmea_sentence.acquire();
        buffers.nmea_sentence.commit(msg);

        let mut sink = CollectingSink::default();
        assert_eq!(buffers.deliver_all(&mut sink), 2);
        assert_eq!(sink.count(Quantity::NavSatFix), 1);
        assert_eq!(sink.count(Quantity::NmeaSentence), 1);

        let fix = sink.deliveries()[0].value::<NavSatFix>().unwrap();
        assert_eq!(fix.latitude, 2.0);
    }

    #[test]
    fn never_redelivers() {
        let mut buffers = DataBuffers::default();
        commit_fix(&mut buffers, 1.0);

        let mut sink = CollectingSink::default();
        buffers.deliver_all(&mut sink);
        buffers.deliver_all(&mut sink);
        buffers.deliver_all(&mut sink);
        assert_eq!(sink.len(), 1);

        commit_fix(&mut buffers, 3.0);
        buffers.deliver_all(&mut sink);
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn delivery_order_and_topics_follow_config() {
        let mut config = PublishConfig::default();
        config.topic_mut(Quantity::TimeReference).topic = "gps_time".into();
        let mut buffers = DataBuffers::new(&config);

        let t = buffers.time_reference.acquire();
        buffers.time_reference.commit(t);
        let p = buffers.pose.acquire();
        buffers.pose.commit(p);

        let mut sink = CollectingSink::default();
        buffers.deliver_all(&mut sink);
        let topics: Vec<&str> = sink.deliveries().iter().map(|d| d.topic.as_str()).collect();
        assert_eq!(topics, vec!["pose", "gps_time"]);
    }

    #[test]
    fn config_disables_mailbox() {
        let mut config = PublishConfig::default();
        config.topic_mut(Quantity::Pose).enabled = false;
        let mut buffers = DataBuffers::new(&config);
        assert!(!buffers.is_enabled(Quantity::Pose));
        assert!(buffers.is_enabled(Quantity::Velocity));

        let p = buffers.pose.acquire();
        buffers.pose.commit(p);
        assert!(!buffers.has_pending(Quantity::Pose));
        assert_eq!(buffers.stats(Quantity::Pose).discarded, 1);
    }

    #[test]
    fn set_enabled_by_quantity() {
        let mut buffers = DataBuffers::default();
        buffers.set_enabled(Quantity::NmeaSentence, false);
        assert!(!buffers.nmea_sentence.is_enabled());
        assert_eq!(buffers.topic(Quantity::NmeaSentence), "nmea_sentence");
        buffers.set_enabled(Quantity::NmeaSentence, true);
        assert!(buffers.is_enabled(Quantity::NmeaSentence));
    }
}
