use mosaic_msgs::Quantity;

/// Publishing settings for one quantity.
///
/// ```text
/// ┌─────────────┬─────────────────────────────────────────────────────┐
/// │ Field       │ Purpose                                             │
/// ├─────────────┼─────────────────────────────────────────────────────┤
/// │ enabled     │ Mailbox accepts commits                             │
/// │ topic       │ Transport identifier passed to the sink             │
/// │ queue_depth │ Outgoing queue length for adapters that buffer      │
/// │ latch       │ Replay the last value to late subscribers           │
/// └─────────────┴─────────────────────────────────────────────────────┘
/// ```
///
/// Only `enabled` and `topic` are read by the mailboxes themselves.
/// `queue_depth` and `latch` are carried for the transport adapter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopicConfig {
    pub enabled: bool,
    pub topic: String,
    pub queue_depth: usize,
    pub latch: bool,
}

/// Queue depth used when none is configured.
pub const DEFAULT_QUEUE_DEPTH: usize = 10;

impl TopicConfig {
    /// Defaults for `quantity`: enabled, default topic name, depth 10,
    /// not latched.
    #[must_use]
    pub fn for_quantity(quantity: Quantity) -> Self {
        Self {
            enabled: true,
            topic: quantity.default_topic().to_owned(),
            queue_depth: DEFAULT_QUEUE_DEPTH,
            latch: false,
        }
    }
}

/// Publishing settings for the whole mailbox set.
///
/// Built in code or from command-line flags; there is no file format.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublishConfig {
    /// Frame id producers write into message headers.
    pub frame_id: String,
    pub nav_sat_fix: TopicConfig,
    pub pose: TopicConfig,
    pub velocity: TopicConfig,
    pub nmea_sentence: TopicConfig,
    pub time_reference: TopicConfig,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            frame_id: "gnss".to_owned(),
            nav_sat_fix: TopicConfig::for_quantity(Quantity::NavSatFix),
            pose: TopicConfig::for_quantity(Quantity::Pose),
            velocity: TopicConfig::for_quantity(Quantity::Velocity),
            nmea_sentence: TopicConfig::for_quantity(Quantity::NmeaSentence),
            time_reference: TopicConfig::for_quantity(Quantity::TimeReference),
        }
    }
}

impl PublishConfig {
    #[must_use]
    pub fn topic(&self, quantity: Quantity) -> &TopicConfig {
        match quantity {
            Quantity::NavSatFix => &self.nav_sat_fix,
            Quantity::Pose => &self.pose,
            Quantity::Velocity => &self.velocity,
            Quantity::NmeaSentence => &self.nmea_sentence,
            Quantity::TimeReference => &self.time_reference,
        }
    }

    pub fn topic_mut(&mut self, quantity: Quantity) -> &mut TopicConfig {
        match quantity {
            Quantity::NavSatFix => &mut self.nav_sat_fix,
            Quantity::Pose => &mut self.pose,
            Quantity::Velocity => &mut self.velocity,
            Quantity::NmeaSentence => &mut self.nmea_sentence,
            Quantity::TimeReference => &mut self.time_reference,
        }
    }

    /// Find the quantity published under `topic`.
    #[must_use]
    pub fn quantity_for_topic(&self, topic: &str) -> Option<Quantity> {
        Quantity::ALL
            .into_iter()
            .find(|&q| self.topic(q).topic == topic)
    }
}
