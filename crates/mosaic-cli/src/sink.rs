//! JSON-lines transport adapter.
//!
//! Each topic gets a bounded queue of its configured depth and a writer
//! task draining it into a shared output. `send` never waits: when a
//! queue is full the message is dropped and counted, the same trade-off a
//! ROS publisher makes when its queue overflows.

use std::collections::HashMap;
use std::io;
use std::sync::Arc;

use mosaic_buffers::{PublishConfig, TransportSink};
use mosaic_msgs::{Message, Quantity};
use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;
use tracing::warn;

/// One output line: the topic plus the message body.
#[derive(Serialize)]
struct Envelope<'a, M> {
    topic: &'a str,
    latch: bool,
    msg: &'a M,
}

struct TopicQueue {
    tx: mpsc::Sender<String>,
    latch: bool,
    last: Option<String>,
    dropped: u64,
}

/// [`TransportSink`] that writes every delivered message as one JSON line.
pub struct JsonLinesSink {
    queues: HashMap<String, TopicQueue>,
}

impl JsonLinesSink {
    /// Create the sink and one writer task per enabled topic.
    ///
    /// The writers finish once the sink is dropped and their queues are
    /// drained; join the returned set to flush everything.
    pub fn spawn<W>(config: &PublishConfig, out: W) -> (Self, JoinSet<io::Result<()>>)
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let out = Arc::new(Mutex::new(out));
        let mut writers = JoinSet::new();
        let mut queues = HashMap::new();

        for quantity in Quantity::ALL {
            let topic = config.topic(quantity);
            if !topic.enabled {
                continue;
            }
            let (tx, mut rx) = mpsc::channel::<String>(topic.queue_depth.max(1));
            let out = Arc::clone(&out);
            writers.spawn(async move {
                while let Some(line) = rx.recv().await {
                    let mut out = out.lock().await;
                    out.write_all(line.as_bytes()).await?;
                    out.write_all(b"\n").await?;
                }
                out.lock().await.flush().await
            });
            queues.insert(
                topic.topic.clone(),
                TopicQueue {
                    tx,
                    latch: topic.latch,
                    last: None,
                    dropped: 0,
                },
            );
        }

        (Self { queues }, writers)
    }

    /// Messages dropped on `topic` because its queue was full.
    #[must_use]
    pub fn dropped(&self, topic: &str) -> u64 {
        self.queues.get(topic).map_or(0, |q| q.dropped)
    }

    /// Last line sent on a latched topic.
    #[must_use]
    pub fn latched(&self, topic: &str) -> Option<&str> {
        self.queues.get(topic).and_then(|q| q.last.as_deref())
    }
}

impl TransportSink for JsonLinesSink {
    fn send<M: Message>(&mut self, topic: &str, value: &M) {
        let Some(queue) = self.queues.get_mut(topic) else {
            warn!(topic, "no queue for topic, message dropped");
            return;
        };

        let envelope = Envelope {
            topic,
            latch: queue.latch,
            msg: value,
        };
        let line = match serde_json::to_string(&envelope) {
            Ok(line) => line,
            Err(err) => {
                warn!(topic, %err, "failed to serialize message");
                return;
            }
        };

        if queue.latch {
            queue.last = Some(line.clone());
        }
        match queue.tx.try_send(line) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                queue.dropped += 1;
                warn!(topic, dropped = queue.dropped, "topic queue full, message dropped");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                queue.dropped += 1;
                warn!(topic, "topic writer stopped, message dropped");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mosaic_msgs::{NmeaSentence, TimeReference};
    use tokio::io::AsyncReadExt;

    fn sentence(text: &str) -> NmeaSentence {
        NmeaSentence {
            sentence: text.to_owned(),
            ..NmeaSentence::default()
        }
    }

    async fn finish(
        sink: JsonLinesSink,
        mut writers: JoinSet<io::Result<()>>,
        mut rx: tokio::io::DuplexStream,
    ) -> String {
        drop(sink);
        while let Some(res) = writers.join_next().await {
            res.unwrap().unwrap();
        }
        let mut out = String::new();
        rx.read_to_string(&mut out).await.unwrap();
        out
    }

    #[tokio::test]
    async fn writes_one_json_line_per_message() {
        let (tx, rx) = tokio::io::duplex(64 * 1024);
        let (mut sink, writers) = JsonLinesSink::spawn(&PublishConfig::default(), tx);

        sink.send("nmea_sentence", &sentence("$GPGGA"));
        sink.send("time_reference", &TimeReference::default());

        let out = finish(sink, writers, rx).await;
        let lines: Vec<serde_json::Value> = out
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        let nmea = lines
            .iter()
            .find(|l| l["topic"] == "nmea_sentence")
            .unwrap();
        assert_eq!(nmea["msg"]["sentence"], "$GPGGA");
        assert_eq!(nmea["latch"], false);
    }

    #[tokio::test]
    async fn full_queue_drops_and_counts() {
        let mut config = PublishConfig::default();
        config.nmea_sentence.queue_depth = 1;
        let (tx, rx) = tokio::io::duplex(64 * 1024);
        let (mut sink, writers) = JsonLinesSink::spawn(&config, tx);

        // The writer task cannot run until this test yields.
        sink.send("nmea_sentence", &sentence("$A"));
        sink.send("nmea_sentence", &sentence("$B"));
        sink.send("nmea_sentence", &sentence("$C"));
        assert_eq!(sink.dropped("nmea_sentence"), 2);

        let out = finish(sink, writers, rx).await;
        assert_eq!(out.lines().count(), 1);
        assert!(out.contains("$A"));
    }

    #[tokio::test]
    async fn latched_topic_keeps_last_line() {
        let mut config = PublishConfig::default();
        config.nmea_sentence.latch = true;
        let (tx, rx) = tokio::io::duplex(64 * 1024);
        let (mut sink, writers) = JsonLinesSink::spawn(&config, tx);

        sink.send("nmea_sentence", &sentence("$FIRST"));
        sink.send("nmea_sentence", &sentence("$SECOND"));
        let latched = sink.latched("nmea_sentence").unwrap();
        assert!(latched.contains("$SECOND"));
        assert!(latched.contains("\"latch\":true"));
        assert_eq!(sink.latched("time_reference"), None);

        finish(sink, writers, rx).await;
    }

    #[tokio::test]
    async fn disabled_topics_get_no_queue() {
        let mut config = PublishConfig::default();
        config.pose.enabled = false;
        let (tx, rx) = tokio::io::duplex(1024);
        let (mut sink, writers) = JsonLinesSink::spawn(&config, tx);

        sink.send("pose", &mosaic_msgs::PoseWithCovarianceStamped::default());
        assert_eq!(writers.len(), 4);

        let out = finish(sink, writers, rx).await;
        assert!(out.is_empty());
    }
}
