/// Implementation of `mosaic replay`.
///
/// Two tasks share one mailbox set behind a mutex:
///
/// ```text
///   capture ─▶ StreamingReader ─▶ FrameDispatcher ──commit──▶ ┌─────────────┐
///                  (producer task)                           │ DataBuffers │
///   stdout ◀── JsonLinesSink ◀──deliver_all── interval ◀──── └─────────────┘
///                  (publisher task)
/// ```
///
/// The producer never waits on the publisher: a sample that is not
/// delivered before the next one of the same quantity arrives is
/// overwritten. When the capture is exhausted the publisher does one last
/// delivery, the writers flush, and per-quantity counters are printed to
/// stderr.
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use mosaic_buffers::{DataBuffers, PublishConfig};
use mosaic_decoder::{DecodeError, FrameDispatcher, SplitStats, StreamingReader};
use mosaic_msgs::{Quantity, Time};
use tokio::sync::oneshot;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::ReplayArgs;
use crate::sink::JsonLinesSink;

impl ReplayArgs {
    /// Publishing settings implied by the command-line flags.
    pub fn publish_config(&self) -> PublishConfig {
        let mut config = PublishConfig {
            frame_id: self.frame_id.clone(),
            ..PublishConfig::default()
        };
        for quantity in Quantity::ALL {
            let topic = config.topic_mut(quantity);
            topic.queue_depth = self.queue_depth;
            topic.latch = self.latch;
        }
        for &quantity in &self.disable {
            config.topic_mut(quantity).enabled = false;
        }
        config
    }
}

/// Run the `mosaic replay` command.
///
/// # Errors
///
/// Returns an error if the runtime cannot start, the capture cannot be
/// opened or read, or stdout fails.
pub fn run(args: &ReplayArgs) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(replay(args))
}

fn lock(buffers: &Mutex<DataBuffers>) -> Result<MutexGuard<'_, DataBuffers>> {
    buffers
        .lock()
        .map_err(|_| anyhow!("mailbox lock poisoned by a panicked task"))
}

async fn replay(args: &ReplayArgs) -> Result<()> {
    let file = tokio::fs::File::open(&args.file)
        .await
        .with_context(|| format!("cannot open {}", args.file.display()))?;

    let config = args.publish_config();
    let buffers = Arc::new(Mutex::new(DataBuffers::new(&config)));
    let (mut sink, mut writers) = JsonLinesSink::spawn(&config, tokio::io::stdout());
    let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

    let publisher = {
        let buffers = Arc::clone(&buffers);
        let rate = Duration::from_millis(args.rate_ms.max(1));
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(rate);
            tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = tick.tick() => {
                        lock(&buffers)?.deliver_all(&mut sink);
                    }
                    _ = &mut stop_rx => {
                        let sent = lock(&buffers)?.deliver_all(&mut sink);
                        debug!(sent, "final delivery");
                        break;
                    }
                }
            }
            Ok::<_, anyhow::Error>(sink)
        })
    };

    let producer = {
        let buffers = Arc::clone(&buffers);
        let dispatcher = FrameDispatcher::new(config.frame_id.clone());
        let delay = Duration::from_millis(args.frame_delay_ms);
        tokio::spawn(async move {
            let mut reader = StreamingReader::new(file);
            while let Some(frame) = reader.next_frame().await {
                let frame = frame?;
                {
                    let mut buffers = lock(&buffers)?;
                    let dispatched = frame
                        .as_frame()
                        .map_err(DecodeError::from)
                        .and_then(|f| dispatcher.dispatch(&f, Time::now(), &mut buffers));
                    if let Err(err) = dispatched {
                        warn!(%err, "frame not dispatched");
                    }
                }
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
            Ok::<SplitStats, anyhow::Error>(reader.stats())
        })
    };

    let split = producer.await.context("producer task panicked")?;
    // Stop the publisher whether or not the producer succeeded.
    let _ = stop_tx.send(());
    let sink = publisher.await.context("publisher task panicked")??;
    let split = split.context("failed reading capture")?;

    let dropped: Vec<u64> = Quantity::ALL
        .iter()
        .map(|&q| sink.dropped(config.topic(q).topic.as_str()))
        .collect();
    drop(sink);
    while let Some(res) = writers.join_next().await {
        res.context("writer task panicked")?
            .context("failed writing to stdout")?;
    }

    info!(
        sbf = split.sbf_blocks,
        nmea = split.nmea_sentences,
        "capture replayed"
    );
    print_stats(&*lock(&buffers)?, &split, &dropped);
    Ok(())
}

fn print_stats(buffers: &DataBuffers, split: &SplitStats, dropped: &[u64]) {
    eprintln!(
        "frames: {} SBF, {} NMEA, {} CRC errors, {} bytes skipped",
        split.sbf_blocks, split.nmea_sentences, split.crc_errors, split.skipped_bytes
    );
    eprintln!();

    let sep = "─".repeat(76);
    eprintln!(
        "{:<16}{:>8}{:>10}{:>12}{:>11}{:>10}{:>9}",
        "Topic", "Enabled", "Committed", "Overwritten", "Discarded", "Delivered", "Dropped"
    );
    eprintln!("{sep}");
    for (quantity, dropped) in Quantity::ALL.into_iter().zip(dropped) {
        let stats = buffers.stats(quantity);
        let enabled = if buffers.is_enabled(quantity) { "yes" } else { "no" };
        eprintln!(
            "{:<16}{enabled:>8}{:>10}{:>12}{:>11}{:>10}{dropped:>9}",
            buffers.topic(quantity),
            stats.committed,
            stats.overwritten,
            stats.discarded,
            stats.delivered,
        );
    }
}
