use mosaic_buffers::DataBuffers;
use mosaic_msgs::{NavSatFix, NavSatStatus, Quantity, Time};
use mosaic_wire::SbfBlock;
use mosaic_wire::block_id::block_number;
use tracing::trace;

use crate::blocks::{PvtGeodetic, PvtMode};
use crate::error::DecodeError;
use crate::splitter::Frame;

/// Turns frames into messages and commits them to the mailbox set.
///
/// ```text
/// ┌──────────────────────────────┬──────────────────────────────────┐
/// │ Frame                        │ Commits                          │
/// ├──────────────────────────────┼──────────────────────────────────┤
/// │ NMEA sentence                │ NmeaSentence                     │
/// │ SBF block, valid time stamp  │ TimeReference                    │
/// │ PVTGeodetic (4007)           │ NavSatFix (plus TimeReference)   │
/// │ anything else                │ nothing                          │
/// └──────────────────────────────┴──────────────────────────────────┘
/// ```
///
/// Storage comes from each mailbox's `acquire`, so once every mailbox has
/// cycled once the dispatcher stops allocating, apart from string growth.
#[derive(Clone, Debug)]
pub struct FrameDispatcher {
    frame_id: String,
}

impl FrameDispatcher {
    #[must_use]
    pub fn new(frame_id: impl Into<String>) -> Self {
        Self {
            frame_id: frame_id.into(),
        }
    }

    #[must_use]
    pub fn frame_id(&self) -> &str {
        &self.frame_id
    }

    /// Commit whatever `frame` carries. `now` is the host time the frame
    /// was received and becomes every message's header stamp.
    ///
    /// Returns the quantities committed, in commit order.
    ///
    /// # Errors
    ///
    /// [`DecodeError::Wire`] if a recognised block is too short for its
    /// fields. Nothing is committed in that case.
    pub fn dispatch(
        &self,
        frame: &Frame<'_>,
        now: Time,
        buffers: &mut DataBuffers,
    ) -> Result<Vec<Quantity>, DecodeError> {
        match frame {
            Frame::Nmea(sentence) => {
                self.commit_sentence(sentence, now, buffers);
                Ok(vec![Quantity::NmeaSentence])
            }
            Frame::Sbf(block) => self.dispatch_block(block, now, buffers),
        }
    }

    fn dispatch_block(
        &self,
        block: &SbfBlock<'_>,
        now: Time,
        buffers: &mut DataBuffers,
    ) -> Result<Vec<Quantity>, DecodeError> {
        let pvt = match block.id().number() {
            block_number::PVT_GEODETIC => Some(PvtGeodetic::decode(block)?),
            _ => None,
        };

        let mut committed = Vec::new();
        let stamp = block.time_stamp();
        if let (Some(tow_ms), Some(wnc)) = (stamp.tow_ms, stamp.wnc) {
            let mut msg = buffers.time_reference.acquire();
            msg.header.stamp = now;
            msg.header.frame_id.clone_from(&self.frame_id);
            msg.time_ref = Time::from_gps(wnc, tow_ms);
            msg.source.clear();
            msg.source.push_str("gps");
            buffers.time_reference.commit(msg);
            committed.push(Quantity::TimeReference);
        } else {
            trace!(block = block.id().number(), "block without receiver time");
        }

        if let Some(pvt) = pvt {
            let mut fix = buffers.nav_sat_fix.acquire();
            fix.header.stamp = now;
            fix.header.frame_id.clone_from(&self.frame_id);
            fill_nav_sat_fix(&mut fix, &pvt);
            buffers.nav_sat_fix.commit(fix);
            committed.push(Quantity::NavSatFix);
        }

        Ok(committed)
    }

    fn commit_sentence(&self, sentence: &[u8], now: Time, buffers: &mut DataBuffers) {
        let mut msg = buffers.nmea_sentence.acquire();
        msg.header.stamp = now;
        msg.header.frame_id.clone_from(&self.frame_id);
        msg.sentence.clear();
        msg.sentence.push_str(&String::from_utf8_lossy(sentence));
        buffers.nmea_sentence.commit(msg);
    }
}

impl Default for FrameDispatcher {
    fn default() -> Self {
        Self::new("gnss")
    }
}

fn nav_sat_status(mode: PvtMode) -> i8 {
    match mode {
        PvtMode::NoPvt | PvtMode::Other(_) => NavSatStatus::STATUS_NO_FIX,
        PvtMode::Standalone | PvtMode::FixedLocation => NavSatStatus::STATUS_FIX,
        PvtMode::Sbas => NavSatStatus::STATUS_SBAS_FIX,
        PvtMode::Differential
        | PvtMode::RtkFixed
        | PvtMode::RtkFloat
        | PvtMode::MovingBaseRtkFixed
        | PvtMode::MovingBaseRtkFloat
        | PvtMode::Ppp => NavSatStatus::STATUS_GBAS_FIX,
    }
}

/// Overwrite every field of a possibly recycled fix.
fn fill_nav_sat_fix(fix: &mut NavSatFix, pvt: &PvtGeodetic) {
    fix.status.service = NavSatStatus::SERVICE_GPS;
    if !pvt.has_position() {
        fix.status.status = NavSatStatus::STATUS_NO_FIX;
        fix.latitude = f64::NAN;
        fix.longitude = f64::NAN;
        fix.altitude = f64::NAN;
        fix.position_covariance = [0.0; 9];
        fix.position_covariance_type = NavSatFix::COVARIANCE_TYPE_UNKNOWN;
        return;
    }

    fix.status.status = nav_sat_status(pvt.mode);
    fix.latitude = pvt.latitude.unwrap_or(f64::NAN).to_degrees();
    fix.longitude = pvt.longitude.unwrap_or(f64::NAN).to_degrees();
    fix.altitude = pvt.height.unwrap_or(f64::NAN);

    fix.position_covariance = [0.0; 9];
    match (pvt.h_accuracy_cm, pvt.v_accuracy_cm) {
        (Some(h), Some(v)) => {
            // Both accuracies are reported at roughly 2σ.
            let sigma_h = f64::from(h) / 200.0;
            let sigma_v = f64::from(v) / 200.0;
            fix.position_covariance[0] = sigma_h * sigma_h;
            fix.position_covariance[4] = sigma_h * sigma_h;
            fix.position_covariance[8] = sigma_v * sigma_v;
            fix.position_covariance_type = NavSatFix::COVARIANCE_TYPE_APPROXIMATED;
        }
        _ => fix.position_covariance_type = NavSatFix::COVARIANCE_TYPE_UNKNOWN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::{F64_DO_NOT_USE, encode_pvt_geodetic};
    use mosaic_buffers::CollectingSink;
    use mosaic_msgs::{NmeaSentence, TimeReference};
    use mosaic_wire::header::encode_block;
    use mosaic_wire::{BlockId, TimeStamp, validate_block};

    const NOW: Time = Time {
        secs: 1_700_000_000,
        nsecs: 5,
    };

    fn stamp(tow_ms: u32, wnc: u16) -> TimeStamp {
        TimeStamp {
            tow_ms: Some(tow_ms),
            wnc: Some(wnc),
        }
    }

    #[test]
    fn nmea_frame_commits_sentence() {
        let dispatcher = FrameDispatcher::new("antenna");
        let mut buffers = DataBuffers::default();

        let committed = dispatcher
            .dispatch(&Frame::Nmea(b"$GPGGA,1*00"), NOW, &mut buffers)
            .unwrap();
        assert_eq!(committed, vec![Quantity::NmeaSentence]);

        let msg = buffers.nmea_sentence.take().unwrap();
        assert_eq!(msg.sentence, "$GPGGA,1*00");
        assert_eq!(msg.header.frame_id, "antenna");
        assert_eq!(msg.header.stamp, NOW);
    }

    #[test]
    fn recycled_sentence_is_fully_overwritten() {
        let dispatcher = FrameDispatcher::default();
        let mut buffers = DataBuffers::default();
        let mut sink = CollectingSink::default();

        dispatcher
            .dispatch(&Frame::Nmea(b"$GPGGA,a-long-sentence"), NOW, &mut buffers)
            .unwrap();
        buffers.deliver_all(&mut sink);
        dispatcher
            .dispatch(&Frame::Nmea(b"$GPZDA"), NOW, &mut buffers)
            .unwrap();
        buffers.deliver_all(&mut sink);

        let last = sink.deliveries()[1].value::<NmeaSentence>().unwrap();
        assert_eq!(last.sentence, "$GPZDA");
        assert_eq!(buffers.stats(Quantity::NmeaSentence).allocations, 1);
    }

    #[test]
    fn timed_block_commits_time_reference() {
        let bytes = encode_block(BlockId::new(5914, 0), stamp(1_500, 2), &[0; 8]);
        let block = validate_block(&bytes).unwrap();
        let mut buffers = DataBuffers::default();

        let committed = FrameDispatcher::default()
            .dispatch(&Frame::Sbf(block), NOW, &mut buffers)
            .unwrap();
        assert_eq!(committed, vec![Quantity::TimeReference]);

        let mut sink = CollectingSink::default();
        buffers.deliver_all(&mut sink);
        let time = sink.deliveries()[0].value::<TimeReference>().unwrap();
        assert_eq!(time.time_ref, Time::from_gps(2, 1_500));
        assert_eq!(time.source, "gps");
        assert_eq!(time.header.stamp, NOW);
    }

    #[test]
    fn untimed_block_commits_nothing() {
        let bytes = encode_block(BlockId::new(5914, 0), TimeStamp::default(), &[0; 8]);
        let block = validate_block(&bytes).unwrap();
        let mut buffers = DataBuffers::default();

        let committed = FrameDispatcher::default()
            .dispatch(&Frame::Sbf(block), NOW, &mut buffers)
            .unwrap();
        assert!(committed.is_empty());
        assert!(!buffers.has_pending(Quantity::TimeReference));
    }

    #[test]
    fn pvt_geodetic_commits_fix_in_degrees() {
        let payload = encode_pvt_geodetic(
            1,
            45.0_f64.to_radians(),
            (-120.0_f64).to_radians(),
            100.0,
            Some((200, 400)),
        );
        let bytes = encode_block(BlockId::new(4007, 2), stamp(0, 2300), &payload);
        let block = validate_block(&bytes).unwrap();
        let mut buffers = DataBuffers::default();

        let committed = FrameDispatcher::default()
            .dispatch(&Frame::Sbf(block), NOW, &mut buffers)
            .unwrap();
        assert_eq!(committed, vec![Quantity::TimeReference, Quantity::NavSatFix]);

        let fix = buffers.nav_sat_fix.take().unwrap();
        assert_eq!(fix.status.status, NavSatStatus::STATUS_FIX);
        assert!((fix.latitude - 45.0).abs() < 1e-9);
        assert!((fix.longitude + 120.0).abs() < 1e-9);
        assert_eq!(fix.altitude, 100.0);
        assert_eq!(fix.position_covariance[0], 1.0);
        assert_eq!(fix.position_covariance[8], 4.0);
        assert_eq!(
            fix.position_covariance_type,
            NavSatFix::COVARIANCE_TYPE_APPROXIMATED
        );
    }

    #[test]
    fn pvt_without_solution_is_no_fix() {
        let payload = encode_pvt_geodetic(0, F64_DO_NOT_USE, F64_DO_NOT_USE, F64_DO_NOT_USE, None);
        let bytes = encode_block(BlockId::new(4007, 2), TimeStamp::default(), &payload);
        let block = validate_block(&bytes).unwrap();
        let mut buffers = DataBuffers::default();

        FrameDispatcher::default()
            .dispatch(&Frame::Sbf(block), NOW, &mut buffers)
            .unwrap();
        let fix = buffers.nav_sat_fix.take().unwrap();
        assert_eq!(fix.status.status, NavSatStatus::STATUS_NO_FIX);
        assert!(fix.latitude.is_nan());
        assert_eq!(fix.position_covariance_type, NavSatFix::COVARIANCE_TYPE_UNKNOWN);
    }

    #[test]
    fn short_pvt_block_commits_nothing() {
        let bytes = encode_block(BlockId::new(4007, 0), stamp(10, 1), &[1, 0]);
        let block = validate_block(&bytes).unwrap();
        let mut buffers = DataBuffers::default();

        let err = FrameDispatcher::default()
            .dispatch(&Frame::Sbf(block), NOW, &mut buffers)
            .unwrap_err();
        assert!(matches!(err, DecodeError::Wire(_)));
        assert!(!buffers.has_pending(Quantity::TimeReference));
        assert!(!buffers.has_pending(Quantity::NavSatFix));
    }
}
