// Copyright 2026 the Orogeny Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].

use orogeny_core::animation::{AnimationId, Status};
use orogeny_core::trace::{
    AnimationStatusEvent, FinishErrorEvent, PlaybackEvent, PlaybackKind, PulseEvent,
    RateChangeEvent, TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_PULSE: u8 = 1;
const TAG_ANIMATION_STATUS: u8 = 2;
const TAG_RATE_CHANGE: u8 = 3;
const TAG_FINISH_ERROR: u8 = 4;
const TAG_PLAYBACK: u8 = 5;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_i64(&mut self, v: i64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.buf.extend_from_slice(&v.to_bits().to_le_bytes());
    }

    fn write_status(&mut self, s: Status) {
        self.write_u8(match s {
            Status::Stopped => 0,
            Status::Paused => 1,
            Status::Running => 2,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_pulse(&mut self, e: &PulseEvent) {
        self.write_u8(TAG_PULSE);
        self.write_u64(e.pulse_index);
        self.write_u64(e.nanos);
        self.write_i64(e.ticks);
        self.write_u64(e.receivers as u64);
    }

    fn on_animation_status(&mut self, e: &AnimationStatusEvent) {
        self.write_u8(TAG_ANIMATION_STATUS);
        self.write_u64(e.animation.0);
        self.write_status(e.old);
        self.write_status(e.new);
        self.write_i64(e.position_ticks);
    }

    fn on_rate_change(&mut self, e: &RateChangeEvent) {
        self.write_u8(TAG_RATE_CHANGE);
        self.write_u64(e.animation.0);
        self.write_f64(e.old_rate);
        self.write_f64(e.new_rate);
        self.write_f64(e.current_rate);
    }

    fn on_finish_error(&mut self, e: &FinishErrorEvent) {
        self.write_u8(TAG_FINISH_ERROR);
        self.write_u64(e.animation.0);
    }

    fn on_playback(&mut self, e: &PlaybackEvent) {
        self.write_u8(TAG_PLAYBACK);
        self.write_u64(e.animation.0);
        self.write_u8(match e.kind {
            PlaybackKind::Play => 0,
            PlaybackKind::Jump => 1,
        });
        self.write_i64(e.position);
        self.write_i64(e.cycle_ticks);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedEvent {
    /// A [`PulseEvent`].
    Pulse(PulseEvent),
    /// An [`AnimationStatusEvent`].
    AnimationStatus(AnimationStatusEvent),
    /// A [`RateChangeEvent`].
    RateChange(RateChangeEvent),
    /// A [`FinishErrorEvent`].
    FinishError(FinishErrorEvent),
    /// A [`PlaybackEvent`].
    Playback(PlaybackEvent),
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
///
/// Stops at the first unknown tag or truncated record.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes = self.data.get(self.pos..self.pos + N)?.try_into().ok()?;
        self.pos += N;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[b]| b)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_i64(&mut self) -> Option<i64> {
        self.take().map(i64::from_le_bytes)
    }

    fn read_f64(&mut self) -> Option<f64> {
        self.read_u64().map(f64::from_bits)
    }

    fn read_id(&mut self) -> Option<AnimationId> {
        self.read_u64().map(AnimationId)
    }

    fn read_status(&mut self) -> Option<Status> {
        Some(match self.read_u8()? {
            0 => Status::Stopped,
            1 => Status::Paused,
            _ => Status::Running,
        })
    }

    fn decode_pulse(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Pulse(PulseEvent {
            pulse_index: self.read_u64()?,
            nanos: self.read_u64()?,
            ticks: self.read_i64()?,
            receivers: usize::try_from(self.read_u64()?).unwrap_or(usize::MAX),
        }))
    }

    fn decode_animation_status(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::AnimationStatus(AnimationStatusEvent {
            animation: self.read_id()?,
            old: self.read_status()?,
            new: self.read_status()?,
            position_ticks: self.read_i64()?,
        }))
    }

    fn decode_rate_change(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::RateChange(RateChangeEvent {
            animation: self.read_id()?,
            old_rate: self.read_f64()?,
            new_rate: self.read_f64()?,
            current_rate: self.read_f64()?,
        }))
    }

    fn decode_finish_error(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FinishError(FinishErrorEvent {
            animation: self.read_id()?,
        }))
    }

    fn decode_playback(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Playback(PlaybackEvent {
            animation: self.read_id()?,
            kind: match self.read_u8()? {
                0 => PlaybackKind::Play,
                _ => PlaybackKind::Jump,
            },
            position: self.read_i64()?,
            cycle_ticks: self.read_i64()?,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_PULSE => self.decode_pulse(),
            TAG_ANIMATION_STATUS => self.decode_animation_status(),
            TAG_RATE_CHANGE => self.decode_rate_change(),
            TAG_FINISH_ERROR => self.decode_finish_error(),
            TAG_PLAYBACK => self.decode_playback(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_pulse() -> PulseEvent {
        PulseEvent {
            pulse_index: 7,
            nanos: 116_666_667,
            ticks: 700,
            receivers: 3,
        }
    }

    fn sample_status() -> AnimationStatusEvent {
        AnimationStatusEvent {
            animation: AnimationId(2),
            old: Status::Running,
            new: Status::Stopped,
            position_ticks: 600,
        }
    }

    #[test]
    fn mixed_recording_decodes_in_order() {
        let mut rec = RecorderSink::new();
        rec.on_pulse(&sample_pulse());
        rec.on_animation_status(&sample_status());
        rec.on_rate_change(&RateChangeEvent {
            animation: AnimationId(2),
            old_rate: 1.0,
            new_rate: -2.5,
            current_rate: 0.0,
        });
        rec.on_playback(&PlaybackEvent {
            animation: AnimationId(2),
            kind: PlaybackKind::Jump,
            position: 600,
            cycle_ticks: 600,
        });
        rec.on_finish_error(&FinishErrorEvent {
            animation: AnimationId(2),
        });

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events.len(), 5, "all events decoded");
        assert_eq!(events[0], RecordedEvent::Pulse(sample_pulse()), "pulse");
        assert_eq!(
            events[1],
            RecordedEvent::AnimationStatus(sample_status()),
            "status"
        );
        match &events[2] {
            RecordedEvent::RateChange(e) => {
                assert_eq!(e.new_rate, -2.5, "negative rates survive");
                assert_eq!(e.current_rate, 0.0, "stopped animations have no current rate");
            }
            other => panic!("expected RateChange, got {other:?}"),
        }
        assert!(
            matches!(
                events[3],
                RecordedEvent::Playback(PlaybackEvent {
                    kind: PlaybackKind::Jump,
                    position: 600,
                    ..
                })
            ),
            "playback"
        );
        assert!(
            matches!(events[4], RecordedEvent::FinishError(_)),
            "finish error"
        );
    }

    #[test]
    fn records_a_live_animation() {
        use std::cell::RefCell;
        use std::rc::Rc;

        use orogeny_core::animation::{Animation, AnimationConfig};
        use orogeny_core::pulse::PrimaryTimer;
        use orogeny_core::time::{Duration, HostTime};

        let timer = Rc::new(PrimaryTimer::default());
        let rec = Rc::new(RefCell::new(RecorderSink::new()));
        timer.set_trace_sink(Some(Box::new(Rc::clone(&rec))));

        let animation = Animation::new(
            &timer,
            AnimationConfig::once(Duration::millis(100.0)),
            |_: i64, _: i64| {},
        );
        animation.play();
        timer.pulse(HostTime(50_000_000));
        timer.pulse(HostTime(150_000_000));

        let bytes = rec.borrow().as_bytes().to_vec();
        let events: Vec<_> = decode(&bytes).collect();
        let pulses = events
            .iter()
            .filter(|e| matches!(e, RecordedEvent::Pulse(_)))
            .count();
        assert_eq!(pulses, 2, "both pulses");
        assert!(
            matches!(
                events.first(),
                Some(RecordedEvent::Playback(PlaybackEvent {
                    kind: PlaybackKind::Jump,
                    position: 0,
                    ..
                }))
            ),
            "play() places the target first"
        );
        assert_eq!(
            events.last(),
            Some(&RecordedEvent::AnimationStatus(AnimationStatusEvent {
                animation: animation.id(),
                old: Status::Running,
                new: Status::Stopped,
                position_ticks: 600,
            })),
            "finished at the end"
        );
        assert_eq!(events.len(), 7, "jump, start, two pulses, two plays, stop");
    }

    #[test]
    fn empty_buffer_decodes_to_nothing() {
        let events: Vec<_> = decode(&[]).collect();
        assert!(events.is_empty(), "nothing recorded");
    }

    #[test]
    fn truncated_record_stops_decoding() {
        let mut rec = RecorderSink::new();
        rec.on_pulse(&sample_pulse());
        rec.on_animation_status(&sample_status());
        let bytes = rec.into_bytes();

        let events: Vec<_> = decode(&bytes[..bytes.len() - 3]).collect();
        assert_eq!(events.len(), 1, "only the complete record survives");
    }

    #[test]
    fn unknown_tag_stops_decoding() {
        let mut rec = RecorderSink::new();
        rec.on_finish_error(&FinishErrorEvent {
            animation: AnimationId(9),
        });
        let mut bytes = rec.into_bytes();
        bytes.push(0xff);
        bytes.extend_from_slice(&[0; 16]);

        let events: Vec<_> = decode(&bytes).collect();
        assert_eq!(events.len(), 1, "decoding halts at the bad tag");
    }
}
