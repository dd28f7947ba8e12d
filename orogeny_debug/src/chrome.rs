// Copyright 2026 the Orogeny Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][format] JSON to the given writer.
//!
//! Pulses are the only events that carry a host time. Every other event is
//! stamped with the time of the most recent pulse before it, which is when
//! the animation code that emitted it ran. Each animation gets its own
//! thread row (`tid` = animation id), with a duration slice per running
//! stretch and counter tracks for rate and position.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use orogeny_core::animation::Status;
use orogeny_core::trace::PlaybackKind;

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();
    let mut ts = 0.0;

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::Pulse(e) => {
                ts = nanos_to_us(e.nanos);
                events.push(json!({
                    "ph": "i",
                    "name": "Pulse",
                    "cat": "Timer",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "pulse_index": e.pulse_index,
                        "ticks": e.ticks,
                        "receivers": e.receivers,
                    }
                }));
            }
            RecordedEvent::AnimationStatus(e) => {
                // Running stretches become B/E slices; everything else is an
                // instant marker on the animation's row.
                let ph = match (e.old, e.new) {
                    (_, Status::Running) => "B",
                    (Status::Running, _) => "E",
                    _ => "i",
                };
                let mut event = json!({
                    "ph": ph,
                    "name": "Running",
                    "cat": "Animation",
                    "ts": ts,
                    "pid": 0,
                    "tid": e.animation.0,
                    "args": {
                        "from": format!("{:?}", e.old),
                        "to": format!("{:?}", e.new),
                        "position_ticks": e.position_ticks,
                    }
                });
                if ph == "i" {
                    event["name"] = json!(format!("{:?}", e.new));
                    event["s"] = json!("t");
                }
                events.push(event);
            }
            RecordedEvent::RateChange(e) => {
                events.push(json!({
                    "ph": "C",
                    "name": format!("rate {}", e.animation.0),
                    "cat": "Animation",
                    "ts": ts,
                    "pid": 0,
                    "tid": e.animation.0,
                    "args": {
                        "rate": e.new_rate,
                        "current": e.current_rate,
                    }
                }));
            }
            RecordedEvent::FinishError(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "FinishError",
                    "cat": "Animation",
                    "ts": ts,
                    "pid": 0,
                    "tid": e.animation.0,
                    "s": "t",
                }));
            }
            RecordedEvent::Playback(e) => {
                if e.kind == PlaybackKind::Jump {
                    events.push(json!({
                        "ph": "i",
                        "name": "Jump",
                        "cat": "Playback",
                        "ts": ts,
                        "pid": 0,
                        "tid": e.animation.0,
                        "s": "t",
                        "args": {
                            "position": e.position,
                        }
                    }));
                }
                events.push(json!({
                    "ph": "C",
                    "name": format!("position {}", e.animation.0),
                    "cat": "Playback",
                    "ts": ts,
                    "pid": 0,
                    "tid": e.animation.0,
                    "args": {
                        "position": e.position,
                        "cycle": e.cycle_ticks,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn nanos_to_us(nanos: u64) -> f64 {
    nanos as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use orogeny_core::animation::AnimationId;
    use orogeny_core::trace::{AnimationStatusEvent, PlaybackEvent, PulseEvent, TraceSink};

    fn pulse(rec: &mut RecorderSink, index: u64, nanos: u64) {
        rec.on_pulse(&PulseEvent {
            pulse_index: index,
            nanos,
            ticks: 0,
            receivers: 1,
        });
    }

    fn status(rec: &mut RecorderSink, old: Status, new: Status) {
        rec.on_animation_status(&AnimationStatusEvent {
            animation: AnimationId(5),
            old,
            new,
            position_ticks: 0,
        });
    }

    #[test]
    fn export_produces_valid_json() {
        let mut rec = RecorderSink::new();
        pulse(&mut rec, 1, 1_000_000);
        status(&mut rec, Status::Stopped, Status::Running);
        pulse(&mut rec, 2, 2_000_000);
        rec.on_playback(&PlaybackEvent {
            animation: AnimationId(5),
            kind: PlaybackKind::Play,
            position: 6000,
            cycle_ticks: 6000,
        });
        status(&mut rec, Status::Running, Status::Stopped);

        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let parsed: Vec<Value> = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed.len(), 5, "one entry per event");

        assert_eq!(parsed[0]["name"], "Pulse", "pulse marker");
        assert_eq!(parsed[0]["ts"], 1000.0, "microseconds");

        assert_eq!(parsed[1]["ph"], "B", "running slice opens");
        assert_eq!(parsed[1]["tid"], 5, "animation row");
        assert_eq!(parsed[1]["ts"], 1000.0, "stamped with the last pulse");

        assert_eq!(parsed[3]["ph"], "C", "position counter");
        assert_eq!(parsed[3]["args"]["position"], 6000, "position");

        assert_eq!(parsed[4]["ph"], "E", "running slice closes");
        assert_eq!(parsed[4]["ts"], 2000.0, "stamped with the later pulse");
    }

    #[test]
    fn pauses_are_instants_and_jumps_are_marked() {
        let mut rec = RecorderSink::new();
        status(&mut rec, Status::Paused, Status::Stopped);
        rec.on_playback(&PlaybackEvent {
            animation: AnimationId(5),
            kind: PlaybackKind::Jump,
            position: 0,
            cycle_ticks: 6000,
        });

        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let parsed: Vec<Value> = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed.len(), 3, "status, jump marker, counter");
        assert_eq!(parsed[0]["ph"], "i", "no slice outside running");
        assert_eq!(parsed[0]["name"], "Stopped", "named after the new status");
        assert_eq!(parsed[1]["name"], "Jump", "jump marker");
        assert_eq!(parsed[2]["ph"], "C", "counter follows");
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], &mut out).unwrap();
        let parsed: Vec<Value> = serde_json::from_slice(&out).unwrap();
        assert!(parsed.is_empty(), "empty array");
    }
}
