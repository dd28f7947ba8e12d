// Copyright 2026 the Orogeny Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Pulse times
//! are printed in milliseconds; positions are printed in ticks.

use std::io::Write;

use orogeny_core::animation::Status;
use orogeny_core::trace::{
    AnimationStatusEvent, FinishErrorEvent, PlaybackEvent, PlaybackKind, PulseEvent,
    RateChangeEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    playback: bool,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("playback", &self.playback)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self {
            writer,
            playback: false,
        }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            playback: false,
        }
    }

    /// Also prints one line per target update.
    ///
    /// Off by default: running animations produce one of these per pulse.
    #[must_use]
    pub fn with_playback(mut self, playback: bool) -> Self {
        self.playback = playback;
        self
    }

    /// Consumes the sink and returns the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn status_name(status: Status) -> &'static str {
    match status {
        Status::Stopped => "stopped",
        Status::Paused => "paused",
        Status::Running => "running",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_pulse(&mut self, e: &PulseEvent) {
        let _ = writeln!(
            self.writer,
            "[pulse] #{} at {:.3}ms ticks={} receivers={}",
            e.pulse_index,
            e.nanos as f64 / 1_000_000.0,
            e.ticks,
            e.receivers,
        );
    }

    fn on_animation_status(&mut self, e: &AnimationStatusEvent) {
        let _ = writeln!(
            self.writer,
            "[status] {:?} {} -> {} at {}t",
            e.animation,
            status_name(e.old),
            status_name(e.new),
            e.position_ticks,
        );
    }

    fn on_rate_change(&mut self, e: &RateChangeEvent) {
        let _ = writeln!(
            self.writer,
            "[rate] {:?} {} -> {} current={}",
            e.animation, e.old_rate, e.new_rate, e.current_rate,
        );
    }

    fn on_finish_error(&mut self, e: &FinishErrorEvent) {
        let _ = writeln!(self.writer, "[finish:error] {:?}", e.animation);
    }

    fn on_playback(&mut self, e: &PlaybackEvent) {
        if !self.playback {
            return;
        }
        let kind = match e.kind {
            PlaybackKind::Play => "play",
            PlaybackKind::Jump => "jump",
        };
        let _ = writeln!(
            self.writer,
            "[{kind}] {:?} {}/{}t",
            e.animation, e.position, e.cycle_ticks,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orogeny_core::animation::AnimationId;

    fn playback() -> PlaybackEvent {
        PlaybackEvent {
            animation: AnimationId(4),
            kind: PlaybackKind::Jump,
            position: 0,
            cycle_ticks: 600,
        }
    }

    #[test]
    fn pretty_print_pulse() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_pulse(&PulseEvent {
            pulse_index: 1,
            nanos: 16_000_000,
            ticks: 96,
            receivers: 2,
        });
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert!(output.contains("[pulse] #1"), "got: {output}");
        assert!(output.contains("16.000ms"), "got: {output}");
        assert!(output.contains("receivers=2"), "got: {output}");
    }

    #[test]
    fn pretty_print_status_and_errors() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_animation_status(&AnimationStatusEvent {
            animation: AnimationId(4),
            old: Status::Running,
            new: Status::Paused,
            position_ticks: 300,
        });
        sink.on_finish_error(&FinishErrorEvent {
            animation: AnimationId(4),
        });
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert!(output.contains("running -> paused at 300t"), "got: {output}");
        assert!(output.contains("[finish:error]"), "got: {output}");
        assert_eq!(output.lines().count(), 2, "one line per event");
    }

    #[test]
    fn playback_lines_are_opt_in() {
        let mut quiet = PrettyPrintSink::with_writer(Vec::<u8>::new());
        quiet.on_playback(&playback());
        assert!(quiet.into_inner().is_empty(), "suppressed by default");

        let mut loud = PrettyPrintSink::with_writer(Vec::<u8>::new()).with_playback(true);
        loud.on_playback(&playback());
        let output = String::from_utf8(loud.into_inner()).unwrap();
        assert!(output.starts_with("[jump]"), "got: {output}");
        assert!(output.contains("0/600t"), "got: {output}");
    }
}
