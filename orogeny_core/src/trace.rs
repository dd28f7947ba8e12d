// Copyright 2026 the Orogeny Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the pulse loop.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! [`PrimaryTimer`](crate::pulse::PrimaryTimer) and every
//! [`Animation`](crate::animation::Animation) call as they run. All method
//! bodies default to no-ops, so implementing only the events you care about
//! is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace`
//! feature is **off**, every `Tracer` method compiles to nothing. When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! Finish-handler failures are the exception: they are reported through
//! [`TraceSink::on_finish_error`] whether or not `trace` is enabled, because
//! they are the only record of a consumer bug.
//!
//! # Crate features
//!
//! - `trace` enables the `Tracer` method bodies (one branch per call).
//! - `trace-rich` (implies `trace`) gates [`PlaybackEvent`] and the
//!   corresponding `TraceSink` method.

use alloc::rc::Rc;
use core::cell::RefCell;

use crate::animation::{AnimationId, Status};

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted once per timer pulse, before any receiver runs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PulseEvent {
    /// Monotonic pulse counter, starting at 1.
    pub pulse_index: u64,
    /// Host time of the pulse in nanoseconds.
    pub nanos: u64,
    /// The same time in animation ticks, after the monotonic clamp.
    pub ticks: i64,
    /// Receivers registered when the pulse began.
    pub receivers: usize,
}

/// Emitted when an animation changes status.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationStatusEvent {
    /// Which animation.
    pub animation: AnimationId,
    /// Status before the change.
    pub old: Status,
    /// Status after the change.
    pub new: Status,
    /// Absolute playback position in ticks at the change.
    pub position_ticks: i64,
}

/// Emitted when an animation's rate is set.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RateChangeEvent {
    /// Which animation.
    pub animation: AnimationId,
    /// Rate before the change.
    pub old_rate: f64,
    /// Rate after the change.
    pub new_rate: f64,
    /// Effective signed rate after the change.
    pub current_rate: f64,
}

/// Emitted when a finish handler returns an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FinishErrorEvent {
    /// Which animation.
    pub animation: AnimationId,
}

/// Whether the target moved continuously or discontinuously.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlaybackKind {
    /// Continuous playback to a position.
    Play,
    /// A jump to a position.
    Jump,
}

/// One call into an animation target.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaybackEvent {
    /// Which animation.
    pub animation: AnimationId,
    /// Play or jump.
    pub kind: PlaybackKind,
    /// Position within the cycle, in ticks.
    pub position: i64,
    /// Cycle length in ticks.
    pub cycle_ticks: i64,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the pulse loop.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called at the start of each pulse.
    fn on_pulse(&mut self, e: &PulseEvent) {
        _ = e;
    }

    /// Called when an animation changes status.
    fn on_animation_status(&mut self, e: &AnimationStatusEvent) {
        _ = e;
    }

    /// Called when an animation's rate is set.
    fn on_rate_change(&mut self, e: &RateChangeEvent) {
        _ = e;
    }

    /// Called when a finish handler fails. Delivered regardless of features.
    fn on_finish_error(&mut self, e: &FinishErrorEvent) {
        _ = e;
    }

    /// Called for each target update (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    fn on_playback(&mut self, e: &PlaybackEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Shared sinks
// ---------------------------------------------------------------------------

/// Forwards to a shared sink, so the installer keeps a handle to read it back.
///
/// Events arriving while the sink is borrowed elsewhere are dropped.
impl<S: TraceSink + ?Sized> TraceSink for Rc<RefCell<S>> {
    fn on_pulse(&mut self, e: &PulseEvent) {
        if let Ok(mut s) = self.try_borrow_mut() {
            s.on_pulse(e);
        }
    }

    fn on_animation_status(&mut self, e: &AnimationStatusEvent) {
        if let Ok(mut s) = self.try_borrow_mut() {
            s.on_animation_status(e);
        }
    }

    fn on_rate_change(&mut self, e: &RateChangeEvent) {
        if let Ok(mut s) = self.try_borrow_mut() {
            s.on_rate_change(e);
        }
    }

    fn on_finish_error(&mut self, e: &FinishErrorEvent) {
        if let Ok(mut s) = self.try_borrow_mut() {
            s.on_finish_error(e);
        }
    }

    #[cfg(feature = "trace-rich")]
    fn on_playback(&mut self, e: &PlaybackEvent) {
        if let Ok(mut s) = self.try_borrow_mut() {
            s.on_playback(e);
        }
    }
}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`PulseEvent`].
    #[inline]
    pub fn pulse(&mut self, e: &PulseEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_pulse(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`AnimationStatusEvent`].
    #[inline]
    pub fn animation_status(&mut self, e: &AnimationStatusEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_animation_status(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`RateChangeEvent`].
    #[inline]
    pub fn rate_change(&mut self, e: &RateChangeEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_rate_change(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PlaybackEvent`] (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn playback(&mut self, e: &PlaybackEvent) {
        if let Some(s) = &mut self.sink {
            s.on_playback(e);
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
            pulse_index: 3,
            nanos: 50_000_000,
            ticks: 300,
            receivers: 2,
        }
    }

    #[test]
    fn noop_sink_accepts_everything() {
        let mut sink = NoopSink;
        sink.on_pulse(&sample_pulse());
        sink.on_animation_status(&AnimationStatusEvent {
            animation: AnimationId(1),
            old: Status::Stopped,
            new: Status::Running,
            position_ticks: 0,
        });
        sink.on_finish_error(&FinishErrorEvent {
            animation: AnimationId(1),
        });
    }

    #[test]
    fn shared_sink_forwards_and_stays_readable() {
        use alloc::vec::Vec;

        #[derive(Default)]
        struct Errors(Vec<AnimationId>);
        impl TraceSink for Errors {
            fn on_finish_error(&mut self, e: &FinishErrorEvent) {
                self.0.push(e.animation);
            }
        }

        let shared = Rc::new(RefCell::new(Errors::default()));
        let mut handle = Rc::clone(&shared);
        handle.on_finish_error(&FinishErrorEvent {
            animation: AnimationId(7),
        });
        assert_eq!(shared.borrow().0, &[AnimationId(7)], "forwarded");

        let guard = shared.borrow_mut();
        handle.on_finish_error(&FinishErrorEvent {
            animation: AnimationId(8),
        });
        drop(guard);
        assert_eq!(shared.borrow().0.len(), 1, "dropped while borrowed");
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.pulse(&sample_pulse());
        tracer.rate_change(&RateChangeEvent {
            animation: AnimationId(0),
            old_rate: 1.0,
            new_rate: -1.0,
            current_rate: -1.0,
        });
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            pulses: Vec<u64>,
        }
        impl TraceSink for RecordingSink {
            fn on_pulse(&mut self, e: &PulseEvent) {
                self.pulses.push(e.pulse_index);
            }
        }

        let mut sink = RecordingSink { pulses: Vec::new() };
        let mut tracer = Tracer::new(&mut sink);
        tracer.pulse(&sample_pulse());
        drop(tracer);
        assert_eq!(sink.pulses, &[3], "one pulse recorded");
    }
}
