// Copyright 2026 the Orogeny Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The animation state machine.
//!
//! An [`Animation`] plays an [`AnimationTarget`] through one or more cycles,
//! driven by the pulses of a shared [`PrimaryTimer`]. It is in one of three
//! [`Status`]es:
//!
//! ```text
//!            play()              pause()
//!  STOPPED ─────────▶ RUNNING ─────────▶ PAUSED
//!     ▲                │  ▲                 │
//!     │ stop() / end   │  └──── play() ─────┘
//!     └────────────────┘        stop() returns to STOPPED from either
//! ```
//!
//! Playback position is kept in integer ticks (see [`crate::ticks`]). While
//! running with a non-zero rate the animation is registered with the timer;
//! at every other time it is not.
//!
//! Configuration (cycle duration, count, auto-reverse, delay, framerate) is
//! captured when playback starts from STOPPED. Changing it later is recorded
//! and applies at the next start.
//!
//! The timer holds a strong reference to every registered animation, so a
//! running animation keeps playing after its last [`Animation`] handle is
//! dropped, until it finishes or is stopped through a clone.

mod clip;

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::rc::{Rc, Weak};
use alloc::string::String;
use core::cell::RefCell;
use core::fmt;

use crate::error::AnimationError;
use crate::pulse::{PrimaryTimer, PulseReceiver};
use crate::ticks;
use crate::time::Duration;
use crate::trace::{AnimationStatusEvent, RateChangeEvent};

use clip::{Clip, Located, Step};

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

/// Identifies an animation in trace output.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AnimationId(pub u64);

impl fmt::Debug for AnimationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AnimationId({})", self.0)
    }
}

/// Playback status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Status {
    /// Not playing. The initial and final state.
    #[default]
    Stopped,
    /// Started, but holding its position.
    Paused,
    /// Advancing with each pulse.
    Running,
}

/// How many cycles to play.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CycleCount {
    /// A fixed number of cycles. Zero cycles cannot be started.
    Finite(u32),
    /// Repeat until stopped.
    Indefinite,
}

impl Default for CycleCount {
    fn default() -> Self {
        Self::Finite(1)
    }
}

/// Initial configuration of an [`Animation`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationConfig {
    /// Length of one cycle.
    pub cycle_duration: Duration,
    /// Number of cycles.
    pub cycle_count: CycleCount,
    /// Whether odd cycles play backwards.
    pub auto_reverse: bool,
    /// Playback speed and direction. Negative rates play backwards.
    pub rate: f64,
    /// Time between starting and the first cycle.
    pub delay: Duration,
    /// Highest useful update rate in frames per second. Pulses closer
    /// together than one frame at this rate are coalesced.
    pub target_framerate: f64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl AnimationConfig {
    /// An empty single cycle at normal speed.
    pub const DEFAULT: Self = Self {
        cycle_duration: Duration::ZERO,
        cycle_count: CycleCount::Finite(1),
        auto_reverse: false,
        rate: 1.0,
        delay: Duration::ZERO,
        target_framerate: ticks::TICKS_PER_SECOND as f64,
    };

    /// One cycle of `cycle_duration`.
    #[must_use]
    pub const fn once(cycle_duration: Duration) -> Self {
        Self {
            cycle_duration,
            ..Self::DEFAULT
        }
    }

    /// Sets the cycle count.
    #[must_use]
    pub const fn with_cycle_count(mut self, cycle_count: CycleCount) -> Self {
        self.cycle_count = cycle_count;
        self
    }

    /// Sets auto-reverse.
    #[must_use]
    pub const fn with_auto_reverse(mut self, auto_reverse: bool) -> Self {
        self.auto_reverse = auto_reverse;
        self
    }

    /// Sets the rate.
    #[must_use]
    pub const fn with_rate(mut self, rate: f64) -> Self {
        self.rate = rate;
        self
    }

    /// Sets the start delay.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Sets the target framerate.
    #[must_use]
    pub const fn with_target_framerate(mut self, target_framerate: f64) -> Self {
        self.target_framerate = target_framerate;
        self
    }

    /// Length of all cycles together.
    #[must_use]
    pub fn total_duration(&self) -> Duration {
        match self.cycle_count {
            CycleCount::Finite(n) => self.cycle_duration * f64::from(n),
            CycleCount::Indefinite => Duration::INDEFINITE,
        }
    }
}

/// What an animation drives.
///
/// Positions are ticks within the current cycle, in `0..=cycle_ticks`.
pub trait AnimationTarget {
    /// Whether the target can currently be animated.
    fn is_startable(&self) -> bool {
        true
    }

    /// Continuous playback reached `ticks`.
    fn play_to(&mut self, ticks: i64, cycle_ticks: i64);

    /// Playback moved discontinuously to `ticks`.
    fn jump_to(&mut self, ticks: i64, cycle_ticks: i64) {
        self.play_to(ticks, cycle_ticks);
    }
}

impl<F: FnMut(i64, i64)> AnimationTarget for F {
    fn play_to(&mut self, ticks: i64, cycle_ticks: i64) {
        self(ticks, cycle_ticks);
    }
}

/// Error returned by a finish handler.
pub type FinishError = Box<dyn core::error::Error>;

type FinishHandler = Box<dyn FnMut() -> Result<(), FinishError>>;

#[derive(Debug)]
struct State {
    config: AnimationConfig,
    /// Cycle geometry in effect since the last start from STOPPED.
    clip: Clip,
    status: Status,
    registered: bool,
    /// Timer time at which elapsed playback time is zero.
    start_time: i64,
    pause_time: i64,
    /// Position at `start_time`.
    delta: i64,
    /// Absolute position in ticks, `0..=total`.
    position: i64,
    located: Located,
    last_elapsed: i64,
    last_pulse: i64,
    cue_points: BTreeMap<String, Duration>,
}

impl State {
    /// Folds elapsed time into `delta` so that the clock can stop.
    fn freeze(&mut self, now: i64) {
        if now >= self.start_time {
            self.rebase();
            self.pause_time = self.start_time;
        } else {
            self.pause_time = now;
        }
    }

    /// Resumes the clock stopped by [`freeze`](Self::freeze).
    fn thaw(&mut self, now: i64) {
        self.start_time = self
            .start_time
            .saturating_add(now.saturating_sub(self.pause_time));
    }

    fn rebase(&mut self) {
        self.start_time = self.start_time.saturating_add(self.last_elapsed);
        self.delta = self.position;
        self.last_elapsed = 0;
        self.last_pulse = 0;
    }

    fn current_rate(&self) -> f64 {
        if self.status == Status::Running && self.registered {
            self.config.rate * self.clip.direction(self.located.cycle)
        } else {
            0.0
        }
    }
}

struct AnimationInner {
    id: AnimationId,
    timer: Rc<PrimaryTimer>,
    this: Weak<Self>,
    state: RefCell<State>,
    target: RefCell<Box<dyn AnimationTarget>>,
    on_finished: RefCell<Option<FinishHandler>>,
    finish_error: RefCell<Option<FinishError>>,
}

/// A playable animation.
///
/// Cloning yields another handle to the same animation.
#[derive(Clone)]
pub struct Animation {
    inner: Rc<AnimationInner>,
}

impl fmt::Debug for Animation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("Animation")
            .field("id", &self.inner.id)
            .field("status", &state.status)
            .field("position", &state.position)
            .field("rate", &state.config.rate)
            .finish_non_exhaustive()
    }
}

impl Animation {
    /// Creates a stopped animation of `target`, driven by `timer`.
    #[must_use]
    pub fn new(
        timer: &Rc<PrimaryTimer>,
        config: AnimationConfig,
        target: impl AnimationTarget + 'static,
    ) -> Self {
        let id = timer.next_animation_id();
        let inner = Rc::new_cyclic(|this| AnimationInner {
            id,
            timer: Rc::clone(timer),
            this: this.clone(),
            state: RefCell::new(State {
                config,
                clip: Clip::from_config(&config),
                status: Status::Stopped,
                registered: false,
                start_time: 0,
                pause_time: 0,
                delta: 0,
                position: 0,
                located: Located::default(),
                last_elapsed: 0,
                last_pulse: 0,
                cue_points: BTreeMap::new(),
            }),
            target: RefCell::new(Box::new(target)),
            on_finished: RefCell::new(None),
            finish_error: RefCell::new(None),
        });
        Self { inner }
    }

    /// Trace identifier.
    #[must_use]
    pub fn id(&self) -> AnimationId {
        self.inner.id
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> Status {
        self.inner.state.borrow().status
    }

    /// Whether [`play`](Self::play) from STOPPED would actually run.
    ///
    /// False for a zero-length cycle, a zero cycle count, or a target that is
    /// not startable.
    #[must_use]
    pub fn is_startable(&self) -> bool {
        let clip = Clip::from_config(&self.inner.state.borrow().config);
        self.inner.startable(&clip)
    }

    /// Starts or resumes playback.
    ///
    /// From STOPPED, an animation that is not startable finishes at once: the
    /// finish handler runs and the status stays STOPPED. Starting while
    /// positioned at the end the rate moves towards restarts from the other
    /// end. Playing while RUNNING does nothing.
    pub fn play(&self) {
        self.inner.play();
    }

    /// Holds the current position. Only has an effect while RUNNING.
    pub fn pause(&self) {
        self.inner.pause();
    }

    /// Stops playback and returns to the start of the first cycle.
    pub fn stop(&self) {
        self.inner.stop();
    }

    /// The configured rate.
    #[must_use]
    pub fn rate(&self) -> f64 {
        self.inner.state.borrow().config.rate
    }

    /// Sets the rate. Takes effect from the current position.
    pub fn set_rate(&self, rate: f64) {
        self.inner.set_rate(rate);
    }

    /// The effective signed rate: the rate, negated in reversed cycles, or 0
    /// when not advancing.
    #[must_use]
    pub fn current_rate(&self) -> f64 {
        self.inner.state.borrow().current_rate()
    }

    /// Moves to `time`, clamped to the total duration, without changing
    /// status.
    ///
    /// # Errors
    ///
    /// [`AnimationError::UnresolvedTime`] if `time` is [`Duration::UNKNOWN`].
    pub fn jump_to(&self, time: Duration) -> Result<(), AnimationError> {
        if time.is_unknown() {
            return Err(AnimationError::UnresolvedTime);
        }
        self.inner.jump_to_ticks(ticks::from_duration(time));
        Ok(())
    }

    /// Moves to a named cue point.
    ///
    /// `"start"` and `"end"` are always defined, as the beginning and end of
    /// the animation. An indefinite animation ends after its first cycle.
    ///
    /// # Errors
    ///
    /// [`AnimationError::UnknownCuePoint`] if `name` is not defined.
    pub fn jump_to_cue(&self, name: &str) -> Result<(), AnimationError> {
        let target = {
            let state = self.inner.state.borrow();
            match name {
                "start" => 0,
                "end" => state.clip.total_ticks.unwrap_or(state.clip.cycle_ticks),
                _ => match state.cue_points.get(name) {
                    Some(time) if time.is_unknown() => return Err(AnimationError::UnresolvedTime),
                    Some(time) => ticks::from_duration(*time),
                    None => return Err(AnimationError::UnknownCuePoint),
                },
            }
        };
        self.inner.jump_to_ticks(target);
        Ok(())
    }

    /// Defines a cue point, returning the previous time under that name.
    pub fn add_cue_point(&self, name: impl Into<String>, time: Duration) -> Option<Duration> {
        self.inner
            .state
            .borrow_mut()
            .cue_points
            .insert(name.into(), time)
    }

    /// Removes a cue point.
    pub fn remove_cue_point(&self, name: &str) -> Option<Duration> {
        self.inner.state.borrow_mut().cue_points.remove(name)
    }

    /// All cue points, by name.
    #[must_use]
    pub fn cue_points(&self) -> BTreeMap<String, Duration> {
        self.inner.state.borrow().cue_points.clone()
    }

    /// Looks up one cue point.
    #[must_use]
    pub fn cue_point(&self, name: &str) -> Option<Duration> {
        self.inner.state.borrow().cue_points.get(name).copied()
    }

    /// The configuration that the next start from STOPPED will use.
    #[must_use]
    pub fn config(&self) -> AnimationConfig {
        self.inner.state.borrow().config
    }

    /// Sets the cycle duration.
    pub fn set_cycle_duration(&self, cycle_duration: Duration) {
        self.inner.configure(|c| c.cycle_duration = cycle_duration);
    }

    /// Sets the cycle count.
    pub fn set_cycle_count(&self, cycle_count: CycleCount) {
        self.inner.configure(|c| c.cycle_count = cycle_count);
    }

    /// Sets auto-reverse.
    pub fn set_auto_reverse(&self, auto_reverse: bool) {
        self.inner.configure(|c| c.auto_reverse = auto_reverse);
    }

    /// Sets the start delay.
    pub fn set_delay(&self, delay: Duration) {
        self.inner.configure(|c| c.delay = delay);
    }

    /// Sets the target framerate.
    pub fn set_target_framerate(&self, target_framerate: f64) {
        self.inner.configure(|c| c.target_framerate = target_framerate);
    }

    /// Length of all cycles together, per the current configuration.
    #[must_use]
    pub fn total_duration(&self) -> Duration {
        self.inner.state.borrow().config.total_duration()
    }

    /// Position within the current cycle.
    #[must_use]
    pub fn current_time(&self) -> Duration {
        ticks::to_duration(self.current_ticks())
    }

    /// Position within the current cycle, in ticks.
    #[must_use]
    pub fn current_ticks(&self) -> i64 {
        self.inner.state.borrow().located.local
    }

    /// Absolute position across all cycles, in ticks.
    #[must_use]
    pub fn position_ticks(&self) -> i64 {
        self.inner.state.borrow().position
    }

    /// Index of the current cycle.
    #[must_use]
    pub fn current_cycle(&self) -> i64 {
        self.inner.state.borrow().located.cycle
    }

    /// Fraction of the current cycle played, in `0.0..=1.0`.
    #[must_use]
    pub fn progress(&self) -> f64 {
        let state = self.inner.state.borrow();
        if state.clip.cycle_ticks == 0 {
            return 0.0;
        }
        state.located.local as f64 / state.clip.cycle_ticks as f64
    }

    /// Installs the handler run when playback finishes.
    ///
    /// An error from the handler is reported to the timer's trace sink and
    /// kept for [`take_finish_error`](Self::take_finish_error).
    pub fn set_on_finished(&self, handler: impl FnMut() -> Result<(), FinishError> + 'static) {
        *self.inner.on_finished.borrow_mut() = Some(Box::new(handler));
    }

    /// Removes the finish handler.
    pub fn clear_on_finished(&self) {
        self.inner.on_finished.borrow_mut().take();
    }

    /// Takes the error from the most recent failed finish handler.
    pub fn take_finish_error(&self) -> Option<FinishError> {
        self.inner.finish_error.borrow_mut().take()
    }
}

impl AnimationInner {
    fn receiver(&self) -> Option<Rc<dyn PulseReceiver>> {
        let this: Rc<dyn PulseReceiver> = self.this.upgrade()?;
        Some(this)
    }

    fn register(&self, state: &mut State) {
        if let Some(receiver) = self.receiver() {
            self.timer.add_receiver(receiver);
            state.registered = true;
        }
    }

    fn unregister(&self, state: &mut State) {
        if state.registered {
            if let Some(receiver) = self.receiver() {
                self.timer.remove_receiver(&receiver);
            }
            state.registered = false;
        }
    }

    fn startable(&self, clip: &Clip) -> bool {
        if !clip.has_length() {
            return false;
        }
        match self.target.try_borrow() {
            Ok(target) => target.is_startable(),
            Err(_) => true,
        }
    }

    fn configure(&self, f: impl FnOnce(&mut AnimationConfig)) {
        let mut state = self.state.borrow_mut();
        f(&mut state.config);
        if state.status == Status::Stopped {
            state.clip = Clip::from_config(&state.config);
        }
    }

    fn play(&self) {
        let now = self.timer.now_ticks();
        let mut state = self.state.borrow_mut();
        match state.status {
            Status::Running => {}
            Status::Paused => {
                state.status = Status::Running;
                if state.config.rate != 0.0 {
                    state.thaw(now);
                    self.register(&mut state);
                }
                let position = state.position;
                drop(state);
                self.emit_status(Status::Paused, Status::Running, position);
            }
            Status::Stopped => {
                state.clip = Clip::from_config(&state.config);
                let clip = state.clip;
                if !self.startable(&clip) {
                    drop(state);
                    self.run_finish_handler();
                    return;
                }
                let rate = state.config.rate;
                let total = clip.total();
                let mut position = state.position.clamp(0, total);
                if rate >= 0.0 && position >= total {
                    position = 0;
                } else if rate < 0.0
                    && position <= 0
                    && let Some(end) = clip.total_ticks
                {
                    position = end;
                }
                state.delta = position;
                state.position = position;
                state.start_time = now.saturating_add(clip.delay_ticks);
                state.last_elapsed = 0;
                state.last_pulse = 0;
                state.status = Status::Running;
                if rate != 0.0 {
                    self.register(&mut state);
                } else {
                    state.pause_time = now;
                }
                let located = clip.locate(position, rate < 0.0);
                state.located = located;
                drop(state);
                self.apply(&[Step::Jump(located.local)], clip.cycle_ticks);
                self.emit_status(Status::Stopped, Status::Running, position);
            }
        }
    }

    fn pause(&self) {
        let now = self.timer.now_ticks();
        let mut state = self.state.borrow_mut();
        if state.status != Status::Running {
            return;
        }
        state.status = Status::Paused;
        if state.registered {
            state.freeze(now);
            self.unregister(&mut state);
        }
        let position = state.position;
        drop(state);
        self.emit_status(Status::Running, Status::Paused, position);
    }

    fn stop(&self) {
        let mut state = self.state.borrow_mut();
        let old = state.status;
        if old == Status::Stopped {
            return;
        }
        state.status = Status::Stopped;
        self.unregister(&mut state);
        state.position = 0;
        state.delta = 0;
        state.located = Located::default();
        state.clip = Clip::from_config(&state.config);
        let cycle_ticks = state.clip.cycle_ticks;
        drop(state);
        self.apply(&[Step::Jump(0)], cycle_ticks);
        self.emit_status(old, Status::Stopped, 0);
    }

    fn set_rate(&self, rate: f64) {
        let now = self.timer.now_ticks();
        let mut state = self.state.borrow_mut();
        let old_rate = state.config.rate;
        state.config.rate = rate;
        if state.status == Status::Running {
            if state.registered {
                if rate == 0.0 {
                    state.freeze(now);
                    self.unregister(&mut state);
                } else if now >= state.start_time {
                    state.rebase();
                }
            } else if rate != 0.0 {
                state.thaw(now);
                self.register(&mut state);
            }
        }
        let current_rate = state.current_rate();
        drop(state);
        self.timer.with_tracer(|tracer| {
            tracer.rate_change(&RateChangeEvent {
                animation: self.id,
                old_rate,
                new_rate: rate,
                current_rate,
            });
        });
    }

    fn jump_to_ticks(&self, ticks: i64) {
        let now = self.timer.now_ticks();
        let mut state = self.state.borrow_mut();
        let clip = state.clip;
        let position = ticks.clamp(0, clip.total());
        state.position = position;
        state.delta = position;
        if state.registered && now >= state.start_time {
            state.start_time = now;
            state.last_elapsed = 0;
            state.last_pulse = 0;
        }
        let located = clip.settle(position);
        state.located = located;
        drop(state);
        self.apply(&[Step::Jump(located.local)], clip.cycle_ticks);
    }

    /// Forwards steps to the target.
    ///
    /// Steps are dropped if the target is already busy further up the stack.
    fn apply(&self, steps: &[Step], cycle_ticks: i64) {
        let Ok(mut target) = self.target.try_borrow_mut() else {
            return;
        };
        for step in steps {
            match *step {
                Step::Play(ticks) => target.play_to(ticks, cycle_ticks),
                Step::Jump(ticks) => target.jump_to(ticks, cycle_ticks),
            }
            #[cfg(feature = "trace-rich")]
            {
                use crate::trace::{PlaybackEvent, PlaybackKind};
                let (kind, position) = match *step {
                    Step::Play(ticks) => (PlaybackKind::Play, ticks),
                    Step::Jump(ticks) => (PlaybackKind::Jump, ticks),
                };
                self.timer.with_tracer(|tracer| {
                    tracer.playback(&PlaybackEvent {
                        animation: self.id,
                        kind,
                        position,
                        cycle_ticks,
                    });
                });
            }
        }
    }

    fn emit_status(&self, old: Status, new: Status, position_ticks: i64) {
        self.timer.with_tracer(|tracer| {
            tracer.animation_status(&AnimationStatusEvent {
                animation: self.id,
                old,
                new,
                position_ticks,
            });
        });
    }

    fn run_finish_handler(&self) {
        let Some(mut handler) = self.on_finished.borrow_mut().take() else {
            return;
        };
        let result = handler();
        {
            let mut slot = self.on_finished.borrow_mut();
            if slot.is_none() {
                *slot = Some(handler);
            }
        }
        if let Err(error) = result {
            self.timer.report_finish_error(self.id);
            *self.finish_error.borrow_mut() = Some(error);
        }
    }

    fn finish(&self) {
        let mut state = self.state.borrow_mut();
        state.status = Status::Stopped;
        self.unregister(&mut state);
        let position = state.position;
        drop(state);
        self.emit_status(Status::Running, Status::Stopped, position);
        self.run_finish_handler();
    }
}

impl PulseReceiver for AnimationInner {
    fn time_pulse(&self, now: i64) {
        let mut state = self.state.borrow_mut();
        if state.status != Status::Running || !state.registered {
            return;
        }
        let elapsed = now.saturating_sub(state.start_time);
        if elapsed < 0 {
            return;
        }
        let clip = state.clip;
        if clip.resolution > 1 {
            if elapsed - state.last_pulse < clip.resolution {
                return;
            }
            state.last_pulse = (elapsed / clip.resolution) * clip.resolution;
        }
        state.last_elapsed = elapsed;

        let rate = state.config.rate;
        #[expect(
            clippy::cast_possible_truncation,
            reason = "float-to-int casts saturate, and positions are clamped below"
        )]
        let advance = (elapsed as f64 * rate).round() as i64;
        let raw = state.delta.saturating_add(advance);
        let (position, finished) = match clip.total_ticks {
            Some(total) if rate > 0.0 && raw >= total => (total, true),
            Some(_) if rate < 0.0 && raw <= 0 => (0, true),
            Some(total) => (raw.clamp(0, total), false),
            None => (raw, false),
        };
        let old = state.position;
        state.position = position;
        let (steps, located) = clip.steps(old, position, rate > 0.0);
        state.located = located;
        drop(state);

        self.apply(steps.as_slice(), clip.cycle_ticks);
        if finished {
            self.finish();
        }
    }
}
