// Copyright 2026 the Orogeny Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The primary pulse source.
//!
//! [`PrimaryTimer`] does not schedule itself. Whatever owns the platform
//! frame loop calls [`PrimaryTimer::pulse`] once per frame with the current
//! [`HostTime`], and the timer forwards the reading, converted to animation
//! ticks, to every registered [`PulseReceiver`].
//!
//! Delivered tick values never decrease, even if the host clock does.
//!
//! Dispatch iterates a snapshot of the receiver list, so a receiver may add or
//! remove receivers (including itself) while a pulse is in flight. A receiver
//! removed during a pulse is not called for the rest of that pulse; one added
//! during a pulse is first called on the next.
//!
//! Everything here is single-threaded: share the timer through an
//! [`Rc`](alloc::rc::Rc) and call it from one thread.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

use crate::animation::AnimationId;
use crate::ticks;
use crate::time::{HostTime, Timebase};
use crate::trace::{FinishErrorEvent, PulseEvent, TraceSink, Tracer};

/// Something that wants to hear about every pulse.
pub trait PulseReceiver {
    /// Called once per pulse with the current time in ticks.
    fn time_pulse(&self, now: i64);
}

/// Broadcasts externally driven pulses to registered receivers.
pub struct PrimaryTimer {
    timebase: Timebase,
    receivers: RefCell<Vec<Rc<dyn PulseReceiver>>>,
    /// Last delivered time in ticks.
    now: Cell<i64>,
    pulse_index: Cell<u64>,
    next_animation_id: Cell<u64>,
    sink: RefCell<Option<Box<dyn TraceSink>>>,
}

impl core::fmt::Debug for PrimaryTimer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PrimaryTimer")
            .field("timebase", &self.timebase)
            .field("receivers", &self.receiver_count())
            .field("now", &self.now.get())
            .field("pulse_index", &self.pulse_index.get())
            .finish_non_exhaustive()
    }
}

impl Default for PrimaryTimer {
    fn default() -> Self {
        Self::new(Timebase::NANOS)
    }
}

fn same_receiver(a: &Rc<dyn PulseReceiver>, b: &Rc<dyn PulseReceiver>) -> bool {
    core::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

impl PrimaryTimer {
    /// Creates a timer that interprets host times with `timebase`.
    #[must_use]
    pub fn new(timebase: Timebase) -> Self {
        Self {
            timebase,
            receivers: RefCell::new(Vec::new()),
            now: Cell::new(0),
            pulse_index: Cell::new(0),
            next_animation_id: Cell::new(0),
            sink: RefCell::new(None),
        }
    }

    /// The host timebase.
    #[must_use]
    pub fn timebase(&self) -> Timebase {
        self.timebase
    }

    /// Registers a receiver.
    ///
    /// Registration is by identity: adding the same `Rc` twice is a no-op.
    /// Returns `true` if the receiver was newly added.
    pub fn add_receiver(&self, receiver: Rc<dyn PulseReceiver>) -> bool {
        let mut receivers = self.receivers.borrow_mut();
        if receivers.iter().any(|r| same_receiver(r, &receiver)) {
            return false;
        }
        receivers.push(receiver);
        true
    }

    /// Unregisters a receiver. Returns `true` if it was registered.
    pub fn remove_receiver(&self, receiver: &Rc<dyn PulseReceiver>) -> bool {
        let mut receivers = self.receivers.borrow_mut();
        let before = receivers.len();
        receivers.retain(|r| !same_receiver(r, receiver));
        receivers.len() != before
    }

    /// Whether `receiver` is currently registered.
    #[must_use]
    pub fn contains(&self, receiver: &Rc<dyn PulseReceiver>) -> bool {
        self.receivers
            .borrow()
            .iter()
            .any(|r| same_receiver(r, receiver))
    }

    /// Number of registered receivers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.receivers.borrow().len()
    }

    /// Time of the most recent pulse in ticks, or 0 before the first one.
    #[must_use]
    pub fn now_ticks(&self) -> i64 {
        self.now.get()
    }

    /// Number of pulses delivered so far.
    #[must_use]
    pub fn pulse_count(&self) -> u64 {
        self.pulse_index.get()
    }

    /// Delivers one pulse at host time `time`.
    ///
    /// A reading earlier than the previous one is clamped to the previous
    /// one.
    pub fn pulse(&self, time: HostTime) {
        let nanos = time.to_nanos(self.timebase);
        let now = ticks::from_nanos(nanos).max(self.now.get());
        self.now.set(now);
        let pulse_index = self.pulse_index.get() + 1;
        self.pulse_index.set(pulse_index);

        let snapshot: Vec<Rc<dyn PulseReceiver>> = self.receivers.borrow().clone();
        self.with_tracer(|tracer| {
            tracer.pulse(&PulseEvent {
                pulse_index,
                nanos,
                ticks: now,
                receivers: snapshot.len(),
            });
        });

        for receiver in &snapshot {
            if self.contains(receiver) {
                receiver.time_pulse(now);
            }
        }
    }

    /// Installs a trace sink, returning the previous one.
    pub fn set_trace_sink(&self, sink: Option<Box<dyn TraceSink>>) -> Option<Box<dyn TraceSink>> {
        self.sink.replace(sink)
    }

    /// Runs `f` with a [`Tracer`] over the installed sink.
    ///
    /// If the sink is already in use further up the stack (a sink that calls
    /// back into the timer), `f` gets a tracer that discards events.
    pub fn with_tracer(&self, f: impl FnOnce(&mut Tracer<'_>)) {
        match self.sink.try_borrow_mut() {
            Ok(mut slot) => {
                let mut tracer = match slot.as_deref_mut() {
                    Some(sink) => Tracer::new(sink),
                    None => Tracer::none(),
                };
                f(&mut tracer);
            }
            Err(_) => f(&mut Tracer::none()),
        }
    }

    /// Reports a failed finish handler.
    ///
    /// Delivered to the sink whether or not the `trace` feature is enabled.
    pub fn report_finish_error(&self, animation: AnimationId) {
        if let Ok(mut slot) = self.sink.try_borrow_mut()
            && let Some(sink) = slot.as_deref_mut()
        {
            sink.on_finish_error(&FinishErrorEvent { animation });
        }
    }

    pub(crate) fn next_animation_id(&self) -> AnimationId {
        let id = self.next_animation_id.get();
        self.next_animation_id.set(id + 1);
        AnimationId(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counter {
        hits: Cell<u32>,
        last: Cell<i64>,
    }

    impl PulseReceiver for Counter {
        fn time_pulse(&self, now: i64) {
            self.hits.set(self.hits.get() + 1);
            self.last.set(now);
        }
    }

    fn counter() -> (Rc<Counter>, Rc<dyn PulseReceiver>) {
        let c = Rc::new(Counter::default());
        let dynamic: Rc<dyn PulseReceiver> = c.clone();
        (c, dynamic)
    }

    #[test]
    fn registration_is_idempotent() {
        let timer = PrimaryTimer::default();
        let (c, r) = counter();
        assert!(timer.add_receiver(r.clone()), "first add");
        assert!(!timer.add_receiver(r.clone()), "second add is a no-op");
        assert_eq!(timer.receiver_count(), 1, "one entry");

        timer.pulse(HostTime(1_000_000_000));
        assert_eq!(c.hits.get(), 1, "called once per pulse");
        assert_eq!(c.last.get(), 6000, "one second in ticks");

        assert!(timer.remove_receiver(&r), "removed");
        assert!(!timer.remove_receiver(&r), "already gone");
        timer.pulse(HostTime(2_000_000_000));
        assert_eq!(c.hits.get(), 1, "no pulses after removal");
    }

    #[test]
    fn time_never_goes_backwards() {
        let timer = PrimaryTimer::default();
        let (c, r) = counter();
        timer.add_receiver(r);
        timer.pulse(HostTime(500_000_000));
        timer.pulse(HostTime(100_000_000));
        assert_eq!(c.last.get(), 3000, "clamped to previous reading");
        assert_eq!(timer.pulse_count(), 2, "both pulses counted");
    }

    #[test]
    fn host_timebase_is_applied() {
        // 24 MHz host ticks.
        let timer = PrimaryTimer::new(Timebase::new(125, 3));
        let (c, r) = counter();
        timer.add_receiver(r);
        timer.pulse(HostTime(12_000_000));
        assert_eq!(c.last.get(), 3000, "half a second");
    }

    struct Remover {
        timer: Rc<PrimaryTimer>,
        victim: Rc<dyn PulseReceiver>,
    }

    impl PulseReceiver for Remover {
        fn time_pulse(&self, _now: i64) {
            self.timer.remove_receiver(&self.victim);
        }
    }

    #[test]
    fn removal_during_dispatch_is_honoured() {
        let timer = Rc::new(PrimaryTimer::default());
        let (victim, victim_dyn) = counter();
        let remover: Rc<dyn PulseReceiver> = Rc::new(Remover {
            timer: timer.clone(),
            victim: victim_dyn.clone(),
        });
        timer.add_receiver(remover.clone());
        timer.add_receiver(victim_dyn);

        timer.pulse(HostTime(1_000));
        assert_eq!(victim.hits.get(), 0, "removed before its turn");
        assert_eq!(timer.receiver_count(), 1, "only the remover is left");
        timer.remove_receiver(&remover);
    }

    #[test]
    fn animation_ids_are_sequential() {
        let timer = PrimaryTimer::default();
        assert_eq!(timer.next_animation_id(), AnimationId(0), "first");
        assert_eq!(timer.next_animation_id(), AnimationId(1), "second");
    }

    #[test]
    fn finish_errors_reach_the_sink_without_trace() {
        struct Errors(Rc<Cell<u32>>);
        impl TraceSink for Errors {
            fn on_finish_error(&mut self, _e: &FinishErrorEvent) {
                self.0.set(self.0.get() + 1);
            }
        }

        let timer = PrimaryTimer::default();
        let count = Rc::new(Cell::new(0));
        timer.set_trace_sink(Some(Box::new(Errors(count.clone()))));
        timer.report_finish_error(AnimationId(7));
        assert_eq!(count.get(), 1, "delivered");
    }
}
