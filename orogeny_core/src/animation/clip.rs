// Copyright 2026 the Orogeny Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cycle geometry of a started animation.
//!
//! A [`Clip`] is the tick-resolved snapshot of an [`AnimationConfig`] taken
//! when an animation starts. It maps absolute playback positions onto cycles
//! and turns a move between two positions into the calls a target needs.

use crate::ticks::{self, CyclePosition};

use super::{AnimationConfig, CycleCount};

/// One call into an animation target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Step {
    /// Continuous playback to a position within the cycle.
    Play(i64),
    /// A discontinuous jump to a position within the cycle.
    Jump(i64),
}

/// Up to three [`Step`]s.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Steps {
    items: [Step; 3],
    len: usize,
}

impl Steps {
    fn new() -> Self {
        Self {
            items: [Step::Play(0); 3],
            len: 0,
        }
    }

    fn push(&mut self, step: Step) {
        self.items[self.len] = step;
        self.len += 1;
    }

    pub(crate) fn as_slice(&self) -> &[Step] {
        &self.items[..self.len]
    }
}

/// A position resolved to a cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Located {
    /// Cycle index.
    pub(crate) cycle: i64,
    /// Position within the cycle as the target sees it, in `0..=cycle_ticks`.
    /// Reversed cycles count down.
    pub(crate) local: i64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Clip {
    pub(crate) cycle_ticks: i64,
    /// `None` for an indefinite cycle count.
    pub(crate) total_ticks: Option<i64>,
    pub(crate) auto_reverse: bool,
    pub(crate) delay_ticks: i64,
    pub(crate) resolution: i64,
}

impl Clip {
    pub(crate) fn from_config(config: &AnimationConfig) -> Self {
        let cycle_ticks = ticks::from_duration(config.cycle_duration).max(0);
        let total_ticks = match config.cycle_count {
            CycleCount::Finite(n) => Some(cycle_ticks.saturating_mul(i64::from(n))),
            CycleCount::Indefinite => None,
        };
        Self {
            cycle_ticks,
            total_ticks,
            auto_reverse: config.auto_reverse,
            delay_ticks: ticks::from_duration(config.delay).max(0),
            resolution: ticks::resolution(config.target_framerate),
        }
    }

    /// Upper bound for positions; `i64::MAX` when indefinite.
    pub(crate) fn total(&self) -> i64 {
        self.total_ticks.unwrap_or(i64::MAX)
    }

    /// Whether there is anything to play.
    pub(crate) fn has_length(&self) -> bool {
        self.cycle_ticks > 0 && self.total() > 0
    }

    fn reversed(&self, cycle: i64) -> bool {
        self.auto_reverse && cycle.rem_euclid(2) == 1
    }

    /// Resolves an absolute position.
    ///
    /// A position on a cycle boundary belongs to the start of the later cycle
    /// unless `at_end` is set, in which case it is the end of the earlier one.
    pub(crate) fn locate(&self, ticks: i64, at_end: bool) -> Located {
        if self.cycle_ticks == 0 {
            return Located::default();
        }
        let CyclePosition { mut cycle, mut offset } = CyclePosition::of(ticks, self.cycle_ticks);
        if at_end && offset == 0 && ticks != 0 {
            cycle -= 1;
            offset = self.cycle_ticks;
        }
        let local = if self.reversed(cycle) {
            self.cycle_ticks - offset
        } else {
            offset
        };
        Located { cycle, local }
    }

    /// Resolves a resting position, such as the target of a jump.
    ///
    /// Only the very end of a finite clip counts as the end of a cycle.
    pub(crate) fn settle(&self, ticks: i64) -> Located {
        self.locate(ticks, self.total_ticks == Some(ticks))
    }

    /// Sign applied to the rate in `cycle`.
    pub(crate) fn direction(&self, cycle: i64) -> f64 {
        if self.reversed(cycle) { -1.0 } else { 1.0 }
    }

    /// The target calls that take playback from `old` to `new`.
    ///
    /// `forward` is the direction of travel. Crossing one or more cycle
    /// boundaries plays to the end of the old cycle, jumps to the start of the
    /// new one, then plays to the new position.
    pub(crate) fn steps(&self, old: i64, new: i64, forward: bool) -> (Steps, Located) {
        let mut steps = Steps::new();
        let to = self.locate(new, forward);
        if old == new {
            steps.push(Step::Play(to.local));
            return (steps, to);
        }
        let from = self.locate(old, !forward);
        if from.cycle != to.cycle {
            // Whether local positions rise while travelling in `forward`.
            let rising = |cycle| forward != self.reversed(cycle);
            let end = if rising(from.cycle) { self.cycle_ticks } else { 0 };
            let start = if rising(to.cycle) { 0 } else { self.cycle_ticks };
            steps.push(Step::Play(end));
            if start != end {
                steps.push(Step::Jump(start));
            }
        }
        steps.push(Step::Play(to.local));
        (steps, to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::Duration;

    fn clip(cycle_ms: f64, count: CycleCount, auto_reverse: bool) -> Clip {
        let config = AnimationConfig::once(Duration::millis(cycle_ms))
            .with_cycle_count(count)
            .with_auto_reverse(auto_reverse);
        Clip::from_config(&config)
    }

    #[test]
    fn config_resolves_to_ticks() {
        let c = Clip::from_config(
            &AnimationConfig::once(Duration::millis(100.0))
                .with_cycle_count(CycleCount::Finite(3))
                .with_delay(Duration::millis(50.0))
                .with_target_framerate(60.0),
        );
        assert_eq!(c.cycle_ticks, 600, "cycle");
        assert_eq!(c.total_ticks, Some(1800), "total");
        assert_eq!(c.delay_ticks, 300, "delay");
        assert_eq!(c.resolution, 100, "60 fps");
        assert!(c.has_length(), "playable");
    }

    #[test]
    fn empty_clips_have_no_length() {
        assert!(!clip(0.0, CycleCount::Finite(1), false).has_length(), "zero cycle");
        assert!(!clip(100.0, CycleCount::Finite(0), false).has_length(), "zero count");
        assert!(clip(100.0, CycleCount::Indefinite, false).has_length(), "indefinite");
    }

    #[test]
    fn boundary_belongs_to_the_side_asked_for() {
        let c = clip(100.0, CycleCount::Finite(2), false);
        assert_eq!(c.locate(600, false), Located { cycle: 1, local: 0 }, "start");
        assert_eq!(c.locate(600, true), Located { cycle: 0, local: 600 }, "end");
        assert_eq!(c.locate(0, true), Located { cycle: 0, local: 0 }, "origin");
        assert_eq!(c.settle(1200), Located { cycle: 1, local: 600 }, "clip end");
        assert_eq!(c.settle(600), Located { cycle: 1, local: 0 }, "mid boundary");
    }

    #[test]
    fn odd_cycles_count_down_when_reversing() {
        let c = clip(100.0, CycleCount::Finite(2), true);
        assert_eq!(c.locate(900, false), Located { cycle: 1, local: 300 }, "reversed");
        assert_eq!(c.direction(1), -1.0, "negated rate");
        assert_eq!(c.direction(0), 1.0, "plain rate");
    }

    #[test]
    fn crossing_a_boundary_wraps() {
        let c = clip(100.0, CycleCount::Finite(3), false);
        let (steps, to) = c.steps(500, 700, true);
        assert_eq!(
            steps.as_slice(),
            &[Step::Play(600), Step::Jump(0), Step::Play(100)],
            "play out, jump, play in"
        );
        assert_eq!(to, Located { cycle: 1, local: 100 }, "landed");
    }

    #[test]
    fn reversing_boundary_needs_no_jump() {
        let c = clip(100.0, CycleCount::Finite(2), true);
        let (steps, _) = c.steps(0, 900, true);
        assert_eq!(steps.as_slice(), &[Step::Play(600), Step::Play(300)], "bounce");
    }

    #[test]
    fn backwards_travel_mirrors_forwards() {
        let c = clip(100.0, CycleCount::Finite(2), false);
        let (steps, to) = c.steps(700, 500, false);
        assert_eq!(
            steps.as_slice(),
            &[Step::Play(0), Step::Jump(600), Step::Play(500)],
            "play out backwards, jump to the end"
        );
        assert_eq!(to.cycle, 0, "earlier cycle");
    }

    #[test]
    fn landing_on_a_boundary_stays_in_the_cycle() {
        let c = clip(100.0, CycleCount::Finite(2), false);
        let (steps, to) = c.steps(300, 600, true);
        assert_eq!(steps.as_slice(), &[Step::Play(600)], "no wrap yet");
        assert_eq!(to, Located { cycle: 0, local: 600 }, "end of first cycle");
    }

    #[test]
    fn indefinite_backwards_wraps_below_zero() {
        let c = clip(100.0, CycleCount::Indefinite, false);
        let (steps, to) = c.steps(0, -100, false);
        assert_eq!(
            steps.as_slice(),
            &[Step::Play(0), Step::Jump(600), Step::Play(500)],
            "wraps into cycle -1"
        );
        assert_eq!(to.cycle, -1, "negative cycle");
    }
}
