// Copyright 2026 the Orogeny Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Interpolators and transform transitions.
//!
//! A transition is an [`AnimationTarget`] that eases one transform parameter
//! set from a start value to an end value over each cycle. Transitions hold
//! their transform weakly: once the transform is dropped the transition is
//! no longer startable and ignores playback.
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use orogeny_core::animation::{Animation, AnimationConfig};
//! use orogeny_core::geometry::Point3;
//! use orogeny_core::pulse::PrimaryTimer;
//! use orogeny_core::time::{Duration, HostTime};
//! use orogeny_core::transform::Translate;
//! use orogeny_core::transition::TranslateTransition;
//!
//! let timer = Rc::new(PrimaryTimer::default());
//! let offset = Rc::new(RefCell::new(Translate::default()));
//! let slide = TranslateTransition::new(&offset, Point3::ORIGIN, Point3::new(100.0, 0.0, 0.0));
//! let animation = Animation::new(&timer, AnimationConfig::once(Duration::millis(200.0)), slide);
//!
//! animation.play();
//! timer.pulse(HostTime(100_000_000));
//! assert_eq!(offset.borrow().x(), 50.0);
//! ```

use alloc::rc::{Rc, Weak};
use core::cell::RefCell;

use crate::animation::AnimationTarget;
use crate::geometry::Point3;
use crate::transform::{Rotate, Scale, Translate};

/// Maps linear cycle progress onto eased progress.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Interpolator {
    /// Constant speed.
    #[default]
    Linear,
    /// Holds the start value until the very end.
    Discrete,
    /// Slow start. Same as `Spline(0.42, 0.0, 1.0, 1.0)`.
    EaseIn,
    /// Slow end. Same as `Spline(0.0, 0.0, 0.58, 1.0)`.
    EaseOut,
    /// Slow start and end. Same as `Spline(0.42, 0.0, 0.58, 1.0)`.
    EaseBoth,
    /// A cubic Bézier from `(0, 0)` to `(1, 1)` with control points
    /// `(x1, y1)` and `(x2, y2)`. `x1` and `x2` are clamped to `0..=1`.
    Spline(f64, f64, f64, f64),
}

impl Interpolator {
    /// Eased progress at linear progress `t`, which is clamped to `0..=1`.
    #[must_use]
    pub fn curve(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match *self {
            Self::Linear => t,
            Self::Discrete => {
                if t >= 1.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Self::EaseIn => spline(t, 0.42, 0.0, 1.0, 1.0),
            Self::EaseOut => spline(t, 0.0, 0.0, 0.58, 1.0),
            Self::EaseBoth => spline(t, 0.42, 0.0, 0.58, 1.0),
            Self::Spline(x1, y1, x2, y2) => spline(t, x1, y1, x2, y2),
        }
    }

    /// The value between `from` and `to` at linear progress `t`.
    #[must_use]
    pub fn interpolate(&self, from: f64, to: f64, t: f64) -> f64 {
        from + (to - from) * self.curve(t)
    }

    fn interpolate_point(&self, from: Point3, to: Point3, t: f64) -> Point3 {
        let f = self.curve(t);
        Point3::new(
            from.x + (to.x - from.x) * f,
            from.y + (to.y - from.y) * f,
            from.z + (to.z - from.z) * f,
        )
    }
}

fn spline(t: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    if t <= 0.0 || t >= 1.0 {
        return t;
    }
    let x1 = x1.clamp(0.0, 1.0);
    let x2 = x2.clamp(0.0, 1.0);
    // Newton's method for the curve parameter whose x is `t`.
    let mut s = t;
    for _ in 0..8 {
        let slope = bezier_slope(s, x1, x2);
        if slope.abs() < 1e-6 {
            break;
        }
        s = (s - (bezier(s, x1, x2) - t) / slope).clamp(0.0, 1.0);
    }
    bezier(s, y1, y2)
}

/// One coordinate of the unit Bézier with inner control values `c1`, `c2`.
fn bezier(s: f64, c1: f64, c2: f64) -> f64 {
    let ms = 1.0 - s;
    3.0 * ms * ms * s * c1 + 3.0 * ms * s * s * c2 + s * s * s
}

fn bezier_slope(s: f64, c1: f64, c2: f64) -> f64 {
    let ms = 1.0 - s;
    3.0 * ms * ms * c1 + 6.0 * ms * s * (c2 - c1) + 3.0 * s * s * (1.0 - c2)
}

fn fraction(ticks: i64, cycle_ticks: i64) -> f64 {
    if cycle_ticks <= 0 {
        1.0
    } else {
        ticks as f64 / cycle_ticks as f64
    }
}

macro_rules! transition {
    ($(#[$doc:meta])* $name:ident, $transform:ty, $value:ty, |$t:ident, $v:ident| $apply:block) => {
        $(#[$doc])*
        #[derive(Clone, Debug)]
        pub struct $name {
            target: Weak<RefCell<$transform>>,
            from: $value,
            to: $value,
            interpolator: Interpolator,
        }

        impl $name {
            /// Eases `target` from `from` to `to` each cycle.
            #[must_use]
            pub fn new(target: &Rc<RefCell<$transform>>, from: $value, to: $value) -> Self {
                Self {
                    target: Rc::downgrade(target),
                    from,
                    to,
                    interpolator: Interpolator::Linear,
                }
            }

            /// Sets the easing curve.
            #[must_use]
            pub fn with_interpolator(mut self, interpolator: Interpolator) -> Self {
                self.interpolator = interpolator;
                self
            }

            /// The easing curve.
            #[must_use]
            pub fn interpolator(&self) -> Interpolator {
                self.interpolator
            }
        }

        impl AnimationTarget for $name {
            fn is_startable(&self) -> bool {
                self.target.strong_count() > 0
            }

            fn play_to(&mut self, ticks: i64, cycle_ticks: i64) {
                let Some(target) = self.target.upgrade() else {
                    return;
                };
                let Ok(mut $t) = target.try_borrow_mut() else {
                    return;
                };
                let $v = self.value_at(fraction(ticks, cycle_ticks));
                $apply
            }
        }
    };
}

transition!(
    /// Moves a [`Translate`].
    TranslateTransition,
    Translate,
    Point3,
    |t, v| {
        t.set_x(v.x);
        t.set_y(v.y);
        t.set_z(v.z);
    }
);

transition!(
    /// Resizes a [`Scale`]. Values are per-axis factors.
    ScaleTransition,
    Scale,
    Point3,
    |t, v| {
        t.set_x(v.x);
        t.set_y(v.y);
        t.set_z(v.z);
    }
);

transition!(
    /// Turns a [`Rotate`]. Values are angles in degrees.
    RotateTransition,
    Rotate,
    f64,
    |t, v| {
        t.set_angle(v);
    }
);

impl TranslateTransition {
    fn value_at(&self, t: f64) -> Point3 {
        self.interpolator.interpolate_point(self.from, self.to, t)
    }
}

impl ScaleTransition {
    fn value_at(&self, t: f64) -> Point3 {
        self.interpolator.interpolate_point(self.from, self.to, t)
    }
}

impl RotateTransition {
    fn value_at(&self, t: f64) -> f64 {
        self.interpolator.interpolate(self.from, self.to, t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{Animation, AnimationConfig, CycleCount, Status};
    use crate::pulse::PrimaryTimer;
    use crate::time::{Duration, HostTime};
    use crate::transform::Transform;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn linear_and_discrete() {
        assert_eq!(Interpolator::Linear.curve(0.25), 0.25, "identity");
        assert_eq!(Interpolator::Linear.curve(2.0), 1.0, "clamped");
        assert_eq!(Interpolator::Discrete.curve(0.99), 0.0, "holds");
        assert_eq!(Interpolator::Discrete.curve(1.0), 1.0, "snaps at the end");
    }

    #[test]
    fn easing_shapes() {
        assert!(Interpolator::EaseIn.curve(0.5) < 0.5, "slow start");
        assert!(Interpolator::EaseOut.curve(0.5) > 0.5, "fast start");
        assert!(approx(Interpolator::EaseBoth.curve(0.5), 0.5), "symmetric");
        for i in [Interpolator::EaseIn, Interpolator::EaseOut, Interpolator::EaseBoth] {
            assert_eq!(i.curve(0.0), 0.0, "{i:?} starts at 0");
            assert_eq!(i.curve(1.0), 1.0, "{i:?} ends at 1");
        }
    }

    #[test]
    fn spline_is_monotonic() {
        let i = Interpolator::Spline(0.25, 0.1, 0.25, 1.0);
        let mut last = 0.0;
        for step in 1..=20 {
            let y = i.curve(f64::from(step) / 20.0);
            assert!(y >= last, "non-decreasing at step {step}");
            last = y;
        }
        assert!(
            approx(Interpolator::Spline(0.0, 0.0, 1.0, 1.0).curve(0.3), 0.3),
            "straight control polygon is linear"
        );
    }

    #[test]
    fn translate_transition_follows_the_clock() {
        let timer = Rc::new(PrimaryTimer::default());
        let offset = Rc::new(RefCell::new(Translate::default()));
        let slide = TranslateTransition::new(
            &offset,
            Point3::new(0.0, 10.0, 0.0),
            Point3::new(100.0, 20.0, 0.0),
        );
        let a = Animation::new(&timer, AnimationConfig::once(Duration::millis(100.0)), slide);
        a.play();
        timer.pulse(HostTime(25_000_000));
        assert!(approx(offset.borrow().x(), 25.0), "quarter of the way");
        assert!(approx(offset.borrow().ty(), 12.5), "y too");
        timer.pulse(HostTime(200_000_000));
        assert_eq!(offset.borrow().x(), 100.0, "ends exactly at the end value");
    }

    #[test]
    fn rotate_transition_reverses() {
        let timer = Rc::new(PrimaryTimer::default());
        let spin = Rc::new(RefCell::new(Rotate::new(0.0)));
        let config = AnimationConfig::once(Duration::millis(100.0))
            .with_cycle_count(CycleCount::Finite(2))
            .with_auto_reverse(true);
        let a = Animation::new(&timer, config, RotateTransition::new(&spin, 0.0, 90.0));
        a.play();
        timer.pulse(HostTime(150_000_000));
        assert!(approx(spin.borrow().angle(), 45.0), "halfway back");
        timer.pulse(HostTime(200_000_000));
        assert_eq!(spin.borrow().angle(), 0.0, "returned");
    }

    #[test]
    fn scale_transition_with_easing() {
        let timer = Rc::new(PrimaryTimer::default());
        let zoom = Rc::new(RefCell::new(Scale::new(1.0, 1.0)));
        let grow = ScaleTransition::new(
            &zoom,
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(3.0, 3.0, 1.0),
        )
        .with_interpolator(Interpolator::EaseIn);
        let a = Animation::new(&timer, AnimationConfig::once(Duration::millis(100.0)), grow);
        a.play();
        timer.pulse(HostTime(50_000_000));
        let x = zoom.borrow().x();
        assert!(x > 1.0 && x < 2.0, "eased below the midpoint, got {x}");
    }

    #[test]
    fn busy_target_skips_the_update() {
        let offset = Rc::new(RefCell::new(Translate::default()));
        let mut slide =
            TranslateTransition::new(&offset, Point3::ORIGIN, Point3::new(10.0, 0.0, 0.0));
        {
            let _held = offset.borrow();
            slide.play_to(60, 60);
        }
        assert_eq!(offset.borrow().x(), 0.0, "skipped while borrowed");
        slide.play_to(60, 60);
        assert_eq!(offset.borrow().x(), 10.0, "applied once free");
    }

    #[test]
    fn dropped_target_is_not_startable() {
        let timer = Rc::new(PrimaryTimer::default());
        let offset = Rc::new(RefCell::new(Translate::default()));
        let slide = TranslateTransition::new(&offset, Point3::ORIGIN, Point3::new(1.0, 0.0, 0.0));
        let a = Animation::new(&timer, AnimationConfig::once(Duration::millis(100.0)), slide);
        assert!(a.is_startable(), "alive");
        drop(offset);
        assert!(!a.is_startable(), "gone");
        a.play();
        assert_eq!(a.status(), Status::Stopped, "finished immediately");
        assert_eq!(timer.receiver_count(), 0, "never registered");
    }
}
