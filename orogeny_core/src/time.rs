// Copyright 2026 the Orogeny Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host time, timebase conversion, and millisecond durations.
//!
//! [`HostTime`] is a point in time in platform-native monotonic ticks, as
//! delivered by whatever drives the [`PrimaryTimer`](crate::pulse::PrimaryTimer).
//!
//! [`Timebase`] carries the rational conversion factor from host ticks to
//! nanoseconds (the `mach_timebase_info` pattern: `numer/denom` converts
//! ticks to nanoseconds).
//!
//! [`Duration`] is an animation-facing length of time in milliseconds, with
//! the symbolic values [`INDEFINITE`](Duration::INDEFINITE) and
//! [`UNKNOWN`](Duration::UNKNOWN).

use core::fmt;
use core::ops::{Add, Mul, Sub};

/// A point in time expressed as platform-native monotonic ticks.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct HostTime(pub u64);

impl HostTime {
    /// Returns the raw tick value.
    #[inline]
    #[must_use]
    pub const fn ticks(self) -> u64 {
        self.0
    }

    /// Converts this host time to nanoseconds using the given timebase.
    #[inline]
    #[must_use]
    pub const fn to_nanos(self, timebase: Timebase) -> u64 {
        timebase.ticks_to_nanos(self.0)
    }

    /// Creates a [`HostTime`] from a nanosecond value and timebase.
    ///
    /// This is the inverse of [`to_nanos`](Self::to_nanos).
    #[inline]
    #[must_use]
    pub const fn from_nanos(nanos: u64, timebase: Timebase) -> Self {
        Self(timebase.nanos_to_ticks(nanos))
    }
}

impl fmt::Debug for HostTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostTime({})", self.0)
    }
}

/// Rational conversion factor from host ticks to nanoseconds.
///
/// `nanoseconds = ticks * numer / denom`
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timebase {
    /// Numerator of the ticks-to-nanoseconds ratio.
    pub numer: u32,
    /// Denominator of the ticks-to-nanoseconds ratio.
    pub denom: u32,
}

impl Default for Timebase {
    fn default() -> Self {
        Self::NANOS
    }
}

impl Timebase {
    /// A timebase where host ticks are already nanoseconds.
    pub const NANOS: Self = Self { numer: 1, denom: 1 };

    /// Creates a new timebase with the given numerator and denominator.
    ///
    /// # Panics
    ///
    /// Panics if `denom` is zero.
    #[inline]
    #[must_use]
    pub const fn new(numer: u32, denom: u32) -> Self {
        assert!(denom != 0, "timebase denominator must not be zero");
        Self { numer, denom }
    }

    /// Converts a host tick count to nanoseconds.
    #[inline]
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "u128 intermediate avoids overflow; truncation back to u64 is intentional"
    )]
    pub const fn ticks_to_nanos(self, ticks: u64) -> u64 {
        let wide = ticks as u128 * self.numer as u128 / self.denom as u128;
        wide as u64
    }

    /// Converts nanoseconds to a host tick count.
    #[inline]
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "u128 intermediate avoids overflow; truncation back to u64 is intentional"
    )]
    pub const fn nanos_to_ticks(self, nanos: u64) -> u64 {
        let wide = nanos as u128 * self.denom as u128 / self.numer as u128;
        wide as u64
    }
}

impl fmt::Debug for Timebase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timebase({}/{})", self.numer, self.denom)
    }
}

/// A length of time in milliseconds.
///
/// Arithmetic follows IEEE semantics, so anything involving
/// [`INDEFINITE`](Self::INDEFINITE) stays indefinite and anything involving
/// [`UNKNOWN`](Self::UNKNOWN) stays unknown.
#[derive(Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Duration(f64);

impl Duration {
    /// No time at all.
    pub const ZERO: Self = Self(0.0);
    /// One millisecond.
    pub const ONE: Self = Self(1.0);
    /// Forever.
    pub const INDEFINITE: Self = Self(f64::INFINITY);
    /// A time that cannot be resolved.
    pub const UNKNOWN: Self = Self(f64::NAN);

    /// A duration of `ms` milliseconds.
    #[inline]
    #[must_use]
    pub const fn millis(ms: f64) -> Self {
        Self(ms)
    }

    /// A duration of `s` seconds.
    #[inline]
    #[must_use]
    pub const fn seconds(s: f64) -> Self {
        Self(s * 1000.0)
    }

    /// Length in milliseconds.
    #[inline]
    #[must_use]
    pub const fn to_millis(self) -> f64 {
        self.0
    }

    /// Length in seconds.
    #[inline]
    #[must_use]
    pub const fn to_seconds(self) -> f64 {
        self.0 / 1000.0
    }

    /// Whether this is [`INDEFINITE`](Self::INDEFINITE).
    #[inline]
    #[must_use]
    pub const fn is_indefinite(self) -> bool {
        self.0 == f64::INFINITY
    }

    /// Whether this is [`UNKNOWN`](Self::UNKNOWN).
    #[inline]
    #[must_use]
    pub const fn is_unknown(self) -> bool {
        self.0.is_nan()
    }
}

impl Add for Duration {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Duration {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Mul<f64> for Duration {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: f64) -> Self {
        Self(self.0 * rhs)
    }
}

impl fmt::Debug for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_indefinite() {
            f.write_str("Duration(INDEFINITE)")
        } else if self.is_unknown() {
            f.write_str("Duration(UNKNOWN)")
        } else {
            write!(f, "Duration({}ms)", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nanos_round_trip_identity_timebase() {
        let tb = Timebase::NANOS;
        let t = HostTime(1_000_000_000);
        assert_eq!(t.to_nanos(tb), 1_000_000_000, "identity timebase");
        assert_eq!(HostTime::from_nanos(1_000_000_000, tb), t, "inverse");
    }

    #[test]
    fn nanos_round_trip_24mhz() {
        // 24 MHz host ticks.
        let tb = Timebase::new(125, 3);
        let ticks = 24_000_000_u64;
        let nanos = HostTime(ticks).to_nanos(tb);
        assert_eq!(nanos, 1_000_000_000, "24 MHz is one second");
        assert_eq!(HostTime::from_nanos(nanos, tb).ticks(), ticks, "inverse");
    }

    #[test]
    fn large_tick_values_do_not_overflow() {
        let tb = Timebase::new(125, 3);
        let _nanos = HostTime(u64::MAX / 2).to_nanos(tb);
    }

    #[test]
    fn duration_units_and_symbols() {
        assert_eq!(Duration::seconds(1.5).to_millis(), 1500.0, "seconds");
        assert_eq!(Duration::millis(250.0).to_seconds(), 0.25, "millis");
        assert!(Duration::INDEFINITE.is_indefinite(), "indefinite");
        assert!(!Duration::INDEFINITE.is_unknown(), "indefinite is known");
        assert!(Duration::UNKNOWN.is_unknown(), "unknown");
        assert!((Duration::INDEFINITE + Duration::ONE).is_indefinite(), "absorbs");
        assert_eq!(Duration::millis(100.0) * 3.0, Duration::millis(300.0), "scaled");
        assert_eq!(
            Duration::millis(100.0) - Duration::millis(40.0),
            Duration::millis(60.0),
            "difference"
        );
    }
}
