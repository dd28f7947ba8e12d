// Copyright 2026 the Orogeny Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fixed-point animation time.
//!
//! All cycle arithmetic runs on integer ticks at [`TICKS_PER_SECOND`] so that
//! repeated pulses never accumulate floating-point drift. Durations convert
//! to ticks by rounding; values past the `i64` range saturate.
//!
//! Saturation is lossy on purpose: [`Duration::INDEFINITE`] becomes
//! `i64::MAX` ticks, which converts back to a large but finite duration.

use crate::time::Duration;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

/// Ticks in one second.
pub const TICKS_PER_SECOND: i64 = 6000;

/// Ticks in one millisecond.
pub const TICKS_PER_MILLI: f64 = 6.0;

/// Converts a duration to ticks, rounding to nearest.
///
/// [`Duration::INDEFINITE`] saturates to `i64::MAX`; [`Duration::UNKNOWN`]
/// maps to 0.
#[must_use]
#[expect(
    clippy::cast_possible_truncation,
    reason = "float-to-int casts saturate, which is the documented behaviour"
)]
pub fn from_duration(d: Duration) -> i64 {
    (d.to_millis() * TICKS_PER_MILLI).round() as i64
}

/// Converts ticks back to a duration.
#[must_use]
pub fn to_duration(ticks: i64) -> Duration {
    Duration::millis(ticks as f64 / TICKS_PER_MILLI)
}

/// Converts a nanosecond timestamp to ticks, rounding to nearest.
#[must_use]
#[expect(
    clippy::cast_possible_truncation,
    reason = "u64 nanos scaled down by 1e9/6000 always fit in i64"
)]
pub const fn from_nanos(nanos: u64) -> i64 {
    let wide = (nanos as u128 * TICKS_PER_SECOND as u128 + 500_000_000) / 1_000_000_000;
    wide as i64
}

/// Pulse granularity for a target framerate.
///
/// `max(1, round(TICKS_PER_SECOND / fps))`. A non-positive or NaN framerate
/// means full speed.
#[must_use]
#[expect(
    clippy::cast_possible_truncation,
    reason = "the quotient is bounded by TICKS_PER_SECOND for fps >= 1"
)]
pub fn resolution(fps: f64) -> i64 {
    if fps.is_nan() || fps <= 0.0 {
        return 1;
    }
    let r = (TICKS_PER_SECOND as f64 / fps).round() as i64;
    r.max(1)
}

/// Where a tick position falls within a sequence of equal cycles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CyclePosition {
    /// Zero-based cycle index. Negative before the first cycle.
    pub cycle: i64,
    /// Offset into that cycle, in `0..cycle_ticks`.
    pub offset: i64,
}

impl CyclePosition {
    /// Splits `ticks` into cycle index and offset.
    ///
    /// A zero-length cycle pins everything to cycle 0, offset 0.
    #[must_use]
    pub const fn of(ticks: i64, cycle_ticks: i64) -> Self {
        if cycle_ticks <= 0 {
            return Self {
                cycle: 0,
                offset: 0,
            };
        }
        Self {
            cycle: ticks.div_euclid(cycle_ticks),
            offset: ticks.rem_euclid(cycle_ticks),
        }
    }
}
