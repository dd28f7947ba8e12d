// Copyright 2026 the Orogeny Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Affine transform algebra and pulse-driven animation timing.
//!
//! `orogeny_core` provides the transform and timing core of a retained-mode
//! scene graph. It is `no_std` compatible (with `alloc`) and single-threaded:
//! everything here is meant to be driven from one scene thread.
//!
//! # Architecture
//!
//! ```text
//!   Host frame loop
//!       │ HostTime
//!       ▼
//!   PrimaryTimer::pulse() ──► Animation (PulseReceiver)
//!                                  │ play_to / jump_to
//!                                  ▼
//!                            AnimationTarget (e.g. TranslateTransition)
//!                                  │ mutates
//!                                  ▼
//!   NodeStore::update_transform() ──► NodeStore::evaluate() ──► SceneChanges
//! ```
//!
//! **[`transform`]**: The [`Transform`](transform::Transform) trait over the
//! 12 elements of a 3×4 affine matrix, the specialised variants
//! (translate, scale, rotate, shear), the mutable dense
//! [`Affine`](transform::Affine), and the state-classified
//! [`ImmutableTransform`](transform::ImmutableTransform).
//!
//! **[`ticks`]** and **[`time`]**: Millisecond [`Duration`](time::Duration)s,
//! host time, and conversion to the fixed-point tick clock that animations
//! run on.
//!
//! **[`pulse`]**: The [`PrimaryTimer`](pulse::PrimaryTimer), which forwards
//! externally driven pulses to registered receivers.
//!
//! **[`animation`]**: The STOPPED / PAUSED / RUNNING state machine, with
//! cycles, auto-reverse, rate changes, delay, cue points and pulse
//! coalescing.
//!
//! **[`transition`]**: Interpolators and animation targets that drive
//! transform parameters.
//!
//! **[`scene`]**: Struct-of-arrays node tree whose nodes carry transform
//! lists, with world transforms computed by evaluation.
//!
//! **[`dirty`]**: The dirty-tracking channel used by the scene.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! pulse-loop instrumentation, with a zero-overhead
//! [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates per-target
//!   playback events.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod animation;
pub mod dirty;
pub mod error;
pub mod geometry;
pub mod pulse;
pub mod scene;
pub mod ticks;
pub mod time;
pub mod trace;
pub mod transform;
pub mod transition;
