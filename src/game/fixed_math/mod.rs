//! Deterministic fixed-point mathematics library.
//!
//! This module provides deterministic math types and operations using fixed-point
//! arithmetic to ensure identical behavior across different platforms and architectures.
//! Path costs, territory clipping and world positions all go through these types, so
//! lockstep peers compute bit-identical results.

use fixed::types::I48F16;

pub use vec2::FixedVec2;

mod vec2;

/// Fixed-point number type used throughout the simulation.
///
/// Uses I48F16 format: 48 bits for the integer part, 16 bits for the fractional part.
/// This provides a range of approximately ±140 trillion with a precision of ~0.000015.
pub type FixedNum = I48F16;

/// Convert a config-layer float into simulation fixed point.
///
/// Only call this at load time; per-tick code must never touch floats.
#[inline]
pub fn fixed_from_f32(value: f32) -> FixedNum {
    FixedNum::from_num(value)
}
