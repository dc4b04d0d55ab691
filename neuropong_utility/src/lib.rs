// SPDX-License-Identifier: GPL-3.0
// lib.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

// This crate contains small numeric helpers that are used throughout the codebase.

/// Exists to allow us to define custom trait operations on `f64`.
type CustomFloat64 = f64;

/// Exists to allow us to define custom trait operations on `usize`.
type CustomUsize = usize;

/// Exists to allow us to define custom trait operations on `u8`.
type CustomUint8 = u8;

/// This trait exists to allow action values, which arrive from the network as
/// floating point numbers, to be turned into integer action codes.
pub trait CustomFloat {

    /// This function should return the value truncated toward zero, or `None` if
    /// the value is not finite or does not fit in an `i32`.
    fn truncate_to_code(self) -> Option<i32>;
}

impl CustomFloat for CustomFloat64 {

    /// Truncates toward zero, rejecting NaN, infinities and out of range values.
    #[inline(always)]
    fn truncate_to_code(self) -> Option<i32> {

        if !self.is_finite() {
            return None;
        }

        let truncated = self.trunc();
        if truncated < i32::MIN as f64 || truncated > i32::MAX as f64 {
            None
        } else {
            Some(truncated as i32)
        }
    }
}

/// This trait exists to give us the same rounding-up division that the frame
/// downsampler relies on when sizing its output grid.
pub trait CustomDivision {

    type Output;

    /// This function should return `self / divisor`, rounded up. A zero divisor
    /// yields `None`.
    fn ceil_div(self, divisor: Self) -> Option<Self::Output>;
}

impl CustomDivision for CustomUsize {

    type Output = usize;

    /// Divides, rounding up, returning `usize`.
    #[inline(always)]
    fn ceil_div(self, divisor: Self) -> Option<Self::Output> {

        if divisor == 0 {
            None
        } else {
            Some(self / divisor + usize::from(self % divisor != 0))
        }
    }
}

/// This trait exists to turn a potentiometer wiper setting into an approximate
/// resistance, which is only ever used for diagnostics.
pub trait WiperResistance {

    /// This function should return the estimated resistance in ohms for a wiper
    /// setting on a 256-position device with the given full-scale resistance.
    fn wiper_ohms(self, full_scale_ohms: u32) -> f64;
}

impl WiperResistance for CustomUint8 {

    /// Linear estimate over 256 wiper positions.
    #[inline(always)]
    fn wiper_ohms(self, full_scale_ohms: u32) -> f64 {
        (self as f64 / 256.0) * full_scale_ohms as f64
    }
}
