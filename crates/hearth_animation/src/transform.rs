//! Value interpolation and linear rescaling
//!
//! [`LinearMap`] is the first stage of every scroll-linked output: it maps a
//! source signal from an input range onto an output range before any
//! smoothing is applied.

use serde::{Deserialize, Serialize};

/// Trait for values that can be linearly interpolated
pub trait Interpolate: Clone {
    /// Linearly interpolate between self and other by factor t (0.0 to 1.0)
    fn lerp(&self, other: &Self, t: f32) -> Self;

    /// Check if two values are approximately equal (for settling detection)
    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool;
}

impl Interpolate for f32 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self - other).abs() < epsilon
    }
}

/// Two-point linear mapping from an input range to an output range
///
/// Inputs outside the input range hold the output at the range ends.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinearMap {
    pub input: (f32, f32),
    pub output: (f32, f32),
}

impl LinearMap {
    pub fn new(input: (f32, f32), output: (f32, f32)) -> Self {
        Self { input, output }
    }

    /// Map [0, 1] onto [from, to], clamped
    pub fn unit(from: f32, to: f32) -> Self {
        Self::new((0.0, 1.0), (from, to))
    }

    /// Map a value
    ///
    /// Non-finite inputs and degenerate input ranges map to the start of the
    /// output range.
    pub fn map(&self, value: f32) -> f32 {
        let (in_start, in_end) = self.input;
        let span = in_end - in_start;
        if !value.is_finite() || !span.is_finite() || span == 0.0 {
            return self.output.0;
        }

        let t = ((value - in_start) / span).clamp(0.0, 1.0);
        self.output.0.lerp(&self.output.1, t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_interpolation() {
        assert!((0.0_f32.lerp(&1.0, 0.5) - 0.5).abs() < 1e-6);
        assert!((10.0_f32.lerp(&20.0, 0.25) - 12.5).abs() < 1e-6);
        assert!(1.0_f32.approx_eq(&1.0005, 0.001));
    }

    #[test]
    fn test_unit_map() {
        let map = LinearMap::unit(0.0, -700.0);
        assert_eq!(map.map(0.0), 0.0);
        assert_eq!(map.map(0.5), -350.0);
        assert_eq!(map.map(1.0), -700.0);
    }

    #[test]
    fn test_clamped_saturates() {
        let map = LinearMap::unit(1.0, 0.8);
        assert_eq!(map.map(250.0), 0.8);
        assert_eq!(map.map(-10.0), 1.0);
    }

    #[test]
    fn test_degenerate_input() {
        let map = LinearMap::new((5.0, 5.0), (3.0, 9.0));
        assert_eq!(map.map(5.0), 3.0);
        assert_eq!(LinearMap::unit(0.0, 1.0).map(f32::NAN), 0.0);
    }
}
