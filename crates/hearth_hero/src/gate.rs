//! Viewport gate and hero fade
//!
//! Below the gate breakpoint the hero is static: layers hold at rest and the
//! opacity stays at 1. Above it, the hero fades toward a floor set by the
//! scroll progress.

use crate::config::BreakpointSpec;
use hearth_animation::LinearMap;

/// Enables motion at or above a minimum viewport width
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Gate {
    min_width: f32,
}

impl Gate {
    pub fn new(breakpoint: BreakpointSpec) -> Self {
        Self {
            min_width: breakpoint.min_width(),
        }
    }

    pub fn min_width(&self) -> f32 {
        self.min_width
    }

    /// Non-finite widths keep the gate closed
    pub fn is_open(&self, width: f32) -> bool {
        width.is_finite() && width >= self.min_width
    }

    /// Travel distance shared by all layers before their multipliers
    pub fn distance(&self, open: bool, percent: u8, base_unit: f32) -> f32 {
        if open {
            percent.min(100) as f32 * base_unit
        } else {
            0.0
        }
    }
}

/// Lowest opacity the hero fades to at `percent`
///
/// `1 - percent / 100` rounded half up to one decimal place, computed in
/// integers so 25% gives exactly 0.8.
pub fn fade_floor(percent: u8) -> f32 {
    let remaining = 100 - percent.min(100) as u32;
    ((remaining + 5) / 10) as f32 / 10.0
}

/// Hero opacity for a fade `source` at `percent`
///
/// Interpolates from 1 toward the fade floor as `source` goes from 0 to 1.
/// Always in [0, 1]; exactly 1 while the gate is closed.
pub fn hero_opacity(source: f32, percent: u8, open: bool) -> f32 {
    if !open {
        return 1.0;
    }
    LinearMap::unit(1.0, fade_floor(percent))
        .map(source)
        .clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_core::Breakpoint;

    #[test]
    fn test_gate_threshold() {
        let gate = Gate::new(BreakpointSpec::Named(Breakpoint::Md));
        assert!(!gate.is_open(899.0));
        assert!(gate.is_open(900.0));
        assert!(gate.is_open(1280.0));
        assert!(!gate.is_open(f32::NAN));

        let custom = Gate::new(BreakpointSpec::Px(1000.0));
        assert!(!custom.is_open(999.5));
    }

    #[test]
    fn test_fade_floor_rounds_half_up() {
        assert_eq!(fade_floor(0), 1.0);
        assert_eq!(fade_floor(5), 1.0);
        assert_eq!(fade_floor(6), 0.9);
        assert_eq!(fade_floor(25), 0.8);
        assert_eq!(fade_floor(50), 0.5);
        assert_eq!(fade_floor(94), 0.1);
        assert_eq!(fade_floor(96), 0.0);
        assert_eq!(fade_floor(100), 0.0);
        assert_eq!(fade_floor(200), 0.0);
    }

    #[test]
    fn test_opacity_examples() {
        assert_eq!(hero_opacity(250.0, 25, true), 0.8);
        assert_eq!(hero_opacity(1200.0, 100, true), 0.0);
        assert_eq!(hero_opacity(0.0, 0, true), 1.0);
        assert_eq!(hero_opacity(0.5, 50, true), 0.75);
    }

    #[test]
    fn test_opacity_non_increasing() {
        for source in [0.0, 0.3, 1.0, 400.0] {
            let mut previous = hero_opacity(source, 0, true);
            assert_eq!(hero_opacity(0.0, 0, true), 1.0);
            for percent in 1..=100u8 {
                let opacity = hero_opacity(source, percent, true);
                assert!(opacity <= previous);
                assert!((0.0..=1.0).contains(&opacity));
                previous = opacity;
            }
        }
    }

    #[test]
    fn test_closed_gate_pins_opacity_and_distance() {
        let gate = Gate::new(BreakpointSpec::default());
        for percent in [0u8, 25, 100] {
            assert_eq!(hero_opacity(1.0, percent, false), 1.0);
            assert_eq!(gate.distance(false, percent, 1.0), 0.0);
        }
        assert_eq!(gate.distance(true, 40, 2.0), 80.0);
    }

    #[test]
    fn test_non_finite_source() {
        assert_eq!(hero_opacity(f32::NAN, 50, true), 1.0);
    }
}
