//! Hero configuration (`hearth.toml`)
//!
//! Every field has a default, so an empty file (or no file) yields the
//! stock hero:
//!
//! ```toml
//! [gate]
//! breakpoint = "md"        # or a pixel width, e.g. 960
//!
//! [parallax]
//! base_unit = 1.0
//! multipliers = [-7.0, -6.0, -5.0, -4.0, -3.0]
//! rescale_input = "offset"
//!
//! [parallax.spring]
//! stiffness = 300.0
//! damping = 20.0
//! mass = 0.1
//! rest_delta = 0.001
//! rest_speed = 0.01
//!
//! [entrance]
//! distance = 24.0
//! duration_ms = 640.0
//! delay_ms = 50.0
//! stagger_ms = 50.0
//! blocks = 5
//! bezier = [0.43, 0.13, 0.23, 0.96]
//!
//! [shimmer]
//! duration_ms = 20000.0
//! from = 0.0
//! to = 200.0
//! ```

use crate::error::{HeroError, Result};
use hearth_animation::{Easing, SpringConfig};
use hearth_core::Breakpoint;
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::Path;

/// Top-level hero configuration
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct HeroConfig {
    #[serde(default)]
    pub gate: GateConfig,
    #[serde(default)]
    pub parallax: ParallaxConfig,
    #[serde(default)]
    pub entrance: EntranceConfig,
    #[serde(default)]
    pub shimmer: ShimmerConfig,
}

// =============================================================================
// [gate]
// =============================================================================

/// A breakpoint given by name or as an explicit pixel width
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum BreakpointSpec {
    Named(Breakpoint),
    Px(f32),
}

impl BreakpointSpec {
    pub fn min_width(&self) -> f32 {
        match *self {
            BreakpointSpec::Named(bp) => bp.min_width(),
            BreakpointSpec::Px(px) => px,
        }
    }
}

impl Default for BreakpointSpec {
    fn default() -> Self {
        BreakpointSpec::Named(Breakpoint::Md)
    }
}

impl std::fmt::Display for BreakpointSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BreakpointSpec::Named(bp) => write!(f, "{} ({}px)", bp.name(), bp.min_width()),
            BreakpointSpec::Px(px) => write!(f, "{}px", px),
        }
    }
}

/// Viewport gate: motion runs only at or above the breakpoint
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct GateConfig {
    #[serde(default)]
    pub breakpoint: BreakpointSpec,
}

// =============================================================================
// [parallax]
// =============================================================================

/// Which tracker output feeds the layer rescale
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RescaleInput {
    /// Raw scroll offset; saturates past the first pixel of scroll
    #[default]
    Offset,
    /// Scroll offset relative to the element height, in [0, 1]
    Fraction,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ParallaxConfig {
    /// Pixels of layer travel per percent point, before the layer multiplier
    #[serde(default = "default_base_unit")]
    pub base_unit: f32,
    /// One layer per entry, front to back
    #[serde(default = "default_multipliers")]
    pub multipliers: Vec<f32>,
    #[serde(default)]
    pub rescale_input: RescaleInput,
    #[serde(default = "SpringConfig::parallax", deserialize_with = "spring_section")]
    pub spring: SpringConfig,
}

/// `[parallax.spring]` as written; omitted fields keep the parallax profile
#[derive(Deserialize)]
struct SpringSection {
    #[serde(default = "default_spring_stiffness")]
    stiffness: f32,
    #[serde(default = "default_spring_damping")]
    damping: f32,
    #[serde(default = "default_spring_mass")]
    mass: f32,
    #[serde(default = "default_spring_rest_delta")]
    rest_delta: f32,
    #[serde(default = "default_spring_rest_speed")]
    rest_speed: f32,
}

fn default_spring_stiffness() -> f32 {
    SpringConfig::parallax().stiffness
}

fn default_spring_damping() -> f32 {
    SpringConfig::parallax().damping
}

fn default_spring_mass() -> f32 {
    SpringConfig::parallax().mass
}

fn default_spring_rest_delta() -> f32 {
    SpringConfig::parallax().rest_delta
}

fn default_spring_rest_speed() -> f32 {
    SpringConfig::parallax().rest_speed
}

fn spring_section<'de, D>(deserializer: D) -> std::result::Result<SpringConfig, D::Error>
where
    D: Deserializer<'de>,
{
    let section = SpringSection::deserialize(deserializer)?;
    Ok(SpringConfig::new(section.stiffness, section.damping, section.mass)
        .with_rest(section.rest_delta, section.rest_speed))
}

fn default_base_unit() -> f32 {
    1.0
}

fn default_multipliers() -> Vec<f32> {
    vec![-7.0, -6.0, -5.0, -4.0, -3.0]
}

impl Default for ParallaxConfig {
    fn default() -> Self {
        Self {
            base_unit: default_base_unit(),
            multipliers: default_multipliers(),
            rescale_input: RescaleInput::default(),
            spring: SpringConfig::parallax(),
        }
    }
}

// =============================================================================
// [entrance]
// =============================================================================

/// Staggered "fade in up" of the hero blocks
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct EntranceConfig {
    /// Starting downward offset in pixels
    #[serde(default = "default_entrance_distance")]
    pub distance: f32,
    #[serde(default = "default_entrance_duration")]
    pub duration_ms: f32,
    /// Delay before the first block
    #[serde(default = "default_entrance_delay")]
    pub delay_ms: f32,
    /// Extra delay per block
    #[serde(default = "default_entrance_stagger")]
    pub stagger_ms: f32,
    #[serde(default = "default_entrance_blocks")]
    pub blocks: usize,
    /// Cubic bezier control points x1, y1, x2, y2
    #[serde(default = "default_entrance_bezier")]
    pub bezier: [f32; 4],
}

fn default_entrance_distance() -> f32 {
    24.0
}

fn default_entrance_duration() -> f32 {
    640.0
}

fn default_entrance_delay() -> f32 {
    50.0
}

fn default_entrance_stagger() -> f32 {
    50.0
}

fn default_entrance_blocks() -> usize {
    5
}

fn default_entrance_bezier() -> [f32; 4] {
    [0.43, 0.13, 0.23, 0.96]
}

impl EntranceConfig {
    pub fn easing(&self) -> Easing {
        let [x1, y1, x2, y2] = self.bezier;
        Easing::CubicBezier(x1, y1, x2, y2)
    }

    /// Start delay of block `index`
    pub fn delay_for(&self, index: usize) -> f32 {
        self.delay_ms + index as f32 * self.stagger_ms
    }
}

impl Default for EntranceConfig {
    fn default() -> Self {
        Self {
            distance: default_entrance_distance(),
            duration_ms: default_entrance_duration(),
            delay_ms: default_entrance_delay(),
            stagger_ms: default_entrance_stagger(),
            blocks: default_entrance_blocks(),
            bezier: default_entrance_bezier(),
        }
    }
}

// =============================================================================
// [shimmer]
// =============================================================================

/// Looping headline gradient, as a background position in percent
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ShimmerConfig {
    /// Length of one sweep; the sweep reverses every cycle
    #[serde(default = "default_shimmer_duration")]
    pub duration_ms: f32,
    #[serde(default)]
    pub from: f32,
    #[serde(default = "default_shimmer_to")]
    pub to: f32,
}

fn default_shimmer_duration() -> f32 {
    20_000.0
}

fn default_shimmer_to() -> f32 {
    200.0
}

impl Default for ShimmerConfig {
    fn default() -> Self {
        Self {
            duration_ms: default_shimmer_duration(),
            from: 0.0,
            to: default_shimmer_to(),
        }
    }
}

// =============================================================================
// Loading & validation
// =============================================================================

impl HeroConfig {
    /// Load and validate a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| HeroError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!("Loaded hero config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate a configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: HeroConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Render the configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write the configuration to `path`
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = self.to_toml()?;
        fs::write(path, content).map_err(|source| HeroError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reject values the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        let breakpoint = self.gate.breakpoint.min_width();
        if !breakpoint.is_finite() || breakpoint < 0.0 {
            return invalid(format!(
                "gate.breakpoint must be a non-negative width, got {}",
                breakpoint
            ));
        }

        let parallax = &self.parallax;
        if !parallax.base_unit.is_finite() {
            return invalid("parallax.base_unit must be finite".to_string());
        }
        if parallax.multipliers.is_empty() {
            return invalid("parallax.multipliers must name at least one layer".to_string());
        }
        if let Some(m) = parallax.multipliers.iter().find(|m| !m.is_finite()) {
            return invalid(format!("parallax.multipliers contains {}", m));
        }

        let spring = &parallax.spring;
        if !(spring.mass.is_finite() && spring.mass > 0.0) {
            return invalid(format!("parallax.spring.mass must be > 0, got {}", spring.mass));
        }
        if !(spring.stiffness.is_finite() && spring.stiffness > 0.0) {
            return invalid(format!(
                "parallax.spring.stiffness must be > 0, got {}",
                spring.stiffness
            ));
        }
        if !(spring.damping.is_finite() && spring.damping >= 0.0) {
            return invalid(format!(
                "parallax.spring.damping must be >= 0, got {}",
                spring.damping
            ));
        }
        if !(spring.rest_delta >= 0.0 && spring.rest_speed >= 0.0) {
            return invalid("parallax.spring rest thresholds must be >= 0".to_string());
        }

        let entrance = &self.entrance;
        if !(entrance.duration_ms.is_finite() && entrance.duration_ms > 0.0) {
            return invalid(format!(
                "entrance.duration_ms must be > 0, got {}",
                entrance.duration_ms
            ));
        }
        if !(entrance.delay_ms >= 0.0 && entrance.stagger_ms >= 0.0) {
            return invalid("entrance delays must be >= 0".to_string());
        }
        if !entrance.distance.is_finite() {
            return invalid("entrance.distance must be finite".to_string());
        }
        let [x1, y1, x2, y2] = entrance.bezier;
        if !(0.0..=1.0).contains(&x1) || !(0.0..=1.0).contains(&x2) {
            return invalid("entrance.bezier x control points must lie in [0, 1]".to_string());
        }
        if !y1.is_finite() || !y2.is_finite() {
            return invalid("entrance.bezier y control points must be finite".to_string());
        }

        let shimmer = &self.shimmer;
        if !(shimmer.duration_ms.is_finite() && shimmer.duration_ms > 0.0) {
            return invalid(format!(
                "shimmer.duration_ms must be > 0, got {}",
                shimmer.duration_ms
            ));
        }
        if !shimmer.from.is_finite() || !shimmer.to.is_finite() {
            return invalid("shimmer range must be finite".to_string());
        }

        Ok(())
    }
}

fn invalid(message: String) -> Result<()> {
    Err(HeroError::InvalidConfig(message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_default() {
        let config = HeroConfig::from_toml_str("").unwrap();
        assert_eq!(config, HeroConfig::default());
        assert_eq!(config.gate.breakpoint.min_width(), 900.0);
        assert_eq!(config.parallax.multipliers, vec![-7.0, -6.0, -5.0, -4.0, -3.0]);
        assert_eq!(config.parallax.spring, SpringConfig::parallax());
        assert_eq!(config.parallax.rescale_input, RescaleInput::Offset);
    }

    #[test]
    fn test_roundtrip() {
        let mut config = HeroConfig::default();
        config.gate.breakpoint = BreakpointSpec::Px(960.0);
        config.parallax.rescale_input = RescaleInput::Fraction;
        config.entrance.blocks = 3;

        let text = config.to_toml().unwrap();
        let parsed = HeroConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_sections() {
        let config = HeroConfig::from_toml_str(
            r#"
            [gate]
            breakpoint = "lg"

            [parallax]
            multipliers = [-2.0, 2.0]

            [parallax.spring]
            stiffness = 150.0
            damping = 12.0
            mass = 1.0
            "#,
        )
        .unwrap();

        assert_eq!(config.gate.breakpoint, BreakpointSpec::Named(Breakpoint::Lg));
        assert_eq!(config.parallax.multipliers.len(), 2);
        assert_eq!(config.parallax.base_unit, 1.0);
        // Omitted rest thresholds keep the parallax profile
        assert_eq!(config.parallax.spring.stiffness, 150.0);
        assert_eq!(config.parallax.spring.rest_delta, 0.001);
        assert_eq!(config.parallax.spring.rest_speed, 0.01);
        assert_eq!(config.entrance, EntranceConfig::default());
    }

    #[test]
    fn test_single_spring_field() {
        let config = HeroConfig::from_toml_str("[parallax.spring]\nstiffness = 400.0").unwrap();
        let spring = config.parallax.spring;
        assert_eq!(spring.stiffness, 400.0);
        assert_eq!(spring.damping, 20.0);
        assert_eq!(spring.mass, 0.1);
        assert_eq!(spring.rest_delta, 0.001);
        assert_eq!(spring.rest_speed, 0.01);
    }

    #[test]
    fn test_spelled_out_parallax_spring() {
        let config = HeroConfig::from_toml_str(
            "[parallax.spring]\nstiffness = 300.0\ndamping = 20.0\nmass = 0.1",
        )
        .unwrap();
        assert_eq!(config.parallax.spring, SpringConfig::parallax());
    }

    #[test]
    fn test_pixel_breakpoint() {
        let config = HeroConfig::from_toml_str("[gate]\nbreakpoint = 720").unwrap();
        assert_eq!(config.gate.breakpoint.min_width(), 720.0);
    }

    #[test]
    fn test_rejects_invalid_values() {
        let cases = [
            "[parallax]\nmultipliers = []",
            "[parallax.spring]\nstiffness = 300.0\ndamping = 20.0\nmass = 0.0",
            "[parallax.spring]\nstiffness = -1.0\ndamping = 20.0\nmass = 0.1",
            "[parallax.spring]\nstiffness = 300.0\ndamping = -2.0\nmass = 0.1",
            "[entrance]\nduration_ms = 0.0",
            "[entrance]\nbezier = [1.5, 0.0, 0.5, 1.0]",
            "[shimmer]\nduration_ms = -5.0",
            "[gate]\nbreakpoint = -10.0",
        ];
        for case in cases {
            match HeroConfig::from_toml_str(case) {
                Err(HeroError::InvalidConfig(_)) => {}
                other => panic!("expected InvalidConfig for {:?}, got {:?}", case, other),
            }
        }
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            HeroConfig::from_toml_str("[gate\nbreakpoint ="),
            Err(HeroError::Parse(_))
        ));
        assert!(matches!(
            HeroConfig::from_toml_str("[gate]\nbreakpoint = \"huge\""),
            Err(HeroError::Parse(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = HeroConfig::load(Path::new("/nonexistent/hearth.toml")).unwrap_err();
        assert!(matches!(err, HeroError::Io { .. }));
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("hearth-config-{}.toml", std::process::id()));
        let config = HeroConfig::default();
        config.save(&path).unwrap();
        let loaded = HeroConfig::load(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_entrance_delays() {
        let entrance = EntranceConfig::default();
        assert_eq!(entrance.delay_for(0), 50.0);
        assert_eq!(entrance.delay_for(4), 250.0);
        assert_eq!(entrance.easing(), Easing::ENTER);
    }
}
