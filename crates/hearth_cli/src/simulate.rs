//! Headless hero simulation
//!
//! Mounts a hero against a synthetic viewport, replays a scroll script and
//! steps the animation scheduler at a fixed frame rate between samples.

use anyhow::{Context, Result};
use hearth_animation::AnimationScheduler;
use hearth_core::{shared_graph, ElementHandle, Viewport};
use hearth_hero::{HeroConfig, HeroFrame, HeroParallax};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Simulation parameters
#[derive(Clone, Debug)]
pub struct SimulationOptions {
    /// Rendered height of the hero element
    pub height: f32,
    /// Viewport width
    pub width: f32,
    /// Scroll offsets, applied in order
    pub scroll: Vec<f32>,
    /// Frames stepped after each scroll sample
    pub frames_per_sample: usize,
    pub fps: f32,
}

/// One row of output: the hero after a sample and its frames
#[derive(Clone, Debug, Serialize)]
pub struct SimulationStep {
    pub sample: usize,
    pub scroll: f32,
    /// Simulated time since mount, in seconds
    pub time: f32,
    pub frame: HeroFrame,
}

pub fn run(config: &HeroConfig, options: &SimulationOptions) -> Result<Vec<SimulationStep>> {
    if !(options.fps.is_finite() && options.fps > 0.0) {
        anyhow::bail!("--fps must be a positive number, got {}", options.fps);
    }

    let scheduler = AnimationScheduler::new();
    let viewport = Viewport::new(options.width);
    let element = ElementHandle::with_height(options.height);
    let hero = HeroParallax::mount(
        config,
        shared_graph(),
        &viewport,
        Arc::new(element),
        scheduler.handle(),
    )
    .context("Failed to mount hero")?;

    let dt = 1.0 / options.fps;
    let mut time = 0.0;
    let mut steps = Vec::with_capacity(options.scroll.len());

    for (sample, &scroll) in options.scroll.iter().enumerate() {
        viewport.scroll_to(scroll);
        for _ in 0..options.frames_per_sample {
            scheduler.advance(dt);
            time += dt;
        }
        debug!("sample {} scroll={} t={:.3}s", sample, scroll, time);

        steps.push(SimulationStep {
            sample,
            scroll,
            time,
            frame: hero.frame(),
        });
    }

    Ok(steps)
}

/// Render steps as an aligned table
pub fn format_table(steps: &[SimulationStep]) -> String {
    let layer_count = steps.first().map(|s| s.frame.layers.len()).unwrap_or(0);

    let mut out = String::new();
    out.push_str(&format!(
        "{:>4} {:>8} {:>7} {:>4} {:>5} {:>7}",
        "#", "scroll", "t(s)", "pct", "gate", "opacity"
    ));
    for i in 0..layer_count {
        out.push_str(&format!(" {:>9}", format!("layer{}", i)));
    }
    out.push_str(&format!(" {:>8}\n", "shimmer"));

    for step in steps {
        let frame = &step.frame;
        out.push_str(&format!(
            "{:>4} {:>8.1} {:>7.3} {:>4} {:>5} {:>7.3}",
            step.sample,
            step.scroll,
            step.time,
            frame.percent,
            if frame.gate_open { "open" } else { "shut" },
            frame.opacity
        ));
        for value in &frame.layers {
            out.push_str(&format!(" {:>9.3}", value));
        }
        out.push_str(&format!(" {:>8.2}\n", frame.shimmer));
    }
    out
}

/// Render steps as JSON lines
pub fn format_json_lines(steps: &[SimulationStep]) -> Result<String> {
    let mut out = String::new();
    for step in steps {
        out.push_str(&serde_json::to_string(step).context("Failed to encode step")?);
        out.push('\n');
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(scroll: Vec<f32>) -> SimulationOptions {
        SimulationOptions {
            height: 1000.0,
            width: 1280.0,
            scroll,
            frames_per_sample: 120,
            fps: 60.0,
        }
    }

    #[test]
    fn test_simulation_settles_each_sample() {
        let steps = run(&HeroConfig::default(), &options(vec![0.0, 250.0, 1200.0])).unwrap();
        assert_eq!(steps.len(), 3);

        assert_eq!(steps[0].frame.opacity, 1.0);
        assert_eq!(steps[1].frame.percent, 25);
        assert_eq!(steps[1].frame.opacity, 0.8);
        assert!((steps[1].frame.layers[0] + 175.0).abs() <= 0.001);
        assert_eq!(steps[2].frame.percent, 100);
        assert!((steps[2].frame.layers[4] + 300.0).abs() <= 0.001);
        assert!((steps[2].time - 6.0).abs() < 1e-3);
    }

    #[test]
    fn test_narrow_viewport() {
        let mut opts = options(vec![500.0]);
        opts.width = 600.0;
        let steps = run(&HeroConfig::default(), &opts).unwrap();
        assert!(!steps[0].frame.gate_open);
        assert_eq!(steps[0].frame.opacity, 1.0);
        assert!(steps[0].frame.layers.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_rejects_bad_fps() {
        let mut opts = options(vec![0.0]);
        opts.fps = 0.0;
        assert!(run(&HeroConfig::default(), &opts).is_err());
    }

    #[test]
    fn test_output_formats() {
        let steps = run(&HeroConfig::default(), &options(vec![0.0, 250.0])).unwrap();

        let table = format_table(&steps);
        assert_eq!(table.lines().count(), 3);
        assert!(table.lines().next().unwrap().contains("layer4"));

        let json = format_json_lines(&steps).unwrap();
        let first: serde_json::Value = serde_json::from_str(json.lines().next().unwrap()).unwrap();
        assert_eq!(first["frame"]["percent"], 0);
        assert_eq!(first["frame"]["layers"].as_array().unwrap().len(), 5);
    }
}
