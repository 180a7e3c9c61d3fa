//! Spring-smoothed parallax layers
//!
//! Each layer maps a progress source onto a travel distance scaled by its own
//! multiplier, then follows that target through a spring stepped by the
//! animation scheduler. New targets retarget the spring in flight.

use hearth_animation::{AnimatedValue, LinearMap, SchedulerHandle, SpringConfig};
use serde::Serialize;

/// A parallax layer and its constant travel multiplier
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct LayerDescriptor {
    pub index: usize,
    pub multiplier: f32,
}

impl LayerDescriptor {
    /// One descriptor per multiplier, in order
    pub fn from_multipliers(multipliers: &[f32]) -> Vec<LayerDescriptor> {
        multipliers
            .iter()
            .enumerate()
            .map(|(index, &multiplier)| LayerDescriptor { index, multiplier })
            .collect()
    }
}

/// Drives one layer's animated offset
#[derive(Debug)]
pub struct SpringParallaxMapper {
    layer: LayerDescriptor,
    value: AnimatedValue,
}

impl SpringParallaxMapper {
    pub fn new(layer: LayerDescriptor, spring: SpringConfig, scheduler: SchedulerHandle) -> Self {
        Self {
            layer,
            value: AnimatedValue::new(scheduler, 0.0, spring),
        }
    }

    pub fn layer(&self) -> LayerDescriptor {
        self.layer
    }

    /// Rescale `source` from [0, 1] onto [0, distance * multiplier] and
    /// retarget the spring
    ///
    /// The spring keeps its position and velocity.
    pub fn update(&mut self, source: f32, distance: f32) {
        let extent = distance * self.layer.multiplier;
        let target = LinearMap::unit(0.0, extent).map(source);
        self.value.set_target(if target.is_finite() { target } else { 0.0 });
    }

    /// Current animated offset; 0 before any input
    pub fn value(&self) -> f32 {
        self.value.get()
    }

    pub fn target(&self) -> f32 {
        self.value.target()
    }

    pub fn is_animating(&self) -> bool {
        self.value.is_animating()
    }

    /// Hold the current offset and release the spring
    pub fn freeze(&mut self) {
        let current = self.value.get();
        self.value.set_immediate(current);
    }
}
