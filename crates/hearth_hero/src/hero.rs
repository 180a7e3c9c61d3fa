//! The hero section's motion, mounted as one unit
//!
//! [`HeroParallax`] wires a scroll tracker, the viewport gate, the fade
//! derivation and one spring mapper per layer into the reactive graph, and
//! starts the time-based entrance and shimmer. A single effect fans every
//! progress or width change out to the layers.
//!
//! Lock order is graph, then the layer list, then the scheduler.

use crate::config::{HeroConfig, RescaleInput};
use crate::error::Result;
use crate::gate::{hero_opacity, Gate};
use crate::motion::{Entrance, EntranceState, Shimmer};
use crate::parallax::{LayerDescriptor, SpringParallaxMapper};
use crate::progress::ScrollProgressTracker;
use hearth_animation::SchedulerHandle;
use hearth_core::{
    Derived, Effect, ElementMetrics, ReactiveGraph, SharedReactiveGraph, Signal, State,
    Subscription, Viewport,
};
use serde::Serialize;
use smallvec::SmallVec;
use std::sync::{Arc, Mutex};

type Layers = Arc<Mutex<SmallVec<[SpringParallaxMapper; 8]>>>;

/// Snapshot of everything the hero renders, taken once per frame
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HeroFrame {
    pub percent: u8,
    pub fraction: f32,
    pub offset: f32,
    pub gate_open: bool,
    pub opacity: f32,
    /// Animated offset per layer, front to back
    pub layers: SmallVec<[f32; 8]>,
    /// Whether any layer is still moving
    pub animating: bool,
    pub entrance: SmallVec<[EntranceState; 5]>,
    /// Headline gradient position in percent
    pub shimmer: f32,
}

/// Signals the hero reacts to
#[derive(Clone, Copy)]
struct Inputs {
    percent: Signal<u8>,
    fraction: Signal<f32>,
    offset: Signal<f32>,
    width: Signal<f32>,
}

impl Inputs {
    fn percent(&self, g: &ReactiveGraph) -> u8 {
        g.get(self.percent).unwrap_or(0)
    }

    fn width(&self, g: &ReactiveGraph) -> f32 {
        g.get(self.width).unwrap_or(0.0)
    }

    /// The value fed to the layer rescale and the fade
    fn source(&self, g: &ReactiveGraph, input: RescaleInput) -> f32 {
        match input {
            RescaleInput::Offset => g.get(self.offset),
            RescaleInput::Fraction => g.get(self.fraction),
        }
        .unwrap_or(0.0)
    }
}

/// Scroll-linked parallax, fade and entrance motion for one hero mount
pub struct HeroParallax {
    graph: SharedReactiveGraph,
    tracker: ScrollProgressTracker,
    width: State<f32>,
    resize_subscription: Subscription,
    gate: Gate,
    gate_open: Derived<bool>,
    opacity: Derived<f32>,
    fan_out: Option<Effect>,
    layers: Layers,
    entrance: Entrance,
    shimmer: Shimmer,
}

impl HeroParallax {
    /// Mount the hero against a viewport and a measured element
    ///
    /// Nothing moves until the first scroll sample: progress is 0, every
    /// layer rests at 0 and the opacity is 1. The entrance and shimmer start
    /// immediately.
    pub fn mount(
        config: &HeroConfig,
        graph: SharedReactiveGraph,
        viewport: &Viewport,
        element: Arc<dyn ElementMetrics>,
        scheduler: SchedulerHandle,
    ) -> Result<Self> {
        config.validate()?;

        let tracker = ScrollProgressTracker::mount(graph.clone(), viewport, element);
        let (percent, fraction, offset) = tracker.signals();

        let width = graph.lock().unwrap().create_signal(viewport.width());
        let resize_graph = graph.clone();
        let resize_subscription = viewport.on_resize(move |&w| {
            resize_graph.lock().unwrap().set(width, w);
        });

        let inputs = Inputs {
            percent,
            fraction,
            offset,
            width,
        };
        let gate = Gate::new(config.gate.breakpoint);
        let rescale = config.parallax.rescale_input;
        let base_unit = config.parallax.base_unit;

        let layers: Layers = Arc::new(Mutex::new(
            LayerDescriptor::from_multipliers(&config.parallax.multipliers)
                .into_iter()
                .map(|layer| {
                    SpringParallaxMapper::new(layer, config.parallax.spring, scheduler.clone())
                })
                .collect(),
        ));

        let (gate_open, opacity, fan_out) = {
            let mut g = graph.lock().unwrap();

            let gate_open = g.create_derived(move |g| gate.is_open(inputs.width(g)));

            let opacity = g.create_derived(move |g| {
                let open = gate.is_open(inputs.width(g));
                hero_opacity(inputs.source(g, rescale), inputs.percent(g), open)
            });

            let fan_out_layers = layers.clone();
            let mut last_open = None;
            let fan_out = g.create_effect(move |g| {
                let percent = inputs.percent(g);
                let source = inputs.source(g, rescale);
                let open = gate.is_open(inputs.width(g));
                if last_open != Some(open) {
                    tracing::debug!(
                        "hero gate {} (min width {}px)",
                        if open { "open" } else { "closed" },
                        gate.min_width()
                    );
                    last_open = Some(open);
                }

                let distance = gate.distance(open, percent, base_unit);
                for mapper in fan_out_layers.lock().unwrap().iter_mut() {
                    mapper.update(source, distance);
                }
            });

            (gate_open, opacity, fan_out)
        };

        let entrance = Entrance::start(&config.entrance, &scheduler);
        let shimmer = Shimmer::start(&config.shimmer, &scheduler);

        tracing::debug!(
            "HeroParallax mounted: {} layers, gate at {}",
            config.parallax.multipliers.len(),
            config.gate.breakpoint
        );

        Ok(Self {
            width: State::new(width, graph.clone()),
            graph,
            tracker,
            resize_subscription,
            gate,
            gate_open,
            opacity,
            fan_out: Some(fan_out),
            layers,
            entrance,
            shimmer,
        })
    }

    pub fn percent(&self) -> &State<u8> {
        self.tracker.percent()
    }

    pub fn fraction(&self) -> &State<f32> {
        self.tracker.fraction()
    }

    pub fn offset(&self) -> &State<f32> {
        self.tracker.offset()
    }

    /// Viewport width as last seen by the hero
    pub fn width(&self) -> &State<f32> {
        &self.width
    }

    pub fn gate(&self) -> Gate {
        self.gate
    }

    pub fn is_gate_open(&self) -> bool {
        self.graph
            .lock()
            .unwrap()
            .get_derived(self.gate_open)
            .unwrap_or(false)
    }

    pub fn opacity(&self) -> f32 {
        self.graph
            .lock()
            .unwrap()
            .get_derived(self.opacity)
            .unwrap_or(1.0)
    }

    pub fn layer_count(&self) -> usize {
        self.layers.lock().unwrap().len()
    }

    pub fn layer_values(&self) -> SmallVec<[f32; 8]> {
        self.layers.lock().unwrap().iter().map(|m| m.value()).collect()
    }

    pub fn layer_targets(&self) -> SmallVec<[f32; 8]> {
        self.layers.lock().unwrap().iter().map(|m| m.target()).collect()
    }

    pub fn entrance(&self) -> &Entrance {
        &self.entrance
    }

    pub fn is_mounted(&self) -> bool {
        self.fan_out.is_some()
    }

    /// Snapshot the current state for rendering
    pub fn frame(&self) -> HeroFrame {
        let (percent_signal, fraction_signal, offset_signal) = self.tracker.signals();
        let (percent, fraction, offset, gate_open, opacity) = {
            let mut g = self.graph.lock().unwrap();
            (
                g.get_untracked(percent_signal).unwrap_or(0),
                g.get_untracked(fraction_signal).unwrap_or(0.0),
                g.get_untracked(offset_signal).unwrap_or(0.0),
                g.get_derived(self.gate_open).unwrap_or(false),
                g.get_derived(self.opacity).unwrap_or(1.0),
            )
        };

        let (layers, animating) = {
            let layers = self.layers.lock().unwrap();
            (
                layers.iter().map(|m| m.value()).collect(),
                layers.iter().any(|m| m.is_animating()),
            )
        };

        HeroFrame {
            percent,
            fraction,
            offset,
            gate_open,
            opacity,
            layers,
            animating,
            entrance: self.entrance.states(),
            shimmer: self.shimmer.position(),
        }
    }

    /// Stop reacting to scroll, resize and frames
    ///
    /// Layers freeze at their current offsets and the tweens hold. Their
    /// scheduler entries are released when the hero is dropped.
    pub fn unmount(&mut self) {
        let Some(effect) = self.fan_out.take() else {
            return;
        };

        self.tracker.unmount();
        self.resize_subscription.unsubscribe();
        self.graph.lock().unwrap().dispose_effect(effect);

        for mapper in self.layers.lock().unwrap().iter_mut() {
            mapper.freeze();
        }
        self.entrance.stop();
        self.shimmer.stop();

        tracing::debug!("HeroParallax unmounted");
    }
}

impl Drop for HeroParallax {
    fn drop(&mut self) {
        self.unmount();

        let (percent, fraction, offset) = self.tracker.signals();
        let mut g = self.graph.lock().unwrap();
        g.dispose_derived(self.opacity);
        g.dispose_derived(self.gate_open);
        g.dispose_signal(self.width.signal());
        g.dispose_signal(percent);
        g.dispose_signal(fraction);
        g.dispose_signal(offset);
    }
}

impl std::fmt::Debug for HeroParallax {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeroParallax")
            .field("gate", &self.gate)
            .field("layers", &self.layer_count())
            .field("mounted", &self.is_mounted())
            .finish()
    }
}
