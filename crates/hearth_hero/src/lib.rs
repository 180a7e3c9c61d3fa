//! Hearth Hero
//!
//! Scroll-linked motion for a landing-page hero section: progress tracking
//! relative to the hero's own height, spring-smoothed parallax layers, a
//! scroll fade gated on viewport width, and the staggered entrance and
//! headline shimmer.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use hearth_animation::AnimationScheduler;
//! use hearth_core::{shared_graph, ElementHandle, Viewport};
//! use hearth_hero::{HeroConfig, HeroParallax};
//!
//! let scheduler = AnimationScheduler::new();
//! let viewport = Viewport::new(1280.0);
//! let element = ElementHandle::with_height(1000.0);
//!
//! let hero = HeroParallax::mount(
//!     &HeroConfig::default(),
//!     shared_graph(),
//!     &viewport,
//!     Arc::new(element),
//!     scheduler.handle(),
//! )
//! .unwrap();
//!
//! viewport.scroll_to(250.0);
//! scheduler.advance(1.0 / 60.0);
//!
//! let frame = hero.frame();
//! assert_eq!(frame.percent, 25);
//! assert_eq!(frame.opacity, 0.8);
//! ```

pub mod config;
pub mod error;
pub mod gate;
pub mod hero;
pub mod motion;
pub mod parallax;
pub mod progress;

pub use config::{
    BreakpointSpec, EntranceConfig, GateConfig, HeroConfig, ParallaxConfig, RescaleInput,
    ShimmerConfig,
};
pub use error::{HeroError, Result};
pub use gate::{fade_floor, hero_opacity, Gate};
pub use hero::{HeroFrame, HeroParallax};
pub use motion::{Entrance, EntranceState, Shimmer};
pub use parallax::{LayerDescriptor, SpringParallaxMapper};
pub use progress::{scroll_fraction, scroll_percent, ScrollProgressTracker};
