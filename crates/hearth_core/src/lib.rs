//! Hearth Core Runtime
//!
//! This crate provides the foundational primitives shared by the Hearth
//! motion crates:
//!
//! - **Reactive Signals**: Fine-grained reactivity with derived values and effects
//! - **Event Sources**: Listener registries with RAII subscriptions
//! - **Viewport**: Scroll and resize notifications, breakpoints, element metrics
//!
//! # Example
//!
//! ```rust
//! use hearth_core::reactive::ReactiveGraph;
//!
//! let mut graph = ReactiveGraph::new();
//!
//! // Create a signal
//! let percent = graph.create_signal(0u8);
//!
//! // Create a derived value
//! let fade = graph.create_derived(move |g| {
//!     1.0 - g.get(percent).unwrap_or(0) as f32 / 100.0
//! });
//!
//! // Update the signal
//! graph.set(percent, 25);
//! assert_eq!(graph.get_derived(fade), Some(0.75));
//! ```

pub mod events;
pub mod reactive;
pub mod viewport;

pub use events::{EventSource, ListenerId, Subscription};
pub use reactive::{
    Derived, DerivedId, Effect, EffectId, ReactiveGraph, ReactiveStats, SharedReactiveGraph,
    Signal, SignalId, State,
};
pub use reactive::shared_graph;
pub use viewport::{Breakpoint, ElementHandle, ElementMetrics, Viewport};
