//! Hearth Animation System
//!
//! Spring physics, timed tweens, and the frame scheduler that drives them.
//!
//! # Features
//!
//! - **Spring Physics**: RK4-integrated springs with stiffness, damping, mass
//!   and configurable rest thresholds
//! - **Linear Maps**: Clamped two-point rescaling of input signals
//! - **Tweens**: Timed from/to animations with easing, delay and repeat modes
//! - **Scheduler**: Frame clock with deterministic stepping or a background thread
//! - **Interruptible**: Retargeted springs keep their velocity

pub mod easing;
pub mod scheduler;
pub mod spring;
pub mod transform;
pub mod tween;

pub use easing::Easing;
pub use scheduler::{
    AnimatedTween, AnimatedValue, AnimationScheduler, SchedulerHandle, SpringId, TweenId,
    WakeCallback,
};
pub use spring::{Spring, SpringConfig};
pub use transform::{Interpolate, LinearMap};
pub use tween::{Repeat, Tween};
