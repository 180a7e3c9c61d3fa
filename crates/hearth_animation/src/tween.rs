//! Timed from/to animations
//!
//! A [`Tween`] interpolates between two values over a fixed duration, after
//! an optional delay, shaped by an [`Easing`] curve. Repeat modes cover
//! one-shot transitions, loops and alternating (ping-pong) cycles.

use crate::easing::Easing;
use crate::transform::Interpolate;
use serde::{Deserialize, Serialize};

/// How a tween behaves once its first cycle completes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Repeat {
    /// Play a single cycle and hold the end value
    #[default]
    Once,
    /// Restart from the beginning; `None` loops forever
    Loop(Option<u32>),
    /// Alternate direction every cycle; `None` alternates forever
    PingPong(Option<u32>),
}

impl Repeat {
    fn cycles(&self) -> Option<u32> {
        match *self {
            Repeat::Once => Some(1),
            Repeat::Loop(n) | Repeat::PingPong(n) => n.map(|n| n.max(1)),
        }
    }

    fn alternates(&self) -> bool {
        matches!(self, Repeat::PingPong(_))
    }
}

/// A timed animation between two values
#[derive(Clone, Debug)]
pub struct Tween {
    from: f32,
    to: f32,
    duration_ms: f32,
    delay_ms: f32,
    easing: Easing,
    repeat: Repeat,
    /// Time since `start`, including the delay
    elapsed_ms: f32,
    playing: bool,
}

impl Tween {
    pub fn new(from: f32, to: f32, duration_ms: f32) -> Self {
        Self {
            from,
            to,
            duration_ms: duration_ms.max(0.0),
            delay_ms: 0.0,
            easing: Easing::Linear,
            repeat: Repeat::Once,
            elapsed_ms: 0.0,
            playing: false,
        }
    }

    pub fn delay(mut self, delay_ms: f32) -> Self {
        self.delay_ms = delay_ms.max(0.0);
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    /// Start (or restart) from the beginning, delay included
    pub fn start(&mut self) {
        self.elapsed_ms = 0.0;
        self.playing = true;
    }

    /// Stop in place; the current value is held
    pub fn stop(&mut self) {
        self.playing = false;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Whether the delay has elapsed since `start`
    pub fn has_begun(&self) -> bool {
        self.elapsed_ms > self.delay_ms
    }

    pub fn from(&self) -> f32 {
        self.from
    }

    pub fn to(&self) -> f32 {
        self.to
    }

    /// Advance by `dt_ms` milliseconds
    pub fn tick(&mut self, dt_ms: f32) {
        if !self.playing || dt_ms <= 0.0 || !dt_ms.is_finite() {
            return;
        }
        self.elapsed_ms += dt_ms;

        if self.duration_ms <= 0.0 {
            if self.has_begun() {
                self.playing = false;
            }
            return;
        }

        match self.repeat.cycles() {
            Some(cycles) => {
                let end = self.delay_ms + self.duration_ms * cycles as f32;
                if self.elapsed_ms >= end {
                    self.elapsed_ms = end;
                    self.playing = false;
                }
            }
            None => {
                // Fold whole pairs of cycles away so long-running loops keep
                // their precision; an even count preserves ping-pong direction
                let period = self.duration_ms * 2.0;
                let local = self.elapsed_ms - self.delay_ms;
                if local >= period {
                    self.elapsed_ms = self.delay_ms + local % period;
                }
            }
        }
    }

    /// Linear position within the current cycle, direction applied
    pub fn progress(&self) -> f32 {
        let local = (self.elapsed_ms - self.delay_ms).max(0.0);
        if self.duration_ms <= 0.0 {
            return if self.has_begun() { 1.0 } else { 0.0 };
        }

        let cycles_done = local / self.duration_ms;
        let mut cycle = cycles_done.floor() as u32;
        let mut t = cycles_done - cycle as f32;
        if let Some(total) = self.repeat.cycles() {
            if cycle >= total {
                cycle = total - 1;
                t = 1.0;
            }
        }

        if self.repeat.alternates() && cycle % 2 == 1 {
            1.0 - t
        } else {
            t
        }
    }

    /// Current eased value
    pub fn value(&self) -> f32 {
        self.from.lerp(&self.to, self.easing.apply(self.progress()))
    }
}
