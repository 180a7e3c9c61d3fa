//! Time-based hero motion
//!
//! The staggered "fade in up" entrance of the hero blocks and the looping
//! headline shimmer. Both are tweens owned by the animation scheduler and
//! released when these values drop.

use crate::config::{EntranceConfig, ShimmerConfig};
use hearth_animation::{AnimatedTween, Repeat, SchedulerHandle, Tween};
use serde::Serialize;
use smallvec::SmallVec;

/// Visual state of one entrance block
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct EntranceState {
    pub index: usize,
    pub opacity: f32,
    /// Downward offset in pixels; 0 once the block has landed
    pub offset_y: f32,
}

/// Staggered entrance of the hero blocks
#[derive(Debug)]
pub struct Entrance {
    distance: f32,
    blocks: SmallVec<[AnimatedTween; 5]>,
}

impl Entrance {
    /// Register one eased 0-to-1 tween per block and start them all
    ///
    /// Block `i` waits `delay + i * stagger` before it moves.
    pub fn start(config: &EntranceConfig, scheduler: &SchedulerHandle) -> Self {
        let easing = config.easing();
        let blocks = (0..config.blocks)
            .map(|index| {
                let tween = Tween::new(0.0, 1.0, config.duration_ms)
                    .delay(config.delay_for(index))
                    .easing(easing);
                AnimatedTween::started(scheduler.clone(), tween)
            })
            .collect();

        tracing::debug!("Entrance started with {} blocks", config.blocks);
        Self {
            distance: config.distance,
            blocks,
        }
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn states(&self) -> SmallVec<[EntranceState; 5]> {
        self.blocks
            .iter()
            .enumerate()
            .map(|(index, block)| {
                let eased = block.get();
                EntranceState {
                    index,
                    opacity: eased.clamp(0.0, 1.0),
                    offset_y: self.distance * (1.0 - eased),
                }
            })
            .collect()
    }

    /// True once every block has landed
    pub fn is_complete(&self) -> bool {
        self.blocks.iter().all(|block| !block.is_playing())
    }

    /// Hold every block where it is
    pub fn stop(&self) {
        for block in &self.blocks {
            block.stop();
        }
    }
}

/// Looping gradient sweep across the headline
#[derive(Debug)]
pub struct Shimmer {
    sweep: AnimatedTween,
}

impl Shimmer {
    /// Start sweeping, reversing direction every cycle, forever
    pub fn start(config: &ShimmerConfig, scheduler: &SchedulerHandle) -> Self {
        let tween = Tween::new(config.from, config.to, config.duration_ms)
            .repeat(Repeat::PingPong(None));
        Self {
            sweep: AnimatedTween::started(scheduler.clone(), tween),
        }
    }

    /// Background position in percent
    pub fn position(&self) -> f32 {
        self.sweep.get()
    }

    pub fn stop(&self) {
        self.sweep.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_animation::AnimationScheduler;

    #[test]
    fn test_entrance_initial_state() {
        let scheduler = AnimationScheduler::new();
        let entrance = Entrance::start(&EntranceConfig::default(), &scheduler.handle());

        assert_eq!(entrance.len(), 5);
        assert_eq!(scheduler.tween_count(), 5);
        for state in entrance.states() {
            assert_eq!(state.opacity, 0.0);
            assert_eq!(state.offset_y, 24.0);
        }
    }

    #[test]
    fn test_entrance_staggers_in_order() {
        let scheduler = AnimationScheduler::new();
        let entrance = Entrance::start(&EntranceConfig::default(), &scheduler.handle());

        // 50ms delay + 50ms stagger: at 140ms blocks 0 and 1 have begun, 2 has not
        for _ in 0..14 {
            scheduler.advance(0.01);
        }
        let states = entrance.states();
        assert!(states[0].opacity > states[1].opacity);
        assert!(states[1].opacity > 0.0);
        assert_eq!(states[2].opacity, 0.0);
        assert_eq!(states[4].offset_y, 24.0);
    }

    #[test]
    fn test_entrance_lands() {
        let scheduler = AnimationScheduler::new();
        let entrance = Entrance::start(&EntranceConfig::default(), &scheduler.handle());

        // Last block: 250ms delay + 640ms
        for _ in 0..60 {
            scheduler.advance(1.0 / 60.0);
        }
        assert!(entrance.is_complete());
        for state in entrance.states() {
            assert_eq!(state.opacity, 1.0);
            assert_eq!(state.offset_y, 0.0);
        }
    }

    #[test]
    fn test_entrance_drop_releases_tweens() {
        let scheduler = AnimationScheduler::new();
        let entrance = Entrance::start(&EntranceConfig::default(), &scheduler.handle());
        assert_eq!(scheduler.tween_count(), 5);
        drop(entrance);
        assert_eq!(scheduler.tween_count(), 0);
    }

    #[test]
    fn test_shimmer_bounces_within_range() {
        let scheduler = AnimationScheduler::new();
        let shimmer = Shimmer::start(&ShimmerConfig::default(), &scheduler.handle());
        assert_eq!(shimmer.position(), 0.0);

        // Rising for the first 20s, falling for the next 20s
        let mut previous = shimmer.position();
        for _ in 0..19 {
            scheduler.advance(1.0);
            let position = shimmer.position();
            assert!(position > previous);
            previous = position;
        }
        scheduler.advance(3.0);
        let position = shimmer.position();
        assert!(position < previous);
        assert!((0.0..=200.0).contains(&position));

        for _ in 0..200 {
            scheduler.advance(0.25);
            assert!((0.0..=200.0).contains(&shimmer.position()));
        }
    }
}
