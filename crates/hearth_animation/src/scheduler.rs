//! Animation scheduler
//!
//! Owns every active spring and tween and advances them once per frame.
//! Animations are registered implicitly through the wrapper types:
//! - `AnimatedValue` - spring-smoothed scalar
//! - `AnimatedTween` - timed from/to animation
//!
//! Frames come from one of three clocks: `advance(dt)` for deterministic
//! stepping (tests, headless simulation), `tick()` for the wall clock, or a
//! background thread started with `start_background()`.

use crate::spring::{Spring, SpringConfig};
use crate::tween::Tween;
use slotmap::{new_key_type, SlotMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

new_key_type! {
    /// Handle to a registered spring
    pub struct SpringId;
    /// Handle to a registered tween
    pub struct TweenId;
}

/// Frame rate of the background thread
const TARGET_FPS: u64 = 120;

/// Internal state of the animation scheduler
struct SchedulerInner {
    springs: SlotMap<SpringId, Spring>,
    tweens: SlotMap<TweenId, Tween>,
    last_frame: Instant,
}

impl SchedulerInner {
    /// Step every animation by `dt` seconds; true while any is still moving
    fn step(&mut self, dt: f32) -> bool {
        let dt_ms = dt * 1000.0;
        for (_, spring) in self.springs.iter_mut() {
            spring.step(dt);
        }
        for (_, tween) in self.tweens.iter_mut() {
            tween.tick(dt_ms);
        }

        // Animations are never removed here, only when their wrapper drops,
        // so settled springs can be retargeted and finished tweens restarted
        self.is_active()
    }

    fn is_active(&self) -> bool {
        self.springs.iter().any(|(_, s)| !s.is_settled())
            || self.tweens.iter().any(|(_, t)| t.is_playing())
    }
}

/// Callback used by the background thread to wake the consumer
///
/// Called on every frame with active animations.
pub type WakeCallback = Arc<dyn Fn() + Send + Sync>;

/// The animation scheduler that ticks all active animations
///
/// Held by the application; components receive a `SchedulerHandle`.
pub struct AnimationScheduler {
    inner: Arc<Mutex<SchedulerInner>>,
    /// Stop signal for the background thread
    stop_flag: Arc<AtomicBool>,
    /// Set by the background thread while animations are active
    needs_redraw: Arc<AtomicBool>,
    thread_handle: Option<JoinHandle<()>>,
    wake_callback: Option<WakeCallback>,
}

impl AnimationScheduler {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(SchedulerInner {
                springs: SlotMap::with_key(),
                tweens: SlotMap::with_key(),
                last_frame: Instant::now(),
            })),
            stop_flag: Arc::new(AtomicBool::new(false)),
            needs_redraw: Arc::new(AtomicBool::new(false)),
            thread_handle: None,
            wake_callback: None,
        }
    }

    /// Set a callback invoked from the background thread on active frames
    pub fn set_wake_callback<F>(&mut self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.wake_callback = Some(Arc::new(callback));
    }

    /// Run the frame clock on a background thread
    ///
    /// The thread sets the `needs_redraw` flag and calls the wake callback
    /// whenever a frame leaves animations active.
    pub fn start_background(&mut self) {
        if self.thread_handle.is_some() {
            return;
        }

        let inner = Arc::clone(&self.inner);
        let stop_flag = Arc::clone(&self.stop_flag);
        let needs_redraw = Arc::clone(&self.needs_redraw);
        let wake_callback = self.wake_callback.clone();
        tracing::debug!(
            "AnimationScheduler: starting background thread at {}fps",
            TARGET_FPS
        );

        self.thread_handle = Some(thread::spawn(move || {
            let frame_duration = Duration::from_micros(1_000_000 / TARGET_FPS);
            let mut frames: u64 = 0;

            while !stop_flag.load(Ordering::Relaxed) {
                let start = Instant::now();

                let has_active = {
                    let mut inner = inner.lock().unwrap();
                    let now = Instant::now();
                    let dt = (now - inner.last_frame).as_secs_f32();
                    inner.last_frame = now;
                    inner.step(dt)
                };

                if has_active {
                    needs_redraw.store(true, Ordering::Release);
                    if let Some(ref callback) = wake_callback {
                        // Once per second at the target rate
                        if frames % TARGET_FPS == 0 {
                            tracing::trace!("Animation thread: waking consumer");
                        }
                        frames += 1;
                        callback();
                    }
                }

                let elapsed = start.elapsed();
                if elapsed < frame_duration {
                    thread::sleep(frame_duration - elapsed);
                }
            }
        }));
    }

    /// Stop and join the background thread
    pub fn stop_background(&mut self) {
        self.stop_flag.store(true, Ordering::Relaxed);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
            tracing::debug!("AnimationScheduler: background thread stopped");
        }
        self.stop_flag.store(false, Ordering::Relaxed);
    }

    pub fn is_background_running(&self) -> bool {
        self.thread_handle.is_some()
    }

    /// Check and clear the needs_redraw flag
    pub fn take_needs_redraw(&self) -> bool {
        self.needs_redraw.swap(false, Ordering::Acquire)
    }

    /// Get a weak handle for registering animations
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Advance every animation by exactly `dt` seconds
    ///
    /// Returns true if any animation is still active.
    pub fn advance(&self, dt: f32) -> bool {
        let mut inner = self.inner.lock().unwrap();
        inner.last_frame = Instant::now();
        inner.step(dt)
    }

    /// Advance every animation by the wall time since the previous frame
    ///
    /// Returns true if any animation is still active.
    pub fn tick(&self) -> bool {
        let mut inner = self.inner.lock().unwrap();
        let now = Instant::now();
        let dt = (now - inner.last_frame).as_secs_f32();
        inner.last_frame = now;
        inner.step(dt)
    }

    pub fn has_active_animations(&self) -> bool {
        self.inner.lock().unwrap().is_active()
    }

    /// Number of registered springs, settled or not
    pub fn spring_count(&self) -> usize {
        self.inner.lock().unwrap().springs.len()
    }

    /// Number of registered tweens, playing or not
    pub fn tween_count(&self) -> usize {
        self.inner.lock().unwrap().tweens.len()
    }
}

impl Default for AnimationScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for AnimationScheduler {
    fn drop(&mut self) {
        self.stop_background();
    }
}

impl std::fmt::Debug for AnimationScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationScheduler")
            .field("springs", &self.spring_count())
            .field("tweens", &self.tween_count())
            .field("background", &self.is_background_running())
            .finish()
    }
}

/// A weak handle to the animation scheduler
///
/// Does not keep the scheduler alive; every operation on a dead handle is a
/// no-op.
#[derive(Clone)]
pub struct SchedulerHandle {
    inner: Weak<Mutex<SchedulerInner>>,
}

impl SchedulerHandle {
    // =========================================================================
    // Spring Operations
    // =========================================================================

    /// Register a spring and return its ID
    pub fn register_spring(&self, spring: Spring) -> Option<SpringId> {
        self.inner.upgrade().map(|inner| {
            let mut guard = inner.lock().unwrap();
            // Reset the frame clock so the first tick doesn't see a huge dt
            guard.last_frame = Instant::now();
            guard.springs.insert(spring)
        })
    }

    pub fn set_spring_target(&self, id: SpringId, target: f32) {
        if let Some(inner) = self.inner.upgrade() {
            if let Some(spring) = inner.lock().unwrap().springs.get_mut(id) {
                spring.set_target(target);
            }
        }
    }

    pub fn get_spring_value(&self, id: SpringId) -> Option<f32> {
        self.inner
            .upgrade()
            .and_then(|inner| inner.lock().unwrap().springs.get(id).map(|s| s.value()))
    }

    /// A missing spring counts as settled
    pub fn is_spring_settled(&self, id: SpringId) -> bool {
        self.inner
            .upgrade()
            .and_then(|inner| inner.lock().unwrap().springs.get(id).map(|s| s.is_settled()))
            .unwrap_or(true)
    }

    pub fn remove_spring(&self, id: SpringId) {
        if let Some(inner) = self.inner.upgrade() {
            inner.lock().unwrap().springs.remove(id);
        }
    }

    // =========================================================================
    // Tween Operations
    // =========================================================================

    pub fn register_tween(&self, tween: Tween) -> Option<TweenId> {
        self.inner
            .upgrade()
            .map(|inner| inner.lock().unwrap().tweens.insert(tween))
    }

    pub fn get_tween_value(&self, id: TweenId) -> Option<f32> {
        self.inner
            .upgrade()
            .and_then(|inner| inner.lock().unwrap().tweens.get(id).map(|t| t.value()))
    }

    pub fn get_tween_progress(&self, id: TweenId) -> Option<f32> {
        self.inner
            .upgrade()
            .and_then(|inner| inner.lock().unwrap().tweens.get(id).map(|t| t.progress()))
    }

    pub fn is_tween_playing(&self, id: TweenId) -> bool {
        self.inner
            .upgrade()
            .and_then(|inner| inner.lock().unwrap().tweens.get(id).map(|t| t.is_playing()))
            .unwrap_or(false)
    }

    pub fn start_tween(&self, id: TweenId) {
        if let Some(inner) = self.inner.upgrade() {
            if let Some(tween) = inner.lock().unwrap().tweens.get_mut(id) {
                tween.start();
            }
        }
    }

    pub fn stop_tween(&self, id: TweenId) {
        if let Some(inner) = self.inner.upgrade() {
            if let Some(tween) = inner.lock().unwrap().tweens.get_mut(id) {
                tween.stop();
            }
        }
    }

    pub fn remove_tween(&self, id: TweenId) {
        if let Some(inner) = self.inner.upgrade() {
            inner.lock().unwrap().tweens.remove(id);
        }
    }

    /// Check if the scheduler is still alive
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

impl std::fmt::Debug for SchedulerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchedulerHandle")
            .field("alive", &self.is_alive())
            .finish()
    }
}

// ============================================================================
// Animated Value (Spring-based)
// ============================================================================

/// A spring-smoothed value that registers itself with the scheduler
///
/// The spring is created lazily on the first target change and removed from
/// the scheduler when the value is dropped.
#[derive(Debug)]
pub struct AnimatedValue {
    handle: SchedulerHandle,
    spring_id: Option<SpringId>,
    config: SpringConfig,
    /// Value held while no spring is registered
    current: f32,
    target: f32,
}

impl AnimatedValue {
    pub fn new(handle: SchedulerHandle, initial: f32, config: SpringConfig) -> Self {
        let initial = if initial.is_finite() { initial } else { 0.0 };
        Self {
            handle,
            spring_id: None,
            config,
            current: initial,
            target: initial,
        }
    }

    /// Retarget; motion continues from the current position and velocity
    pub fn set_target(&mut self, target: f32) {
        if !target.is_finite() {
            tracing::warn!("AnimatedValue: ignoring non-finite target {}", target);
            return;
        }
        self.target = target;

        if let Some(id) = self.spring_id {
            self.handle.set_spring_target(id, target);
        } else if (target - self.current).abs() > 0.001 {
            let spring = Spring::new(self.config, self.current);
            if let Some(id) = self.handle.register_spring(spring) {
                self.spring_id = Some(id);
                self.handle.set_spring_target(id, target);
            }
        }
    }

    /// Current animated value
    pub fn get(&self) -> f32 {
        match self.spring_id {
            Some(id) => self.handle.get_spring_value(id).unwrap_or(self.target),
            None => self.current,
        }
    }

    /// Jump to `value` without animating, releasing any spring
    pub fn set_immediate(&mut self, value: f32) {
        if let Some(id) = self.spring_id.take() {
            self.handle.remove_spring(id);
        }
        let value = if value.is_finite() { value } else { 0.0 };
        self.current = value;
        self.target = value;
    }

    /// True only while the spring is moving toward its target
    pub fn is_animating(&self) -> bool {
        self.spring_id
            .map(|id| !self.handle.is_spring_settled(id))
            .unwrap_or(false)
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn config(&self) -> &SpringConfig {
        &self.config
    }
}

impl Drop for AnimatedValue {
    fn drop(&mut self) {
        if let Some(id) = self.spring_id.take() {
            self.handle.remove_spring(id);
        }
    }
}

// ============================================================================
// Animated Tween
// ============================================================================

/// A tween registered with the scheduler for as long as this value lives
#[derive(Debug)]
pub struct AnimatedTween {
    handle: SchedulerHandle,
    tween_id: Option<TweenId>,
    /// Value reported when the scheduler is gone
    fallback: f32,
}

impl AnimatedTween {
    /// Register `tween` without starting it
    pub fn new(handle: SchedulerHandle, tween: Tween) -> Self {
        let fallback = tween.from();
        let tween_id = handle.register_tween(tween);
        Self {
            handle,
            tween_id,
            fallback,
        }
    }

    /// Register and immediately start `tween`
    pub fn started(handle: SchedulerHandle, tween: Tween) -> Self {
        let anim = Self::new(handle, tween);
        anim.start();
        anim
    }

    pub fn start(&self) {
        if let Some(id) = self.tween_id {
            self.handle.start_tween(id);
        }
    }

    pub fn stop(&self) {
        if let Some(id) = self.tween_id {
            self.handle.stop_tween(id);
        }
    }

    pub fn get(&self) -> f32 {
        self.tween_id
            .and_then(|id| self.handle.get_tween_value(id))
            .unwrap_or(self.fallback)
    }

    pub fn progress(&self) -> f32 {
        self.tween_id
            .and_then(|id| self.handle.get_tween_progress(id))
            .unwrap_or(0.0)
    }

    pub fn is_playing(&self) -> bool {
        self.tween_id
            .map(|id| self.handle.is_tween_playing(id))
            .unwrap_or(false)
    }
}

impl Drop for AnimatedTween {
    fn drop(&mut self) {
        if let Some(id) = self.tween_id.take() {
            self.handle.remove_tween(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tween::Repeat;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_scheduler_tick() {
        let scheduler = AnimationScheduler::new();

        let handle = scheduler.handle();

        let id = handle
            .register_spring(Spring::new(SpringConfig::stiff(), 0.0))
            .unwrap();
        handle.set_spring_target(id, 100.0);

        assert!(scheduler.advance(1.0 / 60.0));

        let value = handle.get_spring_value(id).unwrap();
        assert!(value > 0.0);
    }

    #[test]
    fn test_wall_clock_tick() {
        let scheduler = AnimationScheduler::new();
        let handle = scheduler.handle();
        let id = handle
            .register_spring(Spring::new(SpringConfig::stiff(), 0.0))
            .unwrap();
        handle.set_spring_target(id, 100.0);

        thread::sleep(Duration::from_millis(5));
        assert!(scheduler.tick());
        assert!(handle.get_spring_value(id).unwrap() > 0.0);
    }

    #[test]
    fn test_animated_value() {
        let scheduler = AnimationScheduler::new();
        let handle = scheduler.handle();

        let mut value = AnimatedValue::new(handle, 0.0, SpringConfig::stiff());

        assert_eq!(value.get(), 0.0);
        assert!(!value.is_animating());

        value.set_target(100.0);
        assert!(value.is_animating());

        scheduler.advance(1.0 / 60.0);
        assert!(value.get() > 0.0);

        for _ in 0..120 {
            scheduler.advance(1.0 / 60.0);
        }
        assert!(!value.is_animating());
        assert_eq!(value.get(), 100.0);
    }

    #[test]
    fn test_animated_value_below_threshold_registers_nothing() {
        let scheduler = AnimationScheduler::new();
        let mut value = AnimatedValue::new(scheduler.handle(), 0.0, SpringConfig::stiff());

        value.set_target(0.0005);
        assert_eq!(scheduler.spring_count(), 0);

        value.set_target(f32::NAN);
        assert_eq!(value.target(), 0.0005);
    }

    #[test]
    fn test_animated_value_drop_removes_spring() {
        let scheduler = AnimationScheduler::new();
        {
            let mut value = AnimatedValue::new(scheduler.handle(), 0.0, SpringConfig::parallax());
            value.set_target(-50.0);
            assert_eq!(scheduler.spring_count(), 1);
        }
        assert_eq!(scheduler.spring_count(), 0);
    }

    #[test]
    fn test_set_immediate_releases_spring() {
        let scheduler = AnimationScheduler::new();
        let mut value = AnimatedValue::new(scheduler.handle(), 0.0, SpringConfig::stiff());
        value.set_target(10.0);
        value.set_immediate(3.0);

        assert_eq!(scheduler.spring_count(), 0);
        assert_eq!(value.get(), 3.0);
        assert!(!value.is_animating());
    }

    #[test]
    fn test_animated_tween() {
        let scheduler = AnimationScheduler::new();
        let anim = AnimatedTween::started(scheduler.handle(), Tween::new(0.0, 100.0, 1000.0));

        assert!(anim.is_playing());
        assert_eq!(anim.get(), 0.0);

        scheduler.advance(0.5);
        assert!((anim.get() - 50.0).abs() < 1e-2);

        scheduler.advance(0.6);
        assert_eq!(anim.get(), 100.0);
        assert!(!anim.is_playing());
        assert!(!scheduler.has_active_animations());

        drop(anim);
        assert_eq!(scheduler.tween_count(), 0);
    }

    #[test]
    fn test_looping_tween_keeps_scheduler_active() {
        let scheduler = AnimationScheduler::new();
        let _anim = AnimatedTween::started(
            scheduler.handle(),
            Tween::new(0.0, 1.0, 100.0).repeat(Repeat::Loop(None)),
        );
        for _ in 0..100 {
            assert!(scheduler.advance(1.0 / 60.0));
        }
    }

    #[test]
    fn test_handle_weak_reference() {
        let handle = {
            let scheduler = AnimationScheduler::new();
            scheduler.handle()
        };

        assert!(!handle.is_alive());

        // Operations should safely no-op
        assert!(handle
            .register_spring(Spring::new(SpringConfig::stiff(), 0.0))
            .is_none());
        assert!(handle.register_tween(Tween::new(0.0, 1.0, 10.0)).is_none());

        let anim = AnimatedTween::started(handle, Tween::new(0.25, 1.0, 10.0));
        assert_eq!(anim.get(), 0.25);
    }

    #[test]
    fn test_scheduler_counts() {
        let scheduler = AnimationScheduler::new();

        assert_eq!(scheduler.spring_count(), 0);
        assert_eq!(scheduler.tween_count(), 0);

        let handle = scheduler.handle();
        let spring_id = handle
            .register_spring(Spring::new(SpringConfig::stiff(), 0.0))
            .unwrap();
        let tween_id = handle
            .register_tween(Tween::new(0.0, 1.0, 1000.0))
            .unwrap();
        handle.start_tween(tween_id);

        assert_eq!(scheduler.spring_count(), 1);
        assert_eq!(scheduler.tween_count(), 1);
        assert!(scheduler.has_active_animations());

        handle.remove_tween(tween_id);
        handle.remove_spring(spring_id);
        assert_eq!(scheduler.tween_count(), 0);
        assert_eq!(scheduler.spring_count(), 0);
    }

    #[test]
    fn test_background_thread_wakes_consumer() {
        let mut scheduler = AnimationScheduler::new();
        let wakes = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&wakes);
        scheduler.set_wake_callback(move || {
            counter.fetch_add(1, Ordering::Relaxed);
        });

        let _anim = AnimatedTween::started(
            scheduler.handle(),
            Tween::new(0.0, 1.0, 1000.0).repeat(Repeat::Loop(None)),
        );

        scheduler.start_background();
        assert!(scheduler.is_background_running());
        thread::sleep(Duration::from_millis(100));
        scheduler.stop_background();

        assert!(!scheduler.is_background_running());
        assert!(wakes.load(Ordering::Relaxed) > 0);
        assert!(scheduler.take_needs_redraw());
        assert!(!scheduler.take_needs_redraw());
    }
}
