//! Scroll progress tracking
//!
//! Converts raw scroll samples into progress relative to the rendered height
//! of a tracked element. The element is measured again on every sample, so
//! layout changes between samples are picked up without invalidation.

use hearth_core::{ElementMetrics, SharedReactiveGraph, Signal, State, Subscription, Viewport};
use std::sync::Arc;

/// Completed percentage of `height` covered by `offset`, in [0, 100]
///
/// Floors toward zero and saturates at 100. A zero or non-finite height, a
/// negative offset, or a non-finite offset all yield 0.
pub fn scroll_percent(offset: f32, height: f32) -> u8 {
    if !is_measurable(offset, height) {
        return 0;
    }
    if offset >= height {
        return 100;
    }
    // f64 keeps `offset * 100` exact and finite for every f32 input
    (f64::from(offset) * 100.0 / f64::from(height))
        .floor()
        .min(100.0) as u8
}

/// Covered fraction of `height`, in [0, 1]
pub fn scroll_fraction(offset: f32, height: f32) -> f32 {
    if !is_measurable(offset, height) {
        return 0.0;
    }
    (offset / height).min(1.0)
}

fn is_measurable(offset: f32, height: f32) -> bool {
    offset.is_finite() && height.is_finite() && height > 0.0 && offset > 0.0
}

/// Observes a viewport's scroll samples and publishes progress signals
///
/// All three outputs are written in one batch per sample, so effects that
/// read several of them run once.
pub struct ScrollProgressTracker {
    percent: State<u8>,
    fraction: State<f32>,
    offset: State<f32>,
    subscription: Subscription,
}

impl ScrollProgressTracker {
    /// Subscribe to `viewport` and measure `element` on every sample
    ///
    /// Outputs start at 0 and stay there until the first sample arrives.
    pub fn mount(
        graph: SharedReactiveGraph,
        viewport: &Viewport,
        element: Arc<dyn ElementMetrics>,
    ) -> Self {
        let (percent, fraction, offset) = {
            let mut g = graph.lock().unwrap();
            (
                g.create_signal(0u8),
                g.create_signal(0.0f32),
                g.create_signal(0.0f32),
            )
        };

        let listener_graph = graph.clone();
        let subscription = viewport.on_scroll(move |&scroll_y| {
            let height = element.height();
            let sample_percent = scroll_percent(scroll_y, height);
            let sample_fraction = scroll_fraction(scroll_y, height);
            let sample_offset = if scroll_y.is_finite() { scroll_y } else { 0.0 };
            tracing::trace!(
                "scroll sample offset={} height={} percent={}",
                scroll_y,
                height,
                sample_percent
            );

            listener_graph.lock().unwrap().batch(|g| {
                g.set(percent, sample_percent);
                g.set(fraction, sample_fraction);
                g.set(offset, sample_offset);
            });
        });

        tracing::debug!("ScrollProgressTracker mounted");
        Self {
            percent: State::new(percent, graph.clone()),
            fraction: State::new(fraction, graph.clone()),
            offset: State::new(offset, graph),
            subscription,
        }
    }

    /// Progress in whole percent, [0, 100]
    pub fn percent(&self) -> &State<u8> {
        &self.percent
    }

    /// Progress as a fraction, [0, 1]
    pub fn fraction(&self) -> &State<f32> {
        &self.fraction
    }

    /// The latest raw scroll offset
    pub fn offset(&self) -> &State<f32> {
        &self.offset
    }

    pub fn signals(&self) -> (Signal<u8>, Signal<f32>, Signal<f32>) {
        (
            self.percent.signal(),
            self.fraction.signal(),
            self.offset.signal(),
        )
    }

    pub fn is_mounted(&self) -> bool {
        self.subscription.is_active()
    }

    /// Stop observing scroll samples; outputs keep their last values
    pub fn unmount(&mut self) {
        if self.subscription.is_active() {
            self.subscription.unsubscribe();
            tracing::debug!("ScrollProgressTracker unmounted");
        }
    }
}

impl Drop for ScrollProgressTracker {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_core::{shared_graph, ElementHandle};

    fn mount(height: f32) -> (Viewport, ElementHandle, ScrollProgressTracker) {
        let viewport = Viewport::default();
        let element = ElementHandle::with_height(height);
        let tracker =
            ScrollProgressTracker::mount(shared_graph(), &viewport, Arc::new(element.clone()));
        (viewport, element, tracker)
    }

    #[test]
    fn test_percent_floors() {
        let cases = [
            (0.0, 0),
            (9.99, 0),
            (10.0, 1),
            (250.0, 25),
            (999.0, 99),
            (1000.0, 100),
        ];
        for (offset, expected) in cases {
            assert_eq!(scroll_percent(offset, 1000.0), expected, "offset {}", offset);
        }
    }

    #[test]
    fn test_percent_within_bounds() {
        let heights = [1.0, 3.0, 7.5, 640.0, 1000.0, 12345.0];
        for height in heights {
            for step in 0..=200 {
                let offset = height * step as f32 / 200.0;
                let percent = scroll_percent(offset, height);
                assert!(percent <= 100);
            }
        }
    }

    #[test]
    fn test_percent_saturates() {
        assert_eq!(scroll_percent(1200.0, 1000.0), 100);
        assert_eq!(scroll_percent(f32::MAX, 1.0), 100);
        assert_eq!(scroll_fraction(5000.0, 1000.0), 1.0);
    }

    #[test]
    fn test_percent_near_float_limits() {
        assert_eq!(scroll_percent(f32::MAX / 2.0, f32::MAX), 50);
        assert_eq!(scroll_percent(f32::MAX / 4.0, f32::MAX / 2.0), 50);
        assert_eq!(scroll_percent(1.0e30, 1.0e38), 0);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(scroll_percent(500.0, 0.0), 0);
        assert_eq!(scroll_percent(-50.0, 1000.0), 0);
        assert_eq!(scroll_percent(f32::NAN, 1000.0), 0);
        assert_eq!(scroll_percent(100.0, f32::INFINITY), 0);
        assert_eq!(scroll_fraction(100.0, -10.0), 0.0);
    }

    #[test]
    fn test_tracker_starts_at_zero() {
        let (_viewport, _element, tracker) = mount(1000.0);
        assert_eq!(tracker.percent().get(), 0);
        assert_eq!(tracker.fraction().get(), 0.0);
        assert_eq!(tracker.offset().get(), 0.0);
    }

    #[test]
    fn test_tracker_follows_scroll() {
        let (viewport, _element, tracker) = mount(1000.0);

        viewport.scroll_to(250.0);
        assert_eq!(tracker.percent().get(), 25);
        assert_eq!(tracker.fraction().get(), 0.25);
        assert_eq!(tracker.offset().get(), 250.0);

        viewport.scroll_to(1200.0);
        assert_eq!(tracker.percent().get(), 100);
        assert_eq!(tracker.offset().get(), 1200.0);
    }

    #[test]
    fn test_tracker_remeasures_each_sample() {
        let (viewport, element, tracker) = mount(1000.0);

        viewport.scroll_to(500.0);
        assert_eq!(tracker.percent().get(), 50);

        element.set_height(2000.0);
        viewport.scroll_to(500.0);
        assert_eq!(tracker.percent().get(), 25);

        element.unmount();
        viewport.scroll_to(500.0);
        assert_eq!(tracker.percent().get(), 0);
    }

    #[test]
    fn test_tracker_unmount_releases_subscription() {
        let (viewport, _element, mut tracker) = mount(1000.0);
        assert_eq!(viewport.scroll_listener_count(), 1);

        viewport.scroll_to(100.0);
        tracker.unmount();
        assert!(!tracker.is_mounted());
        assert_eq!(viewport.scroll_listener_count(), 0);

        viewport.scroll_to(900.0);
        assert_eq!(tracker.percent().get(), 10);

        // Dropping after an explicit unmount is a no-op
        drop(tracker);
        assert_eq!(viewport.scroll_listener_count(), 0);
    }

    #[test]
    fn test_batched_write_runs_effect_once() {
        let graph = shared_graph();
        let viewport = Viewport::default();
        let tracker = ScrollProgressTracker::mount(
            graph.clone(),
            &viewport,
            Arc::new(ElementHandle::with_height(1000.0)),
        );
        let (percent, fraction, offset) = tracker.signals();

        let runs = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = runs.clone();
        let _effect = graph.lock().unwrap().create_effect(move |g| {
            let _ = (g.get(percent), g.get(fraction), g.get(offset));
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        });
        assert_eq!(runs.load(std::sync::atomic::Ordering::SeqCst), 1);

        viewport.scroll_to(300.0);
        assert_eq!(runs.load(std::sync::atomic::Ordering::SeqCst), 2);
    }
}
