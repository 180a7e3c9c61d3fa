//! Viewport environment
//!
//! The platform side of the motion engine: the document scroll offset, the
//! viewport width, and on-demand measurement of rendered elements. A host
//! (browser bridge, native window, or the CLI's simulator) pushes scroll and
//! resize samples into a [`Viewport`]; components subscribe to them.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use crate::events::{EventSource, Subscription};

// ============================================================================
// Breakpoints
// ============================================================================

/// Named viewport width breakpoints
///
/// Widths follow the common Material defaults. A breakpoint is "up" when the
/// viewport is at least its minimum width.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Breakpoint {
    Xs,
    Sm,
    Md,
    Lg,
    Xl,
}

impl Breakpoint {
    pub const ALL: [Breakpoint; 5] = [
        Breakpoint::Xs,
        Breakpoint::Sm,
        Breakpoint::Md,
        Breakpoint::Lg,
        Breakpoint::Xl,
    ];

    /// Minimum viewport width in pixels
    pub fn min_width(self) -> f32 {
        match self {
            Breakpoint::Xs => 0.0,
            Breakpoint::Sm => 600.0,
            Breakpoint::Md => 900.0,
            Breakpoint::Lg => 1200.0,
            Breakpoint::Xl => 1536.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Breakpoint::Xs => "xs",
            Breakpoint::Sm => "sm",
            Breakpoint::Md => "md",
            Breakpoint::Lg => "lg",
            Breakpoint::Xl => "xl",
        }
    }
}

// ============================================================================
// Element Metrics
// ============================================================================

/// On-demand measurement of a rendered element
///
/// Implementations return the current rendered height in pixels, or 0 when
/// the element is not mounted or not yet laid out.
pub trait ElementMetrics: Send + Sync {
    fn height(&self) -> f32;
}

/// A measurable element whose height is set by the host
///
/// Clones share the same measurement.
#[derive(Clone, Debug, Default)]
pub struct ElementHandle {
    height_bits: Arc<AtomicU32>,
}

impl ElementHandle {
    /// An element that has not been laid out yet (height 0)
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_height(height: f32) -> Self {
        let handle = Self::new();
        handle.set_height(height);
        handle
    }

    /// Record a new layout height
    pub fn set_height(&self, height: f32) {
        self.height_bits.store(height.to_bits(), Ordering::Release);
    }

    /// Forget the layout, as when the element leaves the tree
    pub fn unmount(&self) {
        self.set_height(0.0);
    }
}

impl ElementMetrics for ElementHandle {
    fn height(&self) -> f32 {
        f32::from_bits(self.height_bits.load(Ordering::Acquire))
    }
}

// ============================================================================
// Viewport
// ============================================================================

#[derive(Clone, Copy, Debug)]
struct ViewportState {
    scroll_y: f32,
    width: f32,
}

/// Scroll and resize sources for one document
pub struct Viewport {
    state: Mutex<ViewportState>,
    scroll: EventSource<f32>,
    resize: EventSource<f32>,
}

impl Viewport {
    pub fn new(width: f32) -> Self {
        Self {
            state: Mutex::new(ViewportState {
                scroll_y: 0.0,
                width,
            }),
            scroll: EventSource::new(),
            resize: EventSource::new(),
        }
    }

    /// Current vertical scroll offset in pixels
    pub fn scroll_y(&self) -> f32 {
        self.state.lock().unwrap().scroll_y
    }

    /// Current viewport width in pixels
    pub fn width(&self) -> f32 {
        self.state.lock().unwrap().width
    }

    /// Record a scroll sample and notify scroll listeners
    ///
    /// Every sample is delivered, even when the offset is unchanged.
    pub fn scroll_to(&self, scroll_y: f32) {
        self.state.lock().unwrap().scroll_y = scroll_y;
        tracing::trace!("viewport scroll_y={}", scroll_y);
        self.scroll.emit(&scroll_y);
    }

    /// Record a new viewport width and notify resize listeners
    pub fn resize(&self, width: f32) {
        self.state.lock().unwrap().width = width;
        tracing::trace!("viewport width={}", width);
        self.resize.emit(&width);
    }

    #[must_use = "dropping the subscription immediately unregisters the listener"]
    pub fn on_scroll<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&f32) + Send + Sync + 'static,
    {
        self.scroll.subscribe(listener)
    }

    #[must_use = "dropping the subscription immediately unregisters the listener"]
    pub fn on_resize<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&f32) + Send + Sync + 'static,
    {
        self.resize.subscribe(listener)
    }

    pub fn scroll_listener_count(&self) -> usize {
        self.scroll.listener_count()
    }

    pub fn resize_listener_count(&self) -> usize {
        self.resize.listener_count()
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(Breakpoint::Lg.min_width())
    }
}
