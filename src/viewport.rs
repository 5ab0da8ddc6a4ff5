// Viewport shell: backing-store size tracking against the observed container size and
// device pixel ratio. Reallocates only when the backing size actually changes.

use serde::{Deserialize, Serialize};

/// Container size in logical (CSS) pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct LogicalSize {
    pub width: f64,
    pub height: f64,
}

/// Backing store size in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BackingSize {
    pub width: u32,
    pub height: u32,
}

impl BackingSize {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
    pub logical: LogicalSize,
    pub backing: BackingSize,
    pub device_pixel_ratio: f64,
}

impl Default for ViewportState {
    fn default() -> Self {
        ViewportState {
            logical: LogicalSize::default(),
            backing: BackingSize::default(),
            device_pixel_ratio: 1.0,
        }
    }
}

impl ViewportState {
    /// Whether there is anything to draw into.
    pub fn is_drawable(&self) -> bool {
        !self.backing.is_empty() && self.logical.width > 0.0 && self.logical.height > 0.0
    }
}

/// Result of observing a container size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeOutcome {
    /// Backing size unchanged; existing pixels stay valid.
    Unchanged,
    /// Backing store must be reallocated at this size.
    Reallocated(BackingSize),
}

/// Host-side size observer (a ResizeObserver in the browser).
pub trait SizeObserver {
    fn disconnect(&mut self);
}

/// Owns the viewport state and the observer feeding it.
#[derive(Default)]
pub struct ViewportShell {
    state: ViewportState,
    observer: Option<Box<dyn SizeObserver>>,
    reallocations: u32,
}

impl ViewportShell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ViewportState {
        &self.state
    }

    /// Number of backing-store reallocations so far.
    pub fn reallocations(&self) -> u32 {
        self.reallocations
    }

    pub fn is_observing(&self) -> bool {
        self.observer.is_some()
    }

    /// Attach the observer reporting container sizes, disconnecting any previous one.
    pub fn attach(&mut self, observer: Box<dyn SizeObserver>) {
        self.detach();
        self.observer = Some(observer);
    }

    /// Disconnect the observer. Safe to call repeatedly.
    pub fn detach(&mut self) {
        if let Some(mut observer) = self.observer.take() {
            observer.disconnect();
        }
    }

    /// Record an observed container size. Non-finite or negative sizes read as zero and
    /// a missing or invalid pixel ratio reads as 1.
    pub fn observe(&mut self, client_width: f64, client_height: f64, device_pixel_ratio: f64) -> ResizeOutcome {
        let dpr = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
            device_pixel_ratio
        } else {
            1.0
        };
        let logical = LogicalSize {
            width: sanitize_extent(client_width),
            height: sanitize_extent(client_height),
        };
        let backing = BackingSize {
            width: (logical.width * dpr).round() as u32,
            height: (logical.height * dpr).round() as u32,
        };

        let unchanged = backing == self.state.backing && dpr == self.state.device_pixel_ratio;
        // Nothing allocated before or after: no store to rebuild.
        if unchanged || (backing.is_empty() && self.state.backing.is_empty()) {
            self.state.logical = logical;
            self.state.device_pixel_ratio = dpr;
            return ResizeOutcome::Unchanged;
        }

        self.state = ViewportState {
            logical,
            backing,
            device_pixel_ratio: dpr,
        };
        self.reallocations += 1;
        log::debug!(
            "viewport {}x{} @{} -> backing {}x{}",
            logical.width,
            logical.height,
            dpr,
            backing.width,
            backing.height
        );
        ResizeOutcome::Reallocated(backing)
    }
}

impl std::fmt::Debug for ViewportShell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewportShell")
            .field("state", &self.state)
            .field("observing", &self.observer.is_some())
            .field("reallocations", &self.reallocations)
            .finish()
    }
}

fn sanitize_extent(value: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}
