//! # Viewport Size Observer
//!
//! Derives preview sizing from the viewport width.
//!
//! ## Breakpoints
//!
//! ```text
//! width:   0 ──────── 468 ──────── 768 ──────────▶
//! QR:      Small 200  │ Medium 220 │ Large 256
//! barcode: compact (12/5/1/50)     │ full (16/10/2/100)
//! ```
//!
//! A [`Window`] publishes its width on a `tokio::sync::watch` channel. A
//! [`ViewportObserver`] holds one receiver. Dropping the observer is the
//! unmount and releases its listener.

use tokio::sync::watch;

/// Width at which the QR preview grows from small to medium.
pub const MEDIUM_BREAKPOINT: u32 = 468;

/// Width at which the QR preview and the barcode switch to full size.
pub const LARGE_BREAKPOINT: u32 = 768;

/// Discrete QR preview size class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeClass {
    Small,
    Medium,
    Large,
}

impl SizeClass {
    pub fn from_width(width: u32) -> Self {
        if width < MEDIUM_BREAKPOINT {
            SizeClass::Small
        } else if width < LARGE_BREAKPOINT {
            SizeClass::Medium
        } else {
            SizeClass::Large
        }
    }

    /// QR preview side length in pixels.
    pub fn qr_size(self) -> u32 {
        match self {
            SizeClass::Small => 200,
            SizeClass::Medium => 220,
            SizeClass::Large => 256,
        }
    }
}

/// Barcode drawing parameters for a viewport width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarcodeScale {
    /// Label font size in pixels
    pub font_size: u32,
    /// Quiet margin around the symbol in pixels
    pub margin: u32,
    /// Width of one module in pixels
    pub bar_width: u32,
    /// Bar height in pixels
    pub bar_height: u32,
}

impl BarcodeScale {
    pub const COMPACT: Self = Self {
        font_size: 12,
        margin: 5,
        bar_width: 1,
        bar_height: 50,
    };

    pub const FULL: Self = Self {
        font_size: 16,
        margin: 10,
        bar_width: 2,
        bar_height: 100,
    };

    pub fn for_width(width: u32) -> Self {
        if width < LARGE_BREAKPOINT {
            Self::COMPACT
        } else {
            Self::FULL
        }
    }
}

/// The window whose width is observed.
#[derive(Debug)]
pub struct Window {
    width: watch::Sender<u32>,
}

impl Window {
    pub fn new(width: u32) -> Self {
        let (tx, _rx) = watch::channel(width);
        Self { width: tx }
    }

    pub fn width(&self) -> u32 {
        *self.width.borrow()
    }

    /// Change the width. Returns whether observers were notified; resizing
    /// to the current width is not a change.
    pub fn resize(&self, width: u32) -> bool {
        self.width.send_if_modified(|current| {
            if *current == width {
                false
            } else {
                *current = width;
                true
            }
        })
    }

    /// Number of mounted observers.
    pub fn listener_count(&self) -> usize {
        self.width.receiver_count()
    }
}

/// A mounted observer tracking the current [`SizeClass`].
#[derive(Debug)]
pub struct ViewportObserver {
    rx: watch::Receiver<u32>,
    width: u32,
}

impl ViewportObserver {
    /// Subscribe to `window` and compute the initial size.
    pub fn mount(window: &Window) -> Self {
        let mut rx = window.width.subscribe();
        let width = *rx.borrow_and_update();
        tracing::debug!(width, "viewport observer mounted");
        Self { rx, width }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn size_class(&self) -> SizeClass {
        SizeClass::from_width(self.width)
    }

    /// Wait for the next resize and return the new width.
    ///
    /// Returns `None` once the window is gone.
    pub async fn changed(&mut self) -> Option<u32> {
        self.rx.changed().await.ok()?;
        self.width = *self.rx.borrow_and_update();
        Some(self.width)
    }
}

impl Drop for ViewportObserver {
    fn drop(&mut self) {
        tracing::debug!("viewport observer unmounted");
    }
}
