//! Geometry shared by the host controller and the UI surface.
//!
//! The UI measures the content container in CSS pixels and pushes the
//! rectangle to the host, which rounds it before positioning the native
//! content view. Until the first measurement arrives the host falls back to a
//! rectangle derived from fixed chrome dimensions.

use serde::{Deserialize, Serialize};

use crate::events::HostCommand;

/// Rectangle reserved for web content, as measured by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl LayoutRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Round every coordinate to the nearest integer pixel.
    pub fn rounded(&self) -> PixelRect {
        PixelRect {
            x: self.x.round() as i32,
            y: self.y.round() as i32,
            width: self.width.round().max(0.0) as u32,
            height: self.height.round().max(0.0) as u32,
        }
    }
}

/// Integer rectangle actually applied to the content view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Fixed chrome dimensions used for the fallback layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChromeGeometry {
    pub sidebar_width: f64,
    pub titlebar_height: f64,
    pub navbar_height: f64,
}

impl Default for ChromeGeometry {
    fn default() -> Self {
        Self {
            sidebar_width: 380.0,
            titlebar_height: 46.0,
            navbar_height: 52.0,
        }
    }
}

impl ChromeGeometry {
    pub fn top_offset(&self) -> f64 {
        self.titlebar_height + self.navbar_height
    }

    /// Content rectangle for a window of the given logical size.
    pub fn fallback_rect(&self, window_width: f64, window_height: f64) -> LayoutRect {
        let top = self.top_offset();
        LayoutRect {
            x: 0.0,
            y: top,
            width: (window_width - self.sidebar_width).max(0.0),
            height: (window_height - top).max(0.0),
        }
    }
}

/// UI-side resize observation: every change of the measured container
/// produces exactly one `UpdateLayout` command.
#[derive(Debug, Clone, Default)]
pub struct LayoutSync {
    last: Option<LayoutRect>,
}

impl LayoutSync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, rect: LayoutRect) -> Option<HostCommand> {
        if self.last == Some(rect) {
            return None;
        }
        self.last = Some(rect);
        Some(HostCommand::UpdateLayout(rect))
    }

    pub fn last(&self) -> Option<LayoutRect> {
        self.last
    }
}
