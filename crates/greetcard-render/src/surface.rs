use serde::{Deserialize, Serialize};

pub const DEFAULT_EDGE: f64 = 350.0;
pub const DEFAULT_GUTTER: f64 = 32.0;
pub const EXPORT_PIXEL_RATIO: f64 = 2.0;

/// The square drawing surface the card is painted on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSurface {
    /// Current edge length in CSS pixels.
    pub edge: f64,
    /// Largest edge the surface grows to.
    pub default_edge: f64,
    /// Horizontal padding kept free inside the container.
    pub gutter: f64,
    /// Pixel density used when rasterizing for export.
    pub export_pixel_ratio: f64,
}

impl CanvasSurface {
    pub fn new(default_edge: f64, gutter: f64, export_pixel_ratio: f64) -> Self {
        Self {
            edge: default_edge,
            default_edge,
            gutter,
            export_pixel_ratio,
        }
    }

    /// Resize to fit a container `width` pixels wide. An unmeasured (zero
    /// or missing) container falls back to the default edge. Returns the
    /// new edge.
    pub fn fit_container(&mut self, width: Option<f64>) -> f64 {
        self.edge = match width {
            Some(w) if w > 0.0 => (w - self.gutter).min(self.default_edge).max(1.0),
            _ => self.default_edge,
        };
        self.edge
    }

    /// Edge length of the exported raster in device pixels.
    pub fn export_edge_px(&self) -> u32 {
        (self.edge * self.export_pixel_ratio).round().max(0.0) as u32
    }
}

impl Default for CanvasSurface {
    fn default() -> Self {
        Self::new(DEFAULT_EDGE, DEFAULT_GUTTER, EXPORT_PIXEL_RATIO)
    }
}
