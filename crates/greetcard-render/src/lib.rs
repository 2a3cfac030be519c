//! # Greetcard Render
//!
//! Contract between the card editor and the 2D painter that draws it.
//! The editor composes a [`RenderFrame`] (photo, template overlay, texts,
//! bottom to top) sized to a square [`CanvasSurface`]; the painter behind
//! [`RenderAdapter`] draws it, reports gestures, and rasterizes for export.
//! [`HitIndex`] resolves pointer positions to the topmost interactive layer.

pub mod surface;
pub mod render_data;
pub mod adapter;

pub use adapter::{Raster, RasterEncoding, RenderAdapter, RenderError};
pub use hit_test::{ApproximateMetrics, HitIndex, TextMetrics};
pub use render_data::{RenderFrame, RenderLayer};
pub use surface::CanvasSurface;
