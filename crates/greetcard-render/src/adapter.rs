use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::render_data::RenderFrame;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n'];

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Canvas is not mounted")]
    NotMounted,

    #[error("Snapshot failed: {0}")]
    Snapshot(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RasterEncoding {
    Png,
}

/// An encoded snapshot of the painted surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    pub width: u32,
    pub height: u32,
    pub encoding: RasterEncoding,
    pub bytes: Vec<u8>,
}

impl Raster {
    pub fn png(width: u32, height: u32, bytes: Vec<u8>) -> Self {
        Self {
            width,
            height,
            encoding: RasterEncoding::Png,
            bytes,
        }
    }

    /// Whether the payload starts with the signature of its encoding.
    pub fn has_valid_signature(&self) -> bool {
        match self.encoding {
            RasterEncoding::Png => self.bytes.starts_with(&PNG_SIGNATURE),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty() || self.width == 0 || self.height == 0
    }
}

/// The retained-mode painter the editor drives.
///
/// Implementations paint frames bottom to top, report gestures back as
/// [`greetcard_core::GestureEvent`]s, and rasterize what they last painted.
pub trait RenderAdapter {
    /// Replace the painted scene with `frame`.
    fn paint(&mut self, frame: &RenderFrame) -> Result<(), RenderError>;

    /// Rasterize the last painted frame at `pixel_ratio` device pixels per
    /// canvas pixel.
    fn snapshot(&mut self, pixel_ratio: f64) -> Result<Raster, RenderError>;
}
