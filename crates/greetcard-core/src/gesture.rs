use serde::{Deserialize, Serialize};

use crate::document::TextId;
use crate::geometry::Point;

/// An interactive layer on the canvas. The template overlay is never one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayerRef {
    Photo,
    Text(TextId),
}

/// What the painter's interactive layer observed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GestureKind {
    /// Click or tap on the layer.
    Select,
    /// A drag finished; intermediate frames are never reported.
    DragEnd { position: Point },
    /// Resize/rotate handles released. `scale` is the handle's final scale
    /// factor relative to the layer's size when the gesture began.
    TransformEnd {
        position: Point,
        rotation_degrees: f64,
        scale: f64,
    },
}

/// A gesture reported back by the render adapter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureEvent {
    pub target: LayerRef,
    pub kind: GestureKind,
}

impl GestureEvent {
    pub fn new(target: LayerRef, kind: GestureKind) -> Self {
        Self { target, kind }
    }
}
