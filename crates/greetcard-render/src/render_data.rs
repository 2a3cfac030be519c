use serde::{Deserialize, Serialize};

use greetcard_core::{Document, LayerRef, Point, Selection, TextId, TextLayer};

/// The photo layer, positioned by its center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoPaint {
    pub image_uri: String,
    pub center: Point,
    /// Natural bitmap size in pixels.
    pub width: u32,
    pub height: u32,
    pub scale: f64,
    pub rotation_degrees: f64,
    pub selected: bool,
}

/// The template overlay, always stretched over the full surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayPaint {
    pub template_id: String,
    pub image_uri: String,
    pub edge: f64,
}

/// One text run, anchored at its top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextPaint {
    pub id: TextId,
    pub content: String,
    pub position: Point,
    pub font_size: f64,
    pub font_family: String,
    /// "normal", "bold", "italic" or "italic bold".
    pub font_style: String,
    /// "" or "underline".
    pub text_decoration: String,
    pub fill: String,
    pub rotation_degrees: f64,
    pub selected: bool,
}

impl TextPaint {
    fn from_layer(text: &TextLayer, selected: bool) -> Self {
        let font_style = match (text.italic, text.bold) {
            (false, false) => "normal",
            (false, true) => "bold",
            (true, false) => "italic",
            (true, true) => "italic bold",
        };
        Self {
            id: text.id,
            content: text.content.clone(),
            position: text.position,
            font_size: text.font_size,
            font_family: text.font_family.css_name().to_string(),
            font_style: font_style.to_string(),
            text_decoration: if text.underline { "underline" } else { "" }.to_string(),
            fill: text.fill.clone(),
            rotation_degrees: text.rotation_degrees,
            selected,
        }
    }
}

/// A paintable layer. Frames list them bottom to top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RenderLayer {
    Photo(PhotoPaint),
    Overlay(OverlayPaint),
    Text(TextPaint),
}

impl RenderLayer {
    /// The interactive layer this paints, `None` for the overlay.
    pub fn layer_ref(&self) -> Option<LayerRef> {
        match self {
            RenderLayer::Photo(_) => Some(LayerRef::Photo),
            RenderLayer::Overlay(_) => None,
            RenderLayer::Text(t) => Some(LayerRef::Text(t.id)),
        }
    }
}

/// Complete frame handed to the painter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderFrame {
    pub edge: f64,
    pub layers: Vec<RenderLayer>,
}

impl RenderFrame {
    pub fn empty(edge: f64) -> Self {
        Self {
            edge,
            layers: Vec::new(),
        }
    }

    /// Lay out `doc` bottom to top: photo, template overlay, then texts in
    /// insertion order. A photo that has not been decoded is left out.
    pub fn compose(doc: &Document, selection: Selection, edge: f64) -> Self {
        let mut frame = Self::empty(edge);

        if let Some(photo) = &doc.photo {
            if let Some((width, height)) = photo.source.dimensions() {
                frame.layers.push(RenderLayer::Photo(PhotoPaint {
                    image_uri: photo.handle().uri().to_string(),
                    center: photo.position,
                    width,
                    height,
                    scale: photo.effective_scale(),
                    rotation_degrees: photo.rotation_degrees,
                    selected: selection.is_photo(),
                }));
            }
        }

        if let Some(uri) = &doc.template.overlay {
            frame.layers.push(RenderLayer::Overlay(OverlayPaint {
                template_id: doc.template.id.clone(),
                image_uri: uri.clone(),
                edge,
            }));
        }

        for text in doc.texts() {
            frame
                .layers
                .push(RenderLayer::Text(TextPaint::from_layer(text, selection.is_text(&text.id))));
        }

        frame
    }

    /// Same frame without selection highlights, as exported.
    pub fn without_selection(mut self) -> Self {
        for layer in &mut self.layers {
            match layer {
                RenderLayer::Photo(p) => p.selected = false,
                RenderLayer::Text(t) => t.selected = false,
                RenderLayer::Overlay(_) => {}
            }
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}
