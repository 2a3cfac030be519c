use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::font::FontFamily;
use crate::geometry::Point;
use crate::template::{Template, TemplateCatalog};

pub const DEFAULT_FONT_SIZE: f64 = 36.0;
pub const MIN_FONT_SIZE: f64 = 10.0;
pub const MAX_FONT_SIZE: f64 = 100.0;
pub const DEFAULT_FILL: &str = "#000000";
pub const TEXT_PLACEHOLDER: &str = "Your text";

/// Opaque reference to a decoded bitmap owned by the host (an object URL
/// in a browser). Created once per uploaded file and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageHandle {
    id: Uuid,
    uri: String,
}

impl ImageHandle {
    pub fn new(uri: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            uri: uri.to_string(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }
}

/// Decode state of the photo bitmap. Dimensions are only known once the
/// host has finished decoding the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PhotoSource {
    Unresolved { handle: ImageHandle },
    Resolved { handle: ImageHandle, width: u32, height: u32 },
}

impl PhotoSource {
    pub fn handle(&self) -> &ImageHandle {
        match self {
            PhotoSource::Unresolved { handle } | PhotoSource::Resolved { handle, .. } => handle,
        }
    }

    pub fn dimensions(&self) -> Option<(u32, u32)> {
        match self {
            PhotoSource::Unresolved { .. } => None,
            PhotoSource::Resolved { width, height, .. } => Some((*width, *height)),
        }
    }
}

/// The background photo layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    pub source: PhotoSource,
    /// Center of the image on the canvas; rotation and scale pivot here.
    pub position: Point,
    /// Scale that makes the longer image side span the canvas edge at load time.
    pub base_fit_scale: f64,
    pub zoom_factor: f64,
    pub rotation_degrees: f64,
}

impl Photo {
    /// A freshly picked photo whose dimensions are not known yet.
    pub fn unresolved(handle: ImageHandle, canvas_edge: f64) -> Self {
        Self {
            source: PhotoSource::Unresolved { handle },
            position: Point::new(canvas_edge / 2.0, canvas_edge / 2.0),
            base_fit_scale: 1.0,
            zoom_factor: 1.0,
            rotation_degrees: 0.0,
        }
    }

    /// "Contain" fit: the longer side of a `width` x `height` image equals `canvas_edge`.
    pub fn fit_scale(width: u32, height: u32, canvas_edge: f64) -> f64 {
        let longest = width.max(height);
        if longest == 0 {
            return 1.0;
        }
        canvas_edge / f64::from(longest)
    }

    /// Record decoded dimensions and fit the image to the canvas, centered,
    /// with zoom and rotation reset.
    pub fn resolve(&mut self, width: u32, height: u32, canvas_edge: f64) {
        let handle = self.source.handle().clone();
        self.source = PhotoSource::Resolved {
            handle,
            width,
            height,
        };
        self.base_fit_scale = Self::fit_scale(width, height, canvas_edge);
        self.position = Point::new(canvas_edge / 2.0, canvas_edge / 2.0);
        self.zoom_factor = 1.0;
        self.rotation_degrees = 0.0;
    }

    pub fn handle(&self) -> &ImageHandle {
        self.source.handle()
    }

    pub fn is_resolved(&self) -> bool {
        self.source.dimensions().is_some()
    }

    pub fn effective_scale(&self) -> f64 {
        self.base_fit_scale * self.zoom_factor
    }
}

/// Identifier of a text layer, time-based (UUIDv7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextId(Uuid);

impl TextId {
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }
}

impl fmt::Display for TextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A freeform text run painted above the photo and template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLayer {
    pub id: TextId,
    pub content: String,
    /// Top-left layout anchor.
    pub position: Point,
    pub font_size: f64,
    pub font_family: FontFamily,
    pub fill: String,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub rotation_degrees: f64,
}

impl TextLayer {
    pub fn new(id: TextId, content: &str, position: Point, font_family: FontFamily) -> Self {
        Self {
            id,
            content: content.to_string(),
            position,
            font_size: DEFAULT_FONT_SIZE,
            font_family,
            fill: DEFAULT_FILL.to_string(),
            bold: false,
            italic: false,
            underline: false,
            rotation_degrees: 0.0,
        }
    }
}

/// A birthday card under composition.
///
/// Text layers are shared between history snapshots through `Arc`; a
/// mutation through [`Document::text_mut`] copies only the layer it touches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub photo: Option<Photo>,
    pub template: Template,
    texts: Vec<Arc<TextLayer>>,
}

impl Document {
    pub fn new(template: Template) -> Self {
        Self {
            photo: None,
            template,
            texts: Vec::new(),
        }
    }

    /// Empty card on the catalog's default template.
    pub fn with_catalog(catalog: &TemplateCatalog) -> Self {
        Self::new(catalog.default_template())
    }

    // ── Text layers ──────────────────────────────────────────────────

    /// Text layers in paint order (first painted first).
    pub fn texts(&self) -> impl Iterator<Item = &TextLayer> {
        self.texts.iter().map(|t| t.as_ref())
    }

    pub fn text(&self, id: &TextId) -> Option<&TextLayer> {
        self.texts.iter().find(|t| t.id == *id).map(|t| t.as_ref())
    }

    pub fn text_mut(&mut self, id: &TextId) -> Option<&mut TextLayer> {
        self.texts
            .iter_mut()
            .find(|t| t.id == *id)
            .map(Arc::make_mut)
    }

    /// Append a layer on top. A layer whose id is already present replaces
    /// the existing one in place.
    pub fn push_text(&mut self, text: TextLayer) {
        if let Some(existing) = self.text_mut(&text.id) {
            *existing = text;
        } else {
            self.texts.push(Arc::new(text));
        }
    }

    pub fn remove_text(&mut self, id: &TextId) -> Option<TextLayer> {
        let index = self.texts.iter().position(|t| t.id == *id)?;
        let removed = self.texts.remove(index);
        Some(Arc::unwrap_or_clone(removed))
    }

    pub fn clear_texts(&mut self) {
        self.texts.clear();
    }

    pub fn text_count(&self) -> usize {
        self.texts.len()
    }

    pub fn contains_text(&self, id: &TextId) -> bool {
        self.texts.iter().any(|t| t.id == *id)
    }

    // ── Photo ────────────────────────────────────────────────────────

    pub fn has_photo(&self) -> bool {
        self.photo.is_some()
    }

    pub fn photo_handle(&self) -> Option<&ImageHandle> {
        self.photo.as_ref().map(Photo::handle)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::with_catalog(&TemplateCatalog::builtin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_document() {
        let doc = Document::default();
        assert!(doc.photo.is_none());
        assert_eq!(doc.template.id, "t2");
        assert_eq!(doc.text_count(), 0);
    }

    #[test]
    fn test_fit_scale_contains_longer_side() {
        let scale = Photo::fit_scale(1000, 500, 350.0);
        assert!((scale - 0.35).abs() < 1e-10);
        assert!((1000.0 * scale - 350.0).abs() < 1e-10);

        let portrait = Photo::fit_scale(600, 1200, 300.0);
        assert!((1200.0 * portrait - 300.0).abs() < 1e-10);
    }

    #[test]
    fn test_resolve_keeps_handle_and_centers() {
        let handle = ImageHandle::new("blob:photo-1");
        let mut photo = Photo::unresolved(handle.clone(), 350.0);
        assert!(!photo.is_resolved());
        assert!(photo.source.dimensions().is_none());

        photo.resolve(1000, 500, 350.0);
        assert_eq!(photo.handle(), &handle);
        assert_eq!(photo.position, Point::new(175.0, 175.0));
        let (w, h) = photo.source.dimensions().unwrap();
        assert!((f64::from(w) * photo.effective_scale() - 350.0).abs() < 1e-10);
        assert!((f64::from(h) * photo.effective_scale() - 175.0).abs() < 1e-10);
    }

    #[test]
    fn test_text_copy_on_write() {
        let mut doc = Document::default();
        let id = TextId::generate();
        doc.push_text(TextLayer::new(id, TEXT_PLACEHOLDER, Point::new(0.0, 0.0), FontFamily::Arial));
        let snapshot = doc.clone();

        doc.text_mut(&id).unwrap().content = "Happy birthday".to_string();
        assert_eq!(snapshot.text(&id).unwrap().content, TEXT_PLACEHOLDER);
        assert_eq!(doc.text(&id).unwrap().content, "Happy birthday");
    }

    #[test]
    fn test_text_ids_are_unique() {
        let a = TextId::generate();
        let b = TextId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_remove_text() {
        let mut doc = Document::default();
        let id = TextId::generate();
        doc.push_text(TextLayer::new(id, "Hi", Point::new(0.0, 0.0), FontFamily::Roboto));
        assert_eq!(doc.remove_text(&id).unwrap().content, "Hi");
        assert!(doc.remove_text(&id).is_none());
        assert_eq!(doc.text_count(), 0);
    }
}
