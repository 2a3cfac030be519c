use std::collections::HashSet;

use log::{debug, info, warn};

use crate::document::{
    Document, ImageHandle, Photo, TextId, TextLayer, MAX_FONT_SIZE, MIN_FONT_SIZE,
    TEXT_PLACEHOLDER,
};
use crate::font::{FontFamily, ParseFontError};
use crate::geometry::{clamp, Point};
use crate::gesture::{GestureEvent, GestureKind, LayerRef};
use crate::history::History;
use crate::selection::Selection;
use crate::template::TemplateCatalog;

pub const DEFAULT_CANVAS_EDGE: f64 = 350.0;

/// Zoom range reachable from the slider.
pub const ZOOM_SLIDER_RANGE: (f64, f64) = (0.5, 2.0);
/// Zoom range reachable from the +/- buttons (wider than the slider's).
pub const ZOOM_NUDGE_RANGE: (f64, f64) = (0.1, 3.0);
pub const ROTATION_RANGE: (f64, f64) = (-180.0, 180.0);
/// Smallest font size a transform-handle gesture may leave behind.
pub const TRANSFORM_MIN_FONT_SIZE: f64 = 8.0;
/// New text is placed this far left of the canvas center.
const NEW_TEXT_OFFSET_X: f64 = 100.0;

/// Construction-time settings for an [`EditorSession`].
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub canvas_edge: f64,
    pub default_font: FontFamily,
    pub text_placeholder: String,
    pub catalog: TemplateCatalog,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            canvas_edge: DEFAULT_CANVAS_EDGE,
            default_font: FontFamily::default(),
            text_placeholder: TEXT_PLACEHOLDER.to_string(),
            catalog: TemplateCatalog::builtin(),
        }
    }
}

/// One open card editor: the document under undo/redo plus the transient
/// state around it (selection, active text, current font, canvas size).
///
/// Every editing operation is infallible. Operations that correspond to a
/// disabled control (no photo loaded, no active text) return `false` and
/// leave everything untouched.
#[derive(Debug)]
pub struct EditorSession {
    history: History<Document>,
    catalog: TemplateCatalog,
    selection: Selection,
    active_text: Option<TextId>,
    current_font: FontFamily,
    canvas_edge: f64,
    text_placeholder: String,
    /// Every photo handle this session has handed out and not yet reclaimed.
    loaded_images: Vec<ImageHandle>,
}

impl EditorSession {
    pub fn new(options: SessionOptions) -> Self {
        let document = Document::with_catalog(&options.catalog);
        Self {
            history: History::new(document),
            catalog: options.catalog,
            selection: Selection::None,
            active_text: None,
            current_font: options.default_font,
            canvas_edge: options.canvas_edge,
            text_placeholder: options.text_placeholder,
            loaded_images: Vec::new(),
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn document(&self) -> &Document {
        self.history.current()
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn active_text(&self) -> Option<&TextLayer> {
        self.active_text.and_then(|id| self.document().text(&id))
    }

    pub fn active_text_id(&self) -> Option<TextId> {
        self.active_text
    }

    pub fn current_font(&self) -> FontFamily {
        self.current_font
    }

    pub fn canvas_edge(&self) -> f64 {
        self.canvas_edge
    }

    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    pub fn history(&self) -> &History<Document> {
        &self.history
    }

    /// New canvas edge after a viewport resize. Presentation only: history
    /// is untouched and an existing photo keeps its fit scale.
    pub fn resize_canvas(&mut self, edge: f64) {
        if edge > 0.0 && (edge - self.canvas_edge).abs() > f64::EPSILON {
            debug!("canvas resized {} -> {}", self.canvas_edge, edge);
            self.canvas_edge = edge;
        }
    }

    // ── Recording helpers ────────────────────────────────────────────

    /// A discrete action: its own undo step. Closes any gesture left open.
    fn record<F>(&mut self, label: &'static str, mutate: F)
    where
        F: FnOnce(&mut Document),
    {
        self.history.end_batch();
        self.history.update(label, mutate);
    }

    /// A continuous gesture step: opens the gesture batch if needed and
    /// leaves it open until [`EditorSession::finish_gesture`].
    fn record_gesture<F>(&mut self, label: &'static str, mutate: F)
    where
        F: FnOnce(&mut Document),
    {
        self.history.begin_batch(label);
        self.history.update(label, mutate);
    }

    /// A self-contained batch: one undo step regardless of how the
    /// mutation is split internally.
    fn record_batch<F>(&mut self, label: &'static str, mutate: F)
    where
        F: FnOnce(&mut Document),
    {
        self.history.end_batch();
        self.history.begin_batch(label);
        self.history.update(label, mutate);
        self.history.end_batch();
    }

    fn with_photo<F>(mutate: F) -> impl FnOnce(&mut Document)
    where
        F: FnOnce(&mut Photo),
    {
        move |doc: &mut Document| {
            if let Some(photo) = doc.photo.as_mut() {
                mutate(photo);
            }
        }
    }

    // ── Photo ────────────────────────────────────────────────────────

    /// First phase of loading a photo: the file has been picked and handed
    /// an object URL, but its dimensions are unknown until the host decodes
    /// it and calls [`EditorSession::photo_decoded`].
    pub fn load_photo(&mut self, uri: &str) -> ImageHandle {
        let handle = ImageHandle::new(uri);
        let photo = Photo::unresolved(handle.clone(), self.canvas_edge);
        self.record("Load photo", move |doc| doc.photo = Some(photo));
        self.loaded_images.push(handle.clone());
        self.select_photo();
        info!("photo {} loaded from {}, awaiting decode", handle.id(), uri);
        handle
    }

    /// Second phase of loading: decode finished. Ignored unless `handle` is
    /// still the document's unresolved photo, so a late decode of a replaced
    /// photo cannot clobber the newer one.
    pub fn photo_decoded(&mut self, handle: &ImageHandle, width: u32, height: u32) -> bool {
        let pending = self
            .document()
            .photo
            .as_ref()
            .is_some_and(|p| p.handle() == handle && !p.is_resolved());
        if !pending {
            warn!("ignoring stale decode for photo {}", handle.id());
            return false;
        }
        let edge = self.canvas_edge;
        self.history.update("Fit photo", |doc| {
            if let Some(photo) = doc.photo.as_mut() {
                photo.resolve(width, height, edge);
            }
        });
        info!("photo {} decoded at {}x{}", handle.id(), width, height);
        true
    }

    /// The host could not decode the file. The photo stays unresolved and
    /// paints nothing.
    pub fn photo_decode_failed(&self, handle: &ImageHandle, reason: &str) {
        warn!("photo {} could not be decoded: {}", handle.id(), reason);
    }

    /// Remove the photo and every text layer as one undo step.
    pub fn clear_photo(&mut self) -> bool {
        if !self.document().has_photo() {
            return false;
        }
        self.record_batch("Clear photo", |doc| {
            doc.photo = None;
            doc.clear_texts();
        });
        self.clear_selection();
        info!("photo cleared");
        true
    }

    /// Absolute zoom from the slider. Continues the open gesture.
    pub fn set_zoom(&mut self, zoom: f64) -> bool {
        if !self.document().has_photo() {
            return false;
        }
        let zoom = clamp(zoom, ZOOM_SLIDER_RANGE.0, ZOOM_SLIDER_RANGE.1);
        let apply = Self::with_photo(move |p| p.zoom_factor = zoom);
        self.record_gesture("Zoom", apply);
        self.select_photo();
        true
    }

    /// Relative zoom from the +/- buttons, one undo step per press.
    pub fn nudge_zoom(&mut self, delta: f64) -> bool {
        if !self.document().has_photo() {
            return false;
        }
        let apply = Self::with_photo(move |p| {
            p.zoom_factor = clamp(p.zoom_factor + delta, ZOOM_NUDGE_RANGE.0, ZOOM_NUDGE_RANGE.1);
        });
        self.record_batch("Zoom", apply);
        self.select_photo();
        true
    }

    /// Absolute rotation from the slider. Continues the open gesture.
    pub fn set_rotation(&mut self, degrees: f64) -> bool {
        if !self.document().has_photo() {
            return false;
        }
        let degrees = clamp(degrees, ROTATION_RANGE.0, ROTATION_RANGE.1);
        let apply = Self::with_photo(move |p| p.rotation_degrees = degrees);
        self.record_gesture("Rotate", apply);
        self.select_photo();
        true
    }

    /// The reset-to-zero control next to the rotation slider.
    pub fn reset_rotation(&mut self) -> bool {
        if !self.document().has_photo() {
            return false;
        }
        let apply = Self::with_photo(|p| p.rotation_degrees = 0.0);
        self.record_batch("Rotate", apply);
        self.select_photo();
        true
    }

    /// Close the gesture opened by slider operations.
    pub fn finish_gesture(&mut self) {
        self.history.end_batch();
    }

    /// Commit the final position of a photo drag.
    pub fn move_photo(&mut self, center: Point) -> bool {
        if !self.document().has_photo() {
            return false;
        }
        let apply = Self::with_photo(move |p| p.position = center);
        self.record("Move photo", apply);
        true
    }

    // ── Template ─────────────────────────────────────────────────────

    pub fn change_template(&mut self, id: &str) -> bool {
        let Some(template) = self.catalog.get(id).cloned() else {
            warn!("unknown template '{}'", id);
            return false;
        };
        if self.document().template == template {
            return false;
        }
        info!("template -> {}", template.id);
        self.record("Change template", move |doc| doc.template = template);
        true
    }

    // ── Text ─────────────────────────────────────────────────────────

    /// Add a placeholder text on top of the card and make it active.
    /// Texts need a photo underneath; without one this is a no-op.
    pub fn add_text(&mut self) -> Option<TextId> {
        if !self.document().has_photo() {
            return None;
        }
        let id = TextId::generate();
        let center = self.canvas_edge / 2.0;
        let text = TextLayer::new(
            id,
            &self.text_placeholder,
            Point::new(center - NEW_TEXT_OFFSET_X, center),
            self.current_font,
        );
        self.record("Add text", move |doc| doc.push_text(text));
        self.select_text(&id);
        Some(id)
    }

    fn edit_active<F>(&mut self, label: &'static str, mutate: F) -> bool
    where
        F: FnOnce(&mut TextLayer),
    {
        let Some(id) = self.active_text else {
            return false;
        };
        if !self.document().contains_text(&id) {
            return false;
        }
        self.record(label, move |doc| {
            if let Some(text) = doc.text_mut(&id) {
                mutate(text);
            }
        });
        true
    }

    pub fn edit_active_text(&mut self, content: &str) -> bool {
        let content = content.to_string();
        self.edit_active("Edit text", move |t| t.content = content)
    }

    /// Remember `font` for new texts and apply it to the active text.
    pub fn set_font(&mut self, font: FontFamily) {
        self.current_font = font;
        self.edit_active("Change font", move |t| t.font_family = font);
    }

    pub fn set_font_by_name(&mut self, name: &str) -> Result<(), ParseFontError> {
        let font = name.parse::<FontFamily>().inspect_err(|e| warn!("{}", e))?;
        self.set_font(font);
        Ok(())
    }

    pub fn toggle_bold(&mut self) -> bool {
        self.edit_active("Bold", |t| t.bold = !t.bold)
    }

    pub fn toggle_italic(&mut self) -> bool {
        self.edit_active("Italic", |t| t.italic = !t.italic)
    }

    pub fn toggle_underline(&mut self) -> bool {
        self.edit_active("Underline", |t| t.underline = !t.underline)
    }

    /// Set the active text's color. Only `#rgb` and `#rrggbb` hex strings
    /// are accepted; anything else is ignored.
    pub fn set_fill(&mut self, color: &str) -> bool {
        if !is_hex_color(color) {
            warn!("ignoring fill color {:?}: not a hex color", color);
            return false;
        }
        let color = color.to_ascii_lowercase();
        self.edit_active("Text color", move |t| t.fill = color)
    }

    pub fn set_font_size(&mut self, size: f64) -> bool {
        let size = clamp(size, MIN_FONT_SIZE, MAX_FONT_SIZE);
        self.edit_active("Font size", move |t| t.font_size = size)
    }

    pub fn delete_text(&mut self, id: &TextId) -> bool {
        if !self.document().contains_text(id) {
            return false;
        }
        let target = *id;
        self.record("Delete text", move |doc| {
            doc.remove_text(&target);
        });
        if self.active_text == Some(target) || self.selection.is_text(&target) {
            self.clear_selection();
        }
        true
    }

    /// Commit the final position of a text drag.
    pub fn move_text(&mut self, id: &TextId, position: Point) -> bool {
        if !self.document().contains_text(id) {
            return false;
        }
        let target = *id;
        self.record("Move text", move |doc| {
            if let Some(text) = doc.text_mut(&target) {
                text.position = position;
            }
        });
        true
    }

    /// Commit a resize/rotate handle gesture. The handle scale is folded
    /// into the font size so no residual scale stays on the layer.
    pub fn transform_text(
        &mut self,
        id: &TextId,
        position: Point,
        rotation_degrees: f64,
        scale: f64,
    ) -> bool {
        if !self.document().contains_text(id) {
            return false;
        }
        let target = *id;
        self.record("Transform text", move |doc| {
            if let Some(text) = doc.text_mut(&target) {
                text.position = position;
                text.rotation_degrees = rotation_degrees;
                text.font_size = (text.font_size * scale).max(TRANSFORM_MIN_FONT_SIZE);
            }
        });
        true
    }

    /// Replace a text layer wholesale, matched by id.
    pub fn update_text(&mut self, layer: TextLayer) -> bool {
        if !self.document().contains_text(&layer.id) {
            return false;
        }
        self.record("Edit text", move |doc| doc.push_text(layer));
        true
    }

    // ── Selection ────────────────────────────────────────────────────

    pub fn select_photo(&mut self) {
        self.selection = Selection::Photo;
        self.active_text = None;
    }

    pub fn select_text(&mut self, id: &TextId) -> bool {
        if !self.document().contains_text(id) {
            return false;
        }
        self.selection = Selection::Text(*id);
        self.active_text = Some(*id);
        true
    }

    /// Interaction with empty canvas space.
    pub fn clear_selection(&mut self) {
        self.selection = Selection::None;
        self.active_text = None;
    }

    /// Route a gesture reported by the render adapter.
    pub fn apply_gesture(&mut self, event: GestureEvent) -> bool {
        match (event.target, event.kind) {
            (LayerRef::Photo, GestureKind::Select) => {
                if !self.document().has_photo() {
                    return false;
                }
                self.select_photo();
                true
            }
            (LayerRef::Photo, GestureKind::DragEnd { position }) => self.move_photo(position),
            (LayerRef::Photo, GestureKind::TransformEnd { .. }) => {
                debug!("photo has no transform handles; ignoring transform gesture");
                false
            }
            (LayerRef::Text(id), GestureKind::Select) => self.select_text(&id),
            (LayerRef::Text(id), GestureKind::DragEnd { position }) => self.move_text(&id, position),
            (
                LayerRef::Text(id),
                GestureKind::TransformEnd {
                    position,
                    rotation_degrees,
                    scale,
                },
            ) => self.transform_text(&id, position, rotation_degrees, scale),
        }
    }

    // ── Undo / Redo ──────────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        self.history.end_batch();
        let changed = self.history.undo();
        if changed {
            self.reconcile_selection();
        }
        changed
    }

    pub fn redo(&mut self) -> bool {
        self.history.end_batch();
        let changed = self.history.redo();
        if changed {
            self.reconcile_selection();
        }
        changed
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_label(&self) -> Option<&'static str> {
        self.history.undo_label()
    }

    pub fn redo_label(&self) -> Option<&'static str> {
        self.history.redo_label()
    }

    /// Drop selection that points at layers the restored document lacks.
    fn reconcile_selection(&mut self) {
        let doc = self.history.current();
        if self.active_text.is_some_and(|id| !doc.contains_text(&id)) {
            self.active_text = None;
        }
        let stale = match self.selection {
            Selection::None => false,
            Selection::Photo => !doc.has_photo(),
            Selection::Text(id) => !doc.contains_text(&id),
        };
        if stale {
            self.selection = Selection::None;
        }
    }

    // ── Resources ────────────────────────────────────────────────────

    /// Photo handles that neither the document nor any undo/redo entry can
    /// reach any more. The host should release their bitmaps.
    pub fn reclaim_images(&mut self) -> Vec<ImageHandle> {
        let reachable: HashSet<&ImageHandle> = self
            .history
            .states()
            .filter_map(Document::photo_handle)
            .collect();
        let (kept, released): (Vec<_>, Vec<_>) = self
            .loaded_images
            .drain(..)
            .partition(|h| reachable.contains(h));
        self.loaded_images = kept;
        if !released.is_empty() {
            debug!("reclaimed {} photo handle(s)", released.len());
        }
        released
    }

    /// Every photo handle still tracked by the session, for release when
    /// the editor closes.
    pub fn close(self) -> Vec<ImageHandle> {
        self.loaded_images
    }
}

fn is_hex_color(s: &str) -> bool {
    match s.strip_prefix('#') {
        Some(hex) => matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(SessionOptions::default())
    }
}
