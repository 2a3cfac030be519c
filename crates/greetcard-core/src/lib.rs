//! # Greetcard Core
//!
//! In-memory model of a birthday card (photo, template overlay, text
//! layers), a snapshot-based undo/redo history with gesture batching, and
//! the editor session that turns user actions into recorded document edits.
//!
//! Painting, decoding and uploading live outside this crate.

pub mod geometry;
pub mod font;
pub mod template;
pub mod document;
pub mod selection;
pub mod gesture;
pub mod history;
pub mod editor;

pub use document::{Document, ImageHandle, Photo, PhotoSource, TextId, TextLayer};
pub use editor::{EditorSession, SessionOptions};
pub use font::{FontFamily, ParseFontError};
pub use geometry::{BBox, Point, RotatedRect};
pub use gesture::{GestureEvent, GestureKind, LayerRef};
pub use history::History;
pub use selection::Selection;
pub use template::{Template, TemplateCatalog};
