//! # Greetcard I/O
//!
//! Everything that crosses the editor's process boundary: the JSON editor
//! configuration, rasterized card export, and publishing an exported card
//! to image storage and the schedules service.

pub mod config;
pub mod export;
pub mod publish;

pub use config::{ConfigError, EditorConfig};
pub use export::{export_card, export_file_name, CardExport, ExportError};
pub use publish::{
    ImageStore, PublishError, PublishStep, Publisher, Recipient, ScheduleRecord, ScheduleRequest,
    ScheduleService, ServiceError,
};
