use std::fmt;

use log::{error, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::StorageSettings;
use crate::export::{CardExport, ExportError};

/// Message shown to the user whenever publishing fails.
pub const PUBLISH_FAILED_MESSAGE: &str = "Something went wrong";

/// Failure reported by an external collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ServiceError(pub String);

impl ServiceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Object storage for exported cards.
pub trait ImageStore {
    /// Store `bytes` at `path` inside `bucket` and return their public URL.
    fn upload(
        &mut self,
        bucket: &str,
        path: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, ServiceError>;
}

/// The schedules REST endpoint.
pub trait ScheduleService {
    fn create_schedule(&mut self, request: &ScheduleRequest) -> Result<ScheduleRecord, ServiceError>;
}

/// The employee a card is for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    pub employee_id: String,
    pub first_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequest {
    pub employee_id: String,
    pub message: String,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRecord {
    pub id: String,
    pub employee_id: String,
    pub message: String,
    pub image_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishStep {
    Export,
    Upload,
    Schedule,
}

impl fmt::Display for PublishStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PublishStep::Export => "export",
            PublishStep::Upload => "upload",
            PublishStep::Schedule => "schedule",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Export failed: {0}")]
    Export(#[from] ExportError),

    #[error("Upload of '{path}' to bucket '{bucket}' failed: {source}")]
    Upload {
        bucket: String,
        path: String,
        #[source]
        source: ServiceError,
    },

    #[error("Schedule creation failed: {0}")]
    Schedule(#[source] ServiceError),
}

impl PublishError {
    pub fn step(&self) -> PublishStep {
        match self {
            PublishError::Export(_) => PublishStep::Export,
            PublishError::Upload { .. } => PublishStep::Upload,
            PublishError::Schedule(_) => PublishStep::Schedule,
        }
    }

    pub fn user_message(&self) -> &'static str {
        PUBLISH_FAILED_MESSAGE
    }
}

/// Uploads an exported card, then schedules it. Upload must yield a URL
/// before the schedule is created; either failure aborts the whole publish.
pub struct Publisher<'a> {
    store: &'a mut dyn ImageStore,
    schedules: &'a mut dyn ScheduleService,
    storage: &'a StorageSettings,
}

impl<'a> Publisher<'a> {
    pub fn new(
        store: &'a mut dyn ImageStore,
        schedules: &'a mut dyn ScheduleService,
        storage: &'a StorageSettings,
    ) -> Self {
        Self {
            store,
            schedules,
            storage,
        }
    }

    pub fn publish(
        &mut self,
        export: &CardExport,
        recipient: &Recipient,
        message: &str,
    ) -> Result<ScheduleRecord, PublishError> {
        let path = self.storage.object_path(&export.file_name);
        let image_url = self
            .store
            .upload(
                &self.storage.bucket,
                &path,
                &export.raster.bytes,
                &self.storage.content_type,
            )
            .map_err(|source| {
                error!("upload of {}/{} failed: {}", self.storage.bucket, path, source);
                PublishError::Upload {
                    bucket: self.storage.bucket.clone(),
                    path: path.clone(),
                    source,
                }
            })?;
        info!("uploaded {}/{} -> {}", self.storage.bucket, path, image_url);

        let request = ScheduleRequest {
            employee_id: recipient.employee_id.clone(),
            message: message.to_string(),
            image_url,
        };
        let record = self.schedules.create_schedule(&request).map_err(|e| {
            error!("schedule for employee {} failed: {}", recipient.employee_id, e);
            PublishError::Schedule(e)
        })?;
        info!("scheduled {} for employee {}", record.id, record.employee_id);
        Ok(record)
    }
}
