//! Object-store notification that triggers a run.
//!
//! Only the bucket name is read:
//! `{"Records":[{"s3":{"bucket":{"name":"partner-drop"}}}]}`.
//! Other fields (object key, event time, region) are ignored.

use serde::Deserialize;

use crate::error::PipelineError;

#[derive(Debug, Deserialize)]
pub struct TriggerEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<EventRecord>,
}

#[derive(Debug, Deserialize)]
pub struct EventRecord {
    pub s3: S3Entity,
}

#[derive(Debug, Deserialize)]
pub struct S3Entity {
    pub bucket: BucketEntity,
    #[serde(default)]
    pub object: Option<ObjectEntity>,
}

#[derive(Debug, Deserialize)]
pub struct BucketEntity {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ObjectEntity {
    pub key: String,
}

impl TriggerEvent {
    pub fn from_json(input: &str) -> Result<Self, PipelineError> {
        serde_json::from_str(input).map_err(|e| PipelineError::Event(e.to_string()))
    }

    /// Bucket of the first record. All records of one notification share it.
    pub fn bucket_name(&self) -> Result<&str, PipelineError> {
        let record = self
            .records
            .first()
            .ok_or_else(|| PipelineError::Event("event has no records".into()))?;
        let name = record.s3.bucket.name.as_str();
        if name.is_empty() {
            return Err(PipelineError::Event("bucket name is empty".into()));
        }
        Ok(name)
    }

    /// Object key that fired the event, if present.
    pub fn object_key(&self) -> Option<&str> {
        self.records.first()?.s3.object.as_ref().map(|o| o.key.as_str())
    }
}
