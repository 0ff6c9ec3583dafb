//! Backend-agnostic service traits used by the pipeline steps.

use std::fmt;

use async_trait::async_trait;

use crate::error::{SendError, StorageError};

/// A bucket + key pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectLocation {
    pub bucket: String,
    pub key: String,
}

impl ObjectLocation {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for ObjectLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

/// Canned access policy applied to a copied object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acl {
    Private,
}

/// Storage class applied to a copied object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageClass {
    Standard,
}

/// Parameters of an object copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyRequest {
    pub source: ObjectLocation,
    pub destination: ObjectLocation,
    pub acl: Acl,
    pub content_type: String,
    pub storage_class: StorageClass,
}

/// Object storage: copy and read whole objects.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Copy an object, replacing its access policy and metadata.
    async fn copy(&self, request: CopyRequest) -> Result<(), StorageError>;

    /// Read an object's full content.
    async fn read(&self, location: &ObjectLocation) -> Result<Vec<u8>, StorageError>;
}

/// A raw (already MIME-encoded) message send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendRawRequest {
    pub destinations: Vec<String>,
    pub source: String,
    pub raw_message: Vec<u8>,
}

/// Result of a successful send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReceipt {
    /// Message id assigned by the sending service.
    pub message_id: String,
}

/// Mail sending service.
#[async_trait]
pub trait MailSender: Send + Sync {
    /// Send a raw message to every destination.
    async fn send_raw(&self, request: SendRawRequest) -> Result<SendReceipt, SendError>;
}
