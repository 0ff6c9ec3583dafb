//! In-memory collaborators shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};

use ses_forwarder::ForwarderConfig;
use ses_forwarder::error::{SendError, StorageError};
use ses_forwarder::services::{
    CopyRequest, MailSender, ObjectLocation, ObjectStore, SendRawRequest, SendReceipt,
};

/// Object store over a map, recording every call.
#[derive(Default)]
pub struct MemoryObjectStore {
    pub objects: Mutex<HashMap<String, Vec<u8>>>,
    pub copies: Mutex<Vec<CopyRequest>>,
    pub reads: Mutex<Vec<ObjectLocation>>,
    pub fail_copy: bool,
    pub fail_read: bool,
}

impl MemoryObjectStore {
    pub fn with_object(location: &ObjectLocation, body: &str) -> Self {
        let store = Self::default();
        store
            .objects
            .lock()
            .unwrap()
            .insert(location.to_string(), body.as_bytes().to_vec());
        store
    }

    pub fn calls(&self) -> usize {
        self.copies.lock().unwrap().len() + self.reads.lock().unwrap().len()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn copy(&self, request: CopyRequest) -> Result<(), StorageError> {
        self.copies.lock().unwrap().push(request.clone());
        if self.fail_copy {
            return Err(StorageError::CopyFailed {
                source_key: request.source.to_string(),
                dest_key: request.destination.to_string(),
                reason: "AccessDenied".into(),
            });
        }
        let mut objects = self.objects.lock().unwrap();
        let body = objects
            .get(&request.source.to_string())
            .cloned()
            .ok_or_else(|| StorageError::NotFound {
                bucket: request.source.bucket.clone(),
                key: request.source.key.clone(),
            })?;
        objects.insert(request.destination.to_string(), body);
        Ok(())
    }

    async fn read(&self, location: &ObjectLocation) -> Result<Vec<u8>, StorageError> {
        self.reads.lock().unwrap().push(location.clone());
        if self.fail_read {
            return Err(StorageError::ReadFailed {
                bucket: location.bucket.clone(),
                key: location.key.clone(),
                reason: "SlowDown".into(),
            });
        }
        self.objects
            .lock()
            .unwrap()
            .get(&location.to_string())
            .cloned()
            .ok_or_else(|| StorageError::NotFound {
                bucket: location.bucket.clone(),
                key: location.key.clone(),
            })
    }
}

/// Mail sender that records requests instead of sending.
#[derive(Default)]
pub struct RecordingMailSender {
    pub sent: Mutex<Vec<SendRawRequest>>,
    pub fail: bool,
}

impl RecordingMailSender {
    pub fn sent(&self) -> Vec<SendRawRequest> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailSender for RecordingMailSender {
    async fn send_raw(&self, request: SendRawRequest) -> Result<SendReceipt, SendError> {
        let source = request.source.clone();
        self.sent.lock().unwrap().push(request);
        if self.fail {
            return Err(SendError::Rejected {
                sender: source,
                reason: "MessageRejected: Email address is not verified.".into(),
            });
        }
        Ok(SendReceipt {
            message_id: "0100018c-test".into(),
        })
    }
}

/// Writer that appends formatted log output to a shared buffer.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn dispatch(&self) -> tracing::Dispatch {
        let capture = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || capture.clone())
            .finish();
        tracing::Dispatch::new(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub const MESSAGE_ID: &str = "o3vrnil0e2ic28trm7dfhrc2v0clambda4nbp0g1";
pub const SOURCE: &str = "p@y.com";
pub const RAW_MESSAGE: &str = "From: Person <p@y.com>\r\nTo: info@example.com\r\n\r\nBody";

pub fn config() -> ForwarderConfig {
    ForwarderConfig::from_json(
        r#"{
            "emailBucket": "mail-bucket",
            "emailKeyPrefix": "inbox/",
            "forwardMapping": { "info@example.com": ["a@x.com", "b@x.com"] }
        }"#,
    )
    .unwrap()
}

pub fn stored_location() -> ObjectLocation {
    ObjectLocation::new("mail-bucket", format!("inbox/{MESSAGE_ID}"))
}

pub fn ses_event(recipients: &[&str]) -> Value {
    json!({
        "Records": [{
            "eventSource": "aws:ses",
            "eventVersion": "1.0",
            "ses": {
                "mail": {
                    "timestamp": "2026-10-15T10:00:00.000Z",
                    "source": SOURCE,
                    "messageId": MESSAGE_ID,
                    "destination": recipients,
                    "headersTruncated": false
                },
                "receipt": {
                    "recipients": recipients,
                    "spamVerdict": { "status": "PASS" },
                    "action": { "type": "Lambda" }
                }
            }
        }]
    })
}
