//! `ObjectStore` backed by Amazon S3.

use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::types::{MetadataDirective, ObjectCannedAcl};
use tracing::debug;

use crate::error::StorageError;
use crate::services::traits::{Acl, CopyRequest, ObjectLocation, ObjectStore, StorageClass};

/// S3-backed object store.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
}

impl S3ObjectStore {
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }

    /// Build a client from the shared AWS SDK config.
    pub fn from_sdk_config(config: &aws_config::SdkConfig) -> Self {
        Self::new(aws_sdk_s3::Client::new(config))
    }
}

fn canned_acl(acl: Acl) -> ObjectCannedAcl {
    match acl {
        Acl::Private => ObjectCannedAcl::Private,
    }
}

fn storage_class(class: StorageClass) -> aws_sdk_s3::types::StorageClass {
    match class {
        StorageClass::Standard => aws_sdk_s3::types::StorageClass::Standard,
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn copy(&self, request: CopyRequest) -> Result<(), StorageError> {
        debug!(
            source = %request.source,
            destination = %request.destination,
            "Copying object"
        );

        // Metadata must be replaced for the content type to apply and for
        // an in-place copy to be accepted.
        self.client
            .copy_object()
            .copy_source(request.source.to_string())
            .bucket(&request.destination.bucket)
            .key(&request.destination.key)
            .acl(canned_acl(request.acl))
            .content_type(&request.content_type)
            .storage_class(storage_class(request.storage_class))
            .metadata_directive(MetadataDirective::Replace)
            .send()
            .await
            .map_err(|e| StorageError::CopyFailed {
                source_key: request.source.to_string(),
                dest_key: request.destination.to_string(),
                reason: DisplayErrorContext(&e).to_string(),
            })?;

        Ok(())
    }

    async fn read(&self, location: &ObjectLocation) -> Result<Vec<u8>, StorageError> {
        debug!(location = %location, "Reading object");

        let output = self
            .client
            .get_object()
            .bucket(&location.bucket)
            .key(&location.key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    StorageError::NotFound {
                        bucket: location.bucket.clone(),
                        key: location.key.clone(),
                    }
                } else {
                    StorageError::ReadFailed {
                        bucket: location.bucket.clone(),
                        key: location.key.clone(),
                        reason: DisplayErrorContext(&e).to_string(),
                    }
                }
            })?;

        let body = output
            .body
            .collect()
            .await
            .map_err(|e| StorageError::ReadFailed {
                bucket: location.bucket.clone(),
                key: location.key.clone(),
                reason: e.to_string(),
            })?;

        Ok(body.into_bytes().to_vec())
    }
}
