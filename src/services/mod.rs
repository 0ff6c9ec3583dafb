//! External collaborators: object storage and mail sending.
//!
//! The pipeline only talks to the traits in [`traits`]; the AWS-backed
//! implementations live next to them.

pub mod s3;
pub mod ses;
pub mod traits;

pub use s3::S3ObjectStore;
pub use ses::SesMailSender;
pub use traits::{
    Acl, CopyRequest, MailSender, ObjectLocation, ObjectStore, SendRawRequest, SendReceipt,
    StorageClass,
};
