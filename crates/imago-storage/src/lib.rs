//! Imago storage library
//!
//! Object storage abstraction for the gateway plus the CDN front that maps
//! storage keys to publicly cacheable URLs.
//!
//! # Storage key format
//!
//! Keys are namespaced by user and rendition kind:
//!
//! - **Originals**: `users/{user_id}/original/{name}_{suffix}{ext}`
//! - **Enhanced copies**: `users/{user_id}/enhanced/{name}_{suffix}{ext}`
//!
//! The random suffix makes keys collision-free regardless of the uploaded
//! filename; the `users/{user_id}/` prefix is the ownership boundary every
//! read and delete of a client-supplied key is checked against. Key
//! construction is centralized in the [keys] module.

pub mod cdn;
pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use cdn::{Cdn, CloudFrontCdn};
pub use factory::create_storage;
pub use imago_core::StorageBackend;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{PutOutcome, Storage, StorageError, StorageResult};
