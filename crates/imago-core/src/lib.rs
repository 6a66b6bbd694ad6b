//! Imago core library
//!
//! Shared foundation for the gateway: configuration, the gateway-level error
//! taxonomy, domain models, and upload validation. No I/O lives here; the
//! storage, RPC, and HTTP layers build on these types.

pub mod config;
pub mod error;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::{Config, StorageBackend};
pub use error::{AppError, LogLevel};
pub use models::{ObjectKind, PipelineOutcome, StoredObject};
pub use validation::{UploadLimits, UploadValidator, ValidationError};
