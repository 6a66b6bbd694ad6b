//! Imago RPC library
//!
//! Typed clients for the authentication and image enhancement microservices.
//! Every method wraps one remote operation: build the request, apply a
//! deadline, invoke the RPC, and translate any failure into the gateway
//! error taxonomy. No retries happen at this layer.

pub mod auth;
pub mod enhance;
pub mod status;
pub mod traits;

// Generated protobuf code
pub mod proto {
    pub mod auth {
        tonic::include_proto!("auth");
    }

    pub mod enhancement {
        tonic::include_proto!("enhancement");
    }
}

// Re-export commonly used types
pub use auth::AuthClient;
pub use enhance::EnhancementClient;
pub use status::app_error_from_status;
pub use traits::{
    EnhancementRequest, EnhancementResult, ImageEnhancer, TokenValidation, TokenValidator,
};
