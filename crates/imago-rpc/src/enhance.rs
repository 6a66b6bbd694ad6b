//! Client for the image enhancement microservice.

use std::time::Duration;

use async_trait::async_trait;
use tonic::transport::{Channel, Endpoint};
use tonic::Request;

use crate::proto::enhancement::enhancement_service_client::EnhancementServiceClient;
use crate::proto::enhancement::ProcessImageRequest;
use crate::status::app_error_from_status;
use crate::traits::{EnhancementRequest, EnhancementResult, ImageEnhancer};
use imago_core::AppError;

const SERVICE_NAME: &str = "enhancement service";

/// Typed client wrapping the RPC channel to the enhancement service.
///
/// Enhancement invokes a generative model, so the deadline here is much
/// longer than for auth calls. No retries; the caller decides whether a
/// failed enhancement is worth re-invoking.
#[derive(Clone)]
pub struct EnhancementClient {
    client: EnhancementServiceClient<Channel>,
    rpc_timeout: Duration,
}

impl EnhancementClient {
    /// Create a client for the enhancement service at `endpoint`
    /// (e.g. "http://enhancement-service:50061").
    pub fn connect(endpoint: String, rpc_timeout: Duration) -> Result<Self, AppError> {
        tracing::info!(endpoint = %endpoint, "Connecting to enhancement service");

        let channel = Endpoint::from_shared(endpoint.clone())
            .map_err(|e| {
                AppError::Internal(format!(
                    "invalid enhancement service endpoint {}: {}",
                    endpoint, e
                ))
            })?
            .connect_lazy();

        Ok(EnhancementClient {
            client: EnhancementServiceClient::new(channel),
            rpc_timeout,
        })
    }
}

#[async_trait]
impl ImageEnhancer for EnhancementClient {
    async fn process_image(
        &self,
        request: EnhancementRequest,
    ) -> Result<EnhancementResult, AppError> {
        tracing::debug!(
            mime_type = %request.mime_type,
            subject_hint = %request.subject_hint,
            image_size = request.image_data.len(),
            "Sending process image request to enhancement service"
        );

        let message = ProcessImageRequest {
            image_data: request.image_data,
            mime_type: request.mime_type,
            subject_hint: request.subject_hint,
        };

        let mut tonic_request = Request::new(message);
        tonic_request.set_timeout(self.rpc_timeout);

        let mut client = self.client.clone();
        let response = client
            .process_image(tonic_request)
            .await
            .map_err(|status| app_error_from_status(SERVICE_NAME, status))?
            .into_inner();

        tracing::debug!(
            mime_type = %response.mime_type,
            processed_size = response.processed_image_data.len(),
            message = %response.message,
            "Process image response received"
        );

        Ok(EnhancementResult {
            image_data: response.processed_image_data,
            mime_type: response.mime_type,
            message: response.message,
        })
    }
}
