//! Application state.
//!
//! The long-lived handles (RPC channels, storage, CDN) have an
//! init-on-startup lifecycle and are injected here rather than living as
//! ambient globals, so tests can substitute fakes behind the trait seams.

use std::sync::Arc;

use imago_core::{Config, UploadValidator};
use imago_rpc::{AuthClient, ImageEnhancer};
use imago_storage::{Cdn, Storage};

use crate::services::ingest::IngestService;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub storage: Arc<dyn Storage>,
    pub cdn: Arc<dyn Cdn>,
    pub enhancer: Arc<dyn ImageEnhancer>,
    pub auth_client: AuthClient,
    pub is_production: bool,
}

impl AppState {
    /// Build the per-request ingestion service from the shared handles.
    pub fn ingest_service(&self) -> IngestService {
        IngestService::new(
            self.storage.clone(),
            self.cdn.clone(),
            self.enhancer.clone(),
            UploadValidator::new(self.config.upload_limits()),
        )
    }
}

fn _assert_app_state_send_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}
    assert_send::<AppState>();
    assert_sync::<AppState>();
}
