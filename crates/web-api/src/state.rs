use std::sync::Arc;

use application::{ChatService, HubHandle, UploadRelay};

use crate::auth::JwtService;

#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ChatService>,
    pub upload_relay: Arc<UploadRelay>,
    pub hub: HubHandle,
    pub jwt_service: Arc<JwtService>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(
        chat_service: Arc<ChatService>,
        upload_relay: Arc<UploadRelay>,
        hub: HubHandle,
        jwt_service: Arc<JwtService>,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            chat_service,
            upload_relay,
            hub,
            jwt_service,
            max_upload_bytes,
        }
    }
}
