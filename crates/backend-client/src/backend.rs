//! The backend call contract.
//!
//! Only the contract matters to the booth: auth, session rows, image
//! rows, and listing queries. Failures never propagate as faults —
//! callers convert them to local state (a banner, a log line) at the
//! call site.

use std::sync::Arc;

use async_trait::async_trait;
use picapica_booth_model::{
    AuthSession, GeneratedImageRecord, NewGeneratedImage, NewSession, ProfileFields,
    SessionRecord, UserProfile,
};
use picapica_common::BoothResult;

/// Auth + storage operations the booth delegates to the hosted service.
///
/// Listing queries return newest-first.
#[async_trait]
pub trait BoothBackend: Send + Sync {
    // Auth
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        profile: ProfileFields,
    ) -> BoothResult<AuthSession>;
    async fn sign_in(&self, email: &str, password: &str) -> BoothResult<AuthSession>;
    async fn sign_out(&self) -> BoothResult<()>;
    /// The persisted session from a previous run, if any.
    async fn get_session(&self) -> BoothResult<Option<AuthSession>>;
    async fn get_profile(&self, user_id: &str) -> BoothResult<UserProfile>;
    async fn update_profile(
        &self,
        user_id: &str,
        fields: ProfileFields,
    ) -> BoothResult<UserProfile>;

    // Booth storage
    async fn create_session(&self, new: NewSession) -> BoothResult<SessionRecord>;
    async fn save_generated_image(
        &self,
        new: NewGeneratedImage,
    ) -> BoothResult<GeneratedImageRecord>;
    async fn update_image_download_count(&self, image_id: &str) -> BoothResult<()>;

    // Listings (newest first)
    async fn get_user_images(&self, user_id: &str) -> BoothResult<Vec<GeneratedImageRecord>>;
    async fn get_user_sessions(&self, user_id: &str) -> BoothResult<Vec<SessionRecord>>;
    async fn get_all_users(&self) -> BoothResult<Vec<UserProfile>>;
    async fn get_all_images(&self) -> BoothResult<Vec<GeneratedImageRecord>>;
    async fn get_all_sessions(&self) -> BoothResult<Vec<SessionRecord>>;
}

/// Fire-and-forget download-count bump on export.
///
/// Spawned so the export path never waits on the network; a failure is
/// logged and otherwise ignored.
pub fn record_download(backend: Arc<dyn BoothBackend>, image_id: String) {
    tokio::spawn(async move {
        if let Err(e) = backend.update_image_download_count(&image_id).await {
            tracing::warn!(error = %e, image_id, "download count update failed");
        }
    });
}
