//! In-memory backend for tests and offline booth runs.
//!
//! Implements the full call contract against process-local state:
//! rows live in vectors in insertion (chronological) order, listings
//! read them back newest-first.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use picapica_booth_model::{
    AuthSession, AuthUser, GeneratedImageRecord, NewGeneratedImage, NewSession, ProfileFields,
    Role, SessionRecord, UserProfile,
};
use picapica_common::{BoothError, BoothResult};
use uuid::Uuid;

use crate::backend::BoothBackend;

#[derive(Default)]
struct State {
    users: Vec<UserProfile>,
    passwords: HashMap<String, String>,
    sessions: Vec<SessionRecord>,
    images: Vec<GeneratedImageRecord>,
    auth: Option<AuthSession>,
}

/// Process-local backend; every operation is infallible transport-wise,
/// so tests exercise only the contract semantics.
#[derive(Default)]
pub struct MemoryBackend {
    state: Mutex<State>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant the admin role to an existing user (test convenience —
    /// role changes are an operator action, not an API).
    pub fn promote_to_admin(&self, email: &str) {
        let mut state = self.state.lock().expect("backend state");
        if let Some(user) = state.users.iter_mut().find(|u| u.email == email) {
            user.role = Role::Admin;
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().expect("backend state")
    }
}

#[async_trait]
impl BoothBackend for MemoryBackend {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        profile: ProfileFields,
    ) -> BoothResult<AuthSession> {
        let mut state = self.lock();
        if state.users.iter().any(|u| u.email == email) {
            return Err(BoothError::auth(format!("{email} is already registered")));
        }

        let user = UserProfile {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            full_name: profile.full_name,
            role: Role::User,
            created_at: Utc::now(),
        };
        state.passwords.insert(email.to_string(), password.to_string());

        let session = AuthSession {
            access_token: Uuid::new_v4().to_string(),
            refresh_token: Uuid::new_v4().to_string(),
            user: AuthUser {
                id: user.id.clone(),
                email: user.email.clone(),
            },
        };
        state.users.push(user);
        state.auth = Some(session.clone());
        Ok(session)
    }

    async fn sign_in(&self, email: &str, password: &str) -> BoothResult<AuthSession> {
        let mut state = self.lock();
        let known = state.passwords.get(email).map(String::as_str) == Some(password);
        if !known {
            return Err(BoothError::auth("invalid login credentials"));
        }
        let user = state
            .users
            .iter()
            .find(|u| u.email == email)
            .expect("password without profile");

        let session = AuthSession {
            access_token: Uuid::new_v4().to_string(),
            refresh_token: Uuid::new_v4().to_string(),
            user: AuthUser {
                id: user.id.clone(),
                email: user.email.clone(),
            },
        };
        state.auth = Some(session.clone());
        Ok(session)
    }

    async fn sign_out(&self) -> BoothResult<()> {
        self.lock().auth = None;
        Ok(())
    }

    async fn get_session(&self) -> BoothResult<Option<AuthSession>> {
        Ok(self.lock().auth.clone())
    }

    async fn get_profile(&self, user_id: &str) -> BoothResult<UserProfile> {
        self.lock()
            .users
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
            .ok_or_else(|| BoothError::backend(format!("no profile for user {user_id}")))
    }

    async fn update_profile(
        &self,
        user_id: &str,
        fields: ProfileFields,
    ) -> BoothResult<UserProfile> {
        let mut state = self.lock();
        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| BoothError::backend(format!("no profile for user {user_id}")))?;
        user.full_name = fields.full_name;
        Ok(user.clone())
    }

    async fn create_session(&self, new: NewSession) -> BoothResult<SessionRecord> {
        let record = SessionRecord {
            id: Uuid::new_v4().to_string(),
            user_id: new.user_id,
            layout: new.layout,
            filter_applied: new.filter_applied,
            created_at: Utc::now(),
        };
        self.lock().sessions.push(record.clone());
        Ok(record)
    }

    async fn save_generated_image(
        &self,
        new: NewGeneratedImage,
    ) -> BoothResult<GeneratedImageRecord> {
        let record = GeneratedImageRecord {
            id: Uuid::new_v4().to_string(),
            user_id: new.user_id,
            session_id: new.session_id,
            image_data: new.image_data,
            layout: new.layout,
            background_color: new.background_color,
            sticker_applied: new.sticker_applied,
            file_size: new.file_size,
            download_count: 0,
            created_at: Utc::now(),
        };
        self.lock().images.push(record.clone());
        Ok(record)
    }

    async fn update_image_download_count(&self, image_id: &str) -> BoothResult<()> {
        let mut state = self.lock();
        let image = state
            .images
            .iter_mut()
            .find(|i| i.id == image_id)
            .ok_or_else(|| BoothError::backend(format!("no image {image_id}")))?;
        image.download_count += 1;
        Ok(())
    }

    async fn get_user_images(&self, user_id: &str) -> BoothResult<Vec<GeneratedImageRecord>> {
        Ok(self
            .lock()
            .images
            .iter()
            .filter(|i| i.user_id.as_deref() == Some(user_id))
            .rev()
            .cloned()
            .collect())
    }

    async fn get_user_sessions(&self, user_id: &str) -> BoothResult<Vec<SessionRecord>> {
        Ok(self
            .lock()
            .sessions
            .iter()
            .filter(|s| s.user_id.as_deref() == Some(user_id))
            .rev()
            .cloned()
            .collect())
    }

    async fn get_all_users(&self) -> BoothResult<Vec<UserProfile>> {
        Ok(self.lock().users.iter().rev().cloned().collect())
    }

    async fn get_all_images(&self) -> BoothResult<Vec<GeneratedImageRecord>> {
        Ok(self.lock().images.iter().rev().cloned().collect())
    }

    async fn get_all_sessions(&self) -> BoothResult<Vec<SessionRecord>> {
        Ok(self.lock().sessions.iter().rev().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use picapica_booth_model::Layout;

    #[tokio::test]
    async fn sign_up_then_sign_in() {
        let backend = MemoryBackend::new();
        let session = backend
            .sign_up("ada@example.com", "hunter2", ProfileFields::default())
            .await
            .unwrap();
        assert_eq!(session.user.email, "ada@example.com");

        backend.sign_out().await.unwrap();
        assert!(backend.get_session().await.unwrap().is_none());

        let err = backend.sign_in("ada@example.com", "wrong").await;
        assert!(err.is_err());

        let session = backend.sign_in("ada@example.com", "hunter2").await.unwrap();
        assert_eq!(backend.get_session().await.unwrap(), Some(session));
    }

    #[tokio::test]
    async fn listings_come_back_newest_first() {
        let backend = MemoryBackend::new();
        let mut ids = Vec::new();
        for layout in [Layout::ThreeByTwo, Layout::FourByTwo, Layout::TwoByTwo] {
            let record = backend
                .create_session(NewSession {
                    user_id: Some("u1".into()),
                    layout,
                    filter_applied: "none".into(),
                })
                .await
                .unwrap();
            ids.push(record.id);
        }

        let listed = backend.get_user_sessions("u1").await.unwrap();
        let listed_ids: Vec<_> = listed.iter().map(|s| s.id.clone()).collect();
        ids.reverse();
        assert_eq!(listed_ids, ids);

        assert!(backend.get_user_sessions("stranger").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn download_count_increments() {
        let backend = MemoryBackend::new();
        let saved = backend
            .save_generated_image(NewGeneratedImage {
                user_id: None,
                session_id: "s1".into(),
                image_data: "AAAA".into(),
                layout: Layout::TwoByTwo,
                background_color: "#ffffff".into(),
                sticker_applied: None,
                file_size: 4,
            })
            .await
            .unwrap();
        assert_eq!(saved.download_count, 0);

        backend.update_image_download_count(&saved.id).await.unwrap();
        backend.update_image_download_count(&saved.id).await.unwrap();

        let images = backend.get_all_images().await.unwrap();
        assert_eq!(images[0].download_count, 2);

        assert!(backend.update_image_download_count("missing").await.is_err());
    }
}
