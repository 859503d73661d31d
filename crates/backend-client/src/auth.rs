//! Process-wide auth context.
//!
//! One context object owns the `{user, profile, session}` triple for
//! the whole app. It is created once at startup (restoring a persisted
//! session if the backend has one), passed explicitly to whoever needs
//! it, and every mutation funnels through its operations — each of
//! which publishes a fresh immutable snapshot to watchers.

use std::sync::Arc;

use picapica_booth_model::{AuthSession, AuthUser, ProfileFields, UserProfile};
use picapica_common::{BoothError, BoothResult};
use tokio::sync::watch;

use crate::backend::BoothBackend;

/// Immutable view of the auth state at one point in time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthSnapshot {
    pub user: Option<AuthUser>,
    pub profile: Option<UserProfile>,
    pub session: Option<AuthSession>,
}

impl AuthSnapshot {
    pub fn is_signed_in(&self) -> bool {
        self.session.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.profile.as_ref().is_some_and(UserProfile::is_admin)
    }
}

pub struct AuthContext {
    backend: Arc<dyn BoothBackend>,
    tx: watch::Sender<AuthSnapshot>,
}

impl AuthContext {
    /// Build the context at app start, restoring a persisted session
    /// when the backend has one. Restore failures degrade to the
    /// signed-out state — they are logged, never fatal.
    pub async fn init(backend: Arc<dyn BoothBackend>) -> Self {
        let mut snapshot = AuthSnapshot::default();
        match backend.get_session().await {
            Ok(Some(session)) => {
                let profile = match backend.get_profile(&session.user.id).await {
                    Ok(profile) => Some(profile),
                    Err(e) => {
                        tracing::warn!(error = %e, "profile fetch failed during restore");
                        None
                    }
                };
                snapshot = AuthSnapshot {
                    user: Some(session.user.clone()),
                    profile,
                    session: Some(session),
                };
                tracing::info!("restored persisted auth session");
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "session restore failed"),
        }

        let (tx, _) = watch::channel(snapshot);
        Self { backend, tx }
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> AuthSnapshot {
        self.tx.borrow().clone()
    }

    /// Subscribe to snapshot changes.
    pub fn subscribe(&self) -> watch::Receiver<AuthSnapshot> {
        self.tx.subscribe()
    }

    pub fn is_admin(&self) -> bool {
        self.tx.borrow().is_admin()
    }

    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        fields: ProfileFields,
    ) -> BoothResult<AuthSnapshot> {
        let session = self.backend.sign_up(email, password, fields).await?;
        Ok(self.publish_session(session).await)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> BoothResult<AuthSnapshot> {
        let session = self.backend.sign_in(email, password).await?;
        Ok(self.publish_session(session).await)
    }

    /// Explicit teardown: sign out at the backend and publish the
    /// signed-out snapshot.
    pub async fn sign_out(&self) -> BoothResult<()> {
        self.backend.sign_out().await?;
        self.tx.send_replace(AuthSnapshot::default());
        Ok(())
    }

    pub async fn update_profile(&self, fields: ProfileFields) -> BoothResult<AuthSnapshot> {
        let current = self.snapshot();
        let user = current
            .user
            .as_ref()
            .ok_or_else(|| BoothError::auth("no user signed in"))?;
        let profile = self.backend.update_profile(&user.id, fields).await?;

        let next = AuthSnapshot {
            profile: Some(profile),
            ..current
        };
        self.tx.send_replace(next.clone());
        Ok(next)
    }

    async fn publish_session(&self, session: AuthSession) -> AuthSnapshot {
        let profile = match self.backend.get_profile(&session.user.id).await {
            Ok(profile) => Some(profile),
            Err(e) => {
                tracing::warn!(error = %e, "profile fetch failed after sign-in");
                None
            }
        };
        let snapshot = AuthSnapshot {
            user: Some(session.user.clone()),
            profile,
            session: Some(session),
        };
        self.tx.send_replace(snapshot.clone());
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryBackend;

    #[tokio::test]
    async fn sign_in_publishes_snapshot() {
        let backend = Arc::new(MemoryBackend::new());
        backend
            .sign_up("ada@example.com", "hunter2", ProfileFields::default())
            .await
            .unwrap();
        backend.sign_out().await.unwrap();

        let context = AuthContext::init(backend).await;
        assert!(!context.snapshot().is_signed_in());

        let mut watcher = context.subscribe();
        let snapshot = context.sign_in("ada@example.com", "hunter2").await.unwrap();
        assert!(snapshot.is_signed_in());
        assert_eq!(snapshot.profile.as_ref().unwrap().email, "ada@example.com");

        watcher.changed().await.unwrap();
        assert_eq!(*watcher.borrow(), snapshot);
    }

    #[tokio::test]
    async fn failed_sign_in_leaves_state_untouched() {
        let backend = Arc::new(MemoryBackend::new());
        let context = AuthContext::init(backend).await;

        let before = context.snapshot();
        assert!(context.sign_in("ghost@example.com", "nope").await.is_err());
        assert_eq!(context.snapshot(), before);
    }

    #[tokio::test]
    async fn restore_picks_up_persisted_session() {
        let backend = Arc::new(MemoryBackend::new());
        backend
            .sign_up("ada@example.com", "hunter2", ProfileFields::default())
            .await
            .unwrap();

        // A fresh context (new process) sees the persisted session.
        let context = AuthContext::init(backend).await;
        assert!(context.snapshot().is_signed_in());
        assert_eq!(
            context.snapshot().user.unwrap().email,
            "ada@example.com"
        );
    }

    #[tokio::test]
    async fn admin_gating_follows_profile_role() {
        let backend = Arc::new(MemoryBackend::new());
        backend
            .sign_up("root@example.com", "hunter2", ProfileFields::default())
            .await
            .unwrap();
        backend.promote_to_admin("root@example.com");

        let context = AuthContext::init(backend.clone()).await;
        assert!(context.is_admin());

        context.sign_out().await.unwrap();
        assert!(!context.is_admin());
        assert!(backend.get_session().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_profile_requires_sign_in() {
        let backend = Arc::new(MemoryBackend::new());
        let context = AuthContext::init(backend).await;
        assert!(context
            .update_profile(ProfileFields {
                full_name: Some("Ada".into())
            })
            .await
            .is_err());
    }

    #[tokio::test]
    async fn update_profile_publishes_new_snapshot() {
        let backend = Arc::new(MemoryBackend::new());
        let context = AuthContext::init(backend.clone()).await;
        context
            .sign_up("ada@example.com", "hunter2", ProfileFields::default())
            .await
            .unwrap();

        let snapshot = context
            .update_profile(ProfileFields {
                full_name: Some("Ada Lovelace".into()),
            })
            .await
            .unwrap();
        assert_eq!(
            snapshot.profile.unwrap().full_name.as_deref(),
            Some("Ada Lovelace")
        );
    }
}
