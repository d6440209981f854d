//! Identity gateway: who is signed in, and the status the UI renders.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, watch};

use crate::{
    Engine, EngineError, ResultEngine, Session, SessionContext,
    alerts::{Notification, Notifier},
    password::validate_password,
};

/// Status message used when the start-up session probe fails.
pub const INITIALIZATION_FAILED: &str = "Initialization failed";

/// Authentication backend.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> ResultEngine<Session>;
    async fn sign_up(&self, email: &str, password: &str) -> ResultEngine<Session>;
    async fn sign_out(&self);
    /// The session that survived from a previous sign-in, if any.
    async fn current_session(&self) -> ResultEngine<Option<Session>>;
    /// Confirm the signed-in user's current password.
    async fn reauthenticate(&self, password: &str) -> ResultEngine<()>;
    async fn update_password(&self, new_password: &str) -> ResultEngine<()>;
}

/// Provider backed by the engine's users table.
#[derive(Debug)]
pub struct LocalIdentity {
    engine: Arc<Engine>,
    current: RwLock<Option<Session>>,
}

impl LocalIdentity {
    pub fn new(engine: Arc<Engine>) -> Self {
        Self {
            engine,
            current: RwLock::new(None),
        }
    }

    /// Start already signed in as `session`, e.g. after a process restart.
    pub fn with_session(engine: Arc<Engine>, session: Session) -> Self {
        Self {
            engine,
            current: RwLock::new(Some(session)),
        }
    }

    async fn signed_in(&self) -> ResultEngine<Session> {
        self.current
            .read()
            .await
            .clone()
            .ok_or(EngineError::Unauthenticated)
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentity {
    async fn sign_in(&self, email: &str, password: &str) -> ResultEngine<Session> {
        let session = self.engine.authenticate(email, password).await?;
        *self.current.write().await = Some(session.clone());
        Ok(session)
    }

    async fn sign_up(&self, email: &str, password: &str) -> ResultEngine<Session> {
        let session = self.engine.register_user(email, password).await?;
        *self.current.write().await = Some(session.clone());
        Ok(session)
    }

    async fn sign_out(&self) {
        self.current.write().await.take();
    }

    async fn current_session(&self) -> ResultEngine<Option<Session>> {
        let Some(session) = self.current.read().await.clone() else {
            return Ok(None);
        };
        if self.engine.user_exists(session.user_id).await? {
            Ok(Some(session))
        } else {
            tracing::info!(user_id = %session.user_id, "stored session refers to a deleted user");
            self.current.write().await.take();
            Ok(None)
        }
    }

    async fn reauthenticate(&self, password: &str) -> ResultEngine<()> {
        let session = self.signed_in().await?;
        let verified = self.engine.authenticate(&session.email, password).await?;
        if verified.user_id != session.user_id {
            return Err(EngineError::InvalidCredentials(
                "wrong email or password".to_string(),
            ));
        }
        Ok(())
    }

    async fn update_password(&self, new_password: &str) -> ResultEngine<()> {
        let session = self.signed_in().await?;
        self.engine.set_password(&session, new_password).await
    }
}

/// What the sign-in screens render.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum AuthStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error(String),
}

/// Holds the sign-in status and the current session on top of an
/// [`IdentityProvider`].
pub struct IdentityGateway<P> {
    provider: P,
    notifier: Arc<dyn Notifier>,
    status: watch::Sender<AuthStatus>,
    session: RwLock<SessionContext>,
}

impl<P: IdentityProvider> IdentityGateway<P> {
    /// The gateway starts in [`AuthStatus::Loading`] until
    /// [`check_session`](Self::check_session) settles it.
    pub fn new(provider: P, notifier: Arc<dyn Notifier>) -> Self {
        let (status, _) = watch::channel(AuthStatus::Loading);
        Self {
            provider,
            notifier,
            status,
            session: RwLock::new(SessionContext::Anonymous),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    #[must_use]
    pub fn status(&self) -> AuthStatus {
        self.status.borrow().clone()
    }

    /// Observe every status change.
    pub fn subscribe(&self) -> watch::Receiver<AuthStatus> {
        self.status.subscribe()
    }

    /// Context to hand to the stores.
    pub async fn session(&self) -> SessionContext {
        self.session.read().await.clone()
    }

    fn set_status(&self, status: AuthStatus) {
        tracing::debug!(?status, "auth status");
        self.status.send_replace(status);
    }

    async fn settle(&self, result: ResultEngine<Session>) -> AuthStatus {
        let status = match result {
            Ok(session) => {
                *self.session.write().await = session.into();
                AuthStatus::Success
            }
            Err(err) => {
                *self.session.write().await = SessionContext::Anonymous;
                AuthStatus::Error(err.to_string())
            }
        };
        self.set_status(status.clone());
        status
    }

    /// Resolve the start-up status from a surviving session.
    pub async fn check_session(&self) -> AuthStatus {
        let status = match self.provider.current_session().await {
            Ok(Some(session)) => {
                *self.session.write().await = session.into();
                AuthStatus::Success
            }
            Ok(None) => {
                *self.session.write().await = SessionContext::Anonymous;
                AuthStatus::Idle
            }
            Err(err) => {
                tracing::warn!("session probe failed: {err}");
                AuthStatus::Error(INITIALIZATION_FAILED.to_string())
            }
        };
        self.set_status(status.clone());
        status
    }

    pub async fn login(&self, email: &str, password: &str) -> AuthStatus {
        self.set_status(AuthStatus::Loading);
        let result = self.provider.sign_in(email, password).await;
        self.settle(result).await
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> AuthStatus {
        self.set_status(AuthStatus::Loading);
        let result = self.provider.sign_up(email, password).await;
        self.settle(result).await
    }

    pub async fn logout(&self) {
        self.provider.sign_out().await;
        *self.session.write().await = SessionContext::Anonymous;
        self.set_status(AuthStatus::Idle);
    }

    /// Change the signed-in user's password.
    ///
    /// Input is checked first, then the current password is re-verified;
    /// any failure leaves the stored password untouched. A successful change
    /// posts a password-changed notification.
    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> ResultEngine<()> {
        if current_password.is_empty() {
            return Err(EngineError::InvalidPassword(
                "please enter current password".to_string(),
            ));
        }
        if new_password != confirm_password {
            return Err(EngineError::InvalidPassword(
                "passwords don't match".to_string(),
            ));
        }
        validate_password(new_password)?;

        self.provider.reauthenticate(current_password).await?;
        self.provider.update_password(new_password).await?;
        self.notifier.notify(Notification::password_changed());
        Ok(())
    }
}

impl<P> std::fmt::Debug for IdentityGateway<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityGateway")
            .field("status", &*self.status.borrow())
            .finish_non_exhaustive()
    }
}
