//! Explicit session context handed to every store call.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An authenticated user as seen by the stores.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: Uuid,
    pub email: String,
}

/// Who is calling a store.
///
/// Stores treat [`SessionContext::Anonymous`] as a silent no-op: reads come
/// back empty and writes are skipped.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SessionContext {
    #[default]
    Anonymous,
    Authenticated(Session),
}

impl SessionContext {
    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(session) => Some(session),
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

impl From<Session> for SessionContext {
    fn from(session: Session) -> Self {
        Self::Authenticated(session)
    }
}

impl From<Option<Session>> for SessionContext {
    fn from(session: Option<Session>) -> Self {
        session.map_or(Self::Anonymous, Self::Authenticated)
    }
}
