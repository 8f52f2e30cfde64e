//! Session-lifetime store for UI state.
//!
//! Sessions are keyed by a random id carried in a cookie and live in memory
//! only. Idle sessions expire after the configured TTL, except while a
//! submission is in flight.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::UiEvent;
use crate::error::StateError;
use crate::models::{FormDraft, UiState};

/// One browser session.
#[derive(Debug, Clone)]
struct Session {
    state: UiState,
    warning: Option<String>,
    draft: FormDraft,
    last_seen: DateTime<Utc>,
}

impl Session {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            state: UiState::default(),
            warning: None,
            draft: FormDraft::default(),
            last_seen: now,
        }
    }
}

/// What a page render needs from the session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub state: UiState,
    pub warning: Option<String>,
    pub draft: FormDraft,
}

/// Shared, cloneable handle to all sessions.
#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Return the live session for `id`, or create a fresh one.
    ///
    /// The boolean is `true` when a new session was created.
    pub async fn resolve(&self, id: Option<Uuid>) -> (Uuid, bool) {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;

        let before = sessions.len();
        let ttl = self.ttl;
        sessions.retain(|_, s| s.state == UiState::Submitting || now - s.last_seen < ttl);
        let purged = before - sessions.len();
        if purged > 0 {
            tracing::debug!(purged, "Expired idle sessions");
        }

        if let Some(id) = id {
            if let Some(session) = sessions.get_mut(&id) {
                session.last_seen = now;
                return (id, false);
            }
        }

        let id = Uuid::new_v4();
        sessions.insert(id, Session::new(now));
        tracing::debug!(session = %id, "Session created");
        (id, true)
    }

    /// Current view of a session without consuming its warning.
    pub async fn view(&self, id: Uuid) -> Option<SessionView> {
        let sessions = self.sessions.read().await;
        sessions.get(&id).map(|s| SessionView {
            state: s.state.clone(),
            warning: s.warning.clone(),
            draft: s.draft.clone(),
        })
    }

    /// Current view of a session, consuming its one-shot warning.
    pub async fn take_view(&self, id: Uuid) -> Option<SessionView> {
        let mut sessions = self.sessions.write().await;
        sessions.get_mut(&id).map(|s| SessionView {
            state: s.state.clone(),
            warning: s.warning.take(),
            draft: s.draft.clone(),
        })
    }

    pub async fn state(&self, id: Uuid) -> Option<UiState> {
        self.sessions.read().await.get(&id).map(|s| s.state.clone())
    }

    /// Apply an event atomically and return the new state.
    pub async fn apply(&self, id: Uuid, event: UiEvent) -> Result<UiState, StateError> {
        self.transition(id, event, None).await
    }

    /// Like [`apply`](Self::apply), also storing `draft` when the event is accepted.
    ///
    /// A refused event leaves the stored draft untouched.
    pub async fn apply_with_draft(
        &self,
        id: Uuid,
        event: UiEvent,
        draft: FormDraft,
    ) -> Result<UiState, StateError> {
        self.transition(id, event, Some(draft)).await
    }

    async fn transition(
        &self,
        id: Uuid,
        event: UiEvent,
        draft: Option<FormDraft>,
    ) -> Result<UiState, StateError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or(StateError::UnknownSession)?;

        let warning = match &event {
            UiEvent::InputRejected(message) => Some(message.clone()),
            _ => None,
        };
        let from = session.state.name();
        let next = session.state.clone().transition(event)?;

        tracing::debug!(session = %id, from, to = next.name(), "UI state transition");
        session.state = next.clone();
        session.warning = warning;
        if let Some(draft) = draft {
            session.draft = draft;
        }
        session.last_seen = Utc::now();
        Ok(next)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
