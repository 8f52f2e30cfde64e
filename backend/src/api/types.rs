//! JSON types of the HTTP API.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::controller::SessionView;
use crate::models::{FormDraft, UiState};

/// Response of `GET /api/session`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    /// Session identifier (also in the cookie)
    pub session_id: Uuid,

    /// Current UI state, tagged by `status`
    pub state: UiState,

    /// Pending validation warning, if any
    pub warning: Option<String>,

    /// Values the form will be pre-filled with
    pub draft: FormDraft,
}

impl SessionResponse {
    pub fn new(session_id: Uuid, view: SessionView) -> Self {
        Self {
            session_id,
            state: view.state,
            warning: view.warning,
            draft: view.draft,
        }
    }
}

/// Response of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub payment_mode: String,
    pub active_sessions: usize,
}

/// Create an error response body.
pub fn error_response(error: &str) -> Value {
    json!({
        "status": "error",
        "error": error,
    })
}
