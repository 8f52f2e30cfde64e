//! HTTP server for the intake page.
//!
//! Server-rendered, Post/Redirect/Get: every POST answers with a redirect to
//! `/` (or a conflict page), so reloading the page never re-sends a
//! submission. The UI state lives in a session keyed by a cookie.
//!
//! # Endpoints
//!
//! | Method | Path                | Description                                |
//! |--------|---------------------|--------------------------------------------|
//! | GET    | `/`                 | Page for the session's current state       |
//! | POST   | `/submit`           | Multipart form submission                  |
//! | POST   | `/restart`          | Start over                                 |
//! | GET    | `/payment`          | Redirect to the payment target             |
//! | GET    | `/api/session`      | JSON view of the session                   |
//! | GET    | `/health`           | Health check                               |
//! | GET    | `/assets/style.css` | Stylesheet                                 |

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Json, Redirect, Response},
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use super::form::read_form;
use super::pages::{render_conflict, render_page, PageOptions, STYLESHEET};
use super::types::{error_response, HealthResponse, SessionResponse};
use crate::config::Config;
use crate::controller::{SessionStore, SubmissionController};
use crate::error::{ServerResult, SubmitError};
use crate::models::UiState;
use crate::payment::PaymentRedirector;
use crate::webhook::WebhookClient;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "atmos_session";

/// Shared state of every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub controller: SubmissionController,
    pub sessions: SessionStore,
    pub pages: PageOptions,
}

impl AppState {
    pub fn from_config(config: &Config) -> ServerResult<Self> {
        let webhook = WebhookClient::new(config.webhook_url.clone(), config.webhook_timeout)?;
        let payment = PaymentRedirector::from_config(&config.payment, config.webhook_timeout)?;

        Ok(Self {
            controller: SubmissionController::new(webhook, payment),
            sessions: SessionStore::new(config.session_ttl),
            pages: PageOptions {
                auto_redirect: config.auto_redirect,
            },
        })
    }
}

/// Build the router.
pub fn create_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/submit", post(submit))
        .route("/restart", post(restart))
        .route("/payment", get(payment))
        .route("/api/session", get(session_state))
        .route("/assets/style.css", get(stylesheet))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server. `port` overrides the configured one.
pub async fn start_server(config: Config, port: Option<u16>) -> ServerResult<()> {
    let state = AppState::from_config(&config)?;
    let app = create_router(state.clone(), config.max_upload_bytes);

    let port = port.unwrap_or(config.port);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(
        address = %addr,
        webhook = %state.controller.webhook().endpoint(),
        payment = state.controller.payment().mode(),
        "Atmos intake server listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

// =============================================================================
// Handlers
// =============================================================================

/// Intake page for the session's current state.
async fn index(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (id, created) = state.sessions.resolve(session_from_headers(&headers)).await;
    let view = state.sessions.take_view(id).await.unwrap_or_default();

    let mut response = Html(render_page(&view, state.pages)).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    with_session_cookie(response, id, created)
}

/// Multipart form submission.
async fn submit(State(state): State<AppState>, headers: HeaderMap, multipart: Multipart) -> Response {
    let (id, created) = state.sessions.resolve(session_from_headers(&headers)).await;

    let input = match read_form(multipart).await {
        Ok(input) => input,
        Err(e) => {
            tracing::warn!(session = %id, error = %e, "Unreadable submission body");
            let response = (e.status(), Json(error_response(&e.body_text()))).into_response();
            return with_session_cookie(response, id, created);
        }
    };

    let response = match state.controller.submit(&state.sessions, id, input).await {
        Ok(_) | Err(SubmitError::Validation(_)) => Redirect::to("/").into_response(),
        Err(SubmitError::State(e)) => {
            (StatusCode::CONFLICT, Html(render_conflict(&e.to_string()))).into_response()
        }
        Err(e) => {
            tracing::error!(session = %id, error = %e, "Unexpected submission error");
            (StatusCode::INTERNAL_SERVER_ERROR, Html(render_conflict(&e.to_string()))).into_response()
        }
    };

    with_session_cookie(response, id, created)
}

/// Reset the session to the empty form.
async fn restart(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (id, created) = state.sessions.resolve(session_from_headers(&headers)).await;

    let response = match state.controller.restart(&state.sessions, id).await {
        Ok(_) => Redirect::to("/").into_response(),
        Err(e) => (StatusCode::CONFLICT, Html(render_conflict(&e.to_string()))).into_response(),
    };

    with_session_cookie(response, id, created)
}

/// Manual payment link: 303 to the target once the session awaits payment.
async fn payment(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (id, created) = state.sessions.resolve(session_from_headers(&headers)).await;

    let response = match state.sessions.state(id).await {
        Some(UiState::AwaitingPayment { target }) => {
            tracing::info!(session = %id, "Sending user to payment");
            Redirect::to(target.url()).into_response()
        }
        _ => Redirect::to("/").into_response(),
    };

    with_session_cookie(response, id, created)
}

/// JSON view of the session.
async fn session_state(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (id, created) = state.sessions.resolve(session_from_headers(&headers)).await;
    let view = state.sessions.view(id).await.unwrap_or_default();

    with_session_cookie(Json(SessionResponse::new(id, view)).into_response(), id, created)
}

/// Health check endpoint
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        service: "atmos".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        payment_mode: state.controller.payment().mode().into(),
        active_sessions: state.sessions.len().await,
    })
}

async fn stylesheet() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLESHEET,
    )
}

// =============================================================================
// Session cookie
// =============================================================================

/// Session id from the `Cookie` header, if present and well-formed.
pub fn session_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

fn with_session_cookie(mut response: Response, id: Uuid, created: bool) -> Response {
    if created {
        let cookie = format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax");
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }
    response
}
