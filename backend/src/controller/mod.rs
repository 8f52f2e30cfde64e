//! UI state controller.
//!
//! ```text
//!              submit (valid)                 webhook 2xx + payment target
//! Collecting ───────────────▶ Submitting ─────────────────────────────▶ AwaitingPayment
//!   ▲   │ submit (invalid)        │
//!   │   └──▶ Collecting + warning │ rejected / network / payment setup error
//!   │                             ▼
//!   └──────── restart ─────── Failed ── submit (valid) ──▶ Submitting
//! ```
//!
//! [`UiState::transition`] is the whole table; [`SubmissionController`] drives
//! it for one submit action and talks to the webhook and payment provider.

pub mod session;

use uuid::Uuid;

use crate::error::{StateError, SubmitError, SubmitResult};
use crate::models::{FormDraft, FormInput, PaymentTarget, SubmissionRequest, SubmissionResult, UiState};
use crate::payment::PaymentRedirector;
use crate::validation::validate_input;
use crate::webhook::WebhookClient;

pub use session::{SessionStore, SessionView};

/// Failure shown when a submission ended without an outcome.
pub const INTERRUPTED_MESSAGE: &str = "Submission interrupted, please try again";

/// Something that happened to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// Submit with missing or invalid input; carries the warning to show.
    InputRejected(String),
    /// Submit with valid input; the webhook call starts.
    SubmitStarted,
    /// Webhook accepted and the payment target is known.
    PaymentReady(PaymentTarget),
    /// Webhook rejected, unreachable, or payment setup failed.
    SubmissionFailed(String),
    /// User starts over.
    Restart,
}

impl UiEvent {
    pub fn name(&self) -> &'static str {
        match self {
            UiEvent::InputRejected(_) => "input_rejected",
            UiEvent::SubmitStarted => "submit_started",
            UiEvent::PaymentReady(_) => "payment_ready",
            UiEvent::SubmissionFailed(_) => "submission_failed",
            UiEvent::Restart => "restart",
        }
    }
}

impl UiState {
    /// Next state for `event`, or why the event is not allowed.
    pub fn transition(self, event: UiEvent) -> Result<UiState, StateError> {
        use UiEvent as E;
        use UiState as S;

        match (self, event) {
            (S::Collecting | S::Failed { .. }, E::InputRejected(_)) => Ok(S::Collecting),
            (S::Collecting | S::Failed { .. }, E::SubmitStarted) => Ok(S::Submitting),
            (S::Submitting, E::PaymentReady(target)) => Ok(S::AwaitingPayment { target }),
            (S::Submitting, E::SubmissionFailed(message)) => Ok(S::Failed { message }),
            (S::Submitting, _) => Err(StateError::SubmissionInProgress),
            (_, E::Restart) => Ok(S::Collecting),
            (S::AwaitingPayment { .. }, E::InputRejected(_) | E::SubmitStarted) => {
                Err(StateError::AlreadySubmitted)
            }
            (state, event) => Err(StateError::InvalidTransition {
                state: state.name(),
                event: event.name(),
            }),
        }
    }
}

/// Runs submit actions: validate, post to the webhook, resolve payment.
#[derive(Debug, Clone)]
pub struct SubmissionController {
    webhook: WebhookClient,
    payment: PaymentRedirector,
}

impl SubmissionController {
    pub fn new(webhook: WebhookClient, payment: PaymentRedirector) -> Self {
        Self { webhook, payment }
    }

    pub fn webhook(&self) -> &WebhookClient {
        &self.webhook
    }

    pub fn payment(&self) -> &PaymentRedirector {
        &self.payment
    }

    /// One attempt against the external services, independent of any session.
    ///
    /// The webhook is called exactly once; the payment target is only
    /// resolved after the webhook accepted the submission.
    pub async fn dispatch(&self, request: &SubmissionRequest) -> SubmitResult<PaymentTarget> {
        match self.webhook.submit(request).await {
            SubmissionResult::Success => {}
            SubmissionResult::Rejected(status) => return Err(SubmitError::WebhookRejected(status)),
            SubmissionResult::NetworkError(message) => return Err(SubmitError::Network(message)),
        }

        let target = self.payment.prepare(request).await?;
        Ok(target)
    }

    /// Handle a submit action for a session and return its new state.
    ///
    /// Invalid input leaves the session collecting with a warning and returns
    /// the validation error. A submit while one is in flight, or after the
    /// session reached payment, is refused without contacting the webhook.
    /// Webhook and payment failures are not errors here: they land the
    /// session in [`UiState::Failed`].
    ///
    /// Once the session is submitting, the outcome is applied by a spawned
    /// task, so dropping this future (client disconnect) still leaves the
    /// session in a final state.
    pub async fn submit(
        &self,
        sessions: &SessionStore,
        session_id: Uuid,
        input: FormInput,
    ) -> SubmitResult<UiState> {
        if let Some(state) = sessions.state(session_id).await {
            if !state.accepts_input() {
                return Err(UiState::transition(state, UiEvent::SubmitStarted)
                    .err()
                    .unwrap_or(StateError::SubmissionInProgress)
                    .into());
            }
        }

        let draft = FormDraft::from(&input);

        let request = match validate_input(input) {
            Ok(request) => request,
            Err(e) => {
                tracing::info!(session = %session_id, reason = %e, "Submission blocked by validation");
                sessions
                    .apply_with_draft(session_id, UiEvent::InputRejected(e.to_string()), draft)
                    .await?;
                return Err(e.into());
            }
        };

        sessions
            .apply_with_draft(session_id, UiEvent::SubmitStarted, draft)
            .await?;
        tracing::info!(
            session = %session_id,
            files = request.files.len(),
            mix_wideness = request.mix_wideness,
            "Submission started"
        );

        let worker = {
            let controller = self.clone();
            let sessions = sessions.clone();
            tokio::spawn(async move { controller.complete(&sessions, session_id, request).await })
        };

        match worker.await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(session = %session_id, error = %e, "Submission task aborted");
                let event = UiEvent::SubmissionFailed(INTERRUPTED_MESSAGE.into());
                Ok(sessions.apply(session_id, event).await?)
            }
        }
    }

    /// Dispatch and record the outcome on the session.
    async fn complete(
        &self,
        sessions: &SessionStore,
        session_id: Uuid,
        request: SubmissionRequest,
    ) -> SubmitResult<UiState> {
        let event = match self.dispatch(&request).await {
            Ok(target) => {
                tracing::info!(session = %session_id, payment = self.payment.mode(), "Submission accepted");
                UiEvent::PaymentReady(target)
            }
            Err(e) => {
                tracing::warn!(session = %session_id, error = %e, "Submission failed");
                UiEvent::SubmissionFailed(e.to_string())
            }
        };

        Ok(sessions.apply(session_id, event).await?)
    }

    /// Start over from any state except an in-flight submission.
    pub async fn restart(&self, sessions: &SessionStore, session_id: Uuid) -> SubmitResult<UiState> {
        Ok(sessions.apply(session_id, UiEvent::Restart).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AudioFile;
    use bytes::Bytes;
    use chrono::Duration as ChronoDuration;
    use reqwest::Url;
    use std::time::Duration;

    fn target() -> PaymentTarget {
        PaymentTarget::StaticLink {
            url: "https://buy.example/abc".into(),
        }
    }

    fn controller(webhook_url: &str) -> SubmissionController {
        let webhook =
            WebhookClient::new(Url::parse(webhook_url).unwrap(), Duration::from_secs(5)).unwrap();
        let payment = PaymentRedirector::StaticLink(Url::parse("https://buy.example/abc").unwrap());
        SubmissionController::new(webhook, payment)
    }

    fn valid_input() -> FormInput {
        FormInput {
            files: vec![AudioFile {
                file_name: "take1.wav".into(),
                content: Bytes::from_static(b"RIFFdata"),
                media_type: "audio/wav".into(),
            }],
            email: "artist@example.com".into(),
            mix_wideness: Some("50".into()),
            output_formats: vec!["2.0 Stereo".into(), "Binaural".into()],
            content_types: vec![],
        }
    }

    #[test]
    fn test_transition_table() {
        let s = UiState::Collecting.transition(UiEvent::SubmitStarted).unwrap();
        assert_eq!(s, UiState::Submitting);

        let s = s.transition(UiEvent::PaymentReady(target())).unwrap();
        assert_eq!(s, UiState::AwaitingPayment { target: target() });

        assert_eq!(
            s.clone().transition(UiEvent::SubmitStarted).unwrap_err(),
            StateError::AlreadySubmitted
        );
        assert_eq!(s.transition(UiEvent::Restart).unwrap(), UiState::Collecting);
    }

    #[test]
    fn test_failed_accepts_retry() {
        let failed = UiState::Submitting
            .transition(UiEvent::SubmissionFailed("Webhook submission failed: 500".into()))
            .unwrap();
        assert!(failed.accepts_input());
        assert_eq!(
            failed.clone().transition(UiEvent::SubmitStarted).unwrap(),
            UiState::Submitting
        );
        assert_eq!(
            failed.transition(UiEvent::InputRejected("missing".into())).unwrap(),
            UiState::Collecting
        );
    }

    #[test]
    fn test_submitting_refuses_everything_but_outcomes() {
        for event in [
            UiEvent::SubmitStarted,
            UiEvent::InputRejected("x".into()),
            UiEvent::Restart,
        ] {
            assert_eq!(
                UiState::Submitting.transition(event).unwrap_err(),
                StateError::SubmissionInProgress
            );
        }
    }

    #[test]
    fn test_outcome_without_submit_is_invalid() {
        let err = UiState::Collecting
            .transition(UiEvent::PaymentReady(target()))
            .unwrap_err();
        assert!(matches!(err, StateError::InvalidTransition { state: "collecting", .. }));
    }

    #[tokio::test]
    async fn test_invalid_input_never_calls_webhook() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/hook")
            .with_status(200)
            .expect(0)
            .create_async()
            .await;

        let sessions = SessionStore::new(ChronoDuration::minutes(10));
        let (id, _) = sessions.resolve(None).await;
        let controller = controller(&format!("{}/hook", server.url()));

        let mut no_files = valid_input();
        no_files.files.clear();
        let mut no_email = valid_input();
        no_email.email = " ".into();

        for input in [no_files, no_email] {
            let err = controller.submit(&sessions, id, input).await.unwrap_err();
            assert!(matches!(err, SubmitError::Validation(_)));
            assert_eq!(sessions.state(id).await, Some(UiState::Collecting));
        }

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_success_reaches_awaiting_payment_once() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/hook")
            .with_status(200)
            .expect(1)
            .create_async()
            .await;

        let sessions = SessionStore::new(ChronoDuration::minutes(10));
        let (id, _) = sessions.resolve(None).await;
        let controller = controller(&format!("{}/hook", server.url()));

        let state = controller.submit(&sessions, id, valid_input()).await.unwrap();
        assert_eq!(state, UiState::AwaitingPayment { target: target() });

        // a second submit is refused without a second POST
        let err = controller.submit(&sessions, id, valid_input()).await.unwrap_err();
        assert!(matches!(err, SubmitError::State(StateError::AlreadySubmitted)));

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_rejected_lands_in_failed_and_keeps_draft() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/hook")
            .with_status(500)
            .create_async()
            .await;

        let sessions = SessionStore::new(ChronoDuration::minutes(10));
        let (id, _) = sessions.resolve(None).await;
        let controller = controller(&format!("{}/hook", server.url()));

        let state = controller.submit(&sessions, id, valid_input()).await.unwrap();
        assert_eq!(
            state,
            UiState::Failed {
                message: "Webhook submission failed: 500".into()
            }
        );

        let view = sessions.view(id).await.unwrap();
        assert_eq!(view.draft.email, "artist@example.com");
        assert_eq!(view.draft.output_formats, vec!["2.0 Stereo", "Binaural"]);
        assert!(view.state.accepts_input());
    }

    #[tokio::test]
    async fn test_network_error_message_has_cause() {
        let sessions = SessionStore::new(ChronoDuration::minutes(10));
        let (id, _) = sessions.resolve(None).await;
        let controller = controller("http://127.0.0.1:1/hook");

        match controller.submit(&sessions, id, valid_input()).await.unwrap() {
            UiState::Failed { message } => {
                assert!(message.starts_with("Webhook error: "), "{message}");
                assert!(message.contains("error sending request"), "{message}");
            }
            other => panic!("expected failed state, got {other:?}"),
        }
    }

    /// Webhook that accepts connections and never answers.
    async fn silent_webhook() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        format!("http://{addr}/hook")
    }

    #[tokio::test]
    async fn test_dropped_submit_still_reaches_final_state() {
        let webhook = WebhookClient::new(
            Url::parse(&silent_webhook().await).unwrap(),
            Duration::from_millis(500),
        )
        .unwrap();
        let payment = PaymentRedirector::StaticLink(Url::parse("https://buy.example/abc").unwrap());
        let controller = SubmissionController::new(webhook, payment);

        let sessions = SessionStore::new(ChronoDuration::minutes(10));
        let (id, _) = sessions.resolve(None).await;

        // the caller goes away while the webhook is still pending
        let dropped = tokio::time::timeout(
            Duration::from_millis(100),
            controller.submit(&sessions, id, valid_input()),
        )
        .await;
        assert!(dropped.is_err());
        assert_eq!(sessions.state(id).await, Some(UiState::Submitting));

        let mut state = UiState::Submitting;
        for _ in 0..50 {
            tokio::time::sleep(Duration::from_millis(100)).await;
            state = sessions.state(id).await.unwrap();
            if state != UiState::Submitting {
                break;
            }
        }

        match state {
            UiState::Failed { message } => assert!(message.starts_with("Webhook error: "), "{message}"),
            other => panic!("expected failed state, got {other:?}"),
        }
        assert_eq!(
            controller.restart(&sessions, id).await.unwrap(),
            UiState::Collecting
        );
    }

    #[tokio::test]
    async fn test_refused_submit_keeps_inflight_draft() {
        let sessions = SessionStore::new(ChronoDuration::minutes(10));
        let (id, _) = sessions.resolve(None).await;
        sessions
            .apply_with_draft(id, UiEvent::SubmitStarted, FormDraft::from(&valid_input()))
            .await
            .unwrap();

        let mut other = valid_input();
        other.email = "someone-else@example.com".into();
        let err = controller("http://127.0.0.1:1/hook")
            .submit(&sessions, id, other)
            .await
            .unwrap_err();

        assert!(matches!(err, SubmitError::State(StateError::SubmissionInProgress)));
        assert_eq!(sessions.view(id).await.unwrap().draft.email, "artist@example.com");
    }

    #[tokio::test]
    async fn test_restart_from_awaiting_payment() {
        let sessions = SessionStore::new(ChronoDuration::minutes(10));
        let (id, _) = sessions.resolve(None).await;
        sessions.apply(id, UiEvent::SubmitStarted).await.unwrap();
        sessions.apply(id, UiEvent::PaymentReady(target())).await.unwrap();

        let controller = controller("http://127.0.0.1:1/hook");
        let state = controller.restart(&sessions, id).await.unwrap();
        assert_eq!(state, UiState::Collecting);
    }
}
