use std::sync::Arc;

use idv_adapters::{DefaultExecutors, Reply, ScriptedBackend, ScriptedInteraction};
use idv_core::{Endpoint, FlowCoordinator, FlowState, InMemorySessionStore, ObserverEvent, RecordingObserver, Screen};
use idv_domain::{FlowError, StepKind};
use serde_json::json;

struct Rig {
    coordinator: FlowCoordinator,
    backend: Arc<ScriptedBackend>,
    observer: Arc<RecordingObserver>,
    interaction: Arc<ScriptedInteraction>,
}

fn rig(steps: &[&str], interaction: ScriptedInteraction) -> Rig {
    let backend = Arc::new(ScriptedBackend::happy_path("cust-1", "sess-1", steps));
    let observer = Arc::new(RecordingObserver::new());
    let interaction = Arc::new(interaction);
    let coordinator = FlowCoordinator::builder(backend.clone(), Arc::new(InMemorySessionStore::with_customer("cust-1")))
        .executors(Arc::new(DefaultExecutors::new(interaction.clone())))
        .observer(observer.clone())
        .build();
    Rig { coordinator,
          backend,
          observer,
          interaction }
}

#[tokio::test]
async fn full_flow_emits_sub_events_in_order() {
    let mut r = rig(&["selfie", "terms", "signature", "userInfo"], ScriptedInteraction::cooperative());
    assert!(r.coordinator.start(None).await);
    assert_eq!(r.coordinator.run_until_settled(1).await, FlowState::Completed);

    let lifecycle = r.observer.lifecycle();
    let terms_events: Vec<&ObserverEvent> = lifecycle.iter()
                                                     .filter(|e| {
                                                         matches!(e,
                                                                  ObserverEvent::TermsCheckboxesFetched(_)
                                                                  | ObserverEvent::TermsAccepted(_)
                                                                  | ObserverEvent::SignatureSubmitted
                                                                  | ObserverEvent::TermsAndSignatureSubmitted)
                                                     })
                                                     .collect();
    assert_eq!(terms_events.len(), 4);
    match terms_events[0] {
        ObserverEvent::TermsCheckboxesFetched(boxes) => {
            let ids: Vec<&str> = boxes.iter().map(|b| b.id.as_str()).collect();
            assert_eq!(ids, vec!["privacy", "marketing"]);
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(terms_events[3], &ObserverEvent::TermsAndSignatureSubmitted);
    assert_eq!(r.observer.count(|e| matches!(e, ObserverEvent::UserInfoSubmitted(_))), 1);
    assert_eq!(r.backend.calls(),
               vec![Endpoint::StartSession,
                    Endpoint::Selfie,
                    Endpoint::TermsCheckboxes,
                    Endpoint::Terms,
                    Endpoint::Signature,
                    Endpoint::UserInfo]);
    // Cada llamada produce un par de hooks before/after.
    assert_eq!(r.observer.count(|e| matches!(e, ObserverEvent::BeforeApiCall { .. })), 6);
    assert_eq!(r.observer.count(|e| matches!(e, ObserverEvent::AfterApiCall { success: true, .. })), 6);
}

#[tokio::test]
async fn already_submitted_selfie_counts_as_success() {
    let mut r = rig(&["selfie", "email"], ScriptedInteraction::cooperative());
    r.backend.enqueue(Endpoint::Selfie,
                      Reply::status(400, json!({"status": "error", "message": "Selfie already submitted"})));
    r.coordinator.start(None).await;
    assert!(r.coordinator.attempt().await);
    assert_eq!(r.coordinator.current_screen(), Some(Screen::Email));
    assert_eq!(r.observer.step_completions(), vec![(StepKind::Selfie, 0, true)]);
}

#[tokio::test]
async fn otp_retry_reverifies_without_resending() {
    let mut r = rig(&["email"], ScriptedInteraction::cooperative().codes(&["000000", "123456"]));
    r.backend.enqueue(Endpoint::VerifyEmailCode,
                      Reply::status(400, json!({"status": "error", "message": "Invalid verification code"})));
    r.coordinator.start(None).await;
    assert!(!r.coordinator.attempt().await);
    assert_eq!(r.coordinator.last_user_message(), Some("Invalid verification code"));
    assert!(r.coordinator.attempt().await);
    assert_eq!(r.backend.call_count(Endpoint::SendEmailCode), 1);
    assert_eq!(r.backend.call_count(Endpoint::VerifyEmailCode), 2);
    assert_eq!(r.coordinator.state(), FlowState::Completed);
}

#[tokio::test]
async fn changed_address_sends_new_code() {
    let mut r = rig(&["email"], ScriptedInteraction::cooperative());
    r.backend.enqueue(Endpoint::VerifyEmailCode,
                      Reply::status(400, json!({"status": "error", "message": "Invalid verification code"})));
    r.coordinator.start(None).await;
    assert!(!r.coordinator.attempt().await);
    r.interaction.set_email("other@example.com");
    assert!(r.coordinator.attempt().await);
    assert_eq!(r.backend.call_count(Endpoint::SendEmailCode), 2);
}

#[tokio::test]
async fn unaccepted_required_terms_fail_locally() {
    let mut r = rig(&["terms"], ScriptedInteraction::cooperative().accept_terms_ids(&["marketing"]));
    r.coordinator.start(None).await;
    assert!(!r.coordinator.attempt().await);
    assert!(matches!(r.coordinator.last_error(), Some(FlowError::InvalidInput(_))));
    assert_eq!(r.coordinator.last_user_message(), Some("Please accept all required terms"));
    assert_eq!(r.backend.call_count(Endpoint::Terms), 0);
    assert_eq!(r.coordinator.state(), FlowState::Presenting(0));
}

#[tokio::test]
async fn invalid_birth_date_never_reaches_backend() {
    let mut r = rig(&["userInfo"], ScriptedInteraction::cooperative().user_info("Ada", "Lovelace", "10/12/1815"));
    r.coordinator.start(None).await;
    assert!(!r.coordinator.attempt().await);
    assert_eq!(r.backend.call_count(Endpoint::UserInfo), 0);
    assert!(matches!(r.coordinator.last_error(), Some(FlowError::InvalidInput(_))));
}

#[tokio::test]
async fn missing_capture_is_reported_not_submitted() {
    let mut r = rig(&["selfie"], ScriptedInteraction::new());
    r.coordinator.start(None).await;
    assert!(!r.coordinator.attempt().await);
    assert_eq!(r.backend.call_count(Endpoint::Selfie), 0);
}

#[tokio::test]
async fn transport_failure_reports_failed_api_hook() {
    let mut r = rig(&["sms"], ScriptedInteraction::cooperative());
    r.backend.enqueue(Endpoint::SendPhoneCode, Reply::transport("network unreachable"));
    r.coordinator.start(None).await;
    assert!(!r.coordinator.attempt().await);
    assert_eq!(r.coordinator.last_user_message(), Some("Phone verification failed"));
    assert_eq!(r.observer.count(|e| {
                                 matches!(e, ObserverEvent::AfterApiCall { success: false, status_code: None, .. })
                             }),
               1);
}

#[tokio::test]
async fn signature_failure_after_terms_is_retried_idempotently() {
    let mut r = rig(&["terms", "signature"], ScriptedInteraction::cooperative());
    r.backend.enqueue(Endpoint::Signature, Reply::status(500, json!({"message": "Storage error"})));
    r.backend.enqueue(Endpoint::Terms, Reply::ok(json!({"status": "success"})));
    r.backend.enqueue(Endpoint::Terms,
                      Reply::status(400, json!({"message": "Terms already accepted"})));
    r.coordinator.start(None).await;
    assert!(!r.coordinator.attempt().await);
    assert_eq!(r.coordinator.current_screen(), Some(Screen::TermsAndSignature));
    assert!(r.coordinator.attempt().await);
    assert_eq!(r.coordinator.current_step_index(), 2);
    assert_eq!(r.observer.step_completions(),
               vec![(StepKind::Terms, 0, false), (StepKind::Terms, 0, true), (StepKind::Signature, 1, true)]);
}

#[tokio::test]
async fn reported_progress_enables_server_remaining_resume() {
    let store = Arc::new(InMemorySessionStore::with_customer("cust-1"));
    let backend = Arc::new(ScriptedBackend::happy_path("cust-1", "sess-1", &["selfie", "email", "userInfo"]));
    backend.enqueue(Endpoint::Selfie,
                    Reply::ok(json!({
                        "status": "success",
                        "data": {"steps_completed": ["selfie"], "steps_remaining": ["email", "userInfo"]}
                    })));
    let interaction = Arc::new(ScriptedInteraction::cooperative());
    let mut first = FlowCoordinator::builder(backend.clone(), store.clone()).executors(Arc::new(DefaultExecutors::new(interaction.clone())))
                                                                           .build();
    first.start(None).await;
    assert!(first.attempt().await);

    let mut second = FlowCoordinator::builder(backend.clone(), store.clone()).executors(Arc::new(DefaultExecutors::new(interaction)))
                                                                            .resume_strategy(idv_core::ResumeStrategy::ServerRemaining)
                                                                            .build();
    assert!(second.start(None).await);
    assert_eq!(second.current_step_index(), 1);
    assert_eq!(second.current_screen(), Some(Screen::Email));
    assert_eq!(backend.call_count(Endpoint::StartSession), 1);
}
