use std::collections::BTreeSet;

use idv_domain::{sort_for_display, FlowError, PredefinedUserInfo, Session, SessionProgress, StepKind, TermsCheckbox, VerificationSettings};
use serde_json::json;

#[test]
fn session_round_trips_through_store_json() {
    let session = Session::new(Some("sess-9".into()),
                               "tok-9",
                               StepKind::parse_list(&["selfie", "terms", "signature", "userInfo"]),
                               BTreeSet::from([StepKind::Sms]),
                               None).unwrap();
    let raw = serde_json::to_string(&session).unwrap();
    assert!(raw.contains("\"userInfo\""));
    let back: Session = serde_json::from_str(&raw).unwrap();
    assert_eq!(back, session);
}

#[test]
fn settings_accept_sparse_payloads() {
    let settings: VerificationSettings = serde_json::from_value(json!({
        "required_steps": ["email", "sms"],
        "flags": { "show_logo": true }
    })).unwrap();
    assert_eq!(settings.required_steps, vec![StepKind::Email, StepKind::Sms]);
    assert!(settings.optional_steps.is_empty());
    assert!(settings.flag_enabled("show_logo"));
    assert!(!settings.flag_enabled("missing"));
}

#[test]
fn progress_defaults_to_empty_lists() {
    let p: SessionProgress = serde_json::from_value(json!({ "steps_completed": ["selfie"] })).unwrap();
    assert_eq!(p.steps_completed, vec![StepKind::Selfie]);
    assert!(p.is_done());
}

#[test]
fn terms_sorted_by_display_order() {
    let boxes = vec![TermsCheckbox { id: "b".into(), text: "B".into(), required: false, display_order: 2 },
                     TermsCheckbox { id: "a".into(), text: "A".into(), required: true, display_order: 1 }];
    let sorted = sort_for_display(boxes);
    assert_eq!(sorted[0].id, "a");
}

#[test]
fn predefined_email_only() {
    let p = PredefinedUserInfo { email: Some("a@b.co".into()), ..Default::default() };
    assert!(p.has_email());
    assert!(!p.has_phone_number());
    assert!(!p.has_complete_identity());
}

#[test]
fn flow_error_serializes_for_journal() {
    let err = FlowError::rejected(Some(400), "Selfie rejected");
    let raw = serde_json::to_value(&err).unwrap();
    let back: FlowError = serde_json::from_value(raw).unwrap();
    assert_eq!(back, err);
}
