//! Payloads del wire para las operaciones que no son envíos de step.
//!
//! El upstream mezcla snake_case y camelCase; se aceptan ambos.
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use idv_domain::{FlowError, Session, StepKind, TermsCheckbox, VerificationSettings};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct DeviceRegistration {
    #[serde(alias = "customerId")]
    pub customer_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SessionPayload {
    #[serde(default, alias = "sessionId")]
    pub session_id: Option<String>,
    #[serde(default, alias = "sessionToken", alias = "token")]
    pub session_token: String,
    #[serde(default, alias = "stepsRequired", alias = "steps_required")]
    pub required_steps: Vec<StepKind>,
    #[serde(default, alias = "stepsOptional", alias = "steps_optional")]
    pub optional_steps: Vec<StepKind>,
    #[serde(default, alias = "expiresAt")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl SessionPayload {
    pub fn into_session(self) -> Result<Session, FlowError> {
        if self.session_token.trim().is_empty() {
            return Err(FlowError::DecodeFailure("start-session response carried no session token".to_string()));
        }
        Ok(Session::new(self.session_id,
                        &self.session_token,
                        self.required_steps,
                        self.optional_steps.into_iter().collect(),
                        self.expires_at)?)
    }
}

#[derive(Debug, Deserialize)]
pub struct SettingsPayload {
    #[serde(default, alias = "requiredSteps", alias = "steps_required")]
    pub required_steps: Vec<StepKind>,
    #[serde(default, alias = "optionalSteps", alias = "steps_optional")]
    pub optional_steps: Vec<StepKind>,
    #[serde(default, alias = "settings")]
    pub flags: BTreeMap<String, serde_json::Value>,
}

impl From<SettingsPayload> for VerificationSettings {
    fn from(p: SettingsPayload) -> Self {
        let mut required_steps: Vec<StepKind> = Vec::with_capacity(p.required_steps.len());
        for step in p.required_steps {
            if !required_steps.contains(&step) {
                required_steps.push(step);
            }
        }
        VerificationSettings { required_steps,
                               optional_steps: p.optional_steps,
                               flags: p.flags }
    }
}

#[derive(Debug, Deserialize)]
struct CheckboxPayload {
    id: String,
    #[serde(default, alias = "label")]
    text: String,
    #[serde(default, alias = "isRequired")]
    required: bool,
    #[serde(default, alias = "displayOrder")]
    display_order: i32,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CheckboxList {
    Bare(Vec<CheckboxPayload>),
    Wrapped { checkboxes: Vec<CheckboxPayload> },
}

#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct TermsCheckboxes(CheckboxList);

impl TermsCheckboxes {
    pub fn into_checkboxes(self) -> Vec<TermsCheckbox> {
        let list = match self.0 {
            CheckboxList::Bare(list) => list,
            CheckboxList::Wrapped { checkboxes } => checkboxes,
        };
        list.into_iter()
            .map(|c| TermsCheckbox { id: c.id,
                                     text: c.text,
                                     required: c.required,
                                     display_order: c.display_order })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn session_payload_accepts_camel_case() {
        let payload: SessionPayload = serde_json::from_value(json!({
                                                                "sessionId": "s-1",
                                                                "sessionToken": "t-1",
                                                                "stepsRequired": ["selfie", "phone", "selfie"],
                                                                "expiresAt": "2030-01-01T00:00:00Z"
                                                            })).unwrap();
        let session = payload.into_session().unwrap();
        assert_eq!(session.required_steps, vec![StepKind::Selfie, StepKind::Sms]);
        assert_eq!(session.session_id.as_deref(), Some("s-1"));
        assert!(session.expires_at.is_some());
    }

    #[test]
    fn blank_token_is_decode_failure() {
        let payload: SessionPayload = serde_json::from_value(json!({"session_id": "s"})).unwrap();
        assert!(matches!(payload.into_session(), Err(FlowError::DecodeFailure(_))));
    }

    #[test]
    fn checkboxes_may_be_wrapped() {
        let wrapped: TermsCheckboxes =
            serde_json::from_value(json!({"checkboxes": [{"id": "a", "text": "A", "displayOrder": 3}]})).unwrap();
        let bare: TermsCheckboxes = serde_json::from_value(json!([{"id": "a", "text": "A", "display_order": 3}])).unwrap();
        assert_eq!(wrapped.into_checkboxes(), bare.into_checkboxes());
    }
}
