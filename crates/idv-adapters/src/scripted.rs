//! Backend en memoria guionado con respuestas crudas.
//!
//! Cada operación consume la próxima respuesta encolada para su `Endpoint`
//! (o la respuesta por defecto) y la pasa por `normalize_submission` /
//! `decode_payload`, exactamente como lo haría un cliente HTTP real.
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use idv_core::{Endpoint, VerificationBackend};
use idv_domain::{CapturedImage, DeviceIdentity, FlowError, Session, SessionAuth, TermsCheckbox, UserInfo, VerificationSettings};
use idv_policies::{decode_payload, normalize_submission, Submission};
use serde_json::{json, Value};

use crate::wire::{DeviceRegistration, SessionPayload, SettingsPayload, TermsCheckboxes};

#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Http { status: u16, body: String },
    /// Fallo antes de obtener respuesta (timeout, conexión).
    Transport(String),
}

impl Reply {
    pub fn ok(body: Value) -> Self {
        Self::status(200, body)
    }

    pub fn status(status: u16, body: Value) -> Self {
        Reply::Http { status,
                      body: body.to_string() }
    }

    /// Cuerpo literal, posiblemente no-JSON.
    pub fn raw(status: u16, body: &str) -> Self {
        Reply::Http { status,
                      body: body.to_string() }
    }

    pub fn transport(message: &str) -> Self {
        Reply::Transport(message.to_string())
    }
}

#[derive(Default)]
pub struct ScriptedBackend {
    queued: Mutex<HashMap<Endpoint, VecDeque<Reply>>>,
    defaults: Mutex<HashMap<Endpoint, Reply>>,
    calls: Mutex<Vec<Endpoint>>,
}

fn locked<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Respuestas exitosas por defecto para todas las operaciones.
    pub fn happy_path(customer_id: &str, session_id: &str, steps: &[&str]) -> Self {
        let backend = Self::new();
        let success = Reply::ok(json!({"status": "success", "message": "Data created successfully"}));
        for endpoint in [Endpoint::Selfie,
                         Endpoint::Signature,
                         Endpoint::SendEmailCode,
                         Endpoint::SendPhoneCode,
                         Endpoint::VerifyEmailCode,
                         Endpoint::VerifyPhoneCode,
                         Endpoint::Terms,
                         Endpoint::UserInfo]
        {
            backend.set_default(endpoint, success.clone());
        }
        backend.set_default(Endpoint::RegisterDevice,
                            Reply::ok(json!({"status": "success", "data": {"customer_id": customer_id}})));
        backend.set_default(Endpoint::VerificationSettings,
                            Reply::ok(json!({"status": "success", "data": {"required_steps": steps, "settings": {}}})));
        backend.set_default(Endpoint::StartSession,
                            Reply::ok(json!({
                                "status": "success",
                                "data": {
                                    "session_id": session_id,
                                    "session_token": format!("tok-{session_id}"),
                                    "steps_required": steps,
                                    "steps_optional": [],
                                }
                            })));
        backend.set_default(Endpoint::TermsCheckboxes,
                            Reply::ok(json!({
                                "status": "success",
                                "data": [
                                    {"id": "marketing", "text": "Send me product news", "required": false, "display_order": 2},
                                    {"id": "privacy", "text": "I accept the privacy policy", "required": true, "display_order": 1},
                                ]
                            })));
        backend
    }

    pub fn enqueue(&self, endpoint: Endpoint, reply: Reply) -> &Self {
        locked(&self.queued).entry(endpoint).or_default().push_back(reply);
        self
    }

    pub fn set_default(&self, endpoint: Endpoint, reply: Reply) -> &Self {
        locked(&self.defaults).insert(endpoint, reply);
        self
    }

    pub fn calls(&self) -> Vec<Endpoint> {
        locked(&self.calls).clone()
    }

    pub fn call_count(&self, endpoint: Endpoint) -> usize {
        locked(&self.calls).iter().filter(|e| **e == endpoint).count()
    }

    fn reply(&self, endpoint: Endpoint) -> Result<(u16, String), FlowError> {
        locked(&self.calls).push(endpoint);
        let queued = locked(&self.queued).get_mut(&endpoint).and_then(|q| q.pop_front());
        let reply = match queued {
            Some(r) => r,
            None => locked(&self.defaults).get(&endpoint)
                                          .cloned()
                                          .ok_or_else(|| FlowError::TransportFailure(format!("no scripted reply for {}", endpoint.path())))?,
        };
        match reply {
            Reply::Http { status, body } => Ok((status, body)),
            Reply::Transport(message) => Err(FlowError::TransportFailure(message)),
        }
    }

    fn submit(&self, endpoint: Endpoint) -> Result<Submission, FlowError> {
        let (status, body) = self.reply(endpoint)?;
        normalize_submission(status, &body)
    }
}

#[async_trait]
impl VerificationBackend for ScriptedBackend {
    async fn register_device(&self, _device: &DeviceIdentity) -> Result<String, FlowError> {
        let (status, body) = self.reply(Endpoint::RegisterDevice)?;
        let reg: DeviceRegistration = decode_payload(status, &body)?;
        Ok(reg.customer_id)
    }

    async fn fetch_verification_settings(&self) -> Result<VerificationSettings, FlowError> {
        let (status, body) = self.reply(Endpoint::VerificationSettings)?;
        let payload: SettingsPayload = decode_payload(status, &body)?;
        Ok(payload.into())
    }

    async fn start_session(&self, _customer_id: &str) -> Result<Session, FlowError> {
        let (status, body) = self.reply(Endpoint::StartSession)?;
        let payload: SessionPayload = decode_payload(status, &body)?;
        payload.into_session()
    }

    async fn submit_selfie(&self, _auth: &SessionAuth, _image: &CapturedImage) -> Result<Submission, FlowError> {
        self.submit(Endpoint::Selfie)
    }

    async fn submit_signature(&self, _auth: &SessionAuth, _image: &CapturedImage) -> Result<Submission, FlowError> {
        self.submit(Endpoint::Signature)
    }

    async fn send_email_code(&self, _auth: &SessionAuth, _email: &str) -> Result<Submission, FlowError> {
        self.submit(Endpoint::SendEmailCode)
    }

    async fn send_phone_code(&self, _auth: &SessionAuth, _phone_number: &str) -> Result<Submission, FlowError> {
        self.submit(Endpoint::SendPhoneCode)
    }

    async fn verify_email_code(&self, _auth: &SessionAuth, _email: &str, _code: &str) -> Result<Submission, FlowError> {
        self.submit(Endpoint::VerifyEmailCode)
    }

    async fn verify_phone_code(&self, _auth: &SessionAuth, _phone_number: &str, _code: &str) -> Result<Submission, FlowError> {
        self.submit(Endpoint::VerifyPhoneCode)
    }

    async fn submit_terms(&self, _auth: &SessionAuth, _accepted_checkbox_ids: &[String]) -> Result<Submission, FlowError> {
        self.submit(Endpoint::Terms)
    }

    async fn submit_user_info(&self, _auth: &SessionAuth, _info: &UserInfo) -> Result<Submission, FlowError> {
        self.submit(Endpoint::UserInfo)
    }

    async fn fetch_terms_checkboxes(&self) -> Result<Vec<TermsCheckbox>, FlowError> {
        let (status, body) = self.reply(Endpoint::TermsCheckboxes)?;
        let list: TermsCheckboxes = decode_payload(status, &body)?;
        Ok(list.into_checkboxes())
    }
}
