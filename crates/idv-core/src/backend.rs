//! Contrato del colaborador de red.
//!
//! Una operación async por operación de dominio. Las implementaciones son
//! responsables de normalizar transporte/códigos/mensajes (ver
//! `idv_policies::outcome`) y devolver sólo `Submission` o `FlowError`.
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use idv_domain::{CapturedImage, DeviceIdentity, FlowError, Session, SessionAuth, TermsCheckbox, UserInfo, VerificationSettings};
use idv_policies::Submission;

use crate::observer::FlowObserver;

#[async_trait]
pub trait VerificationBackend: Send + Sync {
    /// Registra el dispositivo y devuelve el customer id asignado.
    async fn register_device(&self, device: &DeviceIdentity) -> Result<String, FlowError>;
    async fn fetch_verification_settings(&self) -> Result<VerificationSettings, FlowError>;
    async fn start_session(&self, customer_id: &str) -> Result<Session, FlowError>;
    async fn submit_selfie(&self, auth: &SessionAuth, image: &CapturedImage) -> Result<Submission, FlowError>;
    async fn submit_signature(&self, auth: &SessionAuth, image: &CapturedImage) -> Result<Submission, FlowError>;
    async fn send_email_code(&self, auth: &SessionAuth, email: &str) -> Result<Submission, FlowError>;
    async fn send_phone_code(&self, auth: &SessionAuth, phone_number: &str) -> Result<Submission, FlowError>;
    async fn verify_email_code(&self, auth: &SessionAuth, email: &str, code: &str) -> Result<Submission, FlowError>;
    async fn verify_phone_code(&self, auth: &SessionAuth, phone_number: &str, code: &str) -> Result<Submission, FlowError>;
    async fn submit_terms(&self, auth: &SessionAuth, accepted_checkbox_ids: &[String]) -> Result<Submission, FlowError>;
    async fn submit_user_info(&self, auth: &SessionAuth, info: &UserInfo) -> Result<Submission, FlowError>;
    async fn fetch_terms_checkboxes(&self) -> Result<Vec<TermsCheckbox>, FlowError>;
}

/// Operaciones conceptuales del backend, con el nombre y método que se
/// reportan en los hooks `on_before_api_call` / `on_after_api_call`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    RegisterDevice,
    VerificationSettings,
    StartSession,
    Selfie,
    Signature,
    SendEmailCode,
    SendPhoneCode,
    VerifyEmailCode,
    VerifyPhoneCode,
    Terms,
    UserInfo,
    TermsCheckboxes,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::RegisterDevice => "device/register",
            Endpoint::VerificationSettings => "verification/settings",
            Endpoint::StartSession => "session/start",
            Endpoint::Selfie => "verification/selfie",
            Endpoint::Signature => "verification/signature",
            Endpoint::SendEmailCode => "verification/email/send-code",
            Endpoint::SendPhoneCode => "verification/phone/send-code",
            Endpoint::VerifyEmailCode => "verification/email/verify",
            Endpoint::VerifyPhoneCode => "verification/phone/verify",
            Endpoint::Terms => "verification/terms",
            Endpoint::UserInfo => "verification/user-info",
            Endpoint::TermsCheckboxes => "terms/checkboxes",
        }
    }

    pub fn method(&self) -> &'static str {
        match self {
            Endpoint::VerificationSettings | Endpoint::TermsCheckboxes => "GET",
            _ => "POST",
        }
    }
}

/// Envuelve un backend y reporta cada llamada al observer.
pub struct ObservedBackend {
    inner: Arc<dyn VerificationBackend>,
    observer: Arc<dyn FlowObserver>,
}

impl ObservedBackend {
    pub fn new(inner: Arc<dyn VerificationBackend>, observer: Arc<dyn FlowObserver>) -> Self {
        Self { inner, observer }
    }

    async fn observe<T, F>(&self, endpoint: Endpoint, call: F) -> Result<T, FlowError>
        where T: Send,
              F: Future<Output = Result<T, FlowError>> + Send
    {
        self.observer.on_before_api_call(endpoint.path(), endpoint.method());
        let result = call.await;
        match &result {
            Ok(_) => self.observer.on_after_api_call(endpoint.path(), true, None, None),
            Err(e) => self.observer.on_after_api_call(endpoint.path(), false, e.status_code(), Some(e)),
        }
        result
    }
}

#[async_trait]
impl VerificationBackend for ObservedBackend {
    async fn register_device(&self, device: &DeviceIdentity) -> Result<String, FlowError> {
        self.observe(Endpoint::RegisterDevice, self.inner.register_device(device)).await
    }

    async fn fetch_verification_settings(&self) -> Result<VerificationSettings, FlowError> {
        self.observe(Endpoint::VerificationSettings, self.inner.fetch_verification_settings()).await
    }

    async fn start_session(&self, customer_id: &str) -> Result<Session, FlowError> {
        self.observe(Endpoint::StartSession, self.inner.start_session(customer_id)).await
    }

    async fn submit_selfie(&self, auth: &SessionAuth, image: &CapturedImage) -> Result<Submission, FlowError> {
        self.observe(Endpoint::Selfie, self.inner.submit_selfie(auth, image)).await
    }

    async fn submit_signature(&self, auth: &SessionAuth, image: &CapturedImage) -> Result<Submission, FlowError> {
        self.observe(Endpoint::Signature, self.inner.submit_signature(auth, image)).await
    }

    async fn send_email_code(&self, auth: &SessionAuth, email: &str) -> Result<Submission, FlowError> {
        self.observe(Endpoint::SendEmailCode, self.inner.send_email_code(auth, email)).await
    }

    async fn send_phone_code(&self, auth: &SessionAuth, phone_number: &str) -> Result<Submission, FlowError> {
        self.observe(Endpoint::SendPhoneCode, self.inner.send_phone_code(auth, phone_number)).await
    }

    async fn verify_email_code(&self, auth: &SessionAuth, email: &str, code: &str) -> Result<Submission, FlowError> {
        self.observe(Endpoint::VerifyEmailCode, self.inner.verify_email_code(auth, email, code)).await
    }

    async fn verify_phone_code(&self, auth: &SessionAuth, phone_number: &str, code: &str) -> Result<Submission, FlowError> {
        self.observe(Endpoint::VerifyPhoneCode, self.inner.verify_phone_code(auth, phone_number, code)).await
    }

    async fn submit_terms(&self, auth: &SessionAuth, accepted_checkbox_ids: &[String]) -> Result<Submission, FlowError> {
        self.observe(Endpoint::Terms, self.inner.submit_terms(auth, accepted_checkbox_ids)).await
    }

    async fn submit_user_info(&self, auth: &SessionAuth, info: &UserInfo) -> Result<Submission, FlowError> {
        self.observe(Endpoint::UserInfo, self.inner.submit_user_info(auth, info)).await
    }

    async fn fetch_terms_checkboxes(&self) -> Result<Vec<TermsCheckbox>, FlowError> {
        self.observe(Endpoint::TermsCheckboxes, self.inner.fetch_terms_checkboxes()).await
    }
}
