//! Superficie de callbacks hacia la aplicación host.
//!
//! Todos los métodos son obligatorios; `NoopObserver` implementa cada uno
//! como no-op y sirve de base para envolver sólo los que interesan.
//! `RecordingObserver` acumula los eventos (tests, auditoría) y
//! `LoggingObserver` registra cada callback antes de reenviarlo.
use std::sync::{Arc, Mutex, MutexGuard};

use idv_domain::{FlowError, Session, StepKind, TermsCheckbox, UserInfo};
use log::{debug, info, warn};

pub trait FlowObserver: Send + Sync {
    fn on_session_start(&self, session_id: Option<&str>);
    fn on_session_start_detailed(&self, session: &Session);
    fn on_step_start(&self, step: &StepKind, index: usize, total: usize);
    fn on_step_complete(&self, step: &StepKind, index: usize, success: bool, error: Option<&FlowError>);
    fn on_terms_checkboxes_fetched(&self, checkboxes: &[TermsCheckbox]);
    fn on_terms_accepted(&self, accepted_ids: &[String]);
    fn on_signature_submitted(&self);
    fn on_terms_and_signature_submitted(&self);
    fn on_user_info_submitted(&self, info: &UserInfo);
    fn on_verification_complete(&self, session_id: Option<&str>);
    fn on_cancelled(&self, error: Option<&FlowError>);
    fn on_before_api_call(&self, endpoint: &str, method: &str);
    fn on_after_api_call(&self, endpoint: &str, success: bool, status_code: Option<u16>, error: Option<&FlowError>);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl FlowObserver for NoopObserver {
    fn on_session_start(&self, _session_id: Option<&str>) {}
    fn on_session_start_detailed(&self, _session: &Session) {}
    fn on_step_start(&self, _step: &StepKind, _index: usize, _total: usize) {}
    fn on_step_complete(&self, _step: &StepKind, _index: usize, _success: bool, _error: Option<&FlowError>) {}
    fn on_terms_checkboxes_fetched(&self, _checkboxes: &[TermsCheckbox]) {}
    fn on_terms_accepted(&self, _accepted_ids: &[String]) {}
    fn on_signature_submitted(&self) {}
    fn on_terms_and_signature_submitted(&self) {}
    fn on_user_info_submitted(&self, _info: &UserInfo) {}
    fn on_verification_complete(&self, _session_id: Option<&str>) {}
    fn on_cancelled(&self, _error: Option<&FlowError>) {}
    fn on_before_api_call(&self, _endpoint: &str, _method: &str) {}
    fn on_after_api_call(&self, _endpoint: &str, _success: bool, _status_code: Option<u16>, _error: Option<&FlowError>) {}
}

impl<T: FlowObserver + ?Sized> FlowObserver for Arc<T> {
    fn on_session_start(&self, session_id: Option<&str>) {
        (**self).on_session_start(session_id)
    }
    fn on_session_start_detailed(&self, session: &Session) {
        (**self).on_session_start_detailed(session)
    }
    fn on_step_start(&self, step: &StepKind, index: usize, total: usize) {
        (**self).on_step_start(step, index, total)
    }
    fn on_step_complete(&self, step: &StepKind, index: usize, success: bool, error: Option<&FlowError>) {
        (**self).on_step_complete(step, index, success, error)
    }
    fn on_terms_checkboxes_fetched(&self, checkboxes: &[TermsCheckbox]) {
        (**self).on_terms_checkboxes_fetched(checkboxes)
    }
    fn on_terms_accepted(&self, accepted_ids: &[String]) {
        (**self).on_terms_accepted(accepted_ids)
    }
    fn on_signature_submitted(&self) {
        (**self).on_signature_submitted()
    }
    fn on_terms_and_signature_submitted(&self) {
        (**self).on_terms_and_signature_submitted()
    }
    fn on_user_info_submitted(&self, info: &UserInfo) {
        (**self).on_user_info_submitted(info)
    }
    fn on_verification_complete(&self, session_id: Option<&str>) {
        (**self).on_verification_complete(session_id)
    }
    fn on_cancelled(&self, error: Option<&FlowError>) {
        (**self).on_cancelled(error)
    }
    fn on_before_api_call(&self, endpoint: &str, method: &str) {
        (**self).on_before_api_call(endpoint, method)
    }
    fn on_after_api_call(&self, endpoint: &str, success: bool, status_code: Option<u16>, error: Option<&FlowError>) {
        (**self).on_after_api_call(endpoint, success, status_code, error)
    }
}

/// Copia propia de cada callback recibido.
#[derive(Debug, Clone, PartialEq)]
pub enum ObserverEvent {
    SessionStart { session_id: Option<String> },
    SessionStartDetailed(Session),
    StepStart { step: StepKind, index: usize, total: usize },
    StepComplete { step: StepKind, index: usize, success: bool, error: Option<FlowError> },
    TermsCheckboxesFetched(Vec<TermsCheckbox>),
    TermsAccepted(Vec<String>),
    SignatureSubmitted,
    TermsAndSignatureSubmitted,
    UserInfoSubmitted(UserInfo),
    VerificationComplete { session_id: Option<String> },
    Cancelled { error: Option<FlowError> },
    BeforeApiCall { endpoint: String, method: String },
    AfterApiCall { endpoint: String, success: bool, status_code: Option<u16>, error: Option<FlowError> },
}

#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ObserverEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> MutexGuard<'_, Vec<ObserverEvent>> {
        // un panic en otro hilo no invalida lo ya grabado
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn push(&self, ev: ObserverEvent) {
        self.guard().push(ev);
    }

    pub fn events(&self) -> Vec<ObserverEvent> {
        self.guard().clone()
    }

    pub fn clear(&self) {
        self.guard().clear();
    }

    /// Eventos de ciclo de vida, sin los hooks de llamadas a la API.
    pub fn lifecycle(&self) -> Vec<ObserverEvent> {
        self.events()
            .into_iter()
            .filter(|e| !matches!(e, ObserverEvent::BeforeApiCall { .. } | ObserverEvent::AfterApiCall { .. }))
            .collect()
    }

    pub fn step_starts(&self) -> Vec<(StepKind, usize)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ObserverEvent::StepStart { step, index, .. } => Some((step, index)),
                _ => None,
            })
            .collect()
    }

    pub fn step_completions(&self) -> Vec<(StepKind, usize, bool)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ObserverEvent::StepComplete { step, index, success, .. } => Some((step, index, success)),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&ObserverEvent) -> bool) -> usize {
        self.guard().iter().filter(|e| pred(e)).count()
    }
}

impl FlowObserver for RecordingObserver {
    fn on_session_start(&self, session_id: Option<&str>) {
        self.push(ObserverEvent::SessionStart { session_id: session_id.map(str::to_string) });
    }
    fn on_session_start_detailed(&self, session: &Session) {
        self.push(ObserverEvent::SessionStartDetailed(session.clone()));
    }
    fn on_step_start(&self, step: &StepKind, index: usize, total: usize) {
        self.push(ObserverEvent::StepStart { step: step.clone(), index, total });
    }
    fn on_step_complete(&self, step: &StepKind, index: usize, success: bool, error: Option<&FlowError>) {
        self.push(ObserverEvent::StepComplete { step: step.clone(),
                                                index,
                                                success,
                                                error: error.cloned() });
    }
    fn on_terms_checkboxes_fetched(&self, checkboxes: &[TermsCheckbox]) {
        self.push(ObserverEvent::TermsCheckboxesFetched(checkboxes.to_vec()));
    }
    fn on_terms_accepted(&self, accepted_ids: &[String]) {
        self.push(ObserverEvent::TermsAccepted(accepted_ids.to_vec()));
    }
    fn on_signature_submitted(&self) {
        self.push(ObserverEvent::SignatureSubmitted);
    }
    fn on_terms_and_signature_submitted(&self) {
        self.push(ObserverEvent::TermsAndSignatureSubmitted);
    }
    fn on_user_info_submitted(&self, info: &UserInfo) {
        self.push(ObserverEvent::UserInfoSubmitted(info.clone()));
    }
    fn on_verification_complete(&self, session_id: Option<&str>) {
        self.push(ObserverEvent::VerificationComplete { session_id: session_id.map(str::to_string) });
    }
    fn on_cancelled(&self, error: Option<&FlowError>) {
        self.push(ObserverEvent::Cancelled { error: error.cloned() });
    }
    fn on_before_api_call(&self, endpoint: &str, method: &str) {
        self.push(ObserverEvent::BeforeApiCall { endpoint: endpoint.to_string(),
                                                 method: method.to_string() });
    }
    fn on_after_api_call(&self, endpoint: &str, success: bool, status_code: Option<u16>, error: Option<&FlowError>) {
        self.push(ObserverEvent::AfterApiCall { endpoint: endpoint.to_string(),
                                                success,
                                                status_code,
                                                error: error.cloned() });
    }
}

/// Registra cada callback con `log` y lo reenvía al observer interno.
#[derive(Debug, Default)]
pub struct LoggingObserver<O: FlowObserver> {
    inner: O,
}

impl<O: FlowObserver> LoggingObserver<O> {
    pub fn new(inner: O) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &O {
        &self.inner
    }
}

impl<O: FlowObserver> FlowObserver for LoggingObserver<O> {
    fn on_session_start(&self, session_id: Option<&str>) {
        info!("[flow] session started id={session_id:?}");
        self.inner.on_session_start(session_id);
    }
    fn on_session_start_detailed(&self, session: &Session) {
        debug!("[flow] session steps={:?} expires_at={:?}", session.required_steps, session.expires_at);
        self.inner.on_session_start_detailed(session);
    }
    fn on_step_start(&self, step: &StepKind, index: usize, total: usize) {
        info!("[flow] step {step} started ({}/{total})", index + 1);
        self.inner.on_step_start(step, index, total);
    }
    fn on_step_complete(&self, step: &StepKind, index: usize, success: bool, error: Option<&FlowError>) {
        match error {
            Some(e) => warn!("[flow] step {step} at {index} failed: {e}"),
            None => info!("[flow] step {step} at {index} complete success={success}"),
        }
        self.inner.on_step_complete(step, index, success, error);
    }
    fn on_terms_checkboxes_fetched(&self, checkboxes: &[TermsCheckbox]) {
        debug!("[flow] {} terms checkboxes fetched", checkboxes.len());
        self.inner.on_terms_checkboxes_fetched(checkboxes);
    }
    fn on_terms_accepted(&self, accepted_ids: &[String]) {
        debug!("[flow] terms accepted {accepted_ids:?}");
        self.inner.on_terms_accepted(accepted_ids);
    }
    fn on_signature_submitted(&self) {
        debug!("[flow] signature submitted");
        self.inner.on_signature_submitted();
    }
    fn on_terms_and_signature_submitted(&self) {
        debug!("[flow] terms and signature submitted");
        self.inner.on_terms_and_signature_submitted();
    }
    fn on_user_info_submitted(&self, info: &UserInfo) {
        debug!("[flow] user info submitted for {} {}", info.first_name(), info.last_name());
        self.inner.on_user_info_submitted(info);
    }
    fn on_verification_complete(&self, session_id: Option<&str>) {
        info!("[flow] verification complete id={session_id:?}");
        self.inner.on_verification_complete(session_id);
    }
    fn on_cancelled(&self, error: Option<&FlowError>) {
        match error {
            Some(e) => warn!("[flow] cancelled: {e}"),
            None => info!("[flow] cancelled by user"),
        }
        self.inner.on_cancelled(error);
    }
    fn on_before_api_call(&self, endpoint: &str, method: &str) {
        debug!("[api] -> {method} {endpoint}");
        self.inner.on_before_api_call(endpoint, method);
    }
    fn on_after_api_call(&self, endpoint: &str, success: bool, status_code: Option<u16>, error: Option<&FlowError>) {
        debug!("[api] <- {endpoint} success={success} status={status_code:?}");
        self.inner.on_after_api_call(endpoint, success, status_code, error);
    }
}
