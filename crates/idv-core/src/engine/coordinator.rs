//! Máquina de estados del flujo de verificación.
//!
//! `NotStarted -> Starting -> Presenting(i) -> ... -> Completed`, con
//! `Cancelled` alcanzable desde cualquier estado no terminal. Los fallos de
//! step dejan la misma pantalla activa (sin reintento automático); los
//! fallos al iniciar la sesión cancelan el flujo. Ninguna operación pública
//! propaga errores: todo llega al observer o se refleja en el `bool`
//! devuelto y en `last_error`.
use std::sync::Arc;

use idv_domain::{FlowError, SessionAuth, StepKind};
use idv_policies::{resolve_step, resume_index, skippable_steps, Resolution, Screen, SkipSet};
use log::{debug, error, info, warn};
use tokio::sync::watch;
use uuid::Uuid;

use super::builder::CoordinatorBuilderInit;
use super::cancel::{CancelHandle, CancelRequest};
use super::{FlowOptions, FlowPosition, FlowState};
use crate::backend::{ObservedBackend, VerificationBackend};
use crate::event::{EventStore, FlowEvent, FlowEventKind, InMemoryEventStore, SkipReason};
use crate::observer::FlowObserver;
use crate::repo::{build_flow_plan, FlowInstance, FlowPlan, FlowRepository, InMemoryFlowRepository};
use crate::step::{ExecutorFactory, StepContext, StepExecutor};
use crate::store::{SessionStore, StoreKey};

const SESSION_START_FAILED: &str = "Unable to start verification session";

pub struct FlowCoordinator<E: EventStore = InMemoryEventStore, R: FlowRepository = InMemoryFlowRepository> {
    backend: ObservedBackend,
    store: Arc<dyn SessionStore>,
    executors: Arc<dyn ExecutorFactory>,
    observer: Arc<dyn FlowObserver>,
    options: FlowOptions,
    event_store: E,
    repository: R,
    flow_id: Uuid,
    state: FlowState,
    plan: FlowPlan,
    position: FlowPosition,
    skips: SkipSet,
    session_id: Option<String>,
    auth: Option<SessionAuth>,
    // A lo sumo un executor activo.
    active: Option<Box<dyn StepExecutor>>,
    last_error: Option<FlowError>,
    last_user_message: Option<String>,
    cancel_handle: CancelHandle,
    cancel_rx: watch::Receiver<Option<CancelRequest>>,
}

impl FlowCoordinator {
    /// Punto de entrada del builder: backend y store son obligatorios.
    pub fn builder(backend: Arc<dyn VerificationBackend>, store: Arc<dyn SessionStore>) -> CoordinatorBuilderInit {
        CoordinatorBuilderInit { backend, store }
    }
}

impl<E: EventStore, R: FlowRepository> FlowCoordinator<E, R> {
    pub(crate) fn from_parts(backend: ObservedBackend,
                             store: Arc<dyn SessionStore>,
                             executors: Arc<dyn ExecutorFactory>,
                             observer: Arc<dyn FlowObserver>,
                             options: FlowOptions,
                             event_store: E,
                             repository: R)
                             -> Self {
        let (cancel_handle, cancel_rx) = CancelHandle::channel();
        Self { backend,
               store,
               executors,
               observer,
               options,
               event_store,
               repository,
               flow_id: Uuid::new_v4(),
               state: FlowState::NotStarted,
               plan: build_flow_plan(&[]),
               position: FlowPosition::new(0),
               skips: SkipSet::new(),
               session_id: None,
               auth: None,
               active: None,
               last_error: None,
               last_user_message: None,
               cancel_handle,
               cancel_rx }
    }

    /// Inicia o reanuda la sesión y presenta el primer step.
    ///
    /// Con un token (argumento o persistido) y steps guardados, reanuda sin
    /// llamar a start-session. Si no, pide una sesión nueva con el customer
    /// id persistido. Devuelve `true` si el flujo quedó presentando o
    /// completado; sólo se acepta desde `NotStarted`.
    pub async fn start(&mut self, existing_token: Option<&str>) -> bool {
        if self.apply_pending_cancel() {
            return false;
        }
        if self.state != FlowState::NotStarted {
            warn!("start ignored: coordinator is {}", self.state);
            return false;
        }
        self.state = FlowState::Starting;
        match self.try_resume(existing_token) {
            Ok(Some((steps, start_index))) => {
                self.begin_presenting(steps, start_index);
                true
            }
            Ok(None) => self.start_new_session().await,
            Err(e) => {
                self.fail_start(e);
                false
            }
        }
    }

    fn try_resume(&mut self, existing_token: Option<&str>) -> Result<Option<(Vec<StepKind>, usize)>, FlowError> {
        let supplied = existing_token.map(str::trim).filter(|t| !t.is_empty());
        let token = match supplied {
            Some(t) => Some(t.to_string()),
            None => self.store.session_token()?,
        };
        let Some(token) = token else {
            return Ok(None);
        };
        let Some(steps) = self.store.required_steps()? else {
            warn!("session token present but no stored steps; requesting a new session");
            return Ok(None);
        };
        let customer_id = self.store
                              .customer_id()?
                              .ok_or_else(|| FlowError::MissingCredential("customer id not configured".to_string()))?;
        if supplied.is_some() {
            self.store.set(StoreKey::SessionToken, &token)?;
        }
        let progress = match self.store.session_progress() {
            Ok(p) => p,
            Err(e) => {
                warn!("ignoring unreadable session progress: {e}");
                None
            }
        };
        let strategy = self.options.resume_strategy;
        let start_index = resume_index(strategy, &steps, progress.as_ref());
        self.session_id = self.store.session_id()?;
        self.auth = Some(SessionAuth { customer_id,
                                       session_token: token });
        info!("resuming session {:?} at step {start_index}/{} ({strategy})", self.session_id, steps.len());
        self.journal(FlowEventKind::SessionResumed { session_id: self.session_id.clone(),
                                                     strategy });
        self.observer.on_session_start(self.session_id.as_deref());
        Ok(Some((steps, start_index)))
    }

    async fn start_new_session(&mut self) -> bool {
        let customer_id = match self.store.customer_id() {
            Ok(Some(id)) => id,
            Ok(None) => {
                self.fail_start(FlowError::MissingCredential("customer id not configured".to_string()));
                return false;
            }
            Err(e) => {
                self.fail_start(e.into());
                return false;
            }
        };
        let result = self.backend.start_session(&customer_id).await;
        if self.apply_pending_cancel() {
            warn!("session start result dropped: flow cancelled while in flight");
            return false;
        }
        let session = match result {
            Ok(s) => s,
            Err(e) => {
                self.fail_start(e);
                return false;
            }
        };
        if let Err(e) = self.store.save_session(&session) {
            self.fail_start(e.into());
            return false;
        }
        self.session_id = session.session_id.clone();
        self.auth = Some(SessionAuth { customer_id,
                                       session_token: session.session_token.clone() });
        info!("session {:?} started with {} steps", self.session_id, session.step_count());
        self.journal(FlowEventKind::SessionStarted { session_id: self.session_id.clone() });
        self.observer.on_session_start(self.session_id.as_deref());
        self.observer.on_session_start_detailed(&session);
        self.begin_presenting(session.required_steps, 0);
        true
    }

    fn fail_start(&mut self, err: FlowError) {
        error!("session start failed: {err}");
        self.last_user_message = Some(err.server_message().unwrap_or(SESSION_START_FAILED).to_string());
        self.last_error = Some(err.clone());
        self.finish_cancel(Some(err));
    }

    fn begin_presenting(&mut self, steps: Vec<StepKind>, start_index: usize) {
        self.plan = build_flow_plan(&steps);
        self.skips = skippable_steps(&self.options.predefined);
        self.position = FlowPosition::at(steps.len(), start_index);
        self.journal(FlowEventKind::FlowInitialized { plan_hash: self.plan.plan_hash.clone(),
                                                      step_count: self.plan.len(),
                                                      start_index: self.position.current_step_index() });
        self.present_current();
    }

    /// Resuelve la posición actual: presenta una pantalla, avanza sobre las
    /// posiciones que no se presentan, o completa el flujo.
    fn present_current(&mut self) {
        loop {
            let index = self.position.current_step_index();
            match resolve_step(&self.plan.steps, index, &self.skips) {
                Resolution::Completed => {
                    self.complete();
                    return;
                }
                Resolution::Present(screen) => {
                    self.present(screen, index);
                    return;
                }
                Resolution::AlreadySatisfied => {
                    debug!("signature at {index} already covered by terms");
                    self.journal(FlowEventKind::StepSkipped { step_index: index,
                                                              step: StepKind::Signature,
                                                              reason: SkipReason::AlreadySatisfied });
                }
                Resolution::Predefined => {
                    let step = self.plan.steps[index].clone();
                    debug!("{step} at {index} satisfied by predefined user info");
                    self.journal(FlowEventKind::StepSkipped { step_index: index,
                                                              step: step.clone(),
                                                              reason: SkipReason::Predefined });
                    self.observer.on_step_complete(&step, index, true, None);
                }
                Resolution::UnknownKind(raw) => {
                    warn!("skipping unknown step kind {raw:?} at {index}");
                    self.journal(FlowEventKind::StepSkipped { step_index: index,
                                                              step: StepKind::Unknown(raw),
                                                              reason: SkipReason::UnknownKind });
                }
            }
            self.position.advance(1);
        }
    }

    fn present(&mut self, screen: Screen, index: usize) {
        let step = screen.primary_step();
        debug!("presenting {screen:?} at {index}/{}", self.position.total());
        self.journal(FlowEventKind::StepStarted { step_index: index,
                                                  step: step.clone() });
        self.observer.on_step_start(&step, index, self.position.total());
        self.active = Some(self.executors.executor_for(screen));
        self.state = FlowState::Presenting(index);
    }

    /// Ejecuta un intento (una acción del usuario) sobre la pantalla activa.
    ///
    /// Devuelve `true` si el step se completó. Un fallo deja la pantalla
    /// activa para que el usuario reintente.
    pub async fn attempt(&mut self) -> bool {
        if self.apply_pending_cancel() {
            return false;
        }
        let FlowState::Presenting(index) = self.state else {
            warn!("attempt ignored: coordinator is {}", self.state);
            return false;
        };
        let (Some(executor), Some(auth)) = (self.active.as_deref(), self.auth.as_ref()) else {
            return false;
        };
        let screen = executor.screen();
        let ctx = StepContext { auth,
                                backend: &self.backend,
                                observer: self.observer.as_ref(),
                                index,
                                total: self.position.total() };
        let outcome = executor.execute(&ctx).await;
        if self.apply_pending_cancel() {
            warn!("{screen:?} result dropped: flow cancelled while in flight");
            return false;
        }
        if let Some(progress) = outcome.server_session() {
            if let Err(e) = self.store.set_session_progress(progress) {
                error!("could not persist session progress: {e}");
            }
        }
        match outcome.error().cloned() {
            None => {
                self.step_succeeded(screen, index);
                true
            }
            Some(err) => {
                self.step_failed(screen, index, err);
                false
            }
        }
    }

    fn step_succeeded(&mut self, screen: Screen, index: usize) {
        let step = screen.primary_step();
        self.active = None;
        self.last_error = None;
        self.last_user_message = None;
        self.observer.on_step_complete(&step, index, true, None);
        self.journal(FlowEventKind::StepFinished { step_index: index,
                                                   step,
                                                   merged: false });
        // Posiciones extra consumidas por una pantalla combinada.
        for _ in 1..screen.span() {
            let signature_index = self.position.advance(1);
            self.observer.on_step_complete(&StepKind::Signature, signature_index, true, None);
            self.journal(FlowEventKind::StepFinished { step_index: signature_index,
                                                       step: StepKind::Signature,
                                                       merged: true });
        }
        self.position.advance(1);
        self.present_current();
    }

    fn step_failed(&mut self, screen: Screen, index: usize, err: FlowError) {
        let step = screen.primary_step();
        info!("{step} at {index} failed: {err}");
        self.observer.on_step_complete(&step, index, false, Some(&err));
        self.journal(FlowEventKind::StepFailed { step_index: index,
                                                 step: step.clone(),
                                                 error: err.clone() });
        self.last_user_message = Some(err.user_message(&step));
        self.last_error = Some(err.clone());
        if err.is_fatal() {
            error!("fatal error while presenting {step}: {err}");
            self.finish_cancel(Some(err));
        }
    }

    fn complete(&mut self) {
        self.position.finish();
        self.active = None;
        self.state = FlowState::Completed;
        info!("verification complete for session {:?}", self.session_id);
        self.journal(FlowEventKind::FlowCompleted { session_id: self.session_id.clone() });
        self.observer.on_verification_complete(self.session_id.as_deref());
    }

    /// Cancelación explícita. Devuelve `false` si el flujo ya era terminal.
    pub fn cancel(&mut self, error: Option<FlowError>) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        info!("flow cancelled from {}", self.state);
        self.finish_cancel(error);
        true
    }

    /// Aplica una cancelación solicitada a través del `CancelHandle`.
    /// Devuelve `true` si el flujo está cancelado.
    pub fn apply_pending_cancel(&mut self) -> bool {
        if self.state.is_terminal() {
            return self.state == FlowState::Cancelled;
        }
        let request = self.cancel_rx.borrow_and_update().clone();
        match request {
            Some(req) => {
                info!("applying pending cancellation in {}", self.state);
                self.finish_cancel(req.error);
                true
            }
            None => false,
        }
    }

    fn finish_cancel(&mut self, error: Option<FlowError>) {
        self.cancel_handle.cancel(error.clone());
        self.active = None;
        self.state = FlowState::Cancelled;
        self.journal(FlowEventKind::FlowCancelled { error: error.clone() });
        self.observer.on_cancelled(error.as_ref());
    }

    /// Repite intentos hasta que el flujo termina o acumula
    /// `max_failed_attempts` fallos.
    pub async fn run_until_settled(&mut self, max_failed_attempts: usize) -> FlowState {
        let limit = max_failed_attempts.max(1);
        let mut failures = 0usize;
        while let FlowState::Presenting(_) = self.state {
            if !self.attempt().await {
                failures += 1;
                if failures >= limit {
                    break;
                }
            }
        }
        self.state
    }

    fn journal(&mut self, kind: FlowEventKind) {
        self.event_store.append_kind(self.flow_id, kind);
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn current_step_index(&self) -> usize {
        self.position.current_step_index()
    }

    pub fn position(&self) -> FlowPosition {
        self.position
    }

    pub fn required_steps(&self) -> &[StepKind] {
        &self.plan.steps
    }

    pub fn plan(&self) -> &FlowPlan {
        &self.plan
    }

    pub fn current_screen(&self) -> Option<Screen> {
        self.active.as_ref().map(|e| e.screen())
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn last_error(&self) -> Option<&FlowError> {
        self.last_error.as_ref()
    }

    /// Mensaje para mostrar al usuario tras el último fallo.
    pub fn last_user_message(&self) -> Option<&str> {
        self.last_user_message.as_deref()
    }

    pub fn flow_id(&self) -> Uuid {
        self.flow_id
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel_handle.clone()
    }

    pub fn options(&self) -> &FlowOptions {
        &self.options
    }

    pub fn events(&self) -> Vec<FlowEvent> {
        self.event_store.list(self.flow_id)
    }

    /// Secuencia compacta de eventos del journal (útil en tests).
    pub fn event_variants(&self) -> Vec<&'static str> {
        self.events()
            .iter()
            .map(|e| match e.kind {
                FlowEventKind::SessionStarted { .. } => "N",
                FlowEventKind::SessionResumed { .. } => "R",
                FlowEventKind::FlowInitialized { .. } => "I",
                FlowEventKind::StepStarted { .. } => "S",
                FlowEventKind::StepFinished { .. } => "F",
                FlowEventKind::StepFailed { .. } => "X",
                FlowEventKind::StepSkipped { .. } => "K",
                FlowEventKind::FlowCompleted { .. } => "C",
                FlowEventKind::FlowCancelled { .. } => "Z",
            })
            .collect()
    }

    /// Reconstruye la instancia a partir del journal.
    pub fn instance(&self) -> FlowInstance {
        self.repository.load(self.flow_id, &self.events(), &self.plan)
    }
}
