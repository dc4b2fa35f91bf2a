#![allow(dead_code)]

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use idv_core::{CancelHandle, ExecutorFactory, FlowCoordinator, InMemorySessionStore, RecordingObserver, Screen, SessionStore,
               StepContext, StepExecutor, StepOutcome};
use idv_domain::{CapturedImage, DeviceIdentity, FlowError, Session, SessionAuth, SessionProgress, StepKind, TermsCheckbox,
                 UserInfo, VerificationSettings};
use idv_policies::Submission;

/// Backend falso: sólo start-session tiene comportamiento configurable.
pub struct FakeBackend {
    session: Mutex<Result<Session, FlowError>>,
    pub start_calls: AtomicUsize,
}

impl FakeBackend {
    pub fn with_steps(session_id: Option<&str>, steps: &[&str]) -> Arc<Self> {
        let session = Session::new(session_id.map(str::to_string),
                                   "tok-1",
                                   StepKind::parse_list(steps),
                                   BTreeSet::new(),
                                   None).expect("valid session");
        Arc::new(Self { session: Mutex::new(Ok(session)),
                        start_calls: AtomicUsize::new(0) })
    }

    pub fn failing(err: FlowError) -> Arc<Self> {
        Arc::new(Self { session: Mutex::new(Err(err)),
                        start_calls: AtomicUsize::new(0) })
    }

    pub fn starts(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl idv_core::VerificationBackend for FakeBackend {
    async fn register_device(&self, _device: &DeviceIdentity) -> Result<String, FlowError> {
        Ok("cust-1".into())
    }
    async fn fetch_verification_settings(&self) -> Result<VerificationSettings, FlowError> {
        Ok(VerificationSettings::default())
    }
    async fn start_session(&self, _customer_id: &str) -> Result<Session, FlowError> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        self.session.lock().unwrap().clone()
    }
    async fn submit_selfie(&self, _auth: &SessionAuth, _image: &CapturedImage) -> Result<Submission, FlowError> {
        Ok(Submission::accepted())
    }
    async fn submit_signature(&self, _auth: &SessionAuth, _image: &CapturedImage) -> Result<Submission, FlowError> {
        Ok(Submission::accepted())
    }
    async fn send_email_code(&self, _auth: &SessionAuth, _email: &str) -> Result<Submission, FlowError> {
        Ok(Submission::accepted())
    }
    async fn send_phone_code(&self, _auth: &SessionAuth, _phone: &str) -> Result<Submission, FlowError> {
        Ok(Submission::accepted())
    }
    async fn verify_email_code(&self, _auth: &SessionAuth, _email: &str, _code: &str) -> Result<Submission, FlowError> {
        Ok(Submission::accepted())
    }
    async fn verify_phone_code(&self, _auth: &SessionAuth, _phone: &str, _code: &str) -> Result<Submission, FlowError> {
        Ok(Submission::accepted())
    }
    async fn submit_terms(&self, _auth: &SessionAuth, _ids: &[String]) -> Result<Submission, FlowError> {
        Ok(Submission::accepted())
    }
    async fn submit_user_info(&self, _auth: &SessionAuth, _info: &UserInfo) -> Result<Submission, FlowError> {
        Ok(Submission::accepted())
    }
    async fn fetch_terms_checkboxes(&self) -> Result<Vec<TermsCheckbox>, FlowError> {
        Ok(Vec::new())
    }
}

/// Resultado programado para un intento.
#[derive(Clone)]
pub enum Scripted {
    Ok,
    OkWithProgress(SessionProgress),
    Fail(FlowError),
    /// Cancela a través del handle mientras el intento está en vuelo y
    /// luego reporta éxito.
    CancelThenOk,
}

#[derive(Default)]
struct Shared {
    scripts: HashMap<Screen, VecDeque<Scripted>>,
    presented: Vec<Screen>,
    executions: Vec<(Screen, usize)>,
    cancel: Option<CancelHandle>,
}

/// Fábrica de executors guionada; por defecto todo intento tiene éxito.
#[derive(Clone, Default)]
pub struct ScriptedFactory {
    shared: Arc<Mutex<Shared>>,
}

impl ScriptedFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn script(&self, screen: Screen, results: Vec<Scripted>) {
        self.shared.lock().unwrap().scripts.entry(screen).or_default().extend(results);
    }

    pub fn arm_cancel(&self, handle: CancelHandle) {
        self.shared.lock().unwrap().cancel = Some(handle);
    }

    pub fn presented(&self) -> Vec<Screen> {
        self.shared.lock().unwrap().presented.clone()
    }

    pub fn executions(&self) -> Vec<(Screen, usize)> {
        self.shared.lock().unwrap().executions.clone()
    }
}

impl ExecutorFactory for ScriptedFactory {
    fn executor_for(&self, screen: Screen) -> Box<dyn StepExecutor> {
        self.shared.lock().unwrap().presented.push(screen);
        Box::new(ScriptedExecutor { screen,
                                    shared: Arc::clone(&self.shared) })
    }
}

struct ScriptedExecutor {
    screen: Screen,
    shared: Arc<Mutex<Shared>>,
}

#[async_trait]
impl StepExecutor for ScriptedExecutor {
    fn screen(&self) -> Screen {
        self.screen
    }

    async fn execute(&self, ctx: &StepContext<'_>) -> StepOutcome {
        let step = self.screen.primary_step();
        let next = {
            let mut shared = self.shared.lock().unwrap();
            shared.executions.push((self.screen, ctx.index));
            shared.scripts.get_mut(&self.screen).and_then(|q| q.pop_front())
        };
        match next.unwrap_or(Scripted::Ok) {
            Scripted::Ok => StepOutcome::succeeded(step, None),
            Scripted::OkWithProgress(p) => StepOutcome::succeeded(step, Some(p)),
            Scripted::Fail(e) => StepOutcome::failed(step, e),
            Scripted::CancelThenOk => {
                if let Some(handle) = self.shared.lock().unwrap().cancel.clone() {
                    handle.cancel(None);
                }
                StepOutcome::succeeded(step, None)
            }
        }
    }
}

pub fn store_with_customer() -> Arc<InMemorySessionStore> {
    Arc::new(InMemorySessionStore::with_customer("cust-1"))
}

pub struct Harness {
    pub coordinator: FlowCoordinator,
    pub backend: Arc<FakeBackend>,
    pub store: Arc<InMemorySessionStore>,
    pub factory: Arc<ScriptedFactory>,
    pub observer: Arc<RecordingObserver>,
}

pub fn harness(backend: Arc<FakeBackend>, store: Arc<InMemorySessionStore>) -> Harness {
    harness_with(backend, store, |b| b)
}

pub fn harness_with(backend: Arc<FakeBackend>,
                    store: Arc<InMemorySessionStore>,
                    configure: impl FnOnce(idv_core::CoordinatorBuilder<idv_core::InMemoryEventStore, idv_core::InMemoryFlowRepository>)
                                           -> idv_core::CoordinatorBuilder<idv_core::InMemoryEventStore, idv_core::InMemoryFlowRepository>)
                    -> Harness {
    let factory = ScriptedFactory::new();
    let observer = Arc::new(RecordingObserver::new());
    let builder = FlowCoordinator::builder(backend.clone(), store.clone() as Arc<dyn SessionStore>).executors(factory.clone())
                                                                                                   .observer(observer.clone());
    let coordinator = configure(builder).build();
    Harness { coordinator,
              backend,
              store,
              factory,
              observer }
}
