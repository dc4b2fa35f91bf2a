//! idv-core: coordinador determinista del flujo de verificación
//!
//! Secuencia los steps requeridos de una sesión, decide qué pantalla mostrar
//! en cada posición, aplica la fusión terms+signature, reanuda sesiones
//! persistidas y notifica cada transición a un `FlowObserver`. Cada
//! transición queda además registrada en un journal append-only que se puede
//! reproducir (`FlowRepository`) para reconstruir la posición.
pub mod backend;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod event;
pub mod hashing;
pub mod observer;
pub mod repo;
pub mod step;
pub mod store;

pub use backend::{Endpoint, ObservedBackend, VerificationBackend};
pub use engine::{CancelHandle, CancelRequest, CoordinatorBuilder, CoordinatorBuilderInit, FlowCoordinator, FlowOptions, FlowPosition, FlowState};
pub use errors::StoreError;
pub use event::{EventStore, FlowEvent, FlowEventKind, InMemoryEventStore, SkipReason};
pub use observer::{FlowObserver, LoggingObserver, NoopObserver, ObserverEvent, RecordingObserver};
pub use repo::{build_flow_plan, FlowInstance, FlowPlan, FlowRepository, InMemoryFlowRepository};
pub use step::{ExecutorFactory, StepContext, StepExecutor, StepOutcome, StepStatus};
pub use store::{InMemorySessionStore, SessionStore, StoreKey};

pub use idv_policies::{ResumeStrategy, Screen};
