//! Builder para `FlowCoordinator`.
//!
//! Dos estados en tiempo de compilación:
//! - `CoordinatorBuilderInit`: backend + store ya fijados; falta la fábrica
//!   de executors, sin la cual no hay forma de presentar pantallas.
//! - `CoordinatorBuilder<E, R>`: todo lo obligatorio está presente; el resto
//!   (observer, opciones, journal) tiene valores por defecto.
//!
//! ```ignore
//! let mut coordinator = FlowCoordinator::builder(backend, store)
//!     .executors(factory)
//!     .observer(observer)
//!     .build();
//! ```
use std::sync::Arc;

use idv_domain::PredefinedUserInfo;
use idv_policies::ResumeStrategy;

use super::{FlowCoordinator, FlowOptions};
use crate::backend::{ObservedBackend, VerificationBackend};
use crate::event::{EventStore, InMemoryEventStore};
use crate::observer::{FlowObserver, NoopObserver};
use crate::repo::{FlowRepository, InMemoryFlowRepository};
use crate::step::ExecutorFactory;
use crate::store::SessionStore;

pub struct CoordinatorBuilderInit {
    pub(crate) backend: Arc<dyn VerificationBackend>,
    pub(crate) store: Arc<dyn SessionStore>,
}

impl CoordinatorBuilderInit {
    /// Fija la fábrica de executors y transiciona al builder completo.
    pub fn executors(self, factory: Arc<dyn ExecutorFactory>) -> CoordinatorBuilder<InMemoryEventStore, InMemoryFlowRepository> {
        CoordinatorBuilder { backend: self.backend,
                             store: self.store,
                             executors: factory,
                             observer: Arc::new(NoopObserver),
                             options: FlowOptions::default(),
                             event_store: InMemoryEventStore::default(),
                             repository: InMemoryFlowRepository::new() }
    }
}

pub struct CoordinatorBuilder<E: EventStore, R: FlowRepository> {
    backend: Arc<dyn VerificationBackend>,
    store: Arc<dyn SessionStore>,
    executors: Arc<dyn ExecutorFactory>,
    observer: Arc<dyn FlowObserver>,
    options: FlowOptions,
    event_store: E,
    repository: R,
}

impl<E: EventStore, R: FlowRepository> CoordinatorBuilder<E, R> {
    pub fn observer(mut self, observer: Arc<dyn FlowObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn options(mut self, options: FlowOptions) -> Self {
        self.options = options;
        self
    }

    pub fn resume_strategy(mut self, strategy: ResumeStrategy) -> Self {
        self.options.resume_strategy = strategy;
        self
    }

    pub fn predefined(mut self, predefined: PredefinedUserInfo) -> Self {
        self.options.predefined = predefined;
        self
    }

    /// Reemplaza el journal y el repositorio de replay.
    pub fn stores<E2: EventStore, R2: FlowRepository>(self, event_store: E2, repository: R2) -> CoordinatorBuilder<E2, R2> {
        CoordinatorBuilder { backend: self.backend,
                             store: self.store,
                             executors: self.executors,
                             observer: self.observer,
                             options: self.options,
                             event_store,
                             repository }
    }

    /// Construye el coordinador. Todas las llamadas al backend pasan por un
    /// `ObservedBackend` que emite los hooks before/after API call.
    pub fn build(self) -> FlowCoordinator<E, R> {
        let backend = ObservedBackend::new(self.backend, Arc::clone(&self.observer));
        FlowCoordinator::from_parts(backend,
                                    self.store,
                                    self.executors,
                                    self.observer,
                                    self.options,
                                    self.event_store,
                                    self.repository)
    }
}
