//! Coordinador del flujo de verificación
//!
//! Provee el coordinador, su builder tipado, el cursor de posición y el
//! handle de cancelación cooperativa.

pub mod builder;
pub mod cancel;
pub mod coordinator;
pub mod position;
pub mod state;

pub use builder::{CoordinatorBuilder, CoordinatorBuilderInit};
pub use cancel::{CancelHandle, CancelRequest};
pub use coordinator::FlowCoordinator;
pub use position::FlowPosition;
pub use state::FlowState;

use idv_domain::PredefinedUserInfo;
use idv_policies::ResumeStrategy;

/// Opciones explícitas por coordinador (no hay configuración global).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowOptions {
    pub resume_strategy: ResumeStrategy,
    /// Se evalúa una única vez, antes de presentar el primer step.
    pub predefined: PredefinedUserInfo,
}

impl FlowOptions {
    pub fn with_resume_strategy(mut self, strategy: ResumeStrategy) -> Self {
        self.resume_strategy = strategy;
        self
    }

    pub fn with_predefined(mut self, predefined: PredefinedUserInfo) -> Self {
        self.predefined = predefined;
        self
    }
}
