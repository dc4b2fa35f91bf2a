//! Tipos de evento del journal y estructura `FlowEvent`.
//!
//! Rol en el flujo:
//! - Cada transición del `FlowCoordinator` emite un evento a un `EventStore`
//!   append-only, además de la notificación al observer.
//! - Estos eventos permiten reconstruir la posición (`FlowRepository`) sin
//!   depender del estado mutable del coordinador.
use chrono::{DateTime, Utc};
use idv_domain::{FlowError, StepKind};
use idv_policies::ResumeStrategy;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// Cubierto por datos predefinidos del host.
    Predefined,
    /// Signature ya satisfecho por la pantalla combinada terms+signature.
    AlreadySatisfied,
    /// Valor del wire que el cliente no sabe presentar.
    UnknownKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FlowEventKind {
    /// Se creó una sesión nueva en el backend.
    SessionStarted { session_id: Option<String> },
    /// Se reanudó una sesión persistida sin llamar a start-session.
    SessionResumed { session_id: Option<String>, strategy: ResumeStrategy },
    /// Plan fijado para este coordinador. Precede a cualquier evento de step.
    FlowInitialized { plan_hash: String, step_count: usize, start_index: usize },
    StepStarted { step_index: usize, step: StepKind },
    /// `merged`: signature completado por la pantalla combinada.
    StepFinished { step_index: usize, step: StepKind, merged: bool },
    /// Intento fallido; la posición no cambia.
    StepFailed { step_index: usize, step: StepKind, error: FlowError },
    StepSkipped { step_index: usize, step: StepKind, reason: SkipReason },
    FlowCompleted { session_id: Option<String> },
    FlowCancelled { error: Option<FlowError> },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowEvent {
    pub seq: u64, // asignado por el store (orden de append)
    pub flow_id: Uuid,
    pub kind: FlowEventKind,
    pub ts: DateTime<Utc>,
}
