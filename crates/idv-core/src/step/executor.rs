use async_trait::async_trait;
use idv_domain::SessionAuth;
use idv_policies::Screen;

use super::StepOutcome;
use crate::backend::VerificationBackend;
use crate::observer::FlowObserver;

/// Lo que un executor necesita durante un intento.
pub struct StepContext<'a> {
    pub auth: &'a SessionAuth,
    pub backend: &'a dyn VerificationBackend,
    pub observer: &'a dyn FlowObserver,
    /// Posición de la pantalla en la lista de steps requeridos.
    pub index: usize,
    pub total: usize,
}

/// Presentación + envío de una pantalla. `execute` corresponde a una acción
/// del usuario (un intento); el coordinador nunca lo reintenta por su cuenta.
#[async_trait]
pub trait StepExecutor: Send + Sync {
    fn screen(&self) -> Screen;

    async fn execute(&self, ctx: &StepContext<'_>) -> StepOutcome;
}

/// Fábrica de executors provista por el host, una instancia por pantalla
/// presentada.
pub trait ExecutorFactory: Send + Sync {
    fn executor_for(&self, screen: Screen) -> Box<dyn StepExecutor>;
}
