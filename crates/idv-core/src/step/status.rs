/// Estado de una posición de la lista en tiempo de ejecución.
///
/// Las transiciones válidas son:
/// - `Pending` -> `Presented` | `Skipped`
/// - `Presented` -> `Finished` | `AwaitingRetry`
/// - `AwaitingRetry` -> `Finished` | `AwaitingRetry`
/// - `Pending` -> `Finished` (signature cubierto por la pantalla combinada)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Pending,
    /// La pantalla está visible esperando la acción del usuario.
    Presented,
    /// El último intento falló; la misma pantalla sigue activa.
    AwaitingRetry,
    Finished,
    /// Avanzado sin presentar pantalla.
    Skipped,
}

impl StepStatus {
    pub fn is_done(&self) -> bool {
        matches!(self, StepStatus::Finished | StepStatus::Skipped)
    }
}
