//! Definiciones relacionadas a steps.
//!
//! Un step se satisface mediante un `StepExecutor`: la unidad de
//! presentación + envío que la aplicación host provee (a través de un
//! `ExecutorFactory`) para cada `Screen`. Este módulo define:
//! - `StepExecutor` / `ExecutorFactory`: interfaz neutral usada por el coordinador.
//! - `StepContext`: credenciales y colaboradores disponibles durante un intento.
//! - `StepOutcome`: resultado de un intento.
//! - `StepStatus`: estado de una posición reconstruido desde el journal.

mod executor;
mod outcome;
mod status;

pub use executor::{ExecutorFactory, StepContext, StepExecutor};
pub use outcome::StepOutcome;
pub use status::StepStatus;
