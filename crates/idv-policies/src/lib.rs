//! idv-policies – políticas puras del flujo de verificación
//!
//! Provee funciones deterministas, sin I/O, que el coordinador y el backend
//! consumen:
//! - `outcome`: clasificación de respuestas del servidor (shim de
//!   compatibilidad para una API upstream inconsistente).
//! - `presentation`: regla de resolución de steps y fusión terms+signature.
//! - `skip`: steps cubiertos por datos predefinidos del host.
//! - `resume`: desde qué posición re-entrar a una sesión existente.

pub mod outcome;
pub mod presentation;
pub mod resume;
pub mod skip;

pub use outcome::{classify_outcome, decode_payload, normalize_submission, salvage_message, ApiEnvelope, Classification, Disposition, Submission};
pub use presentation::{resolve_step, Resolution, Screen};
pub use resume::{resume_index, ResumeStrategy};
pub use skip::{skippable_steps, SkipSet};
