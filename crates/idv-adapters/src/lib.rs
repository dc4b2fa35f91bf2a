//! idv-adapters: implementaciones concretas alrededor del coordinador
//!
//! Este crate provee:
//! - `UserInteraction`: lo que el host debe saber hacer (capturar imágenes,
//!   pedir direcciones y códigos, mostrar checkboxes, formulario de datos).
//! - Executors por pantalla (`steps`) que combinan la interacción con las
//!   llamadas al backend y emiten los sub-eventos del observer.
//! - `DefaultExecutors`: la fábrica que mapea cada `Screen` a su executor.
//! - `ScriptedBackend`: backend en memoria que responde con pares
//!   (status, body) crudos pasados por la misma política de normalización.

pub mod factory;
pub mod interaction;
pub mod scripted;
pub mod steps;
pub mod wire;

pub use factory::DefaultExecutors;
pub use interaction::{ScriptedInteraction, UserInfoForm, UserInteraction};
pub use scripted::{Reply, ScriptedBackend};
