//! Persistencia en archivo para el `SessionStore`.
//!
//! Un único documento JSON `{clave: valor}` con escritura atómica
//! (archivo temporal + rename) en cada modificación.

pub mod config;
pub mod error;
pub mod file_store;

pub use config::{init_dotenv, StoreConfig};
pub use error::PersistenceError;
pub use file_store::FileSessionStore;
