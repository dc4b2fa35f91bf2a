//! Constantes del coordinador.

/// Versión lógica del formato del journal. Entra en el `plan_hash`, de modo
/// que journals de versiones distintas nunca comparan como el mismo plan.
pub const JOURNAL_VERSION: &str = "J1";
