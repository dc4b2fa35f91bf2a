use serde::{Deserialize, Serialize};

/// Identidad estática del dispositivo usada para registrarlo en el backend.
/// El sondeo real del entorno queda fuera de este crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    pub device_id: String,
    pub device_type: String,
    pub device_model: String,
    pub os_version: String,
    pub app_version: String,
    pub ip_address: String,
    pub user_agent: String,
    pub timezone: String,
}
