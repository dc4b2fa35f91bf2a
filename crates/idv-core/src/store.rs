//! Contrato de almacenamiento durable de identidad y sesión.
//!
//! El trait sólo exige get/set/remove sobre claves conocidas; los accesos
//! tipados y los grupos de limpieza se construyen encima como métodos por
//! defecto para que cualquier tecnología clave-valor sirva.
use dashmap::DashMap;
use idv_domain::{Session, SessionProgress, StepKind, VerificationSettings};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StoreKey {
    CustomerId,
    DeviceId,
    SessionToken,
    SessionId,
    RequiredSteps,
    VerificationSettings,
    /// Último progreso reportado por el servidor (steps completados/pendientes).
    SessionProgress,
}

impl StoreKey {
    pub const ALL: [StoreKey; 7] = [StoreKey::CustomerId,
                                    StoreKey::DeviceId,
                                    StoreKey::SessionToken,
                                    StoreKey::SessionId,
                                    StoreKey::RequiredSteps,
                                    StoreKey::VerificationSettings,
                                    StoreKey::SessionProgress];

    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKey::CustomerId => "customer_id",
            StoreKey::DeviceId => "device_id",
            StoreKey::SessionToken => "session_token",
            StoreKey::SessionId => "session_id",
            StoreKey::RequiredSteps => "required_steps",
            StoreKey::VerificationSettings => "verification_settings",
            StoreKey::SessionProgress => "session_progress",
        }
    }
}

fn non_blank(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}

pub trait SessionStore: Send + Sync {
    fn get(&self, key: StoreKey) -> Result<Option<String>, StoreError>;
    fn set(&self, key: StoreKey, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: StoreKey) -> Result<(), StoreError>;

    fn customer_id(&self) -> Result<Option<String>, StoreError> {
        Ok(non_blank(self.get(StoreKey::CustomerId)?))
    }

    fn device_id(&self) -> Result<Option<String>, StoreError> {
        Ok(non_blank(self.get(StoreKey::DeviceId)?))
    }

    fn session_token(&self) -> Result<Option<String>, StoreError> {
        Ok(non_blank(self.get(StoreKey::SessionToken)?))
    }

    fn session_id(&self) -> Result<Option<String>, StoreError> {
        Ok(non_blank(self.get(StoreKey::SessionId)?))
    }

    fn required_steps(&self) -> Result<Option<Vec<StepKind>>, StoreError> {
        read_json(self, StoreKey::RequiredSteps)
    }

    fn set_required_steps(&self, steps: &[StepKind]) -> Result<(), StoreError> {
        write_json(self, StoreKey::RequiredSteps, steps)
    }

    fn verification_settings(&self) -> Result<Option<VerificationSettings>, StoreError> {
        read_json(self, StoreKey::VerificationSettings)
    }

    fn set_verification_settings(&self, settings: &VerificationSettings) -> Result<(), StoreError> {
        write_json(self, StoreKey::VerificationSettings, settings)
    }

    fn session_progress(&self) -> Result<Option<SessionProgress>, StoreError> {
        read_json(self, StoreKey::SessionProgress)
    }

    fn set_session_progress(&self, progress: &SessionProgress) -> Result<(), StoreError> {
        write_json(self, StoreKey::SessionProgress, progress)
    }

    /// Persiste una sesión recién creada. El progreso de una sesión anterior
    /// deja de ser válido.
    fn save_session(&self, session: &Session) -> Result<(), StoreError> {
        self.set(StoreKey::SessionToken, &session.session_token)?;
        match &session.session_id {
            Some(id) => self.set(StoreKey::SessionId, id)?,
            None => self.remove(StoreKey::SessionId)?,
        }
        self.set_required_steps(&session.required_steps)?;
        self.remove(StoreKey::SessionProgress)
    }

    /// Limpia sólo las caches de configuración (steps + settings).
    fn clear_configuration(&self) -> Result<(), StoreError> {
        self.remove(StoreKey::RequiredSteps)?;
        self.remove(StoreKey::VerificationSettings)
    }

    /// Olvida el dispositivo y la sesión asociada.
    fn clear_device_identifier(&self) -> Result<(), StoreError> {
        self.remove(StoreKey::DeviceId)?;
        self.remove(StoreKey::SessionId)?;
        self.remove(StoreKey::SessionToken)?;
        self.remove(StoreKey::SessionProgress)
    }

    fn clear_all(&self) -> Result<(), StoreError> {
        for key in StoreKey::ALL {
            self.remove(key)?;
        }
        Ok(())
    }
}

fn read_json<S: SessionStore + ?Sized, T: DeserializeOwned>(store: &S, key: StoreKey) -> Result<Option<T>, StoreError> {
    match store.get(key)? {
        None => Ok(None),
        Some(raw) => serde_json::from_str(&raw).map(Some)
                                               .map_err(|e| StoreError::Corrupt { key: key.as_str(),
                                                                                  reason: e.to_string() }),
    }
}

fn write_json<S: SessionStore + ?Sized, T: Serialize + ?Sized>(store: &S, key: StoreKey, value: &T) -> Result<(), StoreError> {
    let raw = serde_json::to_string(value).map_err(|e| StoreError::Corrupt { key: key.as_str(),
                                                                              reason: e.to_string() })?;
    store.set(key, &raw)
}

/// Store en memoria, útil para tests y para hosts sin persistencia.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    inner: DashMap<StoreKey, String>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_customer(customer_id: &str) -> Self {
        let store = Self::new();
        store.inner.insert(StoreKey::CustomerId, customer_id.to_string());
        store
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, key: StoreKey) -> Result<Option<String>, StoreError> {
        Ok(self.inner.get(&key).map(|v| v.value().clone()))
    }

    fn set(&self, key: StoreKey, value: &str) -> Result<(), StoreError> {
        self.inner.insert(key, value.to_string());
        Ok(())
    }

    fn remove(&self, key: StoreKey) -> Result<(), StoreError> {
        self.inner.remove(&key);
        Ok(())
    }
}
