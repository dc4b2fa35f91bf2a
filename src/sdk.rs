//! Fachada del SDK construida explícitamente (sin singletons).
//!
//! `configure` valida la API key, limpia sólo la caché de steps/settings,
//! re-registra el dispositivo cuando falta o cambió, y persiste los
//! settings junto con su lista de steps requeridos (la que usa una
//! reanudación posterior). Después, `coordinator` entrega un `FlowCoordinator` listo para
//! `start`, compartiendo backend, store y observer.
use std::sync::Arc;

use idv_core::{ExecutorFactory, FlowCoordinator, FlowObserver, FlowOptions, NoopObserver, ObservedBackend, SessionStore, StoreKey,
               VerificationBackend};
use idv_domain::{DeviceIdentity, FlowError, PredefinedUserInfo, VerificationSettings};
use log::{debug, info};

use crate::config::SdkConfig;
use crate::errors::SdkError;

pub struct IdentityVerification {
    config: SdkConfig,
    device: DeviceIdentity,
    backend: Arc<dyn VerificationBackend>,
    store: Arc<dyn SessionStore>,
    observer: Arc<dyn FlowObserver>,
    api_key: Option<String>,
}

impl IdentityVerification {
    pub fn new(config: SdkConfig,
               device: DeviceIdentity,
               backend: Arc<dyn VerificationBackend>,
               store: Arc<dyn SessionStore>)
               -> Self {
        Self { config,
               device,
               backend,
               store,
               observer: Arc::new(NoopObserver),
               api_key: None }
    }

    pub fn with_observer(mut self, observer: Arc<dyn FlowObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Configura con la API key de `SdkConfig`.
    pub async fn configure_from_config(&mut self) -> Result<VerificationSettings, SdkError> {
        let key = self.config.api_key.clone().unwrap_or_default();
        self.configure(&key).await
    }

    pub async fn configure(&mut self, api_key: &str) -> Result<VerificationSettings, SdkError> {
        let key = api_key.trim();
        if key.is_empty() {
            return Err(FlowError::MissingCredential("api key is required".to_string()).into());
        }
        self.api_key = Some(key.to_string());
        self.store.clear_configuration()?;

        let backend = ObservedBackend::new(Arc::clone(&self.backend), Arc::clone(&self.observer));
        let customer_id = self.ensure_device_registered(&backend).await?;
        let settings = backend.fetch_verification_settings().await?;
        self.store.set_verification_settings(&settings)?;
        if !settings.required_steps.is_empty() {
            self.store.set_required_steps(&settings.required_steps)?;
        }
        info!("configured for customer {customer_id} ({} required steps)", settings.required_steps.len());
        Ok(settings)
    }

    /// Devuelve el customer id vigente, registrando el dispositivo si el id
    /// guardado falta o no coincide con el actual.
    async fn ensure_device_registered(&self, backend: &ObservedBackend) -> Result<String, SdkError> {
        let stored_device = self.store.device_id()?;
        let stored_customer = self.store.customer_id()?;
        match (stored_device.as_deref(), stored_customer) {
            (Some(device), Some(customer)) if device == self.device.device_id => {
                debug!("device {device} already registered");
                return Ok(customer);
            }
            (Some(device), _) if device != self.device.device_id => {
                info!("device changed ({device} -> {}); dropping stored session", self.device.device_id);
                self.store.clear_device_identifier()?;
            }
            _ => {}
        }
        let customer_id = backend.register_device(&self.device).await?;
        self.store.set(StoreKey::DeviceId, &self.device.device_id)?;
        self.store.set(StoreKey::CustomerId, &customer_id)?;
        info!("device {} registered as customer {customer_id}", self.device.device_id);
        Ok(customer_id)
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Nuevo coordinador para un intento de verificación.
    pub fn coordinator(&self, executors: Arc<dyn ExecutorFactory>, predefined: PredefinedUserInfo) -> Result<FlowCoordinator, SdkError> {
        if !self.is_configured() {
            return Err(FlowError::MissingCredential("configure must succeed before starting a flow".to_string()).into());
        }
        let options = FlowOptions::default().with_resume_strategy(self.config.resume_strategy)
                                            .with_predefined(predefined);
        Ok(FlowCoordinator::builder(Arc::clone(&self.backend), Arc::clone(&self.store)).executors(executors)
                                                                                     .observer(Arc::clone(&self.observer))
                                                                                     .options(options)
                                                                                     .build())
    }

    pub fn clear_configuration(&self) -> Result<(), SdkError> {
        Ok(self.store.clear_configuration()?)
    }

    pub fn clear_device_identifier(&self) -> Result<(), SdkError> {
        Ok(self.store.clear_device_identifier()?)
    }

    /// Reset completo: también olvida la API key.
    pub fn clear_all(&mut self) -> Result<(), SdkError> {
        self.api_key = None;
        Ok(self.store.clear_all()?)
    }

    pub fn config(&self) -> &SdkConfig {
        &self.config
    }

    pub fn device(&self) -> &DeviceIdentity {
        &self.device
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }
}
