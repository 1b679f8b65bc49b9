use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::response::Response;
use serde_json::Value;

use crate::pricing::business::BusinessConfig;
use crate::pricing::domain::{BusinessId, Frequency, PricingCalculationInput, YardSize};
use crate::pricing::provider::{ConfigProvider, ConfigStore, ConfigStoreError};
use crate::pricing::service::QuoteService;
use crate::pricing::{quote_router, DEFAULT_BUSINESS_ID};

pub(super) fn yardura() -> BusinessId {
    BusinessId::new(DEFAULT_BUSINESS_ID)
}

pub(super) fn default_config() -> BusinessConfig {
    BusinessConfig::default_preset()
}

pub(super) fn input(dogs: u32, yard_size: YardSize, frequency: Frequency) -> PricingCalculationInput {
    PricingCalculationInput::new(yardura(), dogs, yard_size, frequency)
}

/// Tenant with its own prices, used to tell stored documents from the fallback.
pub(super) fn acme_config() -> BusinessConfig {
    let mut config = BusinessConfig::default_preset();
    config.business_id = BusinessId::new("acme");
    config.business_name = "Acme Scoopers".to_string();
    for tier in &mut config.base_pricing.tiers {
        tier.base_price_cents += 1000;
    }
    config.service_zones[0].zip_codes = vec!["50309".to_string()];
    config
}

pub(super) fn acme_document() -> Value {
    serde_json::to_value(acme_config()).expect("config serializes")
}

#[derive(Default, Clone)]
pub(super) struct MemoryStore {
    pub(super) documents: Arc<Mutex<HashMap<BusinessId, Value>>>,
}

impl MemoryStore {
    pub(super) fn with_document(business_id: &str, document: Value) -> Self {
        let store = Self::default();
        store
            .documents
            .lock()
            .expect("store mutex poisoned")
            .insert(BusinessId::new(business_id), document);
        store
    }
}

impl ConfigStore for MemoryStore {
    fn fetch(&self, business_id: &BusinessId) -> Result<Option<Value>, ConfigStoreError> {
        let guard = self.documents.lock().expect("store mutex poisoned");
        Ok(guard.get(business_id).cloned())
    }

    fn replace(&self, config: &BusinessConfig) -> Result<(), ConfigStoreError> {
        let document = serde_json::to_value(config)?;
        self.documents
            .lock()
            .expect("store mutex poisoned")
            .insert(config.business_id.clone(), document);
        Ok(())
    }

    fn list(&self) -> Result<Vec<BusinessId>, ConfigStoreError> {
        let guard = self.documents.lock().expect("store mutex poisoned");
        Ok(guard.keys().cloned().collect())
    }
}

/// Fails with `Unavailable` for the first `failures` fetches, then serves `document`.
pub(super) struct FlakyStore {
    failures: u32,
    calls: AtomicU32,
    document: Value,
}

impl FlakyStore {
    pub(super) fn new(failures: u32, document: Value) -> Self {
        Self {
            failures,
            calls: AtomicU32::new(0),
            document,
        }
    }

    pub(super) fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ConfigStore for FlakyStore {
    fn fetch(&self, _business_id: &BusinessId) -> Result<Option<Value>, ConfigStoreError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call <= self.failures {
            return Err(ConfigStoreError::Unavailable("connection reset".to_string()));
        }
        Ok(Some(self.document.clone()))
    }

    fn replace(&self, _config: &BusinessConfig) -> Result<(), ConfigStoreError> {
        Err(ConfigStoreError::Unavailable("read only".to_string()))
    }

    fn list(&self) -> Result<Vec<BusinessId>, ConfigStoreError> {
        Ok(Vec::new())
    }
}

/// Holds each fetch until the test opens the gate, reporting `Unavailable` after two seconds.
pub(super) struct GatedStore {
    gate: Mutex<Receiver<()>>,
    document: Value,
}

impl GatedStore {
    pub(super) fn new(document: Value) -> (Self, Sender<()>) {
        let (open, gate) = mpsc::channel();
        let store = Self {
            gate: Mutex::new(gate),
            document,
        };
        (store, open)
    }
}

impl ConfigStore for GatedStore {
    fn fetch(&self, _business_id: &BusinessId) -> Result<Option<Value>, ConfigStoreError> {
        let gate = self.gate.lock().expect("gate mutex poisoned");
        gate.recv_timeout(Duration::from_secs(2))
            .map_err(|_| ConfigStoreError::Unavailable("gate never opened".to_string()))?;
        Ok(Some(self.document.clone()))
    }

    fn replace(&self, _config: &BusinessConfig) -> Result<(), ConfigStoreError> {
        Err(ConfigStoreError::Unavailable("read only".to_string()))
    }

    fn list(&self) -> Result<Vec<BusinessId>, ConfigStoreError> {
        Ok(Vec::new())
    }
}

pub(super) struct UnavailableStore;

impl ConfigStore for UnavailableStore {
    fn fetch(&self, _business_id: &BusinessId) -> Result<Option<Value>, ConfigStoreError> {
        Err(ConfigStoreError::Unavailable("database offline".to_string()))
    }

    fn replace(&self, _config: &BusinessConfig) -> Result<(), ConfigStoreError> {
        Err(ConfigStoreError::Unavailable("database offline".to_string()))
    }

    fn list(&self) -> Result<Vec<BusinessId>, ConfigStoreError> {
        Err(ConfigStoreError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn build_service() -> (QuoteService<MemoryStore>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::with_document("acme", acme_document()));
    let service = QuoteService::new(store.clone());
    (service, store)
}

pub(super) fn provider_with<S: ConfigStore + 'static>(store: S, attempts: u32) -> ConfigProvider<S> {
    ConfigProvider::new(Arc::new(store)).with_fetch_attempts(attempts)
}

pub(super) fn router_with_service(service: QuoteService<MemoryStore>) -> axum::Router {
    quote_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
