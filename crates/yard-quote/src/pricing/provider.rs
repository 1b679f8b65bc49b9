use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use super::business::BusinessConfig;
use super::document::StoredBusinessConfig;
use super::domain::BusinessId;

/// Storage abstraction for tenant configuration documents.
///
/// Writes replace the whole document; implementations must never expose a partially
/// written one to concurrent readers.
pub trait ConfigStore: Send + Sync {
    fn fetch(&self, business_id: &BusinessId)
        -> Result<Option<serde_json::Value>, ConfigStoreError>;
    fn replace(&self, config: &BusinessConfig) -> Result<(), ConfigStoreError>;
    fn list(&self) -> Result<Vec<BusinessId>, ConfigStoreError>;
}

/// Error enumeration for configuration store failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigStoreError {
    #[error("configuration store unavailable: {0}")]
    Unavailable(String),
    #[error("stored configuration is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("business id '{0}' cannot be used as a storage key")]
    InvalidKey(String),
}

/// Where a resolved configuration came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConfigSource {
    Stored,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedConfig {
    pub config: BusinessConfig,
    pub source: ConfigSource,
}

/// Resolves tenant configuration, substituting the fallback document whenever the
/// stored one cannot be used so that quoting always has something to price against.
pub struct ConfigProvider<S> {
    store: Arc<S>,
    fetch_attempts: u32,
    fallback: BusinessConfig,
}

impl<S> ConfigProvider<S>
where
    S: ConfigStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            fetch_attempts: 2,
            fallback: BusinessConfig::default_preset(),
        }
    }

    /// Attempts per resolution; zero is treated as one.
    pub fn with_fetch_attempts(mut self, attempts: u32) -> Self {
        self.fetch_attempts = attempts.max(1);
        self
    }

    pub fn with_fallback(mut self, fallback: BusinessConfig) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Fallback document re-keyed to `business_id`.
    pub fn fallback(&self, business_id: &BusinessId) -> BusinessConfig {
        BusinessConfig {
            business_id: business_id.clone(),
            ..self.fallback.clone()
        }
    }

    pub fn resolve(&self, business_id: &BusinessId) -> ResolvedConfig {
        let document = match self.fetch_with_retry(business_id) {
            Ok(Some(document)) => document,
            Ok(None) => {
                warn!(%business_id, "no stored configuration, using fallback");
                return self.fallback_resolution(business_id);
            }
            Err(err) => {
                warn!(%business_id, error = %err, "configuration fetch failed, using fallback");
                return self.fallback_resolution(business_id);
            }
        };

        let stored = match StoredBusinessConfig::from_value(document) {
            Ok(stored) => stored,
            Err(err) => {
                error!(%business_id, error = %err, "stored configuration is malformed, using fallback");
                return self.fallback_resolution(business_id);
            }
        };

        let config = stored.merge_over(business_id.clone(), self.fallback.clone());
        if let Err(err) = config.validate() {
            error!(%business_id, error = %err, "stored configuration is invalid, using fallback");
            return self.fallback_resolution(business_id);
        }

        ResolvedConfig {
            config,
            source: ConfigSource::Stored,
        }
    }

    fn fetch_with_retry(
        &self,
        business_id: &BusinessId,
    ) -> Result<Option<serde_json::Value>, ConfigStoreError> {
        let mut attempt = 1;
        loop {
            match self.store.fetch(business_id) {
                Err(ConfigStoreError::Unavailable(reason)) if attempt < self.fetch_attempts => {
                    warn!(%business_id, attempt, %reason, "configuration store unavailable, retrying");
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    fn fallback_resolution(&self, business_id: &BusinessId) -> ResolvedConfig {
        ResolvedConfig {
            config: self.fallback(business_id),
            source: ConfigSource::Fallback,
        }
    }
}
