use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, RwLock};

use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::Value;
use tempfile::NamedTempFile;
use yard_quote::config::PricingSettings;
use yard_quote::pricing::{
    AddOnSelection, BillingMode, BusinessConfig, BusinessId, ConfigProvider, ConfigStore,
    ConfigStoreError, QuoteService,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local store used when no configuration directory is configured.
#[derive(Default, Clone)]
pub(crate) struct InMemoryConfigStore {
    documents: Arc<RwLock<HashMap<BusinessId, Value>>>,
}

impl ConfigStore for InMemoryConfigStore {
    fn fetch(&self, business_id: &BusinessId) -> Result<Option<Value>, ConfigStoreError> {
        let guard = self
            .documents
            .read()
            .map_err(|_| ConfigStoreError::Unavailable("store lock poisoned".to_string()))?;
        Ok(guard.get(business_id).cloned())
    }

    fn replace(&self, config: &BusinessConfig) -> Result<(), ConfigStoreError> {
        let document = serde_json::to_value(config)?;
        let mut guard = self
            .documents
            .write()
            .map_err(|_| ConfigStoreError::Unavailable("store lock poisoned".to_string()))?;
        guard.insert(config.business_id.clone(), document);
        Ok(())
    }

    fn list(&self) -> Result<Vec<BusinessId>, ConfigStoreError> {
        let guard = self
            .documents
            .read()
            .map_err(|_| ConfigStoreError::Unavailable("store lock poisoned".to_string()))?;
        let mut ids: Vec<BusinessId> = guard.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}

/// One `<business-id>.json` document per tenant, re-read on every fetch.
#[derive(Debug, Clone)]
pub(crate) struct DirectoryConfigStore {
    root: PathBuf,
}

impl DirectoryConfigStore {
    pub(crate) fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn document_path(&self, business_id: &BusinessId) -> Result<PathBuf, ConfigStoreError> {
        let key = business_id.as_str();
        let safe = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !safe {
            return Err(ConfigStoreError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(format!("{key}.json")))
    }
}

fn unavailable(path: &Path, err: io::Error) -> ConfigStoreError {
    ConfigStoreError::Unavailable(format!("{}: {err}", path.display()))
}

impl ConfigStore for DirectoryConfigStore {
    fn fetch(&self, business_id: &BusinessId) -> Result<Option<Value>, ConfigStoreError> {
        let path = self.document_path(business_id)?;
        let raw = match fs::read(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(unavailable(&path, err)),
        };
        Ok(Some(serde_json::from_slice(&raw)?))
    }

    /// Each write stages into its own uniquely named file beside the target and renames
    /// over it, so readers see one whole document and concurrent writers never share a file.
    fn replace(&self, config: &BusinessConfig) -> Result<(), ConfigStoreError> {
        let path = self.document_path(&config.business_id)?;
        fs::create_dir_all(&self.root).map_err(|err| unavailable(&self.root, err))?;

        let body = serde_json::to_vec_pretty(config)?;
        let mut staging =
            NamedTempFile::new_in(&self.root).map_err(|err| unavailable(&self.root, err))?;
        staging
            .write_all(&body)
            .and_then(|()| staging.as_file().sync_all())
            .map_err(|err| unavailable(staging.path(), err))?;
        staging
            .persist(&path)
            .map_err(|err| unavailable(&path, err.error))?;
        Ok(())
    }

    fn list(&self) -> Result<Vec<BusinessId>, ConfigStoreError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(unavailable(&self.root, err)),
        };

        let mut ids = Vec::new();
        for entry in entries {
            let path = entry.map_err(|err| unavailable(&self.root, err))?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                if !stem.starts_with('.') {
                    ids.push(BusinessId::new(stem));
                }
            }
        }
        ids.sort();
        Ok(ids)
    }
}

/// Store selected at startup from `QUOTE_CONFIG_DIR` / `--config-dir`.
#[derive(Clone)]
pub(crate) enum ConfiguredStore {
    Memory(InMemoryConfigStore),
    Directory(DirectoryConfigStore),
}

impl ConfiguredStore {
    pub(crate) fn from_settings(settings: &PricingSettings) -> Self {
        match &settings.config_dir {
            Some(dir) => Self::Directory(DirectoryConfigStore::new(dir)),
            None => Self::Memory(InMemoryConfigStore::default()),
        }
    }
}

impl ConfigStore for ConfiguredStore {
    fn fetch(&self, business_id: &BusinessId) -> Result<Option<Value>, ConfigStoreError> {
        match self {
            Self::Memory(store) => store.fetch(business_id),
            Self::Directory(store) => store.fetch(business_id),
        }
    }

    fn replace(&self, config: &BusinessConfig) -> Result<(), ConfigStoreError> {
        match self {
            Self::Memory(store) => store.replace(config),
            Self::Directory(store) => store.replace(config),
        }
    }

    fn list(&self) -> Result<Vec<BusinessId>, ConfigStoreError> {
        match self {
            Self::Memory(store) => store.list(),
            Self::Directory(store) => store.list(),
        }
    }
}

pub(crate) fn quote_service(settings: &PricingSettings) -> QuoteService<ConfiguredStore> {
    let store = Arc::new(ConfiguredStore::from_settings(settings));
    let provider = ConfigProvider::new(store).with_fetch_attempts(settings.fetch_attempts);
    QuoteService::with_provider(Arc::new(provider))
        .with_default_business(settings.default_business.clone())
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

/// `id` selects an add-on with its default billing; `id=mode` overrides the mode.
pub(crate) fn parse_add_on(raw: &str) -> Result<(String, AddOnSelection), String> {
    let (id, mode) = match raw.split_once('=') {
        Some((id, mode)) => (id.trim(), Some(mode.trim())),
        None => (raw.trim(), None),
    };
    if id.is_empty() {
        return Err(format!("add-on '{raw}' is missing an id"));
    }
    let selection = match mode {
        None => AddOnSelection::SelectedDefault,
        Some(mode) => {
            let mode: BillingMode = mode.parse().map_err(|err| format!("{err}"))?;
            AddOnSelection::SelectedWithMode(mode)
        }
    };
    Ok((id.to_string(), selection))
}
