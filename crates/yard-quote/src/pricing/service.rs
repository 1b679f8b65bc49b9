use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use super::business::{AddOnConfig, BusinessConfig, ConfigurationError};
use super::catalog::available_add_ons;
use super::domain::{BusinessId, PricingCalculationInput};
use super::engine::{meets_minimum_service_fee, PricingEngine};
use super::presets::DEFAULT_BUSINESS_ID;
use super::provider::{ConfigProvider, ConfigSource, ConfigStore, ConfigStoreError, ResolvedConfig};
use super::request::QuoteRequest;
use super::result::{format_cents, PricingResult};
use super::validation::{FieldError, ValidationErrors, ValidationReport};

/// Priced quote returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub business_id: BusinessId,
    pub business_name: String,
    pub config_source: ConfigSource,
    pub input: PricingCalculationInput,
    pub result: PricingResult,
    /// Whether the quote reaches the tenant's minimum service fee.
    pub meets_minimum: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<FieldError>,
}

/// Service composing configuration resolution, validation, and the pricing engine.
pub struct QuoteService<S> {
    provider: Arc<ConfigProvider<S>>,
    default_business: BusinessId,
}

impl<S> QuoteService<S>
where
    S: ConfigStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self::with_provider(Arc::new(ConfigProvider::new(store)))
    }

    pub fn with_provider(provider: Arc<ConfigProvider<S>>) -> Self {
        Self {
            provider,
            default_business: BusinessId::new(DEFAULT_BUSINESS_ID),
        }
    }

    /// Tenant priced when a request does not name one.
    pub fn with_default_business(mut self, business_id: BusinessId) -> Self {
        self.default_business = business_id;
        self
    }

    pub fn provider(&self) -> &Arc<ConfigProvider<S>> {
        &self.provider
    }

    pub fn business_for(&self, request: &QuoteRequest) -> BusinessId {
        request
            .business_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(BusinessId::new)
            .unwrap_or_else(|| self.default_business.clone())
    }

    /// Price a request against its tenant's configuration.
    pub fn quote(&self, request: &QuoteRequest) -> Result<Quote, QuoteServiceError> {
        let business_id = self.business_for(request);
        let resolved = self.provider.resolve(&business_id);
        let (input, warnings) = request.to_input(&business_id, &resolved.config)?;

        for warning in &warnings {
            warn!(%business_id, field = %warning.field, "{}", warning.message);
        }

        let business_name = resolved.config.business_name.clone();
        let priced = self.price(&business_id, resolved, &input)?;

        info!(
            %business_id,
            per_visit_cents = priced.result.per_visit_cents,
            monthly_cents = priced.result.monthly_cents,
            first_visit_cents = priced.result.first_visit.total_cents,
            meets_minimum = priced.meets_minimum,
            "quote calculated"
        );

        Ok(Quote {
            business_id,
            business_name,
            config_source: priced.source,
            input,
            result: priced.result,
            meets_minimum: priced.meets_minimum,
            warnings,
        })
    }

    /// Field errors and warnings for a request.
    ///
    /// A request that would price below the tenant's minimum service fee passes with a
    /// `minimumServiceFee` warning.
    pub fn validate(&self, request: &QuoteRequest) -> ValidationReport {
        let business_id = self.business_for(request);
        let resolved = self.provider.resolve(&business_id);
        let (input, mut report) = request.parse(&business_id, &resolved.config);

        let Some(input) = input.filter(|_| report.is_valid()) else {
            return report;
        };
        match self.price(&business_id, resolved, &input) {
            Ok(priced) if !priced.meets_minimum => report.warnings.push(FieldError::new(
                "minimumServiceFee",
                format!(
                    "Quote is below the minimum service fee of {}",
                    format_cents(priced.minimum_cents)
                ),
            )),
            Ok(_) => {}
            Err(err) => report
                .errors
                .push(FieldError::new("configuration", err.to_string())),
        }
        report
    }

    /// Run the engine with the resolved tenant, recomputing with the fallback when the
    /// tenant's document cannot price the input.
    fn price(
        &self,
        business_id: &BusinessId,
        resolved: ResolvedConfig,
        input: &PricingCalculationInput,
    ) -> Result<Priced, ConfigurationError> {
        let engine = PricingEngine::new(resolved.config);
        let (engine, result, source) = match engine.calculate(input) {
            Ok(result) => (engine, result, resolved.source),
            Err(err) => {
                error!(%business_id, error = %err, "tenant configuration cannot price request, using fallback");
                let fallback = PricingEngine::new(self.provider.fallback(business_id));
                let result = fallback.calculate(input)?;
                (fallback, result, ConfigSource::Fallback)
            }
        };
        let settings = &engine.config().settings;

        Ok(Priced {
            meets_minimum: meets_minimum_service_fee(&result, input.frequency, settings),
            minimum_cents: settings.minimum_service_fee_cents,
            result,
            source,
        })
    }

    pub fn config(&self, business_id: &BusinessId) -> ResolvedConfig {
        self.provider.resolve(business_id)
    }

    /// Validate and store a whole replacement document for `business_id`.
    pub fn replace_config(
        &self,
        business_id: &BusinessId,
        mut config: BusinessConfig,
    ) -> Result<BusinessConfig, QuoteServiceError> {
        config.business_id = business_id.clone();
        config.validate()?;
        self.provider.store().replace(&config)?;
        info!(%business_id, "configuration replaced");
        Ok(config)
    }

    pub fn available_add_ons(&self, business_id: &BusinessId) -> Vec<AddOnConfig> {
        let resolved = self.provider.resolve(business_id);
        available_add_ons(&resolved.config)
            .into_iter()
            .cloned()
            .collect()
    }
}

struct Priced {
    result: PricingResult,
    source: ConfigSource,
    meets_minimum: bool,
    minimum_cents: u64,
}

/// Error raised by the quote service.
#[derive(Debug, thiserror::Error)]
pub enum QuoteServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Store(#[from] ConfigStoreError),
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}
