//! Tenant-configurable pricing for recurring and one-time yard service.
//!
//! The calculation core (`engine` and the calculators it composes) is a pure function of
//! a request and a configuration snapshot. Configuration lookup, request parsing and HTTP
//! wiring sit around it and never leak into the arithmetic.

pub mod addons;
pub mod areas;
pub mod business;
pub mod catalog;
pub mod document;
pub mod domain;
pub mod engine;
pub mod initial_clean;
pub mod multipliers;
mod presets;
pub mod provider;
pub mod request;
pub mod result;
pub mod router;
pub mod service;
pub mod snapshot;
pub mod tiers;
pub mod validation;
pub mod zones;

#[cfg(test)]
mod tests;

pub use addons::{AddOnCharges, AddOnLine};
pub use business::{
    AddOnConfig, AreaPricing, BasePricing, BusinessConfig, BusinessSettings, ConfigurationError,
    FrequencyPricing, FrequencyWaiver, InitialCleanBucket, InitialCleanPricing, PricingTier,
    ServiceZone, YardSizePricing,
};
pub use domain::{
    AddOnSelection, AreaSelection, BillingMode, BusinessId, Frequency, PricingCalculationInput,
    SelectionMap, UnknownKey, YardSize,
};
pub use engine::{calculate_pricing, meets_minimum_service_fee, PricingEngine};
pub use presets::DEFAULT_BUSINESS_ID;
pub use provider::{ConfigProvider, ConfigSource, ConfigStore, ConfigStoreError, ResolvedConfig};
pub use request::QuoteRequest;
pub use result::{
    format_cents, FirstVisitCharge, InitialCleanQuote, PricingBreakdown, PricingResult,
};
pub use router::quote_router;
pub use service::{Quote, QuoteService, QuoteServiceError};
pub use snapshot::{QuoteSnapshot, QuoteSummary};
pub use validation::{validate_input, FieldError, ValidationErrors, ValidationReport};
