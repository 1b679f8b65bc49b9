//! Decoding of stored tenant documents.
//!
//! Stored documents may predate newer sections, so every section is optional and
//! anything missing is taken from the fallback document.

use serde::Deserialize;

use super::business::{
    AddOnConfig, AreaPricing, BasePricing, BusinessConfig, BusinessSettings, FrequencyPricing,
    FrequencyWaiver, InitialCleanBucket, InitialCleanPricing, PricingTier, ServiceZone,
    YardSizePricing,
};
use super::domain::BusinessId;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredBusinessConfig {
    pub business_name: Option<String>,
    pub service_zones: Option<Vec<ServiceZone>>,
    pub base_pricing: Option<StoredBasePricing>,
    pub settings: Option<StoredSettings>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredBasePricing {
    pub tiers: Option<Vec<PricingTier>>,
    pub frequencies: Option<Vec<FrequencyPricing>>,
    pub yard_sizes: Option<Vec<YardSizePricing>>,
    pub area_pricing: Option<StoredAreaPricing>,
    pub initial_clean: Option<StoredInitialClean>,
    pub add_ons: Option<Vec<AddOnConfig>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredAreaPricing {
    pub enabled: Option<bool>,
    pub base_areas: Option<u32>,
    pub extra_area_cost_cents: Option<u64>,
    pub recurring_extra_area_cost_cents: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredInitialClean {
    pub enabled: Option<bool>,
    pub buckets: Option<Vec<InitialCleanBucket>>,
    pub waivers: Option<Vec<FrequencyWaiver>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSettings {
    pub default_zone_multiplier: Option<f64>,
    pub minimum_service_fee_cents: Option<u64>,
}

impl StoredBusinessConfig {
    pub fn from_value(document: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(document)
    }

    /// Fill every missing section from `defaults`, keyed to `business_id`.
    pub fn merge_over(self, business_id: BusinessId, defaults: BusinessConfig) -> BusinessConfig {
        let base = self.base_pricing.unwrap_or_default();
        let fallback = defaults.base_pricing;

        let area_pricing = match base.area_pricing {
            Some(stored) => AreaPricing {
                enabled: stored.enabled.unwrap_or(fallback.area_pricing.enabled),
                base_areas: stored.base_areas.unwrap_or(fallback.area_pricing.base_areas),
                extra_area_cost_cents: stored
                    .extra_area_cost_cents
                    .unwrap_or(fallback.area_pricing.extra_area_cost_cents),
                recurring_extra_area_cost_cents: stored
                    .recurring_extra_area_cost_cents
                    .unwrap_or(fallback.area_pricing.recurring_extra_area_cost_cents),
            },
            None => fallback.area_pricing,
        };

        let initial_clean = match base.initial_clean {
            Some(stored) => InitialCleanPricing {
                enabled: stored.enabled.unwrap_or(fallback.initial_clean.enabled),
                buckets: stored.buckets.unwrap_or(fallback.initial_clean.buckets),
                waivers: stored.waivers.unwrap_or(fallback.initial_clean.waivers),
            },
            None => fallback.initial_clean,
        };

        let settings = match self.settings {
            Some(stored) => BusinessSettings {
                default_zone_multiplier: stored
                    .default_zone_multiplier
                    .unwrap_or(defaults.settings.default_zone_multiplier),
                minimum_service_fee_cents: stored
                    .minimum_service_fee_cents
                    .unwrap_or(defaults.settings.minimum_service_fee_cents),
            },
            None => defaults.settings,
        };

        BusinessConfig {
            business_id,
            business_name: self
                .business_name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| "Business".to_string()),
            service_zones: self.service_zones.unwrap_or(defaults.service_zones),
            base_pricing: BasePricing {
                tiers: base.tiers.unwrap_or(fallback.tiers),
                frequencies: base.frequencies.unwrap_or(fallback.frequencies),
                yard_sizes: base.yard_sizes.unwrap_or(fallback.yard_sizes),
                area_pricing,
                initial_clean,
                add_ons: base.add_ons.unwrap_or(fallback.add_ons),
            },
            settings,
        }
    }
}
