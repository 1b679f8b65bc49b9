//! Read-only views used to populate quote forms.

use super::business::{AddOnConfig, BusinessConfig, FrequencyPricing, PricingTier, YardSizePricing};

pub fn available_add_ons(config: &BusinessConfig) -> Vec<&AddOnConfig> {
    config
        .base_pricing
        .add_ons
        .iter()
        .filter(|addon| addon.available)
        .collect()
}

pub fn frequencies(config: &BusinessConfig) -> Vec<&FrequencyPricing> {
    let mut entries: Vec<&FrequencyPricing> = config.base_pricing.frequencies.iter().collect();
    entries.sort_by_key(|entry| entry.frequency);
    entries
}

pub fn enabled_yard_sizes(config: &BusinessConfig) -> Vec<&YardSizePricing> {
    let mut entries: Vec<&YardSizePricing> = config
        .base_pricing
        .yard_sizes
        .iter()
        .filter(|entry| entry.enabled)
        .collect();
    entries.sort_by_key(|entry| entry.size);
    entries
}

/// Tiers in ascending dog-count order.
pub fn tiers(config: &BusinessConfig) -> Vec<&PricingTier> {
    let mut entries: Vec<&PricingTier> = config.base_pricing.tiers.iter().collect();
    entries.sort_by_key(|tier| tier.dog_count);
    entries
}
