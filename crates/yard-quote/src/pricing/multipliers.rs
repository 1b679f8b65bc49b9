use super::business::{BusinessConfig, ConfigurationError, FrequencyPricing};
use super::domain::{Frequency, YardSize};

/// Zone multiplier applied when the caller resolved none.
pub const NEUTRAL_ZONE_MULTIPLIER: f64 = 1.0;

pub fn yard_multiplier(config: &BusinessConfig, size: YardSize) -> Result<f64, ConfigurationError> {
    config
        .yard_size(size)
        .map(|entry| entry.multiplier)
        .ok_or(ConfigurationError::MissingYardSize(size))
}

pub fn frequency_pricing(
    config: &BusinessConfig,
    frequency: Frequency,
) -> Result<&FrequencyPricing, ConfigurationError> {
    config
        .frequency(frequency)
        .ok_or(ConfigurationError::MissingFrequency(frequency))
}

pub fn zone_multiplier(resolved: Option<f64>) -> f64 {
    resolved.unwrap_or(NEUTRAL_ZONE_MULTIPLIER)
}
