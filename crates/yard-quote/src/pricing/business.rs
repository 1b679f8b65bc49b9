use serde::{Deserialize, Deserializer, Serialize};

use super::domain::{BillingMode, BusinessId, Frequency, YardSize};

/// Price breakpoint keyed by dog count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingTier {
    pub dog_count: u32,
    pub base_price_cents: u64,
    /// Increment per dog beyond this tier; only honored on the highest tier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_dog_price_cents: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequencyPricing {
    pub frequency: Frequency,
    pub multiplier: f64,
    /// Average visits per month, used for the monthly projection only.
    pub visits_per_month: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YardSizePricing {
    pub size: YardSize,
    pub multiplier: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

/// Extra-area pricing beyond the areas included in the base price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaPricing {
    pub enabled: bool,
    pub base_areas: u32,
    pub extra_area_cost_cents: u64,
    pub recurring_extra_area_cost_cents: u64,
}

/// Days-since-last-cleanup range mapped to a multiplier and a floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialCleanBucket {
    #[serde(alias = "bucket", deserialize_with = "deserialize_threshold")]
    pub threshold_days: u32,
    pub multiplier: f64,
    pub floor_price_cents: u64,
    #[serde(default)]
    pub label: String,
}

/// Share of the initial clean waived for customers on a given cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequencyWaiver {
    pub frequency: Frequency,
    pub discount_percent: u8,
}

impl FrequencyWaiver {
    pub fn standard_policy() -> Vec<FrequencyWaiver> {
        vec![
            FrequencyWaiver {
                frequency: Frequency::Weekly,
                discount_percent: 100,
            },
            FrequencyWaiver {
                frequency: Frequency::BiWeekly,
                discount_percent: 100,
            },
            FrequencyWaiver {
                frequency: Frequency::TwiceWeekly,
                discount_percent: 100,
            },
            FrequencyWaiver {
                frequency: Frequency::Monthly,
                discount_percent: 50,
            },
            FrequencyWaiver {
                frequency: Frequency::OneTime,
                discount_percent: 0,
            },
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialCleanPricing {
    pub enabled: bool,
    pub buckets: Vec<InitialCleanBucket>,
    #[serde(default = "FrequencyWaiver::standard_policy")]
    pub waivers: Vec<FrequencyWaiver>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddOnConfig {
    pub id: String,
    pub name: String,
    pub price_cents: u64,
    #[serde(default)]
    pub description: String,
    pub available: bool,
    pub billing_mode: BillingMode,
    #[serde(default)]
    pub required: bool,
}

/// Geographic multiplier bucket keyed by ZIP membership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceZone {
    pub zone_id: String,
    pub name: String,
    pub base_multiplier: f64,
    #[serde(default)]
    pub description: String,
    pub serviceable: bool,
    #[serde(default)]
    pub zip_codes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasePricing {
    pub tiers: Vec<PricingTier>,
    pub frequencies: Vec<FrequencyPricing>,
    pub yard_sizes: Vec<YardSizePricing>,
    pub area_pricing: AreaPricing,
    pub initial_clean: InitialCleanPricing,
    pub add_ons: Vec<AddOnConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessSettings {
    pub default_zone_multiplier: f64,
    pub minimum_service_fee_cents: u64,
}

/// Immutable pricing snapshot for one tenant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessConfig {
    pub business_id: BusinessId,
    pub business_name: String,
    pub service_zones: Vec<ServiceZone>,
    pub base_pricing: BasePricing,
    pub settings: BusinessSettings,
}

impl BusinessConfig {
    pub fn add_on(&self, id: &str) -> Option<&AddOnConfig> {
        self.base_pricing.add_ons.iter().find(|addon| addon.id == id)
    }

    pub fn yard_size(&self, size: YardSize) -> Option<&YardSizePricing> {
        self.base_pricing
            .yard_sizes
            .iter()
            .find(|entry| entry.size == size)
    }

    pub fn frequency(&self, frequency: Frequency) -> Option<&FrequencyPricing> {
        self.base_pricing
            .frequencies
            .iter()
            .find(|entry| entry.frequency == frequency)
    }

    /// Check the structural invariants every tenant document must satisfy.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let pricing = &self.base_pricing;
        let mut problems = Vec::new();

        if pricing.tiers.is_empty() {
            problems.push("at least one pricing tier is required".to_string());
        }
        for tier in &pricing.tiers {
            if tier.dog_count < 1 {
                problems.push("pricing tiers must start at one dog".to_string());
            }
        }
        let mut dog_counts: Vec<u32> = pricing.tiers.iter().map(|tier| tier.dog_count).collect();
        dog_counts.sort_unstable();
        if dog_counts.windows(2).any(|pair| pair[0] == pair[1]) {
            problems.push("pricing tiers must have distinct dog counts".to_string());
        }

        if pricing.frequencies.is_empty() {
            problems.push("at least one service frequency is required".to_string());
        }
        for entry in &pricing.frequencies {
            if !is_valid_factor(entry.multiplier) || !is_valid_factor(entry.visits_per_month) {
                problems.push(format!(
                    "frequency '{}' has an invalid multiplier or visit count",
                    entry.frequency
                ));
            }
        }

        if pricing.yard_sizes.is_empty() {
            problems.push("at least one yard size is required".to_string());
        }
        for entry in &pricing.yard_sizes {
            if !is_valid_factor(entry.multiplier) {
                problems.push(format!(
                    "yard size '{}' has an invalid multiplier",
                    entry.size
                ));
            }
        }

        if pricing.initial_clean.enabled && pricing.initial_clean.buckets.is_empty() {
            problems.push("initial clean is enabled but has no buckets".to_string());
        }
        for bucket in &pricing.initial_clean.buckets {
            if !is_valid_factor(bucket.multiplier) {
                problems.push(format!(
                    "initial clean bucket {} has an invalid multiplier",
                    bucket.threshold_days
                ));
            }
        }
        for waiver in &pricing.initial_clean.waivers {
            if waiver.discount_percent > 100 {
                problems.push(format!(
                    "initial clean waiver for '{}' exceeds 100%",
                    waiver.frequency
                ));
            }
        }

        let mut ids: Vec<&str> = pricing.add_ons.iter().map(|addon| addon.id.as_str()).collect();
        if ids.iter().any(|id| id.trim().is_empty()) {
            problems.push("add-on ids must not be blank".to_string());
        }
        ids.sort_unstable();
        if ids.windows(2).any(|pair| pair[0] == pair[1]) {
            problems.push("add-on ids must be unique".to_string());
        }

        if !is_valid_factor(self.settings.default_zone_multiplier) {
            problems.push("default zone multiplier must be a non-negative number".to_string());
        }
        for zone in &self.service_zones {
            if !is_valid_factor(zone.base_multiplier) {
                problems.push(format!(
                    "zone '{}' has an invalid multiplier",
                    zone.zone_id
                ));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigurationError::InvalidDocument(problems))
        }
    }
}

/// Broken tenant setup; not recoverable by retrying the same document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("no pricing tier covers {dogs} dog(s)")]
    NoTierForDogs { dogs: u32 },
    #[error("yard size '{0}' is not configured")]
    MissingYardSize(YardSize),
    #[error("frequency '{0}' is not configured")]
    MissingFrequency(Frequency),
    #[error("initial clean is enabled but no buckets are configured")]
    NoInitialCleanBuckets,
    #[error("invalid business configuration: {}", .0.join("; "))]
    InvalidDocument(Vec<String>),
    #[error("{0} exceeds the largest representable amount")]
    AmountOverflow(&'static str),
}

fn is_valid_factor(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

fn enabled_by_default() -> bool {
    true
}

/// Older documents store thresholds as strings such as `"14"`.
fn deserialize_threshold<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Threshold {
        Days(u32),
        Label(String),
    }

    match Threshold::deserialize(deserializer)? {
        Threshold::Days(days) => Ok(days),
        Threshold::Label(label) => label.trim().parse::<u32>().map_err(|_| {
            serde::de::Error::custom(format!("bucket threshold '{label}' is not a day count"))
        }),
    }
}
