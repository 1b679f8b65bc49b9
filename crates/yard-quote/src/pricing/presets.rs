use super::business::{
    AddOnConfig, AreaPricing, BasePricing, BusinessConfig, BusinessSettings, FrequencyPricing,
    FrequencyWaiver, InitialCleanBucket, InitialCleanPricing, PricingTier, ServiceZone,
    YardSizePricing,
};
use super::domain::{BillingMode, BusinessId, Frequency, YardSize};

pub const DEFAULT_BUSINESS_ID: &str = "yardura";

impl BusinessConfig {
    /// Document substituted whenever a tenant's stored configuration cannot be used.
    pub fn default_preset() -> Self {
        Self {
            business_id: BusinessId::new(DEFAULT_BUSINESS_ID),
            business_name: "Yardura".to_string(),
            service_zones: vec![
                zone("zone-urban-core", "Urban Core", 1.2, "High-demand urban area"),
                zone("zone-suburban", "Suburban", 1.0, "Standard suburban area"),
                zone(
                    "zone-rural",
                    "Rural",
                    0.95,
                    "Rural area with extended travel time",
                ),
            ],
            base_pricing: BasePricing {
                tiers: vec![
                    tier(1, 2500, None),
                    tier(2, 3000, None),
                    tier(3, 3500, None),
                    tier(4, 4000, Some(500)),
                ],
                frequencies: vec![
                    frequency(Frequency::Weekly, 1.0, 4.33),
                    frequency(Frequency::TwiceWeekly, 1.8, 8.67),
                    frequency(Frequency::BiWeekly, 0.5, 2.17),
                    frequency(Frequency::Monthly, 1.5, 1.0),
                    frequency(Frequency::OneTime, 1.0, 1.0),
                ],
                yard_sizes: vec![
                    yard(YardSize::Small, 0.8, "< 1/4 acre"),
                    yard(YardSize::Medium, 1.0, "1/4 - 1/2 acre"),
                    yard(YardSize::Large, 1.2, "1/2 - 1 acre"),
                    yard(YardSize::XLarge, 1.4, "> 1 acre"),
                ],
                area_pricing: AreaPricing {
                    enabled: true,
                    base_areas: 1,
                    extra_area_cost_cents: 500,
                    recurring_extra_area_cost_cents: 300,
                },
                initial_clean: InitialCleanPricing {
                    enabled: true,
                    buckets: vec![
                        bucket(7, 1.0, 4900, "Today / 7 days or less (Well maintained)"),
                        bucket(14, 1.0, 4900, "Within 2 weeks (Well maintained)"),
                        bucket(42, 1.75, 6900, "2-6 weeks (It's pretty neglected)"),
                        bucket(999, 2.5, 8900, "Over 6 weeks (Watch your step!)"),
                    ],
                    waivers: FrequencyWaiver::standard_policy(),
                },
                add_ons: vec![
                    add_on(
                        "deodorize",
                        "Enhanced Deodorizing",
                        2500,
                        "Premium odor-neutralizing treatment",
                    ),
                    add_on(
                        "spray-deck",
                        "Spray Deck/Patio",
                        1750,
                        "Pressure wash and clean outdoor surfaces",
                    ),
                    add_on(
                        "divert-takeaway",
                        "Take Away Waste (100% Diversion)",
                        200,
                        "Remove all waste and divert it from landfills to compost",
                    ),
                    add_on(
                        "divert-25",
                        "Waste Diversion (25% Compost)",
                        150,
                        "25% of waste diverted to compost facilities",
                    ),
                    add_on(
                        "divert-50",
                        "Waste Diversion (50% Compost)",
                        100,
                        "50% of waste diverted to compost facilities",
                    ),
                    add_on(
                        "divert-100",
                        "Waste Diversion (100% Compost)",
                        250,
                        "All waste diverted to compost facilities",
                    ),
                    add_on(
                        "litter",
                        "Cat Litter Cleanup",
                        800,
                        "Clean up cat litter from outdoor areas",
                    ),
                ],
            },
            settings: BusinessSettings {
                default_zone_multiplier: 1.0,
                minimum_service_fee_cents: 2000,
            },
        }
    }

    /// The retired fixed-constant estimator expressed as an ordinary tenant document.
    ///
    /// Its yard adders were flat amounts; here they are approximated as multipliers of
    /// the one-dog base price (-$2, +$4, +$8 on $20).
    pub fn legacy_preset() -> Self {
        let defaults = Self::default_preset();
        Self {
            business_id: BusinessId::new("legacy-estimator"),
            business_name: "Legacy estimator".to_string(),
            service_zones: defaults.service_zones,
            base_pricing: BasePricing {
                tiers: vec![
                    tier(1, 2000, None),
                    tier(2, 2400, None),
                    tier(3, 2800, None),
                    tier(4, 3200, Some(200)),
                ],
                frequencies: vec![
                    frequency(Frequency::Weekly, 1.0, 4.0),
                    frequency(Frequency::TwiceWeekly, 0.9, 8.0),
                    frequency(Frequency::BiWeekly, 1.25, 2.0),
                    frequency(Frequency::Monthly, 1.5, 1.0),
                    frequency(Frequency::OneTime, 1.0, 1.0),
                ],
                yard_sizes: vec![
                    yard(YardSize::Small, 0.9, "< 2,500 sq ft"),
                    yard(YardSize::Medium, 1.0, "2,500-5,000 sq ft"),
                    yard(YardSize::Large, 1.2, "5,000-10,000 sq ft"),
                    yard(YardSize::XLarge, 1.4, "> 10,000 sq ft"),
                ],
                area_pricing: AreaPricing {
                    enabled: true,
                    base_areas: 1,
                    extra_area_cost_cents: 500,
                    recurring_extra_area_cost_cents: 500,
                },
                initial_clean: InitialCleanPricing {
                    enabled: true,
                    buckets: vec![
                        bucket(7, 1.0, 4900, "Today / 7 days or less"),
                        bucket(14, 1.0, 4900, "Within 2 weeks"),
                        bucket(30, 1.0, 4900, "15-30 days"),
                        bucket(42, 1.75, 6900, "2-6 weeks"),
                        bucket(60, 1.75, 6900, "31-60 days"),
                        bucket(90, 1.75, 6900, "61-90 days"),
                        bucket(999, 2.5, 8900, "Over 90 days"),
                    ],
                    waivers: FrequencyWaiver::standard_policy(),
                },
                add_ons: vec![add_on(
                    "deodorize",
                    "Deodorize & Sanitize",
                    500,
                    "Odor treatment applied on each visit",
                )],
            },
            settings: defaults.settings,
        }
    }
}

fn zone(zone_id: &str, name: &str, base_multiplier: f64, description: &str) -> ServiceZone {
    ServiceZone {
        zone_id: zone_id.to_string(),
        name: name.to_string(),
        base_multiplier,
        description: description.to_string(),
        serviceable: true,
        zip_codes: Vec::new(),
    }
}

fn tier(dog_count: u32, base_price_cents: u64, extra_dog_price_cents: Option<u64>) -> PricingTier {
    PricingTier {
        dog_count,
        base_price_cents,
        extra_dog_price_cents,
    }
}

fn frequency(frequency: Frequency, multiplier: f64, visits_per_month: f64) -> FrequencyPricing {
    FrequencyPricing {
        frequency,
        multiplier,
        visits_per_month,
    }
}

fn yard(size: YardSize, multiplier: f64, description: &str) -> YardSizePricing {
    YardSizePricing {
        size,
        multiplier,
        description: description.to_string(),
        enabled: true,
    }
}

fn bucket(threshold_days: u32, multiplier: f64, floor_price_cents: u64, label: &str) -> InitialCleanBucket {
    InitialCleanBucket {
        threshold_days,
        multiplier,
        floor_price_cents,
        label: label.to_string(),
    }
}

fn add_on(id: &str, name: &str, price_cents: u64, description: &str) -> AddOnConfig {
    AddOnConfig {
        id: id.to_string(),
        name: name.to_string(),
        price_cents,
        description: description.to_string(),
        available: true,
        billing_mode: BillingMode::EachVisit,
        required: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_satisfy_document_invariants() {
        BusinessConfig::default_preset()
            .validate()
            .expect("default preset valid");
        BusinessConfig::legacy_preset()
            .validate()
            .expect("legacy preset valid");
    }

    #[test]
    fn default_preset_round_trips_through_json() {
        let config = BusinessConfig::default_preset();
        let document = serde_json::to_value(&config).expect("serializes");
        assert_eq!(
            document["basePricing"]["frequencies"][2]["frequency"],
            "bi-weekly"
        );
        let restored: BusinessConfig = serde_json::from_value(document).expect("deserializes");
        assert_eq!(restored, config);
    }
}
