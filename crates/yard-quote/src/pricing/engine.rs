use tracing::debug;

use super::addons::price_add_ons;
use super::areas::extra_area_charge;
use super::business::{BusinessConfig, BusinessSettings, ConfigurationError};
use super::domain::{Frequency, PricingCalculationInput};
use super::initial_clean::first_visit_charge;
use super::multipliers::{frequency_pricing, yard_multiplier, zone_multiplier};
use super::result::{round_cents, sum_cents, PricingBreakdown, PricingResult};
use super::tiers::resolve_base_price;

/// Stateless calculator bound to one tenant's configuration snapshot.
#[derive(Debug, Clone)]
pub struct PricingEngine {
    config: BusinessConfig,
}

impl PricingEngine {
    pub fn new(config: BusinessConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BusinessConfig {
        &self.config
    }

    pub fn calculate(
        &self,
        input: &PricingCalculationInput,
    ) -> Result<PricingResult, ConfigurationError> {
        calculate_pricing(input, &self.config)
    }
}

/// Price `input` against `config`.
///
/// Each of per-visit, one-time and monthly is rounded exactly once from its own
/// unrounded product.
pub fn calculate_pricing(
    input: &PricingCalculationInput,
    config: &BusinessConfig,
) -> Result<PricingResult, ConfigurationError> {
    let pricing = &config.base_pricing;
    let frequency = input.frequency;

    let base_price_cents = resolve_base_price(input.dogs, &pricing.tiers)?;
    let yard_multiplier = yard_multiplier(config, input.yard_size)?;
    let cadence = frequency_pricing(config, frequency)?;
    let zone_multiplier = zone_multiplier(input.zone_multiplier);

    let add_ons = price_add_ons(&input.add_ons, &pricing.add_ons, frequency);
    let areas = extra_area_charge(&input.areas_to_clean, &pricing.area_pricing, frequency)?;

    let add_on_cents = add_ons.per_visit_cents()?;
    let base_cost_cents = sum_cents([base_price_cents, add_on_cents, areas.total_cents], "base cost")?;
    let yard_zone_factor = yard_multiplier * zone_multiplier;
    let single_visit = base_cost_cents as f64 * yard_zone_factor;

    let (per_visit_cents, one_time_cents, monthly_cents, frequency_multiplier) = match frequency {
        Frequency::OneTime => {
            let per_visit_cents = round_cents(single_visit);
            (per_visit_cents, per_visit_cents, 0, 1.0)
        }
        _ => {
            let per_visit = single_visit * cadence.multiplier;
            (
                round_cents(per_visit),
                round_cents(single_visit),
                round_cents(per_visit * cadence.visits_per_month),
                cadence.multiplier,
            )
        }
    };

    let first_visit = first_visit_charge(
        per_visit_cents,
        one_time_cents,
        input.days_since_last_cleanup.unwrap_or(0),
        &pricing.initial_clean,
        frequency,
        &add_ons.first_visit_only,
    )?;

    debug!(
        business_id = %config.business_id,
        dogs = input.dogs,
        yard_size = %input.yard_size,
        %frequency,
        base_cost_cents,
        yard_zone_factor,
        frequency_multiplier,
        per_visit_cents,
        monthly_cents,
        one_time_cents,
        first_visit_cents = first_visit.total_cents,
        "priced quote"
    );

    Ok(PricingResult {
        per_visit_cents,
        monthly_cents,
        one_time_cents,
        visits_per_month: cadence.visits_per_month,
        breakdown: PricingBreakdown {
            base_price_cents,
            add_on_cents,
            areas_cost_cents: areas.total_cents,
            extra_areas: areas.extra_areas,
            base_cost_cents,
            yard_multiplier,
            zone_multiplier,
            frequency_multiplier,
            total_multiplier: yard_zone_factor * frequency_multiplier,
        },
        add_ons_breakdown: add_ons.per_visit,
        first_visit,
    })
}

/// Whether a priced quote reaches the tenant's minimum service fee.
///
/// One-time visits compare the single-visit price; recurring plans compare the
/// per-visit price after the cadence multiplier.
pub fn meets_minimum_service_fee(
    result: &PricingResult,
    frequency: Frequency,
    settings: &BusinessSettings,
) -> bool {
    let charged_cents = if frequency.is_recurring() {
        result.per_visit_cents
    } else {
        result.one_time_cents
    };
    charged_cents >= settings.minimum_service_fee_cents
}
