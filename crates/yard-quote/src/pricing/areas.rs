use serde::{Deserialize, Serialize};

use super::business::{AreaPricing, ConfigurationError};
use super::domain::{AreaSelection, Frequency, SelectionMap};

/// Cost of service areas beyond the tenant's free allowance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaCharge {
    pub selected_areas: u32,
    pub extra_areas: u32,
    pub unit_cost_cents: u64,
    pub total_cents: u64,
}

pub fn extra_area_charge(
    areas: &SelectionMap<AreaSelection>,
    pricing: &AreaPricing,
    frequency: Frequency,
) -> Result<AreaCharge, ConfigurationError> {
    let selected_areas = areas.iter().filter(|(_, area)| area.is_selected()).count() as u32;
    if !pricing.enabled || selected_areas == 0 {
        return Ok(AreaCharge {
            selected_areas,
            ..AreaCharge::default()
        });
    }

    let extra_areas = selected_areas.saturating_sub(pricing.base_areas);
    let unit_cost_cents = if frequency.is_recurring() {
        pricing.recurring_extra_area_cost_cents
    } else {
        pricing.extra_area_cost_cents
    };

    let total_cents = u64::from(extra_areas)
        .checked_mul(unit_cost_cents)
        .ok_or(ConfigurationError::AmountOverflow("extra area cost"))?;

    Ok(AreaCharge {
        selected_areas,
        extra_areas,
        unit_cost_cents,
        total_cents,
    })
}
