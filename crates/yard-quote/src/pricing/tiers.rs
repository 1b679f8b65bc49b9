use super::business::{ConfigurationError, PricingTier};

/// Base price for `dogs`, extrapolating past the highest tier when it allows.
pub fn resolve_base_price(dogs: u32, tiers: &[PricingTier]) -> Result<u64, ConfigurationError> {
    let mut ordered: Vec<&PricingTier> = tiers.iter().collect();
    ordered.sort_by_key(|tier| tier.dog_count);

    let position = ordered
        .iter()
        .rposition(|tier| tier.dog_count <= dogs)
        .ok_or(ConfigurationError::NoTierForDogs { dogs })?;
    let tier = ordered[position];
    let is_highest = position + 1 == ordered.len();

    match tier.extra_dog_price_cents {
        Some(extra) if is_highest && dogs > tier.dog_count => u64::from(dogs - tier.dog_count)
            .checked_mul(extra)
            .and_then(|extra_cents| extra_cents.checked_add(tier.base_price_cents))
            .ok_or(ConfigurationError::AmountOverflow("base price")),
        _ => Ok(tier.base_price_cents),
    }
}
