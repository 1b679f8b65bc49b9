use super::addons::AddOnLine;
use super::business::{ConfigurationError, FrequencyWaiver, InitialCleanBucket, InitialCleanPricing};
use super::domain::Frequency;
use super::result::{round_cents, sum_cents, FirstVisitCharge, InitialCleanQuote};

/// Smallest threshold at or above `days`; the highest bucket catches everything past it.
pub fn select_bucket(days: u32, buckets: &[InitialCleanBucket]) -> Option<&InitialCleanBucket> {
    let mut ordered: Vec<&InitialCleanBucket> = buckets.iter().collect();
    ordered.sort_by_key(|bucket| bucket.threshold_days);

    ordered
        .iter()
        .copied()
        .find(|bucket| bucket.threshold_days >= days)
        .or_else(|| ordered.last().copied())
}

/// Percentage of the initial clean waived for `frequency`; unlisted cadences pay in full.
pub fn waiver_percent(frequency: Frequency, waivers: &[FrequencyWaiver]) -> u8 {
    waivers
        .iter()
        .find(|waiver| waiver.frequency == frequency)
        .map(|waiver| waiver.discount_percent.min(100))
        .unwrap_or(0)
}

pub fn quote_initial_clean(
    per_visit_cents: u64,
    days_since_last_cleanup: u32,
    pricing: &InitialCleanPricing,
    frequency: Frequency,
) -> Result<InitialCleanQuote, ConfigurationError> {
    let bucket = select_bucket(days_since_last_cleanup, &pricing.buckets)
        .ok_or(ConfigurationError::NoInitialCleanBuckets)?;

    let scaled = round_cents(per_visit_cents as f64 * bucket.multiplier);
    let raw_cents = scaled.max(bucket.floor_price_cents);
    let discount_percent = waiver_percent(frequency, &pricing.waivers);
    let discount_cents = raw_cents
        .checked_mul(u64::from(discount_percent))
        .and_then(|scaled| scaled.checked_add(50))
        .map(|scaled| scaled / 100)
        .ok_or(ConfigurationError::AmountOverflow("initial clean discount"))?;

    Ok(InitialCleanQuote {
        threshold_days: bucket.threshold_days,
        label: bucket.label.clone(),
        multiplier: bucket.multiplier,
        floor_price_cents: bucket.floor_price_cents,
        raw_cents,
        discount_percent,
        discount_cents,
        charged_cents: raw_cents - discount_cents,
    })
}

/// Total owed at the first visit.
///
/// With the initial clean disabled this is the single-visit price plus any deferred
/// up-front add-ons.
pub fn first_visit_charge(
    per_visit_cents: u64,
    one_time_cents: u64,
    days_since_last_cleanup: u32,
    pricing: &InitialCleanPricing,
    frequency: Frequency,
    up_front_add_ons: &[AddOnLine],
) -> Result<FirstVisitCharge, ConfigurationError> {
    let add_on_cents = sum_cents(
        up_front_add_ons.iter().map(|line| line.price_cents),
        "first-visit add-on total",
    )?;

    if !pricing.enabled {
        return Ok(FirstVisitCharge {
            initial_clean: None,
            add_ons: up_front_add_ons.to_vec(),
            add_on_cents,
            total_cents: sum_cents([one_time_cents, add_on_cents], "first visit total")?,
        });
    }

    let initial_clean =
        quote_initial_clean(per_visit_cents, days_since_last_cleanup, pricing, frequency)?;
    let total_cents = sum_cents([initial_clean.charged_cents, add_on_cents], "first visit total")?;

    Ok(FirstVisitCharge {
        initial_clean: Some(initial_clean),
        add_ons: up_front_add_ons.to_vec(),
        add_on_cents,
        total_cents,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::business::BusinessConfig;
    use crate::pricing::domain::BillingMode;

    fn pricing() -> InitialCleanPricing {
        BusinessConfig::default_preset().base_pricing.initial_clean
    }

    #[test]
    fn buckets_resolve_to_nearest_threshold_at_or_above() {
        let pricing = pricing();
        let pick = |days| select_bucket(days, &pricing.buckets).map(|bucket| bucket.threshold_days);
        assert_eq!(pick(0), Some(7));
        assert_eq!(pick(7), Some(7));
        assert_eq!(pick(8), Some(14));
        assert_eq!(pick(10), Some(14));
        assert_eq!(pick(43), Some(999));
        assert_eq!(pick(5000), Some(999));
        assert_eq!(select_bucket(3, &[]), None);
    }

    #[test]
    fn unordered_buckets_are_sorted_before_matching() {
        let mut pricing = pricing();
        pricing.buckets.reverse();
        let bucket = select_bucket(20, &pricing.buckets).expect("bucket");
        assert_eq!(bucket.threshold_days, 42);
    }

    #[test]
    fn floor_applies_when_scaled_price_is_low() {
        let quote = quote_initial_clean(2500, 10, &pricing(), Frequency::OneTime).expect("quote");
        assert_eq!(quote.raw_cents, 4900);
        assert_eq!(quote.discount_percent, 0);
        assert_eq!(quote.charged_cents, 4900);
    }

    #[test]
    fn multiplier_applies_above_floor() {
        let quote = quote_initial_clean(6000, 30, &pricing(), Frequency::OneTime).expect("quote");
        assert_eq!(quote.threshold_days, 42);
        assert_eq!(quote.raw_cents, 10500);
    }

    #[test]
    fn recurring_cadences_waive_the_initial_clean() {
        for frequency in [Frequency::Weekly, Frequency::BiWeekly, Frequency::TwiceWeekly] {
            let quote = quote_initial_clean(3600, 10, &pricing(), frequency).expect("quote");
            assert_eq!(quote.raw_cents, 4900);
            assert_eq!(quote.discount_cents, 4900);
            assert_eq!(quote.charged_cents, 0);
        }

        let monthly = quote_initial_clean(3600, 60, &pricing(), Frequency::Monthly).expect("quote");
        assert_eq!(monthly.raw_cents, 9000);
        assert_eq!(monthly.charged_cents, 4500);
    }

    #[test]
    fn half_cent_discounts_round_up() {
        let mut pricing = pricing();
        pricing.buckets = vec![InitialCleanBucket {
            threshold_days: 999,
            multiplier: 1.0,
            floor_price_cents: 4901,
            label: String::new(),
        }];
        let quote = quote_initial_clean(0, 1, &pricing, Frequency::Monthly).expect("quote");
        assert_eq!(quote.discount_cents, 2451);
        assert_eq!(quote.charged_cents, 2450);
    }

    #[test]
    fn deferred_add_ons_stay_payable_after_waiver() {
        let add_ons = vec![AddOnLine {
            id: "deodorize".to_string(),
            name: "Enhanced Deodorizing".to_string(),
            billing_mode: BillingMode::FirstVisit,
            price_cents: 2500,
        }];
        let charge =
            first_visit_charge(3600, 3600, 10, &pricing(), Frequency::Weekly, &add_ons).expect("charge");
        assert_eq!(charge.initial_clean.map(|quote| quote.charged_cents), Some(0));
        assert_eq!(charge.add_on_cents, 2500);
        assert_eq!(charge.total_cents, 2500);
    }

    #[test]
    fn disabled_initial_clean_bills_a_single_visit() {
        let mut pricing = pricing();
        pricing.enabled = false;
        let charge = first_visit_charge(1800, 3600, 90, &pricing, Frequency::BiWeekly, &[]).expect("charge");
        assert!(charge.initial_clean.is_none());
        assert_eq!(charge.total_cents, 3600);
    }

    #[test]
    fn enabled_without_buckets_is_a_configuration_error() {
        let mut pricing = pricing();
        pricing.buckets.clear();
        assert_eq!(
            quote_initial_clean(3600, 3, &pricing, Frequency::Weekly),
            Err(ConfigurationError::NoInitialCleanBuckets)
        );
    }

    #[test]
    fn oversized_floor_price_is_a_configuration_error() {
        let mut pricing = pricing();
        for bucket in &mut pricing.buckets {
            bucket.floor_price_cents = u64::MAX;
        }
        assert_eq!(
            quote_initial_clean(3600, 10, &pricing, Frequency::Monthly),
            Err(ConfigurationError::AmountOverflow("initial clean discount"))
        );
    }
}
