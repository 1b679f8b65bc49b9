use serde::{Deserialize, Serialize};

use super::addons::AddOnLine;
use super::business::ConfigurationError;

/// Every factor used to reach the per-visit figure, for audit and display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingBreakdown {
    #[serde(rename = "basePrice")]
    pub base_price_cents: u64,
    pub add_on_cents: u64,
    pub areas_cost_cents: u64,
    pub extra_areas: u32,
    pub base_cost_cents: u64,
    pub yard_multiplier: f64,
    pub zone_multiplier: f64,
    /// Reported as 1 for one-time service.
    pub frequency_multiplier: f64,
    pub total_multiplier: f64,
}

/// Initial-clean line after bucket selection and the cadence waiver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialCleanQuote {
    pub threshold_days: u32,
    pub label: String,
    pub multiplier: f64,
    pub floor_price_cents: u64,
    pub raw_cents: u64,
    pub discount_percent: u8,
    pub discount_cents: u64,
    pub charged_cents: u64,
}

/// What the customer pays at the first visit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirstVisitCharge {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_clean: Option<InitialCleanQuote>,
    pub add_ons: Vec<AddOnLine>,
    pub add_on_cents: u64,
    pub total_cents: u64,
}

/// Deterministic output of a single calculation, in cents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingResult {
    pub per_visit_cents: u64,
    pub monthly_cents: u64,
    pub one_time_cents: u64,
    pub visits_per_month: f64,
    pub breakdown: PricingBreakdown,
    pub add_ons_breakdown: Vec<AddOnLine>,
    pub first_visit: FirstVisitCharge,
}

/// Round a floating intermediate to whole cents, half away from zero.
pub(crate) fn round_cents(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.round() as u64
    } else {
        0
    }
}

/// Add up cent amounts, reporting overflow against `what` instead of wrapping.
pub(crate) fn sum_cents<I>(amounts: I, what: &'static str) -> Result<u64, ConfigurationError>
where
    I: IntoIterator<Item = u64>,
{
    amounts
        .into_iter()
        .try_fold(0u64, |total, amount| total.checked_add(amount))
        .ok_or(ConfigurationError::AmountOverflow(what))
}

/// Render cents as US dollars, e.g. `$1,234.56`.
pub fn format_cents(cents: u64) -> String {
    let dollars = (cents / 100).to_string();
    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (index, digit) in dollars.chars().enumerate() {
        if index > 0 && (dollars.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    format!("${grouped}.{:02}", cents % 100)
}
