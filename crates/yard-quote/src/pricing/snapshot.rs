use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{BusinessId, PricingCalculationInput};
use super::result::{format_cents, PricingResult};
use super::service::Quote;

/// Pricing snapshot stored on a lead so a quote can be re-sent without recomputing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSnapshot {
    pub business_id: BusinessId,
    pub calculated_at: DateTime<Utc>,
    pub input: PricingCalculationInput,
    pub result: PricingResult,
}

impl QuoteSnapshot {
    pub fn capture(quote: &Quote, calculated_at: DateTime<Utc>) -> Self {
        Self {
            business_id: quote.business_id.clone(),
            calculated_at,
            input: quote.input.clone(),
            result: quote.result.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// Plain-text itemization shared by the CLI and quote e-mails.
#[derive(Debug, Clone, Copy)]
pub struct QuoteSummary<'a> {
    business_name: &'a str,
    input: &'a PricingCalculationInput,
    result: &'a PricingResult,
}

impl<'a> QuoteSummary<'a> {
    pub fn new(
        business_name: &'a str,
        input: &'a PricingCalculationInput,
        result: &'a PricingResult,
    ) -> Self {
        Self {
            business_name,
            input,
            result,
        }
    }

    pub fn from_quote(quote: &'a Quote) -> Self {
        Self::new(&quote.business_name, &quote.input, &quote.result)
    }

    pub fn from_snapshot(business_name: &'a str, snapshot: &'a QuoteSnapshot) -> Self {
        Self::new(business_name, &snapshot.input, &snapshot.result)
    }

    pub fn lines(&self) -> Vec<String> {
        let input = self.input;
        let result = self.result;
        let breakdown = &result.breakdown;
        let dogs = if input.dogs == 1 { "dog" } else { "dogs" };

        let mut lines = vec![
            format!(
                "{} quote: {} {dogs}, {} yard, {}",
                self.business_name,
                input.dogs,
                input.yard_size,
                input.frequency.label()
            ),
            format!("Base service: {}", format_cents(breakdown.base_price_cents)),
        ];

        for line in &result.add_ons_breakdown {
            lines.push(format!(
                "  + {} ({}): {}",
                line.name,
                line.billing_mode,
                format_cents(line.price_cents)
            ));
        }
        if breakdown.extra_areas > 0 {
            let noun = if breakdown.extra_areas == 1 { "area" } else { "areas" };
            lines.push(format!(
                "  + {} extra {noun}: {}",
                breakdown.extra_areas,
                format_cents(breakdown.areas_cost_cents)
            ));
        }
        lines.push(format!(
            "  x {:.2} (yard {:.2}, zone {:.2}, frequency {:.2})",
            breakdown.total_multiplier,
            breakdown.yard_multiplier,
            breakdown.zone_multiplier,
            breakdown.frequency_multiplier
        ));
        lines.push(format!("Per visit: {}", format_cents(result.per_visit_cents)));

        if input.frequency.is_recurring() {
            lines.push(format!(
                "Monthly (~{:.2} visits): {}",
                result.visits_per_month,
                format_cents(result.monthly_cents)
            ));
        }

        let first_visit = &result.first_visit;
        if let Some(initial) = &first_visit.initial_clean {
            lines.push(format!(
                "Initial clean ({}): {}",
                initial.label,
                format_cents(initial.raw_cents)
            ));
            if initial.discount_cents > 0 {
                lines.push(format!(
                    "  - {}% waived: -{}",
                    initial.discount_percent,
                    format_cents(initial.discount_cents)
                ));
            }
        }
        for line in &first_visit.add_ons {
            lines.push(format!(
                "  + {} (first visit): {}",
                line.name,
                format_cents(line.price_cents)
            ));
        }
        lines.push(format!(
            "First visit total: {}",
            format_cents(first_visit.total_cents)
        ));

        lines
    }

    pub fn render(&self) -> String {
        self.lines().join("\n")
    }
}
