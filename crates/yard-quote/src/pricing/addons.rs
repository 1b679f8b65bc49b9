use serde::{Deserialize, Serialize};

use super::business::{AddOnConfig, ConfigurationError};
use super::domain::{AddOnSelection, BillingMode, Frequency, SelectionMap};
use super::result::sum_cents;

/// Priced add-on line shown in quote summaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddOnLine {
    pub id: String,
    pub name: String,
    pub billing_mode: BillingMode,
    pub price_cents: u64,
}

/// Add-on charges split by when they are billed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddOnCharges {
    /// Lines folded into every visit's price.
    pub per_visit: Vec<AddOnLine>,
    /// Up-front lines deferred to the first visit of a recurring plan.
    pub first_visit_only: Vec<AddOnLine>,
    /// Selected ids the tenant does not offer.
    pub unrecognized: Vec<String>,
}

impl AddOnCharges {
    pub fn per_visit_cents(&self) -> Result<u64, ConfigurationError> {
        sum_cents(self.per_visit.iter().map(|line| line.price_cents), "add-on total")
    }

    pub fn first_visit_only_cents(&self) -> Result<u64, ConfigurationError> {
        sum_cents(
            self.first_visit_only.iter().map(|line| line.price_cents),
            "first-visit add-on total",
        )
    }

    fn push(&mut self, config: &AddOnConfig, mode: BillingMode, frequency: Frequency) {
        let line = |price_cents| AddOnLine {
            id: config.id.clone(),
            name: config.name.clone(),
            billing_mode: mode,
            price_cents,
        };

        if mode.is_up_front() && frequency.is_recurring() {
            self.first_visit_only.push(line(config.price_cents));
        } else if mode == BillingMode::EveryOther {
            self.per_visit.push(line(half_rounded(config.price_cents)));
        } else {
            self.per_visit.push(line(config.price_cents));
        }
    }
}

/// Price the caller's add-on selections against the tenant catalog.
///
/// Lines follow the caller's selection order; required add-ons the caller left out
/// are appended afterwards using their configured mode.
pub fn price_add_ons(
    selections: &SelectionMap<AddOnSelection>,
    catalog: &[AddOnConfig],
    frequency: Frequency,
) -> AddOnCharges {
    let mut charges = AddOnCharges::default();

    for (id, selection) in selections.iter() {
        if !selection.is_selected() {
            continue;
        }
        let Some(config) = catalog.iter().find(|addon| addon.id == id) else {
            charges.unrecognized.push(id.to_string());
            continue;
        };
        if !config.available {
            continue;
        }
        if let Some(mode) = selection.effective_mode(config.billing_mode) {
            charges.push(config, mode, frequency);
        }
    }

    for config in catalog.iter().filter(|addon| addon.required && addon.available) {
        let chosen = selections
            .get(&config.id)
            .map(|selection| selection.is_selected())
            .unwrap_or(false);
        if !chosen {
            charges.push(config, config.billing_mode, frequency);
        }
    }

    charges
}

/// Alternating-visit average, rounding half a cent up.
fn half_rounded(price_cents: u64) -> u64 {
    price_cents / 2 + price_cents % 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::business::BusinessConfig;

    fn catalog() -> Vec<AddOnConfig> {
        BusinessConfig::default_preset().base_pricing.add_ons
    }

    #[test]
    fn every_other_bills_half_rounded_up() {
        let selections: SelectionMap<AddOnSelection> = [(
            "spray-deck",
            AddOnSelection::SelectedWithMode(BillingMode::EveryOther),
        )]
        .into_iter()
        .collect();

        let charges = price_add_ons(&selections, &catalog(), Frequency::Weekly);
        assert_eq!(charges.per_visit_cents(), Ok(875));
        assert_eq!(charges.per_visit[0].billing_mode, BillingMode::EveryOther);
        assert_eq!(half_rounded(1751), 876);
    }

    #[test]
    fn up_front_modes_are_deferred_on_recurring_plans() {
        let selections: SelectionMap<AddOnSelection> = [
            (
                "deodorize",
                AddOnSelection::SelectedWithMode(BillingMode::FirstVisit),
            ),
            (
                "spray-deck",
                AddOnSelection::SelectedWithMode(BillingMode::OneTime),
            ),
        ]
        .into_iter()
        .collect();

        let recurring = price_add_ons(&selections, &catalog(), Frequency::Monthly);
        assert_eq!(recurring.per_visit_cents(), Ok(0));
        assert_eq!(recurring.first_visit_only_cents(), Ok(4250));

        let one_time = price_add_ons(&selections, &catalog(), Frequency::OneTime);
        assert_eq!(one_time.per_visit_cents(), Ok(4250));
        assert!(one_time.first_visit_only.is_empty());
    }

    #[test]
    fn unknown_unavailable_and_unselected_entries_are_skipped() {
        let mut catalog = catalog();
        if let Some(litter) = catalog.iter_mut().find(|addon| addon.id == "litter") {
            litter.available = false;
        }
        let selections: SelectionMap<AddOnSelection> = [
            ("hot-tub", AddOnSelection::SelectedDefault),
            ("litter", AddOnSelection::SelectedDefault),
            ("deodorize", AddOnSelection::Unselected),
            ("divert-50", AddOnSelection::SelectedDefault),
        ]
        .into_iter()
        .collect();

        let charges = price_add_ons(&selections, &catalog, Frequency::Weekly);
        assert_eq!(charges.unrecognized, vec!["hot-tub".to_string()]);
        assert_eq!(charges.per_visit.len(), 1);
        assert_eq!(charges.per_visit[0].id, "divert-50");
    }

    #[test]
    fn lines_follow_selection_order() {
        let selections: SelectionMap<AddOnSelection> = [
            ("litter", AddOnSelection::SelectedDefault),
            ("deodorize", AddOnSelection::SelectedDefault),
            ("divert-25", AddOnSelection::SelectedDefault),
        ]
        .into_iter()
        .collect();

        let charges = price_add_ons(&selections, &catalog(), Frequency::Weekly);
        let ids: Vec<&str> = charges.per_visit.iter().map(|line| line.id.as_str()).collect();
        assert_eq!(ids, vec!["litter", "deodorize", "divert-25"]);
        assert_eq!(charges.per_visit_cents(), Ok(800 + 2500 + 150));
    }

    #[test]
    fn required_add_ons_are_always_billed() {
        let mut catalog = catalog();
        if let Some(takeaway) = catalog.iter_mut().find(|addon| addon.id == "divert-takeaway") {
            takeaway.required = true;
        }
        let selections: SelectionMap<AddOnSelection> =
            [("divert-takeaway", AddOnSelection::Unselected)].into_iter().collect();

        let charges = price_add_ons(&selections, &catalog, Frequency::Weekly);
        assert_eq!(charges.per_visit_cents(), Ok(200));
    }
}
