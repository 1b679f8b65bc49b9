use serde::Serialize;
use yard_quote::config::{AppConfig, PricingSettings};
use yard_quote::error::AppError;
use yard_quote::pricing::{
    AddOnSelection, AreaSelection, BusinessId, ConfigStore, QuoteRequest, QuoteServiceError,
    QuoteSummary, SelectionMap,
};

use crate::cli::{ExportArgs, QuoteArgs, StoreArgs};
use crate::infra::quote_service;

pub(crate) fn run_quote(args: QuoteArgs) -> Result<(), AppError> {
    let settings = pricing_settings(&args.store)?;
    let service = quote_service(&settings);
    let json = args.json;
    let request = quote_request(args);

    let quote = service.quote(&request)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&quote)?);
        return Ok(());
    }

    for line in QuoteSummary::from_quote(&quote).lines() {
        println!("{line}");
    }
    for warning in &quote.warnings {
        println!("warning: {}", warning);
    }
    if !quote.meets_minimum {
        println!("warning: quote is below {}'s minimum service fee", quote.business_name);
    }
    Ok(())
}

pub(crate) fn run_config_export(args: ExportArgs) -> Result<(), AppError> {
    let settings = pricing_settings(&args.store)?;
    let service = quote_service(&settings);
    let business_id = args
        .business
        .map(BusinessId::new)
        .unwrap_or_else(|| settings.default_business.clone());

    let resolved = service.config(&business_id);
    println!("{}", serde_json::to_string_pretty(&resolved)?);
    Ok(())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StoredBusinesses {
    default_business: BusinessId,
    businesses: Vec<BusinessId>,
}

pub(crate) fn run_config_list(args: StoreArgs) -> Result<(), AppError> {
    let settings = pricing_settings(&args)?;
    let service = quote_service(&settings);
    let businesses = service
        .provider()
        .store()
        .list()
        .map_err(QuoteServiceError::from)?;

    let listing = StoredBusinesses {
        default_business: settings.default_business,
        businesses,
    };
    println!("{}", serde_json::to_string_pretty(&listing)?);
    Ok(())
}

fn pricing_settings(store: &StoreArgs) -> Result<PricingSettings, AppError> {
    let mut settings = AppConfig::load()?.pricing;
    if let Some(dir) = store.config_dir.clone() {
        settings.config_dir = Some(dir);
    }
    Ok(settings)
}

/// Translate command-line flags into the same request shape the HTTP API accepts.
pub(crate) fn quote_request(args: QuoteArgs) -> QuoteRequest {
    let add_ons: SelectionMap<AddOnSelection> = args.add_ons.into_iter().collect();
    let areas_to_clean: SelectionMap<AreaSelection> = args
        .areas
        .into_iter()
        .map(|area| (area, AreaSelection::Flag(true)))
        .collect();

    QuoteRequest {
        business_id: args.business,
        dogs: Some(args.dogs),
        yard_size: Some(args.yard_size),
        frequency: Some(args.frequency),
        add_ons,
        areas_to_clean,
        zone_multiplier: args.zone_multiplier,
        zip_code: args.zip,
        days_since_last_cleanup: args.days_since_cleanup,
        last_cleaned_on: args.last_cleaned_on,
        today: args.today,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yard_quote::pricing::BillingMode;

    fn args() -> QuoteArgs {
        QuoteArgs {
            business: None,
            dogs: 2,
            yard_size: "large".to_string(),
            frequency: "weekly".to_string(),
            add_ons: vec![
                ("deodorize".to_string(), AddOnSelection::SelectedDefault),
                (
                    "spray-deck".to_string(),
                    AddOnSelection::SelectedWithMode(BillingMode::EveryOther),
                ),
            ],
            areas: vec!["front".to_string(), "back".to_string()],
            zip: None,
            zone_multiplier: None,
            days_since_cleanup: Some(3),
            last_cleaned_on: None,
            today: None,
            json: false,
            store: StoreArgs::default(),
        }
    }

    #[test]
    fn flags_become_a_quote_request() {
        let request = quote_request(args());
        assert_eq!(request.dogs, Some(2));
        assert_eq!(
            request.add_ons.get("spray-deck"),
            Some(&AddOnSelection::SelectedWithMode(BillingMode::EveryOther))
        );
        assert_eq!(
            request.add_ons.get("deodorize"),
            Some(&AddOnSelection::SelectedDefault)
        );
        assert_eq!(request.areas_to_clean.len(), 2);
        assert_eq!(request.days_since_last_cleanup, Some(3));
    }

    #[test]
    fn cli_request_prices_like_the_http_api() {
        let service = quote_service(&PricingSettings {
            config_dir: None,
            default_business: BusinessId::new("yardura"),
            fetch_attempts: 1,
        });
        let mut args = args();
        args.add_ons.clear();
        args.areas.clear();

        let quote = service.quote(&quote_request(args)).expect("quote priced");
        assert_eq!(quote.result.per_visit_cents, 3600);
        assert_eq!(quote.result.monthly_cents, 15588);
    }
}
