use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::business::BusinessConfig;
use super::domain::{
    AddOnSelection, AreaSelection, BusinessId, Frequency, PricingCalculationInput, SelectionMap,
    YardSize,
};
use super::validation::{
    check_zone_multiplier, validate_input, FieldError, ValidationErrors, ValidationReport,
};
use super::zones::{is_zip_serviceable, zone_multiplier_for_zip};

/// Quote request as posted by a quote form, before any field is trusted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_id: Option<String>,
    #[serde(default)]
    pub dogs: Option<i64>,
    #[serde(default)]
    pub yard_size: Option<String>,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub add_ons: SelectionMap<AddOnSelection>,
    #[serde(default)]
    pub areas_to_clean: SelectionMap<AreaSelection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_multiplier: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_since_last_cleanup: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_cleaned_on: Option<NaiveDate>,
    /// Reference date for `last_cleaned_on`; the current UTC date when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub today: Option<NaiveDate>,
}

impl QuoteRequest {
    pub fn new(dogs: i64, yard_size: &str, frequency: &str) -> Self {
        Self {
            dogs: Some(dogs),
            yard_size: Some(yard_size.to_string()),
            frequency: Some(frequency.to_string()),
            ..Self::default()
        }
    }

    /// Build the typed input, returning warnings alongside it or every field error.
    pub fn to_input(
        &self,
        business_id: &BusinessId,
        config: &BusinessConfig,
    ) -> Result<(PricingCalculationInput, Vec<FieldError>), ValidationErrors> {
        let (input, report) = self.parse(business_id, config);
        let warnings = report.into_result()?;
        match input {
            Some(input) => Ok((input, warnings)),
            None => Err(ValidationErrors {
                errors: vec![FieldError::new("request", "Quote request is incomplete")],
            }),
        }
    }

    /// Typed input when every field parses, plus each error and warning against `config`.
    pub(crate) fn parse(
        &self,
        business_id: &BusinessId,
        config: &BusinessConfig,
    ) -> (Option<PricingCalculationInput>, ValidationReport) {
        let mut report = ValidationReport::default();

        let dogs = match self.dogs {
            None => {
                report
                    .errors
                    .push(FieldError::new("dogs", "Number of dogs is required"));
                None
            }
            Some(value) if value < 1 => {
                report
                    .errors
                    .push(FieldError::new("dogs", "Number of dogs must be at least 1"));
                None
            }
            Some(value) => match u32::try_from(value) {
                Ok(dogs) => Some(dogs),
                Err(_) => {
                    report
                        .errors
                        .push(FieldError::new("dogs", "Number of dogs is out of range"));
                    None
                }
            },
        };

        let yard_size = parse_key::<YardSize>("yardSize", self.yard_size.as_deref(), &mut report);
        let frequency = parse_key::<Frequency>("frequency", self.frequency.as_deref(), &mut report);

        check_zone_multiplier(self.zone_multiplier, &mut report);
        let zone_multiplier = self.resolve_zone_multiplier(config, &mut report);
        let days_since_last_cleanup = self.resolve_days(&mut report);

        let (Some(dogs), Some(yard_size), Some(frequency)) = (dogs, yard_size, frequency) else {
            return (None, report);
        };

        let input = PricingCalculationInput {
            business_id: business_id.clone(),
            dogs,
            yard_size,
            frequency,
            add_ons: self.add_ons.clone(),
            areas_to_clean: self.areas_to_clean.clone(),
            zone_multiplier,
            days_since_last_cleanup,
        };

        let mut config_report = validate_input(&input, config);
        // zone multiplier was already checked above
        config_report
            .errors
            .retain(|error| error.field != "zoneMultiplier");
        report.merge(config_report);
        (Some(input), report)
    }

    /// An explicit multiplier wins; otherwise the ZIP code's zone supplies one.
    fn resolve_zone_multiplier(
        &self,
        config: &BusinessConfig,
        report: &mut ValidationReport,
    ) -> Option<f64> {
        let zip = self
            .zip_code
            .as_deref()
            .map(str::trim)
            .filter(|zip| !zip.is_empty());

        if let Some(zip) = zip {
            if !is_zip_serviceable(config, zip) {
                report.errors.push(FieldError::new(
                    "zipCode",
                    format!("ZIP code {zip} is outside the service area"),
                ));
            }
        }

        match (self.zone_multiplier, zip) {
            (Some(multiplier), _) => Some(multiplier),
            (None, Some(zip)) => Some(zone_multiplier_for_zip(config, zip)),
            (None, None) => None,
        }
    }

    fn resolve_days(&self, report: &mut ValidationReport) -> Option<u32> {
        if let Some(days) = self.days_since_last_cleanup {
            return Some(days);
        }
        let last_cleaned = self.last_cleaned_on?;
        let today = self.today.unwrap_or_else(|| Utc::now().date_naive());
        let elapsed = today.signed_duration_since(last_cleaned).num_days();
        if elapsed < 0 {
            report.errors.push(FieldError::new(
                "lastCleanedOn",
                "Last cleanup date cannot be in the future",
            ));
            return None;
        }
        Some(u32::try_from(elapsed).unwrap_or(u32::MAX))
    }
}

fn parse_key<T>(field: &str, raw: Option<&str>, report: &mut ValidationReport) -> Option<T>
where
    T: std::str::FromStr<Err = super::domain::UnknownKey>,
{
    let Some(raw) = raw.filter(|value| !value.trim().is_empty()) else {
        report
            .errors
            .push(FieldError::new(field, format!("{field} is required")));
        return None;
    };
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(error) => {
            report.errors.push(FieldError::new(field, error.to_string()));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yardura() -> (BusinessId, BusinessConfig) {
        let mut config = BusinessConfig::default_preset();
        config.service_zones[0].zip_codes = vec!["50309".to_string()];
        (config.business_id.clone(), config)
    }

    #[test]
    fn collects_every_field_error_at_once() {
        let (id, config) = yardura();
        let request = QuoteRequest {
            dogs: Some(0),
            yard_size: Some("huge".to_string()),
            frequency: None,
            zone_multiplier: Some(-1.0),
            ..QuoteRequest::default()
        };

        let errors = request.to_input(&id, &config).expect_err("invalid request");
        let fields: Vec<&str> = errors.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["dogs", "yardSize", "frequency", "zoneMultiplier"]);
    }

    #[test]
    fn zip_code_supplies_zone_multiplier() {
        let (id, config) = yardura();
        let mut request = QuoteRequest::new(2, "large", "weekly");
        request.zip_code = Some("50309".to_string());

        let (input, warnings) = request.to_input(&id, &config).expect("valid");
        assert_eq!(input.zone_multiplier, Some(1.2));
        assert!(warnings.is_empty());

        request.zip_code = Some("90210".to_string());
        let errors = request.to_input(&id, &config).expect_err("unserviceable zip");
        assert_eq!(errors.errors[0].field, "zipCode");
    }

    #[test]
    fn days_derive_from_last_cleaned_date() {
        let (id, config) = yardura();
        let mut request = QuoteRequest::new(1, "small", "monthly");
        request.last_cleaned_on = NaiveDate::from_ymd_opt(2025, 3, 1);
        request.today = NaiveDate::from_ymd_opt(2025, 3, 22);

        let (input, _) = request.to_input(&id, &config).expect("valid");
        assert_eq!(input.days_since_last_cleanup, Some(21));

        request.today = NaiveDate::from_ymd_opt(2025, 2, 1);
        let errors = request.to_input(&id, &config).expect_err("future date");
        assert_eq!(errors.errors[0].field, "lastCleanedOn");
    }

    #[test]
    fn unknown_add_on_is_only_a_warning() {
        let (id, config) = yardura();
        let mut request = QuoteRequest::new(1, "xl", "biweekly");
        request
            .add_ons
            .insert("hot-tub", AddOnSelection::SelectedDefault);

        let (input, warnings) = request.to_input(&id, &config).expect("valid");
        assert_eq!(input.yard_size, YardSize::XLarge);
        assert_eq!(input.frequency, Frequency::BiWeekly);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].field, "addOns.hot-tub");
    }
}
