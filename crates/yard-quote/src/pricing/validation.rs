use std::fmt;

use serde::{Deserialize, Serialize};

use super::business::BusinessConfig;
use super::domain::{AddOnSelection, Frequency, PricingCalculationInput, SelectionMap, YardSize};

/// Problem tied to one request field so a form can highlight it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every field-level rejection found in a request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .errors
            .iter()
            .map(FieldError::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "invalid quote request: {joined}")
    }
}

impl std::error::Error for ValidationErrors {}

/// Outcome of checking a request: errors block pricing, warnings do not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<FieldError>,
    pub warnings: Vec<FieldError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn merge(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Warnings on success, every error otherwise.
    pub fn into_result(self) -> Result<Vec<FieldError>, ValidationErrors> {
        if self.errors.is_empty() {
            Ok(self.warnings)
        } else {
            Err(ValidationErrors {
                errors: self.errors,
            })
        }
    }
}

/// Check a typed input against the tenant configuration before any arithmetic.
pub fn validate_input(
    input: &PricingCalculationInput,
    config: &BusinessConfig,
) -> ValidationReport {
    let mut report = ValidationReport::default();
    check_dogs(input.dogs, &mut report);
    check_yard_size(input.yard_size, config, &mut report);
    check_frequency(input.frequency, config, &mut report);
    check_add_ons(&input.add_ons, config, &mut report);
    check_zone_multiplier(input.zone_multiplier, &mut report);
    report
}

pub(crate) fn check_dogs(dogs: u32, report: &mut ValidationReport) {
    if dogs < 1 {
        report
            .errors
            .push(FieldError::new("dogs", "Number of dogs must be at least 1"));
    }
}

pub(crate) fn check_yard_size(
    size: YardSize,
    config: &BusinessConfig,
    report: &mut ValidationReport,
) {
    match config.yard_size(size) {
        Some(entry) if entry.enabled => {}
        Some(_) => report.errors.push(FieldError::new(
            "yardSize",
            format!("Yard size '{size}' is not offered"),
        )),
        None => {
            let offered = config
                .base_pricing
                .yard_sizes
                .iter()
                .filter(|entry| entry.enabled)
                .map(|entry| entry.size.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            report.errors.push(FieldError::new(
                "yardSize",
                format!("Invalid yard size. Must be one of: {offered}"),
            ));
        }
    }
}

pub(crate) fn check_frequency(
    frequency: Frequency,
    config: &BusinessConfig,
    report: &mut ValidationReport,
) {
    if config.frequency(frequency).is_none() {
        let offered = config
            .base_pricing
            .frequencies
            .iter()
            .map(|entry| entry.frequency.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        report.errors.push(FieldError::new(
            "frequency",
            format!("Invalid frequency. Must be one of: {offered}"),
        ));
    }
}

pub(crate) fn check_add_ons(
    selections: &SelectionMap<AddOnSelection>,
    config: &BusinessConfig,
    report: &mut ValidationReport,
) {
    for (id, selection) in selections.iter() {
        if !selection.is_selected() {
            if config
                .add_on(id)
                .is_some_and(|addon| addon.required && addon.available)
            {
                report.warnings.push(FieldError::new(
                    format!("addOns.{id}"),
                    "Add-on is required by this business and is billed even when declined",
                ));
            }
            continue;
        }
        match config.add_on(id) {
            None => report.warnings.push(FieldError::new(
                format!("addOns.{id}"),
                "Add-on is not offered and was ignored",
            )),
            Some(addon) if !addon.available => report.warnings.push(FieldError::new(
                format!("addOns.{id}"),
                "Add-on is currently unavailable and was ignored",
            )),
            Some(_) => {}
        }
    }
}

pub(crate) fn check_zone_multiplier(multiplier: Option<f64>, report: &mut ValidationReport) {
    if let Some(value) = multiplier {
        if !value.is_finite() || value < 0.0 {
            report.errors.push(FieldError::new(
                "zoneMultiplier",
                "Zone multiplier must be a non-negative number",
            ));
        }
    }
}
