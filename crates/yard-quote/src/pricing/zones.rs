//! ZIP-code to service-zone resolution.
//!
//! Lives at the request boundary: the engine itself only ever sees a resolved
//! multiplier.

use super::business::{BusinessConfig, ServiceZone};

/// Strip whitespace and upper-case so `" 50309 "` and `"50309"` compare equal.
pub fn normalize_zip(zip: &str) -> String {
    zip.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

pub fn zone_for_zip<'a>(config: &'a BusinessConfig, zip: &str) -> Option<&'a ServiceZone> {
    let wanted = normalize_zip(zip);
    if wanted.is_empty() {
        return None;
    }
    config.service_zones.iter().find(|zone| {
        zone.zip_codes
            .iter()
            .any(|candidate| normalize_zip(candidate) == wanted)
    })
}

/// Multiplier of the zone owning `zip`, or the tenant's default when no zone claims it.
pub fn zone_multiplier_for_zip(config: &BusinessConfig, zip: &str) -> f64 {
    zone_for_zip(config, zip)
        .map(|zone| zone.base_multiplier)
        .unwrap_or(config.settings.default_zone_multiplier)
}

/// Unknown ZIP codes are treated as outside the service area.
pub fn is_zip_serviceable(config: &BusinessConfig, zip: &str) -> bool {
    zone_for_zip(config, zip)
        .map(|zone| zone.serviceable)
        .unwrap_or(false)
}
