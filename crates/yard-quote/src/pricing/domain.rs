use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Identifier wrapper for the tenant whose configuration prices a quote.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BusinessId(pub String);

impl BusinessId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BusinessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raised when a caller-supplied key does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownKey {
    pub kind: &'static str,
    pub value: String,
}

/// Visit cadence a customer can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Frequency {
    Weekly,
    TwiceWeekly,
    #[serde(alias = "biweekly")]
    BiWeekly,
    Monthly,
    #[serde(alias = "onetime")]
    OneTime,
}

impl Frequency {
    pub const fn ordered() -> [Frequency; 5] {
        [
            Frequency::Weekly,
            Frequency::TwiceWeekly,
            Frequency::BiWeekly,
            Frequency::Monthly,
            Frequency::OneTime,
        ]
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Frequency::Weekly => "weekly",
            Frequency::TwiceWeekly => "twice-weekly",
            Frequency::BiWeekly => "bi-weekly",
            Frequency::Monthly => "monthly",
            Frequency::OneTime => "one-time",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Frequency::Weekly => "Weekly",
            Frequency::TwiceWeekly => "Twice weekly",
            Frequency::BiWeekly => "Every other week",
            Frequency::Monthly => "Monthly",
            Frequency::OneTime => "One-time",
        }
    }

    pub const fn is_recurring(self) -> bool {
        !matches!(self, Frequency::OneTime)
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = UnknownKey;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "weekly" => Ok(Frequency::Weekly),
            "twice-weekly" => Ok(Frequency::TwiceWeekly),
            "bi-weekly" | "biweekly" => Ok(Frequency::BiWeekly),
            "monthly" => Ok(Frequency::Monthly),
            "one-time" | "onetime" => Ok(Frequency::OneTime),
            _ => Err(UnknownKey {
                kind: "frequency",
                value: value.to_string(),
            }),
        }
    }
}

/// Property size class used to scale the per-visit price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YardSize {
    Small,
    Medium,
    Large,
    #[serde(rename = "xlarge", alias = "xl")]
    XLarge,
}

impl YardSize {
    pub const fn ordered() -> [YardSize; 4] {
        [
            YardSize::Small,
            YardSize::Medium,
            YardSize::Large,
            YardSize::XLarge,
        ]
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            YardSize::Small => "small",
            YardSize::Medium => "medium",
            YardSize::Large => "large",
            YardSize::XLarge => "xlarge",
        }
    }
}

impl fmt::Display for YardSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for YardSize {
    type Err = UnknownKey;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "small" => Ok(YardSize::Small),
            "medium" => Ok(YardSize::Medium),
            "large" => Ok(YardSize::Large),
            "xlarge" | "xl" => Ok(YardSize::XLarge),
            _ => Err(UnknownKey {
                kind: "yard size",
                value: value.to_string(),
            }),
        }
    }
}

/// How an add-on's price is allocated across visits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BillingMode {
    FirstVisit,
    EachVisit,
    EveryOther,
    #[serde(alias = "onetime")]
    OneTime,
}

impl BillingMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            BillingMode::FirstVisit => "first-visit",
            BillingMode::EachVisit => "each-visit",
            BillingMode::EveryOther => "every-other",
            BillingMode::OneTime => "one-time",
        }
    }

    /// Modes billed once up front instead of on every visit.
    pub const fn is_up_front(self) -> bool {
        matches!(self, BillingMode::FirstVisit | BillingMode::OneTime)
    }
}

impl fmt::Display for BillingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BillingMode {
    type Err = UnknownKey;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "first-visit" => Ok(BillingMode::FirstVisit),
            "each-visit" => Ok(BillingMode::EachVisit),
            "every-other" => Ok(BillingMode::EveryOther),
            "one-time" | "onetime" => Ok(BillingMode::OneTime),
            _ => Err(UnknownKey {
                kind: "billing mode",
                value: value.to_string(),
            }),
        }
    }
}

/// Caller's choice for a single add-on.
///
/// On the wire this is either a boolean or an object carrying an explicit
/// `mode`; `null` and `false` both mean the add-on was not chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WireSelection", into = "WireSelection")]
pub enum AddOnSelection {
    Unselected,
    SelectedDefault,
    SelectedWithMode(BillingMode),
}

impl AddOnSelection {
    pub const fn is_selected(self) -> bool {
        !matches!(self, AddOnSelection::Unselected)
    }

    /// Billing mode in effect given the add-on's configured default.
    pub const fn effective_mode(self, configured: BillingMode) -> Option<BillingMode> {
        match self {
            AddOnSelection::Unselected => None,
            AddOnSelection::SelectedDefault => Some(configured),
            AddOnSelection::SelectedWithMode(mode) => Some(mode),
        }
    }
}

#[derive(Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
enum WireSelection {
    Nothing,
    Flag(bool),
    Mode { mode: BillingMode },
}

impl From<WireSelection> for AddOnSelection {
    fn from(value: WireSelection) -> Self {
        match value {
            WireSelection::Nothing | WireSelection::Flag(false) => AddOnSelection::Unselected,
            WireSelection::Flag(true) => AddOnSelection::SelectedDefault,
            WireSelection::Mode { mode } => AddOnSelection::SelectedWithMode(mode),
        }
    }
}

impl From<AddOnSelection> for WireSelection {
    fn from(value: AddOnSelection) -> Self {
        match value {
            AddOnSelection::Unselected => WireSelection::Flag(false),
            AddOnSelection::SelectedDefault => WireSelection::Flag(true),
            AddOnSelection::SelectedWithMode(mode) => WireSelection::Mode { mode },
        }
    }
}

/// A service area on the property: a checkbox or a free-text "other" entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AreaSelection {
    Flag(bool),
    Note(String),
}

impl AreaSelection {
    pub fn is_selected(&self) -> bool {
        match self {
            AreaSelection::Flag(flag) => *flag,
            AreaSelection::Note(note) => !note.trim().is_empty(),
        }
    }
}

/// String-keyed selections that keep the caller's ordering for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionMap<T> {
    entries: Vec<(String, T)>,
}

impl<T> Default for SelectionMap<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> SelectionMap<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a selection; a replaced key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: T) {
        let key = key.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, T> FromIterator<(K, T)> for SelectionMap<T> {
    fn from_iter<I: IntoIterator<Item = (K, T)>>(iter: I) -> Self {
        let mut map = SelectionMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl<T: Serialize> Serialize for SelectionMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

struct SelectionMapVisitor<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de>> Visitor<'de> for SelectionMapVisitor<T> {
    type Value = SelectionMap<T>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of selections keyed by id")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut map = SelectionMap::new();
        while let Some((key, value)) = access.next_entry::<String, T>()? {
            map.insert(key, value);
        }
        Ok(map)
    }

    fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
        Ok(SelectionMap::new())
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for SelectionMap<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(SelectionMapVisitor(PhantomData))
    }
}

/// Fully typed request for a single price calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingCalculationInput {
    pub business_id: BusinessId,
    pub dogs: u32,
    pub yard_size: YardSize,
    pub frequency: Frequency,
    #[serde(default)]
    pub add_ons: SelectionMap<AddOnSelection>,
    #[serde(default)]
    pub areas_to_clean: SelectionMap<AreaSelection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_multiplier: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_since_last_cleanup: Option<u32>,
}

impl PricingCalculationInput {
    pub fn new(
        business_id: BusinessId,
        dogs: u32,
        yard_size: YardSize,
        frequency: Frequency,
    ) -> Self {
        Self {
            business_id,
            dogs,
            yard_size,
            frequency,
            add_ons: SelectionMap::new(),
            areas_to_clean: SelectionMap::new(),
            zone_multiplier: None,
            days_since_last_cleanup: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn add_on_selection_accepts_flags_and_modes() {
        let selections: SelectionMap<AddOnSelection> = serde_json::from_value(json!({
            "spray-deck": { "mode": "every-other" },
            "deodorize": true,
            "litter": false,
            "divert-25": null,
        }))
        .expect("selections parse");

        let keys: Vec<&str> = selections.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["spray-deck", "deodorize", "litter", "divert-25"]);
        assert_eq!(
            selections.get("spray-deck"),
            Some(&AddOnSelection::SelectedWithMode(BillingMode::EveryOther))
        );
        assert_eq!(
            selections.get("deodorize"),
            Some(&AddOnSelection::SelectedDefault)
        );
        assert_eq!(selections.get("litter"), Some(&AddOnSelection::Unselected));
        assert_eq!(selections.get("divert-25"), Some(&AddOnSelection::Unselected));
    }

    #[test]
    fn legacy_spellings_are_accepted() {
        let frequency: Frequency = serde_json::from_value(json!("biweekly")).expect("alias");
        assert_eq!(frequency, Frequency::BiWeekly);
        assert_eq!("onetime".parse::<Frequency>(), Ok(Frequency::OneTime));
        assert_eq!("XL".parse::<YardSize>(), Ok(YardSize::XLarge));
        let mode: BillingMode = serde_json::from_value(json!("onetime")).expect("alias");
        assert_eq!(mode, BillingMode::OneTime);
    }

    #[test]
    fn area_notes_count_only_when_non_blank() {
        assert!(AreaSelection::Note("side gate".to_string()).is_selected());
        assert!(!AreaSelection::Note("   ".to_string()).is_selected());
        assert!(!AreaSelection::Flag(false).is_selected());
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut map = SelectionMap::new();
        map.insert("a", 1);
        map.insert("b", 2);
        map.insert("a", 3);
        let entries: Vec<(&str, &i32)> = map.iter().collect();
        assert_eq!(entries, vec![("a", &3), ("b", &2)]);
    }
}
