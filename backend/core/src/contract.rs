//! Result contract shared by the classifier and its callers.
//!
//! The model's answer is untrusted text. Every claim in it is checked
//! against the closed vocabularies below before a [`ClassificationResult`]
//! is built, and nothing outside them survives. Interior and exterior
//! results carry separate feature structs so an interior-only flag can
//! never end up on an exterior result.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{ClassificationError, SchemaViolation};

/// Flags that exist in both feature vocabularies with the same meaning.
pub const SHARED_FEATURE_KEYS: [&str; 2] = ["trippingHazards", "fireHazards"];

// ---------------------------------------------------------------------------
// Location
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationType {
    Interior,
    Exterior,
}

impl LocationType {
    pub const ALL: [LocationType; 2] = [Self::Interior, Self::Exterior];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Interior => "interior",
            Self::Exterior => "exterior",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "interior" => Some(Self::Interior),
            "exterior" => Some(Self::Exterior),
            _ => None,
        }
    }

    /// Space labels valid for this location, fallback last.
    pub fn space_labels(self) -> &'static [&'static str] {
        match self {
            Self::Interior => InteriorSpace::LABELS,
            Self::Exterior => ExteriorSpace::LABELS,
        }
    }

    /// The "Other ..." label used when the scene fits nothing else.
    pub fn fallback_label(self) -> &'static str {
        match self {
            Self::Interior => InteriorSpace::OtherInterior.label(),
            Self::Exterior => ExteriorSpace::OtherExterior.label(),
        }
    }

    pub fn feature_keys(self) -> &'static [&'static str] {
        match self {
            Self::Interior => InteriorFeatures::KEYS,
            Self::Exterior => ExteriorFeatures::KEYS,
        }
    }
}

impl fmt::Display for LocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Space vocabularies
// ---------------------------------------------------------------------------

macro_rules! space_vocabulary {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $label)] $variant,)+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];
            pub const LABELS: &'static [&'static str] = &[$($label),+];

            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }

            /// Exact match against the vocabulary.
            pub fn from_label(label: &str) -> Option<Self> {
                match label {
                    $($label => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

space_vocabulary! {
    /// Room types an interior photo can be classified as.
    InteriorSpace {
        PrimaryBedroom => "Primary bedroom",
        PrimaryBathroom => "Primary bathroom",
        Bathroom => "Bathroom",
        HalfBathroom => "Half bathroom",
        Bedroom => "Bedroom",
        WalkInCloset => "Walk-in closet",
        Closet => "Closet",
        Kitchen => "Kitchen",
        DiningRoom => "Dining room",
        BreakfastNook => "Breakfast nook",
        LivingRoom => "Living room",
        FamilyRoom => "Family room",
        Entry => "Entry",
        Office => "Office",
        LaundryRoom => "Laundry room",
        Hallway => "Hallway",
        Stairway => "Stairway",
        Garage => "Garage",
        OtherInterior => "Other interior",
    }
}

space_vocabulary! {
    /// Garden types an exterior photo can be classified as.
    ExteriorSpace {
        VegetableGarden => "Vegetable garden",
        FlowerGarden => "Flower garden",
        HerbGarden => "Herb garden",
        RockGarden => "Rock garden",
        WaterGarden => "Water garden",
        ContainerGarden => "Container garden",
        WoodlandGarden => "Woodland garden",
        XeriscapeGarden => "Xeriscape garden",
        MixedGarden => "Mixed garden",
        OtherExterior => "Other exterior",
    }
}

// ---------------------------------------------------------------------------
// Feature vocabularies
// ---------------------------------------------------------------------------

/// A fixed set of boolean risk flags keyed by their wire names.
pub trait FeatureSet: Default + Clone + PartialEq + Serialize {
    /// Wire names, in declaration order.
    const KEYS: &'static [&'static str];

    fn get(&self, key: &str) -> Option<bool>;

    /// Returns `false` if `key` is not part of this vocabulary.
    fn set(&mut self, key: &str, value: bool) -> bool;

    fn flagged(&self) -> Vec<&'static str> {
        Self::KEYS
            .iter()
            .copied()
            .filter(|key| self.get(key) == Some(true))
            .collect()
    }
}

macro_rules! feature_vocabulary {
    ($(#[$meta:meta])* $name:ident { $($field:ident => $key:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
        pub struct $name {
            $(#[serde(rename = $key)] pub $field: bool,)+
        }

        impl FeatureSet for $name {
            const KEYS: &'static [&'static str] = &[$($key),+];

            fn get(&self, key: &str) -> Option<bool> {
                match key {
                    $($key => Some(self.$field),)+
                    _ => None,
                }
            }

            fn set(&mut self, key: &str, value: bool) -> bool {
                match key {
                    $($key => {
                        self.$field = value;
                        true
                    })+
                    _ => false,
                }
            }
        }
    };
}

feature_vocabulary! {
    /// Risk flags for rooms.
    InteriorFeatures {
        wall_damage => "wallDamage",
        visible_mold => "visibleMold",
        water_damage => "waterDamage",
        outdated_electrical => "outdatedElectrical",
        plumbing_issues => "plumbingIssues",
        structural_cracks => "structuralCracks",
        poor_ventilation => "poorVentilation",
        fire_hazards => "fireHazards",
        tripping_hazards => "trippingHazards",
        pest_infestation => "pestInfestation",
        roof_leaks => "roofLeaks",
        flooring_damage => "flooringDamage",
    }
}

feature_vocabulary! {
    /// Risk flags for gardens and other outdoor areas.
    ExteriorFeatures {
        large_trees_near_structures => "largeTreesNearStructures",
        unstable_slope_or_retaining_wall => "unstableSlopeOrRetainingWall",
        water_features => "waterFeatures",
        tripping_hazards => "trippingHazards",
        poor_drainage => "poorDrainage",
        overgrowth_near_power_lines => "overgrowthNearPowerLines",
        dead_or_diseased_trees => "deadOrDiseasedTrees",
        unsecured_tools => "unsecuredTools",
        chemical_storage => "chemicalStorage",
        fire_hazards => "fireHazards",
        wildlife_attractants => "wildlifeAttractants",
        invasive_species => "invasiveSpecies",
        unsecured_garden_structures => "unsecuredGardenStructures",
        poor_fencing => "poorFencing",
        visible_pest_infestation => "visiblePestInfestation",
    }
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// A fully validated classification. Serializes as
/// `{"locationType": ..., "spaceType": ..., "features": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "locationType", rename_all = "lowercase")]
pub enum ClassificationResult {
    Interior {
        #[serde(rename = "spaceType")]
        space: InteriorSpace,
        features: InteriorFeatures,
    },
    Exterior {
        #[serde(rename = "spaceType")]
        space: ExteriorSpace,
        features: ExteriorFeatures,
    },
}

impl ClassificationResult {
    pub fn location_type(&self) -> LocationType {
        match self {
            Self::Interior { .. } => LocationType::Interior,
            Self::Exterior { .. } => LocationType::Exterior,
        }
    }

    pub fn space_label(&self) -> &'static str {
        match self {
            Self::Interior { space, .. } => space.label(),
            Self::Exterior { space, .. } => space.label(),
        }
    }

    pub fn feature(&self, key: &str) -> Option<bool> {
        match self {
            Self::Interior { features, .. } => features.get(key),
            Self::Exterior { features, .. } => features.get(key),
        }
    }

    /// Names of the flags set to `true`.
    pub fn flagged(&self) -> Vec<&'static str> {
        match self {
            Self::Interior { features, .. } => features.flagged(),
            Self::Exterior { features, .. } => features.flagged(),
        }
    }

    pub fn fire_hazards(&self) -> bool {
        match self {
            Self::Interior { features, .. } => features.fire_hazards,
            Self::Exterior { features, .. } => features.fire_hazards,
        }
    }

    pub fn tripping_hazards(&self) -> bool {
        match self {
            Self::Interior { features, .. } => features.tripping_hazards,
            Self::Exterior { features, .. } => features.tripping_hazards,
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Check a parsed candidate against the contract.
///
/// Checks run in order: `locationType`, `spaceType` presence, `spaceType`
/// membership, `features` shape, `features` keys. The first failure is
/// returned. Flags missing from `features` (or a missing `features`
/// object altogether) default to `false`, as does any flag whose value is
/// not a JSON boolean.
pub fn validate(candidate: &Value) -> Result<ClassificationResult, SchemaViolation> {
    let object = candidate
        .as_object()
        .ok_or_else(|| SchemaViolation::new("$", format!("expected an object, found {}", type_name(candidate))))?;

    let location = match object.get("locationType") {
        None | Some(Value::Null) => return Err(SchemaViolation::new("locationType", "missing")),
        Some(Value::String(label)) => LocationType::from_label(label).ok_or_else(|| {
            SchemaViolation::new(
                "locationType",
                format!("'{label}' is not one of interior, exterior"),
            )
        })?,
        Some(other) => {
            return Err(SchemaViolation::new(
                "locationType",
                format!("expected a string, found {}", type_name(other)),
            ))
        }
    };

    let space = match object.get("spaceType") {
        None | Some(Value::Null) => return Err(SchemaViolation::new("spaceType", "missing")),
        Some(Value::String(label)) => label.as_str(),
        Some(other) => {
            return Err(SchemaViolation::new(
                "spaceType",
                format!("expected a string, found {}", type_name(other)),
            ))
        }
    };

    let unknown_space = || {
        SchemaViolation::new(
            "spaceType",
            format!("'{space}' is not a recognised {location} space type"),
        )
    };

    match location {
        LocationType::Interior => {
            let space = InteriorSpace::from_label(space).ok_or_else(unknown_space)?;
            let features = validate_features(location, object)?;
            Ok(ClassificationResult::Interior { space, features })
        }
        LocationType::Exterior => {
            let space = ExteriorSpace::from_label(space).ok_or_else(unknown_space)?;
            let features = validate_features(location, object)?;
            Ok(ClassificationResult::Exterior { space, features })
        }
    }
}

fn validate_features<F: FeatureSet>(
    location: LocationType,
    object: &Map<String, Value>,
) -> Result<F, SchemaViolation> {
    let mut features = F::default();

    let raw = match object.get("features") {
        None | Some(Value::Null) => return Ok(features),
        Some(Value::Object(raw)) => raw,
        Some(other) => {
            return Err(SchemaViolation::new(
                "features",
                format!("expected an object, found {}", type_name(other)),
            ))
        }
    };

    for (key, value) in raw {
        let flag = match value {
            Value::Bool(flag) => *flag,
            other => {
                debug!(feature = %key, value = %other, "Ambiguous feature value; defaulting to false");
                false
            }
        };
        if !features.set(key, flag) {
            return Err(SchemaViolation::new(
                format!("features.{key}"),
                format!("not a recognised {location} feature"),
            ));
        }
    }

    Ok(features)
}

/// Parse raw model text into a validated result.
///
/// Surrounding whitespace and a single Markdown code fence around the
/// object are tolerated; anything else that is not JSON is
/// [`ClassificationError::MalformedOutput`].
pub fn parse_model_output(text: &str) -> Result<ClassificationResult, ClassificationError> {
    let body = strip_code_fence(text.trim());
    let value: Value = serde_json::from_str(body).map_err(ClassificationError::MalformedOutput)?;
    Ok(validate(&value)?)
}

fn strip_code_fence(text: &str) -> &str {
    let Some(inner) = text
        .strip_prefix("```")
        .and_then(|rest| rest.strip_suffix("```"))
    else {
        return text;
    };
    // Skip the info string (`json`) on the opening line.
    match inner.find('\n') {
        Some(newline) => inner[newline + 1..].trim(),
        None => inner.trim(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn violation(candidate: Value) -> SchemaViolation {
        validate(&candidate).expect_err("candidate should be rejected")
    }

    #[test]
    fn vocabulary_sizes() {
        assert_eq!(InteriorSpace::ALL.len(), 19);
        assert_eq!(ExteriorSpace::ALL.len(), 10);
        assert_eq!(InteriorFeatures::KEYS.len(), 12);
        assert_eq!(ExteriorFeatures::KEYS.len(), 15);
    }

    #[test]
    fn shared_flags_exist_in_both_vocabularies() {
        for key in SHARED_FEATURE_KEYS {
            assert!(InteriorFeatures::KEYS.contains(&key));
            assert!(ExteriorFeatures::KEYS.contains(&key));
        }
        let only_shared: Vec<_> = InteriorFeatures::KEYS
            .iter()
            .filter(|k| ExteriorFeatures::KEYS.contains(*k))
            .collect();
        assert_eq!(only_shared.len(), SHARED_FEATURE_KEYS.len());
    }

    #[test]
    fn accepts_every_space_in_its_own_vocabulary() {
        for location in LocationType::ALL {
            for label in location.space_labels() {
                let candidate = json!({
                    "locationType": location.as_str(),
                    "spaceType": label,
                    "features": {},
                });
                let result = validate(&candidate).unwrap();
                assert_eq!(result.location_type(), location);
                assert_eq!(result.space_label(), *label);
            }
            assert!(location.space_labels().contains(&location.fallback_label()));
        }
    }

    #[test]
    fn rejects_spaces_from_the_other_vocabulary() {
        for label in ExteriorSpace::LABELS {
            let err = violation(json!({"locationType": "interior", "spaceType": label}));
            assert_eq!(err.field, "spaceType");
        }
        for label in InteriorSpace::LABELS {
            let err = violation(json!({"locationType": "exterior", "spaceType": label}));
            assert_eq!(err.field, "spaceType");
        }
    }

    #[test]
    fn rejects_unknown_space() {
        let err = violation(json!({
            "locationType": "interior",
            "spaceType": "Swimming Pool",
            "features": {},
        }));
        assert_eq!(err.field, "spaceType");
        assert!(err.reason.contains("Swimming Pool"));

        // Case differences are not silently repaired.
        let err = violation(json!({"locationType": "interior", "spaceType": "kitchen"}));
        assert_eq!(err.field, "spaceType");
    }

    #[test]
    fn missing_flags_default_to_false() {
        let result = validate(&json!({
            "locationType": "interior",
            "spaceType": "Kitchen",
            "features": {"wallDamage": true},
        }))
        .unwrap();

        let ClassificationResult::Interior { space, features } = &result else {
            panic!("expected an interior result");
        };
        assert_eq!(*space, InteriorSpace::Kitchen);
        assert!(features.wall_damage);
        assert_eq!(result.flagged(), vec!["wallDamage"]);

        let serialized = serde_json::to_value(&result).unwrap();
        let flags = serialized["features"].as_object().unwrap();
        assert_eq!(flags.len(), 12);
        assert_eq!(flags.values().filter(|v| **v == json!(false)).count(), 11);
        assert_eq!(flags["wallDamage"], json!(true));
    }

    #[test]
    fn every_partial_feature_map_is_completed() {
        for location in LocationType::ALL {
            let keys = location.feature_keys();
            for present in 0..=keys.len() {
                let features: Map<String, Value> = keys[..present]
                    .iter()
                    .map(|k| (k.to_string(), Value::Bool(true)))
                    .collect();
                let result = validate(&json!({
                    "locationType": location.as_str(),
                    "spaceType": location.fallback_label(),
                    "features": features,
                }))
                .unwrap();
                for (i, key) in keys.iter().enumerate() {
                    assert_eq!(result.feature(key), Some(i < present), "{location} {key}");
                }
            }
        }
    }

    #[test]
    fn missing_features_object_defaults_everything() {
        let result = validate(&json!({"locationType": "exterior", "spaceType": "Herb garden"})).unwrap();
        assert!(result.flagged().is_empty());
    }

    #[test]
    fn rejects_keys_outside_the_location_vocabulary() {
        let err = violation(json!({
            "locationType": "exterior",
            "spaceType": "Rock garden",
            "features": {"roofLeaks": true},
        }));
        assert_eq!(err.field, "features.roofLeaks");

        let err = violation(json!({
            "locationType": "interior",
            "spaceType": "Office",
            "features": {"poorFencing": false},
        }));
        assert_eq!(err.field, "features.poorFencing");

        let err = violation(json!({
            "locationType": "interior",
            "spaceType": "Office",
            "features": {"wall_damage": true},
        }));
        assert_eq!(err.field, "features.wall_damage");
    }

    #[test]
    fn shared_flags_accepted_on_both_sides() {
        for location in LocationType::ALL {
            let result = validate(&json!({
                "locationType": location.as_str(),
                "spaceType": location.fallback_label(),
                "features": {"trippingHazards": true, "fireHazards": true},
            }))
            .unwrap();
            assert!(result.tripping_hazards());
            assert!(result.fire_hazards());
        }
    }

    #[test]
    fn ambiguous_values_default_to_false() {
        let result = validate(&json!({
            "locationType": "interior",
            "spaceType": "Garage",
            "features": {"visibleMold": "maybe", "roofLeaks": null, "waterDamage": 1},
        }))
        .unwrap();
        assert!(result.flagged().is_empty());
    }

    #[test]
    fn checks_run_in_order() {
        assert_eq!(violation(json!([])).field, "$");
        assert_eq!(violation(json!({})).field, "locationType");
        assert_eq!(violation(json!({"locationType": "attic"})).field, "locationType");
        assert_eq!(violation(json!({"locationType": 3})).field, "locationType");
        assert_eq!(violation(json!({"locationType": "interior"})).field, "spaceType");
        assert_eq!(
            violation(json!({"locationType": "interior", "spaceType": 7})).field,
            "spaceType"
        );
        // Unknown space is reported before bad features.
        assert_eq!(
            violation(json!({"locationType": "interior", "spaceType": "Pool", "features": []})).field,
            "spaceType"
        );
        assert_eq!(
            violation(json!({"locationType": "interior", "spaceType": "Closet", "features": []})).field,
            "features"
        );
    }

    #[test]
    fn validation_is_idempotent() {
        let first = validate(&json!({
            "locationType": "exterior",
            "spaceType": "Water garden",
            "features": {"waterFeatures": true, "poorDrainage": true},
        }))
        .unwrap();
        let reserialized = serde_json::to_value(&first).unwrap();
        let second = validate(&reserialized).unwrap();
        assert_eq!(first, second);
        assert_eq!(serde_json::to_value(&second).unwrap(), reserialized);
    }

    #[test]
    fn parses_plain_and_fenced_output() {
        let raw = r#"{"locationType":"interior","spaceType":"Bedroom","features":{"visibleMold":true}}"#;
        assert_eq!(parse_model_output(raw).unwrap().flagged(), vec!["visibleMold"]);

        let fenced = format!("```json\n{raw}\n```");
        assert_eq!(parse_model_output(&fenced).unwrap().space_label(), "Bedroom");

        let bare_fence = format!("  ```\n{raw}\n```\n");
        assert!(parse_model_output(&bare_fence).is_ok());
    }

    #[test]
    fn commentary_is_malformed() {
        let err = parse_model_output("Here is the analysis: {\"locationType\": \"interior\"}").unwrap_err();
        assert!(matches!(err, ClassificationError::MalformedOutput(_)));

        let err = parse_model_output("").unwrap_err();
        assert!(matches!(err, ClassificationError::MalformedOutput(_)));
    }

    #[test]
    fn contract_breach_is_schema_violation() {
        let err = parse_model_output(r#"{"locationType":"interior","spaceType":"Swimming Pool","features":{}}"#)
            .unwrap_err();
        match err {
            ClassificationError::SchemaViolation(v) => assert_eq!(v.field, "spaceType"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
