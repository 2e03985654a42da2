//! Feature Layout - Feature Index Registry
//!
//! **CRITICAL: This file is part of the model artifact contract**
//!
//! The trained model reads its `[1, 64]` input positionally. Every slot below
//! must match the column order the model was fit against; a wrong index does
//! not crash, it silently produces a wrong price.
//!
//! ## Rules (NEVER break these):
//! 1. Add feature → increment FEATURE_VERSION and retrain
//! 2. Change order → increment FEATURE_VERSION and retrain
//! 3. Remove feature → increment FEATURE_VERSION and retrain
//!
//! Keys are either a numeric field name (`"horsepower"`) or a one-hot key
//! `field_value` with a lowercase value (`"carbody_sedan"`).

use std::collections::{HashMap, HashSet};

use crc32fast::Hasher;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::logic::config::ConfigurationError;

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
/// MUST be incremented when layout changes
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// Feature keys in exact order they appear in the vector
pub const FEATURE_LAYOUT: &[&str] = &[
    // === Numeric (0-13) ===
    "symboling",             // 0
    "wheelbase",             // 1
    "carlength",             // 2
    "carwidth",              // 3
    "carheight",             // 4
    "curbweight",            // 5
    "enginesize",            // 6
    "boreratio",             // 7
    "stroke",                // 8
    "compressionratio",      // 9
    "horsepower",            // 10
    "peakrpm",               // 11
    "citympg",               // 12
    "highwaympg",            // 13

    // === Binary indicators (14-16) ===
    "fueltype_gas",          // 14: diesel is the dropped reference
    "aspiration_turbo",      // 15: std is the dropped reference
    "doornumber_two",        // 16: four is the dropped reference

    // === Car body (17-20) ===
    "carbody_hardtop",       // 17
    "carbody_hatchback",     // 18
    "carbody_sedan",         // 19
    "carbody_wagon",         // 20

    // === Drive wheel (21-22) ===
    "drivewheel_fwd",        // 21
    "drivewheel_rwd",        // 22

    // === Engine location (23) ===
    "enginelocation_rear",   // 23

    // === Engine type (24-29) ===
    "enginetype_dohcv",      // 24
    "enginetype_l",          // 25
    "enginetype_ohc",        // 26
    "enginetype_ohcf",       // 27
    "enginetype_ohcv",       // 28
    "enginetype_rotor",      // 29

    // === Cylinder number (30-35) ===
    "cylindernumber_five",   // 30
    "cylindernumber_four",   // 31
    "cylindernumber_six",    // 32
    "cylindernumber_three",  // 33
    "cylindernumber_twelve", // 34
    "cylindernumber_two",    // 35

    // === Fuel system (36-42) ===
    "fuelsystem_2bbl",       // 36
    "fuelsystem_4bbl",       // 37
    "fuelsystem_idi",        // 38
    "fuelsystem_mfi",        // 39
    "fuelsystem_mpfi",       // 40
    "fuelsystem_spdi",       // 41
    "fuelsystem_spfi",       // 42

    // === Brand (43-63) ===
    "brand_audi",            // 43
    "brand_bmw",             // 44
    "brand_buick",           // 45
    "brand_chevrolet",       // 46
    "brand_dodge",           // 47
    "brand_honda",           // 48
    "brand_isuzu",           // 49
    "brand_jaguar",          // 50
    "brand_mazda",           // 51
    "brand_mercury",         // 52
    "brand_mitsubishi",      // 53
    "brand_nissan",          // 54
    "brand_peugeot",         // 55
    "brand_plymouth",        // 56
    "brand_porsche",         // 57
    "brand_renault",         // 58
    "brand_saab",            // 59
    "brand_subaru",          // 60
    "brand_toyota",          // 61
    "brand_volkswagen",      // 62
    "brand_volvo",           // 63
];

/// Total number of features, taken from the model's `[1, 64]` input shape.
pub const FEATURE_COUNT: usize = 64;

// A layout that drifts from the model input width must not build.
const _: () = assert!(FEATURE_LAYOUT.len() == FEATURE_COUNT);

// ============================================================================
// REGISTRY
// ============================================================================

/// Immutable key → slot map built once from `FEATURE_LAYOUT`.
#[derive(Debug)]
pub struct FeatureRegistry {
    index: HashMap<&'static str, usize>,
}

static REGISTRY: Lazy<FeatureRegistry> = Lazy::new(FeatureRegistry::build);

/// Process-wide registry
pub fn registry() -> &'static FeatureRegistry {
    &REGISTRY
}

impl FeatureRegistry {
    fn build() -> Self {
        let index = FEATURE_LAYOUT
            .iter()
            .enumerate()
            .map(|(slot, &key)| (key, slot))
            .collect();
        Self { index }
    }

    /// Slot of a feature key, `None` if the model was not fit with it
    pub fn get(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    /// Slot of a one-hot key built from a categorical field and raw value
    pub fn one_hot_slot(&self, field: &str, value: &str) -> Option<usize> {
        self.get(&one_hot_key(field, value))
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// All known one-hot slots of a categorical field, in layout order
    pub fn slots_for_field(&self, field: &str) -> Vec<usize> {
        let prefix = format!("{}_", field);
        FEATURE_LAYOUT
            .iter()
            .enumerate()
            .filter(|(_, key)| key.starts_with(&prefix))
            .map(|(slot, _)| slot)
            .collect()
    }
}

/// Build a one-hot key, e.g. ("carbody", "Sedan") → "carbody_sedan"
pub fn one_hot_key(field: &str, value: &str) -> String {
    format!("{}_{}", field, value.to_lowercase())
}

/// Check the static table: size, uniqueness and lowercase keys.
///
/// Run at startup; any error means the binary was built against a layout
/// that cannot match the model and the process must not serve.
pub fn validate_registry() -> Result<(), ConfigurationError> {
    validate_keys(FEATURE_LAYOUT, FEATURE_COUNT)
}

/// Registry rules applied to an arbitrary key table
pub fn validate_keys(keys: &[&str], expected: usize) -> Result<(), ConfigurationError> {
    if keys.len() != expected {
        return Err(ConfigurationError::RegistrySize {
            declared: keys.len(),
            expected,
        });
    }

    let mut seen = HashSet::with_capacity(keys.len());
    for key in keys {
        if !seen.insert(*key) {
            return Err(ConfigurationError::DuplicateFeature(key.to_string()));
        }
        if key.chars().any(|c| c.is_uppercase()) {
            return Err(ConfigurationError::NonLowercaseFeature(key.to_string()));
        }
    }

    Ok(())
}

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// Compute CRC32 hash of the feature layout.
/// Recorded next to the trained model so a reordered build is refused at startup.
pub fn compute_layout_hash() -> u32 {
    let mut hasher = Hasher::new();

    hasher.update(&[FEATURE_VERSION]);

    for name in FEATURE_LAYOUT {
        hasher.update(name.as_bytes());
        hasher.update(&[0]); // Separator
    }

    hasher.finalize()
}

static LAYOUT_HASH: Lazy<u32> = Lazy::new(compute_layout_hash);

/// Get layout hash (cached)
pub fn layout_hash() -> u32 {
    *LAYOUT_HASH
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Complete layout information for serialization/logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
            feature_count: FEATURE_COUNT,
            feature_names: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for LayoutInfo {
    fn default() -> Self {
        Self::current()
    }
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

/// The model was trained against a different layout than this build's
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "Feature layout mismatch: model expects hash {expected:08x}, this build is v{version} (hash: {actual:08x})"
)]
pub struct LayoutMismatchError {
    pub expected: u32,
    pub actual: u32,
    pub version: u8,
}

/// Parse a layout hash as written by `model-info`: 8 hex digits, `0x` optional
pub fn parse_layout_hash(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .unwrap_or(raw);
    u32::from_str_radix(digits, 16).ok()
}

/// Compare the hash recorded with a model against the compiled layout
pub fn check_layout_hash(expected: u32) -> Result<(), LayoutMismatchError> {
    let actual = layout_hash();
    if expected != actual {
        return Err(LayoutMismatchError {
            expected,
            actual,
            version: FEATURE_VERSION,
        });
    }
    Ok(())
}

// ============================================================================
// FEATURE INDEX LOOKUP
// ============================================================================

/// Get feature index by key
pub fn feature_index(name: &str) -> Option<usize> {
    registry().get(name)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_count() {
        assert_eq!(FEATURE_COUNT, 64);
        assert_eq!(FEATURE_LAYOUT.len(), FEATURE_COUNT);
        assert_eq!(registry().len(), FEATURE_COUNT);
    }

    #[test]
    fn test_registry_is_valid() {
        assert!(validate_registry().is_ok());
    }

    #[test]
    fn test_every_slot_assigned_once() {
        let mut seen = [false; FEATURE_COUNT];
        for key in FEATURE_LAYOUT {
            let slot = feature_index(key).unwrap();
            assert!(!seen[slot], "slot {} assigned twice", slot);
            seen[slot] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_layout_hash_consistency() {
        assert_eq!(compute_layout_hash(), compute_layout_hash());
        assert_eq!(layout_hash(), compute_layout_hash());
        assert_ne!(layout_hash(), 0);
    }

    #[test]
    fn test_validate_keys_rejects_wrong_size() {
        let keys = &FEATURE_LAYOUT[..FEATURE_COUNT - 1];
        assert!(matches!(
            validate_keys(keys, FEATURE_COUNT),
            Err(ConfigurationError::RegistrySize { declared: 63, expected: 64 })
        ));
    }

    #[test]
    fn test_validate_keys_rejects_duplicate() {
        let keys = ["horsepower", "carbody_sedan", "horsepower"];
        assert!(matches!(
            validate_keys(&keys, 3),
            Err(ConfigurationError::DuplicateFeature(key)) if key == "horsepower"
        ));
    }

    #[test]
    fn test_validate_keys_rejects_uppercase() {
        let keys = ["horsepower", "carbody_Sedan"];
        assert!(matches!(
            validate_keys(&keys, 2),
            Err(ConfigurationError::NonLowercaseFeature(key)) if key == "carbody_Sedan"
        ));
    }

    #[test]
    fn test_check_layout_hash() {
        assert!(check_layout_hash(layout_hash()).is_ok());

        let err = check_layout_hash(layout_hash().wrapping_add(1)).unwrap_err();
        assert_eq!(err.actual, layout_hash());
        assert_eq!(err.version, FEATURE_VERSION);
        assert!(err.to_string().contains("mismatch"));
    }

    #[test]
    fn test_parse_layout_hash() {
        let hash = layout_hash();
        assert_eq!(parse_layout_hash(&format!("{:08x}", hash)), Some(hash));
        assert_eq!(parse_layout_hash(&format!("0x{:08X}", hash)), Some(hash));
        assert_eq!(parse_layout_hash("not-hex"), None);
        assert_eq!(parse_layout_hash(""), None);
    }

    #[test]
    fn test_feature_index() {
        assert_eq!(feature_index("symboling"), Some(0));
        assert_eq!(feature_index("horsepower"), Some(10));
        assert_eq!(feature_index("fueltype_gas"), Some(14));
        assert_eq!(feature_index("carbody_sedan"), Some(19));
        assert_eq!(feature_index("brand_volvo"), Some(63));
        assert_eq!(feature_index("fueltype_diesel"), None);
        assert_eq!(feature_index("Horsepower"), None);
    }

    #[test]
    fn test_one_hot_slot_lowercases_value() {
        let reg = registry();
        assert_eq!(reg.one_hot_slot("drivewheel", "FWD"), Some(21));
        assert_eq!(reg.one_hot_slot("drivewheel", "fwd"), Some(21));
        assert_eq!(reg.one_hot_slot("drivewheel", "4wd"), None);
    }

    #[test]
    fn test_slots_for_field() {
        let reg = registry();
        assert_eq!(reg.slots_for_field("carbody"), vec![17, 18, 19, 20]);
        assert_eq!(reg.slots_for_field("fueltype"), vec![14]);
        assert_eq!(reg.slots_for_field("brand").len(), 21);
    }

    #[test]
    fn test_layout_info() {
        let info = LayoutInfo::current();
        assert_eq!(info.version, FEATURE_VERSION);
        assert_eq!(info.feature_count, FEATURE_COUNT);
        assert_eq!(info.feature_names.len(), FEATURE_COUNT);
        assert_eq!(info.feature_names[10], "horsepower");
    }
}
