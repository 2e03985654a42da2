//! Feature Encoder - CarAttributes → FeatureVector
//!
//! Total and pure. Numeric fields are written to their fixed slots as `f32`;
//! each categorical field sets at most one one-hot slot to `1.0`.
//!
//! Unknown categorical values are dropped silently: the field contributes an
//! all-zero encoding. Prediction output depends on this, so it must not turn
//! into a hard error here.

use super::layout::{registry, FeatureRegistry};
use super::record::CarAttributes;
use super::vector::FeatureVector;

/// Categorical fields whose value matched no registry slot.
///
/// Fields with a dropped reference category (e.g. `fueltype = "diesel"`)
/// show up here too; being listed is not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodingReport {
    pub unmatched: Vec<UnmatchedValue>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmatchedValue {
    pub field: &'static str,
    pub value: String,
}

impl EncodingReport {
    pub fn is_clean(&self) -> bool {
        self.unmatched.is_empty()
    }

    pub fn fields(&self) -> Vec<&'static str> {
        self.unmatched.iter().map(|u| u.field).collect()
    }
}

/// Encode a record against the process-wide registry
pub fn encode(record: &CarAttributes) -> FeatureVector {
    encode_with_report(record).0
}

/// Encode a record and report which categorical values matched nothing
pub fn encode_with_report(record: &CarAttributes) -> (FeatureVector, EncodingReport) {
    encode_with(registry(), record)
}

/// Encode against an explicit registry
pub fn encode_with(
    registry: &FeatureRegistry,
    record: &CarAttributes,
) -> (FeatureVector, EncodingReport) {
    let mut vector = FeatureVector::new();
    let mut report = EncodingReport::default();

    for (name, value) in record.numeric_values() {
        if let Some(slot) = registry.get(name) {
            vector.set(slot, value);
        }
    }

    for (field, value) in record.categorical_values() {
        match registry.one_hot_slot(field, value) {
            Some(slot) => vector.set(slot, 1.0),
            None => report.unmatched.push(UnmatchedValue {
                field,
                value: value.to_string(),
            }),
        }
    }

    if !report.is_clean() {
        log::debug!(
            "Encoded record with {} unmatched categorical value(s): {:?}",
            report.unmatched.len(),
            report.fields()
        );
    }

    (vector, report)
}
