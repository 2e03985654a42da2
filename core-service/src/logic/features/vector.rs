//! Feature Vector - Model input
//!
//! Fixed-width `f32` array in `FEATURE_LAYOUT` order. Built fresh per
//! request by the encoder and handed to the inference adapter by reference.

use super::layout::FEATURE_COUNT;

/// One per request; all slots start at `0.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: [f32; FEATURE_COUNT],
}

impl FeatureVector {
    /// Create a new zeroed feature vector
    pub fn new() -> Self {
        Self {
            values: [0.0; FEATURE_COUNT],
        }
    }

    /// Get values as array reference
    pub fn as_array(&self) -> &[f32; FEATURE_COUNT] {
        &self.values
    }

    /// Get values as slice
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get feature by index
    pub fn get(&self, index: usize) -> Option<f32> {
        self.values.get(index).copied()
    }

    /// Set feature by index, ignoring out-of-range slots
    pub fn set(&mut self, index: usize, value: f32) {
        if let Some(slot) = self.values.get_mut(index) {
            *slot = value;
        }
    }
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_vector_new() {
        let vector = FeatureVector::new();
        assert_eq!(vector.len(), FEATURE_COUNT);
        assert!(vector.as_slice().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_set_and_get() {
        let mut vector = FeatureVector::new();
        vector.set(10, 111.0);
        assert_eq!(vector.get(10), Some(111.0));
        assert_eq!(vector.as_array()[10], 111.0);
    }

    #[test]
    fn test_set_out_of_range_is_ignored() {
        let mut vector = FeatureVector::new();
        vector.set(FEATURE_COUNT, 5.0);
        assert_eq!(vector, FeatureVector::new());
        assert_eq!(vector.get(FEATURE_COUNT), None);
    }
}
