//! Base implementation of records.
use crate::error::HraError;
use std::collections::HashMap;

/// Named scalar values, such as the loss of an optimization step.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Record(HashMap<String, f32>);

impl Record {
    /// Creates a record containing a single scalar value.
    pub fn from_scalar(name: impl Into<String>, value: f32) -> Self {
        Self(HashMap::from([(name.into(), value)]))
    }

    /// Gets a scalar value from the record.
    pub fn get_scalar(&self, k: &str) -> Result<f32, HraError> {
        self.0
            .get(k)
            .copied()
            .ok_or_else(|| HraError::RecordKeyError(k.to_string()))
    }
}
