//! Named-field event records.
//!
//! A [`Record`] is the storage-agnostic form of one event as exchanged with
//! readers and writers: a map from field name to a scalar or a column of
//! numbers. Input and output records share the same field names.

use crate::error::{Error, Result};
use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The value of one named field.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Value {
    Int(i64),
    Float(f64),
    IntArray(Vec<i64>),
    FloatArray(Vec<f64>),
}

impl Value {
    /// Number of entries; scalars count as one.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Value::Int(_) | Value::Float(_) => 1,
            Value::IntArray(v) => v.len(),
            Value::FloatArray(v) => v.len(),
        }
    }

    /// Returns true if this is an empty array.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true for scalar values.
    #[must_use]
    pub fn is_scalar(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    /// Returns the column as floats.
    ///
    /// # Errors
    /// Returns [`Error::FieldShape`] if the value is a scalar.
    #[allow(clippy::cast_precision_loss)]
    pub fn to_floats(&self, field: &str) -> Result<Vec<f64>> {
        match self {
            Value::FloatArray(v) => Ok(v.clone()),
            Value::IntArray(v) => Ok(v.iter().map(|&x| x as f64).collect()),
            Value::Int(_) | Value::Float(_) => Err(Error::FieldShape {
                field: field.to_string(),
                reason: "expected an array, found a scalar".to_string(),
            }),
        }
    }

    /// Returns the column as integers.
    ///
    /// Float columns are accepted when every entry is integral.
    ///
    /// # Errors
    /// Returns [`Error::FieldShape`] for scalars and [`Error::NonIntegral`]
    /// for fractional or non-finite entries.
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_ints(&self, field: &str) -> Result<Vec<i64>> {
        match self {
            Value::IntArray(v) => Ok(v.clone()),
            Value::FloatArray(v) => v
                .iter()
                .enumerate()
                .map(|(index, &value)| {
                    if value.is_finite()
                        && value.fract() == 0.0
                        && value >= i64::MIN as f64
                        && value <= i64::MAX as f64
                    {
                        Ok(value as i64)
                    } else {
                        Err(Error::NonIntegral {
                            field: field.to_string(),
                            index,
                            value,
                        })
                    }
                })
                .collect(),
            Value::Int(_) | Value::Float(_) => Err(Error::FieldShape {
                field: field.to_string(),
                reason: "expected an array, found a scalar".to_string(),
            }),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<Vec<f64>> for Value {
    fn from(v: Vec<f64>) -> Self {
        Value::FloatArray(v)
    }
}

impl From<Vec<i64>> for Value {
    fn from(v: Vec<i64>) -> Self {
        Value::IntArray(v)
    }
}

/// One event as a set of named fields.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a field.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Builder-style [`Record::insert`].
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Returns a field by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Returns a field by name, or a [`Error::SchemaMismatch`] naming it.
    ///
    /// # Errors
    /// Returns an error if the field is absent.
    pub fn require(&self, name: &str) -> Result<&Value> {
        self.get(name)
            .ok_or_else(|| Error::schema_mismatch(name, &[name]))
    }

    /// Returns true if the field is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Iterates over field names in sorted order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the record has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_column_to_ints() {
        let value = Value::FloatArray(vec![1.0, 1001.0, -3.0]);
        assert_eq!(value.to_ints("Detector").unwrap(), vec![1, 1001, -3]);
    }

    #[test]
    fn test_fractional_column_rejected() {
        let value = Value::FloatArray(vec![1.0, 2.5]);
        let err = value.to_ints("PDG").unwrap_err();
        assert_eq!(
            err,
            Error::NonIntegral {
                field: "PDG".to_string(),
                index: 1,
                value: 2.5,
            }
        );
    }

    #[test]
    fn test_scalar_is_not_a_column() {
        let value = Value::Int(4);
        assert!(matches!(
            value.to_floats("N_HITS"),
            Err(Error::FieldShape { .. })
        ));
    }

    #[test]
    fn test_require_missing_field() {
        let record = Record::new().with("Time", vec![0.0]);
        assert!(record.contains("Time"));
        assert!(matches!(
            record.require("Deposit"),
            Err(Error::SchemaMismatch { field, .. }) if field == "Deposit"
        ));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_record_json_shape() {
        let json = r#"{"Deposit":[0.5,1],"PDG":[13,-13],"N_HITS":2}"#;
        let record: Record = serde_json::from_str(json).unwrap();

        assert_eq!(record.get("Deposit"), Some(&Value::FloatArray(vec![0.5, 1.0])));
        assert_eq!(record.get("PDG"), Some(&Value::IntArray(vec![13, -13])));
        assert_eq!(record.get("N_HITS"), Some(&Value::Int(2)));
    }
}
