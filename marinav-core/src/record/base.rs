//! Base implementation of records.
//!
//! A [`Record`] is a string-keyed tree of numeric, textual and nested values.
//! Environments describe finished episodes with records, rollouts extend them
//! with telemetry, and the checkpointer writes them out as plain JSON.

use crate::error::MarinavError;
use serde::{Deserialize, Serialize};
use std::{
    collections::btree_map::{BTreeMap, IntoIter, Iter, Keys},
    convert::Into,
};

/// Represents possible types of values that can be stored in a [`Record`].
///
/// Values are serialized without tags, so a record turns into the plain nested
/// JSON structure its contents suggest. Ragged arrays are allowed: the rows of
/// an `Array2` need not have equal lengths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordValue {
    /// A flag.
    Bool(bool),

    /// A single floating-point value.
    Scalar(f64),

    /// A text value.
    String(String),

    /// A 1-dimensional array.
    Array1(Vec<f64>),

    /// A 2-dimensional, possibly ragged, array.
    Array2(Vec<Vec<f64>>),

    /// A 3-dimensional, possibly ragged, array.
    Array3(Vec<Vec<Vec<f64>>>),

    /// A nested record.
    Record(Record),
}

/// A container for storing key-value pairs of various data types.
///
/// Keys are kept ordered so that serialized records are stable across runs.
///
/// # Examples
///
/// ```rust
/// use marinav_core::record::{Record, RecordValue};
///
/// let mut robot = Record::empty();
/// robot.insert("init_speed", RecordValue::Scalar(1.0));
/// robot.insert("actions", RecordValue::Array1(vec![4.0, 4.0, 1.0]));
///
/// let mut record = Record::empty();
/// record.insert("robot", RecordValue::Record(robot));
///
/// let speed = record.get_record("robot").unwrap().get_scalar("init_speed").unwrap();
/// assert_eq!(speed, 1.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(BTreeMap<String, RecordValue>);

impl Record {
    /// Creates an empty record.
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    /// Creates a record containing a single scalar value.
    pub fn from_scalar(name: impl Into<String>, value: f64) -> Self {
        let mut map = BTreeMap::new();
        map.insert(name.into(), RecordValue::Scalar(value));
        Self(map)
    }

    /// Creates a record from a slice of key-value pairs.
    pub fn from_slice<K: Into<String> + Clone>(s: &[(K, RecordValue)]) -> Self {
        Self(
            s.iter()
                .map(|(k, v)| (k.clone().into(), v.clone()))
                .collect(),
        )
    }

    /// Returns an iterator over the keys in the record.
    pub fn keys(&self) -> Keys<String, RecordValue> {
        self.0.keys()
    }

    /// Inserts a key-value pair into the record, replacing any previous value.
    pub fn insert(&mut self, k: impl Into<String>, v: RecordValue) {
        self.0.insert(k.into(), v);
    }

    /// Returns an iterator over the key-value pairs in the record.
    pub fn iter(&self) -> Iter<'_, String, RecordValue> {
        self.0.iter()
    }

    /// Returns an iterator that consumes the record.
    pub fn into_iter_in_record(self) -> IntoIter<String, RecordValue> {
        self.0.into_iter()
    }

    /// Gets a reference to the value associated with the given key.
    pub fn get(&self, k: &str) -> Option<&RecordValue> {
        self.0.get(k)
    }

    /// Merges two records, consuming both.
    ///
    /// Values of the second record win on key collisions.
    pub fn merge(self, record: Record) -> Self {
        Record(self.0.into_iter().chain(record.0).collect())
    }

    /// Merges another record into this one in place.
    pub fn merge_inplace(&mut self, record: Record) {
        for (k, v) in record.into_iter_in_record() {
            self.0.insert(k, v);
        }
    }

    /// Gets a scalar value from the record.
    pub fn get_scalar(&self, k: &str) -> Result<f64, MarinavError> {
        match self.0.get(k) {
            Some(RecordValue::Scalar(v)) => Ok(*v),
            Some(_) => Err(MarinavError::RecordValueTypeError("Scalar".to_string())),
            None => Err(MarinavError::RecordKeyError(k.to_string())),
        }
    }

    /// Gets a flag from the record.
    pub fn get_bool(&self, k: &str) -> Result<bool, MarinavError> {
        match self.0.get(k) {
            Some(RecordValue::Bool(v)) => Ok(*v),
            Some(_) => Err(MarinavError::RecordValueTypeError("Bool".to_string())),
            None => Err(MarinavError::RecordKeyError(k.to_string())),
        }
    }

    /// Gets a 1-dimensional array from the record.
    pub fn get_array1(&self, k: &str) -> Result<&[f64], MarinavError> {
        match self.0.get(k) {
            Some(RecordValue::Array1(v)) => Ok(v),
            Some(_) => Err(MarinavError::RecordValueTypeError("Array1".to_string())),
            None => Err(MarinavError::RecordKeyError(k.to_string())),
        }
    }

    /// Gets a 2-dimensional array from the record.
    ///
    /// An empty array deserializes as `Array1`, so it is accepted here as well.
    pub fn get_array2(&self, k: &str) -> Result<Vec<Vec<f64>>, MarinavError> {
        match self.0.get(k) {
            Some(RecordValue::Array2(v)) => Ok(v.clone()),
            Some(RecordValue::Array1(v)) if v.is_empty() => Ok(vec![]),
            Some(_) => Err(MarinavError::RecordValueTypeError("Array2".to_string())),
            None => Err(MarinavError::RecordKeyError(k.to_string())),
        }
    }

    /// Gets a 3-dimensional array from the record.
    pub fn get_array3(&self, k: &str) -> Result<Vec<Vec<Vec<f64>>>, MarinavError> {
        match self.0.get(k) {
            Some(RecordValue::Array3(v)) => Ok(v.clone()),
            Some(RecordValue::Array1(v)) if v.is_empty() => Ok(vec![]),
            Some(_) => Err(MarinavError::RecordValueTypeError("Array3".to_string())),
            None => Err(MarinavError::RecordKeyError(k.to_string())),
        }
    }

    /// Gets a string value from the record.
    pub fn get_string(&self, k: &str) -> Result<&str, MarinavError> {
        match self.0.get(k) {
            Some(RecordValue::String(s)) => Ok(s),
            Some(_) => Err(MarinavError::RecordValueTypeError("String".to_string())),
            None => Err(MarinavError::RecordKeyError(k.to_string())),
        }
    }

    /// Gets a nested record.
    pub fn get_record(&self, k: &str) -> Result<&Record, MarinavError> {
        match self.0.get(k) {
            Some(RecordValue::Record(r)) => Ok(r),
            Some(_) => Err(MarinavError::RecordValueTypeError("Record".to_string())),
            None => Err(MarinavError::RecordKeyError(k.to_string())),
        }
    }

    /// Gets a nested record for modification, creating it if the key is absent.
    pub fn record_entry(&mut self, k: &str) -> Result<&mut Record, MarinavError> {
        let value = self
            .0
            .entry(k.to_string())
            .or_insert_with(|| RecordValue::Record(Record::empty()));
        match value {
            RecordValue::Record(r) => Ok(r),
            _ => Err(MarinavError::RecordValueTypeError("Record".to_string())),
        }
    }

    /// Returns the number of entries at the top level.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Checks if the record is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_record_entry_creates_nested_record() -> Result<()> {
        let mut record = Record::from_scalar("discount", 0.99);
        record
            .record_entry("robot")?
            .insert("actions_cvars", RecordValue::Array1(vec![1.0]));

        let robot = record.get_record("robot")?;
        assert_eq!(robot.get_array1("actions_cvars")?, &[1.0]);

        // A non-record value under the key is a type error
        assert!(record.record_entry("discount").is_err());
        Ok(())
    }

    #[test]
    fn test_record_serializes_as_plain_json() -> Result<()> {
        let mut record = Record::empty();
        record.insert("success", RecordValue::Bool(true));
        record.insert(
            "quantiles",
            RecordValue::Array2(vec![vec![1.0, 2.0], vec![3.0]]),
        );
        let json = serde_json::to_string(&record)?;
        assert_eq!(json, r#"{"quantiles":[[1.0,2.0],[3.0]],"success":true}"#);

        let restored: Record = serde_json::from_str(&json)?;
        assert_eq!(restored, record);
        Ok(())
    }

    #[test]
    fn test_typed_getters_report_errors() {
        let record = Record::from_slice(&[("name", RecordValue::String("APF".to_string()))]);
        assert!(matches!(
            record.get_scalar("name"),
            Err(MarinavError::RecordValueTypeError(_))
        ));
        assert!(matches!(
            record.get_scalar("missing"),
            Err(MarinavError::RecordKeyError(_))
        ));
    }
}
