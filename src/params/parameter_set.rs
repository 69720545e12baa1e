/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Validated, immutable keyword → value sets

use super::errors::{ParamError, ParameterDeficiencies, Result};
use super::keywords::{self, KeyScope};
use super::value::ParamValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// A set of inputcard keywords that passed schema validation
///
/// Every key is a canonical schema name and every value has the schema type.
/// Sets are never changed in place: the `with_*` methods return new sets, so a
/// set stored in the provenance graph stays what it was when it was stored.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, ParamValue>",
    into = "BTreeMap<String, ParamValue>"
)]
pub struct ParameterSet {
    values: BTreeMap<&'static str, ParamValue>,
}

impl ParameterSet {
    /// Create an empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from raw key/value pairs
    ///
    /// All unknown and mistyped keys are collected into a single
    /// [`ParamError::InvalidParameter`].
    pub fn from_map<I, K>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, ParamValue)>,
        K: AsRef<str>,
    {
        Self::new().with_values(entries)
    }

    /// Load a set from a JSON object file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let raw: BTreeMap<String, ParamValue> = serde_json::from_reader(reader)?;
        Self::from_map(raw)
    }

    /// New set with one more (or one replaced) keyword
    pub fn with_value<V: Into<ParamValue>>(&self, key: &str, value: V) -> Result<Self> {
        self.with_values([(key, value.into())])
    }

    /// New set with several keywords added or replaced
    pub fn with_values<I, K>(&self, entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, ParamValue)>,
        K: AsRef<str>,
    {
        let mut values = self.values.clone();
        let mut report = ParameterDeficiencies::default();

        for (key, value) in entries {
            let key = key.as_ref();
            let Some(spec) = keywords::lookup(key) else {
                report.unknown.push(key.to_string());
                continue;
            };
            match value.coerce(spec.kind) {
                Some(value) => {
                    values.insert(spec.name, value);
                }
                None => report.mistyped.push((spec.name.to_string(), spec.kind)),
            }
        }

        report.into_result()?;
        Ok(Self { values })
    }

    /// New set where the keys of `other` override the keys of `self`
    pub fn merged_with(&self, other: &ParameterSet) -> Self {
        let mut values = self.values.clone();
        values.extend(other.values.iter().map(|(k, v)| (*k, v.clone())));
        Self { values }
    }

    /// New set without the given keyword
    pub fn without(&self, key: &str) -> Self {
        let mut values = self.values.clone();
        if let Some(name) = keywords::canonical_name(key) {
            values.remove(name);
        }
        Self { values }
    }

    /// Get a value by any accepted spelling of its key
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        keywords::canonical_name(key).and_then(|name| self.values.get(name))
    }

    /// Get a numeric value as a float
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(ParamValue::as_f64)
    }

    /// Get an integral value
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(ParamValue::as_i64)
    }

    /// Whether a keyword is set
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Number of keywords set
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no keyword is set
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate in inputcard order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &ParamValue)> {
        let mut entries: Vec<_> = self.values.iter().map(|(k, v)| (*k, v)).collect();
        entries.sort_by_key(|(k, _)| keywords::order(k));
        entries.into_iter()
    }

    /// All mandatory keywords of the scope that are not set
    pub fn missing_keys(&self, scope: KeyScope) -> Vec<&'static str> {
        keywords::mandatory_keys(scope)
            .map(|spec| spec.name)
            .filter(|name| !self.values.contains_key(name))
            .collect()
    }

    /// Check that every mandatory keyword of the scope is set
    pub fn validate(&self, scope: KeyScope) -> Result<()> {
        ParameterDeficiencies {
            missing: self
                .missing_keys(scope)
                .into_iter()
                .map(String::from)
                .collect(),
            ..Default::default()
        }
        .into_result()
    }

    /// Backfill missing mandatory keywords that have defaults
    ///
    /// Returns the completed set and the keys that were added. Keys without a
    /// default stay missing; check them with [`ParameterSet::validate`].
    pub fn fill_defaults(&self, scope: KeyScope) -> (Self, Vec<&'static str>) {
        let mut values = self.values.clone();
        let mut added = Vec::new();
        for name in self.missing_keys(scope) {
            if let Some(default) = keywords::default_value(name) {
                values.insert(name, default.clone());
                added.push(name);
            }
        }
        (Self { values }, added)
    }
}

impl TryFrom<BTreeMap<String, ParamValue>> for ParameterSet {
    type Error = ParamError;

    fn try_from(raw: BTreeMap<String, ParamValue>) -> Result<Self> {
        Self::from_map(raw)
    }
}

impl From<ParameterSet> for BTreeMap<String, ParamValue> {
    fn from(set: ParameterSet) -> Self {
        set.values
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_and_mistyped_collected() {
        let result = ParameterSet::from_map([
            ("LMAX", ParamValue::Text("two".into())),
            ("FOO", ParamValue::Int(1)),
            ("BAR", ParamValue::Int(2)),
            ("RMAX", ParamValue::Int(7)),
        ]);
        let err = result.unwrap_err();
        let report = err.deficiencies().unwrap();
        assert_eq!(report.unknown, vec!["FOO".to_string(), "BAR".to_string()]);
        assert_eq!(report.mistyped.len(), 1);
        assert_eq!(report.mistyped[0].0, "LMAX");
    }

    #[test]
    fn test_with_value_does_not_touch_original() {
        let base = ParameterSet::new().with_value("LMAX", 2_i64).unwrap();
        let patched = base.with_value("LMAX", 3_i64).unwrap();
        assert_eq!(base.get_i64("LMAX"), Some(2));
        assert_eq!(patched.get_i64("LMAX"), Some(3));
    }

    #[test]
    fn test_int_coerced_to_float() {
        let set = ParameterSet::new().with_value("RMAX", 7_i64).unwrap();
        assert_eq!(set.get("RMAX"), Some(&ParamValue::Float(7.0)));
    }

    #[test]
    fn test_fill_defaults() {
        let set = ParameterSet::new().with_value("LMAX", 2_i64).unwrap();
        let (filled, added) = set.fill_defaults(KeyScope::Calculation);
        assert!(added.contains(&"EMIN"));
        assert_eq!(filled.get_f64("TEMPR"), Some(800.0));
        assert_eq!(
            filled.missing_keys(KeyScope::Calculation),
            vec!["NSPIN", "RMAX", "GMAX"]
        );
    }

    #[test]
    fn test_serde_roundtrip_validates() {
        let json = r#"{"LMAX": 2, "RMAX": 7, "rclustz": 1.9}"#;
        let set: ParameterSet = serde_json::from_str(json).unwrap();
        assert_eq!(set.get_f64("RCLUSTZ"), Some(1.9));
        assert!(serde_json::from_str::<ParameterSet>(r#"{"NOPE": 1}"#).is_err());
    }

    #[test]
    fn test_iter_in_inputcard_order() {
        let set = ParameterSet::from_map([
            ("NSPIN", ParamValue::Int(1)),
            ("ALATBASIS", ParamValue::Float(6.83)),
            ("LMAX", ParamValue::Int(2)),
        ])
        .unwrap();
        let keys: Vec<_> = set.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["ALATBASIS", "LMAX", "NSPIN"]);
    }
}
