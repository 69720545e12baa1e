/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Typed keyword values

use serde::{Deserialize, Serialize};
use std::fmt;

/// The type a keyword of the inputcard expects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueKind {
    Bool,
    Int,
    Float,
    Text,
    IntArray,
    FloatArray,
    TextArray,
    Matrix,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Bool => "bool",
            ValueKind::Int => "integer",
            ValueKind::Float => "float",
            ValueKind::Text => "string",
            ValueKind::IntArray => "integer array",
            ValueKind::FloatArray => "float array",
            ValueKind::TextArray => "string array",
            ValueKind::Matrix => "float matrix",
        };
        f.write_str(name)
    }
}

/// A keyword value as read from JSON or an inputcard
///
/// Untagged so that plain JSON parameter files (`{"LMAX": 2, "RMAX": 7.0}`)
/// deserialize directly. Integers and floats are reconciled against the
/// keyword schema by [`ParamValue::coerce`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    IntArray(Vec<i64>),
    FloatArray(Vec<f64>),
    TextArray(Vec<String>),
    Matrix(Vec<Vec<f64>>),
}

impl ParamValue {
    /// The kind this value currently has
    pub fn kind(&self) -> ValueKind {
        match self {
            ParamValue::Bool(_) => ValueKind::Bool,
            ParamValue::Int(_) => ValueKind::Int,
            ParamValue::Float(_) => ValueKind::Float,
            ParamValue::Text(_) => ValueKind::Text,
            ParamValue::IntArray(_) => ValueKind::IntArray,
            ParamValue::FloatArray(_) => ValueKind::FloatArray,
            ParamValue::TextArray(_) => ValueKind::TextArray,
            ParamValue::Matrix(_) => ValueKind::Matrix,
        }
    }

    /// Convert into the requested kind where this is lossless
    ///
    /// Returns `None` when the value cannot represent the kind, e.g. a
    /// non-integral float for an integer keyword.
    pub fn coerce(self, kind: ValueKind) -> Option<ParamValue> {
        if self.kind() == kind {
            return Some(self);
        }
        match (self, kind) {
            (ParamValue::Int(i), ValueKind::Float) => Some(ParamValue::Float(i as f64)),
            (ParamValue::Float(x), ValueKind::Int) if x.fract() == 0.0 => {
                Some(ParamValue::Int(x as i64))
            }
            (ParamValue::IntArray(v), ValueKind::FloatArray) => {
                Some(ParamValue::FloatArray(v.into_iter().map(|i| i as f64).collect()))
            }
            (ParamValue::FloatArray(v), ValueKind::IntArray)
                if v.iter().all(|x| x.fract() == 0.0) =>
            {
                Some(ParamValue::IntArray(v.into_iter().map(|x| x as i64).collect()))
            }
            (ParamValue::Int(i), ValueKind::FloatArray) => {
                Some(ParamValue::FloatArray(vec![i as f64]))
            }
            (ParamValue::Float(x), ValueKind::FloatArray) => Some(ParamValue::FloatArray(vec![x])),
            (ParamValue::Text(s), ValueKind::TextArray) => Some(ParamValue::TextArray(vec![s])),
            (ParamValue::IntArray(v), ValueKind::Matrix) if v.is_empty() => {
                Some(ParamValue::Matrix(Vec::new()))
            }
            (ParamValue::IntArray(v), ValueKind::TextArray) if v.is_empty() => {
                Some(ParamValue::TextArray(Vec::new()))
            }
            _ => None,
        }
    }

    /// Value as a float, if it is numeric
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Int(i) => Some(*i as f64),
            ParamValue::Float(x) => Some(*x),
            _ => None,
        }
    }

    /// Value as an integer, if it is integral
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Int(i) => Some(*i),
            ParamValue::Float(x) if x.fract() == 0.0 => Some(*x as i64),
            _ => None,
        }
    }

    /// Value as a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Value as a list of strings
    pub fn as_text_list(&self) -> Option<Vec<String>> {
        match self {
            ParamValue::Text(s) => Some(vec![s.clone()]),
            ParamValue::TextArray(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl From<f64> for ParamValue {
    fn from(x: f64) -> Self {
        ParamValue::Float(x)
    }
}

impl From<i64> for ParamValue {
    fn from(i: i64) -> Self {
        ParamValue::Int(i)
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        ParamValue::Bool(b)
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Text(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untagged_deserialization() {
        let v: ParamValue = serde_json::from_str("2").unwrap();
        assert_eq!(v, ParamValue::Int(2));
        let v: ParamValue = serde_json::from_str("2.3").unwrap();
        assert_eq!(v, ParamValue::Float(2.3));
        let v: ParamValue = serde_json::from_str("[40, 40, 40]").unwrap();
        assert_eq!(v, ParamValue::IntArray(vec![40, 40, 40]));
        let v: ParamValue = serde_json::from_str("[[0.5, 0.5, 0.0]]").unwrap();
        assert_eq!(v, ParamValue::Matrix(vec![vec![0.5, 0.5, 0.0]]));
        let v: ParamValue = serde_json::from_str("[\"qdos\"]").unwrap();
        assert_eq!(v, ParamValue::TextArray(vec!["qdos".to_string()]));
    }

    #[test]
    fn test_coercion() {
        assert_eq!(
            ParamValue::Int(7).coerce(ValueKind::Float),
            Some(ParamValue::Float(7.0))
        );
        assert_eq!(
            ParamValue::Float(200.0).coerce(ValueKind::Int),
            Some(ParamValue::Int(200))
        );
        assert_eq!(ParamValue::Float(2.5).coerce(ValueKind::Int), None);
        assert_eq!(ParamValue::Text("x".into()).coerce(ValueKind::Float), None);
    }

    #[test]
    fn test_empty_array_takes_any_array_kind() {
        let empty: ParamValue = serde_json::from_str("[]").unwrap();
        assert_eq!(empty, ParamValue::IntArray(Vec::new()));
        assert_eq!(
            empty.clone().coerce(ValueKind::TextArray),
            Some(ParamValue::TextArray(Vec::new()))
        );
        assert_eq!(
            empty.clone().coerce(ValueKind::FloatArray),
            Some(ParamValue::FloatArray(Vec::new()))
        );
        assert_eq!(empty.coerce(ValueKind::Matrix), Some(ParamValue::Matrix(Vec::new())));
        assert_eq!(ParamValue::IntArray(vec![1]).coerce(ValueKind::TextArray), None);
    }
}
