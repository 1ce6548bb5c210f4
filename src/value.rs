//! Provides the host-visible value encodings exchanged with the scripting host.
//!
//! Every attribute declares one [`ValueKind`]; the adapter checks supplied
//! values against it before any native call is made.
//!
//! # Examples
//! ```
//! use temscript::value::{Value, ValueKind};
//!
//! let value = Value::from(1.5);
//! assert_eq!(value.kind(), ValueKind::Double);
//! assert_eq!(value.as_double(), Some(1.5));
//! ```

use std::fmt;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::gun1::HighTensionState;

/// Names the encoding of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// A scalar double.
    Double,
    /// Two doubles in (x, y) order.
    Vector,
    /// A symbolic state backed by a bounded native integer.
    Enum,
    /// A (min, max) pair returned by range queries.
    Range,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Double => "double",
            Self::Vector => "vector",
            Self::Enum => "enum",
            Self::Range => "range",
        })
    }
}

/// Represents a closed interval reported by a native range query.
///
/// # Examples
/// ```
/// use temscript::value::Range;
///
/// let range = Range::new(-5.0, 5.0);
/// assert!(range.contains(0.0));
/// assert!(!range.contains(6.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
}

impl Range {
    /// Creates a range from its bounds.
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Returns whether `value` lies within the bounds, inclusive.
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// A value as seen by the scripting host.
///
/// Serialized untagged, so JSON `1.5`, `[1.0, 2.0]`, `"On"` and
/// `{"min": -5.0, "max": 5.0}` map onto the four encodings.
///
/// # Examples
/// ```
/// use temscript::value::Value;
///
/// let value: Value = serde_json::from_str("[0.5, -0.25]").unwrap();
/// assert_eq!(value.as_vector().map(|v| (v.x, v.y)), Some((0.5, -0.25)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Scalar double.
    Double(f64),
    /// Two-component vector in (x, y) order.
    Vector(DVec2),
    /// Symbolic high tension state.
    Enum(HighTensionState),
    /// Min/max pair.
    Range(Range),
}

impl Value {
    /// Returns the encoding of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Double(_) => ValueKind::Double,
            Self::Vector(_) => ValueKind::Vector,
            Self::Enum(_) => ValueKind::Enum,
            Self::Range(_) => ValueKind::Range,
        }
    }

    /// Returns the scalar if this is a double.
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Self::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the vector if this is a vector.
    pub fn as_vector(&self) -> Option<DVec2> {
        match self {
            Self::Vector(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the state if this is an enum.
    pub fn as_enum(&self) -> Option<HighTensionState> {
        match self {
            Self::Enum(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the range if this is a range.
    pub fn as_range(&self) -> Option<Range> {
        match self {
            Self::Range(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<DVec2> for Value {
    fn from(value: DVec2) -> Self {
        Self::Vector(value)
    }
}

impl From<HighTensionState> for Value {
    fn from(value: HighTensionState) -> Self {
        Self::Enum(value)
    }
}

impl From<Range> for Value {
    fn from(value: Range) -> Self {
        Self::Range(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Double(v) => write!(f, "{v}"),
            Self::Vector(v) => write!(f, "({}, {})", v.x, v.y),
            Self::Enum(v) => write!(f, "{v}"),
            Self::Range(r) => write!(f, "({}, {})", r.min, r.max),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_encodings_pick_the_right_kind() {
        let cases = [
            ("2.5", ValueKind::Double),
            ("3", ValueKind::Double),
            ("[1.0, 2.0]", ValueKind::Vector),
            ("\"On\"", ValueKind::Enum),
            ("{\"min\": -1.0, \"max\": 1.0}", ValueKind::Range),
        ];
        for (json, kind) in cases {
            let value: Value = serde_json::from_str(json).unwrap();
            assert_eq!(value.kind(), kind, "{json}");
        }
    }

    #[test]
    fn test_vector_serializes_x_then_y() {
        let json = serde_json::to_string(&Value::Vector(DVec2::new(1.0, -2.0))).unwrap();
        assert_eq!(json, "[1.0,-2.0]");
    }

    #[test]
    fn test_range_serializes_as_record() {
        let json = serde_json::to_value(Value::Range(Range::new(-5.0, 5.0))).unwrap();
        assert_eq!(json, serde_json::json!({"min": -5.0, "max": 5.0}));
    }

    #[test]
    fn test_accessors_reject_other_kinds() {
        let value = Value::Enum(HighTensionState::On);
        assert_eq!(value.as_double(), None);
        assert_eq!(value.as_vector(), None);
        assert_eq!(value.as_enum(), Some(HighTensionState::On));
    }
}
