//! Provides the value-encoding strategies shared by all generated accessors.
//!
//! An [`Encoding`] converts between a native accessor's type and the host
//! [`Value`]. The accessor macros in [`crate::com::macros`] are parameterized
//! by one of these strategies, so a property only names its encoding.
//!
//! # Examples
//! ```
//! use temscript::encoding::{DoubleEncoding, Encoding};
//! use temscript::value::{Value, ValueKind};
//!
//! assert_eq!(DoubleEncoding::KIND, ValueKind::Double);
//! assert_eq!(DoubleEncoding::encode(2.0), Ok(Value::Double(2.0)));
//! ```

use std::marker::PhantomData;

use glam::DVec2;

use crate::error::{BindingError, BindingResult};
use crate::value::{Value, ValueKind};

/// Converts between a native accessor type and a host value.
pub trait Encoding {
    /// Type produced and consumed by the native accessor.
    type Native;

    /// Host encoding declared for properties using this strategy.
    const KIND: ValueKind;

    /// Converts a native result into a host value.
    ///
    /// # Errors
    /// Fails when the native value has no host representation.
    fn encode(native: Self::Native) -> BindingResult<Value>;

    /// Converts a host value into the native argument for `property`.
    ///
    /// # Errors
    /// Returns `TypeMismatch` if `value` is not of [`Self::KIND`].
    fn decode(property: &'static str, value: Value) -> BindingResult<Self::Native>;
}

fn mismatch(property: &'static str, expected: ValueKind, value: &Value) -> BindingError {
    BindingError::TypeMismatch {
        name: property,
        expected,
        found: value.kind(),
    }
}

/// Scalar double properties.
pub struct DoubleEncoding;

impl Encoding for DoubleEncoding {
    type Native = f64;
    const KIND: ValueKind = ValueKind::Double;

    fn encode(native: f64) -> BindingResult<Value> {
        Ok(Value::Double(native))
    }

    fn decode(property: &'static str, value: Value) -> BindingResult<f64> {
        value
            .as_double()
            .ok_or_else(|| mismatch(property, Self::KIND, &value))
    }
}

/// Two-component (x, y) vector properties. Both components always travel
/// together.
pub struct VectorEncoding;

impl Encoding for VectorEncoding {
    type Native = DVec2;
    const KIND: ValueKind = ValueKind::Vector;

    fn encode(native: DVec2) -> BindingResult<Value> {
        Ok(Value::Vector(native))
    }

    fn decode(property: &'static str, value: Value) -> BindingResult<DVec2> {
        value
            .as_vector()
            .ok_or_else(|| mismatch(property, Self::KIND, &value))
    }
}

/// A symbolic state backed by a bounded native integer.
///
/// # Examples
/// ```
/// use temscript::encoding::SymbolicEnum;
/// use temscript::gun1::HighTensionState;
///
/// assert_eq!(HighTensionState::from_raw(3), Some(HighTensionState::On));
/// assert_eq!(HighTensionState::from_raw(0), None);
/// assert_eq!(HighTensionState::Off.to_raw(), 2);
/// ```
pub trait SymbolicEnum: Copy + Into<Value> {
    /// Maps a native integer onto a symbol, `None` when out of range.
    fn from_raw(raw: i32) -> Option<Self>;

    /// Returns the native integer for this symbol.
    fn to_raw(self) -> i32;

    /// Extracts the symbol from a host value.
    fn from_value(value: &Value) -> Option<Self>;
}

/// Enum properties. The native side speaks raw integers; values outside the
/// symbolic set are rejected instead of passed through.
pub struct EnumEncoding<E>(PhantomData<E>);

impl<E: SymbolicEnum> Encoding for EnumEncoding<E> {
    type Native = i32;
    const KIND: ValueKind = ValueKind::Enum;

    fn encode(raw: i32) -> BindingResult<Value> {
        E::from_raw(raw)
            .map(Into::into)
            .ok_or(BindingError::InvalidEnumValue { raw })
    }

    fn decode(property: &'static str, value: Value) -> BindingResult<i32> {
        E::from_value(&value)
            .map(E::to_raw)
            .ok_or_else(|| mismatch(property, Self::KIND, &value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gun1::HighTensionState;

    #[test]
    fn test_enum_encoding_rejects_out_of_range_raw() {
        type Ht = EnumEncoding<HighTensionState>;
        assert_eq!(Ht::encode(3), Ok(Value::Enum(HighTensionState::On)));
        assert_eq!(Ht::encode(7), Err(BindingError::InvalidEnumValue { raw: 7 }));
        assert_eq!(Ht::encode(-1), Err(BindingError::InvalidEnumValue { raw: -1 }));
    }

    #[test]
    fn test_decode_reports_mismatch() {
        let err = VectorEncoding::decode("Shift", Value::Double(1.0)).unwrap_err();
        assert_eq!(
            err,
            BindingError::TypeMismatch {
                name: "Shift",
                expected: ValueKind::Vector,
                found: ValueKind::Double
            }
        );
        assert_eq!(
            EnumEncoding::<HighTensionState>::decode("HTState", Value::Enum(HighTensionState::Disabled)),
            Ok(1)
        );
    }
}
