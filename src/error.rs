//! Provides the error types surfaced by the binding layer.
//!
//! Native calls report failure as an HRESULT wrapped in [`NativeError`]. The
//! adapter converts those, together with its own lookup and encoding checks,
//! into [`BindingError`] at the host boundary.
//!
//! # Examples
//! ```
//! use temscript::error::{BindingError, NativeError};
//!
//! let err: BindingError = NativeError::new(0x8000_4005u32 as i32).into();
//! assert_eq!(err.code(), Some(0x8000_4005u32 as i32));
//! ```

use thiserror::Error;

use crate::value::ValueKind;

/// Represents a failed native call, carrying the raw HRESULT.
///
/// # Examples
/// ```
/// use temscript::error::NativeError;
///
/// let err = NativeError::new(0x8007_0057u32 as i32);
/// assert_eq!(err.to_string(), "HRESULT 0x80070057");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("HRESULT 0x{code:08X}")]
pub struct NativeError {
    /// The native status code, never `S_OK`.
    pub code: i32,
}

impl NativeError {
    /// Wraps a raw status code.
    pub const fn new(code: i32) -> Self {
        Self { code }
    }
}

#[cfg(windows)]
impl From<windows::core::Error> for NativeError {
    fn from(err: windows::core::Error) -> Self {
        Self::new(err.code().0)
    }
}

/// Result of a single native accessor call.
pub type NativeResult<T> = Result<T, NativeError>;

/// Errors raised to the scripting host by the binding adapter.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BindingError {
    /// The native call returned a failure status.
    #[error("native call failed: HRESULT 0x{code:08X}")]
    NativeCallFailed {
        /// The exact status returned by the native layer.
        code: i32,
    },

    /// The attribute or method is not registered, disabled, or lacks the
    /// requested accessor.
    #[error("'{type_name}' object has no supported attribute '{name}'")]
    NotSupported {
        /// Name of the bound native type.
        type_name: &'static str,
        /// Requested attribute or method name.
        name: String,
    },

    /// A setter received a value with the wrong encoding.
    #[error("attribute '{name}' expects {expected}, got {found}")]
    TypeMismatch {
        /// Attribute name.
        name: &'static str,
        /// Encoding declared by the descriptor.
        expected: ValueKind,
        /// Encoding supplied by the host.
        found: ValueKind,
    },

    /// A method received the wrong number of arguments.
    #[error("{name}() takes {expected} arguments ({found} given)")]
    ArityMismatch {
        /// Method name.
        name: &'static str,
        /// Declared argument count.
        expected: usize,
        /// Supplied argument count.
        found: usize,
    },

    /// The native layer returned an integer outside the enum's symbolic set.
    #[error("invalid enum value {raw}")]
    InvalidEnumValue {
        /// The raw native integer.
        raw: i32,
    },
}

impl BindingError {
    /// Returns the native status code, if this error came from a native call.
    ///
    /// # Examples
    /// ```
    /// use temscript::error::BindingError;
    ///
    /// assert_eq!(BindingError::InvalidEnumValue { raw: 9 }.code(), None);
    /// ```
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::NativeCallFailed { code } => Some(*code),
            _ => None,
        }
    }

    /// Returns a stable snake_case name for the error variant.
    ///
    /// # Examples
    /// ```
    /// use temscript::error::BindingError;
    ///
    /// assert_eq!(BindingError::InvalidEnumValue { raw: 0 }.kind(), "invalid_enum_value");
    /// ```
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NativeCallFailed { .. } => "native_call_failed",
            Self::NotSupported { .. } => "not_supported",
            Self::TypeMismatch { .. } => "type_mismatch",
            Self::ArityMismatch { .. } => "arity_mismatch",
            Self::InvalidEnumValue { .. } => "invalid_enum_value",
        }
    }
}

impl From<NativeError> for BindingError {
    fn from(err: NativeError) -> Self {
        Self::NativeCallFailed { code: err.code }
    }
}

/// Result type for binding operations.
pub type BindingResult<T> = Result<T, BindingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_error_converts_with_exact_code() {
        let err = BindingError::from(NativeError::new(-2147467259));
        assert_eq!(err, BindingError::NativeCallFailed { code: -2147467259 });
        assert_eq!(err.code(), Some(-2147467259));
    }

    #[test]
    fn test_messages_name_the_attribute() {
        let err = BindingError::NotSupported {
            type_name: "Gun1",
            name: "HTState".to_string(),
        };
        assert_eq!(err.to_string(), "'Gun1' object has no supported attribute 'HTState'");

        let err = BindingError::ArityMismatch {
            name: "GetHighVoltageOffsetRange",
            expected: 0,
            found: 2,
        };
        assert_eq!(err.to_string(), "GetHighVoltageOffsetRange() takes 0 arguments (2 given)");
    }
}
