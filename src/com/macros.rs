//! Provides accessor templates that replace hand-written getter/setter stubs.
//!
//! Every bound property is a native read (and optionally a native write)
//! passed through one [`Encoding`](crate::encoding::Encoding). These macros
//! expand to plain `fn` items so they can sit in `static` descriptor tables.
//!
//! # Examples
//! ```
//! use temscript::encoding::DoubleEncoding;
//! use temscript::error::NativeResult;
//! use temscript::value::Value;
//!
//! struct Stage;
//!
//! impl Stage {
//!     fn speed(&self) -> NativeResult<f64> {
//!         Ok(0.5)
//!     }
//! }
//!
//! temscript::property_accessors!(Stage, DoubleEncoding, "Speed", get get_speed => speed);
//!
//! assert_eq!(get_speed(&Stage), Ok(Value::Double(0.5)));
//! ```

/// Generates a getter and optional setter for one native property.
///
/// The getter forwards to `$read` and encodes the result; the setter decodes
/// the host value and forwards to `$write`. Native failures propagate as
/// `NativeCallFailed`.
///
/// # Examples
///
/// ```ignore
/// property_accessors!(Gun1Handle, VectorEncoding, "Shift",
///     get get_shift => shift, set set_shift => set_shift);
/// ```
#[macro_export]
macro_rules! property_accessors {
    (
        $handle:ty, $encoding:ty, $name:literal,
        get $getter:ident => $read:ident
        $(, set $setter:ident => $write:ident)? $(,)?
    ) => {
        fn $getter(handle: &$handle) -> $crate::error::BindingResult<$crate::value::Value> {
            <$encoding as $crate::encoding::Encoding>::encode(handle.$read()?)
        }

        $(
            fn $setter(
                handle: &$handle,
                value: $crate::value::Value,
            ) -> $crate::error::BindingResult<()> {
                let native = <$encoding as $crate::encoding::Encoding>::decode($name, value)?;
                handle.$write(native)?;
                Ok(())
            }
        )?
    };
}

/// Generates a zero-argument method that packs a native `(min, max)` pair
/// into a [`Range`](crate::value::Range).
///
/// # Examples
///
/// ```ignore
/// range_method!(Gun1Handle, get_high_voltage_offset_range => high_voltage_offset_range);
/// ```
#[macro_export]
macro_rules! range_method {
    ($handle:ty, $method:ident => $native:ident) => {
        fn $method(
            handle: &$handle,
            _args: &[$crate::value::Value],
        ) -> $crate::error::BindingResult<$crate::value::Value> {
            let (min, max) = handle.$native()?;
            Ok($crate::value::Value::Range($crate::value::Range::new(min, max)))
        }
    };
}

// Re-export macros at crate root
pub use crate::property_accessors;
pub use crate::range_method;
