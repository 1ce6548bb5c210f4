//! Binds the `TEMScripting::Gun1` electron-gun interface.
//!
//! [`Gun1Interface`] is the native seam: one method per COM accessor, each
//! returning the native status as a [`NativeResult`]. [`bind`] wraps any
//! implementation in a [`PropertyBindingAdapter`] driven by the static Gun1
//! descriptor tables.
//!
//! Only `HighVoltageOffset` and `GetHighVoltageOffsetRange` are enabled by
//! default. The remaining entries stay registered but hidden unless the
//! adapter runs under [`ExposurePolicy::All`].
//!
//! # Examples
//! ```
//! use temscript::gun1;
//! use temscript::simulated::SimulatedGun1;
//! use temscript::value::{Range, Value};
//!
//! let gun = SimulatedGun1::new();
//! let adapter = gun1::bind(&gun);
//! adapter.set("HighVoltageOffset", Value::Double(1.25)).unwrap();
//! assert_eq!(adapter.get("HighVoltageOffset"), Ok(Value::Double(1.25)));
//! assert_eq!(
//!     adapter.invoke("GetHighVoltageOffsetRange", &[]),
//!     Ok(Value::Range(Range::new(-5.0, 5.0)))
//! );
//! ```

use std::fmt;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::adapter::{MethodDescriptor, PropertyBindingAdapter, PropertyDescriptor};
use crate::encoding::{DoubleEncoding, EnumEncoding, Encoding, SymbolicEnum, VectorEncoding};
use crate::error::NativeResult;
use crate::value::Value;

/// Name of the bound native type.
pub const TYPE_NAME: &str = "Gun1";

/// High tension state as defined by the TEMScripting type library.
///
/// # Examples
/// ```
/// use temscript::gun1::HighTensionState;
///
/// assert_eq!(HighTensionState::On.to_string(), "On");
/// assert_eq!(HighTensionState::try_from(2), Ok(HighTensionState::Off));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum HighTensionState {
    /// High tension cannot be switched on.
    Disabled = 1,
    /// High tension is off.
    Off = 2,
    /// High tension is on.
    On = 3,
}

impl TryFrom<i32> for HighTensionState {
    type Error = i32;

    fn try_from(raw: i32) -> Result<Self, i32> {
        match raw {
            1 => Ok(Self::Disabled),
            2 => Ok(Self::Off),
            3 => Ok(Self::On),
            other => Err(other),
        }
    }
}

impl SymbolicEnum for HighTensionState {
    fn from_raw(raw: i32) -> Option<Self> {
        Self::try_from(raw).ok()
    }

    fn to_raw(self) -> i32 {
        self as i32
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_enum()
    }
}

impl fmt::Display for HighTensionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Disabled => "Disabled",
            Self::Off => "Off",
            Self::On => "On",
        })
    }
}

/// Native accessors of the `Gun1` automation object.
///
/// Enum accessors speak raw integers; validation happens in the adapter.
pub trait Gun1Interface {
    /// `get_HighVoltageOffset`
    fn high_voltage_offset(&self) -> NativeResult<f64>;
    /// `put_HighVoltageOffset`
    fn set_high_voltage_offset(&self, value: f64) -> NativeResult<()>;
    /// `GetHighVoltageOffsetRange`, returning `(min, max)`.
    fn high_voltage_offset_range(&self) -> NativeResult<(f64, f64)>;

    /// `get_HTState`
    fn ht_state(&self) -> NativeResult<i32>;
    /// `put_HTState`
    fn set_ht_state(&self, raw: i32) -> NativeResult<()>;
    /// `get_HTValue`
    fn ht_value(&self) -> NativeResult<f64>;
    /// `put_HTValue`
    fn set_ht_value(&self, value: f64) -> NativeResult<()>;
    /// `get_HTMaxValue`
    fn ht_max_value(&self) -> NativeResult<f64>;

    /// `get_Shift`
    fn shift(&self) -> NativeResult<DVec2>;
    /// `put_Shift`
    fn set_shift(&self, value: DVec2) -> NativeResult<()>;
    /// `get_Tilt`
    fn tilt(&self) -> NativeResult<DVec2>;
    /// `put_Tilt`
    fn set_tilt(&self, value: DVec2) -> NativeResult<()>;
}

/// Handle type the Gun1 descriptor tables operate on.
pub type Gun1Handle = dyn Gun1Interface;

type HtStateEncoding = EnumEncoding<HighTensionState>;

property_accessors!(Gun1Handle, DoubleEncoding, "HighVoltageOffset",
    get get_high_voltage_offset => high_voltage_offset,
    set put_high_voltage_offset => set_high_voltage_offset);
property_accessors!(Gun1Handle, HtStateEncoding, "HTState",
    get get_ht_state => ht_state,
    set put_ht_state => set_ht_state);
property_accessors!(Gun1Handle, DoubleEncoding, "HTValue",
    get get_ht_value => ht_value,
    set put_ht_value => set_ht_value);
property_accessors!(Gun1Handle, DoubleEncoding, "HTMaxValue",
    get get_ht_max_value => ht_max_value);
property_accessors!(Gun1Handle, VectorEncoding, "Shift",
    get get_shift => shift,
    set put_shift => set_shift);
property_accessors!(Gun1Handle, VectorEncoding, "Tilt",
    get get_tilt => tilt,
    set put_tilt => set_tilt);
range_method!(Gun1Handle, get_high_voltage_offset_range => high_voltage_offset_range);

/// Gun1 attributes. HT and beam-alignment entries are disabled on current
/// instruments.
pub static GUN1_PROPERTIES: [PropertyDescriptor<Gun1Handle>; 6] = [
    PropertyDescriptor {
        name: "HighVoltageOffset",
        kind: DoubleEncoding::KIND,
        enabled: true,
        getter: Some(get_high_voltage_offset),
        setter: Some(put_high_voltage_offset),
    },
    PropertyDescriptor {
        name: "HTState",
        kind: HtStateEncoding::KIND,
        enabled: false,
        getter: Some(get_ht_state),
        setter: Some(put_ht_state),
    },
    PropertyDescriptor {
        name: "HTValue",
        kind: DoubleEncoding::KIND,
        enabled: false,
        getter: Some(get_ht_value),
        setter: Some(put_ht_value),
    },
    PropertyDescriptor {
        name: "HTMaxValue",
        kind: DoubleEncoding::KIND,
        enabled: false,
        getter: Some(get_ht_max_value),
        setter: None,
    },
    PropertyDescriptor {
        name: "Shift",
        kind: VectorEncoding::KIND,
        enabled: false,
        getter: Some(get_shift),
        setter: Some(put_shift),
    },
    PropertyDescriptor {
        name: "Tilt",
        kind: VectorEncoding::KIND,
        enabled: false,
        getter: Some(get_tilt),
        setter: Some(put_tilt),
    },
];

/// Gun1 methods.
pub static GUN1_METHODS: [MethodDescriptor<Gun1Handle>; 1] = [MethodDescriptor {
    name: "GetHighVoltageOffsetRange",
    arity: 0,
    enabled: true,
    invoke: get_high_voltage_offset_range,
}];

/// Binds a Gun1 handle under the default exposure policy.
pub fn bind(handle: &Gun1Handle) -> PropertyBindingAdapter<'_, Gun1Handle> {
    PropertyBindingAdapter::new(TYPE_NAME, handle, &GUN1_PROPERTIES, &GUN1_METHODS)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_descriptor_names_are_unique() {
        let mut seen = HashSet::new();
        let names = GUN1_PROPERTIES
            .iter()
            .map(|d| d.name)
            .chain(GUN1_METHODS.iter().map(|d| d.name));
        for name in names {
            assert!(seen.insert(name), "duplicate descriptor {name}");
        }
        assert_eq!(seen.len(), 7);
    }

    #[test]
    fn test_only_high_voltage_offset_surface_is_enabled() {
        let enabled: Vec<_> = GUN1_PROPERTIES
            .iter()
            .filter(|d| d.enabled)
            .map(|d| d.name)
            .collect();
        assert_eq!(enabled, ["HighVoltageOffset"]);
        assert!(GUN1_METHODS.iter().all(|d| d.enabled && d.arity == 0));
    }

    #[test]
    fn test_ht_max_value_is_read_only() {
        let descriptor = GUN1_PROPERTIES
            .iter()
            .find(|d| d.name == "HTMaxValue")
            .unwrap();
        assert!(descriptor.getter.is_some());
        assert!(descriptor.setter.is_none());
    }

    #[test]
    fn test_state_serializes_by_name() {
        assert_eq!(serde_json::to_string(&HighTensionState::Off).unwrap(), "\"Off\"");
        assert_eq!(HighTensionState::try_from(4), Err(4));
    }
}
