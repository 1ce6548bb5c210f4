//! Provides the `IDispatch` backend that talks to the TEMScripting server.
//!
//! The instrument is reached through late binding: member names are resolved
//! with `GetIDsOfNames` and accessed with `Invoke`. All `windows` errors are
//! reported as their HRESULT.
//!
//! # Examples
//! ```no_run
//! use temscript::com::dispatch::{ComApartment, Instrument};
//! use temscript::gun1;
//!
//! let _apartment = ComApartment::initialize().unwrap();
//! let instrument = Instrument::connect().unwrap();
//! let gun = instrument.gun().unwrap();
//! let adapter = gun1::bind(&gun);
//! println!("{:?}", adapter.get("HighVoltageOffset"));
//! ```

use std::ffi::c_void;
use std::marker::PhantomData;

use glam::DVec2;
use windows::core::{Interface, HSTRING, GUID, IUnknown, PCWSTR};
use windows::Win32::System::Com::*;
use windows::Win32::System::Ole::DISPID_PROPERTYPUT;
use windows::Win32::System::Variant::VARIANT;

use crate::error::NativeResult;
use crate::gun1::Gun1Interface;

/// ProgID of the TEMScripting automation server.
pub const INSTRUMENT_PROGID: &str = "TEMScripting.Instrument";

const LOCALE_USER_DEFAULT: u32 = 0x0400;
const VT_R8: u16 = 5;
const VT_BYREF: u16 = 0x4000;

/// Keeps COM initialized on the current thread for its lifetime.
///
/// Not `Send`: COM must be uninitialized on the thread that initialized it.
pub struct ComApartment {
    _not_send: PhantomData<*const ()>,
}

impl ComApartment {
    /// Enters a single-threaded apartment.
    ///
    /// # Errors
    /// Returns the HRESULT of a failed `CoInitializeEx`.
    pub fn initialize() -> NativeResult<Self> {
        unsafe { CoInitializeEx(None, COINIT_APARTMENTTHREADED).ok()? };
        tracing::debug!("COM apartment initialized");
        Ok(Self {
            _not_send: PhantomData,
        })
    }
}

impl Drop for ComApartment {
    fn drop(&mut self) {
        unsafe { CoUninitialize() };
    }
}

/// Late-bound access to one automation object.
#[derive(Clone)]
struct Dispatch(IDispatch);

impl Dispatch {
    fn dispid(&self, name: &str) -> NativeResult<i32> {
        let name = HSTRING::from(name);
        let names = [PCWSTR(name.as_ptr())];
        let mut dispid = 0;
        unsafe {
            self.0.GetIDsOfNames(
                &GUID::zeroed(),
                names.as_ptr(),
                1,
                LOCALE_USER_DEFAULT,
                &mut dispid,
            )?;
        }
        Ok(dispid)
    }

    fn invoke(
        &self,
        name: &str,
        flags: DISPATCH_FLAGS,
        params: &DISPPARAMS,
    ) -> NativeResult<VARIANT> {
        let dispid = self.dispid(name)?;
        let mut result = VARIANT::default();
        unsafe {
            self.0.Invoke(
                dispid,
                &GUID::zeroed(),
                LOCALE_USER_DEFAULT,
                flags,
                params,
                Some(&mut result as *mut VARIANT),
                None,
                None,
            )?;
        }
        Ok(result)
    }

    fn get(&self, name: &str) -> NativeResult<VARIANT> {
        self.invoke(name, DISPATCH_PROPERTYGET, &DISPPARAMS::default())
    }

    fn put(&self, name: &str, value: VARIANT) -> NativeResult<()> {
        let mut args = [value];
        let mut named = [DISPID_PROPERTYPUT];
        let params = DISPPARAMS {
            rgvarg: args.as_mut_ptr(),
            rgdispidNamedArgs: named.as_mut_ptr(),
            cArgs: 1,
            cNamedArgs: 1,
        };
        self.invoke(name, DISPATCH_PROPERTYPUT, &params)?;
        Ok(())
    }

    fn get_f64(&self, name: &str) -> NativeResult<f64> {
        Ok(f64::try_from(&self.get(name)?)?)
    }

    fn get_i32(&self, name: &str) -> NativeResult<i32> {
        Ok(i32::try_from(&self.get(name)?)?)
    }

    fn get_object(&self, name: &str) -> NativeResult<Dispatch> {
        let unknown = IUnknown::try_from(&self.get(name)?)?;
        Ok(Dispatch(unknown.cast()?))
    }

    fn get_vector(&self, name: &str) -> NativeResult<DVec2> {
        let vector = self.get_object(name)?;
        Ok(DVec2::new(vector.get_f64("X")?, vector.get_f64("Y")?))
    }

    /// Vectors are value objects: fetch, update both components, write back.
    fn put_vector(&self, name: &str, value: DVec2) -> NativeResult<()> {
        let vector = self.get_object(name)?;
        vector.put("X", VARIANT::from(value.x))?;
        vector.put("Y", VARIANT::from(value.y))?;
        let unknown: IUnknown = vector.0.cast()?;
        self.put(name, VARIANT::from(unknown))
    }

    /// Calls a method taking two `double*` out-parameters.
    fn call_out_pair(&self, name: &str) -> NativeResult<(f64, f64)> {
        let mut first = 0.0f64;
        let mut second = 0.0f64;
        // Arguments are passed right to left.
        let mut args = [ByRefDouble::new(&mut second), ByRefDouble::new(&mut first)];
        let params = DISPPARAMS {
            rgvarg: args.as_mut_ptr().cast::<VARIANT>(),
            rgdispidNamedArgs: std::ptr::null_mut(),
            cArgs: 2,
            cNamedArgs: 0,
        };
        self.invoke(name, DISPATCH_METHOD, &params)?;
        Ok((first, second))
    }
}

/// `VT_BYREF | VT_R8` variant laid out like `VARIANT`. Holds a borrowed
/// pointer, so it needs no `VariantClear`.
#[repr(C)]
struct ByRefDouble {
    vt: u16,
    reserved: [u16; 3],
    pdbl: *mut f64,
    _record: *mut c_void,
}

const _: () = assert!(std::mem::size_of::<ByRefDouble>() == std::mem::size_of::<VARIANT>());

impl ByRefDouble {
    fn new(target: &mut f64) -> Self {
        Self {
            vt: VT_BYREF | VT_R8,
            reserved: [0; 3],
            pdbl: target,
            _record: std::ptr::null_mut(),
        }
    }
}

/// Connection to the TEMScripting `Instrument` object.
pub struct Instrument {
    dispatch: Dispatch,
}

impl Instrument {
    /// Creates the instrument object from its ProgID.
    ///
    /// # Errors
    /// Returns the HRESULT if the server is not registered or cannot start.
    pub fn connect() -> NativeResult<Self> {
        let progid = HSTRING::from(INSTRUMENT_PROGID);
        let dispatch: IDispatch = unsafe {
            let clsid = CLSIDFromProgID(&progid)?;
            CoCreateInstance(&clsid, None, CLSCTX_ALL)?
        };
        tracing::info!(progid = INSTRUMENT_PROGID, "connected to instrument");
        Ok(Self {
            dispatch: Dispatch(dispatch),
        })
    }

    /// Returns the instrument's electron gun.
    ///
    /// # Errors
    /// Returns the HRESULT of the failed property read.
    pub fn gun(&self) -> NativeResult<DispatchGun1> {
        Ok(DispatchGun1 {
            dispatch: self.dispatch.get_object("Gun")?,
        })
    }
}

/// `Gun1` backed by a live automation object.
pub struct DispatchGun1 {
    dispatch: Dispatch,
}

impl Gun1Interface for DispatchGun1 {
    fn high_voltage_offset(&self) -> NativeResult<f64> {
        self.dispatch.get_f64("HighVoltageOffset")
    }

    fn set_high_voltage_offset(&self, value: f64) -> NativeResult<()> {
        self.dispatch.put("HighVoltageOffset", VARIANT::from(value))
    }

    fn high_voltage_offset_range(&self) -> NativeResult<(f64, f64)> {
        self.dispatch.call_out_pair("GetHighVoltageOffsetRange")
    }

    fn ht_state(&self) -> NativeResult<i32> {
        self.dispatch.get_i32("HTState")
    }

    fn set_ht_state(&self, raw: i32) -> NativeResult<()> {
        self.dispatch.put("HTState", VARIANT::from(raw))
    }

    fn ht_value(&self) -> NativeResult<f64> {
        self.dispatch.get_f64("HTValue")
    }

    fn set_ht_value(&self, value: f64) -> NativeResult<()> {
        self.dispatch.put("HTValue", VARIANT::from(value))
    }

    fn ht_max_value(&self) -> NativeResult<f64> {
        self.dispatch.get_f64("HTMaxValue")
    }

    fn shift(&self) -> NativeResult<DVec2> {
        self.dispatch.get_vector("Shift")
    }

    fn set_shift(&self, value: DVec2) -> NativeResult<()> {
        self.dispatch.put_vector("Shift", value)
    }

    fn tilt(&self) -> NativeResult<DVec2> {
        self.dispatch.get_vector("Tilt")
    }

    fn set_tilt(&self, value: DVec2) -> NativeResult<()> {
        self.dispatch.put_vector("Tilt", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_double_round_trip() {
        let variant = VARIANT::from(-2.5f64);
        assert_eq!(f64::try_from(&variant).unwrap(), -2.5);
        assert_eq!(i32::try_from(&VARIANT::from(3i32)).unwrap(), 3);
    }

    #[test]
    fn test_by_ref_double_points_at_target() {
        let mut target = 0.0f64;
        let arg = ByRefDouble::new(&mut target);
        assert_eq!(arg.vt, VT_BYREF | VT_R8);
        assert_eq!(arg.pdbl, &mut target as *mut f64);
        assert_eq!(std::mem::size_of_val(&arg), std::mem::size_of::<VARIANT>());
    }
}
