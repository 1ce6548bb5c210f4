//! Provides an in-memory `Gun1` for running without an instrument.
//!
//! The simulated gun is a faithful store: whatever is written is read back.
//! It also lets tests inject native failures and raw enum values, and counts
//! every native call it receives.
//!
//! # Examples
//! ```
//! use temscript::com::helpers::E_FAIL;
//! use temscript::gun1::Gun1Interface;
//! use temscript::simulated::SimulatedGun1;
//!
//! let gun = SimulatedGun1::new();
//! gun.fail_next(E_FAIL).unwrap();
//! assert_eq!(gun.high_voltage_offset().unwrap_err().code, E_FAIL);
//! assert_eq!(gun.high_voltage_offset(), Ok(0.0));
//! assert_eq!(gun.native_calls(), 2);
//! ```

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::com::helpers::{check_hresult, MutexExt, E_INVALIDARG, S_OK};
use crate::error::{NativeError, NativeResult};
use crate::gun1::{Gun1Interface, HighTensionState};

/// Initial state of a simulated gun.
///
/// # Examples
/// ```
/// use temscript::simulated::GunState;
///
/// let state = GunState::default();
/// assert_eq!(state.high_voltage_offset_range, [-5.0, 5.0]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GunState {
    /// High voltage offset in volts.
    pub high_voltage_offset: f64,
    /// Allowed offset interval as `[min, max]`.
    pub high_voltage_offset_range: [f64; 2],
    /// Raw high tension state.
    pub ht_state: i32,
    /// High tension in volts.
    pub ht_value: f64,
    /// Maximum high tension in volts.
    pub ht_max_value: f64,
    /// Gun shift as `[x, y]`.
    pub shift: [f64; 2],
    /// Gun tilt as `[x, y]`.
    pub tilt: [f64; 2],
}

impl Default for GunState {
    fn default() -> Self {
        Self {
            high_voltage_offset: 0.0,
            high_voltage_offset_range: [-5.0, 5.0],
            ht_state: HighTensionState::On as i32,
            ht_value: 200_000.0,
            ht_max_value: 300_000.0,
            shift: [0.0, 0.0],
            tilt: [0.0, 0.0],
        }
    }
}

/// An in-memory `Gun1` implementation.
pub struct SimulatedGun1 {
    state: Mutex<GunState>,
    pending_failure: Mutex<Option<i32>>,
    calls: AtomicU32,
}

impl SimulatedGun1 {
    /// Creates a gun with default state.
    pub fn new() -> Self {
        Self::with_state(GunState::default())
    }

    /// Creates a gun with the given initial state.
    pub fn with_state(state: GunState) -> Self {
        Self {
            state: Mutex::new(state),
            pending_failure: Mutex::new(None),
            calls: AtomicU32::new(0),
        }
    }

    /// Makes the next native call fail with `code`.
    ///
    /// # Errors
    /// Returns `E_FAIL` if the injection lock is poisoned.
    pub fn fail_next(&self, code: i32) -> NativeResult<()> {
        *self.pending_failure.lock_or_fail()? = Some(code);
        Ok(())
    }

    /// Stores a raw high tension state, bypassing validation.
    ///
    /// # Errors
    /// Returns `E_FAIL` if the state lock is poisoned.
    pub fn set_raw_ht_state(&self, raw: i32) -> NativeResult<()> {
        self.state.lock_or_fail()?.ht_state = raw;
        Ok(())
    }

    /// Returns a copy of the current state.
    ///
    /// # Errors
    /// Returns `E_FAIL` if the state lock is poisoned.
    pub fn snapshot(&self) -> NativeResult<GunState> {
        Ok(self.state.lock_or_fail()?.clone())
    }

    /// Returns the number of native calls received so far.
    pub fn native_calls(&self) -> u32 {
        self.calls.load(Ordering::Relaxed)
    }

    /// Counts the call, consumes any injected failure and runs `f` on the
    /// state.
    fn call<T>(&self, f: impl FnOnce(&mut GunState) -> NativeResult<T>) -> NativeResult<T> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let status = self.pending_failure.lock_or_fail()?.take().unwrap_or(S_OK);
        check_hresult(status)?;
        let mut state = self.state.lock_or_fail()?;
        f(&mut state)
    }
}

impl Default for SimulatedGun1 {
    fn default() -> Self {
        Self::new()
    }
}

fn invalid_arg() -> NativeError {
    NativeError::new(E_INVALIDARG)
}

impl Gun1Interface for SimulatedGun1 {
    fn high_voltage_offset(&self) -> NativeResult<f64> {
        self.call(|s| Ok(s.high_voltage_offset))
    }

    fn set_high_voltage_offset(&self, value: f64) -> NativeResult<()> {
        self.call(|s| {
            let [min, max] = s.high_voltage_offset_range;
            if !(min..=max).contains(&value) {
                return Err(invalid_arg());
            }
            s.high_voltage_offset = value;
            Ok(())
        })
    }

    fn high_voltage_offset_range(&self) -> NativeResult<(f64, f64)> {
        self.call(|s| {
            let [min, max] = s.high_voltage_offset_range;
            Ok((min, max))
        })
    }

    fn ht_state(&self) -> NativeResult<i32> {
        self.call(|s| Ok(s.ht_state))
    }

    fn set_ht_state(&self, raw: i32) -> NativeResult<()> {
        self.call(|s| {
            s.ht_state = raw;
            Ok(())
        })
    }

    fn ht_value(&self) -> NativeResult<f64> {
        self.call(|s| Ok(s.ht_value))
    }

    fn set_ht_value(&self, value: f64) -> NativeResult<()> {
        self.call(|s| {
            if !(0.0..=s.ht_max_value).contains(&value) {
                return Err(invalid_arg());
            }
            s.ht_value = value;
            Ok(())
        })
    }

    fn ht_max_value(&self) -> NativeResult<f64> {
        self.call(|s| Ok(s.ht_max_value))
    }

    fn shift(&self) -> NativeResult<DVec2> {
        self.call(|s| Ok(DVec2::from_array(s.shift)))
    }

    fn set_shift(&self, value: DVec2) -> NativeResult<()> {
        self.call(|s| {
            s.shift = value.to_array();
            Ok(())
        })
    }

    fn tilt(&self) -> NativeResult<DVec2> {
        self.call(|s| Ok(DVec2::from_array(s.tilt)))
    }

    fn set_tilt(&self, value: DVec2) -> NativeResult<()> {
        self.call(|s| {
            s.tilt = value.to_array();
            Ok(())
        })
    }
}
