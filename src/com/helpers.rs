//! Provides HRESULT helpers and panic-free locking for native accessors.
//!
//! Native backends report every outcome as a status code. These helpers turn
//! codes into [`NativeResult`]s and keep poisoned locks from panicking inside
//! an accessor.
//!
//! # Examples
//! ```
//! use temscript::com::helpers::{check_hresult, E_FAIL, S_OK};
//!
//! assert!(check_hresult(S_OK).is_ok());
//! assert_eq!(check_hresult(E_FAIL).unwrap_err().code, E_FAIL);
//! ```

use std::sync::{Mutex, MutexGuard};

use crate::error::{NativeError, NativeResult};

/// Success.
pub const S_OK: i32 = 0;
/// Unspecified failure.
pub const E_FAIL: i32 = 0x8000_4005_u32 as i32;
/// One or more arguments are invalid.
pub const E_INVALIDARG: i32 = 0x8007_0057_u32 as i32;
/// Not implemented.
pub const E_NOTIMPL: i32 = 0x8000_4001_u32 as i32;
/// Catastrophic failure.
pub const E_UNEXPECTED: i32 = 0x8000_FFFF_u32 as i32;

/// Converts a native status into a result. Any non-zero status is a failure.
///
/// # Examples
/// ```
/// use temscript::com::helpers::check_hresult;
///
/// // S_FALSE is not accepted as success.
/// assert!(check_hresult(1).is_err());
/// ```
pub fn check_hresult(hr: i32) -> NativeResult<()> {
    if hr == S_OK {
        Ok(())
    } else {
        Err(NativeError::new(hr))
    }
}

/// Provides panic-free `Mutex` access in native accessors.
///
/// # Examples
/// ```
/// use std::sync::Mutex;
///
/// use temscript::com::helpers::MutexExt;
///
/// let mutex = Mutex::new(42);
/// let guard = mutex.lock_or_fail().expect("lock should succeed");
/// assert_eq!(*guard, 42);
/// ```
pub trait MutexExt<T> {
    /// Locks the mutex, returning `E_FAIL` if poisoned instead of panicking.
    fn lock_or_fail(&self) -> NativeResult<MutexGuard<'_, T>>;
}

impl<T> MutexExt<T> for Mutex<T> {
    fn lock_or_fail(&self) -> NativeResult<MutexGuard<'_, T>> {
        self.lock().map_err(|_| NativeError::new(E_FAIL))
    }
}
