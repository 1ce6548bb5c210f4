//! Provides the COM-facing plumbing shared by every bound native type.
//!
//! # Overview
//!
//! - [`helpers::check_hresult`] - Status code to result conversion
//! - [`helpers::MutexExt`] - Panic-free mutex locking
//! - [`property_accessors!`] - Accessor templates per value encoding
//! - [`range_method!`] - Min/max range query template
//! - `dispatch` - `IDispatch` backend for the TEMScripting server (Windows only)
//!
//! # Examples
//! ```
//! use std::sync::Mutex;
//!
//! use temscript::com::MutexExt;
//!
//! let mutex = Mutex::new(7u32);
//! let guard = mutex.lock_or_fail().expect("lock should succeed");
//! assert_eq!(*guard, 7);
//! ```

pub mod helpers;

#[macro_use]
pub mod macros;

#[cfg(windows)]
pub mod dispatch;

// Re-export commonly used items
pub use helpers::{check_hresult, MutexExt};
