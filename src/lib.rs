//! Provides scripting bindings for the TEMScripting `Gun1` electron-gun
//! interface of a transmission electron microscope.
//!
//! A scripting host reads and writes attributes by name; the
//! [`adapter::PropertyBindingAdapter`] looks each name up in a static
//! descriptor table and forwards it to exactly one native accessor on a
//! borrowed handle. Native HRESULT failures, wrong encodings and unknown names
//! come back as [`error::BindingError`]s.
//!
//! Two native backends are provided: [`simulated::SimulatedGun1`] for running
//! without an instrument, and `com::dispatch::DispatchGun1` (Windows only) for
//! the real automation server.
//!
//! # Build
//! ```text
//! cargo build --release
//! ```
//!
//! # Examples
//! ```
//! use temscript::error::BindingError;
//! use temscript::gun1;
//! use temscript::simulated::SimulatedGun1;
//!
//! let gun = SimulatedGun1::new();
//! let adapter = gun1::bind(&gun);
//! assert!(adapter.has_attribute("HighVoltageOffset"));
//! assert!(matches!(adapter.get("HTState"), Err(BindingError::NotSupported { .. })));
//! ```

// Accessor macros - must be declared first for macro availability
#[macro_use]
pub mod com;

pub mod adapter;
pub mod config;
pub mod encoding;
pub mod error;
pub mod gun1;
pub mod logging;
pub mod simulated;
pub mod value;

pub use adapter::{ExposurePolicy, PropertyBindingAdapter};
pub use error::{BindingError, BindingResult, NativeError, NativeResult};
pub use value::{Range, Value, ValueKind};
