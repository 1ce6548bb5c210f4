//! Provides the property binding adapter that maps host attribute access onto
//! native accessor calls.
//!
//! Each bound type registers a static, immutable table of
//! [`PropertyDescriptor`]s and [`MethodDescriptor`]s. The adapter looks the
//! requested name up at call time, validates the host value or arguments, and
//! forwards to exactly one native call on a borrowed handle.
//!
//! # Examples
//! ```
//! use temscript::adapter::{PropertyBindingAdapter, PropertyDescriptor};
//! use temscript::error::BindingResult;
//! use temscript::value::{Value, ValueKind};
//!
//! struct Lens(f64);
//!
//! fn read(lens: &Lens) -> BindingResult<Value> {
//!     Ok(Value::Double(lens.0))
//! }
//!
//! static LENS_PROPERTIES: [PropertyDescriptor<Lens>; 1] = [PropertyDescriptor {
//!     name: "Focus",
//!     kind: ValueKind::Double,
//!     enabled: true,
//!     getter: Some(read),
//!     setter: None,
//! }];
//!
//! let lens = Lens(0.25);
//! let adapter = PropertyBindingAdapter::new("Lens", &lens, &LENS_PROPERTIES, &[]);
//! assert_eq!(adapter.get("Focus"), Ok(Value::Double(0.25)));
//! assert!(adapter.set("Focus", Value::Double(1.0)).is_err());
//! ```

use tracing::{debug, warn};

use crate::error::{BindingError, BindingResult};
use crate::value::{Value, ValueKind};

/// Reads one native property and converts it to its host encoding.
pub type Getter<H> = fn(&H) -> BindingResult<Value>;

/// Writes one native property from a value already checked against the
/// descriptor's kind.
pub type Setter<H> = fn(&H, Value) -> BindingResult<()>;

/// Invokes one native method with arguments already checked for arity.
pub type Invoker<H> = fn(&H, &[Value]) -> BindingResult<Value>;

/// Describes how to read and write one native property.
pub struct PropertyDescriptor<H: ?Sized + 'static> {
    /// Attribute name as seen by the host.
    pub name: &'static str,
    /// Encoding of the attribute's value.
    pub kind: ValueKind,
    /// Whether the attribute is exposed under the default policy.
    pub enabled: bool,
    /// Native read, if the property is readable.
    pub getter: Option<Getter<H>>,
    /// Native write, if the property is writable.
    pub setter: Option<Setter<H>>,
}

/// Describes how to invoke one native method.
pub struct MethodDescriptor<H: ?Sized + 'static> {
    /// Method name as seen by the host.
    pub name: &'static str,
    /// Number of host arguments the method takes.
    pub arity: usize,
    /// Whether the method is exposed under the default policy.
    pub enabled: bool,
    /// Native call.
    pub invoke: Invoker<H>,
}

/// Selects which registered descriptors the adapter exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExposurePolicy {
    /// Only descriptors flagged `enabled`.
    #[default]
    EnabledOnly,
    /// Every registered descriptor, including disabled ones.
    All,
}

impl ExposurePolicy {
    fn exposes(self, enabled: bool) -> bool {
        enabled || self == Self::All
    }
}

/// Binds a native handle to its descriptor tables.
///
/// The adapter never owns the handle; it only borrows it for its own lifetime.
/// Calls are synchronous and must not be made concurrently on the same
/// handle.
pub struct PropertyBindingAdapter<'h, H: ?Sized + 'static> {
    type_name: &'static str,
    handle: &'h H,
    properties: &'static [PropertyDescriptor<H>],
    methods: &'static [MethodDescriptor<H>],
    policy: ExposurePolicy,
}

impl<'h, H: ?Sized + 'static> PropertyBindingAdapter<'h, H> {
    /// Creates an adapter exposing only enabled descriptors.
    pub fn new(
        type_name: &'static str,
        handle: &'h H,
        properties: &'static [PropertyDescriptor<H>],
        methods: &'static [MethodDescriptor<H>],
    ) -> Self {
        Self {
            type_name,
            handle,
            properties,
            methods,
            policy: ExposurePolicy::EnabledOnly,
        }
    }

    /// Replaces the exposure policy.
    pub fn with_policy(mut self, policy: ExposurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the bound type name.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the active exposure policy.
    pub fn policy(&self) -> ExposurePolicy {
        self.policy
    }

    /// Lists the attribute names currently exposed, in registration order.
    pub fn attributes(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.properties
            .iter()
            .filter(|d| self.policy.exposes(d.enabled))
            .map(|d| d.name)
    }

    /// Lists the method names currently exposed, in registration order.
    pub fn methods(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.methods
            .iter()
            .filter(|d| self.policy.exposes(d.enabled))
            .map(|d| d.name)
    }

    /// Returns whether `name` is an exposed attribute or method.
    pub fn has_attribute(&self, name: &str) -> bool {
        self.property(name).is_some() || self.method(name).is_some()
    }

    /// Reads an attribute.
    ///
    /// # Errors
    /// `NotSupported` if the attribute is unknown, not exposed, or write-only;
    /// `NativeCallFailed` or `InvalidEnumValue` from the native read.
    pub fn get(&self, name: &str) -> BindingResult<Value> {
        let getter = self
            .property(name)
            .and_then(|d| d.getter)
            .ok_or_else(|| self.not_supported(name))?;
        debug!(type_name = self.type_name, name, "get");
        getter(self.handle).inspect_err(|err| self.log_failure(name, err))
    }

    /// Writes an attribute.
    ///
    /// The value's encoding is checked before the native call, so a mismatch
    /// never reaches the handle.
    ///
    /// # Errors
    /// `NotSupported` if the attribute is unknown, not exposed, or read-only;
    /// `TypeMismatch` for a wrongly encoded value; `NativeCallFailed` from
    /// the native write.
    pub fn set(&self, name: &str, value: Value) -> BindingResult<()> {
        let descriptor = self.property(name).ok_or_else(|| self.not_supported(name))?;
        let setter = descriptor.setter.ok_or_else(|| self.not_supported(name))?;
        if value.kind() != descriptor.kind {
            return Err(BindingError::TypeMismatch {
                name: descriptor.name,
                expected: descriptor.kind,
                found: value.kind(),
            });
        }
        debug!(type_name = self.type_name, name, %value, "set");
        setter(self.handle, value).inspect_err(|err| self.log_failure(name, err))
    }

    /// Invokes a method.
    ///
    /// # Errors
    /// `NotSupported` if the method is unknown or not exposed;
    /// `ArityMismatch` if `args` has the wrong length (no native call is
    /// made); `NativeCallFailed` from the native call.
    pub fn invoke(&self, name: &str, args: &[Value]) -> BindingResult<Value> {
        let descriptor = self.method(name).ok_or_else(|| self.not_supported(name))?;
        if args.len() != descriptor.arity {
            return Err(BindingError::ArityMismatch {
                name: descriptor.name,
                expected: descriptor.arity,
                found: args.len(),
            });
        }
        debug!(type_name = self.type_name, name, "invoke");
        (descriptor.invoke)(self.handle, args).inspect_err(|err| self.log_failure(name, err))
    }

    fn property(&self, name: &str) -> Option<&'static PropertyDescriptor<H>> {
        self.properties
            .iter()
            .find(|d| d.name == name && self.policy.exposes(d.enabled))
    }

    fn method(&self, name: &str) -> Option<&'static MethodDescriptor<H>> {
        self.methods
            .iter()
            .find(|d| d.name == name && self.policy.exposes(d.enabled))
    }

    fn not_supported(&self, name: &str) -> BindingError {
        BindingError::NotSupported {
            type_name: self.type_name,
            name: name.to_string(),
        }
    }

    fn log_failure(&self, name: &str, err: &BindingError) {
        match err {
            BindingError::NativeCallFailed { code } => {
                warn!(type_name = self.type_name, name, code, "native call failed");
            }
            _ => {
                warn!(type_name = self.type_name, name, kind = err.kind(), error = %err, "attribute access failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    struct Counter {
        value: Cell<f64>,
        calls: Cell<u32>,
    }

    fn read(c: &Counter) -> BindingResult<Value> {
        c.calls.set(c.calls.get() + 1);
        Ok(Value::Double(c.value.get()))
    }

    fn write(c: &Counter, v: Value) -> BindingResult<()> {
        c.calls.set(c.calls.get() + 1);
        c.value.set(v.as_double().unwrap_or_default());
        Ok(())
    }

    fn reset(c: &Counter, _args: &[Value]) -> BindingResult<Value> {
        c.calls.set(c.calls.get() + 1);
        c.value.set(0.0);
        Ok(Value::Double(0.0))
    }

    static PROPERTIES: [PropertyDescriptor<Counter>; 3] = [
        PropertyDescriptor {
            name: "Value",
            kind: ValueKind::Double,
            enabled: true,
            getter: Some(read),
            setter: Some(write),
        },
        PropertyDescriptor {
            name: "ReadOnly",
            kind: ValueKind::Double,
            enabled: true,
            getter: Some(read),
            setter: None,
        },
        PropertyDescriptor {
            name: "Hidden",
            kind: ValueKind::Double,
            enabled: false,
            getter: Some(read),
            setter: Some(write),
        },
    ];

    static METHODS: [MethodDescriptor<Counter>; 1] = [MethodDescriptor {
        name: "Reset",
        arity: 0,
        enabled: true,
        invoke: reset,
    }];

    fn counter() -> Counter {
        Counter {
            value: Cell::new(1.0),
            calls: Cell::new(0),
        }
    }

    #[test]
    fn test_set_then_get_round_trips() {
        let c = counter();
        let adapter = PropertyBindingAdapter::new("Counter", &c, &PROPERTIES, &METHODS);
        adapter.set("Value", Value::Double(4.5)).unwrap();
        assert_eq!(adapter.get("Value"), Ok(Value::Double(4.5)));
    }

    #[test]
    fn test_type_mismatch_skips_native_call() {
        let c = counter();
        let adapter = PropertyBindingAdapter::new("Counter", &c, &PROPERTIES, &METHODS);
        let err = adapter.set("Value", Value::Vector(glam::DVec2::ZERO)).unwrap_err();
        assert!(matches!(err, BindingError::TypeMismatch { expected: ValueKind::Double, found: ValueKind::Vector, .. }));
        assert_eq!(c.calls.get(), 0);
    }

    #[test]
    fn test_missing_setter_is_not_supported() {
        let c = counter();
        let adapter = PropertyBindingAdapter::new("Counter", &c, &PROPERTIES, &METHODS);
        let err = adapter.set("ReadOnly", Value::Double(1.0)).unwrap_err();
        assert!(matches!(err, BindingError::NotSupported { .. }));
        assert_eq!(c.calls.get(), 0);
    }

    #[test]
    fn test_arity_mismatch_skips_native_call() {
        let c = counter();
        let adapter = PropertyBindingAdapter::new("Counter", &c, &PROPERTIES, &METHODS);
        let err = adapter.invoke("Reset", &[Value::Double(1.0)]).unwrap_err();
        assert_eq!(
            err,
            BindingError::ArityMismatch {
                name: "Reset",
                expected: 0,
                found: 1
            }
        );
        assert_eq!(c.calls.get(), 0);
        assert_eq!(adapter.invoke("Reset", &[]), Ok(Value::Double(0.0)));
    }

    #[test]
    fn test_policy_controls_disabled_entries() {
        let c = counter();
        let adapter = PropertyBindingAdapter::new("Counter", &c, &PROPERTIES, &METHODS);
        assert!(!adapter.has_attribute("Hidden"));
        assert!(matches!(adapter.get("Hidden"), Err(BindingError::NotSupported { .. })));
        assert_eq!(adapter.attributes().collect::<Vec<_>>(), ["Value", "ReadOnly"]);

        let adapter = adapter.with_policy(ExposurePolicy::All);
        assert!(adapter.has_attribute("Hidden"));
        assert_eq!(adapter.get("Hidden"), Ok(Value::Double(1.0)));
        assert_eq!(adapter.methods().collect::<Vec<_>>(), ["Reset"]);
    }

    #[derive(Clone, Default)]
    struct LogBuffer(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn capture_logs(f: impl FnOnce()) -> String {
        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        buffer.contents()
    }

    fn fail_native(_c: &Counter) -> BindingResult<Value> {
        Err(BindingError::NativeCallFailed { code: -2147467259 })
    }

    fn bad_enum(_c: &Counter) -> BindingResult<Value> {
        Err(BindingError::InvalidEnumValue { raw: 9 })
    }

    static FAILING: [PropertyDescriptor<Counter>; 2] = [
        PropertyDescriptor {
            name: "Broken",
            kind: ValueKind::Double,
            enabled: true,
            getter: Some(fail_native),
            setter: None,
        },
        PropertyDescriptor {
            name: "State",
            kind: ValueKind::Enum,
            enabled: true,
            getter: Some(bad_enum),
            setter: None,
        },
    ];

    #[test]
    fn test_failure_log_names_the_error_kind() {
        let c = counter();
        let adapter = PropertyBindingAdapter::new("Counter", &c, &FAILING, &[]);

        let native = capture_logs(|| {
            let _ = adapter.get("Broken");
        });
        assert!(native.contains("native call failed"), "{native}");
        assert!(native.contains("code=-2147467259"), "{native}");

        let conversion = capture_logs(|| {
            let _ = adapter.get("State");
        });
        assert!(!conversion.contains("native call failed"), "{conversion}");
        assert!(conversion.contains("attribute access failed"), "{conversion}");
        assert!(conversion.contains("invalid_enum_value"), "{conversion}");
    }

    #[test]
    fn test_unknown_name_is_not_supported() {
        let c = counter();
        let adapter = PropertyBindingAdapter::new("Counter", &c, &PROPERTIES, &METHODS);
        assert_eq!(
            adapter.invoke("Nope", &[]),
            Err(BindingError::NotSupported {
                type_name: "Counter",
                name: "Nope".to_string()
            })
        );
    }
}
