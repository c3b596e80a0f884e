//! Error types for every stage of a binding's life.
//!
//! ## Error Hierarchy
//!
//! ```text
//! CallwireError (top-level wrapper)
//! ├── ArgumentError     - Argument slot access and construction
//! ├── ResolveError      - Method lookup for a binding (reported, not fatal)
//! ├── NativeError       - Failures raised by an invoked method
//! ├── RegistrationError - Dispatch table registration
//! ├── BindingError      - Binding configuration and invocation
//! └── RegistryError     - Keyed channel registry mutation
//! ```
//!
//! Configuration-time errors (argument construction, `reset`, registry `add`)
//! surface to the caller. Resolution errors are recorded on the binding and the
//! binding is skipped until it is reconfigured.

use thiserror::Error;

use crate::{ArgTag, ObjectId};

// ============================================================================
// Conversion Errors
// ============================================================================

/// A boxed value could not be converted to the requested Rust type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// The boxed value holds a different type.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    /// The boxed enum belongs to another enum type.
    #[error("enum type mismatch: expected {expected}")]
    EnumTypeMismatch { expected: &'static str },

    /// The numeric value is not a variant of the enum.
    #[error("{value} is not a valid {type_name}")]
    InvalidEnumValue {
        type_name: &'static str,
        value: i32,
    },
}

// ============================================================================
// Argument Errors
// ============================================================================

/// Errors raised by [`ArgumentValue`](crate::ArgumentValue) accessors and constructors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    /// An accessor for one tag was used on a value stored under another.
    #[error("argument type mismatch: operation requires {expected}, stored value is {actual}")]
    TypeMismatch { expected: ArgTag, actual: ArgTag },

    /// The type cannot be represented in an argument slot.
    #[error("unsupported argument type: {type_name}")]
    UnsupportedArgumentType { type_name: String },

    /// An in-place edit replaced the argument with one of another type.
    #[error("argument type cannot change from {expected} to {actual}")]
    TypeChanged { expected: String, actual: String },

    /// A typed read failed to convert the boxed value.
    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

// ============================================================================
// Method Validation
// ============================================================================

/// Why a method cannot be used as a binding target.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MethodInvalidReason {
    #[error("generic methods are not supported")]
    GenericMethod,

    #[error("property getters are not supported")]
    PropertyGetter,

    #[error("{count} parameters exceed the limit of {max}")]
    TooManyParameters { count: usize, max: usize },

    #[error("parameter '{param}' is an output or reference parameter")]
    OutParameter { param: String },

    #[error("parameter '{param}' has unsupported type {type_name}")]
    UnsupportedParameter { param: String, type_name: String },

    #[error("method is obsolete")]
    Obsolete,
}

// ============================================================================
// Resolution Errors
// ============================================================================

/// Errors returned by a binding resolver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// No method matches the name and parameter types.
    #[error("method not found: {type_name}.{method}({params})")]
    MethodNotFound {
        type_name: String,
        method: String,
        params: String,
    },

    /// More than one method matches.
    #[error("ambiguous method {type_name}.{method}: could be {}", candidates.join(", "))]
    Ambiguous {
        type_name: String,
        method: String,
        candidates: Vec<String>,
    },

    /// The method exists but cannot be bound.
    #[error("method {method} cannot be bound: {reason}")]
    Unsupported {
        method: String,
        reason: MethodInvalidReason,
    },
}

// ============================================================================
// Native Errors
// ============================================================================

/// Errors raised while executing a resolved call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NativeError {
    /// An argument could not be converted to the parameter type.
    #[error("argument conversion failed: {0}")]
    Conversion(#[from] ConversionError),

    /// An argument index was past the end of the argument list.
    #[error("argument index {index} out of bounds ({count} arguments)")]
    ArgumentIndexOutOfBounds { index: usize, count: usize },

    /// The host no longer has an object for the target id.
    #[error("object {0} no longer exists")]
    StaleObject(ObjectId),

    /// Any other failure reported by the method.
    #[error("{message}")]
    Other { message: String },
}

impl NativeError {
    pub fn other(message: impl Into<String>) -> Self {
        NativeError::Other {
            message: message.into(),
        }
    }
}

// ============================================================================
// Registration Errors
// ============================================================================

/// Errors raised while populating a method dispatch table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("duplicate method: {owner}.{method}")]
    DuplicateMethod { owner: String, method: String },

    #[error("method {method} cannot be registered: {reason}")]
    InvalidMethod {
        method: String,
        reason: MethodInvalidReason,
    },
}

// ============================================================================
// Binding Errors
// ============================================================================

/// Errors raised while configuring or invoking a single binding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    /// A dynamic-mode call supplied the wrong number of arguments.
    #[error("argument count mismatch for <{target}.{method}>: expected {expected}, got {got}")]
    ArgumentCountMismatch {
        target: String,
        method: String,
        expected: usize,
        got: usize,
    },

    /// A method was given without a target object.
    #[error("method '{method}' requires a target")]
    MissingTarget { method: String },

    /// The binding's argument types do not match the channel's declared types.
    #[error("dynamic arguments are not allowed for this binding")]
    DynamicModeNotAllowed,

    /// An argument index was past the end of the static arguments.
    #[error("argument index {index} out of bounds ({count} arguments)")]
    ArgumentIndexOutOfBounds { index: usize, count: usize },

    #[error(transparent)]
    Argument(#[from] ArgumentError),

    /// The resolved method reported a failure.
    #[error("invocation of {method} failed: {source}")]
    Invocation {
        method: String,
        #[source]
        source: NativeError,
    },
}

// ============================================================================
// Registry Errors
// ============================================================================

/// Errors raised when mutating a keyed channel registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("key {key} already exists")]
    DuplicateKey { key: String },
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// The unified error type for all callwire operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallwireError {
    #[error(transparent)]
    Argument(#[from] ArgumentError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Native(#[from] NativeError),

    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error(transparent)]
    Binding(#[from] BindingError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl CallwireError {
    /// Check if this is a configuration-time error.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            CallwireError::Argument(_)
                | CallwireError::Registration(_)
                | CallwireError::Registry(_)
                | CallwireError::Binding(BindingError::MissingTarget { .. })
        )
    }

    /// Check if this is a resolution error.
    pub fn is_resolve(&self) -> bool {
        matches!(self, CallwireError::Resolve(_))
    }
}

// ============================================================================
// Tests
// ============================================================================
