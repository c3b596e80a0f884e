//! Persisted method-call bindings and typed event channels.
//!
//! A [`CallBinding`](binding::CallBinding) stores a target object, a method name
//! and typed arguments in plainly serializable form, and invokes the method
//! through a handle that is resolved once and reused. Bindings are grouped into
//! a [`BindingGroup`](group::BindingGroup), wrapped by typed
//! [`EventChannel`](event::EventChannel)s, and optionally keyed by an enum in a
//! [`KeyedEventRegistry`](keyed::KeyedEventRegistry).
//!
//! Method lookup is delegated to a
//! [`BindingResolver`](callwire_registry::BindingResolver);
//! [`MethodTable`](callwire_registry::MethodTable) is a ready-made one backed by
//! native Rust callables.

pub mod argument_cache;
pub mod binding;
pub mod context;
pub mod event;
pub mod group;
pub mod keyed;

// Re-export main types
pub mod prelude {
    pub use crate::argument_cache::ArgumentCache;
    pub use crate::binding::{
        ArgumentMode, CallBinding, CallState, InvokeOutcome, ResolutionStatus, SkipReason,
    };
    pub use crate::context::{ExecutionContexts, InvokeContext};
    pub use crate::event::{Event0, Event1, Event2, Event3, Event4, EventArgs, EventChannel};
    pub use crate::group::{BindingGroup, DispatchSummary};
    pub use crate::keyed::{DuplicateKeyPolicy, KeyedEventRegistry};
    pub use callwire_core::{
        ArgTag, Argument, ArgumentValue, CallwireError, Dynamic, EnumValue, FromDynamic,
        IntoDynamic, ObjectId, ObjectRef, TypeCache, TypeHash, TypeInfo, TypeKind,
        TypeNameResolver, Typed, impl_enum_argument, impl_object_argument,
    };
    pub use callwire_core::error::*;
    pub use callwire_core::math::*;
    pub use callwire_registry::{
        BindingResolver, CallContext, InvocationHandle, MethodInfo, MethodTable, NativeMethod,
        ParamInfo,
    };
}
