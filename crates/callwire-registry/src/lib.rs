//! Method lookup for callwire bindings.
//!
//! This crate defines the [`BindingResolver`] contract a binding uses to turn a
//! method name into an [`InvocationHandle`], the [`MethodInfo`] rules deciding
//! which methods can be bound, and [`MethodTable`], a resolver backed by native
//! Rust callables.

pub mod call_context;
pub mod method;
pub mod method_table;
pub mod native_fn;
pub mod resolver;

pub use call_context::CallContext;
pub use method::{MAX_PARAMETERS, MethodInfo, ParamInfo, display_method_name, format_params};
pub use method_table::MethodTable;
pub use native_fn::{NativeCallable, NativeMethod};
pub use resolver::{BindingResolver, InvocationHandle};
