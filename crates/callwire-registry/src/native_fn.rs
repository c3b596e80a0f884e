//! Native method storage.

use std::fmt;
use std::sync::Arc;

use callwire_core::{NativeError, TypeHash};

use crate::call_context::CallContext;

/// Type-erased native method.
///
/// Wraps any callable implementing [`NativeCallable`] so methods of different
/// shapes can be stored in one table. The callable is behind an `Arc`, so
/// cloning shares it.
pub struct NativeMethod {
    /// Dispatch key, from [`MethodInfo::hash`](crate::MethodInfo::hash).
    pub id: TypeHash,
    inner: Arc<dyn NativeCallable + Send + Sync>,
}

impl NativeMethod {
    pub fn new<F>(id: TypeHash, f: F) -> Self
    where
        F: NativeCallable + Send + Sync + 'static,
    {
        Self {
            id,
            inner: Arc::new(f),
        }
    }

    /// Call this method with the given context.
    pub fn call(&self, ctx: &mut CallContext) -> Result<(), NativeError> {
        self.inner.call(ctx)
    }
}

impl fmt::Debug for NativeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeMethod")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl Clone for NativeMethod {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Trait for callable native methods.
pub trait NativeCallable {
    fn call(&self, ctx: &mut CallContext) -> Result<(), NativeError>;
}

impl<F> NativeCallable for F
where
    F: Fn(&mut CallContext) -> Result<(), NativeError>,
{
    fn call(&self, ctx: &mut CallContext) -> Result<(), NativeError> {
        (self)(ctx)
    }
}
