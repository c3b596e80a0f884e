//! The contract between a binding and whatever performs method lookup.
//!
//! A binding never looks methods up itself. It asks a [`BindingResolver`] once
//! for an [`InvocationHandle`] and then calls the handle on every invocation.

use callwire_core::{Dynamic, NativeError, ObjectRef, ResolveError, TypeInfo};

use crate::method::MethodInfo;

/// A resolved call, bound to one target and one method.
///
/// Handles are owned by a single binding and never shared.
pub trait InvocationHandle {
    /// Execute the call with one boxed value per parameter.
    fn invoke(&self, args: &[Dynamic]) -> Result<(), NativeError>;
}

/// Turns a (target, method name, parameter types) triple into a handle.
pub trait BindingResolver {
    fn resolve(
        &self,
        target: &ObjectRef,
        method: &str,
        params: &[TypeInfo],
    ) -> Result<Box<dyn InvocationHandle>, ResolveError>;

    /// Describe the method, if the resolver knows it.
    ///
    /// Used to restore parameter names after load and to render labels.
    fn method_info(
        &self,
        _target: &ObjectRef,
        _method: &str,
        _params: &[TypeInfo],
    ) -> Option<MethodInfo> {
        None
    }
}

impl<F> InvocationHandle for F
where
    F: Fn(&[Dynamic]) -> Result<(), NativeError>,
{
    fn invoke(&self, args: &[Dynamic]) -> Result<(), NativeError> {
        (self)(args)
    }
}

impl<R: BindingResolver + ?Sized> BindingResolver for &R {
    fn resolve(
        &self,
        target: &ObjectRef,
        method: &str,
        params: &[TypeInfo],
    ) -> Result<Box<dyn InvocationHandle>, ResolveError> {
        (**self).resolve(target, method, params)
    }

    fn method_info(
        &self,
        target: &ObjectRef,
        method: &str,
        params: &[TypeInfo],
    ) -> Option<MethodInfo> {
        (**self).method_info(target, method, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use callwire_core::ObjectId;
    use std::cell::Cell;

    struct Always;

    impl BindingResolver for Always {
        fn resolve(
            &self,
            _target: &ObjectRef,
            _method: &str,
            _params: &[TypeInfo],
        ) -> Result<Box<dyn InvocationHandle>, ResolveError> {
            Ok(Box::new(|args: &[Dynamic]| {
                if args.is_empty() {
                    Ok(())
                } else {
                    Err(NativeError::other("unexpected arguments"))
                }
            }))
        }
    }

    #[test]
    fn closure_is_a_handle() {
        let hits = Cell::new(0);
        let handle = |args: &[Dynamic]| -> Result<(), NativeError> {
            hits.set(hits.get() + args.len());
            Ok(())
        };
        handle.invoke(&[Dynamic::Int(1), Dynamic::Bool(true)]).unwrap();
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn default_method_info_is_none() {
        let target = ObjectRef::new(ObjectId(1), "Tests.Thing");
        assert!(Always.method_info(&target, "Poke", &[]).is_none());

        let by_ref = &Always;
        let handle = by_ref.resolve(&target, "Poke", &[]).unwrap();
        assert!(handle.invoke(&[]).is_ok());
        assert!(handle.invoke(&[Dynamic::Int(0)]).is_err());
    }
}
