//! Call context handed to native methods.

use callwire_core::{Dynamic, FromDynamic, NativeError, ObjectRef};

/// Context for one native method call.
///
/// Gives the method its target and typed access to its arguments.
///
/// ```ignore
/// let score: i32 = ctx.arg(0)?;
/// let id = ctx.this().id;
/// ```
pub struct CallContext<'a> {
    this: &'a ObjectRef,
    args: &'a [Dynamic],
}

impl<'a> CallContext<'a> {
    pub fn new(this: &'a ObjectRef, args: &'a [Dynamic]) -> Self {
        Self { this, args }
    }

    /// The object the method is called on.
    pub fn this(&self) -> &'a ObjectRef {
        self.this
    }

    pub fn arg_count(&self) -> usize {
        self.args.len()
    }

    /// Get a raw reference to an argument slot.
    pub fn arg_slot(&self, index: usize) -> Result<&'a Dynamic, NativeError> {
        self.args
            .get(index)
            .ok_or(NativeError::ArgumentIndexOutOfBounds {
                index,
                count: self.args.len(),
            })
    }

    /// Get a typed argument value.
    pub fn arg<T: FromDynamic>(&self, index: usize) -> Result<T, NativeError> {
        let slot = self.arg_slot(index)?;
        T::from_dynamic(slot).map_err(NativeError::Conversion)
    }

    /// All arguments in declaration order.
    pub fn args(&self) -> &'a [Dynamic] {
        self.args
    }
}
