//! Memoized views over a binding's static arguments.

use callwire_core::{ArgumentValue, Dynamic, TypeInfo};

/// Memo of the runtime types and boxed values of an argument list.
///
/// The cache does not own the arguments; every method takes the backing slice.
/// Once built, `types` and `values` keep returning the same memo until
/// [`invalidate`](Self::invalidate) is called, even if the backing slice has
/// been edited in the meantime.
#[derive(Debug, Default, Clone)]
pub struct ArgumentCache {
    types: Option<Vec<TypeInfo>>,
    values: Option<Vec<Dynamic>>,
}

impl ArgumentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of arguments in the backing list.
    pub fn count(&self, args: &[ArgumentValue]) -> usize {
        args.len()
    }

    /// The runtime type of each argument, in order.
    pub fn types(&mut self, args: &[ArgumentValue]) -> &[TypeInfo] {
        self.types
            .get_or_insert_with(|| args.iter().map(ArgumentValue::type_info).collect())
    }

    /// The boxed value of each argument, in order.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn values(&mut self, args: &[ArgumentValue]) -> &[Dynamic] {
        self.values
            .get_or_insert_with(|| args.iter().map(ArgumentValue::object_value).collect())
    }

    /// Drop both memos.
    pub fn invalidate(&mut self) {
        self.types = None;
        self.values = None;
    }

    /// Whether either memo is currently built.
    pub fn is_built(&self) -> bool {
        self.types.is_some() || self.values.is_some()
    }
}
