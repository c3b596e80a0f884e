//! Invocation context: which resolver to use and where the host is running.

use std::fmt;

use bitflags::bitflags;

use callwire_registry::BindingResolver;

bitflags! {
    /// Execution contexts a binding may fire in.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ExecutionContexts: u8 {
        /// Design time, inside an editing tool.
        const EDITOR = 1 << 0;
        /// Normal program execution.
        const RUNTIME = 1 << 1;
    }
}

/// Everything a binding needs from its host at invocation time.
#[derive(Clone, Copy)]
pub struct InvokeContext<'a> {
    pub resolver: &'a dyn BindingResolver,
    /// The context the host is currently in.
    pub context: ExecutionContexts,
}

impl<'a> InvokeContext<'a> {
    pub fn new(resolver: &'a dyn BindingResolver, context: ExecutionContexts) -> Self {
        Self { resolver, context }
    }

    pub fn runtime(resolver: &'a dyn BindingResolver) -> Self {
        Self::new(resolver, ExecutionContexts::RUNTIME)
    }

    pub fn editor(resolver: &'a dyn BindingResolver) -> Self {
        Self::new(resolver, ExecutionContexts::EDITOR)
    }

    /// Whether a binding permitted in `permitted` may fire here.
    pub fn allows(&self, permitted: ExecutionContexts) -> bool {
        permitted.intersects(self.context)
    }
}

impl fmt::Debug for InvokeContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvokeContext")
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}
