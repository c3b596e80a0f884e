//! Ordered collections of bindings.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::error;

use callwire_core::{BindingError, Dynamic, ObjectRef, TypeInfo};
use callwire_registry::MethodInfo;

use crate::binding::{CallBinding, InvokeOutcome};
use crate::context::InvokeContext;

/// What happened during one [`BindingGroup::invoke`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub invoked: usize,
    pub skipped: usize,
    /// Index and error of every binding that failed.
    pub failures: Vec<(usize, BindingError)>,
}

impl DispatchSummary {
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }
}

/// An ordered list of bindings invoked together.
///
/// Persisted as a plain list. Cloning copies every binding; the copies resolve
/// their own handles.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BindingGroup {
    bindings: Vec<CallBinding>,
    #[serde(skip)]
    dynamic_types: Option<Arc<[TypeInfo]>>,
}

impl BindingGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CallBinding> {
        self.bindings.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut CallBinding> {
        self.bindings.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CallBinding> {
        self.bindings.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, CallBinding> {
        self.bindings.iter_mut()
    }

    /// Append a binding to `method` on `target`.
    pub fn add(
        &mut self,
        target: ObjectRef,
        method: &MethodInfo,
    ) -> Result<&mut CallBinding, BindingError> {
        let binding = CallBinding::with_method(target, method)?;
        let index = self.bindings.len();
        self.push(binding);
        Ok(&mut self.bindings[index])
    }

    /// Append an existing binding.
    pub fn push(&mut self, mut binding: CallBinding) {
        binding.constrain_dynamic_types(self.dynamic_types.clone());
        self.bindings.push(binding);
    }

    /// Insert a binding at `index`, shifting later ones.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&mut self, index: usize, mut binding: CallBinding) {
        binding.constrain_dynamic_types(self.dynamic_types.clone());
        self.bindings.insert(index, binding);
    }

    /// Remove the binding at `index`, if any.
    pub fn remove(&mut self, index: usize) -> Option<CallBinding> {
        (index < self.bindings.len()).then(|| self.bindings.remove(index))
    }

    pub fn clear(&mut self) {
        self.bindings.clear();
    }

    /// Tell every binding which argument types the owning channel declares.
    pub fn constrain_dynamic_types(&mut self, types: Option<Arc<[TypeInfo]>>) {
        for binding in &mut self.bindings {
            binding.constrain_dynamic_types(types.clone());
        }
        self.dynamic_types = types;
    }

    /// Invoke every binding in order with the same arguments.
    ///
    /// A failing binding is logged and recorded; later bindings still run.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn invoke(&mut self, ctx: &InvokeContext<'_>, args: &[Dynamic]) -> DispatchSummary {
        let mut summary = DispatchSummary::default();
        for (index, binding) in self.bindings.iter_mut().enumerate() {
            match binding.invoke(ctx, args) {
                Ok(InvokeOutcome::Invoked) => summary.invoked += 1,
                Ok(InvokeOutcome::Skipped(_)) => summary.skipped += 1,
                Err(err) => {
                    error!(index, error = %err, "binding invocation failed");
                    summary.failures.push((index, err));
                }
            }
        }
        summary
    }
}

impl PartialEq for BindingGroup {
    /// Compares the persisted bindings; the owning channel's types are ignored.
    fn eq(&self, other: &Self) -> bool {
        self.bindings == other.bindings
    }
}

impl<'a> IntoIterator for &'a BindingGroup {
    type Item = &'a CallBinding;
    type IntoIter = std::slice::Iter<'a, CallBinding>;

    fn into_iter(self) -> Self::IntoIter {
        self.bindings.iter()
    }
}
