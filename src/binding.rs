//! A single persisted method call.
//!
//! A [`CallBinding`] records a target object, a method name and the arguments to
//! pass, and can be invoked any number of times. The method is looked up through
//! a [`BindingResolver`] on first use; the resulting handle is reused until the
//! target or method changes.
//!
//! # Resolution
//!
//! ```text
//! Dirty ──resolve──> Resolved(handle)
//!   │                    │
//!   └──────────────> Failed(error) / Unbound
//! ```
//!
//! A failed resolution is logged and remembered. It is not retried until the
//! binding is reconfigured or [`CallBinding::validate`] is called.
//!
//! # Argument Modes
//!
//! - **Static**: the binding's own stored arguments are passed.
//! - **Dynamic**: the values given by the caller are passed. Only allowed when
//!   the binding's parameter types equal the enclosing channel's declared types.

use std::fmt;
use std::sync::Arc;

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use callwire_core::{ArgumentError, ArgumentValue, BindingError, Dynamic, ObjectRef, ResolveError, TypeInfo};
use callwire_registry::{BindingResolver, InvocationHandle, MethodInfo, display_method_name};

use crate::argument_cache::ArgumentCache;
use crate::context::{ExecutionContexts, InvokeContext};

/// When a binding fires.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive, Serialize, Deserialize,
)]
#[repr(u8)]
#[serde(into = "u8", try_from = "u8")]
pub enum CallState {
    /// Never.
    Off = 0,
    /// At design time and at runtime.
    EditorAndRuntime = 1,
    /// At runtime only.
    RuntimeOnly = 2,
}

impl CallState {
    /// The execution contexts this state permits.
    pub fn allowed_contexts(self) -> ExecutionContexts {
        match self {
            CallState::Off => ExecutionContexts::empty(),
            CallState::EditorAndRuntime => ExecutionContexts::EDITOR | ExecutionContexts::RUNTIME,
            CallState::RuntimeOnly => ExecutionContexts::RUNTIME,
        }
    }
}

impl Default for CallState {
    fn default() -> Self {
        CallState::RuntimeOnly
    }
}

/// Where a binding's argument values come from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive, Serialize, Deserialize,
)]
#[repr(u8)]
#[serde(into = "u8", try_from = "u8")]
pub enum ArgumentMode {
    /// The binding's stored arguments.
    Static = 0,
    /// The arguments supplied by the caller.
    Dynamic = 1,
}

impl Default for ArgumentMode {
    fn default() -> Self {
        ArgumentMode::Static
    }
}

#[derive(Default)]
enum HandleState {
    /// Needs resolution before the next call.
    #[default]
    Dirty,
    /// No target or no method; nothing to resolve.
    Unbound,
    Resolved(Box<dyn InvocationHandle>),
    Failed(ResolveError),
}

/// Observable resolution state of a binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionStatus {
    /// Not resolved since the last configuration change.
    Unresolved,
    /// No target or no method configured.
    Unbound,
    Resolved,
    Failed(ResolveError),
}

/// Why an invocation did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The binding's call state is `Off`.
    Off,
    /// The call state does not permit the current execution context.
    ContextNotPermitted,
    /// There is no handle to call.
    Unresolved,
}

/// Result of a successful [`CallBinding::invoke`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvokeOutcome {
    Invoked,
    Skipped(SkipReason),
}

/// A persisted call to one method on one target.
#[derive(Default, Serialize, Deserialize)]
pub struct CallBinding {
    #[serde(default)]
    target: Option<ObjectRef>,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    arguments: Vec<ArgumentValue>,
    #[serde(default)]
    mode: ArgumentMode,
    #[serde(default)]
    state: CallState,

    #[serde(skip)]
    cache: ArgumentCache,
    #[serde(skip)]
    handle: HandleState,
    /// Declared argument types of the enclosing channel.
    #[serde(skip)]
    dynamic_types: Option<Arc<[TypeInfo]>>,
}

impl CallBinding {
    /// Create an empty binding: no target, no method, `RuntimeOnly`, `Static`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a binding to `method` on `target`, with zero-valued arguments.
    pub fn with_method(target: ObjectRef, method: &MethodInfo) -> Result<Self, BindingError> {
        let mut binding = Self::new();
        binding.reset(Some(target), Some(method))?;
        Ok(binding)
    }

    // ==========================================================================
    // Configuration
    // ==========================================================================

    /// Point the binding at a new target and method.
    ///
    /// Arguments are rebuilt from the method's parameters with zero values and
    /// the parameter names. Fails without changing anything if a method is given
    /// without a target, or if a parameter type cannot be stored.
    pub fn reset(
        &mut self,
        target: Option<ObjectRef>,
        method: Option<&MethodInfo>,
    ) -> Result<(), BindingError> {
        let arguments = match method {
            Some(info) => {
                if target.is_none() {
                    return Err(BindingError::MissingTarget {
                        method: info.name.clone(),
                    });
                }
                info.params
                    .iter()
                    .map(|param| {
                        let mut arg = ArgumentValue::from_type(&param.ty)?;
                        arg.set_declared_name(Some(param.name.clone()));
                        Ok(arg)
                    })
                    .collect::<Result<Vec<_>, ArgumentError>>()?
            }
            None => Vec::new(),
        };

        self.target = target;
        self.method = method.map(|info| info.name.clone());
        self.arguments = arguments;
        self.cache.invalidate();
        self.handle = HandleState::Dirty;
        self.enforce_mode();
        Ok(())
    }

    /// Keep the method but call it on another object.
    pub fn retarget(&mut self, target: ObjectRef) {
        self.target = Some(target);
        self.handle = HandleState::Dirty;
    }

    pub fn target(&self) -> Option<&ObjectRef> {
        self.target.as_ref()
    }

    pub fn method_name(&self) -> Option<&str> {
        self.method.as_deref()
    }

    pub fn arguments(&self) -> &[ArgumentValue] {
        &self.arguments
    }

    pub fn argument_count(&self) -> usize {
        self.cache.count(&self.arguments)
    }

    /// The runtime type of each stored argument.
    pub fn argument_types(&mut self) -> &[TypeInfo] {
        self.cache.types(&self.arguments)
    }

    pub fn state(&self) -> CallState {
        self.state
    }

    pub fn set_state(&mut self, state: CallState) {
        self.state = state;
    }

    pub fn mode(&self) -> ArgumentMode {
        self.mode
    }

    /// Change the argument mode.
    ///
    /// Switching to `Dynamic` fails unless [`supports_dynamic_mode`](Self::supports_dynamic_mode).
    pub fn set_mode(&mut self, mode: ArgumentMode) -> Result<(), BindingError> {
        if mode == ArgumentMode::Dynamic && !self.supports_dynamic_mode() {
            return Err(BindingError::DynamicModeNotAllowed);
        }
        self.mode = mode;
        Ok(())
    }

    /// Overwrite one stored argument from its boxed form.
    pub fn set_argument(&mut self, index: usize, value: Dynamic) -> Result<(), BindingError> {
        self.edit_argument(index, |arg| arg.set_dynamic(value))
    }

    /// Edit one stored argument in place.
    ///
    /// The edit may change the value but not the type; only [`reset`](Self::reset)
    /// changes argument types. An edit that replaces the argument with one of
    /// another type is undone and reported as [`ArgumentError::TypeChanged`].
    /// The boxed-value memo is dropped afterwards whether or not the edit
    /// succeeded; the resolved handle is kept.
    pub fn edit_argument<R>(
        &mut self,
        index: usize,
        edit: impl FnOnce(&mut ArgumentValue) -> Result<R, ArgumentError>,
    ) -> Result<R, BindingError> {
        let count = self.arguments.len();
        let arg = self
            .arguments
            .get_mut(index)
            .ok_or(BindingError::ArgumentIndexOutOfBounds { index, count })?;
        let original = arg.clone();
        let result = edit(arg);
        let (before, after) = (original.type_info(), arg.type_info());
        self.cache.invalidate();
        if before != after {
            *arg = original;
            return Err(ArgumentError::TypeChanged {
                expected: before.name().to_owned(),
                actual: after.name().to_owned(),
            }
            .into());
        }
        Ok(result?)
    }

    /// Drop memoized argument values after the arguments were edited elsewhere.
    pub fn invalidate_argument_cache(&mut self) {
        self.cache.invalidate();
    }

    // ==========================================================================
    // Dynamic Mode
    // ==========================================================================

    /// Record the argument types declared by the enclosing channel.
    ///
    /// A binding in `Dynamic` mode that no longer qualifies is switched to `Static`.
    pub fn constrain_dynamic_types(&mut self, types: Option<Arc<[TypeInfo]>>) {
        self.dynamic_types = types;
        self.enforce_mode();
    }

    pub fn dynamic_types(&self) -> Option<&[TypeInfo]> {
        self.dynamic_types.as_deref()
    }

    /// Whether caller-supplied arguments can be passed straight through.
    ///
    /// Requires a target and method, at least one argument, declared channel
    /// types, and exact element-wise type equality.
    pub fn supports_dynamic_mode(&self) -> bool {
        if self.target.is_none() || self.method.is_none() || self.arguments.is_empty() {
            return false;
        }
        let Some(declared) = self.dynamic_types.as_deref() else {
            return false;
        };
        declared.len() == self.arguments.len()
            && self
                .arguments
                .iter()
                .zip(declared)
                .all(|(arg, ty)| arg.type_info() == *ty)
    }

    fn enforce_mode(&mut self) {
        if self.mode == ArgumentMode::Dynamic && !self.supports_dynamic_mode() {
            debug!(binding = %self.describe(), "dynamic arguments no longer match; using static");
            self.mode = ArgumentMode::Static;
        }
    }

    // ==========================================================================
    // Resolution
    // ==========================================================================

    fn resolve_handle(&mut self, resolver: &dyn BindingResolver) -> HandleState {
        let (Some(target), Some(method)) = (self.target.as_ref(), self.method.as_deref()) else {
            return HandleState::Unbound;
        };
        let params = self.cache.types(&self.arguments);
        resolve_call(resolver, target, method, params)
    }

    fn resolve_fresh(&self, resolver: &dyn BindingResolver) -> HandleState {
        let (Some(target), Some(method)) = (self.target.as_ref(), self.method.as_deref()) else {
            return HandleState::Unbound;
        };
        let params: Vec<TypeInfo> = self.arguments.iter().map(ArgumentValue::type_info).collect();
        resolve_call(resolver, target, method, &params)
    }

    /// Resolve the method again, replacing any existing handle.
    ///
    /// This is also how a binding recovers after a failed resolution, which is
    /// never retried on its own. Parameter types are read from the stored
    /// arguments, not the memo; the memo is left alone.
    pub fn validate(&mut self, resolver: &dyn BindingResolver) -> Result<(), ResolveError> {
        self.handle = self.resolve_fresh(resolver);
        match &self.handle {
            HandleState::Failed(err) => Err(err.clone()),
            _ => Ok(()),
        }
    }

    pub fn resolution_status(&self) -> ResolutionStatus {
        match &self.handle {
            HandleState::Dirty => ResolutionStatus::Unresolved,
            HandleState::Unbound => ResolutionStatus::Unbound,
            HandleState::Resolved(_) => ResolutionStatus::Resolved,
            HandleState::Failed(err) => ResolutionStatus::Failed(err.clone()),
        }
    }

    /// Describe the bound method without resolving it.
    pub fn method_info(&self, resolver: &dyn BindingResolver) -> Option<MethodInfo> {
        let target = self.target.as_ref()?;
        let method = self.method.as_deref()?;
        let params: Vec<TypeInfo> = self.arguments.iter().map(ArgumentValue::type_info).collect();
        resolver.method_info(target, method, &params)
    }

    /// Copy the method's parameter names onto the stored arguments.
    ///
    /// Names are not persisted, so this is needed after loading. Returns whether
    /// the names were updated.
    pub fn refresh_argument_names(&mut self, resolver: &dyn BindingResolver) -> bool {
        let Some(info) = self.method_info(resolver) else {
            return false;
        };
        if info.params.len() != self.arguments.len() {
            return false;
        }
        for (arg, param) in self.arguments.iter_mut().zip(&info.params) {
            arg.set_declared_name(Some(param.name.clone()));
        }
        true
    }

    /// A one-line description for pickers and inspectors.
    ///
    /// - `No Function` without a target or method
    /// - `Missing<Type.method>` when the resolver does not know the method
    /// - `<Type.method> invalid with reason: ...` when it cannot be bound
    /// - `Type.method` otherwise, with a property-setter prefix removed
    pub fn label(&self, resolver: &dyn BindingResolver) -> String {
        let (Some(target), Some(method)) = (self.target.as_ref(), self.method.as_deref()) else {
            return "No Function".to_owned();
        };
        if method.is_empty() {
            return "No Function".to_owned();
        }
        let ty = target.type_info();
        let type_name = ty.short_name();
        match self.method_info(resolver) {
            None => format!("Missing<{}.{}>", type_name, method),
            Some(info) => match info.validate() {
                Ok(()) => format!("{}.{}", type_name, display_method_name(method)),
                Err(reason) => format!("<{}.{}> invalid with reason: {}", type_name, method, reason),
            },
        }
    }

    fn describe(&self) -> String {
        describe_call(self.target.as_ref(), self.method.as_deref())
    }

    // ==========================================================================
    // Invocation
    // ==========================================================================

    /// Call the bound method.
    ///
    /// `args` are used in `Dynamic` mode and ignored in `Static` mode. A binding
    /// that is off, not permitted in the current context, or unresolvable is
    /// skipped rather than failing.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn invoke(
        &mut self,
        ctx: &InvokeContext<'_>,
        args: &[Dynamic],
    ) -> Result<InvokeOutcome, BindingError> {
        if self.state == CallState::Off {
            return Ok(InvokeOutcome::Skipped(SkipReason::Off));
        }
        if !ctx.allows(self.state.allowed_contexts()) {
            return Ok(InvokeOutcome::Skipped(SkipReason::ContextNotPermitted));
        }
        if matches!(self.handle, HandleState::Dirty) {
            self.handle = self.resolve_handle(ctx.resolver);
        }
        let HandleState::Resolved(handle) = &self.handle else {
            return Ok(InvokeOutcome::Skipped(SkipReason::Unresolved));
        };

        let values = match self.mode {
            ArgumentMode::Dynamic => {
                let expected = self.arguments.len();
                if args.len() != expected {
                    return Err(BindingError::ArgumentCountMismatch {
                        target: self
                            .target
                            .as_ref()
                            .map(|t| t.type_name.to_string())
                            .unwrap_or_default(),
                        method: self.method.clone().unwrap_or_default(),
                        expected,
                        got: args.len(),
                    });
                }
                args
            }
            ArgumentMode::Static => self.cache.values(&self.arguments),
        };

        let (target, method) = (self.target.as_ref(), self.method.as_deref());
        trace!(object = ?target, method, args = values.len(), "invoke");
        handle
            .invoke(values)
            .map_err(|source| BindingError::Invocation {
                method: describe_call(target, method),
                source,
            })?;
        Ok(InvokeOutcome::Invoked)
    }
}

fn resolve_call(
    resolver: &dyn BindingResolver,
    target: &ObjectRef,
    method: &str,
    params: &[TypeInfo],
) -> HandleState {
    match resolver.resolve(target, method, params) {
        Ok(handle) => {
            debug!(object = %target, method, "resolved binding");
            HandleState::Resolved(handle)
        }
        Err(err) => {
            warn!(object = %target, method, error = %err, "failed to resolve binding");
            HandleState::Failed(err)
        }
    }
}

fn describe_call(target: Option<&ObjectRef>, method: Option<&str>) -> String {
    match (target, method) {
        (Some(target), Some(method)) => format!("{}.{}", target.type_name, method),
        (None, Some(method)) => method.to_owned(),
        _ => "<unbound>".to_owned(),
    }
}

impl Clone for CallBinding {
    /// Copies the persisted configuration. The copy resolves its own handle.
    fn clone(&self) -> Self {
        Self {
            target: self.target.clone(),
            method: self.method.clone(),
            arguments: self.arguments.clone(),
            mode: self.mode,
            state: self.state,
            cache: ArgumentCache::new(),
            handle: HandleState::Dirty,
            dynamic_types: self.dynamic_types.clone(),
        }
    }
}

impl PartialEq for CallBinding {
    /// Compares persisted configuration only.
    fn eq(&self, other: &Self) -> bool {
        self.target == other.target
            && self.method == other.method
            && self.arguments == other.arguments
            && self.mode == other.mode
            && self.state == other.state
    }
}

impl fmt::Debug for CallBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallBinding")
            .field("target", &self.target)
            .field("method", &self.method)
            .field("arguments", &self.arguments)
            .field("mode", &self.mode)
            .field("state", &self.state)
            .field("resolution", &self.resolution_status())
            .finish()
    }
}
