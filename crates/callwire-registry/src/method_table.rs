//! MethodTable - a dispatch table of native methods.
//!
//! This module provides [`MethodTable`], a [`BindingResolver`] backed by native
//! Rust callables. Hosts without a reflection facility of their own register
//! each bindable method once and hand the table to their bindings.
//!
//! # Storage Model
//!
//! - **Methods**: stored in a single map keyed by [`MethodInfo::hash`], which
//!   combines owner type, method name and parameter types. Overloads are simply
//!   different keys.
//! - **Per-type index**: method keys per owner type, in registration order, for
//!   enumeration.
//! - **Base types**: each type may list any number of direct base types. Lookup
//!   falls back to them when the type itself has no match.
//!
//! # Thread Safety
//!
//! The table is populated during setup and read afterwards. It is `Send + Sync`
//! once built; mutation needs exclusive access.
//!
//! # Example
//!
//! ```
//! use callwire_core::{Dynamic, ObjectId, ObjectRef, Typed, TypeInfo};
//! use callwire_registry::{BindingResolver, CallContext, MethodInfo, MethodTable};
//!
//! let mut table = MethodTable::new();
//! let player = TypeInfo::object("Game.Player");
//! table
//!     .register(
//!         MethodInfo::new(player, "SetScore").param("score", i32::type_info()),
//!         |ctx: &mut CallContext| -> Result<(), callwire_core::NativeError> {
//!             let _score: i32 = ctx.arg(0)?;
//!             Ok(())
//!         },
//!     )
//!     .unwrap();
//!
//! let target = ObjectRef::new(ObjectId(1), "Game.Player");
//! let handle = table.resolve(&target, "SetScore", &[i32::type_info()]).unwrap();
//! handle.invoke(&[Dynamic::Int(42)]).unwrap();
//! ```

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

use callwire_core::{
    Dynamic, NativeError, ObjectRef, RegistrationError, ResolveError, TypeHash, TypeInfo,
};

use crate::call_context::CallContext;
use crate::method::{MethodInfo, format_params};
use crate::native_fn::{NativeCallable, NativeMethod};
use crate::resolver::{BindingResolver, InvocationHandle};

struct MethodEntry {
    info: MethodInfo,
    native: NativeMethod,
}

/// Native method dispatch table.
#[derive(Default)]
pub struct MethodTable {
    /// Methods by dispatch key.
    methods: FxHashMap<TypeHash, MethodEntry>,

    /// Owner type -> method keys, in registration order.
    by_type: FxHashMap<TypeHash, Vec<TypeHash>>,

    /// Type -> direct base types.
    bases: FxHashMap<TypeHash, Vec<TypeInfo>>,
}

impl MethodTable {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    // ==========================================================================
    // Registration
    // ==========================================================================

    /// Register a bindable method.
    ///
    /// Fails if the method cannot be bound or is already registered.
    pub fn register<F>(&mut self, info: MethodInfo, f: F) -> Result<TypeHash, RegistrationError>
    where
        F: NativeCallable + Send + Sync + 'static,
    {
        if let Err(reason) = info.validate() {
            return Err(RegistrationError::InvalidMethod {
                method: info.signature(),
                reason,
            });
        }
        self.register_unchecked(info, f)
    }

    /// Register a method without checking that it can be bound.
    ///
    /// The method shows up in enumeration, and resolving it reports
    /// [`ResolveError::Unsupported`].
    pub fn register_unchecked<F>(
        &mut self,
        info: MethodInfo,
        f: F,
    ) -> Result<TypeHash, RegistrationError>
    where
        F: NativeCallable + Send + Sync + 'static,
    {
        let hash = info.hash();
        if self.methods.contains_key(&hash) {
            return Err(RegistrationError::DuplicateMethod {
                owner: info.owner.name().to_owned(),
                method: info.name.clone(),
            });
        }

        debug!(method = %info.signature(), "registered native method");
        self.by_type.entry(info.owner.hash()).or_default().push(hash);
        self.methods.insert(
            hash,
            MethodEntry {
                native: NativeMethod::new(hash, f),
                info,
            },
        );
        Ok(hash)
    }

    /// Declare the direct base types of `ty`.
    pub fn set_base_types(&mut self, ty: &TypeInfo, bases: Vec<TypeInfo>) {
        self.bases.insert(ty.hash(), bases);
    }

    /// Add one direct base type of `ty`.
    pub fn add_base_type(&mut self, ty: &TypeInfo, base: TypeInfo) {
        self.bases.entry(ty.hash()).or_default().push(base);
    }

    // ==========================================================================
    // Lookup
    // ==========================================================================

    /// Get a method by dispatch key.
    pub fn get(&self, hash: TypeHash) -> Option<&MethodInfo> {
        self.methods.get(&hash).map(|e| &e.info)
    }

    pub fn contains(&self, hash: TypeHash) -> bool {
        self.methods.contains_key(&hash)
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Direct base types of `ty`.
    pub fn base_types(&self, ty: &TypeInfo) -> &[TypeInfo] {
        self.bases.get(&ty.hash()).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All methods callable on `ty`: its own first, then inherited ones.
    ///
    /// A method reachable through several bases is listed once.
    pub fn methods_of(&self, ty: &TypeInfo) -> Vec<&MethodInfo> {
        let mut seen = FxHashSet::default();
        let mut visited = FxHashSet::default();
        let mut methods = Vec::new();
        self.collect_methods(ty, &mut visited, &mut seen, &mut methods);
        methods
    }

    /// Methods of `ty` that can be the target of a binding.
    pub fn bindable_methods(&self, ty: &TypeInfo) -> Vec<&MethodInfo> {
        self.methods_of(ty)
            .into_iter()
            .filter(|m| m.is_valid())
            .collect()
    }

    fn collect_methods<'a>(
        &'a self,
        ty: &TypeInfo,
        visited: &mut FxHashSet<TypeHash>,
        seen: &mut FxHashSet<TypeHash>,
        out: &mut Vec<&'a MethodInfo>,
    ) {
        if !visited.insert(ty.hash()) {
            return;
        }
        if let Some(hashes) = self.by_type.get(&ty.hash()) {
            for hash in hashes {
                if seen.insert(*hash)
                    && let Some(entry) = self.methods.get(hash)
                {
                    out.push(&entry.info);
                }
            }
        }
        for base in self.base_types(ty) {
            self.collect_methods(base, visited, seen, out);
        }
    }

    /// Find the method `name(params)` callable on `ty`.
    fn find(
        &self,
        ty: &TypeInfo,
        name: &str,
        params: &[TypeHash],
        visited: &mut FxHashSet<TypeHash>,
    ) -> Result<Option<&MethodEntry>, ResolveError> {
        if !visited.insert(ty.hash()) {
            return Ok(None);
        }

        let own = TypeHash::from_method(ty.hash(), name, params);
        if let Some(entry) = self.methods.get(&own) {
            return Ok(Some(entry));
        }

        let mut found: Vec<&MethodEntry> = Vec::new();
        for base in self.base_types(ty) {
            if let Some(entry) = self.find(base, name, params, visited)?
                && !found.iter().any(|e| e.native.id == entry.native.id)
            {
                found.push(entry);
            }
        }

        match found.len() {
            0 => Ok(None),
            1 => Ok(found.pop()),
            _ => Err(ResolveError::Ambiguous {
                type_name: ty.name().to_owned(),
                method: name.to_owned(),
                candidates: found
                    .iter()
                    .map(|e| format!("{}.{}", e.info.owner.name(), e.info.name))
                    .collect(),
            }),
        }
    }

    fn lookup(
        &self,
        target: &ObjectRef,
        method: &str,
        params: &[TypeInfo],
    ) -> Result<&MethodEntry, ResolveError> {
        let ty = target.type_info();
        let hashes: Vec<TypeHash> = params.iter().map(TypeInfo::hash).collect();
        self.find(&ty, method, &hashes, &mut FxHashSet::default())?
            .ok_or_else(|| ResolveError::MethodNotFound {
                type_name: ty.name().to_owned(),
                method: method.to_owned(),
                params: format_params(params),
            })
    }
}

impl BindingResolver for MethodTable {
    #[cfg_attr(feature = "profiling", profiling::function)]
    fn resolve(
        &self,
        target: &ObjectRef,
        method: &str,
        params: &[TypeInfo],
    ) -> Result<Box<dyn InvocationHandle>, ResolveError> {
        let entry = self.lookup(target, method, params)?;
        if let Err(reason) = entry.info.validate() {
            return Err(ResolveError::Unsupported {
                method: entry.info.signature(),
                reason,
            });
        }
        Ok(Box::new(TableHandle {
            target: target.clone(),
            native: entry.native.clone(),
        }))
    }

    fn method_info(
        &self,
        target: &ObjectRef,
        method: &str,
        params: &[TypeInfo],
    ) -> Option<MethodInfo> {
        self.lookup(target, method, params)
            .ok()
            .map(|e| e.info.clone())
    }
}

/// Handle produced by [`MethodTable`]: a target plus a shared native method.
struct TableHandle {
    target: ObjectRef,
    native: NativeMethod,
}

impl InvocationHandle for TableHandle {
    #[cfg_attr(feature = "profiling", profiling::function)]
    fn invoke(&self, args: &[Dynamic]) -> Result<(), NativeError> {
        trace!(target_object = %self.target, method = ?self.native.id, "native call");
        self.native.call(&mut CallContext::new(&self.target, args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use callwire_core::{MethodInvalidReason, ObjectId, Typed};
    use std::sync::{Arc, Mutex};

    fn ok(_: &mut CallContext) -> Result<(), NativeError> {
        Ok(())
    }

    fn target(ty: &str) -> ObjectRef {
        ObjectRef::new(ObjectId(1), ty)
    }

    #[test]
    fn resolve_and_invoke() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut table = MethodTable::new();
        table
            .register(
                MethodInfo::new(TypeInfo::object("T.Player"), "SetScore")
                    .param("score", i32::type_info()),
                move |ctx: &mut CallContext| -> Result<(), NativeError> {
                    sink.lock().unwrap().push((ctx.this().id, ctx.arg::<i32>(0)?));
                    Ok(())
                },
            )
            .unwrap();

        let handle = table
            .resolve(&target("T.Player"), "SetScore", &[i32::type_info()])
            .unwrap();
        handle.invoke(&[Dynamic::Int(42)]).unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![(ObjectId(1), 42)]);
    }

    #[test]
    fn not_found_lists_params() {
        let table = MethodTable::new();
        let err = table
            .resolve(
                &target("T.Player"),
                "Jump",
                &[f32::type_info(), bool::type_info()],
            )
            .err()
            .unwrap();
        assert_eq!(
            err,
            ResolveError::MethodNotFound {
                type_name: "T.Player".into(),
                method: "Jump".into(),
                params: "float, bool".into(),
            }
        );
    }

    #[test]
    fn overloads_are_distinct() {
        let mut table = MethodTable::new();
        let ty = TypeInfo::object("T.Lamp");
        table
            .register(MethodInfo::new(ty.clone(), "Set").param("on", bool::type_info()), ok)
            .unwrap();
        table
            .register(MethodInfo::new(ty.clone(), "Set").param("level", f32::type_info()), ok)
            .unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.resolve(&target("T.Lamp"), "Set", &[bool::type_info()]).is_ok());
        assert!(table.resolve(&target("T.Lamp"), "Set", &[f32::type_info()]).is_ok());
        assert!(table.resolve(&target("T.Lamp"), "Set", &[i32::type_info()]).is_err());
    }

    #[test]
    fn duplicate_registration() {
        let mut table = MethodTable::new();
        let info = MethodInfo::new(TypeInfo::object("T.Lamp"), "Toggle");
        table.register(info.clone(), ok).unwrap();
        assert_eq!(
            table.register(info, ok),
            Err(RegistrationError::DuplicateMethod {
                owner: "T.Lamp".into(),
                method: "Toggle".into(),
            })
        );
    }

    #[test]
    fn invalid_registration() {
        let mut table = MethodTable::new();
        let info = MethodInfo::new(TypeInfo::object("T.Lamp"), "get_Level");
        assert!(matches!(
            table.register(info, ok),
            Err(RegistrationError::InvalidMethod {
                reason: MethodInvalidReason::PropertyGetter,
                ..
            })
        ));
        assert!(table.is_empty());
    }

    #[test]
    fn unchecked_method_is_unsupported() {
        let mut table = MethodTable::new();
        let ty = TypeInfo::object("T.Lamp");
        table
            .register_unchecked(MethodInfo::new(ty.clone(), "Retire").obsolete(), ok)
            .unwrap();

        assert_eq!(table.methods_of(&ty).len(), 1);
        assert!(table.bindable_methods(&ty).is_empty());
        assert!(matches!(
            table.resolve(&target("T.Lamp"), "Retire", &[]),
            Err(ResolveError::Unsupported {
                reason: MethodInvalidReason::Obsolete,
                ..
            })
        ));
    }

    #[test]
    fn inherited_method() {
        let mut table = MethodTable::new();
        let base = TypeInfo::object("T.Actor");
        let derived = TypeInfo::object("T.Enemy");
        table
            .register(MethodInfo::new(base.clone(), "Kill"), ok)
            .unwrap();
        table.add_base_type(&derived, base.clone());

        assert!(table.resolve(&target("T.Enemy"), "Kill", &[]).is_ok());
        let info = table.method_info(&target("T.Enemy"), "Kill", &[]).unwrap();
        assert_eq!(info.owner, base);
    }

    #[test]
    fn own_method_hides_base() {
        let mut table = MethodTable::new();
        let base = TypeInfo::object("T.Shape");
        let derived = TypeInfo::object("T.Circle");
        table.register(MethodInfo::new(base.clone(), "Draw"), ok).unwrap();
        table.register(MethodInfo::new(derived.clone(), "Draw"), ok).unwrap();
        table.set_base_types(&derived, vec![base]);

        let info = table.method_info(&target("T.Circle"), "Draw", &[]).unwrap();
        assert_eq!(info.owner, derived);
        assert_eq!(table.methods_of(&derived).len(), 2);
    }

    #[test]
    fn ambiguous_across_bases() {
        let mut table = MethodTable::new();
        let a = TypeInfo::object("T.Openable");
        let b = TypeInfo::object("T.Lockable");
        let door = TypeInfo::object("T.Door");
        table.register(MethodInfo::new(a.clone(), "Reset"), ok).unwrap();
        table.register(MethodInfo::new(b.clone(), "Reset"), ok).unwrap();
        table.set_base_types(&door, vec![a, b]);

        match table.resolve(&target("T.Door"), "Reset", &[]) {
            Err(ResolveError::Ambiguous { candidates, .. }) => {
                assert_eq!(candidates, vec!["T.Openable.Reset", "T.Lockable.Reset"]);
            }
            _ => panic!("expected ambiguity"),
        }
    }

    #[test]
    fn diamond_is_not_ambiguous() {
        let mut table = MethodTable::new();
        let root = TypeInfo::object("T.Root");
        let left = TypeInfo::object("T.Left");
        let right = TypeInfo::object("T.Right");
        let leaf = TypeInfo::object("T.Leaf");
        table.register(MethodInfo::new(root.clone(), "Ping"), ok).unwrap();
        table.add_base_type(&left, root.clone());
        table.add_base_type(&right, root);
        table.set_base_types(&leaf, vec![left, right]);

        assert!(table.resolve(&target("T.Leaf"), "Ping", &[]).is_ok());
        assert_eq!(table.methods_of(&leaf).len(), 1);
    }

    #[test]
    fn base_cycle_terminates() {
        let mut table = MethodTable::new();
        let a = TypeInfo::object("T.CycleA");
        let b = TypeInfo::object("T.CycleB");
        table.add_base_type(&a, b.clone());
        table.add_base_type(&b, a);
        assert!(table.resolve(&target("T.CycleA"), "Nothing", &[]).is_err());
    }
}
