//! Runtime type descriptors and the process-wide type-name cache.
//!
//! A [`TypeInfo`] is what the rest of the system compares when it needs to know
//! whether two argument lists line up: binding resolution, dynamic-mode
//! eligibility, and argument construction all work in terms of it.
//!
//! Object and enum arguments only persist the fully-qualified name of their type.
//! [`TypeCache`] turns such a name back into a descriptor. Since [`TypeHash`] is
//! derived from the name, an unseen name is interned on first sight rather than
//! treated as an error.

use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use rustc_hash::FxHashMap;

use crate::TypeHash;
use crate::argument::ArgTag;

/// What kind of type a [`TypeInfo`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// A built-in value type stored inline in the integer/string slots.
    Value(ArgTag),
    /// A host object passed by reference.
    Object,
    /// A host enumeration passed by its numeric value.
    Enum,
    /// A type that is known by name but cannot be stored in an argument slot.
    Opaque,
}

impl TypeKind {
    /// The argument tag able to store values of this kind, if any.
    pub fn tag(self) -> Option<ArgTag> {
        match self {
            TypeKind::Value(tag) => Some(tag),
            TypeKind::Object => Some(ArgTag::Object),
            TypeKind::Enum => Some(ArgTag::Enum),
            TypeKind::Opaque => None,
        }
    }
}

/// Runtime type descriptor.
///
/// Equality and hashing use the [`TypeHash`] only.
#[derive(Clone)]
pub struct TypeInfo {
    name: Arc<str>,
    hash: TypeHash,
    kind: TypeKind,
}

impl TypeInfo {
    /// Create a descriptor without going through the cache.
    pub fn new(name: impl Into<Arc<str>>, kind: TypeKind) -> Self {
        let name = name.into();
        Self {
            hash: TypeHash::from_name(&name),
            name,
            kind,
        }
    }

    /// Descriptor for a host object type, interned in the global cache.
    pub fn object(name: &str) -> Self {
        TypeCache::global().intern(name, TypeKind::Object)
    }

    /// Descriptor for a host enum type, interned in the global cache.
    pub fn enumeration(name: &str) -> Self {
        TypeCache::global().intern(name, TypeKind::Enum)
    }

    /// Descriptor for a named type that arguments cannot carry.
    pub fn opaque(name: &str) -> Self {
        TypeCache::global().intern(name, TypeKind::Opaque)
    }

    /// Look a fully-qualified name up in the global cache.
    pub fn lookup(name: &str) -> Option<Self> {
        TypeCache::global().get(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The name without its namespace (`Game.Player` → `Player`).
    pub fn short_name(&self) -> &str {
        self.name
            .rsplit(['.', ':'])
            .next()
            .unwrap_or(&self.name)
    }

    pub fn hash(&self) -> TypeHash {
        self.hash
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// The argument tag able to store this type, if any.
    pub fn tag(&self) -> Option<ArgTag> {
        self.kind.tag()
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for TypeInfo {}

impl std::hash::Hash for TypeInfo {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.hash.hash(state);
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeInfo({})", self.name)
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Resolves a fully-qualified type name to a descriptor.
pub trait TypeNameResolver {
    fn resolve_type(&self, name: &str) -> Option<TypeInfo>;
}

/// Append-only name → descriptor memo.
///
/// Entries are never removed or replaced, so a name keeps the kind it was first
/// interned with. Reads take a shared lock; concurrent readers are fine.
#[derive(Default)]
pub struct TypeCache {
    by_name: RwLock<FxHashMap<Arc<str>, TypeInfo>>,
}

static GLOBAL_TYPE_CACHE: OnceLock<TypeCache> = OnceLock::new();

impl TypeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache.
    pub fn global() -> &'static TypeCache {
        GLOBAL_TYPE_CACHE.get_or_init(TypeCache::new)
    }

    /// Get a cached descriptor by name.
    pub fn get(&self, name: &str) -> Option<TypeInfo> {
        self.by_name
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Get the descriptor for `name`, creating it with `kind` if unseen.
    pub fn intern(&self, name: &str, kind: TypeKind) -> TypeInfo {
        if let Some(info) = self.get(name) {
            return info;
        }
        let mut map = self.by_name.write().unwrap_or_else(PoisonError::into_inner);
        map.entry(Arc::from(name))
            .or_insert_with(|| TypeInfo::new(name, kind))
            .clone()
    }

    /// Insert a pre-built descriptor. An existing entry for the same name wins.
    pub fn register(&self, info: TypeInfo) -> TypeInfo {
        let mut map = self.by_name.write().unwrap_or_else(PoisonError::into_inner);
        map.entry(info.name.clone()).or_insert(info).clone()
    }

    pub fn len(&self) -> usize {
        self.by_name
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TypeNameResolver for TypeCache {
    fn resolve_type(&self, name: &str) -> Option<TypeInfo> {
        self.get(name)
    }
}

impl fmt::Debug for TypeCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeCache")
            .field("len", &self.len())
            .finish()
    }
}
