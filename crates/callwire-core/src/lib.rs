//! Core types for callwire.
//!
//! This crate holds everything a binding needs to describe a call without
//! knowing how the call is dispatched:
//!
//! - [`TypeHash`], [`TypeInfo`] and [`TypeCache`]: type identity
//! - [`ArgumentValue`] and [`ArgTag`]: serializable argument storage
//! - [`Dynamic`]: boxed argument values handed to invocation handles
//! - [`ObjectId`] and [`ObjectRef`]: opaque references to host objects
//! - the conversion traits in [`convert`]
//! - the error types in [`error`]

pub mod argument;
pub mod convert;
pub mod dynamic;
pub mod error;
pub mod math;
pub mod object;
pub mod type_hash;
pub mod type_info;

pub use argument::{ArgTag, ArgumentValue};
pub use convert::{Argument, FromDynamic, IntoDynamic, Typed, builtin_type};
pub use dynamic::{Dynamic, EnumValue};
pub use error::{
    ArgumentError, BindingError, CallwireError, ConversionError, MethodInvalidReason, NativeError,
    RegistrationError, RegistryError, ResolveError,
};
pub use math::{Color, Quaternion, Rect, RectInt, Vector2, Vector2Int, Vector3, Vector3Int, Vector4};
pub use object::{ObjectId, ObjectRef};
pub use type_hash::TypeHash;
pub use type_info::{TypeCache, TypeInfo, TypeKind, TypeNameResolver};
