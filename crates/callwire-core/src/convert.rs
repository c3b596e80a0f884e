//! Conversion traits between Rust values and boxed [`Dynamic`] values.
//!
//! - [`Typed`]: the runtime [`TypeInfo`] of a Rust type
//! - [`FromDynamic`]: extract a Rust value from a [`Dynamic`]
//! - [`IntoDynamic`]: box a Rust value into a [`Dynamic`]
//! - [`Argument`]: all three plus `Clone`; the bound used by typed event channels
//!
//! ## Supported Types
//!
//! - `String`, `i32`, `f32`, `bool`
//! - the value types in [`math`](crate::math)
//! - host enums, via [`impl_enum_argument!`](crate::impl_enum_argument)
//! - host object handles, via [`impl_object_argument!`](crate::impl_object_argument)
//!
//! ## Example
//!
//! ```
//! use callwire_core::{Dynamic, FromDynamic, IntoDynamic};
//!
//! let boxed = 42i32.into_dynamic();
//! assert_eq!(boxed, Dynamic::Int(42));
//! assert_eq!(i32::from_dynamic(&boxed), Ok(42));
//! ```

use crate::error::ConversionError;
use crate::math::{Color, Quaternion, Rect, RectInt, Vector2, Vector2Int, Vector3, Vector3Int, Vector4};
use crate::{ArgTag, Dynamic, TypeInfo};

/// A Rust type with a runtime type descriptor.
pub trait Typed {
    fn type_info() -> TypeInfo;
}

/// Extract a value from a boxed [`Dynamic`].
pub trait FromDynamic: Sized {
    /// Returns a `ConversionError` if the value holds an incompatible type.
    fn from_dynamic(value: &Dynamic) -> Result<Self, ConversionError>;
}

/// Box a value into a [`Dynamic`].
pub trait IntoDynamic {
    fn into_dynamic(self) -> Dynamic;
}

/// A type usable as a typed channel argument.
pub trait Argument: Typed + FromDynamic + IntoDynamic + Clone + 'static {}

impl<T> Argument for T where T: Typed + FromDynamic + IntoDynamic + Clone + 'static {}

/// Descriptor for a built-in value tag.
///
/// Returns `None` for [`ArgTag::Object`] and [`ArgTag::Enum`], whose type is
/// only known from the stored type name.
pub fn builtin_type(tag: ArgTag) -> Option<TypeInfo> {
    let info = match tag {
        ArgTag::String => String::type_info(),
        ArgTag::Int => i32::type_info(),
        ArgTag::Float => f32::type_info(),
        ArgTag::Bool => bool::type_info(),
        ArgTag::Vector2 => Vector2::type_info(),
        ArgTag::Vector3 => Vector3::type_info(),
        ArgTag::Vector4 => Vector4::type_info(),
        ArgTag::Vector2Int => Vector2Int::type_info(),
        ArgTag::Vector3Int => Vector3Int::type_info(),
        ArgTag::Rect => Rect::type_info(),
        ArgTag::RectInt => RectInt::type_info(),
        ArgTag::Color => Color::type_info(),
        ArgTag::Quaternion => Quaternion::type_info(),
        ArgTag::Object | ArgTag::Enum => return None,
    };
    Some(info)
}

macro_rules! impl_value_argument {
    ($($ty:ty => $tag:ident),* $(,)?) => {
        $(
            impl Typed for $ty {
                fn type_info() -> TypeInfo {
                    static INFO: std::sync::OnceLock<TypeInfo> = std::sync::OnceLock::new();
                    INFO.get_or_init(|| {
                        $crate::TypeCache::global()
                            .intern(ArgTag::$tag.name(), $crate::TypeKind::Value(ArgTag::$tag))
                    })
                    .clone()
                }
            }

            impl IntoDynamic for $ty {
                fn into_dynamic(self) -> Dynamic {
                    Dynamic::$tag(self)
                }
            }

            impl FromDynamic for $ty {
                fn from_dynamic(value: &Dynamic) -> Result<Self, ConversionError> {
                    match value {
                        Dynamic::$tag(v) => Ok(v.clone()),
                        other => Err(ConversionError::TypeMismatch {
                            expected: ArgTag::$tag.name(),
                            actual: other.type_name(),
                        }),
                    }
                }
            }
        )*
    };
}

impl_value_argument!(
    String => String,
    i32 => Int,
    f32 => Float,
    bool => Bool,
    Vector2 => Vector2,
    Vector3 => Vector3,
    Vector4 => Vector4,
    Vector2Int => Vector2Int,
    Vector3Int => Vector3Int,
    Rect => Rect,
    RectInt => RectInt,
    Color => Color,
    Quaternion => Quaternion,
);

impl IntoDynamic for &str {
    fn into_dynamic(self) -> Dynamic {
        Dynamic::String(self.to_owned())
    }
}

impl IntoDynamic for Dynamic {
    fn into_dynamic(self) -> Dynamic {
        self
    }
}

/// Implement the argument traits for a host enum.
///
/// The enum must convert to `i32` and back (for example by deriving
/// `num_enum::IntoPrimitive` and `num_enum::TryFromPrimitive` with `#[repr(i32)]`).
///
/// ```
/// use callwire_core::{impl_enum_argument, Dynamic, FromDynamic, IntoDynamic};
/// use num_enum::{IntoPrimitive, TryFromPrimitive};
///
/// #[derive(Debug, Clone, Copy, PartialEq, IntoPrimitive, TryFromPrimitive)]
/// #[repr(i32)]
/// enum Difficulty { Easy, Hard }
///
/// impl_enum_argument!(Difficulty, "Game.Difficulty");
///
/// let boxed = Difficulty::Hard.into_dynamic();
/// assert_eq!(Difficulty::from_dynamic(&boxed), Ok(Difficulty::Hard));
/// ```
#[macro_export]
macro_rules! impl_enum_argument {
    ($ty:ty, $name:expr) => {
        impl $crate::Typed for $ty {
            fn type_info() -> $crate::TypeInfo {
                $crate::TypeInfo::enumeration($name)
            }
        }

        impl $crate::IntoDynamic for $ty {
            fn into_dynamic(self) -> $crate::Dynamic {
                $crate::Dynamic::Enum($crate::EnumValue {
                    type_hash: <$ty as $crate::Typed>::type_info().hash(),
                    value: i32::from(self),
                })
            }
        }

        impl $crate::FromDynamic for $ty {
            fn from_dynamic(
                value: &$crate::Dynamic,
            ) -> ::std::result::Result<Self, $crate::ConversionError> {
                match value {
                    $crate::Dynamic::Enum(e) => {
                        if e.type_hash != <$ty as $crate::Typed>::type_info().hash() {
                            return Err($crate::ConversionError::EnumTypeMismatch { expected: $name });
                        }
                        <$ty>::try_from(e.value).map_err(|_| {
                            $crate::ConversionError::InvalidEnumValue {
                                type_name: $name,
                                value: e.value,
                            }
                        })
                    }
                    other => Err($crate::ConversionError::TypeMismatch {
                        expected: $name,
                        actual: other.type_name(),
                    }),
                }
            }
        }
    };
}

/// Implement the argument traits for a host object handle.
///
/// The handle must be a tuple struct wrapping `Option<ObjectId>`.
///
/// ```
/// use callwire_core::{impl_object_argument, Dynamic, IntoDynamic, ObjectId};
///
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// struct PlayerRef(Option<ObjectId>);
///
/// impl_object_argument!(PlayerRef, "Game.Player");
///
/// assert_eq!(PlayerRef(Some(ObjectId(4))).into_dynamic(), Dynamic::Object(Some(ObjectId(4))));
/// ```
#[macro_export]
macro_rules! impl_object_argument {
    ($ty:ident, $name:expr) => {
        impl $crate::Typed for $ty {
            fn type_info() -> $crate::TypeInfo {
                $crate::TypeInfo::object($name)
            }
        }

        impl $crate::IntoDynamic for $ty {
            fn into_dynamic(self) -> $crate::Dynamic {
                $crate::Dynamic::Object(self.0)
            }
        }

        impl $crate::FromDynamic for $ty {
            fn from_dynamic(
                value: &$crate::Dynamic,
            ) -> ::std::result::Result<Self, $crate::ConversionError> {
                match value {
                    $crate::Dynamic::Object(id) => Ok($ty(*id)),
                    other => Err($crate::ConversionError::TypeMismatch {
                        expected: $name,
                        actual: other.type_name(),
                    }),
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ObjectId, TypeKind};
    use num_enum::{IntoPrimitive, TryFromPrimitive};

    #[derive(Debug, Clone, Copy, PartialEq, IntoPrimitive, TryFromPrimitive)]
    #[repr(i32)]
    enum Phase {
        Idle = 0,
        Running = 5,
    }

    crate::impl_enum_argument!(Phase, "Tests.Phase");

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct DoorRef(Option<ObjectId>);

    crate::impl_object_argument!(DoorRef, "Tests.Door");

    #[test]
    fn builtin_type_names() {
        assert_eq!(i32::type_info().name(), "int");
        assert_eq!(f32::type_info().name(), "float");
        assert_eq!(String::type_info().name(), "string");
        assert_eq!(Vector3Int::type_info().name(), "Vector3Int");
        assert_eq!(Quaternion::type_info().kind(), TypeKind::Value(ArgTag::Quaternion));
    }

    #[test]
    fn builtin_type_by_tag() {
        assert_eq!(builtin_type(ArgTag::Color), Some(Color::type_info()));
        assert_eq!(builtin_type(ArgTag::Object), None);
        assert_eq!(builtin_type(ArgTag::Enum), None);
    }

    #[test]
    fn value_mismatch() {
        let err = bool::from_dynamic(&Dynamic::Int(1)).unwrap_err();
        assert_eq!(
            err,
            ConversionError::TypeMismatch {
                expected: "bool",
                actual: "int",
            }
        );
    }

    #[test]
    fn enum_round_trip() {
        let boxed = Phase::Running.into_dynamic();
        match &boxed {
            Dynamic::Enum(e) => assert_eq!(e.value, 5),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(Phase::from_dynamic(&boxed), Ok(Phase::Running));
        assert_eq!(Phase::type_info().kind(), TypeKind::Enum);
    }

    #[test]
    fn enum_invalid_value() {
        let boxed = Dynamic::Enum(crate::EnumValue {
            type_hash: Phase::type_info().hash(),
            value: 3,
        });
        assert_eq!(
            Phase::from_dynamic(&boxed),
            Err(ConversionError::InvalidEnumValue {
                type_name: "Tests.Phase",
                value: 3,
            })
        );
    }

    #[test]
    fn enum_from_other_enum_type() {
        let boxed = Dynamic::Enum(crate::EnumValue {
            type_hash: crate::TypeHash::from_name("Tests.Other"),
            value: 0,
        });
        assert!(matches!(
            Phase::from_dynamic(&boxed),
            Err(ConversionError::EnumTypeMismatch { .. })
        ));
    }

    #[test]
    fn object_handle() {
        let door = DoorRef(Some(ObjectId(9)));
        let boxed = door.into_dynamic();
        assert_eq!(DoorRef::from_dynamic(&boxed), Ok(door));
        assert_eq!(DoorRef::from_dynamic(&Dynamic::Object(None)), Ok(DoorRef(None)));
        assert_eq!(DoorRef::type_info().kind(), TypeKind::Object);
    }

    #[test]
    fn str_boxes_to_string() {
        assert_eq!("hi".into_dynamic(), Dynamic::String("hi".into()));
    }
}
