//! Fixed-layout storage for one call argument.
//!
//! An [`ArgumentValue`] holds any argument type in the same four places: a string
//! slot, an object-reference slot, and four `i32` slots. Floating-point
//! components are written into the integer slots by reinterpreting their IEEE-754
//! bit pattern, so a float survives a trip through persisted data exactly.
//!
//! | Tag | Storage |
//! |---|---|
//! | String | string slot |
//! | Int, Bool | slot 0 |
//! | Float | slot 0 (bits) |
//! | Vector2/3/4, Quaternion | slots 0..n (bits) |
//! | Rect | x, y, width, height (bits) |
//! | Color | r, g, b, a (bits) |
//! | Vector2Int/3Int, RectInt | slots 0..n |
//! | Object | object slot; type name in string slot |
//! | Enum | numeric value in slot 0; type name in string slot |
//!
//! Every accessor checks the stored tag first and fails with
//! [`ArgumentError::TypeMismatch`] if it does not match.

use std::fmt;

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};

use crate::convert::{FromDynamic, IntoDynamic, Typed};
use crate::error::{ArgumentError, ConversionError};
use crate::math::{Color, Quaternion, Rect, RectInt, Vector2, Vector2Int, Vector3, Vector3Int, Vector4};
use crate::{Dynamic, EnumValue, ObjectId, TypeCache, TypeHash, TypeInfo, TypeKind};

/// Discriminant of the value stored in an [`ArgumentValue`].
///
/// Persisted as its numeric value, so variants must only ever be appended.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive, Serialize, Deserialize,
)]
#[repr(u8)]
#[serde(into = "u8", try_from = "u8")]
pub enum ArgTag {
    String = 0,
    Int = 1,
    Float = 2,
    Bool = 3,
    Object = 4,
    Vector2 = 5,
    Vector3 = 6,
    Vector4 = 7,
    Vector2Int = 8,
    Vector3Int = 9,
    Rect = 10,
    RectInt = 11,
    Color = 12,
    Quaternion = 13,
    Enum = 14,
}

impl ArgTag {
    /// All tags in discriminant order.
    pub const ALL: [ArgTag; 15] = [
        ArgTag::String,
        ArgTag::Int,
        ArgTag::Float,
        ArgTag::Bool,
        ArgTag::Object,
        ArgTag::Vector2,
        ArgTag::Vector3,
        ArgTag::Vector4,
        ArgTag::Vector2Int,
        ArgTag::Vector3Int,
        ArgTag::Rect,
        ArgTag::RectInt,
        ArgTag::Color,
        ArgTag::Quaternion,
        ArgTag::Enum,
    ];

    /// The type name used for built-in value tags.
    pub const fn name(self) -> &'static str {
        match self {
            ArgTag::String => "string",
            ArgTag::Int => "int",
            ArgTag::Float => "float",
            ArgTag::Bool => "bool",
            ArgTag::Object => "object",
            ArgTag::Vector2 => "Vector2",
            ArgTag::Vector3 => "Vector3",
            ArgTag::Vector4 => "Vector4",
            ArgTag::Vector2Int => "Vector2Int",
            ArgTag::Vector3Int => "Vector3Int",
            ArgTag::Rect => "Rect",
            ArgTag::RectInt => "RectInt",
            ArgTag::Color => "Color",
            ArgTag::Quaternion => "Quaternion",
            ArgTag::Enum => "enum",
        }
    }

    /// Whether values of this tag carry their type name in the string slot.
    pub const fn is_named(self) -> bool {
        matches!(self, ArgTag::Object | ArgTag::Enum)
    }
}

impl fmt::Display for ArgTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[inline]
fn f32_to_bits(value: f32) -> i32 {
    value.to_bits() as i32
}

#[inline]
fn bits_to_f32(bits: i32) -> f32 {
    f32::from_bits(bits as u32)
}

fn mismatch(expected: ArgTag, actual: ArgTag) -> ArgumentError {
    ArgumentError::TypeMismatch { expected, actual }
}

// ============================================================================
// Per-tag dispatch table
// ============================================================================

/// Boxing and unboxing functions for one tag.
struct TagMeta {
    tag: ArgTag,
    /// Runtime type for value tags; named tags recover it from the string slot.
    type_info: Option<fn() -> TypeInfo>,
    /// Zero value written by [`ArgumentValue::from_type`].
    zero: Option<fn() -> Dynamic>,
    get: fn(&ArgumentValue) -> Dynamic,
    set: fn(&mut ArgumentValue, Dynamic) -> Result<(), ArgumentError>,
}

macro_rules! value_meta {
    ($tag:ident, $ty:ty, $read:ident, $write:ident) => {
        TagMeta {
            tag: ArgTag::$tag,
            type_info: Some(<$ty as Typed>::type_info),
            zero: Some(|| Dynamic::$tag(<$ty>::default())),
            get: |arg| Dynamic::$tag(arg.$read()),
            set: |arg, value| match value {
                Dynamic::$tag(v) => {
                    arg.$write(v);
                    Ok(())
                }
                other => Err(mismatch(ArgTag::$tag, other.tag())),
            },
        }
    };
}

static TAG_METAS: [TagMeta; 15] = [
    TagMeta {
        tag: ArgTag::String,
        type_info: Some(<String as Typed>::type_info),
        zero: Some(|| Dynamic::String(String::new())),
        get: |arg| Dynamic::String(arg.string.clone()),
        set: |arg, value| match value {
            Dynamic::String(s) => {
                arg.string = s;
                Ok(())
            }
            other => Err(mismatch(ArgTag::String, other.tag())),
        },
    },
    value_meta!(Int, i32, read_int, write_int),
    value_meta!(Float, f32, read_float, write_float),
    value_meta!(Bool, bool, read_bool, write_bool),
    TagMeta {
        tag: ArgTag::Object,
        type_info: None,
        zero: None,
        get: |arg| Dynamic::Object(arg.object),
        set: |arg, value| match value {
            Dynamic::Object(id) => {
                arg.object = id;
                Ok(())
            }
            other => Err(mismatch(ArgTag::Object, other.tag())),
        },
    },
    value_meta!(Vector2, Vector2, read_vector2, write_vector2),
    value_meta!(Vector3, Vector3, read_vector3, write_vector3),
    value_meta!(Vector4, Vector4, read_vector4, write_vector4),
    value_meta!(Vector2Int, Vector2Int, read_vector2_int, write_vector2_int),
    value_meta!(Vector3Int, Vector3Int, read_vector3_int, write_vector3_int),
    value_meta!(Rect, Rect, read_rect, write_rect),
    value_meta!(RectInt, RectInt, read_rect_int, write_rect_int),
    value_meta!(Color, Color, read_color, write_color),
    value_meta!(Quaternion, Quaternion, read_quaternion, write_quaternion),
    TagMeta {
        tag: ArgTag::Enum,
        type_info: None,
        zero: None,
        get: |arg| Dynamic::Enum(arg.read_enum()),
        set: |arg, value| match value {
            Dynamic::Enum(e) => {
                if e.type_hash != TypeHash::from_name(&arg.string) {
                    return Err(ConversionError::EnumTypeMismatch { expected: "enum" }.into());
                }
                arg.ints[0] = e.value;
                Ok(())
            }
            other => Err(mismatch(ArgTag::Enum, other.tag())),
        },
    },
];

#[inline]
fn meta(tag: ArgTag) -> &'static TagMeta {
    let meta = &TAG_METAS[u8::from(tag) as usize];
    debug_assert_eq!(meta.tag, tag);
    meta
}

// ============================================================================
// ArgumentValue
// ============================================================================

/// One typed argument in fixed-width, plainly serializable storage.
///
/// The declared name (the formal parameter name) is metadata: it is neither
/// persisted nor part of equality.
#[derive(Clone, Serialize, Deserialize)]
pub struct ArgumentValue {
    tag: ArgTag,
    #[serde(default)]
    string: String,
    #[serde(default)]
    object: Option<ObjectId>,
    #[serde(default)]
    ints: [i32; 4],
    #[serde(skip)]
    declared_name: Option<String>,
}

macro_rules! float_packed {
    (
        $tag:ident, $ty:ident,
        $read:ident, $write:ident, $get:ident, $set:ident,
        { $($field:ident => $slot:literal),+ $(,)? }
    ) => {
        fn $read(&self) -> $ty {
            $ty { $($field: bits_to_f32(self.ints[$slot])),+ }
        }

        fn $write(&mut self, value: $ty) {
            $(self.ints[$slot] = f32_to_bits(value.$field);)+
        }

        #[doc = concat!("Read the `", stringify!($ty), "` value.")]
        pub fn $get(&self) -> Result<$ty, ArgumentError> {
            self.expect_tag(ArgTag::$tag)?;
            Ok(self.$read())
        }

        #[doc = concat!("Overwrite the `", stringify!($ty), "` value.")]
        pub fn $set(&mut self, value: $ty) -> Result<(), ArgumentError> {
            self.expect_tag(ArgTag::$tag)?;
            self.$write(value);
            Ok(())
        }
    };
}

macro_rules! int_packed {
    (
        $tag:ident, $ty:ident,
        $read:ident, $write:ident, $get:ident, $set:ident,
        { $($field:ident => $slot:literal),+ $(,)? }
    ) => {
        fn $read(&self) -> $ty {
            $ty { $($field: self.ints[$slot]),+ }
        }

        fn $write(&mut self, value: $ty) {
            $(self.ints[$slot] = value.$field;)+
        }

        #[doc = concat!("Read the `", stringify!($ty), "` value.")]
        pub fn $get(&self) -> Result<$ty, ArgumentError> {
            self.expect_tag(ArgTag::$tag)?;
            Ok(self.$read())
        }

        #[doc = concat!("Overwrite the `", stringify!($ty), "` value.")]
        pub fn $set(&mut self, value: $ty) -> Result<(), ArgumentError> {
            self.expect_tag(ArgTag::$tag)?;
            self.$write(value);
            Ok(())
        }
    };
}

impl ArgumentValue {
    fn empty(tag: ArgTag) -> Self {
        Self {
            tag,
            string: String::new(),
            object: None,
            ints: [0; 4],
            declared_name: None,
        }
    }

    /// Create an argument for `ty`, holding the type's zero value.
    ///
    /// Object arguments start as a null reference and enum arguments at `0`.
    pub fn from_type(ty: &TypeInfo) -> Result<Self, ArgumentError> {
        let unsupported = || ArgumentError::UnsupportedArgumentType {
            type_name: ty.name().to_owned(),
        };
        match ty.kind() {
            TypeKind::Object => Ok(Self::named(ArgTag::Object, ty.name())),
            TypeKind::Enum => Ok(Self::named(ArgTag::Enum, ty.name())),
            TypeKind::Value(tag) => {
                let meta = meta(tag);
                let zero = meta.zero.ok_or_else(unsupported)?;
                let mut arg = Self::empty(tag);
                (meta.set)(&mut arg, zero())?;
                Ok(arg)
            }
            TypeKind::Opaque => Err(unsupported()),
        }
    }

    /// Create an argument holding `value`.
    pub fn from_value<T: Typed + IntoDynamic>(value: T) -> Result<Self, ArgumentError> {
        let mut arg = Self::from_type(&T::type_info())?;
        arg.set_dynamic(value.into_dynamic())?;
        Ok(arg)
    }

    pub fn from_string(value: impl Into<String>) -> Self {
        let mut arg = Self::empty(ArgTag::String);
        arg.string = value.into();
        arg
    }

    pub fn from_int(value: i32) -> Self {
        value.into()
    }

    pub fn from_float(value: f32) -> Self {
        value.into()
    }

    pub fn from_bool(value: bool) -> Self {
        value.into()
    }

    /// Create an object argument.
    pub fn from_object(type_name: &str, object: Option<ObjectId>) -> Self {
        let mut arg = Self::named(ArgTag::Object, type_name);
        arg.object = object;
        arg
    }

    /// Create an enum argument from its numeric value.
    pub fn from_enum(type_name: &str, value: i32) -> Self {
        let mut arg = Self::named(ArgTag::Enum, type_name);
        arg.ints[0] = value;
        arg
    }

    fn named(tag: ArgTag, type_name: &str) -> Self {
        let mut arg = Self::empty(tag);
        arg.string = type_name.to_owned();
        arg
    }

    /// Whether arguments of type `ty` can be stored.
    pub fn supports(ty: &TypeInfo) -> bool {
        match ty.kind() {
            TypeKind::Object | TypeKind::Enum => true,
            TypeKind::Value(tag) => meta(tag).zero.is_some(),
            TypeKind::Opaque => false,
        }
    }

    pub fn tag(&self) -> ArgTag {
        self.tag
    }

    /// The formal parameter name this argument was created for.
    pub fn declared_name(&self) -> Option<&str> {
        self.declared_name.as_deref()
    }

    pub fn set_declared_name(&mut self, name: Option<String>) {
        self.declared_name = name;
    }

    fn expect_tag(&self, expected: ArgTag) -> Result<(), ArgumentError> {
        if self.tag == expected {
            Ok(())
        } else {
            Err(mismatch(expected, self.tag))
        }
    }

    /// The runtime type of the stored value.
    ///
    /// Object and enum types are recovered from the stored type name through
    /// the process-wide [`TypeCache`].
    pub fn type_info(&self) -> TypeInfo {
        match meta(self.tag).type_info {
            Some(type_info) => type_info(),
            None => {
                let kind = if self.tag == ArgTag::Enum {
                    TypeKind::Enum
                } else {
                    TypeKind::Object
                };
                TypeCache::global().intern(&self.string, kind)
            }
        }
    }

    /// The stored value in boxed form, whatever its tag.
    pub fn object_value(&self) -> Dynamic {
        (meta(self.tag).get)(self)
    }

    /// Overwrite the stored value from its boxed form.
    ///
    /// The boxed value must match the stored tag (and, for enums, the enum type).
    pub fn set_dynamic(&mut self, value: Dynamic) -> Result<(), ArgumentError> {
        (meta(self.tag).set)(self, value)
    }

    /// Read the stored value as `T`.
    pub fn get<T: Typed + FromDynamic>(&self) -> Result<T, ArgumentError> {
        let expected = T::type_info();
        match expected.tag() {
            Some(tag) => self.expect_tag(tag)?,
            None => {
                return Err(ArgumentError::UnsupportedArgumentType {
                    type_name: expected.name().to_owned(),
                });
            }
        }
        Ok(T::from_dynamic(&self.object_value())?)
    }

    /// Overwrite the stored value with `value`.
    pub fn set<T: Typed + IntoDynamic>(&mut self, value: T) -> Result<(), ArgumentError> {
        self.set_dynamic(value.into_dynamic())
    }

    // ------------------------------------------------------------------------
    // Scalars
    // ------------------------------------------------------------------------

    pub fn string_value(&self) -> Result<&str, ArgumentError> {
        self.expect_tag(ArgTag::String)?;
        Ok(&self.string)
    }

    pub fn set_string(&mut self, value: impl Into<String>) -> Result<(), ArgumentError> {
        self.expect_tag(ArgTag::String)?;
        self.string = value.into();
        Ok(())
    }

    fn read_int(&self) -> i32 {
        self.ints[0]
    }

    fn write_int(&mut self, value: i32) {
        self.ints[0] = value;
    }

    pub fn int_value(&self) -> Result<i32, ArgumentError> {
        self.expect_tag(ArgTag::Int)?;
        Ok(self.read_int())
    }

    pub fn set_int(&mut self, value: i32) -> Result<(), ArgumentError> {
        self.expect_tag(ArgTag::Int)?;
        self.write_int(value);
        Ok(())
    }

    fn read_float(&self) -> f32 {
        bits_to_f32(self.ints[0])
    }

    fn write_float(&mut self, value: f32) {
        self.ints[0] = f32_to_bits(value);
    }

    pub fn float_value(&self) -> Result<f32, ArgumentError> {
        self.expect_tag(ArgTag::Float)?;
        Ok(self.read_float())
    }

    pub fn set_float(&mut self, value: f32) -> Result<(), ArgumentError> {
        self.expect_tag(ArgTag::Float)?;
        self.write_float(value);
        Ok(())
    }

    fn read_bool(&self) -> bool {
        self.ints[0] != 0
    }

    fn write_bool(&mut self, value: bool) {
        self.ints[0] = i32::from(value);
    }

    pub fn bool_value(&self) -> Result<bool, ArgumentError> {
        self.expect_tag(ArgTag::Bool)?;
        Ok(self.read_bool())
    }

    pub fn set_bool(&mut self, value: bool) -> Result<(), ArgumentError> {
        self.expect_tag(ArgTag::Bool)?;
        self.write_bool(value);
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Packed value types
    // ------------------------------------------------------------------------

    float_packed!(Vector2, Vector2, read_vector2, write_vector2, vector2_value, set_vector2, {
        x => 0, y => 1,
    });

    float_packed!(Vector3, Vector3, read_vector3, write_vector3, vector3_value, set_vector3, {
        x => 0, y => 1, z => 2,
    });

    float_packed!(Vector4, Vector4, read_vector4, write_vector4, vector4_value, set_vector4, {
        x => 0, y => 1, z => 2, w => 3,
    });

    float_packed!(Rect, Rect, read_rect, write_rect, rect_value, set_rect, {
        x => 0, y => 1, width => 2, height => 3,
    });

    float_packed!(Color, Color, read_color, write_color, color_value, set_color, {
        r => 0, g => 1, b => 2, a => 3,
    });

    float_packed!(Quaternion, Quaternion, read_quaternion, write_quaternion, quaternion_value, set_quaternion, {
        x => 0, y => 1, z => 2, w => 3,
    });

    int_packed!(Vector2Int, Vector2Int, read_vector2_int, write_vector2_int, vector2_int_value, set_vector2_int, {
        x => 0, y => 1,
    });

    int_packed!(Vector3Int, Vector3Int, read_vector3_int, write_vector3_int, vector3_int_value, set_vector3_int, {
        x => 0, y => 1, z => 2,
    });

    int_packed!(RectInt, RectInt, read_rect_int, write_rect_int, rect_int_value, set_rect_int, {
        x => 0, y => 1, width => 2, height => 3,
    });

    // ------------------------------------------------------------------------
    // Named types
    // ------------------------------------------------------------------------

    /// The fully-qualified type name of an object or enum argument.
    pub fn type_name(&self) -> Result<&str, ArgumentError> {
        match self.tag {
            ArgTag::Object | ArgTag::Enum => Ok(&self.string),
            other => Err(mismatch(ArgTag::Object, other)),
        }
    }

    pub fn object_ref(&self) -> Result<Option<ObjectId>, ArgumentError> {
        self.expect_tag(ArgTag::Object)?;
        Ok(self.object)
    }

    pub fn set_object_ref(&mut self, object: Option<ObjectId>) -> Result<(), ArgumentError> {
        self.expect_tag(ArgTag::Object)?;
        self.object = object;
        Ok(())
    }

    fn read_enum(&self) -> EnumValue {
        EnumValue {
            type_hash: TypeHash::from_name(&self.string),
            value: self.ints[0],
        }
    }

    pub fn enum_value(&self) -> Result<EnumValue, ArgumentError> {
        self.expect_tag(ArgTag::Enum)?;
        Ok(self.read_enum())
    }

    /// Overwrite the numeric value of an enum argument.
    pub fn set_enum_value(&mut self, value: i32) -> Result<(), ArgumentError> {
        self.expect_tag(ArgTag::Enum)?;
        self.ints[0] = value;
        Ok(())
    }

    /// The raw integer slots, for inspection.
    pub fn raw_slots(&self) -> [i32; 4] {
        self.ints
    }
}

impl PartialEq for ArgumentValue {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag
            && self.string == other.string
            && self.object == other.object
            && self.ints == other.ints
    }
}

impl fmt::Debug for ArgumentValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("ArgumentValue");
        if let Some(name) = &self.declared_name {
            s.field("name", name);
        }
        if self.tag.is_named() {
            s.field("type", &self.string);
        }
        s.field("value", &self.object_value()).finish()
    }
}

impl From<String> for ArgumentValue {
    fn from(value: String) -> Self {
        Self::named(ArgTag::String, &value)
    }
}

impl From<&str> for ArgumentValue {
    fn from(value: &str) -> Self {
        Self::named(ArgTag::String, value)
    }
}

macro_rules! impl_from_value {
    ($($ty:ty => $tag:ident, $write:ident);* $(;)?) => {
        $(
            impl From<$ty> for ArgumentValue {
                fn from(value: $ty) -> Self {
                    let mut arg = Self::empty(ArgTag::$tag);
                    arg.$write(value);
                    arg
                }
            }
        )*
    };
}

impl_from_value!(
    i32 => Int, write_int;
    f32 => Float, write_float;
    bool => Bool, write_bool;
    Vector2 => Vector2, write_vector2;
    Vector3 => Vector3, write_vector3;
    Vector4 => Vector4, write_vector4;
    Vector2Int => Vector2Int, write_vector2_int;
    Vector3Int => Vector3Int, write_vector3_int;
    Rect => Rect, write_rect;
    RectInt => RectInt, write_rect_int;
    Color => Color, write_color;
    Quaternion => Quaternion, write_quaternion;
);

// ============================================================================
// Tests
// ============================================================================
