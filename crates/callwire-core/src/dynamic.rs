//! Boxed call value.

use std::fmt;

use crate::math::{Color, Quaternion, Rect, RectInt, Vector2, Vector2Int, Vector3, Vector3Int, Vector4};
use crate::{ArgTag, ObjectId, TypeHash};

/// The numeric value of a host enum together with the enum's type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnumValue {
    pub type_hash: TypeHash,
    pub value: i32,
}

/// A type-erased argument value handed to an invocation handle.
///
/// There is one variant per [`ArgTag`], so any value an
/// [`ArgumentValue`](crate::ArgumentValue) can store has a boxed form here.
#[derive(Clone, PartialEq)]
pub enum Dynamic {
    String(String),
    Int(i32),
    Float(f32),
    Bool(bool),
    /// Object reference; `None` is a null reference.
    Object(Option<ObjectId>),
    Vector2(Vector2),
    Vector3(Vector3),
    Vector4(Vector4),
    Vector2Int(Vector2Int),
    Vector3Int(Vector3Int),
    Rect(Rect),
    RectInt(RectInt),
    Color(Color),
    Quaternion(Quaternion),
    Enum(EnumValue),
}

impl Dynamic {
    /// The tag whose storage layout matches this value.
    pub fn tag(&self) -> ArgTag {
        match self {
            Dynamic::String(_) => ArgTag::String,
            Dynamic::Int(_) => ArgTag::Int,
            Dynamic::Float(_) => ArgTag::Float,
            Dynamic::Bool(_) => ArgTag::Bool,
            Dynamic::Object(_) => ArgTag::Object,
            Dynamic::Vector2(_) => ArgTag::Vector2,
            Dynamic::Vector3(_) => ArgTag::Vector3,
            Dynamic::Vector4(_) => ArgTag::Vector4,
            Dynamic::Vector2Int(_) => ArgTag::Vector2Int,
            Dynamic::Vector3Int(_) => ArgTag::Vector3Int,
            Dynamic::Rect(_) => ArgTag::Rect,
            Dynamic::RectInt(_) => ArgTag::RectInt,
            Dynamic::Color(_) => ArgTag::Color,
            Dynamic::Quaternion(_) => ArgTag::Quaternion,
            Dynamic::Enum(_) => ArgTag::Enum,
        }
    }

    /// Get a human-readable name for this value's type.
    pub fn type_name(&self) -> &'static str {
        self.tag().name()
    }

    /// Check if this is a null object reference.
    pub fn is_null(&self) -> bool {
        matches!(self, Dynamic::Object(None))
    }
}

impl fmt::Debug for Dynamic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dynamic::String(s) => write!(f, "String({:?})", s),
            Dynamic::Int(v) => write!(f, "Int({})", v),
            Dynamic::Float(v) => write!(f, "Float({})", v),
            Dynamic::Bool(v) => write!(f, "Bool({})", v),
            Dynamic::Object(Some(id)) => write!(f, "Object({})", id),
            Dynamic::Object(None) => write!(f, "Object(null)"),
            Dynamic::Vector2(v) => write!(f, "{:?}", v),
            Dynamic::Vector3(v) => write!(f, "{:?}", v),
            Dynamic::Vector4(v) => write!(f, "{:?}", v),
            Dynamic::Vector2Int(v) => write!(f, "{:?}", v),
            Dynamic::Vector3Int(v) => write!(f, "{:?}", v),
            Dynamic::Rect(v) => write!(f, "{:?}", v),
            Dynamic::RectInt(v) => write!(f, "{:?}", v),
            Dynamic::Color(v) => write!(f, "{:?}", v),
            Dynamic::Quaternion(v) => write!(f, "{:?}", v),
            Dynamic::Enum(e) => write!(f, "Enum({}, {})", e.type_hash, e.value),
        }
    }
}
