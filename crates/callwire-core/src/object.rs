//! Opaque references to host objects.
//!
//! The host owns its objects and their lifetimes. Bindings and arguments only
//! carry an [`ObjectId`], which the host maps back to a live object when a call
//! is executed or when persisted data is loaded.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::TypeInfo;

/// Host-defined opaque object identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A target object: its identifier plus its runtime type name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    pub id: ObjectId,
    #[serde(rename = "type")]
    pub type_name: Arc<str>,
}

impl ObjectRef {
    pub fn new(id: ObjectId, type_name: impl Into<Arc<str>>) -> Self {
        Self {
            id,
            type_name: type_name.into(),
        }
    }

    /// The runtime type of the referenced object.
    pub fn type_info(&self) -> TypeInfo {
        TypeInfo::object(&self.type_name)
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.type_name, self.id)
    }
}
