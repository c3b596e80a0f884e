//! Method metadata and bindability rules.
//!
//! A method can be the target of a binding only if every argument can be stored
//! in an [`ArgumentValue`] and the call has no result the binding would need to
//! hand back. [`MethodInfo::validate`] applies those rules.

use callwire_core::{ArgumentValue, MethodInvalidReason, TypeHash, TypeInfo};

/// Maximum number of parameters a bindable method may declare.
pub const MAX_PARAMETERS: usize = 4;

/// One declared parameter of a method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamInfo {
    pub name: String,
    pub ty: TypeInfo,
    /// Output or by-reference parameter.
    pub is_out: bool,
}

impl ParamInfo {
    pub fn new(name: impl Into<String>, ty: TypeInfo) -> Self {
        Self {
            name: name.into(),
            ty,
            is_out: false,
        }
    }

    /// Mark this parameter as an output parameter.
    pub fn out(mut self) -> Self {
        self.is_out = true;
        self
    }
}

/// Description of a method on a host type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodInfo {
    /// The type that declares the method.
    pub owner: TypeInfo,
    pub name: String,
    pub params: Vec<ParamInfo>,
    pub is_generic: bool,
    pub is_obsolete: bool,
}

impl MethodInfo {
    pub fn new(owner: TypeInfo, name: impl Into<String>) -> Self {
        Self {
            owner,
            name: name.into(),
            params: Vec::new(),
            is_generic: false,
            is_obsolete: false,
        }
    }

    /// Builder: append a parameter.
    pub fn param(mut self, name: impl Into<String>, ty: TypeInfo) -> Self {
        self.params.push(ParamInfo::new(name, ty));
        self
    }

    /// Builder: append a fully described parameter.
    pub fn with_param(mut self, param: ParamInfo) -> Self {
        self.params.push(param);
        self
    }

    pub fn generic(mut self) -> Self {
        self.is_generic = true;
        self
    }

    pub fn obsolete(mut self) -> Self {
        self.is_obsolete = true;
        self
    }

    /// The ordered parameter types.
    pub fn param_types(&self) -> Vec<TypeInfo> {
        self.params.iter().map(|p| p.ty.clone()).collect()
    }

    /// Dispatch key for this method: owner, name and parameter types.
    pub fn hash(&self) -> TypeHash {
        let params: Vec<TypeHash> = self.params.iter().map(|p| p.ty.hash()).collect();
        TypeHash::from_method(self.owner.hash(), &self.name, &params)
    }

    /// Whether the parameter types equal `types` element-wise.
    pub fn matches(&self, types: &[TypeInfo]) -> bool {
        self.params.len() == types.len()
            && self.params.iter().zip(types).all(|(p, t)| p.ty == *t)
    }

    /// Check that this method can be the target of a binding.
    pub fn validate(&self) -> Result<(), MethodInvalidReason> {
        if self.is_generic {
            return Err(MethodInvalidReason::GenericMethod);
        }
        if self.name.starts_with("get_") {
            return Err(MethodInvalidReason::PropertyGetter);
        }
        if self.params.len() > MAX_PARAMETERS {
            return Err(MethodInvalidReason::TooManyParameters {
                count: self.params.len(),
                max: MAX_PARAMETERS,
            });
        }
        for param in &self.params {
            if param.is_out {
                return Err(MethodInvalidReason::OutParameter {
                    param: param.name.clone(),
                });
            }
            if !ArgumentValue::supports(&param.ty) {
                return Err(MethodInvalidReason::UnsupportedParameter {
                    param: param.name.clone(),
                    type_name: param.ty.name().to_owned(),
                });
            }
        }
        if self.is_obsolete {
            return Err(MethodInvalidReason::Obsolete);
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Name shown to users: property setters lose their `set_` prefix.
    pub fn display_name(&self) -> &str {
        display_method_name(&self.name)
    }

    /// `Owner.Method(type, type)`, for pickers and diagnostics.
    pub fn signature(&self) -> String {
        format!(
            "{}.{}({})",
            self.owner.short_name(),
            self.display_name(),
            format_params(&self.param_types())
        )
    }
}

/// Strip a property-setter prefix from a method name.
pub fn display_method_name(name: &str) -> &str {
    name.strip_prefix("set_").unwrap_or(name)
}

/// Comma-separated parameter type names.
pub fn format_params(types: &[TypeInfo]) -> String {
    types
        .iter()
        .map(|t| t.name())
        .collect::<Vec<_>>()
        .join(", ")
}
