//! Type metadata describing a host program.
//!
//! The engine never inspects program code directly; everything it knows about
//! a type comes from a [`TypeMeta`] record, either registered in memory or
//! decoded from the type's module bytes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Primitive value kinds. Each also has a boxed form ([`TypeRef::Boxed`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Char,
}

impl PrimitiveKind {
    pub fn is_numeric(self) -> bool {
        !matches!(self, PrimitiveKind::Boolean | PrimitiveKind::Char)
    }

    fn primitive_name(self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
            PrimitiveKind::Char => "char",
        }
    }

    fn boxed_name(self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "Boolean",
            PrimitiveKind::Byte => "Byte",
            PrimitiveKind::Short => "Short",
            PrimitiveKind::Int => "Integer",
            PrimitiveKind::Long => "Long",
            PrimitiveKind::Float => "Float",
            PrimitiveKind::Double => "Double",
            PrimitiveKind::Char => "Character",
        }
    }

    const ALL: [PrimitiveKind; 8] = [
        PrimitiveKind::Boolean,
        PrimitiveKind::Byte,
        PrimitiveKind::Short,
        PrimitiveKind::Int,
        PrimitiveKind::Long,
        PrimitiveKind::Float,
        PrimitiveKind::Double,
        PrimitiveKind::Char,
    ];
}

const CONTAINER_NAMES: [&str; 6] = ["List", "Set", "Map", "Collection", "Optional", "Iterable"];
const LANG_PREFIX: &str = "java.lang.";
const UTIL_PREFIX: &str = "java.util.";

/// A reference to a type as it appears in a signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "of", rename_all = "snake_case")]
pub enum TypeRef {
    Void,
    Primitive(PrimitiveKind),
    Boxed(PrimitiveKind),
    /// The textual-string type.
    Text,
    /// The universal top type.
    Top,
    Array(Box<TypeRef>),
    /// A container-of-T type. The element type is erased.
    Container(String),
    /// A program type, resolved through a [`super::TypeMetadataProvider`].
    Named(String),
}

impl TypeRef {
    /// Parse a type name as written in a target specifier or signature.
    pub fn parse(name: &str) -> TypeRef {
        let name = name.trim();
        if let Some(elem) = name.strip_suffix("[]") {
            return TypeRef::Array(Box::new(TypeRef::parse(elem)));
        }

        // Generic arguments are erased.
        let base = match name.find('<') {
            Some(pos) => name[..pos].trim(),
            None => name,
        };

        if base == "void" {
            return TypeRef::Void;
        }
        for kind in PrimitiveKind::ALL {
            if base == kind.primitive_name() {
                return TypeRef::Primitive(kind);
            }
        }

        let simple = base
            .strip_prefix(LANG_PREFIX)
            .or_else(|| base.strip_prefix(UTIL_PREFIX))
            .unwrap_or(base);
        let qualified = simple != base;
        if qualified || !simple.contains('.') {
            for kind in PrimitiveKind::ALL {
                if simple == kind.boxed_name() {
                    return TypeRef::Boxed(kind);
                }
            }
            match simple {
                "String" => return TypeRef::Text,
                "Object" => return TypeRef::Top,
                _ => {}
            }
            if CONTAINER_NAMES.contains(&simple) {
                return TypeRef::Container(simple.to_string());
            }
        }

        TypeRef::Named(base.to_string())
    }

    pub fn named(name: impl Into<String>) -> TypeRef {
        TypeRef::Named(name.into())
    }

    pub fn array_of(elem: TypeRef) -> TypeRef {
        TypeRef::Array(Box::new(elem))
    }

    pub fn list() -> TypeRef {
        TypeRef::Container("List".to_string())
    }

    /// The primitive kind behind a primitive or boxed reference.
    pub fn numeric_kind(&self) -> Option<PrimitiveKind> {
        match self {
            TypeRef::Primitive(k) | TypeRef::Boxed(k) if k.is_numeric() => Some(*k),
            _ => None,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Void => write!(f, "void"),
            TypeRef::Primitive(k) => write!(f, "{}", k.primitive_name()),
            TypeRef::Boxed(k) => write!(f, "{}", k.boxed_name()),
            TypeRef::Text => write!(f, "String"),
            TypeRef::Top => write!(f, "Object"),
            TypeRef::Array(elem) => write!(f, "{}[]", elem),
            TypeRef::Container(name) | TypeRef::Named(name) => write!(f, "{}", name),
        }
    }
}

/// Role markers recognized by the host's component model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Controller,
    RestController,
    Service,
    Repository,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeKind {
    Class,
    Capability,
    Enumeration { variants: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMeta {
    pub name: String,
    pub ty: TypeRef,
    #[serde(default)]
    pub is_static: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationMeta {
    pub name: String,
    pub params: Vec<TypeRef>,
    pub returns: TypeRef,
    #[serde(default)]
    pub failures: Vec<TypeRef>,
    #[serde(default)]
    pub is_static: bool,
}

impl OperationMeta {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            returns: TypeRef::Void,
            failures: Vec::new(),
            is_static: false,
        }
    }

    pub fn param(mut self, ty: TypeRef) -> Self {
        self.params.push(ty);
        self
    }

    pub fn returns(mut self, ty: TypeRef) -> Self {
        self.returns = ty;
        self
    }

    pub fn fails_with(mut self, ty: TypeRef) -> Self {
        self.failures.push(ty);
        self
    }

    pub fn static_op(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn signature(&self) -> String {
        let params: Vec<String> = self.params.iter().map(|t| t.to_string()).collect();
        format!("{}({})", self.name, params.join(","))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConstructorMeta {
    pub params: Vec<TypeRef>,
    #[serde(default)]
    pub failures: Vec<TypeRef>,
}

/// Everything the engine knows about one program type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeMeta {
    pub name: String,
    pub kind: TypeKind,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub super_type: Option<TypeRef>,
    #[serde(default)]
    pub capabilities: Vec<TypeRef>,
    #[serde(default)]
    pub fields: Vec<FieldMeta>,
    #[serde(default)]
    pub operations: Vec<OperationMeta>,
    #[serde(default)]
    pub constructors: Vec<ConstructorMeta>,
}

impl TypeMeta {
    /// A class with an implicit no-argument constructor.
    pub fn class(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Class,
            roles: Vec::new(),
            super_type: None,
            capabilities: Vec::new(),
            fields: Vec::new(),
            operations: Vec::new(),
            constructors: vec![ConstructorMeta::default()],
        }
    }

    pub fn capability(name: impl Into<String>) -> Self {
        Self {
            kind: TypeKind::Capability,
            constructors: Vec::new(),
            ..Self::class(name)
        }
    }

    pub fn enumeration(name: impl Into<String>, variants: &[&str]) -> Self {
        Self {
            kind: TypeKind::Enumeration {
                variants: variants.iter().map(|v| v.to_string()).collect(),
            },
            constructors: Vec::new(),
            ..Self::class(name)
        }
    }

    pub fn role(mut self, role: Role) -> Self {
        self.roles.push(role);
        self
    }

    pub fn extends(mut self, ty: TypeRef) -> Self {
        self.super_type = Some(ty);
        self
    }

    pub fn implements(mut self, ty: TypeRef) -> Self {
        self.capabilities.push(ty);
        self
    }

    pub fn field(mut self, name: &str, ty: TypeRef) -> Self {
        self.fields.push(FieldMeta {
            name: name.to_string(),
            ty,
            is_static: false,
        });
        self
    }

    pub fn static_field(mut self, name: &str, ty: TypeRef) -> Self {
        self.fields.push(FieldMeta {
            name: name.to_string(),
            ty,
            is_static: true,
        });
        self
    }

    pub fn operation(mut self, op: OperationMeta) -> Self {
        self.operations.push(op);
        self
    }

    /// Replace the constructor list.
    pub fn constructors(mut self, ctors: Vec<ConstructorMeta>) -> Self {
        self.constructors = ctors;
        self
    }

    pub fn is_container_managed(&self) -> bool {
        !self.roles.is_empty()
    }

    pub fn has_no_arg_constructor(&self) -> bool {
        self.constructors.iter().any(|c| c.params.is_empty())
    }

    pub fn enum_variants(&self) -> Option<&[String]> {
        match &self.kind {
            TypeKind::Enumeration { variants } => Some(variants),
            _ => None,
        }
    }

    /// Module resource identifier of this type, e.g. `demo/util/Sample.mod`.
    pub fn module_id(&self) -> String {
        module_id_for(&self.name)
    }
}

pub fn module_id_for(type_name: &str) -> String {
    format!("{}.mod", type_name.replace('.', "/"))
}
