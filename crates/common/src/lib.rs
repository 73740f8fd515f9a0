//! Common types and utilities for OpenAPI Typegen
//!
//! This crate contains the declaration IR produced by the schema resolver,
//! the shared error type, and the YAML configuration model used by the
//! parser, generator, and CLI components.

pub mod config;

pub use config::{NamingConfig, OutputConfig, TypegenConfig};

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

/// Errors that can occur while synthesizing declarations
#[derive(Error, Debug)]
pub enum TypegenError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unresolvable reference `{reference}` in schema `{schema}`")]
    UnresolvableReference { schema: String, reference: String },

    #[error("Unsupported schema type `{schema_type}` in schema `{schema}`")]
    UnsupportedSchemaType { schema: String, schema_type: String },

    #[error("Malformed document at schema `{schema}`: {reason}")]
    MalformedDocument { schema: String, reason: String },

    #[error("Cyclic type inclusion: {chain}")]
    CyclicInclusion { chain: String },

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for typegen operations
pub type Result<T> = std::result::Result<T, TypegenError>;

/// Target scalar kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarKind {
    String,
    Int,
    Float,
    Decimal,
    Boolean,
}

/// Shape of a resolved, inline-usable type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TypeShape {
    /// Reference to a named type or enum declaration
    NamedReference(String),
    /// Anonymous record
    InlineRecord(Vec<RecordMember>),
    Array(Box<TypeExpression>),
    Union(Vec<TypeExpression>),
    Scalar(ScalarKind),
    /// Untyped value
    Any,
}

/// A type shape plus its nullability flag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeExpression {
    pub shape: TypeShape,

    #[serde(default)]
    pub nullable: bool,
}

impl TypeExpression {
    pub fn new(shape: TypeShape) -> Self {
        Self {
            shape,
            nullable: false,
        }
    }

    pub fn reference(name: impl Into<String>) -> Self {
        Self::new(TypeShape::NamedReference(name.into()))
    }

    pub fn scalar(kind: ScalarKind) -> Self {
        Self::new(TypeShape::Scalar(kind))
    }

    pub fn array(element: TypeExpression) -> Self {
        Self::new(TypeShape::Array(Box::new(element)))
    }

    pub fn union(members: Vec<TypeExpression>) -> Self {
        Self::new(TypeShape::Union(members))
    }

    pub fn record(members: Vec<RecordMember>) -> Self {
        Self::new(TypeShape::InlineRecord(members))
    }

    pub fn any() -> Self {
        Self::new(TypeShape::Any)
    }

    /// Set the nullability flag
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Collect every named type this expression points at, inclusions included
    pub fn collect_references(&self, out: &mut BTreeSet<String>) {
        match &self.shape {
            TypeShape::NamedReference(name) => {
                out.insert(name.clone());
            }
            TypeShape::InlineRecord(members) => {
                for member in members {
                    member.collect_references(out);
                }
            }
            TypeShape::Array(element) => element.collect_references(out),
            TypeShape::Union(members) => {
                for member in members {
                    member.collect_references(out);
                }
            }
            TypeShape::Scalar(_) | TypeShape::Any => {}
        }
    }
}

/// A record field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDeclaration {
    /// Escaped identifier used in the target language
    pub name: String,

    /// Property key as spelled in the document
    pub original_name: String,

    pub type_expr: TypeExpression,

    pub required: bool,

    #[serde(default)]
    pub description: Option<String>,
}

/// One entry in a record body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "member", rename_all = "snake_case")]
pub enum RecordMember {
    Field(FieldDeclaration),

    /// Embeds all fields of the named record without copying them
    Inclusion { name: String },
}

impl RecordMember {
    pub fn inclusion(name: impl Into<String>) -> Self {
        RecordMember::Inclusion { name: name.into() }
    }

    /// Field name for fields, `None` for inclusions
    pub fn field_name(&self) -> Option<&str> {
        match self {
            RecordMember::Field(field) => Some(&field.name),
            RecordMember::Inclusion { .. } => None,
        }
    }

    pub fn collect_references(&self, out: &mut BTreeSet<String>) {
        match self {
            RecordMember::Field(field) => field.type_expr.collect_references(out),
            RecordMember::Inclusion { name } => {
                out.insert(name.clone());
            }
        }
    }
}

/// A named, top-level type definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeDeclaration {
    Record {
        name: String,
        members: Vec<RecordMember>,
        #[serde(default)]
        description: Option<String>,
    },
    UnionAlias {
        name: String,
        members: Vec<TypeExpression>,
        #[serde(default)]
        description: Option<String>,
    },
    ArrayAlias {
        name: String,
        element: TypeExpression,
        #[serde(default)]
        nullable: bool,
        #[serde(default)]
        description: Option<String>,
    },
    ScalarAlias {
        name: String,
        scalar: ScalarKind,
        #[serde(default)]
        nullable: bool,
        #[serde(default)]
        description: Option<String>,
    },
    AnyAlias {
        name: String,
        nullable: bool,
        #[serde(default)]
        description: Option<String>,
    },
}

impl TypeDeclaration {
    pub fn name(&self) -> &str {
        match self {
            TypeDeclaration::Record { name, .. }
            | TypeDeclaration::UnionAlias { name, .. }
            | TypeDeclaration::ArrayAlias { name, .. }
            | TypeDeclaration::ScalarAlias { name, .. }
            | TypeDeclaration::AnyAlias { name, .. } => name,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            TypeDeclaration::Record { description, .. }
            | TypeDeclaration::UnionAlias { description, .. }
            | TypeDeclaration::ArrayAlias { description, .. }
            | TypeDeclaration::ScalarAlias { description, .. }
            | TypeDeclaration::AnyAlias { description, .. } => description.as_deref(),
        }
    }

    /// Names referenced from this declaration's body
    pub fn references(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        match self {
            TypeDeclaration::Record { members, .. } => {
                for member in members {
                    member.collect_references(&mut out);
                }
            }
            TypeDeclaration::UnionAlias { members, .. } => {
                for member in members {
                    member.collect_references(&mut out);
                }
            }
            TypeDeclaration::ArrayAlias { element, .. } => element.collect_references(&mut out),
            TypeDeclaration::ScalarAlias { .. } | TypeDeclaration::AnyAlias { .. } => {}
        }
        out
    }
}

/// One enum member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumMember {
    pub identifier: String,
    pub value: String,
}

/// A synthesized string enum
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumDeclaration {
    pub name: String,
    pub members: Vec<EnumMember>,

    #[serde(default)]
    pub description: Option<String>,
}

/// Output of one resolution pass
///
/// Serializable so a pass can be saved and used to seed a later one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeclarationSet {
    pub declarations: Vec<TypeDeclaration>,

    pub enums: Vec<EnumDeclaration>,

    /// Every name referenced while resolving
    #[serde(default)]
    pub referenced: BTreeSet<String>,
}

impl DeclarationSet {
    /// Names of all type and enum declarations
    pub fn declared_names(&self) -> BTreeSet<String> {
        self.declarations
            .iter()
            .map(|d| d.name().to_string())
            .chain(self.enums.iter().map(|e| e.name.clone()))
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&TypeDeclaration> {
        self.declarations.iter().find(|d| d.name() == name)
    }

    pub fn enum_named(&self, name: &str) -> Option<&EnumDeclaration> {
        self.enums.iter().find(|e| e.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty() && self.enums.is_empty()
    }
}
