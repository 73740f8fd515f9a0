//! Type expression resolution
//!
//! Turns one schema node into an inline [`TypeExpression`]. Precedence,
//! first match wins:
//!
//! 1. `allOf` / `oneOf` / `anyOf` → composition (see `composition.rs`)
//! 2. `properties` or `type: object` → inline record
//! 3. `type: array` → array of the resolved `items` (any when absent)
//! 4. scalar `type` → scalar, or a synthesized enum for string enums
//! 5. `$ref` → named reference
//! 6. otherwise → any
//!
//! A `type` outside the recognized set is an error rather than a silent any.

use super::enums::EnumSynthesizer;
use super::naming::{normalize, CollisionTable, Naming};
use super::table::SchemaTable;
use crate::openapi::Schema;
use indexmap::IndexMap;
use openapi_typegen_common::{
    FieldDeclaration, RecordMember, Result, ScalarKind, TypeExpression, TypegenError,
};
use std::collections::BTreeSet;

/// Resolves schema nodes within one top-level schema
///
/// Borrows the registry's state for the duration of one declaration; all
/// errors are reported against `schema_name`.
pub struct TypeResolver<'a> {
    pub(crate) table: &'a SchemaTable,
    pub(crate) naming: &'a Naming,
    pub(crate) enums: &'a mut EnumSynthesizer,
    pub(crate) collisions: &'a mut CollisionTable,
    pub(crate) referenced: &'a mut BTreeSet<String>,
    pub(crate) schema_name: &'a str,
}

impl<'a> TypeResolver<'a> {
    pub fn new(
        table: &'a SchemaTable,
        naming: &'a Naming,
        enums: &'a mut EnumSynthesizer,
        collisions: &'a mut CollisionTable,
        referenced: &'a mut BTreeSet<String>,
        schema_name: &'a str,
    ) -> Self {
        Self {
            table,
            naming,
            enums,
            collisions,
            referenced,
            schema_name,
        }
    }

    /// Resolve `node` into a type expression
    ///
    /// `type_name` names anything synthesized for this node (a string enum
    /// here becomes the enum `type_name`).
    pub fn resolve(&mut self, node: &Schema, type_name: &str) -> Result<TypeExpression> {
        self.check_schema_type(node)?;
        if node.has_composition() {
            return self.resolve_composition(node, type_name);
        }

        let nullable = node.is_nullable();

        if node.is_object() {
            if node.properties.is_none() {
                if let Some(pointer) = node.ref_path.as_deref() {
                    return self.resolve_reference(pointer, nullable);
                }
            }
            let members = match node.properties.as_ref() {
                Some(properties) => self.record_fields(properties, &node.required, type_name)?,
                None => Vec::new(),
            };
            return Ok(TypeExpression::record(members).nullable(nullable));
        }

        match node.schema_type.as_deref() {
            Some("array") => {
                let element = match node.items.as_deref() {
                    Some(items) => self.resolve(items, &format!("{}Item", type_name))?,
                    None => TypeExpression::any(),
                };
                Ok(TypeExpression::array(element).nullable(nullable))
            }
            Some(scalar_type) => {
                let kind = self.scalar_kind(scalar_type, node.format.as_deref())?;
                if kind == ScalarKind::String && !node.enum_values.is_empty() {
                    return self.resolve_enum(node, type_name);
                }
                Ok(TypeExpression::scalar(kind).nullable(nullable))
            }
            None => match node.ref_path.as_deref() {
                Some(pointer) => self.resolve_reference(pointer, nullable),
                None => Ok(TypeExpression::any().nullable(nullable)),
            },
        }
    }

    /// Reject a `type` outside the recognized kinds, whatever else the node has
    pub(crate) fn check_schema_type(&self, node: &Schema) -> Result<()> {
        match node.schema_type.as_deref() {
            None
            | Some("string")
            | Some("integer")
            | Some("number")
            | Some("boolean")
            | Some("object")
            | Some("array") => Ok(()),
            Some(other) => Err(TypegenError::UnsupportedSchemaType {
                schema: self.schema_name.to_string(),
                schema_type: other.to_string(),
            }),
        }
    }

    /// Map a scalar `type` (and numeric `format`) onto a target scalar
    pub(crate) fn scalar_kind(&self, schema_type: &str, format: Option<&str>) -> Result<ScalarKind> {
        match schema_type {
            "string" => Ok(ScalarKind::String),
            "integer" => Ok(ScalarKind::Int),
            "boolean" => Ok(ScalarKind::Boolean),
            "number" => match format {
                Some("float") | Some("double") => Ok(ScalarKind::Float),
                _ => Ok(ScalarKind::Decimal),
            },
            other => Err(TypegenError::UnsupportedSchemaType {
                schema: self.schema_name.to_string(),
                schema_type: other.to_string(),
            }),
        }
    }

    /// Resolve every property into a field, in document order
    pub(crate) fn record_fields(
        &mut self,
        properties: &IndexMap<String, Schema>,
        required: &[String],
        enclosing: &str,
    ) -> Result<Vec<RecordMember>> {
        let mut members = Vec::with_capacity(properties.len());
        for (key, property) in properties {
            let key = key.trim();
            let enum_name = format!("{}{}", normalize(enclosing, true), normalize(key, true));
            let type_expr = self.resolve(property, &enum_name)?;

            members.push(RecordMember::Field(FieldDeclaration {
                name: self.naming.escape_identifier(key),
                original_name: key.to_string(),
                type_expr,
                required: required.iter().any(|r| r.trim() == key),
                description: self.field_description(property),
            }));
        }
        Ok(members)
    }

    /// Field's own summary, else the summary of the schema it references
    fn field_description(&self, property: &Schema) -> Option<String> {
        property.summary().or_else(|| {
            property
                .ref_path
                .as_deref()
                .and_then(|pointer| self.table.resolve_pointer(pointer))
                .and_then(|name| self.table.get(name))
                .and_then(Schema::summary)
        })
    }

    /// Named reference to the schema behind `pointer`
    ///
    /// Nullability comes from the reference site or the referenced schema.
    pub(crate) fn resolve_reference(
        &mut self,
        pointer: &str,
        nullable: bool,
    ) -> Result<TypeExpression> {
        let name = self.reference_target(pointer)?;
        let target_nullable = self
            .table
            .get(&name)
            .map(Schema::admits_null)
            .unwrap_or(false);
        Ok(TypeExpression::reference(name).nullable(nullable || target_nullable))
    }

    /// Normalized schema name behind `pointer`, recorded as referenced
    pub(crate) fn reference_target(&mut self, pointer: &str) -> Result<String> {
        let name = self
            .table
            .resolve_pointer(pointer)
            .ok_or_else(|| TypegenError::UnresolvableReference {
                schema: self.schema_name.to_string(),
                reference: pointer.to_string(),
            })?
            .to_string();
        self.referenced.insert(name.clone());
        Ok(name)
    }

    fn resolve_enum(&mut self, node: &Schema, type_name: &str) -> Result<TypeExpression> {
        let (values, has_null) = self.enum_literals(node)?;
        let nullable = node.is_nullable() || has_null;
        if values.is_empty() {
            return Ok(TypeExpression::scalar(ScalarKind::String).nullable(nullable));
        }
        let name = self
            .enums
            .synthesize(type_name, &values, self.collisions)
            .name
            .clone();
        self.referenced.insert(name.clone());
        Ok(TypeExpression::reference(name).nullable(nullable))
    }

    /// String literals of a string enum, plus whether `null` was listed
    pub(crate) fn enum_literals(&self, node: &Schema) -> Result<(Vec<String>, bool)> {
        let mut values = Vec::with_capacity(node.enum_values.len());
        let mut has_null = false;
        for value in &node.enum_values {
            match value {
                serde_json::Value::String(s) => values.push(s.clone()),
                serde_json::Value::Null => has_null = true,
                other => {
                    return Err(TypegenError::MalformedDocument {
                        schema: self.schema_name.to_string(),
                        reason: format!("string enum contains non-string literal {}", other),
                    })
                }
            }
        }
        Ok((values, has_null))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::testing::Fixture;
    use openapi_typegen_common::TypeShape;

    fn field(expr: &TypeExpression, index: usize) -> &FieldDeclaration {
        match &expr.shape {
            TypeShape::InlineRecord(members) => match &members[index] {
                RecordMember::Field(f) => f,
                other => panic!("expected field, got {:?}", other),
            },
            other => panic!("expected inline record, got {:?}", other),
        }
    }

    #[test]
    fn test_scalars_and_formats() {
        let mut fx = Fixture::new("{}");
        assert_eq!(
            fx.resolve(r#"{"type":"integer","format":"int64"}"#, "X").unwrap(),
            TypeExpression::scalar(ScalarKind::Int)
        );
        assert_eq!(
            fx.resolve(r#"{"type":"number"}"#, "X").unwrap(),
            TypeExpression::scalar(ScalarKind::Decimal)
        );
        assert_eq!(
            fx.resolve(r#"{"type":"number","format":"double"}"#, "X").unwrap(),
            TypeExpression::scalar(ScalarKind::Float)
        );
        assert_eq!(
            fx.resolve(r#"{"type":"boolean","nullable":true}"#, "X").unwrap(),
            TypeExpression::scalar(ScalarKind::Boolean).nullable(true)
        );
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let mut fx = Fixture::new("{}");
        let err = fx.resolve(r#"{"type":"file"}"#, "X").unwrap_err();
        match err {
            TypegenError::UnsupportedSchemaType {
                schema,
                schema_type,
            } => {
                assert_eq!(schema, "Test");
                assert_eq!(schema_type, "file");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_unknown_type_is_rejected_before_composition() {
        let mut fx = Fixture::new("{}");
        let err = fx
            .resolve(r#"{"type":"file","oneOf":[{"type":"string"}]}"#, "X")
            .unwrap_err();
        assert!(matches!(
            err,
            TypegenError::UnsupportedSchemaType { ref schema_type, .. } if schema_type == "file"
        ));
        assert!(fx
            .resolve(r#"{"type":"blob","properties":{"a":{"type":"string"}}}"#, "X")
            .is_err());
    }

    #[test]
    fn test_reference_to_enum_with_null_literal_is_nullable() {
        let mut fx = Fixture::new(r#"{"Status":{"type":"string","enum":["a",null]}}"#);
        assert_eq!(
            fx.resolve(r##"{"$ref":"#/components/schemas/Status"}"##, "X").unwrap(),
            TypeExpression::reference("Status").nullable(true)
        );
    }

    #[test]
    fn test_null_only_enum_is_nullable_string() {
        let mut fx = Fixture::new("{}");
        assert_eq!(
            fx.resolve(r#"{"type":"string","enum":[null]}"#, "X").unwrap(),
            TypeExpression::scalar(ScalarKind::String).nullable(true)
        );
        assert!(fx.enums.is_empty());
    }

    #[test]
    fn test_empty_object_is_empty_record() {
        let mut fx = Fixture::new("{}");
        assert_eq!(
            fx.resolve(r#"{"type":"object"}"#, "X").unwrap(),
            TypeExpression::record(vec![])
        );
    }

    #[test]
    fn test_untyped_node_falls_back_to_any() {
        let mut fx = Fixture::new("{}");
        assert_eq!(fx.resolve(r#"{}"#, "X").unwrap(), TypeExpression::any());
        assert_eq!(
            fx.resolve(r#"{"nullable":true}"#, "X").unwrap(),
            TypeExpression::any().nullable(true)
        );
    }

    #[test]
    fn test_array_items() {
        let mut fx = Fixture::new(r#"{"Pet":{"type":"object"}}"#);
        assert_eq!(
            fx.resolve(r##"{"type":"array","items":{"$ref":"#/components/schemas/Pet"}}"##, "X")
                .unwrap(),
            TypeExpression::array(TypeExpression::reference("Pet"))
        );
        assert_eq!(
            fx.resolve(r#"{"type":"array"}"#, "X").unwrap(),
            TypeExpression::array(TypeExpression::any())
        );
        assert!(fx.referenced.contains("Pet"));
    }

    #[test]
    fn test_reference_inherits_target_nullability() {
        let mut fx = Fixture::new(r#"{"Maybe":{"type":"string","nullable":true},"Sure":{"type":"string"}}"#);
        assert_eq!(
            fx.resolve(r##"{"$ref":"#/components/schemas/Maybe"}"##, "X").unwrap(),
            TypeExpression::reference("Maybe").nullable(true)
        );
        assert_eq!(
            fx.resolve(r##"{"$ref":"#/components/schemas/Sure"}"##, "X").unwrap(),
            TypeExpression::reference("Sure")
        );
    }

    #[test]
    fn test_object_without_properties_but_ref_is_reference() {
        let mut fx = Fixture::new(r#"{"Pet":{"type":"object"}}"#);
        assert_eq!(
            fx.resolve(r##"{"type":"object","$ref":"#/components/schemas/Pet"}"##, "X")
                .unwrap(),
            TypeExpression::reference("Pet")
        );
    }

    #[test]
    fn test_unresolvable_reference() {
        let mut fx = Fixture::new("{}");
        let err = fx.resolve(r##"{"$ref":"#/DoesNotExist"}"##, "X").unwrap_err();
        assert!(matches!(
            err,
            TypegenError::UnresolvableReference { ref reference, .. } if reference == "#/DoesNotExist"
        ));
    }

    #[test]
    fn test_inline_record_fields_keep_order_and_required() {
        let mut fx = Fixture::new("{}");
        let expr = fx
            .resolve(
                r#"{
                    "properties": {
                        "zeta": {"type": "string"},
                        "alpha": {"type": "integer", "description": "First line\nsecond"},
                        "type": {"type": "boolean"}
                    },
                    "required": ["alpha"]
                }"#,
                "Outer",
            )
            .unwrap();

        assert_eq!(field(&expr, 0).name, "zeta");
        assert!(!field(&expr, 0).required);
        assert_eq!(field(&expr, 1).name, "alpha");
        assert!(field(&expr, 1).required);
        assert_eq!(field(&expr, 1).description.as_deref(), Some("First line"));
        assert_eq!(field(&expr, 2).name, "'type");
        assert_eq!(field(&expr, 2).original_name, "type");
    }

    #[test]
    fn test_field_enum_is_synthesized_from_enclosing_name() {
        let mut fx = Fixture::new("{}");
        let expr = fx
            .resolve(
                r#"{"properties":{"status":{"type":"string","enum":["on","off",null]}}}"#,
                "Device",
            )
            .unwrap();

        assert_eq!(
            field(&expr, 0).type_expr,
            TypeExpression::reference("DeviceStatus").nullable(true)
        );
        let decl = fx.enums.get("DeviceStatus").unwrap();
        assert_eq!(decl.members.len(), 2);
        assert_eq!(decl.members[0].identifier, "DEVICESTATUS_ON");
    }

    #[test]
    fn test_non_string_enum_literal_is_malformed() {
        let mut fx = Fixture::new("{}");
        let err = fx
            .resolve(r#"{"type":"string","enum":["a", 3]}"#, "X")
            .unwrap_err();
        assert!(matches!(err, TypegenError::MalformedDocument { .. }));
    }

    #[test]
    fn test_integer_enum_stays_scalar() {
        let mut fx = Fixture::new("{}");
        assert_eq!(
            fx.resolve(r#"{"type":"integer","enum":[1,2]}"#, "X").unwrap(),
            TypeExpression::scalar(ScalarKind::Int)
        );
        assert!(fx.enums.is_empty());
    }

    #[test]
    fn test_field_description_falls_back_to_referenced_schema() {
        let mut fx = Fixture::new(r#"{"Owner":{"type":"object","description":"Who owns it"}}"#);
        let expr = fx
            .resolve(
                r##"{"properties":{"owner":{"$ref":"#/components/schemas/Owner"}}}"##,
                "Pet",
            )
            .unwrap();
        assert_eq!(field(&expr, 0).description.as_deref(), Some("Who owns it"));
    }
}
