//! `allOf` flattening and `oneOf`/`anyOf` unions

use super::resolver::TypeResolver;
use super::table::SchemaTable;
use crate::openapi::Schema;
use openapi_typegen_common::{RecordMember, Result, TypeExpression, TypegenError};
use std::collections::HashSet;
use tracing::warn;

impl<'a> TypeResolver<'a> {
    /// Resolve a node carrying `allOf`, `oneOf` or `anyOf`
    ///
    /// `allOf` wins over the other two; `oneOf` and `anyOf` both become a union.
    pub(crate) fn resolve_composition(
        &mut self,
        node: &Schema,
        type_name: &str,
    ) -> Result<TypeExpression> {
        let nullable = node.is_nullable();
        if !node.all_of.is_empty() {
            let members = self.flatten_all_of(node, type_name, false)?;
            return Ok(TypeExpression::record(members).nullable(nullable));
        }

        let alternatives = if node.one_of.is_empty() {
            &node.any_of
        } else {
            &node.one_of
        };
        let members = self.union_members(alternatives, type_name)?;
        Ok(TypeExpression::union(members).nullable(nullable))
    }

    /// Merge the `allOf` members of `node` into one member list
    ///
    /// Bare references become inclusions, inline objects contribute their
    /// own fields, and nested `allOf` lists are flattened in place. The
    /// node's own `properties` follow the merged members. With `top_level`
    /// set, every inclusion is checked for a cycle back to the schema being
    /// declared.
    pub(crate) fn flatten_all_of(
        &mut self,
        node: &Schema,
        type_name: &str,
        top_level: bool,
    ) -> Result<Vec<RecordMember>> {
        let mut merged = Vec::new();
        self.merge_all_of_members(&node.all_of, type_name, top_level, &mut merged)?;

        if let Some(properties) = node.properties.as_ref() {
            for field in self.record_fields(properties, &node.required, type_name)? {
                push_member(&mut merged, field, type_name);
            }
        }
        Ok(merged)
    }

    fn merge_all_of_members(
        &mut self,
        members: &[Schema],
        type_name: &str,
        top_level: bool,
        merged: &mut Vec<RecordMember>,
    ) -> Result<()> {
        for member in members {
            self.check_schema_type(member)?;
            if !member.all_of.is_empty() {
                for nested in self.flatten_all_of(member, type_name, top_level)? {
                    push_member(merged, nested, type_name);
                }
                continue;
            }
            if !member.one_of.is_empty() || !member.any_of.is_empty() {
                let kind = if member.one_of.is_empty() { "anyOf" } else { "oneOf" };
                return Err(self.unmergeable(kind));
            }

            if member.properties.is_none() {
                if let Some(pointer) = member.ref_path.as_deref() {
                    let target = self.reference_target(pointer)?;
                    if top_level {
                        self.check_inclusion_cycle(&target)?;
                    }
                    push_member(merged, RecordMember::inclusion(target), type_name);
                    continue;
                }
            }

            if member.is_object() {
                let fields = match member.properties.as_ref() {
                    Some(properties) => self.record_fields(properties, &member.required, type_name)?,
                    None => Vec::new(),
                };
                for field in fields {
                    push_member(merged, field, type_name);
                }
                continue;
            }

            if let Some(schema_type) = member.schema_type.as_deref() {
                return Err(self.unmergeable(schema_type));
            }
            // description-only members add nothing
        }
        Ok(())
    }

    fn unmergeable(&self, kind: &str) -> TypegenError {
        TypegenError::UnsupportedSchemaType {
            schema: self.schema_name.to_string(),
            schema_type: format!("{} inside allOf", kind),
        }
    }

    /// Resolve union alternatives, dropping repeats
    pub(crate) fn union_members(
        &mut self,
        alternatives: &[Schema],
        type_name: &str,
    ) -> Result<Vec<TypeExpression>> {
        let mut members: Vec<TypeExpression> = Vec::with_capacity(alternatives.len());
        for (index, alternative) in alternatives.iter().enumerate() {
            let hint = format!("{}Variant{}", type_name, index + 1);
            let expr = self.resolve(alternative, &hint)?;
            if !members.contains(&expr) {
                members.push(expr);
            }
        }
        Ok(members)
    }

    /// Fail if including `target` leads back to the schema being declared
    pub(crate) fn check_inclusion_cycle(&self, target: &str) -> Result<()> {
        let mut visited = HashSet::new();
        let mut chain = vec![self.schema_name.to_string()];
        if reaches(self.table, target, self.schema_name, &mut visited, &mut chain) {
            return Err(TypegenError::CyclicInclusion {
                chain: chain.join(" -> "),
            });
        }
        Ok(())
    }
}

/// Depth-first walk of the inclusion graph; leaves the path in `chain` on success
fn reaches(
    table: &SchemaTable,
    from: &str,
    goal: &str,
    visited: &mut HashSet<String>,
    chain: &mut Vec<String>,
) -> bool {
    chain.push(from.to_string());
    if from == goal {
        return true;
    }
    if visited.insert(from.to_string()) {
        if let Some(schema) = table.get(from) {
            for next in inclusion_targets(table, schema) {
                if reaches(table, &next, goal, visited, chain) {
                    return true;
                }
            }
        }
    }
    chain.pop();
    false
}

/// Schemas a declaration of `schema` would include
fn inclusion_targets(table: &SchemaTable, schema: &Schema) -> Vec<String> {
    let mut targets = Vec::new();
    if !schema.has_composition() && schema.is_bare_reference() {
        if let Some(name) = schema.ref_path.as_deref().and_then(|p| table.resolve_pointer(p)) {
            targets.push(name.to_string());
        }
    }
    collect_all_of_targets(table, &schema.all_of, &mut targets);
    targets
}

fn collect_all_of_targets(table: &SchemaTable, members: &[Schema], targets: &mut Vec<String>) {
    for member in members {
        if member.properties.is_none() {
            if let Some(name) = member.ref_path.as_deref().and_then(|p| table.resolve_pointer(p)) {
                targets.push(name.to_string());
            }
        }
        collect_all_of_targets(table, &member.all_of, targets);
    }
}

/// Append `member` unless it repeats an inclusion or a field name
fn push_member(merged: &mut Vec<RecordMember>, member: RecordMember, type_name: &str) {
    match &member {
        RecordMember::Inclusion { .. } => {
            if merged.contains(&member) {
                return;
            }
        }
        RecordMember::Field(field) => {
            if merged
                .iter()
                .any(|m| m.field_name() == Some(field.name.as_str()))
            {
                warn!(
                    record = type_name,
                    field = %field.name,
                    "duplicate field dropped while merging allOf"
                );
                return;
            }
        }
    }
    merged.push(member);
}

#[cfg(test)]
mod tests {
    use crate::schema::testing::Fixture;
    use openapi_typegen_common::{RecordMember, ScalarKind, TypeExpression, TypeShape, TypegenError};

    const COMPONENTS: &str = r#"{
        "Base": {"type": "object", "properties": {"id": {"type": "integer"}}},
        "Audit": {"type": "object", "properties": {"created": {"type": "string"}}},
        "Cat": {"type": "object"},
        "Dog": {"type": "object"}
    }"#;

    fn members(expr: &TypeExpression) -> &[RecordMember] {
        match &expr.shape {
            TypeShape::InlineRecord(members) => members,
            other => panic!("expected record, got {:?}", other),
        }
    }

    fn names(members: &[RecordMember]) -> Vec<String> {
        members
            .iter()
            .map(|m| match m {
                RecordMember::Field(f) => f.name.clone(),
                RecordMember::Inclusion { name } => format!("*{}", name),
            })
            .collect()
    }

    #[test]
    fn test_all_of_mixes_inclusions_and_fields() {
        let mut fx = Fixture::new(COMPONENTS);
        let expr = fx
            .resolve(
                r##"{"allOf": [
                    {"$ref": "#/Base"},
                    {"type": "object", "properties": {"extra": {"type": "string"}}, "required": ["extra"]},
                    {"allOf": [{"$ref": "#/components/schemas/Audit"}]}
                ]}"##,
                "Extended",
            )
            .unwrap();

        let merged = members(&expr);
        assert_eq!(names(merged), vec!["*Base", "extra", "*Audit"]);
        match &merged[1] {
            RecordMember::Field(f) => assert!(f.required),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_required_lists_govern_their_own_member() {
        let mut fx = Fixture::new("{}");
        let expr = fx
            .resolve(
                r#"{"allOf": [
                    {"properties": {"a": {"type": "string"}}, "required": ["a", "b"]},
                    {"properties": {"b": {"type": "string"}}}
                ]}"#,
                "Pair",
            )
            .unwrap();

        let required: Vec<bool> = members(&expr)
            .iter()
            .map(|m| match m {
                RecordMember::Field(f) => f.required,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(required, vec![true, false]);
    }

    #[test]
    fn test_duplicates_collapse_first_wins() {
        let mut fx = Fixture::new(COMPONENTS);
        let expr = fx
            .resolve(
                r##"{
                    "allOf": [
                        {"$ref": "#/Base"},
                        {"properties": {"name": {"type": "string"}}},
                        {"$ref": "#/Base"},
                        {"properties": {"name": {"type": "integer"}}}
                    ],
                    "properties": {"own": {"type": "boolean"}}
                }"##,
                "Merged",
            )
            .unwrap();

        let merged = members(&expr);
        assert_eq!(names(merged), vec!["*Base", "name", "own"]);
        match &merged[1] {
            RecordMember::Field(f) => {
                assert_eq!(f.type_expr, TypeExpression::scalar(ScalarKind::String))
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_description_only_member_adds_nothing() {
        let mut fx = Fixture::new(COMPONENTS);
        let expr = fx
            .resolve(
                r##"{"allOf": [{"$ref": "#/Base"}, {"description": "Just words"}]}"##,
                "Described",
            )
            .unwrap();
        assert_eq!(names(members(&expr)), vec!["*Base"]);
    }

    #[test]
    fn test_scalar_member_cannot_be_merged() {
        let mut fx = Fixture::new("{}");
        let err = fx
            .resolve(r#"{"allOf": [{"type": "string"}]}"#, "Bad")
            .unwrap_err();
        assert!(matches!(
            err,
            TypegenError::UnsupportedSchemaType { ref schema_type, .. } if schema_type == "string inside allOf"
        ));
    }

    #[test]
    fn test_one_of_and_any_of_build_the_same_union() {
        let mut fx = Fixture::new(COMPONENTS);
        let one = fx
            .resolve(
                r##"{"oneOf": [{"$ref": "#/Cat"}, {"$ref": "#/Dog"}, {"$ref": "#/Cat"}]}"##,
                "Pet",
            )
            .unwrap();
        let any = fx
            .resolve(r##"{"anyOf": [{"$ref": "#/Cat"}, {"$ref": "#/Dog"}]}"##, "Pet")
            .unwrap();

        assert_eq!(one, any);
        assert_eq!(
            one,
            TypeExpression::union(vec![
                TypeExpression::reference("Cat"),
                TypeExpression::reference("Dog"),
            ])
        );
    }

    #[test]
    fn test_union_enum_alternatives_are_numbered() {
        let mut fx = Fixture::new("{}");
        let expr = fx
            .resolve(
                r#"{"oneOf": [{"type": "string", "enum": ["x"]}, {"type": "integer"}], "nullable": true}"#,
                "Code",
            )
            .unwrap();

        assert!(expr.nullable);
        assert_eq!(
            expr.shape,
            TypeShape::Union(vec![
                TypeExpression::reference("CodeVariant1"),
                TypeExpression::scalar(ScalarKind::Int),
            ])
        );
        assert!(fx.enums.get("CodeVariant1").is_some());
    }

    #[test]
    fn test_inclusion_cycle_is_detected() {
        let mut fx = Fixture::new(
            r##"{
                "A": {"allOf": [{"$ref": "#/B"}]},
                "B": {"allOf": [{"$ref": "#/C"}]},
                "C": {"$ref": "#/A"}
            }"##,
        );
        let node = fx.table.get("A").unwrap().clone();
        let err = fx.resolver("A").flatten_all_of(&node, "A", true).unwrap_err();
        match err {
            TypegenError::CyclicInclusion { chain } => assert_eq!(chain, "A -> B -> C -> A"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_typed_object_reference_is_followed_as_inclusion() {
        let mut fx = Fixture::new(
            r##"{
                "A": {"allOf": [{"$ref": "#/B"}]},
                "B": {"type": "object", "$ref": "#/A"}
            }"##,
        );
        let node = fx.table.get("A").unwrap().clone();
        let err = fx.resolver("A").flatten_all_of(&node, "A", true).unwrap_err();
        assert!(matches!(err, TypegenError::CyclicInclusion { ref chain } if chain == "A -> B -> A"));
    }

    #[test]
    fn test_unknown_member_type_is_rejected() {
        let mut fx = Fixture::new(COMPONENTS);
        let err = fx
            .resolve(
                r##"{"allOf": [{"$ref": "#/Base"}, {"type": "file", "properties": {}}]}"##,
                "Bad",
            )
            .unwrap_err();
        assert!(matches!(
            err,
            TypegenError::UnsupportedSchemaType { ref schema_type, .. } if schema_type == "file"
        ));
    }

    #[test]
    fn test_acyclic_diamond_is_accepted() {
        let mut fx = Fixture::new(
            r##"{
                "Root": {"type": "object"},
                "Left": {"allOf": [{"$ref": "#/Root"}]},
                "Right": {"allOf": [{"$ref": "#/Root"}]},
                "Both": {"allOf": [{"$ref": "#/Left"}, {"$ref": "#/Right"}]}
            }"##,
        );
        let node = fx.table.get("Both").unwrap().clone();
        let merged = fx.resolver("Both").flatten_all_of(&node, "Both", true).unwrap();
        assert_eq!(names(&merged), vec!["*Left", "*Right"]);
    }
}
