//! OpenAPI 3.0 type definitions
//!
//! Simplified representation focusing on schema components and the
//! operations that reference them

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// Local pointer prefix for component schemas
pub const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// OpenAPI document root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenApiSpec {
    /// OpenAPI version (e.g., "3.0.0")
    pub openapi: String,

    /// API metadata
    pub info: Info,

    /// API paths (endpoints)
    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,

    /// Reusable components
    #[serde(default)]
    pub components: Option<Components>,
}

/// API information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Info {
    /// API title
    pub title: String,

    /// API version
    pub version: String,

    /// API description
    #[serde(default)]
    pub description: Option<String>,
}

/// Path item (operations for a path)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(default)]
    pub get: Option<Operation>,

    #[serde(default)]
    pub post: Option<Operation>,

    #[serde(default)]
    pub put: Option<Operation>,

    #[serde(default)]
    pub patch: Option<Operation>,

    #[serde(default)]
    pub delete: Option<Operation>,

    /// Path parameters
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

impl PathItem {
    /// Operations in declaration order
    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        [&self.get, &self.post, &self.put, &self.patch, &self.delete]
            .into_iter()
            .flatten()
    }
}

/// HTTP operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    /// Operation ID (unique identifier)
    #[serde(rename = "operationId")]
    #[serde(default)]
    pub operation_id: Option<String>,

    #[serde(default)]
    pub parameters: Vec<Parameter>,

    #[serde(rename = "requestBody")]
    #[serde(default)]
    pub request_body: Option<RequestBody>,

    #[serde(default)]
    pub responses: IndexMap<String, Response>,
}

/// Parameter definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name
    pub name: String,

    /// Location: query, header, path, cookie
    #[serde(rename = "in")]
    pub location: String,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub schema: Option<Schema>,
}

/// Request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestBody {
    /// Content types
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,

    #[serde(default)]
    pub required: bool,
}

/// Response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub description: Option<String>,

    /// Content types
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
}

/// Media type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaType {
    #[serde(default)]
    pub schema: Option<Schema>,
}

/// Schema node
///
/// The document format lets several of these fields overlap; the resolver
/// decides which one wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Type: string, number, integer, boolean, array, object
    #[serde(rename = "type")]
    #[serde(default)]
    pub schema_type: Option<String>,

    /// Format (e.g., int32, float, double)
    #[serde(default)]
    pub format: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Properties (for object type), in document order
    #[serde(default)]
    pub properties: Option<IndexMap<String, Schema>>,

    /// Required properties
    #[serde(default)]
    pub required: Vec<String>,

    /// Items schema (for array type)
    #[serde(default)]
    pub items: Option<Box<Schema>>,

    /// Enum values
    #[serde(rename = "enum")]
    #[serde(default)]
    pub enum_values: Vec<serde_json::Value>,

    /// Reference
    #[serde(rename = "$ref")]
    #[serde(default)]
    pub ref_path: Option<String>,

    #[serde(default)]
    pub nullable: Option<bool>,

    #[serde(rename = "allOf")]
    #[serde(default)]
    pub all_of: Vec<Schema>,

    #[serde(rename = "oneOf")]
    #[serde(default)]
    pub one_of: Vec<Schema>,

    #[serde(rename = "anyOf")]
    #[serde(default)]
    pub any_of: Vec<Schema>,

    /// Everything else (x-nullable, additionalProperties, examples, ...)
    #[serde(flatten)]
    pub extensions: IndexMap<String, serde_json::Value>,
}

impl Schema {
    /// Shorthand for a `$ref`-only node
    pub fn reference(pointer: impl Into<String>) -> Self {
        Self {
            ref_path: Some(pointer.into()),
            ..Self::default()
        }
    }

    pub fn has_composition(&self) -> bool {
        !self.all_of.is_empty() || !self.one_of.is_empty() || !self.any_of.is_empty()
    }

    /// `properties` present or `type: object`
    pub fn is_object(&self) -> bool {
        self.properties.is_some() || self.schema_type.as_deref() == Some("object")
    }

    /// `nullable: true` or the Swagger-era `x-nullable: true`
    pub fn is_nullable(&self) -> bool {
        self.nullable == Some(true)
            || self
                .extensions
                .get("x-nullable")
                .and_then(serde_json::Value::as_bool)
                .unwrap_or(false)
    }

    /// Nullable, or lists `null` among its enum literals
    pub fn admits_null(&self) -> bool {
        self.is_nullable() || self.enum_values.iter().any(serde_json::Value::is_null)
    }

    /// A `$ref` with no `properties`, untyped or `type: object`
    pub fn is_bare_reference(&self) -> bool {
        self.ref_path.is_some()
            && self.properties.is_none()
            && matches!(self.schema_type.as_deref(), None | Some("object"))
    }

    /// Explicit nullability, if the node states any
    pub fn declared_nullability(&self) -> Option<bool> {
        if self.is_nullable() {
            return Some(true);
        }
        self.nullable
    }

    /// First line of the description, if any
    pub fn summary(&self) -> Option<String> {
        self.description
            .as_deref()
            .and_then(|d| d.lines().next())
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
    }

    /// Visit every `$ref` in this node and its children
    pub fn visit_refs_mut(&mut self, f: &mut impl FnMut(&mut String)) {
        if let Some(ref_path) = self.ref_path.as_mut() {
            f(ref_path);
        }
        if let Some(properties) = self.properties.as_mut() {
            for property in properties.values_mut() {
                property.visit_refs_mut(f);
            }
        }
        if let Some(items) = self.items.as_mut() {
            items.visit_refs_mut(f);
        }
        for member in self
            .all_of
            .iter_mut()
            .chain(self.one_of.iter_mut())
            .chain(self.any_of.iter_mut())
        {
            member.visit_refs_mut(f);
        }
    }

    /// Visit every `$ref` in this node and its children
    pub fn visit_refs(&self, f: &mut impl FnMut(&str)) {
        if let Some(ref_path) = self.ref_path.as_deref() {
            f(ref_path);
        }
        if let Some(properties) = self.properties.as_ref() {
            for property in properties.values() {
                property.visit_refs(f);
            }
        }
        if let Some(items) = self.items.as_ref() {
            items.visit_refs(f);
        }
        for member in self
            .all_of
            .iter()
            .chain(self.one_of.iter())
            .chain(self.any_of.iter())
        {
            member.visit_refs(f);
        }
    }
}

/// Reusable components
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Components {
    /// Schemas, in document order
    #[serde(default)]
    pub schemas: IndexMap<String, Schema>,
}

/// Schema name a local `$ref` pointer points at
///
/// Takes the last segment of the pointer and decodes JSON-pointer escapes,
/// so `#/components/schemas/Pet`, `#/definitions/Pet` and `#/Pet` all name `Pet`.
pub fn ref_target_name(pointer: &str) -> Option<String> {
    let path = pointer.trim().strip_prefix('#')?;
    let segment = path.rsplit('/').next()?;
    if segment.is_empty() {
        return None;
    }
    Some(segment.replace("~1", "/").replace("~0", "~"))
}

impl OpenApiSpec {
    /// Get a schema by reference path
    /// e.g., "#/components/schemas/Pod" -> returns Pod schema
    pub fn resolve_schema_ref(&self, ref_path: &str) -> Option<&Schema> {
        let schema_name = ref_target_name(ref_path)?;
        self.components
            .as_ref()
            .and_then(|c| c.schemas.get(&schema_name))
    }

    /// Component schema names referenced from path operations
    ///
    /// Covers parameters, request bodies and responses, in path order.
    pub fn operation_schema_refs(&self) -> IndexSet<String> {
        let mut names = IndexSet::new();
        let mut collect = |schema: &Schema| {
            schema.visit_refs(&mut |pointer: &str| {
                if let Some(name) = ref_target_name(pointer) {
                    names.insert(name);
                }
            });
        };

        for path_item in self.paths.values() {
            for param in &path_item.parameters {
                if let Some(schema) = &param.schema {
                    collect(schema);
                }
            }
            for operation in path_item.operations() {
                for param in &operation.parameters {
                    if let Some(schema) = &param.schema {
                        collect(schema);
                    }
                }
                if let Some(body) = &operation.request_body {
                    for media in body.content.values() {
                        if let Some(schema) = &media.schema {
                            collect(schema);
                        }
                    }
                }
                for response in operation.responses.values() {
                    for media in response.content.values() {
                        if let Some(schema) = &media.schema {
                            collect(schema);
                        }
                    }
                }
            }
        }

        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ref_target_name() {
        assert_eq!(
            ref_target_name("#/components/schemas/Pet"),
            Some("Pet".to_string())
        );
        assert_eq!(ref_target_name("#/Base"), Some("Base".to_string()));
        assert_eq!(
            ref_target_name("#/definitions/a~1b~0c"),
            Some("a/b~c".to_string())
        );
        assert_eq!(ref_target_name("other.yaml#/"), None);
        assert_eq!(ref_target_name("Pet"), None);
    }

    #[test]
    fn test_schema_deserializes_overlapping_fields() {
        let schema: Schema = serde_json::from_str(
            r##"{
                "type": "object",
                "$ref": "#/components/schemas/Other",
                "x-nullable": true,
                "example": {"a": 1}
            }"##,
        )
        .unwrap();

        assert!(schema.is_object());
        assert!(schema.is_nullable());
        assert_eq!(schema.declared_nullability(), Some(true));
        assert!(schema.properties.is_none());
        assert!(schema.extensions.contains_key("example"));
    }

    #[test]
    fn test_summary_takes_first_line() {
        let schema = Schema {
            description: Some("A pet.\nLonger text".to_string()),
            ..Schema::default()
        };
        assert_eq!(schema.summary(), Some("A pet.".to_string()));
    }

    #[test]
    fn test_visit_refs_mut_reaches_nested_nodes() {
        let mut schema: Schema = serde_json::from_str(
            r##"{
                "properties": {
                    "a": {"$ref": "#/A"},
                    "b": {"type": "array", "items": {"$ref": "#/B"}},
                    "c": {"oneOf": [{"$ref": "#/C"}, {"allOf": [{"$ref": "#/D"}]}]}
                }
            }"##,
        )
        .unwrap();

        let mut seen = Vec::new();
        schema.visit_refs_mut(&mut |r: &mut String| {
            seen.push(r.clone());
            r.push('!');
        });
        assert_eq!(seen, vec!["#/A", "#/B", "#/C", "#/D"]);

        let props = schema.properties.unwrap();
        assert_eq!(props["a"].ref_path.as_deref(), Some("#/A!"));
    }
}
