//! OpenAPI spec file parser

use super::types::OpenApiSpec;
use crate::schema::SchemaRegistry;
use openapi_typegen_common::{DeclarationSet, Result, TypegenError};
use std::fs;
use std::path::Path;

/// OpenAPI specification parser
///
/// Reads OpenAPI 3.0 documents in JSON or YAML form and hands their
/// component schemas to the [`SchemaRegistry`].
pub struct OpenApiParser {
    /// Loaded OpenAPI spec
    spec: OpenApiSpec,
}

impl OpenApiParser {
    /// Load OpenAPI spec from file path
    ///
    /// `.yaml` and `.yml` files are read as YAML, everything else as JSON.
    ///
    /// # Example
    /// ```rust,ignore
    /// let parser = OpenApiParser::from_file("petstore.yaml")?;
    /// let declarations = parser.parse()?;
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            TypegenError::Parse(format!(
                "Failed to read OpenAPI file {}: {}",
                path.display(),
                e
            ))
        })?;

        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
            .unwrap_or(false);

        if is_yaml {
            Self::from_yaml(&content)
        } else {
            Self::from_json(&content)
        }
    }

    /// Parse OpenAPI spec from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let spec: OpenApiSpec = serde_json::from_str(json)
            .map_err(|e| TypegenError::Parse(format!("Failed to parse OpenAPI JSON: {}", e)))?;

        Ok(Self { spec })
    }

    /// Parse OpenAPI spec from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let spec: OpenApiSpec = serde_yaml::from_str(yaml)
            .map_err(|e| TypegenError::Parse(format!("Failed to parse OpenAPI YAML: {}", e)))?;

        Ok(Self { spec })
    }

    /// Resolve every component schema into declarations (single pass, no pruning)
    pub fn parse(&self) -> Result<DeclarationSet> {
        SchemaRegistry::new(&self.spec)?.build()
    }

    /// Get reference to the underlying OpenAPI spec
    pub fn spec(&self) -> &OpenApiSpec {
        &self.spec
    }
}
