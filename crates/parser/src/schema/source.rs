//! Input boundary consumed by the registry

use crate::openapi::{OpenApiSpec, Schema};

/// Named schema entries of a parsed document
#[cfg_attr(test, mockall::automock)]
pub trait SchemaSource {
    /// Raw schema keys in document order
    fn schema_names(&self) -> Vec<String>;

    /// Schema stored under the raw key `name`
    fn schema(&self, name: &str) -> Option<Schema>;
}

impl SchemaSource for OpenApiSpec {
    fn schema_names(&self) -> Vec<String> {
        self.components
            .as_ref()
            .map(|c| c.schemas.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn schema(&self, name: &str) -> Option<Schema> {
        self.components
            .as_ref()
            .and_then(|c| c.schemas.get(name))
            .cloned()
    }
}
