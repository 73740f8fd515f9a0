//! Normalized view of the document's named schemas
//!
//! Built once per pass before any resolution starts: every raw key is
//! normalized and claimed in the pass's collision table, and every `$ref`
//! inside the schemas is rewritten to point at the normalized name.

use super::naming::{normalize, CollisionTable};
use super::source::SchemaSource;
use crate::openapi::{ref_target_name, Schema, SCHEMA_REF_PREFIX};
use indexmap::IndexMap;
use openapi_typegen_common::{Result, TypegenError};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct SchemaTable {
    /// Normalized name -> schema, in document order
    schemas: IndexMap<String, Schema>,
    /// Raw key -> normalized name
    normalized: HashMap<String, String>,
}

impl SchemaTable {
    /// Read and normalize every schema `source` exposes
    pub fn from_source<S>(source: &S, collisions: &mut CollisionTable) -> Result<Self>
    where
        S: SchemaSource + ?Sized,
    {
        let mut entries = IndexMap::new();
        for raw in source.schema_names() {
            let schema = source.schema(&raw).ok_or_else(|| TypegenError::MalformedDocument {
                schema: raw.clone(),
                reason: "schema listed but not present".to_string(),
            })?;
            entries.insert(raw, schema);
        }
        Self::from_entries(entries, collisions)
    }

    /// Normalize raw entries, rewriting references to the normalized names
    pub fn from_entries(
        entries: IndexMap<String, Schema>,
        collisions: &mut CollisionTable,
    ) -> Result<Self> {
        let mut normalized = HashMap::with_capacity(entries.len());
        let mut names = Vec::with_capacity(entries.len());
        for raw in entries.keys() {
            let base = normalize(raw, true);
            if base.is_empty() {
                return Err(TypegenError::MalformedDocument {
                    schema: raw.clone(),
                    reason: "schema name has no identifier characters".to_string(),
                });
            }
            let name = collisions.claim(&base);
            normalized.insert(raw.clone(), name.clone());
            names.push(name);
        }

        let mut schemas = IndexMap::with_capacity(entries.len());
        for (name, (_, mut schema)) in names.into_iter().zip(entries) {
            schema.visit_refs_mut(&mut |pointer: &mut String| {
                if let Some(target) = ref_target_name(pointer).and_then(|raw| normalized.get(&raw))
                {
                    *pointer = format!("{}{}", SCHEMA_REF_PREFIX, target);
                }
            });
            schemas.insert(name, schema);
        }

        Ok(Self {
            schemas,
            normalized,
        })
    }

    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.schemas.get(name)
    }

    /// Normalized name given to the raw key `raw`
    pub fn normalized_name(&self, raw: &str) -> Option<&str> {
        self.normalized.get(raw).map(String::as_str)
    }

    /// Normalized schema name a `$ref` pointer designates
    ///
    /// Rewritten pointers name the normalized schema directly; anything else
    /// is looked up by its raw key.
    pub fn resolve_pointer(&self, pointer: &str) -> Option<&str> {
        let target = ref_target_name(pointer)?;
        if let Some((name, _)) = self.schemas.get_key_value(target.as_str()) {
            return Some(name.as_str());
        }
        self.normalized_name(&target)
    }

    /// Entries in document order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Schema)> {
        self.schemas.iter().map(|(name, schema)| (name.as_str(), schema))
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
