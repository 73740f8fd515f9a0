//! OpenAPI document loading and schema resolution
//!
//! This crate turns the component schemas of an OpenAPI 3.0 document into
//! the declaration IR (`DeclarationSet`) consumed by the generator.
//!
//! ## Resolution Strategy
//!
//! Each named schema becomes exactly one top-level declaration:
//! - `allOf` → record (references become inclusions, inline objects contribute fields)
//! - `oneOf` / `anyOf` → union alias
//! - object → record
//! - array → array alias
//! - scalar → scalar alias, or an enum for string enums
//! - bare `$ref` → record including the target
//!
//! Field types are resolved inline; only string enums introduce new named
//! declarations while walking a schema.

pub mod openapi;
pub mod schema;

pub use openapi::{OpenApiParser, OpenApiSpec, Schema};
pub use schema::{prune_unused, Naming, SchemaRegistry, SchemaSource};

use openapi_typegen_common::{DeclarationSet, Result};
use std::path::Path;

/// Resolve every component schema of the OpenAPI file at `path`
///
/// # Arguments
/// * `path` - JSON or YAML (`.yaml`/`.yml`) OpenAPI document
///
/// # Returns
/// * `DeclarationSet` - one declaration per schema plus synthesized enums, unpruned
pub fn parse_openapi_file<P: AsRef<Path>>(path: P) -> Result<DeclarationSet> {
    OpenApiParser::from_file(path)?.parse()
}
