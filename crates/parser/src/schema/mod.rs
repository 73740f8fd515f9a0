//! Schema resolution and type synthesis
//!
//! Walks the named schemas of a parsed document and produces a
//! [`DeclarationSet`](openapi_typegen_common::DeclarationSet): one named
//! declaration per schema, plus the enums synthesized along the way.
//!
//! The pieces, leaves first:
//! - [`naming`]: identifier normalization, field escaping and the
//!   pass-scoped collision table
//! - [`TypeResolver`]: one schema node to an inline type expression,
//!   including `allOf` flattening and `oneOf`/`anyOf` unions
//! - [`EnumSynthesizer`]: name-idempotent string enums
//! - [`SchemaRegistry`]: the driver for one pass
//! - [`prune_unused`]: drops declarations nothing retained reaches
//!
//! ## Usage
//! ```rust,ignore
//! use openapi_typegen_parser::schema::SchemaRegistry;
//!
//! let declarations = SchemaRegistry::new(&spec)?
//!     .retain(spec.operation_schema_refs())
//!     .prune_unused(true)
//!     .build()?;
//! ```

mod composition;
pub mod enums;
pub mod naming;
pub mod pruner;
mod registry;
mod resolver;
mod source;
mod table;

pub use enums::EnumSynthesizer;
pub use naming::{normalize, CollisionTable, Naming};
pub use pruner::prune_unused;
pub use registry::SchemaRegistry;
pub use resolver::TypeResolver;
pub use source::SchemaSource;
pub use table::SchemaTable;
