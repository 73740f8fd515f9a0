//! OpenAPI 3.0 document model and loader
//!
//! This is the input boundary of the crate: it only turns document text into
//! an in-memory object graph. Resolution of the component schemas into type
//! declarations lives in [`crate::schema`].
//!
//! ## Usage
//! ```rust,ignore
//! use openapi_typegen_parser::openapi::OpenApiParser;
//!
//! let parser = OpenApiParser::from_file("petstore.json")?;
//! let declarations = parser.parse()?;
//! ```

mod parser;
mod types;

pub use parser::OpenApiParser;
pub use types::*;
