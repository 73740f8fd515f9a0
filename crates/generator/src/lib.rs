//! Source generation for synthesized type declarations
//!
//! This crate renders a `DeclarationSet` into a Ballerina types module.

mod templates;

pub use templates::{scalar_keyword, string_literal, type_descriptor};

use openapi_typegen_common::{DeclarationSet, Result, TypegenError};
use std::fs;
use std::path::{Path, PathBuf};
use tera::Tera;
use tracing::debug;

/// Default output file name
pub const DEFAULT_FILE_NAME: &str = "types.bal";

/// Types generator
///
/// Transforms a DeclarationSet into one source file holding every record,
/// alias and enum, in declaration order.
pub struct TypesGenerator {
    declarations: DeclarationSet,
    file_name: String,
    tera: Tera,
}

impl TypesGenerator {
    /// Create a new generator from a DeclarationSet
    pub fn new(declarations: DeclarationSet) -> Result<Self> {
        let tera = templates::load_templates()?;
        Ok(Self {
            declarations,
            file_name: DEFAULT_FILE_NAME.to_string(),
            tera,
        })
    }

    /// Override the output file name
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    /// Render the types module to a string
    pub fn render(&self) -> Result<String> {
        let context = self.create_context();
        self.tera
            .render(templates::TYPES_TEMPLATE, &context)
            .map_err(|e| TypegenError::Generation(format!("Template error: {:?}", e)))
    }

    /// Write the types module into `output_dir`, creating it if needed
    ///
    /// Returns the path of the written file.
    pub fn generate_to_directory(&self, output_dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(output_dir).map_err(|e| {
            TypegenError::Generation(format!("Failed to create output directory: {}", e))
        })?;

        let rendered = self.render()?;
        let output_path = output_dir.join(&self.file_name);
        fs::write(&output_path, rendered).map_err(|e| {
            TypegenError::Generation(format!("Failed to write {}: {}", self.file_name, e))
        })?;

        debug!(
            path = %output_path.display(),
            declarations = self.declarations.declarations.len(),
            enums = self.declarations.enums.len(),
            "wrote types module"
        );
        Ok(output_path)
    }

    /// Create template context from the DeclarationSet
    fn create_context(&self) -> tera::Context {
        let mut context = tera::Context::new();
        context.insert("generator", env!("CARGO_PKG_NAME"));
        context.insert("declarations", &self.declarations.declarations);
        context.insert("enums", &self.declarations.enums);
        context
    }
}

/// Generate the types module (convenience function)
pub fn generate_types(declarations: DeclarationSet, output_path: &str) -> Result<PathBuf> {
    let generator = TypesGenerator::new(declarations)?;
    generator.generate_to_directory(Path::new(output_path))
}
