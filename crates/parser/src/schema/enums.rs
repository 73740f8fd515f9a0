//! String enum synthesis

use super::naming::{normalize, CollisionTable};
use indexmap::IndexMap;
use openapi_typegen_common::{EnumDeclaration, EnumMember};
use std::collections::HashMap;

/// Creates enum declarations, at most one per requested name
#[derive(Debug, Default)]
pub struct EnumSynthesizer {
    enums: IndexMap<String, EnumDeclaration>,
    /// Requested name -> declared name
    aliases: HashMap<String, String>,
}

impl EnumSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from enums declared by an earlier pass
    pub fn with_seed(seed: &[EnumDeclaration], collisions: &mut CollisionTable) -> Self {
        let mut synthesizer = Self::new();
        for declaration in seed {
            collisions.reserve(&declaration.name);
            synthesizer
                .aliases
                .insert(declaration.name.clone(), declaration.name.clone());
            synthesizer
                .enums
                .insert(declaration.name.clone(), declaration.clone());
        }
        synthesizer
    }

    /// Synthesize (or return) the enum requested as `enum_type_name`
    ///
    /// A repeated request returns the first declaration unchanged, even when
    /// the literal set differs. A name already claimed by another declaration
    /// is disambiguated through `collisions`.
    pub fn synthesize(
        &mut self,
        enum_type_name: &str,
        literal_values: &[String],
        collisions: &mut CollisionTable,
    ) -> &EnumDeclaration {
        let declared = match self.aliases.get(enum_type_name) {
            Some(declared) => declared.clone(),
            None => {
                let declared = collisions.claim(enum_type_name);
                self.aliases
                    .insert(enum_type_name.to_string(), declared.clone());
                self.enums
                    .insert(declared.clone(), build_enum(&declared, literal_values, None));
                declared
            }
        };
        &self.enums[&declared]
    }

    /// Declare an enum under a name the caller already owns
    ///
    /// Used for top-level enum schemas, whose name was claimed when the
    /// document was normalized. Field requests for the same name still get
    /// their own, suffixed enum.
    pub fn declare_owned(
        &mut self,
        name: &str,
        literal_values: &[String],
        description: Option<String>,
    ) -> &EnumDeclaration {
        if !self.enums.contains_key(name) {
            self.enums
                .insert(name.to_string(), build_enum(name, literal_values, description));
        }
        &self.enums[name]
    }

    pub fn get(&self, name: &str) -> Option<&EnumDeclaration> {
        self.enums.get(name)
    }

    pub fn len(&self) -> usize {
        self.enums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enums.is_empty()
    }

    /// Declarations in creation order
    pub fn into_declarations(self) -> Vec<EnumDeclaration> {
        self.enums.into_values().collect()
    }
}

/// `PetTag` + `in-progress` -> `PETTAG_INPROGRESS`
fn member_identifier(enum_name: &str, value: &str) -> String {
    format!(
        "{}_{}",
        enum_name.to_uppercase(),
        normalize(value, false).to_uppercase()
    )
}

fn build_enum(name: &str, literal_values: &[String], description: Option<String>) -> EnumDeclaration {
    EnumDeclaration {
        name: name.to_string(),
        members: literal_values
            .iter()
            .map(|value| EnumMember {
                identifier: member_identifier(name, value),
                value: value.clone(),
            })
            .collect(),
        description,
    }
}
