//! Declaration registry: the top-level driver of one resolution pass

use super::enums::EnumSynthesizer;
use super::naming::{CollisionTable, Naming};
use super::pruner;
use super::resolver::TypeResolver;
use super::source::SchemaSource;
use super::table::SchemaTable;
use crate::openapi::Schema;
use openapi_typegen_common::{
    DeclarationSet, RecordMember, Result, ScalarKind, TypeDeclaration, TypeExpression,
};
use std::collections::BTreeSet;
use tracing::{debug, trace};

/// Builds one declaration per named schema of a document
///
/// A registry is consumed by [`SchemaRegistry::build`]; a second pass over
/// another document is a new registry seeded with the first pass's output.
///
/// # Example
/// ```rust,ignore
/// let first = SchemaRegistry::new(&client_spec)?.build()?;
/// let second = SchemaRegistry::new(&schema_spec)?
///     .seeded_with(first.clone())
///     .retain(["Pet"])
///     .build()?;
/// ```
pub struct SchemaRegistry {
    table: SchemaTable,
    naming: Naming,
    collisions: CollisionTable,
    seed: Option<DeclarationSet>,
    retained: BTreeSet<String>,
    prune: bool,
}

/// Result of declaring one schema
enum Outcome {
    Type(TypeDeclaration),
    /// Declared into the enum synthesizer
    Enum,
    /// No usable shape; kept only if something references it
    Vacuous(Option<String>),
}

impl SchemaRegistry {
    /// Normalize every schema of `source` into a fresh registry
    pub fn new<S>(source: &S) -> Result<Self>
    where
        S: SchemaSource + ?Sized,
    {
        let mut collisions = CollisionTable::new();
        let table = SchemaTable::from_source(source, &mut collisions)?;
        Ok(Self {
            table,
            naming: Naming::default(),
            collisions,
            seed: None,
            retained: BTreeSet::new(),
            prune: false,
        })
    }

    pub fn with_naming(mut self, naming: Naming) -> Self {
        self.naming = naming;
        self
    }

    /// Treat the declarations of an earlier pass as already present
    ///
    /// Seeded declarations are emitted unchanged ahead of the new ones,
    /// document schemas with a seeded name are not declared again, and the
    /// pass always prunes with the seeded names as extra roots.
    pub fn seeded_with(mut self, seed: DeclarationSet) -> Self {
        for name in seed.declared_names() {
            self.collisions.reserve(&name);
        }
        self.seed = Some(seed);
        self
    }

    /// Mark schema names as externally retained
    ///
    /// Raw document keys are accepted and mapped to their normalized names.
    pub fn retain<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            let name = name.as_ref();
            let normalized = self.table.normalized_name(name).unwrap_or(name);
            self.retained.insert(normalized.to_string());
        }
        self
    }

    /// Prune declarations unreachable from the retained names
    pub fn prune_unused(mut self, enabled: bool) -> Self {
        self.prune = enabled;
        self
    }

    pub fn schema_table(&self) -> &SchemaTable {
        &self.table
    }

    /// Run the pass
    ///
    /// Any error aborts the whole pass; no partial set is returned.
    pub fn build(self) -> Result<DeclarationSet> {
        let Self {
            table,
            naming,
            mut collisions,
            seed,
            retained,
            prune,
        } = self;

        let seeded = seed.is_some();
        let seed = seed.unwrap_or_default();
        let seeded_names = seed.declared_names();

        let mut enums = EnumSynthesizer::with_seed(&seed.enums, &mut collisions);
        let mut referenced = seed.referenced;
        let mut outcomes = Vec::with_capacity(table.len());

        for (name, schema) in table.iter() {
            if seeded_names.contains(name) {
                debug!(schema = name, "already declared by an earlier pass, skipping");
                continue;
            }
            let mut resolver = TypeResolver::new(
                &table,
                &naming,
                &mut enums,
                &mut collisions,
                &mut referenced,
                name,
            );
            outcomes.push((name, declare(&mut resolver, name, schema)?));
        }

        let mut declarations = seed.declarations;
        for (name, outcome) in outcomes {
            match outcome {
                Outcome::Type(declaration) => {
                    trace!(declaration = name, "declared");
                    declarations.push(declaration);
                }
                Outcome::Enum => trace!(declaration = name, "declared enum"),
                Outcome::Vacuous(description) if referenced.contains(name) => {
                    trace!(declaration = name, "declared untyped alias for referenced schema");
                    declarations.push(TypeDeclaration::AnyAlias {
                        name: name.to_string(),
                        nullable: false,
                        description,
                    });
                }
                Outcome::Vacuous(_) => debug!(schema = name, "no usable shape, skipping"),
            }
        }

        let mut set = DeclarationSet {
            declarations,
            enums: enums.into_declarations(),
            referenced,
        };

        if prune || seeded {
            let mut roots = retained;
            roots.extend(seeded_names);
            let pruned = pruner::prune_unused(&mut set, &roots);
            if !pruned.is_empty() {
                debug!(count = pruned.len(), "pruned unused declarations");
            }
        }

        Ok(set)
    }
}

/// Pick the top-level declaration kind for one schema
///
/// Same precedence as inline resolution, but always producing a named
/// declaration.
fn declare(resolver: &mut TypeResolver<'_>, name: &str, schema: &Schema) -> Result<Outcome> {
    resolver.check_schema_type(schema)?;
    let description = schema.summary();

    if !schema.all_of.is_empty() {
        let members = resolver.flatten_all_of(schema, name, true)?;
        return Ok(Outcome::Type(TypeDeclaration::Record {
            name: name.to_string(),
            members,
            description,
        }));
    }

    if schema.has_composition() {
        let alternatives = if schema.one_of.is_empty() {
            &schema.any_of
        } else {
            &schema.one_of
        };
        let members = resolver.union_members(alternatives, name)?;
        return Ok(Outcome::Type(TypeDeclaration::UnionAlias {
            name: name.to_string(),
            members,
            description,
        }));
    }

    if schema.is_object() {
        let members = match (schema.properties.as_ref(), schema.ref_path.as_deref()) {
            (Some(properties), _) => resolver.record_fields(properties, &schema.required, name)?,
            (None, Some(pointer)) => return inclusion_record(resolver, name, pointer, description),
            (None, None) => Vec::new(),
        };
        return Ok(Outcome::Type(TypeDeclaration::Record {
            name: name.to_string(),
            members,
            description,
        }));
    }

    match schema.schema_type.as_deref() {
        Some("array") => {
            let element = match schema.items.as_deref() {
                Some(items) => resolver.resolve(items, &format!("{}Item", name))?,
                None => TypeExpression::any(),
            };
            Ok(Outcome::Type(TypeDeclaration::ArrayAlias {
                name: name.to_string(),
                element,
                nullable: schema.is_nullable(),
                description,
            }))
        }
        Some(schema_type) => {
            let scalar = resolver.scalar_kind(schema_type, schema.format.as_deref())?;
            if scalar == ScalarKind::String && !schema.enum_values.is_empty() {
                // references pick up a `null` literal through `Schema::admits_null`
                let (values, _) = resolver.enum_literals(schema)?;
                if values.is_empty() {
                    return Ok(Outcome::Type(TypeDeclaration::ScalarAlias {
                        name: name.to_string(),
                        scalar,
                        nullable: true,
                        description,
                    }));
                }
                resolver.enums.declare_owned(name, &values, description);
                return Ok(Outcome::Enum);
            }
            Ok(Outcome::Type(TypeDeclaration::ScalarAlias {
                name: name.to_string(),
                scalar,
                nullable: schema.is_nullable(),
                description,
            }))
        }
        None => match (schema.ref_path.as_deref(), schema.declared_nullability()) {
            (Some(pointer), _) => inclusion_record(resolver, name, pointer, description),
            (None, Some(nullable)) => Ok(Outcome::Type(TypeDeclaration::AnyAlias {
                name: name.to_string(),
                nullable,
                description,
            })),
            (None, None) => Ok(Outcome::Vacuous(description)),
        },
    }
}

/// A bare reference at the top level: a record that includes its target
fn inclusion_record(
    resolver: &mut TypeResolver<'_>,
    name: &str,
    pointer: &str,
    description: Option<String>,
) -> Result<Outcome> {
    let target = resolver.reference_target(pointer)?;
    resolver.check_inclusion_cycle(&target)?;
    Ok(Outcome::Type(TypeDeclaration::Record {
        name: name.to_string(),
        members: vec![RecordMember::inclusion(target)],
        description,
    }))
}
