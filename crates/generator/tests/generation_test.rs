//! Integration test for types generation

use openapi_typegen_common::{
    DeclarationSet, EnumDeclaration, EnumMember, FieldDeclaration, RecordMember, ScalarKind,
    TypeDeclaration, TypeExpression,
};
use openapi_typegen_generator::{generate_types, TypesGenerator};
use std::collections::BTreeSet;
use tempfile::TempDir;

fn field(name: &str, type_expr: TypeExpression, required: bool) -> RecordMember {
    RecordMember::Field(FieldDeclaration {
        name: name.to_string(),
        original_name: name.trim_start_matches('\'').to_string(),
        type_expr,
        required,
        description: None,
    })
}

fn petstore() -> DeclarationSet {
    DeclarationSet {
        declarations: vec![
            TypeDeclaration::Record {
                name: "Pet".to_string(),
                members: vec![
                    field("id", TypeExpression::scalar(ScalarKind::Int), true),
                    field("tag", TypeExpression::reference("PetTag"), false),
                ],
                description: Some("A pet for sale".to_string()),
            },
            TypeDeclaration::Record {
                name: "Dog".to_string(),
                members: vec![
                    RecordMember::inclusion("Pet"),
                    RecordMember::Field(FieldDeclaration {
                        name: "'type".to_string(),
                        original_name: "type".to_string(),
                        type_expr: TypeExpression::scalar(ScalarKind::String).nullable(true),
                        required: false,
                        description: Some("Breed".to_string()),
                    }),
                ],
                description: None,
            },
            TypeDeclaration::UnionAlias {
                name: "Animal".to_string(),
                members: vec![
                    TypeExpression::reference("Dog"),
                    TypeExpression::reference("Pet"),
                ],
                description: None,
            },
            TypeDeclaration::ArrayAlias {
                name: "Pets".to_string(),
                element: TypeExpression::reference("Pet"),
                nullable: false,
                description: None,
            },
            TypeDeclaration::AnyAlias {
                name: "Extra".to_string(),
                nullable: true,
                description: None,
            },
        ],
        enums: vec![EnumDeclaration {
            name: "PetTag".to_string(),
            members: vec![
                EnumMember {
                    identifier: "PETTAG_A".to_string(),
                    value: "A".to_string(),
                },
                EnumMember {
                    identifier: "PETTAG_B".to_string(),
                    value: "B".to_string(),
                },
            ],
            description: None,
        }],
        referenced: BTreeSet::new(),
    }
}

#[test]
fn test_render_petstore_types() {
    let rendered = TypesGenerator::new(petstore()).unwrap().render().unwrap();

    let expected = r#"// AUTO-GENERATED FILE. DO NOT MODIFY.
// This file was generated by openapi-typegen-generator.

# A pet for sale
public type Pet record {
    int id;
    PetTag tag?;
};

public type Dog record {
    *Pet;
    # Breed
    string? 'type?;
};

public type Animal Dog|Pet;

public type Pets Pet[];

public type Extra anydata?;

public enum PetTag {
    PETTAG_A = "A",
    PETTAG_B = "B"
}
"#;
    assert_eq!(rendered, expected);
}

#[test]
fn test_generate_to_directory() {
    let temp_dir = TempDir::new().unwrap();
    let output_dir = temp_dir.path().join("generated");

    let generator = TypesGenerator::new(petstore()).unwrap();
    let path = generator.generate_to_directory(&output_dir).unwrap();

    assert_eq!(path, output_dir.join("types.bal"));
    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("public type Pet record {"));
    assert!(content.contains("public enum PetTag {"));
}

#[test]
fn test_custom_file_name() {
    let temp_dir = TempDir::new().unwrap();

    let path = TypesGenerator::new(petstore())
        .unwrap()
        .with_file_name("schema_types.bal")
        .generate_to_directory(temp_dir.path())
        .unwrap();

    assert!(path.ends_with("schema_types.bal"));
    assert!(path.exists());
}

#[test]
fn test_enum_literals_are_escaped() {
    let set = DeclarationSet {
        enums: vec![EnumDeclaration {
            name: "Quote".to_string(),
            members: vec![EnumMember {
                identifier: "QUOTE_SAYHI".to_string(),
                value: "say \"hi\"".to_string(),
            }],
            description: Some("Quoted values".to_string()),
        }],
        ..DeclarationSet::default()
    };

    let rendered = TypesGenerator::new(set).unwrap().render().unwrap();
    assert!(rendered.contains("# Quoted values\npublic enum Quote {\n    QUOTE_SAYHI = \"say \\\"hi\\\"\"\n}"));
}

#[test]
fn test_generate_types_convenience() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().to_str().unwrap();

    let path = generate_types(DeclarationSet::default(), output).unwrap();
    assert!(path.exists());
}
