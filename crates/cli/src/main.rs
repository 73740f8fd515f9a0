//! OpenAPI Typegen CLI
//!
//! Command-line interface for generating Ballerina type declarations from
//! OpenAPI documents.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use openapi_typegen_common::{DeclarationSet, TypeDeclaration, TypegenConfig};
use openapi_typegen_generator::TypesGenerator;
use openapi_typegen_parser::{Naming, OpenApiParser, SchemaRegistry};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// File name of the saved declaration manifest
const MANIFEST_FILE: &str = "declarations.json";

#[derive(Parser)]
#[command(name = "openapi-typegen")]
#[command(version, about = "Generate Ballerina types from OpenAPI schemas", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a spec file and display the synthesized declarations
    #[command(after_help = "EXAMPLES:\n  \
        # Summarize the declarations of a spec\n  \
        openapi-typegen parse --spec petstore.yaml\n\n  \
        # List every declaration with its kind\n  \
        openapi-typegen parse --spec petstore.json --verbose")]
    Parse {
        /// Path to the OpenAPI spec file (JSON or YAML)
        #[arg(short, long)]
        spec: PathBuf,

        /// Path to a typegen.yaml config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Generate a Ballerina types module from a spec file
    #[command(after_help = "EXAMPLES:\n  \
        # Generate every schema\n  \
        openapi-typegen generate --spec petstore.yaml --output ./generated\n\n  \
        # Keep only schemas the operations reach, and save a manifest\n  \
        openapi-typegen generate \\\n    \
        --spec petstore.yaml \\\n    \
        --output ./client \\\n    \
        --prune --manifest\n\n  \
        # Second pass reusing the declarations of the first\n  \
        openapi-typegen generate \\\n    \
        --spec schemas.yaml \\\n    \
        --output ./schemas \\\n    \
        --seed ./client/declarations.json")]
    Generate {
        /// Path to the OpenAPI spec file (JSON or YAML)
        #[arg(short, long)]
        spec: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,

        /// Path to a typegen.yaml config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Drop declarations no operation or retained name reaches
        #[arg(long)]
        prune: bool,

        /// Declaration manifest of an earlier pass to seed this one with
        #[arg(long)]
        seed: Option<PathBuf>,

        /// Also write declarations.json into the output directory
        #[arg(long)]
        manifest: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        println!("{} Verbose mode enabled", "→".cyan());
    }

    match cli.command {
        Commands::Parse { spec, config } => {
            parse_command(spec.as_path(), config.as_deref(), cli.verbose)?;
        }
        Commands::Generate {
            spec,
            output,
            config,
            prune,
            seed,
            manifest,
        } => {
            generate_command(GenerateOptions {
                spec_path: spec.as_path(),
                output: output.as_path(),
                config_path: config.as_deref(),
                prune,
                seed: seed.as_deref(),
                manifest,
                verbose: cli.verbose,
            })?;
        }
    }

    Ok(())
}

/// `RUST_LOG` wins; otherwise debug with `--verbose`, warn without
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    if tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}

fn load_config(path: Option<&Path>) -> Result<TypegenConfig> {
    match path {
        Some(path) => TypegenConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(TypegenConfig::default()),
    }
}

fn load_manifest(path: &Path) -> Result<DeclarationSet> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse manifest {}", path.display()))
}

/// Resolve the schemas of `spec_path` into declarations
fn build_declarations(
    spec_path: &Path,
    config: &TypegenConfig,
    prune: bool,
    seed: Option<&Path>,
) -> Result<DeclarationSet> {
    let parser = OpenApiParser::from_file(spec_path).context("Failed to load OpenAPI spec")?;
    let spec = parser.spec();
    let operation_roots = spec.operation_schema_refs();
    debug!(
        roots = operation_roots.len(),
        retained = config.retain.len(),
        "collected externally retained schema names"
    );

    let mut registry = SchemaRegistry::new(spec)
        .context("Failed to read component schemas")?
        .with_naming(Naming::with_reserved_words(
            config.naming.reserved_words.iter().cloned(),
        ))
        .retain(operation_roots)
        .retain(&config.retain)
        .prune_unused(prune || config.prune_unused);

    if let Some(seed_path) = seed {
        println!(
            "{} Seeding from manifest: {}",
            "→".cyan(),
            seed_path.display()
        );
        registry = registry.seeded_with(load_manifest(seed_path)?);
    }

    registry.build().context("Failed to resolve schemas")
}

fn declaration_kind(declaration: &TypeDeclaration) -> &'static str {
    match declaration {
        TypeDeclaration::Record { .. } => "record",
        TypeDeclaration::UnionAlias { .. } => "union",
        TypeDeclaration::ArrayAlias { .. } => "array",
        TypeDeclaration::ScalarAlias { .. } => "scalar",
        TypeDeclaration::AnyAlias { .. } => "anydata",
    }
}

fn parse_command(spec_path: &Path, config_path: Option<&Path>, verbose: bool) -> Result<()> {
    println!("{} Parsing spec file: {}", "→".cyan(), spec_path.display());

    let config = load_config(config_path)?;
    let set = build_declarations(spec_path, &config, config.prune_unused, None)?;

    println!("\n{}", "✓ Parse successful!".green().bold());
    println!("\n{}", "Declarations:".bold());
    println!("  Types: {}", set.declarations.len());
    println!("  Enums: {}", set.enums.len());
    println!("  Referenced names: {}", set.referenced.len());

    if verbose {
        println!("\n{}", "Types:".bold());
        for declaration in &set.declarations {
            println!(
                "  • {} ({})",
                declaration.name().cyan(),
                declaration_kind(declaration)
            );
        }
        if !set.enums.is_empty() {
            println!("\n{}", "Enums:".bold());
            for enum_decl in &set.enums {
                println!(
                    "  • {} ({} members)",
                    enum_decl.name.cyan(),
                    enum_decl.members.len()
                );
            }
        }
    }

    Ok(())
}

/// Options for the generate command
struct GenerateOptions<'a> {
    spec_path: &'a Path,
    output: &'a Path,
    config_path: Option<&'a Path>,
    prune: bool,
    seed: Option<&'a Path>,
    manifest: bool,
    verbose: bool,
}

fn generate_command(options: GenerateOptions<'_>) -> Result<()> {
    println!(
        "{} Generating types from: {}",
        "→".cyan(),
        options.spec_path.display()
    );

    let config = load_config(options.config_path)?;
    if options.verbose {
        println!("  Output: {}", options.output.display());
        println!("  File: {}", config.output.file_name);
        println!("  Prune: {}", options.prune || config.prune_unused);
    }

    println!("{} Resolving schemas...", "→".cyan());
    let set = build_declarations(options.spec_path, &config, options.prune, options.seed)?;
    println!(
        "{} Resolved {} types and {} enums",
        "✓".green(),
        set.declarations.len(),
        set.enums.len()
    );

    println!("{} Rendering types module...", "→".cyan());
    let generator = TypesGenerator::new(set.clone())
        .context("Failed to create generator")?
        .with_file_name(config.output.file_name.clone());
    let types_path = generator
        .generate_to_directory(options.output)
        .context("Failed to generate types")?;

    println!("\n{}", "✓ Generation complete!".green().bold());
    println!("\n{}", "Generated files:".bold());
    println!("  📄 {}", types_path.display());

    if options.manifest {
        let manifest_path = options.output.join(MANIFEST_FILE);
        let json = serde_json::to_string_pretty(&set).context("Failed to serialize manifest")?;
        fs::write(&manifest_path, json)
            .with_context(|| format!("Failed to write {}", manifest_path.display()))?;
        println!("  📄 {}", manifest_path.display());
    }

    Ok(())
}
