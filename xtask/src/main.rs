//! Developer tasks (schema generation and drift checks).
//!
//! Keeping this separate avoids bloating the end-user CLI.

use anyhow::{Context, bail};
use schemars::schema_for;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the project root (parent of xtask directory).
fn project_root() -> anyhow::Result<PathBuf> {
    let manifest_dir = match std::env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => std::env::current_dir().context("Cannot determine current directory")?,
    };

    if manifest_dir.ends_with("xtask")
        && let Some(parent) = manifest_dir.parent()
    {
        return Ok(parent.to_path_buf());
    }
    Ok(manifest_dir)
}

/// Schema definition with its target filename.
struct SchemaSpec {
    filename: &'static str,
    generate: fn() -> schemars::Schema,
}

fn generate_policy_schema() -> schemars::Schema {
    schema_for!(shipshape_settings::PolicyDocument)
}

fn generate_results_schema() -> schemars::Schema {
    schema_for!(shipshape_types::ResultList)
}

fn schema_specs() -> Vec<SchemaSpec> {
    vec![
        SchemaSpec {
            filename: "shipshape.policy.schema.json",
            generate: generate_policy_schema,
        },
        SchemaSpec {
            filename: "shipshape.results.schema.json",
            generate: generate_results_schema,
        },
    ]
}

/// Serialize a schema to pretty-printed JSON with trailing newline.
fn serialize_schema(schema: &schemars::Schema) -> anyhow::Result<String> {
    let mut json = serde_json::to_string_pretty(schema).context("Failed to serialize schema")?;
    json.push('\n');
    Ok(json)
}

fn emit_schemas(dir: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    for spec in schema_specs() {
        let json = serialize_schema(&(spec.generate)())?;
        let path = dir.join(spec.filename);
        fs::write(&path, &json)
            .with_context(|| format!("Failed to write schema to {}", path.display()))?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}

/// Fails when a schema in `dir` is missing or differs from the generated one.
fn validate_schemas(dir: &Path) -> anyhow::Result<()> {
    let mut missing = Vec::new();
    let mut mismatched = Vec::new();

    for spec in schema_specs() {
        let path = dir.join(spec.filename);
        if !path.exists() {
            missing.push(spec.filename);
            continue;
        }

        let expected = serialize_schema(&(spec.generate)())?;
        let actual = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if expected != actual {
            mismatched.push(spec.filename);
        }
    }

    if missing.is_empty() && mismatched.is_empty() {
        println!("All schemas are up to date.");
        return Ok(());
    }
    for name in &missing {
        eprintln!("missing: {name}");
    }
    for name in &mismatched {
        eprintln!("out of date: {name}");
    }
    eprintln!("\nRun `cargo xtask emit-schemas` to regenerate.");
    bail!("Schema validation failed")
}

fn print_help() {
    eprintln!("xtask commands:");
    eprintln!("  help                    Show this message");
    eprintln!("  emit-schemas [DIR]      Generate JSON schemas from Rust types (default schemas/)");
    eprintln!("  validate-schemas [DIR]  Check that generated schemas match the files (for CI)");
    eprintln!("  print-schema-ids        Print known schema IDs");
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let cmd = args.get(1).map(|s| s.as_str()).unwrap_or("help");
    let dir = || -> anyhow::Result<PathBuf> {
        match args.get(2) {
            Some(dir) => Ok(PathBuf::from(dir)),
            None => Ok(project_root()?.join("schemas")),
        }
    };

    match cmd {
        "help" | "--help" | "-h" => {
            print_help();
            Ok(())
        }
        "emit-schemas" => emit_schemas(&dir()?),
        "validate-schemas" => validate_schemas(&dir()?),
        "print-schema-ids" => {
            for spec in schema_specs() {
                println!("{}", spec.filename.trim_end_matches(".json"));
            }
            Ok(())
        }
        other => bail!("unknown xtask command: {other}\n\nRun `cargo xtask help` for usage."),
    }
    .context("xtask failed")
}
