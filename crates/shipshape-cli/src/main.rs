//! CLI entry point for shipshape.
//!
//! Argument parsing, reading policy sources, writing the report and choosing
//! the exit code. Everything else lives in `shipshape-app`.

mod logging;
mod sources;

use std::io::Write;

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use shipshape_app::{AuditInput, OutputFormat, exit_code, run_audit};
use shipshape_settings::Overrides;
use shipshape_types::Severity;

#[derive(Parser, Debug)]
#[command(
    name = "shipshape",
    version,
    about = "Configuration compliance checks for projects"
)]
struct Cli {
    /// Log level or filter directive for stderr logs (RUST_LOG wins when set).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the checks defined in one or more policy documents.
    Run(RunArgs),

    /// List the registered check types.
    ListChecks,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Directory the checks run against (defaults to the document's
    /// project-dir, then the current directory).
    project_dir: Option<Utf8PathBuf>,

    /// Policy document path or http(s) URL; repeat to merge several, later
    /// ones overriding earlier ones.
    #[arg(short = 'f', long = "file", default_value = "shipshape.yml")]
    files: Vec<String>,

    /// Only run checks of these types (comma-separated).
    #[arg(short = 't', long = "types", value_delimiter = ',')]
    types: Vec<String>,

    /// Skip checks that need a database.
    #[arg(short = 'd', long)]
    exclude_db: bool,

    /// Try to fix breaches after detecting them.
    #[arg(short = 'r', long)]
    remediate: bool,

    /// Output format: json, junit, simple or table.
    #[arg(
        short = 'o',
        long,
        env = "SHIPSHAPE_OUTPUT_FORMAT",
        default_value = "simple"
    )]
    output: OutputFormat,

    /// Exit with status 2 when breaches at or above the fail severity exist.
    #[arg(short = 'e', long, env = "SHIPSHAPE_ERROR_ON_FAILURE")]
    error_code: bool,

    /// Lowest severity that counts for --error-code (default high).
    #[arg(long, env = "SHIPSHAPE_FAIL_SEVERITY")]
    fail_severity: Option<Severity>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level)?;

    match cli.cmd {
        Commands::Run(args) => {
            let code = cmd_run(args)?;
            if code != 0 {
                std::process::exit(code);
            }
            Ok(())
        }
        Commands::ListChecks => cmd_list_checks(),
    }
}

fn cmd_run(args: RunArgs) -> anyhow::Result<i32> {
    let sources = sources::load_all(&args.files)?;
    let output = run_audit(AuditInput {
        sources: &sources,
        overrides: Overrides {
            project_dir: args.project_dir,
            fail_severity: args.fail_severity,
            check_types: args.types,
            exclude_db: args.exclude_db,
            remediate: args.remediate,
        },
    })?;

    let rendered = args.output.render(&output.results)?;
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(rendered.as_bytes())
        .and_then(|()| stdout.flush())
        .context("write report")?;

    Ok(exit_code(
        &output.results,
        output.fail_severity,
        args.error_code,
    ))
}

fn cmd_list_checks() -> anyhow::Result<()> {
    let registry = shipshape_checks::default_registry();
    let mut stdout = std::io::stdout().lock();
    for check_type in registry.check_types() {
        writeln!(stdout, "{check_type}").context("write check types")?;
    }
    Ok(())
}
