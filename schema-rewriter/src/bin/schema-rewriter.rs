/// CLI: rewrites every `*.json` schema in `old/` into `new/`.
///
/// Usage:
///   schema-rewriter                          # old/ -> new/ under the current directory
///   schema-rewriter --input in --output out
///   schema-rewriter --fixups fixups.json -v
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use schema_rewriter::{process_directory, BatchConfig, FixupTable, RewriteError};

/// Rewrite XSD-derived JSON Schema files.
#[derive(Parser, Debug)]
#[command(name = "schema-rewriter", version, about, long_about = None)]
struct Cli {
    /// Directory holding the schemas to rewrite. Defaults to ./old
    #[arg(long)]
    input: Option<PathBuf>,

    /// Existing directory to write rewritten schemas into. Defaults to ./new
    #[arg(long)]
    output: Option<PathBuf>,

    /// JSON file replacing the built-in fix-up table.
    #[arg(long)]
    fixups: Option<PathBuf>,

    /// Write non-ASCII characters as-is instead of \uXXXX escapes.
    #[arg(long)]
    utf8: bool,

    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> Result<(), RewriteError> {
    let cwd = std::env::current_dir().map_err(RewriteError::CurrentDir)?;

    let mut config = BatchConfig::in_dir(&cwd);
    if let Some(input) = cli.input {
        config.input_dir = cwd.join(input);
    }
    if let Some(output) = cli.output {
        config.output_dir = cwd.join(output);
    }
    if let Some(path) = cli.fixups {
        config.fixups = FixupTable::from_path(&path)?;
        tracing::info!(path = %path.display(), entries = config.fixups.len(), "loaded fix-up table");
    }
    config.ensure_ascii = !cli.utf8;

    let stdout = std::io::stdout();
    let mut progress = stdout.lock();
    process_directory(&config, &mut progress)?;
    Ok(())
}
