use clap::{Parser, Subcommand};
use icss_codegen::CompileError;
use icss_semantic::Diagnostic;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "icss")]
#[command(about = "ICSS — stylesheet compiler with variables, arithmetic and conditionals")]
#[command(version)]
struct Cli {
    /// Log pass details to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile an .icss file to CSS
    Build {
        /// Input .icss file
        path: String,

        /// Output file (`-` for stdout); defaults to <input>.css
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Check an .icss file for errors without generating output
    Check {
        /// Input .icss file
        path: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Build { path, output } => cmd_build(&path, output.as_deref()),
        Command::Check { path } => cmd_check(&path),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_source(path: &str) -> String {
    let p = Path::new(path);
    if !p.exists() {
        eprintln!("Error: file not found: {path}");
        std::process::exit(1);
    }
    match std::fs::read_to_string(p) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error reading {path}: {e}");
            std::process::exit(1);
        }
    }
}

fn cmd_build(path: &str, output: Option<&str>) {
    let source = read_source(path);
    debug!(path, bytes = source.len(), "Read source");

    let css = match icss_codegen::compile(&source) {
        Ok(css) => css,
        Err(e) => {
            report(path, &e);
            std::process::exit(1);
        }
    };

    match output_path(path, output) {
        None => {
            debug!(bytes = css.len(), "Writing CSS to stdout");
            print!("{css}");
        }
        Some(css_path) => {
            debug!(output = %css_path.display(), bytes = css.len(), "Writing CSS");
            if let Err(e) = std::fs::write(&css_path, &css) {
                eprintln!("Error writing {}: {e}", css_path.display());
                std::process::exit(1);
            }
            eprintln!("Built: {}", css_path.display());
        }
    }
}

fn cmd_check(path: &str) {
    let source = read_source(path);

    let sheet = match icss_parser::Parser::parse(&source) {
        Ok(sheet) => sheet,
        Err(e) => {
            report(path, &CompileError::Parse(e));
            std::process::exit(1);
        }
    };

    let diagnostics = icss_semantic::check(&sheet);
    debug!(path, diagnostics = diagnostics.len(), "Checked source");
    if !diagnostics.is_empty() {
        report(path, &CompileError::Check(diagnostics));
        std::process::exit(1);
    }

    eprintln!("OK: {path}");
}

/// Where `build` writes its CSS, or `None` for stdout.
fn output_path(input: &str, output: Option<&str>) -> Option<PathBuf> {
    match output {
        Some("-") => None,
        Some(out) => Some(PathBuf::from(out)),
        None => Some(Path::new(input).with_extension("css")),
    }
}

fn report(path: &str, error: &CompileError) {
    match error {
        CompileError::Check(diagnostics) => {
            for diagnostic in diagnostics {
                eprintln!("{}", format_diagnostic(path, diagnostic));
            }
            eprintln!("{error}");
        }
        other => eprintln!("{path}: {other}"),
    }
}

fn format_diagnostic(path: &str, diagnostic: &Diagnostic) -> String {
    format!("{path}:{diagnostic}")
}
