use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Apply every rule listed in a manifest
    codemod run codemod.toml

    # Preview the edits without touching any file
    codemod run codemod.toml --dry-run

    # Pipe a manifest in, resolving its paths against a checkout
    cat codemod.toml | codemod run --root ~/src/ios-app

    # One-off edits
    codemod marker Sources/Publish.swift "import core"
    codemod replace Sources/Publish.swift "-> PublishContestResult" "-> PublishResult"

EXIT STATUS:
    0  every target was present
    1  invalid manifest, failed preflight check or i/o error
    2  one or more targets were missing (use --allow-missing to exit 0)"#)]
pub struct Args {
    #[arg(
        short,
        long,
        global = true,
        action = ArgAction::Count,
        help = "Increase log verbosity (-v info, -vv debug); RUST_LOG overrides"
    )]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Ensure marker lines, then apply every substitution rule.
    Run {
        #[arg(help = "Manifest file [default: read from stdin]")]
        manifest: Option<PathBuf>,

        #[arg(long, help = "Report what would change without writing files")]
        dry_run: bool,

        #[arg(long, help = "Exit 0 even if some targets do not exist")]
        allow_missing: bool,

        #[arg(long, value_name = "DIR", help = "Resolve relative target paths against DIR")]
        root: Option<PathBuf>,
    },

    /// Run the preflight checks only.
    Check {
        #[arg(help = "Manifest file [default: read from stdin]")]
        manifest: Option<PathBuf>,

        #[arg(long, value_name = "DIR", help = "Resolve relative target paths against DIR")]
        root: Option<PathBuf>,
    },

    /// Insert a marker line at the top of a file unless it already occurs.
    Marker {
        file: PathBuf,

        #[arg(allow_hyphen_values = true)]
        text: String,

        #[arg(long)]
        dry_run: bool,

        #[arg(long, default_value = ".bak", value_parser = parse_backup_suffix)]
        backup_suffix: String,
    },

    /// Replace every occurrence of OLD with NEW in a file.
    Replace {
        file: PathBuf,

        #[arg(allow_hyphen_values = true)]
        old: String,

        #[arg(allow_hyphen_values = true)]
        new: String,

        #[arg(long, help = "Treat OLD as a regular expression")]
        regex: bool,

        #[arg(long)]
        dry_run: bool,

        #[arg(long, default_value = ".bak", value_parser = parse_backup_suffix)]
        backup_suffix: String,
    },
}

fn parse_backup_suffix(value: &str) -> Result<String, String> {
    if value.is_empty() {
        Err("backup suffix must not be empty".to_string())
    } else {
        Ok(value.to_string())
    }
}
