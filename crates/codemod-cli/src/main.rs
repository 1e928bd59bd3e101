mod cli;

use anyhow::{bail, Context, Result};
use clap::Parser;
use cli::{Args, Command};
use codemod_core::operations::ApplyOptions;
use codemod_core::runner::{print_step, run_checked};
use codemod_core::{
    ensure_marker_line, replace_return_type, run_preflight_checks, CodemodError, Manifest, Rule,
    RunReport,
};
use log::debug;
use std::env;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;

const EXIT_FAILURE: i32 = 1;
const EXIT_PARTIAL: i32 = 2;

fn main() {
    let args = Args::parse();
    init_logger(args.verbose);

    match execute(args.command) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(EXIT_FAILURE);
        }
    }
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn execute(command: Command) -> Result<i32> {
    match command {
        Command::Run {
            manifest,
            dry_run,
            allow_missing,
            root,
        } => {
            let manifest = load_manifest(manifest.as_deref(), root.as_deref())?;
            let report = match run_checked(&manifest, dry_run) {
                Ok(report) => report,
                Err(CodemodError::Preflight(errors)) => {
                    print_preflight_failure(&errors);
                    return Err(CodemodError::Preflight(errors).into());
                }
                Err(e) => return Err(e.into()),
            };
            print_summary(&report, dry_run);
            Ok(exit_code(&report, allow_missing))
        }
        Command::Check { manifest, root } => {
            let manifest = load_manifest(manifest.as_deref(), root.as_deref())?;
            preflight(&manifest)?;
            Ok(0)
        }
        Command::Marker {
            file,
            text,
            dry_run,
            backup_suffix,
        } => {
            let opts = ApplyOptions {
                dry_run,
                backup_suffix,
            };
            println!("--- Ensuring marker in: {:?}", file);
            let step = ensure_marker_line(&file, &text, &opts)?;
            print_step(&step, dry_run);
            Ok(exit_code(&RunReport { steps: vec![step] }, false))
        }
        Command::Replace {
            file,
            old,
            new,
            regex,
            dry_run,
            backup_suffix,
        } => {
            let rule = if regex {
                Rule::regex(old, new)
            } else {
                Rule::literal(old, new)
            };
            let opts = ApplyOptions {
                dry_run,
                backup_suffix,
            };
            println!("--- Updating: {:?}", file);
            let step = replace_return_type(&file, &rule, &opts)?;
            print_step(&step, dry_run);
            Ok(exit_code(&RunReport { steps: vec![step] }, false))
        }
    }
}

fn load_manifest(path: Option<&Path>, root: Option<&Path>) -> Result<Manifest> {
    let mut manifest = match (path, root) {
        (Some(p), Some(_)) => {
            Manifest::read(p).with_context(|| format!("Failed to load manifest {:?}", p))?
        }
        (Some(p), None) => {
            Manifest::load(p).with_context(|| format!("Failed to load manifest {:?}", p))?
        }
        (None, _) => {
            if atty::is(atty::Stream::Stdin) {
                bail!("No manifest specified and no data piped from stdin.");
            }
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            let mut manifest =
                Manifest::from_toml(&buffer).context("Failed to load manifest from stdin")?;
            if root.is_none() {
                let cwd = env::current_dir().context("Failed to resolve working directory")?;
                manifest.resolve(&cwd)?;
            }
            manifest
        }
    };

    if let Some(root) = root {
        manifest.resolve(root)?;
    }
    debug!(
        "Targets: {:?}",
        manifest.targets.iter().map(|t| &t.path).collect::<Vec<&PathBuf>>()
    );
    Ok(manifest)
}

fn preflight(manifest: &Manifest) -> Result<()> {
    match run_preflight_checks(manifest) {
        Ok(summary) => {
            println!(
                "\n--- Preflight Checks Passed ({} present, {} missing). ---\n",
                summary.ok.len(),
                summary.missing.len()
            );
            Ok(())
        }
        Err(errors) => {
            print_preflight_failure(&errors);
            Err(CodemodError::Preflight(errors).into())
        }
    }
}

fn print_preflight_failure(errors: &[String]) {
    println!("\n--- Preflight Checks Failed ---");
    for err in errors {
        println!("{}", err);
    }
    println!("\nAborting. No files were modified.");
}

fn print_summary(report: &RunReport, dry_run: bool) {
    let missing = report.missing_files();

    println!("\n--- Summary ---");
    println!("Steps run:            {}", report.steps.len());
    if dry_run {
        println!("Would modify:         {}", report.modified());
    } else {
        println!("Modified:             {}", report.modified());
    }
    println!("Already current:      {}", report.already_current());
    println!("Missing files:        {}", missing.len());
    for path in &missing {
        println!("  - {:?}", path);
    }

    if missing.is_empty() {
        println!("\nCodemod complete.");
    } else {
        println!("\nCodemod complete with missing targets.");
    }
}

fn exit_code(report: &RunReport, allow_missing: bool) -> i32 {
    if report.is_partial() && !allow_missing {
        EXIT_PARTIAL
    } else {
        0
    }
}
