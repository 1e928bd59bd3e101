use crate::error::{CodemodError, Result};
use crate::manifest::Manifest;
use crate::matcher::Matcher;
use crate::operations::patch_applicator::{marker_step, substitution_step, Staged};
use crate::operations::{run_preflight_checks, ApplyOptions};
use crate::types::{Outcome, RunReport, StepReport};
use log::warn;

/// Runs the preflight checks and only then the codemod. Nothing is written
/// when any check fails.
pub fn run_checked(manifest: &Manifest, dry_run: bool) -> Result<RunReport> {
    let summary = run_preflight_checks(manifest).map_err(CodemodError::Preflight)?;
    println!(
        "\n--- Preflight Checks Passed ({} present, {} missing). ---\n",
        summary.ok.len(),
        summary.missing.len()
    );
    run(manifest, dry_run)
}

/// Runs both phases over a manifest: markers for every target first, then
/// every substitution rule in manifest order. A dry run carries each step's
/// would-be content into the next step on the same file.
pub fn run(manifest: &Manifest, dry_run: bool) -> Result<RunReport> {
    let opts = ApplyOptions {
        dry_run,
        backup_suffix: manifest.backup_suffix.clone(),
    };
    let mut staged = Staged::new();
    let mut report = RunReport::default();

    println!("--- Phase 1: Ensuring marker lines ---");
    for target in &manifest.targets {
        let Some(marker) = manifest.marker_for(target) else {
            continue;
        };
        let step = marker_step(&target.path, marker, &opts, &mut staged)?;
        if step.outcome.is_modified() {
            println!("Adding {:?} to {:?}", marker, target.path);
        }
        print_step(&step, dry_run);
        report.steps.push(step);
    }

    println!("\n--- Phase 2: Updating return types ---");
    for target in &manifest.targets {
        for rule in &target.rules {
            let matcher = Matcher::compile(rule)?;
            if target.path.exists() {
                println!(
                    "Updating {:?}: {:?} -> {:?}",
                    target.path, rule.pattern, rule.replacement
                );
            }
            let step = substitution_step(&target.path, &matcher, &opts, &mut staged)?;
            print_step(&step, dry_run);
            report.steps.push(step);
        }
    }

    for path in report.missing_files() {
        warn!("Target {:?} was not found and has been skipped", path);
    }

    Ok(report)
}

pub fn print_step(step: &StepReport, dry_run: bool) {
    let line = match (step.outcome, dry_run) {
        (Outcome::Modified(n), true) => {
            format!("    [DRY RUN] {} would make {} edit(s).", step.kind, n)
        }
        (Outcome::Modified(n), false) => match &step.backup {
            Some(backup) => format!(
                "    [MODIFIED] {} made {} edit(s), backup at {:?}.",
                step.kind, n, backup
            ),
            None => format!("    [MODIFIED] {} made {} edit(s).", step.kind, n),
        },
        (Outcome::AlreadyCurrent, _) => format!("    [CURRENT] {} already applied.", step.kind),
        (Outcome::FileNotFound, _) => format!("    [MISSING] {:?} not found.", step.path),
    };
    println!("{}", line);
}
