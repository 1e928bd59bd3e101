use crate::manifest::Manifest;
use crate::matcher::Matcher;
use std::fs;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreflightSummary {
    pub ok: Vec<String>,
    pub missing: Vec<String>,
}

/// Checks every target before anything is written. Missing files are only
/// recorded; anything that would fail halfway through a run is an error.
pub fn run_preflight_checks(manifest: &Manifest) -> Result<PreflightSummary, Vec<String>> {
    println!("--- Running Preflight Checks ---");
    let mut errors = Vec::new();
    let mut summary = PreflightSummary {
        ok: Vec::new(),
        missing: Vec::new(),
    };

    for (i, target) in manifest.targets.iter().enumerate() {
        let prefix = format!("  - Target #{} '{:?}':", i + 1, target.path);

        for (r, rule) in target.rules.iter().enumerate() {
            if let Err(e) = Matcher::compile(rule) {
                errors.push(format!("{} FAILED (Rule #{}: {:#})", prefix, r + 1, e));
            }
        }

        if !target.path.exists() {
            let line = format!("{} MISSING (File not found, will be skipped)", prefix);
            println!("{}", line);
            summary.missing.push(line);
            continue;
        }

        let metadata = match fs::metadata(&target.path) {
            Ok(m) => m,
            Err(e) => {
                errors.push(format!("{} FAILED (Could not stat file: {})", prefix, e));
                continue;
            }
        };

        if metadata.is_dir() {
            errors.push(format!("{} FAILED (Path is a directory)", prefix));
            continue;
        }
        if metadata.permissions().readonly() {
            errors.push(format!("{} FAILED (File is read-only)", prefix));
            continue;
        }

        match fs::read_to_string(&target.path) {
            Ok(_) => {
                let line = format!("{} OK", prefix);
                println!("{}", line);
                summary.ok.push(line);
            }
            Err(e) => {
                errors.push(format!("{} FAILED (Could not read file: {})", prefix, e));
            }
        }
    }

    if errors.is_empty() {
        Ok(summary)
    } else {
        Err(errors)
    }
}
