use super::file_operations::{
    file_exists, read_file_content, write_backup, write_file_content, DEFAULT_BACKUP_SUFFIX,
};
use crate::error::{CodemodError, Result};
use crate::matcher::{is_valid_marker, prepend_line, Matcher};
use crate::types::{Outcome, Rule, StepKind, StepReport};
use log::{debug, info};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyOptions {
    pub dry_run: bool,
    /// Appended to the file name to form the backup path. Must not be empty.
    pub backup_suffix: String,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            backup_suffix: DEFAULT_BACKUP_SUFFIX.to_string(),
        }
    }
}

impl ApplyOptions {
    pub fn validate(&self) -> Result<()> {
        if self.backup_suffix.is_empty() {
            return Err(CodemodError::EmptyBackupSuffix);
        }
        Ok(())
    }
}

/// Content a dry run would have written, keyed by path, so later steps see
/// the same text they would in a real run.
pub(crate) type Staged = HashMap<PathBuf, String>;

/// Inserts `marker` as the first line unless it already occurs anywhere in the file.
pub fn ensure_marker_line(path: &Path, marker: &str, opts: &ApplyOptions) -> Result<StepReport> {
    marker_step(path, marker, opts, &mut Staged::new())
}

/// Replaces every occurrence of the rule's pattern in the file.
pub fn replace_return_type(path: &Path, rule: &Rule, opts: &ApplyOptions) -> Result<StepReport> {
    let matcher = Matcher::compile(rule)?;
    apply_with_matcher(path, &matcher, opts)
}

pub fn apply_with_matcher(
    path: &Path,
    matcher: &Matcher,
    opts: &ApplyOptions,
) -> Result<StepReport> {
    substitution_step(path, matcher, opts, &mut Staged::new())
}

pub(crate) fn marker_step(
    path: &Path,
    marker: &str,
    opts: &ApplyOptions,
    staged: &mut Staged,
) -> Result<StepReport> {
    if !is_valid_marker(marker) {
        return Err(CodemodError::InvalidMarker(marker.to_string()));
    }
    apply_edit(path, StepKind::Marker, opts, staged, |content| {
        if content.contains(marker) {
            None
        } else {
            Some((prepend_line(content, marker), 1))
        }
    })
}

pub(crate) fn substitution_step(
    path: &Path,
    matcher: &Matcher,
    opts: &ApplyOptions,
    staged: &mut Staged,
) -> Result<StepReport> {
    apply_edit(path, StepKind::Substitution, opts, staged, |content| {
        let (replaced, hits) = matcher.replace_all(content);
        if hits == 0 || replaced == content {
            None
        } else {
            Some((replaced.into_owned(), hits))
        }
    })
}

fn apply_edit<F>(
    path: &Path,
    kind: StepKind,
    opts: &ApplyOptions,
    staged: &mut Staged,
    edit: F,
) -> Result<StepReport>
where
    F: FnOnce(&str) -> Option<(String, usize)>,
{
    opts.validate()?;

    let mut report = StepReport {
        path: path.to_path_buf(),
        kind,
        outcome: Outcome::FileNotFound,
        backup: None,
    };

    if !file_exists(path) {
        debug!("{} skipped, {:?} does not exist", kind, path);
        return Ok(report);
    }

    let original = match staged.get(path) {
        Some(content) if opts.dry_run => content.clone(),
        _ => read_file_content(path)?,
    };
    let Some((updated, edits)) = edit(&original) else {
        debug!("{} already current in {:?}", kind, path);
        report.outcome = Outcome::AlreadyCurrent;
        return Ok(report);
    };

    report.outcome = Outcome::Modified(edits);
    if opts.dry_run {
        staged.insert(path.to_path_buf(), updated);
        return Ok(report);
    }

    let backup = write_backup(path, &original, &opts.backup_suffix)?;
    write_file_content(path, &updated)?;
    info!("{} applied to {:?} ({} edit(s)), backup at {:?}", kind, path, edits, backup);
    report.backup = Some(backup);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::file_operations::backup_path;
    use std::fs;
    use tempfile::tempdir;

    const MARKER: &str = "import core";

    #[test]
    fn test_marker_inserted_as_first_line() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("Publish.swift");
        fs::write(&file_path, "struct A {}\n").unwrap();

        let report = ensure_marker_line(&file_path, MARKER, &ApplyOptions::default()).unwrap();
        assert_eq!(report.outcome, Outcome::Modified(1));
        assert_eq!(
            fs::read_to_string(&file_path).unwrap(),
            "import core\nstruct A {}\n"
        );
    }

    #[test]
    fn test_marker_is_idempotent() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("Publish.swift");
        fs::write(&file_path, "struct A {}\n").unwrap();
        let opts = ApplyOptions::default();

        ensure_marker_line(&file_path, MARKER, &opts).unwrap();
        let once = fs::read_to_string(&file_path).unwrap();
        let report = ensure_marker_line(&file_path, MARKER, &opts).unwrap();

        assert_eq!(report.outcome, Outcome::AlreadyCurrent);
        assert_eq!(fs::read_to_string(&file_path).unwrap(), once);
        assert_eq!(once.matches(MARKER).count(), 1);
    }

    #[test]
    fn test_marker_found_anywhere_counts_as_present() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("Draft.swift");
        fs::write(&file_path, "import UIKit\nimport core\n").unwrap();

        let report = ensure_marker_line(&file_path, MARKER, &ApplyOptions::default()).unwrap();
        assert_eq!(report.outcome, Outcome::AlreadyCurrent);
        assert!(!backup_path(&file_path, ".bak").exists());
    }

    #[test]
    fn test_replace_is_idempotent() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("Publish.swift");
        fs::write(&file_path, "func publish() -> PublishContestResult\n").unwrap();
        let rule = Rule::literal("PublishContestResult", "PublishResult");
        let opts = ApplyOptions::default();

        let first = replace_return_type(&file_path, &rule, &opts).unwrap();
        let once = fs::read_to_string(&file_path).unwrap();
        let second = replace_return_type(&file_path, &rule, &opts).unwrap();

        assert_eq!(first.outcome, Outcome::Modified(1));
        assert_eq!(second.outcome, Outcome::AlreadyCurrent);
        assert_eq!(fs::read_to_string(&file_path).unwrap(), once);
        assert_eq!(once, "func publish() -> PublishResult\n");
    }

    #[test]
    fn test_backup_holds_content_before_each_step() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("Publish.swift");
        let original = "func publish() -> PublishContestResult\n";
        fs::write(&file_path, original).unwrap();
        let opts = ApplyOptions::default();

        let marker = ensure_marker_line(&file_path, MARKER, &opts).unwrap();
        let backup = marker.backup.unwrap();
        assert_eq!(fs::read_to_string(&backup).unwrap(), original);

        let after_marker = fs::read_to_string(&file_path).unwrap();
        let rule = Rule::literal("PublishContestResult", "PublishResult");
        let sub = replace_return_type(&file_path, &rule, &opts).unwrap();
        assert_eq!(sub.backup.as_ref(), Some(&backup));
        assert_eq!(fs::read_to_string(&backup).unwrap(), after_marker);
    }

    #[test]
    fn test_missing_file_creates_nothing() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("Missing.swift");
        let opts = ApplyOptions::default();

        let marker = ensure_marker_line(&file_path, MARKER, &opts).unwrap();
        let sub = replace_return_type(&file_path, &Rule::literal("A", "B"), &opts).unwrap();

        assert_eq!(marker.outcome, Outcome::FileNotFound);
        assert_eq!(sub.outcome, Outcome::FileNotFound);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_dry_run_leaves_file_untouched() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("Draft.swift");
        let original = "func create() -> ContestDraft\n";
        fs::write(&file_path, original).unwrap();
        let opts = ApplyOptions {
            dry_run: true,
            ..ApplyOptions::default()
        };

        let report =
            replace_return_type(&file_path, &Rule::literal("ContestDraft", "Contest"), &opts).unwrap();
        assert_eq!(report.outcome, Outcome::Modified(1));
        assert_eq!(report.backup, None);
        assert_eq!(fs::read_to_string(&file_path).unwrap(), original);
        assert!(!backup_path(&file_path, ".bak").exists());
    }

    #[test]
    fn test_empty_backup_suffix_is_rejected_before_writing() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("A.swift");
        let original = "func a() -> X\n";
        fs::write(&file_path, original).unwrap();
        let opts = ApplyOptions {
            dry_run: false,
            backup_suffix: String::new(),
        };

        let err = ensure_marker_line(&file_path, MARKER, &opts).unwrap_err();
        assert!(matches!(err, CodemodError::EmptyBackupSuffix));
        let err = replace_return_type(&file_path, &Rule::literal("X", "Y"), &opts).unwrap_err();
        assert!(matches!(err, CodemodError::EmptyBackupSuffix));

        assert_eq!(fs::read_to_string(&file_path).unwrap(), original);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_multiline_marker_is_rejected() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("A.swift");
        fs::write(&file_path, "struct A {}\n").unwrap();

        for marker in ["", "  ", "import core\nimport UIKit"] {
            let err = ensure_marker_line(&file_path, marker, &ApplyOptions::default()).unwrap_err();
            assert!(matches!(err, CodemodError::InvalidMarker(_)));
        }
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "struct A {}\n");
    }

    #[test]
    fn test_regex_replacement_yielding_same_text_is_current() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("Same.swift");
        fs::write(&file_path, "-> Contest\n").unwrap();

        let rule = Rule::regex(r"-> (Contest)\b", "-> $1");
        let report = replace_return_type(&file_path, &rule, &ApplyOptions::default()).unwrap();
        assert_eq!(report.outcome, Outcome::AlreadyCurrent);
    }
}
