use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    #[default]
    Literal,
    Regex,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Rule {
    pub pattern: String,
    pub replacement: String,
    #[serde(default)]
    pub kind: RuleKind,
}

impl Rule {
    pub fn literal(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
            kind: RuleKind::Literal,
        }
    }

    pub fn regex(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
            kind: RuleKind::Regex,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Target {
    pub path: PathBuf,

    /// Overrides the manifest-wide marker for this file.
    #[serde(default)]
    pub marker: Option<String>,

    #[serde(default)]
    pub rules: Vec<Rule>,
}

/// Expands to one `Target` per matching file, e.g. `Tests/coreTests/*.swift`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TargetGlob {
    pub pattern: String,

    #[serde(default)]
    pub marker: Option<String>,

    #[serde(default)]
    pub rules: Vec<Rule>,
}

/// Result of a single operation on a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The file was (or in a dry run, would be) changed. Carries the number of edits.
    Modified(usize),
    AlreadyCurrent,
    FileNotFound,
}

impl Outcome {
    pub fn is_modified(&self) -> bool {
        matches!(self, Outcome::Modified(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Marker,
    Substitution,
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepKind::Marker => f.write_str("marker"),
            StepKind::Substitution => f.write_str("substitution"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    pub path: PathBuf,
    pub kind: StepKind,
    pub outcome: Outcome,
    pub backup: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    pub steps: Vec<StepReport>,
}

impl RunReport {
    pub fn modified(&self) -> usize {
        self.steps.iter().filter(|s| s.outcome.is_modified()).count()
    }

    pub fn already_current(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.outcome == Outcome::AlreadyCurrent)
            .count()
    }

    /// Distinct target paths that were absent during the run.
    pub fn missing_files(&self) -> Vec<&PathBuf> {
        let mut missing: Vec<&PathBuf> = Vec::new();
        for step in &self.steps {
            if step.outcome == Outcome::FileNotFound && !missing.contains(&&step.path) {
                missing.push(&step.path);
            }
        }
        missing
    }

    pub fn is_partial(&self) -> bool {
        !self.missing_files().is_empty()
    }
}
