pub mod error;
pub mod manifest;
pub mod matcher;
pub mod operations;
pub mod runner;
pub mod types;

pub use error::{CodemodError, ManifestError};
pub use manifest::Manifest;
pub use operations::{ensure_marker_line, replace_return_type, run_preflight_checks, ApplyOptions};
pub use runner::{run, run_checked};
pub use types::{Outcome, Rule, RuleKind, RunReport, StepKind, StepReport, Target, TargetGlob};
