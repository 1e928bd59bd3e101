pub mod file_operations;
pub mod patch_applicator;
pub mod preflight_checks;

pub use patch_applicator::{apply_with_matcher, ensure_marker_line, replace_return_type, ApplyOptions};
pub use preflight_checks::{run_preflight_checks, PreflightSummary};
