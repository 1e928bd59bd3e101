use crate::error::ManifestError;
use crate::matcher::{is_valid_marker, Matcher};
use crate::operations::file_operations::DEFAULT_BACKUP_SUFFIX;
use crate::types::{Rule, Target, TargetGlob};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

fn default_backup_suffix() -> String {
    DEFAULT_BACKUP_SUFFIX.to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Manifest {
    /// Marker line ensured in every target that does not override it.
    #[serde(default)]
    pub marker: Option<String>,

    #[serde(default = "default_backup_suffix")]
    pub backup_suffix: String,

    #[serde(default)]
    pub targets: Vec<Target>,

    /// Consumed by `resolve`, which turns every match into a target.
    #[serde(default)]
    pub globs: Vec<TargetGlob>,
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            marker: None,
            backup_suffix: default_backup_suffix(),
            targets: Vec::new(),
            globs: Vec::new(),
        }
    }
}

impl Manifest {
    pub fn from_toml(content: &str) -> Result<Self, ManifestError> {
        let manifest: Manifest = toml::from_str(content)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Parses a manifest file, leaving target paths and globs as written.
    pub fn read(path: &Path) -> Result<Self, ManifestError> {
        let content = fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Loads a manifest and resolves it against the manifest's directory.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let mut manifest = Self::read(path)?;
        let dir = path.parent().unwrap_or_else(|| Path::new(""));
        manifest.resolve(dir)?;
        debug!(
            "Loaded manifest {:?} with {} target(s)",
            path,
            manifest.targets.len()
        );
        Ok(manifest)
    }

    /// Joins relative target paths onto `root`, then expands every glob
    /// (relative to `root` as well) into sorted file targets. Files already
    /// listed as explicit targets are not added twice.
    pub fn resolve(&mut self, root: &Path) -> Result<(), ManifestError> {
        for target in &mut self.targets {
            if target.path.is_relative() {
                target.path = root.join(&target.path);
            }
        }

        for target_glob in std::mem::take(&mut self.globs) {
            let pattern = root.join(&target_glob.pattern);
            let pattern = pattern.to_string_lossy();
            let entries = glob::glob(&pattern).map_err(|e| ManifestError::InvalidGlob {
                pattern: target_glob.pattern.clone(),
                reason: e.to_string(),
            })?;

            let mut matched: Vec<PathBuf> = entries
                .filter_map(|entry| match entry {
                    Ok(path) => Some(path),
                    Err(e) => {
                        warn!("Skipping unreadable glob entry: {}", e);
                        None
                    }
                })
                .filter(|path| path.is_file())
                .collect();
            matched.sort();

            if matched.is_empty() {
                warn!("Glob {:?} matched no files", target_glob.pattern);
            }
            debug!(
                "Glob {:?} matched {} file(s)",
                target_glob.pattern,
                matched.len()
            );

            for path in matched {
                if self.targets.iter().any(|t| t.path == path) {
                    continue;
                }
                self.targets.push(Target {
                    path,
                    marker: target_glob.marker.clone(),
                    rules: target_glob.rules.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn marker_for<'a>(&'a self, target: &'a Target) -> Option<&'a str> {
        target.marker.as_deref().or(self.marker.as_deref())
    }

    pub fn validate(&self) -> Result<(), ManifestError> {
        if self.targets.is_empty() && self.globs.is_empty() {
            return Err(ManifestError::NoTargets);
        }
        if self.backup_suffix.is_empty() {
            return Err(ManifestError::EmptyBackupSuffix);
        }

        for target in &self.targets {
            self.validate_entry(&target.path, target.marker.as_deref(), &target.rules)?;
        }
        for target_glob in &self.globs {
            glob::Pattern::new(&target_glob.pattern).map_err(|e| ManifestError::InvalidGlob {
                pattern: target_glob.pattern.clone(),
                reason: e.to_string(),
            })?;
            self.validate_entry(
                Path::new(&target_glob.pattern),
                target_glob.marker.as_deref(),
                &target_glob.rules,
            )?;
        }
        Ok(())
    }

    fn validate_entry(
        &self,
        path: &Path,
        marker: Option<&str>,
        rules: &[Rule],
    ) -> Result<(), ManifestError> {
        let marker = marker.or(self.marker.as_deref());
        if let Some(m) = marker {
            if !is_valid_marker(m) {
                return Err(ManifestError::InvalidMarker(path.to_path_buf()));
            }
        }
        if marker.is_none() && rules.is_empty() {
            return Err(ManifestError::EmptyTarget(path.to_path_buf()));
        }

        for (i, rule) in rules.iter().enumerate() {
            let invalid = |reason: String| ManifestError::InvalidRule {
                path: path.to_path_buf(),
                index: i + 1,
                reason,
            };
            if rule.pattern.is_empty() {
                return Err(invalid("pattern is empty".to_string()));
            }
            Matcher::compile(rule).map_err(|e| invalid(format!("{:#}", e)))?;
        }
        Ok(())
    }
}
