use crate::error::{CodemodError, Result};
use crate::types::{Rule, RuleKind};
use regex::Regex;
use std::borrow::Cow;

/// A substitution rule ready to run against file content.
#[derive(Debug, Clone)]
pub enum Matcher {
    Literal { pattern: String, replacement: String },
    Regex { regex: Regex, replacement: String },
}

impl Matcher {
    pub fn compile(rule: &Rule) -> Result<Self> {
        match rule.kind {
            RuleKind::Literal => Ok(Matcher::Literal {
                pattern: rule.pattern.clone(),
                replacement: rule.replacement.clone(),
            }),
            RuleKind::Regex => {
                let regex = Regex::new(&rule.pattern).map_err(|source| CodemodError::Pattern {
                    pattern: rule.pattern.clone(),
                    source,
                })?;
                Ok(Matcher::Regex {
                    regex,
                    replacement: rule.replacement.clone(),
                })
            }
        }
    }

    pub fn count(&self, content: &str) -> usize {
        match self {
            Matcher::Literal { pattern, .. } if pattern.is_empty() => 0,
            Matcher::Literal { pattern, .. } => content.matches(pattern.as_str()).count(),
            Matcher::Regex { regex, .. } => regex.find_iter(content).count(),
        }
    }

    /// Replaces every occurrence; returns the new content and the number of replacements.
    pub fn replace_all<'a>(&self, content: &'a str) -> (Cow<'a, str>, usize) {
        let hits = self.count(content);
        if hits == 0 {
            return (Cow::Borrowed(content), 0);
        }

        let replaced = match self {
            Matcher::Literal {
                pattern,
                replacement,
            } => Cow::Owned(content.replace(pattern.as_str(), replacement)),
            Matcher::Regex { regex, replacement } => {
                regex.replace_all(content, replacement.as_str())
            }
        };
        (replaced, hits)
    }
}

/// Line terminator of the first line, `\n` when the content has none.
pub fn detect_line_ending(content: &str) -> &'static str {
    match content.split_inclusive('\n').next() {
        Some(line) if line.ends_with("\r\n") => "\r\n",
        _ => "\n",
    }
}

pub fn prepend_line(content: &str, line: &str) -> String {
    let eol = detect_line_ending(content);
    let mut out = String::with_capacity(line.len() + eol.len() + content.len());
    out.push_str(line);
    out.push_str(eol);
    out.push_str(content);
    out
}

/// A marker must be one line of visible text.
pub fn is_valid_marker(marker: &str) -> bool {
    !marker.trim().is_empty() && !marker.contains('\n') && !marker.contains('\r')
}
