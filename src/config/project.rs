use std::path::{Path, PathBuf};

use super::{validate_prefix, GenOptions};
use crate::diagnostic::Diagnostic;
use crate::span::Span;

pub const CONFIG_FILE: &str = "treeburg.toml";

/// Settings read from a treeburg.toml. Unset keys leave the defaults alone.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProjectConfig {
    pub path: PathBuf,
    pub prefix: Option<String>,
    pub trace: Option<bool>,
}

impl ProjectConfig {
    /// Load settings from a treeburg.toml file.
    pub fn load(toml_path: &Path) -> Result<ProjectConfig, Diagnostic> {
        let content = std::fs::read_to_string(toml_path).map_err(|e| {
            Diagnostic::error(
                format!("cannot read '{}': {}", toml_path.display(), e),
                Span::dummy(),
            )
        })?;
        Self::parse(&content, toml_path)
    }

    /// Section-aware minimal TOML reading; only `[generate]` is consulted.
    pub fn parse(content: &str, toml_path: &Path) -> Result<ProjectConfig, Diagnostic> {
        let mut config = ProjectConfig {
            path: toml_path.to_path_buf(),
            ..Default::default()
        };
        let mut current_section = String::new();

        for line in content.lines() {
            let trimmed = line.trim();
            if trimmed.starts_with('#') || trimmed.is_empty() {
                continue;
            }
            if trimmed.starts_with('[') && trimmed.ends_with(']') {
                current_section = trimmed[1..trimmed.len() - 1].trim().to_string();
                continue;
            }
            let Some((key, value)) = trimmed.split_once('=') else {
                continue;
            };
            if current_section != "generate" {
                continue;
            }
            let key = key.trim().trim_matches('"');
            let value = strip_comment(value.trim());
            match key {
                "prefix" => {
                    let prefix = value.trim_matches('"');
                    validate_prefix(prefix).map_err(|d| {
                        d.with_note(format!("in {}", toml_path.display()))
                    })?;
                    config.prefix = Some(prefix.to_string());
                }
                "trace" => {
                    config.trace = Some(match value {
                        "true" => true,
                        "false" => false,
                        other => {
                            return Err(Diagnostic::error(
                                format!("invalid value '{}' for 'trace' in {}", other, toml_path.display()),
                                Span::dummy(),
                            )
                            .with_help("expected `true` or `false`".to_string()))
                        }
                    });
                }
                _ => {}
            }
        }
        Ok(config)
    }

    /// Try to find a treeburg.toml in the given directory or its ancestors.
    pub fn find(start_dir: &Path) -> Option<PathBuf> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join(CONFIG_FILE);
            if candidate.exists() {
                return Some(candidate);
            }
            if !dir.pop() {
                return None;
            }
        }
    }

    /// Overlay these settings on `options`.
    pub fn apply(&self, options: &mut GenOptions) {
        if let Some(prefix) = &self.prefix {
            options.prefix = prefix.clone();
        }
        if let Some(trace) = self.trace {
            options.trace = trace;
        }
    }
}

/// Drop a trailing `# comment` outside of a quoted value.
fn strip_comment(value: &str) -> &str {
    if value.starts_with('"') {
        if let Some(end) = value[1..].find('"') {
            return &value[..end + 2];
        }
        return value;
    }
    match value.find('#') {
        Some(i) => value[..i].trim_end(),
        None => value,
    }
}
