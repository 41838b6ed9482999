use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Allow-lists and path exemptions consulted by the policy evaluator.
///
/// The defaults carry the built-in rule lists; a TOML file passed via
/// `--config` overrides any field it names. Loaded once at startup and
/// immutable for the rest of the run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyConfig {
    /// C# analyzer rules whose suppression is tolerated (with a warning).
    pub allowed_csharp: Vec<String>,
    /// TypeScript lint rules whose suppression is tolerated (with a warning).
    pub allowed_typescript: Vec<String>,
    /// Glob patterns for paths whose suppressions are never reported.
    pub ignored_paths: Vec<String>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            allowed_csharp: [
                "CA1310", "S107", "S134", "S138", "S1067", "S1192", "S1200", "S1821", "S3240",
                "S3776", "S4040", "S4462",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            allowed_typescript: [
                "@typescript-eslint/naming-convention",
                "complexity",
                "no-console",
                "no-floating-promises",
                "no-param-reassign",
                "no-unnecessary-condition",
                "react/jsx-props-no-spreading",
                "react/no-array-index-key",
                "react/no-unused-prop-types",
                "react-hooks/exhaustive-deps",
                "max-lines",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            ignored_paths: Vec::new(),
        }
    }
}

impl PolicyConfig {
    /// Load a config file, falling back to defaults for absent fields.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("unable to read config file {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("unable to parse config file {}", path.display()))
    }

    /// Append ignore globs supplied on the command line after the file's own.
    pub fn with_extra_ignores(mut self, extra: &[String]) -> Self {
        self.ignored_paths.extend(extra.iter().cloned());
        self
    }
}
