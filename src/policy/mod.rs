use crate::PolicyDecision;
use crate::config::PolicyConfig;
use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File conventionally holding project-wide C# suppressions.
const GLOBAL_SUPPRESSIONS_FILE: &str = "GlobalSuppressions.cs";
/// Editor config file, where severity overrides conventionally live.
const EDITOR_CONFIG_FILE: &str = ".editorconfig";
/// Header token marking a file as produced by a code generator.
const GENERATED_MARKER: &str = "// <auto-generated";

/// Decides what to do about a detected suppression.
///
/// Holds the compiled ignore globs and allow-list regexes for the lifetime of
/// the run. Evaluation is pure classification: callers map the returned
/// [`PolicyDecision`] onto the report sink.
pub struct PolicyEvaluator {
    ignored: GlobSet,
    allowed_csharp: Regex,
    allowed_typescript: Regex,
    root: PathBuf,
}

impl PolicyEvaluator {
    /// Compile the evaluator from config. `root` is the working-tree
    /// directory that diff paths are resolved against.
    pub fn new(config: &PolicyConfig, root: &Path) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &config.ignored_paths {
            let glob = Glob::new(pattern)
                .with_context(|| format!("invalid ignore pattern '{pattern}'"))?;
            builder.add(glob);
        }
        let ignored = builder.build().context("unable to build ignore globs")?;

        Ok(Self {
            ignored,
            allowed_csharp: allow_list_regex(&config.allowed_csharp)?,
            allowed_typescript: allow_list_regex(&config.allowed_typescript)?,
            root: root.to_path_buf(),
        })
    }

    /// Classify one detected suppression.
    ///
    /// Checks run in order: ignore globs, exemption-file suffixes, the
    /// auto-generated marker in the file's current working-tree content, then
    /// allow-list membership of the matched line. The file read happens fresh
    /// on every call; a file that cannot be read is fatal to the run.
    pub fn evaluate(&self, filename: &str, line: &str) -> Result<PolicyDecision> {
        if self.ignored.is_match(filename) {
            debug!(filename, "file matches an ignored path");
            return Ok(PolicyDecision::SkippedIgnoredPath);
        }

        // Suppressions are expected in these files, but still worth a look.
        if filename.ends_with(GLOBAL_SUPPRESSIONS_FILE) || filename.ends_with(EDITOR_CONFIG_FILE) {
            debug!(filename, "suppression allowed in exemption file");
            return Ok(PolicyDecision::AllowedWithWarning);
        }

        let path = self.root.join(filename);
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("unable to read {}", path.display()))?;
        if content.contains(GENERATED_MARKER) {
            debug!(filename, "suppression allowed in auto-generated file");
            return Ok(PolicyDecision::AllowedSilent);
        }

        if self.allowed_csharp.is_match(line) || self.allowed_typescript.is_match(line) {
            Ok(PolicyDecision::AllowedWithWarning)
        } else {
            Ok(PolicyDecision::Disallowed)
        }
    }
}

/// Build a whole-token alternation over the allow-list.
///
/// Each token gets a `\b` anchor on each side that starts or ends with a word
/// character; tokens like `@typescript-eslint/naming-convention` begin with a
/// non-word character, where a leading `\b` could never match after
/// whitespace.
fn allow_list_regex(tokens: &[String]) -> Result<Regex> {
    let alternation = if tokens.is_empty() {
        // \b\B cannot both hold at one position, so an empty list matches
        // nothing rather than everything.
        r"\b\B".to_string()
    } else {
        tokens
            .iter()
            .map(|t| token_pattern(t))
            .collect::<Vec<_>>()
            .join("|")
    };

    Regex::new(&alternation).context("unable to build allow-list regex")
}

fn token_pattern(token: &str) -> String {
    let mut pattern = String::new();
    if token.chars().next().is_some_and(is_word) {
        pattern.push_str(r"\b");
    }
    pattern.push_str(&regex::escape(token));
    if token.chars().last().is_some_and(is_word) {
        pattern.push_str(r"\b");
    }
    pattern
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn evaluator_with(config: PolicyConfig, root: &Path) -> PolicyEvaluator {
        PolicyEvaluator::new(&config, root).unwrap()
    }

    fn default_evaluator(root: &Path) -> PolicyEvaluator {
        evaluator_with(PolicyConfig::default(), root)
    }

    #[test]
    fn ignored_path_skips_before_anything_else() {
        let dir = tempfile::tempdir().unwrap();
        let config = PolicyConfig {
            ignored_paths: vec!["generated/**".to_string()],
            ..PolicyConfig::default()
        };
        let evaluator = evaluator_with(config, dir.path());

        // No file on disk: the ignore check must short-circuit the read.
        let decision = evaluator
            .evaluate("generated/foo.cs", "+#pragma warning disable CA9999")
            .unwrap();
        assert_eq!(decision, PolicyDecision::SkippedIgnoredPath);
    }

    #[test]
    fn global_suppressions_file_warns_without_reading() {
        let dir = tempfile::tempdir().unwrap();
        let evaluator = default_evaluator(dir.path());

        let decision = evaluator
            .evaluate("src/GlobalSuppressions.cs", "+[SuppressMessage(\"X\", \"CA9999\")]")
            .unwrap();
        assert_eq!(decision, PolicyDecision::AllowedWithWarning);
    }

    #[test]
    fn editorconfig_warns_without_reading() {
        let dir = tempfile::tempdir().unwrap();
        let evaluator = default_evaluator(dir.path());

        let decision = evaluator
            .evaluate(".editorconfig", "+dotnet_diagnostic.CA9999.severity = none")
            .unwrap();
        assert_eq!(decision, PolicyDecision::AllowedWithWarning);
    }

    #[test]
    fn auto_generated_file_is_silently_exempt() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(
            dir.path().join("src/Gen.cs"),
            "// <auto-generated by a tool />\n#pragma warning disable CA9999\n",
        )
        .unwrap();
        let evaluator = default_evaluator(dir.path());

        // Exemption wins even for a line that would otherwise be disallowed.
        let decision = evaluator
            .evaluate("src/Gen.cs", "+#pragma warning disable CA9999")
            .unwrap();
        assert_eq!(decision, PolicyDecision::AllowedSilent);
    }

    #[test]
    fn allowed_token_warns() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Foo.cs"), "class Foo {}\n").unwrap();
        let evaluator = default_evaluator(dir.path());

        let decision = evaluator
            .evaluate("Foo.cs", "+    [SuppressMessage(\"Maintainability\", \"S3776\")]")
            .unwrap();
        assert_eq!(decision, PolicyDecision::AllowedWithWarning);
    }

    #[test]
    fn first_and_last_tokens_are_matchable() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Foo.cs"), "class Foo {}\n").unwrap();
        fs::write(dir.path().join("foo.ts"), "export {};\n").unwrap();
        let evaluator = default_evaluator(dir.path());

        assert_eq!(
            evaluator
                .evaluate("Foo.cs", "+#pragma warning disable CA1310")
                .unwrap(),
            PolicyDecision::AllowedWithWarning
        );
        assert_eq!(
            evaluator
                .evaluate("foo.ts", "+// eslint-disable-next-line max-lines")
                .unwrap(),
            PolicyDecision::AllowedWithWarning
        );
    }

    #[test]
    fn non_word_initial_token_matches_after_whitespace() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("foo.ts"), "export {};\n").unwrap();
        let evaluator = default_evaluator(dir.path());

        let decision = evaluator
            .evaluate(
                "foo.ts",
                "+// eslint-disable-next-line @typescript-eslint/naming-convention",
            )
            .unwrap();
        assert_eq!(decision, PolicyDecision::AllowedWithWarning);
    }

    #[test]
    fn token_does_not_match_inside_longer_identifier() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Foo.cs"), "class Foo {}\n").unwrap();
        let evaluator = default_evaluator(dir.path());

        let decision = evaluator
            .evaluate("Foo.cs", "+#pragma warning disable S3776X")
            .unwrap();
        assert_eq!(decision, PolicyDecision::Disallowed);
    }

    #[test]
    fn unknown_rule_is_disallowed() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Foo.cs"), "class Foo {}\n").unwrap();
        let evaluator = default_evaluator(dir.path());

        let decision = evaluator
            .evaluate("Foo.cs", "+#pragma warning disable CA9999")
            .unwrap();
        assert_eq!(decision, PolicyDecision::Disallowed);
    }

    #[test]
    fn unreadable_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let evaluator = default_evaluator(dir.path());

        let result = evaluator.evaluate("missing.cs", "+#pragma warning disable CA9999");
        assert!(result.is_err());
    }

    #[test]
    fn empty_allow_list_matches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Foo.cs"), "class Foo {}\n").unwrap();
        let config = PolicyConfig {
            allowed_csharp: Vec::new(),
            allowed_typescript: Vec::new(),
            ..PolicyConfig::default()
        };
        let evaluator = evaluator_with(config, dir.path());

        let decision = evaluator
            .evaluate("Foo.cs", "+#pragma warning disable S3776")
            .unwrap();
        assert_eq!(decision, PolicyDecision::Disallowed);
    }
}
