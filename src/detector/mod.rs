use crate::SuppressionKind;
use once_cell::sync::Lazy;
use regex::Regex;

static DIAGNOSTIC_SEVERITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"dotnet_diagnostic\..*\.severity").expect("static regex"));

/// Test an added diff line for a suppression directive.
///
/// Patterns are checked in priority order and the first match wins, so a line
/// carrying several markers is reported once, under the highest-priority kind.
/// Returns `None` for lines without any directive.
pub fn detect(line: &str) -> Option<SuppressionKind> {
    if line.contains("SuppressMessage(") {
        Some(SuppressionKind::AnnotationCall)
    } else if line.contains("#pragma warning disable") {
        Some(SuppressionKind::PragmaDisable)
    } else if line.contains("tslint:disable") {
        Some(SuppressionKind::LintDisableLegacy)
    } else if line.contains("eslint-disable") {
        Some(SuppressionKind::LintDisableModern)
    } else if line.contains("@ts-expect-error") {
        Some(SuppressionKind::TypeCheckExpectError)
    } else if line.contains("@ts-ignore") {
        Some(SuppressionKind::TypeCheckIgnore)
    } else if DIAGNOSTIC_SEVERITY.is_match(line) {
        Some(SuppressionKind::DiagnosticSeverity)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_each_directive_kind() {
        let cases = [
            (
                "+    [SuppressMessage(\"Maintainability\", \"S3776\")]",
                SuppressionKind::AnnotationCall,
            ),
            (
                "+#pragma warning disable CA1310",
                SuppressionKind::PragmaDisable,
            ),
            (
                "+// tslint:disable-next-line",
                SuppressionKind::LintDisableLegacy,
            ),
            (
                "+// eslint-disable-next-line no-console",
                SuppressionKind::LintDisableModern,
            ),
            (
                "+// @ts-expect-error upstream types are wrong",
                SuppressionKind::TypeCheckExpectError,
            ),
            ("+// @ts-ignore", SuppressionKind::TypeCheckIgnore),
            (
                "+dotnet_diagnostic.CA1310.severity = none",
                SuppressionKind::DiagnosticSeverity,
            ),
        ];

        for (line, expected) in cases {
            assert_eq!(detect(line), Some(expected), "line: {line}");
        }
    }

    #[test]
    fn plain_lines_do_not_match() {
        assert_eq!(detect("+let x = 1;"), None);
        assert_eq!(detect("+// a perfectly ordinary comment"), None);
        assert_eq!(detect(""), None);
    }

    #[test]
    fn first_match_wins_on_combined_lines() {
        // Both an eslint marker and a ts-ignore on one line: eslint-disable
        // is checked first.
        let line = "+// eslint-disable-next-line -- also @ts-ignore here";
        assert_eq!(detect(line), Some(SuppressionKind::LintDisableModern));
    }

    #[test]
    fn severity_override_requires_rule_segment() {
        // Needs both dots: dotnet_diagnostic.<rule>.severity
        assert_eq!(detect("+dotnet_diagnostic.severity = none"), None);
        assert_eq!(detect("+dotnet_diagnostic = none"), None);
    }
}
