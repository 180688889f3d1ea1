//! Issue rendering for the `hed` binary.
//!
//! Pretty mode draws each issue as an ariadne [`Report`] under the HED string
//! it was found in. JSON mode is handled by the commands themselves, which
//! nest issues under the string they belong to.

use std::io::{self, IsTerminal};

use ariadne::{Color, Config, Fmt, Label, Report, ReportKind, Source};
use hed_toolchain_diagnostics::{Diagnostic, Severity};

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Format {
    /// Coloured, source-annotated output (ariadne).
    Pretty,
    /// Machine-readable JSON.
    Json,
}

impl Format {
    /// Use the explicit `--output` value, or detect from stdout.
    pub(crate) fn resolve_or_detect(explicit: Option<&str>) -> Self {
        match explicit {
            Some("json") => Format::Json,
            Some("pretty") => Format::Pretty,
            _ if io::stdout().is_terminal() => Format::Pretty,
            _ => Format::Json,
        }
    }
}

fn report_kind(severity: Severity) -> ReportKind<'static> {
    match severity {
        Severity::Error => ReportKind::Error,
        Severity::Info => ReportKind::Advice,
        _ => ReportKind::Warning,
    }
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Error => Color::Red,
        Severity::Warn => Color::Yellow,
        Severity::Info => Color::Blue,
        _ => Color::White,
    }
}

// Context keys already visible in the drawing.
const DRAWN_KEYS: &[&str] = &["index", "string"];

/// Draw the issues of one HED string to stderr.
///
/// `origin` names the string in report headers (`<string>:1`, `events.tsv:12`).
pub(crate) fn render_issues(hed_string: &str, origin: &str, issues: &[Diagnostic]) {
    if issues.is_empty() {
        return;
    }
    let config = Config::default().with_compact(false);
    let mut cache = (origin, Source::from(hed_string));

    for issue in issues {
        let Some(span) = issue.span else {
            eprintln!("{}[{}]: {}", issue.severity, issue.id, issue.message);
            eprintln!("  = help: {}", help_text(issue));
            continue;
        };
        let start = span.start.min(hed_string.len());
        let end = span.end.min(hed_string.len()).max(start);

        let mut report = Report::build(report_kind(issue.severity), (origin, start..end))
            .with_code(issue.id.as_ref())
            .with_message(&issue.message)
            .with_config(config)
            .with_label(
                Label::new((origin, start..end))
                    .with_message(label_text(issue))
                    .with_color(severity_color(issue.severity)),
            )
            .with_help(help_text(issue));
        if let Some(note) = context_note(issue) {
            report = report.with_note(note);
        }
        report.finish().eprint(&mut cache).ok();
    }
}

/// Label under the span: the offending tag or character when known.
fn label_text(issue: &Diagnostic) -> String {
    match (issue.context_value("tag"), issue.context_value("character")) {
        (_, Some(character)) => format!("invalid character {character}"),
        (Some(tag), None) => format!("in tag \"{tag}\""),
        (None, None) => issue.message.clone(),
    }
}

/// Explanation of the issue code, tagged with its HED error code.
fn help_text(issue: &Diagnostic) -> String {
    let explanation = issue.explain().unwrap_or("no explanation available");
    match issue.hed_code() {
        Some(code) => format!("[{code}] {explanation}"),
        None => explanation.to_string(),
    }
}

fn context_note(issue: &Diagnostic) -> Option<String> {
    let pairs: Vec<String> = issue
        .context
        .as_ref()?
        .iter()
        .filter(|(key, _)| !DRAWN_KEYS.contains(&key.as_str()))
        .map(|(key, value)| format!("{key}={value}"))
        .collect();
    (!pairs.is_empty()).then(|| pairs.join(", "))
}

/// Print issue counts to stderr, e.g. `2 errors, 1 warning in 3 HED strings`.
pub(crate) fn print_summary(issues: &[Diagnostic], strings: usize) {
    let errors = issues.iter().filter(|d| d.is_error()).count();
    let warnings = issues.len() - errors;
    if issues.is_empty() {
        eprintln!(
            "{}: {strings} HED string(s) checked",
            "ok".fg(Color::Green)
        );
        return;
    }

    let plural = |n: usize| if n == 1 { "" } else { "s" };
    let mut parts = Vec::new();
    if errors > 0 {
        parts.push(format!("{}", format!("{errors} error{}", plural(errors)).fg(Color::Red)));
    }
    if warnings > 0 {
        parts.push(format!(
            "{}",
            format!("{warnings} warning{}", plural(warnings)).fg(Color::Yellow)
        ));
    }
    eprintln!("{} in {strings} HED string(s)", parts.join(", "));
}
