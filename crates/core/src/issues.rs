use std::collections::BTreeMap;

use hed_toolchain_diagnostics::{
    category_for_code, explain, message_template_for, severity_for_code,
};
use serde::Serialize;

use crate::grammar::diag::{Diagnostic, Severity, Span};

/// Build a diagnostic for a catalogue id, rendering the message template of
/// `variant` with the context values.
pub(crate) fn issue(
    id: &'static str,
    variant: &str,
    span: Option<Span>,
    context: BTreeMap<String, String>,
) -> Diagnostic {
    let message = render_diagnostic_message(id, variant, &context);
    Diagnostic::new(
        id,
        severity_for_code(id).unwrap_or(Severity::Error),
        message,
        span,
    )
    .with_context(context)
}

fn render_diagnostic_message(
    id: &'static str,
    variant: &str,
    context: &BTreeMap<String, String>,
) -> String {
    let Some(template) =
        message_template_for(id, variant).or_else(|| message_template_for(id, "default"))
    else {
        return explain(id).unwrap_or(id).to_string();
    };
    let mut rendered = String::with_capacity(template.len() + 16);
    let mut scan_from = 0usize;
    while let Some(open_rel) = template[scan_from..].find('{') {
        let open = scan_from + open_rel;
        rendered.push_str(&template[scan_from..open]);
        let after_open = open + 1;
        if let Some(close_rel) = template[after_open..].find('}') {
            let close = after_open + close_rel;
            let key = &template[after_open..close];
            match context.get(key) {
                Some(value) => rendered.push_str(value),
                None => rendered.push_str(&template[open..=close]),
            }
            scan_from = close + 1;
        } else {
            rendered.push_str(&template[open..]);
            return rendered;
        }
    }
    rendered.push_str(&template[scan_from..]);
    rendered
}

/// Issues found while parsing one HED string, split by stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsingIssues {
    /// Tokenizer issues. Any of these means there is no parse tree.
    pub syntax: Vec<Diagnostic>,
    /// Tag resolution issues. The tree is still built around them.
    pub conversion: Vec<Diagnostic>,
}

impl ParsingIssues {
    /// Sort diagnostics into the stage their id belongs to.
    pub fn from_diagnostics(diagnostics: impl IntoIterator<Item = Diagnostic>) -> Self {
        let mut issues = Self::default();
        for diagnostic in diagnostics {
            if category_for_code(&diagnostic.id) == Some("conversion") {
                issues.conversion.push(diagnostic);
            } else {
                issues.syntax.push(diagnostic);
            }
        }
        issues
    }

    /// Append the issues of `other`, stage by stage.
    pub fn merge(&mut self, other: ParsingIssues) {
        self.syntax.extend(other.syntax);
        self.conversion.extend(other.conversion);
    }

    /// All issues, syntax first.
    pub fn all(&self) -> impl Iterator<Item = &Diagnostic> {
        self.syntax.iter().chain(self.conversion.iter())
    }

    /// Whether no issue was found.
    pub fn is_empty(&self) -> bool {
        self.syntax.is_empty() && self.conversion.is_empty()
    }

    /// Whether any issue is an error.
    pub fn has_errors(&self) -> bool {
        self.all().any(Diagnostic::is_error)
    }
}
