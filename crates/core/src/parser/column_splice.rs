use std::fmt;

use serde::Serialize;

use crate::grammar::diag::Span;
use crate::grammar::spec::ColumnSpliceSpec;

/// A `{column}` placeholder, filled in from another column of a tabular
/// file before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedHedColumnSplice {
    column_name: String,
    span: Span,
}

impl ParsedHedColumnSplice {
    /// Splice for a tokenized `{column}`.
    pub fn new(spec: &ColumnSpliceSpec) -> Self {
        Self {
            column_name: spec.column_name.clone(),
            span: spec.span,
        }
    }

    /// Name between the braces, trimmed.
    pub fn column_name(&self) -> &str {
        &self.column_name
    }

    /// Span including both braces.
    pub fn span(&self) -> Span {
        self.span
    }

    /// `{name}`.
    pub fn format(&self) -> String {
        format!("{{{}}}", self.column_name)
    }
}

impl fmt::Display for ParsedHedColumnSplice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.column_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_braces() {
        let splice = ParsedHedColumnSplice::new(&ColumnSpliceSpec {
            column_name: "response".into(),
            span: Span::new(4, 16),
        });
        assert_eq!(splice.format(), "{response}");
        assert_eq!(splice.to_string(), "{response}");
        assert_eq!(splice.span(), Span::new(4, 16));
    }
}
