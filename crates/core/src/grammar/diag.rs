pub use hed_toolchain_diagnostics::{Diagnostic, Severity, Span, codes};
