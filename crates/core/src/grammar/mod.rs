/// Re-exports from the diagnostics crate.
pub mod diag;
/// Token tree types produced by the tokenizer.
pub mod spec;
/// HED string tokenizer.
pub mod tokenizer;

mod characters;
