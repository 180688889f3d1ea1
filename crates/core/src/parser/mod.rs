/// `{column}` placeholders in the parsed tree.
pub mod column_splice;
/// Tag path resolution against a HED-3 tag hierarchy.
pub mod converter;
/// Parsed groups and the node type of the tree.
pub mod group;
/// Whole-string parse result.
pub mod parsed_string;
/// Parsed tags.
pub mod parsed_tag;
/// Tokenizer output to parse tree.
pub mod splitter;
