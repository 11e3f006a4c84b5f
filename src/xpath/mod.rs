pub mod evaluator;
pub mod highlighter;
pub mod path;
