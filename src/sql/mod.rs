//! The SQL pipeline: text → tokens → AST → plan resolved against a table
//! schema → per-row evaluation.

pub(crate) mod analyzer;
pub(crate) mod evaluator;
pub(crate) mod lexer;
pub(crate) mod parser;
