pub mod common;
// Assertion engine tests - tokenizer, compiler, evaluator, windows and sets
pub mod assertions;
// Configuration lookup tests
pub mod config;
// Project discovery and results directory tests
pub mod project;
// Sample history and topology loading tests
pub mod samples;
