// Interaction script parser

pub mod lexer;
pub mod script;

// Public API re-exports
pub use script::{parse_script, ScriptError, Step};
