//! vexpr tokenizer: converts expression text into tokens, one at a time.

pub mod lexer;
pub mod token;

pub use lexer::{scan_number, FunctionTable, Tokenizer};
pub use token::{Operator, Token, LOWEST_PRECEDENCE, UNARY_PRECEDENCE};
