pub mod ast;
pub mod builtin;
pub mod lexer;
pub mod location;
pub mod parser;
pub mod scope;
pub mod token;
pub mod token_stream;
