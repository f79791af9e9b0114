pub mod ast;
pub mod builder;
pub mod builtins;
pub mod doc;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod render;
pub mod script;
pub mod source;
pub mod trace;
pub mod value;
pub mod visit;
