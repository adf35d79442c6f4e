//! A two-pass relocating linker for the MARIE toy instruction format:
//! pass 1 builds the symbol table, pass 2 emits the relocated memory map.

pub mod linker;
pub mod tokenizer;

pub use linker::Linker;
pub use tokenizer::{ErrCode, ParseError, Token, Tokenizer};
