//! Crate root: wires together the compilation pipeline.
//!
//! Teeny compiles a small line-oriented teaching language (`PRINT`, `LET`,
//! `INPUT`, `IF`, `WHILE`, `LABEL`, `GOTO`) to C in a single pass:
//! - `tokenizer` turns source text into tokens on demand.
//! - `parser` recognises the grammar and emits C as it goes; there is no AST.
//! - `codegen` holds the C fragments for each construct.
//! - `emitter` stages header and body text until the parse has succeeded.
//! - `error` centralises the fatal error type shared by the other modules.

pub mod codegen;
pub mod emitter;
pub mod error;
pub mod parser;
pub mod tokenizer;

use std::fs;
use std::path::Path;

use snafu::ResultExt;
use tracing::info;

pub use emitter::Emitter;
pub use error::{CompileError, CompileResult, Location};
pub use parser::Parser;
pub use tokenizer::{Lexer, Token, TokenKind, tokenize};

/// Compile source text into the complete C translation unit.
pub fn compile(source: &str) -> CompileResult<String> {
  Ok(run(source)?.finish())
}

/// Read `input`, compile it, and write the result to `output`. The output
/// file is only touched once compilation has succeeded.
pub fn compile_file(input: &Path, output: &Path) -> CompileResult<()> {
  info!(input = %input.display(), "compiling");
  let source = read_source(input)?;
  run(&source)?.write_output(output)
}

/// Load a whole source file into memory.
pub fn read_source(path: &Path) -> CompileResult<String> {
  fs::read_to_string(path).context(error::ReadSourceSnafu { path })
}

fn run(source: &str) -> CompileResult<Emitter> {
  let mut parser = Parser::new(Lexer::new(source), Emitter::new())?;
  parser.run_program()?;
  Ok(parser.into_emitter())
}
