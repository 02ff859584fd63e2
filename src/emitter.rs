//! Output staging: two append-only buffers merged once at the end.
//!
//! The header buffer receives the preamble and variable declarations, the
//! body buffer receives executable statements. Nothing touches storage until
//! [`Emitter::write_output`] is called after a successful parse.

use std::fs;
use std::path::Path;

use snafu::ResultExt;
use tracing::info;

use crate::error::{CompileResult, WriteOutputSnafu};

#[derive(Debug, Default)]
pub struct Emitter {
  header: String,
  code: String,
}

impl Emitter {
  pub fn new() -> Self {
    Self::default()
  }

  /// Append verbatim to the body.
  pub fn emit(&mut self, code: &str) {
    self.code.push_str(code);
  }

  /// Append a full line to the body.
  pub fn emit_line(&mut self, code: &str) {
    self.code.push_str(code);
    self.code.push('\n');
  }

  /// Append a full line to the header.
  pub fn header_line(&mut self, code: &str) {
    self.header.push_str(code);
    self.header.push('\n');
  }

  /// Whether the body currently ends with one of `chars`.
  pub fn code_ends_with(&self, chars: &[char]) -> bool {
    self.code.ends_with(chars)
  }

  pub fn header(&self) -> &str {
    &self.header
  }

  pub fn code(&self) -> &str {
    &self.code
  }

  /// Header followed by body, plus the final line terminator.
  pub fn finish(&self) -> String {
    let mut out = String::with_capacity(self.header.len() + self.code.len() + 1);
    out.push_str(&self.header);
    out.push_str(&self.code);
    out.push('\n');
    out
  }

  /// Truncate or create `path` and write the staged output in one go.
  pub fn write_output(&self, path: &Path) -> CompileResult<()> {
    let out = self.finish();
    fs::write(path, &out).context(WriteOutputSnafu { path })?;
    info!(path = %path.display(), bytes = out.len(), "wrote output");
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn header_precedes_body_regardless_of_call_order() {
    let mut emitter = Emitter::new();
    emitter.emit("x = ");
    emitter.header_line("#include <stdio.h>");
    emitter.emit_line("1;");
    emitter.header_line("float x;");
    assert_eq!(emitter.finish(), "#include <stdio.h>\nfloat x;\nx = 1;\n\n");
  }

  #[test]
  fn empty_emitter_is_a_single_newline() {
    assert_eq!(Emitter::new().finish(), "\n");
  }

  #[test]
  fn tail_check() {
    let mut emitter = Emitter::new();
    assert!(!emitter.code_ends_with(&['-']));
    emitter.emit("a-");
    assert!(emitter.code_ends_with(&['+', '-']));
    emitter.header_line("b+");
    assert!(emitter.code_ends_with(&['-']));
  }

  #[test]
  fn write_output_writes_finish() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.c");
    std::fs::write(&path, "stale contents that are much longer than the output").unwrap();

    let mut emitter = Emitter::new();
    emitter.header_line("H");
    emitter.emit_line("B");
    emitter.write_output(&path).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "H\nB\n\n");
  }

  #[test]
  fn write_output_reports_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("out.c");
    let err = Emitter::new().write_output(&path).unwrap_err();
    assert!(matches!(err, crate::error::CompileError::WriteOutput { .. }));
    assert!(err.to_string().contains("out.c"));
  }
}
