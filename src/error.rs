//! Shared error utilities used across the compilation pipeline.
//!
//! Every failure is fatal for the run, so there is exactly one error type and
//! the first error produced is the one the caller sees. Source-anchored
//! variants carry a [`Location`] that renders the offending line with a caret
//! under the column.

use std::fmt;
use std::io;
use std::path::PathBuf;

use snafu::Snafu;

pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CompileError {
  #[snafu(display("lexing error at {position}: {message}\n{}", position.excerpt()))]
  Lex { position: Location, message: String },

  #[snafu(display(
    "parse error at {position}: expected {expected}, got {found}\n{}",
    position.excerpt()
  ))]
  UnexpectedToken {
    position: Location,
    expected: String,
    found: String,
  },

  #[snafu(display(
    "parse error at {position}: invalid statement at {found}{hint}\n{}",
    position.excerpt()
  ))]
  InvalidStatement {
    position: Location,
    found: String,
    hint: String,
  },

  #[snafu(display(
    "parse error at {position}: referencing variable before assignment: {name}\n{}",
    position.excerpt()
  ))]
  UndeclaredVariable { position: Location, name: String },

  #[snafu(display(
    "parse error at {position}: label already exists: {name}\n{}",
    position.excerpt()
  ))]
  DuplicateLabel { position: Location, name: String },

  #[snafu(display(
    "parse error at {position}: attempting to GOTO undeclared label: {name}\n{}",
    position.excerpt()
  ))]
  UndeclaredLabel { position: Location, name: String },

  #[snafu(display("failed to read source file {}: {source}", path.display()))]
  ReadSource { path: PathBuf, source: io::Error },

  #[snafu(display("failed to write output file {}: {source}", path.display()))]
  WriteOutput { path: PathBuf, source: io::Error },
}

impl CompileError {
  /// True for malformed character sequences, false for every parse, semantic
  /// and I/O failure.
  pub fn is_lex(&self) -> bool {
    matches!(self, Self::Lex { .. })
  }

  /// Where in the source the error was detected, if it is source-anchored.
  pub fn position(&self) -> Option<&Location> {
    match self {
      Self::Lex { position, .. }
      | Self::UnexpectedToken { position, .. }
      | Self::InvalidStatement { position, .. }
      | Self::UndeclaredVariable { position, .. }
      | Self::DuplicateLabel { position, .. }
      | Self::UndeclaredLabel { position, .. } => Some(position),
      Self::ReadSource { .. } | Self::WriteOutput { .. } => None,
    }
  }
}

/// A resolved source position: 1-based line and column plus the text of the
/// line it falls on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
  pub line: usize,
  pub column: usize,
  line_text: String,
}

impl Location {
  /// Resolve a character offset into the source. Offsets past the end are
  /// clamped to the end of input.
  pub fn locate(source: &[char], loc: usize) -> Self {
    let safe_loc = loc.min(source.len());
    let line_start = source[..safe_loc]
      .iter()
      .rposition(|&c| c == '\n')
      .map_or(0, |i| i + 1);
    let line_end = source[safe_loc..]
      .iter()
      .position(|&c| c == '\n')
      .map_or(source.len(), |i| safe_loc + i);
    let line = source[..line_start].iter().filter(|&&c| c == '\n').count() + 1;

    Self {
      line,
      column: safe_loc - line_start + 1,
      line_text: source[line_start..line_end].iter().collect(),
    }
  }

  /// The offending line followed by a caret marker under the column.
  pub fn excerpt(&self) -> String {
    let marker = format!("{}^", " ".repeat(self.column - 1));
    format!("{}\n{marker}", self.line_text)
  }
}

impl fmt::Display for Location {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "line {}, column {}", self.line, self.column)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn chars(s: &str) -> Vec<char> {
    s.chars().collect()
  }

  #[test]
  fn locate_first_line() {
    let src = chars("LET a = 1\n");
    let position = Location::locate(&src, 4);
    assert_eq!(position.line, 1);
    assert_eq!(position.column, 5);
    assert_eq!(position.excerpt(), "LET a = 1\n    ^");
  }

  #[test]
  fn locate_later_line() {
    let src = chars("PRINT 1\nPRINT b\nPRINT 3\n");
    let position = Location::locate(&src, 14);
    assert_eq!(position.line, 2);
    assert_eq!(position.column, 7);
    assert_eq!(position.excerpt(), "PRINT b\n      ^");
  }

  #[test]
  fn locate_on_newline_stays_on_its_line() {
    let src = chars("GOTO\nX\n");
    let position = Location::locate(&src, 4);
    assert_eq!(position.line, 1);
    assert_eq!(position.column, 5);
  }

  #[test]
  fn locate_past_end_is_clamped() {
    let src = chars("PRINT 1\n");
    let position = Location::locate(&src, 100);
    assert_eq!(position.line, 2);
    assert_eq!(position.column, 1);
    assert_eq!(position.excerpt(), "\n^");
  }

  #[test]
  fn display_mentions_line_and_column() {
    let error = CompileError::DuplicateLabel {
      position: Location::locate(&chars("LABEL x\nLABEL x\n"), 14),
      name: "x".to_string(),
    };
    let rendered = error.to_string();
    assert!(rendered.starts_with("parse error at line 2, column 7: label already exists: x"));
    assert!(rendered.ends_with("LABEL x\n      ^"));
    assert!(!error.is_lex());
  }
}
