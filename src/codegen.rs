//! Code generation: the C fragments the parser splices into the emitter.
//!
//! Everything here is pure string construction. The parser decides when each
//! fragment is emitted and into which buffer; this module only knows what C
//! text corresponds to each construct. All numeric values are `float`.

/// Header lines opening the translation unit and `main`.
pub const PREAMBLE: [&str; 2] = ["#include <stdio.h>", "int main(void) {"];

/// Body lines closing `main`.
pub const POSTAMBLE: [&str; 2] = ["return 0;", "}"];

/// Declaration of a program variable.
pub fn declare(name: &str) -> String {
  format!("float {name};")
}

/// Print a string literal followed by a newline. The lexer guarantees the
/// text holds no characters that would need escaping in a format string.
pub fn print_string(text: &str) -> String {
  format!("printf(\"{text}\\n\");")
}

/// Opening of a numeric print; the expression follows, then [`PRINT_NUMBER_CLOSE`].
pub const PRINT_NUMBER_OPEN: &str = "printf(\"%.2f\\n\", (float) (";
pub const PRINT_NUMBER_CLOSE: &str = "));";

pub const IF_OPEN: &str = "if (";
pub const WHILE_OPEN: &str = "while (";
pub const CONDITION_CLOSE: &str = ") {";
pub const BLOCK_CLOSE: &str = "}";

/// Jump target marker.
pub fn label(name: &str) -> String {
  format!("{name}:")
}

pub fn goto(name: &str) -> String {
  format!("goto {name};")
}

/// Left-hand side of an assignment; the expression and [`STATEMENT_END`] follow.
pub fn assign_open(name: &str) -> String {
  format!("{name} = ")
}

pub const STATEMENT_END: &str = ";";

/// Guarded read of a variable. A failed conversion zeroes the variable and
/// discards the offending input word.
pub fn input(name: &str) -> [String; 4] {
  [
    format!("if (0 == scanf(\"%f\", &{name})) {{"),
    format!("{name} = 0;"),
    "scanf(\"%*s\");".to_string(),
    BLOCK_CLOSE.to_string(),
  ]
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fragments() {
    assert_eq!(declare("a"), "float a;");
    assert_eq!(print_string("HELLO"), "printf(\"HELLO\\n\");");
    assert_eq!(label("top"), "top:");
    assert_eq!(goto("top"), "goto top;");
    assert_eq!(assign_open("n"), "n = ");
  }

  #[test]
  fn numeric_print_uses_two_decimals() {
    let line = format!("{PRINT_NUMBER_OPEN}a+1{PRINT_NUMBER_CLOSE}");
    assert_eq!(line, "printf(\"%.2f\\n\", (float) (a+1));");
  }

  #[test]
  fn input_is_guarded() {
    assert_eq!(
      input("n").join("\n"),
      "if (0 == scanf(\"%f\", &n)) {\nn = 0;\nscanf(\"%*s\");\n}"
    );
  }
}
