use std::fs;

use teeny::{CompileError, compile, compile_file};

const FIBONACCI: &str = "\
# Print the first n Fibonacci numbers.
PRINT \"How many fibonacci numbers do you want?\"
INPUT nums
PRINT \"\"

LET a = 0
LET b = 1
WHILE nums > 0 REPEAT
    PRINT a
    LET c = a + b
    LET a = b
    LET b = c
    LET nums = nums - 1
ENDWHILE
";

#[test]
fn fibonacci_program() {
  let out = compile(FIBONACCI).unwrap();
  let expected = "\
#include <stdio.h>
int main(void) {
float nums;
float a;
float b;
float c;
printf(\"How many fibonacci numbers do you want?\\n\");
if (0 == scanf(\"%f\", &nums)) {
nums = 0;
scanf(\"%*s\");
}
printf(\"\\n\");
a = 0;
b = 1;
while (nums>0) {
printf(\"%.2f\\n\", (float) (a));
c = a+b;
a = b;
b = c;
nums = nums-1;
}
return 0;
}

";
  assert_eq!(out, expected);
}

#[test]
fn goto_loop_with_backward_and_forward_jumps() {
  let source = "\
LET n = 0
LABEL top
LET n = n + 1
IF n >= 10 THEN
  GOTO done
ENDIF
GOTO top
LABEL done
PRINT n
";
  let out = compile(source).unwrap();
  assert!(out.contains("top:\nn = n+1;\nif (n>=10) {\ngoto done;\n}\ngoto top;\ndone:\n"));
}

#[test]
fn compile_file_writes_output() {
  let dir = tempfile::tempdir().unwrap();
  let input = dir.path().join("hello.teeny");
  let output = dir.path().join("out.c");
  fs::write(&input, "PRINT \"HELLO\"").unwrap();

  compile_file(&input, &output).unwrap();

  assert_eq!(
    fs::read_to_string(&output).unwrap(),
    "#include <stdio.h>\nint main(void) {\nprintf(\"HELLO\\n\");\nreturn 0;\n}\n\n"
  );
}

#[test]
fn failed_compilation_leaves_no_output() {
  let dir = tempfile::tempdir().unwrap();
  let input = dir.path().join("bad.teeny");
  let output = dir.path().join("out.c");
  fs::write(&input, "PRINT \"ok\"\nGOTO nowhere\n").unwrap();

  let err = compile_file(&input, &output).unwrap_err();

  assert!(matches!(err, CompileError::UndeclaredLabel { .. }));
  assert!(!output.exists());
}

#[test]
fn missing_input_file() {
  let dir = tempfile::tempdir().unwrap();
  let input = dir.path().join("absent.teeny");
  let output = dir.path().join("out.c");

  let err = compile_file(&input, &output).unwrap_err();

  assert!(matches!(err, CompileError::ReadSource { .. }));
  assert!(err.to_string().contains("absent.teeny"));
  assert!(!output.exists());
}

#[test]
fn first_error_wins() {
  // The undeclared variable on line 2 is reported, not the duplicate label
  // on line 3 or the missing label.
  let err = compile("GOTO nowhere\nPRINT x\nLABEL a\nLABEL a\n").unwrap_err();
  assert!(matches!(err, CompileError::UndeclaredVariable { .. }));
}

#[test]
fn error_categories() {
  assert!(compile("PRINT \"50%\"\n").unwrap_err().is_lex());
  assert!(compile("LET a = 1.\n").unwrap_err().is_lex());
  assert!(compile("IF 1 ! 2 THEN\nENDIF\n").unwrap_err().is_lex());
  assert!(!compile("LET 1 = 2\n").unwrap_err().is_lex());
  assert!(!compile("PRINT y\n").unwrap_err().is_lex());
}

#[test]
fn error_message_points_at_the_source() {
  let err = compile("LET a = 1\nPRINT a + b\n").unwrap_err();
  assert_eq!(
    err.to_string(),
    "parse error at line 2, column 11: referencing variable before assignment: b\n\
     PRINT a + b\n          ^"
  );
}
