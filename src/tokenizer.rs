//! Lexical analysis: turns the raw source text into tokens, one call at a time.
//!
//! The lexer works with a single character of lookahead. Newlines are
//! significant (they terminate statements); spaces, tabs, carriage returns and
//! `#` comments are skipped. Two-character comparison operators are matched
//! by peeking before falling back to their one-character forms.

use std::fmt;

use tracing::trace;

use crate::error::{CompileResult, LexSnafu, Location};

/// Sentinel returned once the read position runs past the source.
const EOF_CHAR: char = '\0';

/// Characters a string literal may not contain, so that its text can be
/// spliced directly into a C format string.
const ILLEGAL_IN_STRING: [char; 5] = ['\r', '\n', '\t', '\\', '%'];

/// The closed set of token kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
  Eof,
  Newline,
  Number,
  Ident,
  String,
  // Keywords.
  Label,
  Goto,
  Print,
  Input,
  Let,
  If,
  Then,
  EndIf,
  While,
  Repeat,
  EndWhile,
  // Operators.
  Eq,
  Plus,
  Minus,
  Asterisk,
  Slash,
  EqEq,
  NotEq,
  Lt,
  LtEq,
  Gt,
  GtEq,
}

/// Keyword subrange used for the reverse text-to-kind lookup.
const KEYWORDS: [TokenKind; 11] = [
  TokenKind::Label,
  TokenKind::Goto,
  TokenKind::Print,
  TokenKind::Input,
  TokenKind::Let,
  TokenKind::If,
  TokenKind::Then,
  TokenKind::EndIf,
  TokenKind::While,
  TokenKind::Repeat,
  TokenKind::EndWhile,
];

impl TokenKind {
  /// Static display text. Keywords and operators display as their source
  /// spelling.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Eof => "EOF",
      Self::Newline => "NEWLINE",
      Self::Number => "NUMBER",
      Self::Ident => "IDENT",
      Self::String => "STRING",
      Self::Label => "LABEL",
      Self::Goto => "GOTO",
      Self::Print => "PRINT",
      Self::Input => "INPUT",
      Self::Let => "LET",
      Self::If => "IF",
      Self::Then => "THEN",
      Self::EndIf => "ENDIF",
      Self::While => "WHILE",
      Self::Repeat => "REPEAT",
      Self::EndWhile => "ENDWHILE",
      Self::Eq => "=",
      Self::Plus => "+",
      Self::Minus => "-",
      Self::Asterisk => "*",
      Self::Slash => "/",
      Self::EqEq => "==",
      Self::NotEq => "!=",
      Self::Lt => "<",
      Self::LtEq => "<=",
      Self::Gt => ">",
      Self::GtEq => ">=",
    }
  }

  /// Exact, case-sensitive keyword lookup. Returns `None` for anything that
  /// is not one of the eleven reserved words.
  pub fn keyword(text: &str) -> Option<Self> {
    KEYWORDS.into_iter().find(|kind| kind.as_str() == text)
  }

  pub fn is_keyword(self) -> bool {
    KEYWORDS.contains(&self)
  }

  pub fn is_comparison(self) -> bool {
    matches!(
      self,
      Self::EqEq | Self::NotEq | Self::Lt | Self::LtEq | Self::Gt | Self::GtEq
    )
  }
}

impl fmt::Display for TokenKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A classified slice of source text. `loc` is the character offset of the
/// token's first character and is only used for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
  pub kind: TokenKind,
  pub text: String,
  pub loc: usize,
}

impl Token {
  pub fn new(kind: TokenKind, text: impl Into<String>, loc: usize) -> Self {
    Self {
      kind,
      text: text.into(),
      loc,
    }
  }

  /// Decimal value of a NUMBER token.
  pub fn number_value(&self) -> Option<f64> {
    match self.kind {
      TokenKind::Number => self.text.parse().ok(),
      _ => None,
    }
  }

  /// Human-friendly description used in diagnostics.
  pub fn describe(&self) -> String {
    match self.kind {
      TokenKind::Eof | TokenKind::Newline => self.kind.to_string(),
      TokenKind::String => format!("\"{}\" ({})", self.text, self.kind),
      _ => format!("'{}' ({})", self.text, self.kind),
    }
  }
}

/// Pull-based tokenizer over an owned copy of the source.
pub struct Lexer {
  source: Vec<char>,
  pos: usize,
  cur: char,
}

impl Lexer {
  /// Take a copy of the source with one trailing newline appended so that
  /// the last statement is always terminated.
  pub fn new(source: &str) -> Self {
    let mut chars: Vec<char> = source.chars().collect();
    chars.push('\n');
    let cur = chars.first().copied().unwrap_or(EOF_CHAR);
    Self {
      source: chars,
      pos: 0,
      cur,
    }
  }

  /// The source as lexed, trailing newline included.
  pub fn source(&self) -> &[char] {
    &self.source
  }

  /// Resolve a character offset for diagnostics.
  pub fn locate(&self, loc: usize) -> Location {
    Location::locate(&self.source, loc)
  }

  /// Recognise and return the next token. Once the input is exhausted every
  /// further call returns an `Eof` token.
  pub fn next_token(&mut self) -> CompileResult<Token> {
    self.skip_whitespace();
    self.skip_comment();

    let start = self.pos;
    let token = match self.cur {
      '+' => Token::new(TokenKind::Plus, "+", start),
      '-' => Token::new(TokenKind::Minus, "-", start),
      '*' => Token::new(TokenKind::Asterisk, "*", start),
      '/' => Token::new(TokenKind::Slash, "/", start),
      '=' => self.one_or_two(TokenKind::Eq, TokenKind::EqEq),
      '<' => self.one_or_two(TokenKind::Lt, TokenKind::LtEq),
      '>' => self.one_or_two(TokenKind::Gt, TokenKind::GtEq),
      '!' => {
        if self.peek() != '=' {
          return self.fail(start, format!("expected !=, got !{}", self.peek().escape_debug()));
        }
        self.advance();
        Token::new(TokenKind::NotEq, "!=", start)
      }
      '"' => self.string()?,
      c if c.is_ascii_digit() => self.number()?,
      c if c.is_ascii_alphabetic() => self.ident(),
      '\n' => Token::new(TokenKind::Newline, "\n", start),
      _ if self.at_end() => return Ok(Token::new(TokenKind::Eof, "", self.source.len())),
      c => return self.fail(start, format!("unknown token: {}", c.escape_debug())),
    };

    self.advance();
    trace!(kind = %token.kind, text = %token.text.escape_debug(), loc = token.loc, "token");
    Ok(token)
  }

  fn at_end(&self) -> bool {
    self.pos >= self.source.len()
  }

  fn advance(&mut self) {
    if !self.at_end() {
      self.pos += 1;
    }
    self.cur = self.source.get(self.pos).copied().unwrap_or(EOF_CHAR);
  }

  fn peek(&self) -> char {
    self.source.get(self.pos + 1).copied().unwrap_or(EOF_CHAR)
  }

  fn skip_whitespace(&mut self) {
    while matches!(self.cur, ' ' | '\t' | '\r') {
      self.advance();
    }
  }

  fn skip_comment(&mut self) {
    if self.cur == '#' {
      while self.cur != '\n' && !self.at_end() {
        self.advance();
      }
    }
  }

  /// Combine with a following `=` into the two-character operator.
  fn one_or_two(&mut self, single: TokenKind, double: TokenKind) -> Token {
    let start = self.pos;
    if self.peek() == '=' {
      self.advance();
      Token::new(double, double.as_str(), start)
    } else {
      Token::new(single, single.as_str(), start)
    }
  }

  /// Leaves `cur` on the closing quote.
  fn string(&mut self) -> CompileResult<Token> {
    let quote = self.pos;
    self.advance();
    let start = self.pos;
    while self.cur != '"' {
      if self.at_end() {
        return self.fail(quote, "unterminated string");
      }
      if ILLEGAL_IN_STRING.contains(&self.cur) {
        return self.fail(
          self.pos,
          format!("illegal character in string: {}", self.cur.escape_debug()),
        );
      }
      self.advance();
    }
    Ok(Token::new(TokenKind::String, self.slice(start, self.pos), quote))
  }

  /// Leaves `cur` on the last digit.
  fn number(&mut self) -> CompileResult<Token> {
    let start = self.pos;
    while self.peek().is_ascii_digit() {
      self.advance();
    }
    if self.peek() == '.' {
      self.advance();
      if !self.peek().is_ascii_digit() {
        return self.fail(self.pos, "illegal character in number");
      }
      while self.peek().is_ascii_digit() {
        self.advance();
      }
    }
    Ok(Token::new(TokenKind::Number, self.slice(start, self.pos + 1), start))
  }

  /// Leaves `cur` on the last character of the identifier.
  fn ident(&mut self) -> Token {
    let start = self.pos;
    while self.peek().is_ascii_alphanumeric() {
      self.advance();
    }
    let text = self.slice(start, self.pos + 1);
    let kind = TokenKind::keyword(&text).unwrap_or(TokenKind::Ident);
    Token::new(kind, text, start)
  }

  fn slice(&self, start: usize, end: usize) -> String {
    self.source[start..end].iter().collect()
  }

  fn fail<T>(&self, loc: usize, message: impl Into<String>) -> CompileResult<T> {
    LexSnafu {
      position: self.locate(loc),
      message: message.into(),
    }
    .fail()
  }
}

/// Drain a lexer over `source` into a vector terminated by the `Eof` token.
pub fn tokenize(source: &str) -> CompileResult<Vec<Token>> {
  let mut lexer = Lexer::new(source);
  let mut tokens = Vec::new();
  loop {
    let token = lexer.next_token()?;
    let done = token.kind == TokenKind::Eof;
    tokens.push(token);
    if done {
      return Ok(tokens);
    }
  }
}
