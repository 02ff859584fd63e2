//! Single-pass recursive-descent parser that emits C as it recognises input.
//!
//! There is no syntax tree: each grammar rule pushes its fragments into the
//! [`Emitter`] the moment it is recognised. The parser keeps a two-token
//! window (current and lookahead) over the [`Lexer`] and three symbol sets.
//! Variables must be declared by `LET` or `INPUT` before they are read;
//! labels may be jumped to before they are declared, so that check is
//! deferred until the whole program has been consumed.
//!
//! ```text
//! program    ::= {nl} {statement}
//! statement  ::= "PRINT" (expression | string) nl
//!              | "IF" comparison "THEN" nl {statement} "ENDIF" nl
//!              | "WHILE" comparison "REPEAT" nl {statement} "ENDWHILE" nl
//!              | "LABEL" ident nl
//!              | "GOTO" ident nl
//!              | "LET" ident "=" expression nl
//!              | "INPUT" ident nl
//! comparison ::= expression comp_op expression {comp_op expression}
//! expression ::= term {("+" | "-") term}
//! term       ::= unary {("*" | "/") unary}
//! unary      ::= ["+" | "-"] primary
//! primary    ::= number | ident
//! nl         ::= "\n"+
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt::Display;
use std::mem;

use tracing::{debug, info};

use crate::codegen;
use crate::emitter::Emitter;
use crate::error::{
  CompileResult, DuplicateLabelSnafu, InvalidStatementSnafu, UndeclaredLabelSnafu,
  UndeclaredVariableSnafu, UnexpectedTokenSnafu,
};
use crate::tokenizer::{Lexer, Token, TokenKind};

pub struct Parser {
  lexer: Lexer,
  emitter: Emitter,
  cur: Token,
  peek: Token,
  symbols: HashSet<String>,
  labels_declared: HashSet<String>,
  /// Label name to the offset of the first `GOTO` that named it.
  labels_gotoed: HashMap<String, usize>,
}

impl Parser {
  /// Take ownership of both collaborators and prime the lookahead window.
  pub fn new(mut lexer: Lexer, emitter: Emitter) -> CompileResult<Self> {
    let cur = lexer.next_token()?;
    let peek = lexer.next_token()?;
    Ok(Self {
      lexer,
      emitter,
      cur,
      peek,
      symbols: HashSet::new(),
      labels_declared: HashSet::new(),
      labels_gotoed: HashMap::new(),
    })
  }

  pub fn emitter(&self) -> &Emitter {
    &self.emitter
  }

  /// Hand back the staged output.
  pub fn into_emitter(self) -> Emitter {
    self.emitter
  }

  /// Consume the whole token stream, staging the translated program in the
  /// emitter. Returns the first error encountered.
  pub fn run_program(&mut self) -> CompileResult<()> {
    info!("parsing program");
    for line in codegen::PREAMBLE {
      self.emitter.header_line(line);
    }

    while self.check(TokenKind::Newline) {
      self.advance()?;
    }

    while !self.check(TokenKind::Eof) {
      self.statement()?;
    }

    for line in codegen::POSTAMBLE {
      self.emitter.emit_line(line);
    }

    self.check_labels()?;
    info!(
      variables = self.symbols.len(),
      labels = self.labels_declared.len(),
      "program parsed"
    );
    Ok(())
  }

  /// Every label named by a `GOTO` must have been declared somewhere. The
  /// earliest offending `GOTO` is reported.
  fn check_labels(&self) -> CompileResult<()> {
    let missing = self
      .labels_gotoed
      .iter()
      .filter(|(name, _)| !self.labels_declared.contains(*name))
      .min_by_key(|(_, loc)| **loc);

    match missing {
      Some((name, &loc)) => UndeclaredLabelSnafu {
        position: self.lexer.locate(loc),
        name: name.clone(),
      }
      .fail(),
      None => Ok(()),
    }
  }

  fn statement(&mut self) -> CompileResult<()> {
    debug!(kind = %self.cur.kind, loc = self.cur.loc, "statement");
    match self.cur.kind {
      TokenKind::Print => {
        self.advance()?;
        if self.check(TokenKind::String) {
          self
            .emitter
            .emit_line(&codegen::print_string(&self.cur.text));
          self.advance()?;
        } else {
          self.emitter.emit(codegen::PRINT_NUMBER_OPEN);
          self.expression()?;
          self.emitter.emit_line(codegen::PRINT_NUMBER_CLOSE);
        }
      }
      TokenKind::If => {
        self.advance()?;
        self.emitter.emit(codegen::IF_OPEN);
        self.comparison()?;
        self.skip(TokenKind::Then)?;
        self.nl()?;
        self.emitter.emit_line(codegen::CONDITION_CLOSE);
        self.block(TokenKind::EndIf)?;
      }
      TokenKind::While => {
        self.advance()?;
        self.emitter.emit(codegen::WHILE_OPEN);
        self.comparison()?;
        self.skip(TokenKind::Repeat)?;
        self.nl()?;
        self.emitter.emit_line(codegen::CONDITION_CLOSE);
        self.block(TokenKind::EndWhile)?;
      }
      TokenKind::Label => {
        self.advance()?;
        let (name, loc) = self.ident()?;
        if self.labels_declared.contains(&name) {
          return DuplicateLabelSnafu {
            position: self.lexer.locate(loc),
            name,
          }
          .fail();
        }
        self.emitter.emit_line(&codegen::label(&name));
        debug!(%name, "declared label");
        self.labels_declared.insert(name);
      }
      TokenKind::Goto => {
        self.advance()?;
        let (name, loc) = self.ident()?;
        self.emitter.emit_line(&codegen::goto(&name));
        self.labels_gotoed.entry(name).or_insert(loc);
      }
      TokenKind::Let => {
        self.advance()?;
        let (name, _) = self.ident()?;
        self.declare(&name);
        self.emitter.emit(&codegen::assign_open(&name));
        self.skip(TokenKind::Eq)?;
        self.expression()?;
        self.emitter.emit_line(codegen::STATEMENT_END);
      }
      TokenKind::Input => {
        self.advance()?;
        let (name, _) = self.ident()?;
        self.declare(&name);
        for line in codegen::input(&name) {
          self.emitter.emit_line(&line);
        }
      }
      _ => return self.invalid_statement(),
    }

    self.nl()
  }

  /// Statements up to and including the closing keyword of an `IF` or
  /// `WHILE` body.
  fn block(&mut self, end: TokenKind) -> CompileResult<()> {
    while !self.check(end) && !self.check(TokenKind::Eof) {
      self.statement()?;
    }
    self.skip(end)?;
    self.emitter.emit_line(codegen::BLOCK_CLOSE);
    Ok(())
  }

  /// First mention wins; later `LET`/`INPUT` of the same name add nothing to
  /// the header.
  fn declare(&mut self, name: &str) {
    if self.symbols.insert(name.to_string()) {
      self.emitter.header_line(&codegen::declare(name));
      debug!(%name, "declared variable");
    }
  }

  fn comparison(&mut self) -> CompileResult<()> {
    self.expression()?;
    if !self.cur.kind.is_comparison() {
      return self.unexpected("comparison operator");
    }
    while self.cur.kind.is_comparison() {
      self.emitter.emit(&self.cur.text);
      self.advance()?;
      self.expression()?;
    }
    Ok(())
  }

  fn expression(&mut self) -> CompileResult<()> {
    self.term()?;
    while self.check(TokenKind::Plus) || self.check(TokenKind::Minus) {
      self.emitter.emit(&self.cur.text);
      self.advance()?;
      self.term()?;
    }
    Ok(())
  }

  fn term(&mut self) -> CompileResult<()> {
    self.unary()?;
    while self.check(TokenKind::Asterisk) || self.check(TokenKind::Slash) {
      self.emitter.emit(&self.cur.text);
      self.advance()?;
      self.unary()?;
    }
    Ok(())
  }

  fn unary(&mut self) -> CompileResult<()> {
    if self.check(TokenKind::Plus) || self.check(TokenKind::Minus) {
      // Keep `a - -b` from coming out as the decrement `a--b`.
      if self.emitter.code_ends_with(&['+', '-']) {
        self.emitter.emit(" ");
      }
      self.emitter.emit(&self.cur.text);
      self.advance()?;
    }
    self.primary()
  }

  fn primary(&mut self) -> CompileResult<()> {
    match self.cur.kind {
      TokenKind::Number => {}
      TokenKind::Ident => {
        if !self.symbols.contains(&self.cur.text) {
          return UndeclaredVariableSnafu {
            position: self.lexer.locate(self.cur.loc),
            name: self.cur.text.clone(),
          }
          .fail();
        }
      }
      _ => return self.unexpected("number or identifier"),
    }
    self.emitter.emit(&self.cur.text);
    self.advance()
  }

  /// nl ::= '\n'+
  fn nl(&mut self) -> CompileResult<()> {
    self.skip(TokenKind::Newline)?;
    while self.check(TokenKind::Newline) {
      self.advance()?;
    }
    Ok(())
  }

  fn check(&self, kind: TokenKind) -> bool {
    self.cur.kind == kind
  }

  fn check_peek(&self, kind: TokenKind) -> bool {
    self.peek.kind == kind
  }

  /// Slide the window by one token.
  fn advance(&mut self) -> CompileResult<()> {
    let next = self.lexer.next_token()?;
    self.cur = mem::replace(&mut self.peek, next);
    Ok(())
  }

  /// Consume the current token if it has the expected kind.
  fn skip(&mut self, kind: TokenKind) -> CompileResult<()> {
    if !self.check(kind) {
      return self.unexpected(kind);
    }
    self.advance()
  }

  /// Consume an identifier, returning its text and offset.
  fn ident(&mut self) -> CompileResult<(String, usize)> {
    if !self.check(TokenKind::Ident) {
      return self.unexpected(TokenKind::Ident);
    }
    let name = self.cur.text.clone();
    let loc = self.cur.loc;
    self.advance()?;
    Ok((name, loc))
  }

  fn unexpected<T>(&self, expected: impl Display) -> CompileResult<T> {
    UnexpectedTokenSnafu {
      position: self.lexer.locate(self.cur.loc),
      expected: expected.to_string(),
      found: self.cur.describe(),
    }
    .fail()
  }

  fn invalid_statement<T>(&self) -> CompileResult<T> {
    let hint = if self.check(TokenKind::Ident) && self.check_peek(TokenKind::Eq) {
      format!(" (did you mean `LET {} = ...`?)", self.cur.text)
    } else {
      String::new()
    };
    InvalidStatementSnafu {
      position: self.lexer.locate(self.cur.loc),
      found: self.cur.describe(),
      hint,
    }
    .fail()
  }
}
