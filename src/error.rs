use std::ops::Range;
use grammar::{GrammarError, LexError, LexerError, RegexError};
use lr::StateId;
use thiserror::Error;

/// Everything that can go wrong in `Configurator::create_parser`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructionError {
  #[error("invalid pattern `{pattern}`: {error}")]
  InvalidPattern {
    pattern: String,
    #[source]
    error: RegexError,
  },
  #[error(transparent)]
  Lexer(#[from] LexerError),
  #[error(transparent)]
  Grammar(#[from] GrammarError),
  #[error(transparent)]
  Ambiguous(#[from] lr::Error),
  #[error("production `{0}` is empty and needs a reduce function")]
  MissingReduceFunction(String),
  #[error("production `{production}` reduces to symbol {index}, but it has {len} symbols")]
  ReduceIndexOutOfRange {
    production: String,
    index: usize,
    len: usize,
  },
  #[error("terminal {0} has no value constructor; set one with `literal_value`")]
  MissingLiteralValue(String),
}

impl ConstructionError {
  /// The conflicting table cell, if the grammar is ambiguous.
  pub fn conflict(&self) -> Option<&lr::Conflict> {
    match self {
      ConstructionError::Ambiguous(err) => Some(err.conflict()),
      _ => None,
    }
  }
}

/// 1-based line and column (in chars) of a byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
  pub line: usize,
  pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
  #[error("{error} (line {}, column {})", .location.line, .location.column)]
  Lex {
    error: LexError,
    location: Location,
  },
  #[error(
    "unexpected {terminal} `{text}` at line {}, column {}",
    .location.line, .location.column)]
  UnexpectedToken {
    terminal: String,
    text: String,
    span: Range<usize>,
    location: Location,
    state: StateId,
    expected: Vec<String>,
  },
  #[error("unexpected end of input at line {}, column {}", .location.line, .location.column)]
  UnexpectedEof {
    span: Range<usize>,
    location: Location,
    state: StateId,
    expected: Vec<String>,
  },
  #[error("{message} (reducing `{production}` at line {}, column {})",
    .location.line, .location.column)]
  Reduce {
    message: String,
    production: String,
    span: Range<usize>,
    location: Location,
  },
}

impl Location {
  pub fn of(input: &str, offset: usize) -> Self {
    let before = &input[..offset.min(input.len())];
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);

    Self {
      line: before.matches('\n').count() + 1,
      column: before[line_start..].chars().count() + 1,
    }
  }
}

impl ParseError {
  pub fn span(&self) -> Range<usize> {
    match self {
      ParseError::Lex { error, .. } => error.start..error.end,
      ParseError::UnexpectedToken { span, .. }
      | ParseError::UnexpectedEof { span, .. }
      | ParseError::Reduce { span, .. } => span.clone(),
    }
  }

  pub fn location(&self) -> Location {
    match self {
      ParseError::Lex { location, .. }
      | ParseError::UnexpectedToken { location, .. }
      | ParseError::UnexpectedEof { location, .. }
      | ParseError::Reduce { location, .. } => *location,
    }
  }

  /// The parser state in which a syntax error was detected.
  pub fn state(&self) -> Option<StateId> {
    match self {
      ParseError::UnexpectedToken { state, .. }
      | ParseError::UnexpectedEof { state, .. } => Some(*state),
      _ => None,
    }
  }

  /// Names of the terminals that would have been accepted instead.
  pub fn expected(&self) -> &[String] {
    match self {
      ParseError::UnexpectedToken { expected, .. }
      | ParseError::UnexpectedEof { expected, .. } => expected,
      _ => &[],
    }
  }
}
