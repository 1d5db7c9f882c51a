use std::fmt;
use thiserror::Error;
use nfa::Nfa;
use tabular_dfa::TabularDfa;
use super::regex::{Regex, RegexError};
use super::Set;

pub use tokens::{Tokens, LexError, Automaton};

mod nfa;
mod dfa;
mod tabular_dfa;
mod powerset_cons;
mod util;
pub mod build;
pub mod tokens;

#[derive(Debug)]
pub struct Lexer {
  automaton: LexerAutomaton,
  char_intervals: Vec<u32>,
  skip: Set<TerminalId>,
  eof: TerminalId,
}

#[derive(Debug)]
enum LexerAutomaton {
  Tabular(TabularDfa<TerminalId>),
  Nfa(Nfa<u32, u32, TerminalId>),
}

/// How the combined terminal automaton is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LexerRuntime {
  /// Determinize ahead of time into a transition table.
  #[default]
  Tabular,
  /// Keep the NFA and simulate it over state sets.
  Nfa,
}

#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
pub struct TerminalId(u32);

#[derive(Default)]
pub struct TerminalIdGen(u32);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'input> {
  pub terminal: TerminalId,
  pub text: &'input str,
  pub start: usize,
  pub end: usize,
}

/// A terminal's compiled pattern as input to the lexer builder.
#[derive(Debug, Clone, Copy)]
pub struct TerminalPattern<'a> {
  pub terminal: TerminalId,
  pub regex: &'a Regex,
  /// When two terminals match the same longest prefix, the smaller priority
  /// wins.
  pub priority: u32,
  /// Matches are consumed without producing a token.
  pub skip: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexerError {
  #[error("no terminals declared")]
  NoTerminals,
  #[error("invalid pattern for terminal {terminal}: {error}")]
  RegexError {
    terminal: TerminalId,
    error: RegexError,
  },
}

impl TerminalIdGen {
  pub fn gen(&mut self) -> TerminalId {
    let i = self.0;
    self.0 += 1;
    TerminalId(i)
  }
}

impl TerminalId {
  pub fn new(id: u32) -> Self {
    Self(id)
  }

  pub fn id(&self) -> u32 {
    self.0
  }

  pub fn index(&self) -> usize {
    self.0 as usize
  }
}

impl fmt::Debug for TerminalId {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "TerminalId({})", self.0)
  }
}

impl fmt::Display for TerminalId {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "#{}", self.0)
  }
}

impl Lexer {
  /// `eof` is the terminal of the synthetic end-of-input token and must not
  /// be one of the pattern terminals.
  pub fn new(
    patterns: &[TerminalPattern],
    eof: TerminalId,
    runtime: LexerRuntime,
  ) -> Result<Self, LexerError> {
    build::build(patterns, eof, runtime)
  }

  pub fn lex<'lexer, 'input>(
    &'lexer self,
    input: &'input str
  ) -> Tokens<'lexer, 'input> {
    Tokens::new(self, input)
  }

  pub fn eof(&self) -> TerminalId {
    self.eof
  }

  pub fn runtime(&self) -> LexerRuntime {
    match self.automaton {
      LexerAutomaton::Tabular(_) => LexerRuntime::Tabular,
      LexerAutomaton::Nfa(_) => LexerRuntime::Nfa,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::regex::parse_regex;
  use pretty_assertions::assert_eq;

  fn lexer(decls: &[(&str, bool)], runtime: LexerRuntime) -> Lexer {
    let regexes = decls.iter()
      .map(|(pattern, _)| parse_regex(pattern).unwrap())
      .collect::<Vec<_>>();
    let patterns = decls.iter().zip(&regexes).enumerate()
      .map(|(i, ((_, skip), regex))| TerminalPattern {
        terminal: TerminalId::new(i as u32),
        regex,
        priority: i as u32,
        skip: *skip,
      })
      .collect::<Vec<_>>();
    let eof = TerminalId::new(decls.len() as u32);

    Lexer::new(&patterns, eof, runtime).unwrap()
  }

  fn tokens<'a>(lexer: &Lexer, input: &'a str) -> Vec<(u32, &'a str)> {
    lexer.lex(input)
      .map(|token| {
        let token = token.unwrap();
        (token.terminal.id(), token.text)
      })
      .collect()
  }

  const RUNTIMES: [LexerRuntime; 2] = [LexerRuntime::Tabular, LexerRuntime::Nfa];

  #[test]
  fn skip() {
    for runtime in RUNTIMES {
      let lexer = lexer(&[
        (r"\d+", false),
        (r"[ \n]", true),
        (r"#[^\n]*", true),
      ], runtime);

      assert_eq!(tokens(&lexer, "  123  456  # lorem ipsum\n  0127401  #\n\n 5768 ##dolor##\n #"), vec![
        (0, "123"),
        (0, "456"),
        (0, "0127401"),
        (0, "5768"),
        (3, ""),
      ]);
    }
  }

  #[test]
  fn lex_expr() {
    for runtime in RUNTIMES {
      let lexer = lexer(&[
        (r"\+", false),
        (r"-", false),
        (r"\*", false),
        (r"/", false),
        (r"\(", false),
        (r"\)", false),
        (r",", false),
        (r"\d+(\.\d*)?", false),
        (r"[a-zA-Z][\w_]*", false),
        (r"[ \n]", true),
      ], runtime);

      assert_eq!(tokens(&lexer, "(3.2 * 51 + Foo_1) / 20. -5  ,    "), vec![
        (4, "("),
        (7, "3.2"),
        (2, "*"),
        (7, "51"),
        (0, "+"),
        (8, "Foo_1"),
        (5, ")"),
        (3, "/"),
        (7, "20."),
        (1, "-"),
        (7, "5"),
        (6, ","),
        (10, ""),
      ]);
    }
  }

  #[test]
  fn match_longest() {
    for runtime in RUNTIMES {
      let lexer = lexer(&[
        ("in", false),
        ("integer", false),
        ("tege", false),
      ], runtime);

      let mut tokens = lexer.lex("integeintegerinteg");
      assert_eq!(tokens.next().unwrap().unwrap().text, "in");
      assert_eq!(tokens.next().unwrap().unwrap().text, "tege");
      assert_eq!(tokens.next().unwrap().unwrap().text, "integer");
      assert_eq!(tokens.next().unwrap().unwrap().text, "in");
      assert_eq!(tokens.next().unwrap().unwrap_err(), LexError {
        char: 't',
        start: 15,
        end: 16,
      });
    }
  }

  #[test]
  fn first_declared_wins_ties() {
    for runtime in RUNTIMES {
      let keyword_first = lexer(&[("if", false), ("[a-z]+", false)], runtime);
      assert_eq!(tokens(&keyword_first, "if"), vec![(0, "if"), (2, "")]);
      assert_eq!(tokens(&keyword_first, "iffy"), vec![(1, "iffy"), (2, "")]);

      let ident_first = lexer(&[("[a-z]+", false), ("if", false)], runtime);
      assert_eq!(tokens(&ident_first, "if"), vec![(0, "if"), (2, "")]);
    }
  }

  #[test]
  fn unicode_and_negated_classes() {
    for runtime in RUNTIMES {
      let lexer = lexer(&[
        (r#""[^"]*""#, false),
        (r"\S+", false),
        (r"\s+", true),
      ], runtime);

      assert_eq!(tokens(&lexer, "\"héllo wörld\"  ünïcode"), vec![
        (0, "\"héllo wörld\""),
        (1, "ünïcode"),
        (3, ""),
      ]);
    }
  }

  #[test]
  fn rejects_empty_patterns() {
    let regex = parse_regex("a*").unwrap();
    let err = Lexer::new(&[TerminalPattern {
      terminal: TerminalId::new(0),
      regex: &regex,
      priority: 0,
      skip: false,
    }], TerminalId::new(1), LexerRuntime::Tabular).unwrap_err();

    assert!(matches!(err, LexerError::RegexError { terminal, .. } if terminal.id() == 0));
  }
}
