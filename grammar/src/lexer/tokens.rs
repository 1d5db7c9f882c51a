use thiserror::Error;
use super::{Lexer, LexerAutomaton, util, Token, TerminalId};

/// The runtime contract shared by the tabular and the NFA lexer.
pub trait Automaton {
  type State;

  fn start(&self) -> Self::State;

  /// `letter` is a character interval index.
  fn transition(&self, state: &Self::State, letter: u32) -> Option<Self::State>;

  /// The terminal accepted in `state`, if any.
  fn result(&self, state: &Self::State) -> Option<TerminalId>;
}

pub struct Tokens<'lexer, 'input> {
  lexer: &'lexer Lexer,
  input: &'input str,
  pos: usize,
  finished: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no terminal matches {char:?} at offset {start}")]
pub struct LexError {
  pub char: char,
  pub start: usize,
  pub end: usize,
}

impl<'lexer, 'input> Tokens<'lexer, 'input> {
  pub(super) fn new(lexer: &'lexer Lexer, input: &'input str) -> Self {
    Self {
      lexer,
      input,
      pos: 0,
      finished: false,
    }
  }

  fn longest_match(&self) -> Option<(usize, TerminalId)> {
    match &self.lexer.automaton {
      LexerAutomaton::Tabular(dfa) => self.munch(dfa),
      LexerAutomaton::Nfa(nfa) => self.munch(nfa),
    }
  }

  /// Runs `automaton` from the current position as far as it goes and
  /// returns the end offset and terminal of the last accepting state seen.
  fn munch<A: Automaton>(&self, automaton: &A) -> Option<(usize, TerminalId)> {
    let mut state = automaton.start();
    let mut last_accept = None;

    for (i, c) in self.input[self.pos..].char_indices() {
      let letter = util::find_char_interval(c as u32, &self.lexer.char_intervals);
      state = match automaton.transition(&state, letter) {
        Some(next) => next,
        None => break,
      };

      if let Some(terminal) = automaton.result(&state) {
        last_accept = Some((self.pos + i + c.len_utf8(), terminal));
      }
    }

    last_accept
  }
}

impl<'lexer, 'input> Iterator for Tokens<'lexer, 'input> {
  type Item = Result<Token<'input>, LexError>;

  fn next(&mut self) -> Option<Self::Item> {
    loop {
      if self.finished {
        return None;
      }

      let start = self.pos;
      if start == self.input.len() {
        self.finished = true;
        return Some(Ok(Token {
          terminal: self.lexer.eof,
          text: "",
          start,
          end: start,
        }));
      }

      match self.longest_match() {
        Some((end, terminal)) => {
          self.pos = end;
          if self.lexer.skip.contains(&terminal) {
            continue;
          }

          return Some(Ok(Token {
            terminal,
            text: &self.input[start..end],
            start,
            end,
          }));
        }
        None => {
          let char = self.input[start..].chars().next()?;
          self.pos += char.len_utf8();

          return Some(Err(LexError {
            char,
            start,
            end: self.pos,
          }));
        }
      }
    }
  }
}
