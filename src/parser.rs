use grammar::{Grammar, Lexer, ProductionId, Symbol, TerminalId, Token, Tokens};
use lr::{Action, LrTables, StateId};
use tracing::trace;
use crate::configurator::{ErrorFn, ReduceFn, ValueFn};
use crate::error::{Location, ParseError};

pub(crate) enum Reduce<T> {
  ToFirst,
  ToIndex(usize),
  Func(ReduceFn<T>),
}

pub(crate) struct ProductionAction<T> {
  pub(crate) reduce: Reduce<T>,
  pub(crate) on_error: Option<ErrorFn<T>>,
}

/// A table-driven LALR(1) parser. Tables are read-only, so one parser can
/// serve many threads at once.
pub struct Parser<T> {
  grammar: Grammar,
  lexer: Lexer,
  tables: LrTables,
  /// indexed by `TerminalId`
  values: Vec<Option<ValueFn<T>>>,
  /// indexed by `ProductionId`
  actions: Vec<ProductionAction<T>>,
}

/// Per-call state: the value stack and the token cursor.
struct Run<'p, 'input, T> {
  parser: &'p Parser<T>,
  input: &'input str,
  tokens: Tokens<'p, 'input>,
  stack: Vec<(StateId, T)>,
  /// the error being recovered from, handed to `on_error`.
  recovered: Option<ParseError>,
  /// whether a token has been shifted since the last recovery.
  shifted_since_recovery: bool,
}

impl<T> Parser<T> {
  pub(crate) fn new(
    grammar: Grammar,
    lexer: Lexer,
    tables: LrTables,
    values: Vec<Option<ValueFn<T>>>,
    actions: Vec<ProductionAction<T>>,
  ) -> Self {
    Self {
      grammar,
      lexer,
      tables,
      values,
      actions,
    }
  }

  pub fn parse(&self, input: &str) -> Result<T, ParseError> {
    Run {
      parser: self,
      input,
      tokens: self.lexer.lex(input),
      stack: vec![],
      recovered: None,
      shifted_since_recovery: true,
    }.run()
  }

  pub fn tables(&self) -> &LrTables {
    &self.tables
  }

  pub fn grammar(&self) -> &Grammar {
    &self.grammar
  }

  pub fn lexer(&self) -> &Lexer {
    &self.lexer
  }

  fn terminal_name(&self, terminal: TerminalId) -> &str {
    &self.grammar.terminal(terminal).name
  }
}

impl<'p, 'input, T> Run<'p, 'input, T> {
  fn run(mut self) -> Result<T, ParseError> {
    let parser = self.parser;
    let mut token = self.next_token()?;

    loop {
      let state = self.top();

      match parser.tables.action(state, token.terminal) {
        Action::Shift(next) => {
          trace!(
            state = state.id(),
            next = next.id(),
            terminal = parser.terminal_name(token.terminal),
            text = token.text,
            "shift");
          let value = self.token_value(token.terminal, token.text, &token)?;
          self.stack.push((next, value));
          self.shifted_since_recovery = true;
          token = self.next_token()?;
        }
        Action::Reduce(prod) => {
          self.reduce(prod, &token)?;
        }
        Action::Accept => {
          trace!(state = state.id(), "accept");
          return match self.stack.pop() {
            Some((_, value)) => Ok(value),
            None => Err(self.syntax_error(state, &token)),
          };
        }
        Action::Error => {
          let err = self.syntax_error(state, &token);

          if !self.shifted_since_recovery {
            // still stuck on the recovery point; drop the token
            if token.terminal == parser.tables.eof {
              return Err(err);
            }
            trace!(text = token.text, "discard after recovery");
            token = self.next_token()?;
            continue;
          }

          token = self.recover(err, token)?;
        }
      }
    }
  }

  fn top(&self) -> StateId {
    self.stack.last().map_or(self.parser.tables.start, |&(state, _)| state)
  }

  fn next_token(&mut self) -> Result<Token<'input>, ParseError> {
    match self.tokens.next() {
      Some(Ok(token)) => Ok(token),
      Some(Err(error)) => Err(ParseError::Lex {
        location: Location::of(self.input, error.start),
        error,
      }),
      // the lexer ends every input with an end-of-input token, and the
      // parser never reads past it
      None => Ok(Token {
        terminal: self.parser.tables.eof,
        text: "",
        start: self.input.len(),
        end: self.input.len(),
      }),
    }
  }

  fn token_value(
    &self,
    terminal: TerminalId,
    text: &str,
    at: &Token,
  ) -> Result<T, ParseError> {
    match self.parser.values.get(terminal.index()) {
      Some(Some(value)) => Ok(value(text)),
      _ => Err(self.syntax_error(self.top(), at)),
    }
  }

  fn reduce(&mut self, prod: ProductionId, lookahead: &Token) -> Result<(), ParseError> {
    let parser = self.parser;
    let info = parser.tables.prod(prod);
    let values = self.stack
      .drain(self.stack.len() - info.len..)
      .map(|(_, value)| value)
      .collect::<Vec<_>>();

    trace!(
      state = self.top().id(),
      production = %parser.grammar.production_to_string(prod),
      "reduce");

    let action = &parser.actions[prod.index()];
    let uses_error = parser.grammar.error.map_or(false, |error| {
      parser.grammar.prod(prod).symbols.contains(&Symbol::Terminal(error))
    });

    // the error token is consumed here, handler or not
    let recovered = if uses_error {
      self.recovered.take()
    } else {
      None
    };

    let value = match (recovered, &action.on_error) {
      (Some(err), Some(on_error)) => on_error(&err, values),
      _ => self.apply_reduce(prod, &action.reduce, values, lookahead)?,
    };

    let top = self.top();
    match parser.tables.goto(top, info.nt) {
      Some(next) => {
        self.stack.push((next, value));
        Ok(())
      }
      None => Err(self.syntax_error(top, lookahead)),
    }
  }

  fn apply_reduce(
    &self,
    prod: ProductionId,
    reduce: &Reduce<T>,
    values: Vec<T>,
    lookahead: &Token,
  ) -> Result<T, ParseError> {
    let value = match reduce {
      Reduce::ToFirst => values.into_iter().next().ok_or_else(String::new),
      Reduce::ToIndex(index) => values.into_iter().nth(*index).ok_or_else(String::new),
      Reduce::Func(f) => f(values),
    };

    value.map_err(|message| ParseError::Reduce {
      message,
      production: self.parser.grammar.production_to_string(prod),
      span: lookahead.start..lookahead.end,
      location: Location::of(self.input, lookahead.start),
    })
  }

  /// Panic-mode recovery: pops the stack to a state that can shift the
  /// error token, shifts it, then drops tokens until one can be handled.
  /// Returns the token to resume with, or `err` if recovery is impossible.
  fn recover(
    &mut self,
    err: ParseError,
    mut token: Token<'input>,
  ) -> Result<Token<'input>, ParseError> {
    let parser = self.parser;
    let error_terminal = match parser.grammar.error {
      Some(error_terminal) => error_terminal,
      None => return Err(err),
    };

    loop {
      let state = self.top();
      if let Action::Shift(next) = parser.tables.action(state, error_terminal) {
        trace!(state = state.id(), next = next.id(), "shift error token");
        let value = self.token_value(error_terminal, token.text, &token)?;
        self.stack.push((next, value));
        break;
      }

      if self.stack.pop().is_none() {
        return Err(err);
      }
    }

    while parser.tables.action(self.top(), token.terminal) == Action::Error {
      if token.terminal == parser.tables.eof {
        return Err(err);
      }
      trace!(text = token.text, "discard");
      token = self.next_token()?;
    }

    self.recovered = Some(err);
    self.shifted_since_recovery = false;
    Ok(token)
  }

  fn syntax_error(&self, state: StateId, token: &Token) -> ParseError {
    let parser = self.parser;
    let expected = parser.tables.expected(state).into_iter()
      .filter(|&terminal| Some(terminal) != parser.grammar.error)
      .map(|terminal| parser.terminal_name(terminal).to_owned())
      .collect();
    let span = token.start..token.end;
    let location = Location::of(self.input, token.start);

    if token.terminal == parser.tables.eof {
      ParseError::UnexpectedEof {
        span,
        location,
        state,
        expected,
      }
    } else {
      ParseError::UnexpectedToken {
        terminal: parser.terminal_name(token.terminal).to_owned(),
        text: token.text.to_owned(),
        span,
        location,
        state,
        expected,
      }
    }
  }
}
