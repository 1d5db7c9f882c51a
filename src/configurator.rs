use std::sync::Arc;
use bimap::BiMap;
use grammar::regex::{escape, parse_regex};
use grammar::{
  Assoc, GrammarBuilder, LexerRuntime, NonterminalId, PrecedenceId,
  ProductionId, Regex, Symbol, TerminalId,
};
use tracing::debug;
use crate::error::{ConstructionError, ParseError};
use crate::parser::{Parser, ProductionAction, Reduce};

pub(crate) type ValueFn<T> = Arc<dyn Fn(&str) -> T + Send + Sync>;
pub(crate) type ReduceFn<T> = Box<dyn Fn(Vec<T>) -> Result<T, String> + Send + Sync>;
pub(crate) type ErrorFn<T> = Box<dyn Fn(&ParseError, Vec<T>) -> T + Send + Sync>;

/// Lexer construction settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexerSettings {
  pub runtime: LexerRuntime,
  /// Treat the text of `literal` terminals verbatim rather than as a
  /// pattern.
  pub escape_literals: bool,
}

impl Default for LexerSettings {
  fn default() -> Self {
    Self {
      runtime: LexerRuntime::Tabular,
      escape_literals: true,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Terminal(TerminalId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NonTerminal(NonterminalId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrecedenceGroup(PrecedenceId);

/// One symbol on the right-hand side of a production.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
  Terminal(Terminal),
  NonTerminal(NonTerminal),
  /// A literal terminal, declared on first use.
  Literal(String),
}

/// A member of a precedence group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalRef {
  Terminal(Terminal),
  Literal(String),
}

/// Collects terminals, nonterminals, and productions, then builds a
/// `Parser` producing values of type `T`.
pub struct Configurator<T> {
  grammar: GrammarBuilder,
  /// indexed by `TerminalId`
  values: Vec<Option<ValueFn<T>>>,
  literals: BiMap<String, TerminalId>,
  /// indexed by `ProductionId`
  actions: Vec<ProductionAction<T>>,
  literal_value: Option<ValueFn<T>>,
  start: Option<NonterminalId>,
  first_nt: Option<NonterminalId>,
  settings: LexerSettings,
  /// the first error met while declaring; reported by `create_parser`.
  error: Option<ConstructionError>,
}

pub struct ProductionBuilder<'c, T> {
  config: &'c mut Configurator<T>,
  prod: ProductionId,
}

pub fn configure<T>() -> Configurator<T> {
  Configurator {
    grammar: GrammarBuilder::new(),
    values: vec![],
    literals: BiMap::new(),
    actions: vec![],
    literal_value: None,
    start: None,
    first_nt: None,
    settings: LexerSettings::default(),
    error: None,
  }
}

impl<T> Configurator<T> {
  /// Declares a terminal whose tokens become values through `f`.
  ///
  /// When two terminals declared this way match the same longest text, the
  /// one declared first wins. Literals win over both.
  pub fn terminal<F>(&mut self, pattern: &str, f: F) -> Terminal
    where F: Fn(&str) -> T + Send + Sync + 'static
  {
    let regex = self.parse_pattern(pattern);
    let terminal = self.grammar.terminal(pattern, regex, false);
    self.values.push(Some(Arc::new(f)));
    Terminal(terminal)
  }

  /// Declares a terminal matching `text`. Declaring the same text twice
  /// returns the same terminal.
  ///
  /// Literals take priority over pattern terminals matching the same text,
  /// so keywords need no particular declaration order.
  pub fn literal(&mut self, text: &str) -> Terminal {
    if let Some(&terminal) = self.literals.get_by_left(text) {
      return Terminal(terminal);
    }

    let regex = if self.settings.escape_literals {
      self.parse_pattern(&escape(text))
    } else {
      self.parse_pattern(text)
    };
    let terminal = self.grammar.literal(format!("'{}'", text), regex);
    self.values.push(None);
    self.literals.insert(text.to_owned(), terminal);
    Terminal(terminal)
  }

  /// Declares a terminal whose matches are skipped by the lexer.
  pub fn ignore(&mut self, pattern: &str) {
    let regex = self.parse_pattern(pattern);
    self.grammar.terminal(pattern, regex, true);
    self.values.push(None);
  }

  /// The terminal shifted during error recovery. Productions containing it
  /// act as recovery points.
  pub fn error_token(&mut self) -> Terminal {
    let count = self.grammar.terminal_count();
    let terminal = self.grammar.error_terminal();
    if self.grammar.terminal_count() > count {
      self.values.push(None);
    }
    Terminal(terminal)
  }

  pub fn nonterminal(&mut self, name: &str) -> NonTerminal {
    let nt = self.grammar.nonterminal(name);
    self.first_nt.get_or_insert(nt);
    NonTerminal(nt)
  }

  /// Appends a production to `nt`. It reduces to its first symbol unless
  /// told otherwise.
  pub fn add_production(&mut self, nt: NonTerminal, parts: Vec<Part>) -> ProductionBuilder<T> {
    let symbols = parts.into_iter()
      .map(|part| match part {
        Part::Terminal(Terminal(terminal)) => Symbol::Terminal(terminal),
        Part::NonTerminal(NonTerminal(nt)) => Symbol::Nonterminal(nt),
        Part::Literal(text) => Symbol::Terminal(self.literal(&text).0),
      })
      .collect();

    let prod = self.grammar.production(nt.0, symbols);
    self.actions.push(ProductionAction {
      reduce: Reduce::ToFirst,
      on_error: None,
    });

    ProductionBuilder {
      config: self,
      prod,
    }
  }

  pub fn left_associative<I, P>(&mut self, terminals: I) -> PrecedenceGroup
    where I: IntoIterator<Item = P>, P: Into<TerminalRef>
  {
    self.precedence_group(Assoc::LeftAssoc, terminals)
  }

  pub fn right_associative<I, P>(&mut self, terminals: I) -> PrecedenceGroup
    where I: IntoIterator<Item = P>, P: Into<TerminalRef>
  {
    self.precedence_group(Assoc::RightAssoc, terminals)
  }

  pub fn non_associative<I, P>(&mut self, terminals: I) -> PrecedenceGroup
    where I: IntoIterator<Item = P>, P: Into<TerminalRef>
  {
    self.precedence_group(Assoc::NonAssoc, terminals)
  }

  /// Each group binds tighter than the groups declared before it.
  fn precedence_group<I, P>(&mut self, assoc: Assoc, terminals: I) -> PrecedenceGroup
    where I: IntoIterator<Item = P>, P: Into<TerminalRef>
  {
    let members = terminals.into_iter()
      .map(|terminal| match terminal.into() {
        TerminalRef::Terminal(Terminal(terminal)) => terminal,
        TerminalRef::Literal(text) => self.literal(&text).0,
      })
      .collect::<Vec<_>>();
    PrecedenceGroup(self.grammar.precedence_group(assoc, &members))
  }

  /// Makes the values of literal terminals and of the error token.
  pub fn literal_value<F>(&mut self, f: F) -> &mut Self
    where F: Fn(&str) -> T + Send + Sync + 'static
  {
    self.literal_value = Some(Arc::new(f));
    self
  }

  pub fn lexer_runtime(&mut self, runtime: LexerRuntime) -> &mut Self {
    self.settings.runtime = runtime;
    self
  }

  /// Applies to literals declared after the call.
  pub fn escape_literals(&mut self, escape: bool) -> &mut Self {
    self.settings.escape_literals = escape;
    self
  }

  pub fn settings(&self) -> LexerSettings {
    self.settings
  }

  /// Defaults to the first declared nonterminal.
  pub fn start(&mut self, nt: NonTerminal) -> &mut Self {
    self.start = Some(nt.0);
    self
  }

  fn parse_pattern(&mut self, pattern: &str) -> Regex {
    match parse_regex(pattern) {
      Ok(regex) => regex,
      Err(error) => {
        self.error.get_or_insert(ConstructionError::InvalidPattern {
          pattern: pattern.to_owned(),
          error,
        });
        Regex::Empty
      }
    }
  }

  /// Builds the lexer and the LALR(1) tables.
  pub fn create_parser(self) -> Result<Parser<T>, ConstructionError> {
    if let Some(err) = self.error {
      return Err(err);
    }

    let start = self.start.or(self.first_nt)
      .ok_or(grammar::GrammarError::NoStart)?;
    let grammar = self.grammar.build(start)?;

    for (i, action) in self.actions.iter().enumerate() {
      let prod = ProductionId::new(i as u32);
      let len = grammar.prod(prod).symbols.len();
      match action.reduce {
        Reduce::ToFirst if len == 0 => {
          return Err(ConstructionError::MissingReduceFunction(
            grammar.production_to_string(prod)));
        }
        Reduce::ToIndex(index) if index >= len => {
          return Err(ConstructionError::ReduceIndexOutOfRange {
            production: grammar.production_to_string(prod),
            index,
            len,
          });
        }
        _ => {}
      }
    }

    let mut values = self.values;
    for prod in &grammar.prods {
      for symbol in &prod.symbols {
        if let Symbol::Terminal(terminal) = *symbol {
          let value = &mut values[terminal.index()];
          if value.is_none() {
            let literal_value = self.literal_value.clone()
              .ok_or_else(|| ConstructionError::MissingLiteralValue(
                grammar.terminal(terminal).name.clone()))?;
            *value = Some(literal_value);
          }
        }
      }
    }

    let lexer = grammar.build_lexer(self.settings.runtime)?;
    let tables = lr::build(&grammar)?;

    debug!(
      terminals = grammar.terminals.len(),
      nonterminals = grammar.nts.len(),
      productions = grammar.prods.len(),
      states = tables.num_states(),
      runtime = ?self.settings.runtime,
      "created parser");

    Ok(Parser::new(grammar, lexer, tables, values, self.actions))
  }
}

impl<'c, T> ProductionBuilder<'c, T> {
  pub fn id(&self) -> ProductionId {
    self.prod
  }

  pub fn reduce<F>(self, f: F) -> Self
    where F: Fn(Vec<T>) -> T + Send + Sync + 'static
  {
    self.set_reduce(Reduce::Func(Box::new(move |values| Ok(f(values)))))
  }

  /// Like `reduce`, but an `Err` aborts the parse with
  /// `ParseError::Reduce`.
  pub fn try_reduce<F>(self, f: F) -> Self
    where F: Fn(Vec<T>) -> Result<T, String> + Send + Sync + 'static
  {
    self.set_reduce(Reduce::Func(Box::new(f)))
  }

  pub fn reduce_to_first(self) -> Self {
    self.set_reduce(Reduce::ToFirst)
  }

  pub fn reduce_to_index(self, index: usize) -> Self {
    self.set_reduce(Reduce::ToIndex(index))
  }

  pub fn precedence(self, group: PrecedenceGroup) -> Self {
    self.config.grammar.set_production_prec(self.prod, group.0);
    self
  }

  /// Called instead of the reduce function when the production is reduced
  /// after recovering from `ParseError`.
  pub fn on_error<F>(self, f: F) -> Self
    where F: Fn(&ParseError, Vec<T>) -> T + Send + Sync + 'static
  {
    self.config.actions[self.prod.index()].on_error = Some(Box::new(f));
    self
  }

  fn set_reduce(self, reduce: Reduce<T>) -> Self {
    self.config.actions[self.prod.index()].reduce = reduce;
    self
  }
}

impl From<Terminal> for Part {
  fn from(terminal: Terminal) -> Self {
    Part::Terminal(terminal)
  }
}

impl From<NonTerminal> for Part {
  fn from(nt: NonTerminal) -> Self {
    Part::NonTerminal(nt)
  }
}

impl From<&str> for Part {
  fn from(text: &str) -> Self {
    Part::Literal(text.to_owned())
  }
}

impl From<Terminal> for TerminalRef {
  fn from(terminal: Terminal) -> Self {
    TerminalRef::Terminal(terminal)
  }
}

impl From<&str> for TerminalRef {
  fn from(text: &str) -> Self {
    TerminalRef::Literal(text.to_owned())
  }
}

impl Terminal {
  pub fn id(&self) -> TerminalId {
    self.0
  }
}

impl NonTerminal {
  pub fn id(&self) -> NonterminalId {
    self.0
  }
}
