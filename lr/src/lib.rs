use std::fmt;
use grammar::{Grammar, NonterminalId, ProductionId, TerminalId};
use thiserror::Error;
use tracing::debug;

mod augment;
mod builder;
mod first;
mod lalr;
pub mod report;

pub use builder::Builder;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LrTables {
  /// `action[state][terminal]`
  pub action: Vec<Vec<Action>>,
  /// `goto[state][nonterminal]`
  pub goto: Vec<Vec<Option<StateId>>>,
  /// indexed by `ProductionId`. The augmented start production is last.
  pub prods: Vec<ProductionInfo>,
  pub start: StateId,
  pub eof: TerminalId,
  /// Conflicts settled by precedence, in the order they were met.
  pub resolutions: Vec<Resolution>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
  Shift(StateId),
  Reduce(ProductionId),
  Accept,
  Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductionInfo {
  pub nt: NonterminalId,
  pub len: usize,
}

#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
pub struct StateId(u32);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
  pub state: StateId,
  pub terminal: TerminalId,
  pub previous: Action,
  pub new: Action,
  pub chosen: Action,
}

/// The table cell that could not be filled, together with readable
/// renderings of the symbols involved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
  pub state: StateId,
  pub terminal: TerminalId,
  pub previous: Action,
  pub new: Action,
  pub terminal_name: String,
  pub previous_desc: String,
  pub new_desc: String,
  pub state_items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  #[error(
    "shift-reduce conflict in state {} on {}: {} vs {}",
    .0.state, .0.terminal_name, .0.previous_desc, .0.new_desc)]
  ShiftReduceConflict(Conflict),
  #[error(
    "reduce-reduce conflict in state {} on {}: {} vs {}",
    .0.state, .0.terminal_name, .0.previous_desc, .0.new_desc)]
  ReduceReduceConflict(Conflict),
}

impl StateId {
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

impl fmt::Display for StateId {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl fmt::Display for Action {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      Action::Shift(state) => write!(f, "shift {}", state),
      Action::Reduce(prod) => write!(f, "reduce {}", prod.id()),
      Action::Accept => write!(f, "accept"),
      Action::Error => write!(f, "error"),
    }
  }
}

impl Error {
  pub fn conflict(&self) -> &Conflict {
    match self {
      Error::ShiftReduceConflict(conflict) => conflict,
      Error::ReduceReduceConflict(conflict) => conflict,
    }
  }
}

impl LrTables {
  pub fn action(&self, state: StateId, terminal: TerminalId) -> Action {
    self.action[state.index()][terminal.index()]
  }

  pub fn goto(&self, state: StateId, nt: NonterminalId) -> Option<StateId> {
    self.goto[state.index()][nt.index()]
  }

  pub fn prod(&self, prod: ProductionId) -> ProductionInfo {
    self.prods[prod.index()]
  }

  pub fn num_states(&self) -> usize {
    self.action.len()
  }

  /// Terminals with a non-error action in `state`.
  pub fn expected(&self, state: StateId) -> Vec<TerminalId> {
    self.action[state.index()].iter().enumerate()
      .filter(|(_, action)| **action != Action::Error)
      .map(|(i, _)| TerminalId::new(i as u32))
      .collect()
  }
}

/// Builds LALR(1) tables for `grammar`, augmented with `S' -> S $end`.
///
/// Fails with the first conflict that precedence declarations do not settle.
pub fn build(grammar: &Grammar) -> Result<LrTables, Error> {
  let (grammar, accept_prod) = augment::augment(grammar);
  let mut builder = Builder::new(&grammar, accept_prod);
  builder.gen_states();
  debug!(
    states = builder.num_states(),
    prods = grammar.prods.len(),
    "built LALR(1) item sets");

  let tables = builder.gen_tables()?;
  debug!(
    action_cells = tables.action.len() * grammar.terminals.len(),
    resolutions = tables.resolutions.len(),
    "built ACTION and GOTO tables");

  Ok(tables)
}
