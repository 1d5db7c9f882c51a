use std::collections::BTreeMap;
use std::fmt::{self, Write};
use bit_set::BitSet;
use indexmap::IndexMap;
use grammar::{Grammar, ProductionId, Symbol, TerminalId};
use crate::StateId;

mod states;
mod tables;

/// LR(0) part of an item: production and dot position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemCore {
  pub prod: ProductionId,
  pub dot: usize,
}

#[derive(Debug, Clone)]
pub struct Item {
  pub core: ItemCore,
  pub lookaheads: BitSet,
}

pub type KernelItemSet = Vec<Item>;

pub type StateStore = IndexMap<Vec<ItemCore>, State>;

#[derive(Debug)]
pub struct State {
  /// kernel items sorted by core, followed by closure items.
  pub items: Vec<Item>,
  pub kernel_len: usize,
  pub transitions: BTreeMap<Symbol, StateId>,
}

pub struct Builder<'a> {
  pub(crate) grammar: &'a Grammar,
  pub(crate) states: StateStore,
  pub(crate) accept_prod: ProductionId,
}

impl State {
  pub fn new(kernel_item_set: KernelItemSet) -> Self {
    Self {
      kernel_len: kernel_item_set.len(),
      items: kernel_item_set,
      transitions: BTreeMap::new(),
    }
  }

  pub fn kernel(&self) -> &[Item] {
    &self.items[..self.kernel_len]
  }
}

impl<'a> Builder<'a> {
  /// `grammar` must already be augmented, with `accept_prod` being
  /// `S' -> S $end`.
  pub fn new(grammar: &'a Grammar, accept_prod: ProductionId) -> Self {
    Self {
      grammar,
      states: IndexMap::new(),
      accept_prod,
    }
  }

  pub fn num_states(&self) -> usize {
    self.states.len()
  }

  pub fn gen_states(&mut self) {
    states::gen_states(self)
  }

  pub fn gen_tables(&self) -> Result<crate::LrTables, crate::Error> {
    tables::gen_tables(self)
  }

  pub(crate) fn eof(&self) -> TerminalId {
    self.grammar.eof
  }

  pub fn fmt_item(&self, item: &Item, f: &mut impl Write) -> fmt::Result {
    self.grammar.fmt_production(item.core.prod, Some(item.core.dot), f)?;

    write!(f, "  [")?;
    for (i, lookahead) in item.lookaheads.iter().enumerate() {
      if i > 0 {
        write!(f, " ")?;
      }
      let terminal = TerminalId::new(lookahead as u32);
      write!(f, "{}", self.grammar.terminal(terminal).name)?;
    }
    write!(f, "]")
  }

  pub(crate) fn state_items(&self, state: usize) -> Vec<String> {
    self.states[state].items.iter()
      .map(|item| {
        let mut buf = String::new();
        // writing into a String cannot fail
        let _ = self.fmt_item(item, &mut buf);
        buf
      })
      .collect()
  }

  /// Renders every state with its items and transitions.
  pub fn states(&self) -> String {
    let mut buf = String::new();
    let _ = self.fmt_states(&mut buf);
    buf
  }

  fn fmt_states(&self, f: &mut impl Write) -> fmt::Result {
    for (i, state) in self.states.values().enumerate() {
      if i > 0 {
        writeln!(f)?;
      }
      writeln!(f, "State {}", i)?;

      for item in &state.items {
        write!(f, "  ")?;
        self.fmt_item(item, f)?;
        writeln!(f)?;
      }

      for (symbol, next) in &state.transitions {
        writeln!(f, "  {} => {}", self.grammar.symbol_name(*symbol), next)?;
      }
    }

    Ok(())
  }
}
