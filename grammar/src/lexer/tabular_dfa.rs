//! DFA table compression scheme from
//! https://stackoverflow.com/questions/29139162/dfa-state-transition-table-compression
//!
//! Rows of the transition table are overlaid on one another at per-state
//! base offsets; a `check` entry records which state owns each slot.

use bitvec::prelude::*;
use super::dfa::Dfa;
use super::tokens::Automaton;
use super::TerminalId;

pub use super::dfa::State;

const NO_STATE: u32 = u32::MAX;

#[derive(Debug, PartialEq, Eq)]
pub struct TabularDfa<V> {
  start: u32,
  num_letters: u32,
  state_base: Vec<usize>,
  check: Vec<u32>,
  next: Vec<u32>,
  accept_states: Vec<Option<V>>,
}

impl<V> TabularDfa<V> {
  pub fn start(&self) -> State {
    State(self.start)
  }

  pub fn transition(&self, state: State, c: u32) -> Option<State> {
    if c >= self.num_letters {
      return None;
    }

    let ix = self.state_base[state.0 as usize] + c as usize;
    match self.check.get(ix) {
      Some(&owner) if owner == state.0 => Some(State(self.next[ix])),
      _ => None,
    }
  }

  /// if the state is accepting state, return the value.
  pub fn result(&self, state: State) -> Option<&V> {
    self.accept_states[state.0 as usize].as_ref()
  }

  pub fn num_states(&self) -> usize {
    self.state_base.len()
  }

  /// Number of slots in the compressed table.
  pub fn table_len(&self) -> usize {
    self.check.len()
  }
}

impl<V: Clone> TabularDfa<V> {
  pub fn from_dfa(dfa: &Dfa<u32, V>, num_letters: u32) -> Self {
    let num_states = dfa.num_states as usize;

    let mut rows = vec![vec![]; num_states];
    for (&(from, c), &to) in &dfa.transitions {
      rows[from.0 as usize].push((c as usize, to.0));
    }

    let mut state_base = Vec::with_capacity(num_states);
    let mut occupied: BitVec = BitVec::new();
    let mut check = vec![];
    let mut next = vec![];

    for (state, row) in rows.iter_mut().enumerate() {
      row.sort_unstable();

      let mut base = 0;
      while row.iter().any(|&(c, _)| base + c < occupied.len() && occupied[base + c]) {
        base += 1;
      }

      let row_end = base + num_letters as usize;
      if occupied.len() < row_end {
        occupied.resize(row_end, false);
        check.resize(row_end, NO_STATE);
        next.resize(row_end, NO_STATE);
      }

      for &(c, to) in row.iter() {
        occupied.set(base + c, true);
        check[base + c] = state as u32;
        next[base + c] = to;
      }

      state_base.push(base);
    }

    let mut accept_states = vec![None; num_states];
    for (state, value) in &dfa.accept_states {
      accept_states[state.0 as usize] = Some(value.clone());
    }

    Self {
      start: dfa.start.0,
      num_letters,
      state_base,
      check,
      next,
      accept_states,
    }
  }
}

impl Automaton for TabularDfa<TerminalId> {
  type State = State;

  fn start(&self) -> State {
    TabularDfa::start(self)
  }

  fn transition(&self, state: &State, letter: u32) -> Option<State> {
    TabularDfa::transition(self, *state, letter)
  }

  fn result(&self, state: &State) -> Option<TerminalId> {
    TabularDfa::result(self, *state).copied()
  }
}
