use std::fmt::{self, Debug};
use crate::Map;

#[derive(Debug)]
pub struct Dfa<A, V> {
  pub start: State,
  pub num_states: u32,
  pub transitions: Map<(State, A), State>,
  pub accept_states: Map<State, V>,
}

#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
pub struct State(pub u32);

impl<A, V> Dfa<A, V>
  where A: Eq + std::hash::Hash + Copy
{
  /// An automaton with only its start state.
  pub fn new() -> Self {
    Self {
      start: State(0),
      num_states: 1,
      transitions: Map::default(),
      accept_states: Map::default(),
    }
  }

  pub fn add_state(&mut self) -> State {
    let state = State(self.num_states);
    self.num_states += 1;
    state
  }

  pub fn add_transition(&mut self, src: State, dest: State, letter: A) {
    self.transitions.insert((src, letter), dest);
  }

  pub fn set_accept(&mut self, state: State, value: V) {
    self.accept_states.insert(state, value);
  }

  pub fn start(&self) -> State {
    self.start
  }

  pub fn transition(&self, state: State, c: A) -> Option<State> {
    self.transitions.get(&(state, c)).copied()
  }

  /// The value accepted in `state`, if any.
  pub fn result(&self, state: State) -> Option<&V> {
    self.accept_states.get(&state)
  }
}

impl Debug for State {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "State({})", self.0)
  }
}
