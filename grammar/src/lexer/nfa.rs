use std::hash::Hash;
use std::fmt::{self, Debug};
use super::dfa::Dfa;
use super::tokens::Automaton;
use super::TerminalId;
use crate::{Map, Set};

/// A Thompson NFA over letters `A`. Accepting states carry a priority `P`
/// (smaller wins) and a value `V`.
#[derive(Debug)]
pub struct Nfa<A, P, V> {
  pub start: State,
  pub num_states: u32,
  pub transitions: Map<(State, Option<A>), Set<State>>,
  pub state_letters: Map<State, Set<A>>,
  pub accept_states: Map<State, (P, V)>,
}

#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
pub struct State(pub u32);

impl<A, P, V> Nfa<A, P, V>
  where A: Eq + Hash + Copy,
        P: Ord
{
  /// An automaton with only its start state.
  pub fn new() -> Self {
    Self {
      start: State(0),
      num_states: 1,
      transitions: Map::default(),
      state_letters: Map::default(),
      accept_states: Map::default(),
    }
  }

  pub fn add_state(&mut self) -> State {
    let state = State(self.num_states);
    self.num_states += 1;
    state
  }

  /// `None` is an epsilon transition.
  pub fn add_transition(&mut self, src: State, dest: State, letter: Option<A>) {
    self.transitions.entry((src, letter)).or_default().insert(dest);
    if let Some(letter) = letter {
      self.state_letters.entry(src).or_default().insert(letter);
    }
  }

  pub fn set_accept(&mut self, state: State, priority: P, value: V) {
    self.accept_states.insert(state, (priority, value));
  }

  /// Epsilon closure of `states`, sorted so that equal sets compare equal.
  pub fn closure(&self, states: impl IntoIterator<Item = State>) -> Vec<State> {
    let mut stack = states.into_iter().collect::<Vec<_>>();
    let mut seen = stack.iter().copied().collect::<Set<_>>();

    while let Some(state) = stack.pop() {
      if let Some(next) = self.transitions.get(&(state, None)) {
        for &next in next {
          if seen.insert(next) {
            stack.push(next);
          }
        }
      }
    }

    let mut closure = seen.into_iter().collect::<Vec<_>>();
    closure.sort_unstable();
    closure
  }

  /// Closure of the states reachable from `states` by consuming `letter`.
  pub fn step(&self, states: &[State], letter: A) -> Vec<State> {
    let targets = states.iter()
      .filter_map(|&state| self.transitions.get(&(state, Some(letter))))
      .flatten()
      .copied()
      .collect::<Vec<_>>();

    if targets.is_empty() {
      return targets;
    }
    self.closure(targets)
  }

  /// The value of the highest-priority (smallest) accepting state in `states`.
  pub fn accept_value(&self, states: &[State]) -> Option<&V> {
    states.iter()
      .filter_map(|state| self.accept_states.get(state))
      .min_by(|a, b| a.0.cmp(&b.0))
      .map(|(_, value)| value)
  }
}

impl<A, P, V> Nfa<A, P, V>
  where A: Eq + Hash + Copy + Ord,
        P: Ord,
        V: Clone
{
  pub fn to_dfa(&self) -> Dfa<A, V> {
    super::powerset_cons::powerset(self)
  }
}

impl Automaton for Nfa<u32, u32, TerminalId> {
  type State = Vec<State>;

  fn start(&self) -> Vec<State> {
    self.closure([self.start])
  }

  fn transition(&self, state: &Vec<State>, letter: u32) -> Option<Vec<State>> {
    let next = self.step(state, letter);
    if next.is_empty() {
      None
    } else {
      Some(next)
    }
  }

  fn result(&self, state: &Vec<State>) -> Option<TerminalId> {
    self.accept_value(state).copied()
  }
}

impl Debug for State {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "State({})", self.0)
  }
}
