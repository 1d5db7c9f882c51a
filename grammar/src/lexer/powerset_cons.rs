//! Subset construction.

use std::collections::BTreeSet;
use std::hash::Hash;
use indexmap::IndexMap;
use super::nfa::{self, Nfa};
use super::dfa::{self, Dfa};

pub fn powerset<A, P, V>(nfa: &Nfa<A, P, V>) -> Dfa<A, V>
  where A: Eq + Hash + Copy + Ord,
        P: Ord,
        V: Clone
{
  let mut dfa = Dfa::new();
  // sorted NFA state set -> DFA state, in discovery order
  let mut states = IndexMap::<Vec<nfa::State>, dfa::State>::new();
  states.insert(nfa.closure([nfa.start]), dfa.start);

  let mut i = 0;
  while let Some((set, &from)) = states.get_index(i) {
    let set = set.clone();

    if let Some(value) = nfa.accept_value(&set) {
      dfa.set_accept(from, value.clone());
    }

    let letters = set.iter()
      .filter_map(|state| nfa.state_letters.get(state))
      .flatten()
      .copied()
      .collect::<BTreeSet<_>>();

    for letter in letters {
      let next = nfa.step(&set, letter);
      if next.is_empty() {
        continue;
      }

      let to = match states.get(&next) {
        Some(&to) => to,
        None => {
          let to = dfa.add_state();
          states.insert(next, to);
          to
        }
      };
      dfa.add_transition(from, to, letter);
    }

    i += 1;
  }

  dfa
}
