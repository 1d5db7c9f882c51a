use std::collections::{BTreeMap, VecDeque};
use bit_set::BitSet;
use bitvec::prelude::*;
use grammar::{Grammar, NonterminalId, Symbol};
use crate::first::{self, FirstAndNullable};
use crate::lalr;
use crate::StateId;
use super::{Builder, Item, ItemCore, KernelItemSet, State};

/// Computes the LALR(1) collection. A state is revisited whenever the
/// lookaheads of its kernel grow, until nothing changes.
pub fn gen_states(builder: &mut Builder) {
  let firsts = first::compute(builder.grammar);

  let mut lookaheads = BitSet::new();
  lookaheads.insert(builder.eof().index());
  let start_item_set = vec![
    Item {
      core: ItemCore {
        prod: builder.accept_prod,
        dot: 0,
      },
      lookaheads,
    }
  ];

  let (start_state, _) = lalr::store_state(&mut builder.states, start_item_set);

  let mut queued = bitvec![0; 1];
  let mut queue = VecDeque::new();
  queue.push_back(start_state);
  queued.set(start_state.index(), true);

  while let Some(state_ix) = queue.pop_front() {
    queued.set(state_ix.index(), false);

    let state = &mut builder.states[state_ix.index()];
    compute_closure(builder.grammar, &firsts, state);

    let transitions = compute_transitions(builder, &builder.states[state_ix.index()]);
    let mut targets = BTreeMap::new();
    for (symbol, mut kernel_item_set) in transitions {
      kernel_item_set.sort_by_key(|item| item.core);

      let (next_state, changed) = lalr::store_state(&mut builder.states, kernel_item_set);
      if queued.len() < builder.states.len() {
        queued.resize(builder.states.len(), false);
      }
      if changed && !queued[next_state.index()] {
        queued.set(next_state.index(), true);
        queue.push_back(next_state);
      }
      targets.insert(symbol, next_state);
    }

    builder.states[state_ix.index()].transitions = targets;
  }
}

/// Rebuilds the closure items of `state` from its kernel.
fn compute_closure(
  grammar: &Grammar,
  firsts: &FirstAndNullable,
  state: &mut State,
) {
  state.items.truncate(state.kernel_len);
  let items = &mut state.items;
  // nt -> index of its first closure item
  let mut nt_starts = BTreeMap::<NonterminalId, usize>::new();
  let mut pending = (0..items.len()).rev().collect::<Vec<_>>();

  while let Some(i) = pending.pop() {
    let ItemCore { prod, dot } = items[i].core;
    let symbols = &grammar.prod(prod).symbols;
    let nt = match symbols.get(dot) {
      Some(Symbol::Nonterminal(nt)) => *nt,
      _ => continue,
    };

    let mut first = BitSet::new();
    firsts.symbols_first(&mut first, &symbols[dot + 1..], &items[i].lookaheads);

    if let Some(&nt_start) = nt_starts.get(&nt) {
      let num_prods = grammar.nt(nt).prods.len();
      for j in nt_start..nt_start + num_prods {
        if !first.is_subset(&items[j].lookaheads) {
          items[j].lookaheads.union_with(&first);
          pending.push(j);
        }
      }
    } else {
      nt_starts.insert(nt, items.len());

      for &prod in &grammar.nt(nt).prods {
        pending.push(items.len());
        items.push(Item {
          core: ItemCore {
            prod,
            dot: 0,
          },
          lookaheads: first.clone(),
        });
      }
    }
  }
}

fn compute_transitions(
  builder: &Builder,
  state: &State,
) -> BTreeMap<Symbol, KernelItemSet> {
  let mut transitions = BTreeMap::<_, KernelItemSet>::new();

  for item in &state.items {
    let ItemCore { prod, dot } = item.core;
    let symbols = &builder.grammar.prod(prod).symbols;
    if dot == symbols.len() {
      continue;
    }

    // `S' -> S . $end` accepts instead of shifting
    if prod == builder.accept_prod && dot == 1 {
      continue;
    }

    transitions.entry(symbols[dot])
      .or_default()
      .push(Item {
        core: ItemCore {
          prod,
          dot: dot + 1,
        },
        lookaheads: item.lookaheads.clone(),
      });
  }

  transitions
}

#[cfg(test)]
mod tests {
  use grammar::{GrammarBuilder, Regex};
  use insta::assert_snapshot;
  use crate::augment::augment;
  use super::*;

  /// S = C C
  /// C = c C | d
  #[test]
  fn simple_states() {
    let mut builder = GrammarBuilder::new();
    let c = builder.terminal("c", Regex::literal("c"), false);
    let d = builder.terminal("d", Regex::literal("d"), false);
    let s = builder.nonterminal("S");
    let cc = builder.nonterminal("C");
    builder.production(s, vec![Symbol::Nonterminal(cc), Symbol::Nonterminal(cc)]);
    builder.production(cc, vec![Symbol::Terminal(c), Symbol::Nonterminal(cc)]);
    builder.production(cc, vec![Symbol::Terminal(d)]);
    let grammar = builder.build(s).unwrap();
    let (grammar, accept_prod) = augment(&grammar);

    let mut builder = Builder::new(&grammar, accept_prod);
    gen_states(&mut builder);

    assert_snapshot!(builder.states(), @r"
    State 0
      S' -> . S $end  [$end]
      S -> . C C  [$end]
      C -> . c C  [c d]
      C -> . d  [c d]
      S => 1
      C => 2
      c => 3
      d => 4

    State 1
      S' -> S . $end  [$end]

    State 2
      S -> C . C  [$end]
      C -> . c C  [$end]
      C -> . d  [$end]
      C => 5
      c => 3
      d => 4

    State 3
      C -> c . C  [c d $end]
      C -> . c C  [c d $end]
      C -> . d  [c d $end]
      C => 6
      c => 3
      d => 4

    State 4
      C -> d .  [c d $end]

    State 5
      S -> C C .  [$end]

    State 6
      C -> c C .  [c d $end]
    ");
  }
}
