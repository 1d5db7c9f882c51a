//! compute FIRST and NULLABLE sets.

use bit_set::BitSet;
use grammar::{Grammar, NonterminalId, Symbol};

#[derive(Debug, Clone)]
pub struct FirstAndNullable {
  /// indexed by `NonterminalId`
  pub first: Vec<BitSet>,
  pub nullable: BitSet,
}

pub fn compute(grammar: &Grammar) -> FirstAndNullable {
  let nullable = compute_nullable(grammar);
  let first = compute_first(grammar, &nullable);

  FirstAndNullable {
    first,
    nullable,
  }
}

fn compute_nullable(grammar: &Grammar) -> BitSet {
  let mut nullable = BitSet::with_capacity(grammar.nts.len());

  loop {
    let mut changed = false;

    for prod in &grammar.prods {
      if nullable.contains(prod.nt.index()) {
        continue;
      }

      let prod_nullable = prod.symbols.iter().all(|symbol| match symbol {
        Symbol::Terminal(_) => false,
        Symbol::Nonterminal(nt) => nullable.contains(nt.index()),
      });

      if prod_nullable {
        nullable.insert(prod.nt.index());
        changed = true;
      }
    }

    if !changed {
      break;
    }
  }

  nullable
}

fn compute_first(grammar: &Grammar, nullable: &BitSet) -> Vec<BitSet> {
  let mut first = vec![BitSet::new(); grammar.nts.len()];

  loop {
    let mut changed = false;

    for prod in &grammar.prods {
      let mut prod_first = BitSet::new();

      for symbol in &prod.symbols {
        match symbol {
          Symbol::Terminal(terminal) => {
            prod_first.insert(terminal.index());
            break;
          }
          Symbol::Nonterminal(nt) => {
            prod_first.union_with(&first[nt.index()]);
            if !nullable.contains(nt.index()) {
              break;
            }
          }
        }
      }

      let nt_first = &mut first[prod.nt.index()];
      if !prod_first.is_subset(nt_first) {
        nt_first.union_with(&prod_first);
        changed = true;
      }
    }

    if !changed {
      break;
    }
  }

  first
}

impl FirstAndNullable {
  pub fn nt_first(&self, nt: NonterminalId) -> &BitSet {
    &self.first[nt.index()]
  }

  /// Adds FIRST(`symbols`) to `result`, followed by `follow` if every symbol
  /// is nullable.
  pub fn symbols_first(&self, result: &mut BitSet, symbols: &[Symbol], follow: &BitSet) {
    for symbol in symbols {
      match symbol {
        Symbol::Terminal(terminal) => {
          result.insert(terminal.index());
          return;
        }
        Symbol::Nonterminal(nt) => {
          result.union_with(self.nt_first(*nt));
          if !self.nullable.contains(nt.index()) {
            return;
          }
        }
      }
    }

    result.union_with(follow);
  }
}
