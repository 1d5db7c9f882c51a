use grammar::{Grammar, Nonterminal, NonterminalId, Production, ProductionId, Symbol};

/// Add `S' -> S $end` to grammar. Existing ids stay valid; the new
/// nonterminal and production are appended.
pub fn augment(grammar: &Grammar) -> (Grammar, ProductionId) {
  let mut grammar = grammar.clone();
  let new_start_nt = NonterminalId::new(grammar.nts.len() as u32);
  let accept_prod = ProductionId::new(grammar.prods.len() as u32);

  grammar.prods.push(Production {
    nt: new_start_nt,
    symbols: vec![
      Symbol::Nonterminal(grammar.start),
      Symbol::Terminal(grammar.eof),
    ],
    prec: None,
  });

  let new_nt_name = format!("{}'", grammar.nt(grammar.start).name);
  grammar.nts.push(Nonterminal {
    name: new_nt_name,
    prods: vec![accept_prod],
  });
  grammar.start = new_start_nt;

  (grammar, accept_prod)
}
