use std::fmt;
use itertools::Itertools;
use thiserror::Error;
use tracing::warn;
use super::lexer::{
  Lexer, LexerError, LexerRuntime, TerminalId, TerminalIdGen, TerminalPattern,
};
use super::regex::Regex;

#[derive(Debug, Clone)]
pub struct Grammar {
  /// indexed by `TerminalId`; the end-of-input terminal is last.
  pub terminals: Vec<Terminal>,
  /// indexed by `NonterminalId`
  pub nts: Vec<Nonterminal>,
  /// indexed by `ProductionId`
  pub prods: Vec<Production>,
  pub precs: Vec<PrecedenceGroup>,
  pub start: NonterminalId,
  pub eof: TerminalId,
  pub error: Option<TerminalId>,
}

#[derive(Debug, Clone)]
pub struct Terminal {
  pub name: String,
  /// `None` for terminals the lexer never produces.
  pub pattern: Option<Regex>,
  pub skip: bool,
  /// Literal terminals win ties against every pattern terminal.
  pub literal: bool,
  pub prec: Option<PrecedenceId>,
}

#[derive(Debug, Clone)]
pub struct Nonterminal {
  pub name: String,
  pub prods: Vec<ProductionId>,
}

#[derive(Debug, Clone)]
pub struct Production {
  pub nt: NonterminalId,
  pub symbols: Vec<Symbol>,
  /// the explicit precedence, or that of the last terminal which has one.
  pub prec: Option<PrecedenceId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
  Nonterminal(NonterminalId),
  Terminal(TerminalId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrecedenceGroup {
  pub assoc: Assoc,
  /// groups declared later bind tighter.
  pub level: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
  LeftAssoc,
  RightAssoc,
  NonAssoc,
}

#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
pub struct NonterminalId(u32);

#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
pub struct ProductionId(u32);

#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
pub struct PrecedenceId(u32);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
  #[error("no start nonterminal declared")]
  NoStart,
  #[error("nonterminal `{0}` has no productions")]
  NoProductions(String),
  #[error("terminal `{0}` is assigned to more than one precedence group")]
  PrecedenceRedeclared(String),
  #[error("symbol does not belong to this grammar")]
  UnknownSymbol,
}

macro_rules! impl_id {
  ($($id:ident),*) => {
    $(
      impl $id {
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
    )*
  };
}

impl_id!(NonterminalId, ProductionId, PrecedenceId);

impl Grammar {
  pub fn prod(&self, prod: ProductionId) -> &Production {
    &self.prods[prod.index()]
  }

  pub fn nt(&self, nt: NonterminalId) -> &Nonterminal {
    &self.nts[nt.index()]
  }

  pub fn terminal(&self, terminal: TerminalId) -> &Terminal {
    &self.terminals[terminal.index()]
  }

  pub fn prec(&self, prec: PrecedenceId) -> PrecedenceGroup {
    self.precs[prec.index()]
  }

  pub fn terminal_prec(&self, terminal: TerminalId) -> Option<PrecedenceGroup> {
    self.terminal(terminal).prec.map(|prec| self.prec(prec))
  }

  pub fn prod_prec(&self, prod: ProductionId) -> Option<PrecedenceGroup> {
    self.prod(prod).prec.map(|prec| self.prec(prec))
  }

  pub fn symbol_name(&self, symbol: Symbol) -> &str {
    match symbol {
      Symbol::Terminal(terminal) => &self.terminal(terminal).name,
      Symbol::Nonterminal(nt) => &self.nt(nt).name,
    }
  }

  /// Renders `prod` as `E -> E '+' E`, with a dot before symbol `dot` if
  /// given.
  pub fn fmt_production(
    &self,
    prod: ProductionId,
    dot: Option<usize>,
    f: &mut impl fmt::Write,
  ) -> fmt::Result {
    let prod = self.prod(prod);
    write!(f, "{} ->", self.nt(prod.nt).name)?;

    for (i, &symbol) in prod.symbols.iter().enumerate() {
      if dot == Some(i) {
        write!(f, " .")?;
      }
      write!(f, " {}", self.symbol_name(symbol))?;
    }

    if dot == Some(prod.symbols.len()) {
      write!(f, " .")?;
    }

    Ok(())
  }

  pub fn production_to_string(&self, prod: ProductionId) -> String {
    let mut buf = String::new();
    // writing into a String cannot fail
    let _ = self.fmt_production(prod, None, &mut buf);
    buf
  }

  /// Literals come first by priority, then pattern terminals, each in
  /// declaration order.
  pub fn lexer_patterns(&self) -> Vec<TerminalPattern> {
    let count = self.terminals.len() as u32;
    self.terminals.iter().enumerate()
      .filter_map(|(i, terminal)| {
        let i = i as u32;
        terminal.pattern.as_ref().map(|regex| TerminalPattern {
          terminal: TerminalId::new(i),
          regex,
          priority: if terminal.literal { i } else { count + i },
          skip: terminal.skip,
        })
      })
      .collect()
  }

  pub fn build_lexer(&self, runtime: LexerRuntime) -> Result<Lexer, LexerError> {
    Lexer::new(&self.lexer_patterns(), self.eof, runtime)
  }
}

/// Collects symbols and productions in declaration order.
#[derive(Default)]
pub struct GrammarBuilder {
  terminals: Vec<Terminal>,
  term_gen: TerminalIdGen,
  nts: Vec<Nonterminal>,
  prods: Vec<Production>,
  precs: Vec<PrecedenceGroup>,
  prec_members: Vec<(PrecedenceId, TerminalId)>,
  error: Option<TerminalId>,
}

impl GrammarBuilder {
  pub fn new() -> Self {
    Self::default()
  }

  /// Terminals declared earlier win ties between equally long matches.
  pub fn terminal(&mut self, name: impl Into<String>, pattern: Regex, skip: bool) -> TerminalId {
    self.push_terminal(name.into(), Some(pattern), skip, false)
  }

  /// A terminal for fixed text. It beats any pattern terminal matching the
  /// same text, wherever it was declared.
  pub fn literal(&mut self, name: impl Into<String>, pattern: Regex) -> TerminalId {
    self.push_terminal(name.into(), Some(pattern), false, true)
  }

  /// The terminal shifted by panic-mode error recovery. It has no pattern.
  pub fn error_terminal(&mut self) -> TerminalId {
    if let Some(error) = self.error {
      return error;
    }

    let error = self.push_terminal("error".to_owned(), None, false, false);
    self.error = Some(error);
    error
  }

  fn push_terminal(
    &mut self,
    name: String,
    pattern: Option<Regex>,
    skip: bool,
    literal: bool,
  ) -> TerminalId {
    let id = self.term_gen.gen();
    self.terminals.push(Terminal {
      name,
      pattern,
      skip,
      literal,
      prec: None,
    });
    id
  }

  pub fn nonterminal(&mut self, name: impl Into<String>) -> NonterminalId {
    let id = NonterminalId(self.nts.len() as u32);
    self.nts.push(Nonterminal {
      name: name.into(),
      prods: vec![],
    });
    id
  }

  pub fn production(&mut self, nt: NonterminalId, symbols: Vec<Symbol>) -> ProductionId {
    let id = ProductionId(self.prods.len() as u32);
    self.prods.push(Production {
      nt,
      symbols,
      prec: None,
    });
    if let Some(nt) = self.nts.get_mut(nt.index()) {
      nt.prods.push(id);
    }
    id
  }

  pub fn set_production_prec(&mut self, prod: ProductionId, prec: PrecedenceId) {
    if let Some(prod) = self.prods.get_mut(prod.index()) {
      prod.prec = Some(prec);
    }
  }

  /// Each new group binds tighter than all groups declared before it.
  pub fn precedence_group(&mut self, assoc: Assoc, terminals: &[TerminalId]) -> PrecedenceId {
    let id = PrecedenceId(self.precs.len() as u32);
    self.precs.push(PrecedenceGroup {
      assoc,
      level: id.0,
    });
    self.prec_members.extend(terminals.iter().map(|&terminal| (id, terminal)));
    id
  }

  pub fn terminal_count(&self) -> usize {
    self.terminals.len()
  }

  pub fn build(mut self, start: NonterminalId) -> Result<Grammar, GrammarError> {
    if start.index() >= self.nts.len() {
      return Err(GrammarError::UnknownSymbol);
    }

    for &(prec, terminal) in &self.prec_members {
      let terminal = self.terminals.get_mut(terminal.index())
        .ok_or(GrammarError::UnknownSymbol)?;
      if terminal.prec.is_some() {
        return Err(GrammarError::PrecedenceRedeclared(terminal.name.clone()));
      }
      terminal.prec = Some(prec);
    }

    for prod in &mut self.prods {
      if prod.nt.index() >= self.nts.len() {
        return Err(GrammarError::UnknownSymbol);
      }

      for symbol in &prod.symbols {
        let known = match symbol {
          Symbol::Terminal(terminal) => terminal.index() < self.terminals.len(),
          Symbol::Nonterminal(nt) => nt.index() < self.nts.len(),
        };
        if !known {
          return Err(GrammarError::UnknownSymbol);
        }
      }

      if prod.prec.is_none() {
        let terminals = &self.terminals;
        prod.prec = prod.symbols.iter().rev()
          .find_map(|symbol| match symbol {
            Symbol::Terminal(terminal) => terminals[terminal.index()].prec,
            Symbol::Nonterminal(_) => None,
          });
      }
    }

    let reachable = reachable_nts(&self.nts, &self.prods, start);
    for (i, nt) in self.nts.iter().enumerate() {
      if !reachable[i] {
        warn!(nonterminal = %nt.name, "nonterminal is unreachable from the start symbol");
      } else if nt.prods.is_empty() {
        return Err(GrammarError::NoProductions(nt.name.clone()));
      }
    }

    let eof = self.push_terminal("$end".to_owned(), None, false, false);

    Ok(Grammar {
      terminals: self.terminals,
      nts: self.nts,
      prods: self.prods,
      precs: self.precs,
      start,
      eof,
      error: self.error,
    })
  }
}

fn reachable_nts(
  nts: &[Nonterminal],
  prods: &[Production],
  start: NonterminalId,
) -> Vec<bool> {
  let mut reachable = vec![false; nts.len()];
  let mut stack = vec![start];
  reachable[start.index()] = true;

  while let Some(nt) = stack.pop() {
    for prod in &nts[nt.index()].prods {
      for symbol in &prods[prod.index()].symbols {
        if let Symbol::Nonterminal(next) = *symbol {
          if !reachable[next.index()] {
            reachable[next.index()] = true;
            stack.push(next);
          }
        }
      }
    }
  }

  reachable
}

impl fmt::Display for Grammar {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    for nt in &self.nts {
      let alts = nt.prods.iter()
        .map(|&prod| {
          self.prod(prod).symbols.iter()
            .map(|&symbol| self.symbol_name(symbol))
            .join(" ")
        })
        .join(" | ");
      writeln!(f, "{} = {}", nt.name, alts)?;
    }
    Ok(())
  }
}
