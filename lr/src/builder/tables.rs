use grammar::{Assoc, Grammar, ProductionId, Symbol, TerminalId};
use tracing::debug;
use crate::{
  Action, Conflict, Error, LrTables, ProductionInfo, Resolution, StateId,
};
use super::{Builder, ItemCore};

/// Generates ACTION table and GOTO table.
///
/// A cell that is still `None` after all items are visited becomes
/// `Action::Error`. `Some(Action::Error)` marks a cell emptied by a
/// non-associative precedence group; `emptied` keeps the shift and the
/// reduce it was settled between, so that a later reduce on the same cell
/// is still checked against them.
pub fn gen_tables(builder: &Builder) -> Result<LrTables, Error> {
  let grammar = builder.grammar;
  let num_states = builder.states.len();
  let mut action = vec![vec![None::<Action>; grammar.terminals.len()]; num_states];
  let mut emptied = vec![vec![None::<(Action, ProductionId)>; grammar.terminals.len()]; num_states];
  let mut goto = vec![vec![None; grammar.nts.len()]; num_states];
  let mut resolutions = vec![];

  for (from_state, state) in builder.states.values().enumerate() {
    let state_id = StateId::new(from_state as u32);

    for item in &state.items {
      let ItemCore { prod, dot } = item.core;
      let symbols = &grammar.prod(prod).symbols;

      if prod == builder.accept_prod && dot == 1 {
        let eof = builder.eof();
        if let Some(old) = action[from_state][eof.index()] {
          return Err(Error::ReduceReduceConflict(
            make_conflict(builder, state_id, eof, old, Action::Accept)));
        }
        action[from_state][eof.index()] = Some(Action::Accept);
        continue;
      }

      // shift
      if dot < symbols.len() {
        let sym = symbols[dot];
        let to_state = state.transitions[&sym];

        match sym {
          Symbol::Terminal(terminal) => {
            let new = Action::Shift(to_state);
            let cell = &mut action[from_state][terminal.index()];
            let chosen = match *cell {
              None => new,
              Some(old) if old == new => continue,
              Some(Action::Error) => continue,
              Some(old @ Action::Reduce(reduce_prod)) => {
                let chosen = match resolve_sr_conflict(grammar, reduce_prod, terminal) {
                  SrConflictResolution::Shift => new,
                  SrConflictResolution::Reduce => old,
                  SrConflictResolution::Error => {
                    emptied[from_state][terminal.index()] = Some((new, reduce_prod));
                    Action::Error
                  }
                  SrConflictResolution::Conflict => {
                    return Err(Error::ShiftReduceConflict(
                      make_conflict(builder, state_id, terminal, old, new)));
                  }
                };
                record_resolution(&mut resolutions, state_id, terminal, old, new, chosen)
              }
              Some(old) => {
                return Err(Error::ShiftReduceConflict(
                  make_conflict(builder, state_id, terminal, old, new)));
              }
            };
            *cell = Some(chosen);
          }
          Symbol::Nonterminal(nt) => {
            goto[from_state][nt.index()] = Some(to_state);
          }
        }
        continue;
      }

      // reduce
      let new = Action::Reduce(prod);
      for lookahead in item.lookaheads.iter() {
        let terminal = TerminalId::new(lookahead as u32);
        let cell = &mut action[from_state][lookahead];
        let chosen = match *cell {
          None => new,
          Some(Action::Error) => match emptied[from_state][lookahead] {
            Some((_, settled)) if settled == prod => continue,
            Some((shift, settled)) => {
              let previous = Action::Reduce(settled);
              let chosen = match resolve_rr_conflict(grammar, settled, prod) {
                Some(winner) if winner == settled => Action::Error,
                Some(_) => match resolve_sr_conflict(grammar, prod, terminal) {
                  SrConflictResolution::Shift => shift,
                  SrConflictResolution::Reduce => new,
                  SrConflictResolution::Error => {
                    emptied[from_state][lookahead] = Some((shift, prod));
                    Action::Error
                  }
                  SrConflictResolution::Conflict => {
                    return Err(Error::ShiftReduceConflict(
                      make_conflict(builder, state_id, terminal, shift, new)));
                  }
                },
                None => {
                  return Err(Error::ReduceReduceConflict(
                    make_conflict(builder, state_id, terminal, previous, new)));
                }
              };
              record_resolution(&mut resolutions, state_id, terminal, previous, new, chosen)
            }
            None => continue,
          },
          Some(old @ Action::Shift(_)) => {
            let chosen = match resolve_sr_conflict(grammar, prod, terminal) {
              SrConflictResolution::Shift => old,
              SrConflictResolution::Reduce => new,
              SrConflictResolution::Error => {
                emptied[from_state][lookahead] = Some((old, prod));
                Action::Error
              }
              SrConflictResolution::Conflict => {
                return Err(Error::ShiftReduceConflict(
                  make_conflict(builder, state_id, terminal, old, new)));
              }
            };
            record_resolution(&mut resolutions, state_id, terminal, old, new, chosen)
          }
          Some(old @ Action::Reduce(prev_prod)) => {
            let chosen = match resolve_rr_conflict(grammar, prev_prod, prod) {
              Some(winner) => Action::Reduce(winner),
              None => {
                return Err(Error::ReduceReduceConflict(
                  make_conflict(builder, state_id, terminal, old, new)));
              }
            };
            record_resolution(&mut resolutions, state_id, terminal, old, new, chosen)
          }
          Some(old) => {
            return Err(Error::ReduceReduceConflict(
              make_conflict(builder, state_id, terminal, old, new)));
          }
        };
        *cell = Some(chosen);
      }
    }
  }

  let action = action.into_iter()
    .map(|row| {
      row.into_iter()
        .map(|cell| cell.unwrap_or(Action::Error))
        .collect()
    })
    .collect();

  let prods = grammar.prods.iter()
    .map(|prod| ProductionInfo {
      nt: prod.nt,
      len: prod.symbols.len(),
    })
    .collect();

  Ok(LrTables {
    action,
    goto,
    prods,
    start: StateId::new(0),
    eof: builder.eof(),
    resolutions,
  })
}

fn record_resolution(
  resolutions: &mut Vec<Resolution>,
  state: StateId,
  terminal: TerminalId,
  previous: Action,
  new: Action,
  chosen: Action,
) -> Action {
  debug!(
    state = state.id(),
    terminal = terminal.id(),
    %previous,
    %new,
    %chosen,
    "conflict resolved by precedence");
  resolutions.push(Resolution {
    state,
    terminal,
    previous,
    new,
    chosen,
  });
  chosen
}

enum SrConflictResolution {
  Shift,
  Reduce,
  Error,
  Conflict,
}

fn resolve_sr_conflict(
  grammar: &Grammar,
  prod: ProductionId,
  terminal: TerminalId,
) -> SrConflictResolution {
  match (grammar.prod_prec(prod), grammar.terminal_prec(terminal)) {
    (Some(prod_prec), Some(terminal_prec)) => {
      if prod_prec.level == terminal_prec.level {
        match terminal_prec.assoc {
          Assoc::LeftAssoc => SrConflictResolution::Reduce,
          Assoc::RightAssoc => SrConflictResolution::Shift,
          Assoc::NonAssoc => SrConflictResolution::Error,
        }
      } else if prod_prec.level < terminal_prec.level {
        SrConflictResolution::Shift
      } else {
        SrConflictResolution::Reduce
      }
    }
    _ => SrConflictResolution::Conflict,
  }
}

/// The production of the higher precedence group wins. Productions without
/// a group, or of the same group, are not comparable.
fn resolve_rr_conflict(
  grammar: &Grammar,
  prod1: ProductionId,
  prod2: ProductionId,
) -> Option<ProductionId> {
  let prec1 = grammar.prod_prec(prod1)?;
  let prec2 = grammar.prod_prec(prod2)?;
  if prec1.level > prec2.level {
    Some(prod1)
  } else if prec1.level < prec2.level {
    Some(prod2)
  } else {
    None
  }
}

fn make_conflict(
  builder: &Builder,
  state: StateId,
  terminal: TerminalId,
  previous: Action,
  new: Action,
) -> Conflict {
  Conflict {
    state,
    terminal,
    previous,
    new,
    terminal_name: builder.grammar.terminal(terminal).name.clone(),
    previous_desc: describe_action(builder.grammar, previous),
    new_desc: describe_action(builder.grammar, new),
    state_items: builder.state_items(state.index()),
  }
}

fn describe_action(grammar: &Grammar, action: Action) -> String {
  match action {
    Action::Shift(state) => format!("shift to state {}", state),
    Action::Reduce(prod) => format!("reduce by {}", grammar.production_to_string(prod)),
    Action::Accept => "accept".to_owned(),
    Action::Error => "error".to_owned(),
  }
}
