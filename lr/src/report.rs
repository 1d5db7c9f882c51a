use std::fmt::Write;
use crate::{Conflict, Error, LrTables};
use grammar::Grammar;

/// Renders a construction error as multi-line text.
pub fn report(err: &Error) -> String {
  match err {
    Error::ShiftReduceConflict(conflict) => report_conflict("shift-reduce", conflict),
    Error::ReduceReduceConflict(conflict) => report_conflict("reduce-reduce", conflict),
  }
}

fn report_conflict(kind: &str, conflict: &Conflict) -> String {
  let mut buf = String::new();

  let _ = writeln!(&mut buf,
    "{} conflict at state {}:\n",
    kind,
    conflict.state,
  );

  for item in &conflict.state_items {
    let _ = writeln!(&mut buf, "  {}", item);
  }

  let _ = write!(&mut buf,
    "\nwhen the lookahead is {} (terminal {}), the parser can\n\n  {}\n\nor\n\n  {}\n",
    conflict.terminal_name,
    conflict.terminal.id(),
    conflict.previous_desc,
    conflict.new_desc,
  );

  buf
}

/// Lists the conflicts that precedence declarations settled, one per line.
pub fn report_resolutions(grammar: &Grammar, tables: &LrTables) -> String {
  let mut buf = String::new();

  for resolution in &tables.resolutions {
    let _ = writeln!(&mut buf,
      "state {}, lookahead {}: {} over {}",
      resolution.state,
      grammar.terminal(resolution.terminal).name,
      resolution.chosen,
      if resolution.chosen == resolution.previous {
        resolution.new
      } else {
        resolution.previous
      },
    );
  }

  buf
}
