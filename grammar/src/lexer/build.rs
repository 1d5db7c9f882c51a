use std::collections::BTreeSet;
use tracing::debug;
use crate::regex::{Regex, RegexError, RegexErrorKind, CHAR_END};
use super::nfa::{State, Nfa};
use super::tabular_dfa::TabularDfa;
use super::{Lexer, LexerAutomaton, LexerError, LexerRuntime, TerminalId, TerminalPattern};
use super::util;

type LexerNfa = Nfa<u32, u32, TerminalId>;

pub fn build(
  patterns: &[TerminalPattern],
  eof: TerminalId,
  runtime: LexerRuntime,
) -> Result<Lexer, LexerError> {
  if patterns.is_empty() {
    return Err(LexerError::NoTerminals);
  }

  validate_patterns(patterns)?;

  let char_intervals = compute_char_intervals(patterns);

  let mut nfa = LexerNfa::new();
  let start = nfa.start;

  for pattern in patterns {
    let enter = nfa.add_state();
    nfa.add_transition(start, enter, None);

    let accept = add_regex_to_nfa(&mut nfa, pattern.regex, enter, &char_intervals);
    nfa.set_accept(accept, pattern.priority, pattern.terminal);
  }

  debug!(
    terminals = patterns.len(),
    nfa_states = nfa.num_states,
    char_intervals = char_intervals.len(),
    "built lexer NFA");

  let automaton = match runtime {
    LexerRuntime::Nfa => LexerAutomaton::Nfa(nfa),
    LexerRuntime::Tabular => {
      let dfa = nfa.to_dfa();
      let table = TabularDfa::from_dfa(&dfa, char_intervals.len() as u32);
      debug!(
        dfa_states = dfa.num_states,
        table_len = table.table_len(),
        "built lexer DFA table");
      LexerAutomaton::Tabular(table)
    }
  };

  let skip = patterns.iter()
    .filter(|pattern| pattern.skip)
    .map(|pattern| pattern.terminal)
    .collect();

  Ok(Lexer {
    automaton,
    char_intervals,
    skip,
    eof,
  })
}

/// Thompson construction of `regex` starting at `enter`. Returns the exit
/// state of the fragment.
fn add_regex_to_nfa(
  nfa: &mut LexerNfa,
  regex: &Regex,
  enter: State,
  char_intervals: &[u32],
) -> State {
  if let Some(ranges) = regex.char_ranges() {
    let exit = nfa.add_state();
    for (lo, hi) in ranges {
      let lower = util::find_char_interval(lo, char_intervals);
      let upper = util::find_char_interval(hi, char_intervals);
      add_intervals_to_nfa(nfa, enter, exit, lower, upper);
    }
    return exit;
  }

  match regex {
    Regex::Alt(alts) => {
      let exit = nfa.add_state();
      alts.iter().for_each(|alt| {
        let last = add_regex_to_nfa(nfa, alt, enter, char_intervals);
        nfa.add_transition(last, exit, None);
      });
      exit
    }
    Regex::Concat(items) => {
      items.iter().fold(enter, |enter, item| {
        add_regex_to_nfa(nfa, item, enter, char_intervals)
      })
    }
    Regex::Optional(item) => {
      // `item` may end in a loop, so skipping it must not land on its exit.
      let inner = nfa.add_state();
      nfa.add_transition(enter, inner, None);
      let last = add_regex_to_nfa(nfa, item, inner, char_intervals);
      let exit = nfa.add_state();
      nfa.add_transition(last, exit, None);
      nfa.add_transition(enter, exit, None);
      exit
    }
    Regex::Many(item) => {
      add_many_to_nfa(nfa, item, enter, char_intervals)
    }
    Regex::Many1(item) => {
      let temp = nfa.add_state();
      nfa.add_transition(enter, temp, None);
      let exit = add_regex_to_nfa(nfa, item, temp, char_intervals);
      nfa.add_transition(exit, temp, None);
      exit
    }
    Regex::Repeat(item, min, max) => {
      let mut last = enter;
      for _ in 0..*min {
        last = add_regex_to_nfa(nfa, item, last, char_intervals);
      }

      match max {
        None => add_many_to_nfa(nfa, item, last, char_intervals),
        Some(max) => {
          let exit = nfa.add_state();
          nfa.add_transition(last, exit, None);
          for _ in *min..*max {
            last = add_regex_to_nfa(nfa, item, last, char_intervals);
            nfa.add_transition(last, exit, None);
          }
          exit
        }
      }
    }
    Regex::Empty => enter,
    Regex::Any | Regex::Char(_) | Regex::CharSet(..) | Regex::CharClass(_) => {
      unreachable!("single-character regexes are handled by char_ranges")
    }
  }
}

fn add_many_to_nfa(
  nfa: &mut LexerNfa,
  item: &Regex,
  enter: State,
  char_intervals: &[u32],
) -> State {
  let exit = nfa.add_state();
  nfa.add_transition(enter, exit, None);
  let temp = add_regex_to_nfa(nfa, item, exit, char_intervals);
  nfa.add_transition(temp, exit, None);
  exit
}

fn add_intervals_to_nfa(
  nfa: &mut LexerNfa,
  enter: State,
  exit: State,
  lower: u32,
  upper: u32
) {
  (lower..upper).for_each(|i| {
    nfa.add_transition(enter, exit, Some(i));
  });
}

/// Lower bounds of the character intervals distinguished by the patterns.
/// Every character in one interval behaves identically in every pattern.
fn compute_char_intervals(patterns: &[TerminalPattern]) -> Vec<u32> {
  let mut char_intervals = BTreeSet::new();
  char_intervals.insert(0);
  char_intervals.insert(CHAR_END);

  for pattern in patterns {
    collect_char_intervals(pattern.regex, &mut char_intervals);
  }

  char_intervals.into_iter().collect()
}

fn collect_char_intervals(regex: &Regex, intervals: &mut BTreeSet<u32>) {
  if let Some(ranges) = regex.char_ranges() {
    for (lo, hi) in ranges {
      intervals.insert(lo);
      intervals.insert(hi);
    }
    return;
  }

  match regex {
    Regex::Alt(items) | Regex::Concat(items) => {
      items.iter().for_each(|item|
        collect_char_intervals(item, intervals));
    }
    Regex::Optional(item) | Regex::Many(item) | Regex::Many1(item)
    | Regex::Repeat(item, ..) => {
      collect_char_intervals(item, intervals);
    }
    _ => {}
  }
}

fn validate_patterns(patterns: &[TerminalPattern]) -> Result<(), LexerError> {
  for pattern in patterns {
    if pattern.regex.accepts_empty() {
      return Err(LexerError::RegexError {
        terminal: pattern.terminal,
        error: RegexError {
          kind: RegexErrorKind::Empty,
          offset: 0,
        },
      });
    }
  }

  Ok(())
}
