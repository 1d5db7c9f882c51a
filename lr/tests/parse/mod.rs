use std::collections::HashMap;
use grammar::{
  Assoc, Grammar, GrammarBuilder, LexerRuntime, NonterminalId, PrecedenceId,
  Regex, Symbol, TerminalId,
};
use grammar::regex::parse_regex;
use lr::{Action, LrTables};

/// Builds a grammar from a compact notation:
///
/// ```text
/// %token NUM \d+
/// %skip \s+
/// %left + -
/// %right NEG
/// E = E + E
///   | - E %prec NEG
///   | NUM
/// ```
///
/// Symbols that are neither nonterminals nor `%token`s are literal
/// terminals. `()` is the empty alternative. The first rule is the start.
/// Precedence declarations must come before the rules that use `%prec`.
pub fn grammar(text: &str) -> Grammar {
  let lines = text.lines()
    .map(str::trim)
    .filter(|line| !line.is_empty())
    .collect::<Vec<_>>();

  let mut builder = GrammarBuilder::new();
  let mut nts = HashMap::<String, NonterminalId>::new();
  let mut terminals = HashMap::<String, TerminalId>::new();
  let mut groups = HashMap::<String, PrecedenceId>::new();

  for line in &lines {
    if let Some((lhs, _)) = line.split_once(" = ") {
      if !lhs.starts_with('%') && !nts.contains_key(lhs) {
        nts.insert(lhs.to_owned(), builder.nonterminal(lhs));
      }
    }
  }

  let mut start = None;
  let mut current = None;

  for line in lines {
    let mut words = line.split_whitespace();
    match words.next() {
      Some("%token") => {
        let name = words.next().unwrap();
        let pattern = parse_regex(words.next().unwrap()).unwrap();
        terminals.insert(name.to_owned(), builder.terminal(name, pattern, false));
      }
      Some("%skip") => {
        let pattern = parse_regex(words.next().unwrap()).unwrap();
        builder.terminal("skip", pattern, true);
      }
      Some(decl @ ("%left" | "%right" | "%nonassoc")) => {
        let assoc = match decl {
          "%left" => Assoc::LeftAssoc,
          "%right" => Assoc::RightAssoc,
          _ => Assoc::NonAssoc,
        };
        let names = words.collect::<Vec<_>>();
        let members = names.iter()
          .map(|word| terminal(&mut builder, &mut terminals, word))
          .collect::<Vec<_>>();
        let group = builder.precedence_group(assoc, &members);
        groups.extend(names.iter().map(|name| (name.to_string(), group)));
      }
      _ => {
        let alts = if let Some(rest) = line.strip_prefix('|') {
          rest
        } else {
          let (lhs, rest) = line.split_once(" = ").unwrap();
          current = Some(nts[lhs]);
          start.get_or_insert(nts[lhs]);
          rest
        };

        for alt in alts.split(" | ") {
          add_alternative(
            &mut builder, &nts, &mut terminals, &groups, current.unwrap(), alt);
        }
      }
    }
  }

  builder.build(start.unwrap()).unwrap()
}

fn terminal(
  builder: &mut GrammarBuilder,
  terminals: &mut HashMap<String, TerminalId>,
  text: &str,
) -> TerminalId {
  if let Some(&terminal) = terminals.get(text) {
    return terminal;
  }
  let terminal = builder.terminal(text, Regex::literal(text), false);
  terminals.insert(text.to_owned(), terminal);
  terminal
}

fn add_alternative(
  builder: &mut GrammarBuilder,
  nts: &HashMap<String, NonterminalId>,
  terminals: &mut HashMap<String, TerminalId>,
  groups: &HashMap<String, PrecedenceId>,
  nt: NonterminalId,
  alt: &str,
) {
  let (alt, prec) = match alt.split_once("%prec") {
    Some((alt, prec)) => (alt, Some(prec.trim())),
    None => (alt, None),
  };

  let symbols = alt.split_whitespace()
    .filter(|word| *word != "()")
    .map(|word| match nts.get(word) {
      Some(&nt) => Symbol::Nonterminal(nt),
      None => Symbol::Terminal(terminal(builder, terminals, word)),
    })
    .collect();
  let prod = builder.production(nt, symbols);

  if let Some(prec) = prec {
    builder.set_production_prec(prod, groups[prec]);
  }
}

/// Runs the tables over `input` and records every step.
pub fn parse(
  grammar: &Grammar,
  tables: &LrTables,
  input: &str,
) -> Vec<String> {
  let lexer = grammar.build_lexer(LexerRuntime::Tabular).unwrap();
  let mut tokens = lexer.lex(input);
  let mut token = tokens.next().unwrap().unwrap();
  let mut stack = vec![(tables.start, String::new())];
  let mut events = vec![];

  loop {
    let state = stack.last().unwrap().0;

    match tables.action(state, token.terminal) {
      Action::Shift(next) => {
        events.push(format!("shift {}", token.text));
        stack.push((next, token.text.to_owned()));
        token = tokens.next().unwrap().unwrap();
      }
      Action::Reduce(prod) => {
        let prod = tables.prod(prod);
        let children = stack.split_off(stack.len() - prod.len);
        let nt_name = &grammar.nt(prod.nt).name;

        let mut event = format!("reduce {} ->", nt_name);
        for (_, text) in &children {
          event.push(' ');
          event.push_str(text);
        }
        events.push(event);

        let top = stack.last().unwrap().0;
        let next = tables.goto(top, prod.nt).unwrap();
        stack.push((next, nt_name.clone()));
      }
      Action::Accept => {
        events.push("accept".to_owned());
        break;
      }
      Action::Error => {
        events.push(format!(
          "error token {:?} at {}:{}", token.text, token.start, token.end));
        break;
      }
    }
  }

  events
}
