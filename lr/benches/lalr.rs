use criterion::{criterion_group, criterion_main, Criterion};
use grammar::{Assoc, Grammar, GrammarBuilder, Regex, Symbol};

/// An expression language with one binary operator per precedence level,
/// plus statement lists and calls.
fn layered_grammar(levels: usize) -> Grammar {
  let mut builder = GrammarBuilder::new();
  let num = builder.terminal("NUM", Regex::literal("0"), false);
  let id = builder.terminal("ID", Regex::literal("x"), false);
  let lparen = builder.terminal("(", Regex::literal("("), false);
  let rparen = builder.terminal(")", Regex::literal(")"), false);
  let comma = builder.terminal(",", Regex::literal(","), false);
  let semi = builder.terminal(";", Regex::literal(";"), false);

  let stmts = builder.nonterminal("stmts");
  let expr = builder.nonterminal("expr");
  let args = builder.nonterminal("args");

  builder.production(stmts, vec![]);
  builder.production(stmts, vec![
    Symbol::Nonterminal(stmts), Symbol::Nonterminal(expr), Symbol::Terminal(semi)]);

  for level in 0..levels {
    let op_text = format!("op{}", level);
    let op = builder.terminal(op_text.clone(), Regex::literal(&op_text), false);
    let assoc = if level % 2 == 0 { Assoc::LeftAssoc } else { Assoc::RightAssoc };
    builder.precedence_group(assoc, &[op]);
    builder.production(expr, vec![
      Symbol::Nonterminal(expr), Symbol::Terminal(op), Symbol::Nonterminal(expr)]);
  }

  builder.production(expr, vec![Symbol::Terminal(num)]);
  builder.production(expr, vec![Symbol::Terminal(id)]);
  builder.production(expr, vec![
    Symbol::Terminal(id), Symbol::Terminal(lparen), Symbol::Nonterminal(args),
    Symbol::Terminal(rparen)]);
  builder.production(expr, vec![
    Symbol::Terminal(lparen), Symbol::Nonterminal(expr), Symbol::Terminal(rparen)]);
  builder.production(args, vec![]);
  builder.production(args, vec![Symbol::Nonterminal(expr)]);
  builder.production(args, vec![
    Symbol::Nonterminal(args), Symbol::Terminal(comma), Symbol::Nonterminal(expr)]);

  builder.build(stmts).unwrap()
}

fn layered_benchmark(c: &mut Criterion) {
  let grammar = layered_grammar(30);
  c.bench_function("layered", |b| b.iter(|| lr::build(&grammar).unwrap()));
}

criterion_group!{
  name = benches;
  config = Criterion::default().significance_level(0.1).sample_size(10);
  targets = layered_benchmark
}
criterion_main!(benches);
