use std::thread;
use lalrkit::{configure, Parser};
use pretty_assertions::assert_eq;

fn assert_send_sync<T: Send + Sync>() {}

fn sum_parser() -> Parser<u64> {
  let mut config = configure::<u64>();
  let sum = config.nonterminal("sum");
  let num = config.terminal(r"\d+", |text| text.parse().unwrap());
  config.ignore(r"\s+");
  config.literal_value(|_| 0);
  config.left_associative(["+"]);
  config.add_production(sum, vec![sum.into(), "+".into(), sum.into()])
    .reduce(|v| v[0] + v[2]);
  config.add_production(sum, vec![num.into()]);
  config.create_parser().unwrap()
}

#[test]
fn parser_is_shareable() {
  assert_send_sync::<Parser<u64>>();
  assert_send_sync::<Parser<std::rc::Rc<str>>>();
}

#[test]
fn concurrent_parses_are_independent() {
  let parser = sum_parser();
  let parser = &parser;

  let results = thread::scope(|scope| {
    let handles = (1..=8u64)
      .map(|n| scope.spawn(move || {
        let input = (1..=n * 100).map(|i| i.to_string()).collect::<Vec<_>>().join(" + ");
        let broken = format!("{} +", input);
        (parser.parse(&input).unwrap(), parser.parse(&broken).is_err())
      }))
      .collect::<Vec<_>>();

    handles.into_iter()
      .map(|handle| handle.join().unwrap())
      .collect::<Vec<_>>()
  });

  let expected = (1..=8u64)
    .map(|n| (n * 100 * (n * 100 + 1) / 2, true))
    .collect::<Vec<_>>();
  assert_eq!(results, expected);
}
