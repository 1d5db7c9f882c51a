use lalrkit::{configure, ConstructionError, ParseError, Parser};
use pretty_assertions::assert_eq;

const NUM: &str = r"\d+(\.\d+)?";

fn calculator() -> Parser<f64> {
  let mut config = configure::<f64>();
  let expr = config.nonterminal("expr");
  let num = config.terminal(NUM, |text| text.parse().unwrap());
  config.ignore(r"\s+");
  config.literal_value(|_| 0.0);

  config.left_associative(["+", "-"]);
  config.left_associative(["*", "/"]);
  config.right_associative(["^"]);
  let neg = config.right_associative(Vec::<&str>::new());

  config.add_production(expr, vec![expr.into(), "+".into(), expr.into()])
    .reduce(|v| v[0] + v[2]);
  config.add_production(expr, vec![expr.into(), "-".into(), expr.into()])
    .reduce(|v| v[0] - v[2]);
  config.add_production(expr, vec![expr.into(), "*".into(), expr.into()])
    .reduce(|v| v[0] * v[2]);
  config.add_production(expr, vec![expr.into(), "/".into(), expr.into()])
    .try_reduce(|v| {
      if v[2] == 0.0 {
        Err("division by zero".to_owned())
      } else {
        Ok(v[0] / v[2])
      }
    });
  config.add_production(expr, vec![expr.into(), "^".into(), expr.into()])
    .reduce(|v| v[0].powf(v[2]));
  config.add_production(expr, vec!["-".into(), expr.into()])
    .reduce(|v| -v[1])
    .precedence(neg);
  config.add_production(expr, vec!["(".into(), expr.into(), ")".into()])
    .reduce_to_index(1);
  config.add_production(expr, vec![num.into()]);

  config.create_parser().unwrap()
}

#[test]
fn precedence_and_associativity() {
  let calc = calculator();

  assert_eq!(calc.parse("1 + 2 * 3").unwrap(), 7.0);
  assert_eq!(calc.parse("(1 + 2) * 3").unwrap(), 9.0);
  assert_eq!(calc.parse("10 - 4 - 3").unwrap(), 3.0);
  assert_eq!(calc.parse("2 ^ 3 ^ 2").unwrap(), 512.0);
  assert_eq!(calc.parse("-2 ^ 2").unwrap(), 4.0);
  assert_eq!(calc.parse("1 - -1").unwrap(), 2.0);
  assert_eq!(calc.parse("  7.5 / 2.5\n").unwrap(), 3.0);
}

#[test]
fn unexpected_end_of_input() {
  let calc = calculator();
  let err = calc.parse("1 +").unwrap_err();

  assert!(matches!(err, ParseError::UnexpectedEof { .. }));
  assert_eq!(err.span(), 3..3);
  assert_eq!((err.location().line, err.location().column), (1, 4));
  assert!(err.state().is_some());
  assert_eq!(err.expected(), [NUM, "'-'", "'('"]);
}

#[test]
fn unexpected_token() {
  let calc = calculator();
  let err = calc.parse("1 +\n * 2").unwrap_err();

  match &err {
    ParseError::UnexpectedToken { terminal, text, span, .. } => {
      assert_eq!(terminal, "'*'");
      assert_eq!(text, "*");
      assert_eq!(span, &(5..6));
    }
    _ => panic!("unexpected error {:?}", err),
  }
  assert_eq!((err.location().line, err.location().column), (2, 2));

  let report = err.report("calc", "1 +\n * 2");
  assert!(report.starts_with("error: unexpected '*' `*`"), "{}", report);
  assert!(report.contains("calc:2:2"), "{}", report);
  assert!(report.contains("expected one of: "), "{}", report);
}

#[test]
fn lex_error() {
  let calc = calculator();
  let err = calc.parse("1 + @").unwrap_err();

  match &err {
    ParseError::Lex { error, location } => {
      assert_eq!(error.char, '@');
      assert_eq!((location.line, location.column), (1, 5));
    }
    _ => panic!("unexpected error {:?}", err),
  }
  assert_eq!(err.span(), 4..5);
}

#[test]
fn failing_reduce_aborts() {
  let calc = calculator();
  let err = calc.parse("1 + 4 / (2 - 2)").unwrap_err();

  match &err {
    ParseError::Reduce { message, production, .. } => {
      assert_eq!(message, "division by zero");
      assert_eq!(production, "expr -> expr '/' expr");
    }
    _ => panic!("unexpected error {:?}", err),
  }
}

#[test]
fn ambiguous_without_precedence() {
  let mut config = configure::<f64>();
  let expr = config.nonterminal("expr");
  let num = config.terminal(NUM, |text| text.parse().unwrap());
  config.literal_value(|_| 0.0);
  config.add_production(expr, vec![expr.into(), "+".into(), expr.into()])
    .reduce(|v| v[0] + v[2]);
  config.add_production(expr, vec![num.into()]);

  let err = config.create_parser().err().unwrap();
  assert!(matches!(err, ConstructionError::Ambiguous(lr::Error::ShiftReduceConflict(_))));

  let conflict = err.conflict().unwrap();
  assert_eq!(conflict.terminal_name, "'+'");
  assert!(conflict.state_items.iter().any(|item| item.starts_with("expr -> expr '+' expr .")));
}
