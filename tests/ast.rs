use insta::assert_snapshot;
use lalrkit::{configure, Parser};
use pretty_assertions::assert_eq;

#[derive(Debug, Clone, PartialEq)]
enum Expr {
  Num(i64),
  Var(String),
  Neg(Box<Expr>),
  Binary(Box<Expr>, char, Box<Expr>),
  Token(String),
}

fn binary(mut values: Vec<Expr>) -> Expr {
  let rhs = values.pop().unwrap();
  let op = match values.pop().unwrap() {
    Expr::Token(op) => op.chars().next().unwrap(),
    other => panic!("not an operator: {:?}", other),
  };
  let lhs = values.pop().unwrap();
  Expr::Binary(Box::new(lhs), op, Box::new(rhs))
}

fn print(expr: &Expr) -> String {
  match expr {
    Expr::Num(n) => n.to_string(),
    Expr::Var(name) => name.clone(),
    Expr::Neg(expr) => format!("(-{})", print(expr)),
    Expr::Binary(lhs, op, rhs) => format!("({} {} {})", print(lhs), op, print(rhs)),
    Expr::Token(text) => text.clone(),
  }
}

fn parser() -> Parser<Expr> {
  let mut config = configure::<Expr>();
  let expr = config.nonterminal("expr");
  let num = config.terminal(r"\d+", |text| Expr::Num(text.parse().unwrap()));
  let var = config.terminal(r"[a-z_][a-z0-9_]*", |text| Expr::Var(text.to_owned()));
  config.ignore(r"[ \t\n]+");
  config.literal_value(|text| Expr::Token(text.to_owned()));

  config.left_associative(["+", "-"]);
  config.left_associative(["*", "/", "%"]);
  let neg = config.right_associative(Vec::<&str>::new());

  for op in ["+", "-", "*", "/", "%"] {
    config.add_production(expr, vec![expr.into(), op.into(), expr.into()])
      .reduce(binary);
  }
  config.add_production(expr, vec!["-".into(), expr.into()])
    .reduce(|mut v| Expr::Neg(Box::new(v.pop().unwrap())))
    .precedence(neg);
  config.add_production(expr, vec!["(".into(), expr.into(), ")".into()])
    .reduce_to_index(1);
  config.add_production(expr, vec![num.into()]);
  config.add_production(expr, vec![var.into()]);

  config.create_parser().unwrap()
}

#[test]
fn tree_shape() {
  let parser = parser();

  assert_eq!(parser.parse("a + b * 2").unwrap(), Expr::Binary(
    Box::new(Expr::Var("a".to_owned())),
    '+',
    Box::new(Expr::Binary(
      Box::new(Expr::Var("b".to_owned())),
      '*',
      Box::new(Expr::Num(2)),
    )),
  ));

  assert_snapshot!(print(&parser.parse("a - b - c").unwrap()), @"((a - b) - c)");
  assert_snapshot!(print(&parser.parse("-x % 3 * (y + 1)").unwrap()), @"(((-x) % 3) * (y + 1))");
  assert_snapshot!(print(&parser.parse("--1").unwrap()), @"(-(-1))");
}

#[test]
fn printed_tree_parses_back() {
  let parser = parser();
  let inputs = [
    "1",
    "a + b * c - d / e",
    "(a + b) * (c - d) % 7",
    "-a * -(b - -c)",
    "x_1 * 2 + y_2 * 3 - (z)",
    "((((deep))))",
  ];

  for input in inputs {
    let ast = parser.parse(input).unwrap();
    let printed = print(&ast);
    assert_eq!(parser.parse(&printed).unwrap(), ast, "{} printed as {}", input, printed);
  }
}
