use codespan_reporting::diagnostic::{Diagnostic, Label};
use codespan_reporting::files::SimpleFile;
use codespan_reporting::term::{self, termcolor::NoColor};
use itertools::Itertools;
use crate::error::ParseError;

impl ParseError {
  /// Renders the error against the source it came from, with the offending
  /// span underlined.
  pub fn report(&self, name: &str, input: &str) -> String {
    let file = SimpleFile::new(name, input);
    let diagnostic = self.diagnostic();

    let mut writer = NoColor::new(Vec::<u8>::new());
    let config = term::Config::default();
    if term::emit(&mut writer, &config, &file, &diagnostic).is_err() {
      // the span lies outside `input`
      return format!("{}: {}\n", name, self);
    }

    String::from_utf8_lossy(&writer.into_inner()).into_owned()
  }

  fn diagnostic(&self) -> Diagnostic<()> {
    let (message, label) = match self {
      ParseError::Lex { error, .. } => (
        format!("unrecognized character {:?}", error.char),
        "no terminal matches here".to_owned(),
      ),
      ParseError::UnexpectedToken { terminal, text, .. } => (
        format!("unexpected {} `{}`", terminal, text),
        "unexpected token".to_owned(),
      ),
      ParseError::UnexpectedEof { .. } => (
        "unexpected end of input".to_owned(),
        "input ends here".to_owned(),
      ),
      ParseError::Reduce { message, production, .. } => (
        message.clone(),
        format!("while reducing `{}`", production),
      ),
    };

    let mut diagnostic = Diagnostic::error()
      .with_message(message)
      .with_labels(vec![Label::primary((), self.span()).with_message(label)]);

    if !self.expected().is_empty() {
      diagnostic = diagnostic.with_notes(vec![
        format!("expected one of: {}", self.expected().iter().join(", ")),
      ]);
    }

    diagnostic
  }
}
