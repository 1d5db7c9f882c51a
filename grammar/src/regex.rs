use std::iter::Peekable;
use std::str::CharIndices;
use thiserror::Error;

pub use self::ast::*;

mod ast;

/// Repetition counts above this are rejected, since each repetition copies
/// the NFA fragment.
const MAX_REPEAT: u32 = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at offset {offset}")]
pub struct RegexError {
  pub kind: RegexErrorKind,
  pub offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegexErrorKind {
  #[error("syntax error")]
  SyntaxError,
  #[error("unclosed group")]
  UnclosedGroup,
  #[error("unclosed character set")]
  UnclosedSet,
  #[error("invalid escape sequence")]
  InvalidEscape,
  #[error("invalid character range")]
  InvalidRange,
  #[error("invalid repetition")]
  InvalidRepetition,
  #[error("nothing to repeat")]
  NothingToRepeat,
  #[error("regex may accept empty string")]
  Empty,
}

pub fn parse_regex(input: &str) -> Result<Regex, RegexError> {
  let mut parser = RegexParser {
    input,
    chars: input.char_indices().peekable(),
  };

  let regex = parser.parse_alt()?;
  if let Some(&(i, _)) = parser.chars.peek() {
    return Err(RegexError {
      kind: RegexErrorKind::SyntaxError,
      offset: i,
    });
  }

  Ok(regex)
}

/// Escapes regex metacharacters so that `text` matches literally.
pub fn escape(text: &str) -> String {
  let mut escaped = String::with_capacity(text.len());
  for c in text.chars() {
    if is_meta(c) {
      escaped.push('\\');
    }
    escaped.push(c);
  }
  escaped
}

fn is_meta(c: char) -> bool {
  matches!(c,
    '\\' | '.' | '+' | '*' | '?' | '(' | ')' | '|' | '[' | ']' | '{' | '}' | '^' | '$')
}

enum Escaped {
  Char(char),
  Class(CharClass),
}

struct RegexParser<'a> {
  input: &'a str,
  chars: Peekable<CharIndices<'a>>,
}

impl<'a> RegexParser<'a> {
  fn offset(&mut self) -> usize {
    self.chars.peek().map(|&(i, _)| i).unwrap_or(self.input.len())
  }

  fn error<T>(&mut self, kind: RegexErrorKind) -> Result<T, RegexError> {
    let offset = self.offset();
    Err(RegexError { kind, offset })
  }

  fn eat(&mut self, c: char) -> bool {
    if let Some(&(_, x)) = self.chars.peek() {
      if x == c {
        self.chars.next();
        return true;
      }
    }
    false
  }

  fn parse_alt(&mut self) -> Result<Regex, RegexError> {
    let mut alts = vec![self.parse_concat()?];
    while self.eat('|') {
      alts.push(self.parse_concat()?);
    }

    if alts.len() == 1 {
      Ok(alts.pop().unwrap_or(Regex::Empty))
    } else {
      Ok(Regex::Alt(alts))
    }
  }

  fn parse_concat(&mut self) -> Result<Regex, RegexError> {
    let mut items = vec![];
    while let Some(&(_, c)) = self.chars.peek() {
      if c == '|' || c == ')' {
        break;
      }
      items.push(self.parse_repeat()?);
    }

    match items.len() {
      0 => Ok(Regex::Empty),
      1 => Ok(items.pop().unwrap_or(Regex::Empty)),
      _ => Ok(Regex::Concat(items)),
    }
  }

  fn parse_repeat(&mut self) -> Result<Regex, RegexError> {
    let mut regex = self.parse_atom()?;

    loop {
      match self.chars.peek() {
        Some((_, '*')) => {
          self.chars.next();
          regex = Regex::Many(Box::new(regex));
        }
        Some((_, '+')) => {
          self.chars.next();
          regex = Regex::Many1(Box::new(regex));
        }
        Some((_, '?')) => {
          self.chars.next();
          regex = Regex::Optional(Box::new(regex));
        }
        Some((_, '{')) => {
          let (min, max) = self.parse_bounds()?;
          regex = Regex::Repeat(Box::new(regex), min, max);
        }
        _ => return Ok(regex),
      }
    }
  }

  /// `{n}`, `{n,}` or `{n,m}`.
  fn parse_bounds(&mut self) -> Result<(u32, Option<u32>), RegexError> {
    let start = self.offset();
    self.chars.next();

    let invalid = RegexError {
      kind: RegexErrorKind::InvalidRepetition,
      offset: start,
    };

    let min = self.parse_number().ok_or_else(|| invalid.clone())?;
    let max = if self.eat(',') {
      if let Some((_, '}')) = self.chars.peek() {
        None
      } else {
        Some(self.parse_number().ok_or_else(|| invalid.clone())?)
      }
    } else {
      Some(min)
    };

    if !self.eat('}') {
      return Err(invalid);
    }

    match max {
      Some(max) if max < min || max > MAX_REPEAT => Err(invalid),
      _ if min > MAX_REPEAT => Err(invalid),
      _ => Ok((min, max)),
    }
  }

  fn parse_number(&mut self) -> Option<u32> {
    let mut value: Option<u32> = None;
    while let Some(&(_, c)) = self.chars.peek() {
      let digit = match c.to_digit(10) {
        Some(digit) => digit,
        None => break,
      };
      self.chars.next();
      value = Some(value.unwrap_or(0).saturating_mul(10).saturating_add(digit));
    }
    value
  }

  fn parse_atom(&mut self) -> Result<Regex, RegexError> {
    let (i, c) = match self.chars.next() {
      Some(x) => x,
      None => return self.error(RegexErrorKind::SyntaxError),
    };

    match c {
      '(' => {
        if let Some((_, '?')) = self.chars.peek() {
          self.chars.next();
          if !self.eat(':') {
            return self.error(RegexErrorKind::SyntaxError);
          }
        }

        let inner = self.parse_alt()?;
        if !self.eat(')') {
          return Err(RegexError {
            kind: RegexErrorKind::UnclosedGroup,
            offset: i,
          });
        }
        Ok(inner)
      }
      '[' => self.parse_set(i),
      '.' => Ok(Regex::Any),
      '\\' => match self.parse_escape(i)? {
        Escaped::Char(c) => Ok(Regex::Char(c)),
        Escaped::Class(class) => Ok(Regex::CharClass(class)),
      },
      '*' | '+' | '?' | '{' => Err(RegexError {
        kind: RegexErrorKind::NothingToRepeat,
        offset: i,
      }),
      '^' | '$' => Err(RegexError {
        kind: RegexErrorKind::SyntaxError,
        offset: i,
      }),
      c => Ok(Regex::Char(c)),
    }
  }

  /// The backslash at `start` has been consumed.
  fn parse_escape(&mut self, start: usize) -> Result<Escaped, RegexError> {
    let invalid = RegexError {
      kind: RegexErrorKind::InvalidEscape,
      offset: start,
    };

    let c = match self.chars.next() {
      Some((_, c)) => c,
      None => return Err(invalid),
    };

    let escaped = match c {
      'n' => Escaped::Char('\n'),
      'r' => Escaped::Char('\r'),
      't' => Escaped::Char('\t'),
      'f' => Escaped::Char('\x0C'),
      'v' => Escaped::Char('\x0B'),
      '0' => Escaped::Char('\0'),
      'd' => Escaped::Class(CharClass::Digit),
      'w' => Escaped::Class(CharClass::Word),
      's' => Escaped::Class(CharClass::Space),
      'D' => Escaped::Class(CharClass::NotDigit),
      'W' => Escaped::Class(CharClass::NotWord),
      'S' => Escaped::Class(CharClass::NotSpace),
      'x' => Escaped::Char(self.parse_hex(2).ok_or(invalid)?),
      'u' => Escaped::Char(self.parse_hex(4).ok_or(invalid)?),
      c if c.is_alphanumeric() => return Err(invalid),
      c => Escaped::Char(c),
    };

    Ok(escaped)
  }

  fn parse_hex(&mut self, len: usize) -> Option<char> {
    let mut code = 0;
    for _ in 0..len {
      let (_, c) = self.chars.next()?;
      code = code * 16 + c.to_digit(16)?;
    }
    std::char::from_u32(code)
  }

  /// The `[` at `start` has been consumed.
  fn parse_set(&mut self, start: usize) -> Result<Regex, RegexError> {
    let negated = self.eat('^');
    let mut items = vec![];

    loop {
      let (i, c) = match self.chars.next() {
        Some(x) => x,
        None => return Err(RegexError {
          kind: RegexErrorKind::UnclosedSet,
          offset: start,
        }),
      };

      let lower = match c {
        ']' if items.is_empty() => {
          return Err(RegexError {
            kind: RegexErrorKind::SyntaxError,
            offset: i,
          });
        }
        ']' => break,
        '\\' => match self.parse_escape(i)? {
          Escaped::Char(c) => c,
          Escaped::Class(class) => {
            items.push(CharSetItem::CharClass(class));
            continue;
          }
        },
        c => c,
      };

      if !self.at_range_dash() {
        items.push(CharSetItem::Char(lower));
        continue;
      }

      self.chars.next();
      let upper = match self.chars.next() {
        Some((j, '\\')) => match self.parse_escape(j)? {
          Escaped::Char(c) => c,
          Escaped::Class(_) => {
            return Err(RegexError {
              kind: RegexErrorKind::InvalidRange,
              offset: i,
            });
          }
        },
        Some((_, c)) => c,
        None => return Err(RegexError {
          kind: RegexErrorKind::UnclosedSet,
          offset: start,
        }),
      };

      if lower > upper {
        return Err(RegexError {
          kind: RegexErrorKind::InvalidRange,
          offset: i,
        });
      }
      items.push(CharSetItem::Range(lower, upper));
    }

    Ok(Regex::CharSet(items, negated))
  }

  /// A `-` that is followed by something other than `]`.
  fn at_range_dash(&self) -> bool {
    let mut lookahead = self.chars.clone();
    match lookahead.next() {
      Some((_, '-')) => !matches!(lookahead.next(), Some((_, ']')) | None),
      _ => false,
    }
  }
}
