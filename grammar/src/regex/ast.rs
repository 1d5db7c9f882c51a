/// One past the largest Unicode scalar value.
pub const CHAR_END: u32 = 0x11_0000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Regex {
  Empty,
  Any,
  Char(char),
  /// items, negated
  CharSet(Vec<CharSetItem>, bool),
  CharClass(CharClass),
  Alt(Vec<Regex>),
  Concat(Vec<Regex>),
  Optional(Box<Regex>),
  Many(Box<Regex>),
  Many1(Box<Regex>),
  /// item, min, max (`None` is unbounded)
  Repeat(Box<Regex>, u32, Option<u32>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CharSetItem {
  Range(char, char),
  CharClass(CharClass),
  Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
  Digit,
  Word,
  Space,
  NotDigit,
  NotWord,
  NotSpace,
}

impl Regex {
  pub fn literal(text: &str) -> Regex {
    let mut chars = text.chars().map(Regex::Char).collect::<Vec<_>>();
    match chars.len() {
      0 => Regex::Empty,
      1 => chars.pop().unwrap_or(Regex::Empty),
      _ => Regex::Concat(chars),
    }
  }

  pub fn accepts_empty(&self) -> bool {
    match self {
      Regex::Empty => true,
      Regex::Alt(alts) => alts.iter().any(Regex::accepts_empty),
      Regex::Concat(items) => items.iter().all(Regex::accepts_empty),
      Regex::Many(_) | Regex::Optional(_) => true,
      Regex::Many1(item) => item.accepts_empty(),
      Regex::Repeat(item, min, _) => *min == 0 || item.accepts_empty(),
      Regex::Any | Regex::Char(_) | Regex::CharClass(_) | Regex::CharSet(..) => false,
    }
  }

  /// Half-open code point ranges matched by a single-character regex.
  /// Returns `None` for composite regexes.
  pub fn char_ranges(&self) -> Option<Vec<(u32, u32)>> {
    match self {
      Regex::Any => Some(complement(&[('\n' as u32, '\n' as u32 + 1)])),
      Regex::Char(c) => Some(vec![(*c as u32, *c as u32 + 1)]),
      Regex::CharClass(class) => Some(class.ranges()),
      Regex::CharSet(items, negated) => {
        let mut ranges = vec![];
        for item in items {
          match item {
            CharSetItem::Char(c) => ranges.push((*c as u32, *c as u32 + 1)),
            CharSetItem::Range(a, b) => ranges.push((*a as u32, *b as u32 + 1)),
            CharSetItem::CharClass(class) => ranges.extend(class.ranges()),
          }
        }
        let ranges = normalize(ranges);
        if *negated {
          Some(complement(&ranges))
        } else {
          Some(ranges)
        }
      }
      _ => None,
    }
  }
}

impl CharClass {
  pub fn ranges(self) -> Vec<(u32, u32)> {
    match self {
      CharClass::Digit => vec![('0' as u32, '9' as u32 + 1)],
      CharClass::Word => vec![
        ('0' as u32, '9' as u32 + 1),
        ('A' as u32, 'Z' as u32 + 1),
        ('_' as u32, '_' as u32 + 1),
        ('a' as u32, 'z' as u32 + 1),
      ],
      // \t \n \v \f \r and space
      CharClass::Space => vec![(0x09, 0x0E), (0x20, 0x21)],
      CharClass::NotDigit => complement(&CharClass::Digit.ranges()),
      CharClass::NotWord => complement(&CharClass::Word.ranges()),
      CharClass::NotSpace => complement(&CharClass::Space.ranges()),
    }
  }
}

/// Sorts and merges overlapping or adjacent ranges.
pub fn normalize(mut ranges: Vec<(u32, u32)>) -> Vec<(u32, u32)> {
  ranges.retain(|(a, b)| a < b);
  ranges.sort_unstable();

  let mut merged: Vec<(u32, u32)> = Vec::with_capacity(ranges.len());
  for (lo, hi) in ranges {
    match merged.last_mut() {
      Some(last) if lo <= last.1 => last.1 = last.1.max(hi),
      _ => merged.push((lo, hi)),
    }
  }
  merged
}

/// `ranges` must be normalized.
pub fn complement(ranges: &[(u32, u32)]) -> Vec<(u32, u32)> {
  let mut result = vec![];
  let mut next = 0;
  for &(lo, hi) in ranges {
    if lo > next {
      result.push((next, lo));
    }
    next = hi;
  }
  if next < CHAR_END {
    result.push((next, CHAR_END));
  }
  result
}
