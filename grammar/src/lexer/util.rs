/// Maps a code point to the index of the character interval containing it.
///
/// `char_intervals` holds the sorted lower bounds of all intervals and
/// always starts with 0.
pub fn find_char_interval(char: u32, char_intervals: &[u32]) -> u32 {
  let mut lo = 0;
  let mut hi = char_intervals.len();

  while lo < hi {
    let mid = (lo + hi) / 2;
    if char_intervals[mid] > char {
      hi = mid;
    } else {
      lo = mid + 1;
    }
  }

  lo.saturating_sub(1) as u32
}
