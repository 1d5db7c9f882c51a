pub mod regex;
pub mod lexer;
pub mod grammar;

pub use self::grammar::*;
pub use lexer::*;
pub use regex::{Regex, RegexError, RegexErrorKind};

pub type Map<K, V> = fnv::FnvHashMap<K, V>;
pub type Set<T> = fnv::FnvHashSet<T>;
