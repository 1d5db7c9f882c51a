//! An LALR(1) parser generator driven from code.
//!
//! Terminals are regular expressions, productions are sequences of
//! terminals and nonterminals with a reduce function each. `create_parser`
//! builds a lexer and ACTION/GOTO tables once; the resulting `Parser` turns
//! input text into a value of the user's type `T`.

mod configurator;
mod error;
mod parser;
mod report;

pub use configurator::{
  configure, Configurator, LexerSettings, NonTerminal, Part, PrecedenceGroup,
  ProductionBuilder, Terminal, TerminalRef,
};
pub use error::{ConstructionError, Location, ParseError};
pub use parser::Parser;
pub use grammar::LexerRuntime;
pub use lr::{Action, Conflict, LrTables, StateId};
