//! Command-line parsing over a tree of commands.
//!
//! Options (`-s`/`--long`), positionals and subcommands are registered on
//! [`Command`] nodes owned by a [`Parser`]. Registration hands back small
//! `Copy` handles that answer queries once the argument vector was parsed:
//! - flags count every occurrence, `-vvv` included
//! - values and lists are filled at most once
//! - positionals are always required and filled in registration order
//! - `-h`/`--help` prints help for the command it appears in and aborts

mod command;
mod error;
mod help;
mod opt;
mod parse;
mod parser;
mod positional;
mod settings;
mod slot;

pub use command::{Command, CommandId, OptionId, PositionalId};
pub use error::{Error, Result};
pub use opt::Opt;
pub use parser::{Parser, ParserBuilder};
pub use positional::Positional;
pub use settings::Settings;
pub use slot::Arity;
