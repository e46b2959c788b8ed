use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::debug;

use crate::command::{Command, CommandId, OptionId, PositionalId};
use crate::opt::Opt;
use crate::parse::Streams;
use crate::positional::Positional;
use crate::settings::Settings;
use crate::slot::Arity;
use crate::{Error, Result};

static NEXT_TREE: AtomicUsize = AtomicUsize::new(1);

// ============================================================================
// ParserBuilder
// ============================================================================

pub struct ParserBuilder {
    name: String,
    description: Option<String>,
    footer: Option<String>,
    settings: Settings,
}

impl ParserBuilder {
    pub fn new(name: &str) -> Self {
        ParserBuilder {
            name: name.to_string(),
            description: None,
            footer: None,
            settings: Settings::default(),
        }
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    pub fn footer(mut self, text: &str) -> Self {
        self.footer = Some(text.to_string());
        self
    }

    pub fn line_width(mut self, width: usize) -> Self {
        self.settings.line_width = width;
        self
    }

    pub fn indent(mut self, indent: usize) -> Self {
        self.settings.indent = indent;
        self
    }

    pub fn margin(mut self, margin: usize) -> Self {
        self.settings.margin = margin;
        self
    }

    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn build(self) -> Parser {
        let mut root = Command::new(&self.name);
        root.description = self.description;
        root.footer = self.footer;
        Parser {
            tree: NEXT_TREE.fetch_add(1, Ordering::Relaxed),
            settings: self.settings,
            commands: vec![root],
        }
    }
}

// ============================================================================
// Parser
// ============================================================================

/// Root of a command tree.
///
/// Every node lives in `commands`; index 0 is the root, whose name is the
/// program name. Child and parent links are indices into the same vector,
/// so dropping the parser drops the whole tree.
pub struct Parser {
    pub(crate) tree: usize,
    pub(crate) settings: Settings,
    pub(crate) commands: Vec<Command>,
}

impl Parser {
    pub fn builder(name: &str) -> ParserBuilder {
        ParserBuilder::new(name)
    }

    pub fn new(name: &str, description: &str) -> Self {
        ParserBuilder::new(name).description(description).build()
    }

    pub fn root(&self) -> CommandId {
        CommandId {
            tree: self.tree,
            index: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.commands[0].name
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    pub fn add_command(&mut self, parent: CommandId, command: Command) -> Result<CommandId> {
        let parent_index = self.index_of(parent)?;
        validate_command_name(&command.name)?;
        if self.child_named(parent_index, &command.name).is_some() {
            return Err(Error::RegistrationConflict(format!(
                "duplicate command '{}' in '{}'",
                command.name,
                self.command_path(parent_index)
            )));
        }

        let mut command = command;
        command.parent = Some(parent_index);
        let index = self.commands.len();
        self.commands.push(command);
        self.commands[parent_index].children.push(index);
        debug!(command = %self.command_path(index), "registered command");

        Ok(CommandId {
            tree: self.tree,
            index,
        })
    }

    pub fn add_option(&mut self, command: CommandId, opt: Opt) -> Result<OptionId> {
        let index = self.index_of(command)?;
        validate_option_names(&opt)?;

        if opt.short() == 'h' || opt.long() == "help" {
            return Err(Error::RegistrationConflict(format!(
                "option -{}/--{} collides with the reserved -h/--help",
                opt.short(),
                opt.long()
            )));
        }
        let node = &self.commands[index];
        if node.short_option(opt.short()).is_some() || node.long_option(opt.long()).is_some() {
            return Err(Error::RegistrationConflict(format!(
                "duplicate option -{}/--{} in '{}'",
                opt.short(),
                opt.long(),
                self.command_path(index)
            )));
        }

        let node = &mut self.commands[index];
        node.options.push(opt);
        Ok(OptionId {
            command,
            index: node.options.len() - 1,
        })
    }

    pub fn add_positional(
        &mut self,
        command: CommandId,
        positional: Positional,
    ) -> Result<PositionalId> {
        let index = self.index_of(command)?;
        let name = positional.name();
        if name.is_empty() {
            return Err(Error::InvalidName {
                name: name.to_string(),
                reason: "positional name is empty",
            });
        }
        if name.chars().any(char::is_whitespace) {
            return Err(Error::InvalidName {
                name: name.to_string(),
                reason: "positional name contains whitespace",
            });
        }

        let node = &self.commands[index];
        if node.positionals.iter().any(|p| p.name() == name) {
            return Err(Error::RegistrationConflict(format!(
                "duplicate positional '{}' in '{}'",
                name,
                self.command_path(index)
            )));
        }
        if let Some(last) = node.positionals.last() {
            if last.arity() == Arity::List {
                return Err(Error::RegistrationConflict(format!(
                    "positional '{}' can never be reached after list '{}'",
                    name,
                    last.name()
                )));
            }
        }

        let node = &mut self.commands[index];
        node.positionals.push(positional);
        Ok(PositionalId {
            command,
            index: node.positionals.len() - 1,
        })
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    pub fn find_command(&self, parent: CommandId, name: &str) -> Result<CommandId> {
        let parent_index = self.index_of(parent)?;
        self.child_named(parent_index, name)
            .map(|index| CommandId {
                tree: self.tree,
                index,
            })
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    /// Find an option by its long name.
    pub fn find_option(&self, command: CommandId, long: &str) -> Result<OptionId> {
        let index = self.index_of(command)?;
        self.commands[index]
            .long_option(long)
            .map(|index| OptionId { command, index })
            .ok_or_else(|| Error::NotFound(format!("--{}", long)))
    }

    pub fn find_positional(&self, command: CommandId, name: &str) -> Result<PositionalId> {
        let index = self.index_of(command)?;
        self.commands[index]
            .positionals
            .iter()
            .position(|p| p.name() == name)
            .map(|index| PositionalId { command, index })
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    pub fn subcommands(&self, command: CommandId) -> Result<Vec<CommandId>> {
        let index = self.index_of(command)?;
        Ok(self.commands[index]
            .children
            .iter()
            .map(|&index| CommandId {
                tree: self.tree,
                index,
            })
            .collect())
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn command(&self, id: CommandId) -> Result<&Command> {
        let index = self.index_of(id)?;
        Ok(&self.commands[index])
    }

    pub fn option(&self, id: OptionId) -> Result<&Opt> {
        self.command(id.command)?
            .options
            .get(id.index)
            .ok_or(Error::InvalidHandle)
    }

    pub fn positional(&self, id: PositionalId) -> Result<&Positional> {
        self.command(id.command)?
            .positionals
            .get(id.index)
            .ok_or(Error::InvalidHandle)
    }

    pub fn is_reached(&self, id: CommandId) -> Result<bool> {
        Ok(self.command(id)?.is_reached())
    }

    pub fn flag_count(&self, id: OptionId) -> Result<usize> {
        Ok(self.option(id)?.count())
    }

    pub fn is_set(&self, id: OptionId) -> Result<bool> {
        Ok(self.option(id)?.is_set())
    }

    pub fn value(&self, id: OptionId) -> Result<Option<&str>> {
        Ok(self.option(id)?.value())
    }

    pub fn values(&self, id: OptionId) -> Result<&[String]> {
        Ok(self.option(id)?.values())
    }

    // ------------------------------------------------------------------
    // Parsing entry points
    // ------------------------------------------------------------------

    /// Parse `args` (program name first), writing help to stdout and
    /// diagnostics to stderr.
    pub fn parse<I, S>(&mut self, args: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let stdout = io::stdout();
        let stderr = io::stderr();
        self.parse_with(args, &mut stdout.lock(), &mut stderr.lock())
    }

    pub fn parse_env(&mut self) -> Result<()> {
        self.parse(std::env::args())
    }

    pub fn parse_with<I, S, O, E>(&mut self, args: I, out: &mut O, err: &mut E) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        O: Write,
        E: Write,
    {
        let mut tokens: Vec<String> = args.into_iter().map(Into::into).collect();
        if tokens.is_empty() {
            tokens.push(self.commands[0].name.clone());
        }

        let mut streams = Streams { out, err };
        let consumed = self.parse_command(0, &tokens, &mut streams)?;
        if consumed < tokens.len() {
            let err = Error::UnexpectedArgument(tokens[consumed].clone());
            streams.diagnose(&err);
            return Err(err);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Internal helpers
    // ------------------------------------------------------------------

    pub(crate) fn index_of(&self, id: CommandId) -> Result<usize> {
        if id.tree != self.tree || id.index >= self.commands.len() {
            return Err(Error::InvalidHandle);
        }
        Ok(id.index)
    }

    pub(crate) fn child_named(&self, index: usize, name: &str) -> Option<usize> {
        self.commands[index]
            .children
            .iter()
            .copied()
            .find(|&child| self.commands[child].name == name)
    }

    /// Names from the root down to `index`, joined by spaces.
    pub(crate) fn command_path(&self, index: usize) -> String {
        let mut names = Vec::new();
        let mut current = Some(index);
        while let Some(i) = current {
            names.push(self.commands[i].name.as_str());
            current = self.commands[i].parent;
        }
        names.reverse();
        names.join(" ")
    }
}

fn validate_command_name(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        "command name is empty"
    } else if name.chars().any(char::is_whitespace) {
        "command name contains whitespace"
    } else if name.starts_with('-') {
        "command name starts with '-'"
    } else {
        return Ok(());
    };
    Err(Error::InvalidName {
        name: name.to_string(),
        reason,
    })
}

fn validate_option_names(opt: &Opt) -> Result<()> {
    let short = opt.short();
    if !short.is_ascii_graphic() || short == '-' {
        return Err(Error::InvalidName {
            name: short.to_string(),
            reason: "short name must be a printable ASCII character other than '-'",
        });
    }
    let long = opt.long();
    let reason = if long.is_empty() {
        "long name is empty"
    } else if long.starts_with('-') {
        "long name starts with '-'"
    } else if long.chars().any(|c| c.is_whitespace() || c == '=') {
        "long name contains whitespace or '='"
    } else {
        return Ok(());
    };
    Err(Error::InvalidName {
        name: long.to_string(),
        reason,
    })
}
