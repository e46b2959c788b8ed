use crate::opt::Opt;
use crate::positional::Positional;

/// Handle to a command node inside one [`Parser`](crate::Parser).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandId {
    pub(crate) tree: usize,
    pub(crate) index: usize,
}

/// Handle to an option registered on a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OptionId {
    pub(crate) command: CommandId,
    pub(crate) index: usize,
}

/// Handle to a positional registered on a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PositionalId {
    pub(crate) command: CommandId,
    pub(crate) index: usize,
}

impl OptionId {
    pub fn command(&self) -> CommandId {
        self.command
    }
}

impl PositionalId {
    pub fn command(&self) -> CommandId {
        self.command
    }
}

/// A named scope owning its options, positionals and subcommands.
///
/// Used as a builder for [`Parser::add_command`](crate::Parser::add_command);
/// the parser then owns it and fills in the structure.
#[derive(Debug)]
pub struct Command {
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) footer: Option<String>,
    pub(crate) reached: bool,
    pub(crate) parent: Option<usize>,
    pub(crate) options: Vec<Opt>,
    pub(crate) positionals: Vec<Positional>,
    pub(crate) children: Vec<usize>,
}

impl Command {
    pub fn new(name: &str) -> Self {
        Command {
            name: name.to_string(),
            description: None,
            footer: None,
            reached: false,
            parent: None,
            options: Vec::new(),
            positionals: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Text printed after everything else in help.
    pub fn footer(mut self, text: &str) -> Self {
        self.footer = Some(text.to_string());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn help(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn footer_text(&self) -> Option<&str> {
        self.footer.as_deref()
    }

    /// True once this command was dispatched to during parsing.
    pub fn is_reached(&self) -> bool {
        self.reached
    }

    pub fn options(&self) -> &[Opt] {
        &self.options
    }

    pub fn positionals(&self) -> &[Positional] {
        &self.positionals
    }

    pub(crate) fn short_option(&self, short: char) -> Option<usize> {
        self.options.iter().position(|opt| opt.short() == short)
    }

    pub(crate) fn long_option(&self, long: &str) -> Option<usize> {
        self.options.iter().position(|opt| opt.long() == long)
    }
}
