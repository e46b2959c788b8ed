use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Duplicate short/long flag, command or positional name on one command.
    #[error("{0}")]
    RegistrationConflict(String),

    #[error("invalid name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("unknown option '{0}'")]
    UnknownToken(String),

    #[error("option '{option}' takes a value and cannot be combined in '{token}'")]
    ClusteredValue { option: String, token: String },

    #[error("unexpected argument '{0}'")]
    UnexpectedArgument(String),

    #[error("'{0}' was already given")]
    AlreadyPopulated(String),

    #[error("'{0}' expects a value")]
    InsufficientTokens(String),

    #[error("missing required arguments for '{command}': {}", .missing.join(", "))]
    MissingRequired { command: String, missing: Vec<String> },

    #[error("command '{0}' was already parsed")]
    Reentrancy(String),

    #[error("help requested")]
    HelpRequested,

    #[error("handle does not belong to this parser")]
    InvalidHandle,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("can't parse '{name}': {reason}")]
    InvalidValue { name: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// True for the `-h`/`--help` abort, which is reported like a failure
    /// but needs no diagnostic.
    pub fn is_help(&self) -> bool {
        matches!(self, Error::HelpRequested)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_required_lists_every_item() {
        let err = Error::MissingRequired {
            command: "prog run".to_string(),
            missing: vec!["-f, --flag <FLAG>".to_string(), "INPUT".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "missing required arguments for 'prog run': -f, --flag <FLAG>, INPUT"
        );
    }

    #[test]
    fn only_help_is_help() {
        assert!(Error::HelpRequested.is_help());
        assert!(!Error::UnknownToken("-x".to_string()).is_help());
    }
}
