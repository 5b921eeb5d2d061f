//! Error types for Mundane.
//!
//! Registration mistakes fail fast with a typed variant. Failures raised by
//! user hooks and command handlers are carried through untouched.

use thiserror::Error;

/// Main error type for Mundane operations.
#[derive(Error, Debug)]
pub enum MundaneError {
    /// Two modules tried to create a shared parser under the same name.
    #[error("Shared parser '{0}' is already registered")]
    DuplicateSharedParser(String),

    /// A module asked for a shared parser nobody created.
    #[error("Shared parser '{0}' was never registered")]
    MissingSharedParser(String),

    /// Two commands in the same scope resolve to the same name.
    #[error("Command '{name}' is already registered under '{scope}'")]
    DuplicateCommand { scope: String, name: String },

    /// Two flags on one parser share an id, short or long option.
    #[error("Conflicting flag '{flag}' on '{command}'")]
    ConflictingFlag { command: String, flag: String },

    /// A parser id that does not belong to this application.
    #[error("Unknown parser id {0}")]
    UnknownParser(usize),

    /// Any other registration-time problem reported by a module.
    #[error("Registration error: {0}")]
    Registration(String),

    /// Log manager setup errors (bad level name, subscriber already set, etc.)
    #[error("Logging error: {0}")]
    Logging(String),

    /// Configuration errors (unreadable or invalid config file)
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// An after-parse hook failed.
    #[error(transparent)]
    Hook(anyhow::Error),

    /// The selected command handler failed.
    #[error(transparent)]
    Handler(anyhow::Error),
}

impl MundaneError {
    /// Creates a duplicate shared parser error.
    pub fn duplicate_shared_parser(name: impl Into<String>) -> Self {
        Self::DuplicateSharedParser(name.into())
    }

    /// Creates a missing shared parser error.
    pub fn missing_shared_parser(name: impl Into<String>) -> Self {
        Self::MissingSharedParser(name.into())
    }

    /// Creates a duplicate command error.
    pub fn duplicate_command(scope: impl Into<String>, name: impl Into<String>) -> Self {
        Self::DuplicateCommand {
            scope: scope.into(),
            name: name.into(),
        }
    }

    /// Creates a conflicting flag error.
    pub fn conflicting_flag(command: impl Into<String>, flag: impl Into<String>) -> Self {
        Self::ConflictingFlag {
            command: command.into(),
            flag: flag.into(),
        }
    }

    /// Creates a generic registration error with the given message.
    pub fn registration(msg: impl Into<String>) -> Self {
        Self::Registration(msg.into())
    }

    /// Creates a logging error with the given message.
    pub fn logging(msg: impl Into<String>) -> Self {
        Self::Logging(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::DuplicateSharedParser(_)
            | Self::MissingSharedParser(_)
            | Self::DuplicateCommand { .. }
            | Self::ConflictingFlag { .. }
            | Self::UnknownParser(_)
            | Self::Registration(_) => "Registration Error",
            Self::Logging(_) => "Logging Error",
            Self::Config(_) => "Configuration Error",
            Self::Io(_) => "I/O Error",
            Self::Hook(_) => "Hook Error",
            Self::Handler(_) => "Command Error",
        }
    }

    /// Unwraps the error raised by a hook or handler, if that is what this is.
    pub fn into_inner(self) -> Option<anyhow::Error> {
        match self {
            Self::Hook(err) | Self::Handler(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type alias using MundaneError.
pub type Result<T> = std::result::Result<T, MundaneError>;
