//! Mundane - a small framework for command-line applications.
//!
//! Modules contribute global flags, shared flag groups and commands to an
//! [`App`]. At run time the command line is parsed, after-parse hooks may
//! rewrite the result, and the handler of the selected command is called.
//! Help text for each command comes from its documentation string.

pub mod app;
pub mod commands;
pub mod config;
pub mod docstring;
pub mod error;
pub mod logging;
pub mod module;
pub mod platform;

pub use app::{App, AppOptions};
pub use commands::{Flag, FlagGroup, Namespace, ParseOutcome, Registration};
pub use config::Config;
pub use docstring::Docstring;
pub use error::{MundaneError, Result};
pub use logging::LogManager;
pub use module::Module;
