//! Command definitions for declarative command registration.
//!
//! A [`Registration`] describes one command: the handler to run, where it
//! lives in the command tree, which shared flag groups it inherits, and how
//! its help text is produced.

use std::fmt;
use std::rc::Rc;

use super::flags::FlagGroup;
use super::namespace::Namespace;
use super::parser::SubparserHandle;

/// Successful termination.
pub const EX_OK: i32 = 0;
/// Malformed command line, reported by the parser.
pub const EX_PARSE: i32 = 2;
/// No command resolved (BSD `sysexits.h` `EX_USAGE`).
pub const EX_USAGE: i32 = 64;

/// A type-erased command handler. `None` means "no explicit code".
pub type CommandFunc = Rc<dyn Fn(&Namespace) -> anyhow::Result<Option<i32>>>;

/// Values a handler may return in place of an exit code.
pub trait IntoExitCode {
    fn into_exit_code(self) -> Option<i32>;
}

impl IntoExitCode for () {
    fn into_exit_code(self) -> Option<i32> {
        None
    }
}

impl IntoExitCode for i32 {
    fn into_exit_code(self) -> Option<i32> {
        Some(self)
    }
}

impl IntoExitCode for Option<i32> {
    fn into_exit_code(self) -> Option<i32> {
        self
    }
}

/// Erases a handler's return type.
pub fn handler<F, R>(func: F) -> CommandFunc
where
    F: Fn(&Namespace) -> anyhow::Result<R> + 'static,
    R: IntoExitCode,
{
    Rc::new(move |args: &Namespace| func(args).map(IntoExitCode::into_exit_code))
}

/// Turns a handler identifier into a command-line token.
///
/// `two_words` becomes `two-words`. Trailing underscores (`del_`, used to
/// dodge a reserved word) and a raw identifier prefix (`r#type`) are dropped.
pub fn command_name(ident: &str) -> String {
    let ident = ident.strip_prefix("r#").unwrap_or(ident);
    ident.trim_end_matches('_').replace('_', "-")
}

/// Describes a command to register.
#[derive(Clone)]
pub struct Registration {
    pub(crate) ident: String,
    pub(crate) func: CommandFunc,
    pub(crate) doc: Option<String>,
    pub(crate) name: Option<String>,
    pub(crate) help: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) parents: Vec<FlagGroup>,
    pub(crate) subparser: Option<SubparserHandle>,
    pub(crate) usage_only: bool,
}

impl Registration {
    /// Registers `func` under a name derived from `ident`.
    pub fn new<F, R>(ident: &str, func: F) -> Self
    where
        F: Fn(&Namespace) -> anyhow::Result<R> + 'static,
        R: IntoExitCode,
    {
        Self {
            ident: ident.to_string(),
            func: handler(func),
            doc: None,
            name: None,
            help: None,
            description: None,
            parents: Vec::new(),
            subparser: None,
            usage_only: false,
        }
    }

    /// Documentation for the handler; source of the summary and description.
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Overrides the derived command name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Overrides the summary shown in the parent's command listing.
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Overrides the description shown by `--help`. Used verbatim.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Inherits the flags of `group` (snapshotted at registration).
    pub fn parent(mut self, group: FlagGroup) -> Self {
        self.parents.push(group);
        self
    }

    pub fn parents(mut self, groups: impl IntoIterator<Item = FlagGroup>) -> Self {
        self.parents.extend(groups);
        self
    }

    /// Attaches the command below another command instead of the top level.
    pub fn subparser(mut self, subparser: SubparserHandle) -> Self {
        self.subparser = Some(subparser);
        self
    }

    /// Registers a pure grouping node: selecting it without a child only
    /// prints its help.
    pub fn usage_only(mut self) -> Self {
        self.usage_only = true;
        self
    }

    /// The command-line token this registration resolves to.
    pub fn command_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| command_name(&self.ident))
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.command_name())
            .field("parents", &self.parents.len())
            .field("subparser", &self.subparser)
            .field("usage_only", &self.usage_only)
            .finish()
    }
}

/// Builds a [`Registration`] named after the handler function.
///
/// ```ignore
/// app.register_command(command!(two_words).doc("Print out two words."))?;
/// ```
#[macro_export]
macro_rules! command {
    ($func:ident) => {
        $crate::commands::Registration::new(stringify!($func), $func)
    };
}
