//! One node of the command tree and its clap rendering.
//!
//! A [`Parser`] is a declarative description: its own flags, the groups it
//! inherited, an optional default handler, and the ids of its child commands.
//! The clap `Command` is only built when the tree is parsed or help is
//! rendered, so flags may be added any time before that.

use std::collections::HashSet;

use clap::{ArgMatches, Command};

use super::definitions::{handler, CommandFunc, IntoExitCode};
use super::flags::{Flag, FlagGroup};
use super::help::{COMMANDS_HEADING, COMMAND_VALUE_NAME};
use super::namespace::Namespace;
use crate::error::{MundaneError, Result};

/// Identifies a parser within one application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParserId(pub(crate) usize);

impl ParserId {
    /// The application's top-level parser.
    pub const ROOT: ParserId = ParserId(0);
}

/// A parser's child dispatch table; pass it to a registration to nest a
/// command below the owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubparserHandle {
    pub(crate) owner: ParserId,
}

/// Result of one parse.
#[derive(Debug)]
pub enum ParseOutcome {
    Parsed(Namespace),
    /// `-h/--help` was given; carries the rendered help.
    HelpRequested(String),
    /// Malformed command line; carries the rendered diagnostic.
    UsageError { message: String, code: i32 },
}

/// A node of the command tree.
pub struct Parser {
    pub(crate) id: ParserId,
    pub(crate) parent: Option<ParserId>,
    pub(crate) name: String,
    pub(crate) summary: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) usage: Option<String>,
    pub(crate) epilog: Option<String>,
    /// Index 0 holds the parser's own untitled flags.
    pub(crate) groups: Vec<FlagGroup>,
    pub(crate) func: Option<CommandFunc>,
    pub(crate) children: Option<Vec<ParserId>>,
}

impl Parser {
    pub(crate) fn new(id: ParserId, parent: Option<ParserId>, name: impl Into<String>) -> Self {
        Self {
            id,
            parent,
            name: name.into(),
            summary: None,
            description: None,
            usage: None,
            epilog: None,
            groups: vec![FlagGroup::new()],
            func: None,
            children: None,
        }
    }

    pub fn id(&self) -> ParserId {
        self.id
    }

    /// The command token, or the program name for the root.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> &mut Self {
        self.description = Some(description.into());
        self
    }

    pub fn set_usage(&mut self, usage: impl Into<String>) -> &mut Self {
        self.usage = Some(usage.into());
        self
    }

    pub fn set_epilog(&mut self, epilog: impl Into<String>) -> &mut Self {
        self.epilog = Some(epilog.into());
        self
    }

    /// Adds a flag to this parser's own flags.
    pub fn add_flag(&mut self, flag: Flag) -> &mut Self {
        self.groups[0].add(flag);
        self
    }

    /// Returns the group titled `title`, creating it on first use.
    pub fn add_group(&mut self, title: &str) -> &mut FlagGroup {
        let index = match self.groups.iter().position(|g| g.title() == Some(title)) {
            Some(index) => index,
            None => {
                self.groups.push(FlagGroup::titled(title));
                self.groups.len() - 1
            }
        };
        &mut self.groups[index]
    }

    /// Folds the flags of `group` into this parser.
    pub(crate) fn inherit(&mut self, group: &FlagGroup) {
        match group.title() {
            Some(title) => {
                let target = self.add_group(title);
                for flag in group.flags() {
                    target.add(flag.clone());
                }
            }
            None => {
                for flag in group.flags() {
                    self.groups[0].add(flag.clone());
                }
            }
        }
    }

    /// Installs the handler used when this parser is the deepest one selected
    /// and none of its selected descendants has a handler.
    pub fn set_default_func<F, R>(&mut self, func: F) -> &mut Self
    where
        F: Fn(&Namespace) -> anyhow::Result<R> + 'static,
        R: IntoExitCode,
    {
        self.func = Some(handler(func));
        self
    }

    pub fn clear_default_func(&mut self) -> &mut Self {
        self.func = None;
        self
    }

    pub fn has_func(&self) -> bool {
        self.func.is_some()
    }

    /// Every flag on this parser, in declaration order.
    pub fn flags(&self) -> impl Iterator<Item = &Flag> {
        self.groups.iter().flat_map(|g| g.flags().iter())
    }

    /// Ids of child commands, if a subparser is attached.
    pub fn children(&self) -> &[ParserId] {
        self.children.as_deref().unwrap_or_default()
    }

    pub fn has_subparser(&self) -> bool {
        self.children.is_some()
    }

    /// Rejects flags that would collide inside clap.
    pub(crate) fn check_conflicts(&self, display_name: &str) -> Result<()> {
        let mut seen = HashSet::new();
        for flag in self.flags() {
            for claim in flag.claims() {
                if !seen.insert(claim.clone()) {
                    return Err(MundaneError::conflicting_flag(display_name, claim));
                }
            }
        }
        Ok(())
    }

    /// Builds this node's clap command, without children.
    pub(crate) fn to_command(&self, display_name: &str, width: usize) -> Command {
        let mut cmd = Command::new(self.name.clone())
            .disable_help_flag(true)
            .disable_help_subcommand(true)
            .disable_version_flag(true)
            .term_width(width);

        if let Some(summary) = &self.summary {
            cmd = cmd.about(summary.clone());
        }
        if let Some(description) = &self.description {
            cmd = cmd.long_about(description.clone());
        }
        if let Some(usage) = &self.usage {
            cmd = cmd.override_usage(usage.clone());
        }
        for group in &self.groups {
            for flag in group.flags() {
                for arg in flag.to_args(group.title()) {
                    cmd = cmd.arg(arg);
                }
            }
        }

        let pointer = self
            .has_subparser()
            .then(|| super::help::more_details(display_name));
        if pointer.is_some() {
            cmd = cmd
                .subcommand_help_heading(COMMANDS_HEADING)
                .subcommand_value_name(COMMAND_VALUE_NAME);
        }
        let after = match (&self.epilog, pointer) {
            (Some(epilog), Some(pointer)) => Some(format!("{epilog}\n\n{pointer}")),
            (Some(epilog), None) => Some(epilog.clone()),
            (None, pointer) => pointer,
        };
        if let Some(after) = after {
            cmd = cmd.after_long_help(after);
        }

        cmd
    }

    /// Copies this level's parsed flags into `ns`, running flag actions.
    pub(crate) fn collect(&self, matches: &ArgMatches, ns: &mut Namespace) -> Result<()> {
        for flag in self.flags() {
            flag.collect(matches, ns)?;
        }
        if let Some(func) = &self.func {
            ns.set_func(func.clone());
        }
        Ok(())
    }
}

impl std::fmt::Debug for Parser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("flags", &self.flags().map(Flag::id).collect::<Vec<_>>())
            .field("func", &self.func.is_some())
            .field("children", &self.children)
            .finish()
    }
}
