//! Command tree and argument routing.
//!
//! Parsers live in an arena owned by [`CommandTree`]; children refer to
//! their parent by id. The clap command tree is rebuilt from the arena for
//! every parse and every help rendering, so registration order does not
//! matter as long as it completes before `parse` is called.

use std::ffi::OsString;

use clap::error::ErrorKind;
use clap::{ArgMatches, Command};

use super::definitions::EX_PARSE;
use super::namespace::Namespace;
use super::parser::{ParseOutcome, Parser, ParserId, SubparserHandle};
use crate::error::{MundaneError, Result};

/// Hierarchical registry of parsers.
#[derive(Debug)]
pub struct CommandTree {
    nodes: Vec<Parser>,
    width: usize,
}

impl CommandTree {
    /// Creates a tree holding only the root parser, named `prog`.
    pub fn new(prog: impl Into<String>, width: usize) -> Self {
        Self {
            nodes: vec![Parser::new(ParserId::ROOT, None, prog)],
            width,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> &Parser {
        &self.nodes[ParserId::ROOT.0]
    }

    pub fn root_mut(&mut self) -> &mut Parser {
        &mut self.nodes[ParserId::ROOT.0]
    }

    pub fn get(&self, id: ParserId) -> Result<&Parser> {
        self.nodes.get(id.0).ok_or(MundaneError::UnknownParser(id.0))
    }

    pub fn get_mut(&mut self, id: ParserId) -> Result<&mut Parser> {
        self.nodes
            .get_mut(id.0)
            .ok_or(MundaneError::UnknownParser(id.0))
    }

    /// Attaches a child dispatch table to `owner`, reusing an existing one.
    pub fn new_subparser(&mut self, owner: ParserId) -> Result<SubparserHandle> {
        let parser = self.get_mut(owner)?;
        parser.children.get_or_insert_with(Vec::new);
        Ok(SubparserHandle { owner })
    }

    /// Adds an empty child named `name` below the handle's owner.
    pub fn insert(&mut self, handle: SubparserHandle, name: &str) -> Result<&mut Parser> {
        let owner = handle.owner;
        if self.child(owner, name).is_some() {
            return Err(MundaneError::duplicate_command(self.display_name(owner), name));
        }

        let id = ParserId(self.nodes.len());
        self.new_subparser(owner)?;
        self.nodes.push(Parser::new(id, Some(owner), name));
        if let Some(children) = self.nodes[owner.0].children.as_mut() {
            children.push(id);
        }
        Ok(&mut self.nodes[id.0])
    }

    /// The child of `owner` called `name`, if any.
    pub fn child(&self, owner: ParserId, name: &str) -> Option<ParserId> {
        let parser = self.nodes.get(owner.0)?;
        parser
            .children()
            .iter()
            .copied()
            .find(|child| self.nodes[child.0].name == name)
    }

    /// Names from the root down to `id`, root first.
    pub fn path(&self, id: ParserId) -> Vec<&str> {
        let mut names = Vec::new();
        let mut current = self.nodes.get(id.0);
        while let Some(parser) = current {
            names.push(parser.name.as_str());
            current = parser.parent.and_then(|p| self.nodes.get(p.0));
        }
        names.reverse();
        names
    }

    /// The program path shown in help, e.g. `nebulous general`.
    pub fn display_name(&self, id: ParserId) -> String {
        self.path(id).join(" ")
    }

    /// Follows a command path from the root, stopping at the deepest match.
    pub fn resolve<S: AsRef<str>>(&self, command_path: &[S]) -> ParserId {
        let mut id = ParserId::ROOT;
        for name in command_path {
            match self.child(id, name.as_ref()) {
                Some(child) => id = child,
                None => break,
            }
        }
        id
    }

    /// Builds the clap command rooted at `id`, checking every node for flag
    /// conflicts on the way.
    fn build(&self, id: ParserId) -> Result<Command> {
        let parser = self.get(id)?;
        let display_name = self.display_name(id);
        parser.check_conflicts(&display_name)?;

        let mut cmd = parser.to_command(&display_name, self.width);
        for child in parser.children() {
            cmd = cmd.subcommand(self.build(*child)?);
        }
        Ok(cmd)
    }

    /// Parses `argv` (without the program name).
    pub fn parse<I, T>(&self, argv: I) -> Result<ParseOutcome>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let cmd = self.build(ParserId::ROOT)?;
        let args = std::iter::once(OsString::from(&self.root().name))
            .chain(argv.into_iter().map(Into::into));

        match cmd.try_get_matches_from(args) {
            Ok(matches) => self.extract(&matches).map(ParseOutcome::Parsed),
            Err(e) => match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    Ok(ParseOutcome::HelpRequested(e.render().to_string()))
                }
                _ => Ok(ParseOutcome::UsageError {
                    message: e.render().to_string(),
                    code: EX_PARSE,
                }),
            },
        }
    }

    /// Walks the matches from the root to the selected leaf, collecting
    /// each level's flags. A node without a handler keeps its ancestor's.
    fn extract(&self, matches: &ArgMatches) -> Result<Namespace> {
        let mut ns = Namespace::new();
        let mut id = ParserId::ROOT;
        let mut matches = matches;

        loop {
            self.get(id)?.collect(matches, &mut ns)?;
            let Some((name, sub_matches)) = matches.subcommand() else {
                break;
            };
            id = self.child(id, name).ok_or_else(|| {
                MundaneError::registration(format!(
                    "parsed unknown command '{name}' under '{}'",
                    self.display_name(id)
                ))
            })?;
            ns.push_command(name);
            matches = sub_matches;
        }

        Ok(ns)
    }

    /// Renders the long help of the parser `id`.
    pub fn render_help(&self, id: ParserId) -> Result<String> {
        let mut cmd = self.build(ParserId::ROOT)?;
        cmd.build();

        let path = self.path(id);
        let mut current = &mut cmd;
        for name in path.iter().skip(1) {
            current = current
                .find_subcommand_mut(name)
                .ok_or(MundaneError::UnknownParser(id.0))?;
        }
        Ok(current.render_long_help().to_string())
    }
}
