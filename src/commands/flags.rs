//! Flag specifications and the groups that hold them.
//!
//! A [`Flag`] is a declarative description that is turned into one or more
//! clap arguments when the command tree is built. Parsed values are read back
//! into a [`Namespace`] under the flag's id.

use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;

use clap::builder::PossibleValuesParser;
use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches};

use super::help::HELP_FLAG_TEXT;
use super::namespace::{Namespace, Value};
use crate::error::Result;

/// Callback applied while flags are parsed, before any hook runs.
///
/// Values of action flags are never stored in the parsed result.
pub trait FlagAction {
    fn apply(&self, value: &str) -> Result<()>;

    /// Accepted values; empty means any value.
    fn choices(&self) -> Vec<String> {
        Vec::new()
    }

    /// Current effective value, shown in help.
    fn current(&self) -> Option<String> {
        None
    }
}

/// Type of a flag's argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    String,
    Int,
    Float,
    Path,
}

/// What a flag does when it appears on the command line.
#[derive(Clone)]
pub enum FlagKind {
    /// Stores one value.
    Store(ValueType),
    /// Collects every occurrence.
    Append(ValueType),
    /// `--flag` stores `true`; defaults to `false`.
    Switch,
    /// `--flag` / `--no-flag`; absent unless given or defaulted.
    Toggle,
    /// Counts occurrences.
    Count,
    /// Prints help and stops.
    Help,
    /// Applies a callback with the value.
    Action(Rc<dyn FlagAction>),
}

impl fmt::Debug for FlagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Store(t) => f.debug_tuple("Store").field(t).finish(),
            Self::Append(t) => f.debug_tuple("Append").field(t).finish(),
            Self::Switch => f.write_str("Switch"),
            Self::Toggle => f.write_str("Toggle"),
            Self::Count => f.write_str("Count"),
            Self::Help => f.write_str("Help"),
            Self::Action(_) => f.write_str("Action"),
        }
    }
}

/// A single flag definition.
#[derive(Debug, Clone)]
pub struct Flag {
    id: String,
    kind: FlagKind,
    short: Option<char>,
    long: Option<String>,
    help: Option<String>,
    value_name: Option<String>,
    required: bool,
    default: Option<Value>,
    choices: Vec<String>,
}

impl Flag {
    /// Creates a flag of `kind` stored under `id`, with `--id` (underscores
    /// hyphenated) as its long option.
    pub fn new(id: impl Into<String>, kind: FlagKind) -> Self {
        let id = id.into();
        let long = id.replace('_', "-");
        Self {
            id,
            kind,
            short: None,
            long: Some(long),
            help: None,
            value_name: None,
            required: false,
            default: None,
            choices: Vec::new(),
        }
    }

    pub fn value(id: impl Into<String>) -> Self {
        Self::new(id, FlagKind::Store(ValueType::String))
    }

    pub fn int(id: impl Into<String>) -> Self {
        Self::new(id, FlagKind::Store(ValueType::Int))
    }

    pub fn float(id: impl Into<String>) -> Self {
        Self::new(id, FlagKind::Store(ValueType::Float))
    }

    pub fn path(id: impl Into<String>) -> Self {
        Self::new(id, FlagKind::Store(ValueType::Path))
    }

    pub fn append(id: impl Into<String>) -> Self {
        Self::new(id, FlagKind::Append(ValueType::String))
    }

    pub fn switch(id: impl Into<String>) -> Self {
        Self::new(id, FlagKind::Switch)
    }

    pub fn toggle(id: impl Into<String>) -> Self {
        Self::new(id, FlagKind::Toggle)
    }

    pub fn count(id: impl Into<String>) -> Self {
        Self::new(id, FlagKind::Count)
    }

    /// `-h/--help`.
    pub fn help_flag() -> Self {
        Self::new("help", FlagKind::Help)
            .short('h')
            .help(HELP_FLAG_TEXT)
    }

    pub fn action(id: impl Into<String>, action: impl FlagAction + 'static) -> Self {
        Self::new(id, FlagKind::Action(Rc::new(action)))
    }

    pub fn short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    pub fn long(mut self, long: impl Into<String>) -> Self {
        self.long = Some(long.into());
        self
    }

    /// Removes the long option; the flag is then reachable only by `short`.
    pub fn no_long(mut self) -> Self {
        self.long = None;
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn value_name(mut self, name: impl Into<String>) -> Self {
        self.value_name = Some(name.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> &FlagKind {
        &self.kind
    }

    pub fn short_name(&self) -> Option<char> {
        self.short
    }

    pub fn long_name(&self) -> Option<&str> {
        self.long.as_deref()
    }

    fn negated_id(&self) -> String {
        format!("no_{}", self.id)
    }

    /// Every id, short and long option this flag claims on its parser.
    pub(crate) fn claims(&self) -> Vec<String> {
        let mut claims = vec![self.id.clone()];
        if let Some(short) = self.short {
            claims.push(format!("-{short}"));
        }
        if let Some(long) = &self.long {
            claims.push(format!("--{long}"));
            if matches!(self.kind, FlagKind::Toggle) {
                claims.push(format!("--no-{long}"));
            }
        }
        if matches!(self.kind, FlagKind::Toggle) {
            claims.push(self.negated_id());
        }
        claims
    }

    /// Builds the clap arguments for this flag.
    pub(crate) fn to_args(&self, heading: Option<&str>) -> Vec<Arg> {
        let mut arg = Arg::new(self.id.clone()).required(self.required);
        if let Some(short) = self.short {
            arg = arg.short(short);
        }
        if let Some(long) = &self.long {
            arg = arg.long(long.clone());
        }
        if let Some(name) = &self.value_name {
            arg = arg.value_name(name.clone());
        }
        if let Some(heading) = heading {
            arg = arg.help_heading(heading.to_string());
        }

        let mut help = self.help.clone();
        let mut extra = Vec::new();

        match &self.kind {
            FlagKind::Store(value_type) | FlagKind::Append(value_type) => {
                let action = if matches!(self.kind, FlagKind::Append(_)) {
                    ArgAction::Append
                } else {
                    ArgAction::Set
                };
                arg = arg.action(action);
                arg = if self.choices.is_empty() {
                    match value_type {
                        ValueType::String => arg.value_parser(clap::value_parser!(String)),
                        ValueType::Int => arg.value_parser(clap::value_parser!(i64)),
                        ValueType::Float => arg.value_parser(clap::value_parser!(f64)),
                        ValueType::Path => arg.value_parser(clap::value_parser!(PathBuf)),
                    }
                } else {
                    arg.value_parser(PossibleValuesParser::new(self.choices.clone()))
                };
                arg = match &self.default {
                    Some(Value::List(items)) => {
                        arg.default_values(items.iter().map(ToString::to_string))
                    }
                    Some(default) => arg.default_value(default.to_string()),
                    None => arg,
                };
            }
            FlagKind::Switch => {
                arg = arg.action(ArgAction::SetTrue);
            }
            FlagKind::Count => {
                arg = arg.action(ArgAction::Count);
            }
            FlagKind::Help => {
                arg = arg.action(ArgAction::HelpLong);
            }
            FlagKind::Toggle => {
                let negated = self.negated_id();
                arg = arg.action(ArgAction::SetTrue).overrides_with(negated.clone());
                let mut no_arg = Arg::new(negated)
                    .action(ArgAction::SetTrue)
                    .overrides_with(self.id.clone());
                if let Some(long) = &self.long {
                    no_arg = no_arg.long(format!("no-{long}"));
                }
                if let Some(heading) = heading {
                    no_arg = no_arg.help_heading(heading.to_string());
                }
                if let Some(Value::Bool(default)) = &self.default {
                    help = Some(format!(
                        "{} (default: {default})",
                        help.unwrap_or_default()
                    ));
                }
                extra.push(no_arg);
            }
            FlagKind::Action(action) => {
                let choices = action.choices();
                arg = arg.action(ArgAction::Set);
                if !choices.is_empty() {
                    arg = arg
                        .value_parser(PossibleValuesParser::new(choices))
                        .ignore_case(true);
                }
                if let Some(current) = action.current() {
                    help = Some(format!(
                        "{} (Default: {current})",
                        help.unwrap_or_default()
                    ));
                }
            }
        }

        if let Some(help) = help {
            arg = arg.help(help.trim_start().to_string());
        }

        let mut args = vec![arg];
        args.extend(extra);
        args
    }

    /// Reads this flag's parsed value into `ns`, or runs its action.
    pub(crate) fn collect(&self, matches: &ArgMatches, ns: &mut Namespace) -> Result<()> {
        let id = self.id.as_str();
        match &self.kind {
            FlagKind::Store(value_type) => {
                if let Some(value) = read_one(matches, id, *value_type, !self.choices.is_empty()) {
                    ns.set(id, value);
                }
            }
            FlagKind::Append(value_type) => {
                if let Some(values) =
                    read_many(matches, id, *value_type, !self.choices.is_empty())
                {
                    ns.set(id, Value::List(values));
                }
            }
            FlagKind::Switch => {
                let set = matches.try_get_one::<bool>(id).ok().flatten().copied();
                ns.set(id, set.unwrap_or(false));
            }
            FlagKind::Count => {
                let count = matches.try_get_one::<u8>(id).ok().flatten().copied();
                ns.set(id, i64::from(count.unwrap_or(0)));
            }
            FlagKind::Toggle => {
                let negated = self.negated_id();
                if given(matches, id) {
                    ns.set(id, true);
                } else if given(matches, &negated) {
                    ns.set(id, false);
                } else if let Some(default) = &self.default {
                    ns.set(id, default.clone());
                }
            }
            FlagKind::Help => {}
            FlagKind::Action(action) => {
                if let Ok(Some(value)) = matches.try_get_one::<String>(id) {
                    action.apply(value)?;
                }
            }
        }
        Ok(())
    }
}

fn given(matches: &ArgMatches, id: &str) -> bool {
    matches!(matches.value_source(id), Some(ValueSource::CommandLine))
}

fn read_one(matches: &ArgMatches, id: &str, value_type: ValueType, choices: bool) -> Option<Value> {
    if choices {
        return matches
            .try_get_one::<String>(id)
            .ok()
            .flatten()
            .map(|s| Value::Str(s.clone()));
    }
    match value_type {
        ValueType::String => matches
            .try_get_one::<String>(id)
            .ok()
            .flatten()
            .map(|s| Value::Str(s.clone())),
        ValueType::Int => matches
            .try_get_one::<i64>(id)
            .ok()
            .flatten()
            .map(|i| Value::Int(*i)),
        ValueType::Float => matches
            .try_get_one::<f64>(id)
            .ok()
            .flatten()
            .map(|x| Value::Float(*x)),
        ValueType::Path => matches
            .try_get_one::<PathBuf>(id)
            .ok()
            .flatten()
            .map(|p| Value::Path(p.clone())),
    }
}

fn read_many(
    matches: &ArgMatches,
    id: &str,
    value_type: ValueType,
    choices: bool,
) -> Option<Vec<Value>> {
    fn many<T>(matches: &ArgMatches, id: &str, f: impl Fn(&T) -> Value) -> Option<Vec<Value>>
    where
        T: Clone + Send + Sync + 'static,
    {
        let values = matches.try_get_many::<T>(id).ok().flatten()?;
        Some(values.map(f).collect())
    }

    if choices {
        return many::<String>(matches, id, |s| Value::Str(s.clone()));
    }
    match value_type {
        ValueType::String => many::<String>(matches, id, |s| Value::Str(s.clone())),
        ValueType::Int => many::<i64>(matches, id, |i| Value::Int(*i)),
        ValueType::Float => many::<f64>(matches, id, |x| Value::Float(*x)),
        ValueType::Path => many::<PathBuf>(matches, id, |p| Value::Path(p.clone())),
    }
}

/// An ordered, optionally titled collection of flags.
///
/// Used for the global flags, for shared parent fragments and for ad hoc
/// groups folded into a single command.
#[derive(Debug, Clone, Default)]
pub struct FlagGroup {
    title: Option<String>,
    flags: Vec<Flag>,
}

impl FlagGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// A group rendered under its own heading in help output.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            flags: Vec::new(),
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn add(&mut self, flag: Flag) -> &mut Self {
        self.flags.push(flag);
        self
    }

    pub fn flags(&self) -> &[Flag] {
        &self.flags
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }
}
