//! Command registration, parsing and dispatch.
//!
//! Commands are described declaratively with [`Registration`] and attached to
//! a [`CommandTree`]. Parsing yields a [`Namespace`] that carries the flag
//! values and the handler of the selected command.

pub mod definitions;
pub mod flags;
pub mod help;
pub mod hooks;
pub mod namespace;
pub mod parser;
pub mod router;
pub mod shared;

pub use definitions::{
    command_name, handler, CommandFunc, IntoExitCode, Registration, EX_OK, EX_PARSE, EX_USAGE,
};
pub use flags::{Flag, FlagAction, FlagGroup, FlagKind, ValueType};
pub use hooks::{AfterParseHook, HookChain};
pub use namespace::{Namespace, Value};
pub use parser::{ParseOutcome, Parser, ParserId, SubparserHandle};
pub use router::CommandTree;
pub use shared::SharedParsers;
