//! Help text constants for generated parsers.

/// Heading over a parser's child command listing.
pub const COMMANDS_HEADING: &str = "Commands";

/// Placeholder for the child command in usage lines.
pub const COMMAND_VALUE_NAME: &str = "command";

/// Title of the group holding the application-wide flags.
pub const GLOBAL_FLAGS_TITLE: &str = "Global flags";

/// Help text of the `-h/--help` flag every parser carries.
pub const HELP_FLAG_TEXT: &str = "Show this help message and exit";

/// Epilog pointing from a command listing to per-command help.
pub fn more_details(prog_path: &str) -> String {
    format!("For more details: {prog_path} <command> --help")
}
