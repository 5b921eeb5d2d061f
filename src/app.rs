//! Core orchestrator for Mundane applications.
//!
//! An [`App`] owns the command tree, the shared flag groups and the
//! after-parse hooks. A typical `main` looks like:
//!
//! ```ignore
//! let mut app = App::new(AppOptions::new().use_log_mgr(true))?;
//! app.register_global_flags(&[&module1, &module2])?;
//! app.register_shared_flags(&[&module1, &module2])?;
//! app.register_commands(&[&module1, &module2])?;
//! std::process::exit(app.run(std::env::args_os().skip(1))?);
//! ```
//!
//! Running parses the command line, passes the result through every hook in
//! registration order, and calls the handler of the selected command. When
//! no handler was selected the help of the deepest selected command is
//! printed and [`EX_USAGE`] is returned.

use std::cell::OnceCell;
use std::ffi::OsString;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::commands::help::GLOBAL_FLAGS_TITLE;
use crate::commands::{
    CommandTree, Flag, FlagGroup, HookChain, Namespace, ParseOutcome, Parser, ParserId,
    Registration, SharedParsers, SubparserHandle, EX_OK, EX_USAGE,
};
use crate::config::Config;
use crate::docstring::Docstring;
use crate::error::{MundaneError, Result};
use crate::logging::LogManager;
use crate::module::Module;
use crate::platform::{self, AppDirs};

/// Construction options for an [`App`].
#[derive(Debug, Clone, Default)]
pub struct AppOptions {
    prog: Option<String>,
    usage: Option<String>,
    epilog: Option<String>,
    description: Option<String>,
    doc: Option<String>,
    width: Option<usize>,
    use_log_mgr: bool,
    log_manager: Option<LogManager>,
    log_level: Option<String>,
    log_dir: Option<PathBuf>,
}

impl AppOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Program name used in help and log file names. Defaults to the file
    /// stem of the running executable.
    pub fn prog(mut self, prog: impl Into<String>) -> Self {
        self.prog = Some(prog.into());
        self
    }

    /// Replaces the generated top-level usage line.
    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    pub fn epilog(mut self, epilog: impl Into<String>) -> Self {
        self.epilog = Some(epilog.into());
        self
    }

    /// Top-level description, used verbatim. Wins over
    /// [`AppOptions::description_from_doc`].
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Top-level description taken from a documentation string, reflowed to
    /// the help width.
    pub fn description_from_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Help width in columns; skips terminal detection.
    pub fn width(mut self, width: usize) -> Self {
        self.width = Some(width);
        self
    }

    /// Activates a global [`LogManager`] writing to the user log directory
    /// and adds its flags to the global flags.
    pub fn use_log_mgr(mut self, enabled: bool) -> Self {
        self.use_log_mgr = enabled;
        self
    }

    /// Uses `manager` instead of activating a new one. Implies
    /// `use_log_mgr(true)`.
    pub fn log_manager(mut self, manager: LogManager) -> Self {
        self.log_manager = Some(manager);
        self.use_log_mgr = true;
        self
    }

    /// Initial log level, before any `--log-level` flag.
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = Some(level.into());
        self
    }

    /// Initial log directory, before any `--log-dir` flag.
    pub fn log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    /// Folds in settings from a configuration file. Values present in the
    /// file replace the ones set so far.
    pub fn apply_config(mut self, config: &Config) -> Self {
        if let Some(description) = &config.app.description {
            self.description = Some(description.clone());
        }
        if let Some(epilog) = &config.app.epilog {
            self.epilog = Some(epilog.clone());
        }
        if let Some(width) = config.app.width {
            self.width = Some(width);
        }
        if let Some(level) = &config.log.level {
            self.log_level = Some(level.clone());
        }
        if let Some(dir) = &config.log.dir {
            self.log_dir = Some(dir.clone());
        }
        self
    }
}

fn default_prog() -> String {
    std::env::args_os()
        .next()
        .and_then(|arg0| {
            Path::new(&arg0)
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
        })
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "app".to_string())
}

/// A command-line application.
pub struct App {
    tree: CommandTree,
    shared: SharedParsers,
    hooks: HookChain,
    subparser: Option<SubparserHandle>,
    dirs: OnceCell<AppDirs>,
    log_manager: Option<LogManager>,
}

impl App {
    pub fn new(options: AppOptions) -> Result<Self> {
        let prog = options.prog.unwrap_or_else(default_prog);
        let width = options.width.unwrap_or_else(platform::terminal_width);

        let mut tree = CommandTree::new(prog, width);
        let root = tree.root_mut();

        let description = options.description.or_else(|| {
            let (_, description) = Docstring::new(options.doc.as_deref(), width).into_parts();
            description
        });
        if let Some(description) = description {
            root.set_description(description);
        }
        if let Some(usage) = options.usage {
            root.set_usage(usage);
        }
        if let Some(epilog) = options.epilog {
            root.set_epilog(epilog);
        }
        root.add_group(GLOBAL_FLAGS_TITLE).add(Flag::help_flag());

        let mut app = Self {
            tree,
            shared: SharedParsers::new(),
            hooks: HookChain::new(),
            subparser: None,
            dirs: OnceCell::new(),
            log_manager: None,
        };

        if options.use_log_mgr {
            let manager = match options.log_manager {
                Some(manager) => manager,
                None => LogManager::activate(app.appname(), app.dirs().user_log_dir())?,
            };
            if let Some(level) = &options.log_level {
                manager.set_level(level)?;
            }
            if let Some(dir) = options.log_dir {
                manager.set_log_dir(dir);
            }
            app.register_global_flags(&[&manager])?;
            app.log_manager = Some(manager);
        }

        Ok(app)
    }

    /// The program name.
    pub fn appname(&self) -> &str {
        self.tree.root().name()
    }

    /// Width, in columns, used to format help.
    pub fn width(&self) -> usize {
        self.tree.width()
    }

    /// Per-user directories for this application, resolved on first use.
    pub fn dirs(&self) -> &AppDirs {
        self.dirs.get_or_init(|| AppDirs::new(self.appname()))
    }

    pub fn log_manager(&self) -> Option<&LogManager> {
        self.log_manager.as_ref()
    }

    /// The top-level parser.
    pub fn parser(&self) -> &Parser {
        self.tree.root()
    }

    /// The top-level parser, e.g. to install a fallback handler with
    /// [`Parser::set_default_func`].
    pub fn parser_mut(&mut self) -> &mut Parser {
        self.tree.root_mut()
    }

    pub fn command_parser(&self, id: ParserId) -> Result<&Parser> {
        self.tree.get(id)
    }

    pub fn command_parser_mut(&mut self, id: ParserId) -> Result<&mut Parser> {
        self.tree.get_mut(id)
    }

    pub fn tree(&self) -> &CommandTree {
        &self.tree
    }

    /// The application-wide flags, shown under their own heading.
    pub fn global_flags(&mut self) -> &mut FlagGroup {
        self.tree.root_mut().add_group(GLOBAL_FLAGS_TITLE)
    }

    /// The top-level command table, created on first use.
    pub fn subparser(&mut self) -> SubparserHandle {
        if let Some(handle) = self.subparser {
            return handle;
        }
        self.tree
            .root_mut()
            .children
            .get_or_insert_with(Vec::new);
        let handle = SubparserHandle {
            owner: ParserId::ROOT,
        };
        self.subparser = Some(handle);
        handle
    }

    /// Attaches a command table to the parser `id`, for sub-commands.
    pub fn new_subparser(&mut self, id: ParserId) -> Result<SubparserHandle> {
        if id == ParserId::ROOT {
            return Ok(self.subparser());
        }
        self.tree.new_subparser(id)
    }

    /// Creates the shared flag group `name`. Returns `None` if another module
    /// already created it; callers should treat that as fatal.
    pub fn new_shared_parser(&mut self, name: &str) -> Option<&mut FlagGroup> {
        self.shared.create(name)
    }

    /// Like [`App::new_shared_parser`], but reports a taken name as
    /// [`MundaneError::DuplicateSharedParser`].
    pub fn try_new_shared_parser(&mut self, name: &str) -> Result<&mut FlagGroup> {
        self.shared
            .create(name)
            .ok_or_else(|| MundaneError::duplicate_shared_parser(name))
    }

    /// The shared flag group `name`, if it was created.
    pub fn get_shared_parser(&self, name: &str) -> Option<&FlagGroup> {
        self.shared.get(name)
    }

    /// A copy of the shared flag group `name`, ready to pass to
    /// [`Registration::parent`].
    pub fn require_shared_parser(&self, name: &str) -> Result<FlagGroup> {
        self.shared
            .get(name)
            .cloned()
            .ok_or_else(|| MundaneError::missing_shared_parser(name))
    }

    /// Adds a hook run after a successful parse and before dispatch.
    pub fn register_after_parse_hook<F>(&mut self, hook: F)
    where
        F: Fn(&mut Namespace) -> anyhow::Result<()> + 'static,
    {
        self.hooks.register(hook);
    }

    /// Registers a command and returns its parser, for adding flags.
    pub fn register_command(&mut self, registration: Registration) -> Result<&mut Parser> {
        let handle = match registration.subparser {
            Some(handle) => handle,
            None => self.subparser(),
        };
        let name = registration.command_name();
        let (summary, description) =
            Docstring::new(registration.doc.as_deref(), self.width()).into_parts();

        let parser = self.tree.insert(handle, &name)?;
        parser.summary = registration.help.or(summary);
        parser.description = registration.description.or(description);
        parser.add_flag(Flag::help_flag());
        for group in &registration.parents {
            parser.inherit(group);
        }
        if !registration.usage_only {
            parser.func = Some(registration.func);
        }

        tracing::trace!(command = %name, usage_only = registration.usage_only, "registered command");
        Ok(parser)
    }

    pub fn register_global_flags(&mut self, modules: &[&dyn Module]) -> Result<()> {
        for module in modules {
            module.global_flags(self)?;
        }
        Ok(())
    }

    pub fn register_shared_flags(&mut self, modules: &[&dyn Module]) -> Result<()> {
        for module in modules {
            module.shared_flags(self)?;
        }
        Ok(())
    }

    pub fn register_commands(&mut self, modules: &[&dyn Module]) -> Result<()> {
        for module in modules {
            module.commands(self)?;
        }
        Ok(())
    }

    /// Parses `argv` (without the program name) without running anything.
    pub fn parse<I, T>(&self, argv: I) -> Result<ParseOutcome>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        self.tree.parse(argv)
    }

    /// Runs the selected command, printing to stdout and stderr.
    pub fn run<I, T>(&self, argv: I) -> Result<i32>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let stdout = io::stdout();
        let stderr = io::stderr();
        self.run_with(argv, &mut stdout.lock(), &mut stderr.lock())
    }

    /// Runs the selected command, printing help to `out` and parse errors to
    /// `err`. Returns the exit code.
    pub fn run_with<I, T>(&self, argv: I, out: &mut dyn Write, err: &mut dyn Write) -> Result<i32>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let mut args = match self.parse(argv)? {
            ParseOutcome::Parsed(args) => args,
            ParseOutcome::HelpRequested(help) => {
                write_text(out, &help)?;
                return Ok(EX_OK);
            }
            ParseOutcome::UsageError { message, code } => {
                write_text(err, &message)?;
                return Ok(code);
            }
        };

        self.hooks.run(&mut args).map_err(MundaneError::Hook)?;

        let Some(func) = args.func().cloned() else {
            let id = self.tree.resolve(args.command_path());
            write_text(out, &self.tree.render_help(id)?)?;
            return Ok(EX_USAGE);
        };

        tracing::debug!("Calling {} with {:?}", self.command_label(&args), args);
        let ret = func(&args).map_err(MundaneError::Handler)?.unwrap_or(EX_OK);
        if tracing::enabled!(tracing::Level::DEBUG) {
            if let Some(bytes) = platform::memory_used() {
                tracing::debug!("Memory used: {}", platform::natural_size(bytes));
            }
        }
        tracing::debug!("Finished. ({ret})");

        Ok(ret)
    }

    fn command_label(&self, args: &Namespace) -> String {
        let mut label = vec![self.appname()];
        label.extend(args.command_path().iter().map(String::as_str));
        label.join(" ")
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("appname", &self.appname())
            .field("tree", &self.tree)
            .field("shared", &self.shared)
            .field("hooks", &self.hooks)
            .finish()
    }
}

fn write_text(w: &mut dyn Write, text: &str) -> io::Result<()> {
    w.write_all(text.as_bytes())?;
    if !text.ends_with('\n') {
        w.write_all(b"\n")?;
    }
    w.flush()
}
