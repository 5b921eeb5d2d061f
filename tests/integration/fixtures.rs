//! Fixture modules covering the combinations of global flags, shared flags
//! and nested commands.

use std::cell::RefCell;
use std::rc::Rc;

use mundane::commands::{Flag, Namespace, Registration};
use mundane::{App, AppOptions, Module, MundaneError, Result};

/// Collects what handlers print, so tests can assert on it.
#[derive(Debug, Clone, Default)]
pub struct Sink(Rc<RefCell<Vec<String>>>);

impl Sink {
    pub fn say(&self, line: impl Into<String>) {
        self.0.borrow_mut().push(line.into());
    }

    pub fn lines(&self) -> Vec<String> {
        self.0.borrow().clone()
    }
}

/// An app with a fixed name and width, so help output is stable.
pub fn new_app() -> App {
    App::new(AppOptions::new().prog("fixture").width(80)).unwrap()
}

/// Runs `argv` and returns `(code, stdout, stderr)`.
pub fn run(app: &App, argv: &[&str]) -> (i32, String, String) {
    let mut out = Vec::new();
    let mut err = Vec::new();
    let code = app.run_with(argv, &mut out, &mut err).unwrap();
    (
        code,
        String::from_utf8(out).unwrap(),
        String::from_utf8(err).unwrap(),
    )
}

/// Global flag, no shared flags, commands. Expects the `foo` shared group
/// from [`FlagsThree`].
pub struct FlagsOne {
    pub sink: Sink,
}

impl Module for FlagsOne {
    fn global_flags(&self, app: &mut App) -> Result<()> {
        app.global_flags()
            .add(Flag::switch("foo").help("Enable foo-ing."));
        Ok(())
    }

    fn commands(&self, app: &mut App) -> Result<()> {
        let sink = self.sink.clone();
        app.register_command(Registration::new("generate_report", move |args: &Namespace| {
            sink.say(format!(
                "generating report using {}",
                args.name().unwrap_or_default()
            ));
            Ok(())
        }))?;

        let foo = app.require_shared_parser("foo")?;
        app.register_command(
            Registration::new("put_on_hat", |_: &Namespace| Ok(())).parent(foo),
        )?;

        let sink = self.sink.clone();
        app.register_command(
            Registration::new("remove_shoes", move |args: &Namespace| {
                sink.say(format!(
                    "removing shoes because {}",
                    args.name().unwrap_or_default()
                ));
                Ok(3)
            })
            .doc("This will remove the shoes from the brakes.")
            .help("Shoes have custom help.")
            .description("This is also a custom description.\n\n    Built by hand."),
        )?;
        Ok(())
    }
}

/// No global flags, no shared flags, commands nested two levels below a
/// usage-only node.
pub struct FlagsTwo {
    pub sink: Sink,
}

impl Module for FlagsTwo {
    fn commands(&self, app: &mut App) -> Result<()> {
        let sub = app
            .register_command(
                Registration::new("sub", |_: &Namespace| -> anyhow::Result<i32> {
                    anyhow::bail!("Should never be called.")
                })
                .doc("A subcommand for wrapping other subcommands.")
                .usage_only(),
            )?
            .id();
        let subparser = app.new_subparser(sub)?;

        let sink = self.sink.clone();
        app.register_command(
            Registration::new("atomic", move |_: &Namespace| {
                sink.say("I am a particle that makes up elements.");
                Ok(0)
            })
            .doc("A small feature.")
            .subparser(subparser),
        )?;

        let sink = self.sink.clone();
        app.register_command(
            Registration::new("class_", move |_: &Namespace| {
                sink.say("Derivation achieved.");
                Ok(0)
            })
            .doc("Deriving from a super.")
            .name("class")
            .subparser(subparser),
        )?;

        let sink = self.sink.clone();
        let marine = app
            .register_command(
                Registration::new("marine", move |_: &Namespace| {
                    sink.say("This boat can go underwater and fire weapons.");
                    Ok(0)
                })
                .doc("A boat that can do interesting things.")
                .subparser(subparser),
            )?
            .id();

        let sink = self.sink.clone();
        app.register_command(
            Registration::new("routine", move |_: &Namespace| {
                sink.say("A sub routine was called.");
                Ok(0)
            })
            .doc("A procedure to call.")
            .subparser(subparser),
        )?;

        let subparser = app.new_subparser(marine)?;
        let sink = self.sink.clone();
        app.register_command(
            Registration::new("change_depth", move |args: &Namespace| {
                sink.say(format!(
                    "The boat will go to a depth of {} meters at {} m/s.",
                    args.get_int("depth").unwrap_or_default(),
                    args.get_int("rate").unwrap_or_default()
                ));
                Ok(0)
            })
            .doc("Move to a new depth.")
            .subparser(subparser),
        )?
        .add_flag(
            Flag::int("rate")
                .required()
                .help("The rate of change in meters/second."),
        )
        .add_flag(
            Flag::int("depth")
                .default(0i64)
                .help("Cruising depth in meters. (default: 0)"),
        );

        let sink = self.sink.clone();
        app.register_command(
            Registration::new("fire", move |args: &Namespace| {
                sink.say(format!(
                    "Torpedoes away!  Also, foo={:?}.",
                    args.get_bool("foo")
                ));
                Ok(0)
            })
            .doc("Fire a weapon.")
            .subparser(subparser),
        )?;
        Ok(())
    }
}

/// No global flags, the `foo` shared group, commands.
pub struct FlagsThree {
    pub sink: Sink,
}

impl Module for FlagsThree {
    fn shared_flags(&self, app: &mut App) -> Result<()> {
        let Some(group) = app.new_shared_parser("foo") else {
            return Err(MundaneError::duplicate_shared_parser("foo"));
        };
        group
            .add(
                Flag::value("xyzzy")
                    .short('x')
                    .required()
                    .help("The xyzzy input."),
            )
            .add(Flag::toggle("keep").short('k').help("Keep intermediates."));
        Ok(())
    }

    fn commands(&self, app: &mut App) -> Result<()> {
        let sink = self.sink.clone();
        app.register_command(
            Registration::new("ingest_new_material", move |args: &Namespace| {
                sink.say(format!(
                    "ingesting material from {}",
                    args.get_str("filename").unwrap_or_default()
                ));
                Ok(5)
            })
            .doc(INGEST_DOC),
        )?
        .add_flag(
            Flag::value("filename")
                .short('f')
                .required()
                .help("Filename to ingest."),
        );

        app.register_command(
            Registration::new("process", |_: &Namespace| Ok(())).doc("Process random data."),
        )?;

        app.register_command(
            Registration::new("dance", |_: &Namespace| Ok(())).doc(
                "Like no one is watching.
                Second line here.

                Rest of the content.",
            ),
        )?
        .add_flag(
            Flag::toggle("now")
                .short('n')
                .default(false)
                .help("Now or later."),
        );
        Ok(())
    }
}

pub const INGEST_DOC: &str = "Take in new material.

    Read the material and do something useful with it.



    This is a second paragraph that has more details on what is going on in
    this command.  Including long sentences that wrap.
    ";
