//! The nebulous demo: one module exercising most of the library.

use anyhow::Context;
use mundane::commands::{Flag, FlagGroup, Namespace};
use mundane::logging::level_name;
use mundane::{command, App, Module, MundaneError, Result};
use tracing::level_filters::LevelFilter;

/// Top-level description, reflowed to the terminal width.
pub const DOC: &str = "This is the nebulous application.

It is a demo for using the mundane library and should cover most features.

The text below exists to demonstrate how the help output is reflowed to match
the terminal width.  Experiment with resizing the terminal or setting the
environment variable COLUMNS to different values.

Lorem ipsum dolor sit amet, consectetur adipiscing elit. Nullam sagittis
mattis risus, vel ultricies est dictum in. Pellentesque malesuada neque lacus,
a commodo nisl condimentum vel. Praesent pretium, tortor eget convallis
congue, metus augue posuere velit, eget tempus sapien ipsum a felis. Fusce et
eleifend enim. Vestibulum vel pharetra orci. Ut vehicula bibendum ante nec
lacinia. Nullam vestibulum hendrerit libero, ac congue purus vulputate
ultrices.

Nulla gravida ullamcorper ante in mattis. Praesent malesuada justo a dignissim
pellentesque. Mauris feugiat dignissim libero eu volutpat. Sed feugiat ipsum
id posuere rhoncus. Nulla odio sapien, sollicitudin quis lobortis vel, ornare
in risus. Vestibulum ante ipsum primis in faucibus orci luctus et ultrices
posuere cubilia curae; Aenean ipsum est, elementum vitae ultricies eget,
tempus euismod nisl. Proin vel cursus mi.";

/// Items `clean` knows how to handle.
const CLEANABLE: [&str; 3] = ["rock", "paper", "scissors"];

pub struct Nebulous;

impl Module for Nebulous {
    fn global_flags(&self, app: &mut App) -> Result<()> {
        let db_dir = app.dirs().user_data_dir().to_path_buf();
        app.global_flags().add(
            Flag::path("db_dir")
                .value_name("DB_DIR")
                .default(db_dir.clone())
                .help(format!("Database directory (Default: {})", db_dir.display())),
        );

        // Hooks are commonly registered alongside the global flags.
        app.register_after_parse_hook(hook_one);
        app.register_after_parse_hook(init_db);
        app.register_after_parse_hook(hook_three);
        Ok(())
    }

    fn shared_flags(&self, app: &mut App) -> Result<()> {
        // Nothing magical about the "req_" prefix, just convention.
        let Some(group) = app.new_shared_parser("req_file") else {
            return Err(MundaneError::registration(
                "Oh, dear!  Someone stole our parser name!",
            ));
        };
        group
            .add(
                Flag::value("file")
                    .short('f')
                    .required()
                    .help("A filename to process."),
            )
            .add(Flag::value("unused").short('u').help("This flag is not used."));
        Ok(())
    }

    fn commands(&self, app: &mut App) -> Result<()> {
        let req_file = app.require_shared_parser("req_file")?;

        app.register_command(command!(info).doc(
            "List some important information.

            Note that this command has a multiline docstring.  It will be shown
            when the --help flag is used.",
        ))?;
        app.register_command(
            command!(ingest)
                .doc("Consume some information and push it into the database.")
                .parent(req_file),
        )?;

        // A local group can be reused across commands without sharing it
        // with other modules.
        let mut clean_flags = FlagGroup::new();
        clean_flags.add(
            Flag::value("item")
                .short('i')
                .required()
                .help("An item to clean."),
        );
        app.register_command(
            command!(clean)
                .doc("Clean an item (maybe).\n\nBe sure to check the error code.")
                .parent(clean_flags),
        )?;

        app.register_command(command!(del_).doc("Delete the world."))?;
        app.register_command(command!(two_words).doc("Print out two words."))?;

        let general = app
            .register_command(command!(general).doc("An nmcli like general command."))?
            .id();
        let subparser = app.new_subparser(general)?;
        app.register_command(
            command!(status)
                .doc("An nmcli like status command.")
                .subparser(subparser),
        )?;
        app.register_command(
            command!(hostname)
                .doc("An nmcli like hostname command.")
                .subparser(subparser),
        )?;
        app.register_command(
            command!(permissions)
                .doc("An nmcli like permissions command.")
                .subparser(subparser),
        )?;

        // A command that only displays usage.
        let roger_doc = "Acknowledge Roger, but only the second time.";
        let outer = app
            .register_command(command!(roger).doc(roger_doc).usage_only())?
            .id();
        let subparser = app.new_subparser(outer)?;
        app.register_command(command!(roger).doc(roger_doc).subparser(subparser))?;

        Ok(())
    }
}

fn hook_one(args: &mut Namespace) -> anyhow::Result<()> {
    tracing::info!("args: {args:?}");
    Ok(())
}

fn hook_three(args: &mut Namespace) -> anyhow::Result<()> {
    tracing::info!("args: {args:?}");
    Ok(())
}

/// Adds a pretend connection as `dbc` and consumes `db_dir`. Nothing is
/// opened unless a command was selected.
fn init_db(args: &mut Namespace) -> anyhow::Result<()> {
    tracing::info!("args: {args:?}");

    if args.name().is_some() {
        let db_dir = args
            .remove("db_dir")
            .context("the --db-dir flag has no value")?;
        args.set("dbc", format!("A pretend database connection in {db_dir}."));
    }
    Ok(())
}

fn info(args: &Namespace) -> anyhow::Result<i32> {
    tracing::debug!("debug output from info: {args:?}");
    println!("args={}", serde_json::to_string(args)?);
    println!("Current logging level: {}", level_name(LevelFilter::current()));
    Ok(0)
}

fn ingest(args: &Namespace) -> anyhow::Result<i32> {
    match args.get_str("unused") {
        Some(unused) => println!(
            "I said, --unused is not used.  Why did you pass in \"{unused}\"?"
        ),
        None => println!(
            "I will read \"{}\" and put the content into \"{}\".",
            args.get_str("file").unwrap_or_default(),
            args.get_str("dbc").unwrap_or_default()
        ),
    }
    Ok(0)
}

fn clean(args: &Namespace) -> anyhow::Result<i32> {
    let item = args.get_str("item").unwrap_or_default();
    if CLEANABLE.contains(&item) {
        println!("Scrub.  Scrub.  Scrub.");
        println!("The {item} is now clean.");
        Ok(0)
    } else {
        println!("Actually, I do not know how to clean {item}.");
        Ok(1)
    }
}

fn del_(_args: &Namespace) -> anyhow::Result<i32> {
    println!("The world is deleted.");
    Ok(0)
}

fn two_words(_args: &Namespace) -> anyhow::Result<i32> {
    println!("Two words.");
    println!("But, note that the command has a \"-\" but the function name has \"_\".");
    Ok(0)
}

/// Runs `status` when no sub-command is given.
fn general(args: &Namespace) -> anyhow::Result<i32> {
    status(args)
}

fn status(_args: &Namespace) -> anyhow::Result<i32> {
    println!("This is the overall status.");
    Ok(0)
}

fn hostname(_args: &Namespace) -> anyhow::Result<i32> {
    println!("Hostname is: unknown");
    Ok(1)
}

fn permissions(_args: &Namespace) -> anyhow::Result<i32> {
    println!("This would be a table of permissions.");
    Ok(0)
}

fn roger(_args: &Namespace) -> anyhow::Result<i32> {
    println!("Roger, Roger.");
    Ok(0)
}
