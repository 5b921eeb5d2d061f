//! Parse, hooks and dispatch through `App::run_with`.

use std::cell::RefCell;
use std::rc::Rc;

use mundane::commands::{Namespace, Value, EX_USAGE};
use mundane::{App, AppOptions, LogManager, Module, MundaneError};
use tracing::level_filters::LevelFilter;

use super::fixtures::{new_app, run, FlagsOne, FlagsThree, FlagsTwo, Sink};

fn shoes_app(sink: &Sink) -> App {
    let one = FlagsOne { sink: sink.clone() };
    let three = FlagsThree { sink: sink.clone() };
    let modules: [&dyn Module; 2] = [&one, &three];

    let mut app = new_app();
    app.register_global_flags(&modules).unwrap();
    app.register_shared_flags(&modules).unwrap();
    app.register_commands(&modules).unwrap();
    app
}

fn nested_app(sink: &Sink) -> App {
    let two = FlagsTwo { sink: sink.clone() };
    let mut app = new_app();
    app.register_commands(&[&two]).unwrap();
    app
}

#[test]
fn test_remove_shoes_end_to_end() {
    let sink = Sink::default();
    let app = shoes_app(&sink);

    let (code, out, err) = run(&app, &["remove-shoes"]);
    assert_eq!(code, 3);
    assert_eq!(sink.lines(), vec!["removing shoes because remove-shoes"]);
    assert_eq!(out, "");
    assert_eq!(err, "");
}

#[test]
fn test_handler_code_is_returned() {
    let sink = Sink::default();
    let app = shoes_app(&sink);

    let (code, _, _) = run(&app, &["ingest-new-material", "-f", "ore.txt"]);
    assert_eq!(code, 5);
    assert_eq!(sink.lines(), vec!["ingesting material from ore.txt"]);
}

#[test]
fn test_no_command_prints_top_level_help() {
    let sink = Sink::default();
    let app = shoes_app(&sink);

    let (code, out, err) = run(&app, &[]);
    assert_eq!(code, EX_USAGE);
    assert!(out.contains("Usage: fixture"));
    assert!(out.contains("Commands:"));
    assert!(out.contains("remove-shoes"));
    assert!(out.contains("For more details: fixture <command> --help"));
    assert_eq!(err, "");
    assert!(sink.lines().is_empty());
}

#[test]
fn test_only_global_flags_prints_help() {
    let sink = Sink::default();
    let app = shoes_app(&sink);

    let (code, out, _) = run(&app, &["--foo"]);
    assert_eq!(code, EX_USAGE);
    assert!(out.contains("Usage: fixture"));
}

#[test]
fn test_root_fallback_governs_empty_run() {
    let sink = Sink::default();
    let mut app = shoes_app(&sink);
    app.parser_mut().set_default_func(|_: &Namespace| Ok(42));

    let (code, out, _) = run(&app, &[]);
    assert_eq!(code, 42);
    assert_eq!(out, "");

    // Selected commands still win over the fallback.
    assert_eq!(run(&app, &["remove-shoes"]).0, 3);
    // Help and parse errors never reach it.
    assert_eq!(run(&app, &["--help"]).0, 0);
    assert_eq!(run(&app, &["bogus"]).0, 2);
}

#[test]
fn test_bogus_command_is_usage_error() {
    let sink = Sink::default();
    let app = shoes_app(&sink);

    let (code, out, err) = run(&app, &["bogus"]);
    assert_eq!(code, 2);
    assert_eq!(out, "");
    assert!(err.contains("error:"));
    assert!(err.contains("bogus"));
}

#[test]
fn test_hooks_run_in_order_before_handler() {
    let trail = Rc::new(RefCell::new(Vec::new()));
    let mut app = new_app();

    for name in ["h1", "h2", "h3"] {
        let trail = trail.clone();
        app.register_after_parse_hook(move |args| {
            trail.borrow_mut().push(name.to_string());
            let mut seen = args
                .get_list("seen")
                .map(<[Value]>::to_vec)
                .unwrap_or_default();
            seen.push(Value::from(name));
            args.set("seen", seen);
            Ok(())
        });
    }

    let handler_trail = trail.clone();
    app.register_command(mundane::Registration::new(
        "check",
        move |args: &Namespace| {
            handler_trail.borrow_mut().push("handler".to_string());
            assert_eq!(args.get_strings("seen"), Some(vec!["h1", "h2", "h3"]));
            Ok(())
        },
    ))
    .unwrap();

    assert_eq!(run(&app, &["check"]).0, 0);
    assert_eq!(*trail.borrow(), vec!["h1", "h2", "h3", "handler"]);
}

#[test]
fn test_hook_can_consume_and_inject() {
    let mut app = new_app();
    app.global_flags()
        .add(mundane::Flag::path("db_dir").default("/tmp/db"));
    app.register_after_parse_hook(|args| {
        if args.name().is_some() {
            let db_dir = args.remove("db_dir").map(|v| v.to_string()).unwrap_or_default();
            args.set("dbc", format!("connection in {db_dir}"));
        }
        Ok(())
    });

    let seen = Rc::new(RefCell::new(None));
    let capture = seen.clone();
    app.register_command(mundane::Registration::new(
        "peek",
        move |args: &Namespace| {
            *capture.borrow_mut() = Some((
                args.contains("db_dir"),
                args.get_str("dbc").map(str::to_string),
            ));
            Ok(())
        },
    ))
    .unwrap();

    run(&app, &["--db-dir", "/srv/db", "peek"]);
    assert_eq!(
        *seen.borrow(),
        Some((false, Some("connection in /srv/db".to_string())))
    );
}

#[test]
fn test_hook_failure_skips_handler() {
    let sink = Sink::default();
    let mut app = shoes_app(&sink);
    app.register_after_parse_hook(|_| anyhow::bail!("database unavailable"));

    let mut out = Vec::new();
    let mut err = Vec::new();
    let e = app.run_with(["remove-shoes"], &mut out, &mut err).unwrap_err();
    assert!(matches!(e, MundaneError::Hook(_)));
    assert_eq!(e.to_string(), "database unavailable");
    assert!(sink.lines().is_empty());
}

#[test]
fn test_usage_only_node_prints_own_help() {
    let sink = Sink::default();
    let app = nested_app(&sink);

    let (code, out, err) = run(&app, &["sub"]);
    assert_eq!(code, EX_USAGE);
    assert!(out.contains("Usage: fixture sub"));
    for child in ["atomic", "class", "marine", "routine"] {
        assert!(out.contains(child), "missing {child} in:\n{out}");
    }
    assert!(out.contains("For more details: fixture sub <command> --help"));
    assert!(!out.contains("change-depth"));
    assert_eq!(err, "");
    assert!(sink.lines().is_empty());
}

#[test]
fn test_usage_only_node_uses_root_fallback() {
    let sink = Sink::default();
    let mut app = nested_app(&sink);
    app.parser_mut().set_default_func(|_: &Namespace| Ok(42));

    assert_eq!(run(&app, &["sub"]).0, 42);
}

#[test]
fn test_nested_dispatch() {
    let sink = Sink::default();
    let app = nested_app(&sink);

    assert_eq!(run(&app, &["sub", "atomic"]).0, 0);
    assert_eq!(run(&app, &["sub", "class"]).0, 0);
    assert_eq!(run(&app, &["sub", "marine"]).0, 0);
    assert_eq!(
        run(&app, &["sub", "marine", "change-depth", "--rate", "3"]).0,
        0
    );
    assert_eq!(
        run(&app, &["sub", "marine", "change-depth", "--rate", "2", "--depth", "30"]).0,
        0
    );

    assert_eq!(
        sink.lines(),
        vec![
            "I am a particle that makes up elements.",
            "Derivation achieved.",
            "This boat can go underwater and fire weapons.",
            "The boat will go to a depth of 0 meters at 3 m/s.",
            "The boat will go to a depth of 30 meters at 2 m/s.",
        ]
    );
}

#[test]
fn test_nested_type_error() {
    let sink = Sink::default();
    let app = nested_app(&sink);

    let (code, _, err) = run(&app, &["sub", "marine", "change-depth", "--rate", "fast"]);
    assert_eq!(code, 2);
    assert!(err.contains("fast"));
    assert!(sink.lines().is_empty());
}

#[test]
fn test_log_flags_apply_during_parse() {
    let logs = tempfile::tempdir().unwrap();
    let redirected = tempfile::tempdir().unwrap();
    let (manager, subscriber) = LogManager::new("fixture", logs.path());

    let mut app = App::new(
        AppOptions::new()
            .prog("fixture")
            .width(80)
            .log_manager(manager.clone()),
    )
    .unwrap();
    app.register_command(mundane::Registration::new("process", |_: &Namespace| Ok(())))
        .unwrap();

    let redirected_arg = redirected.path().display().to_string();
    let (code, level) = tracing::subscriber::with_default(subscriber, || {
        let (code, _, _) = run(
            &app,
            &["-L", "debug", "--log-dir", &redirected_arg, "process"],
        );
        (code, manager.level())
    });
    assert_eq!(code, 0);
    assert_eq!(level, Some(LevelFilter::DEBUG));
    // The level handle goes away with its subscriber.
    assert_eq!(manager.level(), None);
    assert_eq!(manager.log_dir(), redirected.path());

    let log = std::fs::read_to_string(manager.handler().path()).unwrap();
    assert!(manager.handler().path().starts_with(redirected.path()));
    assert!(log.contains("Calling fixture process"));
    assert!(log.contains("Finished. (0)"));
}

#[test]
fn test_log_level_rejects_unknown_names() {
    let logs = tempfile::tempdir().unwrap();
    let (manager, _subscriber) = LogManager::new("fixture", logs.path());
    let app = App::new(AppOptions::new().prog("fixture").log_manager(manager)).unwrap();

    let (code, _, err) = run(&app, &["-L", "loud"]);
    assert_eq!(code, 2);
    assert!(err.contains("loud"));
}

#[test]
fn test_log_flags_show_defaults_in_help() {
    let logs = tempfile::tempdir().unwrap();
    let (manager, _subscriber) = LogManager::new("fixture", logs.path());
    let app = App::new(
        AppOptions::new()
            .prog("fixture")
            .width(200)
            .log_manager(manager),
    )
    .unwrap();

    let (_, out, _) = run(&app, &["--help"]);
    assert!(out.contains("--log-level"));
    assert!(out.contains("(Default: WARN)"));
    assert!(out.contains("--log-dir"));
}
