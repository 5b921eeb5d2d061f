//! Integration tests for the nebulous demo binary.

use std::fs;

use super::common::{run_nebulous, Sandbox};

#[test]
fn test_no_command_prints_help() {
    let (code, stdout, stderr) = run_nebulous(&[]);

    assert_eq!(code, 64, "Expected the usage exit code");
    assert!(stdout.contains("Usage: nebulous"));
    assert!(stdout.contains("This is the nebulous application."));
    assert!(stdout.contains("Commands:"));
    assert!(stdout.contains("two-words"));
    assert!(stdout.contains("For more details: nebulous <command> --help"));
    assert_eq!(stderr, "");
}

#[test]
fn test_help_flag() {
    let (code, stdout, stderr) = run_nebulous(&["--help"]);

    assert_eq!(code, 0);
    assert!(stdout.contains("Global flags:"));
    assert!(stdout.contains("--db-dir"));
    assert!(stdout.contains("--log-level"));
    assert!(stdout.contains("--log-dir"));
    assert_eq!(stderr, "");
}

#[test]
fn test_description_is_reflowed_to_columns() {
    let (_, stdout, _) = run_nebulous(&["--help"]);

    for line in stdout.lines() {
        assert!(line.chars().count() <= 80, "Line too wide: {line:?}");
    }
    assert!(stdout.contains("Lorem ipsum dolor sit amet"));
}

#[test]
fn test_command_help_shows_full_doc() {
    let (code, stdout, _) = run_nebulous(&["info", "--help"]);

    assert_eq!(code, 0);
    assert!(stdout.contains("Usage: nebulous info"));
    assert!(stdout.contains("List some important information."));
    assert!(stdout.contains("Note that this command has a multiline docstring."));
}

#[test]
fn test_info_shows_hook_changes() {
    let sandbox = Sandbox::new();
    let (code, stdout, _) = sandbox.run(&["info"]);

    assert_eq!(code, 0);
    let db_dir = sandbox.path().join("data").join("nebulous");
    assert!(stdout.contains(&format!(
        "args={{\"dbc\":\"A pretend database connection in {}.\"}}",
        db_dir.display()
    )));
    assert!(stdout.contains("Current logging level: WARN"));
}

#[test]
fn test_log_level_flag() {
    let sandbox = Sandbox::new();
    let log_dir = sandbox.log_dir().display().to_string();
    let (code, stdout, _) = sandbox.run(&["--log-dir", &log_dir, "-L", "info", "info"]);

    assert_eq!(code, 0);
    assert!(stdout.contains("Current logging level: INFO"));
}

#[test]
fn test_log_file_is_written_to_log_dir() {
    let sandbox = Sandbox::new();
    let log_dir = sandbox.log_dir();
    let log_dir_arg = log_dir.display().to_string();
    let (code, stdout, _) = sandbox.run(&["--log-dir", &log_dir_arg, "-L", "DEBUG", "del"]);

    assert_eq!(code, 0);
    assert!(stdout.contains("The world is deleted."));

    let files: Vec<_> = fs::read_dir(&log_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with("nebulous.log."))
        .collect();
    assert_eq!(files.len(), 1, "Expected one log file, got {files:?}");

    let content = fs::read_to_string(log_dir.join(&files[0])).unwrap();
    assert!(content.contains("Calling nebulous del"));
    assert!(content.contains("Finished. (0)"));
}

#[test]
fn test_quiet_run_writes_no_log() {
    let sandbox = Sandbox::new();
    let log_dir = sandbox.log_dir();
    let log_dir_arg = log_dir.display().to_string();
    let (code, _, _) = sandbox.run(&["--log-dir", &log_dir_arg, "del"]);

    assert_eq!(code, 0);
    assert!(!log_dir.exists(), "Log file should only be opened on first write");
}

#[test]
fn test_db_dir_flag() {
    let (code, stdout, _) = run_nebulous(&["--db-dir", "/srv/db", "ingest", "-f", "data.csv"]);

    assert_eq!(code, 0);
    assert!(stdout.contains(
        "I will read \"data.csv\" and put the content into \
         \"A pretend database connection in /srv/db.\"."
    ));
}

#[test]
fn test_ingest_unused_flag() {
    let (code, stdout, _) = run_nebulous(&["ingest", "--file", "a", "-u", "b"]);

    assert_eq!(code, 0);
    assert!(stdout.contains("I said, --unused is not used.  Why did you pass in \"b\"?"));
}

#[test]
fn test_ingest_requires_shared_flag() {
    let (code, stdout, stderr) = run_nebulous(&["ingest"]);

    assert_eq!(code, 2);
    assert_eq!(stdout, "");
    assert!(stderr.contains("--file"));
}

#[test]
fn test_clean_known_item() {
    let (code, stdout, _) = run_nebulous(&["clean", "-i", "rock"]);

    assert_eq!(code, 0);
    assert!(stdout.contains("Scrub.  Scrub.  Scrub."));
    assert!(stdout.contains("The rock is now clean."));
}

#[test]
fn test_clean_unknown_item() {
    let (code, stdout, _) = run_nebulous(&["clean", "--item", "sock"]);

    assert_eq!(code, 1);
    assert!(stdout.contains("Actually, I do not know how to clean sock."));
}

#[test]
fn test_two_words() {
    let (code, stdout, _) = run_nebulous(&["two-words"]);

    assert_eq!(code, 0);
    assert!(stdout.contains("Two words."));
}

#[test]
fn test_general_defaults_to_status() {
    let (code, stdout, _) = run_nebulous(&["general"]);

    assert_eq!(code, 0);
    assert!(stdout.contains("This is the overall status."));
}

#[test]
fn test_general_subcommands() {
    let (code, stdout, _) = run_nebulous(&["general", "hostname"]);
    assert_eq!(code, 1);
    assert!(stdout.contains("Hostname is: unknown"));

    let (code, stdout, _) = run_nebulous(&["general", "permissions"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("This would be a table of permissions."));
}

#[test]
fn test_roger_only_shows_usage() {
    let (code, stdout, stderr) = run_nebulous(&["roger"]);

    assert_eq!(code, 64);
    assert!(stdout.contains("Usage: nebulous roger"));
    assert!(stdout.contains("Acknowledge Roger, but only the second time."));
    assert!(!stdout.contains("Roger, Roger."));
    assert_eq!(stderr, "");
}

#[test]
fn test_roger_roger() {
    let (code, stdout, _) = run_nebulous(&["roger", "roger"]);

    assert_eq!(code, 0);
    assert_eq!(stdout, "Roger, Roger.\n");
}

#[test]
fn test_bogus_command() {
    let (code, stdout, stderr) = run_nebulous(&["bogus"]);

    assert_eq!(code, 2);
    assert_eq!(stdout, "");
    assert!(stderr.contains("bogus"));
}

#[test]
fn test_config_file_is_applied() {
    let sandbox = Sandbox::new();
    let config = sandbox.config_file();
    fs::create_dir_all(config.parent().unwrap()).unwrap();
    fs::write(
        &config,
        "[app]\nepilog = \"See you later.\"\n\n[log]\nlevel = \"info\"\n",
    )
    .unwrap();

    let (_, stdout, _) = sandbox.run(&["--help"]);
    assert!(stdout.contains("See you later."));
    assert!(stdout.contains("For more details: nebulous <command> --help"));

    let log_dir = sandbox.log_dir().display().to_string();
    let (_, stdout, _) = sandbox.run(&["--log-dir", &log_dir, "info"]);
    assert!(stdout.contains("Current logging level: INFO"));
}

#[test]
fn test_broken_config_is_reported() {
    let sandbox = Sandbox::new();
    let config = sandbox.config_file();
    fs::create_dir_all(config.parent().unwrap()).unwrap();
    fs::write(&config, "[app\n").unwrap();

    let (code, _, stderr) = sandbox.run(&["info"]);
    assert_eq!(code, 1);
    assert!(stderr.starts_with("Configuration Error:"));
}
