// tests/cli_run.rs

mod common;
use crate::common::builders::{RuleBuilder, RuleSetBuilder};
use crate::common::{date, init_tracing};

use std::error::Error;
use std::fs;
use std::path::Path;

use clap::Parser;
use opsched::cli::{CliArgs, Command};
use opsched::run;
use opsched::store::{SqliteStore, TimetableStore};
use opsched::timetable::PublicHoliday;
use tempfile::tempdir;

type TestResult = Result<(), Box<dyn Error>>;

fn write_config(dir: &Path, db: &Path) -> Result<String, Box<dyn Error>> {
    let path = dir.join("Opsched.toml");
    fs::write(
        &path,
        format!("[config]\ndatabase = \"{}\"\nwindow_days = 7\n", db.display()),
    )?;
    Ok(path.display().to_string())
}

fn args(config: &str, rest: &[&str]) -> Result<CliArgs, clap::Error> {
    let mut argv = vec!["opsched", "--config", config, "--today", "20261019"];
    argv.extend_from_slice(rest);
    CliArgs::try_parse_from(argv)
}

#[test]
fn parses_global_flags_and_subcommands() -> TestResult {
    let parsed = CliArgs::try_parse_from([
        "opsched",
        "--window-days",
        "3",
        "--today",
        "20261019",
        "--log",
        "info,opsched::dag=debug",
        "generate",
        "--dry-run",
    ])?;

    assert_eq!(parsed.window_days, Some(3));
    assert_eq!(parsed.log.as_deref(), Some("info,opsched::dag=debug"));
    assert_eq!(parsed.today, Some(date(2026, 10, 19)));
    assert!(matches!(
        parsed.command,
        Command::Generate {
            dry_run: true,
            skip_holidays: false
        }
    ));

    assert!(CliArgs::try_parse_from(["opsched", "--today", "19/10/2026", "generate"]).is_err());
    assert!(CliArgs::try_parse_from(["opsched"]).is_err());
    Ok(())
}

#[test]
fn init_db_creates_the_database() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    let db = dir.path().join("data").join("tt.db");
    let config = write_config(dir.path(), &db)?;

    run(args(&config, &["init-db"])?)?;

    assert!(db.exists());
    Ok(())
}

#[test]
fn generate_writes_and_prunes_holidays() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    let db = dir.path().join("tt.db");
    let config = write_config(dir.path(), &db)?;

    {
        let store = SqliteStore::open(&db)?;
        let rules = RuleSetBuilder::new()
            .with(RuleBuilder::root("A", "0900").skip_holidays())
            .with(RuleBuilder::dependent("B", "A", 0))
            .build();
        for rule in &rules {
            store.insert_rule(rule)?;
        }
        store.insert_public_holiday(&PublicHoliday::new(date(2026, 10, 20)))?;
    }

    run(args(&config, &["generate"])?)?;
    assert_eq!(SqliteStore::open(&db)?.occurrences()?.len(), 13);

    // Running again replaces the timetable instead of colliding with it.
    run(args(&config, &["generate", "--skip-holidays"])?)?;
    assert_eq!(SqliteStore::open(&db)?.occurrences()?.len(), 14);

    run(args(&config, &["exclude-holidays"])?)?;
    assert_eq!(SqliteStore::open(&db)?.occurrences()?.len(), 13);
    Ok(())
}

#[test]
fn dry_run_writes_nothing() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    let db = dir.path().join("tt.db");
    let config = write_config(dir.path(), &db)?;

    SqliteStore::open(&db)?.insert_rule(&RuleBuilder::root("A", "0900").build())?;

    run(args(&config, &["generate", "--dry-run"])?)?;
    assert!(SqliteStore::open(&db)?.occurrences()?.is_empty());
    Ok(())
}

#[test]
fn empty_rule_table_fails_the_run() -> TestResult {
    let dir = tempdir()?;
    let db = dir.path().join("tt.db");
    let config = write_config(dir.path(), &db)?;

    assert!(run(args(&config, &["generate"])?).is_err());
    Ok(())
}
