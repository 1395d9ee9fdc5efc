use anyhow::{bail, Context, Result};
use clap::{error::ErrorKind, CommandFactory, Parser};
use hytest_config::HarnessConfig;
use std::path::PathBuf;
use std::process;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod testing;

use testing::{ConsoleReporter, Harness, ProcessRunner};

/// Conformance test harness for the Hydrogen interpreter.
///
/// Runs every `.hy` script under TEST_ROOT through INTERPRETER and compares
/// its stdout against the `//> ` annotations embedded in the script.
///
/// EXAMPLES:
///     hytest tests/runtime build/hydrogen
///     hytest tests/runtime build/hydrogen --timeout 10
///     hytest tests/runtime build/hydrogen --config harness.toml -v
#[derive(Parser, Debug)]
#[command(name = "hytest")]
#[command(version)]
struct Cli {
    /// Directory containing the test scripts
    test_root: PathBuf,

    /// Path to the interpreter binary under test
    interpreter: PathBuf,

    /// Seconds a test may run before it is killed (default: 2)
    #[arg(long, short = 't', value_name = "SECS")]
    timeout: Option<u64>,

    /// Path to a TOML configuration file
    #[arg(long, short = 'c', value_name = "FILE")]
    config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Increase log verbosity (repeatable)
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            // clap's message says what was wrong; the usage line goes to stdout
            eprint!("{}", e);
            println!("{}", Cli::command().render_usage());
            process::exit(1);
        }
    };

    init_logging(cli.verbose);

    match run(cli) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

/// Logs go to stderr so they never interleave with the report on stdout
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level))
        .with_writer(std::io::stderr)
        .try_init();
}

/// Resolve configuration, walk the test tree, and report. Returns whether
/// every test passed.
fn run(cli: Cli) -> Result<bool> {
    let config = resolve_config(&cli)?;
    info!(
        timeout_secs = config.timeout_secs,
        extension = %config.extension,
        marker = %config.marker,
        "configuration resolved"
    );

    if !cli.test_root.is_dir() {
        bail!("test root {} is not a directory", cli.test_root.display());
    }

    let runner = ProcessRunner::new(&cli.interpreter, config.timeout())
        .context("Failed to prepare process runner")?;
    let reporter = ConsoleReporter::new().with_no_color(cli.no_color);

    let mut harness = Harness::new(runner, reporter, config.extension, config.marker);
    let tally = harness.run(&cli.test_root);
    info!(
        total = tally.total,
        passed = tally.passed,
        failed = tally.failed(),
        "test run finished"
    );

    Ok(harness.finish(tally))
}

/// Defaults, then the config file, then CLI flags
fn resolve_config(cli: &Cli) -> Result<HarnessConfig> {
    let config = match &cli.config {
        Some(path) => HarnessConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => HarnessConfig::default(),
    };

    match cli.timeout {
        Some(secs) => config
            .with_timeout_secs(secs)
            .context("Invalid --timeout value"),
        None => Ok(config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_cli_parse_positionals() {
        let cli = Cli::try_parse_from(["hytest", "tests", "bin/hydrogen"]).unwrap();
        assert_eq!(cli.test_root, PathBuf::from("tests"));
        assert_eq!(cli.interpreter, PathBuf::from("bin/hydrogen"));
        assert_eq!(cli.timeout, None);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_cli_rejects_wrong_arity() {
        assert!(Cli::try_parse_from(["hytest"]).is_err());
        assert!(Cli::try_parse_from(["hytest", "tests"]).is_err());
        assert!(Cli::try_parse_from(["hytest", "tests", "bin/hydrogen", "extra"]).is_err());
    }

    #[test]
    fn test_cli_parse_flags() {
        let cli = Cli::try_parse_from([
            "hytest", "tests", "hy", "--timeout", "9", "--no-color", "-vv",
        ])
        .unwrap();
        assert_eq!(cli.timeout, Some(9));
        assert!(cli.no_color);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_resolve_config_flag_overrides_default() {
        let cli = Cli::try_parse_from(["hytest", "tests", "hy", "-t", "5"]).unwrap();
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.extension, "hy");
    }

    #[test]
    fn test_resolve_config_rejects_zero_timeout() {
        let cli = Cli::try_parse_from(["hytest", "tests", "hy", "-t", "0"]).unwrap();
        assert!(resolve_config(&cli).is_err());
    }

    #[test]
    fn test_resolve_config_file_then_flag() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("harness.toml");
        std::fs::write(&path, "timeout_secs = 4\nextension = \"hyd\"\n").unwrap();

        let cli = Cli::try_parse_from([
            "hytest",
            "tests",
            "hy",
            "--config",
            path.to_str().unwrap(),
        ])
        .unwrap();
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.timeout_secs, 4);
        assert_eq!(config.extension, "hyd");

        let cli = Cli::try_parse_from([
            "hytest",
            "tests",
            "hy",
            "--config",
            path.to_str().unwrap(),
            "--timeout",
            "8",
        ])
        .unwrap();
        assert_eq!(resolve_config(&cli).unwrap().timeout_secs, 8);
    }
}
