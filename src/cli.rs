//! Command-line harness
//!
//! Loads a program file, layers flags over the loaded configuration, then runs
//! the program on a blocking task under a wall-clock deadline.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{Config, Limits, Options};
use crate::interpreter::{
    load_program, render_program, run_until_done, Completion, Console, Fault, Program, Vm,
};

pub const BOREDOM_MESSAGE: &str = "Everyone has died of boredom.";
pub const UNSENT_MESSAGE: &str = "Your message could not be sent.";
pub const NIGHT_OWL_MESSAGE: &str = "You must be quite a night owl.";

/// Public DNS resolvers tried by the connectivity check
pub const RESOLVER_HOSTS: [&str; 6] = [
    "1.1.1.1",
    "1.0.0.1",
    "8.8.8.8",
    "8.8.4.4",
    "208.67.222.222",
    "208.67.220.220",
];
const RESOLVER_PORT: u16 = 53;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Parser, Debug)]
#[command(name = "everyone")]
#[command(about = "Run programs written in the @everyone chat language", long_about = None)]
pub struct Cli {
    /// Program file to run
    pub file: PathBuf,

    /// Path to config file (overrides default search)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Uppercase variable names and reject references that are not uppercase
    #[arg(long)]
    pub require_uppercase_variables: bool,

    /// Uppercase label names and reject references that are not uppercase
    #[arg(long)]
    pub require_uppercase_labels: bool,

    /// Allow variable names that differ from EVERYONE only in case
    #[arg(long)]
    pub unsafe_variable_names: bool,

    /// Accept the permissive spelling of each statement
    #[arg(long)]
    pub lenient_syntax: bool,

    /// Enable else-if chains
    #[arg(long)]
    pub language_extensions: bool,

    /// Wrap integers at 64 bits
    #[arg(long, conflicts_with = "unbounded_integers")]
    pub bounded_integers: bool,

    /// Let integers grow without bound
    #[arg(long)]
    pub unbounded_integers: bool,

    /// Wall-clock budget in seconds (default: from config, 60)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Skip the check that a public DNS resolver is reachable before running
    #[arg(long)]
    pub no_check_connectivity: bool,

    /// Print the canonical rendering of the program instead of running it
    #[arg(long)]
    pub dump: bool,

    /// With --dump, print the parsed statements as JSON
    #[arg(long, requires = "dump")]
    pub json: bool,
}

impl Cli {
    /// Layer the flags over a loaded configuration
    ///
    /// Option flags only switch an option on; the integer pair picks either mode.
    pub fn apply(&self, config: &mut Config) {
        let options = &mut config.options;
        options.require_uppercase_variable_names |= self.require_uppercase_variables;
        options.require_uppercase_label_names |= self.require_uppercase_labels;
        options.allow_unsafe_variable_names |= self.unsafe_variable_names;
        options.lenient_syntax |= self.lenient_syntax;
        options.language_extensions |= self.language_extensions;
        if self.bounded_integers {
            options.bounded_integers = true;
        }
        if self.unbounded_integers {
            options.bounded_integers = false;
        }
        if let Some(timeout) = self.timeout {
            config.limits.timeout_secs = timeout;
        }
    }
}

/* ===================== Outcome ===================== */

/// How a run ended, as far as the process is concerned
#[derive(Debug)]
pub enum RunOutcome {
    Completed(Completion),
    Faulted(Fault),
    TimedOut,
}

impl RunOutcome {
    /// Report the outcome on stderr and pick the exit status
    pub fn report(&self) -> ExitCode {
        match self {
            RunOutcome::Completed(Completion::Ended) => return ExitCode::SUCCESS,
            RunOutcome::Completed(Completion::FellOffEnd) => eprintln!("{}", NIGHT_OWL_MESSAGE),
            RunOutcome::Faulted(fault) => {
                if let Some(detail) = fault.detail() {
                    debug!(detail, "fault detail");
                }
                eprintln!("{}", fault);
            }
            RunOutcome::TimedOut => eprintln!("{}", BOREDOM_MESSAGE),
        }
        ExitCode::FAILURE
    }
}

/* ===================== Entry points ===================== */

/// Run the CLI by parsing process arguments
pub async fn run_cli() -> Result<ExitCode> {
    run_cli_with_args(Cli::parse()).await
}

/// Run the CLI with provided arguments; the first one is the program name
pub async fn run_cli_from_args(args: Vec<String>) -> Result<ExitCode> {
    let cli = Cli::try_parse_from(args)?;
    run_cli_with_args(cli).await
}

async fn run_cli_with_args(cli: Cli) -> Result<ExitCode> {
    let mut config = Config::load(cli.config.as_deref())?;
    cli.apply(&mut config);
    info!(options = ?config.options, limits = ?config.limits, "configuration loaded");

    let source = tokio::fs::read_to_string(&cli.file)
        .await
        .with_context(|| format!("Failed to read {}", cli.file.display()))?;

    let program = match load_program(&source, &config.options) {
        Ok(program) => program,
        Err(fault) => return Ok(RunOutcome::Faulted(fault).report()),
    };

    if cli.dump {
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&program.statements)?);
        } else {
            println!("{}", render_program(&program.statements, &config.options));
        }
        return Ok(ExitCode::SUCCESS);
    }

    if !cli.no_check_connectivity && !check_connectivity().await {
        eprintln!("{}", UNSENT_MESSAGE);
        return Ok(ExitCode::FAILURE);
    }

    let outcome = execute(program, config.options, config.limits).await?;
    Ok(outcome.report())
}

/* ===================== Running ===================== */

/// Run a program against stdin and stdout, cancelling it at the deadline
///
/// A run stuck reading stdin cannot observe the cancellation; the caller's
/// runtime shutdown has to abandon it.
pub async fn execute(program: Program, options: Options, limits: Limits) -> Result<RunOutcome> {
    let token = CancellationToken::new();
    let mut vm = Vm::new(program, options)
        .with_limits(limits)
        .with_cancellation(token.clone());

    let mut handle = tokio::task::spawn_blocking(move || {
        let mut console = Console::stdio();
        run_until_done(&mut vm, &mut console)
    });
    let deadline = tokio::time::sleep(Duration::from_secs(limits.timeout_secs));

    tokio::select! {
        joined = &mut handle => {
            let result = joined.context("Interpreter task failed")?;
            Ok(match result {
                Ok(completion) => RunOutcome::Completed(completion),
                Err(fault) => RunOutcome::Faulted(fault),
            })
        }
        _ = deadline => {
            warn!(timeout_secs = limits.timeout_secs, "deadline passed, cancelling run");
            token.cancel();
            Ok(RunOutcome::TimedOut)
        }
    }
}

/// True once any resolver accepts a TCP connection on the DNS port
pub async fn check_connectivity() -> bool {
    for host in RESOLVER_HOSTS {
        let attempt = tokio::time::timeout(CONNECT_TIMEOUT, TcpStream::connect((host, RESOLVER_PORT)));
        match attempt.await {
            Ok(Ok(_)) => return true,
            Ok(Err(e)) => debug!(host, error = %e, "resolver unreachable"),
            Err(_) => debug!(host, "resolver timed out"),
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args.iter().copied()).expect("arguments should parse")
    }

    fn program(source: &str, options: &Options) -> Program {
        load_program(source, options).expect("program should load")
    }

    #[test]
    fn test_flags_override_config() {
        let cli = parse(&[
            "everyone",
            "prog.chat",
            "--lenient-syntax",
            "--unbounded-integers",
            "--timeout",
            "5",
        ]);
        let mut config = Config::default();
        cli.apply(&mut config);

        assert!(config.options.lenient_syntax);
        assert!(!config.options.bounded_integers);
        assert!(!config.options.language_extensions);
        assert_eq!(config.limits.timeout_secs, 5);
        assert_eq!(config.limits.max_visits, Limits::DEFAULT_MAX_VISITS);
    }

    #[test]
    fn test_flags_keep_config_when_absent() {
        let cli = parse(&["everyone", "prog.chat"]);
        let mut config = Config::default();
        config.options.language_extensions = true;
        config.options.bounded_integers = false;
        cli.apply(&mut config);

        assert!(config.options.language_extensions);
        assert!(!config.options.bounded_integers);
        assert_eq!(config.limits.timeout_secs, Limits::DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_connectivity_check_is_on_by_default() {
        assert!(!parse(&["everyone", "prog.chat"]).no_check_connectivity);
        let opted_out = parse(&["everyone", "prog.chat", "--no-check-connectivity"]);
        assert!(opted_out.no_check_connectivity);
        assert!(Cli::try_parse_from(["everyone", "prog.chat", "--check-connectivity"]).is_err());
    }

    #[test]
    fn test_integer_modes_conflict() {
        let result = Cli::try_parse_from([
            "everyone",
            "prog.chat",
            "--bounded-integers",
            "--unbounded-integers",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_execute_runs_to_end() {
        let options = Options::default();
        let outcome = tokio_test::block_on(execute(
            program("HI EVERYONE\nGTG SRRY", &options),
            options,
            Limits::default(),
        ))
        .unwrap();

        assert!(matches!(outcome, RunOutcome::Completed(Completion::Ended)));
    }

    #[test]
    fn test_execute_reports_faults() {
        let options = Options::default();
        let outcome = tokio_test::block_on(execute(
            program("HI EVERYONE\nOOPS I KILLED CHAT", &options),
            options,
            Limits::default(),
        ))
        .unwrap();

        assert!(matches!(outcome, RunOutcome::Faulted(Fault::Deliberate)));
    }

    #[test]
    fn test_execute_times_out() {
        let options = Options::default();
        let limits = Limits {
            max_visits: usize::MAX,
            timeout_secs: 1,
        };
        let source = "HI EVERYONE\nWHILE @EVERYONE FINALLY IS @EVERYONE\nNOT PAST HERE";
        let outcome =
            tokio_test::block_on(execute(program(source, &options), options, limits)).unwrap();

        assert!(matches!(outcome, RunOutcome::TimedOut));
    }

    #[test]
    fn test_cli_dumps_program() {
        let dir = std::env::temp_dir().join(format!("everyone-cli-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("hello.chat");
        std::fs::write(&path, "HI EVERYONE\nUHH SO hello\nGTG SRRY\n").unwrap();

        let args = vec![
            "everyone".to_string(),
            path.display().to_string(),
            "--dump".to_string(),
        ];
        let result = tokio_test::block_on(run_cli_from_args(args));
        assert!(result.is_ok());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_json_requires_dump() {
        assert!(Cli::try_parse_from(["everyone", "prog.chat", "--json"]).is_err());
        assert!(parse(&["everyone", "prog.chat", "--dump", "--json"]).json);
    }

    #[test]
    fn test_statements_serialize_with_type_tag() {
        let options = Options::default();
        let program = program("HI EVERYONE\n@x YOU ARE NOW OFFICIALLY 1", &options);
        let json = serde_json::to_value(&program.statements).unwrap();

        assert_eq!(json[0]["type"], "ProgramStart");
        assert_eq!(json[1]["type"], "SetVariable");
        assert_eq!(json[1]["name"], "x");
        assert_eq!(json[1]["value"], "1");
    }

    #[test]
    fn test_cli_missing_file_is_an_error() {
        let args = vec![
            "everyone".to_string(),
            "/definitely/not/here.chat".to_string(),
        ];
        let result = tokio_test::block_on(run_cli_from_args(args));
        assert!(result.is_err());
    }
}
