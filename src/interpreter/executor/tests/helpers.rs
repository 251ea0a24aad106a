//! Test helpers for executor tests
//!
//! Common utilities for loading programs and running them against an
//! in-memory console

use std::io::Cursor;

use crate::config::{Limits, Options};
use crate::interpreter::errors::{Fault, FaultResult};
use crate::interpreter::executor::{run_until_done, Completion, Console, Vm};
use crate::interpreter::load_program;

/// Everything a finished run leaves behind
pub struct RunResult {
    pub vm: Vm,
    pub outcome: FaultResult<Completion>,
    pub output: String,
}

impl RunResult {
    /// Output of a run that must have reached the end-program statement
    pub fn ended(self) -> String {
        match self.outcome {
            Ok(Completion::Ended) => self.output,
            other => panic!("Expected program to end, got {:?} (output {:?})", other, self.output),
        }
    }

    pub fn fault(self) -> Fault {
        match self.outcome {
            Err(fault) => fault,
            Ok(completion) => panic!("Expected a fault, run completed with {:?}", completion),
        }
    }
}

/// Join statement lines into program source
pub fn source(lines: &[&str]) -> String {
    lines.join("\n")
}

/// Build a VM ready to execute with `run_until_done()` or `step()`
pub fn build_vm(lines: &[&str], options: Options, limits: Limits) -> Vm {
    let program = load_program(&source(lines), &options).expect("Program should load");
    Vm::new(program, options).with_limits(limits)
}

pub fn console(input: &str) -> Console<Cursor<Vec<u8>>, Vec<u8>> {
    Console::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
}

/// Load and run a program; load faults are returned before anything runs
pub fn run_program(
    lines: &[&str],
    input: &str,
    options: Options,
    limits: Limits,
) -> FaultResult<RunResult> {
    let program = load_program(&source(lines), &options)?;
    let mut vm = Vm::new(program, options).with_limits(limits);
    let mut console = console(input);
    let outcome = run_until_done(&mut vm, &mut console);
    let output = String::from_utf8(console.into_output()).expect("Output should be UTF-8");
    Ok(RunResult { vm, outcome, output })
}

/// Run with default options and limits and no input
pub fn run(lines: &[&str]) -> RunResult {
    run_program(lines, "", Options::default(), Limits::default()).expect("Program should load")
}

pub fn run_with_options(lines: &[&str], options: Options) -> RunResult {
    run_program(lines, "", options, Limits::default()).expect("Program should load")
}

pub fn run_with_limit(lines: &[&str], max_visits: usize) -> RunResult {
    let limits = Limits::default().with_max_visits(max_visits);
    run_program(lines, "", Options::default(), limits).expect("Program should load")
}
