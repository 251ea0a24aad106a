//! Virtual Machine state
//!
//! The VM holds all execution state:
//! - pc: index of the next statement
//! - variables: the global store, in first-assignment order
//! - return_stack / visits / prints: bookkeeping for the resource ceilings
//! - two one-shot modifier flags

use indexmap::IndexMap;
use std::collections::HashMap;
use std::io::{BufRead, Stdin, Stdout, Write};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::config::{Limits, Options};
use crate::interpreter::errors::FaultResult;
use crate::interpreter::resolver::Program;
use crate::interpreter::types::{reparse, Val, VarName};

/* ===================== VM ===================== */

#[derive(Debug, Clone)]
pub struct Vm {
    pub(super) program: Arc<Program>,
    pub(super) options: Options,
    pub(super) limits: Limits,
    pub(super) cancel: CancellationToken,

    /// Index of the statement executed by the next step
    pub(super) pc: usize,
    pub(super) variables: IndexMap<VarName, Val>,
    /// Statement indices to resume at after a subroutine returns
    pub(super) return_stack: Vec<usize>,
    /// Per jump site: loop header, goto or call index to times taken
    pub(super) visits: HashMap<usize, usize>,
    pub(super) prints: usize,

    pub(super) started: bool,
    pub(super) suppress_newline: bool,
    pub(super) negate_next: bool,
    pub(super) finished: Option<Completion>,
}

impl Vm {
    /// Create a VM positioned at the first statement of a resolved program
    pub fn new(program: Program, options: Options) -> Self {
        Vm {
            program: Arc::new(program),
            options,
            limits: Limits::default(),
            cancel: CancellationToken::new(),
            pc: 0,
            variables: IndexMap::new(),
            return_stack: Vec::new(),
            visits: HashMap::new(),
            prints: 0,
            started: false,
            suppress_newline: false,
            negate_next: false,
            finished: None,
        }
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Stop the run before the next statement once `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn variables(&self) -> &IndexMap<VarName, Val> {
        &self.variables
    }

    pub fn return_depth(&self) -> usize {
        self.return_stack.len()
    }

    /// How the run ended, once it has
    pub fn completion(&self) -> Option<Completion> {
        self.finished
    }

    /// The EVERYONE aggregate: every stored value's text, in store order
    pub fn everyone(&self) -> String {
        self.variables.values().map(|v| v.to_string()).collect()
    }

    /// EVERYONE read as a value, numbers reparsed
    pub fn everyone_value(&self) -> FaultResult<Val> {
        reparse(&self.everyone())
    }
}

/* ===================== Console ===================== */

/// Line input and flushed output for a run
#[derive(Debug)]
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Console { input, output }
    }

    /// Read one line without its line ending; `None` at end of input
    pub fn read_line(&mut self) -> FaultResult<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Some(line))
    }

    pub fn write(&mut self, text: &str) -> FaultResult<()> {
        self.output.write_all(text.as_bytes())?;
        self.output.flush()?;
        Ok(())
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl Console<std::io::StdinLock<'static>, Stdout> {
    /// Console over the process's standard input and output
    pub fn stdio() -> Self {
        let stdin: Stdin = std::io::stdin();
        Console::new(stdin.lock(), std::io::stdout())
    }
}

/* ===================== Step Result ===================== */

/// How a finished run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The end-program statement ran
    Ended,
    /// The pc ran past the last statement without an end-program
    FellOffEnd,
}

/// Result of executing one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Continue to next step
    Continue,
    /// Execution complete
    Done(Completion),
}
