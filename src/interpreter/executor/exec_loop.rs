//! Core execution loop
//!
//! This module contains the step() function - the heart of the interpreter.
//! It runs one statement per call and moves the program counter.
//!
//! ## Function Organization
//! 1. run_until_done() - Top-level driver (calls step repeatedly)
//! 2. step() - Checks cancellation and the VM state, then dispatches to the
//!    statement handlers

use std::io::{BufRead, Write};
use std::sync::Arc;
use tracing::{debug, trace, warn};

use super::statements::{execute_print, execute_statement, Flow};
use super::vm::{Completion, Console, Step, Vm};
use crate::interpreter::errors::{Fault, FaultResult};
use crate::interpreter::types::Statement;

/* ===================== Public API ===================== */

/// Run the VM until the program ends, runs off its end or faults
pub fn run_until_done<R: BufRead, W: Write>(
    vm: &mut Vm,
    console: &mut Console<R, W>,
) -> FaultResult<Completion> {
    loop {
        match step(vm, console) {
            Ok(Step::Continue) => continue,
            Ok(Step::Done(completion)) => return Ok(completion),
            Err(fault) => {
                debug!(pc = vm.pc, %fault, "run faulted");
                return Err(fault);
            }
        }
    }
}

/// Execute one statement
///
/// States, checked in order:
/// 1. Not started: only program-start is legal
/// 2. Suppress-newline pending: only a print is legal; it prints without a newline
/// 3. Normal: a pending negate must be consumed by a condition-bearing statement
pub fn step<R: BufRead, W: Write>(vm: &mut Vm, console: &mut Console<R, W>) -> FaultResult<Step> {
    if let Some(completion) = vm.finished {
        return Ok(Step::Done(completion));
    }
    if vm.cancel.is_cancelled() {
        warn!(pc = vm.pc, "run cancelled");
        return Err(Fault::Cancelled);
    }

    // Hold the program separately so handlers can borrow the VM mutably
    let program = Arc::clone(&vm.program);
    let index = vm.pc;
    let Some(stmt) = program.get(index) else {
        warn!(pc = index, "ran past the last statement without ending the program");
        vm.finished = Some(Completion::FellOffEnd);
        return Ok(Step::Done(Completion::FellOffEnd));
    };
    trace!(pc = index, ?stmt, "step");

    let flow = if !vm.started {
        if *stmt != Statement::ProgramStart {
            return Err(Fault::NotLoggedOn);
        }
        vm.started = true;
        Flow::Next
    } else if vm.suppress_newline {
        if !stmt.is_print() {
            return Err(Fault::DanglingModifier {
                index,
                modifier: "I HATE NEWLINES",
            });
        }
        vm.suppress_newline = false;
        execute_print(vm, console, stmt, false)?;
        Flow::Next
    } else {
        let negate = std::mem::take(&mut vm.negate_next);
        if negate && !stmt.is_negatable() {
            return Err(Fault::DanglingModifier {
                index,
                modifier: "IGNORE THAT",
            });
        }
        execute_statement(vm, console, index, stmt, negate)?
    };

    match flow {
        Flow::Next => vm.pc = index + 1,
        Flow::Jump(target) => vm.pc = target,
        Flow::End => {
            debug!(pc = index, "program ended");
            vm.finished = Some(Completion::Ended);
            return Ok(Step::Done(Completion::Ended));
        }
    }
    Ok(Step::Continue)
}
