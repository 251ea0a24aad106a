//! Statement execution handlers
//!
//! Each handler runs one statement in the normal state and tells the exec
//! loop where to go next.

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing::trace;

use super::expressions::{eval_condition, eval_operation, require_everyone};
use super::vm::{Console, Vm};
use crate::interpreter::errors::{Fault, FaultResult};
use crate::interpreter::resolver::BlockKind;
use crate::interpreter::types::{Condition, LabelName, Statement, Val};

/// Where execution continues after a statement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// The following statement
    Next,
    /// An explicit statement index
    Jump(usize),
    /// End-program ran
    End,
}

/* ===================== Dispatch ===================== */

/// Execute a statement in the normal state
///
/// `negate` is the negate-next-condition flag as it stood before this
/// statement; the exec loop has already checked that the statement accepts it.
pub fn execute_statement<R: BufRead, W: Write>(
    vm: &mut Vm,
    console: &mut Console<R, W>,
    index: usize,
    stmt: &Statement,
    negate: bool,
) -> FaultResult<Flow> {
    match stmt {
        Statement::ProgramStart => Err(Fault::DuplicateStart { index }),
        Statement::EndProgram => Ok(Flow::End),
        Statement::CauseError => Err(Fault::Deliberate),
        Statement::Comment { .. } | Statement::Label { .. } => Ok(Flow::Next),

        Statement::SetVariable { name, value } => {
            vm.variables.insert(name.clone(), Val::Str(value.clone()));
            Ok(Flow::Next)
        }
        Statement::Variable { name } => {
            require_everyone(name)?;
            let value = vm.everyone();
            trace!(index, len = value.len(), "read EVERYONE");
            Ok(Flow::Next)
        }
        Statement::PrintVariable { .. }
        | Statement::PrintString { .. }
        | Statement::PrintAsciiChar { .. } => {
            execute_print(vm, console, stmt, true)?;
            Ok(Flow::Next)
        }
        Statement::Operation(op) => {
            let result = eval_operation(vm, op)?;
            if let Some(dest) = &op.dest {
                vm.variables.insert(dest.clone(), result);
            }
            Ok(Flow::Next)
        }
        Statement::GetInput { name } => {
            let line = console.read_line()?.ok_or_else(|| {
                Fault::Io(io::Error::new(io::ErrorKind::UnexpectedEof, "no more input"))
            })?;
            vm.variables.insert(name.clone(), Val::Str(line));
            Ok(Flow::Next)
        }
        Statement::NoNewlineNext => {
            vm.suppress_newline = true;
            Ok(Flow::Next)
        }
        Statement::NegateConditional => {
            vm.negate_next = true;
            Ok(Flow::Next)
        }
        Statement::ClearVariable { name } => {
            require_everyone(name)?;
            vm.variables.clear();
            Ok(Flow::Next)
        }

        Statement::WhileBegin(cond) => execute_while_begin(vm, index, cond, negate),
        Statement::ConditionalBegin(cond) => execute_conditional(vm, index, cond, negate),
        Statement::ConditionalEnd | Statement::WhileEnd => execute_terminator(vm, index),
        Statement::Else | Statement::ConditionalElse(_) => skip_to_chain_end(vm, index),
        Statement::ConditionalSkipNext(_) => Err(Fault::Unsupported { index }),

        Statement::GoTo { label } => execute_goto(vm, index, label),
        Statement::CallSubroutine { label } => execute_call(vm, index, label),
        Statement::EndSubroutine => {
            let target = vm.return_stack.pop().ok_or(Fault::EmptyReturnStack)?;
            trace!(from = index, to = target, "return");
            Ok(Flow::Jump(target))
        }
    }
}

/* ===================== Output ===================== */

/// Emit a print-family statement, with a trailing newline when `newline` is set
///
/// ASCII characters never get a newline.
pub fn execute_print<R: BufRead, W: Write>(
    vm: &mut Vm,
    console: &mut Console<R, W>,
    stmt: &Statement,
    newline: bool,
) -> FaultResult<()> {
    let mut text = match stmt {
        Statement::PrintVariable { name } => {
            require_everyone(name)?;
            vm.everyone()
        }
        Statement::PrintString { message } => message.clone(),
        Statement::PrintAsciiChar { code } => {
            console.write(&char::from(*code).to_string())?;
            return count_print(vm);
        }
        other => return Err(Fault::Internal(format!("{:?} is not a print", other))),
    };
    if newline {
        text.push('\n');
    }
    console.write(&text)?;
    count_print(vm)
}

fn count_print(vm: &mut Vm) -> FaultResult<()> {
    vm.prints += 1;
    if vm.prints > vm.limits.max_visits {
        return Err(Fault::PrintLimit);
    }
    Ok(())
}

/* ===================== Blocks ===================== */

fn block_end(vm: &Vm, index: usize) -> FaultResult<usize> {
    vm.program
        .flow
        .block_end(index)
        .ok_or_else(|| Fault::Internal(format!("statement {} has no matched block", index)))
}

fn visit(vm: &mut Vm, index: usize) -> FaultResult<()> {
    let count = vm.visits.entry(index).or_insert(0);
    *count += 1;
    if *count > vm.limits.max_visits {
        return Err(Fault::VisitLimit {
            index,
            limit: vm.limits.max_visits,
        });
    }
    Ok(())
}

fn execute_while_begin(vm: &mut Vm, index: usize, cond: &Condition, negate: bool) -> FaultResult<Flow> {
    if eval_condition(vm, cond, negate)? {
        visit(vm, index)?;
        Ok(Flow::Next)
    } else {
        vm.visits.insert(index, 0);
        Ok(Flow::Jump(block_end(vm, index)? + 1))
    }
}

/// A false condition walks the else-if links until one holds, landing after
/// the first link that is an else, a true else-if or the terminator
fn execute_conditional(vm: &mut Vm, index: usize, cond: &Condition, negate: bool) -> FaultResult<Flow> {
    if eval_condition(vm, cond, negate)? {
        return Ok(Flow::Next);
    }
    let program = Arc::clone(&vm.program);
    let mut at = index;
    loop {
        let link = block_end(vm, at)?;
        match program.get(link) {
            Some(Statement::ConditionalElse(next)) => {
                if eval_condition(vm, next, false)? {
                    return Ok(Flow::Jump(link + 1));
                }
                at = link;
            }
            _ => return Ok(Flow::Jump(link + 1)),
        }
    }
}

fn execute_terminator(vm: &mut Vm, index: usize) -> FaultResult<Flow> {
    match vm.program.flow.closer_kind(index) {
        Some(BlockKind::Loop) => Ok(Flow::Jump(block_end(vm, index)?)),
        Some(BlockKind::Conditional) => Ok(Flow::Next),
        None => Err(Fault::Internal(format!(
            "statement {} closes no block",
            index
        ))),
    }
}

/// A branch that ran to its end skips the rest of the chain
fn skip_to_chain_end(vm: &mut Vm, index: usize) -> FaultResult<Flow> {
    let mut at = index;
    loop {
        let link = block_end(vm, at)?;
        if vm.program.flow.closer_kind(link).is_some() {
            return Ok(Flow::Jump(link + 1));
        }
        at = link;
    }
}

/* ===================== Jumps ===================== */

fn label_index(vm: &Vm, index: usize, label: &LabelName) -> FaultResult<usize> {
    vm.program.flow.label(label).ok_or_else(|| Fault::UnknownLabel {
        index,
        label: label.to_string(),
    })
}

fn execute_goto(vm: &mut Vm, index: usize, label: &LabelName) -> FaultResult<Flow> {
    visit(vm, index)?;
    let target = label_index(vm, index, label)?;
    trace!(from = index, to = target, "goto");
    Ok(Flow::Jump(target))
}

fn execute_call(vm: &mut Vm, index: usize, label: &LabelName) -> FaultResult<Flow> {
    visit(vm, index)?;
    if vm.return_stack.len() + 1 >= vm.limits.max_visits {
        return Err(Fault::CallDepth {
            limit: vm.limits.max_visits,
        });
    }
    let target = label_index(vm, index, label)?;
    vm.return_stack.push(index + 1);
    trace!(from = index, to = target, depth = vm.return_stack.len(), "call");
    Ok(Flow::Jump(target))
}
