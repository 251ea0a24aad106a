//! Expression evaluation
//!
//! Everything here reads the VM without changing it: EVERYONE lookups,
//! arithmetic arguments, operations and conditions.

use super::arithmetic;
use super::vm::Vm;
use crate::interpreter::errors::{Fault, FaultResult};
use crate::interpreter::types::{reparse, Arg, Condition, Operand, Operation, Val, VarName};

/// Only EVERYONE may be read, printed, cleared or compared
pub fn require_everyone(name: &VarName) -> FaultResult<()> {
    if name.is_everyone() {
        Ok(())
    } else {
        Err(Fault::NotEveryone {
            name: name.to_string(),
        })
    }
}

pub fn eval_arg(vm: &Vm, arg: &Arg) -> FaultResult<Val> {
    match arg {
        Arg::Int(value) => Ok(Val::int(*value)),
        Arg::Variable(name) => {
            require_everyone(name)?;
            vm.everyone_value()
        }
    }
}

pub fn eval_operation(vm: &Vm, op: &Operation) -> FaultResult<Val> {
    let lhs = eval_arg(vm, &op.lhs)?;
    let rhs = eval_arg(vm, &op.rhs)?;
    arithmetic::apply(op.kind, &lhs, &rhs, vm.options.bounded_integers)
}

/// Evaluate a condition against EVERYONE, inverted when `negate` is set
pub fn eval_condition(vm: &Vm, cond: &Condition, negate: bool) -> FaultResult<bool> {
    require_everyone(&cond.name)?;
    let value = vm.everyone_value()?;
    let compare = match &cond.compare {
        Operand::Token(text) => reparse(text)?,
        Operand::Int(n) => Val::int(*n),
        Operand::Operation(op) => {
            if op.dest.is_some() {
                return Err(Fault::Internal(
                    "compared operation stores its result".to_string(),
                ));
            }
            match eval_operation(vm, op)? {
                Val::Str(text) => reparse(&text)?,
                number => number,
            }
        }
        Operand::Variable(name) => {
            require_everyone(name)?;
            value.clone()
        }
    };
    Ok(value.loosely_equals(&compare) != negate)
}
