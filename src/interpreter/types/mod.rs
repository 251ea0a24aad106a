//! Type definitions for the interpreter
//!
//! - Names (VarName, LabelName) with construction-time validation
//! - Statements and their operands
//! - Runtime values (Val)

pub mod names;
pub mod statement;
pub mod values;

// Re-export all types for convenient access
pub use names::{is_uppercase_name, LabelName, VarName, EVERYONE};
pub use statement::{Arg, Condition, OpKind, Operand, Operation, Statement};
pub use values::{format_float, reparse, Val};
