//! The chat-language interpreter
//!
//! Source text goes through four stages:
//! 1. `parser` turns each line into a [`Statement`]
//! 2. `semantic_validator` applies the option-gated whole-program checks
//! 3. `resolver` builds the label table and block pairing
//! 4. `executor` runs the resolved [`Program`] on a [`Vm`]

pub mod errors;
pub mod executor;
pub mod parser;
pub mod render;
pub mod resolver;
pub mod semantic_validator;
pub mod types;

pub use errors::{Fault, FaultResult, DEFAULT_MESSAGE};
pub use executor::{run_until_done, step, Completion, Console, Step, Vm};
pub use parser::{parse_program, parse_statement};
pub use render::render_program;
pub use resolver::{resolve, BlockKind, ControlFlow, Program};
pub use types::{Statement, Val, VarName};

use crate::config::Options;

/// Parse, validate and resolve a program in one go
pub fn load_program(source: &str, options: &Options) -> FaultResult<Program> {
    let statements = parse_program(source, options)?;
    resolve(statements, options)
}
