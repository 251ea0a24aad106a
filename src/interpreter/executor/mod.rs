//! # Executor - Program-Counter-Driven Interpreter
//!
//! Runs a resolved [`Program`](crate::interpreter::resolver::Program) one
//! statement per `step`.
//!
//! ## Core Principles
//!
//! 1. **Flat execution**: the program is a statement arena; control flow is a
//!    program counter plus the resolver's jump tables, no recursion
//! 2. **Bounded**: visit, call-depth and print ceilings stop runaway programs
//! 3. **Pure executor**: no async, no globals; I/O goes through a [`Console`]
//! 4. **Cancellable**: a cancellation token is honored between statements

pub mod arithmetic;
pub mod exec_loop;
pub mod expressions;
pub mod statements;
pub mod vm;

#[cfg(test)]
mod tests;

// Re-export commonly used items
pub use exec_loop::{run_until_done, step};
pub use statements::Flow;
pub use vm::{Completion, Console, Step, Vm};
