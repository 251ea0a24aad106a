pub mod cli;
pub mod config;
pub mod interpreter;

// Re-export the engine entry points
pub use config::{Config, Limits, Options};
pub use interpreter::{load_program, run_until_done, Completion, Console, Fault, Program, Vm};
