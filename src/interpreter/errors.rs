//! The single fatal fault raised by the parser, resolver and VM
//!
//! Every failure aborts the run. Variants exist so callers and tests can tell
//! faults apart; the `Display` text is what a user sees on stderr.

use thiserror::Error;

/// Message printed when a fault has nothing more specific to say
pub const DEFAULT_MESSAGE: &str = "Dead chat.";

#[derive(Debug, Error)]
pub enum Fault {
    /* ===================== Static ===================== */
    /// No grammar pattern matches a source line
    #[error("line {line}: nobody understood {text:?}")]
    Syntax { line: usize, text: String },

    /// A quoted literal has a malformed escape sequence
    #[error("malformed string literal {0}")]
    BadStringLiteral(String),

    /// A variable or label name fails construction-time validation
    #[error("{0}")]
    InvalidName(String),

    /// A statement operand fails construction-time validation
    #[error("{0}")]
    InvalidOperand(String),

    /// Integer literal outside the signed 64-bit range
    #[error("integer literal {0} does not fit in 64 bits")]
    IntegerOutOfRange(String),

    #[error("channel #{0} was already made")]
    DuplicateLabel(String),

    #[error("statement {index} goes to #{label}, which nobody made")]
    UnknownLabel { index: usize, label: String },

    /// A block closer, else or else-if with no matching opener
    #[error("statement {index} closes a block that was never opened")]
    UnmatchedBlock { index: usize },

    /// Input ended with a conditional or loop still open
    #[error("block opened at statement {index} is never closed")]
    UnclosedBlock { index: usize },

    #[error("statement {index} uses else-if, which needs language extensions")]
    ExtensionDisabled { index: usize },

    #[error("{name:?} must be uppercase")]
    NotUppercase { name: String },

    /* ===================== Runtime ===================== */
    #[error("Did you ever even log on?")]
    NotLoggedOn,

    #[error("statement {index} logs on twice")]
    DuplicateStart { index: usize },

    /// The deliberate-error statement
    #[error("{}", DEFAULT_MESSAGE)]
    Deliberate,

    /// A statement addressed a variable other than EVERYONE where only EVERYONE is legal
    #[error("only EVERYONE can be addressed here, not @{name}")]
    NotEveryone { name: String },

    /// A one-shot modifier was not followed by a statement that consumes it
    #[error("statement {index} cannot follow {modifier}")]
    DanglingModifier { index: usize, modifier: &'static str },

    #[error("there is no #general to go back to")]
    EmptyReturnStack,

    #[error("statement {index} ran more than {limit} times")]
    VisitLimit { index: usize, limit: usize },

    #[error("subroutine calls nested deeper than {limit}")]
    CallDepth { limit: usize },

    #[error("You officially just lit the servers on fire.")]
    PrintLimit,

    #[error("integer {0} does not fit in 64 bits")]
    IntegerOverflow(String),

    #[error("Everyone online hates large numbers, don't force them.")]
    NumberTooLarge,

    #[error("Sometimes you should get the right installation for this application.")]
    Unsupported { index: usize },

    #[error("run was cancelled")]
    Cancelled,

    #[error("could not talk to the console: {0}")]
    Io(#[from] std::io::Error),

    /// Unexpected evaluation failure, cause kept for diagnostics
    #[error("{}", DEFAULT_MESSAGE)]
    Internal(String),
}

impl Fault {
    /// Diagnostic detail for faults whose user-facing message hides the cause
    pub fn detail(&self) -> Option<&str> {
        match self {
            Fault::Internal(cause) => Some(cause),
            _ => None,
        }
    }
}

pub type FaultResult<T> = Result<T, Fault>;
