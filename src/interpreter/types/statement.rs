//! Statement model
//!
//! A program is a `Vec<Statement>` addressed by index. Statements that carry
//! names or operands are built through the constructors below, which validate
//! and normalize against the active [`Options`].

use serde::{Deserialize, Serialize};

use super::names::{LabelName, VarName};
use crate::config::Options;
use crate::interpreter::errors::{Fault, FaultResult};

/* ===================== Arithmetic ===================== */

/// Binary arithmetic operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpKind {
    Add,
    Sub,
    Mult,
    IntDiv,
    TrueDiv,
    Mod,
    Exp,
}

impl OpKind {
    pub const ALL: [OpKind; 7] = [
        OpKind::Add,
        OpKind::Sub,
        OpKind::Mult,
        OpKind::IntDiv,
        OpKind::TrueDiv,
        OpKind::Mod,
        OpKind::Exp,
    ];

    /// Source keyword
    pub fn keyword(self) -> &'static str {
        match self {
            OpKind::Add => "ADD",
            OpKind::Sub => "SUB",
            OpKind::Mult => "MULT",
            OpKind::IntDiv => "INTDIV",
            OpKind::TrueDiv => "TRUEDIV",
            OpKind::Mod => "MOD",
            OpKind::Exp => "EXP",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.keyword() == keyword)
    }
}

/// Argument of an arithmetic operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "t", content = "v")]
pub enum Arg {
    Int(i64),
    Variable(VarName),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub kind: OpKind,
    pub lhs: Arg,
    pub rhs: Arg,
    /// Destination variable, if the result is stored
    pub dest: Option<VarName>,
}

impl Operation {
    pub fn new(kind: OpKind, lhs: Arg, rhs: Arg, dest: Option<VarName>) -> Self {
        Self { kind, lhs, rhs, dest }
    }
}

/* ===================== Conditions ===================== */

/// Comparison value of a condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "t", content = "v")]
pub enum Operand {
    /// Raw text, reparsed as a number at evaluation time when it looks like one
    Token(String),
    Int(i64),
    /// Nested operation; never has a destination
    Operation(Box<Operation>),
    Variable(VarName),
}

/// `@name FINALLY IS value`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub name: VarName,
    pub compare: Operand,
}

impl Condition {
    pub fn new(name: &str, compare: Operand, options: &Options) -> FaultResult<Self> {
        if let Operand::Operation(op) = &compare {
            if op.dest.is_some() {
                return Err(Fault::InvalidOperand(
                    "compare_value cannot store its result".to_string(),
                ));
            }
        }
        Ok(Self {
            name: VarName::new(name, "variable name", options)?,
            compare,
        })
    }
}

/* ===================== Statements ===================== */

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Statement {
    ProgramStart,
    Comment { text: String },
    SetVariable { name: VarName, value: String },
    Variable { name: VarName },
    PrintVariable { name: VarName },
    PrintString { message: String },
    PrintAsciiChar { code: u8 },
    CauseError,
    Operation(Operation),
    GetInput { name: VarName },
    NoNewlineNext,
    NegateConditional,
    ClearVariable { name: VarName },
    ConditionalEnd,
    WhileEnd,
    WhileBegin(Condition),
    ConditionalBegin(Condition),
    Else,
    ConditionalElse(Condition),
    ConditionalSkipNext(Condition),
    Label { name: LabelName },
    GoTo { label: LabelName },
    EndSubroutine,
    CallSubroutine { label: LabelName },
    EndProgram,
}

impl Statement {
    pub fn comment(text: &str) -> FaultResult<Self> {
        if text.contains(['\r', '\n', '\x0c']) {
            return Err(Fault::InvalidOperand("comments cannot contain newlines".to_string()));
        }
        Ok(Statement::Comment { text: text.to_string() })
    }

    pub fn set_variable(name: &str, value: &str, options: &Options) -> FaultResult<Self> {
        if value.is_empty() {
            return Err(Fault::InvalidOperand("value cannot be empty".to_string()));
        }
        Ok(Statement::SetVariable {
            name: VarName::new(name, "variable name", options)?,
            value: value.to_string(),
        })
    }

    pub fn variable(name: &str, options: &Options) -> FaultResult<Self> {
        Ok(Statement::Variable { name: VarName::new(name, "variable name", options)? })
    }

    pub fn print_variable(name: &str, options: &Options) -> FaultResult<Self> {
        Ok(Statement::PrintVariable { name: VarName::new(name, "variable name", options)? })
    }

    pub fn print_string(message: &str) -> Self {
        Statement::PrintString { message: message.to_string() }
    }

    pub fn print_ascii_char(code: i64) -> FaultResult<Self> {
        match u8::try_from(code) {
            Ok(code) if code <= 0x7f => Ok(Statement::PrintAsciiChar { code }),
            _ => Err(Fault::InvalidOperand(format!("invalid ASCII char value: {}", code))),
        }
    }

    pub fn get_input(name: &str, options: &Options) -> FaultResult<Self> {
        Ok(Statement::GetInput { name: VarName::new(name, "variable name", options)? })
    }

    pub fn clear_variable(name: &str, options: &Options) -> FaultResult<Self> {
        Ok(Statement::ClearVariable { name: VarName::new(name, "variable name", options)? })
    }

    pub fn label(name: &str, options: &Options) -> FaultResult<Self> {
        Ok(Statement::Label { name: LabelName::new(name, options)? })
    }

    pub fn go_to(label: &str, options: &Options) -> FaultResult<Self> {
        Ok(Statement::GoTo { label: LabelName::new(label, options)? })
    }

    pub fn call_subroutine(label: &str, options: &Options) -> FaultResult<Self> {
        Ok(Statement::CallSubroutine { label: LabelName::new(label, options)? })
    }

    /// True for statements the suppress-newline modifier may precede
    pub fn is_print(&self) -> bool {
        matches!(
            self,
            Statement::PrintVariable { .. }
                | Statement::PrintString { .. }
                | Statement::PrintAsciiChar { .. }
        )
    }

    /// True for statements the negate-condition modifier may precede
    pub fn is_negatable(&self) -> bool {
        matches!(
            self,
            Statement::ConditionalBegin(_)
                | Statement::WhileBegin(_)
                | Statement::ConditionalSkipNext(_)
        )
    }

    /// Label referenced by a goto or subroutine call
    pub fn jump_target(&self) -> Option<&LabelName> {
        match self {
            Statement::GoTo { label } | Statement::CallSubroutine { label } => Some(label),
            _ => None,
        }
    }

    /// Every variable name the statement mentions, nested operands included
    pub fn variable_names(&self) -> Vec<&VarName> {
        fn from_operation<'a>(op: &'a Operation, out: &mut Vec<&'a VarName>) {
            for arg in [&op.lhs, &op.rhs] {
                if let Arg::Variable(name) = arg {
                    out.push(name);
                }
            }
            if let Some(dest) = &op.dest {
                out.push(dest);
            }
        }

        let mut names = Vec::new();
        match self {
            Statement::SetVariable { name, .. }
            | Statement::Variable { name }
            | Statement::PrintVariable { name }
            | Statement::GetInput { name }
            | Statement::ClearVariable { name } => names.push(name),
            Statement::Operation(op) => from_operation(op, &mut names),
            Statement::WhileBegin(cond)
            | Statement::ConditionalBegin(cond)
            | Statement::ConditionalElse(cond)
            | Statement::ConditionalSkipNext(cond) => {
                names.push(&cond.name);
                match &cond.compare {
                    Operand::Variable(name) => names.push(name),
                    Operand::Operation(op) => from_operation(op, &mut names),
                    Operand::Token(_) | Operand::Int(_) => {}
                }
            }
            _ => {}
        }
        names
    }
}
