//! Line parser
//!
//! Each trimmed source line is matched against the statement patterns in
//! priority order; the first pattern whose grammar rule accepts the whole line
//! decides the statement. Which rule stands for a pattern depends on the
//! options (strict or lenient spelling, extension gating, label casing).

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use tracing::debug;

use crate::config::Options;
use crate::interpreter::errors::{Fault, FaultResult};
use crate::interpreter::types::{Arg, Condition, OpKind, Operand, Operation, Statement, VarName};

pub mod literals;


use literals::{canonical_int, int_literal, unescape};

#[derive(Parser)]
#[grammar = "interpreter/parser/chat.pest"]
struct StatementParser;

/* ===================== Patterns ===================== */

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pattern {
    ProgramStart,
    Comment,
    SetVariable,
    Variable,
    PrintVariable,
    PrintString,
    PrintAsciiChar,
    CauseError,
    Operation,
    GetInput,
    NoNewlineNext,
    NegateConditional,
    ClearVariable,
    ConditionalEnd,
    WhileEnd,
    ConditionalBegin,
    WhileBegin,
    Else,
    ConditionalElse,
    ConditionalSkipNext,
    Label,
    GoTo,
    EndSubroutine,
    CallSubroutine,
    EndProgram,
}

const PRIORITY: [Pattern; 25] = [
    Pattern::ProgramStart,
    Pattern::Comment,
    Pattern::SetVariable,
    Pattern::Variable,
    Pattern::PrintVariable,
    Pattern::PrintString,
    Pattern::PrintAsciiChar,
    Pattern::CauseError,
    Pattern::Operation,
    Pattern::GetInput,
    Pattern::NoNewlineNext,
    Pattern::NegateConditional,
    Pattern::ClearVariable,
    Pattern::ConditionalEnd,
    Pattern::WhileEnd,
    Pattern::ConditionalBegin,
    Pattern::WhileBegin,
    Pattern::Else,
    Pattern::ConditionalElse,
    Pattern::ConditionalSkipNext,
    Pattern::Label,
    Pattern::GoTo,
    Pattern::EndSubroutine,
    Pattern::CallSubroutine,
    Pattern::EndProgram,
];

impl Pattern {
    /// Grammar rule standing for this pattern, or `None` when it is disabled
    fn rule(self, options: &Options) -> Option<Rule> {
        let lenient = options.lenient_syntax;
        let rule = match self {
            Pattern::ProgramStart => Rule::program_start,
            Pattern::Comment if lenient => Rule::comment_lenient,
            Pattern::Comment => Rule::comment,
            Pattern::SetVariable if lenient => Rule::set_variable_lenient,
            Pattern::SetVariable => Rule::set_variable,
            Pattern::Variable => Rule::variable,
            Pattern::PrintVariable if lenient => Rule::print_variable_lenient,
            Pattern::PrintVariable => Rule::print_variable,
            Pattern::PrintString if lenient => Rule::print_string_lenient,
            Pattern::PrintString => Rule::print_string,
            Pattern::PrintAsciiChar => Rule::print_ascii_char,
            Pattern::CauseError => Rule::cause_error,
            Pattern::Operation => Rule::operation,
            Pattern::GetInput => Rule::get_input,
            Pattern::NoNewlineNext if lenient => Rule::no_newline_next_lenient,
            Pattern::NoNewlineNext => Rule::no_newline_next,
            Pattern::NegateConditional if lenient => Rule::negate_conditional_lenient,
            Pattern::NegateConditional => Rule::negate_conditional,
            Pattern::ClearVariable if lenient => Rule::clear_variable_lenient,
            Pattern::ClearVariable => Rule::clear_variable,
            Pattern::ConditionalEnd => Rule::conditional_end,
            Pattern::WhileEnd => Rule::while_end,
            Pattern::ConditionalBegin if lenient => Rule::conditional_begin_lenient,
            Pattern::ConditionalBegin => Rule::conditional_begin,
            Pattern::WhileBegin => Rule::while_begin,
            Pattern::Else if lenient => Rule::else_branch_lenient,
            Pattern::Else => Rule::else_branch,
            Pattern::ConditionalElse if !(lenient || options.language_extensions) => return None,
            Pattern::ConditionalElse if lenient => Rule::conditional_else_lenient,
            Pattern::ConditionalElse => Rule::conditional_else,
            Pattern::ConditionalSkipNext => Rule::conditional_skip_next,
            Pattern::Label => Rule::label_decl,
            Pattern::GoTo => Rule::go_to,
            Pattern::EndSubroutine if options.require_uppercase_label_names => {
                Rule::end_subroutine_upper
            }
            Pattern::EndSubroutine => Rule::end_subroutine,
            Pattern::CallSubroutine => Rule::call_subroutine,
            Pattern::EndProgram if lenient => Rule::end_program_lenient,
            Pattern::EndProgram => Rule::end_program,
        };
        Some(rule)
    }
}

/* ===================== Entry points ===================== */

/// Parse a whole program
///
/// Lines are trimmed; blank lines and lines starting with `~` are skipped.
/// The first line that matches no pattern fails the whole parse.
pub fn parse_program(source: &str, options: &Options) -> FaultResult<Vec<Statement>> {
    let mut statements = Vec::new();
    for (number, raw) in source.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('~') {
            continue;
        }
        match parse_statement(line, options)? {
            Some(statement) => statements.push(statement),
            None => {
                return Err(Fault::Syntax {
                    line: number + 1,
                    text: line.to_string(),
                })
            }
        }
    }
    debug!(statements = statements.len(), "parsed program");
    Ok(statements)
}

/// Parse one trimmed line; `Ok(None)` when no pattern matches
pub fn parse_statement(line: &str, options: &Options) -> FaultResult<Option<Statement>> {
    for pattern in PRIORITY {
        let Some(rule) = pattern.rule(options) else {
            continue;
        };
        if let Ok(mut pairs) = StatementParser::parse(rule, line) {
            let pair = pairs
                .next()
                .ok_or_else(|| Fault::Internal(format!("empty match for {:?}", pattern)))?;
            return build_statement(pair, options).map(Some);
        }
    }
    Ok(None)
}

/// Interpret the text of a bare comparison operand
///
/// `@NAME` is a variable reference, `OP ARG ARG` a nested operation, a
/// canonical decimal integer a literal; anything else stays a raw token.
pub fn parse_bare_operand(text: &str, options: &Options) -> FaultResult<Operand> {
    if let Ok(mut pairs) = StatementParser::parse(Rule::variable, text) {
        if let Some(pair) = pairs.next() {
            let name = first_str(pair)?;
            return Ok(Operand::Variable(VarName::new(name, "compare_value", options)?));
        }
    }
    if let Ok(mut pairs) = StatementParser::parse(Rule::operation_expr, text) {
        if let Some(pair) = pairs.next() {
            let op = build_operation(pair, options)?;
            return Ok(Operand::Operation(Box::new(op)));
        }
    }
    match canonical_int(text) {
        Some(value) => Ok(Operand::Int(value)),
        None => Ok(Operand::Token(text.to_string())),
    }
}

/* ===================== Builders ===================== */

/// Inner pairs of a statement match, without the trailing EOI
fn captures<'i>(pair: Pair<'i, Rule>) -> Vec<Pair<'i, Rule>> {
    pair.into_inner().filter(|p| p.as_rule() != Rule::EOI).collect()
}

fn first_str<'i>(pair: Pair<'i, Rule>) -> FaultResult<&'i str> {
    let rule = pair.as_rule();
    captures(pair)
        .first()
        .map(|p| p.as_str())
        .ok_or_else(|| Fault::Internal(format!("missing capture in {:?}", rule)))
}

fn capture_at<'a, 'i>(caps: &'a [Pair<'i, Rule>], index: usize) -> FaultResult<&'a Pair<'i, Rule>> {
    caps.get(index)
        .ok_or_else(|| Fault::Internal(format!("missing capture {}", index)))
}

/// Assigned values keep bare text verbatim and decode quoted literals
fn value_text(pair: &Pair<'_, Rule>) -> String {
    pair.as_str().to_string()
}

fn compare_operand(pair: &Pair<'_, Rule>, options: &Options) -> FaultResult<Operand> {
    match pair.as_rule() {
        Rule::quoted => Ok(Operand::Token(unescape(pair.as_str())?)),
        _ => parse_bare_operand(pair.as_str(), options),
    }
}

fn condition(pair: Pair<'_, Rule>, options: &Options) -> FaultResult<Condition> {
    let caps = captures(pair);
    let name = capture_at(&caps, 0)?.as_str();
    let compare = compare_operand(capture_at(&caps, 1)?, options)?;
    Condition::new(name, compare, options)
}

fn build_arg(pair: &Pair<'_, Rule>, what: &str, options: &Options) -> FaultResult<Arg> {
    let inner = pair
        .clone()
        .into_inner()
        .next()
        .ok_or_else(|| Fault::Internal(format!("empty {}", what)))?;
    match inner.as_rule() {
        Rule::num => Ok(Arg::Int(int_literal(inner.as_str())?)),
        _ => Ok(Arg::Variable(VarName::new(inner.as_str(), what, options)?)),
    }
}

/// `operation` or `operation_expr` match into an [`Operation`]
fn build_operation(pair: Pair<'_, Rule>, options: &Options) -> FaultResult<Operation> {
    let caps = captures(pair);
    let keyword = capture_at(&caps, 0)?.as_str();
    let kind = OpKind::from_keyword(keyword)
        .ok_or_else(|| Fault::Internal(format!("unknown operator {}", keyword)))?;
    let lhs = build_arg(capture_at(&caps, 1)?, "lhs", options)?;
    let rhs = build_arg(capture_at(&caps, 2)?, "rhs", options)?;
    let dest = match caps.get(3) {
        Some(dest) => {
            let name = first_str(dest.clone())?;
            Some(VarName::new(name, "variable name", options)?)
        }
        None => None,
    };
    Ok(Operation::new(kind, lhs, rhs, dest))
}

fn build_statement(pair: Pair<'_, Rule>, options: &Options) -> FaultResult<Statement> {
    let statement = match pair.as_rule() {
        Rule::program_start => Statement::ProgramStart,
        Rule::comment | Rule::comment_lenient => {
            let caps = captures(pair);
            Statement::comment(caps.first().map(|p| p.as_str()).unwrap_or(""))?
        }
        Rule::set_variable | Rule::set_variable_lenient => {
            let caps = captures(pair);
            let name = capture_at(&caps, 0)?.as_str();
            let value = value_text(capture_at(&caps, 1)?);
            Statement::set_variable(name, &value, options)?
        }
        Rule::variable => Statement::variable(first_str(pair)?, options)?,
        Rule::print_variable | Rule::print_variable_lenient => {
            Statement::print_variable(first_str(pair)?, options)?
        }
        Rule::print_string | Rule::print_string_lenient => {
            Statement::print_string(first_str(pair)?)
        }
        Rule::print_ascii_char => Statement::print_ascii_char(int_literal(first_str(pair)?)?)?,
        Rule::cause_error => Statement::CauseError,
        Rule::operation => Statement::Operation(build_operation(pair, options)?),
        Rule::get_input => Statement::get_input(first_str(pair)?, options)?,
        Rule::no_newline_next | Rule::no_newline_next_lenient => Statement::NoNewlineNext,
        Rule::negate_conditional | Rule::negate_conditional_lenient => {
            Statement::NegateConditional
        }
        Rule::clear_variable | Rule::clear_variable_lenient => {
            Statement::clear_variable(first_str(pair)?, options)?
        }
        Rule::conditional_end => Statement::ConditionalEnd,
        Rule::while_end => Statement::WhileEnd,
        Rule::conditional_begin | Rule::conditional_begin_lenient => {
            Statement::ConditionalBegin(condition(pair, options)?)
        }
        Rule::while_begin => Statement::WhileBegin(condition(pair, options)?),
        Rule::else_branch | Rule::else_branch_lenient => Statement::Else,
        Rule::conditional_else | Rule::conditional_else_lenient => {
            Statement::ConditionalElse(condition(pair, options)?)
        }
        Rule::conditional_skip_next => Statement::ConditionalSkipNext(condition(pair, options)?),
        Rule::label_decl => Statement::label(first_str(pair)?, options)?,
        Rule::go_to => Statement::go_to(first_str(pair)?, options)?,
        Rule::end_subroutine | Rule::end_subroutine_upper => Statement::EndSubroutine,
        Rule::call_subroutine => Statement::call_subroutine(first_str(pair)?, options)?,
        Rule::end_program | Rule::end_program_lenient => Statement::EndProgram,
        other => return Err(Fault::Internal(format!("unexpected rule {:?}", other))),
    };
    Ok(statement)
}
