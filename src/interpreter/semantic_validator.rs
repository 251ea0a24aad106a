//! Semantic validation for parsed programs
//!
//! Checks that depend on the options and look at the whole statement list.
//! Runs after parsing and before control-flow resolution.

use crate::config::Options;
use crate::interpreter::errors::{Fault, FaultResult};
use crate::interpreter::types::{is_uppercase_name, Statement};

/* ===================== Public API ===================== */

/// Validate a parsed program against the option-gated rules
///
/// Current rules:
/// - With uppercase variable names required, every variable reference is uppercase
/// - With uppercase label names required, every label and jump target is uppercase
/// - Without language extensions, no else-if appears anywhere
pub fn validate_program(statements: &[Statement], options: &Options) -> FaultResult<()> {
    if options.require_uppercase_variable_names {
        validate_uppercase_variables(statements)?;
    }
    if options.require_uppercase_label_names {
        validate_uppercase_labels(statements)?;
    }
    if !options.language_extensions {
        validate_no_extensions(statements)?;
    }
    Ok(())
}

/* ===================== Rules ===================== */

fn validate_uppercase_variables(statements: &[Statement]) -> FaultResult<()> {
    for name in statements.iter().flat_map(Statement::variable_names) {
        if !is_uppercase_name(name.as_str()) {
            return Err(Fault::NotUppercase { name: name.to_string() });
        }
    }
    Ok(())
}

fn validate_uppercase_labels(statements: &[Statement]) -> FaultResult<()> {
    for stmt in statements {
        let label = match stmt {
            Statement::Label { name } => name,
            other => match other.jump_target() {
                Some(label) => label,
                None => continue,
            },
        };
        if !is_uppercase_name(label.as_str()) {
            return Err(Fault::NotUppercase { name: label.to_string() });
        }
    }
    Ok(())
}

fn validate_no_extensions(statements: &[Statement]) -> FaultResult<()> {
    match statements
        .iter()
        .position(|stmt| matches!(stmt, Statement::ConditionalElse(_)))
    {
        Some(index) => Err(Fault::ExtensionDisabled { index }),
        None => Ok(()),
    }
}
