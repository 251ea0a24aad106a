//! Control-flow resolution
//!
//! One pass over the parsed statements before anything runs. Builds the label
//! table and pairs every block header with its terminator so the VM can jump
//! in O(1). Statements are never rewritten; a terminator written as the
//! "wrong" closer is recorded in `closers` with the kind of block it closes.

use std::collections::HashMap;
use tracing::debug;

use crate::config::Options;
use crate::interpreter::errors::{Fault, FaultResult};
use crate::interpreter::semantic_validator::validate_program;
use crate::interpreter::types::{LabelName, Statement};

/// Kind of an open block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Conditional,
    Loop,
}

/// Resolver output consumed by the VM
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlFlow {
    /// Label name to the index of its declaration
    pub labels: HashMap<LabelName, usize>,
    /// Header (or else link) to the next link or terminator of its block;
    /// loop terminators also map back to their header
    pub block_ends: HashMap<usize, usize>,
    /// Terminator index to the kind of block it closes
    pub closers: HashMap<usize, BlockKind>,
}

impl ControlFlow {
    pub fn label(&self, name: &LabelName) -> Option<usize> {
        self.labels.get(name).copied()
    }

    pub fn block_end(&self, index: usize) -> Option<usize> {
        self.block_ends.get(&index).copied()
    }

    pub fn closer_kind(&self, index: usize) -> Option<BlockKind> {
        self.closers.get(&index).copied()
    }
}

/// A validated, resolved program ready to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub statements: Vec<Statement>,
    pub flow: ControlFlow,
}

impl Program {
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Statement> {
        self.statements.get(index)
    }
}

/* ===================== Resolution ===================== */

/// Validate the statements and resolve labels and blocks
pub fn resolve(statements: Vec<Statement>, options: &Options) -> FaultResult<Program> {
    validate_program(&statements, options)?;

    let labels = build_label_table(&statements)?;
    debug!(labels = ?labels, "built label table");

    let mut flow = ControlFlow {
        labels,
        ..ControlFlow::default()
    };
    let mut open: Vec<(BlockKind, usize)> = Vec::new();

    for (i, stmt) in statements.iter().enumerate() {
        match stmt {
            Statement::GoTo { label } | Statement::CallSubroutine { label } => {
                if !flow.labels.contains_key(label) {
                    return Err(Fault::UnknownLabel {
                        index: i,
                        label: label.to_string(),
                    });
                }
            }
            Statement::Else | Statement::ConditionalElse(_) => match open.last_mut() {
                Some((BlockKind::Conditional, link)) => {
                    flow.block_ends.insert(*link, i);
                    *link = i;
                }
                _ => return Err(Fault::UnmatchedBlock { index: i }),
            },
            Statement::ConditionalEnd | Statement::WhileEnd => {
                let (kind, start) = open.pop().ok_or(Fault::UnmatchedBlock { index: i })?;
                flow.block_ends.insert(start, i);
                if kind == BlockKind::Loop {
                    flow.block_ends.insert(i, start);
                }
                flow.closers.insert(i, kind);
            }
            Statement::ConditionalBegin(_) => open.push((BlockKind::Conditional, i)),
            Statement::WhileBegin(_) => open.push((BlockKind::Loop, i)),
            _ => {}
        }
    }

    if let Some((_, index)) = open.first() {
        return Err(Fault::UnclosedBlock { index: *index });
    }

    debug!(
        statements = statements.len(),
        blocks = flow.closers.len(),
        "resolved control flow"
    );
    Ok(Program { statements, flow })
}

fn build_label_table(statements: &[Statement]) -> FaultResult<HashMap<LabelName, usize>> {
    let mut labels = HashMap::new();
    for (i, stmt) in statements.iter().enumerate() {
        if let Statement::Label { name } = stmt {
            if labels.insert(name.clone(), i).is_some() {
                return Err(Fault::DuplicateLabel(name.to_string()));
            }
        }
    }
    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::parser::parse_program;
    use maplit::hashmap;

    fn resolve_source(source: &str, options: &Options) -> FaultResult<Program> {
        resolve(parse_program(source, options)?, options)
    }

    fn label(name: &str) -> LabelName {
        LabelName::new(name, &Options::default()).unwrap()
    }

    #[test]
    fn test_resolve_labels() {
        let program = resolve_source(
            "HI EVERYONE\n\
             GO TO #2\n\
             NEXT PERSON TO POST IS MAKING A CHANNEL CALLED #1\n\
             NEXT PERSON TO POST IS MAKING A CHANNEL CALLED #2\n\
             GTG SRRY",
            &Options::default(),
        )
        .unwrap();
        assert_eq!(program.flow.labels, hashmap! { label("1") => 2, label("2") => 3 });
    }

    #[test]
    fn test_resolve_duplicate_label() {
        let err = resolve_source(
            "NEXT PERSON TO POST IS MAKING A CHANNEL CALLED #1-a\n\
             NEXT PERSON TO POST IS MAKING A CHANNEL CALLED #1-A",
            &Options::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Fault::DuplicateLabel(name) if name == "1-a"));
    }

    #[test]
    fn test_resolve_unknown_label() {
        let err = resolve_source("HI EVERYONE\nGO TO #404 BEFORE I DELETE THE CHANNEL", &Options::default())
            .unwrap_err();
        assert!(matches!(err, Fault::UnknownLabel { index: 1, .. }));
    }

    #[test]
    fn test_resolve_loop_pairs_both_ways() {
        let program = resolve_source(
            "WHILE @EVERYONE FINALLY IS 1\n\
             UHH SO body\n\
             NOT PAST HERE",
            &Options::default(),
        )
        .unwrap();
        assert_eq!(program.flow.block_ends, hashmap! { 0 => 2, 2 => 0 });
        assert_eq!(program.flow.closers, hashmap! { 2 => BlockKind::Loop });
    }

    #[test]
    fn test_resolve_generic_closers_take_block_kind() {
        let program = resolve_source(
            "WHILE @EVERYONE FINALLY IS 1\n\
             IF @EVERYONE FINALLY IS 2 THEN\n\
             NOT PAST HERE\n\
             STOP POSTING MEMES",
            &Options::default(),
        )
        .unwrap();
        assert_eq!(program.flow.block_ends, hashmap! { 1 => 2, 0 => 3, 3 => 0 });
        assert_eq!(
            program.flow.closers,
            hashmap! { 2 => BlockKind::Conditional, 3 => BlockKind::Loop }
        );
        // Statements are left as written
        assert_eq!(program.statements[2], Statement::WhileEnd);
    }

    #[test]
    fn test_resolve_else_chain_links() {
        let program = resolve_source(
            "IF @EVERYONE FINALLY IS 1 THEN\n\
             UHH SO one\n\
             SO IF THAT WASNT TRUE AND @EVERYONE FINALLY IS 2 THEN\n\
             UHH SO two\n\
             SO IF THAT WASNT TRUE\n\
             UHH SO other\n\
             STOP POSTING MEMES",
            &Options::extended(),
        )
        .unwrap();
        assert_eq!(program.flow.block_ends, hashmap! { 0 => 2, 2 => 4, 4 => 6 });
        assert_eq!(program.flow.closers, hashmap! { 6 => BlockKind::Conditional });
    }

    #[test]
    fn test_resolve_else_inside_loop_is_unmatched() {
        let err = resolve_source(
            "WHILE @EVERYONE FINALLY IS 1\nSO IF THAT WASNT TRUE\nNOT PAST HERE",
            &Options::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Fault::UnmatchedBlock { index: 1 }));
    }

    #[test]
    fn test_resolve_unmatched_and_unclosed() {
        let options = Options::default();
        assert!(matches!(
            resolve_source("STOP POSTING MEMES", &options),
            Err(Fault::UnmatchedBlock { index: 0 })
        ));
        assert!(matches!(
            resolve_source("IF @EVERYONE FINALLY IS 1 THEN\nWHILE @EVERYONE FINALLY IS 1", &options),
            Err(Fault::UnclosedBlock { index: 0 })
        ));
    }

    #[test]
    fn test_resolve_runs_validation_first() {
        let options = Options {
            require_uppercase_variable_names: true,
            ..Options::default()
        };
        let err = resolve_source("@123 YOU ARE NOW OFFICIALLY 1\nSTOP POSTING MEMES", &options).unwrap_err();
        assert!(matches!(err, Fault::NotUppercase { .. }));
    }

    #[test]
    fn test_resolve_nested_loops_are_symmetric() {
        let program = resolve_source(
            "WHILE @EVERYONE FINALLY IS 1\n\
             WHILE @EVERYONE FINALLY IS 2\n\
             IF @EVERYONE FINALLY IS 3 THEN\n\
             STOP POSTING MEMES\n\
             NOT PAST HERE\n\
             NOT PAST HERE",
            &Options::default(),
        )
        .unwrap();
        assert_eq!(
            program.flow.block_ends,
            hashmap! { 0 => 5, 5 => 0, 1 => 4, 4 => 1, 2 => 3 }
        );
        for (&close, &kind) in &program.flow.closers {
            let Some(open) = program.flow.block_end(close) else {
                assert_eq!(kind, BlockKind::Conditional);
                continue;
            };
            assert_eq!(kind, BlockKind::Loop);
            assert_eq!(program.flow.block_end(open), Some(close));
        }
    }
}
