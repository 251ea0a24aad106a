//! Canonical source rendering
//!
//! `to_source` writes the strict spelling of a statement. Parsing the result
//! under the same options gives back an equal statement.

use crate::config::Options;
use crate::interpreter::parser::literals::quote;
use crate::interpreter::parser::parse_bare_operand;
use crate::interpreter::types::{Arg, Condition, Operand, Operation, Statement};

impl Statement {
    pub fn to_source(&self, options: &Options) -> String {
        match self {
            Statement::ProgramStart => "HI EVERYONE".to_string(),
            Statement::Comment { text } => format!("BY THE WAY YALL, {}", text),
            Statement::SetVariable { name, value } => {
                format!("@{} YOU ARE NOW OFFICIALLY {}", name, value)
            }
            Statement::Variable { name } => format!("@{}", name),
            Statement::PrintVariable { name } => format!("@{} SPEAK", name),
            Statement::PrintString { message } => format!("UHH SO {}", message),
            Statement::PrintAsciiChar { code } => {
                format!("SOMEONE FIND ME AN ASCII TABLE AND TELL ME WHAT {} IS", code)
            }
            Statement::CauseError => "OOPS I KILLED CHAT".to_string(),
            Statement::Operation(op) => operation_source(op),
            Statement::GetInput { name } => format!("GO DM @{}", name),
            Statement::NoNewlineNext => "I HATE NEWLINES, WHOEVERS POSTING NEXT".to_string(),
            Statement::NegateConditional => "IGNORE THAT VVVVV".to_string(),
            Statement::ClearVariable { name } => format!("@{} YALL CAN STOP", name),
            Statement::ConditionalEnd => "STOP POSTING MEMES".to_string(),
            Statement::WhileEnd => "NOT PAST HERE".to_string(),
            Statement::WhileBegin(cond) => {
                format!("WHILE {}", condition_source(cond, options))
            }
            Statement::ConditionalBegin(cond) => {
                format!("IF {} THEN", condition_source(cond, options))
            }
            Statement::Else => "SO IF THAT WASNT TRUE".to_string(),
            Statement::ConditionalElse(cond) => {
                format!("SO IF THAT WASNT TRUE AND {} THEN", condition_source(cond, options))
            }
            Statement::ConditionalSkipNext(cond) => format!(
                "JUST MAKE SURE THAT @{} IS {}",
                cond.name,
                operand_source(&cond.compare, options)
            ),
            Statement::Label { name } => {
                format!("NEXT PERSON TO POST IS MAKING A CHANNEL CALLED #{}", name)
            }
            Statement::GoTo { label } => format!("GO TO #{}", label),
            Statement::EndSubroutine if options.require_uppercase_label_names => {
                "GO BACK TO #GENERAL".to_string()
            }
            Statement::EndSubroutine => "GO BACK TO #general".to_string(),
            Statement::CallSubroutine { label } => {
                format!("GO TO #{} BEFORE I DELETE THE CHANNEL", label)
            }
            Statement::EndProgram => "GTG SRRY".to_string(),
        }
    }
}

/// Render a program one statement per line
pub fn render_program(statements: &[Statement], options: &Options) -> String {
    statements
        .iter()
        .map(|stmt| stmt.to_source(options))
        .collect::<Vec<_>>()
        .join("\n")
}

fn arg_source(arg: &Arg) -> String {
    match arg {
        Arg::Int(value) => value.to_string(),
        Arg::Variable(name) => format!("@{}", name),
    }
}

fn operation_source(op: &Operation) -> String {
    let mut out = format!(
        "{} {} {}",
        op.kind.keyword(),
        arg_source(&op.lhs),
        arg_source(&op.rhs)
    );
    if let Some(dest) = &op.dest {
        out.push_str(&format!(" @{}", dest));
    }
    out
}

fn condition_source(cond: &Condition, options: &Options) -> String {
    format!("@{} FINALLY IS {}", cond.name, operand_source(&cond.compare, options))
}

/// Text that survives the trip through a bare operand unchanged
fn is_bare_safe(text: &str) -> bool {
    let (Some(first), Some(last)) = (text.chars().next(), text.chars().last()) else {
        return false;
    };
    first != '"'
        && !first.is_whitespace()
        && !last.is_whitespace()
        && last != ','
        && !text.chars().any(char::is_control)
}

fn operand_source(operand: &Operand, options: &Options) -> String {
    match operand {
        Operand::Int(value) => value.to_string(),
        Operand::Variable(name) => format!("@{}", name),
        Operand::Operation(op) => operation_source(op),
        Operand::Token(token) => {
            let reads_back = is_bare_safe(token)
                && matches!(
                    parse_bare_operand(token, options),
                    Ok(Operand::Token(ref parsed)) if parsed == token
                );
            if reads_back {
                token.clone()
            } else {
                quote(token)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::parser::{parse_program, parse_statement};
    use crate::interpreter::types::{OpKind, VarName};

    fn sample(options: &Options) -> Vec<Statement> {
        let everyone = VarName::everyone();
        let x = VarName::new("x", "variable name", options).unwrap();
        let token = |t: &str| {
            Statement::ConditionalBegin(
                Condition::new("EVERYONE", Operand::Token(t.to_string()), options).unwrap(),
            )
        };
        vec![
            Statement::ProgramStart,
            Statement::comment("hello there").unwrap(),
            Statement::set_variable("x", "12", options).unwrap(),
            Statement::set_variable("x", "two words", options).unwrap(),
            Statement::set_variable("x", "\"quoted\"", options).unwrap(),
            Statement::set_variable("x", r#"" escaped \" quote ""#, options).unwrap(),
            Statement::variable("EVERYONE", options).unwrap(),
            Statement::print_variable("EVERYONE", options).unwrap(),
            Statement::print_string("hi, all"),
            Statement::print_ascii_char(65).unwrap(),
            Statement::CauseError,
            Statement::Operation(Operation::new(
                OpKind::Exp,
                Arg::Variable(everyone.clone()),
                Arg::Int(-2),
                Some(x.clone()),
            )),
            Statement::Operation(Operation::new(OpKind::Mod, Arg::Int(i64::MIN), Arg::Int(3), None)),
            Statement::get_input("x", options).unwrap(),
            Statement::NoNewlineNext,
            Statement::NegateConditional,
            Statement::clear_variable("EVERYONE", options).unwrap(),
            Statement::WhileBegin(
                Condition::new("EVERYONE", Operand::Int(-7), options).unwrap(),
            ),
            Statement::WhileEnd,
            token("plain words"),
            token("12"),
            token("007"),
            token("1.5"),
            token("@x"),
            token("ADD 1 2"),
            token(""),
            token(" spaced "),
            token("ends with,"),
            token("a THEN"),
            Statement::ConditionalBegin(
                Condition::new(
                    "EVERYONE",
                    Operand::Operation(Box::new(Operation::new(
                        OpKind::IntDiv,
                        Arg::Int(9),
                        Arg::Variable(everyone.clone()),
                        None,
                    ))),
                    options,
                )
                .unwrap(),
            ),
            Statement::Else,
            Statement::ConditionalEnd,
            Statement::ConditionalSkipNext(
                Condition::new("EVERYONE", Operand::Variable(everyone), options).unwrap(),
            ),
            Statement::label("1-main", options).unwrap(),
            Statement::go_to("1-main", options).unwrap(),
            Statement::call_subroutine("2", options).unwrap(),
            Statement::EndSubroutine,
            Statement::EndProgram,
        ]
    }

    fn assert_round_trip(options: &Options) {
        for stmt in sample(options) {
            let source = stmt.to_source(options);
            let parsed = parse_statement(&source, options)
                .unwrap_or_else(|e| panic!("{:?} failed to parse: {}", source, e))
                .unwrap_or_else(|| panic!("{:?} matched nothing", source));
            assert_eq!(parsed, stmt, "round trip through {:?}", source);
        }
    }

    #[test]
    fn test_round_trip_default() {
        assert_round_trip(&Options::default());
    }

    #[test]
    fn test_round_trip_lenient() {
        assert_round_trip(&Options::lenient());
    }

    #[test]
    fn test_round_trip_uppercase_labels() {
        assert_round_trip(&Options {
            require_uppercase_label_names: true,
            ..Options::default()
        });
    }

    #[test]
    fn test_else_if_round_trip() {
        let options = Options::extended();
        let stmt = Statement::ConditionalElse(
            Condition::new("EVERYONE", Operand::Token("x".to_string()), &options).unwrap(),
        );
        let source = stmt.to_source(&options);
        assert_eq!(source, "SO IF THAT WASNT TRUE AND @EVERYONE FINALLY IS x THEN");
        assert_eq!(parse_statement(&source, &options).unwrap(), Some(stmt));
    }

    #[test]
    fn test_end_subroutine_spelling_follows_label_case() {
        assert_eq!(
            Statement::EndSubroutine.to_source(&Options::default()),
            "GO BACK TO #general"
        );
        let upper = Options {
            require_uppercase_label_names: true,
            ..Options::default()
        };
        assert_eq!(Statement::EndSubroutine.to_source(&upper), "GO BACK TO #GENERAL");
    }

    #[test]
    fn test_tokens_needing_quotes() {
        let options = Options::default();
        let render = |t: &str| operand_source(&Operand::Token(t.to_string()), &options);
        assert_eq!(render("plain"), "plain");
        assert_eq!(render("12"), "\"12\"");
        assert_eq!(render(""), "\"\"");
        assert_eq!(render("@x"), "\"@x\"");
        assert_eq!(render("line\nbreak"), "\"line\\nbreak\"");
    }

    #[test]
    fn test_render_program_parses_back() {
        let options = Options::default();
        let source = "HI EVERYONE\n@x YOU ARE NOW OFFICIALLY 1\n@EVERYONE SPEAK\nGTG SRRY";
        let program = parse_program(source, &options).unwrap();
        assert_eq!(render_program(&program, &options), source);
    }
}
