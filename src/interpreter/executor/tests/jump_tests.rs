use super::helpers::*;
use crate::config::{Limits, Options};
use crate::interpreter::errors::Fault;

#[test]
fn test_goto_counting_loop() {
    let output = run(&[
        "HI EVERYONE",
        "@i YOU ARE NOW OFFICIALLY 0",
        "NEXT PERSON TO POST IS MAKING A CHANNEL CALLED #1-top",
        "IF @EVERYONE FINALLY IS 3 THEN",
        "GTG SRRY",
        "STOP POSTING MEMES",
        "@EVERYONE SPEAK",
        "ADD @EVERYONE 1 @i",
        "GO TO #1-top",
    ])
    .ended();

    assert_eq!(output, "0\n1\n2\n");
}

#[test]
fn test_goto_forward_skips_statements() {
    let output = run(&[
        "HI EVERYONE",
        "GO TO #2-END",
        "UHH SO skipped",
        "NEXT PERSON TO POST IS MAKING A CHANNEL CALLED #2-end",
        "UHH SO landed",
        "GTG SRRY",
    ])
    .ended();

    assert_eq!(output, "landed\n");
}

#[test]
fn test_subroutine_returns_after_call_site() {
    let result = run(&[
        "HI EVERYONE",
        "GO TO #1-greet BEFORE I DELETE THE CHANNEL",
        "UHH SO back",
        "GO TO #1-greet BEFORE I DELETE THE CHANNEL",
        "GTG SRRY",
        "NEXT PERSON TO POST IS MAKING A CHANNEL CALLED #1-greet",
        "UHH SO hello",
        "GO BACK TO #general",
    ]);

    assert_eq!(result.vm.return_depth(), 0);
    assert_eq!(result.ended(), "hello\nback\nhello\n");
}

#[test]
fn test_nested_subroutines() {
    let output = run(&[
        "HI EVERYONE",
        "GO TO #1-outer BEFORE I DELETE THE CHANNEL",
        "UHH SO done",
        "GTG SRRY",
        "NEXT PERSON TO POST IS MAKING A CHANNEL CALLED #1-outer",
        "UHH SO outer",
        "GO TO #2-inner BEFORE I DELETE THE CHANNEL",
        "UHH SO outer again",
        "GO BACK TO #GENERAL",
        "NEXT PERSON TO POST IS MAKING A CHANNEL CALLED #2-inner",
        "UHH SO inner",
        "GO BACK TO #general",
    ])
    .ended();

    assert_eq!(output, "outer\ninner\nouter again\ndone\n");
}

#[test]
fn test_return_without_call_faults() {
    let fault = run(&["HI EVERYONE", "GO BACK TO #general", "GTG SRRY"]).fault();

    assert!(matches!(fault, Fault::EmptyReturnStack));
}

#[test]
fn test_unknown_label_faults_before_running() {
    let result = run_program(
        &["HI EVERYONE", "UHH SO hi", "GO TO #9-nowhere", "GTG SRRY"],
        "",
        Options::default(),
        Limits::default(),
    );

    match result {
        Err(Fault::UnknownLabel { index, label }) => {
            assert_eq!(index, 2);
            assert_eq!(label, "9-nowhere");
        }
        Err(other) => panic!("Expected UnknownLabel, got {:?}", other),
        Ok(finished) => panic!("Expected a load fault, program printed {:?}", finished.output),
    }
}

#[test]
fn test_goto_loop_hits_visit_ceiling() {
    let fault = run_with_limit(
        &[
            "HI EVERYONE",
            "NEXT PERSON TO POST IS MAKING A CHANNEL CALLED #1",
            "GO TO #1",
        ],
        3,
    )
    .fault();

    assert!(matches!(fault, Fault::VisitLimit { index: 2, limit: 3 }));
}

#[test]
fn test_runaway_recursion_hits_call_depth() {
    let result = run_with_limit(
        &[
            "HI EVERYONE",
            "NEXT PERSON TO POST IS MAKING A CHANNEL CALLED #1-r",
            "GO TO #1-r BEFORE I DELETE THE CHANNEL",
        ],
        4,
    );

    assert_eq!(result.vm.return_depth(), 3);
    assert!(matches!(result.fault(), Fault::CallDepth { limit: 4 }));
}

#[test]
fn test_uppercase_labels() {
    let options = Options {
        require_uppercase_label_names: true,
        ..Options::default()
    };
    let output = run_with_options(
        &[
            "HI EVERYONE",
            "GO TO #1-SUB BEFORE I DELETE THE CHANNEL",
            "GTG SRRY",
            "NEXT PERSON TO POST IS MAKING A CHANNEL CALLED #1-SUB",
            "UHH SO sub",
            "GO BACK TO #GENERAL",
        ],
        options,
    )
    .ended();

    assert_eq!(output, "sub\n");
}
