use tinymips::{
    bytecode,
    emulator::{Emulator, Exit},
    instruction::Register,
    symbolic,
};

use slog::{o, Drain, Logger};
use slog_term::{FullFormat, TermDecorator};

fn assemble_program() -> bytecode::Program {
    let source = include_str!("countdown.s");

    symbolic::Program::parse(source)
        .expect("could not parse countdown.s")
        .assemble()
        .expect("could not assemble countdown.s")
}

#[test]
fn test_countdown_resolves_both_branch_directions() {
    let source = include_str!("countdown.s");

    let program = symbolic::Program::parse(source).expect("could not parse countdown.s");

    assert_eq!(program.symbol_table.get("loop"), Some(8));
    assert_eq!(program.symbol_table.get("end"), Some(20));
}

#[test]
fn test_countdown_needs_a_larger_step_budget() {
    // Five words, but the loop body runs five times.
    let mut emulator = Emulator::new(assemble_program());

    assert!(matches!(
        emulator.run(),
        Exit::StepBudgetExhausted { .. },
    ));
}

#[test]
fn test_countdown_with_logging() {
    let decorator = TermDecorator::new().build();
    let drain = FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    let logger = Logger::root(drain, o!());

    let source = include_str!("countdown.s");

    let program = symbolic::Program::parse(source)
        .expect("could not parse countdown.s")
        .assemble_with_logger(logger.clone())
        .expect("could not assemble countdown.s");

    let mut emulator = Emulator::with_logger(program, logger).with_step_budget(100);

    assert_eq!(emulator.run(), Exit::Halted { executed: 18 });
}

#[test]
fn test_countdown_emulate_program() {
    let mut emulator = Emulator::new(assemble_program()).with_step_budget(100);

    // Two setup instructions, five three-instruction iterations and
    // the final taken branch.
    assert_eq!(emulator.run(), Exit::Halted { executed: 18 });

    assert_eq!(emulator.registers()[Register::T0.index()], 0);
    assert_eq!(emulator.context.pc, 20);
}
