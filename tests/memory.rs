use tinymips::{
    bytecode,
    emulator::{Emulator, Exit},
    instruction::Register,
    symbolic,
};

fn assemble_program() -> bytecode::Program {
    let source = include_str!("memory.s");

    symbolic::Program::parse(source)
        .expect("could not parse memory.s")
        .assemble()
        .expect("could not assemble memory.s")
}

#[test]
fn test_memory_assemble_program() {
    let program = assemble_program();

    assert_eq!(
        program.words,
        vec![0x201D_0100, 0x2008_002A, 0xAFA8_FFFC, 0x8FA9_FFFC],
    );
}

#[test]
fn test_memory_emulate_program() {
    let mut emulator = Emulator::new(assemble_program());

    assert_eq!(emulator.run(), Exit::Halted { executed: 4 });

    assert_eq!(emulator.registers()[Register::T1.index()], 42);
    assert_eq!(emulator.memory.load_word(252), 42);
}
