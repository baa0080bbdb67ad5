//! [Emulator] for executing [bytecode programs](crate::bytecode::program::Program).

use slog::{o, trace, warn, Discard, Logger};

use crate::bytecode;
use crate::event::{Event, EventDispatcher, EventListener};
use crate::instruction::{AluOp, DecodeError, Instruction, Register};

/// Default size of the data memory in bytes.
pub const MEMORY_SIZE: usize = 4096;

/// Byte-addressed data memory with big-endian words.
///
/// Accesses outside the capacity are silent: loads produce zero and
/// stores change nothing. The running program cannot tell the
/// difference, but stores report whether they landed so that the
/// emulator can skip the change event.
#[derive(Debug, Clone)]
pub struct Memory {
    bytes: Vec<u8>,
}

impl Memory {
    pub fn new(capacity: usize) -> Memory {
        Memory {
            bytes: vec![0; capacity],
        }
    }

    /// Capacity in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Reads the big-endian word at `address`, or zero if any of its
    /// four bytes falls outside the capacity.
    pub fn load_word(&self, address: u32) -> u32 {
        let start = address as usize;

        if start.saturating_add(4) > self.bytes.len() {
            return 0;
        }

        (self.bytes[start] as u32) << 24
            | (self.bytes[start + 1] as u32) << 16
            | (self.bytes[start + 2] as u32) << 8
            | (self.bytes[start + 3] as u32)
    }

    /// Writes the big-endian word at `address`. Returns false without
    /// touching anything if any of its four bytes falls outside the
    /// capacity.
    pub fn store_word(&mut self, address: u32, value: u32) -> bool {
        let start = address as usize;

        if start.saturating_add(4) > self.bytes.len() {
            return false;
        }

        self.bytes[start] = (value >> 24) as u8;
        self.bytes[start + 1] = (value >> 16) as u8;
        self.bytes[start + 2] = (value >> 8) as u8;
        self.bytes[start + 3] = value as u8;

        true
    }

    /// Iterates the word-aligned addresses in `range` whose stored word
    /// is non-zero, for memory dumps.
    pub fn nonzero_words(
        &self,
        range: std::ops::Range<u32>,
    ) -> impl Iterator<Item = (u32, u32)> + '_ {
        range
            .step_by(4)
            .map(move |address| (address, self.load_word(address)))
            .filter(|(_, word)| *word != 0)
    }
}

impl Default for Memory {
    fn default() -> Memory {
        Memory::new(MEMORY_SIZE)
    }
}

/// Contains the execution environment of the processor.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// The Program Counter stores the byte address of the next
    /// instruction to be executed.
    pub pc: u32,

    /// Array containing values for all 32 registers.
    ///
    /// Index 0 is `$zero`, which starts at zero by convention but is an
    /// ordinary register: an instruction naming it as a destination
    /// overwrites it.
    pub r: [u32; 32],
}

impl Context {
    fn new() -> Context {
        Context {
            pc: 0,
            r: [0; 32],
        }
    }
}

/// How a [run](Emulator::run) ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Exit {
    /// The program counter ran off the end of the loaded program.
    Halted {
        /// Number of instructions executed.
        executed: usize,
    },

    /// The step budget ran out before the program halted.
    StepBudgetExhausted {
        /// Number of instructions executed.
        executed: usize,
    },
}

/// The emulator contains all necessary state for executing a program:
/// the registers, the data memory and the loaded instruction words.
pub struct Emulator {
    /// The execution context, which includes the registers and the
    /// program counter.
    pub context: Context,

    /// The data memory. Separate from the instruction words, which are
    /// not addressable by loads and stores.
    pub memory: Memory,

    /// True if the execution has been halted.
    pub halted: bool,

    program: Vec<u32>,

    /// Upper bound on executed instructions per [run](Emulator::run).
    step_budget: usize,

    executed: usize,

    dispatcher: EventDispatcher,

    logger: Logger,
}

impl Emulator {
    /// Creates an emulator with the program loaded and all state
    /// zeroed. The step budget defaults to the number of loaded words.
    pub fn new(program: bytecode::Program) -> Emulator {
        Emulator::with_logger(program, None)
    }

    /// Like [Emulator::new], but logs each executed instruction to
    /// `logger`.
    pub fn with_logger<L>(program: bytecode::Program, logger: L) -> Emulator
    where
        L: Into<Option<Logger>>,
    {
        let logger = logger
            .into()
            .unwrap_or_else(|| Logger::root(Discard, o!()))
            .new(o!("stage" => "execution"));

        let words = program.words;

        Emulator {
            context: Context::new(),
            memory: Memory::default(),
            halted: false,
            step_budget: words.len(),
            executed: 0,
            program: words,
            dispatcher: EventDispatcher::new(),
            logger,
        }
    }

    pub fn with_step_budget(mut self, step_budget: usize) -> Emulator {
        self.step_budget = step_budget;
        self
    }

    pub fn with_memory_size(mut self, bytes: usize) -> Emulator {
        self.memory = Memory::new(bytes);
        self
    }

    /// Registers an event listener. See the [event](crate::event)
    /// module.
    pub fn add_listener<L: EventListener + 'static>(&mut self, listener: L) {
        self.dispatcher.add_listener(listener);
    }

    pub fn registers(&self) -> &[u32; 32] {
        &self.context.r
    }

    /// Number of instructions executed so far.
    pub fn executed(&self) -> usize {
        self.executed
    }

    fn current_word(&self) -> Option<u32> {
        self.program.get((self.context.pc / 4) as usize).copied()
    }

    /// Decodes the instruction the program counter points at, without
    /// executing it. `None` once the counter is outside the program.
    pub fn current_instruction(&self) -> Option<Result<Instruction, DecodeError>> {
        self.current_word().map(Instruction::decode)
    }

    fn halt(&mut self) {
        if self.halted {
            return;
        }

        self.halted = true;
        self.dispatcher.dispatch(Event::Halted);

        trace!(self.logger, "halted";
               "pc" => self.context.pc,
               "executed" => self.executed);
    }

    /// Fetches the next instruction, executes it and advances the
    /// program counter. Halts instead if the counter is outside the
    /// program.
    pub fn step(&mut self) {
        if self.halted {
            return;
        }

        let word = match self.current_word() {
            Some(word) => word,
            None => return self.halt(),
        };

        self.executed += 1;

        match Instruction::decode(word) {
            Ok(instruction) => {
                trace!(self.logger, "execute";
                       "pc" => self.context.pc,
                       "instruction" => %instruction);

                self.execute(&instruction);
            }
            Err(error) => {
                // Undecodable words are skipped, not fatal.
                warn!(self.logger, "skipping undecodable word";
                      "pc" => self.context.pc,
                      "error" => %error);

                self.context.pc = self.context.pc.wrapping_add(4);
            }
        }
    }

    /// Executes the program until it halts or the step budget runs out.
    pub fn run(&mut self) -> Exit {
        loop {
            if self.halted || self.current_word().is_none() {
                self.halt();
                return Exit::Halted {
                    executed: self.executed,
                };
            }

            if self.executed >= self.step_budget {
                warn!(self.logger, "step budget exhausted";
                      "pc" => self.context.pc,
                      "executed" => self.executed);

                return Exit::StepBudgetExhausted {
                    executed: self.executed,
                };
            }

            self.step();
        }
    }

    fn execute(&mut self, instruction: &Instruction) {
        let pc = self.context.pc;
        let mut next_pc = pc.wrapping_add(4);

        match *instruction {
            Instruction::Alu { op, rs, rt, rd } => {
                let a = self.register(rs);
                let b = self.register(rt);

                let value = match op {
                    AluOp::Add => a.wrapping_add(b),
                    AluOp::Subtract => a.wrapping_sub(b),
                    AluOp::And => a & b,
                    AluOp::Or => a | b,
                    AluOp::Nor => !(a | b),
                    AluOp::SetLessThan => ((a as i32) < (b as i32)) as u32,
                };

                self.set_register(rd, value);
            }
            Instruction::AddImmediate { rt, rs, immediate } => {
                let value = self.register(rs).wrapping_add(immediate as i32 as u32);
                self.set_register(rt, value);
            }
            Instruction::LoadWord { rt, base, offset } => {
                let address = self.register(base).wrapping_add(offset as i32 as u32);
                let value = self.memory.load_word(address);
                self.set_register(rt, value);
            }
            Instruction::StoreWord { rt, base, offset } => {
                let address = self.register(base).wrapping_add(offset as i32 as u32);
                let value = self.register(rt);

                if self.memory.store_word(address, value) {
                    self.dispatcher.dispatch(Event::MemoryChange { address, value });
                }
            }
            Instruction::BranchEqual { rs, rt, offset } => {
                if self.register(rs) == self.register(rt) {
                    let displacement = ((offset as i32) << 2) as u32;
                    next_pc = pc.wrapping_add(4).wrapping_add(displacement);
                }
            }
            Instruction::Jump { address } => {
                // The upper four bits come from the current program
                // counter, not the counter after the jump.
                next_pc = (pc & 0xF000_0000) | (address << 2);
            }
        }

        self.context.pc = next_pc;
    }

    fn register(&self, register: Register) -> u32 {
        self.context.r[register.index()]
    }

    fn set_register(&mut self, register: Register, value: u32) {
        self.context.r[register.index()] = value;
        self.dispatcher.dispatch(Event::RegisterChange { register, value });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic;

    use std::cell::RefCell;
    use std::rc::Rc;

    fn emulator(source: &str) -> Emulator {
        let program = symbolic::Program::parse(source)
            .expect("could not parse program")
            .assemble()
            .expect("could not assemble program");

        Emulator::new(program)
    }

    #[test]
    fn add_combines_two_immediates() {
        let mut emulator = emulator(
            "addi $t0, $zero, 5\n\
             addi $t1, $zero, 10\n\
             add $t2, $t0, $t1\n",
        );

        assert_eq!(
            emulator.run(),
            Exit::Halted { executed: 3 },
        );
        assert_eq!(emulator.registers()[Register::T2.index()], 15);
    }

    #[test]
    fn alu_operations_match_their_definitions() {
        let mut emulator = emulator(
            "addi $t0, $zero, 12\n\
             addi $t1, $zero, 10\n\
             sub $t2, $t0, $t1\n\
             and $t3, $t0, $t1\n\
             or $t4, $t0, $t1\n\
             nor $t5, $t0, $t1\n\
             slt $t6, $t1, $t0\n\
             slt $t7, $t0, $t1\n",
        );

        emulator.run();

        let r = emulator.registers();
        assert_eq!(r[Register::T2.index()], 2);
        assert_eq!(r[Register::T3.index()], 12 & 10);
        assert_eq!(r[Register::T4.index()], 12 | 10);
        assert_eq!(r[Register::T5.index()], !(12u32 | 10));
        assert_eq!(r[Register::T6.index()], 1);
        assert_eq!(r[Register::T7.index()], 0);
    }

    #[test]
    fn set_less_than_compares_as_signed() {
        let mut emulator = emulator(
            "addi $t0, $zero, -1\n\
             addi $t1, $zero, 1\n\
             slt $t2, $t0, $t1\n",
        );

        emulator.run();

        assert_eq!(emulator.registers()[Register::T2.index()], 1);
    }

    #[test]
    fn taken_branch_redirects_the_program_counter() {
        let mut emulator = emulator(
            "beq $zero, $zero, skip\n\
             addi $t0, $zero, 1\n\
             skip: addi $t1, $zero, 2\n",
        );

        emulator.step();
        assert_eq!(emulator.context.pc, 8);

        emulator.run();
        assert_eq!(emulator.registers()[Register::T0.index()], 0);
        assert_eq!(emulator.registers()[Register::T1.index()], 2);
    }

    #[test]
    fn untaken_branch_falls_through() {
        let mut emulator = emulator(
            "addi $t0, $zero, 1\n\
             beq $t0, $zero, skip\n\
             addi $t1, $zero, 2\n\
             skip:\n",
        );

        emulator.run();

        assert_eq!(emulator.registers()[Register::T1.index()], 2);
    }

    #[test]
    fn store_and_load_round_trip_through_memory() {
        let mut emulator = emulator(
            "addi $t0, $zero, 42\n\
             addi $sp, $zero, 100\n\
             sw $t0, 8($sp)\n\
             lw $t1, 8($sp)\n",
        );

        emulator.run();

        assert_eq!(emulator.registers()[Register::T1.index()], 42);
        assert_eq!(emulator.memory.load_word(108), 42);
    }

    #[test]
    fn words_are_stored_big_endian() {
        let mut memory = Memory::new(8);

        assert!(memory.store_word(0, 0x0102_0304));
        assert_eq!(memory.load_word(0), 0x0102_0304);
        assert_eq!(memory.load_word(1), 0x0203_0400);
    }

    #[test]
    fn nonzero_words_filters_a_dump_range() {
        let mut memory = Memory::new(32);

        memory.store_word(4, 7);
        memory.store_word(16, 9);
        memory.store_word(24, 1);

        assert_eq!(
            memory.nonzero_words(0..24).collect::<Vec<_>>(),
            vec![(4, 7), (16, 9)],
        );
    }

    #[test]
    fn out_of_bounds_accesses_are_silent() {
        let mut emulator = emulator(
            "addi $t0, $zero, 42\n\
             addi $t1, $zero, 1\n\
             sw $t0, 4($t1)\n\
             lw $t2, 4($t1)\n",
        )
        .with_memory_size(4);

        // The word at byte 5 straddles the end of a 4-byte memory.
        let exit = emulator.run();

        assert_eq!(exit, Exit::Halted { executed: 4 });
        assert_eq!(emulator.registers()[Register::T2.index()], 0);
        assert_eq!(emulator.memory.load_word(0), 0);
    }

    #[test]
    fn zero_register_is_not_pinned() {
        let mut emulator = emulator("addi $zero, $zero, 5\n");

        emulator.run();

        assert_eq!(emulator.registers()[Register::Zero.index()], 5);
    }

    #[test]
    fn jump_keeps_the_upper_bits_of_the_current_counter() {
        let mut emulator = emulator("start: j start\n");

        emulator.context.pc = 0x3000_0004;
        emulator.execute(&Instruction::Jump { address: 1 });

        assert_eq!(emulator.context.pc, 0x3000_0004);
    }

    #[test]
    fn step_budget_stops_an_endless_loop() {
        let mut emulator = emulator(
            "loop: addi $t0, $t0, 1\n\
             beq $t0, $t1, loop\n\
             j loop\n",
        )
        .with_step_budget(30);

        assert_eq!(
            emulator.run(),
            Exit::StepBudgetExhausted { executed: 30 },
        );
        assert!(!emulator.halted);
    }

    #[test]
    fn default_step_budget_is_the_program_length() {
        let mut emulator = emulator(
            "loop: j loop\n",
        );

        assert_eq!(
            emulator.run(),
            Exit::StepBudgetExhausted { executed: 1 },
        );
    }

    #[test]
    fn undecodable_words_are_skipped() {
        let mut emulator = Emulator::new(bytecode::Program {
            // An unassigned opcode, then addi $t0, $zero, 5.
            words: vec![0xFC00_0000, 0x2008_0005],
        });

        assert_eq!(emulator.run(), Exit::Halted { executed: 2 });
        assert_eq!(emulator.registers()[Register::T0.index()], 5);
    }

    #[test]
    fn empty_program_halts_immediately() {
        let mut emulator = Emulator::new(bytecode::Program::default());

        assert_eq!(emulator.run(), Exit::Halted { executed: 0 });
        assert!(emulator.halted);
    }

    #[test]
    fn listeners_observe_register_and_memory_changes() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let seen = events.clone();

        let mut emulator = emulator(
            "addi $t0, $zero, 7\n\
             sw $t0, 0($zero)\n",
        );

        emulator.add_listener(move |event: &Event| {
            let description = match event {
                Event::RegisterChange { register, value } => {
                    format!("{} = {}", register, value)
                }
                Event::MemoryChange { address, value } => {
                    format!("[{}] = {}", address, value)
                }
                Event::Halted => "halted".to_string(),
            };

            seen.borrow_mut().push(description);
        });

        emulator.run();

        assert_eq!(
            *events.borrow(),
            vec!["$t0 = 7", "[0] = 7", "halted"],
        );
    }
}
