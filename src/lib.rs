//! A crate for working with a small MIPS-style instruction architecture
//! used in teaching.
//!
//! Currently this crate provides the functionality to:
//! - Read and write listing files containing bytecode as binary text,
//!   one 32-digit line per machine word.
//! - Assemble symbolic assembly into bytecode.
//! - Disassemble bytecode back into mnemonics.
//! - Execute bytecode on an emulator with 32 registers and a
//!   byte-addressed data memory.
//!
//! The instruction set is the classic teaching subset: `add`, `sub`,
//! `and`, `or`, `nor`, `slt`, `addi`, `lw`, `sw`, `beq` and `j`.
//!
//! # Example
//! ```
//! use tinymips::{
//!     emulator::Emulator,
//!     instruction::Register,
//!     symbolic::Program,
//! };
//!
//! // Adds 5 and 10 into $t2.
//! let source = "
//!     addi $t0, $zero, 5
//!     addi $t1, $zero, 10
//!     add  $t2, $t0, $t1
//! ";
//!
//! // Parse the assembly into symbolic IR.
//! let symbolic = Program::parse(source).unwrap();
//!
//! // Encode the symbolic IR into machine words.
//! let bytecode = symbolic.assemble().unwrap();
//!
//! // Load the bytecode into an emulator and execute it.
//! let mut emulator = Emulator::new(bytecode);
//! emulator.run();
//!
//! assert_eq!(emulator.registers()[Register::T2.index()], 15);
//! ```
//!
//! # Executables
//!
//! The `tools` feature builds two executables: `tinymips-asm`, which
//! assembles a source file into a listing, and `tinymips-run`, which
//! executes either a source file or a listing and prints the final
//! machine state.

pub mod assembler;
pub mod bytecode;
pub mod codec;
pub mod emulator;
pub mod error;
pub mod event;
pub mod instruction;
pub mod symbol_table;
pub mod symbolic;
