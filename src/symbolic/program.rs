//! The in-memory form of a scanned assembly program.

use std::fmt;

use slog::Logger;

use crate::error::AssemblyError;
use crate::instruction::{Mnemonic, Register};
use crate::symbol_table::SymbolTable;

/// A single operand as written in the source.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Register(Register),

    /// A signed numeric literal.
    Immediate(i32),

    /// An `offset(register)` memory operand.
    Memory { offset: i32, base: Register },

    /// A reference to a label, resolved against the symbol table by the
    /// encoder.
    Label(String),
}

impl Operand {
    pub fn register(&self) -> Option<Register> {
        match self {
            Operand::Register(register) => Some(*register),
            _ => None,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Operand::Register(register) => write!(f, "{}", register),
            Operand::Immediate(value) => write!(f, "{}", value),
            Operand::Memory { offset, base } => write!(f, "{}({})", offset, base),
            Operand::Label(label) => write!(f, "{}", label),
        }
    }
}

/// One instruction produced by the front end's scan.
#[derive(Debug, Clone, PartialEq)]
pub struct InstructionEntry {
    pub mnemonic: Mnemonic,
    pub operands: Vec<Operand>,

    /// Byte address this instruction will occupy, i.e. the front end's
    /// program counter when the line was scanned.
    pub address: u32,

    /// One-based source line number, carried for error reporting.
    pub line: usize,
}

/// A scanned assembly program: the ordered instruction entries plus the
/// symbol table collected in the same single pass.
///
/// Forward references are fine: encoding happens in a logically separate
/// second pass over this structure, by which time every label has been
/// recorded.
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub instructions: Vec<InstructionEntry>,
    pub symbol_table: SymbolTable,
}

impl Program {
    /// Scans assembly source into a [Program].
    ///
    /// `#` starts a comment, `label:` records the current program counter
    /// in the symbol table, and blank lines are skipped. Only lines that
    /// yield a mnemonic advance the program counter.
    pub fn parse(source: &str) -> Result<Program, AssemblyError> {
        super::parser::parse_source(source)
    }

    /// Encodes the program into machine words.
    pub fn assemble(self) -> Result<crate::bytecode::Program, AssemblyError> {
        crate::assembler::assemble(self)
    }

    /// Like [Program::assemble], but logs each emitted word to `logger`.
    pub fn assemble_with_logger(
        self,
        logger: Logger,
    ) -> Result<crate::bytecode::Program, AssemblyError> {
        crate::assembler::assemble_with_logger(self, logger)
    }
}
