//! Encoding of scanned programs into machine words.
//!
//! This is the assembler's second pass. The symbol table is complete by
//! the time it runs, so branches and jumps to labels defined later in the
//! file resolve like any other.

use slog::{o, trace, Discard, Logger};

use crate::bytecode;
use crate::error::{AssemblyError, ErrorKind};
use crate::instruction::{Instruction, Mnemonic, Register};
use crate::symbol_table::SymbolTable;
use crate::symbolic::{InstructionEntry, Operand, Program};

/// Encodes a scanned program into machine words.
///
/// Fails on the first error; no partial output is produced.
pub fn assemble(program: Program) -> Result<bytecode::Program, AssemblyError> {
    assemble_with_logger(program, None)
}

/// Like [assemble], but emits a trace record per encoded word.
pub fn assemble_with_logger<L>(program: Program, logger: L) -> Result<bytecode::Program, AssemblyError>
where
    L: Into<Option<Logger>>,
{
    let logger = logger
        .into()
        .unwrap_or_else(|| Logger::root(Discard, o!()))
        .new(o!("stage" => "encode"));

    let mut words = Vec::with_capacity(program.instructions.len());

    // The encoder keeps its own program counter; it advances by 4 per
    // token regardless of what the instruction does at run time.
    let mut pc: u32 = 0;

    for entry in &program.instructions {
        let instruction = encode_entry(entry, &program.symbol_table, pc)?;
        let word = instruction.encode();

        trace!(logger, "emit word";
               "pc" => pc,
               "word" => format!("{:08x}", word),
               "instruction" => %instruction);

        words.push(word);
        pc += 4;
    }

    Ok(bytecode::Program { words })
}

fn encode_entry(
    entry: &InstructionEntry,
    symbols: &SymbolTable,
    pc: u32,
) -> Result<Instruction, AssemblyError> {
    if let Some(op) = entry.mnemonic.alu_op() {
        // R-type, written `op rd, rs, rt`.
        expect_operands(entry, 3)?;

        return Ok(Instruction::Alu {
            op,
            rd: register_operand(entry, 0)?,
            rs: register_operand(entry, 1)?,
            rt: register_operand(entry, 2)?,
        });
    }

    match entry.mnemonic {
        Mnemonic::Addi => {
            expect_operands(entry, 3)?;

            Ok(Instruction::AddImmediate {
                rt: register_operand(entry, 0)?,
                rs: register_operand(entry, 1)?,
                // Truncated to the 16-bit field; wraps rather than
                // saturates.
                immediate: immediate_operand(entry, 2)? as i16,
            })
        }
        Mnemonic::Lw | Mnemonic::Sw => {
            expect_operands(entry, 2)?;

            let rt = register_operand(entry, 0)?;
            let (offset, base) = memory_operand(entry, 1)?;
            let offset = offset as i16;

            Ok(match entry.mnemonic {
                Mnemonic::Lw => Instruction::LoadWord { rt, base, offset },
                _ => Instruction::StoreWord { rt, base, offset },
            })
        }
        Mnemonic::Beq => {
            expect_operands(entry, 3)?;

            let rs = register_operand(entry, 0)?;
            let rt = register_operand(entry, 1)?;
            let target = label_operand(entry, 2, symbols)?;

            // Word-granular displacement relative to the instruction
            // after the branch, truncated to the 16-bit field.
            let offset = target.wrapping_sub(pc.wrapping_add(4)) / 4;

            Ok(Instruction::BranchEqual {
                rs,
                rt,
                offset: offset as i16,
            })
        }
        Mnemonic::J => {
            expect_operands(entry, 1)?;

            let target = label_operand(entry, 0, symbols)?;

            // The upper four address bits are not stored; the emulator
            // takes them from its program counter.
            Ok(Instruction::Jump {
                address: target >> 2,
            })
        }
        // R-type mnemonics were handled above.
        _ => unreachable!("mnemonic {} has no encoding family", entry.mnemonic),
    }
}

fn expect_operands(entry: &InstructionEntry, expected: usize) -> Result<(), AssemblyError> {
    if entry.operands.len() != expected {
        return Err(AssemblyError::new(
            ErrorKind::OperandCount {
                mnemonic: entry.mnemonic,
                expected,
                got: entry.operands.len(),
            },
            entry.line,
        ));
    }

    Ok(())
}

fn register_operand(entry: &InstructionEntry, index: usize) -> Result<Register, AssemblyError> {
    entry.operands[index].register().ok_or_else(|| {
        AssemblyError::new(
            ErrorKind::InvalidOperand {
                mnemonic: entry.mnemonic,
                index,
                expected: "a register",
            },
            entry.line,
        )
    })
}

fn immediate_operand(entry: &InstructionEntry, index: usize) -> Result<i32, AssemblyError> {
    match entry.operands[index] {
        Operand::Immediate(value) => Ok(value),
        _ => Err(AssemblyError::new(
            ErrorKind::InvalidOperand {
                mnemonic: entry.mnemonic,
                index,
                expected: "a numeric literal",
            },
            entry.line,
        )),
    }
}

fn memory_operand(
    entry: &InstructionEntry,
    index: usize,
) -> Result<(i32, Register), AssemblyError> {
    match entry.operands[index] {
        Operand::Memory { offset, base } => Ok((offset, base)),
        _ => Err(AssemblyError::new(
            ErrorKind::MalformedMemoryOperand {
                mnemonic: entry.mnemonic,
            },
            entry.line,
        )),
    }
}

fn label_operand(
    entry: &InstructionEntry,
    index: usize,
    symbols: &SymbolTable,
) -> Result<u32, AssemblyError> {
    let label = match &entry.operands[index] {
        Operand::Label(label) => label,
        _ => {
            return Err(AssemblyError::new(
                ErrorKind::InvalidOperand {
                    mnemonic: entry.mnemonic,
                    index,
                    expected: "a label",
                },
                entry.line,
            ))
        }
    };

    symbols.get(label).ok_or_else(|| {
        AssemblyError::new(
            ErrorKind::UndefinedLabel {
                label: label.clone(),
            },
            entry.line,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;
    use crate::instruction::AluOp;

    fn assemble_source(source: &str) -> Result<Vec<u32>, AssemblyError> {
        Program::parse(source)?.assemble().map(|p| p.words)
    }

    #[test]
    fn r_type_operand_order_is_rd_rs_rt() {
        let words = assemble_source("add $t2, $t0, $t1\n").unwrap();

        assert_eq!(
            Instruction::decode(words[0]),
            Ok(Instruction::Alu {
                op: AluOp::Add,
                rd: Register::T2,
                rs: Register::T0,
                rt: Register::T1,
            })
        );
    }

    #[test]
    fn forward_and_backward_branches_have_opposite_signs() {
        // Both branches are two instructions away from their label.
        let source = "back:\n\
                      addi $t0, $t0, 1\n\
                      beq $t0, $t1, back\n\
                      beq $t0, $t1, fwd\n\
                      addi $t0, $t0, 1\n\
                      fwd:\n";

        let words = assemble_source(source).unwrap();

        assert_eq!(codec::immediate(words[1]), -2);
        assert_eq!(codec::immediate(words[2]), 1);
    }

    #[test]
    fn jump_stores_the_word_address() {
        let words = assemble_source(
            "addi $t0, $zero, 0\n\
             target: j target\n",
        )
        .unwrap();

        assert_eq!(codec::opcode(words[1]), 0x02);
        assert_eq!(codec::address(words[1]), 1);
    }

    #[test]
    fn undefined_label_is_a_hard_failure() {
        let error = assemble_source("j end\n").unwrap_err();

        assert_eq!(
            error.kind,
            ErrorKind::UndefinedLabel {
                label: "end".to_string(),
            }
        );
    }

    #[test]
    fn operand_count_mismatch_names_the_instruction() {
        let error = assemble_source("add $t0, $t1\n").unwrap_err();

        assert_eq!(
            error.kind,
            ErrorKind::OperandCount {
                mnemonic: Mnemonic::Add,
                expected: 3,
                got: 2,
            }
        );
    }

    #[test]
    fn memory_instruction_requires_memory_operand() {
        let error = assemble_source("lw $t0, $t1\n").unwrap_err();

        assert_eq!(
            error.kind,
            ErrorKind::MalformedMemoryOperand {
                mnemonic: Mnemonic::Lw,
            }
        );
    }

    #[test]
    fn immediate_truncation_wraps_at_the_field_boundary() {
        let words = assemble_source(
            "addi $t0, $zero, 32768\n\
             addi $t1, $zero, -32768\n\
             addi $t2, $zero, 65537\n",
        )
        .unwrap();

        assert_eq!(codec::immediate(words[0]), -32768);
        assert_eq!(codec::immediate(words[1]), -32768);
        assert_eq!(codec::immediate(words[2]), 1);
    }

    #[test]
    fn listing_lines_are_32_binary_characters() {
        let program = Program::parse("addi $t0, $zero, 5\n")
            .unwrap()
            .assemble()
            .unwrap();
        let listing = program.to_listing();

        assert_eq!(listing.trim_end().len(), 32);
        assert_eq!(listing.trim_end(), codec::to_binary(program.words[0]));
    }
}
