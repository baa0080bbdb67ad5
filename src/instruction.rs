//! Types for representing instructions and their parts.

use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

use crate::codec;

/// The 32 general purpose registers, named per the standard MIPS calling
/// convention.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Register {
    Zero,
    At,
    V0,
    V1,
    A0,
    A1,
    A2,
    A3,
    T0,
    T1,
    T2,
    T3,
    T4,
    T5,
    T6,
    T7,
    S0,
    S1,
    S2,
    S3,
    S4,
    S5,
    S6,
    S7,
    T8,
    T9,
    K0,
    K1,
    Gp,
    Sp,
    Fp,
    Ra,
}

impl Register {
    /// The register number stored in the 5-bit rs/rt/rd fields.
    pub fn index(&self) -> usize {
        use Register::*;

        match self {
            Zero => 0,
            At => 1,
            V0 => 2,
            V1 => 3,
            A0 => 4,
            A1 => 5,
            A2 => 6,
            A3 => 7,
            T0 => 8,
            T1 => 9,
            T2 => 10,
            T3 => 11,
            T4 => 12,
            T5 => 13,
            T6 => 14,
            T7 => 15,
            S0 => 16,
            S1 => 17,
            S2 => 18,
            S3 => 19,
            S4 => 20,
            S5 => 21,
            S6 => 22,
            S7 => 23,
            T8 => 24,
            T9 => 25,
            K0 => 26,
            K1 => 27,
            Gp => 28,
            Sp => 29,
            Fp => 30,
            Ra => 31,
        }
    }

    /// Maps a 5-bit field value back to a register. The index is masked to
    /// five bits, so every input maps to some register.
    pub fn from_index(index: u32) -> Register {
        use Register::*;

        match index & 0x1F {
            0 => Zero,
            1 => At,
            2 => V0,
            3 => V1,
            4 => A0,
            5 => A1,
            6 => A2,
            7 => A3,
            8 => T0,
            9 => T1,
            10 => T2,
            11 => T3,
            12 => T4,
            13 => T5,
            14 => T6,
            15 => T7,
            16 => S0,
            17 => S1,
            18 => S2,
            19 => S3,
            20 => S4,
            21 => S5,
            22 => S6,
            23 => S7,
            24 => T8,
            25 => T9,
            26 => K0,
            27 => K1,
            28 => Gp,
            29 => Sp,
            30 => Fp,
            _ => Ra,
        }
    }

    pub fn name(&self) -> &'static str {
        use Register::*;

        match self {
            Zero => "$zero",
            At => "$at",
            V0 => "$v0",
            V1 => "$v1",
            A0 => "$a0",
            A1 => "$a1",
            A2 => "$a2",
            A3 => "$a3",
            T0 => "$t0",
            T1 => "$t1",
            T2 => "$t2",
            T3 => "$t3",
            T4 => "$t4",
            T5 => "$t5",
            T6 => "$t6",
            T7 => "$t7",
            S0 => "$s0",
            S1 => "$s1",
            S2 => "$s2",
            S3 => "$s3",
            S4 => "$s4",
            S5 => "$s5",
            S6 => "$s6",
            S7 => "$s7",
            T8 => "$t8",
            T9 => "$t9",
            K0 => "$k0",
            K1 => "$k1",
            Gp => "$gp",
            Sp => "$sp",
            Fp => "$fp",
            Ra => "$ra",
        }
    }
}

impl FromStr for Register {
    type Err = ();

    fn from_str(name: &str) -> Result<Register, ()> {
        use Register::*;

        let register = match name {
            "$zero" => Zero,
            "$at" => At,
            "$v0" => V0,
            "$v1" => V1,
            "$a0" => A0,
            "$a1" => A1,
            "$a2" => A2,
            "$a3" => A3,
            "$t0" => T0,
            "$t1" => T1,
            "$t2" => T2,
            "$t3" => T3,
            "$t4" => T4,
            "$t5" => T5,
            "$t6" => T6,
            "$t7" => T7,
            "$s0" => S0,
            "$s1" => S1,
            "$s2" => S2,
            "$s3" => S3,
            "$s4" => S4,
            "$s5" => S5,
            "$s6" => S6,
            "$s7" => S7,
            "$t8" => T8,
            "$t9" => T9,
            "$k0" => K0,
            "$k1" => K1,
            "$gp" => Gp,
            "$sp" => Sp,
            "$fp" => Fp,
            "$ra" => Ra,
            _ => return Err(()),
        };

        Ok(register)
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The register-register ALU operations, selected by the 6-bit function
/// code of an R-type word.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AluOp {
    Add,
    Subtract,
    And,
    Or,
    Nor,
    SetLessThan,
}

impl AluOp {
    pub fn funct(&self) -> u32 {
        match self {
            AluOp::Add => 0x20,
            AluOp::Subtract => 0x22,
            AluOp::And => 0x24,
            AluOp::Or => 0x25,
            AluOp::Nor => 0x27,
            AluOp::SetLessThan => 0x2A,
        }
    }

    pub fn from_funct(funct: u32) -> Option<AluOp> {
        let op = match funct {
            0x20 => AluOp::Add,
            0x22 => AluOp::Subtract,
            0x24 => AluOp::And,
            0x25 => AluOp::Or,
            0x27 => AluOp::Nor,
            0x2A => AluOp::SetLessThan,
            _ => return None,
        };

        Some(op)
    }
}

impl fmt::Display for AluOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            AluOp::Add => "add",
            AluOp::Subtract => "sub",
            AluOp::And => "and",
            AluOp::Or => "or",
            AluOp::Nor => "nor",
            AluOp::SetLessThan => "slt",
        };

        f.write_str(name)
    }
}

pub(crate) const OPCODE_J: u32 = 0x02;
pub(crate) const OPCODE_BEQ: u32 = 0x04;
pub(crate) const OPCODE_ADDI: u32 = 0x08;
pub(crate) const OPCODE_LW: u32 = 0x23;
pub(crate) const OPCODE_SW: u32 = 0x2B;

/// Every mnemonic the assembler accepts. Anything outside this enumeration
/// is an unsupported operation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mnemonic {
    Add,
    Sub,
    And,
    Or,
    Nor,
    Slt,
    Addi,
    Lw,
    Sw,
    Beq,
    J,
}

impl Mnemonic {
    pub const ALL: [Mnemonic; 11] = [
        Mnemonic::Add,
        Mnemonic::Sub,
        Mnemonic::And,
        Mnemonic::Or,
        Mnemonic::Nor,
        Mnemonic::Slt,
        Mnemonic::Addi,
        Mnemonic::Lw,
        Mnemonic::Sw,
        Mnemonic::Beq,
        Mnemonic::J,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Mnemonic::Add => "add",
            Mnemonic::Sub => "sub",
            Mnemonic::And => "and",
            Mnemonic::Or => "or",
            Mnemonic::Nor => "nor",
            Mnemonic::Slt => "slt",
            Mnemonic::Addi => "addi",
            Mnemonic::Lw => "lw",
            Mnemonic::Sw => "sw",
            Mnemonic::Beq => "beq",
            Mnemonic::J => "j",
        }
    }

    /// The ALU operation for R-type mnemonics, `None` otherwise.
    pub fn alu_op(&self) -> Option<AluOp> {
        let op = match self {
            Mnemonic::Add => AluOp::Add,
            Mnemonic::Sub => AluOp::Subtract,
            Mnemonic::And => AluOp::And,
            Mnemonic::Or => AluOp::Or,
            Mnemonic::Nor => AluOp::Nor,
            Mnemonic::Slt => AluOp::SetLessThan,
            _ => return None,
        };

        Some(op)
    }
}

impl FromStr for Mnemonic {
    type Err = ();

    fn from_str(name: &str) -> Result<Mnemonic, ()> {
        let mnemonic = match name.to_lowercase().as_str() {
            "add" => Mnemonic::Add,
            "sub" => Mnemonic::Sub,
            "and" => Mnemonic::And,
            "or" => Mnemonic::Or,
            "nor" => Mnemonic::Nor,
            "slt" => Mnemonic::Slt,
            "addi" => Mnemonic::Addi,
            "lw" => Mnemonic::Lw,
            "sw" => Mnemonic::Sw,
            "beq" => Mnemonic::Beq,
            "j" => Mnemonic::J,
            _ => return Err(()),
        };

        Ok(mnemonic)
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A decoded machine word.
///
/// Encoding an instruction and decoding the resulting word always yields
/// the original value; the assembler and the emulator share this type as
/// their common contract.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Instruction {
    /// R-type: a register-register ALU operation into `rd`.
    Alu {
        op: AluOp,
        rs: Register,
        rt: Register,
        rd: Register,
    },

    /// I-type: add a sign-extended immediate to `rs`, result into `rt`.
    AddImmediate {
        rt: Register,
        rs: Register,
        immediate: i16,
    },

    /// I-type: load a big-endian word from `base + offset` into `rt`.
    LoadWord {
        rt: Register,
        base: Register,
        offset: i16,
    },

    /// I-type: store `rt` as a big-endian word at `base + offset`.
    StoreWord {
        rt: Register,
        base: Register,
        offset: i16,
    },

    /// I-type: branch by `offset` words (relative to the next instruction)
    /// when `rs == rt`.
    BranchEqual {
        rs: Register,
        rt: Register,
        offset: i16,
    },

    /// J-type: unconditional jump carrying a 26-bit word-aligned target.
    Jump { address: u32 },
}

/// A word whose opcode or function code is outside the supported set.
///
/// The emulator reports these and skips the word; they are not fatal.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum DecodeError {
    UnknownOpcode { word: u32, opcode: u32 },
    UnknownFunct { word: u32, funct: u32 },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DecodeError::UnknownOpcode { word, opcode } => {
                write!(f, "unknown opcode 0x{:02x} in word 0x{:08x}", opcode, word)
            }
            DecodeError::UnknownFunct { word, funct } => write!(
                f,
                "unknown function code 0x{:02x} in word 0x{:08x}",
                funct, word
            ),
        }
    }
}

impl std::error::Error for DecodeError {}

impl Instruction {
    /// Decodes a machine word.
    ///
    /// Dispatch follows the opcode field: `0` selects the R-type family,
    /// `2` and `3` the J-type family and every other value the I-type
    /// family.
    pub fn decode(word: u32) -> Result<Instruction, DecodeError> {
        let opcode = codec::opcode(word);

        let instruction = match opcode {
            0 => {
                let funct = codec::funct(word);
                let op =
                    AluOp::from_funct(funct).ok_or(DecodeError::UnknownFunct { word, funct })?;

                Instruction::Alu {
                    op,
                    rs: Register::from_index(codec::rs(word)),
                    rt: Register::from_index(codec::rt(word)),
                    rd: Register::from_index(codec::rd(word)),
                }
            }
            2 | 3 => Instruction::Jump {
                address: codec::address(word),
            },
            OPCODE_ADDI => Instruction::AddImmediate {
                rt: Register::from_index(codec::rt(word)),
                rs: Register::from_index(codec::rs(word)),
                immediate: codec::immediate(word),
            },
            OPCODE_LW => Instruction::LoadWord {
                rt: Register::from_index(codec::rt(word)),
                base: Register::from_index(codec::rs(word)),
                offset: codec::immediate(word),
            },
            OPCODE_SW => Instruction::StoreWord {
                rt: Register::from_index(codec::rt(word)),
                base: Register::from_index(codec::rs(word)),
                offset: codec::immediate(word),
            },
            OPCODE_BEQ => Instruction::BranchEqual {
                rs: Register::from_index(codec::rs(word)),
                rt: Register::from_index(codec::rt(word)),
                offset: codec::immediate(word),
            },
            _ => return Err(DecodeError::UnknownOpcode { word, opcode }),
        };

        Ok(instruction)
    }

    /// Packs the instruction into its canonical machine word.
    pub fn encode(&self) -> u32 {
        match *self {
            Instruction::Alu { op, rs, rt, rd } => codec::encode_r(
                op.funct(),
                rs.index() as u32,
                rt.index() as u32,
                rd.index() as u32,
            ),
            Instruction::AddImmediate { rt, rs, immediate } => {
                codec::encode_i(OPCODE_ADDI, rs.index() as u32, rt.index() as u32, immediate)
            }
            Instruction::LoadWord { rt, base, offset } => {
                codec::encode_i(OPCODE_LW, base.index() as u32, rt.index() as u32, offset)
            }
            Instruction::StoreWord { rt, base, offset } => {
                codec::encode_i(OPCODE_SW, base.index() as u32, rt.index() as u32, offset)
            }
            Instruction::BranchEqual { rs, rt, offset } => {
                codec::encode_i(OPCODE_BEQ, rs.index() as u32, rt.index() as u32, offset)
            }
            Instruction::Jump { address } => codec::encode_j(OPCODE_J, address),
        }
    }
}

impl From<Instruction> for u32 {
    fn from(instruction: Instruction) -> u32 {
        instruction.encode()
    }
}

impl TryFrom<u32> for Instruction {
    type Error = DecodeError;

    fn try_from(word: u32) -> Result<Instruction, DecodeError> {
        Instruction::decode(word)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Instruction::Alu { op, rs, rt, rd } => write!(f, "{} {}, {}, {}", op, rd, rs, rt),
            Instruction::AddImmediate { rt, rs, immediate } => {
                write!(f, "addi {}, {}, {}", rt, rs, immediate)
            }
            Instruction::LoadWord { rt, base, offset } => {
                write!(f, "lw {}, {}({})", rt, offset, base)
            }
            Instruction::StoreWord { rt, base, offset } => {
                write!(f, "sw {}, {}({})", rt, offset, base)
            }
            Instruction::BranchEqual { rs, rt, offset } => {
                write!(f, "beq {}, {}, {}", rs, rt, offset)
            }
            Instruction::Jump { address } => write!(f, "j 0x{:x}", address << 2),
        }
    }
}
