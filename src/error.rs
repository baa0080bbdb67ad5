//! Error types for the assembly pipeline.

use std::fmt;

use edit_distance::edit_distance;

use crate::instruction::Mnemonic;

/// An error produced while assembling a program.
///
/// Every assembly-time error is unrecoverable for the run: the assembler
/// produces no output when one is returned.
#[derive(Debug, Clone, PartialEq)]
pub struct AssemblyError {
    pub kind: ErrorKind,

    /// One-based source line number of the offending instruction.
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ErrorKind {
    /// A mnemonic outside the supported instruction set.
    UnsupportedOperation {
        mnemonic: String,
        suggestion: Option<Mnemonic>,
    },

    /// Wrong number of operands for the mnemonic's encoding family.
    OperandCount {
        mnemonic: Mnemonic,
        expected: usize,
        got: usize,
    },

    /// An operand of the wrong shape, e.g. a literal where a register is
    /// required.
    InvalidOperand {
        mnemonic: Mnemonic,
        index: usize,
        expected: &'static str,
    },

    /// `offset(register)` syntax with a missing parenthesis or offset.
    MalformedMemoryOperand { mnemonic: Mnemonic },

    /// A register name outside the 32 standard names.
    UnknownRegister { name: String },

    /// A `beq`/`j` target that is not present in the symbol table.
    UndefinedLabel { label: String },

    /// Input the tokenizer or line scanner could not make sense of.
    UnexpectedToken { text: String },
}

impl AssemblyError {
    pub(crate) fn new(kind: ErrorKind, line: usize) -> AssemblyError {
        AssemblyError { kind, line }
    }
}

/// Returns the supported mnemonic closest to `name`, if any is close
/// enough to be a plausible typo.
pub(crate) fn closest_mnemonic(name: &str) -> Option<Mnemonic> {
    let name = name.to_lowercase();

    Mnemonic::ALL
        .iter()
        .map(|m| (edit_distance(&name, m.name()), *m))
        .filter(|(distance, _)| *distance <= 2)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, m)| m)
}

impl fmt::Display for AssemblyError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.kind)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ErrorKind::UnsupportedOperation {
                mnemonic,
                suggestion,
            } => {
                write!(f, "unsupported operation `{}`", mnemonic)?;

                if let Some(suggestion) = suggestion {
                    write!(f, " (did you mean `{}`?)", suggestion)?;
                }

                Ok(())
            }
            ErrorKind::OperandCount {
                mnemonic,
                expected,
                got,
            } => write!(
                f,
                "`{}` takes {} operand(s), got {}",
                mnemonic, expected, got
            ),
            ErrorKind::InvalidOperand {
                mnemonic,
                index,
                expected,
            } => write!(
                f,
                "operand {} of `{}` must be {}",
                index + 1,
                mnemonic,
                expected
            ),
            ErrorKind::MalformedMemoryOperand { mnemonic } => {
                write!(f, "`{}` expects an `offset(register)` operand", mnemonic)
            }
            ErrorKind::UnknownRegister { name } => write!(f, "unknown register `{}`", name),
            ErrorKind::UndefinedLabel { label } => write!(f, "undefined label `{}`", label),
            ErrorKind::UnexpectedToken { text } => write!(f, "unexpected token `{}`", text),
        }
    }
}

impl std::error::Error for AssemblyError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggests_a_close_mnemonic() {
        assert_eq!(closest_mnemonic("sllt"), Some(Mnemonic::Slt));
        assert_eq!(closest_mnemonic("ADD"), Some(Mnemonic::Add));
        assert_eq!(closest_mnemonic("multiply"), None);
    }

    #[test]
    fn errors_render_with_line_information() {
        let error = AssemblyError::new(
            ErrorKind::UndefinedLabel {
                label: "end".to_string(),
            },
            7,
        );

        assert_eq!(error.to_string(), "line 7: undefined label `end`");
    }
}
