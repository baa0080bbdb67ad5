//! The in-memory form of a bytecode program.

use itertools::Itertools;

use crate::codec;
use crate::instruction::{DecodeError, Instruction};

/// A bytecode program: the machine words in load order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub words: Vec<u32>,
}

impl Program {
    /// Reads a program from its text listing.
    ///
    /// Lines that are not exactly 32 binary digits are skipped, so this
    /// cannot fail; garbage input simply yields an empty program.
    pub fn parse(input: &str) -> Program {
        Program {
            words: super::parser::parse_listing(input),
        }
    }

    pub fn to_words(&self) -> Vec<u32> {
        self.words.clone()
    }

    /// Renders the program in the text listing format, one 32-digit
    /// binary line per word.
    pub fn to_listing(&self) -> String {
        let mut listing = self.words.iter().map(|word| codec::to_binary(*word)).join("\n");

        if !listing.is_empty() {
            listing.push('\n');
        }

        listing
    }

    /// Decodes each word in order. Words that do not decode are reported
    /// in place instead of ending the iteration.
    pub fn instructions(&self) -> impl Iterator<Item = Result<Instruction, DecodeError>> + '_ {
        self.words.iter().map(|word| Instruction::decode(*word))
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::Register;

    #[test]
    fn listing_round_trip_preserves_the_words() {
        let program = Program {
            words: vec![0x2008_0005, 0x0109_5020],
        };

        assert_eq!(Program::parse(&program.to_listing()), program);
    }

    #[test]
    fn empty_program_renders_an_empty_listing() {
        assert_eq!(Program::default().to_listing(), "");
    }

    #[test]
    fn instructions_reports_undecodable_words_in_place() {
        let program = Program {
            // add, then an unassigned opcode.
            words: vec![0x0109_5020, 0xFC00_0000],
        };

        let decoded: Vec<_> = program.instructions().collect();

        assert!(matches!(
            decoded[0],
            Ok(Instruction::Alu {
                rd: Register::T2,
                ..
            })
        ));
        assert!(decoded[1].is_err());
    }
}
