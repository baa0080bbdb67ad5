//! Line-oriented scanner for assembly source.
//!
//! This is the assembler's first pass: one linear scan over the source
//! that records labels in the symbol table at the current program counter
//! and collects one [InstructionEntry] per instruction-bearing line.
//! Labels alone never advance the program counter.

use logos::{Logos, Span};

use crate::error::{closest_mnemonic, AssemblyError, ErrorKind};
use crate::instruction::Mnemonic;
use crate::symbol_table::SymbolTable;

use super::program::{InstructionEntry, Operand, Program};
use super::token::Token;

pub(crate) fn parse_source(source: &str) -> Result<Program, AssemblyError> {
    Scanner::new(source).scan()
}

struct Scanner<'a> {
    source: &'a str,
    tokens: Vec<(Token<'a>, Span, usize)>,
    position: usize,
}

impl<'a> Scanner<'a> {
    fn new(source: &'a str) -> Scanner<'a> {
        let mut lexer = Token::lexer(source);
        let mut tokens = Vec::new();
        let mut line = 1;

        while let Some(token) = lexer.next() {
            let is_newline = token == Token::Newline;
            tokens.push((token, lexer.span(), line));

            if is_newline {
                line += 1;
            }
        }

        Scanner {
            source,
            tokens,
            position: 0,
        }
    }

    fn peek(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.position).map(|(token, _, _)| token)
    }

    fn next(&mut self) -> Option<Token<'a>> {
        let token = self.tokens.get(self.position).map(|(token, _, _)| token.clone());

        if token.is_some() {
            self.position += 1;
        }

        token
    }

    /// Source line number at the cursor; the last seen line at end of
    /// input.
    fn line(&self) -> usize {
        self.tokens
            .get(self.position.min(self.tokens.len().saturating_sub(1)))
            .map(|(_, _, line)| *line)
            .unwrap_or(1)
    }

    /// Source text of the token just consumed.
    fn slice(&self) -> &'a str {
        self.tokens
            .get(self.position.saturating_sub(1))
            .map(|(_, span, _)| &self.source[span.clone()])
            .unwrap_or("")
    }

    fn unexpected(&self) -> AssemblyError {
        let text = self
            .tokens
            .get(self.position)
            .map(|(_, span, _)| &self.source[span.clone()])
            .unwrap_or("<end of input>");

        AssemblyError::new(
            ErrorKind::UnexpectedToken {
                text: text.to_string(),
            },
            self.line(),
        )
    }

    fn scan(mut self) -> Result<Program, AssemblyError> {
        let mut instructions = Vec::new();
        let mut symbol_table = SymbolTable::new();
        let mut pc: u32 = 0;

        while let Some(token) = self.peek() {
            match token {
                Token::Newline => {
                    self.next();
                }
                Token::Symbol(name) => {
                    let name = *name;

                    if let Some(Token::LabelMarker) = self.lookahead(1) {
                        // A label records the address of the next
                        // instruction; the rest of the line may still hold
                        // one.
                        self.next();
                        self.next();
                        symbol_table.define(name, pc);
                    } else {
                        let entry = self.scan_instruction(name, pc)?;
                        instructions.push(entry);
                        pc += 4;
                    }
                }
                _ => return Err(self.unexpected()),
            }
        }

        Ok(Program {
            instructions,
            symbol_table,
        })
    }

    fn lookahead(&self, offset: usize) -> Option<&Token<'a>> {
        self.tokens
            .get(self.position + offset)
            .map(|(token, _, _)| token)
    }

    fn scan_instruction(&mut self, name: &str, pc: u32) -> Result<InstructionEntry, AssemblyError> {
        let line = self.line();
        self.next();

        let mnemonic: Mnemonic = name.parse().map_err(|()| {
            AssemblyError::new(
                ErrorKind::UnsupportedOperation {
                    mnemonic: name.to_string(),
                    suggestion: closest_mnemonic(name),
                },
                line,
            )
        })?;

        let mut operands = Vec::new();

        loop {
            match self.peek() {
                None | Some(Token::Newline) => break,
                Some(Token::OperandSeparator) => {
                    self.next();
                }
                _ => operands.push(self.scan_operand(mnemonic)?),
            }
        }

        Ok(InstructionEntry {
            mnemonic,
            operands,
            address: pc,
            line,
        })
    }

    fn scan_operand(&mut self, mnemonic: Mnemonic) -> Result<Operand, AssemblyError> {
        let line = self.line();

        match self.next() {
            Some(Token::Register(name)) => {
                let register = name.parse().map_err(|()| {
                    AssemblyError::new(
                        ErrorKind::UnknownRegister {
                            name: name.to_string(),
                        },
                        line,
                    )
                })?;

                Ok(Operand::Register(register))
            }
            Some(Token::Literal(offset)) => {
                if let Some(Token::BaseBegin) = self.peek() {
                    self.scan_memory_base(mnemonic, offset, line)
                } else {
                    Ok(Operand::Immediate(offset))
                }
            }
            Some(Token::Symbol(label)) => Ok(Operand::Label(label.to_string())),
            Some(Token::BaseBegin) | Some(Token::BaseEnd) => Err(AssemblyError::new(
                ErrorKind::MalformedMemoryOperand { mnemonic },
                line,
            )),
            Some(Token::Error) => Err(AssemblyError::new(
                ErrorKind::UnexpectedToken {
                    text: self.slice().to_string(),
                },
                line,
            )),
            _ => {
                self.position = self.position.saturating_sub(1);
                Err(self.unexpected())
            }
        }
    }

    /// Parses the `(register)` part of a memory operand; the offset has
    /// already been consumed.
    fn scan_memory_base(
        &mut self,
        mnemonic: Mnemonic,
        offset: i32,
        line: usize,
    ) -> Result<Operand, AssemblyError> {
        let malformed =
            || AssemblyError::new(ErrorKind::MalformedMemoryOperand { mnemonic }, line);

        match self.next() {
            Some(Token::BaseBegin) => {}
            _ => return Err(malformed()),
        }

        let base = match self.next() {
            Some(Token::Register(name)) => name.parse().map_err(|()| {
                AssemblyError::new(
                    ErrorKind::UnknownRegister {
                        name: name.to_string(),
                    },
                    line,
                )
            })?,
            _ => return Err(malformed()),
        };

        match self.next() {
            Some(Token::BaseEnd) => Ok(Operand::Memory { offset, base }),
            _ => Err(malformed()),
        }
    }
}
