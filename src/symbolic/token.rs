//! Tokens and a tokenizer for the assembly source format.

use logos::{Lexer, Logos};

use std::fmt;

/// Enumeration of all tokens of the assembly source format.
///
/// Newlines are significant (the grammar is line oriented), so they are a
/// token rather than skipped whitespace.
#[derive(Logos, Debug, PartialEq, Clone)]
pub enum Token<'a> {
    /// Erroneous token that could not be interpreted as any of the other
    /// variants.
    #[error]
    #[regex(r"[ \t\r\f]+", logos::skip)]
    #[regex(r"#[^\n]*", logos::skip)]
    Error,

    #[token("\n")]
    Newline,

    /// A register name beginning with `$`. Resolved against the 32 known
    /// names later, so that the error message can carry the name.
    #[regex(r"\$[a-zA-Z0-9]*", Lexer::slice)]
    Register(&'a str),

    /// A mnemonic or label, beginning with a letter.
    #[regex("[A-Za-z_][A-Za-z0-9_]*", Lexer::slice)]
    Symbol(&'a str),

    /// A signed decimal literal.
    #[regex("-?[0-9]+", literal_callback)]
    Literal(i32),

    /// Token (`:`) that ends a label definition.
    #[token(":")]
    LabelMarker,

    /// Token (`,`) separating operands. Operands may equally be separated
    /// by whitespace alone.
    #[token(",")]
    OperandSeparator,

    /// Token (`(`) opening the base register of an `offset(register)`
    /// memory operand.
    #[token("(")]
    BaseBegin,

    /// Token (`)`) closing the base register of an `offset(register)`
    /// memory operand.
    #[token(")")]
    BaseEnd,
}

fn literal_callback<'a>(
    lex: &mut Lexer<'a, Token<'a>>,
) -> std::result::Result<i32, std::num::ParseIntError> {
    lex.slice().parse()
}

impl<'t> fmt::Display for Token<'t> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Token::Error => write!(f, "<error>"),
            Token::Newline => write!(f, "<newline>"),
            Token::Register(name) => write!(f, "{}", name),
            Token::Symbol(name) => write!(f, "{}", name),
            Token::Literal(number) => write!(f, "{}", number),
            Token::LabelMarker => write!(f, ":"),
            Token::OperandSeparator => write!(f, ","),
            Token::BaseBegin => write!(f, "("),
            Token::BaseEnd => write!(f, ")"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Vec<Token> {
        Token::lexer(source).collect()
    }

    #[test]
    fn tokenize_memory_operand() {
        assert_eq!(
            tokens("lw $t0, -4($sp)"),
            vec![
                Token::Symbol("lw"),
                Token::Register("$t0"),
                Token::OperandSeparator,
                Token::Literal(-4),
                Token::BaseBegin,
                Token::Register("$sp"),
                Token::BaseEnd,
            ]
        );
    }

    #[test]
    fn comments_are_skipped_until_end_of_line() {
        assert_eq!(
            tokens("add $t0, $t0, $t0 # double it\nend:"),
            vec![
                Token::Symbol("add"),
                Token::Register("$t0"),
                Token::OperandSeparator,
                Token::Register("$t0"),
                Token::OperandSeparator,
                Token::Register("$t0"),
                Token::Newline,
                Token::Symbol("end"),
                Token::LabelMarker,
            ]
        );
    }
}
