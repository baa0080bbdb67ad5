//! Parsing and storing bytecode programs.
//!
//! The on-disk format is a text listing: one machine word per line,
//! written as 32 binary digits. Anything else on a line disqualifies it,
//! and disqualified lines are skipped rather than reported.

pub mod parser;
pub mod program;

pub use self::program::Program;
