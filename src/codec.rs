//! Packing and unpacking of instruction bitfields.
//!
//! All three encoding layouts share this module:
//!
//! ```text
//! R-type: opcode(6)=0 | rs(5) | rt(5) | rd(5) | shamt(5)=0 | funct(6)
//! I-type: opcode(6)   | rs(5) | rt(5) | immediate(16)
//! J-type: opcode(6)   | address(26)
//! ```
//!
//! The field accessors perform no range checks; callers are expected to
//! pass widths that fit in a word (`start + width <= 32`).

/// Extracts `width` bits starting at bit `start` (counting from the least
/// significant bit).
pub fn field(word: u32, start: u32, width: u32) -> u32 {
    let mask = ((1u64 << width) - 1) as u32;
    (word >> start) & mask
}

/// Packs an R-type instruction. The opcode and shamt fields are always zero.
pub fn encode_r(funct: u32, rs: u32, rt: u32, rd: u32) -> u32 {
    (rs << 21) | (rt << 16) | (rd << 11) | funct
}

/// Packs an I-type instruction. The immediate is stored in two's complement.
pub fn encode_i(opcode: u32, rs: u32, rt: u32, immediate: i16) -> u32 {
    (opcode << 26) | (rs << 21) | (rt << 16) | (immediate as u16 as u32)
}

/// Packs a J-type instruction. `address` is a word-aligned byte target
/// shifted right by two; only the low 26 bits are stored.
pub fn encode_j(opcode: u32, address: u32) -> u32 {
    (opcode << 26) | (address & 0x03FF_FFFF)
}

pub fn opcode(word: u32) -> u32 {
    field(word, 26, 6)
}

pub fn rs(word: u32) -> u32 {
    field(word, 21, 5)
}

pub fn rt(word: u32) -> u32 {
    field(word, 16, 5)
}

pub fn rd(word: u32) -> u32 {
    field(word, 11, 5)
}

pub fn funct(word: u32) -> u32 {
    field(word, 0, 6)
}

/// Returns the 16-bit immediate field, sign extended.
pub fn immediate(word: u32) -> i16 {
    field(word, 0, 16) as u16 as i16
}

pub fn address(word: u32) -> u32 {
    field(word, 0, 26)
}

/// Renders a word as exactly 32 characters of `0`/`1`, most significant
/// bit first.
pub fn to_binary(word: u32) -> String {
    format!("{:032b}", word)
}

/// The exact inverse of [to_binary]. Returns `None` unless the input is
/// exactly 32 characters of `0`/`1`.
pub fn from_binary(text: &str) -> Option<u32> {
    if text.len() != 32 || !text.bytes().all(|b| b == b'0' || b == b'1') {
        return None;
    }

    u32::from_str_radix(text, 2).ok()
}
