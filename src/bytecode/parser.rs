//! Parser for the binary listing format.

use nom::{
    character::complete::{line_ending, not_line_ending},
    multi::many0,
    sequence::terminated,
    IResult,
};

use crate::codec;

fn terminated_lines(input: &str) -> IResult<&str, Vec<&str>> {
    many0(terminated(not_line_ending, line_ending))(input)
}

/// Splits the input into lines and keeps the ones that hold exactly 32
/// binary digits. Everything else, including a malformed final line
/// without a terminator, is dropped.
pub(crate) fn parse_listing(input: &str) -> Vec<u32> {
    // not_line_ending never fails and line_ending consumes at least one
    // character, so many0 terminates and only an unterminated final
    // line can remain.
    let (rest, mut lines) = match terminated_lines(input) {
        Ok(parsed) => parsed,
        Err(_) => (input, Vec::new()),
    };

    if !rest.is_empty() {
        lines.push(rest);
    }

    lines
        .into_iter()
        .filter_map(codec::from_binary)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_one_word_per_line() {
        let listing = "00100000000010000000000000000101\n\
                       00000001000010010101000000100000\n";

        assert_eq!(parse_listing(listing), vec![0x2008_0005, 0x0109_5020]);
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let listing = "; a comment line\n\
                       00100000000010000000000000000101\n\
                       0010000000001000000000000000010\n\
                       00100000000010000000000000000x01\n\
                       \n";

        assert_eq!(parse_listing(listing), vec![0x2008_0005]);
    }

    #[test]
    fn final_line_without_terminator_still_counts() {
        let listing = "00100000000010000000000000000101";

        assert_eq!(parse_listing(listing), vec![0x2008_0005]);
    }

    #[test]
    fn empty_input_yields_no_words() {
        assert_eq!(parse_listing(""), Vec::<u32>::new());
    }
}
