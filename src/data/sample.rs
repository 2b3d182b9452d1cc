//! Sample type and the line parser for the pedal controller's serial output.
//!
//! The controller prints one record per line: `<brake>\t<throttle>\r\n`.
//! Everything else on the wire is rejected with a [`ParseError`].

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// One (brake, throttle) pair taken from a single line.
///
/// Values are raw 10-bit ADC readings in `0..=1023`, but nothing is clamped:
/// out-of-range values are kept as sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sample {
    pub brake: i32,
    pub throttle: i32,
}

impl Sample {
    pub fn new(brake: i32, throttle: i32) -> Self {
        Self { brake, throttle }
    }

    /// Render the sample in wire format (without the line terminator).
    pub fn to_line(&self) -> String {
        format!("{}\t{}", self.brake, self.throttle)
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "brake={} throttle={}", self.brake, self.throttle)
    }
}

/// Which token of a record failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Brake,
    Throttle,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Brake => f.write_str("brake"),
            Field::Throttle => f.write_str("throttle"),
        }
    }
}

/// Reasons a received line is not a valid sample.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty line")]
    Empty,
    #[error("line is not valid UTF-8")]
    InvalidUtf8,
    #[error("no tab delimiter in {0:?}")]
    MissingDelimiter(String),
    #[error("expected 2 tab-separated fields, got {0}")]
    FieldCount(usize),
    #[error("{field} value {value:?} is not an integer")]
    InvalidNumber { field: Field, value: String },
}

/// Offending text kept in a [`ParseError`] is cut to this many characters.
const MAX_EXCERPT: usize = 32;

fn excerpt(text: &str) -> String {
    text.chars().take(MAX_EXCERPT).collect()
}

/// Decode raw line bytes and parse them as a sample.
pub fn parse_bytes(raw: &[u8]) -> Result<Sample, ParseError> {
    let text = std::str::from_utf8(raw).map_err(|_| ParseError::InvalidUtf8)?;
    parse_line(text)
}

/// Parse a single line of text into a [`Sample`].
///
/// Surrounding whitespace (including the `\r\n` terminator) is ignored. The
/// line must split on `\t` into exactly two integer tokens.
pub fn parse_line(line: &str) -> Result<Sample, ParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(ParseError::Empty);
    }
    let mut parts = line.split('\t');
    let (brake, throttle) = match (parts.next(), parts.next()) {
        (Some(b), Some(t)) => (b, t),
        _ => return Err(ParseError::MissingDelimiter(excerpt(line))),
    };
    let extra = parts.count();
    if extra > 0 {
        return Err(ParseError::FieldCount(2 + extra));
    }
    Ok(Sample {
        brake: parse_field(brake, Field::Brake)?,
        throttle: parse_field(throttle, Field::Throttle)?,
    })
}

fn parse_field(token: &str, field: Field) -> Result<i32, ParseError> {
    token
        .trim()
        .parse::<i32>()
        .map_err(|_| ParseError::InvalidNumber {
            field,
            value: excerpt(token),
        })
}

impl FromStr for Sample {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_line(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_crlf_terminated_line() {
        assert_eq!(parse_line("579\t804\r\n"), Ok(Sample::new(579, 804)));
    }

    #[test]
    fn accepts_out_of_range_and_negative_values() {
        assert_eq!(parse_line("-5\t4096"), Ok(Sample::new(-5, 4096)));
    }

    #[test]
    fn rejects_three_fields() {
        assert_eq!(parse_line("1\t2\t3"), Err(ParseError::FieldCount(3)));
    }

    #[test]
    fn trailing_tab_is_trimmed_away() {
        // Whitespace trimming eats a dangling tab, leaving no delimiter.
        assert_eq!(parse_line("\t"), Err(ParseError::Empty));
        assert_eq!(
            parse_line("12\t\r\n"),
            Err(ParseError::MissingDelimiter("12".to_string()))
        );
    }

    #[test]
    fn reports_which_field_failed() {
        assert!(matches!(
            parse_line("12\tX"),
            Err(ParseError::InvalidNumber { field: Field::Throttle, .. })
        ));
        assert!(matches!(
            parse_line("x\t12"),
            Err(ParseError::InvalidNumber { field: Field::Brake, .. })
        ));
    }

    #[test]
    fn error_text_is_cut_short() {
        let noise = "x".repeat(10_000);
        match parse_line(&noise) {
            Err(ParseError::MissingDelimiter(text)) => assert_eq!(text.len(), MAX_EXCERPT),
            other => panic!("unexpected {other:?}"),
        }
        match parse_line(&format!("1\t{noise}")) {
            Err(ParseError::InvalidNumber { value, .. }) => assert_eq!(value.len(), MAX_EXCERPT),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn rejects_invalid_utf8() {
        assert_eq!(parse_bytes(&[0xff, b'\t', b'1']), Err(ParseError::InvalidUtf8));
    }

    #[test]
    fn wire_format_parses_back() {
        let line = Sample::new(7, 8).to_line();
        assert_eq!(line, "7\t8");
        assert_eq!(line.parse::<Sample>(), Ok(Sample::new(7, 8)));
    }
}
