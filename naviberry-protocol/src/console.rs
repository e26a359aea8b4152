//! Companion console line protocol (inbound direction)
//!
//! The companion computer can replace the two display text fields shown by
//! the head unit. It sends NUL-terminated lines of the form
//!
//! ```text
//! LCD_A:AAAAAAAA\0
//! LCD_B:BBBBBBBB\0
//! ```
//!
//! a 6-byte tag followed by exactly 8 payload bytes. Lines shorter than 14
//! bytes or with an unknown tag are ignored.

/// Length of a display text field in bytes
pub const FIELD_LEN: usize = 8;

/// Tag length ("LCD_A:")
const TAG_LEN: usize = 6;

/// Minimum meaningful line length (tag + field)
pub const MIN_LINE_LEN: usize = TAG_LEN + FIELD_LEN;

/// Maximum accepted line length; longer input is discarded up to the NUL
pub const MAX_LINE_LEN: usize = 20;

/// Which display text field a line addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayField {
    A,
    B,
}

impl DisplayField {
    /// Index into a two-field overlay buffer
    pub fn index(&self) -> usize {
        match self {
            DisplayField::A => 0,
            DisplayField::B => 1,
        }
    }
}

/// Parse one console line (without the terminating NUL)
///
/// Returns the addressed field and its new 8-byte content, or `None` for
/// anything that is not a well-formed field update.
pub fn parse_line(line: &[u8]) -> Option<(DisplayField, [u8; FIELD_LEN])> {
    if line.len() < MIN_LINE_LEN {
        return None;
    }

    let field = match &line[..TAG_LEN] {
        b"LCD_A:" => DisplayField::A,
        b"LCD_B:" => DisplayField::B,
        _ => return None,
    };

    let mut text = [0u8; FIELD_LEN];
    text.copy_from_slice(&line[TAG_LEN..TAG_LEN + FIELD_LEN]);
    Some((field, text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_a_line() {
        let (field, text) = parse_line(b"LCD_A:ABCDEFGH").unwrap();
        assert_eq!(field, DisplayField::A);
        assert_eq!(&text, b"ABCDEFGH");
    }

    #[test]
    fn test_field_b_line() {
        let (field, text) = parse_line(b"LCD_B:12345678").unwrap();
        assert_eq!(field, DisplayField::B);
        assert_eq!(&text, b"12345678");
    }

    #[test]
    fn test_short_line_ignored() {
        assert!(parse_line(b"LCD_A:ABC").is_none());
        assert!(parse_line(b"LCD_A:").is_none());
        assert!(parse_line(b"").is_none());
    }

    #[test]
    fn test_unknown_tag_ignored() {
        assert!(parse_line(b"LCD_C:ABCDEFGH").is_none());
        assert!(parse_line(b"HELLO:ABCDEFGH").is_none());
    }

    #[test]
    fn test_trailing_bytes_ignored() {
        // Anything past the 8 payload bytes is irrelevant
        let (field, text) = parse_line(b"LCD_A:ABCDEFGHtrailing").unwrap();
        assert_eq!(field, DisplayField::A);
        assert_eq!(&text, b"ABCDEFGH");
    }
}
