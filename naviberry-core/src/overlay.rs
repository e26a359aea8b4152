//! Display text overlay
//!
//! Two fixed 8-byte text fields that replace the head unit's tuner labels
//! while the TV source is active. The companion computer rewrites them over
//! the console; the dispatcher reads them when echoing display frames.

use naviberry_protocol::console::{DisplayField, FIELD_LEN};

/// Holder of the two overlay text fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayOverlay {
    fields: [[u8; FIELD_LEN]; 2],
}

impl Default for DisplayOverlay {
    /// Companion identity shown until the first console update arrives
    fn default() -> Self {
        Self {
            fields: [*b"RASPBERR", *b"Y 3B+   "],
        }
    }
}

impl DisplayOverlay {
    /// Replace one field's text
    pub fn set(&mut self, field: DisplayField, text: [u8; FIELD_LEN]) {
        self.fields[field.index()] = text;
    }

    /// Current text of one field
    pub fn field(&self, field: DisplayField) -> &[u8; FIELD_LEN] {
        &self.fields[field.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let overlay = DisplayOverlay::default();
        assert_eq!(overlay.field(DisplayField::A), b"RASPBERR");
        assert_eq!(overlay.field(DisplayField::B), b"Y 3B+   ");
    }

    #[test]
    fn test_set_field() {
        let mut overlay = DisplayOverlay::default();
        overlay.set(DisplayField::A, *b"ABCDEFGH");
        assert_eq!(overlay.field(DisplayField::A), b"ABCDEFGH");
        // Other field untouched
        assert_eq!(overlay.field(DisplayField::B), b"Y 3B+   ");
    }
}
