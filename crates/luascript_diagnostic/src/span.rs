//! Source location spans.
//!
//! A span is a byte-offset range into the original source text. It is
//! carried optionally on every IR node (`node.span`) and is required to be
//! numerically valid whenever present: `start <= end`.

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub fn new(start: u32, end: u32) -> Self {
        Span { start, end }
    }

    /// A span is valid iff its end is not before its start.
    pub fn is_valid(&self) -> bool {
        self.start <= self.end
    }

    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_span_ordering() {
        assert!(Span::new(0, 5).is_valid());
        assert!(Span::new(3, 3).is_valid());
        assert!(!Span::new(5, 3).is_valid());
    }

    #[test]
    fn len_reports_byte_width() {
        assert_eq!(Span::new(2, 9).len(), 7);
    }
}
