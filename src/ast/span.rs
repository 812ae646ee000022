//! Source span primitive.

use std::ops::Range;

/// A span representing a byte range in query option text.
/// This is the canonical span type used throughout the lexer and parsers.
pub type Span = Range<usize>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_basic_properties() {
        let span: Span = 5..10;
        assert_eq!(span.start, 5);
        assert_eq!(span.end, 10);
        assert_eq!(span.len(), 5);
    }

    #[test]
    fn span_empty() {
        let span: Span = 5..5;
        assert!(span.is_empty());
    }
}
