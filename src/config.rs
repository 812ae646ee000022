//! Parser limits.

/// Limits applied while parsing a query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    /// Maximum nesting of `$expand` inside expand item options.
    pub max_expand_depth: usize,

    /// Maximum length in bytes of a raw query string.
    pub max_query_length: usize,

    /// Maximum nesting of parentheses, `not` and method calls in `$filter`,
    /// `$orderby` and `$search`.
    pub max_expression_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_expand_depth: 16,
            max_query_length: 8 * 1024,
            max_expression_depth: 32,
        }
    }
}

impl ParserConfig {
    /// Sets the maximum `$expand` nesting depth.
    pub fn with_max_expand_depth(mut self, depth: usize) -> Self {
        self.max_expand_depth = depth;
        self
    }

    /// Sets the maximum raw query length.
    pub fn with_max_query_length(mut self, length: usize) -> Self {
        self.max_query_length = length;
        self
    }

    /// Sets the maximum expression nesting depth.
    pub fn with_max_expression_depth(mut self, depth: usize) -> Self {
        self.max_expression_depth = depth;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_setters() {
        let config = ParserConfig::default();
        assert_eq!(config.max_expand_depth, 16);
        assert_eq!(config.max_query_length, 8192);
        assert_eq!(config.max_expression_depth, 32);

        let config = config
            .with_max_expand_depth(2)
            .with_max_query_length(64)
            .with_max_expression_depth(5);
        assert_eq!(config.max_expand_depth, 2);
        assert_eq!(config.max_query_length, 64);
        assert_eq!(config.max_expression_depth, 5);
    }
}
