//! Token counting
//!
//! Uses tiktoken's cl100k_base encoding. Gemini tokenizes differently, so
//! counts are an estimate; they only drive transcript windowing.

use std::sync::LazyLock;
use tiktoken_rs::{cl100k_base, CoreBPE};

static TOKENIZER: LazyLock<CoreBPE> = LazyLock::new(|| {
    cl100k_base().expect("cl100k_base tokenizer is a compile-time constant and should never fail")
});

/// Overhead per rendered transcript line (speaker label, separator)
const LINE_OVERHEAD: usize = 4;

/// Token counter for estimating prompt size
#[derive(Clone, Copy, Debug)]
pub struct TokenCounter;

impl TokenCounter {
    /// Create a new token counter
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Count tokens in a string
    #[must_use]
    pub fn count_tokens(&self, text: &str) -> usize {
        TOKENIZER.encode_with_special_tokens(text).len()
    }

    /// Count tokens in one transcript line, including label overhead
    #[must_use]
    pub fn count_line_tokens(&self, line: &str) -> usize {
        self.count_tokens(line) + LINE_OVERHEAD
    }
}

impl Default for TokenCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Global token counter instance for convenience
pub static TOKEN_COUNTER: TokenCounter = TokenCounter::new();

/// Convenience function to count tokens in text
#[must_use]
pub fn count_tokens(text: &str) -> usize {
    TOKEN_COUNTER.count_tokens(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_tokens() {
        assert_eq!(count_tokens(""), 0);
        let short = count_tokens("Hello");
        let long = count_tokens("Hello, how are you managing your PCOS symptoms today?");
        assert!(short > 0);
        assert!(long > short);
    }

    #[test]
    fn test_line_overhead() {
        let counter = TokenCounter::new();
        let line = "PCOS_Specialist: hi";
        assert_eq!(
            counter.count_line_tokens(line),
            counter.count_tokens(line) + LINE_OVERHEAD
        );
    }
}
