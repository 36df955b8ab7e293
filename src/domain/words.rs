//! Word counting shared by quota checks and the usage ledger

/// Number of whitespace-separated tokens in `text`
pub fn word_count(text: &str) -> u32 {
    u32::try_from(text.split_whitespace().count()).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_count() {
        assert_eq!(word_count("hello world"), 2);
        assert_eq!(word_count("  leading and   trailing  "), 3);
        assert_eq!(word_count("line\nbreaks\tand tabs"), 4);
    }

    #[test]
    fn test_blank_text_has_no_words() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("   \n\t "), 0);
    }
}
