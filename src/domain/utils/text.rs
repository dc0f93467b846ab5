/// First `max_chars` characters of `text`, never splitting a UTF-8 sequence.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Lower-cases `text` and replaces spaces with dashes, keeping at most `max_chars` characters.
pub fn slug(text: &str, max_chars: usize) -> String {
    truncate_chars(&text.to_lowercase().replace(' ', "-"), max_chars)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo wörld", 7), "héllo w");
        assert_eq!(truncate_chars("ab", 10), "ab");
    }

    #[test]
    fn test_slug() {
        assert_eq!(slug("Process Customer Feedback and send", 20), "process-customer-fee");
    }
}
