// File: src/core/text.rs

/// Splits ciphertext into uppercase analysis words. Whitespace separates
/// words; any other non-letter is dropped, so "don't" becomes "DONT".
pub fn cipher_words(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|chunk| {
            chunk
                .chars()
                .filter(char::is_ascii_alphabetic)
                .map(|c| c.to_ascii_uppercase())
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .collect()
}
