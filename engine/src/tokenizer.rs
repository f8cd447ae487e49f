use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    // Everything outside the indexable alphabet: ASCII word characters,
    // whitespace, and the Spanish accented vowels plus "ñ".
    static ref STRIP: Regex = Regex::new(r"[^a-z0-9_\sáéíóúñ]").expect("valid regex");
}

/// Tokenize text into index terms: NFC normalization, lowercase, strip
/// punctuation, split on whitespace runs, drop terms of length <= 2.
///
/// Order follows the original text; repeated words stay repeated.
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized = text.nfc().collect::<String>().to_lowercase();
    let stripped = STRIP.replace_all(&normalized, "");
    stripped
        .split_whitespace()
        .filter(|term| term.chars().count() > 2)
        .map(str::to_string)
        .collect()
}
