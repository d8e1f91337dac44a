/// Reviews with at least this many words count as elaborate.
pub const ELABORATE_MIN_WORDS: usize = 50;

// C `isspace` in the "C" locale; note \x0b is not covered by `char::is_ascii_whitespace`.
fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0b' | '\x0c' | '\r')
}

/// Number of maximal runs of non-whitespace characters in `text`.
pub fn word_count(text: &str) -> usize {
    text.split(is_space).filter(|word| !word.is_empty()).count()
}

pub fn is_elaborate(text: &str, min_words: usize) -> bool {
    word_count(text) >= min_words
}
