use lazy_regex::regex;
use log::trace;


/// Minimum length (in characters) of a word for it to contribute a letter.
const MIN_WORD_LENGTH: usize = 2;

/// Extract a password from a comma-separated list of phrases.
///
/// Each phrase contributes the first character of its leading word, case preserved.
/// A word is a run of letters, digits and underscores. Empty phrases, phrases that don't
/// start with a word character, and words shorter than two characters contribute nothing.
/// (e.g., "New Zealand, United Kingdom, A, B" results in "NU")
///
/// Returns `None` if no phrase contributed a letter.
pub fn extract_password(text: &str) -> Option<String> {
    let password = text
        .split(',')
        .filter_map(leading_word)
        .filter(|word| word.chars().count() >= MIN_WORD_LENGTH)
        .filter_map(|word| word.chars().next())
        .collect::<String>();
    trace!("Extracted {:?} from {:?}", password, text);

    if password.is_empty() {
        None
    } else {
        Some(password)
    }
}

/// The maximal run of word characters at the start of the trimmed segment, if any.
fn leading_word(segment: &str) -> Option<&str> {
    let segment = segment.trim_matches(is_separator_space);
    if segment.is_empty() {
        return None;
    }
    regex!(r"^[\p{L}\p{N}_]+").find(segment).map(|m| m.as_str())
}

/// Whitespace, including the ASCII file/group/record/unit separators.
fn is_separator_space(c: char) -> bool {
    c.is_whitespace() || ('\x1c'..='\x1f').contains(&c)
}
