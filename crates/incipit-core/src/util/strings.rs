//! Character classes shared by the extractor and the injector.

pub const EM_DASH: char = '\u{2014}';
pub const NO_BREAK_HYPHEN: char = '\u{2011}';

pub const LEFT_DOUBLE_QUOTE: char = '\u{201C}';
pub const RIGHT_DOUBLE_QUOTE: char = '\u{201D}';
pub const LEFT_SINGLE_QUOTE: char = '\u{2018}';
pub const RIGHT_SINGLE_QUOTE: char = '\u{2019}';

/// Replace characters XML 1.0 cannot carry with U+FFFD.
pub fn make_valid_xml(s: &str) -> String {
    s.chars()
        .map(|c| if is_valid_xml_char(c) { c } else { '\u{FFFD}' })
        .collect()
}

fn is_valid_xml_char(c: char) -> bool {
    matches!(c,
        '\u{0009}' | '\u{000A}' | '\u{000D}' |
        '\u{0020}'..='\u{D7FF}' |
        '\u{E000}'..='\u{FFFD}' |
        '\u{10000}'..='\u{10FFFF}'
    )
}

/// Marks that can end a sentence when not followed by a letter or digit.
pub fn is_boundary_mark(c: char) -> bool {
    matches!(c, '.' | ':' | ';')
}

/// Punctuation trimmed from the end of the last incipit word.
pub fn is_terminal_punctuation(c: char) -> bool {
    matches!(c, '.' | ',' | ';' | ':' | '!' | '?')
}

pub fn is_closing_mark(c: char) -> bool {
    matches!(c, RIGHT_DOUBLE_QUOTE | RIGHT_SINGLE_QUOTE | '"' | '\'' | ')' | ']')
}

/// Characters attached to a citation marker that are skipped before the
/// backward scan begins.
pub fn is_reference_suffix(c: char) -> bool {
    c.is_whitespace() || is_terminal_punctuation(c) || is_closing_mark(c)
}

/// Strip trailing `.,;:!?` from a word. A word made only of punctuation is
/// returned as is.
pub fn trim_terminal_punctuation(word: &str) -> &str {
    match word.trim_end_matches(is_terminal_punctuation) {
        "" => word,
        trimmed => trimmed,
    }
}
