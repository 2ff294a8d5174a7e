//! Position-preserving word extraction for French text.
//!
//! Words are maximal runs of Latin letters, with three exceptions learned
//! from the lexicon and from French orthography:
//!
//! - multi-word compounds listed in the lexicon (`tout à fait`) come out as
//!   one token, matched longest-first up to five words;
//! - hyphen/apostrophe compounds listed in the lexicon (`aujourd'hui`,
//!   `peut-être`) are kept whole; unknown ones split at the punctuation;
//! - numbers keep their French thousand separators (space) and decimal
//!   comma (`8 000`, `41,195`, `1 234 567,89`), and an uppercase letter run
//!   followed by digits is kept as one alphanumeric acronym (`COVID19`).
//!
//! All offsets are byte offsets into the original text; for every token,
//! `text[start..end]` is the matched slice except for space compounds, whose
//! `word` normalizes internal whitespace to single spaces.

use std::sync::LazyLock;

use regex::Regex;

use crate::lexicon::Lexicon;

/// Shape of a number with optional thousand groups and one decimal part.
static NUMBER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(?: \d+)*(?:,\d+)?$").expect("valid regex"));

/// Longest space compound attempted, in words.
const MAX_COMPOUND_WORDS: usize = 5;

/// One extracted word with its byte span in the original text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The word as written (casing preserved).
    pub word: String,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

/// Whether a character is a Latin letter as used in French.
///
/// Accepts ASCII letters and the Latin-1/Extended-A/B accent ranges;
/// excludes other scripts entirely.
pub fn is_latin_letter(c: char) -> bool {
    let code = c as u32;
    c.is_alphabetic() && code >= 0x0041 && code <= 0x024F
}

/// Extract all words from `text` with their byte positions.
#[tracing::instrument(skip_all, fields(text_len = text.len()))]
pub fn extract_tokens(text: &str, lexicon: &Lexicon) -> Vec<Token> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let byte_at = |i: usize| chars.get(i).map_or(text.len(), |(b, _)| *b);

    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        // Skip separators
        while i < chars.len() && !is_latin_letter(chars[i].1) && !chars[i].1.is_ascii_digit() {
            i += 1;
        }
        if i >= chars.len() {
            break;
        }

        if is_latin_letter(chars[i].1) {
            if let Some((word, next)) = match_space_compound(&chars, i, lexicon) {
                tokens.push(Token {
                    word,
                    start: byte_at(i),
                    end: byte_at(next),
                });
                i = next;
                continue;
            }

            // Letters plus hyphen/apostrophe, checked against the lexicon
            let compound_end = scan_compound(&chars, i);
            let candidate = &text[byte_at(i)..byte_at(compound_end)];
            if lexicon.contains_form(candidate) {
                tokens.push(Token {
                    word: candidate.to_string(),
                    start: byte_at(i),
                    end: byte_at(compound_end),
                });
                i = compound_end;
                continue;
            }

            // Plain letter run, possibly extended into an alphanumeric acronym
            let mut j = i;
            let mut has_uppercase = false;
            while j < chars.len() && is_latin_letter(chars[j].1) {
                if chars[j].1.is_uppercase() {
                    has_uppercase = true;
                }
                j += 1;
            }
            if has_uppercase && j < chars.len() && chars[j].1.is_ascii_digit() {
                while j < chars.len() && (is_latin_letter(chars[j].1) || chars[j].1.is_ascii_digit())
                {
                    j += 1;
                }
            }
            tokens.push(Token {
                word: text[byte_at(i)..byte_at(j)].to_string(),
                start: byte_at(i),
                end: byte_at(j),
            });
            i = j;
        } else {
            // Digit run, possibly with thousand/decimal separators
            let mut j = i;
            while j < chars.len()
                && (chars[j].1.is_ascii_digit() || chars[j].1 == ' ' || chars[j].1 == ',')
            {
                j += 1;
            }
            // Trim trailing separators so the span covers digits only
            let mut end = j;
            while end > i && !chars[end - 1].1.is_ascii_digit() {
                end -= 1;
            }
            let candidate = &text[byte_at(i)..byte_at(end)];
            if NUMBER_PATTERN.is_match(candidate) {
                tokens.push(Token {
                    word: candidate.to_string(),
                    start: byte_at(i),
                    end: byte_at(end),
                });
                i = j;
            } else {
                let mut k = i;
                while k < chars.len() && chars[k].1.is_ascii_digit() {
                    k += 1;
                }
                tokens.push(Token {
                    word: text[byte_at(i)..byte_at(k)].to_string(),
                    start: byte_at(i),
                    end: byte_at(k),
                });
                i = k;
            }
        }
    }

    tokens
}

/// Scan a run of letters, hyphens and apostrophes starting at `i`.
fn scan_compound(chars: &[(usize, char)], i: usize) -> usize {
    let mut j = i;
    while j < chars.len() && (is_latin_letter(chars[j].1) || matches!(chars[j].1, '-' | '\'')) {
        j += 1;
    }
    j
}

/// Try to match the longest known space compound starting at `i`.
///
/// Returns the normalized compound (single spaces) and the char index one
/// past its last word. Tested longest-first so `à peu près` beats `à peu`.
fn match_space_compound(
    chars: &[(usize, char)],
    i: usize,
    lexicon: &Lexicon,
) -> Option<(String, usize)> {
    let compounds = lexicon.compounds_with_spaces();
    if compounds.is_empty() {
        return None;
    }

    for n_words in (2..=MAX_COMPOUND_WORDS).rev() {
        let mut pos = i;
        let mut words: Vec<String> = Vec::with_capacity(n_words);

        for _ in 0..n_words {
            while pos < chars.len() && chars[pos].1.is_whitespace() {
                pos += 1;
            }
            if pos >= chars.len() || !is_latin_letter(chars[pos].1) {
                break;
            }
            let word_end = scan_compound(chars, pos);
            words.push(chars[pos..word_end].iter().map(|(_, c)| *c).collect());
            pos = word_end;
        }

        if words.len() == n_words {
            let compound = words.join(" ");
            if compounds.contains(&compound.to_lowercase()) {
                return Some((compound, pos));
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::entry;

    fn empty_lexicon() -> Lexicon {
        Lexicon::from_entries([])
    }

    fn words_of(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.word.as_str()).collect()
    }

    #[test]
    fn basic_words_with_positions() {
        let text = "Le chat dort.";
        let tokens = extract_tokens(text, &empty_lexicon());
        assert_eq!(words_of(&tokens), vec!["Le", "chat", "dort"]);
        assert_eq!(tokens[1].start, 3);
        assert_eq!(tokens[1].end, 7);
    }

    #[test]
    fn spans_round_trip_through_the_text() {
        let text = "Voici un tout petit récit, très bref.";
        for token in extract_tokens(text, &empty_lexicon()) {
            assert_eq!(&text[token.start..token.end], token.word);
        }
    }

    #[test]
    fn accented_letters_stay_in_words() {
        let tokens = extract_tokens("été cœur naïve", &empty_lexicon());
        assert_eq!(words_of(&tokens), vec!["été", "cœur", "naïve"]);
    }

    #[test]
    fn non_latin_scripts_are_separators() {
        let tokens = extract_tokens("mot文字mot", &empty_lexicon());
        assert_eq!(words_of(&tokens), vec!["mot", "mot"]);
    }

    #[test]
    fn apostrophe_compound_kept_when_known() {
        let lexicon = Lexicon::from_entries([entry(
            "aujourd'hui",
            "aujourd'hui",
            "ADV",
            540.0,
            true,
        )]);
        let tokens = extract_tokens("Aujourd'hui il pleut.", &lexicon);
        assert_eq!(tokens[0].word, "Aujourd'hui");
    }

    #[test]
    fn apostrophe_splits_when_unknown() {
        let tokens = extract_tokens("l'arbre", &empty_lexicon());
        assert_eq!(words_of(&tokens), vec!["l", "arbre"]);
    }

    #[test]
    fn hyphen_compound_kept_when_known() {
        let lexicon = Lexicon::from_entries([entry("peut-être", "peut-être", "ADV", 433.0, true)]);
        let tokens = extract_tokens("C'est peut-être vrai.", &lexicon);
        assert!(tokens.iter().any(|t| t.word == "peut-être"));
    }

    #[test]
    fn hyphen_splits_when_unknown() {
        let tokens = extract_tokens("porte-clefs", &empty_lexicon());
        assert_eq!(words_of(&tokens), vec!["porte", "clefs"]);
    }

    #[test]
    fn space_compound_longest_match() {
        let lexicon = Lexicon::from_entries([
            entry("tout à fait", "tout à fait", "ADV", 100.0, true),
            entry("tout à", "tout à", "ADV", 1.0, true),
        ]);
        let tokens = extract_tokens("C'est tout à fait vrai.", &lexicon);
        assert!(tokens.iter().any(|t| t.word == "tout à fait"));
        assert!(!tokens.iter().any(|t| t.word == "tout à"));
    }

    #[test]
    fn space_compound_span_covers_original_text() {
        let lexicon =
            Lexicon::from_entries([entry("tout à fait", "tout à fait", "ADV", 100.0, true)]);
        let text = "tout à fait";
        let tokens = extract_tokens(text, &lexicon);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].start, 0);
        assert_eq!(tokens[0].end, text.len());
    }

    #[test]
    fn numbers_with_separators() {
        let tokens = extract_tokens("environ 8 000 mots et 41,195 km", &empty_lexicon());
        let words = words_of(&tokens);
        assert!(words.contains(&"8 000"));
        assert!(words.contains(&"41,195"));
    }

    #[test]
    fn number_with_thousands_and_decimal() {
        let tokens = extract_tokens("total: 1 234 567,89 euros", &empty_lexicon());
        assert!(tokens.iter().any(|t| t.word == "1 234 567,89"));
    }

    #[test]
    fn plain_digits_when_separators_invalid() {
        // Trailing comma is punctuation, not a decimal separator
        let tokens = extract_tokens("en 2024, tout va", &empty_lexicon());
        assert!(tokens.iter().any(|t| t.word == "2024"));
    }

    #[test]
    fn alphanumeric_acronym_kept_whole() {
        let tokens = extract_tokens("Les cas de COVID19 et H1N1.", &empty_lexicon());
        let words = words_of(&tokens);
        assert!(words.contains(&"COVID19"));
        assert!(words.contains(&"H1N1"));
    }

    #[test]
    fn lowercase_word_before_digits_does_not_merge() {
        let tokens = extract_tokens("page3", &empty_lexicon());
        assert_eq!(words_of(&tokens), vec!["page", "3"]);
    }

    #[test]
    fn empty_text_yields_no_tokens() {
        assert!(extract_tokens("", &empty_lexicon()).is_empty());
        assert!(extract_tokens("  …  ", &empty_lexicon()).is_empty());
    }
}
