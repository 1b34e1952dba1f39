//! Street-name cleansing.
//!
//! Milan street names arrive with every casing imaginable (`VIA ROMA`,
//! `via paolo sarpi`, `Corso Buenos Aires`). Only names whose leading word is a
//! known street type are touched, so proper nouns that merely look like
//! addresses keep their original spelling.

use std::sync::LazyLock;

use regex::Regex;

/// Leading words that mark a string as an Italian street name.
pub const STREET_TYPES: [&str; 15] = [
    "alzaia", "bastioni", "corso", "foro", "galleria",
    "largo", "passaggio", "piazza", "piazzale", "piazzetta",
    "ripa", "strada", "via", "viale", "vicolo",
];

/// Connector words kept lower-case unless they open or close the title.
const SMALL_WORDS: [&str; 21] = [
    "a", "an", "and", "as", "at", "but", "by", "en", "for", "if", "in",
    "of", "on", "or", "the", "to", "v", "v.", "via", "vs", "vs.",
];

static LEADING_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\w+").expect("static regex"));

/// Title-cases `street` if its first word is a street type, otherwise returns it unchanged.
pub fn fix_street(street: &str) -> String {
    match LEADING_WORD.find(street) {
        Some(word) if is_street_type(word.as_str()) => titlecase(street),
        _ => street.to_string(),
    }
}

fn is_street_type(word: &str) -> bool {
    let word = word.to_lowercase();
    STREET_TYPES.contains(&word.as_str())
}

/// English title-casing with small-word awareness.
pub fn titlecase(text: &str) -> String {
    let all_caps = !text.chars().any(char::is_lowercase);
    let mut words: Vec<String> = text
        .split(char::is_whitespace)
        .map(|word| titlecase_word(word, all_caps))
        .collect();

    if let Some(first) = words.first_mut() {
        *first = capitalize_small_first(first);
    }
    if let Some(last) = words.last_mut() {
        *last = capitalize_small_last(last);
    }
    words.join(" ")
}

fn titlecase_word(word: &str, all_caps: bool) -> String {
    if word.is_empty() {
        return String::new();
    }
    if all_caps && is_initials(word) {
        return word.to_string();
    }
    if let Some(word) = apostrophe_second(word) {
        return word;
    }
    if has_inline_period(word) || (!all_caps && has_inner_uppercase(word)) {
        return word.to_string();
    }
    if is_small_word(word) {
        return word.to_lowercase();
    }
    if word.contains('/') && !word.contains("//") {
        return word
            .split('/')
            .map(|part| titlecase_word(part, all_caps))
            .collect::<Vec<_>>()
            .join("/");
    }
    if word.contains('-') {
        return word
            .split('-')
            .map(|part| titlecase_word(part, all_caps))
            .collect::<Vec<_>>()
            .join("-");
    }

    if let Some(rest) = strip_mc(word) {
        return format!("Mc{}", titlecase(rest));
    }
    if all_caps {
        return capitalize_first_letter(&word.to_lowercase());
    }
    capitalize_first_letter(word)
}

/// `A.` or `A.B.` style initials.
fn is_initials(word: &str) -> bool {
    let bytes = word.as_bytes();
    !bytes.is_empty()
        && bytes.len() % 2 == 0
        && bytes
            .chunks(2)
            .all(|pair| pair[0].is_ascii_uppercase() && pair[1] == b'.')
}

/// `d'angelo` -> `d'Angelo`, `o'neil` -> `O'Neil`.
fn apostrophe_second(word: &str) -> Option<String> {
    let mut chars = word.chars();
    let first = chars.next()?;
    let apostrophe = chars.next()?;
    let rest: String = chars.collect();
    if !matches!(first.to_ascii_lowercase(), 'd' | 'o' | 'l')
        || !matches!(apostrophe, '\'' | '\u{2018}')
        || !is_apostrophe_tail(&rest)
    {
        return None;
    }
    let first = match first.to_ascii_lowercase() {
        'o' => 'O',
        other => other,
    };
    Some(format!("{first}{apostrophe}{}", capitalize_first_letter(&rest)))
}

fn is_apostrophe_tail(rest: &str) -> bool {
    let letters = rest
        .strip_suffix("'s")
        .or_else(|| rest.strip_suffix("ss"))
        .or_else(|| rest.strip_suffix("''"))
        .or_else(|| rest.strip_suffix("s'"))
        .filter(|letters| !letters.is_empty())
        .unwrap_or(rest);
    !letters.is_empty() && letters.chars().all(|c| c.is_ascii_alphabetic())
}

fn has_inline_period(word: &str) -> bool {
    let chars: Vec<char> = word.chars().collect();
    chars
        .windows(3)
        .any(|w| is_word_char(w[0]) && w[1] == '.' && is_word_char(w[2]))
}

/// Any ASCII upper-case letter after the first letter of the word, e.g. `McDonald`.
fn has_inner_uppercase(word: &str) -> bool {
    let letters: String = word
        .trim_start_matches(is_punctuation)
        .chars()
        .take_while(char::is_ascii_alphabetic)
        .collect();
    letters.chars().skip(1).any(|c| c.is_ascii_uppercase())
}

fn is_small_word(word: &str) -> bool {
    let word = word.to_lowercase();
    SMALL_WORDS.contains(&word.as_str())
}

fn strip_mc(word: &str) -> Option<&str> {
    let rest = ["Mc", "mc", "MC"]
        .iter()
        .find_map(|prefix| word.strip_prefix(prefix))?;
    let mut chars = rest.chars();
    match (chars.next(), chars.next()) {
        (Some(c), Some(_)) if is_word_char(c) => Some(rest),
        _ => None,
    }
}

/// Upper-cases the first ASCII letter following any leading punctuation.
fn capitalize_first_letter(word: &str) -> String {
    let start = word.len() - word.trim_start_matches(is_punctuation).len();
    let (lead, rest) = word.split_at(start);
    let mut chars = rest.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {
            format!("{lead}{}{}", c.to_ascii_uppercase(), chars.as_str())
        }
        _ => word.to_string(),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(c) => format!("{}{}", c.to_uppercase(), chars.as_str().to_lowercase()),
        None => String::new(),
    }
}

fn capitalize_small_first(word: &str) -> String {
    let start = word.len() - word.trim_start_matches(is_punctuation).len();
    let (lead, rest) = word.split_at(start);
    let end = rest.find(|c: char| !is_word_char(c)).unwrap_or(rest.len());
    let (core, tail) = rest.split_at(end);
    if is_small_word(core) {
        format!("{lead}{}{tail}", capitalize(core))
    } else {
        word.to_string()
    }
}

/// Capitalizes a small word ending the title, allowing one trailing
/// punctuation mark, even when it follows a hyphen (`roma-in` -> `roma-In`).
fn capitalize_small_last(word: &str) -> String {
    let body = match word.chars().last() {
        Some(c) if is_punctuation(c) => &word[..word.len() - c.len_utf8()],
        _ => word,
    };
    let start = body
        .char_indices()
        .rev()
        .take_while(|(_, c)| is_word_char(*c))
        .last()
        .map_or(body.len(), |(i, _)| i);
    let core = &body[start..];
    if is_small_word(core) {
        format!("{}{}{}", &word[..start], capitalize(core), &word[body.len()..])
    } else {
        word.to_string()
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_punctuation(c: char) -> bool {
    c.is_ascii_punctuation() || matches!(c, '\u{2018}' | '\u{2013}' | '\u{2012}' | '\u{2014}' | '\u{2015}')
}
