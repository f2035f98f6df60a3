use std::iter;

use phf::phf_map;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use deunicode::deunicode_char;

/// Letters NFKD leaves alone (ligatures, stroked letters) plus typographic
/// apostrophes and dashes found in pasted names.
const TRANSLITERATION_MAP: phf::Map<char, &'static str> = phf_map! {
    'ß' => "ss", 'ẞ' => "SS",
    'æ' => "ae", 'Æ' => "AE",
    'œ' => "oe", 'Œ' => "OE",
    'ø' => "o", 'Ø' => "O",
    'đ' => "d", 'Đ' => "D",
    'ð' => "d", 'Ð' => "D",
    'ł' => "l", 'Ł' => "L",
    'þ' => "th", 'Þ' => "TH",
    'ı' => "i",
    'ħ' => "h", 'Ħ' => "H",
    '‘' => "'",
    '’' => "'",
    'ʼ' => "'",
    '–' => "-",
    '—' => "-",
    '‑' => "-",
};

/// Transliterates `input` to ASCII.
///
/// Latin letters lose their diacritics through NFKD. Letters NFKD cannot
/// reduce (Cyrillic, Greek, Han, ...) go through the `deunicode` tables, so
/// "Иван" becomes "Ivan". Characters with no rendering at all are dropped.
pub fn transliterate(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        if ch.is_ascii() {
            out.push(ch);
        } else if let Some(repl) = TRANSLITERATION_MAP.get(&ch) {
            out.push_str(repl);
        } else {
            let decomposed: String = iter::once(ch)
                .nfkd()
                .filter(|d| d.is_ascii() && !is_combining_mark(*d))
                .collect();
            if decomposed.is_empty() {
                out.push_str(deunicode_char(ch).unwrap_or_default());
            } else {
                out.push_str(&decomposed);
            }
        }
    }
    out
}

/// Name token as used in generated local parts: ASCII, lower-case, with no
/// whitespace (syllabic scripts transliterate to several words).
pub(crate) fn normalize_token(token: &str) -> String {
    transliterate(token)
        .to_ascii_lowercase()
        .split_whitespace()
        .collect()
}
