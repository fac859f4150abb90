//! Text normalization and Hangul initial-consonant (chosung) matching.

use once_cell::sync::Lazy;
use regex::Regex;

static HTML_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]+>").expect("valid regex"));
static INSECURE_SCHEME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^http://").expect("valid regex"));

const HANGUL_SYLLABLE_FIRST: u32 = 0xAC00;
const HANGUL_SYLLABLE_LAST: u32 = 0xD7A3;
/// Codepoints per leading consonant: 21 medial vowels x 28 finals.
const SYLLABLES_PER_INITIAL: u32 = 588;

/// Leading consonants in Unicode syllable order (compatibility jamo).
pub const INITIALS: [char; 19] = [
    'ㄱ', 'ㄲ', 'ㄴ', 'ㄷ', 'ㄸ', 'ㄹ', 'ㅁ', 'ㅂ', 'ㅃ', 'ㅅ', 'ㅆ', 'ㅇ', 'ㅈ', 'ㅉ', 'ㅊ', 'ㅋ',
    'ㅌ', 'ㅍ', 'ㅎ',
];

/// Lower-cases and trims. Used for every equality and containment comparison.
pub fn normalize_text(s: &str) -> String {
    s.trim().to_lowercase()
}

fn is_initial(ch: char) -> bool {
    INITIALS.contains(&ch)
}

/// Reduces `s` to its phonetic skeleton of leading consonants.
///
/// Hangul syllables contribute their leading consonant, bare consonants from
/// [`INITIALS`] pass through, everything else is dropped.
pub fn initials(s: &str) -> String {
    s.chars()
        .filter_map(|ch| {
            let code = ch as u32;
            if (HANGUL_SYLLABLE_FIRST..=HANGUL_SYLLABLE_LAST).contains(&code) {
                let idx = ((code - HANGUL_SYLLABLE_FIRST) / SYLLABLES_PER_INITIAL) as usize;
                INITIALS.get(idx).copied()
            } else if is_initial(ch) {
                Some(ch)
            } else {
                None
            }
        })
        .collect()
}

/// True when the query, ignoring whitespace, is made only of leading consonants.
pub fn is_initials_only_query(q: &str) -> bool {
    let mut chars = q.chars().filter(|c| !c.is_whitespace()).peekable();
    chars.peek().is_some() && chars.all(is_initial)
}

/// Removes all whitespace, keeping the remaining characters in order.
pub fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Removes markup tags such as the `<b>` highlighting some providers inject.
pub fn strip_html(s: &str) -> String {
    HTML_TAG_RE.replace_all(s, "").into_owned()
}

/// Decodes the handful of character entities book APIs actually emit.
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// Markup-free, entity-decoded, trimmed text.
pub fn plain_text(s: &str) -> String {
    decode_entities(&strip_html(s)).trim().to_string()
}

/// Rewrites `http://` and protocol-relative URLs to `https://`. Empty stays empty.
pub fn to_https(url: &str) -> String {
    let url = url.trim();
    if url.is_empty() {
        return String::new();
    }
    if let Some(rest) = url.strip_prefix("//") {
        return format!("https://{rest}");
    }
    INSECURE_SCHEME_RE.replace(url, "https://").into_owned()
}

/// Year from the first four characters of a date string, `0` when unparsable.
///
/// Mirrors `parseInt` on the prefix: leading digits count, so `"19"` is 19.
pub fn parse_year(date: &str) -> u32 {
    let digits: String = date
        .trim()
        .chars()
        .take(4)
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().unwrap_or(0)
}
