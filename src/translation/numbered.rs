/*!
 * Numbered-line protocol for chat completion batches.
 *
 * A batch is sent as one prompt enumerating the strings as `index: text`
 * lines, and the model is asked to answer in the same shape. The answer is
 * free-form text, so parsing is best effort: every line that cannot be tied
 * to exactly one index of the batch is logged and dropped, and every index
 * without a usable line ends up as a failure marker (`None`).
 */

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::LineParseError;

/// `3: text`, also accepting markdown emphasis around the index and the
/// full-width colon some models emit when answering in CJK languages
static LINE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\**\s*(\d+)\s*\**\s*[:：]\s?(.*)$").unwrap());

/// Openings that mean the model declined instead of translating
const REFUSAL_PREFIXES: &[&str] = &[
    "the provided text does not seem to be",
    "the provided text doesn't seem to be",
    "i'm sorry",
    "i am sorry",
    "sorry, i can",
    "i cannot translate",
    "i can't translate",
    "as an ai",
];

/// Whether a model answer is a refusal rather than a translation
pub fn is_refusal(text: &str) -> bool {
    let lowered = text.trim_start().to_lowercase();
    REFUSAL_PREFIXES.iter().any(|prefix| lowered.starts_with(prefix))
}

/// Keep a multi-line source string on one prompt line
///
/// Backslashes are doubled before `\n` and `\r` are written, so a literal
/// `\n` in the source never comes back as a line break.
pub fn escape_line_breaks(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Reverse [`escape_line_breaks`]; unknown escapes are kept verbatim
pub fn unescape_line_breaks(text: &str) -> String {
    let mut unescaped = String::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            unescaped.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => unescaped.push('\n'),
            Some('r') => unescaped.push('\r'),
            Some('\\') => unescaped.push('\\'),
            Some(other) => {
                unescaped.push('\\');
                unescaped.push(other);
            }
            None => unescaped.push('\\'),
        }
    }

    unescaped
}

// Answers are only unescaped when escaping changed the source
fn needs_escaping(text: &str) -> bool {
    text.contains(['\\', '\n', '\r'])
}

/// Prompt for a single string
pub fn build_single_prompt(text: &str, source_name: &str, target_name: &str) -> String {
    format!(
        "Translate the following text from {} into {}. \
         Only respond with the translated text, without any explanations or notes: {}",
        source_name, target_name, text
    )
}

/// Prompt enumerating a whole batch as `index: text` lines
pub fn build_batch_prompt(texts: &[String], source_name: &str, target_name: &str) -> String {
    let mut prompt = format!(
        "Translate the following texts from {} into {}. \
         Use the format 'Index: Text' for each segment, keep every index unchanged, \
         answer with exactly one line per index and keep any \\n, \\r and \\\\ sequences as they are:\n\n",
        source_name, target_name
    );

    for (index, text) in texts.iter().enumerate() {
        prompt.push_str(&format!("{}: {}\n", index, escape_line_breaks(text)));
    }

    prompt
}

/// Split one response line into its index and text
pub fn parse_line(line: &str, batch_len: usize) -> Result<(usize, String), LineParseError> {
    let captures = match LINE_PATTERN.captures(line) {
        Some(captures) => captures,
        None if line.contains(':') || line.contains('：') => {
            return Err(LineParseError::InvalidIndex(line.to_string()));
        }
        None => return Err(LineParseError::MissingSeparator(line.to_string())),
    };

    let index = captures[1]
        .parse::<usize>()
        .map_err(|_| LineParseError::InvalidIndex(line.to_string()))?;

    if index >= batch_len {
        return Err(LineParseError::OutOfRange { index, batch_len });
    }

    Ok((index, captures[2].trim().to_string()))
}

/// Turn a raw completion into one slot per source string
///
/// The result always has `sources.len()` elements.
pub fn parse_batch_response(raw: &str, sources: &[String]) -> Vec<Option<String>> {
    let mut slots: Vec<Option<String>> = vec![None; sources.len()];
    let mut seen = vec![false; sources.len()];

    for line in raw.lines() {
        if line.trim().is_empty() || line.trim_start().starts_with("```") {
            continue;
        }

        let (index, translation) = match parse_line(line, sources.len()) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Error parsing line: {}", e);
                continue;
            }
        };

        if seen[index] {
            warn!("Duplicate line for index {}, keeping the first one", index);
            continue;
        }
        seen[index] = true;

        if translation.is_empty() || is_refusal(&translation) {
            warn!("No valid translation found for index {}", index);
            continue;
        }

        slots[index] = Some(if needs_escaping(&sources[index]) {
            unescape_line_breaks(&translation)
        } else {
            translation
        });
    }

    let missing = slots.iter().filter(|slot| slot.is_none()).count();
    if missing > 0 {
        debug!("{} of {} batch items have no usable translation", missing, sources.len());
    }

    slots
}
