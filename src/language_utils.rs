use isolang::Language;

/// Language utilities for ISO language code handling
///
/// Catalog headers carry locale names such as `pt_BR`, `de-AT` or `sr@latin`,
/// while the command line takes bare ISO 639-1 or ISO 639-2 codes. These
/// helpers reduce both to comparable ISO 639-2/T codes.

/// Outcome of comparing a catalog's declared language with the requested one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageCheck {
    /// The catalog does not declare a language
    Unknown,
    /// The declared language is the requested destination language
    Match,
    /// The catalog belongs to another language
    Mismatch { declared: String },
}

/// Map an ISO 639-2/B code to its ISO 639-2/T form
fn bibliographic_to_terminology(code: &str) -> &str {
    match code {
        "fre" => "fra",
        "ger" => "deu",
        "dut" => "nld",
        "gre" => "ell",
        "chi" => "zho",
        "cze" => "ces",
        "ice" => "isl",
        "alb" => "sqi",
        "arm" => "hye",
        "baq" => "eus",
        "bur" => "mya",
        "per" => "fas",
        "geo" => "kat",
        "may" => "msa",
        "mac" => "mkd",
        "rum" => "ron",
        "slo" => "slk",
        "wel" => "cym",
        other => other,
    }
}

/// Strip region, script and modifier parts from a locale name
///
/// `pt_BR` -> `pt`, `zh-Hant` -> `zh`, `sr@latin` -> `sr`
pub fn primary_subtag(locale: &str) -> &str {
    locale
        .trim()
        .split(['_', '-', '@', '.'])
        .next()
        .unwrap_or_default()
}

/// Normalize a language code to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Option<String> {
    let normalized_code = code.trim().to_lowercase();

    match normalized_code.len() {
        2 => Language::from_639_1(&normalized_code).map(|lang| lang.to_639_3().to_string()),
        3 => {
            let part2t = bibliographic_to_terminology(&normalized_code);
            Language::from_639_3(part2t).map(|lang| lang.to_639_3().to_string())
        }
        _ => None,
    }
}

/// Validate if a language code is a valid ISO 639-1 or ISO 639-2 code
pub fn is_valid_language_code(code: &str) -> bool {
    normalize_to_part2t(code).is_some()
}

/// Check if two language codes match (represent the same language)
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    match (normalize_to_part2t(code1), normalize_to_part2t(code2)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// English name of a language, falling back to the code itself
///
/// Used in chat prompts where "German" works better than "de".
pub fn language_name(code: &str) -> String {
    normalize_to_part2t(code)
        .and_then(|part2t| Language::from_639_3(&part2t))
        .map(|lang| lang.to_name().to_string())
        .unwrap_or_else(|| code.trim().to_string())
}

/// Compare a catalog `Language` header against the destination language
///
/// Unrecognized headers fall back to a plain comparison of the first two
/// characters, which is what gettext tooling has always done.
pub fn check_declared_language(declared: &str, target_language: &str) -> LanguageCheck {
    let declared = declared.trim();
    if declared.is_empty() {
        return LanguageCheck::Unknown;
    }

    let subtag = primary_subtag(declared);
    let matches = if is_valid_language_code(subtag) {
        language_codes_match(subtag, primary_subtag(target_language))
    } else {
        let prefix: String = declared.chars().take(2).collect::<String>().to_lowercase();
        prefix == target_language.trim().to_lowercase()
    };

    if matches {
        LanguageCheck::Match
    } else {
        LanguageCheck::Mismatch { declared: declared.to_string() }
    }
}
