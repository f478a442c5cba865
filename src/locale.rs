use std::collections::HashSet;

/// Used when the remote language list cannot be fetched or parsed.
pub const FALLBACK_LOCALES: [&str; 10] = [
    "en_US", "ko_KR", "ja_JP", "zh_CN", "fr_FR", "de_DE", "es_ES", "it_IT", "pl_PL", "ru_RU",
];

pub const DEFAULT_LOCALE: &str = "en_US";

pub fn fallback_locales() -> Vec<String> {
    FALLBACK_LOCALES.iter().map(|code| code.to_string()).collect()
}

/// Drops blanks and repeats, keeping the first occurrence of each code.
pub fn dedup_locales<I, S>(codes: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for code in codes {
        let code = code.into().trim().to_string();
        if code.is_empty() {
            continue;
        }
        if seen.insert(code.clone()) {
            out.push(code);
        }
    }
    out
}

pub fn format_locale_name(code: &str) -> &str {
    match code {
        "en_US" => "English (US)",
        "en_GB" => "English (UK)",
        "ko_KR" => "Korean",
        "ja_JP" => "Japanese",
        "zh_CN" => "Chinese (Simplified)",
        "zh_TW" => "Chinese (Traditional)",
        "fr_FR" => "French",
        "de_DE" => "German",
        "es_ES" => "Spanish (Spain)",
        "es_MX" => "Spanish (Mexico)",
        "it_IT" => "Italian",
        "pl_PL" => "Polish",
        "pt_BR" => "Portuguese (Brazil)",
        "ru_RU" => "Russian",
        "tr_TR" => "Turkish",
        other => other,
    }
}

/// Neighbour of `current` in `locales`, wrapping at both ends.
pub fn cycle_locale<'a>(locales: &'a [String], current: &str, step: isize) -> Option<&'a str> {
    if locales.is_empty() {
        return None;
    }
    let len = locales.len() as isize;
    let idx = locales
        .iter()
        .position(|code| code == current)
        .map(|idx| idx as isize)
        .unwrap_or(0);
    let next = (idx + step).rem_euclid(len) as usize;
    locales.get(next).map(String::as_str)
}
