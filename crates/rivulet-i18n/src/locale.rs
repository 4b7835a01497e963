// ── Locale fallback chain ──

/// The locale `lang` falls back to: everything before its last
/// `_`-delimited segment.
///
/// Both sides of the separator must be non-empty, so `"en_US"` yields
/// `"en"`, `"zh_Hant_TW"` yields `"zh_Hant"`, and `"en"`, `"_x"` or `"x_"`
/// have no parent.
pub fn parent_locale(lang: &str) -> Option<&str> {
    let last = lang.len().checked_sub(1)?;
    lang.char_indices()
        .rev()
        .find(|&(i, c)| c == '_' && i > 0 && i < last)
        .map(|(i, _)| &lang[..i])
}

/// `[lang, parent(lang) or lang, default]`, de-duplicated in order.
pub fn fallback_chain(lang: &str, default_lang: &str) -> Vec<String> {
    let mut chain: Vec<String> = Vec::with_capacity(3);
    for candidate in [lang, parent_locale(lang).unwrap_or(lang), default_lang] {
        if !chain.iter().any(|seen| seen == candidate) {
            chain.push(candidate.to_owned());
        }
    }
    chain
}
