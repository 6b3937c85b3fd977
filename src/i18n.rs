//! Internationalization (i18n) support.
//!
//! Provides locale detection from the command line, environment variables
//! and system locale settings.
//!
//! Supported languages: en, zh-CN.

/// All locales with a translation file under `locales/`.
pub const SUPPORTED_LOCALES: &[&str] = &["en", "zh-CN"];

/// Picks the locale for this process and activates it.
///
/// Priority:
/// 1. Explicit `--lang` argument
/// 2. `XIANGQI_LANG` environment variable
/// 3. System locale (via `sys-locale` crate)
/// 4. Fallback to `"en"`
pub fn init_locale(explicit: Option<&str>) -> String {
    let locale = explicit
        .and_then(normalize_locale)
        .unwrap_or_else(detect_system_locale);
    debug_assert!(SUPPORTED_LOCALES.contains(&locale.as_str()));
    rust_i18n::set_locale(&locale);
    log::debug!("Using locale {}", locale);
    locale
}

/// Detects the best locale from the environment.
pub fn detect_system_locale() -> String {
    if let Ok(lang) = std::env::var("XIANGQI_LANG")
        && let Some(locale) = normalize_locale(&lang)
    {
        return locale;
    }

    if let Some(locale_str) = sys_locale::get_locale()
        && let Some(locale) = normalize_locale(&locale_str)
    {
        return locale;
    }

    "en".to_string()
}

/// Normalizes a locale string to one of the supported locales.
///
/// Accepts common formats: "en-US", "zh_CN.UTF-8", "zh-Hans", etc.
/// Returns `None` if the language is not supported.
pub fn normalize_locale(input: &str) -> Option<String> {
    let lower = input.to_lowercase();
    // Strip encoding suffix (e.g. ".utf-8")
    let tag = lower.split('.').next().unwrap_or(&lower);
    let tag = tag.replace('_', "-");

    if tag.starts_with("zh") {
        Some("zh-CN".to_string())
    } else if tag.starts_with("en") {
        Some("en".to_string())
    } else {
        None
    }
}
