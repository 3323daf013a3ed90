//! Locale inspection and the C-locale coercion decision.
//!
//! The decision is a pure function of the [`Snapshot`]: the same environment
//! and locale inventory always produce the same answer.

use crate::snapshot::Snapshot;

/// UTF-8 capable locales tried, in order, when coercing the C locale.
pub const COERCION_TARGETS: [&str; 3] = ["C.UTF-8", "C.utf8", "UTF-8"];

/// Whether `name` is exactly the POSIX "C" locale.
#[must_use]
pub fn is_c_locale(name: &str) -> bool {
    name == "C"
}

/// Whether `name` is the "C" or "POSIX" locale.
#[must_use]
pub fn is_legacy_locale(name: &str) -> bool {
    name == "C" || name == "POSIX"
}

/// Outcome of the coercion decision procedure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoercionDecision {
    /// Whether `LC_CTYPE` must be coerced.
    pub active: bool,
    /// The locale to coerce to when active.
    pub target: Option<String>,
}

impl CoercionDecision {
    const INACTIVE: Self = Self {
        active: false,
        target: None,
    };
}

/// Decide whether the `LC_CTYPE` locale must be coerced.
///
/// Coercion activates only when the effective locale is exactly "C",
/// `LC_ALL` does not pin the locale, and a UTF-8 target is available.
/// An explicit `Some(false)` request disables it outright.
///
/// # Examples
///
/// ```
/// use ember_init::preconfig::locale::decide_coercion;
/// use ember_init::Snapshot;
///
/// let snapshot = Snapshot::empty().with_var("LC_CTYPE", "C");
/// let decision = decide_coercion(&snapshot, Some(true));
/// assert!(decision.active);
/// assert_eq!(decision.target.as_deref(), Some("C.UTF-8"));
///
/// assert!(!decide_coercion(&snapshot, Some(false)).active);
/// ```
#[must_use]
pub fn decide_coercion(snapshot: &Snapshot, requested: Option<bool>) -> CoercionDecision {
    if requested == Some(false) {
        return CoercionDecision::INACTIVE;
    }

    if !is_c_locale(snapshot.ctype_locale()) || snapshot.lc_all_set() {
        return CoercionDecision::INACTIVE;
    }

    match COERCION_TARGETS
        .iter()
        .find(|target| snapshot.locale_available(target))
    {
        Some(target) => CoercionDecision {
            active: true,
            target: Some((*target).to_string()),
        },
        None => {
            log::debug!("C locale detected but no UTF-8 locale is available for coercion");
            CoercionDecision::INACTIVE
        }
    }
}

/// The text encoding implied by a locale name.
///
/// "C" and "POSIX" are ASCII. Otherwise the codeset after the `.` is
/// normalised (`UTF8` becomes `utf-8`, `ISO8859-1` becomes `iso8859-1`);
/// a locale without a codeset is assumed to be UTF-8.
///
/// # Examples
///
/// ```
/// use ember_init::preconfig::locale::locale_encoding;
///
/// assert_eq!(locale_encoding("C"), "ascii");
/// assert_eq!(locale_encoding("en_US.UTF8"), "utf-8");
/// assert_eq!(locale_encoding("de_DE.ISO-8859-15@euro"), "iso8859-15");
/// assert_eq!(locale_encoding("en_US"), "utf-8");
/// ```
#[must_use]
pub fn locale_encoding(name: &str) -> String {
    if is_legacy_locale(name) {
        return "ascii".to_string();
    }

    let codeset = name
        .split_once('.')
        .map(|(_, rest)| rest.split('@').next().unwrap_or(rest))
        .filter(|c| !c.is_empty());

    let Some(codeset) = codeset else {
        return "utf-8".to_string();
    };

    let compact: String = codeset
        .chars()
        .filter(|c| *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect();

    if compact == "utf8" {
        "utf-8".to_string()
    } else if let Some(part) = compact.strip_prefix("iso8859") {
        format!("iso8859-{part}")
    } else {
        codeset.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coercion_requires_exact_c() {
        for locale in ["POSIX", "C.UTF-8", "en_US.UTF-8"] {
            let snapshot = Snapshot::empty().with_var("LC_CTYPE", locale);
            assert!(!decide_coercion(&snapshot, None).active, "{locale}");
        }
    }

    #[test]
    fn test_coercion_unset_request_activates_on_c() {
        let snapshot = Snapshot::empty().with_var("LANG", "C");
        assert!(decide_coercion(&snapshot, None).active);
    }

    #[test]
    fn test_lc_all_blocks_coercion() {
        let snapshot = Snapshot::empty().with_var("LC_ALL", "C");
        assert!(!decide_coercion(&snapshot, Some(true)).active);
    }

    #[test]
    fn test_target_selection_follows_inventory() {
        let snapshot = Snapshot::empty()
            .with_var("LC_CTYPE", "C")
            .with_available_locales(["UTF-8", "C.utf8"]);
        let decision = decide_coercion(&snapshot, Some(true));
        assert_eq!(decision.target.as_deref(), Some("C.utf8"));
    }

    #[test]
    fn test_no_target_available() {
        let snapshot = Snapshot::empty()
            .with_var("LC_CTYPE", "C")
            .with_available_locales(Vec::<String>::new());
        assert_eq!(
            decide_coercion(&snapshot, Some(true)),
            CoercionDecision::INACTIVE
        );
    }

    #[test]
    fn test_locale_encoding_other_codesets() {
        assert_eq!(locale_encoding("POSIX"), "ascii");
        assert_eq!(locale_encoding("ja_JP.eucJP"), "eucjp");
        assert_eq!(locale_encoding("en_US."), "utf-8");
    }
}
