use serde::{Deserialize, Deserializer};

/// Normalizes text by stripping surrounding whitespace and composing it
/// into Unicode Normalization Form C.
///
/// ```
/// use feedback_store::normalization::normalize_text;
/// assert_eq!(normalize_text(" Room 101 \n"), "Room 101");
/// assert_eq!(normalize_text("cafe\u{301}"), "caf\u{e9}");
/// ```
pub fn normalize_text(text: impl AsRef<str>) -> String {
    use unicode_normalization::UnicodeNormalization;

    text.as_ref().trim().nfc().collect()
}

/// Normalizes optional text, treating blank text as absent.
///
/// ```
/// use feedback_store::normalization::normalize_optional;
/// assert_eq!(normalize_optional(Some("  ")), None);
/// assert_eq!(normalize_optional(Some(" HVAC ")), Some("HVAC".to_owned()));
/// ```
pub fn normalize_optional(text: Option<impl AsRef<str>>) -> Option<String> {
    text.map(normalize_text).filter(|s| !s.is_empty())
}

/// Deserializes a `String` after running it through `normalize_text`.
pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
where D: Deserializer<'de> {
    let s: String = Deserialize::deserialize(deserializer)?;
    Ok(normalize_text(s))
}

/// Deserializes an optional `String` after running it through
/// `normalize_optional`.
pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where D: Deserializer<'de> {
    let o: Option<String> = Deserialize::deserialize(deserializer)?;
    Ok(normalize_optional(o))
}

/// Deserializes a field of a partial update in which `null` means
/// "clear" and a missing key means "leave alone". Must be paired with
/// `#[serde(default)]`.
pub fn deserialize_change<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where D: Deserializer<'de> {
    let o: Option<String> = Deserialize::deserialize(deserializer)?;
    Ok(Some(normalize_optional(o)))
}

/// Deserializes a change to a required field. An explicit `null` comes
/// back as blank text so that validation reports the field as missing.
pub fn deserialize_change_required<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where D: Deserializer<'de> {
    let o: Option<String> = Deserialize::deserialize(deserializer)?;
    Ok(Some(o.map(normalize_text).unwrap_or_default()))
}

/// Counts characters the way length limits are expressed: in Unicode
/// scalar values rather than bytes.
pub fn char_length(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use unicode_normalization::is_nfc;

    use super::{normalize_optional, normalize_text};

    fn count_whitespace(s: impl AsRef<str>) -> usize {
        s.as_ref().chars().filter(|c| c.is_whitespace()).count()
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 2000, ..ProptestConfig::default()
        })]

        #[test]
        fn normalization_works(string in "(\\S.*\\S|\\S+)", space_before in "\\s*", space_after in "\\s*") {
            let normalized = normalize_text(format!("{}{}{}", space_before, string, space_after));

            prop_assert!(is_nfc(&normalized), "{:?} (normalized form of {:?}) is in NFC", normalized, string);

            prop_assert!(!normalized.starts_with(char::is_whitespace) && !normalized.ends_with(char::is_whitespace), "{:?} (normalized form of {:?}) has no leading or trailing whitespace", normalized, string);

            let trimmed = normalized.trim();

            prop_assert_eq!(count_whitespace(&normalized), count_whitespace(&trimmed), "{:?} (normalized form of {:?}) preserves inner whitespace", normalized, string);
        }

        #[test]
        fn blank_optional_text_is_absent(blank in "\\s*") {
            prop_assert_eq!(normalize_optional(Some(blank)), None);
        }
    }
}
