//! Current encoding scheme.
//!
//! Tuples are joined with `|~|`, a token chosen to be vanishingly unlikely
//! in natural text, URLs, or JSON punctuation. The field separator inside a
//! tuple is a plain `:`, so decoding splits each tuple at the first
//! occurrence only.

use super::{attrs_from_pairs, known_key, split_tuples, RecordAttrs};

pub const RECORD_SEP: &str = "|~|";

/// Serialize the full attribute set as ordered `KEY:value` tuples.
pub fn encode(attrs: &RecordAttrs) -> String {
    let pages = serde_json::to_string(&attrs.pages).unwrap_or_else(|_| "[]".to_string());
    let genre = serde_json::to_string(&attrs.genre).unwrap_or_else(|_| "[]".to_string());
    let end = attrs
        .end_date
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_default();

    let tuples = [
        format!("DESC:{}", attrs.description),
        format!("CTX:{}", attrs.search_context),
        format!("TYPE:{}", attrs.media_type),
        format!("THUMB:{}", attrs.thumbnail_url),
        format!("MAIN:{}", attrs.main_asset_url),
        format!("PAGES:{}", pages),
        format!("YEAR:{}", attrs.year),
        format!("END:{}", end),
        format!("GENRE:{}", genre),
        format!("SCORE:{}", attrs.match_score),
        format!("FOLDER:{}", attrs.folder_name.as_deref().unwrap_or("")),
        format!("AI:{}", attrs.ai_status),
        format!("FEAT:{}", if attrs.is_featured { "1" } else { "0" }),
    ];

    tuples.join(RECORD_SEP)
}

/// Decode a v2-encoded field, or `None` if the text does not look like
/// this scheme.
pub fn try_decode(text: &str) -> Option<RecordAttrs> {
    if !text.contains(RECORD_SEP) {
        return None;
    }
    let pairs = split_tuples(text, RECORD_SEP);
    if !pairs.iter().any(|(key, _)| known_key(key)) {
        return None;
    }
    Some(attrs_from_pairs(&pairs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MediaKind;

    #[test]
    fn test_encode_emits_all_keys() {
        let encoded = encode(&RecordAttrs::default());
        for key in [
            "DESC:", "CTX:", "TYPE:", "THUMB:", "MAIN:", "PAGES:", "YEAR:", "END:", "GENRE:",
            "SCORE:", "FOLDER:", "AI:", "FEAT:",
        ] {
            assert!(encoded.contains(key), "missing {}", key);
        }
    }

    #[test]
    fn test_try_decode_rejects_plain_text() {
        assert!(try_decode("an ordinary sentence").is_none());
        assert!(try_decode("DESC:no separator here").is_none());
    }

    #[test]
    fn test_try_decode_rejects_unrelated_separator_text() {
        // Contains the record separator but no recognizable tuples.
        assert!(try_decode("ascii art |~| more art").is_none());
    }

    #[test]
    fn test_decode_partial_tuple_set() {
        let decoded = try_decode("TYPE:photo|~|YEAR:2021").unwrap();
        assert_eq!(decoded.media_type, MediaKind::Photo);
        assert_eq!(decoded.year, 2021);
        assert!(decoded.description.is_empty());
    }
}
