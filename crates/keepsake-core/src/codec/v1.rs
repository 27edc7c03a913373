//! Legacy encoding scheme, kept for best-effort backward decoding.
//!
//! Early libraries joined tuples with `;;` and carried a smaller key set
//! (no pages, range dates, or featured flag). Production code only decodes
//! this scheme; `encode` exists so the pair stays testable.

use super::{attrs_from_pairs, known_key, split_tuples, RecordAttrs};

pub const RECORD_SEP: &str = ";;";

/// Serialize with the legacy scheme (test support).
pub fn encode(attrs: &RecordAttrs) -> String {
    let genre = serde_json::to_string(&attrs.genre).unwrap_or_else(|_| "[]".to_string());

    let tuples = [
        format!("DESC:{}", attrs.description),
        format!("CTX:{}", attrs.search_context),
        format!("TYPE:{}", attrs.media_type),
        format!("THUMB:{}", attrs.thumbnail_url),
        format!("MAIN:{}", attrs.main_asset_url),
        format!("YEAR:{}", attrs.year),
        format!("GENRE:{}", genre),
        format!("SCORE:{}", attrs.match_score),
        format!("FOLDER:{}", attrs.folder_name.as_deref().unwrap_or("")),
        format!("AI:{}", attrs.ai_status),
    ];

    tuples.join(RECORD_SEP)
}

/// Decode a v1-encoded field, or `None` if the text does not look like
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
