//! Metadata codec: packs a record's full attribute set into the one
//! guaranteed free-text column of the row store, and unpacks it again.
//!
//! The row store only promises `id`, `title`, `description` and
//! `created_at`; everything else rides inside the description column as an
//! ordered list of `KEY:value` tuples. Schemes are versioned: the decoder
//! tries the current scheme first, then each legacy scheme in order of
//! recency, and finally treats the whole field as a plain visible
//! description. Each scheme is an explicit encode/decode pure-function
//! pair (see [`v2`] and [`v1`]); new schemes are appended to the front of
//! the chain, never spliced in.
//!
//! Decoding never fails: unknown or absent keys default to
//! type-appropriate empty values, malformed embedded JSON decodes to an
//! empty list.

pub mod v1;
pub mod v2;

use chrono::{DateTime, Utc};
use std::str::FromStr;

use crate::models::{AiStatus, MediaKind, MediaRecord};

/// The attribute set carried by the codec: everything on a [`MediaRecord`]
/// except the real row-store columns (`id`, `title`, `created_at`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordAttrs {
    pub description: String,
    pub search_context: String,
    pub media_type: MediaKind,
    pub thumbnail_url: String,
    pub main_asset_url: String,
    pub pages: Vec<String>,
    pub year: i32,
    pub end_date: Option<DateTime<Utc>>,
    pub genre: Vec<String>,
    pub match_score: i32,
    pub folder_name: Option<String>,
    pub ai_status: AiStatus,
    pub is_featured: bool,
}

impl From<&MediaRecord> for RecordAttrs {
    fn from(r: &MediaRecord) -> Self {
        Self {
            description: r.description.clone(),
            search_context: r.search_context.clone(),
            media_type: r.media_type,
            thumbnail_url: r.thumbnail_url.clone(),
            main_asset_url: r.main_asset_url.clone(),
            pages: r.pages.clone(),
            year: r.year,
            end_date: r.end_date,
            genre: r.genre.clone(),
            match_score: r.match_score,
            folder_name: r.folder_name.clone(),
            ai_status: r.ai_status,
            is_featured: r.is_featured,
        }
    }
}

impl RecordAttrs {
    /// Rebuild a full record from decoded attributes plus the real columns.
    pub fn into_record(
        self,
        id: uuid::Uuid,
        title: String,
        created_at: DateTime<Utc>,
    ) -> MediaRecord {
        MediaRecord {
            id,
            title,
            description: self.description,
            search_context: self.search_context,
            media_type: self.media_type,
            thumbnail_url: self.thumbnail_url,
            main_asset_url: self.main_asset_url,
            pages: self.pages,
            year: self.year,
            created_at,
            end_date: self.end_date,
            genre: self.genre,
            match_score: self.match_score,
            folder_name: self.folder_name,
            ai_status: self.ai_status,
            is_featured: self.is_featured,
        }
    }
}

/// Encode attributes with the current scheme.
pub fn encode(attrs: &RecordAttrs) -> String {
    v2::encode(attrs)
}

/// Decode a description column written by any known scheme.
///
/// Ordered fallback chain: v2 -> v1 -> plain text. Must be preserved as
/// new schemes are added.
pub fn decode(text: &str) -> RecordAttrs {
    if let Some(attrs) = v2::try_decode(text) {
        return attrs;
    }
    if let Some(attrs) = v1::try_decode(text) {
        return attrs;
    }
    // Plain visible description with no structured metadata.
    RecordAttrs {
        description: text.to_string(),
        ..RecordAttrs::default()
    }
}

/// Split `text` on `record_sep` and each tuple at the **first** `:` only.
///
/// Values (URLs in particular) legitimately contain `:`; splitting on
/// every occurrence would truncate them.
pub(crate) fn split_tuples<'a>(text: &'a str, record_sep: &str) -> Vec<(&'a str, &'a str)> {
    text.split(record_sep)
        .filter_map(|tuple| {
            let mut parts = tuple.splitn(2, ':');
            match (parts.next(), parts.next()) {
                (Some(key), Some(value)) => Some((key, value)),
                _ => None,
            }
        })
        .collect()
}

/// Build attributes from key/value pairs, defaulting everything absent.
pub(crate) fn attrs_from_pairs(pairs: &[(&str, &str)]) -> RecordAttrs {
    let mut attrs = RecordAttrs::default();
    for (key, value) in pairs {
        match *key {
            "DESC" => attrs.description = (*value).to_string(),
            "CTX" => attrs.search_context = (*value).to_string(),
            "TYPE" => attrs.media_type = MediaKind::from_str(value).unwrap_or_default(),
            "THUMB" => attrs.thumbnail_url = (*value).to_string(),
            "MAIN" => attrs.main_asset_url = (*value).to_string(),
            "PAGES" => attrs.pages = parse_list(value),
            "YEAR" => attrs.year = value.parse().unwrap_or(0),
            "END" => attrs.end_date = parse_datetime(value),
            "GENRE" => attrs.genre = parse_list(value),
            "SCORE" => attrs.match_score = value.parse().unwrap_or(0),
            "FOLDER" => {
                attrs.folder_name = if value.is_empty() {
                    None
                } else {
                    Some((*value).to_string())
                }
            }
            "AI" => attrs.ai_status = AiStatus::from_str(value).unwrap_or_default(),
            "FEAT" => attrs.is_featured = *value == "1",
            // Unknown keys (written by a newer scheme) are ignored.
            _ => {}
        }
    }
    attrs
}

/// List fields are JSON-serialized inside the tuple; malformed JSON
/// defaults to an empty collection rather than raising.
pub(crate) fn parse_list(value: &str) -> Vec<String> {
    serde_json::from_str(value).unwrap_or_default()
}

pub(crate) fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    if value.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

pub(crate) fn known_key(key: &str) -> bool {
    matches!(
        key,
        "DESC"
            | "CTX"
            | "TYPE"
            | "THUMB"
            | "MAIN"
            | "PAGES"
            | "YEAR"
            | "END"
            | "GENRE"
            | "SCORE"
            | "FOLDER"
            | "AI"
            | "FEAT"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_attrs() -> RecordAttrs {
        RecordAttrs {
            description: "A quiet afternoon at the lake.".to_string(),
            search_context: "lake water ducks canoe summer laughter".to_string(),
            media_type: MediaKind::Comic,
            thumbnail_url: "http://localhost:9000/assets/abc/poster".to_string(),
            main_asset_url: "http://localhost:9000/assets/abc/main.mp4".to_string(),
            pages: vec![
                "http://localhost:9000/assets/abc/page_0_aa11bb22".to_string(),
                "http://localhost:9000/assets/abc/page_1_cc33dd44".to_string(),
            ],
            year: 2024,
            end_date: Some(Utc.with_ymd_and_hms(2024, 8, 3, 12, 0, 0).unwrap()),
            genre: vec!["Slice of Life".to_string(), "Adventure".to_string()],
            match_score: 87,
            folder_name: Some("Lake Trips".to_string()),
            ai_status: AiStatus::Completed,
            is_featured: true,
        }
    }

    #[test]
    fn test_roundtrip_full() {
        let attrs = sample_attrs();
        assert_eq!(decode(&encode(&attrs)), attrs);
    }

    #[test]
    fn test_roundtrip_defaults() {
        let attrs = RecordAttrs::default();
        assert_eq!(decode(&encode(&attrs)), attrs);
    }

    #[test]
    fn test_first_occurrence_split_preserves_urls() {
        // URLs contain the field separator; only the first one splits.
        let attrs = sample_attrs();
        let decoded = decode(&encode(&attrs));
        assert_eq!(decoded.thumbnail_url, "http://localhost:9000/assets/abc/poster");
        assert_eq!(
            decoded.main_asset_url,
            "http://localhost:9000/assets/abc/main.mp4"
        );
    }

    #[test]
    fn test_decode_v1_legacy() {
        let attrs = RecordAttrs {
            description: "Old record.".to_string(),
            media_type: MediaKind::Video,
            thumbnail_url: "http://host/thumb.jpg".to_string(),
            year: 2019,
            ..RecordAttrs::default()
        };
        let legacy = v1::encode(&attrs);
        let decoded = decode(&legacy);
        assert_eq!(decoded.description, "Old record.");
        assert_eq!(decoded.year, 2019);
        assert_eq!(decoded.thumbnail_url, "http://host/thumb.jpg");
        // v1 never carried pages.
        assert!(decoded.pages.is_empty());
    }

    #[test]
    fn test_decode_plain_text_fallback() {
        let decoded = decode("Just a handwritten note about the day.");
        assert_eq!(decoded.description, "Just a handwritten note about the day.");
        assert!(decoded.pages.is_empty());
        assert_eq!(decoded.ai_status, AiStatus::Pending);
        assert_eq!(decoded.year, 0);
    }

    #[test]
    fn test_decode_empty() {
        let decoded = decode("");
        assert_eq!(decoded, RecordAttrs::default());
    }

    #[test]
    fn test_malformed_embedded_json_defaults_to_empty() {
        let text = "DESC:d|~|PAGES:[not json|~|GENRE:{broken";
        let decoded = decode(text);
        assert_eq!(decoded.description, "d");
        assert!(decoded.pages.is_empty());
        assert!(decoded.genre.is_empty());
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let text = "DESC:d|~|FUTURE:whatever|~|YEAR:2020";
        let decoded = decode(text);
        assert_eq!(decoded.description, "d");
        assert_eq!(decoded.year, 2020);
    }

    #[test]
    fn test_record_roundtrip_through_attrs() {
        let id = uuid::Uuid::new_v4();
        let created = Utc.with_ymd_and_hms(2024, 7, 1, 9, 30, 0).unwrap();
        let record = sample_attrs().into_record(id, "Lake Day".to_string(), created);
        let rebuilt = decode(&encode(&RecordAttrs::from(&record))).into_record(
            id,
            record.title.clone(),
            created,
        );
        assert_eq!(rebuilt, record);
    }
}
