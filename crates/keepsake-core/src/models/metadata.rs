use serde::{Deserialize, Serialize};

/// Structured metadata produced by the analyze capability.
///
/// Deserialized leniently: any field the model omits falls back to its
/// default so one weak response does not sink the whole analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedMetadata {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub search_context: String,
    #[serde(default)]
    pub genre: Vec<String>,
    #[serde(default)]
    pub mood: String,
}

impl GeneratedMetadata {
    /// Placeholder metadata for the degraded path: ingestion must never
    /// fail because analysis did. Title is derived from the source
    /// filename; the record is marked pending by the caller.
    pub fn placeholder(filename: &str) -> Self {
        let stem = std::path::Path::new(filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(filename);
        let title: String = stem
            .chars()
            .map(|c| if c == '_' || c == '-' || c == '.' { ' ' } else { c })
            .collect();
        let title = title.trim().to_string();
        Self {
            title: if title.is_empty() {
                "Untitled".to_string()
            } else {
                title
            },
            description: "Analysis pending. This memory will be described once enrichment runs."
                .to_string(),
            search_context: String::new(),
            genre: vec![],
            mood: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_title_from_filename() {
        let meta = GeneratedMetadata::placeholder("summer_trip-2024.mp4");
        assert_eq!(meta.title, "summer trip 2024");
        assert!(!meta.description.is_empty());
        assert!(meta.genre.is_empty());
    }

    #[test]
    fn test_placeholder_empty_stem() {
        let meta = GeneratedMetadata::placeholder("...");
        assert_eq!(meta.title, "Untitled");
    }

    #[test]
    fn test_lenient_deserialization() {
        let meta: GeneratedMetadata =
            serde_json::from_str(r#"{"title": "A Day Out"}"#).unwrap();
        assert_eq!(meta.title, "A Day Out");
        assert!(meta.description.is_empty());
        assert!(meta.genre.is_empty());
        assert!(meta.mood.is_empty());
    }
}
