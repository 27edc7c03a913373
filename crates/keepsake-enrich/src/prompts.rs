//! Prompt building for the analyze and generate-image calls.

use keepsake_core::GeneratedMetadata;

/// Analysis prompt: all samples are submitted together so the model sees
/// temporal/contextual breadth, with a JSON response contract matching
/// [`GeneratedMetadata`].
pub fn analysis_prompt(comic_mode: bool) -> String {
    let mut parts = vec![
        "You are cataloguing a personal media library. Analyze the attached images \
         (frames from one video, or a set of photos from one moment) and respond with \
         a single JSON object:"
            .to_string(),
        "- title: a short, evocative title for this memory".to_string(),
        "- description: 2-3 sentences describing what happens, written warmly".to_string(),
        "- searchContext: a dense blob of search keywords: visible objects, people, \
         places, activities, any readable text, colors, season, time of day"
            .to_string(),
        "- genre: 1-3 short genre labels (e.g. \"Travel\", \"Family\", \"Adventure\")".to_string(),
        "- mood: one or two words for the overall mood".to_string(),
    ];

    if comic_mode {
        parts.push(
            "The memory will be retold as a short illustrated comic, so favor a title \
             and description with a clear narrative arc."
                .to_string(),
        );
    }

    parts.push("Respond with valid JSON only, no code fences.".to_string());
    parts.join("\n")
}

/// Poster prompt: conditioned on the metadata and a reference frame,
/// constrained to preserve subject likeness.
pub fn poster_prompt(meta: &GeneratedMetadata) -> String {
    format!(
        "Create a cinematic poster illustration for a personal memory titled \"{}\". \
         {} Keep the people, pets and setting from the reference image clearly \
         recognizable: preserve faces, likeness, clothing and colors. Mood: {}. \
         No text or lettering on the poster.",
        meta.title,
        meta.description,
        if meta.mood.is_empty() { "warm" } else { &meta.mood }
    )
}

/// Page-specific comic prompts: a fixed four-page narrative arc.
pub fn comic_page_prompts(meta: &GeneratedMetadata) -> Vec<String> {
    let beats = [
        "Page 1 (setup): introduce the scene and characters as the moment begins",
        "Page 2 (rising tension): something builds, a small complication or anticipation",
        "Page 3 (climax): the peak of the moment, the most dramatic or joyful beat",
        "Page 4 (resolution): the moment settles, a warm closing beat",
    ];

    beats
        .iter()
        .map(|beat| {
            format!(
                "Illustrate one page of a four-page comic retelling the memory \"{}\". \
                 {} {}. Preserve the likeness of the people and setting from the \
                 reference image. Consistent hand-drawn comic style across pages, \
                 single full-page panel, no speech balloons.",
                meta.title, meta.description, beat
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_prompt_names_contract_fields() {
        let prompt = analysis_prompt(false);
        for field in ["title", "description", "searchContext", "genre", "mood"] {
            assert!(prompt.contains(field), "missing {}", field);
        }
        assert!(!prompt.contains("comic"));
    }

    #[test]
    fn test_analysis_prompt_comic_mode() {
        assert!(analysis_prompt(true).contains("comic"));
    }

    #[test]
    fn test_comic_prompts_cover_the_arc() {
        let meta = GeneratedMetadata {
            title: "The Great Sandcastle".to_string(),
            description: "Built and defended against the tide.".to_string(),
            ..GeneratedMetadata::default()
        };
        let prompts = comic_page_prompts(&meta);
        assert_eq!(prompts.len(), 4);
        assert!(prompts[0].contains("setup"));
        assert!(prompts[1].contains("rising tension"));
        assert!(prompts[2].contains("climax"));
        assert!(prompts[3].contains("resolution"));
        for p in &prompts {
            assert!(p.contains("The Great Sandcastle"));
        }
    }
}
