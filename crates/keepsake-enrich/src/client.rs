//! The provider seam.

use async_trait::async_trait;
use keepsake_core::GeneratedMetadata;
use keepsake_processing::Sample;

use crate::anthropic::AnthropicAnalyzer;
use crate::replicate::ReplicateImageGenerator;
use crate::EnrichError;

/// Aspect-ratio hint for generated imagery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AspectRatio {
    /// Poster and comic pages.
    Portrait,
    Landscape,
    Square,
}

impl AspectRatio {
    pub fn as_str(self) -> &'static str {
        match self {
            AspectRatio::Portrait => "2:3",
            AspectRatio::Landscape => "3:2",
            AspectRatio::Square => "1:1",
        }
    }
}

/// External multimodal capabilities consumed by the pipeline.
///
/// One implementation talks to the real providers; tests swap in mocks.
#[async_trait]
pub trait GenerativeClient: Send + Sync {
    /// Submit all samples together and get structured metadata back.
    async fn analyze(
        &self,
        samples: &[Sample],
        comic_mode: bool,
    ) -> Result<GeneratedMetadata, EnrichError>;

    /// One reference image + text prompt in, one image out.
    async fn generate_image(
        &self,
        reference: &Sample,
        prompt: &str,
        aspect: AspectRatio,
    ) -> Result<Vec<u8>, EnrichError>;
}

/// Production client: Anthropic for analysis, Replicate for synthesis.
pub struct LiveClient {
    analyzer: AnthropicAnalyzer,
    generator: ReplicateImageGenerator,
}

impl LiveClient {
    pub fn new(analyzer: AnthropicAnalyzer, generator: ReplicateImageGenerator) -> Self {
        Self {
            analyzer,
            generator,
        }
    }
}

#[async_trait]
impl GenerativeClient for LiveClient {
    async fn analyze(
        &self,
        samples: &[Sample],
        comic_mode: bool,
    ) -> Result<GeneratedMetadata, EnrichError> {
        self.analyzer.analyze(samples, comic_mode).await
    }

    async fn generate_image(
        &self,
        reference: &Sample,
        prompt: &str,
        aspect: AspectRatio,
    ) -> Result<Vec<u8>, EnrichError> {
        self.generator.generate(reference, prompt, aspect).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_ratio_strings() {
        assert_eq!(AspectRatio::Portrait.as_str(), "2:3");
        assert_eq!(AspectRatio::Landscape.as_str(), "3:2");
        assert_eq!(AspectRatio::Square.as_str(), "1:1");
    }
}
