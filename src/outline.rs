//! Presentation outline: what the model produces and the adapter rewrites.
//!
//! Deserialization is strict about types: a field of the wrong type fails the
//! whole parse instead of being coerced. Unknown fields are ignored so that
//! harmless extras from the model do not fail a request.

use memchr::{memchr, memrchr};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// The kind of a slide, which decides the layout it is instantiated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlideType {
    #[serde(alias = "title_slide")]
    Title,
    #[default]
    #[serde(alias = "content_slide", alias = "two_column")]
    Content,
    #[serde(alias = "closing_slide")]
    Closing,
}

impl std::fmt::Display for SlideType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Title => "title",
            Self::Content => "content",
            Self::Closing => "closing",
        })
    }
}

/// One slide's content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideOutline {
    /// Informational; outline order is authoritative
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slide_number: Option<u32>,
    #[serde(default)]
    pub slide_type: SlideType,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, alias = "bullet_points", deserialize_with = "null_as_empty")]
    pub bullets: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker_notes: Option<String>,
}

impl SlideOutline {
    pub fn new(slide_type: SlideType, title: impl Into<String>) -> Self {
        Self {
            slide_number: None,
            slide_type,
            title: title.into(),
            subtitle: None,
            bullets: Vec::new(),
            speaker_notes: None,
        }
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn with_bullets<I, S>(mut self, bullets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bullets = bullets.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_speaker_notes(mut self, notes: impl Into<String>) -> Self {
        self.speaker_notes = Some(notes.into());
        self
    }
}

/// The whole deck plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentationOutline {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub topic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_message: Option<String>,
    pub slides: Vec<SlideOutline>,
}

impl PresentationOutline {
    pub fn new(topic: impl Into<String>, slides: Vec<SlideOutline>) -> Self {
        Self {
            title: None,
            topic: topic.into(),
            target_audience: None,
            key_message: None,
            slides,
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Why a model response is not an outline.
#[derive(Error, Debug)]
pub enum OutlineParseError {
    #[error("response contains no JSON object")]
    NoJsonObject,

    #[error("response does not match the outline schema: {0}")]
    Schema(#[from] serde_json::Error),

    #[error("outline has no slides")]
    NoSlides,
}

/// Parse a model response into an outline.
///
/// The whole response is tried first; failing that, the span from the first
/// `{` to the last `}` is parsed, which unwraps prose and Markdown fences.
pub fn parse_outline(raw: &str) -> Result<PresentationOutline, OutlineParseError> {
    let outline = match serde_json::from_str::<PresentationOutline>(raw.trim()) {
        Ok(outline) => outline,
        Err(whole_err) => {
            let object = extract_json_object(raw).ok_or(match whole_err.classify() {
                serde_json::error::Category::Data => OutlineParseError::Schema(whole_err),
                _ => OutlineParseError::NoJsonObject,
            })?;
            serde_json::from_str(object)?
        },
    };

    if outline.slides.is_empty() {
        return Err(OutlineParseError::NoSlides);
    }
    Ok(outline)
}

/// The outermost `{ ... }` span of `raw`, if any.
fn extract_json_object(raw: &str) -> Option<&str> {
    let bytes = raw.as_bytes();
    let start = memchr(b'{', bytes)?;
    let end = memrchr(b'}', bytes)?;
    (end > start).then(|| &raw[start..=end])
}

/// Per-template numeric limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConstraints {
    pub title_max_length: usize,
    pub subtitle_max_length: usize,
    pub bullet_max_length: usize,
    pub bullets_per_slide: usize,
    pub slides_minimum: usize,
    pub slides_maximum: usize,
}

impl Default for TemplateConstraints {
    fn default() -> Self {
        Self {
            title_max_length: 80,
            subtitle_max_length: 100,
            bullet_max_length: 120,
            bullets_per_slide: 5,
            slides_minimum: 3,
            slides_maximum: 20,
        }
    }
}

impl TemplateConstraints {
    /// Check that every limit is positive and the slide range is ordered.
    pub fn validate(&self) -> Result<(), String> {
        let fields = [
            ("title_max_length", self.title_max_length),
            ("subtitle_max_length", self.subtitle_max_length),
            ("bullet_max_length", self.bullet_max_length),
            ("bullets_per_slide", self.bullets_per_slide),
            ("slides_minimum", self.slides_minimum),
            ("slides_maximum", self.slides_maximum),
        ];
        if let Some((name, _)) = fields.iter().find(|(_, value)| *value == 0) {
            return Err(format!("{name} must be positive"));
        }
        if self.slides_minimum > self.slides_maximum {
            return Err(format!(
                "slides_minimum ({}) exceeds slides_maximum ({})",
                self.slides_minimum, self.slides_maximum
            ));
        }
        Ok(())
    }

    /// Clamp a requested slide count into the declared range.
    pub fn clamp_slide_count(&self, requested: usize) -> usize {
        requested.clamp(self.slides_minimum, self.slides_maximum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = r#"{
  "title": "AI Strategy",
  "topic": "AI strategy for retail",
  "target_audience": "Executives",
  "slides": [
    {"slide_number": 1, "slide_type": "title_slide", "title": "AI Strategy", "subtitle": "2025 plan"},
    {"slide_number": 2, "slide_type": "two_column", "title": "Where we are",
     "bullet_points": ["Pilots in three stores", "Data platform live"],
     "speaker_notes": "Keep it short"},
    {"slide_type": "closing", "title": "Next steps", "bullets": null}
  ]
}"#;

    #[test]
    fn test_parse_with_aliases() {
        let outline = parse_outline(RESPONSE).unwrap();

        assert_eq!(outline.topic, "AI strategy for retail");
        assert_eq!(outline.slides.len(), 3);
        assert_eq!(outline.slides[0].slide_type, SlideType::Title);
        assert_eq!(outline.slides[0].subtitle.as_deref(), Some("2025 plan"));
        assert_eq!(outline.slides[1].slide_type, SlideType::Content);
        assert_eq!(outline.slides[1].bullets.len(), 2);
        assert_eq!(outline.slides[1].speaker_notes.as_deref(), Some("Keep it short"));
        assert_eq!(outline.slides[2].slide_type, SlideType::Closing);
        assert!(outline.slides[2].bullets.is_empty());
    }

    #[test]
    fn test_parse_from_code_fence() {
        let wrapped = format!("Here is your deck:\n```json\n{RESPONSE}\n```\nEnjoy!");
        let outline = parse_outline(&wrapped).unwrap();
        assert_eq!(outline.slides.len(), 3);
    }

    #[test]
    fn test_wrong_type_is_rejected() {
        let bad = r#"{"topic": "x", "slides": [{"title": 42}]}"#;
        assert!(matches!(parse_outline(bad), Err(OutlineParseError::Schema(_))));

        let bad_bullets = r#"{"topic": "x", "slides": [{"title": "t", "bullets": "one"}]}"#;
        assert!(parse_outline(bad_bullets).is_err());
    }

    #[test]
    fn test_unknown_slide_type_is_rejected() {
        let bad = r#"{"topic": "x", "slides": [{"title": "t", "slide_type": "quote"}]}"#;
        assert!(parse_outline(bad).is_err());
    }

    #[test]
    fn test_non_json_and_empty() {
        assert!(matches!(
            parse_outline("I cannot help with that."),
            Err(OutlineParseError::NoJsonObject)
        ));
        assert!(matches!(
            parse_outline(r#"{"topic": "x", "slides": []}"#),
            Err(OutlineParseError::NoSlides)
        ));
    }

    #[test]
    fn test_constraints_defaults_and_validation() {
        let c = TemplateConstraints::default();
        assert!(c.validate().is_ok());
        assert_eq!(c.clamp_slide_count(25), 20);
        assert_eq!(c.clamp_slide_count(1), 3);

        let inverted = TemplateConstraints {
            slides_minimum: 10,
            slides_maximum: 5,
            ..c
        };
        assert!(inverted.validate().is_err());

        let zero = TemplateConstraints {
            bullets_per_slide: 0,
            ..c
        };
        assert!(zero.validate().unwrap_err().contains("bullets_per_slide"));
    }
}
