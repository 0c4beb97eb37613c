//! Prompt text sent to the model.

use crate::outline::TemplateConstraints;
use std::fmt::Write as FmtWrite;
use std::str::FromStr;

/// Voice of the generated deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Tone {
    #[default]
    Professional,
    Casual,
    Technical,
    Persuasive,
}

impl Tone {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Professional => "professional",
            Self::Casual => "casual",
            Self::Technical => "technical",
            Self::Persuasive => "persuasive",
        }
    }
}

impl std::fmt::Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "professional" => Ok(Self::Professional),
            "casual" => Ok(Self::Casual),
            "technical" => Ok(Self::Technical),
            "persuasive" => Ok(Self::Persuasive),
            other => Err(format!(
                "unknown tone '{other}' (expected professional, casual, technical or persuasive)"
            )),
        }
    }
}

/// What to ask the model for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineRequest {
    pub topic: String,
    pub slide_count: usize,
    pub audience: Option<String>,
    pub tone: Tone,
}

impl OutlineRequest {
    pub fn new(topic: impl Into<String>, slide_count: usize) -> Self {
        Self {
            topic: topic.into(),
            slide_count,
            audience: None,
            tone: Tone::default(),
        }
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    pub fn with_tone(mut self, tone: Tone) -> Self {
        self.tone = tone;
        self
    }
}

const RESPONSE_SHAPE: &str = r#"You must return a valid JSON object with this exact structure:
{
  "title": "Main presentation title",
  "topic": "The input topic",
  "target_audience": "Intended audience",
  "key_message": "Core message of presentation",
  "slides": [
    {
      "slide_number": 1,
      "slide_type": "title",
      "title": "Presentation Title",
      "subtitle": "Subtitle or tagline",
      "speaker_notes": "Optional speaker notes"
    },
    {
      "slide_number": 2,
      "slide_type": "content",
      "title": "Slide Title",
      "bullets": ["Point 1", "Point 2", "Point 3"],
      "speaker_notes": "Optional notes"
    },
    {
      "slide_number": 3,
      "slide_type": "closing",
      "title": "Closing Title",
      "bullets": ["Takeaway"]
    }
  ]
}
"#;

/// Instructions embedding the tone and the template's limits.
pub fn system_prompt(tone: Tone, constraints: &TemplateConstraints) -> String {
    let mut prompt = String::with_capacity(2048);

    prompt.push_str("You are a professional presentation designer and strategist.\n");
    prompt.push_str("Generate presentations that are:\n");
    prompt.push_str("- Engaging, clear, and impactful\n");
    prompt.push_str("- Concise with one key idea per slide\n");
    let _ = writeln!(prompt, "- Written in a {tone} tone");
    prompt.push_str("- Credible and appropriate for the audience\n\n");

    prompt.push_str("IMPORTANT CONSTRAINTS:\n");
    let _ = writeln!(prompt, "- Titles must be at most {} characters", constraints.title_max_length);
    let _ = writeln!(
        prompt,
        "- Subtitles must be at most {} characters",
        constraints.subtitle_max_length
    );
    let _ = writeln!(
        prompt,
        "- Each bullet must be at most {} characters",
        constraints.bullet_max_length
    );
    let _ = writeln!(
        prompt,
        "- At most {} bullets per slide",
        constraints.bullets_per_slide
    );
    let _ = writeln!(
        prompt,
        "- Between {} and {} slides in total",
        constraints.slides_minimum, constraints.slides_maximum
    );
    prompt.push_str("- The first slide is the only \"title\" slide; a \"closing\" slide, if any, is last\n");
    prompt.push_str("- Return valid JSON only, with no additional text\n\n");

    prompt.push_str(RESPONSE_SHAPE);
    prompt
}

/// The request itself: topic, slide count and audience.
pub fn user_prompt(request: &OutlineRequest) -> String {
    let n = request.slide_count;
    let mut prompt = String::with_capacity(512);

    let _ = writeln!(prompt, "Create a {n}-slide presentation about: {}", request.topic.trim());
    prompt.push_str("\nStructure:\n");
    prompt.push_str("- Slide 1: Title slide with a compelling opening\n");
    if n > 2 {
        let _ = writeln!(prompt, "- Slides 2-{}: Content slides with key points", n - 1);
    }
    if n > 1 {
        let _ = writeln!(prompt, "- Slide {n}: Closing or summary slide");
    }
    prompt.push('\n');

    if let Some(audience) = request.audience.as_deref().filter(|a| !a.trim().is_empty()) {
        let _ = writeln!(prompt, "Target audience: {}", audience.trim());
    }
    let _ = writeln!(prompt, "Tone: {}", request.tone);

    prompt.push_str("\nMake it clear, actionable and ready for delivery.\n");
    prompt.push_str("Return only valid JSON, no other text.");
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_embeds_constraints() {
        let constraints = TemplateConstraints {
            title_max_length: 42,
            bullets_per_slide: 4,
            ..TemplateConstraints::default()
        };
        let prompt = system_prompt(Tone::Technical, &constraints);

        assert!(prompt.contains("technical tone"));
        assert!(prompt.contains("at most 42 characters"));
        assert!(prompt.contains("At most 4 bullets"));
        assert!(prompt.contains("Between 3 and 20 slides"));
        assert!(prompt.contains(r#""slides": ["#));
    }

    #[test]
    fn test_user_prompt() {
        let request = OutlineRequest::new("  Edge computing ", 6)
            .with_audience("CTOs")
            .with_tone(Tone::Persuasive);
        let prompt = user_prompt(&request);

        assert!(prompt.starts_with("Create a 6-slide presentation about: Edge computing\n"));
        assert!(prompt.contains("Slides 2-5"));
        assert!(prompt.contains("Slide 6: Closing"));
        assert!(prompt.contains("Target audience: CTOs"));
        assert!(prompt.contains("Tone: persuasive"));
    }

    #[test]
    fn test_user_prompt_single_slide() {
        let prompt = user_prompt(&OutlineRequest::new("x", 1));
        assert!(!prompt.contains("Slides 2-"));
        assert!(!prompt.contains("Closing"));
        assert!(!prompt.contains("Target audience"));
    }

    #[test]
    fn test_tone_from_str() {
        assert_eq!("Casual".parse::<Tone>().unwrap(), Tone::Casual);
        assert!("angry".parse::<Tone>().unwrap_err().contains("angry"));
    }
}
