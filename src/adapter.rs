//! Fit an outline to a template's limits.
//!
//! [`adapt`] never fails and never invents content: over-long text is cut at
//! a word boundary, surplus bullets and slides are dropped from the end, and
//! slide types are normalised so the deck opens with its only title slide.
//!
//! What cutting cannot fix (an empty title, a content slide with too few
//! bullets, a deck below the template minimum) is reported by [`assess`]
//! instead.

use crate::outline::{PresentationOutline, SlideOutline, SlideType, TemplateConstraints};

/// Appended to every truncated field.
pub const ELLIPSIS: char = '…';

/// Bullets a content slide is expected to carry, capped at the template's
/// `bullets_per_slide`.
pub const MIN_CONTENT_BULLETS: usize = 3;

/// A problem in an adapted outline that only new content could repair.
///
/// Slide numbers are 1-based positions in the outline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentIssue {
    EmptyTitle { slide: usize },
    MissingBullets { slide: usize },
    TooFewBullets { slide: usize, count: usize, expected: usize },
    ClosingWithoutBullets { slide: usize },
    ShortDeck { count: usize, minimum: usize },
}

impl ContentIssue {
    /// An empty title or a bare content slide leaves a visibly broken slide.
    pub fn is_severe(&self) -> bool {
        matches!(self, Self::EmptyTitle { .. } | Self::MissingBullets { .. })
    }
}

impl std::fmt::Display for ContentIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle { slide } => write!(f, "slide {slide} has an empty title"),
            Self::MissingBullets { slide } => write!(f, "content slide {slide} has no bullets"),
            Self::TooFewBullets {
                slide,
                count,
                expected,
            } => write!(
                f,
                "content slide {slide} has {count} bullet(s); expected at least {expected}"
            ),
            Self::ClosingWithoutBullets { slide } => {
                write!(f, "closing slide {slide} has no bullets")
            },
            Self::ShortDeck { count, minimum } => write!(
                f,
                "outline has {count} slide(s); the template expects at least {minimum}"
            ),
        }
    }
}

/// Shorten `text` to at most `max_chars` characters without splitting a word.
///
/// Surrounding whitespace is trimmed first. Text that already fits is
/// returned as is; otherwise the longest whole-word prefix that leaves room
/// for [`ELLIPSIS`] is kept. A first word longer than the budget leaves only
/// the ellipsis.
pub fn truncate(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }

    let cut = text
        .char_indices()
        .nth(max_chars - 1)
        .map_or(text.len(), |(i, _)| i);
    let head = &text[..cut];
    let at_word_end = text[cut..].starts_with(char::is_whitespace);

    let kept = if at_word_end {
        head
    } else {
        head.rfind(char::is_whitespace).map_or("", |pos| &head[..pos])
    };

    let mut out = String::with_capacity(kept.len() + ELLIPSIS.len_utf8());
    out.push_str(kept.trim_end());
    out.push(ELLIPSIS);
    out
}

fn adapt_text(field: &str, slide: usize, text: &str, max_chars: usize) -> String {
    let adapted = truncate(text, max_chars);
    if adapted.chars().count() < text.trim().chars().count() {
        tracing::debug!(slide, field, max_chars, "truncated to '{}'", adapted);
    }
    adapted
}

fn adapt_slide(number: usize, slide: &SlideOutline, c: &TemplateConstraints) -> SlideOutline {
    let mut bullets: Vec<String> = slide
        .bullets
        .iter()
        .map(|b| b.trim())
        .filter(|b| !b.is_empty())
        .map(|b| adapt_text("bullet", number, b, c.bullet_max_length))
        .collect();

    if bullets.len() > c.bullets_per_slide {
        tracing::debug!(
            slide = number,
            dropped = bullets.len() - c.bullets_per_slide,
            "dropping trailing bullets"
        );
        bullets.truncate(c.bullets_per_slide);
    }

    SlideOutline {
        slide_number: slide.slide_number,
        slide_type: slide.slide_type,
        title: adapt_text("title", number, &slide.title, c.title_max_length),
        subtitle: slide
            .subtitle
            .as_deref()
            .map(|s| adapt_text("subtitle", number, s, c.subtitle_max_length)),
        bullets,
        speaker_notes: slide.speaker_notes.clone(),
    }
}

/// Slide type each position may carry: the first slide is the title slide,
/// a closing slide can only be last, and everything else is content.
fn normalise_slide_type(position: usize, count: usize, declared: SlideType) -> SlideType {
    match (position, declared) {
        (0, _) => SlideType::Title,
        (_, SlideType::Title) => SlideType::Content,
        (p, SlideType::Closing) if p + 1 != count => SlideType::Content,
        (_, other) => other,
    }
}

/// Rewrite `outline` so every field and count respects `constraints`.
///
/// The result is a pure function of the inputs, and adapting an adapted
/// outline changes nothing.
pub fn adapt(outline: &PresentationOutline, constraints: &TemplateConstraints) -> PresentationOutline {
    let mut slides: Vec<SlideOutline> = outline
        .slides
        .iter()
        .enumerate()
        .map(|(i, slide)| adapt_slide(i + 1, slide, constraints))
        .collect();

    if slides.len() > constraints.slides_maximum {
        tracing::warn!(
            received = slides.len(),
            maximum = constraints.slides_maximum,
            "trimming trailing slides"
        );
        slides.truncate(constraints.slides_maximum);
    } else if slides.len() < constraints.slides_minimum {
        tracing::debug!(
            received = slides.len(),
            minimum = constraints.slides_minimum,
            "outline is shorter than the template minimum; keeping it as is"
        );
    }

    let count = slides.len();
    for (position, slide) in slides.iter_mut().enumerate() {
        let normalised = normalise_slide_type(position, count, slide.slide_type);
        if normalised != slide.slide_type {
            tracing::debug!(
                slide = position + 1,
                from = %slide.slide_type,
                to = %normalised,
                "normalised slide type"
            );
            slide.slide_type = normalised;
        }
    }

    PresentationOutline {
        title: outline
            .title
            .as_deref()
            .map(|t| adapt_text("deck title", 0, t, constraints.title_max_length)),
        topic: outline.topic.clone(),
        target_audience: outline.target_audience.clone(),
        key_message: outline.key_message.clone(),
        slides,
    }
}

/// Content problems of an adapted outline, slide by slide and then for the
/// deck as a whole.
pub fn assess(outline: &PresentationOutline, constraints: &TemplateConstraints) -> Vec<ContentIssue> {
    let expected = MIN_CONTENT_BULLETS.min(constraints.bullets_per_slide);
    let mut issues = Vec::new();

    for (position, slide) in outline.slides.iter().enumerate() {
        let number = position + 1;
        let bullets = slide.bullets.iter().filter(|b| !b.trim().is_empty()).count();

        if slide.title.trim().is_empty() {
            issues.push(ContentIssue::EmptyTitle { slide: number });
        }
        match slide.slide_type {
            SlideType::Content if bullets == 0 => {
                issues.push(ContentIssue::MissingBullets { slide: number })
            },
            SlideType::Content if bullets < expected => issues.push(ContentIssue::TooFewBullets {
                slide: number,
                count: bullets,
                expected,
            }),
            SlideType::Closing if bullets == 0 => {
                issues.push(ContentIssue::ClosingWithoutBullets { slide: number })
            },
            _ => {},
        }
    }

    if outline.slides.len() < constraints.slides_minimum {
        issues.push(ContentIssue::ShortDeck {
            count: outline.slides.len(),
            minimum: constraints.slides_minimum,
        });
    }

    issues
}

/// [`adapt`], then [`assess`] the result.
pub fn adapt_and_assess(
    outline: &PresentationOutline,
    constraints: &TemplateConstraints,
) -> (PresentationOutline, Vec<ContentIssue>) {
    let adapted = adapt(outline, constraints);
    let issues = assess(&adapted, constraints);
    (adapted, issues)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn constraints() -> TemplateConstraints {
        TemplateConstraints::default()
    }

    #[test]
    fn test_truncate_keeps_whole_words() {
        assert_eq!(truncate("AI Strategy", 5), "AI…");
        assert_eq!(truncate("AI Strategy", 11), "AI Strategy");
        assert_eq!(truncate("one two three", 8), "one two…");
        assert_eq!(truncate("Supercalifragilistic", 6), "…");
        assert_eq!(truncate("   padded   ", 6), "padded");
        assert_eq!(truncate("", 5), "");
    }

    #[test]
    fn test_truncate_counts_characters_not_bytes() {
        assert_eq!(truncate("über straße", 11), "über straße");
        assert_eq!(truncate("über straße", 8), "über…");
    }

    #[test]
    fn test_title_scenario() {
        let outline = PresentationOutline::new(
            "AI",
            vec![SlideOutline::new(SlideType::Title, "AI Strategy")],
        );
        let c = TemplateConstraints {
            title_max_length: 5,
            ..constraints()
        };

        let title = &adapt(&outline, &c).slides[0].title;
        assert!(title.chars().count() <= 5);
        assert_eq!(title, "AI…");
    }

    #[test]
    fn test_bullet_scenario() {
        let bullets: Vec<String> = (1..=7).map(|i| format!("Point {i}")).collect();
        let outline = PresentationOutline::new(
            "x",
            vec![
                SlideOutline::new(SlideType::Title, "Deck"),
                SlideOutline::new(SlideType::Content, "Points").with_bullets(bullets.clone()),
            ],
        );

        let adapted = adapt(&outline, &constraints());
        assert_eq!(adapted.slides[1].bullets, bullets[..5]);
    }

    #[test]
    fn test_blank_bullets_are_dropped_before_counting() {
        let outline = PresentationOutline::new(
            "x",
            vec![SlideOutline::new(SlideType::Title, "Deck").with_bullets([
                "  ", "a", "", "b", "c", "d", "e", "f",
            ])],
        );
        let adapted = adapt(&outline, &constraints());
        assert_eq!(adapted.slides[0].bullets, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_slide_types_are_normalised() {
        let outline = PresentationOutline::new(
            "x",
            vec![
                SlideOutline::new(SlideType::Content, "Opening"),
                SlideOutline::new(SlideType::Title, "Second title"),
                SlideOutline::new(SlideType::Closing, "Early close"),
                SlideOutline::new(SlideType::Closing, "Close"),
            ],
        );
        let types: Vec<_> = adapt(&outline, &constraints())
            .slides
            .iter()
            .map(|s| s.slide_type)
            .collect();
        assert_eq!(
            types,
            vec![
                SlideType::Title,
                SlideType::Content,
                SlideType::Content,
                SlideType::Closing
            ]
        );
    }

    #[test]
    fn test_slide_count_policy() {
        let many: Vec<_> = (0..25)
            .map(|i| SlideOutline::new(SlideType::Content, format!("Slide {i}")))
            .collect();
        let adapted = adapt(&PresentationOutline::new("x", many), &constraints());
        assert_eq!(adapted.slides.len(), 20);
        assert_eq!(adapted.slides[0].slide_type, SlideType::Title);
        assert_eq!(adapted.slides[0].title, "Slide 0");

        let few = vec![SlideOutline::new(SlideType::Title, "Only")];
        let adapted = adapt(&PresentationOutline::new("x", few), &constraints());
        assert_eq!(adapted.slides.len(), 1);
    }

    #[test]
    fn test_empty_fields_stay_empty() {
        let outline = PresentationOutline::new(
            "x",
            vec![SlideOutline::new(SlideType::Title, "").with_subtitle("")],
        );
        let adapted = adapt(&outline, &constraints());
        assert_eq!(adapted.slides[0].title, "");
        assert_eq!(adapted.slides[0].subtitle.as_deref(), Some(""));
    }

    #[test]
    fn test_assess_reports_gaps_adapt_cannot_fill() {
        let outline = PresentationOutline::new(
            "x",
            vec![
                SlideOutline::new(SlideType::Title, "Deck"),
                SlideOutline::new(SlideType::Content, "  "),
                SlideOutline::new(SlideType::Content, "Thin").with_bullets(["one", "two"]),
                SlideOutline::new(SlideType::Content, "Full").with_bullets(["a", "b", "c"]),
                SlideOutline::new(SlideType::Closing, "Thanks"),
            ],
        );

        let (adapted, issues) = adapt_and_assess(&outline, &constraints());

        assert_eq!(adapted, adapt(&outline, &constraints()));
        assert_eq!(
            issues,
            vec![
                ContentIssue::EmptyTitle { slide: 2 },
                ContentIssue::MissingBullets { slide: 2 },
                ContentIssue::TooFewBullets {
                    slide: 3,
                    count: 2,
                    expected: MIN_CONTENT_BULLETS
                },
                ContentIssue::ClosingWithoutBullets { slide: 5 },
            ]
        );
        assert!(issues[0].is_severe());
        assert!(!issues[2].is_severe());
        assert_eq!(issues[1].to_string(), "content slide 2 has no bullets");
    }

    #[test]
    fn test_assess_short_deck_and_small_bullet_limit() {
        let outline = PresentationOutline::new(
            "x",
            vec![
                SlideOutline::new(SlideType::Title, "Deck"),
                SlideOutline::new(SlideType::Content, "Two").with_bullets(["a", "b"]),
            ],
        );
        let c = TemplateConstraints {
            bullets_per_slide: 2,
            ..constraints()
        };

        assert_eq!(
            assess(&adapt(&outline, &c), &c),
            vec![ContentIssue::ShortDeck { count: 2, minimum: 3 }]
        );
    }

    fn arb_slide() -> impl Strategy<Value = SlideOutline> {
        (
            prop_oneof![
                Just(SlideType::Title),
                Just(SlideType::Content),
                Just(SlideType::Closing)
            ],
            "[a-zA-Z ]{0,40}",
            proptest::option::of("[a-zA-Zé ]{0,40}"),
            prop::collection::vec("[a-z ]{0,30}", 0..9),
        )
            .prop_map(|(slide_type, title, subtitle, bullets)| SlideOutline {
                slide_number: None,
                slide_type,
                title,
                subtitle,
                bullets,
                speaker_notes: None,
            })
    }

    fn arb_outline() -> impl Strategy<Value = PresentationOutline> {
        prop::collection::vec(arb_slide(), 0..12)
            .prop_map(|slides| PresentationOutline::new("topic", slides))
    }

    fn arb_constraints() -> impl Strategy<Value = TemplateConstraints> {
        (1usize..30, 1usize..30, 1usize..30, 1usize..6, 1usize..5, 0usize..8).prop_map(
            |(title, subtitle, bullet, per_slide, min, extra)| TemplateConstraints {
                title_max_length: title,
                subtitle_max_length: subtitle,
                bullet_max_length: bullet,
                bullets_per_slide: per_slide,
                slides_minimum: min,
                slides_maximum: min + extra,
            },
        )
    }

    proptest! {
        #[test]
        fn prop_adapt_is_idempotent(outline in arb_outline(), c in arb_constraints()) {
            let once = adapt(&outline, &c);
            prop_assert_eq!(adapt(&once, &c), once);
        }

        #[test]
        fn prop_adapt_respects_limits(outline in arb_outline(), c in arb_constraints()) {
            let adapted = adapt(&outline, &c);
            prop_assert!(adapted.slides.len() <= c.slides_maximum);
            for slide in &adapted.slides {
                prop_assert!(slide.title.chars().count() <= c.title_max_length);
                if let Some(subtitle) = &slide.subtitle {
                    prop_assert!(subtitle.chars().count() <= c.subtitle_max_length);
                }
                prop_assert!(slide.bullets.len() <= c.bullets_per_slide);
                for bullet in &slide.bullets {
                    prop_assert!(bullet.chars().count() <= c.bullet_max_length);
                }
            }
        }

        #[test]
        fn prop_truncate_never_splits_a_word(text in "[a-z]{1,8}( [a-z]{1,8}){0,6}", max in 1usize..40) {
            let out = truncate(&text, max);
            prop_assert!(out.chars().count() <= max);

            let kept = out.strip_suffix(ELLIPSIS).unwrap_or(&out);
            prop_assert!(text.starts_with(kept));
            let next = text[kept.len()..].chars().next();
            prop_assert!(next.is_none_or(|c| c == ' ' || kept.is_empty()));
        }
    }
}
