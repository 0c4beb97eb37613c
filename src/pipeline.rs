//! The `generate` run: request, adapt, resolve, assemble.

use crate::adapter::{ContentIssue, adapt_and_assess};
use crate::assembler::build;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::generation::{ModelClient, OutlineRequest, OutlineRequester, RetryPolicy, Tone};
use crate::ooxml::pptx::resolve;
use crate::templates::TemplateCatalog;
use std::path::{Path, PathBuf};

/// User parameters of one generation; unset fields fall back to [`Config`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateRequest {
    pub topic: String,
    pub slide_count: Option<usize>,
    pub audience: Option<String>,
    pub tone: Option<Tone>,
    pub template: Option<String>,
    pub output: Option<PathBuf>,
}

/// Longest file stem, in characters, taken from a topic.
pub const MAX_STEM_CHARS: usize = 30;

/// What one [`generate`] run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateReport {
    pub output_path: PathBuf,
    pub slide_count: usize,
    /// Content problems found after adaptation; the deck is written anyway
    pub issues: Vec<ContentIssue>,
}

/// `<output_dir>/<topic>.pptx`, with whitespace and path separators in the
/// topic replaced by `_` and the stem cut to [`MAX_STEM_CHARS`].
pub fn default_output_path(output_dir: &Path, topic: &str) -> PathBuf {
    let stem: String = topic
        .trim()
        .chars()
        .take(MAX_STEM_CHARS)
        .map(|c| {
            if c.is_whitespace() || matches!(c, '/' | '\\') {
                '_'
            } else {
                c
            }
        })
        .collect();
    output_dir.join(format!("{stem}.pptx"))
}

/// Run the whole pipeline once.
///
/// Input and template problems are reported before the model is called.
pub async fn generate<C: ModelClient>(
    config: &Config,
    catalog: &mut TemplateCatalog,
    client: C,
    request: &GenerateRequest,
) -> Result<GenerateReport> {
    let topic = request.topic.trim();
    if topic.is_empty() {
        return Err(Error::InvalidInput("topic must not be empty".into()));
    }

    let template_name = request
        .template
        .as_deref()
        .unwrap_or(&config.default_template);
    let constraints = catalog.constraints(template_name)?;
    let template_path = catalog.template_path(template_name)?;

    let requested = request.slide_count.unwrap_or(config.default_slides);
    let slide_count = constraints.clamp_slide_count(requested);
    if slide_count != requested {
        tracing::info!(requested, slide_count, "slide count clamped to template range");
    }

    let output_path = request
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&config.output_dir, topic));

    let mut outline_request = OutlineRequest::new(topic, slide_count)
        .with_tone(request.tone.unwrap_or(config.default_tone));
    if let Some(audience) = &request.audience {
        outline_request = outline_request.with_audience(audience.clone());
    }

    let requester = OutlineRequester::new(client, RetryPolicy::new(config.max_retries));
    let outline = requester
        .request_outline(&outline_request, &constraints)
        .await?;

    let (adapted, issues) = adapt_and_assess(&outline, &constraints);
    for issue in &issues {
        tracing::warn!(severe = issue.is_severe(), "{}", issue);
    }

    let report = build(&adapted, &resolve, &template_path, &output_path)?;
    Ok(GenerateReport {
        output_path: report.output_path,
        slide_count: report.slide_count,
        issues,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::ModelError;
    use crate::ooxml::pptx::Package;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FixedClient {
        response: std::result::Result<String, ModelError>,
        calls: AtomicU32,
    }

    impl FixedClient {
        fn new(response: std::result::Result<String, ModelError>) -> Self {
            Self {
                response,
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl ModelClient for FixedClient {
        async fn complete(&self, _system: &str, _user: &str) -> std::result::Result<String, ModelError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.response.clone()
        }

        fn model_name(&self) -> &str {
            "fixed"
        }
    }

    fn outline_json(slides: usize) -> String {
        let slides: Vec<_> = (0..slides)
            .map(|i| {
                serde_json::json!({
                    "slide_type": if i == 0 { "title" } else { "content" },
                    "title": format!("Slide {i}"),
                    "bullets": ["one", "two", "three", "four", "five", "six", "seven"]
                })
            })
            .collect();
        serde_json::json!({"topic": "Testing", "slides": slides}).to_string()
    }

    fn setup() -> (tempfile::TempDir, Config, TemplateCatalog) {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            templates_dir: dir.path().join("templates"),
            output_dir: dir.path().join("output"),
            ..Config::default()
        };
        let mut catalog = TemplateCatalog::new(&config.templates_dir);
        catalog.scaffold("corporate", false).unwrap();
        (dir, config, catalog)
    }

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("out"), " AI in  retail/2025 "),
            Path::new("out").join("AI_in__retail_2025.pptx")
        );
    }

    #[test]
    fn test_default_output_path_caps_long_topics() {
        let topic = "Économie circulaire et transition énergétique ".repeat(6);
        assert!(topic.len() >= 250);

        let path = default_output_path(Path::new("out"), &topic);
        let stem = path.file_stem().unwrap().to_str().unwrap();
        assert_eq!(stem.chars().count(), MAX_STEM_CHARS);
        assert_eq!(stem, "Économie_circulaire_et_transit");
    }

    #[tokio::test]
    async fn test_generate_with_long_topic_writes_default_path() {
        let (_dir, config, mut catalog) = setup();
        let client = FixedClient::new(Ok(outline_json(4)));
        let request = GenerateRequest {
            topic: "How small and medium sized manufacturers can adopt machine learning ".repeat(4),
            ..GenerateRequest::default()
        };

        let report = generate(&config, &mut catalog, &client, &request).await.unwrap();

        assert_eq!(report.output_path, config.output_dir.join("How_small_and_medium_sized_man.pptx"));
        assert!(report.output_path.is_file());
    }

    #[tokio::test]
    async fn test_generate_trims_to_template_maximum() {
        let (_dir, config, mut catalog) = setup();
        let client = FixedClient::new(Ok(outline_json(25)));
        let request = GenerateRequest {
            topic: "Testing at scale".into(),
            slide_count: Some(25),
            ..GenerateRequest::default()
        };

        let report = generate(&config, &mut catalog, &client, &request).await.unwrap();

        assert_eq!(report.slide_count, 20);
        assert_eq!(report.output_path, config.output_dir.join("Testing_at_scale.pptx"));
        let package = Package::open(&report.output_path).unwrap();
        assert_eq!(package.slide_count(), 20);
    }

    #[tokio::test]
    async fn test_generate_reports_content_issues() {
        let (_dir, config, mut catalog) = setup();
        let outline = serde_json::json!({
            "topic": "Testing",
            "slides": [
                {"slide_type": "title", "title": "Testing"},
                {"slide_type": "content", "title": "Empty", "bullets": []},
                {"slide_type": "content", "title": "Full", "bullets": ["a", "b", "c"]}
            ]
        });
        let client = FixedClient::new(Ok(outline.to_string()));
        let request = GenerateRequest {
            topic: "Testing".into(),
            ..GenerateRequest::default()
        };

        let report = generate(&config, &mut catalog, &client, &request).await.unwrap();

        assert_eq!(report.slide_count, 3);
        assert_eq!(report.issues, vec![ContentIssue::MissingBullets { slide: 2 }]);
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
        assert!(report.output_path.is_file());
    }

    #[tokio::test]
    async fn test_unknown_template_fails_before_model_call() {
        let (_dir, config, mut catalog) = setup();
        let client = FixedClient::new(Ok(outline_json(3)));
        let request = GenerateRequest {
            topic: "x".into(),
            template: Some("missing".into()),
            ..GenerateRequest::default()
        };

        let err = generate(&config, &mut catalog, &client, &request).await.unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_topic_is_invalid_input() {
        let (_dir, config, mut catalog) = setup();
        let client = FixedClient::new(Ok(outline_json(3)));
        let request = GenerateRequest {
            topic: "   ".into(),
            ..GenerateRequest::default()
        };

        let err = generate(&config, &mut catalog, &client, &request).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_permanent_failure_writes_nothing() {
        let (_dir, config, mut catalog) = setup();
        let client = FixedClient::new(Err(ModelError::QuotaExhausted("insufficient_quota".into())));
        let request = GenerateRequest {
            topic: "x".into(),
            ..GenerateRequest::default()
        };

        let err = generate(&config, &mut catalog, &client, &request).await.unwrap_err();
        assert!(matches!(err, Error::GenerationFailed(_)));
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
        assert!(!config.output_dir.join("x.pptx").exists());
    }
}
