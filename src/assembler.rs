//! Fill a template with an adapted outline and save it.

use crate::error::{Error, Result};
use crate::ooxml::OoxmlError;
use crate::ooxml::pptx::{LayoutDescriptor, Package, Placeholder, PlaceholderRole, PlaceholderText};
use crate::outline::{PresentationOutline, SlideOutline, SlideType};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// What [`build`] wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub output_path: PathBuf,
    pub slide_count: usize,
}

/// Picks a layout for a slide type.
pub trait Resolver {
    fn resolve<'l>(&self, layouts: &'l [LayoutDescriptor], slide_type: SlideType) -> Option<&'l LayoutDescriptor>;
}

impl<F> Resolver for F
where
    F: for<'l> Fn(&'l [LayoutDescriptor], SlideType) -> Option<&'l LayoutDescriptor>,
{
    fn resolve<'l>(&self, layouts: &'l [LayoutDescriptor], slide_type: SlideType) -> Option<&'l LayoutDescriptor> {
        self(layouts, slide_type)
    }
}

/// Paragraph lists for one slide, kept alive while its shapes borrow them.
struct SlideText {
    title: Vec<String>,
    subtitle: Vec<String>,
}

impl SlideText {
    fn new(slide: &SlideOutline) -> Self {
        let non_blank = |s: &str| (!s.trim().is_empty()).then(|| s.to_string());
        Self {
            title: non_blank(&slide.title).into_iter().collect(),
            subtitle: slide.subtitle.as_deref().and_then(non_blank).into_iter().collect(),
        }
    }
}

fn same(candidate: Option<&Placeholder>, ph: &Placeholder) -> bool {
    candidate.is_some_and(|c| std::ptr::eq(c, ph))
}

/// Placeholder text for every non-furniture placeholder of `layout`.
///
/// The first title, subtitle and body placeholders get the slide's text; an
/// object placeholder stands in for a missing body. Everything else is
/// instantiated empty.
fn slide_shapes<'a>(
    number: usize,
    layout: &'a LayoutDescriptor,
    slide: &'a SlideOutline,
    text: &'a SlideText,
) -> Vec<PlaceholderText<'a>> {
    let title = layout.find_role(PlaceholderRole::Title);
    let subtitle = layout.find_role(PlaceholderRole::Subtitle);
    let body = layout
        .find_role(PlaceholderRole::Body)
        .or_else(|| layout.find_object());

    if body.is_none() && !slide.bullets.is_empty() {
        tracing::debug!(slide = number, layout = %layout.name, "layout has no body placeholder; bullets dropped");
    }
    if subtitle.is_none() && !text.subtitle.is_empty() {
        tracing::debug!(slide = number, layout = %layout.name, "layout has no subtitle placeholder; subtitle dropped");
    }

    let empty: &'a [String] = &[];

    layout
        .placeholders()
        .iter()
        .filter(|ph| !ph.kind.is_slide_furniture())
        .map(|ph| {
            let paragraphs = if same(title, ph) {
                &text.title[..]
            } else if same(subtitle, ph) {
                &text.subtitle[..]
            } else if same(body, ph) {
                &slide.bullets[..]
            } else {
                empty
            };
            PlaceholderText {
                placeholder: ph,
                paragraphs,
            }
        })
        .collect()
}

/// Build a deck from `template_path` holding one slide per outline entry, in
/// order, and write it atomically to `output_path`.
///
/// Slides already in the template are dropped first; masters, layouts and
/// theme stay as they are.
pub fn build<R: Resolver>(
    outline: &PresentationOutline,
    resolver: &R,
    template_path: &Path,
    output_path: &Path,
) -> Result<BuildReport> {
    let mut package = Package::open(template_path)
        .map_err(|e| Error::assembly(format!("opening template {}", template_path.display()), e))?;
    let layouts = package
        .layouts()
        .map_err(|e| Error::assembly("reading template layouts", e))?;
    if layouts.is_empty() {
        return Err(Error::assembly(
            format!("template {}", template_path.display()),
            OoxmlError::InvalidFormat("template declares no slide layouts".into()),
        ));
    }
    tracing::info!(
        template = %template_path.display(),
        layouts = layouts.len(),
        "template loaded"
    );

    let removed = package
        .clear_slides()
        .map_err(|e| Error::assembly("removing template slides", e))?;
    if removed > 0 {
        tracing::debug!(removed, "removed slides shipped with the template");
    }

    let has_notes_master = package
        .notes_master_partname()
        .map_err(|e| Error::assembly("reading notes master", e))?
        .is_some();

    for (i, slide) in outline.slides.iter().enumerate() {
        let number = i + 1;
        let layout = resolver
            .resolve(&layouts, slide.slide_type)
            .ok_or_else(|| {
                Error::assembly(
                    format!("slide {number}"),
                    OoxmlError::InvalidFormat("no layout available".into()),
                )
            })?;

        let text = SlideText::new(slide);
        let shapes = slide_shapes(number, layout, slide, &text);

        let notes = slide.speaker_notes.as_deref().filter(|n| !n.trim().is_empty());
        if notes.is_some() && !has_notes_master {
            tracing::debug!(slide = number, "template has no notes master; speaker notes dropped");
        }

        package
            .add_slide(layout, &shapes, notes)
            .map_err(|e| Error::assembly(format!("adding slide {number}"), e))?;
        tracing::debug!(slide = number, slide_type = %slide.slide_type, layout = %layout.name, "slide added");
    }

    write_atomically(output_path, |writer| package.save_to(writer))
        .map_err(|e| Error::assembly(format!("writing {}", output_path.display()), e))?;

    tracing::info!(path = %output_path.display(), slides = package.slide_count(), "presentation saved");
    Ok(BuildReport {
        output_path: output_path.to_path_buf(),
        slide_count: package.slide_count(),
    })
}

/// Write `path` through `write` so that readers see either the old file or
/// the complete new one.
///
/// Missing parent directories are created. Bytes go to a temporary file in
/// the destination directory, which is renamed over `path` only after
/// `write` succeeds; on any error the temporary file is removed.
pub fn write_atomically<F>(path: &Path, write: F) -> crate::ooxml::Result<()>
where
    F: FnOnce(&mut dyn Write) -> crate::ooxml::Result<()>,
{
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        write(&mut writer)?;
        writer.flush()?;
    }
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| OoxmlError::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::adapt;
    use crate::ooxml::opc::PackURI;
    use crate::ooxml::opc::constants::relationship_type as rt;
    use crate::ooxml::pptx::{PlaceholderKind, resolve};
    use crate::ooxml::pptx::template::scaffold_template;
    use crate::outline::TemplateConstraints;

    fn template_in(dir: &Path) -> PathBuf {
        let path = dir.join("template.pptx");
        std::fs::write(&path, scaffold_template().unwrap()).unwrap();
        path
    }

    fn layout_of(package: &Package, slide: usize) -> String {
        let partname = &package.slide_partnames().unwrap()[slide];
        let part = package.opc().part(partname).unwrap();
        part.rels()
            .part_with_reltype(rt::SLIDE_LAYOUT)
            .unwrap()
            .target_partname()
            .unwrap()
            .to_string()
    }

    fn placeholder(kind: PlaceholderKind, idx: u32, name: &str) -> Placeholder {
        Placeholder {
            name: name.to_string(),
            kind,
            idx,
            orient: None,
            sz: None,
        }
    }

    #[test]
    fn test_body_placeholder_wins_over_object() {
        let layout = LayoutDescriptor::new(
            0,
            "Content with Object",
            PackURI::new("/ppt/slideLayouts/slideLayout1.xml").unwrap(),
            [
                placeholder(PlaceholderKind::Title, 0, "Title 1"),
                placeholder(PlaceholderKind::Object, 1, "Content Placeholder 2"),
                placeholder(PlaceholderKind::Body, 2, "Text Placeholder 3"),
                placeholder(PlaceholderKind::Footer, 11, "Footer Placeholder 4"),
            ]
            .into_iter()
            .collect(),
        );
        let slide = SlideOutline::new(SlideType::Content, "Ownership").with_bullets(["Moves", "Borrows"]);
        let text = SlideText::new(&slide);

        let shapes = slide_shapes(1, &layout, &slide, &text);
        let filled: Vec<_> = shapes
            .iter()
            .map(|s| (s.placeholder.name.as_str(), s.paragraphs.to_vec()))
            .collect();

        assert_eq!(
            filled,
            vec![
                ("Title 1", vec!["Ownership".to_string()]),
                ("Content Placeholder 2", vec![]),
                ("Text Placeholder 3", vec!["Moves".to_string(), "Borrows".to_string()]),
            ]
        );
    }

    fn slide_xml(package: &Package, slide: usize) -> String {
        let partname = &package.slide_partnames().unwrap()[slide];
        String::from_utf8(package.opc().part(partname).unwrap().blob().to_vec()).unwrap()
    }

    #[test]
    fn test_build_fills_placeholders() {
        let dir = tempfile::tempdir().unwrap();
        let template = template_in(dir.path());
        let output = dir.path().join("out").join("deck.pptx");

        let outline = PresentationOutline::new(
            "Rust",
            vec![
                SlideOutline::new(SlideType::Title, "Why Rust").with_subtitle("Safety & speed"),
                SlideOutline::new(SlideType::Content, "Benefits")
                    .with_bullets(["Memory safety", "Fearless <concurrency>"])
                    .with_speaker_notes("Mention the borrow checker"),
                SlideOutline::new(SlideType::Closing, "Questions?"),
            ],
        );

        let report = build(&outline, &resolve, &template, &output).unwrap();
        assert_eq!(report.slide_count, 3);
        assert!(output.is_file());

        let package = Package::open(&output).unwrap();
        assert_eq!(package.slide_count(), 3);
        assert_eq!(layout_of(&package, 0), "/ppt/slideLayouts/slideLayout1.xml");
        assert_eq!(layout_of(&package, 1), "/ppt/slideLayouts/slideLayout2.xml");
        assert_eq!(layout_of(&package, 2), "/ppt/slideLayouts/slideLayout2.xml");

        let title_slide = slide_xml(&package, 0);
        assert!(title_slide.contains("<a:t>Why Rust</a:t>"));
        assert!(title_slide.contains("<a:t>Safety &amp; speed</a:t>"));
        assert!(!title_slide.contains(r#"type="dt""#));

        let content = slide_xml(&package, 1);
        assert!(content.contains("<a:t>Memory safety</a:t>"));
        assert!(content.contains("<a:t>Fearless &lt;concurrency&gt;</a:t>"));
        assert!(!content.contains("Click to edit"));

        let closing = slide_xml(&package, 2);
        assert!(closing.contains("<a:t>Questions?</a:t>"));
        assert!(!closing.contains("Click to edit"));
    }

    #[test]
    fn test_requested_25_slides_yields_20() {
        let dir = tempfile::tempdir().unwrap();
        let template = template_in(dir.path());
        let output = dir.path().join("long.pptx");

        let slides = (0..25)
            .map(|i| {
                let slide_type = if i == 0 { SlideType::Title } else { SlideType::Content };
                SlideOutline::new(slide_type, format!("Slide {i}")).with_bullets(["Point"])
            })
            .collect();
        let outline = adapt(
            &PresentationOutline::new("long", slides),
            &TemplateConstraints::default(),
        );

        build(&outline, &resolve, &template, &output).unwrap();

        let package = Package::open(&output).unwrap();
        assert_eq!(package.slide_count(), 20);
        assert_eq!(layout_of(&package, 0), "/ppt/slideLayouts/slideLayout1.xml");
        assert!(slide_xml(&package, 0).contains("<a:t>Slide 0</a:t>"));
    }

    #[test]
    fn test_template_slides_are_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let template = template_in(dir.path());
        let first = dir.path().join("first.pptx");
        let second = dir.path().join("second.pptx");

        let outline = PresentationOutline::new(
            "x",
            vec![
                SlideOutline::new(SlideType::Title, "One"),
                SlideOutline::new(SlideType::Content, "Two"),
            ],
        );
        build(&outline, &resolve, &template, &first).unwrap();

        // A deck that already has slides can serve as a template
        let single = PresentationOutline::new("x", vec![SlideOutline::new(SlideType::Title, "Only")]);
        let report = build(&single, &resolve, &first, &second).unwrap();
        assert_eq!(report.slide_count, 1);
        assert_eq!(Package::open(&second).unwrap().slide_count(), 1);
    }

    #[test]
    fn test_failed_write_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("nested").join("deck.pptx");

        let result = write_atomically(&output, |writer| {
            writer.write_all(b"PK\x03\x04 partial")?;
            Err(OoxmlError::Xml("serialization failed".into()))
        });

        assert!(result.is_err());
        assert!(!output.exists());
        let leftovers: Vec<_> = std::fs::read_dir(output.parent().unwrap()).unwrap().collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_failed_write_keeps_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("deck.pptx");
        std::fs::write(&output, b"previous").unwrap();

        let result = write_atomically(&output, |_| Err(OoxmlError::Xml("boom".into())));
        assert!(result.is_err());
        assert_eq!(std::fs::read(&output).unwrap(), b"previous");
    }

    #[test]
    fn test_unopenable_template_is_assembly_failure() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.pptx");
        let outline = PresentationOutline::new("x", vec![SlideOutline::new(SlideType::Title, "t")]);

        let err = build(&outline, &resolve, &dir.path().join("missing.pptx"), &output).unwrap_err();
        assert!(matches!(err, Error::AssemblyFailed { .. }));
        assert!(!output.exists());
    }
}
