/// Slide and notes-slide XML for generated slides.
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::rel::escape_xml;
use crate::ooxml::pptx::shapes::Placeholder;
use std::fmt::Write as FmtWrite;

/// One placeholder to instantiate on a new slide and the paragraphs it gets.
///
/// An empty `paragraphs` slice yields a placeholder with no text, so the
/// layout's prompt text never shows through.
#[derive(Debug, Clone, Copy)]
pub struct PlaceholderText<'a> {
    pub placeholder: &'a Placeholder,
    pub paragraphs: &'a [String],
}

const SLIDE_NAMESPACES: &str = concat!(
    r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
    r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
    r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#
);

/// XML of a slide holding the given placeholders, in order.
///
/// Shapes carry no geometry of their own; position and formatting are
/// inherited from the layout placeholder with the same type and idx.
pub fn slide_xml(shapes: &[PlaceholderText<'_>]) -> Result<String> {
    let mut xml = String::with_capacity(1024 + shapes.len() * 512);

    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    write!(xml, "<p:sld {SLIDE_NAMESPACES}>").map_err(|e| OoxmlError::Xml(e.to_string()))?;
    xml.push_str("<p:cSld>");
    xml.push_str("<p:spTree>");
    write_group_properties(&mut xml);

    for (i, shape) in shapes.iter().enumerate() {
        write_placeholder_shape(&mut xml, i as u32 + 2, shape)?;
    }

    xml.push_str("</p:spTree>");
    xml.push_str("</p:cSld>");
    xml.push_str(r#"<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>"#);
    xml.push_str("</p:sld>");

    Ok(xml)
}

/// XML of a notes slide: the slide image plus one paragraph per line of `notes`.
pub fn notes_slide_xml(notes: &str) -> Result<String> {
    let mut xml = String::with_capacity(2048);

    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    write!(xml, "<p:notes {SLIDE_NAMESPACES}>").map_err(|e| OoxmlError::Xml(e.to_string()))?;
    xml.push_str("<p:cSld>");
    xml.push_str("<p:spTree>");
    write_group_properties(&mut xml);

    // Slide image
    xml.push_str("<p:sp>");
    xml.push_str("<p:nvSpPr>");
    xml.push_str(r#"<p:cNvPr id="2" name="Slide Image Placeholder 1"/>"#);
    xml.push_str(r#"<p:cNvSpPr><a:spLocks noGrp="1" noRot="1" noChangeAspect="1"/></p:cNvSpPr>"#);
    xml.push_str(r#"<p:nvPr><p:ph type="sldImg"/></p:nvPr>"#);
    xml.push_str("</p:nvSpPr>");
    xml.push_str("<p:spPr/>");
    xml.push_str("</p:sp>");

    // Notes text
    xml.push_str("<p:sp>");
    xml.push_str("<p:nvSpPr>");
    xml.push_str(r#"<p:cNvPr id="3" name="Notes Placeholder 2"/>"#);
    xml.push_str(r#"<p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr>"#);
    xml.push_str(r#"<p:nvPr><p:ph type="body" idx="1"/></p:nvPr>"#);
    xml.push_str("</p:nvSpPr>");
    xml.push_str("<p:spPr/>");
    xml.push_str("<p:txBody>");
    xml.push_str("<a:bodyPr/>");
    xml.push_str("<a:lstStyle/>");
    let lines: Vec<String> = notes.lines().map(str::to_string).collect();
    write_paragraphs(&mut xml, &lines)?;
    xml.push_str("</p:txBody>");
    xml.push_str("</p:sp>");

    xml.push_str("</p:spTree>");
    xml.push_str("</p:cSld>");
    xml.push_str(r#"<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>"#);
    xml.push_str("</p:notes>");

    Ok(xml)
}

fn write_group_properties(xml: &mut String) {
    xml.push_str("<p:nvGrpSpPr>");
    xml.push_str(r#"<p:cNvPr id="1" name=""/>"#);
    xml.push_str("<p:cNvGrpSpPr/>");
    xml.push_str("<p:nvPr/>");
    xml.push_str("</p:nvGrpSpPr>");
    xml.push_str("<p:grpSpPr>");
    xml.push_str("<a:xfrm>");
    xml.push_str(r#"<a:off x="0" y="0"/>"#);
    xml.push_str(r#"<a:ext cx="0" cy="0"/>"#);
    xml.push_str(r#"<a:chOff x="0" y="0"/>"#);
    xml.push_str(r#"<a:chExt cx="0" cy="0"/>"#);
    xml.push_str("</a:xfrm>");
    xml.push_str("</p:grpSpPr>");
}

fn write_placeholder_shape(xml: &mut String, id: u32, shape: &PlaceholderText<'_>) -> Result<()> {
    let ph = shape.placeholder;

    xml.push_str("<p:sp>");
    xml.push_str("<p:nvSpPr>");
    write!(
        xml,
        r#"<p:cNvPr id="{}" name="{}"/>"#,
        id,
        escape_xml(&ph.name)
    )
    .map_err(|e| OoxmlError::Xml(e.to_string()))?;
    xml.push_str(r#"<p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr>"#);

    xml.push_str("<p:nvPr><p:ph");
    if let Some(type_attr) = ph.kind.type_attr() {
        write!(xml, r#" type="{}""#, escape_xml(type_attr))
            .map_err(|e| OoxmlError::Xml(e.to_string()))?;
    }
    if let Some(ref orient) = ph.orient {
        write!(xml, r#" orient="{}""#, escape_xml(orient))
            .map_err(|e| OoxmlError::Xml(e.to_string()))?;
    }
    if let Some(ref sz) = ph.sz {
        write!(xml, r#" sz="{}""#, escape_xml(sz)).map_err(|e| OoxmlError::Xml(e.to_string()))?;
    }
    if ph.idx != 0 {
        write!(xml, r#" idx="{}""#, ph.idx).map_err(|e| OoxmlError::Xml(e.to_string()))?;
    }
    xml.push_str("/></p:nvPr>");
    xml.push_str("</p:nvSpPr>");

    xml.push_str("<p:spPr/>");
    xml.push_str("<p:txBody>");
    xml.push_str("<a:bodyPr/>");
    xml.push_str("<a:lstStyle/>");
    write_paragraphs(xml, shape.paragraphs)?;
    xml.push_str("</p:txBody>");
    xml.push_str("</p:sp>");

    Ok(())
}

/// One `<a:p>` per entry; an empty list still emits the one paragraph a text body requires.
fn write_paragraphs(xml: &mut String, paragraphs: &[String]) -> Result<()> {
    if paragraphs.is_empty() {
        xml.push_str(r#"<a:p><a:endParaRPr lang="en-US" dirty="0"/></a:p>"#);
        return Ok(());
    }

    for text in paragraphs {
        if text.is_empty() {
            xml.push_str(r#"<a:p><a:endParaRPr lang="en-US" dirty="0"/></a:p>"#);
            continue;
        }
        xml.push_str("<a:p>");
        xml.push_str("<a:r>");
        xml.push_str(r#"<a:rPr lang="en-US" dirty="0"/>"#);
        write!(xml, "<a:t>{}</a:t>", escape_xml(text)).map_err(|e| OoxmlError::Xml(e.to_string()))?;
        xml.push_str("</a:r>");
        xml.push_str("</a:p>");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::pptx::shapes::PlaceholderKind;
    use memchr::memmem;

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
    fn test_slide_xml_fills_and_clears() {
        let title = placeholder(PlaceholderKind::Title, 0, "Title 1");
        let body = placeholder(PlaceholderKind::Object, 1, "Content Placeholder 2");
        let title_text = vec!["Q3 <Review> & Plan".to_string()];
        let bullets = vec!["First".to_string(), "Second".to_string()];

        let xml = slide_xml(&[
            PlaceholderText {
                placeholder: &title,
                paragraphs: &title_text,
            },
            PlaceholderText {
                placeholder: &body,
                paragraphs: &bullets,
            },
        ])
        .unwrap();

        assert!(xml.contains(r#"<p:ph type="title"/>"#));
        assert!(xml.contains(r#"<p:ph idx="1"/>"#));
        assert!(xml.contains("<a:t>Q3 &lt;Review&gt; &amp; Plan</a:t>"));
        assert_eq!(memmem::find_iter(xml.as_bytes(), b"<a:p>").count(), 3);
        assert!(xml.contains(r#"<p:cNvPr id="3" name="Content Placeholder 2"/>"#));
    }

    #[test]
    fn test_empty_placeholder_has_no_text() {
        let subtitle = placeholder(PlaceholderKind::SubTitle, 1, "Subtitle 2");
        let xml = slide_xml(&[PlaceholderText {
            placeholder: &subtitle,
            paragraphs: &[],
        }])
        .unwrap();

        assert!(xml.contains(r#"<p:ph type="subTitle" idx="1"/>"#));
        assert!(!xml.contains("<a:t>"));
        assert!(xml.contains("<a:endParaRPr"));
    }

    #[test]
    fn test_slide_xml_is_well_formed() {
        let title = placeholder(PlaceholderKind::CenteredTitle, 0, "Title & \"Co\"");
        let text = vec!["It's <fine>".to_string()];
        let xml = slide_xml(&[PlaceholderText {
            placeholder: &title,
            paragraphs: &text,
        }])
        .unwrap();

        let mut reader = quick_xml::Reader::from_str(&xml);
        loop {
            match reader.read_event().unwrap() {
                quick_xml::events::Event::Eof => break,
                _ => {},
            }
        }
    }

    #[test]
    fn test_notes_slide_xml() {
        let xml = notes_slide_xml("Open with a story.\nThen the numbers.").unwrap();
        assert!(xml.starts_with(r#"<?xml version="1.0""#));
        assert!(xml.contains(r#"<p:ph type="sldImg"/>"#));
        assert!(xml.contains("<a:t>Open with a story.</a:t>"));
        assert!(xml.contains("<a:t>Then the numbers.</a:t>"));
    }
}
