/// Rewriting the slide list of `presentation.xml`.
///
/// The rest of the part (masters, sizes, default text style, extensions) is
/// copied through byte for byte; only the `sldIdLst` span is replaced.
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::namespace;
use crate::ooxml::opc::rel::escape_xml;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::fmt::Write as FmtWrite;

/// First id PowerPoint hands out in `sldIdLst`.
pub const FIRST_SLIDE_ID: u32 = 256;

/// A `<p:sldId>` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideIdEntry {
    pub id: u32,
    pub r_id: String,
}

/// Children of `<p:presentation>` that precede `sldIdLst` in schema order.
const BEFORE_SLIDE_LIST: [&[u8]; 3] = [b"sldMasterIdLst", b"notesMasterIdLst", b"handoutMasterIdLst"];

/// Where the new list goes and how the root names things.
#[derive(Debug, Default)]
struct SpliceSite {
    element_prefix: Option<String>,
    r_prefix: Option<String>,
    /// Byte span of an existing list
    existing: Option<(usize, usize)>,
    /// Insertion point when there is no list
    insert_at: Option<usize>,
}

/// Replace (or insert) the slide list with `entries`, in order.
///
/// An empty `entries` removes the list.
pub fn replace_slide_id_list(presentation_xml: &[u8], entries: &[SlideIdEntry]) -> Result<Vec<u8>> {
    let site = find_splice_site(presentation_xml)?;
    let (start, end) = match (site.existing, site.insert_at) {
        (Some(span), _) => span,
        (None, Some(at)) => (at, at),
        (None, None) => {
            return Err(OoxmlError::InvalidFormat(
                "presentation part has no place for a slide list".to_string(),
            ));
        },
    };

    let list = slide_id_list_xml(&site, entries)?;

    let mut out = Vec::with_capacity(presentation_xml.len() + list.len());
    out.extend_from_slice(&presentation_xml[..start]);
    out.extend_from_slice(list.as_bytes());
    out.extend_from_slice(&presentation_xml[end..]);
    Ok(out)
}

/// Remove the parts of `presentation.xml` that point at individual slides
/// outside `sldIdLst`: the custom show list, and any extension holding a
/// section list.
///
/// Both go stale once the slides they name are gone, and slide ids are
/// handed out again from [`FIRST_SLIDE_ID`].
pub fn strip_slide_references(presentation_xml: &[u8]) -> Result<Vec<u8>> {
    let spans = slide_reference_spans(presentation_xml)?;
    if spans.is_empty() {
        return Ok(presentation_xml.to_vec());
    }

    let mut out = Vec::with_capacity(presentation_xml.len());
    let mut copied_to = 0;
    for (start, end) in spans {
        out.extend_from_slice(&presentation_xml[copied_to..start]);
        copied_to = end;
    }
    out.extend_from_slice(&presentation_xml[copied_to..]);
    Ok(out)
}

/// Byte spans of `custShowLst` and of every `extLst/ext` containing a
/// `sectionLst`, in document order.
fn slide_reference_spans(xml: &[u8]) -> Result<Vec<(usize, usize)>> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);

    let mut spans = Vec::new();
    let mut path: Vec<Vec<u8>> = Vec::new();
    let mut open_start: Option<usize> = None;
    let mut ext_has_sections = false;

    loop {
        let before = reader.buffer_position() as usize;
        match reader.read_event()? {
            Event::Start(ref e) => {
                let name = e.local_name().as_ref().to_vec();
                match (path.len(), name.as_slice()) {
                    (1, b"custShowLst") => open_start = Some(before),
                    (2, b"ext") if path[1] == b"extLst" => {
                        open_start = Some(before);
                        ext_has_sections = false;
                    },
                    (depth, b"sectionLst") if depth > 2 && path[1] == b"extLst" => {
                        ext_has_sections = true;
                    },
                    _ => {},
                }
                path.push(name);
            },
            Event::Empty(ref e) => {
                let name = e.local_name();
                let after = reader.buffer_position() as usize;
                match (path.len(), name.as_ref()) {
                    (1, b"custShowLst") => spans.push((before, after)),
                    (depth, b"sectionLst") if depth > 2 && path[1] == b"extLst" => {
                        ext_has_sections = true;
                    },
                    _ => {},
                }
            },
            Event::End(_) => {
                let Some(name) = path.pop() else {
                    break;
                };
                let after = reader.buffer_position() as usize;
                match (path.len(), name.as_slice()) {
                    (1, b"custShowLst") => {
                        if let Some(start) = open_start.take() {
                            spans.push((start, after));
                        }
                    },
                    (2, b"ext") if path[1] == b"extLst" => {
                        if let Some(start) = open_start.take()
                            && ext_has_sections
                        {
                            spans.push((start, after));
                        }
                    },
                    _ => {},
                }
            },
            Event::Eof => break,
            _ => {},
        }
    }

    Ok(spans)
}

fn find_splice_site(xml: &[u8]) -> Result<SpliceSite> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);

    let mut site = SpliceSite::default();
    let mut depth = 0usize;
    let mut list_start: Option<usize> = None;

    loop {
        let before = reader.buffer_position() as usize;
        match reader.read_event()? {
            Event::Start(ref e) => {
                if depth == 0 {
                    read_root(e, &mut site)?;
                } else if depth == 1 {
                    if e.local_name().as_ref() == b"sldIdLst" {
                        list_start = Some(before);
                    } else {
                        note_child(e, before, &mut site);
                    }
                }
                depth += 1;
            },
            Event::Empty(ref e) => {
                if depth == 0 {
                    read_root(e, &mut site)?;
                    break;
                } else if depth == 1 {
                    if e.local_name().as_ref() == b"sldIdLst" {
                        site.existing = Some((before, reader.buffer_position() as usize));
                    } else {
                        note_child(e, before, &mut site);
                    }
                }
            },
            Event::End(ref e) => {
                depth = depth.saturating_sub(1);
                if depth == 1 && e.local_name().as_ref() == b"sldIdLst" {
                    if let Some(start) = list_start.take() {
                        site.existing = Some((start, reader.buffer_position() as usize));
                    }
                } else if depth == 0 {
                    if site.insert_at.is_none() {
                        site.insert_at = Some(before);
                    }
                    break;
                }
            },
            Event::Eof => break,
            _ => {},
        }
    }

    Ok(site)
}

fn read_root(e: &BytesStart<'_>, site: &mut SpliceSite) -> Result<()> {
    if e.local_name().as_ref() != b"presentation" {
        return Err(OoxmlError::InvalidFormat(
            "presentation part root is not <presentation>".to_string(),
        ));
    }

    site.element_prefix = e
        .name()
        .prefix()
        .map(|p| String::from_utf8_lossy(p.as_ref()).into_owned());

    for attr in e.attributes() {
        let attr = attr?;
        if let Some(prefix) = attr.key.as_ref().strip_prefix(b"xmlns:")
            && attr.unescape_value()? == namespace::OFC_RELATIONSHIPS
        {
            site.r_prefix = Some(String::from_utf8_lossy(prefix).into_owned());
        }
    }

    Ok(())
}

/// Remember the first root child that must follow the slide list.
fn note_child(e: &BytesStart<'_>, before: usize, site: &mut SpliceSite) {
    let name = e.local_name();
    if site.insert_at.is_none() && !BEFORE_SLIDE_LIST.contains(&name.as_ref()) {
        site.insert_at = Some(before);
    }
}

fn slide_id_list_xml(site: &SpliceSite, entries: &[SlideIdEntry]) -> Result<String> {
    if entries.is_empty() {
        return Ok(String::new());
    }

    let p = site
        .element_prefix
        .as_deref()
        .map(|prefix| format!("{prefix}:"))
        .unwrap_or_default();
    let (r, local_decl) = match site.r_prefix.as_deref() {
        Some(prefix) => (prefix.to_string(), String::new()),
        None => (
            "r".to_string(),
            format!(r#" xmlns:r="{}""#, namespace::OFC_RELATIONSHIPS),
        ),
    };

    let mut xml = String::with_capacity(64 + entries.len() * 48);
    write!(xml, "<{p}sldIdLst{local_decl}>").map_err(|e| OoxmlError::Xml(e.to_string()))?;
    for entry in entries {
        write!(
            xml,
            r#"<{p}sldId id="{}" {r}:id="{}"/>"#,
            entry.id,
            escape_xml(&entry.r_id)
        )
        .map_err(|e| OoxmlError::Xml(e.to_string()))?;
    }
    write!(xml, "</{p}sldIdLst>").map_err(|e| OoxmlError::Xml(e.to_string()))?;

    Ok(xml)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(n: u32) -> Vec<SlideIdEntry> {
        (0..n)
            .map(|i| SlideIdEntry {
                id: FIRST_SLIDE_ID + i,
                r_id: format!("rId{}", 10 + i),
            })
            .collect()
    }

    const WITH_LIST: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" saveSubsetFonts="1">
  <p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>
  <p:sldIdLst><p:sldId id="256" r:id="rId2"/><p:sldId id="257" r:id="rId3"/></p:sldIdLst>
  <p:sldSz cx="12192000" cy="6858000"/>
  <p:notesSz cx="6858000" cy="9144000"/>
</p:presentation>"#;

    const WITHOUT_LIST: &str = r#"<p:presentation xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:rel="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><p:sldMasterIdLst><p:sldMasterId id="2147483648" rel:id="rId1"/></p:sldMasterIdLst><p:notesMasterIdLst><p:notesMasterId rel:id="rId4"/></p:notesMasterIdLst><p:sldSz cx="9144000" cy="6858000"/><p:notesSz cx="6858000" cy="9144000"/></p:presentation>"#;

    #[test]
    fn test_replaces_existing_list() {
        let out = replace_slide_id_list(WITH_LIST.as_bytes(), &entries(3)).unwrap();
        let out = String::from_utf8(out).unwrap();

        assert!(out.contains(
            r#"<p:sldIdLst><p:sldId id="256" r:id="rId10"/><p:sldId id="257" r:id="rId11"/><p:sldId id="258" r:id="rId12"/></p:sldIdLst>"#
        ));
        assert!(!out.contains(r#"r:id="rId2""#));
        assert!(out.contains(r#"<p:sldSz cx="12192000" cy="6858000"/>"#));
        assert!(out.starts_with(r#"<?xml version="1.0""#));
    }

    #[test]
    fn test_inserts_after_master_lists_with_root_prefixes() {
        let out = replace_slide_id_list(WITHOUT_LIST.as_bytes(), &entries(1)).unwrap();
        let out = String::from_utf8(out).unwrap();

        assert!(out.contains(
            r#"</p:notesMasterIdLst><p:sldIdLst><p:sldId id="256" rel:id="rId10"/></p:sldIdLst><p:sldSz"#
        ));
    }

    #[test]
    fn test_empty_entries_removes_list() {
        let out = replace_slide_id_list(WITH_LIST.as_bytes(), &[]).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(!out.contains("sldIdLst"));
        assert!(out.contains("sldMasterIdLst"));
    }

    #[test]
    fn test_declares_r_namespace_when_root_lacks_it() {
        let xml = r#"<presentation xmlns="http://schemas.openxmlformats.org/presentationml/2006/main"><sldSz cx="1" cy="1"/></presentation>"#;
        let out = replace_slide_id_list(xml.as_bytes(), &entries(1)).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains(
            r#"<sldIdLst xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sldId id="256" r:id="rId10"/></sldIdLst><sldSz"#
        ));
    }

    const WITH_SECTIONS: &str = r#"<p:presentation xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p14="http://schemas.microsoft.com/office/powerpoint/2010/main"><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:sldSz cx="1" cy="1"/><p:notesSz cx="1" cy="1"/><p:custShowLst><p:custShow name="Short" id="0"><p:sldLst><p:sld r:id="rId2"/></p:sldLst></p:custShow></p:custShowLst><p:extLst><p:ext uri="{521415D9-36F7-43E2-AB2F-B90AF26B5E84}"><p14:sectionLst><p14:section name="Intro" id="{A}"><p14:sldIdLst><p14:sldId id="256"/></p14:sldIdLst></p14:section></p14:sectionLst></p:ext><p:ext uri="{EFAFB233-063F-42B5-8137-9DF3F51BA10A}"><p15:sldGuideLst xmlns:p15="http://schemas.microsoft.com/office/powerpoint/2012/main"/></p:ext></p:extLst></p:presentation>"#;

    #[test]
    fn test_strip_slide_references() {
        let out = strip_slide_references(WITH_SECTIONS.as_bytes()).unwrap();
        let out = String::from_utf8(out).unwrap();

        assert!(!out.contains("custShow"));
        assert!(!out.contains("sectionLst"));
        assert!(!out.contains("521415D9"));
        assert!(out.contains(
            r#"<p:notesSz cx="1" cy="1"/><p:extLst><p:ext uri="{EFAFB233-063F-42B5-8137-9DF3F51BA10A}">"#
        ));
        assert!(out.ends_with("</p:ext></p:extLst></p:presentation>"));
    }

    #[test]
    fn test_strip_without_slide_references_is_identity() {
        let out = strip_slide_references(WITH_LIST.as_bytes()).unwrap();
        assert_eq!(out, WITH_LIST.as_bytes());
    }

    #[test]
    fn test_rejects_other_roots() {
        assert!(replace_slide_id_list(b"<p:sld/>", &entries(1)).is_err());
    }
}
