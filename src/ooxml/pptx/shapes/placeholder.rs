/// Placeholder shapes declared by slide layouts.
use crate::ooxml::error::Result;
use quick_xml::Reader;
use quick_xml::events::Event;
use smallvec::SmallVec;

/// Declared kind of a placeholder: the `type` attribute of `<p:ph>`.
///
/// A `<p:ph>` without a `type` attribute is an object placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PlaceholderKind {
    Title,
    CenteredTitle,
    Body,
    SubTitle,
    Object,
    Picture,
    Date,
    Footer,
    SlideNumber,
    /// Any other declared kind (`chart`, `tbl`, `media`, ...)
    Other(String),
}

impl PlaceholderKind {
    pub fn from_type_attr(value: Option<&str>) -> Self {
        match value {
            None | Some("obj") => Self::Object,
            Some("title") => Self::Title,
            Some("ctrTitle") => Self::CenteredTitle,
            Some("body") => Self::Body,
            Some("subTitle") => Self::SubTitle,
            Some("pic") => Self::Picture,
            Some("dt") => Self::Date,
            Some("ftr") => Self::Footer,
            Some("sldNum") => Self::SlideNumber,
            Some(other) => Self::Other(other.to_string()),
        }
    }

    /// Value for the `type` attribute, `None` for object placeholders.
    pub fn type_attr(&self) -> Option<&str> {
        match self {
            Self::Object => None,
            Self::Title => Some("title"),
            Self::CenteredTitle => Some("ctrTitle"),
            Self::Body => Some("body"),
            Self::SubTitle => Some("subTitle"),
            Self::Picture => Some("pic"),
            Self::Date => Some("dt"),
            Self::Footer => Some("ftr"),
            Self::SlideNumber => Some("sldNum"),
            Self::Other(value) => Some(value),
        }
    }

    /// Date, footer and slide number placeholders render from the layout
    /// and are not copied onto slides.
    #[inline]
    pub fn is_slide_furniture(&self) -> bool {
        matches!(self, Self::Date | Self::Footer | Self::SlideNumber)
    }

    pub fn role(&self) -> PlaceholderRole {
        match self {
            Self::Title | Self::CenteredTitle => PlaceholderRole::Title,
            Self::Body => PlaceholderRole::Body,
            Self::SubTitle => PlaceholderRole::Subtitle,
            Self::Picture => PlaceholderRole::Image,
            _ => PlaceholderRole::Unclassified,
        }
    }
}

/// What generated content a placeholder may receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceholderRole {
    Title,
    Body,
    Subtitle,
    Image,
    /// Never written to
    Unclassified,
}

impl std::fmt::Display for PlaceholderRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Title => "title",
            Self::Body => "body",
            Self::Subtitle => "subtitle",
            Self::Image => "image",
            Self::Unclassified => "unclassified",
        })
    }
}

/// A placeholder shape as declared in a layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    /// Shape name from `<p:cNvPr name>`
    pub name: String,
    pub kind: PlaceholderKind,
    /// `idx` attribute; 0 when absent
    pub idx: u32,
    pub orient: Option<String>,
    pub sz: Option<String>,
}

impl Placeholder {
    #[inline]
    pub fn role(&self) -> PlaceholderRole {
        self.kind.role()
    }
}

/// Placeholders of a layout, in shape-tree order.
pub fn placeholders_from_xml(xml: &[u8]) -> Result<SmallVec<[Placeholder; 8]>> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut placeholders = SmallVec::new();
    let mut shape_name = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(ref e) | Event::Empty(ref e) => match e.local_name().as_ref() {
                b"sp" | b"pic" | b"graphicFrame" => shape_name.clear(),
                b"cNvPr" => {
                    for attr in e.attributes() {
                        let attr = attr?;
                        if attr.key.as_ref() == b"name" {
                            shape_name = attr.unescape_value()?.to_string();
                        }
                    }
                },
                b"ph" => {
                    let mut type_attr = None;
                    let mut idx = 0;
                    let mut orient = None;
                    let mut sz = None;
                    for attr in e.attributes() {
                        let attr = attr?;
                        match attr.key.as_ref() {
                            b"type" => type_attr = Some(attr.unescape_value()?.to_string()),
                            b"idx" => idx = attr.unescape_value()?.parse().unwrap_or(0),
                            b"orient" => orient = Some(attr.unescape_value()?.to_string()),
                            b"sz" => sz = Some(attr.unescape_value()?.to_string()),
                            _ => {},
                        }
                    }
                    placeholders.push(Placeholder {
                        name: shape_name.clone(),
                        kind: PlaceholderKind::from_type_attr(type_attr.as_deref()),
                        idx,
                        orient,
                        sz,
                    });
                },
                _ => {},
            },
            Event::Eof => break,
            _ => {},
        }
    }

    Ok(placeholders)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYOUT: &[u8] = br#"<p:sldLayout xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" type="obj">
<p:cSld name="Title and Content"><p:spTree>
<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>
<p:sp><p:nvSpPr><p:cNvPr id="2" name="Title 1"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr><p:spPr/></p:sp>
<p:sp><p:nvSpPr><p:cNvPr id="3" name="Content Placeholder 2"/><p:cNvSpPr/><p:nvPr><p:ph idx="1"/></p:nvPr></p:nvSpPr><p:spPr/></p:sp>
<p:sp><p:nvSpPr><p:cNvPr id="4" name="Date Placeholder 3"/><p:cNvSpPr/><p:nvPr><p:ph type="dt" sz="half" idx="10"/></p:nvPr></p:nvSpPr><p:spPr/></p:sp>
<p:sp><p:nvSpPr><p:cNvPr id="5" name="Chart 4"/><p:cNvSpPr/><p:nvPr><p:ph type="chart" idx="13"/></p:nvPr></p:nvSpPr><p:spPr/></p:sp>
</p:spTree></p:cSld></p:sldLayout>"#;

    #[test]
    fn test_placeholders_in_order() {
        let placeholders = placeholders_from_xml(LAYOUT).unwrap();
        assert_eq!(placeholders.len(), 4);

        assert_eq!(placeholders[0].name, "Title 1");
        assert_eq!(placeholders[0].kind, PlaceholderKind::Title);
        assert_eq!(placeholders[0].idx, 0);

        assert_eq!(placeholders[1].kind, PlaceholderKind::Object);
        assert_eq!(placeholders[1].idx, 1);

        assert_eq!(placeholders[2].kind, PlaceholderKind::Date);
        assert_eq!(placeholders[2].sz.as_deref(), Some("half"));
        assert!(placeholders[2].kind.is_slide_furniture());

        assert_eq!(placeholders[3].kind, PlaceholderKind::Other("chart".to_string()));
    }

    #[test]
    fn test_roles() {
        assert_eq!(PlaceholderKind::CenteredTitle.role(), PlaceholderRole::Title);
        assert_eq!(PlaceholderKind::SubTitle.role(), PlaceholderRole::Subtitle);
        assert_eq!(PlaceholderKind::Body.role(), PlaceholderRole::Body);
        assert_eq!(PlaceholderKind::Picture.role(), PlaceholderRole::Image);
        assert_eq!(PlaceholderKind::Object.role(), PlaceholderRole::Unclassified);
        assert_eq!(PlaceholderKind::Footer.role(), PlaceholderRole::Unclassified);
        assert_eq!(
            PlaceholderKind::Other("media".to_string()).role(),
            PlaceholderRole::Unclassified
        );
    }

    #[test]
    fn test_type_attr_round_trip() {
        for value in ["title", "ctrTitle", "body", "subTitle", "pic", "dt", "ftr", "sldNum", "tbl"] {
            let kind = PlaceholderKind::from_type_attr(Some(value));
            assert_eq!(kind.type_attr(), Some(value));
        }
        assert_eq!(PlaceholderKind::from_type_attr(Some("obj")).type_attr(), None);
    }
}
