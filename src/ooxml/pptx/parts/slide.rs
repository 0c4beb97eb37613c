/// Slide master and slide layout parts.
use crate::ooxml::error::Result;
use crate::ooxml::opc::Part;
use crate::ooxml::pptx::parts::presentation::rids_of;
use crate::ooxml::pptx::shapes::placeholder::{Placeholder, placeholders_from_xml};
use quick_xml::Reader;
use quick_xml::events::Event;
use smallvec::SmallVec;

/// A slide layout part.
///
/// Corresponds to `/ppt/slideLayouts/slideLayoutN.xml` in the package.
pub struct SlideLayoutPart<'a> {
    part: &'a Part,
}

impl<'a> SlideLayoutPart<'a> {
    pub fn from_part(part: &'a Part) -> Self {
        Self { part }
    }

    /// The layout name from `<p:cSld name>`; empty when unnamed.
    pub fn name(&self) -> Result<String> {
        csld_name(self.part.blob())
    }

    /// Placeholder shapes in shape-tree order.
    pub fn placeholders(&self) -> Result<SmallVec<[Placeholder; 8]>> {
        placeholders_from_xml(self.part.blob())
    }

    #[inline]
    pub fn part(&self) -> &'a Part {
        self.part
    }
}

/// A slide master part.
///
/// Corresponds to `/ppt/slideMasters/slideMasterN.xml` in the package.
pub struct SlideMasterPart<'a> {
    part: &'a Part,
}

impl<'a> SlideMasterPart<'a> {
    pub fn from_part(part: &'a Part) -> Self {
        Self { part }
    }

    pub fn name(&self) -> Result<String> {
        csld_name(self.part.blob())
    }

    /// rIds of this master's layouts, in declared order.
    pub fn slide_layout_rids(&self) -> Result<Vec<String>> {
        rids_of(self.part.blob(), b"sldLayoutId")
    }

    #[inline]
    pub fn part(&self) -> &'a Part {
        self.part
    }
}

fn csld_name(xml: &[u8]) -> Result<String> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event()? {
            Event::Start(ref e) | Event::Empty(ref e) if e.local_name().as_ref() == b"cSld" => {
                for attr in e.attributes() {
                    let attr = attr?;
                    if attr.key.as_ref() == b"name" {
                        return Ok(attr.unescape_value()?.to_string());
                    }
                }
                return Ok(String::new());
            },
            Event::Eof => break,
            _ => {},
        }
    }

    Ok(String::new())
}
