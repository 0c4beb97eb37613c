/// Reading the lists of `presentation.xml`.
use crate::ooxml::error::Result;
use crate::ooxml::opc::Part;
use crate::ooxml::pptx::writer::pres::SlideIdEntry;
use quick_xml::Reader;
use quick_xml::events::Event;

/// The main presentation part.
///
/// Corresponds to `/ppt/presentation.xml` in the package.
pub struct PresentationPart<'a> {
    part: &'a Part,
}

impl<'a> PresentationPart<'a> {
    pub fn from_part(part: &'a Part) -> Self {
        Self { part }
    }

    /// rIds of the slide masters, in declared order.
    pub fn slide_master_rids(&self) -> Result<Vec<String>> {
        rids_of(self.part.blob(), b"sldMasterId")
    }

    /// `sldIdLst` entries with their numeric ids, in presentation order.
    pub fn slide_id_entries(&self) -> Result<Vec<SlideIdEntry>> {
        let mut reader = Reader::from_reader(self.part.blob());
        reader.config_mut().trim_text(true);

        let mut entries = Vec::new();

        loop {
            match reader.read_event()? {
                Event::Start(ref e) | Event::Empty(ref e) if e.local_name().as_ref() == b"sldId" => {
                    let mut id = None;
                    let mut r_id = None;
                    for attr in e.attributes() {
                        let attr = attr?;
                        if attr.key.local_name().as_ref() != b"id" {
                            continue;
                        }
                        if attr.key.prefix().is_some() {
                            r_id = Some(attr.unescape_value()?.to_string());
                        } else {
                            id = attr.unescape_value()?.parse().ok();
                        }
                    }
                    if let (Some(id), Some(r_id)) = (id, r_id) {
                        entries.push(SlideIdEntry { id, r_id });
                    }
                },
                Event::Eof => break,
                _ => {},
            }
        }

        Ok(entries)
    }

    /// rId of the notes master, if one is declared.
    pub fn notes_master_rid(&self) -> Result<Option<String>> {
        Ok(rids_of(self.part.blob(), b"notesMasterId")?.into_iter().next())
    }

    #[inline]
    pub fn part(&self) -> &'a Part {
        self.part
    }
}

/// Collect the relationship-namespace `id` attribute of every `element`.
///
/// The namespace prefix is not checked; any prefixed `id` counts, which is
/// what distinguishes `r:id` from the numeric `id` on `sldId`.
pub(crate) fn rids_of(xml: &[u8], element: &[u8]) -> Result<Vec<String>> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut rids = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(ref e) | Event::Empty(ref e) if e.local_name().as_ref() == element => {
                for attr in e.attributes() {
                    let attr = attr?;
                    if attr.key.prefix().is_some() && attr.key.local_name().as_ref() == b"id" {
                        rids.push(attr.unescape_value()?.to_string());
                        break;
                    }
                }
            },
            Event::Eof => break,
            _ => {},
        }
    }

    Ok(rids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::opc::PackURI;

    #[test]
    fn test_lists() {
        let part = Part::new(
            PackURI::new("/ppt/presentation.xml").unwrap(),
            "application/xml",
            br#"<p:presentation xmlns:p="p" xmlns:r="r">
<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>
<p:notesMasterIdLst><p:notesMasterId r:id="rId7"/></p:notesMasterIdLst>
<p:sldIdLst><p:sldId id="256" r:id="rId3"/><p:sldId id="257" r:id="rId2"/></p:sldIdLst>
</p:presentation>"#
                .to_vec(),
        );
        let pres = PresentationPart::from_part(&part);

        assert_eq!(pres.slide_master_rids().unwrap(), vec!["rId1"]);
        assert_eq!(
            pres.slide_id_entries().unwrap(),
            vec![
                SlideIdEntry {
                    id: 256,
                    r_id: "rId3".to_string()
                },
                SlideIdEntry {
                    id: 257,
                    r_id: "rId2".to_string()
                },
            ]
        );
        assert_eq!(pres.notes_master_rid().unwrap().as_deref(), Some("rId7"));
    }
}
