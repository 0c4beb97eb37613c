/// Package implementation for PowerPoint presentations.
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::{content_type as ct, relationship_type as rt};
use crate::ooxml::opc::{OpcPackage, PackURI, Part};
use crate::ooxml::pptx::layout::LayoutDescriptor;
use crate::ooxml::pptx::parts::{PresentationPart, SlideLayoutPart, SlideMasterPart};
use crate::ooxml::pptx::writer::pres::{
    FIRST_SLIDE_ID, SlideIdEntry, replace_slide_id_list, strip_slide_references,
};
use crate::ooxml::pptx::writer::slide::{PlaceholderText, notes_slide_xml, slide_xml};
use std::io::Write;
use std::path::Path;

/// A PowerPoint (.pptx) package opened as a template.
///
/// Masters, layouts and theme parts are only ever read; slides are removed
/// and added through [`Package::clear_slides`] and [`Package::add_slide`].
pub struct Package {
    opc: OpcPackage,
    presentation: PackURI,
    slide_entries: Vec<SlideIdEntry>,
}

impl Package {
    /// Open a .pptx (or .potx) file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_opc(OpcPackage::open(path)?)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_opc(OpcPackage::from_bytes(data)?)
    }

    /// Wrap an OPC package whose main part is a presentation.
    ///
    /// A template (.potx) main part is relabelled as a presentation so the
    /// result saves as a .pptx. Macro-enabled decks are rejected.
    pub fn from_opc(mut opc: OpcPackage) -> Result<Self> {
        let main_part = opc
            .main_document_part()
            .map_err(|e| OoxmlError::PartNotFound(format!("main presentation part: {}", e)))?;

        let content_type = main_part.content_type().to_string();
        let presentation = main_part.partname().clone();

        match content_type.as_str() {
            ct::PML_PRESENTATION_MAIN => {},
            ct::PML_TEMPLATE_MAIN => {
                opc.part_mut(&presentation)?
                    .set_content_type(ct::PML_PRESENTATION_MAIN);
            },
            ct::PML_PRES_MACRO_MAIN => {
                return Err(OoxmlError::InvalidFormat(
                    "macro-enabled presentations cannot be used as templates".to_string(),
                ));
            },
            _ => {
                return Err(OoxmlError::InvalidContentType {
                    expected: format!("{} or {}", ct::PML_PRESENTATION_MAIN, ct::PML_TEMPLATE_MAIN),
                    got: content_type,
                });
            },
        }

        let slide_entries = PresentationPart::from_part(opc.part(&presentation)?).slide_id_entries()?;

        Ok(Self {
            opc,
            presentation,
            slide_entries,
        })
    }

    #[inline]
    pub fn presentation_part(&self) -> Result<PresentationPart<'_>> {
        Ok(PresentationPart::from_part(self.opc.part(&self.presentation)?))
    }

    /// Every layout of every master, in declared order.
    pub fn layouts(&self) -> Result<Vec<LayoutDescriptor>> {
        let presentation = self.presentation_part()?;
        let mut layouts = Vec::new();

        for master_rid in presentation.slide_master_rids()? {
            let master_part = self
                .opc
                .part(&presentation.part().related_partname(&master_rid)?)?;
            let master = SlideMasterPart::from_part(master_part);

            for layout_rid in master.slide_layout_rids()? {
                let layout_part = self.opc.part(&master_part.related_partname(&layout_rid)?)?;
                let layout = SlideLayoutPart::from_part(layout_part);
                layouts.push(LayoutDescriptor::new(
                    layouts.len(),
                    layout.name()?,
                    layout_part.partname().clone(),
                    layout.placeholders()?,
                ));
            }
        }

        Ok(layouts)
    }

    /// Partname of the notes master, if the template has one.
    pub fn notes_master_partname(&self) -> Result<Option<PackURI>> {
        let presentation = self.presentation_part()?;
        match presentation.notes_master_rid()? {
            Some(r_id) => Ok(Some(presentation.part().related_partname(&r_id)?)),
            None => Ok(None),
        }
    }

    /// Slide partnames in presentation order.
    pub fn slide_partnames(&self) -> Result<Vec<PackURI>> {
        let pres_part = self.opc.part(&self.presentation)?;
        self.slide_entries
            .iter()
            .map(|entry| {
                pres_part
                    .related_partname(&entry.r_id)
                    .map_err(OoxmlError::from)
            })
            .collect()
    }

    #[inline]
    pub fn slide_count(&self) -> usize {
        self.slide_entries.len()
    }

    /// Remove every slide (and whatever only the slides referenced, such as
    /// their notes and media).
    ///
    /// Custom shows and sections name slides directly and are dropped with
    /// them.
    ///
    /// Returns the number of slides removed.
    pub fn clear_slides(&mut self) -> Result<usize> {
        let removed = std::mem::take(&mut self.slide_entries);

        let pres_part = self.opc.part_mut(&self.presentation)?;
        for entry in &removed {
            pres_part.rels_mut().remove(&entry.r_id);
        }
        let blob = replace_slide_id_list(pres_part.blob(), &[])?;
        let blob = strip_slide_references(&blob)?;
        pres_part.set_blob(blob);

        self.opc.prune_unreachable();
        Ok(removed.len())
    }

    /// Append a slide built from `layout` holding `shapes`.
    ///
    /// `notes` become a notes slide when the template has a notes master and
    /// are otherwise ignored. Returns the new slide's partname.
    pub fn add_slide(
        &mut self,
        layout: &LayoutDescriptor,
        shapes: &[PlaceholderText<'_>],
        notes: Option<&str>,
    ) -> Result<PackURI> {
        if !self.opc.contains_part(&layout.partname) {
            return Err(OoxmlError::PartNotFound(layout.partname.to_string()));
        }

        let slide_partname = self.opc.next_partname("/ppt/slides/slide%d.xml")?;
        let mut slide = Part::new(
            slide_partname.clone(),
            ct::PML_SLIDE,
            slide_xml(shapes)?.into_bytes(),
        );
        slide.relate_to(&layout.partname, rt::SLIDE_LAYOUT);

        if let Some(notes) = notes.filter(|n| !n.trim().is_empty())
            && let Some(notes_master) = self.notes_master_partname()?
        {
            let notes_partname = self.opc.next_partname("/ppt/notesSlides/notesSlide%d.xml")?;
            let mut notes_part = Part::new(
                notes_partname.clone(),
                ct::PML_NOTES_SLIDE,
                notes_slide_xml(notes)?.into_bytes(),
            );
            notes_part.relate_to(&notes_master, rt::NOTES_MASTER);
            notes_part.relate_to(&slide_partname, rt::SLIDE);
            slide.relate_to(&notes_partname, rt::NOTES_SLIDE);
            self.opc.add_part(notes_part);
        }

        self.opc.add_part(slide);

        let pres_part = self.opc.part_mut(&self.presentation)?;
        let r_id = pres_part.relate_to(&slide_partname, rt::SLIDE);
        let id = self
            .slide_entries
            .iter()
            .map(|entry| entry.id + 1)
            .max()
            .unwrap_or(FIRST_SLIDE_ID)
            .max(FIRST_SLIDE_ID);
        self.slide_entries.push(SlideIdEntry { id, r_id });

        let blob = replace_slide_id_list(pres_part.blob(), &self.slide_entries)?;
        pres_part.set_blob(blob);

        Ok(slide_partname)
    }

    #[inline]
    pub fn opc(&self) -> &OpcPackage {
        &self.opc
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.opc.to_bytes()?)
    }

    /// Serialize the package into `writer`.
    pub fn save_to<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        Ok(self.opc.save_to(writer)?)
    }
}
