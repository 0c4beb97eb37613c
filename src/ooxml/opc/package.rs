//! In-memory OPC package.
//!
//! Parts are kept in a `BTreeMap` keyed by partname so serialization order is
//! deterministic.

use crate::ooxml::opc::constants::relationship_type;
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::{PACKAGE_URI, PackURI};
use crate::ooxml::opc::part::Part;
use crate::ooxml::opc::phys_pkg::PhysPkgReader;
use crate::ooxml::opc::pkgreader::PackageReader;
use crate::ooxml::opc::pkgwriter::PackageWriter;
use crate::ooxml::opc::rel::Relationships;
use std::collections::{BTreeMap, HashSet};
use std::io::Write;
use std::path::Path;

pub struct OpcPackage {
    rels: Relationships,
    parts: BTreeMap<PackURI, Part>,
}

impl OpcPackage {
    /// Create an empty package.
    pub fn new() -> Self {
        Self {
            rels: Relationships::new(PACKAGE_URI),
            parts: BTreeMap::new(),
        }
    }

    /// Open a package file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::unmarshal(PackageReader::from_phys_reader(PhysPkgReader::open(path)?)?)
    }

    /// Load a package from ZIP bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::unmarshal(PackageReader::from_phys_reader(PhysPkgReader::from_bytes(data)?)?)
    }

    fn unmarshal(pkg_reader: PackageReader) -> Result<Self> {
        let (rels, sparts) = pkg_reader.into_parts();
        let parts = sparts
            .into_iter()
            .map(|spart| {
                let partname = spart.partname.clone();
                (
                    partname,
                    Part::with_rels(spart.partname, spart.content_type, spart.blob, spart.rels),
                )
            })
            .collect();
        Ok(Self { rels, parts })
    }

    /// The part targeted by the package-level officeDocument relationship.
    pub fn main_document_part(&self) -> Result<&Part> {
        self.part_by_reltype(relationship_type::OFFICE_DOCUMENT)
    }

    /// Package-level part of the given relationship type.
    pub fn part_by_reltype(&self, reltype: &str) -> Result<&Part> {
        let partname = self.rels.part_with_reltype(reltype)?.target_partname()?;
        self.part(&partname)
    }

    pub fn part(&self, partname: &PackURI) -> Result<&Part> {
        self.parts
            .get(partname)
            .ok_or_else(|| OpcError::PartNotFound(partname.to_string()))
    }

    pub fn part_mut(&mut self, partname: &PackURI) -> Result<&mut Part> {
        self.parts
            .get_mut(partname)
            .ok_or_else(|| OpcError::PartNotFound(partname.to_string()))
    }

    /// Add or replace a part.
    pub fn add_part(&mut self, part: Part) {
        self.parts.insert(part.partname().clone(), part);
    }

    #[inline]
    pub fn contains_part(&self, partname: &PackURI) -> bool {
        self.parts.contains_key(partname)
    }

    pub fn iter_parts(&self) -> impl Iterator<Item = &Part> {
        self.parts.values()
    }

    #[inline]
    pub fn rels(&self) -> &Relationships {
        &self.rels
    }

    #[inline]
    pub fn rels_mut(&mut self) -> &mut Relationships {
        &mut self.rels
    }

    /// First free partname for a `%d` template, e.g. `/ppt/slides/slide%d.xml`.
    pub fn next_partname(&self, template: &str) -> Result<PackURI> {
        for n in 1..=self.parts.len() as u32 + 1 {
            let candidate = PackURI::new(template.replace("%d", &n.to_string()))
                .map_err(OpcError::InvalidPackUri)?;
            if !self.parts.contains_key(&candidate) {
                return Ok(candidate);
            }
        }
        Err(OpcError::InvalidPackUri(format!(
            "No free partname for template {template}"
        )))
    }

    /// Drop parts no longer reachable from the package relationships.
    ///
    /// Returns the number of parts removed.
    pub fn prune_unreachable(&mut self) -> usize {
        let mut reachable = HashSet::new();
        let mut work_queue: Vec<PackURI> = self
            .rels
            .iter()
            .filter(|rel| !rel.is_external())
            .filter_map(|rel| rel.target_partname().ok())
            .collect();

        while let Some(partname) = work_queue.pop() {
            if !reachable.insert(partname.clone()) {
                continue;
            }
            if let Some(part) = self.parts.get(&partname) {
                work_queue.extend(
                    part.rels()
                        .iter()
                        .filter(|rel| !rel.is_external())
                        .filter_map(|rel| rel.target_partname().ok()),
                );
            }
        }

        let before = self.parts.len();
        self.parts.retain(|partname, _| reachable.contains(partname));
        before - self.parts.len()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        PackageWriter::to_bytes(self)
    }

    /// Serialize into any sink.
    pub fn save_to<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        PackageWriter::write_to_stream(writer, self)
    }
}

impl Default for OpcPackage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::opc::constants::content_type as ct;

    fn minimal_package() -> OpcPackage {
        let mut pkg = OpcPackage::new();
        let main = PackURI::new("/ppt/presentation.xml").unwrap();
        let slide = PackURI::new("/ppt/slides/slide1.xml").unwrap();

        let mut main_part = Part::new(
            main.clone(),
            ct::PML_PRESENTATION_MAIN,
            b"<p:presentation/>".to_vec(),
        );
        main_part.relate_to(&slide, relationship_type::SLIDE);
        pkg.add_part(main_part);
        pkg.add_part(Part::new(slide, ct::PML_SLIDE, b"<p:sld/>".to_vec()));
        pkg.rels_mut()
            .get_or_add(relationship_type::OFFICE_DOCUMENT, &main);
        pkg
    }

    #[test]
    fn test_round_trip_through_zip() {
        let pkg = minimal_package();
        let bytes = pkg.to_bytes().unwrap();
        let reopened = OpcPackage::from_bytes(&bytes).unwrap();

        assert_eq!(reopened.iter_parts().count(), 2);
        let main = reopened.main_document_part().unwrap();
        assert_eq!(main.content_type(), ct::PML_PRESENTATION_MAIN);
        assert_eq!(main.rels().len(), 1);
        assert_eq!(
            main.related_partname("rId1").unwrap().as_str(),
            "/ppt/slides/slide1.xml"
        );
    }

    #[test]
    fn test_next_partname() {
        let pkg = minimal_package();
        assert_eq!(
            pkg.next_partname("/ppt/slides/slide%d.xml").unwrap().as_str(),
            "/ppt/slides/slide2.xml"
        );
        assert_eq!(
            pkg.next_partname("/ppt/notesSlides/notesSlide%d.xml")
                .unwrap()
                .as_str(),
            "/ppt/notesSlides/notesSlide1.xml"
        );
    }

    #[test]
    fn test_prune_unreachable() {
        let mut pkg = minimal_package();
        let main = PackURI::new("/ppt/presentation.xml").unwrap();
        pkg.part_mut(&main).unwrap().rels_mut().remove("rId1");

        assert_eq!(pkg.prune_unreachable(), 1);
        assert!(!pkg.contains_part(&PackURI::new("/ppt/slides/slide1.xml").unwrap()));
    }

    #[test]
    fn test_missing_part() {
        let pkg = OpcPackage::new();
        assert!(pkg.main_document_part().is_err());
    }
}
