//! Read side of an OPC package: content types and the relationship graph.
//!
//! Only parts reachable from the package relationships are loaded; stray
//! members in the ZIP are ignored.

use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::{PACKAGE_URI, PackURI};
use crate::ooxml::opc::phys_pkg::PhysPkgReader;
use crate::ooxml::opc::rel::Relationships;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::collections::{HashMap, HashSet};

/// A part as found in the physical package.
#[derive(Debug)]
pub struct SerializedPart {
    pub partname: PackURI,
    pub content_type: String,
    pub blob: Vec<u8>,
    pub rels: Relationships,
}

/// Content types from `[Content_Types].xml`: overrides by partname, defaults by extension.
#[derive(Debug, Default)]
pub(crate) struct ContentTypeMap {
    defaults: HashMap<String, String>,
    overrides: HashMap<String, String>,
}

impl ContentTypeMap {
    pub(crate) fn from_xml(xml: &[u8]) -> Result<Self> {
        let mut map = Self::default();
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    let is_default = match e.local_name().as_ref() {
                        b"Default" => true,
                        b"Override" => false,
                        _ => {
                            buf.clear();
                            continue;
                        },
                    };

                    let mut key = None;
                    let mut content_type = None;
                    for attr in e.attributes() {
                        let attr = attr?;
                        match attr.key.as_ref() {
                            b"Extension" | b"PartName" => {
                                key = Some(attr.unescape_value()?.to_string())
                            },
                            b"ContentType" => {
                                content_type = Some(attr.unescape_value()?.to_string())
                            },
                            _ => {},
                        }
                    }

                    if let (Some(key), Some(ct)) = (key, content_type) {
                        if is_default {
                            map.defaults.insert(key.to_lowercase(), ct);
                        } else {
                            map.overrides.insert(key, ct);
                        }
                    }
                },
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(OpcError::XmlError(format!("Content types parse error: {}", e)));
                },
                _ => {},
            }
            buf.clear();
        }

        Ok(map)
    }

    /// Override first, then the extension default.
    pub(crate) fn get(&self, pack_uri: &PackURI) -> Result<&str> {
        if let Some(ct) = self.overrides.get(pack_uri.as_str()) {
            return Ok(ct);
        }
        self.defaults
            .get(&pack_uri.ext().to_lowercase())
            .map(String::as_str)
            .ok_or_else(|| OpcError::ContentTypeNotFound(pack_uri.to_string()))
    }
}

/// Package relationships and every reachable part.
pub struct PackageReader {
    pkg_rels: Relationships,
    sparts: Vec<SerializedPart>,
}

impl PackageReader {
    /// Walk the relationship graph starting from `/_rels/.rels`.
    pub fn from_phys_reader(mut phys_reader: PhysPkgReader) -> Result<Self> {
        let content_types = ContentTypeMap::from_xml(phys_reader.content_types_xml()?)?;

        let package_uri = PackURI::new(PACKAGE_URI).map_err(OpcError::InvalidPackUri)?;
        let pkg_rels = Self::load_rels(&phys_reader, &package_uri)?;

        let mut sparts = Vec::with_capacity(phys_reader.len());
        let mut visited = HashSet::new();
        let mut work_queue: Vec<PackURI> = Vec::new();

        Self::enqueue_targets(&pkg_rels, &mut visited, &mut work_queue);

        while let Some(partname) = work_queue.pop() {
            let rels = Self::load_rels(&phys_reader, &partname)?;
            Self::enqueue_targets(&rels, &mut visited, &mut work_queue);

            let blob = phys_reader.take(&partname)?;
            let content_type = content_types.get(&partname)?.to_string();
            sparts.push(SerializedPart {
                partname,
                content_type,
                blob,
                rels,
            });
        }

        Ok(Self { pkg_rels, sparts })
    }

    fn load_rels(phys_reader: &PhysPkgReader, source_uri: &PackURI) -> Result<Relationships> {
        match phys_reader.rels_xml_for(source_uri)? {
            Some(xml) => Relationships::from_xml(xml, source_uri.base_uri()),
            None => Ok(Relationships::new(source_uri.base_uri())),
        }
    }

    fn enqueue_targets(
        rels: &Relationships,
        visited: &mut HashSet<PackURI>,
        work_queue: &mut Vec<PackURI>,
    ) {
        for rel in rels.iter().filter(|rel| !rel.is_external()) {
            if let Ok(target) = rel.target_partname()
                && visited.insert(target.clone())
            {
                work_queue.push(target);
            }
        }
    }

    pub fn pkg_rels(&self) -> &Relationships {
        &self.pkg_rels
    }

    /// Split into package relationships and parts.
    pub fn into_parts(self) -> (Relationships, Vec<SerializedPart>) {
        (self.pkg_rels, self.sparts)
    }
}
