//! Parts of an OPC package.
//!
//! Every part is held as raw bytes plus its relationships; the presentation
//! layer reads and rewrites XML blobs itself rather than keeping a DOM.

use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::PackURI;
use crate::ooxml::opc::rel::Relationships;

/// A single part: partname, content type, content, and outgoing relationships.
#[derive(Debug, Clone)]
pub struct Part {
    partname: PackURI,
    content_type: String,
    blob: Vec<u8>,
    rels: Relationships,
}

impl Part {
    /// Create a part with no relationships.
    pub fn new(partname: PackURI, content_type: impl Into<String>, blob: Vec<u8>) -> Self {
        let rels = Relationships::new(partname.base_uri());
        Self {
            partname,
            content_type: content_type.into(),
            blob,
            rels,
        }
    }

    /// Create a part with relationships read from the package.
    pub fn with_rels(
        partname: PackURI,
        content_type: impl Into<String>,
        blob: Vec<u8>,
        rels: Relationships,
    ) -> Self {
        Self {
            partname,
            content_type: content_type.into(),
            blob,
            rels,
        }
    }

    #[inline]
    pub fn partname(&self) -> &PackURI {
        &self.partname
    }

    #[inline]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    #[inline]
    pub fn set_content_type(&mut self, content_type: impl Into<String>) {
        self.content_type = content_type.into();
    }

    #[inline]
    pub fn blob(&self) -> &[u8] {
        &self.blob
    }

    #[inline]
    pub fn set_blob(&mut self, blob: Vec<u8>) {
        self.blob = blob;
    }

    #[inline]
    pub fn rels(&self) -> &Relationships {
        &self.rels
    }

    #[inline]
    pub fn rels_mut(&mut self) -> &mut Relationships {
        &mut self.rels
    }

    /// Relate this part to `target`, returning the rId.
    pub fn relate_to(&mut self, target: &PackURI, reltype: &str) -> String {
        self.rels.get_or_add(reltype, target)
    }

    /// Partname targeted by the relationship `r_id`.
    pub fn related_partname(&self, r_id: &str) -> Result<PackURI> {
        self.rels
            .get(r_id)
            .ok_or_else(|| {
                OpcError::RelationshipNotFound(format!("{} in {}", r_id, self.partname))
            })?
            .target_partname()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relate_to_and_resolve() {
        let mut part = Part::new(
            PackURI::new("/ppt/slides/slide1.xml").unwrap(),
            "application/xml",
            b"<p:sld/>".to_vec(),
        );
        let layout = PackURI::new("/ppt/slideLayouts/slideLayout1.xml").unwrap();

        let r_id = part.relate_to(&layout, "layout");
        assert_eq!(r_id, "rId1");
        assert_eq!(part.related_partname(&r_id).unwrap(), layout);
        assert!(part.related_partname("rId9").is_err());
    }
}
