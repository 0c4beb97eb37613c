//! Physical (ZIP) container of an OPC package.
//!
//! The reader decompresses every member up front; decks and their templates
//! are small, and the relationship walk in `pkgreader` touches nearly all of
//! them anyway.

use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::{CONTENT_TYPES_URI, PackURI};
use std::collections::HashMap;
use std::io::{Cursor, Read, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// In-memory view of every member of a ZIP-based package, keyed by membername.
pub struct PhysPkgReader {
    members: HashMap<String, Vec<u8>>,
}

impl PhysPkgReader {
    /// Open a package file from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(OpcError::PackageNotFound(path.display().to_string()));
        }
        let data = std::fs::read(path)?;
        Self::from_bytes(&data)
    }

    /// Read every file member of a ZIP archive held in memory.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(data))?;
        let mut members = HashMap::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().trim_start_matches('/').to_string();
            let mut blob = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut blob)?;
            members.insert(name, blob);
        }

        Ok(Self { members })
    }

    pub fn content_types_xml(&self) -> Result<&[u8]> {
        self.members
            .get(CONTENT_TYPES_URI.trim_start_matches('/'))
            .map(Vec::as_slice)
            .ok_or_else(|| OpcError::PartNotFound(CONTENT_TYPES_URI.to_string()))
    }

    /// The .rels XML for `source_uri`, if the source has any relationships.
    pub fn rels_xml_for(&self, source_uri: &PackURI) -> Result<Option<&[u8]>> {
        let rels_uri = source_uri.rels_uri().map_err(OpcError::InvalidPackUri)?;
        Ok(self.members.get(rels_uri.membername()).map(Vec::as_slice))
    }

    /// Move a member's content out of the reader.
    pub fn take(&mut self, pack_uri: &PackURI) -> Result<Vec<u8>> {
        self.members
            .remove(pack_uri.membername())
            .ok_or_else(|| OpcError::PartNotFound(pack_uri.to_string()))
    }

    #[inline]
    pub fn contains(&self, pack_uri: &PackURI) -> bool {
        self.members.contains_key(pack_uri.membername())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Writes package members into a deflate-compressed ZIP held in memory.
pub struct PhysPkgWriter {
    zip: ZipWriter<Cursor<Vec<u8>>>,
    options: SimpleFileOptions,
}

impl PhysPkgWriter {
    pub fn new() -> Self {
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
            options: SimpleFileOptions::default().compression_method(CompressionMethod::Deflated),
        }
    }

    /// Add one member to the archive.
    pub fn write(&mut self, pack_uri: &PackURI, blob: &[u8]) -> Result<()> {
        self.zip.start_file(pack_uri.membername(), self.options)?;
        self.zip.write_all(blob)?;
        Ok(())
    }

    /// Finish the central directory and return the archive bytes.
    pub fn finish(self) -> Result<Vec<u8>> {
        Ok(self.zip.finish()?.into_inner())
    }
}

impl Default for PhysPkgWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read_members() {
        let mut writer = PhysPkgWriter::new();
        let ct = PackURI::new(CONTENT_TYPES_URI).unwrap();
        let slide = PackURI::new("/ppt/slides/slide1.xml").unwrap();
        writer.write(&ct, b"<Types/>").unwrap();
        writer.write(&slide, b"<p:sld/>").unwrap();
        let bytes = writer.finish().unwrap();

        let mut reader = PhysPkgReader::from_bytes(&bytes).unwrap();
        assert_eq!(reader.len(), 2);
        assert_eq!(reader.content_types_xml().unwrap(), b"<Types/>");
        assert!(reader.contains(&slide));
        assert_eq!(reader.take(&slide).unwrap(), b"<p:sld/>");
        assert!(!reader.contains(&slide));
    }

    #[test]
    fn test_rejects_non_zip() {
        assert!(PhysPkgReader::from_bytes(b"definitely not a zip").is_err());
    }

    #[test]
    fn test_open_missing_file() {
        let err = PhysPkgReader::open("/nonexistent/deck.pptx").err().unwrap();
        assert!(matches!(err, OpcError::PackageNotFound(_)));
    }
}
