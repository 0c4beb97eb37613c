//! Open Packaging Conventions (OPC): the ZIP-of-parts container under every
//! Office Open XML file.
//!
//! - Package structure (parts, relationships)
//! - Content type management
//! - ZIP-based physical packaging

pub mod constants;
pub mod error;
pub mod package;
pub mod packuri;
pub mod part;
pub mod phys_pkg;
pub mod pkgreader;
pub mod pkgwriter;
pub mod rel;

pub use error::OpcError;
pub use package::OpcPackage;
pub use packuri::PackURI;
pub use part::Part;
pub use rel::{Relationship, Relationships};
