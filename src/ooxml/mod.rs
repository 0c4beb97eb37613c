//! Office Open XML support: the OPC container and the PresentationML pieces
//! needed to fill a template deck.

pub mod error;
pub mod opc;
pub mod pptx;

pub use error::{OoxmlError, Result};
pub use opc::OpcPackage;
