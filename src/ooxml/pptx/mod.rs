//! PowerPoint (.pptx) template support.
//!
//! A template is opened once, its layouts are classified, its slides are
//! cleared, and new slides are instantiated from layouts:
//!
//! ```rust,ignore
//! use docgen::ooxml::pptx::{Package, layout};
//! use docgen::outline::SlideType;
//!
//! let mut pkg = Package::open("template.pptx")?;
//! let layouts = pkg.layouts()?;
//! let title = layout::resolve(&layouts, SlideType::Title).unwrap();
//! pkg.clear_slides()?;
//! pkg.add_slide(title, &[], None)?;
//! ```

pub mod layout;
pub mod package;
pub mod parts;
pub mod shapes;
pub mod template;
pub mod writer;

pub use layout::{LayoutDescriptor, resolve};
pub use package::Package;
pub use shapes::{Placeholder, PlaceholderKind, PlaceholderRole};
pub use writer::PlaceholderText;
