/// Typed views over the PresentationML parts a template is read from.
pub mod presentation;
pub mod slide;

pub use presentation::PresentationPart;
pub use slide::{SlideLayoutPart, SlideMasterPart};
