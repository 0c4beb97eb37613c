//! XML writers for the parts a generated deck adds to its template.

pub mod pres;
pub mod slide;

pub use pres::{FIRST_SLIDE_ID, SlideIdEntry, replace_slide_id_list, strip_slide_references};
pub use slide::{PlaceholderText, notes_slide_xml, slide_xml};
