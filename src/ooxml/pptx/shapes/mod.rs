/// Shapes module for PowerPoint presentations.
///
/// Only placeholder shapes matter here: they are what a layout offers to
/// generated content.
pub mod placeholder;

pub use placeholder::{Placeholder, PlaceholderKind, PlaceholderRole};
