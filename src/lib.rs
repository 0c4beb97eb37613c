//! docgen - generate PowerPoint decks from a topic
//!
//! A single linear pipeline:
//!
//! 1. [`generation`] asks a chat model for a [`outline::PresentationOutline`],
//!    retrying transient failures.
//! 2. [`adapter::adapt`] fits the outline to the template's
//!    [`outline::TemplateConstraints`] by truncating text at word boundaries
//!    and dropping surplus bullets and slides.
//! 3. [`ooxml::pptx::resolve`] picks a layout per slide type from the
//!    template's classified placeholders.
//! 4. [`assembler::build`] instantiates one slide per outline entry and saves
//!    the deck atomically.
//!
//! # Example
//!
//! ```no_run
//! use docgen::adapter::adapt;
//! use docgen::assembler::build;
//! use docgen::ooxml::pptx::resolve;
//! use docgen::outline::{PresentationOutline, SlideOutline, SlideType, TemplateConstraints};
//! use std::path::Path;
//!
//! # fn main() -> docgen::Result<()> {
//! let outline = PresentationOutline::new(
//!     "Rust adoption",
//!     vec![
//!         SlideOutline::new(SlideType::Title, "Rust adoption").with_subtitle("2025 review"),
//!         SlideOutline::new(SlideType::Content, "Why now").with_bullets(["Safety", "Speed"]),
//!     ],
//! );
//! let adapted = adapt(&outline, &TemplateConstraints::default());
//! build(&adapted, &resolve, Path::new("templates/corporate/template.pptx"), Path::new("deck.pptx"))?;
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod assembler;
pub mod cli;
pub mod config;
pub mod error;
pub mod generation;
pub mod ooxml;
pub mod outline;
pub mod pipeline;
pub mod templates;

pub use config::Config;
pub use error::{Error, Result};
