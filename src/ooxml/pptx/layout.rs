//! Slide layouts of a template and the choice of layout per slide type.
//!
//! Classification reads only the declared placeholder kind, never geometry or
//! shape names, and runs once when the template is opened.

use crate::ooxml::opc::PackURI;
use crate::ooxml::pptx::shapes::{Placeholder, PlaceholderKind, PlaceholderRole};
use crate::outline::SlideType;
use smallvec::SmallVec;
use std::collections::BTreeMap;

/// One layout available in a template.
#[derive(Debug, Clone)]
pub struct LayoutDescriptor {
    /// Position in the template's layout list (masters in order, then each
    /// master's layouts in order)
    pub index: usize,
    pub name: String,
    pub partname: PackURI,
    placeholders: SmallVec<[Placeholder; 8]>,
    placeholder_roles: BTreeMap<u32, PlaceholderRole>,
}

impl LayoutDescriptor {
    pub fn new(
        index: usize,
        name: impl Into<String>,
        partname: PackURI,
        placeholders: SmallVec<[Placeholder; 8]>,
    ) -> Self {
        let placeholder_roles = classify(&placeholders);
        Self {
            index,
            name: name.into(),
            partname,
            placeholders,
            placeholder_roles,
        }
    }

    /// Placeholders in shape-tree order.
    #[inline]
    pub fn placeholders(&self) -> &[Placeholder] {
        &self.placeholders
    }

    /// Placeholder idx to role.
    #[inline]
    pub fn placeholder_roles(&self) -> &BTreeMap<u32, PlaceholderRole> {
        &self.placeholder_roles
    }

    /// First placeholder with `role`.
    pub fn find_role(&self, role: PlaceholderRole) -> Option<&Placeholder> {
        self.placeholders.iter().find(|ph| ph.role() == role)
    }

    /// First generic object placeholder.
    pub fn find_object(&self) -> Option<&Placeholder> {
        self.placeholders
            .iter()
            .find(|ph| ph.kind == PlaceholderKind::Object)
    }

    #[inline]
    pub fn has_role(&self, role: PlaceholderRole) -> bool {
        self.find_role(role).is_some()
    }

    /// Body placeholder, or an object placeholder standing in for one.
    #[inline]
    pub fn has_body_capable(&self) -> bool {
        self.has_role(PlaceholderRole::Body) || self.find_object().is_some()
    }

    fn name_matches(&self, names: &[&str]) -> bool {
        let name = self.name.trim();
        names.iter().any(|candidate| name.eq_ignore_ascii_case(candidate))
    }

    /// Does this layout suit `slide_type` by name or by composition?
    pub fn matches(&self, slide_type: SlideType) -> bool {
        match slide_type {
            SlideType::Title => {
                self.name_matches(&["Title Slide", "Title"])
                    || (self.has_role(PlaceholderRole::Title) && !self.has_body_capable())
            },
            SlideType::Content | SlideType::Closing => {
                self.name_matches(&["Title and Content"])
                    || (self.has_role(PlaceholderRole::Title) && self.has_body_capable())
            },
        }
    }
}

/// Role of every placeholder, keyed by its idx.
///
/// Placeholders sharing an idx keep the first declaration.
pub fn classify(placeholders: &[Placeholder]) -> BTreeMap<u32, PlaceholderRole> {
    let mut roles = BTreeMap::new();
    for ph in placeholders {
        roles.entry(ph.idx).or_insert_with(|| ph.role());
    }
    roles
}

/// The first layout, in declared order, suited to `slide_type`; the first
/// layout when none is. `None` only for an empty list.
pub fn resolve(layouts: &[LayoutDescriptor], slide_type: SlideType) -> Option<&LayoutDescriptor> {
    layouts
        .iter()
        .find(|layout| layout.matches(slide_type))
        .or_else(|| layouts.first())
}
