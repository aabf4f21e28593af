//! Identity type for elements inside a package.
//!
//! An `ElementId` is the element's slot index in its owning package's slot
//! table, so lookup is a direct array index.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index into `Package::elements`. Id 0 names the package's own boundary.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub u32);

impl ElementId {
    pub const BOUNDARY: ElementId = ElementId(0);

    #[inline]
    pub fn is_boundary(self) -> bool {
        self == Self::BOUNDARY
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_boundary() {
            write!(f, "ElementId(BOUNDARY)")
        } else {
            write!(f, "ElementId({})", self.0)
        }
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ElementId {
    fn from(raw: u32) -> Self {
        ElementId(raw)
    }
}
