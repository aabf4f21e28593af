//! Test data builders for creating packages

use super::test_registry;
use patchbay::graph::{ElementId, Endpoint, Package};

/// Builder for a root package wired from registered test elements
pub struct PackageBuilder {
    package: Package,
    ids: Vec<ElementId>,
}

impl PackageBuilder {
    pub fn new() -> Self {
        Self {
            package: Package::with_registry(test_registry()),
            ids: Vec::new(),
        }
    }

    /// Adds an element; later calls refer to it by the order it was added.
    pub fn element(mut self, type_tag: &str) -> Self {
        let id = self.package.add(type_tag).unwrap();
        self.ids.push(id);
        self
    }

    /// Wires output `out` of the `from`-th element into input `input` of
    /// the `to`-th element.
    pub fn wire(mut self, from: usize, out: u8, to: usize, input: u8) -> Self {
        let (from, to) = (self.ids[from], self.ids[to]);
        self.package.connect(Endpoint::output(from, out), Endpoint::input(to, input));
        self
    }

    /// `count` elements of `type_tag`, each feeding the next.
    pub fn chain(mut self, type_tag: &str, count: usize) -> Self {
        let first = self.ids.len();
        for i in 0..count {
            self = self.element(type_tag);
            if i > 0 {
                self = self.wire(first + i - 1, 0, first + i, 0);
            }
        }
        self
    }

    pub fn build(self) -> (Package, Vec<ElementId>) {
        (self.package, self.ids)
    }
}

impl Default for PackageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::elements::RELAY;

    #[test]
    fn test_chain_builder() {
        let (package, ids) = PackageBuilder::new().chain(RELAY, 3).build();

        assert_eq!(ids, vec![ElementId(1), ElementId(2), ElementId(3)]);
        assert_eq!(package.connections().len(), 2);
        package.check_invariants().unwrap();
    }
}
