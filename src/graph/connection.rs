//! Connection records between sockets.
//!
//! A connection's endpoints are resolved to socket arrays by one rule: a
//! source resolves to the element's outputs and a target to its inputs,
//! except for id 0 (the enclosing package's boundary), where the roles flip.
//! The boundary's inputs are what the inner graph reads, and its outputs are
//! what the inner graph writes.

use crate::graph::id::ElementId;
use crate::graph::socket::{SocketKind, FLOW_INPUT, FLOW_OUTPUT};
use std::fmt;

/// One side of a wire: element, socket index and flow flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub id: ElementId,
    pub socket: u8,
    pub flags: u8,
}

impl Endpoint {
    pub fn new(id: impl Into<ElementId>, socket: u8, flags: u8) -> Self {
        Self {
            id: id.into(),
            socket,
            flags,
        }
    }

    /// An element output (or boundary input) feeding a wire.
    pub fn output(id: impl Into<ElementId>, socket: u8) -> Self {
        Self::new(id, socket, FLOW_OUTPUT)
    }

    /// An element input (or boundary output) fed by a wire.
    pub fn input(id: impl Into<ElementId>, socket: u8) -> Self {
        Self::new(id, socket, FLOW_INPUT)
    }

    /// Socket array this endpoint names when it is the source of a wire.
    #[inline]
    pub fn source_kind(&self) -> SocketKind {
        if self.id.is_boundary() {
            SocketKind::Input
        } else {
            SocketKind::Output
        }
    }

    /// Socket array this endpoint names when it is the target of a wire.
    #[inline]
    pub fn target_kind(&self) -> SocketKind {
        if self.id.is_boundary() {
            SocketKind::Output
        } else {
            SocketKind::Input
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}#{}", self.id, self.socket, self.flags)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Connection {
    pub from: Endpoint,
    pub to: Endpoint,
}

impl Connection {
    pub fn new(from: Endpoint, to: Endpoint) -> Self {
        Self { from, to }
    }

    /// Whether this record joins the same pair of elements.
    #[inline]
    pub fn links(&self, from: ElementId, to: ElementId) -> bool {
        self.from.id == from && self.to.id == to
    }

    #[inline]
    pub fn touches(&self, id: ElementId) -> bool {
        self.from.id == id || self.to.id == id
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_duality() {
        let boundary = Endpoint::output(ElementId(0), 0);
        assert_eq!(boundary.source_kind(), SocketKind::Input);
        assert_eq!(boundary.target_kind(), SocketKind::Output);

        let inner = Endpoint::output(ElementId(4), 1);
        assert_eq!(inner.source_kind(), SocketKind::Output);
        assert_eq!(inner.target_kind(), SocketKind::Input);
    }

    #[test]
    fn test_links_and_touches() {
        let c = Connection::new(Endpoint::output(ElementId(1), 0), Endpoint::input(ElementId(2), 3));
        assert!(c.links(ElementId(1), ElementId(2)));
        assert!(!c.links(ElementId(2), ElementId(1)));
        assert!(c.touches(ElementId(2)));
        assert!(!c.touches(ElementId(3)));
        assert_eq!(c.to_string(), "1@0#2 -> 2@3#1");
    }
}
