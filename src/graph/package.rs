//! Package: a container of elements and connections that is itself an
//! element.
//!
//! Elements live in a slot table indexed by [`ElementId`]. Slot 0 is the
//! package's own boundary and is never handed out; freed slots are reused
//! lowest-first. Each tick ([`Package::calculate`]):
//! 1. Copy every connection's source value to its target, in insertion order.
//! 2. Call `on_update` and `compute` on every element, in slot order.
//!
//! Values therefore advance one wire per tick: in a chain A -> B -> C, what A
//! writes during tick n reaches C's input during tick n + 2.

use crate::graph::connection::{Connection, Endpoint};
use crate::graph::document::{ConnectionDocument, ElementDocument, PackageFields, Position};
use crate::graph::element::{Element, ElementCore, ElementExt};
use crate::graph::error::{GraphError, GraphResult};
use crate::graph::id::ElementId;
use crate::graph::registry::{PackageInfo, Registry};
use crate::graph::socket::{Socket, SocketBinding, SocketKind, SocketRole};
use crate::graph::value::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Type tag of the package element.
pub const PACKAGE_TYPE: &str = "logic/package";

pub struct Package {
    core: ElementCore,
    /// Slot 0 stays `None`: it is the package itself.
    elements: Vec<Option<Box<dyn Element>>>,
    free: BTreeSet<u32>,
    connections: Vec<Connection>,
    dependents: BTreeMap<ElementId, BTreeSet<ElementId>>,
    pub inputs_position: Position,
    pub outputs_position: Position,
    pub package_description: String,
    pub package_path: String,
    pub package_icon: String,
    external: bool,
    delta: Duration,
    registry: Option<Arc<Registry>>,
    /// Package paths being loaded by enclosing packages; set only while a
    /// document is deserialized.
    resolving: Vec<String>,
}

impl Default for Package {
    fn default() -> Self {
        Self::new()
    }
}

impl Package {
    /// An empty package without a registry. Nested packages receive their
    /// owner's registry when added.
    pub fn new() -> Self {
        let mut core = ElementCore::new("Package");
        core.set_type_tag(PACKAGE_TYPE);
        Self {
            core,
            elements: vec![None],
            free: BTreeSet::new(),
            connections: Vec::new(),
            dependents: BTreeMap::new(),
            inputs_position: Position::default(),
            outputs_position: Position::default(),
            package_description: String::new(),
            package_path: String::new(),
            package_icon: String::new(),
            external: false,
            delta: Duration::ZERO,
            registry: None,
            resolving: Vec::new(),
        }
    }

    pub fn with_registry(registry: Arc<Registry>) -> Self {
        let mut package = Self::new();
        package.registry = Some(registry);
        package
    }

    pub fn registry(&self) -> Option<&Arc<Registry>> {
        self.registry.as_ref()
    }

    pub fn set_registry(&mut self, registry: Arc<Registry>) {
        self.registry = Some(registry);
    }

    /// A root package has no owner and is driven directly by an engine.
    #[inline]
    pub fn is_root(&self) -> bool {
        !self.core.is_owned()
    }

    /// Whether the body was loaded from a registered package file.
    #[inline]
    pub fn is_external(&self) -> bool {
        self.external
    }

    /// Time step last handed to this package by `on_update`.
    #[inline]
    pub fn delta(&self) -> Duration {
        self.delta
    }

    // ── Slot table ──

    /// Creates an element of `type_tag` and places it in the lowest free
    /// slot, or a new one at the end. Reuse is lowest-first, not
    /// most-recently-freed.
    pub fn add(&mut self, type_tag: &str) -> GraphResult<ElementId> {
        let registry = self.registry.clone().ok_or(GraphError::NoRegistry)?;
        let mut element = registry.create(type_tag)?;

        let id = match self.free.pop_first() {
            Some(slot) => ElementId(slot),
            None => {
                self.elements.push(None);
                ElementId((self.elements.len() - 1) as u32)
            }
        };

        element.core_mut().assign(id, type_tag);
        if element.core().name().is_empty() {
            if let Some(info) = registry.info(type_tag) {
                element.set_name(&info.name);
            }
        }
        if let Some(package) = element.as_package_mut() {
            package.registry = Some(registry.clone());
        }
        element.reset();

        self.elements[id.index()] = Some(element);
        tracing::debug!("Added element {:?} of type '{}'", id, type_tag);
        Ok(id)
    }

    /// Drops the element in slot `id` and frees the slot. Connections that
    /// reference it stay in place and are skipped while the slot is vacant.
    ///
    /// # Panics
    /// If `id` is 0 or not occupied.
    pub fn remove(&mut self, id: ElementId) -> Box<dyn Element> {
        assert!(!id.is_boundary(), "cannot remove a package's own boundary");
        let element = self
            .elements
            .get_mut(id.index())
            .and_then(Option::take)
            .unwrap_or_else(|| panic!("cannot remove {:?}: slot is not occupied", id));
        self.free.insert(id.0);
        tracing::debug!("Removed element {:?}", id);
        element
    }

    /// Id 0 is the package itself.
    ///
    /// # Panics
    /// If `id` is not occupied.
    pub fn get(&self, id: ElementId) -> &dyn Element {
        match self.try_get(id) {
            Some(element) => element,
            None => panic!("no element {:?} in package '{}'", id, self.core.name()),
        }
    }

    /// # Panics
    /// If `id` is not occupied.
    pub fn get_mut(&mut self, id: ElementId) -> &mut dyn Element {
        if id.is_boundary() {
            return self;
        }
        match self.elements.get_mut(id.index()) {
            Some(Some(element)) => &mut **element,
            _ => panic!("no element {:?} in package", id),
        }
    }

    pub fn try_get(&self, id: ElementId) -> Option<&dyn Element> {
        if id.is_boundary() {
            return Some(self);
        }
        match self.elements.get(id.index()) {
            Some(Some(element)) => Some(&**element),
            _ => None,
        }
    }

    pub fn try_get_mut(&mut self, id: ElementId) -> Option<&mut dyn Element> {
        if id.is_boundary() {
            return Some(self);
        }
        match self.elements.get_mut(id.index()) {
            Some(Some(element)) => Some(&mut **element),
            _ => None,
        }
    }

    #[inline]
    pub fn contains(&self, id: ElementId) -> bool {
        id.is_boundary() || matches!(self.elements.get(id.index()), Some(Some(_)))
    }

    /// Occupied ids in slot order, excluding the package itself.
    pub fn ids(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(i, _)| ElementId(i as u32))
    }

    pub fn elements(&self) -> impl Iterator<Item = &dyn Element> + '_ {
        self.elements
            .iter()
            .filter_map(|slot| slot.as_ref().map(|e| &**e as &dyn Element))
    }

    pub fn element_count(&self) -> usize {
        self.elements.iter().filter(|slot| slot.is_some()).count()
    }

    /// Length of the slot table, slot 0 included.
    pub fn slot_count(&self) -> usize {
        self.elements.len()
    }

    pub fn free_slots(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.free.iter().map(|&slot| ElementId(slot))
    }

    // ── Wiring ──

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Direct targets fed by `id`.
    pub fn dependents(&self, id: ElementId) -> Option<&BTreeSet<ElementId>> {
        self.dependents.get(&id)
    }

    pub fn dependents_map(&self) -> &BTreeMap<ElementId, BTreeSet<ElementId>> {
        &self.dependents
    }

    /// Wires `from` into `to`. The target socket's binding is overwritten
    /// if it already had a source.
    ///
    /// # Panics
    /// If either endpoint names a vacant slot or a nonexistent socket.
    pub fn connect(&mut self, from: Endpoint, to: Endpoint) {
        if let Err(e) = self.try_connect(from, to) {
            panic!("cannot connect {} -> {}: {}", from, to, e);
        }
    }

    /// Like [`Package::connect`], reporting bad endpoints as errors.
    pub fn try_connect(&mut self, from: Endpoint, to: Endpoint) -> GraphResult<()> {
        self.socket_checked(from.id, from.source_kind(), from.socket)?;
        let target = self.socket_checked_mut(to.id, to.target_kind(), to.socket)?;
        target.bind(SocketBinding {
            source: from.id,
            socket: from.socket,
            flags: from.flags,
        });

        self.connections.push(Connection::new(from, to));
        self.dependents.entry(from.id).or_default().insert(to.id);
        tracing::debug!("Connected {} -> {}", from, to);
        Ok(())
    }

    /// Wires `from` into input `socket` of element `target`.
    ///
    /// The package's own inputs are fed by its owner, so `target` 0 is
    /// rejected as [`GraphError::Detached`].
    pub fn connect_input(
        &mut self,
        target: ElementId,
        socket: u8,
        flags: u8,
        from: Endpoint,
    ) -> GraphResult<()> {
        if target.is_boundary() {
            return Err(GraphError::Detached(self.core.id()));
        }
        self.try_connect(from, Endpoint::new(target, socket, flags))
    }

    /// Removes every record equal to `from -> to` and resets the target
    /// socket. Returns false when no such record existed, in which case
    /// nothing changes.
    pub fn disconnect(&mut self, from: Endpoint, to: Endpoint) -> bool {
        let before = self.connections.len();
        self.connections.retain(|c| !(c.from == from && c.to == to));
        if self.connections.len() == before {
            return false;
        }

        if let Ok(target) = self.socket_checked_mut(to.id, to.target_kind(), to.socket) {
            target.unbind();
        }

        let still_linked = self.connections.iter().any(|c| c.links(from.id, to.id));
        if !still_linked {
            if let Some(targets) = self.dependents.get_mut(&from.id) {
                targets.remove(&to.id);
                if targets.is_empty() {
                    self.dependents.remove(&from.id);
                }
            }
        }

        tracing::debug!("Disconnected {} -> {}", from, to);
        true
    }

    fn resolve(&self, id: ElementId, kind: SocketKind) -> Option<&[Socket]> {
        if id.is_boundary() {
            return Some(self.core.sockets(kind));
        }
        match self.elements.get(id.index()) {
            Some(Some(element)) => Some(element.core().sockets(kind)),
            _ => None,
        }
    }

    fn resolve_mut(&mut self, id: ElementId, kind: SocketKind) -> Option<&mut Vec<Socket>> {
        if id.is_boundary() {
            return Some(self.core.sockets_mut(kind));
        }
        match self.elements.get_mut(id.index()) {
            Some(Some(element)) => Some(element.core_mut().sockets_mut(kind)),
            _ => None,
        }
    }

    fn socket_checked(&self, id: ElementId, kind: SocketKind, socket: u8) -> GraphResult<&Socket> {
        let sockets = self.resolve(id, kind).ok_or(GraphError::UnknownElement(id))?;
        sockets.get(socket as usize).ok_or(GraphError::SocketOutOfRange {
            id,
            kind,
            socket,
            count: sockets.len(),
        })
    }

    fn socket_checked_mut(
        &mut self,
        id: ElementId,
        kind: SocketKind,
        socket: u8,
    ) -> GraphResult<&mut Socket> {
        let sockets = self.resolve_mut(id, kind).ok_or(GraphError::UnknownElement(id))?;
        let count = sockets.len();
        sockets
            .get_mut(socket as usize)
            .ok_or(GraphError::SocketOutOfRange {
                id,
                kind,
                socket,
                count,
            })
    }

    /// Whether both endpoints currently resolve to a socket.
    fn resolves(&self, connection: &Connection) -> bool {
        let Connection { from, to } = connection;
        self.socket_checked(from.id, from.source_kind(), from.socket).is_ok()
            && self.socket_checked(to.id, to.target_kind(), to.socket).is_ok()
    }

    // ── Evaluation ──

    /// One tick: propagate along every connection, then compute every
    /// element. Connections with a vacant endpoint or a socket index that no
    /// longer exists are skipped.
    pub fn calculate(&mut self) {
        #[cfg(debug_assertions)]
        if let Err(violation) = self.check_invariants() {
            panic!("package '{}' is inconsistent: {}", self.core.name(), violation);
        }

        for i in 0..self.connections.len() {
            let Connection { from, to } = self.connections[i];
            let value: Option<Value> = self
                .resolve(from.id, from.source_kind())
                .and_then(|sockets| sockets.get(from.socket as usize))
                .map(Socket::value);
            let Some(value) = value else {
                tracing::trace!("Skipping dangling source {}", from);
                continue;
            };
            match self
                .resolve_mut(to.id, to.target_kind())
                .and_then(|sockets| sockets.get_mut(to.socket as usize))
            {
                Some(target) => target.set_value(value),
                None => tracing::trace!("Skipping dangling target {}", to),
            }
        }

        let delta = self.delta;
        for element in self.elements.iter_mut().flatten() {
            element.on_update(delta);
            element.compute();
        }
    }

    /// Checks the slot table and the dependents index against the
    /// connection list.
    pub fn check_invariants(&self) -> Result<(), String> {
        if self.elements.first().map_or(true, Option::is_some) {
            return Err("slot 0 must be reserved for the package".into());
        }
        if self.free.contains(&0) {
            return Err("slot 0 is marked free".into());
        }
        if let Some(&last) = self.free.last() {
            if last as usize >= self.elements.len() {
                return Err(format!("free slot {} is past the end of the table", last));
            }
        }
        for (i, slot) in self.elements.iter().enumerate().skip(1) {
            let free = self.free.contains(&(i as u32));
            match slot {
                Some(_) if free => return Err(format!("slot {} is both occupied and free", i)),
                None if !free => return Err(format!("slot {} is neither occupied nor free", i)),
                Some(element) if element.core().id().index() != i => {
                    return Err(format!(
                        "slot {} holds an element with id {:?}",
                        i,
                        element.core().id()
                    ))
                }
                _ => {}
            }
        }

        let mut derived: BTreeMap<ElementId, BTreeSet<ElementId>> = BTreeMap::new();
        for c in &self.connections {
            derived.entry(c.from.id).or_default().insert(c.to.id);
        }
        if derived != self.dependents {
            return Err(format!(
                "dependents {:?} do not match connections {:?}",
                self.dependents, derived
            ));
        }
        Ok(())
    }

    // ── Files ──

    /// Replaces this package's contents with the document at `path`. On
    /// any error the package is left untouched.
    pub fn open(&mut self, path: impl AsRef<Path>) -> GraphResult<()> {
        let path = path.as_ref();
        tracing::debug!("Opening package {:?}", path);
        let doc = ElementDocument::read_file(path)?;

        let mut fresh = Package::new();
        fresh.registry = self.registry.clone();
        fresh.core.adopt_identity(&mut self.core);
        if let Err(e) = fresh.deserialize(&doc) {
            self.core.adopt_identity(&mut fresh.core);
            return Err(e);
        }
        fresh.external = fresh.core.is_owned();
        *self = fresh;
        tracing::info!(
            "Opened package {:?}: {} elements, {} connections",
            path,
            self.element_count(),
            self.connections.len()
        );
        Ok(())
    }

    pub fn save(&self, path: impl AsRef<Path>) -> GraphResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.serialize().to_json_pretty()?)?;
        tracing::debug!("Saved package {:?}", path);
        Ok(())
    }

    /// Reads just the package header of a file.
    pub fn info_for(path: impl AsRef<Path>) -> GraphResult<PackageInfo> {
        let path = path.as_ref();
        let doc = ElementDocument::read_file(path)?;
        let package = doc.package.ok_or_else(|| {
            GraphError::InvalidDocument(format!("{} has no package section", path.display()))
        })?;
        Ok(PackageInfo {
            path: package.path,
            filename: path.display().to_string(),
            icon: package.icon,
        })
    }

    fn load_body(&self, fields: &PackageFields) -> GraphResult<PackageFields> {
        if !self.external {
            return Ok(fields.clone());
        }
        if self.resolving.contains(&fields.path) {
            return Err(GraphError::RecursivePackage(fields.path.clone()));
        }
        let registry = self.registry.as_ref().ok_or(GraphError::NoRegistry)?;
        let info = registry
            .find_package(&fields.path)
            .ok_or_else(|| GraphError::ExternalPackageNotFound(fields.path.clone()))?;
        tracing::debug!("External package '{}' resolved to {}", fields.path, info.filename);
        Ok(ElementDocument::read_file(&info.filename)?
            .package
            .unwrap_or_default())
    }
}

fn remap(table: &BTreeMap<ElementId, ElementId>, endpoint: Endpoint) -> GraphResult<Endpoint> {
    let id = *table
        .get(&endpoint.id)
        .ok_or(GraphError::UnknownElement(endpoint.id))?;
    Ok(Endpoint { id, ..endpoint })
}

impl Element for Package {
    fn core(&self) -> &ElementCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ElementCore {
        &mut self.core
    }

    fn compute(&mut self) {
        self.calculate();
    }

    fn on_update(&mut self, dt: Duration) {
        self.delta = dt;
    }

    fn serialize(&self) -> ElementDocument {
        let mut doc = self.core.to_document();
        for socket in &mut doc.element.io.inputs {
            socket.role = Some(SocketRole::Input.as_tag().to_string());
        }
        for socket in &mut doc.element.io.outputs {
            socket.role = Some(SocketRole::Output.as_tag().to_string());
        }
        doc.node.inputs_position = Some(self.inputs_position);
        doc.node.outputs_position = Some(self.outputs_position);

        let (elements, connections) = if self.external {
            (None, None)
        } else {
            let elements: Vec<ElementDocument> = self.elements.iter().flatten().map(|e| e.serialize()).collect();
            let connections: Vec<ConnectionDocument> = self
                .connections
                .iter()
                .filter(|c| self.resolves(c))
                .map(ConnectionDocument::from)
                .collect();
            (Some(elements), Some(connections))
        };
        doc.package = Some(PackageFields {
            description: self.package_description.clone(),
            path: self.package_path.clone(),
            icon: self.package_icon.clone(),
            elements,
            connections,
        });
        doc
    }

    /// Children are re-added through the registry, so their ids may differ
    /// from the document's; connections are rewritten through the
    /// resulting id table.
    fn deserialize(&mut self, doc: &ElementDocument) -> GraphResult<()> {
        let is_root = self.is_root();
        let fields = doc.package.clone().unwrap_or_default();
        self.external = !is_root && !fields.path.is_empty();
        let body = self.load_body(&fields)?;
        let mut chain = std::mem::take(&mut self.resolving);
        if !fields.path.is_empty() {
            chain.push(fields.path.clone());
        }

        self.core.apply_document(doc, is_root)?;
        self.package_description = fields.description;
        self.package_path = fields.path;
        self.package_icon = fields.icon;
        self.inputs_position = doc.node.inputs_position.unwrap_or_default();
        self.outputs_position = doc.node.outputs_position.unwrap_or_default();

        let mut table = BTreeMap::from([(ElementId::BOUNDARY, ElementId::BOUNDARY)]);
        for child in body.elements.iter().flatten() {
            let old = child.element.id;
            if old.is_boundary() || table.contains_key(&old) {
                return Err(GraphError::InvalidDocument(format!(
                    "child id {:?} is reserved or repeated",
                    old
                )));
            }
            let id = self.add(&child.element.type_tag)?;
            let element = self.get_mut(id);
            if let Some(package) = element.as_package_mut() {
                package.resolving = chain.clone();
            }
            element.deserialize(child)?;
            table.insert(old, id);
        }
        for c in body.connections.iter().flatten() {
            let from = remap(&table, c.connect.into())?;
            let to = remap(&table, c.to.into())?;
            self.try_connect(from, to)?;
        }
        tracing::debug!(
            "Deserialized package '{}' (root: {}, external: {})",
            self.core.name(),
            is_root,
            self.external
        );
        Ok(())
    }

    fn as_package(&self) -> Option<&Package> {
        Some(self)
    }

    fn as_package_mut(&mut self) -> Option<&mut Package> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::socket::{SocketFlags, FLOW_INPUT, FLOW_OUTPUT};
    use crate::graph::value::ValueType;
    use proptest::prelude::*;

    /// One int input, one int output; output = input + 1.
    struct Inc {
        core: ElementCore,
    }

    impl Default for Inc {
        fn default() -> Self {
            let mut inc = Inc {
                core: ElementCore::default(),
            };
            inc.add_input(ValueType::Int, "in", SocketFlags::DEFAULT).unwrap();
            inc.add_output(ValueType::Int, "out", SocketFlags::DEFAULT).unwrap();
            inc
        }
    }

    impl Element for Inc {
        fn core(&self) -> &ElementCore {
            &self.core
        }

        fn core_mut(&mut self) -> &mut ElementCore {
            &mut self.core
        }

        fn compute(&mut self) {
            let Value::Int(v) = self.core.input_value(0) else {
                return;
            };
            self.core.set_output_value(0, v + 1);
        }
    }

    fn package() -> Package {
        let mut registry = Registry::new();
        registry.register::<Inc>("test/inc", "Inc");
        Package::with_registry(Arc::new(registry))
    }

    #[test]
    fn test_add_assigns_identity() {
        let mut p = package();
        let a = p.add("test/inc").unwrap();
        assert_eq!(a, ElementId(1));
        let e = p.get(a);
        assert_eq!(e.core().id(), a);
        assert_eq!(e.core().type_tag(), "test/inc");
        assert_eq!(e.core().name(), "Inc");
        assert!(e.core().is_owned());
        assert!(p.is_root());
    }

    #[test]
    fn test_add_without_registry() {
        let mut p = Package::new();
        assert!(matches!(p.add("test/inc"), Err(GraphError::NoRegistry)));
    }

    #[test]
    fn test_slot_zero_is_self() {
        let p = package();
        assert_eq!(p.get(ElementId::BOUNDARY).core().type_tag(), PACKAGE_TYPE);
        assert!(p.get(ElementId::BOUNDARY).as_package().is_some());
        assert_eq!(p.element_count(), 0);
    }

    #[test]
    #[should_panic(expected = "own boundary")]
    fn test_remove_boundary_panics() {
        package().remove(ElementId::BOUNDARY);
    }

    #[test]
    #[should_panic(expected = "not occupied")]
    fn test_remove_vacant_panics() {
        let mut p = package();
        let a = p.add("test/inc").unwrap();
        p.remove(a);
        p.remove(a);
    }

    #[test]
    #[should_panic(expected = "no element")]
    fn test_get_freed_panics() {
        let mut p = package();
        let a = p.add("test/inc").unwrap();
        p.remove(a);
        p.get(a);
    }

    #[test]
    fn test_connect_binds_target() {
        let mut p = package();
        let a = p.add("test/inc").unwrap();
        let b = p.add("test/inc").unwrap();
        p.connect(Endpoint::output(a, 0), Endpoint::input(b, 0));

        let binding = p.get(b).core().inputs()[0].binding().unwrap();
        assert_eq!(binding.source, a);
        assert_eq!(binding.flags, FLOW_OUTPUT);
        assert_eq!(p.dependents(a).unwrap().len(), 1);
        p.check_invariants().unwrap();
    }

    #[test]
    #[should_panic(expected = "cannot connect")]
    fn test_connect_bad_socket_panics() {
        let mut p = package();
        let a = p.add("test/inc").unwrap();
        let b = p.add("test/inc").unwrap();
        p.connect(Endpoint::output(a, 3), Endpoint::input(b, 0));
    }

    #[test]
    fn test_try_connect_reports_and_leaves_state() {
        let mut p = package();
        let a = p.add("test/inc").unwrap();
        let err = p
            .try_connect(Endpoint::output(a, 0), Endpoint::input(ElementId(9), 0))
            .unwrap_err();
        assert!(matches!(err, GraphError::UnknownElement(ElementId(9))));
        assert!(p.connections().is_empty());
        assert!(p.dependents_map().is_empty());
    }

    #[test]
    fn test_connect_input_rejects_boundary() {
        let mut p = package();
        let a = p.add("test/inc").unwrap();
        assert!(matches!(
            p.connect_input(ElementId::BOUNDARY, 0, FLOW_INPUT, Endpoint::output(a, 0)),
            Err(GraphError::Detached(_))
        ));
        let b = p.add("test/inc").unwrap();
        p.connect_input(b, 0, FLOW_INPUT, Endpoint::output(a, 0)).unwrap();
        assert_eq!(p.connections().len(), 1);
    }

    #[test]
    fn test_disconnect_unknown_is_noop() {
        let mut p = package();
        let a = p.add("test/inc").unwrap();
        let b = p.add("test/inc").unwrap();
        assert!(!p.disconnect(Endpoint::output(a, 0), Endpoint::input(b, 0)));
        p.check_invariants().unwrap();
    }

    #[test]
    fn test_calculate_increments() {
        let mut p = package();
        let a = p.add("test/inc").unwrap();
        let b = p.add("test/inc").unwrap();
        p.connect(Endpoint::output(a, 0), Endpoint::input(b, 0));

        p.calculate();
        assert_eq!(p.get(a).core().output_value(0), Value::Int(1));
        assert_eq!(p.get(b).core().output_value(0), Value::Int(1));
        p.calculate();
        assert_eq!(p.get(b).core().input_value(0), Value::Int(1));
        assert_eq!(p.get(b).core().output_value(0), Value::Int(2));
    }

    #[test]
    fn test_invariant_checker_catches_drift() {
        let mut p = package();
        let a = p.add("test/inc").unwrap();
        p.dependents.entry(a).or_default().insert(ElementId(5));
        assert!(p.check_invariants().unwrap_err().contains("dependents"));
    }

    proptest! {
        #[test]
        fn prop_slot_reuse_lowest_first(ops in proptest::collection::vec(any::<(bool, u8)>(), 1..64)) {
            let mut p = package();
            let mut live: BTreeSet<ElementId> = BTreeSet::new();
            for (add, pick) in ops {
                if add || live.is_empty() {
                    let expected = p.free.first().map(|&s| ElementId(s))
                        .unwrap_or(ElementId(p.elements.len() as u32));
                    let id = p.add("test/inc").unwrap();
                    prop_assert_eq!(id, expected);
                    prop_assert!(!id.is_boundary());
                    live.insert(id);
                } else {
                    let id = *live.iter().nth(pick as usize % live.len()).unwrap();
                    p.remove(id);
                    live.remove(&id);
                }
                prop_assert!(p.check_invariants().is_ok());
                prop_assert_eq!(p.ids().collect::<BTreeSet<_>>(), live.clone());
            }
        }
    }
}
