//! Element abstraction.
//!
//! Two layers:
//! - **`ElementCore`**: the state every element shares (identity, metadata,
//!   socket arrays, bounds, event bus).
//! - **`Element` trait**: the per-kind hooks (`compute`, `reset`,
//!   `on_update`, `on_event`, persistence). Concrete kinds embed an
//!   `ElementCore` and hand it out through `core`/`core_mut`.
//!
//! Mutations that must notify listeners live on [`ElementExt`], which is
//! implemented for every element, boxed or not.

use crate::graph::document::{ElementDocument, ElementFields, IoFields, NodeFields, Position, SocketFields};
use crate::graph::error::{GraphError, GraphResult};
use crate::graph::event::{ElementEvent, EventBus};
use crate::graph::id::ElementId;
use crate::graph::package::Package;
use crate::graph::socket::{Socket, SocketFlags, SocketKind, SocketRole};
use crate::graph::value::{Value, ValueType};
use crossbeam_channel::Receiver;
use std::time::Duration;

/// Where an element's inputs face, derived from its rotate/invertH flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Right,
    Left,
    Up,
    Down,
}

impl Orientation {
    pub fn from_flags(rotate: bool, invert_h: bool) -> Self {
        match (rotate, invert_h) {
            (false, false) => Orientation::Right,
            (false, true) => Orientation::Left,
            (true, false) => Orientation::Up,
            (true, true) => Orientation::Down,
        }
    }
}

/// State shared by every element kind.
#[derive(Debug)]
pub struct ElementCore {
    id: ElementId,
    type_tag: String,
    name: String,
    pub description: String,
    pub position: Position,
    pub rotate: bool,
    pub invert_h: bool,
    pub iconified: bool,
    /// Presentation-only, carried so documents round-trip.
    pub iconifying_hides_central_widget: bool,
    inputs: Vec<Socket>,
    outputs: Vec<Socket>,
    min_inputs: u8,
    max_inputs: u8,
    min_outputs: u8,
    max_outputs: u8,
    pub default_new_input_flags: SocketFlags,
    pub default_new_output_flags: SocketFlags,
    owned: bool,
    events: EventBus,
}

impl Default for ElementCore {
    fn default() -> Self {
        Self::new("")
    }
}

impl ElementCore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ElementId::BOUNDARY,
            type_tag: String::new(),
            name: name.into(),
            description: String::new(),
            position: Position::default(),
            rotate: false,
            invert_h: false,
            iconified: false,
            iconifying_hides_central_widget: false,
            inputs: Vec::new(),
            outputs: Vec::new(),
            min_inputs: 0,
            max_inputs: u8::MAX,
            min_outputs: 0,
            max_outputs: u8::MAX,
            default_new_input_flags: SocketFlags::DEFAULT,
            default_new_output_flags: SocketFlags::DEFAULT,
            owned: false,
            events: EventBus::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> ElementId {
        self.id
    }

    /// Called by the owning package when the element takes a slot.
    pub(crate) fn assign(&mut self, id: ElementId, type_tag: &str) {
        self.id = id;
        self.type_tag = type_tag.to_string();
        self.owned = true;
    }

    /// Takes over `other`'s slot identity and subscribers. Used when a
    /// package body is replaced wholesale.
    pub(crate) fn adopt_identity(&mut self, other: &mut ElementCore) {
        self.id = other.id;
        self.type_tag = other.type_tag.clone();
        self.owned = other.owned;
        std::mem::swap(&mut self.events, &mut other.events);
    }

    pub(crate) fn set_type_tag(&mut self, type_tag: &str) {
        self.type_tag = type_tag.to_string();
    }

    #[inline]
    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    /// False only for a root package.
    #[inline]
    pub fn is_owned(&self) -> bool {
        self.owned
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn orientation(&self) -> Orientation {
        Orientation::from_flags(self.rotate, self.invert_h)
    }

    // ── Sockets ──

    #[inline]
    pub fn inputs(&self) -> &[Socket] {
        &self.inputs
    }

    #[inline]
    pub fn outputs(&self) -> &[Socket] {
        &self.outputs
    }

    #[inline]
    pub fn sockets(&self, kind: SocketKind) -> &[Socket] {
        match kind {
            SocketKind::Input => &self.inputs,
            SocketKind::Output => &self.outputs,
        }
    }

    #[inline]
    pub(crate) fn sockets_mut(&mut self, kind: SocketKind) -> &mut Vec<Socket> {
        match kind {
            SocketKind::Input => &mut self.inputs,
            SocketKind::Output => &mut self.outputs,
        }
    }

    /// # Panics
    /// If `index` is out of range.
    pub fn socket(&self, kind: SocketKind, index: u8) -> &Socket {
        let sockets = self.sockets(kind);
        sockets.get(index as usize).unwrap_or_else(|| {
            panic!(
                "element {:?} has no {} socket {} (count {})",
                self.id,
                kind,
                index,
                sockets.len()
            )
        })
    }

    /// # Panics
    /// If `index` is out of range.
    pub fn socket_mut(&mut self, kind: SocketKind, index: u8) -> &mut Socket {
        let id = self.id;
        let sockets = self.sockets_mut(kind);
        let count = sockets.len();
        sockets.get_mut(index as usize).unwrap_or_else(|| {
            panic!("element {:?} has no {} socket {} (count {})", id, kind, index, count)
        })
    }

    #[inline]
    pub fn input_value(&self, index: u8) -> Value {
        self.socket(SocketKind::Input, index).value()
    }

    #[inline]
    pub fn output_value(&self, index: u8) -> Value {
        self.socket(SocketKind::Output, index).value()
    }

    #[inline]
    pub fn set_output_value(&mut self, index: u8, value: impl Into<Value>) {
        self.socket_mut(SocketKind::Output, index).set_value(value);
    }

    // ── Bounds ──

    pub fn min_sockets(&self, kind: SocketKind) -> u8 {
        match kind {
            SocketKind::Input => self.min_inputs,
            SocketKind::Output => self.min_outputs,
        }
    }

    pub fn max_sockets(&self, kind: SocketKind) -> u8 {
        match kind {
            SocketKind::Input => self.max_inputs,
            SocketKind::Output => self.max_outputs,
        }
    }

    /// Rejects a minimum above the current maximum.
    pub fn set_min_sockets(&mut self, kind: SocketKind, min: u8) -> GraphResult<()> {
        let max = self.max_sockets(kind);
        if min > max {
            return Err(GraphError::InvalidBounds { kind, min, max });
        }
        match kind {
            SocketKind::Input => self.min_inputs = min,
            SocketKind::Output => self.min_outputs = min,
        }
        Ok(())
    }

    /// Rejects a maximum below the current minimum.
    pub fn set_max_sockets(&mut self, kind: SocketKind, max: u8) -> GraphResult<()> {
        let min = self.min_sockets(kind);
        if max < min {
            return Err(GraphError::InvalidBounds { kind, min, max });
        }
        match kind {
            SocketKind::Input => self.max_inputs = max,
            SocketKind::Output => self.max_outputs = max,
        }
        Ok(())
    }

    pub fn set_min_inputs(&mut self, min: u8) -> GraphResult<()> {
        self.set_min_sockets(SocketKind::Input, min)
    }

    pub fn set_max_inputs(&mut self, max: u8) -> GraphResult<()> {
        self.set_max_sockets(SocketKind::Input, max)
    }

    pub fn set_min_outputs(&mut self, min: u8) -> GraphResult<()> {
        self.set_min_sockets(SocketKind::Output, min)
    }

    pub fn set_max_outputs(&mut self, max: u8) -> GraphResult<()> {
        self.set_max_sockets(SocketKind::Output, max)
    }

    // ── Events ──

    pub fn subscribe(&mut self) -> Receiver<ElementEvent> {
        self.events.subscribe()
    }

    pub(crate) fn publish(&mut self, event: &ElementEvent) {
        self.events.publish(event);
    }

    // ── Persistence ──

    pub fn to_document(&self) -> ElementDocument {
        ElementDocument {
            element: ElementFields {
                id: self.id,
                name: self.name.clone(),
                description: self.description.clone(),
                type_tag: self.type_tag.clone(),
                rotate: self.rotate,
                invert_h: self.invert_h,
                min_inputs: self.min_inputs,
                max_inputs: self.max_inputs,
                min_outputs: self.min_outputs,
                max_outputs: self.max_outputs,
                default_new_input_flags: self.default_new_input_flags,
                default_new_output_flags: self.default_new_output_flags,
                io: IoFields {
                    inputs: write_sockets(SocketKind::Input, &self.inputs),
                    outputs: write_sockets(SocketKind::Output, &self.outputs),
                },
            },
            node: NodeFields {
                position: self.position,
                iconify: self.iconified,
                iconifying_hides_central_widget: self.iconifying_hides_central_widget,
                inputs_position: None,
                outputs_position: None,
            },
            package: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Replaces metadata, bounds and both socket arrays from `doc`.
    ///
    /// With `invert_roles` every socket takes the opposite of its array's
    /// natural role, which is how a root package reads its boundary.
    /// Nothing is modified when the document is rejected.
    pub fn apply_document(&mut self, doc: &ElementDocument, invert_roles: bool) -> GraphResult<()> {
        let fields = &doc.element;
        for (kind, min, max) in [
            (SocketKind::Input, fields.min_inputs, fields.max_inputs),
            (SocketKind::Output, fields.min_outputs, fields.max_outputs),
        ] {
            if min > max {
                return Err(GraphError::InvalidBounds { kind, min, max });
            }
        }

        let inputs = read_sockets(SocketKind::Input, &fields.io.inputs, fields.max_inputs, invert_roles)?;
        let outputs = read_sockets(SocketKind::Output, &fields.io.outputs, fields.max_outputs, invert_roles)?;

        self.name = fields.name.clone();
        self.description = fields.description.clone();
        self.rotate = fields.rotate;
        self.invert_h = fields.invert_h;
        self.min_inputs = fields.min_inputs;
        self.max_inputs = fields.max_inputs;
        self.min_outputs = fields.min_outputs;
        self.max_outputs = fields.max_outputs;
        self.default_new_input_flags = fields.default_new_input_flags;
        self.default_new_output_flags = fields.default_new_output_flags;
        self.inputs = inputs;
        self.outputs = outputs;
        self.position = doc.node.position;
        self.iconified = doc.node.iconify;
        self.iconifying_hides_central_widget = doc.node.iconifying_hides_central_widget;
        Ok(())
    }
}

fn write_sockets(kind: SocketKind, sockets: &[Socket]) -> Vec<SocketFields> {
    sockets
        .iter()
        .enumerate()
        .map(|(i, s)| SocketFields {
            socket: i as u8,
            value_type: s.value_type(),
            role: Some(s.role.as_tag().to_string()),
            name: s.name.clone(),
            flags: s.flags,
            in_flags: Some(s.in_flags(kind)),
        })
        .collect()
}

fn read_sockets(
    kind: SocketKind,
    fields: &[SocketFields],
    max: u8,
    invert_roles: bool,
) -> GraphResult<Vec<Socket>> {
    if fields.len() > max as usize {
        return Err(GraphError::InvalidDocument(format!(
            "{} {}s exceed the maximum of {}",
            fields.len(),
            kind,
            max
        )));
    }
    fields
        .iter()
        .enumerate()
        .map(|(i, f)| {
            if f.socket as usize != i {
                return Err(GraphError::InvalidDocument(format!(
                    "{} socket {} listed at position {}",
                    kind, f.socket, i
                )));
            }
            if !f.flags.allows(f.value_type) {
                return Err(GraphError::InvalidDocument(format!(
                    "{} socket {} flags {:?} do not allow {}",
                    kind, i, f.flags, f.value_type
                )));
            }
            let role = if invert_roles {
                kind.natural_role().inverted()
            } else {
                f.role
                    .as_deref()
                    .and_then(SocketRole::from_tag)
                    .unwrap_or_else(|| kind.natural_role())
            };
            Ok(Socket::new(f.name.clone(), f.value_type, f.flags, role))
        })
        .collect()
}

/// Per-kind behaviour of an element.
pub trait Element: Send {
    fn core(&self) -> &ElementCore;

    fn core_mut(&mut self) -> &mut ElementCore;

    /// Called once per tick, after values have been propagated.
    fn compute(&mut self);

    /// Called once when the element is added to a package.
    fn reset(&mut self) {}

    /// Called every tick before `compute` with the time since the last tick.
    fn on_update(&mut self, _dt: Duration) {}

    /// Sees every event before external subscribers do.
    fn on_event(&mut self, _event: &ElementEvent) {}

    fn serialize(&self) -> ElementDocument {
        self.core().to_document()
    }

    fn deserialize(&mut self, doc: &ElementDocument) -> GraphResult<()> {
        self.core_mut().apply_document(doc, false)
    }

    fn as_package(&self) -> Option<&Package> {
        None
    }

    fn as_package_mut(&mut self) -> Option<&mut Package> {
        None
    }
}

/// Notifying mutations available on every element.
pub trait ElementExt: Element {
    /// Delivers `event` to the element's own hook, then to subscribers.
    fn emit(&mut self, event: ElementEvent) {
        self.on_event(&event);
        self.core_mut().publish(&event);
    }

    /// Appends a socket at the zero value of `value_type`.
    ///
    /// # Panics
    /// If `flags` do not allow `value_type`.
    fn add_socket(
        &mut self,
        kind: SocketKind,
        value_type: ValueType,
        name: &str,
        flags: SocketFlags,
        role: SocketRole,
    ) -> GraphResult<u8> {
        let core = self.core_mut();
        let max = core.max_sockets(kind);
        let sockets = core.sockets_mut(kind);
        if sockets.len() >= max as usize {
            return Err(GraphError::SocketLimit { kind, max });
        }
        let index = sockets.len() as u8;
        sockets.push(Socket::new(name, value_type, flags, role));
        tracing::trace!("Element {:?} added {} {} '{}'", core.id(), kind, index, name);
        self.emit(ElementEvent::SocketAdded { kind, index });
        Ok(index)
    }

    fn add_input(&mut self, value_type: ValueType, name: &str, flags: SocketFlags) -> GraphResult<u8> {
        self.add_socket(SocketKind::Input, value_type, name, flags, SocketRole::Input)
    }

    fn add_output(&mut self, value_type: ValueType, name: &str, flags: SocketFlags) -> GraphResult<u8> {
        self.add_socket(SocketKind::Output, value_type, name, flags, SocketRole::Output)
    }

    /// Pops the last socket of `kind`. The minimum is not enforced, so an
    /// element can be shrunk below `min_sockets` by its caller.
    fn remove_socket(&mut self, kind: SocketKind) -> Option<Socket> {
        let socket = self.core_mut().sockets_mut(kind).pop()?;
        let index = self.core().sockets(kind).len() as u8;
        self.emit(ElementEvent::SocketRemoved { kind, index });
        Some(socket)
    }

    /// Returns false when the name is unchanged.
    fn set_name(&mut self, name: &str) -> bool {
        if self.core().name == name {
            return false;
        }
        let from = std::mem::replace(&mut self.core_mut().name, name.to_string());
        self.emit(ElementEvent::Renamed {
            from,
            to: name.to_string(),
        });
        true
    }

    /// Returns false when the name is unchanged.
    ///
    /// # Panics
    /// If `index` is out of range.
    fn set_socket_name(&mut self, kind: SocketKind, index: u8, name: &str) -> bool {
        let socket = self.core_mut().socket_mut(kind, index);
        if socket.name == name {
            return false;
        }
        let from = std::mem::replace(&mut socket.name, name.to_string());
        self.emit(ElementEvent::SocketRenamed {
            kind,
            index,
            from,
            to: name.to_string(),
        });
        true
    }

    /// Changes a socket's declared type, resetting its value. Returns false
    /// when the type is unchanged.
    ///
    /// # Panics
    /// If `index` is out of range or the socket's flags do not allow
    /// `value_type`.
    fn set_socket_value_type(&mut self, kind: SocketKind, index: u8, value_type: ValueType) -> bool {
        let socket = self.core_mut().socket_mut(kind, index);
        let from = socket.value_type();
        if !socket.set_value_type(value_type) {
            return false;
        }
        self.emit(ElementEvent::SocketTypeChanged {
            kind,
            index,
            from,
            to: value_type,
        });
        true
    }

    fn console(&mut self, text: &str) {
        tracing::info!(target: "patchbay::console", "[{}] {}", self.core().name(), text);
        self.emit(ElementEvent::Console {
            text: text.to_string(),
        });
    }
}

impl<T: Element + ?Sized> ElementExt for T {}
