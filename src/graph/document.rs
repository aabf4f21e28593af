//! Persisted document shape for elements and packages.
//!
//! ```json
//! { "element": { "id": 1, "name": "...", "type": "math/add", "io": { ... } },
//!   "node": { "position": { "x": 0.0, "y": 0.0 }, "iconify": false, ... },
//!   "package": { "description": "", "path": "", "icon": "",
//!                "elements": [ ... ], "connections": [ ... ] } }
//! ```
//!
//! Top-level sections other than `element`, `node` and `package` are kept in
//! [`ElementDocument::extra`] so concrete element kinds can persist their own
//! state.

use crate::graph::connection::{Connection, Endpoint};
use crate::graph::error::GraphResult;
use crate::graph::id::ElementId;
use crate::graph::socket::SocketFlags;
use crate::graph::value::ValueType;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElementDocument {
    pub element: ElementFields,

    #[serde(default)]
    pub node: NodeFields,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<PackageFields>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ElementDocument {
    pub fn from_json(json: &str) -> GraphResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> GraphResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn read_file(path: impl AsRef<Path>) -> GraphResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementFields {
    #[serde(default)]
    pub id: ElementId,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(rename = "type")]
    pub type_tag: String,

    #[serde(default)]
    pub rotate: bool,

    #[serde(rename = "invertH", default)]
    pub invert_h: bool,

    #[serde(default)]
    pub min_inputs: u8,

    #[serde(default = "default_max_sockets")]
    pub max_inputs: u8,

    #[serde(default)]
    pub min_outputs: u8,

    #[serde(default = "default_max_sockets")]
    pub max_outputs: u8,

    #[serde(default = "default_new_socket_flags")]
    pub default_new_input_flags: SocketFlags,

    #[serde(default = "default_new_socket_flags")]
    pub default_new_output_flags: SocketFlags,

    #[serde(default)]
    pub io: IoFields,
}

fn default_max_sockets() -> u8 {
    u8::MAX
}

fn default_new_socket_flags() -> SocketFlags {
    SocketFlags::DEFAULT
}

impl Default for ElementFields {
    fn default() -> Self {
        Self {
            id: ElementId::BOUNDARY,
            name: String::new(),
            description: String::new(),
            type_tag: String::new(),
            rotate: false,
            invert_h: false,
            min_inputs: 0,
            max_inputs: u8::MAX,
            min_outputs: 0,
            max_outputs: u8::MAX,
            default_new_input_flags: SocketFlags::DEFAULT,
            default_new_output_flags: SocketFlags::DEFAULT,
            io: IoFields::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IoFields {
    #[serde(default)]
    pub inputs: Vec<SocketFields>,
    #[serde(default)]
    pub outputs: Vec<SocketFields>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocketFields {
    pub socket: u8,

    #[serde(rename = "type")]
    pub value_type: ValueType,

    /// Role tag; unknown or missing tags fall back to the array's role.
    #[serde(rename = "siType", default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    #[serde(default)]
    pub name: String,

    #[serde(default = "default_new_socket_flags")]
    pub flags: SocketFlags,

    #[serde(rename = "inFlags", default, skip_serializing_if = "Option::is_none")]
    pub in_flags: Option<u8>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeFields {
    #[serde(default)]
    pub position: Position,

    #[serde(default)]
    pub iconify: bool,

    #[serde(default)]
    pub iconifying_hides_central_widget: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs_position: Option<Position>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs_position: Option<Position>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackageFields {
    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub path: String,

    #[serde(default)]
    pub icon: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elements: Option<Vec<ElementDocument>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connections: Option<Vec<ConnectionDocument>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointDocument {
    pub id: ElementId,
    pub socket: u8,
    #[serde(default)]
    pub flags: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionDocument {
    pub connect: EndpointDocument,
    pub to: EndpointDocument,
}

impl From<Endpoint> for EndpointDocument {
    fn from(e: Endpoint) -> Self {
        Self {
            id: e.id,
            socket: e.socket,
            flags: e.flags,
        }
    }
}

impl From<EndpointDocument> for Endpoint {
    fn from(e: EndpointDocument) -> Self {
        Endpoint::new(e.id, e.socket, e.flags)
    }
}

impl From<&Connection> for ConnectionDocument {
    fn from(c: &Connection) -> Self {
        Self {
            connect: c.from.into(),
            to: c.to.into(),
        }
    }
}
