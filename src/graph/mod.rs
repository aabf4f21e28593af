//! The dataflow graph: elements, their sockets, and packages that own and
//! evaluate them.
//!
//! ## Modules
//!
//! - `value`: socket value cells and declared types
//! - `socket`: typed connection points with capability flags
//! - `element`: the `Element` trait and shared `ElementCore` state
//! - `connection`: wire records and the boundary resolution rule
//! - `package`: slot table, wiring, tick evaluation, persistence
//! - `registry`: element factories and the package file index
//! - `document`: persisted JSON shape

pub mod connection;
pub mod document;
pub mod element;
pub mod error;
pub mod event;
pub mod id;
pub mod package;
pub mod registry;
pub mod socket;
pub mod value;

pub use connection::{Connection, Endpoint};
pub use document::{ElementDocument, Position};
pub use element::{Element, ElementCore, ElementExt, Orientation};
pub use error::{GraphError, GraphResult};
pub use event::{ElementEvent, EventBus};
pub use id::ElementId;
pub use package::{Package, PACKAGE_TYPE};
pub use registry::{ElementInfo, PackageInfo, Registry};
pub use socket::{Socket, SocketBinding, SocketFlags, SocketKind, SocketRole, FLOW_INPUT, FLOW_OUTPUT};
pub use value::{Value, ValueType};
