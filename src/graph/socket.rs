//! Sockets: named, typed connection points on an element.

use crate::graph::id::ElementId;
use crate::graph::value::{Value, ValueType};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::BitOr;

/// Which socket array of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SocketKind {
    Input,
    Output,
}

impl SocketKind {
    /// Flow flag a pristine socket of this kind reports as `inFlags`.
    pub fn flow_flag(self) -> u8 {
        match self {
            SocketKind::Input => FLOW_INPUT,
            SocketKind::Output => FLOW_OUTPUT,
        }
    }

    pub fn natural_role(self) -> SocketRole {
        match self {
            SocketKind::Input => SocketRole::Input,
            SocketKind::Output => SocketRole::Output,
        }
    }
}

impl fmt::Display for SocketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SocketKind::Input => f.write_str("input"),
            SocketKind::Output => f.write_str("output"),
        }
    }
}

/// Endpoint acts as an input.
pub const FLOW_INPUT: u8 = 1;
/// Endpoint acts as an output.
pub const FLOW_OUTPUT: u8 = 2;

/// Role tag persisted as `siType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SocketRole {
    #[serde(rename = "i")]
    Input,
    #[serde(rename = "o")]
    Output,
    #[serde(rename = "d")]
    Dynamic,
}

impl SocketRole {
    pub fn inverted(self) -> Self {
        match self {
            SocketRole::Input => SocketRole::Output,
            SocketRole::Output => SocketRole::Input,
            SocketRole::Dynamic => SocketRole::Dynamic,
        }
    }

    /// Parses a persisted tag, `None` for anything unknown.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "i" => Some(SocketRole::Input),
            "o" => Some(SocketRole::Output),
            "d" => Some(SocketRole::Dynamic),
            _ => None,
        }
    }

    pub fn as_tag(self) -> &'static str {
        match self {
            SocketRole::Input => "i",
            SocketRole::Output => "o",
            SocketRole::Dynamic => "d",
        }
    }
}

/// Capability bitset: which value types a socket may hold and whether its
/// name is editable.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SocketFlags(pub u8);

impl SocketFlags {
    pub const CAN_HOLD_BOOL: SocketFlags = SocketFlags(1 << 0);
    pub const CAN_HOLD_INT: SocketFlags = SocketFlags(1 << 1);
    pub const CAN_HOLD_FLOAT: SocketFlags = SocketFlags(1 << 2);
    pub const CAN_CHANGE_NAME: SocketFlags = SocketFlags(1 << 3);
    pub const CAN_HOLD_BYTE: SocketFlags = SocketFlags(1 << 4);
    pub const CAN_HOLD_WORD64: SocketFlags = SocketFlags(1 << 5);

    pub const ALL_VALUES: SocketFlags = SocketFlags(
        Self::CAN_HOLD_BOOL.0
            | Self::CAN_HOLD_INT.0
            | Self::CAN_HOLD_FLOAT.0
            | Self::CAN_HOLD_BYTE.0
            | Self::CAN_HOLD_WORD64.0,
    );
    pub const DEFAULT: SocketFlags = SocketFlags(Self::ALL_VALUES.0 | Self::CAN_CHANGE_NAME.0);

    #[inline]
    pub fn contains(self, other: SocketFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn for_type(ty: ValueType) -> SocketFlags {
        match ty {
            ValueType::Bool => Self::CAN_HOLD_BOOL,
            ValueType::Int => Self::CAN_HOLD_INT,
            ValueType::Float => Self::CAN_HOLD_FLOAT,
            ValueType::Byte => Self::CAN_HOLD_BYTE,
            ValueType::Word64 => Self::CAN_HOLD_WORD64,
        }
    }

    #[inline]
    pub fn allows(self, ty: ValueType) -> bool {
        self.contains(Self::for_type(ty))
    }

    #[inline]
    pub fn name_editable(self) -> bool {
        self.contains(Self::CAN_CHANGE_NAME)
    }
}

impl BitOr for SocketFlags {
    type Output = SocketFlags;

    fn bitor(self, rhs: Self) -> Self::Output {
        SocketFlags(self.0 | rhs.0)
    }
}

impl fmt::Debug for SocketFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SocketFlags({:#08b})", self.0)
    }
}

/// Which socket feeds this one once it has been wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SocketBinding {
    pub source: ElementId,
    pub socket: u8,
    pub flags: u8,
}

#[derive(Debug, Clone)]
pub struct Socket {
    pub name: String,
    pub flags: SocketFlags,
    pub role: SocketRole,
    value: Value,
    value_type: ValueType,
    binding: Option<SocketBinding>,
}

impl Socket {
    /// # Panics
    /// If `flags` does not allow `value_type`.
    pub fn new(
        name: impl Into<String>,
        value_type: ValueType,
        flags: SocketFlags,
        role: SocketRole,
    ) -> Self {
        assert!(
            flags.allows(value_type),
            "socket flags {:?} do not allow {}",
            flags,
            value_type
        );
        Self {
            name: name.into(),
            flags,
            role,
            value: Value::zero(value_type),
            value_type,
            binding: None,
        }
    }

    #[inline]
    pub fn value(&self) -> Value {
        self.value
    }

    /// Stores `value` converted to the declared type.
    #[inline]
    pub fn set_value(&mut self, value: impl Into<Value>) {
        self.value = value.into().cast(self.value_type);
    }

    #[inline]
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Changes the declared type and resets the value to its zero.
    /// Returns false when the type is unchanged.
    ///
    /// # Panics
    /// If the capability flags do not allow `ty`.
    pub(crate) fn set_value_type(&mut self, ty: ValueType) -> bool {
        assert!(
            self.flags.allows(ty),
            "socket '{}' cannot hold {} (flags {:?})",
            self.name,
            ty,
            self.flags
        );
        if self.value_type == ty {
            return false;
        }
        self.value_type = ty;
        self.value = Value::zero(ty);
        true
    }

    #[inline]
    pub fn binding(&self) -> Option<SocketBinding> {
        self.binding
    }

    #[inline]
    pub fn is_connected(&self) -> bool {
        self.binding.is_some()
    }

    pub(crate) fn bind(&mut self, binding: SocketBinding) {
        self.binding = Some(binding);
    }

    /// Back to the unconnected state with a zero value.
    pub(crate) fn unbind(&mut self) {
        self.binding = None;
        self.value = Value::zero(self.value_type);
    }

    /// Flow flags as persisted: the bound source's flags, or the kind's
    /// natural flag when unbound.
    pub fn in_flags(&self, kind: SocketKind) -> u8 {
        self.binding.map_or(kind.flow_flag(), |b| b.flags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_sets() {
        assert_eq!(SocketFlags::ALL_VALUES.0, 0b0011_0111);
        assert_eq!(SocketFlags::DEFAULT.0, 0b0011_1111);
        assert!(SocketFlags::DEFAULT.name_editable());
        assert!(!SocketFlags::ALL_VALUES.name_editable());
        assert!(SocketFlags::CAN_HOLD_FLOAT.allows(ValueType::Float));
        assert!(!SocketFlags::CAN_HOLD_FLOAT.allows(ValueType::Int));
    }

    #[test]
    fn test_new_socket_is_zero_and_unbound() {
        let s = Socket::new("in", ValueType::Float, SocketFlags::DEFAULT, SocketRole::Input);
        assert_eq!(s.value(), Value::Float(0.0));
        assert!(!s.is_connected());
        assert_eq!(s.in_flags(SocketKind::Input), FLOW_INPUT);
        assert_eq!(s.in_flags(SocketKind::Output), FLOW_OUTPUT);
    }

    #[test]
    fn test_set_value_casts_to_declared_type() {
        let mut s = Socket::new("x", ValueType::Int, SocketFlags::DEFAULT, SocketRole::Input);
        s.set_value(2.75f32);
        assert_eq!(s.value(), Value::Int(2));
    }

    #[test]
    fn test_type_change_resets_value() {
        let mut s = Socket::new("x", ValueType::Int, SocketFlags::DEFAULT, SocketRole::Output);
        s.set_value(9);
        assert!(!s.set_value_type(ValueType::Int));
        assert_eq!(s.value(), Value::Int(9));
        assert!(s.set_value_type(ValueType::Bool));
        assert_eq!(s.value(), Value::Bool(false));
    }

    #[test]
    #[should_panic(expected = "cannot hold")]
    fn test_disallowed_type_panics() {
        let mut s = Socket::new("x", ValueType::Bool, SocketFlags::CAN_HOLD_BOOL, SocketRole::Input);
        s.set_value_type(ValueType::Float);
    }

    #[test]
    fn test_unbind_resets() {
        let mut s = Socket::new("x", ValueType::Byte, SocketFlags::DEFAULT, SocketRole::Input);
        s.bind(SocketBinding {
            source: ElementId(3),
            socket: 1,
            flags: FLOW_OUTPUT,
        });
        s.set_value(5u8);
        assert_eq!(s.in_flags(SocketKind::Input), FLOW_OUTPUT);
        s.unbind();
        assert_eq!(s.binding(), None);
        assert_eq!(s.value(), Value::Byte(0));
    }

    #[test]
    fn test_role_tags() {
        assert_eq!(SocketRole::from_tag("d"), Some(SocketRole::Dynamic));
        assert_eq!(SocketRole::from_tag("x"), None);
        assert_eq!(SocketRole::Input.inverted(), SocketRole::Output);
        assert_eq!(serde_json::to_string(&SocketRole::Output).unwrap(), "\"o\"");
    }
}
