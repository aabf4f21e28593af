//! Socket value cells.
//!
//! A `Value` is a tagged union over the five scalar kinds a socket can carry.
//! Sockets keep the active variant in step with their declared `ValueType`;
//! writes of another variant go through [`Value::cast`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared type of a socket, persisted as `bool`, `int`, `float`, `byte`
/// or `word64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    #[default]
    Bool,
    Int,
    Float,
    Byte,
    Word64,
}

impl ValueType {
    pub const ALL: [ValueType; 5] = [
        ValueType::Bool,
        ValueType::Int,
        ValueType::Float,
        ValueType::Byte,
        ValueType::Word64,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ValueType::Bool => "bool",
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::Byte => "byte",
            ValueType::Word64 => "word64",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current value of a socket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i32),
    Float(f32),
    Byte(u8),
    Word64(u64),
}

impl Value {
    /// The zero value a socket of type `ty` starts with.
    pub fn zero(ty: ValueType) -> Self {
        match ty {
            ValueType::Bool => Value::Bool(false),
            ValueType::Int => Value::Int(0),
            ValueType::Float => Value::Float(0.0),
            ValueType::Byte => Value::Byte(0),
            ValueType::Word64 => Value::Word64(0),
        }
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Bool(_) => ValueType::Bool,
            Value::Int(_) => ValueType::Int,
            Value::Float(_) => ValueType::Float,
            Value::Byte(_) => ValueType::Byte,
            Value::Word64(_) => ValueType::Word64,
        }
    }

    /// Converts to `ty` with numeric `as` semantics. Booleans map to 0/1 and
    /// numbers become `true` when non-zero.
    pub fn cast(self, ty: ValueType) -> Self {
        if self.value_type() == ty {
            return self;
        }
        match ty {
            ValueType::Bool => Value::Bool(self.as_bool()),
            ValueType::Int => Value::Int(match self {
                Value::Bool(b) => b as i32,
                Value::Int(v) => v,
                Value::Float(v) => v as i32,
                Value::Byte(v) => v as i32,
                Value::Word64(v) => v as i32,
            }),
            ValueType::Float => Value::Float(self.as_f64() as f32),
            ValueType::Byte => Value::Byte(match self {
                Value::Bool(b) => b as u8,
                Value::Int(v) => v as u8,
                Value::Float(v) => v as u8,
                Value::Byte(v) => v,
                Value::Word64(v) => v as u8,
            }),
            ValueType::Word64 => Value::Word64(match self {
                Value::Bool(b) => b as u64,
                Value::Int(v) => v as u64,
                Value::Float(v) => v as u64,
                Value::Byte(v) => v as u64,
                Value::Word64(v) => v,
            }),
        }
    }

    pub fn as_bool(&self) -> bool {
        match *self {
            Value::Bool(b) => b,
            Value::Int(v) => v != 0,
            Value::Float(v) => v != 0.0,
            Value::Byte(v) => v != 0,
            Value::Word64(v) => v != 0,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match *self {
            Value::Bool(b) => b as u8 as f64,
            Value::Int(v) => v as f64,
            Value::Float(v) => v as f64,
            Value::Byte(v) => v as f64,
            Value::Word64(v) => v as f64,
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Bool(false)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Value::Byte(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Word64(v)
    }
}
