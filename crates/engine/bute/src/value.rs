//! Tagged value type for attribute-file entries
//!
//! Every attribute holds exactly one [`Value`]. Composite payloads
//! (rect, point, vector, range) are owned by the variant itself, so a
//! value is freed automatically when its entry is dropped or retyped.
//! String payloads share storage with the owning file's string pool.

use crate::{Error, Result};
use glam::Vec3;
use std::fmt;
use std::sync::Arc;

/// Axis-aligned rectangle with integer edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }
}

/// Integer 2D point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Closed numeric interval
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Range {
    pub min: f32,
    pub max: f32,
}

impl Range {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }
}

/// Discriminant of a [`Value`], for type queries without touching the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Null,
    Int,
    Dword,
    Byte,
    Bool,
    Float,
    Double,
    String,
    Rect,
    Point,
    Vector,
    Range,
}

/// A value stored in an attribute table
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Entry exists but has never been typed
    #[default]
    Null,
    Int(i32),
    Dword(u32),
    Byte(u8),
    Bool(bool),
    Float(f32),
    Double(f64),
    /// Reference into the owning file's interned string pool
    String(Arc<str>),
    Rect(Rect),
    Point(Point),
    Vector(Vec3),
    Range(Range),
}

impl Value {
    /// Get the kind of this value
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Int(_) => ValueKind::Int,
            Value::Dword(_) => ValueKind::Dword,
            Value::Byte(_) => ValueKind::Byte,
            Value::Bool(_) => ValueKind::Bool,
            Value::Float(_) => ValueKind::Float,
            Value::Double(_) => ValueKind::Double,
            Value::String(_) => ValueKind::String,
            Value::Rect(_) => ValueKind::Rect,
            Value::Point(_) => ValueKind::Point,
            Value::Vector(_) => ValueKind::Vector,
            Value::Range(_) => ValueKind::Range,
        }
    }

    /// Get the type name of this value
    pub fn type_name(&self) -> &'static str {
        match self.kind() {
            ValueKind::Null => "null",
            ValueKind::Int => "int",
            ValueKind::Dword => "dword",
            ValueKind::Byte => "byte",
            ValueKind::Bool => "bool",
            ValueKind::Float => "float",
            ValueKind::Double => "double",
            ValueKind::String => "string",
            ValueKind::Rect => "rect",
            ValueKind::Point => "point",
            ValueKind::Vector => "vector",
            ValueKind::Range => "range",
        }
    }

    /// Check if value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    fn type_error(&self, expected: &str) -> Error {
        Error::TypeError {
            expected: expected.to_string(),
            actual: self.type_name().to_string(),
        }
    }

    /// Numeric payload widened to f64, for cross-coercion between
    /// the scalar kinds. Strings and composites do not coerce.
    fn as_number(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Dword(d) => Some(*d as f64),
            Value::Byte(b) => Some(*b as f64),
            Value::Bool(b) => Some(*b as u8 as f64),
            Value::Float(f) => Some(*f as f64),
            Value::Double(d) => Some(*d),
            _ => None,
        }
    }

    /// Try to get as i32
    pub fn as_int(&self) -> Result<i32> {
        self.as_number()
            .map(|n| n as i32)
            .ok_or_else(|| self.type_error("int"))
    }

    /// Try to get as u32
    pub fn as_dword(&self) -> Result<u32> {
        let n = self.as_number().ok_or_else(|| self.type_error("dword"))?;
        if n >= 0.0 && n <= u32::MAX as f64 {
            Ok(n as u32)
        } else {
            Err(Error::TypeError {
                expected: "dword".to_string(),
                actual: format!("value {} out of u32 range", n),
            })
        }
    }

    /// Try to get as u8
    pub fn as_byte(&self) -> Result<u8> {
        let n = self.as_number().ok_or_else(|| self.type_error("byte"))?;
        if n >= 0.0 && n <= u8::MAX as f64 {
            Ok(n as u8)
        } else {
            Err(Error::TypeError {
                expected: "byte".to_string(),
                actual: format!("value {} out of u8 range", n),
            })
        }
    }

    /// Try to get as bool (any nonzero numeric is true)
    pub fn as_bool(&self) -> Result<bool> {
        match self {
            Value::Bool(b) => Ok(*b),
            _ => self
                .as_number()
                .map(|n| n != 0.0)
                .ok_or_else(|| self.type_error("bool")),
        }
    }

    /// Try to get as f32
    pub fn as_float(&self) -> Result<f32> {
        self.as_number()
            .map(|n| n as f32)
            .ok_or_else(|| self.type_error("float"))
    }

    /// Try to get as f64
    pub fn as_double(&self) -> Result<f64> {
        self.as_number().ok_or_else(|| self.type_error("double"))
    }

    /// Try to get as string
    pub fn as_str(&self) -> Result<&str> {
        match self {
            Value::String(s) => Ok(s),
            _ => Err(self.type_error("string")),
        }
    }

    /// Try to get as rect
    pub fn as_rect(&self) -> Result<Rect> {
        match self {
            Value::Rect(r) => Ok(*r),
            _ => Err(self.type_error("rect")),
        }
    }

    /// Try to get as point
    pub fn as_point(&self) -> Result<Point> {
        match self {
            Value::Point(p) => Ok(*p),
            _ => Err(self.type_error("point")),
        }
    }

    /// Try to get as vector
    pub fn as_vector(&self) -> Result<Vec3> {
        match self {
            Value::Vector(v) => Ok(*v),
            _ => Err(self.type_error("vector")),
        }
    }

    /// Try to get as range
    pub fn as_range(&self) -> Result<Range> {
        match self {
            Value::Range(r) => Ok(*r),
            _ => Err(self.type_error("range")),
        }
    }
}

/// Write a float in source-literal form. Whole numbers keep a trailing
/// decimal so they reload as floats, not ints.
fn write_float(f: &mut fmt::Formatter<'_>, v: f64) -> fmt::Result {
    if v.is_finite() && v.fract() == 0.0 {
        write!(f, "{:.1}", v)
    } else {
        write!(f, "{}", v)
    }
}

/// Displays the value in the literal form the parser consumes.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "0"),
            Value::Int(i) => write!(f, "{}", i),
            Value::Dword(d) => write!(f, "{}", d),
            Value::Byte(b) => write!(f, "{}", b),
            Value::Bool(b) => write!(f, "{}", *b as u8),
            Value::Float(v) => write_float(f, *v as f64),
            Value::Double(v) => write_float(f, *v),
            Value::String(s) => {
                write!(f, "\"")?;
                for ch in s.chars() {
                    match ch {
                        '"' => write!(f, "\\\"")?,
                        '\\' => write!(f, "\\\\")?,
                        '\n' => write!(f, "\\n")?,
                        '\t' => write!(f, "\\t")?,
                        _ => write!(f, "{}", ch)?,
                    }
                }
                write!(f, "\"")
            }
            Value::Rect(r) => write!(f, "({}, {}, {}, {})", r.left, r.top, r.right, r.bottom),
            Value::Point(p) => write!(f, "({}, {})", p.x, p.y),
            Value::Vector(v) => {
                write!(f, "<")?;
                write_float(f, v.x as f64)?;
                write!(f, ", ")?;
                write_float(f, v.y as f64)?;
                write!(f, ", ")?;
                write_float(f, v.z as f64)?;
                write!(f, ">")
            }
            Value::Range(r) => {
                write!(f, "[")?;
                write_float(f, r.min as f64)?;
                write!(f, ", ")?;
                write_float(f, r.max as f64)?;
                write!(f, "]")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_coercion() {
        let v = Value::Int(42);
        assert_eq!(v.as_int().unwrap(), 42);
        assert_eq!(v.as_dword().unwrap(), 42);
        assert_eq!(v.as_byte().unwrap(), 42);
        assert_eq!(v.as_double().unwrap(), 42.0);
        assert!(v.as_bool().unwrap());

        let v = Value::Float(2.5);
        assert_eq!(v.as_int().unwrap(), 2);
        assert!((v.as_double().unwrap() - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_coercion_range_checks() {
        assert!(Value::Int(-1).as_dword().is_err());
        assert!(Value::Int(300).as_byte().is_err());
        assert_eq!(Value::Int(255).as_byte().unwrap(), 255);
    }

    #[test]
    fn test_non_numeric_do_not_coerce() {
        let v = Value::String(Arc::from("hello"));
        assert!(v.as_int().is_err());
        assert!(v.as_bool().is_err());
        assert_eq!(v.as_str().unwrap(), "hello");

        let v = Value::Vector(Vec3::new(1.0, 2.0, 3.0));
        assert!(v.as_float().is_err());
    }

    #[test]
    fn test_literal_display() {
        assert_eq!(Value::Int(-7).to_string(), "-7");
        assert_eq!(Value::Float(1.0).to_string(), "1.0");
        assert_eq!(Value::Float(2.25).to_string(), "2.25");
        assert_eq!(Value::Bool(true).to_string(), "1");
        assert_eq!(
            Value::String(Arc::from("a \"b\"")).to_string(),
            "\"a \\\"b\\\"\""
        );
        assert_eq!(Value::Rect(Rect::new(0, 1, 2, 3)).to_string(), "(0, 1, 2, 3)");
        assert_eq!(Value::Point(Point::new(4, 5)).to_string(), "(4, 5)");
        assert_eq!(
            Value::Vector(Vec3::new(1.0, 2.5, -3.0)).to_string(),
            "<1.0, 2.5, -3.0>"
        );
        assert_eq!(Value::Range(Range::new(0.0, 10.0)).to_string(), "[0.0, 10.0]");
    }
}
