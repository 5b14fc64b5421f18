//! Typed algorithm property values.
//!
//! Property values travel as strings on the wire. `ValueType` is the closed
//! set of types an algorithm may declare, and `PropertyValue` is a parsed
//! value of one of those types. Editors render values through
//! [`PropertyRenderer`] rather than inspecting raw strings.

use serde::{Deserialize, Serialize};

use crate::{PipeforgeError, Result};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash, strum::AsRefStr, strum::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueType {
    Boolean,
    Double,
    Float,
    Int,
    Long,
    #[default]
    String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Text(String),
    Integer(i64),
    Decimal(f64),
    Flag(bool),
}

/// Receives a property value according to its declared type.
pub trait PropertyRenderer {
    type Output;

    fn text(
        &mut self,
        name: &str,
        value: &str,
    ) -> Self::Output;

    /// `value` is `None` when the raw string is not a valid integer.
    fn integer(
        &mut self,
        name: &str,
        value: Option<i64>,
    ) -> Self::Output;

    /// `value` is `None` when the raw string is not a valid number.
    fn decimal(
        &mut self,
        name: &str,
        value: Option<f64>,
    ) -> Self::Output;

    fn flag(
        &mut self,
        name: &str,
        value: bool,
    ) -> Self::Output;
}

/// Anything other than `true` (ignoring case) is false.
fn parse_flag(raw: &str) -> bool {
    raw.trim().eq_ignore_ascii_case("true")
}

impl ValueType {
    /// Dispatches `raw` to the renderer method matching this type.
    pub fn render<R: PropertyRenderer>(
        &self,
        name: &str,
        raw: &str,
        renderer: &mut R,
    ) -> R::Output {
        match self {
            ValueType::String => renderer.text(name, raw),
            ValueType::Int | ValueType::Long => renderer.integer(name, PropertyValue::parse(*self, raw).ok().and_then(|v| v.as_integer())),
            ValueType::Double | ValueType::Float => renderer.decimal(name, PropertyValue::parse(*self, raw).ok().and_then(|v| v.as_decimal())),
            ValueType::Boolean => renderer.flag(name, parse_flag(raw)),
        }
    }
}

impl PropertyValue {
    /// Parses `raw` as a value of `value_type`.
    ///
    /// Numbers must fit the declared width; booleans never fail. Integers allow
    /// no surrounding whitespace, decimals do.
    pub fn parse(
        value_type: ValueType,
        raw: &str,
    ) -> Result<Self> {
        let trimmed = raw.trim();
        let invalid = || PipeforgeError::Validation(format!("\"{}\" is not a valid \"{}\"", raw, value_type));
        let value = match value_type {
            ValueType::String => PropertyValue::Text(raw.to_string()),
            ValueType::Boolean => PropertyValue::Flag(parse_flag(raw)),
            ValueType::Int => PropertyValue::Integer(raw.parse::<i32>().map_err(|_| invalid())? as i64),
            ValueType::Long => PropertyValue::Integer(raw.parse::<i64>().map_err(|_| invalid())?),
            ValueType::Float => PropertyValue::Decimal(trimmed.parse::<f32>().map_err(|_| invalid())? as f64),
            ValueType::Double => PropertyValue::Decimal(trimmed.parse::<f64>().map_err(|_| invalid())?),
        };
        Ok(value)
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            PropertyValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<f64> {
        match self {
            PropertyValue::Decimal(v) => Some(*v),
            PropertyValue::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }
}
