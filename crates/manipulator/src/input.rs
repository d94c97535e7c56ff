//! Typed-value grammar for exact numeric entry during a drag.
//!
//! - distance: number with optional `km`, `m`, `cm`, `mm` suffix (meters by default)
//! - plane: two distances separated by a comma and/or whitespace
//! - angle: number with optional `deg`, `°` or `rad` suffix (degrees by default)
//! - scale: number with optional trailing `%`

use manip_math::radians;

use crate::error::InputError;
use crate::handle::OperationKind;

const DISTANCE_UNITS: [(&str, f64); 4] = [("km", 1000.0), ("cm", 0.01), ("mm", 0.001), ("m", 1.0)];

/// Grammar used for a drag's typed input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputChannel {
    Distance,
    Plane,
    Angle,
    Scale,
}

impl InputChannel {
    pub fn for_operation(kind: OperationKind) -> Self {
        match kind {
            OperationKind::AxisTranslate(_) => InputChannel::Distance,
            OperationKind::PlaneTranslate(_) => InputChannel::Plane,
            OperationKind::AxisRotate(_) | OperationKind::ViewRotate => InputChannel::Angle,
            OperationKind::AxisScale(_) | OperationKind::UniformScale => InputChannel::Scale,
        }
    }
}

/// A parsed exact value, in SI units and radians.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TypedValue {
    Distance(f64),
    Plane(f64, f64),
    Angle(f64),
    Scale(f64),
}

/// Parse `text` with the grammar of `channel`.
pub fn parse(channel: InputChannel, text: &str) -> Result<TypedValue, InputError> {
    match channel {
        InputChannel::Distance => parse_distance(text).map(TypedValue::Distance),
        InputChannel::Plane => parse_plane(text).map(|(a, b)| TypedValue::Plane(a, b)),
        InputChannel::Angle => parse_angle(text).map(TypedValue::Angle),
        InputChannel::Scale => parse_scale(text).map(TypedValue::Scale),
    }
}

fn parse_number(token: &str) -> Result<f64, InputError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(InputError::Empty);
    }
    match token.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(InputError::InvalidNumber(token.to_string())),
    }
}

/// Distance in meters.
pub fn parse_distance(text: &str) -> Result<f64, InputError> {
    let token: String = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();
    if token.is_empty() {
        return Err(InputError::Empty);
    }

    let (number, factor) = DISTANCE_UNITS
        .iter()
        .find_map(|(suffix, factor)| token.strip_suffix(suffix).map(|n| (n, *factor)))
        .unwrap_or((token.as_str(), 1.0));

    if number.is_empty() {
        return Err(InputError::InvalidNumber(token.clone()));
    }
    Ok(parse_number(number)? * factor)
}

/// Two in-plane distances in meters.
pub fn parse_plane(text: &str) -> Result<(f64, f64), InputError> {
    let mut tokens: Vec<String> = Vec::new();
    for piece in text.split(|c: char| c == ',' || c.is_whitespace()).filter(|p| !p.is_empty()) {
        let is_unit = DISTANCE_UNITS.iter().any(|(suffix, _)| piece.eq_ignore_ascii_case(suffix));
        match tokens.last_mut() {
            // "1 m, 2 m": a bare unit belongs to the preceding number
            Some(last) if is_unit => last.push_str(piece),
            _ => tokens.push(piece.to_string()),
        }
    }

    match tokens.as_slice() {
        [] => Err(InputError::Empty),
        [a, b] => Ok((parse_distance(a)?, parse_distance(b)?)),
        other => Err(InputError::WrongTokenCount { expected: 2, found: other.len() }),
    }
}

/// Angle in radians.
pub fn parse_angle(text: &str) -> Result<f64, InputError> {
    let token = text.trim().to_lowercase();
    if token.is_empty() {
        return Err(InputError::Empty);
    }

    if let Some(number) = token.strip_suffix("rad") {
        return parse_number(number);
    }
    let number = token
        .strip_suffix("deg")
        .or_else(|| token.strip_suffix('°'))
        .unwrap_or(token.as_str());
    Ok(radians(parse_number(number)?))
}

/// Scale factor; `150%` is 1.5.
pub fn parse_scale(text: &str) -> Result<f64, InputError> {
    let token = text.trim();
    if token.is_empty() {
        return Err(InputError::Empty);
    }
    match token.strip_suffix('%') {
        Some(number) => Ok(parse_number(number)? * 0.01),
        None => parse_number(token),
    }
}

/// Text typed during a drag.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypedBuffer {
    text: String,
}

impl TypedBuffer {
    pub fn push(&mut self, c: char) {
        self.text.push(c);
    }

    /// Remove the last character; returns false if the buffer was empty.
    pub fn backspace(&mut self) -> bool {
        self.text.pop().is_some()
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}
