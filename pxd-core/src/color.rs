//! Color literal parsing and canonical formatting.
//!
//! Accepts named colors (`red`, `blue`, `transparent`) and `#rgb` /
//! `#rrggbb` / `#rrggbbaa` hex literals, case-insensitively. [`format`]
//! always emits the canonical lowercase `#rrggbbaa` form.

use crate::error::CoreError;

/// An 8-bit-per-channel RGBA color, stored exactly (no premultiplied alpha,
/// no gamma correction).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color { r, g, b, a }
    }

    pub const TRANSPARENT: Color = Color::new(0, 0, 0, 0);
    pub const RED: Color = Color::new(255, 0, 0, 255);
    pub const BLUE: Color = Color::new(0, 0, 255, 255);
}

/// Parses a color literal, stripping leading/trailing whitespace first.
pub fn parse(input: &str) -> Result<Color, CoreError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(CoreError::InvalidColor("color is required".to_string()));
    }

    let lower = trimmed.to_ascii_lowercase();
    match lower.as_str() {
        "red" => return Ok(Color::RED),
        "blue" => return Ok(Color::BLUE),
        "transparent" => return Ok(Color::TRANSPARENT),
        _ => {}
    }

    let Some(hex) = lower.strip_prefix('#') else {
        return Err(CoreError::InvalidColor(
            "expected hex color or named color".to_string(),
        ));
    };

    match hex.len() {
        3 => {
            let r = hex_nibble(hex, 0)?;
            let g = hex_nibble(hex, 1)?;
            let b = hex_nibble(hex, 2)?;
            Ok(Color::new(r * 17, g * 17, b * 17, 255))
        }
        6 => {
            let r = hex_byte(hex, 0)?;
            let g = hex_byte(hex, 2)?;
            let b = hex_byte(hex, 4)?;
            Ok(Color::new(r, g, b, 255))
        }
        8 => {
            let r = hex_byte(hex, 0)?;
            let g = hex_byte(hex, 2)?;
            let b = hex_byte(hex, 4)?;
            let a = hex_byte(hex, 6)?;
            Ok(Color::new(r, g, b, a))
        }
        other => Err(CoreError::InvalidColor(format!(
            "invalid hex length {other}"
        ))),
    }
}

/// Formats a color in the canonical lowercase `#rrggbbaa` form.
pub fn format(color: Color) -> String {
    format!("#{:02x}{:02x}{:02x}{:02x}", color.r, color.g, color.b, color.a)
}

fn hex_digit(byte: u8) -> Result<u8, CoreError> {
    match byte {
        b'0'..=b'9' => Ok(byte - b'0'),
        b'a'..=b'f' => Ok(byte - b'a' + 10),
        _ => Err(invalid_hex()),
    }
}

fn hex_nibble(hex: &str, index: usize) -> Result<u8, CoreError> {
    let byte = hex.as_bytes().get(index).copied().ok_or_else(invalid_hex)?;
    hex_digit(byte)
}

fn hex_byte(hex: &str, index: usize) -> Result<u8, CoreError> {
    let bytes = hex.as_bytes();
    let hi = bytes.get(index).copied().ok_or_else(invalid_hex)?;
    let lo = bytes.get(index + 1).copied().ok_or_else(invalid_hex)?;
    Ok((hex_digit(hi)? << 4) | hex_digit(lo)?)
}

fn invalid_hex() -> CoreError {
    CoreError::InvalidColor("invalid hex color".to_string())
}
