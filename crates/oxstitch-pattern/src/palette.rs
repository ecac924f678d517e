//! Palette files and chart symbols.
//!
//! A palette file is a JSON array of [`CodedColor`] objects:
//!
//! ```json
//! [
//!   { "code": "310", "name": "Black", "r": 0, "g": 0, "b": 0, "symbol": "X" },
//!   { "r": 255, "g": 255, "b": 255, "symbol": "." }
//! ]
//! ```
//!
//! `code` and `name` may be omitted. Array order is palette order.

use crate::types::{CodedColor, PatternError};

/// Glyphs assigned to colors that carry no symbol of their own.
///
/// Visually ambiguous characters (`0`, `1`, `O`, `l`) and the XML
/// special characters are left out.
pub const SYMBOLS: &str =
    "X#@%*+=/\\~^$!:;ABCDEFGHIJKLMNPQRSTUVWYZabcdefghijkmnpqrstuvwxyz23456789";

/// The `index`-th glyph of [`SYMBOLS`], or `None` past the end.
#[must_use]
pub fn symbol_for(index: usize) -> Option<char> {
    SYMBOLS.chars().nth(index)
}

/// Parse a palette from JSON.
///
/// # Errors
///
/// Returns [`PatternError::PaletteJson`] if `json` is not an array of
/// color objects.
pub fn parse_palette(json: &str) -> Result<Vec<CodedColor>, PatternError> {
    Ok(serde_json::from_str(json)?)
}

/// Serialize a palette to pretty-printed JSON.
///
/// # Errors
///
/// Returns [`PatternError::PaletteJson`] if serialization fails.
pub fn palette_to_json(colors: &[CodedColor]) -> Result<String, PatternError> {
    Ok(serde_json::to_string_pretty(colors)?)
}
