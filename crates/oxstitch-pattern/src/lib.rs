//! oxstitch-pattern: Cross-stitch pattern model (sans-IO).
//!
//! A pattern is a [`CodedImage`] (a grid of [`CodedColor`] cells) plus
//! an ordered palette of thread colors. This crate builds patterns from
//! in-memory raster bytes and palette JSON; it performs no I/O of its
//! own. Serialization to chart formats lives in `oxstitch-export`.

pub mod decode;
pub mod palette;
pub mod types;

pub use decode::{TRANSPARENT, chart_palette, decode_coded_image};
pub use palette::{SYMBOLS, palette_to_json, parse_palette, symbol_for};
pub use types::{CodedColor, CodedImage, Dimensions, PatternError};
