//! Raster decoding into a [`CodedImage`].
//!
//! Accepts raw image bytes (PNG, JPEG, BMP, WebP) and maps every pixel
//! to a [`CodedColor`]. Fully transparent pixels become [`TRANSPARENT`]
//! cells, which are never stitched; any other alpha value is ignored.

use std::collections::HashMap;

use crate::palette::{SYMBOLS, symbol_for};
use crate::types::{CodedColor, CodedImage, Dimensions, PatternError};

/// Glyph given to unmatched colors once [`SYMBOLS`] is exhausted.
const OVERFLOW_SYMBOL: char = '?';

/// Cell color for fully transparent pixels.
///
/// Palette matching never produces it and [`chart_palette`] leaves it
/// out, so these cells are skipped by the exporter.
pub const TRANSPARENT: CodedColor = CodedColor::new(0, 0, 0, ' ');

/// Decode raw image bytes into a coded image.
///
/// A pixel with alpha 0 becomes [`TRANSPARENT`]. Otherwise a pixel
/// whose RGB value equals that of a `palette` entry becomes
/// that entry (the first one, if several share the value). Any other
/// pixel becomes a generated color with no code or name, symbols
/// drawn from [`SYMBOLS`] in order of first appearance.
///
/// With a non-empty palette the generated colors are not part of the
/// chart palette, so running out of symbols is not an error: the
/// remaining ones share [`OVERFLOW_SYMBOL`].
///
/// # Errors
///
/// Returns [`PatternError::EmptyInput`] if `bytes` is empty.
/// Returns [`PatternError::ImageDecode`] if the image format is
/// unrecognized or the data is corrupt.
/// Returns [`PatternError::TooManyColors`] if `palette` is empty and the
/// image has more distinct colors than [`SYMBOLS`].
pub fn decode_coded_image(
    bytes: &[u8],
    palette: &[CodedColor],
) -> Result<CodedImage, PatternError> {
    if bytes.is_empty() {
        return Err(PatternError::EmptyInput);
    }

    let rgba = image::load_from_memory(bytes)?.to_rgba8();
    let dimensions = Dimensions::new(rgba.width(), rgba.height());

    let mut known: HashMap<[u8; 3], &CodedColor> = HashMap::with_capacity(palette.len());
    for color in palette {
        known.entry(color.rgb()).or_insert(color);
    }

    let mut generated: HashMap<[u8; 3], CodedColor> = HashMap::new();
    let mut cells = Vec::with_capacity(dimensions.area());

    for pixel in rgba.pixels() {
        let [r, g, b, a] = pixel.0;
        if a == 0 {
            cells.push(TRANSPARENT);
            continue;
        }
        let key = [r, g, b];
        if let Some(color) = known.get(&key) {
            cells.push((*color).clone());
            continue;
        }
        if let Some(color) = generated.get(&key) {
            cells.push(color.clone());
            continue;
        }

        let symbol = match symbol_for(generated.len()) {
            Some(symbol) => symbol,
            None if palette.is_empty() => {
                return Err(PatternError::TooManyColors {
                    count: generated.len() + 1,
                    max: SYMBOLS.chars().count(),
                });
            }
            None => OVERFLOW_SYMBOL,
        };
        let color = CodedColor::new(key[0], key[1], key[2], symbol);
        generated.insert(key, color.clone());
        cells.push(color);
    }

    CodedImage::from_cells(dimensions, cells)
}

/// Distinct stitched colors of `image` in first-appearance order: the
/// palette to use when none is supplied.
#[must_use]
pub fn chart_palette(image: &CodedImage) -> Vec<CodedColor> {
    image
        .colors()
        .iter()
        .filter(|&color| *color != TRANSPARENT)
        .cloned()
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::cast_possible_truncation)]
mod tests {
    use super::*;

    /// Helper: encode an RGB image as PNG bytes.
    fn encode_png(width: u32, height: u32, f: impl Fn(u32, u32) -> [u8; 3]) -> Vec<u8> {
        let img = image::RgbImage::from_fn(width, height, |x, y| image::Rgb(f(x, y)));
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgb8,
        )
        .ok();
        buf
    }

    #[test]
    fn empty_input_returns_error() {
        let result = decode_coded_image(&[], &[]);
        assert!(matches!(result, Err(PatternError::EmptyInput)));
    }

    #[test]
    fn corrupt_bytes_returns_image_decode_error() {
        let result = decode_coded_image(&[0xFF, 0xFE, 0x00, 0x01], &[]);
        assert!(matches!(result, Err(PatternError::ImageDecode(_))));
    }

    #[test]
    fn output_dimensions_match_input() {
        let png = encode_png(17, 31, |_, _| [128, 64, 32]);
        let image = decode_coded_image(&png, &[]).unwrap();
        assert_eq!(image.dimensions(), Dimensions::new(17, 31));
    }

    #[test]
    fn generated_symbols_follow_first_appearance() {
        let png = encode_png(3, 1, |x, _| match x {
            0 => [10, 10, 10],
            1 => [200, 0, 0],
            _ => [10, 10, 10],
        });
        let image = decode_coded_image(&png, &[]).unwrap();
        assert_eq!(
            image.colors(),
            &[
                CodedColor::new(10, 10, 10, symbol_for(0).unwrap()),
                CodedColor::new(200, 0, 0, symbol_for(1).unwrap()),
            ]
        );
        assert_eq!(image.color_indices(), &[0, 1, 0]);
    }

    #[test]
    fn palette_entries_replace_matching_pixels() {
        let black = CodedColor::new(0, 0, 0, 'B').with_code("310").with_name("Black");
        let png = encode_png(2, 1, |x, _| if x == 0 { [0, 0, 0] } else { [9, 9, 9] });
        let image = decode_coded_image(&png, std::slice::from_ref(&black)).unwrap();
        assert_eq!(image[(0, 0)], black);
        assert_eq!(image[(1, 0)], CodedColor::new(9, 9, 9, symbol_for(0).unwrap()));
    }

    #[test]
    fn first_palette_entry_wins_on_shared_rgb() {
        let first = CodedColor::new(5, 5, 5, 'a');
        let second = CodedColor::new(5, 5, 5, 'b');
        let png = encode_png(1, 1, |_, _| [5, 5, 5]);
        let image = decode_coded_image(&png, &[first.clone(), second]).unwrap();
        assert_eq!(image[(0, 0)], first);
    }

    /// Helper: encode an RGBA image as PNG bytes.
    fn encode_rgba_png(width: u32, height: u32, f: impl Fn(u32, u32) -> [u8; 4]) -> Vec<u8> {
        let img = image::RgbaImage::from_fn(width, height, |x, y| image::Rgba(f(x, y)));
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgba8,
        )
        .ok();
        buf
    }

    #[test]
    fn transparent_pixels_become_transparent_cells() {
        let png = encode_rgba_png(3, 1, |x, _| match x {
            0 => [0, 0, 0, 0],
            1 => [200, 0, 0, 255],
            _ => [40, 40, 40, 0],
        });
        let image = decode_coded_image(&png, &[]).unwrap();
        assert_eq!(image[(0, 0)], TRANSPARENT);
        assert_eq!(image[(2, 0)], TRANSPARENT);
        // Transparent cells do not consume a symbol.
        assert_eq!(image[(1, 0)], CodedColor::new(200, 0, 0, symbol_for(0).unwrap()));
        assert_eq!(chart_palette(&image), vec![image[(1, 0)].clone()]);
    }

    #[test]
    fn transparent_black_is_not_matched_by_palette() {
        let black = CodedColor::new(0, 0, 0, 'B');
        let png = encode_rgba_png(2, 1, |x, _| if x == 0 { [0, 0, 0, 0] } else { [0, 0, 0, 255] });
        let image = decode_coded_image(&png, std::slice::from_ref(&black)).unwrap();
        assert_eq!(image[(0, 0)], TRANSPARENT);
        assert_eq!(image[(1, 0)], black);
    }

    #[test]
    fn partial_alpha_is_stitched() {
        let png = encode_rgba_png(1, 1, |_, _| [9, 8, 7, 1]);
        let image = decode_coded_image(&png, &[]).unwrap();
        assert_eq!(image[(0, 0)].rgb(), [9, 8, 7]);
    }

    #[test]
    fn chart_palette_keeps_first_appearance_order() {
        let png = encode_png(3, 1, |x, _| [0, 0, 200 - x as u8]);
        let image = decode_coded_image(&png, &[]).unwrap();
        assert_eq!(chart_palette(&image), image.colors());
    }

    #[test]
    fn too_many_colors_without_palette() {
        let max = SYMBOLS.chars().count() as u32;
        let png = encode_png(max + 1, 1, |x, _| [x as u8, 0, 0]);
        let result = decode_coded_image(&png, &[]);
        assert!(matches!(
            result,
            Err(PatternError::TooManyColors { count, max: m }) if count == m + 1
        ));
    }

    #[test]
    fn symbol_overflow_is_tolerated_with_palette() {
        let max = SYMBOLS.chars().count() as u32;
        let palette = [CodedColor::new(255, 255, 255, 'W')];
        let png = encode_png(max + 2, 1, |x, _| [x as u8, 0, 0]);
        let image = decode_coded_image(&png, &palette).unwrap();
        assert_eq!(image[(max, 0)].symbol, OVERFLOW_SYMBOL);
        assert_eq!(image[(max + 1, 0)].symbol, OVERFLOW_SYMBOL);
    }
}
