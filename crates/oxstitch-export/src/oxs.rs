//! OXS (Open Cross Stitch) serializer.
//!
//! Writes a chart as an XML document with a fixed element layout:
//!
//! ```text
//! <chart>
//!   <format />          static producer comment
//!   <properties />      format version, producer, grid size, palette size
//!   <palette>           one <palette_item> per palette color, 1-based index
//!   <fullstitches>      one <stitch> per mapped cell, row-major, 1-based x/y
//!   <backstitches />    always empty
//!   <partstitches />    always empty
//!   <commentboxes />    always empty
//! </chart>
//! ```
//!
//! Cells whose color is not in the palette are skipped. Sections with
//! no children are written self-closing. Output is a pure function of
//! the inputs, so repeated exports are byte-identical.

use std::collections::HashMap;
use std::io::{self, Write};

use oxstitch_pattern::{CodedColor, CodedImage};

/// Value of the `comments01` attribute on `<format>`.
pub const FORMAT_COMMENT: &str = "Exported from SAE";
/// Value of `oxs_version` on `<properties>`.
pub const OXS_VERSION: &str = "1.0";
/// Value of `software` on `<properties>`.
pub const SOFTWARE: &str = "SAE";
/// Value of `software_version` on `<properties>`.
pub const SOFTWARE_VERSION: &str = "1.0";
/// Strand count written on every palette item.
pub const STRANDS: &str = "2";

/// Sections for stitch kinds this exporter never produces. Readers
/// expect them to be present.
const EMPTY_SECTIONS: [&str; 3] = ["backstitches", "partstitches", "commentboxes"];

/// Serialize a chart into `sink`.
///
/// `ordered_colors` defines the palette: the color at position `i` gets
/// display index `i + 1`. If a color appears more than once, cells
/// resolve to its last index.
///
/// # Errors
///
/// Returns the first I/O error reported by `sink`; the document is
/// left incomplete.
pub fn write_oxs<W: Write + ?Sized>(
    sink: &mut W,
    image: &CodedImage,
    ordered_colors: &[CodedColor],
) -> io::Result<()> {
    let dimensions = image.dimensions();

    writeln!(sink, r#"<?xml version="1.0" encoding="utf-8"?>"#)?;
    writeln!(sink, "<chart>")?;
    writeln!(sink, r#"  <format comments01="{FORMAT_COMMENT}" />"#)?;
    writeln!(
        sink,
        r#"  <properties oxs_version="{OXS_VERSION}" software="{SOFTWARE}" software_version="{SOFTWARE_VERSION}" chartwidth="{}" chartheight="{}" palettecount="{}" />"#,
        dimensions.width,
        dimensions.height,
        ordered_colors.len(),
    )?;

    let palette_index = write_palette(sink, ordered_colors)?;
    let counts = write_full_stitches(sink, image, &palette_index)?;

    for section in EMPTY_SECTIONS {
        writeln!(sink, "  <{section} />")?;
    }
    write!(sink, "</chart>")?;

    tracing::debug!(
        width = dimensions.width,
        height = dimensions.height,
        palette = ordered_colors.len(),
        stitches = counts.written,
        skipped = counts.skipped,
        "wrote oxs chart"
    );
    Ok(())
}

/// Render a chart to a `String`.
///
/// Produces the same bytes as [`write_oxs`].
///
/// # Examples
///
/// ```
/// use oxstitch_pattern::{CodedColor, CodedImage, Dimensions};
/// use oxstitch_export::to_oxs;
///
/// let black = CodedColor::new(0, 0, 0, 'A').with_code("1");
/// let image = CodedImage::from_fn(Dimensions::new(1, 1), |_, _| black.clone());
/// let oxs = to_oxs(&image, &[black]);
/// assert!(oxs.contains(r#"<stitch x="1" y="1" palindex="1" />"#));
/// ```
#[must_use]
pub fn to_oxs(image: &CodedImage, ordered_colors: &[CodedColor]) -> String {
    let mut buf = Vec::new();
    let written = write_oxs(&mut buf, image, ordered_colors);
    debug_assert!(written.is_ok(), "write into Vec failed: {written:?}");
    String::from_utf8_lossy(&buf).into_owned()
}

/// Write `<palette>` and return each color's 1-based display index.
fn write_palette<'c, W: Write + ?Sized>(
    sink: &mut W,
    ordered_colors: &'c [CodedColor],
) -> io::Result<HashMap<&'c CodedColor, usize>> {
    let mut palette_index = HashMap::with_capacity(ordered_colors.len());

    if ordered_colors.is_empty() {
        writeln!(sink, "  <palette />")?;
        return Ok(palette_index);
    }

    writeln!(sink, "  <palette>")?;
    for (i, color) in ordered_colors.iter().enumerate() {
        let index = i + 1;
        palette_index.insert(color, index);

        let hex = color.rgb_hex();
        writeln!(
            sink,
            r#"    <palette_item index="{index}" number="{}" name="{}" color="{hex}" printcolor="{hex}" symbol="{}" strands="{STRANDS}" />"#,
            xml_escape(color.code.as_deref().unwrap_or_default()),
            xml_escape(color.name.as_deref().unwrap_or_default()),
            xml_escape(color.symbol.encode_utf8(&mut [0; 4])),
        )?;
    }
    writeln!(sink, "  </palette>")?;

    Ok(palette_index)
}

/// Number of cells written as stitches and skipped as unmapped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct StitchCounts {
    written: usize,
    skipped: usize,
}

/// Write `<fullstitches>`, one `<stitch>` per cell whose color has a
/// palette index, in row-major order.
fn write_full_stitches<W: Write + ?Sized>(
    sink: &mut W,
    image: &CodedImage,
    palette_index: &HashMap<&CodedColor, usize>,
) -> io::Result<StitchCounts> {
    // Resolve once per distinct image color rather than once per cell.
    let resolved: Vec<Option<usize>> = image
        .colors()
        .iter()
        .map(|color| palette_index.get(color).copied())
        .collect();

    let cells = image.color_indices();
    let written = cells.iter().filter(|&&c| resolved[c].is_some()).count();
    let counts = StitchCounts {
        written,
        skipped: cells.len() - written,
    };

    if written == 0 {
        writeln!(sink, "  <fullstitches />")?;
        return Ok(counts);
    }

    let width = image.dimensions().width as usize;
    writeln!(sink, "  <fullstitches>")?;
    for (offset, &cell) in cells.iter().enumerate() {
        let Some(palindex) = resolved[cell] else {
            continue;
        };
        writeln!(
            sink,
            r#"    <stitch x="{}" y="{}" palindex="{palindex}" />"#,
            offset % width + 1,
            offset / width + 1,
        )?;
    }
    writeln!(sink, "  </fullstitches>")?;

    Ok(counts)
}

/// Escape a string for use inside a double-quoted XML attribute value.
///
/// Handles `&` (must be first), `<`, `>`, `"`, and `'`. Tab, line feed
/// and carriage return become character references so readers do not
/// normalize them to spaces. Characters XML 1.0 does not allow at all
/// are replaced with U+FFFD.
fn xml_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' => out.push_str("&#x9;"),
            '\n' => out.push_str("&#xA;"),
            '\r' => out.push_str("&#xD;"),
            c if !is_xml_char(c) => out.push(char::REPLACEMENT_CHARACTER),
            other => out.push(other),
        }
    }
    out
}

/// The XML 1.0 `Char` production. Surrogates cannot occur in a `char`.
const fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{FFFD}' | '\u{10000}'..)
}
