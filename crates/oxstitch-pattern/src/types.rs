//! Shared types for cross-stitch patterns.

use std::collections::HashMap;
use std::fmt;
use std::ops::Index;

use serde::{Deserialize, Serialize};

/// Width and height of a pattern grid, in stitches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Dimensions {
    /// Number of columns.
    pub width: u32,
    /// Number of rows.
    pub height: u32,
}

impl Dimensions {
    /// Create new dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Total number of cells (`width * height`).
    #[must_use]
    pub const fn area(self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Returns `true` if either side is zero.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A thread color as it appears in a chart.
///
/// Equality and hashing cover every field, so two colors with the same
/// RGB value but different codes or symbols are distinct keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CodedColor {
    /// Manufacturer thread number (e.g. `"310"`), if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Human-readable thread name, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Glyph used for this color in printed charts.
    pub symbol: char,
}

impl CodedColor {
    /// Create a color with no code or name.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, symbol: char) -> Self {
        Self {
            code: None,
            name: None,
            r,
            g,
            b,
            symbol,
        }
    }

    /// Set the thread number.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Set the thread name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The `(r, g, b)` triple.
    #[must_use]
    pub const fn rgb(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Uppercase `RRGGBB` hex string, two digits per channel, no `#`.
    ///
    /// ```
    /// use oxstitch_pattern::CodedColor;
    ///
    /// assert_eq!(CodedColor::new(255, 0, 16, 'A').rgb_hex(), "FF0010");
    /// ```
    #[must_use]
    pub fn rgb_hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// An immutable grid of [`CodedColor`] cells.
///
/// Cells are stored as row-major indices into a table of the distinct
/// colors present in the grid, ordered by first appearance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodedImage {
    dimensions: Dimensions,
    colors: Vec<CodedColor>,
    cells: Vec<usize>,
}

impl CodedImage {
    /// Build an image by evaluating `f(x, y)` for every cell in
    /// row-major order.
    pub fn from_fn<F>(dimensions: Dimensions, mut f: F) -> Self
    where
        F: FnMut(u32, u32) -> CodedColor,
    {
        let mut builder = TableBuilder::with_capacity(dimensions.area());
        for y in 0..dimensions.height {
            for x in 0..dimensions.width {
                builder.push(f(x, y));
            }
        }
        builder.finish(dimensions)
    }

    /// Build an image from a row-major vector of cells.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::CellCountMismatch`] if `cells.len()` is
    /// not `width * height`.
    pub fn from_cells(dimensions: Dimensions, cells: Vec<CodedColor>) -> Result<Self, PatternError> {
        if cells.len() != dimensions.area() {
            return Err(PatternError::CellCountMismatch {
                expected: dimensions.area(),
                actual: cells.len(),
            });
        }
        let mut builder = TableBuilder::with_capacity(cells.len());
        for color in cells {
            builder.push(color);
        }
        Ok(builder.finish(dimensions))
    }

    /// Grid size.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// The color at `(x, y)`, or `None` when out of bounds.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Option<&CodedColor> {
        if x >= self.dimensions.width || y >= self.dimensions.height {
            return None;
        }
        let offset = y as usize * self.dimensions.width as usize + x as usize;
        self.cells.get(offset).and_then(|&i| self.colors.get(i))
    }

    /// Distinct colors in the grid, in row-major first-appearance order.
    #[must_use]
    pub fn colors(&self) -> &[CodedColor] {
        &self.colors
    }

    /// Row-major cell values as indices into [`colors`](Self::colors).
    #[must_use]
    pub fn color_indices(&self) -> &[usize] {
        &self.cells
    }

    /// Iterate rows top to bottom; each row yields its cells left to right.
    pub fn rows(&self) -> impl Iterator<Item = impl Iterator<Item = &CodedColor> + '_> + '_ {
        let width = self.dimensions.width;
        (0..self.dimensions.height).map(move |y| (0..width).map(move |x| &self[(x, y)]))
    }
}

impl Index<(u32, u32)> for CodedImage {
    type Output = CodedColor;

    /// # Panics
    ///
    /// Panics if `(x, y)` lies outside the grid.
    fn index(&self, (x, y): (u32, u32)) -> &CodedColor {
        assert!(
            x < self.dimensions.width && y < self.dimensions.height,
            "cell ({x}, {y}) out of bounds for {} image",
            self.dimensions,
        );
        &self.colors[self.cells[y as usize * self.dimensions.width as usize + x as usize]]
    }
}

/// Interns cell colors into a distinct-color table.
struct TableBuilder {
    lookup: HashMap<CodedColor, usize>,
    colors: Vec<CodedColor>,
    cells: Vec<usize>,
}

impl TableBuilder {
    fn with_capacity(cells: usize) -> Self {
        Self {
            lookup: HashMap::new(),
            colors: Vec::new(),
            cells: Vec::with_capacity(cells),
        }
    }

    fn push(&mut self, color: CodedColor) {
        let index = if let Some(&index) = self.lookup.get(&color) {
            index
        } else {
            let index = self.colors.len();
            self.lookup.insert(color.clone(), index);
            self.colors.push(color);
            index
        };
        self.cells.push(index);
    }

    fn finish(self, dimensions: Dimensions) -> CodedImage {
        CodedImage {
            dimensions,
            colors: self.colors,
            cells: self.cells,
        }
    }
}

/// Errors from building a pattern.
#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// A cell vector did not match the grid size.
    #[error("expected {expected} cells, got {actual}")]
    CellCountMismatch {
        /// `width * height`.
        expected: usize,
        /// Length of the supplied vector.
        actual: usize,
    },

    /// The image holds more unmatched colors than there are symbols.
    #[error("image has {count} unmatched colors but only {max} symbols are available")]
    TooManyColors {
        /// Distinct unmatched colors seen so far.
        count: usize,
        /// Size of the symbol alphabet.
        max: usize,
    },

    /// A palette document could not be parsed or serialized.
    #[error("invalid palette JSON: {0}")]
    PaletteJson(#[from] serde_json::Error),
}
