/// Braille Unicode canvas for high-resolution terminal graphics.
/// Each character cell represents a 2x4 pixel grid (8 dots).
/// Unicode Braille patterns: U+2800 to U+28FF
///
/// Every cell also carries a tint, the palette slot of the last pixel
/// written through [`BrailleCanvas::set_pixel_tinted`]. A terminal cell has a
/// single foreground color, so the last writer wins.
pub struct BrailleCanvas {
    width: usize,  // Characters
    height: usize, // Characters
    /// Row-major dot patterns, one byte per cell
    dots: Vec<u8>,
    tints: Vec<u8>,
}

/// Dot bit for each (x % 2, y % 4) position inside a cell
const DOT_BITS: [[u8; 4]; 2] = [[0x01, 0x02, 0x04, 0x40], [0x08, 0x10, 0x20, 0x80]];

impl BrailleCanvas {
    /// Create a canvas of `width` x `height` characters,
    /// i.e. `width * 2` x `height * 4` pixels.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            dots: vec![0; width * height],
            tints: vec![0; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Cell index and dot bit for a pixel, `None` when off the canvas
    #[inline(always)]
    fn locate(&self, x: usize, y: usize) -> Option<(usize, u8)> {
        let (col, row) = (x / 2, y / 4);
        if col >= self.width || row >= self.height {
            return None;
        }
        Some((row * self.width + col, DOT_BITS[x % 2][y % 4]))
    }

    #[inline(always)]
    fn cell(&self, col: usize, row: usize) -> Option<usize> {
        (col < self.width && row < self.height).then_some(row * self.width + col)
    }

    /// Turn on one pixel. Out-of-range pixels are ignored.
    pub fn set_pixel(&mut self, x: usize, y: usize) {
        if let Some((i, bit)) = self.locate(x, y) {
            self.dots[i] |= bit;
        }
    }

    /// Turn on one pixel and tint its cell
    pub fn set_pixel_tinted(&mut self, x: usize, y: usize, tint: u8) {
        if let Some((i, bit)) = self.locate(x, y) {
            self.dots[i] |= bit;
            self.tints[i] = tint;
        }
    }

    /// Signed variant for line drawing; negative coordinates are dropped
    pub fn set_pixel_signed(&mut self, x: i32, y: i32) {
        if let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y)) {
            self.set_pixel(x, y);
        }
    }

    /// Dot pattern of a character cell (0 when out of range)
    pub fn cell_bits(&self, col: usize, row: usize) -> u8 {
        self.cell(col, row).map_or(0, |i| self.dots[i])
    }

    /// Palette slot of a character cell
    pub fn tint(&self, col: usize, row: usize) -> u8 {
        self.cell(col, row).map_or(0, |i| self.tints[i])
    }

    #[cfg(test)]
    pub fn to_string(&self) -> String {
        self.dots
            .chunks(self.width.max(1))
            .map(|row| row.iter().map(|&b| glyph(b)).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Braille character for a dot pattern (U+2800 block)
#[inline(always)]
pub fn glyph(bits: u8) -> char {
    char::from_u32(0x2800 + bits as u32).unwrap_or(' ')
}
