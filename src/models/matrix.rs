use std::fmt;

use super::BitArray;
use crate::error::{Error, Result};

/// Compact 2D bit matrix, `true` = black
///
/// Rows are packed into `u32` words and every row starts on a fresh word,
/// so `row_size == ceil(width / 32)` and a whole row can be copied word by
/// word. Coordinates are not range checked in release builds; callers keep
/// them inside `width() x height()`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BitMatrix {
    width: usize,
    height: usize,
    row_size: usize,
    bits: Vec<u32>,
}

impl BitMatrix {
    /// Create a new bit matrix with given dimensions, all bits unset
    ///
    /// # Panics
    /// Panics if either dimension is zero.
    pub fn new(width: usize, height: usize) -> Self {
        assert!(width > 0 && height > 0, "dimensions must be greater than 0");
        let row_size = width.div_ceil(32);
        Self {
            width,
            height,
            row_size,
            bits: vec![0; row_size * height],
        }
    }

    /// Create a square matrix
    pub fn square(dimension: usize) -> Self {
        Self::new(dimension, dimension)
    }

    /// Parse a textual rendering such as the one produced by `Display`
    ///
    /// Every row must end with a newline and contain the same number of
    /// `set` / `unset` tokens. Returns `None` on malformed input.
    pub fn parse(text: &str, set: &str, unset: &str) -> Option<Self> {
        if set.is_empty() || unset.is_empty() {
            return None;
        }
        let mut rows: Vec<Vec<bool>> = Vec::new();
        for line in text.lines() {
            let mut rest = line;
            let mut row = Vec::new();
            while !rest.is_empty() {
                if let Some(tail) = rest.strip_prefix(set) {
                    row.push(true);
                    rest = tail;
                } else if let Some(tail) = rest.strip_prefix(unset) {
                    row.push(false);
                    rest = tail;
                } else {
                    return None;
                }
            }
            if !row.is_empty() {
                rows.push(row);
            }
        }

        let width = rows.first()?.len();
        if rows.iter().any(|r| r.len() != width) {
            return None;
        }
        let mut matrix = Self::new(width, rows.len());
        for (y, row) in rows.iter().enumerate() {
            for (x, &bit) in row.iter().enumerate() {
                if bit {
                    matrix.set(x, y, true);
                }
            }
        }
        Some(matrix)
    }

    /// Get matrix width
    pub fn width(&self) -> usize {
        self.width
    }

    /// Get matrix height
    pub fn height(&self) -> usize {
        self.height
    }

    /// Words per row
    pub fn row_size(&self) -> usize {
        self.row_size
    }

    /// Side length of a square matrix
    pub fn dimension(&self) -> Result<usize> {
        if self.width != self.height {
            return Err(Error::NotSquare {
                width: self.width,
                height: self.height,
            });
        }
        Ok(self.width)
    }

    #[inline]
    fn offset(&self, x: usize, y: usize) -> usize {
        debug_assert!(
            x < self.width && y < self.height,
            "({x}, {y}) outside {}x{}",
            self.width,
            self.height
        );
        y * self.row_size + x / 32
    }

    /// Get bit at (x, y)
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> bool {
        (self.bits[self.offset(x, y)] >> (x & 31)) & 1 != 0
    }

    /// Set bit at (x, y)
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: bool) {
        let offset = self.offset(x, y);
        if value {
            self.bits[offset] |= 1 << (x & 31);
        } else {
            self.bits[offset] &= !(1 << (x & 31));
        }
    }

    /// Toggle bit at (x, y)
    #[inline]
    pub fn flip(&mut self, x: usize, y: usize) {
        let offset = self.offset(x, y);
        self.bits[offset] ^= 1 << (x & 31);
    }

    /// Clear all bits to 0
    pub fn clear(&mut self) {
        self.bits.fill(0);
    }

    /// Set every bit in the rectangle `left..left+width, top..top+height`
    ///
    /// # Panics
    /// Panics if the rectangle is empty or leaves the matrix.
    pub fn set_region(&mut self, left: usize, top: usize, width: usize, height: usize) {
        assert!(width > 0 && height > 0, "region must be at least 1x1");
        let right = left + width;
        let bottom = top + height;
        assert!(
            right <= self.width && bottom <= self.height,
            "region must fit inside the matrix"
        );
        for y in top..bottom {
            let row_offset = y * self.row_size;
            for x in left..right {
                self.bits[row_offset + x / 32] |= 1 << (x & 31);
            }
        }
    }

    /// Exclusive-or every bit with `mask`, which must have identical dimensions
    pub fn xor(&mut self, mask: &BitMatrix) -> Result<()> {
        if self.width != mask.width || self.height != mask.height || self.row_size != mask.row_size
        {
            return Err(Error::DimensionMismatch {
                expected_width: self.width,
                expected_height: self.height,
                width: mask.width,
                height: mask.height,
            });
        }
        for (word, mask_word) in self.bits.iter_mut().zip(&mask.bits) {
            *word ^= mask_word;
        }
        Ok(())
    }

    /// Copy row `y` into `row`, replacing it if it is narrower than the matrix
    ///
    /// Always use the returned array; the argument is only a buffer to reuse.
    pub fn row(&self, y: usize, row: BitArray) -> BitArray {
        let mut row = if row.size() < self.width {
            BitArray::new(self.width)
        } else {
            let mut row = row;
            row.clear();
            row
        };
        let offset = y * self.row_size;
        for (x, &word) in self.bits[offset..offset + self.row_size].iter().enumerate() {
            row.set_bulk(x * 32, word);
        }
        row
    }

    /// Overwrite row `y` with the leading words of `row`
    pub fn set_row(&mut self, y: usize, row: &BitArray) {
        let offset = y * self.row_size;
        let words = &row.words()[..self.row_size];
        self.bits[offset..offset + self.row_size].copy_from_slice(words);
    }

    /// Rotate by 180 degrees in place
    pub fn rotate180(&mut self) {
        let mut top = BitArray::new(self.width);
        let mut bottom = BitArray::new(self.width);
        for i in 0..self.height.div_ceil(2) {
            let mirror = self.height - 1 - i;
            top = self.row(i, top);
            bottom = self.row(mirror, bottom);
            top.reverse();
            bottom.reverse();
            self.set_row(i, &bottom);
            self.set_row(mirror, &top);
        }
    }

    /// Rotate 90 degrees counter-clockwise in place
    pub fn rotate90(&mut self) {
        let new_width = self.height;
        let new_height = self.width;
        let mut rotated = BitMatrix::new(new_width, new_height);
        for y in 0..self.height {
            for x in 0..self.width {
                if self.get(x, y) {
                    rotated.set(y, new_height - 1 - x, true);
                }
            }
        }
        *self = rotated;
    }

    /// Bounding box of all set bits as `[left, top, width, height]`
    pub fn enclosing_rectangle(&self) -> Option<[usize; 4]> {
        let mut left = self.width;
        let mut top = self.height;
        let mut right = 0;
        let mut bottom = 0;
        let mut found = false;

        for y in 0..self.height {
            for x32 in 0..self.row_size {
                let word = self.bits[y * self.row_size + x32];
                if word == 0 {
                    continue;
                }
                found = true;
                top = top.min(y);
                bottom = bottom.max(y);
                let first = x32 * 32 + word.trailing_zeros() as usize;
                let last = x32 * 32 + 31 - word.leading_zeros() as usize;
                left = left.min(first);
                right = right.max(last);
            }
        }

        found.then(|| [left, top, right - left + 1, bottom - top + 1])
    }

    /// Coordinates of the first set bit in row-major order
    pub fn top_left_on_bit(&self) -> Option<(usize, usize)> {
        let index = self.bits.iter().position(|&w| w != 0)?;
        let y = index / self.row_size;
        let x = (index % self.row_size) * 32 + self.bits[index].trailing_zeros() as usize;
        Some((x, y))
    }

    /// Coordinates of the last set bit in row-major order
    pub fn bottom_right_on_bit(&self) -> Option<(usize, usize)> {
        let index = self.bits.iter().rposition(|&w| w != 0)?;
        let y = index / self.row_size;
        let x = (index % self.row_size) * 32 + 31 - self.bits[index].leading_zeros() as usize;
        Some((x, y))
    }
}

impl fmt::Display for BitMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height {
            for x in 0..self.width {
                f.write_str(if self.get(x, y) { "X " } else { "  " })?;
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}
