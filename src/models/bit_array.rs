use std::fmt;

use crate::error::{Error, Result};

/// Packed 1D array of bits, used for single binarized rows
///
/// Bits are stored little-endian within `u32` words: bit `i` lives in word
/// `i / 32` at position `i % 32`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BitArray {
    size: usize,
    bits: Vec<u32>,
}

impl BitArray {
    /// Create an array of `size` unset bits
    pub fn new(size: usize) -> Self {
        Self {
            size,
            bits: vec![0; size.div_ceil(32)],
        }
    }

    /// Number of bits
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of bytes needed to hold all bits
    pub fn size_in_bytes(&self) -> usize {
        self.size.div_ceil(8)
    }

    /// Get bit `i`
    #[inline]
    pub fn get(&self, i: usize) -> bool {
        debug_assert!(i < self.size, "bit {i} out of range {}", self.size);
        (self.bits[i / 32] >> (i & 31)) & 1 != 0
    }

    /// Set bit `i`
    #[inline]
    pub fn set(&mut self, i: usize) {
        debug_assert!(i < self.size, "bit {i} out of range {}", self.size);
        self.bits[i / 32] |= 1 << (i & 31);
    }

    /// Flip bit `i`
    #[inline]
    pub fn flip(&mut self, i: usize) {
        debug_assert!(i < self.size, "bit {i} out of range {}", self.size);
        self.bits[i / 32] ^= 1 << (i & 31);
    }

    /// Index of the first set bit at or after `from`, or `size()` if none
    pub fn next_set(&self, from: usize) -> usize {
        if from >= self.size {
            return self.size;
        }
        let mut offset = from / 32;
        let mut current = self.bits[offset] & !((1u32 << (from & 31)) - 1);
        while current == 0 {
            offset += 1;
            if offset == self.bits.len() {
                return self.size;
            }
            current = self.bits[offset];
        }
        (offset * 32 + current.trailing_zeros() as usize).min(self.size)
    }

    /// Index of the first unset bit at or after `from`, or `size()` if none
    pub fn next_unset(&self, from: usize) -> usize {
        if from >= self.size {
            return self.size;
        }
        let mut offset = from / 32;
        let mut current = !self.bits[offset] & !((1u32 << (from & 31)) - 1);
        while current == 0 {
            offset += 1;
            if offset == self.bits.len() {
                return self.size;
            }
            current = !self.bits[offset];
        }
        (offset * 32 + current.trailing_zeros() as usize).min(self.size)
    }

    /// Overwrite the 32-bit word holding bit `i`; `i` must be word aligned
    pub fn set_bulk(&mut self, i: usize, new_bits: u32) {
        debug_assert_eq!(i % 32, 0);
        self.bits[i / 32] = new_bits;
    }

    /// Set every bit in `start..end`
    ///
    /// # Panics
    /// Panics if the range is reversed or extends past `size()`.
    pub fn set_range(&mut self, start: usize, end: usize) {
        assert!(start <= end && end <= self.size, "invalid range {start}..{end}");
        if start == end {
            return;
        }
        let end = end - 1;
        let first_word = start / 32;
        let last_word = end / 32;
        for word in first_word..=last_word {
            self.bits[word] |= range_mask(word, first_word, last_word, start, end);
        }
    }

    /// Unset every bit
    pub fn clear(&mut self) {
        self.bits.fill(0);
    }

    /// True if every bit in `start..end` equals `value`
    ///
    /// # Panics
    /// Panics if the range is reversed or extends past `size()`.
    pub fn is_range(&self, start: usize, end: usize, value: bool) -> bool {
        assert!(start <= end && end <= self.size, "invalid range {start}..{end}");
        if start == end {
            return true;
        }
        let end = end - 1;
        let first_word = start / 32;
        let last_word = end / 32;
        (first_word..=last_word).all(|word| {
            let mask = range_mask(word, first_word, last_word, start, end);
            let expected = if value { mask } else { 0 };
            self.bits[word] & mask == expected
        })
    }

    /// Append one bit, growing the array
    pub fn append_bit(&mut self, bit: bool) {
        self.ensure_capacity(self.size + 1);
        if bit {
            self.bits[self.size / 32] |= 1 << (self.size & 31);
        }
        self.size += 1;
    }

    /// Append the `num_bits` least significant bits of `value`, most significant first
    ///
    /// # Panics
    /// Panics if `num_bits > 32`.
    pub fn append_bits(&mut self, value: u32, num_bits: usize) {
        assert!(num_bits <= 32, "num_bits must be between 0 and 32");
        self.ensure_capacity(self.size + num_bits);
        for shift in (0..num_bits).rev() {
            self.append_bit((value >> shift) & 1 == 1);
        }
    }

    /// Append every bit of `other`
    pub fn append_bit_array(&mut self, other: &BitArray) {
        self.ensure_capacity(self.size + other.size);
        for i in 0..other.size {
            self.append_bit(other.get(i));
        }
    }

    /// Exclusive-or with an array of the same size
    pub fn xor(&mut self, other: &BitArray) -> Result<()> {
        if self.size != other.size {
            return Err(Error::DimensionMismatch {
                expected_width: self.size,
                expected_height: 1,
                width: other.size,
                height: 1,
            });
        }
        for (word, other_word) in self.bits.iter_mut().zip(&other.bits) {
            *word ^= other_word;
        }
        Ok(())
    }

    /// Pack bits starting at `bit_offset` into bytes, most significant bit first
    pub fn to_bytes(&self, bit_offset: usize, out: &mut [u8]) {
        let mut bit = bit_offset;
        for byte in out.iter_mut() {
            let mut value = 0u8;
            for j in 0..8 {
                if bit < self.size && self.get(bit) {
                    value |= 1 << (7 - j);
                }
                bit += 1;
            }
            *byte = value;
        }
    }

    /// Reverse the bit order in place
    pub fn reverse(&mut self) {
        let mut reversed = vec![0u32; self.bits.len()];
        for i in (0..self.size).filter(|&i| self.get(i)) {
            let j = self.size - 1 - i;
            reversed[j / 32] |= 1 << (j & 31);
        }
        self.bits = reversed;
    }

    /// Backing words
    pub fn words(&self) -> &[u32] {
        &self.bits
    }

    fn ensure_capacity(&mut self, size: usize) {
        let needed = size.div_ceil(32);
        if needed > self.bits.len() {
            self.bits.resize(needed, 0);
        }
    }
}

fn range_mask(word: usize, first_word: usize, last_word: usize, start: usize, end: usize) -> u32 {
    let first_bit = if word > first_word { 0 } else { start & 31 };
    let last_bit = if word < last_word { 31 } else { end & 31 };
    ((2u64 << last_bit) - (1u64 << first_bit)) as u32
}

impl fmt::Display for BitArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.size {
            if i % 8 == 0 {
                f.write_str(" ")?;
            }
            f.write_str(if self.get(i) { "X" } else { "." })?;
        }
        Ok(())
    }
}
