//! Compact 2-bit-per-symbol labels for tree nodes.
//!
//! # Overview
//! A label is the sequence attached to a node: observed for leaves, inferred
//! for internal nodes. Each symbol slot takes two bits, so one `u64` word
//! holds 32 slots. Slot 0 lives in the lowest two bits of word 0.
//!
//! # Example
//! With the DNA alphabet `A=0, C=1, G=2, T=3`:
//! - `ACT` → codes `[0, 1, 3]` → word `0b11_01_00`
//! - `GA`  → codes `[2, 0]`    → word `0b00_10`
//!
//! Labels grow append-only: internal nodes start empty and gain one slot at a
//! time while the labeler works through them. A written slot never changes.

use crate::error::{ParsimonyError, Result};

/// Bits used by one symbol slot.
pub const BITS_PER_SYMBOL: usize = 2;

const SLOTS_PER_WORD: usize = u64::BITS as usize / BITS_PER_SYMBOL;
const CODE_MASK: u64 = 0b11;

/// A fixed-capacity, append-only packed symbol sequence.
///
/// # Fields
/// - `words`: packed codes, `ceil(capacity / 32)` words
/// - `capacity`: number of symbol slots (the tree-wide label length)
/// - `filled`: number of slots written so far, `0..=capacity`
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Label {
    words: Vec<u64>,
    capacity: usize,
    filled: usize,
}

impl Label {
    /// Creates an empty label with room for `capacity` symbols.
    ///
    /// # Example
    /// ```
    /// # use fitch_parsimony::label::Label;
    /// let label = Label::empty(40);
    /// assert_eq!(label.capacity(), 40);
    /// assert_eq!(label.len(), 0);
    /// assert_eq!(label.filled_bits(), 0);
    /// ```
    pub fn empty(capacity: usize) -> Self {
        Label {
            words: vec![0u64; capacity.div_ceil(SLOTS_PER_WORD)],
            capacity,
            filled: 0,
        }
    }

    /// Builds a label from a prefix of codes; the remaining slots stay empty.
    ///
    /// # Example
    /// ```
    /// # use fitch_parsimony::label::Label;
    /// let label = Label::from_codes(4, &[0, 1, 3]).unwrap();
    /// assert_eq!(label.len(), 3);
    /// assert!(!label.is_full());
    /// assert_eq!(label.get(2), Some(3));
    /// assert_eq!(label.get(3), None);
    /// ```
    pub fn from_codes(capacity: usize, codes: &[u8]) -> Result<Self> {
        let mut label = Label::empty(capacity);
        for &code in codes {
            label.push(code)?;
        }
        Ok(label)
    }

    /// Appends one code at the next free slot.
    ///
    /// Codes above 3 do not fit in a slot and are rejected.
    #[inline]
    pub fn push(&mut self, code: u8) -> Result<()> {
        if self.filled == self.capacity {
            return Err(ParsimonyError::LabelOverflow {
                capacity: self.capacity,
            });
        }
        let slot = self.filled;
        if u64::from(code) > CODE_MASK {
            return Err(ParsimonyError::InvalidCode { code, slot });
        }
        let word = slot / SLOTS_PER_WORD;
        let shift = (slot % SLOTS_PER_WORD) * BITS_PER_SYMBOL;
        self.words[word] |= (u64::from(code) & CODE_MASK) << shift;
        self.filled += 1;
        Ok(())
    }

    /// Appends the codes of `source` from `from` up to this label's capacity.
    ///
    /// Slots `source` has not filled yet are not copied.
    pub fn extend_from(&mut self, source: &Label, from: usize) -> Result<()> {
        let end = self.capacity.min(source.filled);
        for slot in from..end {
            if let Some(code) = source.get(slot) {
                self.push(code)?;
            }
        }
        Ok(())
    }

    /// Code at `slot`, or `None` if the slot has not been written.
    #[inline]
    pub fn get(&self, slot: usize) -> Option<u8> {
        if slot >= self.filled {
            return None;
        }
        let word = slot / SLOTS_PER_WORD;
        let shift = (slot % SLOTS_PER_WORD) * BITS_PER_SYMBOL;
        Some(((self.words[word] >> shift) & CODE_MASK) as u8)
    }

    /// XOR of the 2-bit groups of two labels at `slot`; zero means agreement.
    ///
    /// # Example
    /// ```
    /// # use fitch_parsimony::label::Label;
    /// let a = Label::from_codes(2, &[0, 1]).unwrap();
    /// let b = Label::from_codes(2, &[0, 2]).unwrap();
    /// assert_eq!(a.xor_at(&b, 0), Some(0));
    /// assert_eq!(a.xor_at(&b, 1), Some(0b11));
    /// ```
    #[inline]
    pub fn xor_at(&self, other: &Label, slot: usize) -> Option<u8> {
        Some(self.get(slot)? ^ other.get(slot)?)
    }

    /// Iterates over the written codes, lowest slot first.
    pub fn codes(&self) -> impl Iterator<Item = u8> + '_ {
        (0..self.filled).filter_map(move |slot| self.get(slot))
    }

    /// Number of symbol slots written.
    #[inline]
    pub fn len(&self) -> usize {
        self.filled
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.filled == self.capacity
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of bits written, always even.
    #[inline]
    pub fn filled_bits(&self) -> usize {
        self.filled * BITS_PER_SYMBOL
    }

    /// Packed backing words.
    pub fn words(&self) -> &[u64] {
        &self.words
    }
}
