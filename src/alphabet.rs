//! Symbol alphabet: the mapping between sequence characters and 2-bit codes.
//!
//! Labels store one code per symbol slot, two bits each, so an alphabet holds
//! exactly four symbols. The position of a symbol in the alphabet is its code:
//! for the default DNA alphabet `A=0, C=1, G=2, T=3`.

use crate::error::{ParsimonyError, Result};
use crate::label::Label;
use std::fmt;
use std::str::FromStr;

/// Number of distinct symbols a 2-bit code can address.
pub const ALPHABET_SIZE: usize = 4;

/// Immutable symbol table passed to encoding and decoding.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Alphabet {
    symbols: [char; ALPHABET_SIZE],
}

impl Alphabet {
    /// The nucleotide alphabet `ACGT`.
    pub const fn dna() -> Self {
        Alphabet { symbols: ['A', 'C', 'G', 'T'] }
    }

    /// Builds an alphabet from exactly four distinct characters, in code order.
    ///
    /// # Example
    /// ```
    /// # use fitch_parsimony::alphabet::Alphabet;
    /// let rna = Alphabet::new("ACGU").unwrap();
    /// assert_eq!(rna.code('U'), Some(3));
    /// assert!(Alphabet::new("ACG").is_err());
    /// assert!(Alphabet::new("AACG").is_err());
    /// ```
    pub fn new(symbols: &str) -> Result<Self> {
        let chars: Vec<char> = symbols.chars().collect();
        let symbols: [char; ALPHABET_SIZE] = chars.as_slice().try_into().map_err(|_| {
            ParsimonyError::InvalidAlphabet(format!(
                "expected {ALPHABET_SIZE} symbols, got {}",
                chars.len()
            ))
        })?;

        for (i, c) in symbols.iter().enumerate() {
            if symbols[..i].contains(c) {
                return Err(ParsimonyError::InvalidAlphabet(format!(
                    "symbol '{c}' appears twice"
                )));
            }
        }

        Ok(Alphabet { symbols })
    }

    /// Code of `symbol`, if it belongs to the alphabet.
    #[inline]
    pub fn code(&self, symbol: char) -> Option<u8> {
        self.symbols
            .iter()
            .position(|&s| s == symbol)
            .map(|p| p as u8)
    }

    /// Symbol for `code`. Codes above 3 have no symbol.
    #[inline]
    pub fn symbol(&self, code: u8) -> Option<char> {
        self.symbols.get(usize::from(code)).copied()
    }

    pub fn symbols(&self) -> &[char; ALPHABET_SIZE] {
        &self.symbols
    }

    /// Encodes a symbol string into a label with room for `label_length` slots.
    ///
    /// Shorter strings give a partially filled label; longer ones are rejected.
    ///
    /// # Example
    /// ```
    /// # use fitch_parsimony::alphabet::Alphabet;
    /// let label = Alphabet::dna().encode("GAT", 3).unwrap();
    /// assert_eq!(label.codes().collect::<Vec<_>>(), vec![2, 0, 3]);
    /// assert!(label.is_full());
    /// ```
    pub fn encode(&self, sequence: &str, label_length: usize) -> Result<Label> {
        let mut label = Label::empty(label_length);
        for (position, symbol) in sequence.chars().enumerate() {
            let code = self
                .code(symbol)
                .ok_or(ParsimonyError::InvalidSymbol { symbol, position })?;
            label.push(code)?;
        }
        Ok(label)
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Alphabet::dna()
    }
}

impl FromStr for Alphabet {
    type Err = ParsimonyError;

    fn from_str(s: &str) -> Result<Self> {
        Alphabet::new(s)
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.symbols.iter().try_for_each(|c| write!(f, "{c}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dna_codes() {
        let dna = Alphabet::dna();
        assert_eq!(dna.code('A'), Some(0));
        assert_eq!(dna.code('C'), Some(1));
        assert_eq!(dna.code('G'), Some(2));
        assert_eq!(dna.code('T'), Some(3));
        assert_eq!(dna.code('N'), None);
        assert_eq!(dna.symbol(2), Some('G'));
        assert_eq!(dna.symbol(4), None);
    }

    #[test]
    fn test_encode_rejects_unknown_symbol() {
        let err = Alphabet::dna().encode("ACN", 3).unwrap_err();
        assert!(matches!(
            err,
            ParsimonyError::InvalidSymbol { symbol: 'N', position: 2 }
        ));
    }

    #[test]
    fn test_encode_too_long() {
        let err = Alphabet::dna().encode("ACGT", 3).unwrap_err();
        assert!(matches!(err, ParsimonyError::LabelOverflow { capacity: 3 }));
    }

    #[test]
    fn test_parse_and_display() {
        let alphabet: Alphabet = "ACGU".parse().unwrap();
        assert_eq!(alphabet.to_string(), "ACGU");
        assert_eq!(Alphabet::default().to_string(), "ACGT");
    }
}
