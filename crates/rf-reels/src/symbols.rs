//! Symbol alphabet and reel strips

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Reel symbol
///
/// The alphabet is closed; strips draw uniformly from [`Symbol::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum Symbol {
    Cherry = 0,
    Lemon = 1,
    Orange = 2,
    Grape = 3,
    Bell = 4,
    Diamond = 5,
    Seven = 6,
    Star = 7,
}

impl Symbol {
    /// Every symbol, in draw order
    pub const ALL: [Symbol; 8] = [
        Symbol::Cherry,
        Symbol::Lemon,
        Symbol::Orange,
        Symbol::Grape,
        Symbol::Bell,
        Symbol::Diamond,
        Symbol::Seven,
        Symbol::Star,
    ];

    /// Display name (e.g., "SEVEN")
    pub fn name(&self) -> &'static str {
        match self {
            Self::Cherry => "CHERRY",
            Self::Lemon => "LEMON",
            Self::Orange => "ORANGE",
            Self::Grape => "GRAPE",
            Self::Bell => "BELL",
            Self::Diamond => "DIAMOND",
            Self::Seven => "SEVEN",
            Self::Star => "STAR",
        }
    }

    /// Single-glyph label used by compact renderers
    pub fn glyph(&self) -> char {
        match self {
            Self::Cherry => 'C',
            Self::Lemon => 'L',
            Self::Orange => 'O',
            Self::Grape => 'G',
            Self::Bell => 'B',
            Self::Diamond => 'D',
            Self::Seven => '7',
            Self::Star => '*',
        }
    }

    /// Draw a symbol uniformly over the alphabet
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// A circular reel strip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReelStrip {
    /// Symbols in strip order
    symbols: Vec<Symbol>,
}

impl ReelStrip {
    /// Create a strip from explicit symbols
    ///
    /// An empty list is replaced by a single CHERRY so that circular
    /// indexing stays total.
    pub fn new(symbols: Vec<Symbol>) -> Self {
        if symbols.is_empty() {
            return Self {
                symbols: vec![Symbol::Cherry],
            };
        }
        Self { symbols }
    }

    /// Create a strip of `length` uniform draws
    pub fn random<R: Rng + ?Sized>(length: usize, rng: &mut R) -> Self {
        let mut strip = Self::new(vec![Symbol::Cherry; length.max(1)]);
        strip.reshuffle(rng);
        strip
    }

    /// Replace every entry with an independent uniform draw
    pub fn reshuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for slot in &mut self.symbols {
            *slot = Symbol::random(rng);
        }
    }

    /// Symbol at a circular index (wraps around)
    pub fn symbol_at(&self, index: usize) -> Symbol {
        self.symbols[index % self.symbols.len()]
    }

    /// Symbols from `first` onwards, `count` entries, wrapping
    pub fn window(&self, first: usize, count: usize) -> Vec<Symbol> {
        (0..count).map(|i| self.symbol_at(first + i)).collect()
    }

    /// Strip length L
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Always false; strips hold at least one symbol
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Raw symbol slice
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }
}
