//! Paytable and outcome evaluation

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::coordinator::REEL_COUNT;
use crate::error::{ConfigError, ConfigResult};
use crate::symbols::Symbol;

/// Classification of a settled line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinKind {
    /// All three reels show the same symbol
    ThreeOfAKind,
    /// reel0 == reel1 or reel1 == reel2
    TwoOfAKind,
    /// No match
    NoWin,
}

/// Symbol → multiplier table plus the two-match fallback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoutRule {
    /// Three-of-a-kind multipliers (× stake)
    pub three_of_a_kind: BTreeMap<Symbol, u64>,
    /// Two-of-a-kind multiplier (× stake)
    pub two_of_a_kind: u64,
}

impl PayoutRule {
    /// Classic cabinet table: 7-7-7 pays 100×, any two pay 2×
    pub fn classic() -> Self {
        let three_of_a_kind = BTreeMap::from([
            (Symbol::Cherry, 5),
            (Symbol::Lemon, 5),
            (Symbol::Orange, 5),
            (Symbol::Grape, 10),
            (Symbol::Bell, 15),
            (Symbol::Star, 20),
            (Symbol::Diamond, 50),
            (Symbol::Seven, 100),
        ]);
        Self {
            three_of_a_kind,
            two_of_a_kind: 2,
        }
    }

    /// Lowest three-of-a-kind tier in the table
    pub fn lowest_tier(&self) -> u64 {
        self.three_of_a_kind.values().copied().min().unwrap_or(1)
    }

    /// Multiplier for three of `symbol`
    ///
    /// A symbol missing from the table falls back to the lowest tier. The
    /// alphabet is closed, so this only happens with a hand-edited table;
    /// [`PayoutRule::missing_symbols`] reports it at load time.
    pub fn multiplier(&self, symbol: Symbol) -> u64 {
        match self.three_of_a_kind.get(&symbol) {
            Some(&m) => m,
            None => {
                let fallback = self.lowest_tier();
                log::warn!("No paytable entry for {symbol}, paying lowest tier {fallback}x");
                fallback
            }
        }
    }

    /// Symbols without a three-of-a-kind entry
    pub fn missing_symbols(&self) -> Vec<Symbol> {
        Symbol::ALL
            .iter()
            .copied()
            .filter(|s| !self.three_of_a_kind.contains_key(s))
            .collect()
    }

    /// Load-time check; an incomplete table is legal but suspicious
    pub fn validate(&self) -> ConfigResult<()> {
        if self.three_of_a_kind.is_empty() {
            return Err(ConfigError::Validation("paytable is empty".into()));
        }
        let missing = self.missing_symbols();
        if !missing.is_empty() {
            log::warn!("Paytable has no entry for {missing:?}; lowest tier will be used");
        }
        Ok(())
    }

    /// Evaluate a settled line for `stake`
    pub fn evaluate(&self, symbols: [Symbol; REEL_COUNT], stake: u64) -> SpinOutcome {
        let [a, b, c] = symbols;

        let (kind, multiplier) = if a == b && b == c {
            (WinKind::ThreeOfAKind, self.multiplier(a))
        } else if a == b || b == c {
            (WinKind::TwoOfAKind, self.two_of_a_kind)
        } else {
            (WinKind::NoWin, 0)
        };

        SpinOutcome {
            symbols,
            stake,
            kind,
            multiplier,
            payout: multiplier.saturating_mul(stake),
        }
    }
}

impl Default for PayoutRule {
    fn default() -> Self {
        Self::classic()
    }
}

/// Result of a settled spin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpinOutcome {
    /// Resting symbol per reel, left to right
    pub symbols: [Symbol; REEL_COUNT],
    /// Stake debited for this spin
    pub stake: u64,
    pub kind: WinKind,
    /// Applied multiplier (0 for no win)
    pub multiplier: u64,
    /// multiplier × stake
    pub payout: u64,
}

impl SpinOutcome {
    /// Check if this is a win
    pub fn is_win(&self) -> bool {
        self.payout > 0
    }
}
