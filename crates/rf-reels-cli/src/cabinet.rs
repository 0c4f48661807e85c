//! Cabinet: credits, bet and the press/spin/result loop around the engine

use std::time::Duration;

use rf_reels::{
    ConfigResult, MachineConfig, SpinCoordinator, SpinDecision, SpinOutcome, SpinRejection,
    StakeLedger, TickReport,
};

/// Largest bet the cabinet accepts
pub const MAX_BET: u64 = 10;

/// Credit balance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreditWallet {
    credits: u64,
}

impl CreditWallet {
    pub fn new(credits: u64) -> Self {
        Self { credits }
    }

    pub fn credits(&self) -> u64 {
        self.credits
    }
}

impl StakeLedger for CreditWallet {
    fn try_debit(&mut self, stake: u64) -> bool {
        match self.credits.checked_sub(stake) {
            Some(rest) => {
                self.credits = rest;
                true
            }
            None => false,
        }
    }

    fn credit(&mut self, amount: u64) {
        self.credits = self.credits.saturating_add(amount);
    }
}

/// Why a round ended without an outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RoundError {
    #[error("spin refused: {0}")]
    Refused(#[from] SpinRejection),
    /// Reels still moving; the next `play_round` resumes this spin
    #[error("spin did not settle within {frames} frames")]
    Unsettled { frames: u64 },
}

/// Player-facing cabinet phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CabinetPhase {
    /// Waiting for a spin press
    Ready,
    /// Reels in motion
    Spinning,
    /// Result on screen until acknowledged
    ShowingResult,
}

/// A playable cabinet
#[derive(Debug, Clone)]
pub struct Cabinet {
    machine: SpinCoordinator,
    wallet: CreditWallet,
    bet: u64,
    phase: CabinetPhase,
    last_win: u64,
}

impl Cabinet {
    pub fn new(config: MachineConfig, seed: u64, credits: u64) -> ConfigResult<Self> {
        Ok(Self {
            machine: SpinCoordinator::seeded(config, seed)?,
            wallet: CreditWallet::new(credits),
            bet: 1,
            phase: CabinetPhase::Ready,
            last_win: 0,
        })
    }

    /// Change the bet by `delta`; ignored if the result leaves `1..=min(MAX_BET, credits)`
    pub fn adjust_bet(&mut self, delta: i64) {
        let Some(new_bet) = self.bet.checked_add_signed(delta) else {
            return;
        };
        if new_bet >= 1 && new_bet <= MAX_BET.min(self.wallet.credits()) {
            self.bet = new_bet;
        }
    }

    /// Spin button
    pub fn press_spin(&mut self) -> SpinDecision {
        if self.phase != CabinetPhase::Ready {
            return SpinDecision::Rejected {
                reason: SpinRejection::Busy,
            };
        }

        let decision = self.machine.request_spin(self.bet, &mut self.wallet);
        if decision.is_started() {
            self.phase = CabinetPhase::Spinning;
            self.last_win = 0;
        }
        decision
    }

    /// Advance one frame; pays out on the settle frame
    pub fn frame(&mut self, dt: Duration) -> TickReport {
        let report = self.machine.advance(dt);
        if let Some(outcome) = &report.outcome {
            self.wallet.credit(outcome.payout);
            self.last_win = outcome.payout;
            self.phase = CabinetPhase::ShowingResult;
        }
        report
    }

    /// Continue button: dismiss the result
    pub fn acknowledge(&mut self) {
        if self.phase == CabinetPhase::ShowingResult {
            self.phase = CabinetPhase::Ready;
            // Keep the bet affordable after a loss
            self.bet = self.bet.min(self.wallet.credits()).max(1);
        }
    }

    /// Press, run to settle, acknowledge
    ///
    /// A round still spinning from an earlier call is resumed without a new
    /// press, so the bet is debited once per spin.
    pub fn play_round(&mut self, dt: Duration, max_frames: u64) -> Result<SpinOutcome, RoundError> {
        if self.phase != CabinetPhase::Spinning {
            if let SpinDecision::Rejected { reason } = self.press_spin() {
                return Err(reason.into());
            }
        }
        for _ in 0..max_frames {
            if let Some(settled) = self.frame(dt).outcome {
                self.acknowledge();
                return Ok(settled);
            }
        }
        Err(RoundError::Unsettled { frames: max_frames })
    }

    /// One-line reel display, e.g. `[7|B|*]`
    pub fn reel_line(&self) -> String {
        let glyphs: Vec<String> = self
            .machine
            .views()
            .iter()
            .map(|v| v.symbol.glyph().to_string())
            .collect();
        format!("[{}]", glyphs.join("|"))
    }

    pub fn machine(&self) -> &SpinCoordinator {
        &self.machine
    }

    pub fn credits(&self) -> u64 {
        self.wallet.credits()
    }

    pub fn bet(&self) -> u64 {
        self.bet
    }

    pub fn phase(&self) -> CabinetPhase {
        self.phase
    }

    pub fn last_win(&self) -> u64 {
        self.last_win
    }
}
