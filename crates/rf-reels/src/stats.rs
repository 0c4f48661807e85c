//! Session statistics and headless batch simulation
//!
//! The resting symbol of each reel falls out of the solver's choice of `k`,
//! not an independent draw. Running many seeded spins through the real
//! kinematics is the way to see what distribution that coupling produces.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::MachineConfig;
use crate::coordinator::{SpinCoordinator, SpinEvent, TickReport};
use crate::error::ConfigResult;
use crate::ledger::Unmetered;
use crate::payout::{SpinOutcome, WinKind};
use crate::symbols::Symbol;

/// Upper bound on ticks for a single spin before the batch gives up on it
const MAX_TICKS_PER_SPIN: u64 = 100_000;

/// Session statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub total_spins: u64,
    pub total_stake: u64,
    pub total_payout: u64,
    pub wins: u64,
    pub losses: u64,
    pub three_of_a_kind: u64,
    pub two_of_a_kind: u64,
    /// Deceleration plans that came from the solver fallback
    pub fallback_plans: u64,
    /// Ticks from spin request to settle, summed over all spins
    pub total_ticks: u64,
    /// How often each symbol came to rest on any reel
    pub landed: BTreeMap<Symbol, u64>,
}

impl SessionStats {
    /// Fold in one tick's events
    pub fn record_tick(&mut self, report: &TickReport) {
        for event in &report.events {
            if let SpinEvent::DecelerationStarted { plan, .. } = event {
                if plan.fallback {
                    self.fallback_plans += 1;
                }
            }
        }
        if let Some(outcome) = &report.outcome {
            self.record_outcome(outcome);
        }
    }

    /// Fold in a settled spin
    pub fn record_outcome(&mut self, outcome: &SpinOutcome) {
        self.total_spins += 1;
        self.total_stake = self.total_stake.saturating_add(outcome.stake);
        self.total_payout = self.total_payout.saturating_add(outcome.payout);

        match outcome.kind {
            WinKind::ThreeOfAKind => self.three_of_a_kind += 1,
            WinKind::TwoOfAKind => self.two_of_a_kind += 1,
            WinKind::NoWin => {}
        }
        if outcome.is_win() {
            self.wins += 1;
        } else {
            self.losses += 1;
        }

        for symbol in outcome.symbols {
            *self.landed.entry(symbol).or_insert(0) += 1;
        }
    }

    /// Calculate RTP (%)
    pub fn rtp(&self) -> f64 {
        if self.total_stake > 0 {
            (self.total_payout as f64 / self.total_stake as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Calculate hit rate (%)
    pub fn hit_rate(&self) -> f64 {
        if self.total_spins > 0 {
            (self.wins as f64 / self.total_spins as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Mean ticks from request to settle
    pub fn mean_ticks_per_spin(&self) -> f64 {
        if self.total_spins > 0 {
            self.total_ticks as f64 / self.total_spins as f64
        } else {
            0.0
        }
    }

    /// Share of landings per symbol (0..1)
    pub fn landing_share(&self) -> BTreeMap<Symbol, f64> {
        let total: u64 = self.landed.values().sum();
        self.landed
            .iter()
            .map(|(&symbol, &count)| {
                let share = if total > 0 {
                    count as f64 / total as f64
                } else {
                    0.0
                };
                (symbol, share)
            })
            .collect()
    }
}

/// Run `spins` complete spins headlessly at a fixed frame time
pub fn simulate(config: MachineConfig, seed: u64, spins: u64, stake: u64, frame: Duration) -> ConfigResult<SessionStats> {
    let mut machine = SpinCoordinator::seeded(config, seed)?;
    let mut stats = SessionStats::default();

    for _ in 0..spins {
        if !machine.request_spin(stake, &mut Unmetered).is_started() {
            break;
        }

        let mut settled = false;
        for _ in 0..MAX_TICKS_PER_SPIN {
            let report = machine.advance(frame);
            stats.total_ticks += 1;
            stats.record_tick(&report);
            if report.outcome.is_some() {
                settled = true;
                break;
            }
        }

        if !settled {
            log::warn!("Spin {} did not settle within {MAX_TICKS_PER_SPIN} ticks", machine.spin_count());
            break;
        }
    }

    log::info!(
        "Simulated {} spins: RTP {:.2}%, hit rate {:.2}%, {:.1} ticks/spin",
        stats.total_spins,
        stats.rtp(),
        stats.hit_rate(),
        stats.mean_ticks_per_spin()
    );
    Ok(stats)
}
