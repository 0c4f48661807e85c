//! Stake ledger seam
//!
//! Credit bookkeeping lives outside the engine. The coordinator only asks the
//! ledger to accept a stake when a spin is requested; paying out a settled
//! spin is the caller's job.

/// External credit store consulted on spin requests
pub trait StakeLedger {
    /// Debit `stake` if the balance allows it. Returns false (and leaves the
    /// balance untouched) otherwise.
    fn try_debit(&mut self, stake: u64) -> bool;

    /// Credit a payout
    fn credit(&mut self, amount: u64);
}

/// Ledger that accepts every stake; used by batch simulation
#[derive(Debug, Clone, Copy, Default)]
pub struct Unmetered;

impl StakeLedger for Unmetered {
    fn try_debit(&mut self, _stake: u64) -> bool {
        true
    }

    fn credit(&mut self, _amount: u64) {}
}
